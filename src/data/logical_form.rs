// ============================================================
// Layer 4 — Logical Form Parser
// ============================================================
// Turns a logical form such as
//
//     for(depend_on(human, plant), oxygen)
//
// into a flat list of symbols plus the shift/reduce transitions
// that rebuild the tree from that list (SPINN-style):
//
//     symbols:     for  depend_on  human     plant     oxygen
//     transitions: S    S          S  R      S  R  R   S  R
//
// A predicate is shifted first, then every argument is emitted
// followed by one reduce that attaches it to the predicate.
// Transition ids start at 1 because 0 is the padding sentinel.
// Forms nested deeper than MAX_DEPTH predicates are rejected.

use crate::domain::error::{DataError, Result};

pub const SHIFT: u32 = 1;
pub const REDUCE: u32 = 2;

const MAX_DEPTH: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Open,
    Close,
    Comma,
    Symbol(String),
}

/// A parsed logical form: symbols in order and the transitions
/// over them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedForm {
    pub symbols:     Vec<String>,
    pub transitions: Vec<u32>,
}

pub fn parse(form: &str) -> Result<ParsedForm> {
    let tokens = tokenize(form);
    let mut parsed = ParsedForm { symbols: Vec::new(), transitions: Vec::new() };
    let mut pos = 0;
    parse_term(&tokens, &mut pos, &mut parsed, 0)?;
    if pos != tokens.len() {
        return Err(DataError::parse(0, format!("trailing input in logical form '{form}'")));
    }
    Ok(parsed)
}

fn tokenize(form: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let flush = |current: &mut String, tokens: &mut Vec<Token>| {
        let symbol = current.trim();
        if !symbol.is_empty() {
            tokens.push(Token::Symbol(symbol.to_string()));
        }
        current.clear();
    };
    for c in form.chars() {
        match c {
            '(' | ')' | ',' => {
                flush(&mut current, &mut tokens);
                tokens.push(match c {
                    '(' => Token::Open,
                    ')' => Token::Close,
                    _ => Token::Comma,
                });
            }
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn parse_term(tokens: &[Token], pos: &mut usize, out: &mut ParsedForm, depth: usize) -> Result<()> {
    let symbol = match tokens.get(*pos) {
        Some(Token::Symbol(s)) => s.clone(),
        other => {
            return Err(DataError::parse(0, format!("expected a symbol, found {other:?}")));
        }
    };
    *pos += 1;
    out.symbols.push(symbol);
    out.transitions.push(SHIFT);

    if tokens.get(*pos) != Some(&Token::Open) {
        return Ok(());
    }
    if depth == MAX_DEPTH {
        return Err(DataError::parse(
            0,
            format!("logical form nested deeper than {MAX_DEPTH} levels"),
        ));
    }
    *pos += 1;
    loop {
        parse_term(tokens, pos, out, depth + 1)?;
        out.transitions.push(REDUCE);
        match tokens.get(*pos) {
            Some(Token::Comma) => *pos += 1,
            Some(Token::Close) => {
                *pos += 1;
                return Ok(());
            }
            other => {
                return Err(DataError::parse(0, format!("expected ',' or ')', found {other:?}")));
            }
        }
    }
}
