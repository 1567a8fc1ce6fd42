// ============================================================
// Layer 3 — Instance Labels
// ============================================================
// Sentence-like instances carry a true/false judgement, or none
// at all for unlabelled data. Question instances carry the index
// of their correct option instead. One enum covers both so no
// field has to mean different things per variant.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Label {
    #[default]
    Unset,
    Binary(bool),
    OptionIndex(usize),
}

impl Label {
    pub fn is_true(&self) -> bool {
        matches!(self, Label::Binary(true))
    }

    pub fn is_false(&self) -> bool {
        matches!(self, Label::Binary(false))
    }

    /// Parse the label column of an instance file.
    /// Accepts `1`/`0` and `true`/`false` (any case).
    pub fn parse_binary(field: &str) -> Option<Label> {
        match field.trim().to_ascii_lowercase().as_str() {
            "1" | "true"  => Some(Label::Binary(true)),
            "0" | "false" => Some(Label::Binary(false)),
            _ => None,
        }
    }
}

impl From<bool> for Label {
    fn from(value: bool) -> Self {
        Label::Binary(value)
    }
}

impl From<Option<bool>> for Label {
    fn from(value: Option<bool>) -> Self {
        value.map(Label::Binary).unwrap_or(Label::Unset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_binary() {
        assert_eq!(Label::parse_binary("1"), Some(Label::Binary(true)));
        assert_eq!(Label::parse_binary("False"), Some(Label::Binary(false)));
        assert_eq!(Label::parse_binary("maybe"), None);
    }

    #[test]
    fn test_from_optional_bool() {
        assert_eq!(Label::from(None), Label::Unset);
        assert_eq!(Label::from(Some(true)), Label::Binary(true));
    }
}
