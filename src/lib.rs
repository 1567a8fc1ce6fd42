//! Turns multiple-choice QA instance files into fixed-shape,
//! padded integer arrays ready to be stacked into tensors.
//!
//! Layers, outermost first: `cli`, `application`, `data`,
//! `domain`, `infra`.

pub mod cli;
pub mod application;
pub mod domain;
pub mod data;
pub mod infra;
