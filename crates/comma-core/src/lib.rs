//! Comma disambiguation via local classification plus sentence-level
//! constrained inference.
//!
//! A sparse linear classifier scores each comma independently; an ILP solve
//! per sentence corrects those predictions so that hand-written linguistic
//! constraints (list agreement, locative/substitute pairs, Oxford comma)
//! hold jointly over all commas in the sentence.

pub mod classifier;
pub mod constraints;
pub mod corpus;
pub mod features;
pub mod ilp;
pub mod inference;
pub mod sentence;
pub mod settings;
