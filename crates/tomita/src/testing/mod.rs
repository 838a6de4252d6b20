//! # Testing Utilities
//!
//! Helpers for checking parsers against grammars.
//!
//! - [`EarleyRecognizer`] decides membership independently of the LR
//!   automaton and table, for use as ground truth in property tests
//! - [`SentenceGenerator`] derives random sentences known to be in the language
//! - [`rederive`] replays a leftmost derivation to recover its yield

pub mod generators;
pub mod oracle;

pub use generators::{GeneratorConfig, SentenceGenerator, rederive};
pub use oracle::EarleyRecognizer;
