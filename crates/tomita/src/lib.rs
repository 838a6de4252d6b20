//! # Tomita
//!
//! Context-free grammar analysis and generalized LR parsing.
//!
//! ## Overview
//!
//! Tomita accepts any context-free grammar, including grammars with epsilon
//! productions, cycles and unbounded ambiguity, and parses input against it:
//!
//! - **Grammar model**: symbols, productions, nullable/FIRST/FOLLOW sets
//! - **LR(0) automaton**: the canonical collection of item sets
//! - **SLR(1) table**: a multi-valued action table that keeps every conflict
//! - **GLR engine**: a graph-structured stack driving that table
//! - **Parse forest**: all derivations of an input, shared and packed
//!
//! Data flows one way: grammar, sets, automaton, table, engine, forest.
//! Everything before the engine is built once per grammar and is immutable,
//! so one table can serve any number of parses, concurrently if needed.
//!
//! ## Quick Start
//!
//! ```rust
//! use tomita::{GlrParser, Grammar, TreeCount};
//!
//! // S -> M N, M -> A M b | x, N -> b N A | x, A -> ε
//! let grammar = Grammar::builder()
//!     .terminals(["x", "b"])
//!     .rule("S", ["M", "N"])
//!     .rule("M", ["A", "M", "b"])
//!     .rule("M", ["x"])
//!     .rule("N", ["b", "N", "A"])
//!     .rule("N", ["x"])
//!     .epsilon("A")
//!     .build()
//!     .unwrap();
//!
//! let parser = GlrParser::new(&grammar);
//! let forest = parser.parse_names(["x", "b", "b", "b", "x"]).unwrap();
//!
//! // every split of the b's between M and N is a derivation
//! assert_eq!(forest.count_trees(), TreeCount::Finite(4));
//! for tree in forest.trees(10) {
//!     assert!(tree.conforms_to(&grammar));
//!     assert_eq!(tree.terminals().len(), 5);
//! }
//!
//! assert!(parser.parse_names(["x", "b"]).is_err());
//! ```
//!
//! ## Modules
//!
//! - [`grammar`] - Grammar model, builder and set computations
//! - [`backend`] - LR(0)/SLR(1) table construction and the GLR engine
//! - [`error`] - Error types
//! - [`testing`] - Earley oracle and sentence generators for tests
//!
//! ## Features
//!
//! - `serialize`: serde support for grammars, automata, tables and forests
//! - `parallel`: [`GlrParser::parse_batch`](backend::glr::GlrParser) over rayon

pub mod backend;
pub mod error;
pub mod grammar;
pub mod testing;

// Re-export commonly used types
pub use backend::glr::{
    GlrConfig, GlrParser, ParseForest, ParseMetrics, ParseSession, ParseStatus, ParseTree,
    TreeCount,
};
pub use backend::lr::{Action, Lr0Automaton, SlrTable};
pub use error::{GrammarError, NoParseError, ParseError};
pub use grammar::{Grammar, GrammarBuilder, Lookahead, NonTerminalId, ProductionId, Symbol, TerminalId};
