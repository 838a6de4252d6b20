//! # LR Table Construction
//!
//! Builds the canonical LR(0) automaton of an augmented grammar and fills a
//! multi-valued SLR(1) table from it.
//!
//! ## Overview
//!
//! 1. [`Grammar::augmented`](crate::grammar::Grammar::augmented) adds
//!    `S' -> S`
//! 2. [`Lr0Automaton::build`] discovers the closed item sets with a worklist
//!    and records the goto function
//! 3. [`SlrTable::build`] places shifts along terminal transitions, reduces
//!    under FOLLOW of each completed production, and accept under the end
//!    marker for `S' -> S •`
//!
//! Conflicts stay in the table as multiple actions per cell.
//!
//! ```rust
//! use tomita::backend::lr::{Action, SlrTable};
//! use tomita::grammar::{Grammar, Lookahead};
//!
//! let grammar = Grammar::builder()
//!     .terminals(["+", "n"])
//!     .rule("E", ["E", "+", "E"])
//!     .rule("E", ["n"])
//!     .build()
//!     .unwrap();
//! let table = SlrTable::from_grammar(&grammar);
//!
//! assert!(!table.is_deterministic());
//! let e = grammar.start();
//! let accepting = table.goto(0, e).unwrap();
//! assert_eq!(table.actions(accepting, Lookahead::End), &[Action::Accept]);
//! ```

mod automaton;
mod item;
mod table;

pub use automaton::{Lr0Automaton, StateId};
pub use item::{Item, ItemSet, ItemSetDisplay};
pub use table::{Action, ActionSet, Conflict, SlrTable};
