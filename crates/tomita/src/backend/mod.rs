//! # Parser Backends
//!
//! The table construction and parsing machinery, leaves first:
//!
//! - [`lr`]: LR(0) items, the canonical LR(0) automaton and the
//!   multi-valued SLR(1) action/goto table
//! - [`glr`]: the generalized LR engine driving that table with a
//!   graph-structured stack and producing a shared packed parse forest
//!
//! Tables are immutable once built and can be shared between any number of
//! concurrent parses.

pub mod glr;
pub mod lr;
