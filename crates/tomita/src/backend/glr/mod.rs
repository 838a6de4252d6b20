//! # GLR (Generalized LR) Parser Backend
//!
//! Parses any context-free grammar by running every action of a
//! multi-valued SLR(1) table in parallel over a graph-structured stack.
//!
//! ## Overview
//!
//! Where a deterministic LR parser would stop on a conflict, this engine
//! follows all of the conflicting actions. Stacks that reach the same
//! automaton state at the same input position are merged into one stack
//! node, and reductions that derive the same nonterminal over the same span
//! are packed into one forest node. The result of an accepted parse is a
//! [`ParseForest`] whose root encodes every derivation.
//!
//! ## Algorithm
//!
//! 1. Build the LR(0) automaton and the SLR(1) table (see [`crate::backend::lr`])
//! 2. For each input symbol, run all reductions to a fixpoint, then shift
//! 3. At end of input, reduce on the end marker and look for an accepting stack
//!
//! Epsilon productions and grammar cycles are supported. Reductions that
//! would recreate an existing stack edge are no-ops, which bounds the work
//! done at each position.
//!
//! ## Usage
//!
//! ```rust
//! use tomita::backend::glr::{GlrParser, TreeCount};
//! use tomita::grammar::Grammar;
//!
//! let grammar = Grammar::builder()
//!     .terminals(["+", "n"])
//!     .rule("E", ["E", "+", "E"])
//!     .rule("E", ["n"])
//!     .build()
//!     .unwrap();
//! let parser = GlrParser::new(&grammar);
//!
//! let forest = parser.parse_names(["n", "+", "n", "+", "n"]).unwrap();
//! assert_eq!(forest.count_trees(), TreeCount::Finite(2));
//! ```

mod forest;
mod parser;
mod stack;

use std::sync::Arc;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::debug;

pub use forest::{
    ForestId, ForestNode, PackedAlternative, ParseForest, ParseTree, ParseTreeDisplay, TreeCount,
};
pub use parser::{ParseMetrics, ParseSession, ParseStatus};
pub use stack::{GraphStack, GssEdge, GssNode, GssNodeId, StackPath};

use crate::backend::lr::SlrTable;
use crate::error::ParseError;
use crate::grammar::{Grammar, TerminalId};

/// Tuning knobs for the GLR backend.
#[derive(Debug, Clone)]
pub struct GlrConfig {
    /// Upper bound on graph-structured stack nodes per parse. `None` means
    /// unbounded. Exceeding it fails the parse with
    /// [`ParseError::LimitExceeded`].
    pub max_gss_nodes: Option<usize>,
    /// Minimum batch size before [`GlrParser::parse_batch`] fans out over
    /// threads. Only used with the `parallel` feature.
    pub parallel_threshold: usize,
}

impl Default for GlrConfig {
    fn default() -> Self {
        Self {
            max_gss_nodes: None,
            parallel_threshold: 4,
        }
    }
}

/// GLR parser over a shared, immutable SLR(1) table.
///
/// Cloning is cheap; clones share the table.
#[derive(Debug, Clone)]
pub struct GlrParser {
    table: Arc<SlrTable>,
    config: GlrConfig,
}

impl GlrParser {
    /// Build the table for `grammar` with the default configuration.
    #[must_use]
    pub fn new(grammar: &Grammar) -> Self {
        Self::with_config(grammar, GlrConfig::default())
    }

    /// Build the table for `grammar` with an explicit configuration.
    #[must_use]
    pub fn with_config(grammar: &Grammar, config: GlrConfig) -> Self {
        let class = grammar.classify();
        debug!(
            epsilon_rules = class.has_empty_rules,
            left_recursive = class.left_recursive.len(),
            cyclic = class.cyclic.len(),
            "classified grammar"
        );
        Self::from_table(Arc::new(SlrTable::from_grammar(grammar)), config)
    }

    /// Reuse a table that was already built, possibly shared with other parsers.
    #[must_use]
    pub const fn from_table(table: Arc<SlrTable>, config: GlrConfig) -> Self {
        Self { table, config }
    }

    /// The SLR(1) table driving this parser.
    #[must_use]
    pub fn table(&self) -> &SlrTable {
        &self.table
    }

    /// A handle to the table for building more parsers.
    #[must_use]
    pub fn shared_table(&self) -> Arc<SlrTable> {
        Arc::clone(&self.table)
    }

    /// The augmented grammar. Ids of the source grammar are valid here.
    #[must_use]
    pub fn grammar(&self) -> &Grammar {
        self.table.grammar()
    }

    /// The configuration this parser was built with.
    #[must_use]
    pub const fn config(&self) -> &GlrConfig {
        &self.config
    }

    /// Start a step-at-a-time parse.
    #[must_use]
    pub fn session(&self) -> ParseSession<'_> {
        ParseSession::new(&self.table, &self.config)
    }

    /// Parse a complete input sequence.
    ///
    /// # Errors
    ///
    /// [`ParseError::NoParse`] when the input is not in the language, or
    /// [`ParseError::LimitExceeded`] when the configured stack cap is hit, or
    /// [`ParseError::TerminalOutOfRange`] for an id from another grammar.
    pub fn parse<I>(&self, input: I) -> Result<ParseForest, ParseError>
    where
        I: IntoIterator<Item = TerminalId>,
    {
        let mut session = self.session();
        for terminal in input {
            session.push(terminal)?;
        }
        session.finish()
    }

    /// Parse a sequence of terminal names.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownTerminal`] for a name the grammar does not
    /// declare as a terminal, otherwise as [`parse`](Self::parse).
    pub fn parse_names<I, S>(&self, names: I) -> Result<ParseForest, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let input = self.terminals(names)?;
        self.parse(input)
    }

    /// Resolve terminal names against the grammar.
    ///
    /// # Errors
    ///
    /// [`ParseError::UnknownTerminal`] for the first unknown name.
    pub fn terminals<I, S>(&self, names: I) -> Result<Vec<TerminalId>, ParseError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(position, name)| {
                let name = name.as_ref();
                self.grammar()
                    .terminal(name)
                    .ok_or_else(|| ParseError::UnknownTerminal {
                        name: name.into(),
                        position,
                    })
            })
            .collect()
    }

    /// Whether `input` is a sentence of the grammar.
    pub fn recognize<I>(&self, input: I) -> bool
    where
        I: IntoIterator<Item = TerminalId>,
    {
        self.parse(input).is_ok()
    }

    /// Parse independent inputs concurrently against the shared table.
    ///
    /// Results come back in input order. Batches smaller than
    /// [`GlrConfig::parallel_threshold`] run on the calling thread.
    #[cfg(feature = "parallel")]
    pub fn parse_batch(&self, inputs: &[Vec<TerminalId>]) -> Vec<Result<ParseForest, ParseError>> {
        if inputs.len() < self.config.parallel_threshold {
            return inputs
                .iter()
                .map(|input| self.parse(input.iter().copied()))
                .collect();
        }
        inputs
            .par_iter()
            .map(|input| self.parse(input.iter().copied()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palindrome_parser() -> GlrParser {
        let grammar = Grammar::builder()
            .terminal("a")
            .rule("S", ["a", "S", "a"])
            .rule("S", ["a"])
            .build()
            .unwrap();
        GlrParser::new(&grammar)
    }

    #[test]
    fn test_accepts_and_rejects() {
        let parser = palindrome_parser();
        let forest = parser.parse_names(["a", "a", "a"]).unwrap();
        assert_eq!(forest.count_trees(), TreeCount::Finite(1));

        let err = parser.parse_names(["a", "a"]).unwrap_err();
        let no_parse = err.as_no_parse().unwrap();
        assert_eq!(no_parse.position, 2);
        assert!(no_parse.at_end_of_input());
    }

    #[test]
    fn test_unknown_terminal() {
        let parser = palindrome_parser();
        let err = parser.parse_names(["a", "b"]).unwrap_err();
        assert_eq!(
            err,
            ParseError::UnknownTerminal {
                name: "b".into(),
                position: 1,
            }
        );
    }

    #[test]
    fn test_node_limit() {
        let grammar = Grammar::builder()
            .terminals(["+", "n"])
            .rule("E", ["E", "+", "E"])
            .rule("E", ["n"])
            .build()
            .unwrap();
        let config = GlrConfig {
            max_gss_nodes: Some(4),
            ..GlrConfig::default()
        };
        let parser = GlrParser::with_config(&grammar, config);
        let err = parser.parse_names(["n", "+", "n", "+", "n"]).unwrap_err();
        assert!(matches!(err, ParseError::LimitExceeded { limit: 4, .. }));
    }

    #[test]
    fn test_clones_share_table() {
        let parser = palindrome_parser();
        let clone = parser.clone();
        assert!(Arc::ptr_eq(&parser.shared_table(), &clone.shared_table()));
    }
}
