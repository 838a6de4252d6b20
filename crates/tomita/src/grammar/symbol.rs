//! Identifier types for grammar symbols and productions.
//!
//! Symbols are dense indices into the owning [`Grammar`](super::Grammar)'s
//! name tables, so equality, hashing and ordering are all integer
//! operations. Names are only looked up for display and diagnostics.

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

macro_rules! index_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        #[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
        pub struct $name(usize);

        impl $name {
            /// Wrap a raw index.
            #[must_use]
            pub const fn new(index: usize) -> Self {
                Self(index)
            }

            /// The raw index.
            #[must_use]
            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}

index_type!(
    /// A terminal symbol of a grammar.
    TerminalId
);
index_type!(
    /// A nonterminal symbol of a grammar.
    NonTerminalId
);
index_type!(
    /// A production, numbered in declaration order.
    ProductionId
);

/// A grammar symbol. Terminals and nonterminals are disjoint by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Symbol {
    Terminal(TerminalId),
    NonTerminal(NonTerminalId),
}

impl Symbol {
    /// Whether this is a terminal. O(1), no grammar lookup needed.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Terminal(_))
    }

    /// The terminal id, if this is a terminal.
    #[must_use]
    pub const fn as_terminal(self) -> Option<TerminalId> {
        match self {
            Self::Terminal(id) => Some(id),
            Self::NonTerminal(_) => None,
        }
    }

    /// The nonterminal id, if this is a nonterminal.
    #[must_use]
    pub const fn as_non_terminal(self) -> Option<NonTerminalId> {
        match self {
            Self::NonTerminal(id) => Some(id),
            Self::Terminal(_) => None,
        }
    }
}

impl From<TerminalId> for Symbol {
    fn from(id: TerminalId) -> Self {
        Self::Terminal(id)
    }
}

impl From<NonTerminalId> for Symbol {
    fn from(id: NonTerminalId) -> Self {
        Self::NonTerminal(id)
    }
}

/// A column of the action table: a terminal or the end-of-input marker.
///
/// `End` orders after every terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Lookahead {
    Terminal(TerminalId),
    End,
}

impl From<TerminalId> for Lookahead {
    fn from(id: TerminalId) -> Self {
        Self::Terminal(id)
    }
}

/// Name used for the end-of-input marker in diagnostics and tables.
pub const END_MARKER: &str = "$";
