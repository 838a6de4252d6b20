//! # Error Types
//!
//! Errors are split by the phase that produces them:
//!
//! - [`GrammarError`] is returned while a grammar is being built. A grammar
//!   that fails here never reaches table construction or parsing.
//! - [`ParseError`] is returned while parsing. Its most common variant wraps
//!   a [`NoParseError`], the signal that every parse thread died.
//!
//! Building the LR(0) automaton and the SLR(1) table never fails; an empty
//! table cell is how syntax errors are detected later on.

use compact_str::CompactString;

/// Failure while constructing a [`Grammar`](crate::grammar::Grammar).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GrammarError {
    /// A production body references a name that was never declared.
    #[error("undeclared symbol `{symbol}` in production `{production}`")]
    UndeclaredSymbol {
        /// The unknown name.
        symbol: CompactString,
        /// The offending production, rendered as text.
        production: CompactString,
    },

    #[error("`{0}` is declared both as a terminal and as a nonterminal")]
    ConflictingDeclaration(CompactString),

    #[error("terminal `{0}` cannot head a production")]
    TerminalHead(CompactString),

    #[error("start symbol `{0}` is not a declared nonterminal")]
    UndeclaredStart(CompactString),

    #[error("start symbol `{0}` has no productions")]
    StartWithoutProductions(CompactString),

    #[error("grammar has no productions and no start symbol")]
    Empty,
}

/// Every parse thread was rejected.
///
/// `position` is the furthest input position any thread reached. It is
/// always less than or equal to the input length.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("no parse at position {position}: {}", describe_failure(.found.as_deref(), .expected))]
pub struct NoParseError {
    /// Index of the offending input symbol, or the input length at end of input.
    pub position: usize,
    /// Name of the offending terminal, `None` when the input ran out.
    pub found: Option<CompactString>,
    /// Lookaheads that some surviving state could have handled.
    pub expected: Vec<CompactString>,
}

impl NoParseError {
    /// Whether the failure happened at end of input.
    #[must_use]
    pub const fn at_end_of_input(&self) -> bool {
        self.found.is_none()
    }
}

fn describe_failure(found: Option<&str>, expected: &[CompactString]) -> String {
    let found = found.map_or_else(
        || "unexpected end of input".to_string(),
        |name| format!("unexpected `{name}`"),
    );
    match expected {
        [] => found,
        [single] => format!("{found}, expected `{single}`"),
        many => {
            let list = many
                .iter()
                .map(|name| format!("`{name}`"))
                .collect::<Vec<_>>()
                .join(", ");
            format!("{found}, expected one of {list}")
        }
    }
}

/// Failure while parsing an input sequence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error(transparent)]
    NoParse(#[from] NoParseError),

    /// The graph-structured stack grew past [`GlrConfig::max_gss_nodes`](crate::backend::glr::GlrConfig::max_gss_nodes).
    #[error("graph-structured stack exceeded {limit} nodes at position {position}")]
    LimitExceeded { limit: usize, position: usize },

    #[error("unknown terminal `{name}` at position {position}")]
    UnknownTerminal { name: CompactString, position: usize },

    /// A [`TerminalId`](crate::grammar::TerminalId) that the grammar never declared.
    #[error("terminal id {index} is out of range for {terminal_count} terminals at position {position}")]
    TerminalOutOfRange {
        index: usize,
        terminal_count: usize,
        position: usize,
    },

    #[error("input was already finished")]
    Finished,
}

impl ParseError {
    /// Input position the error refers to, if any.
    #[must_use]
    pub const fn position(&self) -> Option<usize> {
        match self {
            Self::NoParse(err) => Some(err.position),
            Self::LimitExceeded { position, .. }
            | Self::UnknownTerminal { position, .. }
            | Self::TerminalOutOfRange { position, .. } => Some(*position),
            Self::Finished => None,
        }
    }

    /// The rejection payload, when every thread died.
    #[must_use]
    pub const fn as_no_parse(&self) -> Option<&NoParseError> {
        match self {
            Self::NoParse(err) => Some(err),
            _ => None,
        }
    }
}
