//! Fluent construction of a [`Grammar`] from symbol names.

use compact_str::CompactString;
use hashbrown::HashMap;
use tracing::debug;

use super::{Grammar, NonTerminalId, Production, Symbol, TerminalId};
use crate::error::GrammarError;

/// Builder for [`Grammar`].
///
/// Terminals must be declared. Nonterminals may be declared up front, and
/// any production head that is not yet declared becomes a nonterminal. When
/// no start symbol is set, the head of the first production is used.
///
/// # Example
///
/// ```rust
/// use tomita::grammar::GrammarBuilder;
///
/// let grammar = GrammarBuilder::new()
///     .terminals(["x", "b"])
///     .rule("S", ["M", "N"])
///     .rule("M", ["A", "M", "b"])
///     .rule("M", ["x"])
///     .rule("N", ["b", "N", "A"])
///     .rule("N", ["x"])
///     .epsilon("A")
///     .build()
///     .unwrap();
///
/// assert_eq!(grammar.productions().len(), 6);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GrammarBuilder {
    terminals: Vec<CompactString>,
    non_terminals: Vec<CompactString>,
    rules: Vec<(CompactString, Vec<CompactString>)>,
    start: Option<CompactString>,
}

impl GrammarBuilder {
    /// An empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a terminal.
    #[must_use]
    pub fn terminal(mut self, name: impl Into<CompactString>) -> Self {
        self.terminals.push(name.into());
        self
    }

    /// Declare several terminals in order.
    #[must_use]
    pub fn terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.terminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Declare a nonterminal. Declaring fixes its index ahead of any rule.
    #[must_use]
    pub fn non_terminal(mut self, name: impl Into<CompactString>) -> Self {
        self.non_terminals.push(name.into());
        self
    }

    /// Declare several nonterminals in order.
    #[must_use]
    pub fn non_terminals<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.non_terminals.extend(names.into_iter().map(Into::into));
        self
    }

    /// Choose the start symbol. Defaults to the head of the first rule.
    #[must_use]
    pub fn start(mut self, name: impl Into<CompactString>) -> Self {
        self.start = Some(name.into());
        self
    }

    /// Add the production `head -> body`.
    #[must_use]
    pub fn rule<I, S>(mut self, head: impl Into<CompactString>, body: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<CompactString>,
    {
        self.rules
            .push((head.into(), body.into_iter().map(Into::into).collect()));
        self
    }

    /// Add the epsilon production `head -> ε`.
    #[must_use]
    pub fn epsilon(mut self, head: impl Into<CompactString>) -> Self {
        self.rules.push((head.into(), Vec::new()));
        self
    }

    /// Validate the declarations and build the grammar.
    ///
    /// # Errors
    ///
    /// Returns a [`GrammarError`] when a body references an undeclared
    /// symbol, a name is both terminal and nonterminal, a terminal heads a
    /// production, or the start symbol is unusable.
    pub fn build(self) -> Result<Grammar, GrammarError> {
        let mut names: HashMap<CompactString, Symbol, ahash::RandomState> = HashMap::default();
        let mut terminals = Vec::new();
        let mut non_terminals = Vec::new();

        for name in self.terminals {
            if names.contains_key(&name) {
                continue;
            }
            names.insert(name.clone(), Symbol::Terminal(TerminalId::new(terminals.len())));
            terminals.push(name);
        }

        let heads = self.rules.iter().map(|(head, _)| head.clone());
        for name in self.non_terminals.into_iter().chain(heads) {
            match names.get(&name) {
                Some(Symbol::NonTerminal(_)) => {}
                Some(Symbol::Terminal(_)) => {
                    // a declared head that is a terminal is a different mistake
                    return Err(if self.rules.iter().any(|(head, _)| *head == name) {
                        GrammarError::TerminalHead(name)
                    } else {
                        GrammarError::ConflictingDeclaration(name)
                    });
                }
                None => {
                    let id = NonTerminalId::new(non_terminals.len());
                    names.insert(name.clone(), Symbol::NonTerminal(id));
                    non_terminals.push(name);
                }
            }
        }

        let start_name = match self.start {
            Some(name) => name,
            None => self
                .rules
                .first()
                .map(|(head, _)| head.clone())
                .ok_or(GrammarError::Empty)?,
        };
        let start = match names.get(&start_name) {
            Some(Symbol::NonTerminal(id)) => *id,
            _ => return Err(GrammarError::UndeclaredStart(start_name)),
        };

        let mut productions = Vec::with_capacity(self.rules.len());
        for (head, body) in &self.rules {
            let Some(Symbol::NonTerminal(head_id)) = names.get(head).copied() else {
                return Err(GrammarError::TerminalHead(head.clone()));
            };
            let mut symbols = Vec::with_capacity(body.len());
            for name in body {
                let symbol = names.get(name).copied().ok_or_else(|| {
                    GrammarError::UndeclaredSymbol {
                        symbol: name.clone(),
                        production: render_rule(head, body),
                    }
                })?;
                symbols.push(symbol);
            }
            productions.push(Production::new(head_id, symbols));
        }

        if !productions.iter().any(|p| p.head() == start) {
            return Err(GrammarError::StartWithoutProductions(start_name));
        }

        debug!(
            terminals = terminals.len(),
            non_terminals = non_terminals.len(),
            productions = productions.len(),
            start = %start_name,
            "built grammar"
        );
        Ok(Grammar::from_parts(terminals, non_terminals, productions, start))
    }
}

fn render_rule(head: &str, body: &[CompactString]) -> CompactString {
    let mut text = CompactString::from(head);
    text.push_str(" ->");
    if body.is_empty() {
        text.push_str(" ε");
    }
    for name in body {
        text.push(' ');
        text.push_str(name);
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_undeclared_symbol() {
        let err = GrammarBuilder::new()
            .terminal("a")
            .rule("S", ["a", "B"])
            .build()
            .unwrap_err();
        assert_eq!(
            err,
            GrammarError::UndeclaredSymbol {
                symbol: "B".into(),
                production: "S -> a B".into(),
            }
        );
    }

    #[test]
    fn test_terminal_head() {
        let err = GrammarBuilder::new()
            .terminal("a")
            .rule("a", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::TerminalHead("a".into()));
    }

    #[test]
    fn test_conflicting_declaration() {
        let err = GrammarBuilder::new()
            .terminal("a")
            .non_terminal("a")
            .rule("S", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::ConflictingDeclaration("a".into()));
    }

    #[test]
    fn test_start_checks() {
        assert_eq!(GrammarBuilder::new().build().unwrap_err(), GrammarError::Empty);

        let err = GrammarBuilder::new()
            .terminal("a")
            .start("a")
            .rule("S", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::UndeclaredStart("a".into()));

        let err = GrammarBuilder::new()
            .terminal("a")
            .non_terminal("T")
            .start("T")
            .rule("S", ["a"])
            .build()
            .unwrap_err();
        assert_eq!(err, GrammarError::StartWithoutProductions("T".into()));
    }

    #[test]
    fn test_declared_non_terminal_without_productions_is_allowed() {
        let grammar = GrammarBuilder::new()
            .terminal("a")
            .non_terminal("Dead")
            .rule("S", ["a"])
            .rule("S", ["Dead"])
            .build()
            .unwrap();
        assert_eq!(grammar.non_terminal_name(grammar.start()), "S");
        assert_eq!(grammar.non_terminal_count(), 2);
    }

    #[test]
    fn test_duplicate_declarations_are_merged() {
        let grammar = GrammarBuilder::new()
            .terminals(["a", "a"])
            .rule("S", ["a"])
            .rule("S", ["S", "a"])
            .build()
            .unwrap();
        assert_eq!(grammar.terminal_count(), 1);
        assert_eq!(grammar.non_terminal_count(), 1);
    }
}
