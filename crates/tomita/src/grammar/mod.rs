//! # Grammar Module
//!
//! The grammar model: symbols, productions and a start symbol, together with
//! the nullable/FIRST/FOLLOW facts derived from them.
//!
//! ## Overview
//!
//! A [`Grammar`] is an immutable value built with [`GrammarBuilder`]. Symbols
//! are referred to by name while building and by dense ids afterwards:
//!
//! - [`TerminalId`] and [`NonTerminalId`] index the grammar's name tables
//! - [`Symbol`] is either of the two
//! - [`ProductionId`] numbers productions in declaration order
//!
//! Any context-free grammar is accepted, including ones with epsilon
//! productions, left recursion and cycles. The derived sets in
//! [`GrammarSets`] are computed once, at construction.
//!
//! ## Usage
//!
//! ```rust
//! use tomita::grammar::Grammar;
//!
//! let grammar = Grammar::builder()
//!     .terminal("a")
//!     .rule("S", ["a", "S", "a"])
//!     .rule("S", ["a"])
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(grammar.productions_for(grammar.start()).count(), 2);
//! assert!(!grammar.is_nullable(grammar.start().into()));
//! ```

pub mod analysis;
pub mod builder;
pub mod classify;
mod symbol;

use std::collections::BTreeSet;
use std::fmt;

use compact_str::CompactString;
use hashbrown::HashMap;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

pub use analysis::{GrammarSets, SequenceFirst};
pub use builder::GrammarBuilder;
pub use classify::GrammarClass;
pub use symbol::{END_MARKER, Lookahead, NonTerminalId, ProductionId, Symbol, TerminalId};

/// A production `head -> body`. An empty body is an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Production {
    head: NonTerminalId,
    body: SmallVec<[Symbol; 4]>,
}

impl Production {
    /// A production `head -> body`.
    #[must_use]
    pub fn new(head: NonTerminalId, body: impl IntoIterator<Item = Symbol>) -> Self {
        Self {
            head,
            body: body.into_iter().collect(),
        }
    }

    /// The nonterminal on the left-hand side.
    #[must_use]
    pub const fn head(&self) -> NonTerminalId {
        self.head
    }

    /// The right-hand side, empty for epsilon.
    #[must_use]
    pub fn body(&self) -> &[Symbol] {
        &self.body
    }

    /// Number of symbols popped when reducing by this production.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Whether the body is empty.
    #[must_use]
    pub fn is_epsilon(&self) -> bool {
        self.body.is_empty()
    }
}

/// A context-free grammar with precomputed nullable, FIRST and FOLLOW sets.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Grammar {
    terminals: Vec<CompactString>,
    non_terminals: Vec<CompactString>,
    productions: Vec<Production>,
    by_head: Vec<Vec<ProductionId>>,
    start: NonTerminalId,
    names: HashMap<CompactString, Symbol, ahash::RandomState>,
    sets: GrammarSets,
}

impl Grammar {
    /// Start a new [`GrammarBuilder`].
    #[must_use]
    pub fn builder() -> GrammarBuilder {
        GrammarBuilder::new()
    }

    /// Assemble an already validated grammar and compute its sets.
    pub(crate) fn from_parts(
        terminals: Vec<CompactString>,
        non_terminals: Vec<CompactString>,
        productions: Vec<Production>,
        start: NonTerminalId,
    ) -> Self {
        let mut by_head = vec![Vec::new(); non_terminals.len()];
        for (index, production) in productions.iter().enumerate() {
            by_head[production.head().index()].push(ProductionId::new(index));
        }

        let mut names = HashMap::with_capacity_and_hasher(
            terminals.len() + non_terminals.len(),
            ahash::RandomState::new(),
        );
        for (index, name) in terminals.iter().enumerate() {
            names.insert(name.clone(), Symbol::Terminal(TerminalId::new(index)));
        }
        for (index, name) in non_terminals.iter().enumerate() {
            names.insert(name.clone(), Symbol::NonTerminal(NonTerminalId::new(index)));
        }

        let sets = GrammarSets::compute(non_terminals.len(), &productions, start);
        Self {
            terminals,
            non_terminals,
            productions,
            by_head,
            start,
            names,
            sets,
        }
    }

    /// The start symbol.
    #[must_use]
    pub const fn start(&self) -> NonTerminalId {
        self.start
    }

    /// All productions, indexed by `ProductionId`.
    #[must_use]
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The production stored under `id`.
    #[must_use]
    pub fn production(&self, id: ProductionId) -> &Production {
        &self.productions[id.index()]
    }

    /// Ids of the productions headed by `nt`, in declaration order.
    #[must_use]
    pub fn production_ids_for(&self, nt: NonTerminalId) -> &[ProductionId] {
        &self.by_head[nt.index()]
    }

    /// Productions headed by `nt`, in declaration order.
    pub fn productions_for(
        &self,
        nt: NonTerminalId,
    ) -> impl Iterator<Item = (ProductionId, &Production)> + '_ {
        self.by_head[nt.index()]
            .iter()
            .map(|&id| (id, &self.productions[id.index()]))
    }

    /// Number of terminals, not counting the end marker.
    #[must_use]
    pub fn terminal_count(&self) -> usize {
        self.terminals.len()
    }

    /// Number of nonterminals.
    #[must_use]
    pub fn non_terminal_count(&self) -> usize {
        self.non_terminals.len()
    }

    /// Every terminal id in declaration order.
    pub fn terminals(&self) -> impl Iterator<Item = TerminalId> + use<> {
        (0..self.terminals.len()).map(TerminalId::new)
    }

    /// Every nonterminal id in declaration order.
    pub fn non_terminals(&self) -> impl Iterator<Item = NonTerminalId> + use<> {
        (0..self.non_terminals.len()).map(NonTerminalId::new)
    }

    /// Every action-table column: the terminals followed by the end marker.
    pub fn lookaheads(&self) -> impl Iterator<Item = Lookahead> + use<> {
        self.terminals()
            .map(Lookahead::Terminal)
            .chain(std::iter::once(Lookahead::End))
    }

    /// Look up a symbol by name.
    #[must_use]
    pub fn symbol(&self, name: &str) -> Option<Symbol> {
        self.names.get(name).copied()
    }

    /// Look up a terminal by name.
    #[must_use]
    pub fn terminal(&self, name: &str) -> Option<TerminalId> {
        self.symbol(name).and_then(Symbol::as_terminal)
    }

    /// Look up a nonterminal by name.
    #[must_use]
    pub fn non_terminal(&self, name: &str) -> Option<NonTerminalId> {
        self.symbol(name).and_then(Symbol::as_non_terminal)
    }

    /// Name of terminal `id`.
    #[must_use]
    pub fn terminal_name(&self, id: TerminalId) -> &str {
        &self.terminals[id.index()]
    }

    /// Name of nonterminal `id`.
    #[must_use]
    pub fn non_terminal_name(&self, id: NonTerminalId) -> &str {
        &self.non_terminals[id.index()]
    }

    /// Name of either kind of symbol.
    #[must_use]
    pub fn symbol_name(&self, symbol: Symbol) -> &str {
        match symbol {
            Symbol::Terminal(id) => self.terminal_name(id),
            Symbol::NonTerminal(id) => self.non_terminal_name(id),
        }
    }

    /// Name of a lookahead, `$` for the end marker.
    #[must_use]
    pub fn lookahead_name(&self, lookahead: Lookahead) -> &str {
        match lookahead {
            Lookahead::Terminal(id) => self.terminal_name(id),
            Lookahead::End => END_MARKER,
        }
    }

    /// Whether `name` is a declared terminal.
    ///
    /// For an already resolved [`Symbol`], use [`Symbol::is_terminal`] or
    /// [`Grammar::is_terminal_symbol`].
    #[must_use]
    pub fn is_terminal(&self, name: &str) -> bool {
        matches!(self.symbol(name), Some(Symbol::Terminal(_)))
    }

    /// Whether `symbol` is a terminal declared by this grammar. O(1).
    #[must_use]
    pub fn is_terminal_symbol(&self, symbol: Symbol) -> bool {
        symbol
            .as_terminal()
            .is_some_and(|id| id.index() < self.terminals.len())
    }

    /// Whether `symbol` derives the empty string. O(1).
    #[must_use]
    pub fn is_nullable(&self, symbol: Symbol) -> bool {
        self.sets.is_nullable(symbol)
    }

    /// FIRST set of `nt`.
    #[must_use]
    pub fn first(&self, nt: NonTerminalId) -> &BTreeSet<TerminalId> {
        self.sets.first(nt)
    }

    /// FOLLOW set of `nt`, possibly holding the end marker.
    #[must_use]
    pub fn follow(&self, nt: NonTerminalId) -> &BTreeSet<Lookahead> {
        self.sets.follow(nt)
    }

    /// FIRST set of a symbol string and whether it is nullable.
    #[must_use]
    pub fn first_of(&self, symbols: &[Symbol]) -> SequenceFirst {
        self.sets.first_of(symbols)
    }

    /// The precomputed nullable, FIRST and FOLLOW sets.
    #[must_use]
    pub const fn sets(&self) -> &GrammarSets {
        &self.sets
    }

    /// Epsilon, left-recursion and cycle facts about this grammar.
    #[must_use]
    pub fn classify(&self) -> GrammarClass {
        GrammarClass::of(self)
    }

    /// A copy of this grammar with a fresh start symbol `S'` and the
    /// production `S' -> S` appended.
    ///
    /// The new symbol is named after the old start with primes appended
    /// until the name is unused. Existing ids stay valid in the copy.
    #[must_use]
    pub fn augmented(&self) -> (Self, ProductionId) {
        let base = self.non_terminal_name(self.start);
        let mut name = CompactString::from(base);
        name.push('\'');
        while self.names.contains_key(name.as_str()) {
            name.push('\'');
        }

        let mut non_terminals = self.non_terminals.clone();
        let new_start = NonTerminalId::new(non_terminals.len());
        non_terminals.push(name);

        let mut productions = self.productions.clone();
        let augmenting = ProductionId::new(productions.len());
        productions.push(Production::new(
            new_start,
            [Symbol::NonTerminal(self.start)],
        ));

        let grammar = Self::from_parts(self.terminals.clone(), non_terminals, productions, new_start);
        (grammar, augmenting)
    }

    /// Render production `id` as `Head -> body`.
    #[must_use]
    pub fn display_production(&self, id: ProductionId) -> ProductionDisplay<'_> {
        ProductionDisplay {
            grammar: self,
            production: self.production(id),
            dot: None,
        }
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for index in 0..self.productions.len() {
            writeln!(f, "{}", self.display_production(ProductionId::new(index)))?;
        }
        Ok(())
    }
}

/// Textual form of a production, optionally with an item dot.
pub struct ProductionDisplay<'g> {
    grammar: &'g Grammar,
    production: &'g Production,
    dot: Option<usize>,
}

impl<'g> ProductionDisplay<'g> {
    pub(crate) const fn with_dot(grammar: &'g Grammar, production: &'g Production, dot: usize) -> Self {
        Self {
            grammar,
            production,
            dot: Some(dot),
        }
    }
}

impl fmt::Display for ProductionDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.grammar.non_terminal_name(self.production.head()))?;
        let body = self.production.body();
        for (index, symbol) in body.iter().enumerate() {
            if self.dot == Some(index) {
                f.write_str(" •")?;
            }
            write!(f, " {}", self.grammar.symbol_name(*symbol))?;
        }
        if self.dot == Some(body.len()) {
            f.write_str(" •")?;
        } else if body.is_empty() {
            f.write_str(" ε")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn palindrome() -> Grammar {
        Grammar::builder()
            .terminal("a")
            .rule("S", ["a", "S", "a"])
            .rule("S", ["a"])
            .build()
            .unwrap()
    }

    #[test]
    fn test_productions_for_keeps_declaration_order() {
        let grammar = palindrome();
        let ids: Vec<_> = grammar.production_ids_for(grammar.start()).to_vec();
        assert_eq!(ids, vec![ProductionId::new(0), ProductionId::new(1)]);
        assert_eq!(grammar.production(ids[0]).len(), 3);
    }

    #[test]
    fn test_symbol_lookup() {
        let grammar = palindrome();
        assert!(grammar.is_terminal("a"));
        assert!(!grammar.is_terminal("S"));
        assert!(grammar.symbol("b").is_none());
        assert_eq!(grammar.terminal_name(grammar.terminal("a").unwrap()), "a");
    }

    #[test]
    fn test_is_terminal_symbol() {
        let grammar = palindrome();
        let a = grammar.symbol("a").unwrap();
        let start = grammar.symbol("S").unwrap();
        assert!(a.is_terminal());
        assert!(grammar.is_terminal_symbol(a));
        assert!(!start.is_terminal());
        assert!(!grammar.is_terminal_symbol(start));
        assert!(!grammar.is_terminal_symbol(Symbol::Terminal(TerminalId::new(5))));
    }

    #[test]
    fn test_augmented_appends_start_production() {
        let grammar = palindrome();
        let (augmented, start_production) = grammar.augmented();
        assert_eq!(start_production, ProductionId::new(2));
        assert_eq!(augmented.non_terminal_name(augmented.start()), "S'");
        assert_eq!(
            augmented.display_production(start_production).to_string(),
            "S' -> S"
        );
        // original ids are preserved
        assert_eq!(augmented.production(ProductionId::new(0)), grammar.production(ProductionId::new(0)));
        assert!(augmented.follow(grammar.start()).contains(&Lookahead::End));
    }

    #[test]
    fn test_augmented_name_avoids_collisions() {
        let grammar = Grammar::builder()
            .terminal("x")
            .start("S")
            .rule("S", ["S'"])
            .rule("S'", ["x"])
            .build()
            .unwrap();
        let (augmented, _) = grammar.augmented();
        assert_eq!(augmented.non_terminal_name(augmented.start()), "S''");
    }

    #[test]
    fn test_display() {
        let grammar = Grammar::builder()
            .terminal("b")
            .rule("A", ["b"])
            .epsilon("A")
            .build()
            .unwrap();
        assert_eq!(grammar.to_string(), "A -> b\nA -> ε\n");
    }
}
