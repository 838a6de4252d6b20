use std::fmt;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use crate::grammar::{Grammar, ProductionDisplay, ProductionId, Symbol};

/// An LR(0) item: a production with a dot marking how much of it matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Item {
    production: ProductionId,
    dot: usize,
}

impl Item {
    /// Item for `production` with `dot` body symbols matched.
    #[must_use]
    pub const fn new(production: ProductionId, dot: usize) -> Self {
        Self { production, dot }
    }

    /// The production this item tracks.
    #[must_use]
    pub const fn production(self) -> ProductionId {
        self.production
    }

    /// Number of body symbols before the dot.
    #[must_use]
    pub const fn dot(self) -> usize {
        self.dot
    }

    /// The symbol right after the dot, `None` for a complete item.
    #[must_use]
    pub fn next_symbol(self, grammar: &Grammar) -> Option<Symbol> {
        grammar.production(self.production).body().get(self.dot).copied()
    }

    /// Whether the dot is at the end of the body.
    #[must_use]
    pub fn is_complete(self, grammar: &Grammar) -> bool {
        self.dot == grammar.production(self.production).len()
    }

    /// The same item with the dot moved one symbol right.
    #[must_use]
    pub const fn advance(self) -> Self {
        Self {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    /// Render as `A -> α • β`.
    #[must_use]
    pub fn display(self, grammar: &Grammar) -> ProductionDisplay<'_> {
        ProductionDisplay::with_dot(grammar, grammar.production(self.production), self.dot)
    }
}

/// A closed set of items: one state of the LR(0) automaton.
///
/// `kernel` holds the sorted items the state was reached with (the start
/// item for state 0). `items` holds the kernel followed by the closure items
/// in discovery order. Two sets with equal kernels have equal closures.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ItemSet {
    kernel: Vec<Item>,
    items: Vec<Item>,
}

impl ItemSet {
    /// Close `kernel` under prediction.
    ///
    /// For every item `[A -> α • B β]`, add `[B -> • γ]` for each production
    /// of `B`, until nothing new is added.
    #[must_use]
    pub fn closure(mut kernel: Vec<Item>, grammar: &Grammar) -> Self {
        kernel.sort_unstable();
        kernel.dedup();

        let mut items = kernel.clone();
        let mut predicted = vec![false; grammar.non_terminal_count()];
        let mut index = 0;
        while index < items.len() {
            if let Some(Symbol::NonTerminal(nt)) = items[index].next_symbol(grammar)
                && !std::mem::replace(&mut predicted[nt.index()], true)
            {
                for &production in grammar.production_ids_for(nt) {
                    let item = Item::new(production, 0);
                    // kernel items with dot 0 only exist for the start item
                    if !kernel.contains(&item) {
                        items.push(item);
                    }
                }
            }
            index += 1;
        }
        Self { kernel, items }
    }

    /// The sorted kernel items that identify this state.
    #[must_use]
    pub fn kernel(&self) -> &[Item] {
        &self.kernel
    }

    /// Kernel items followed by closure items.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Items with the dot at the end, including completed epsilon items.
    pub fn complete_items<'a>(&'a self, grammar: &'a Grammar) -> impl Iterator<Item = Item> + 'a {
        self.items
            .iter()
            .copied()
            .filter(move |item| item.is_complete(grammar))
    }

    /// Kernels of the successor states, grouped by the symbol after the dot.
    ///
    /// Symbols appear in the order they first occur in `items`, which keeps
    /// state numbering deterministic. Complete items contribute nothing.
    #[must_use]
    pub fn successors(&self, grammar: &Grammar) -> Vec<(Symbol, Vec<Item>)> {
        let mut groups: Vec<(Symbol, Vec<Item>)> = Vec::new();
        for &item in &self.items {
            let Some(symbol) = item.next_symbol(grammar) else {
                continue;
            };
            match groups.iter_mut().find(|(existing, _)| *existing == symbol) {
                Some((_, kernel)) => kernel.push(item.advance()),
                None => groups.push((symbol, vec![item.advance()])),
            }
        }
        groups
    }

    /// Render the state one item per line.
    #[must_use]
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> ItemSetDisplay<'g> {
        ItemSetDisplay { set: self, grammar }
    }
}

pub struct ItemSetDisplay<'g> {
    set: &'g ItemSet,
    grammar: &'g Grammar,
}

impl fmt::Display for ItemSetDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for item in &self.set.items {
            writeln!(f, "{}", item.display(self.grammar))?;
        }
        Ok(())
    }
}
