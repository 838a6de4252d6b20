//! Canonical LR(0) collection over the augmented grammar.

use hashbrown::HashMap;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::item::{Item, ItemSet};
use crate::grammar::{Grammar, ProductionId, Symbol};

/// Index of an automaton state. State 0 is the start state.
pub type StateId = usize;

/// The LR(0) automaton: closed item sets and their goto function.
///
/// Owns the augmented grammar it was built from, so production and symbol
/// ids of the source grammar keep their meaning here.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct Lr0Automaton {
    grammar: Grammar,
    start_production: ProductionId,
    states: Vec<ItemSet>,
    /// Outgoing edges per state, sorted by symbol.
    transitions: Vec<Vec<(Symbol, StateId)>>,
}

impl Lr0Automaton {
    /// Build the automaton for `grammar`.
    ///
    /// States are discovered breadth first from `closure({[S' -> • S]})`
    /// and deduplicated by kernel. Building the same grammar twice yields
    /// the same numbering.
    #[must_use]
    pub fn build(grammar: &Grammar) -> Self {
        let (grammar, start_production) = grammar.augmented();
        let start = ItemSet::closure(vec![Item::new(start_production, 0)], &grammar);

        let mut index: HashMap<Vec<Item>, StateId, ahash::RandomState> = HashMap::default();
        index.insert(start.kernel().to_vec(), 0);
        let mut states = vec![start];
        let mut transitions: Vec<Vec<(Symbol, StateId)>> = vec![Vec::new()];

        let mut current = 0;
        while current < states.len() {
            for (symbol, kernel) in states[current].successors(&grammar) {
                let next = ItemSet::closure(kernel, &grammar);
                let target = match index.get(next.kernel()) {
                    Some(&existing) => existing,
                    None => {
                        let id = states.len();
                        index.insert(next.kernel().to_vec(), id);
                        states.push(next);
                        transitions.push(Vec::new());
                        id
                    }
                };
                transitions[current].push((symbol, target));
            }
            transitions[current].sort_unstable();
            current += 1;
        }

        let automaton = Self {
            grammar,
            start_production,
            states,
            transitions,
        };
        debug!(
            states = automaton.state_count(),
            transitions = automaton.transition_count(),
            "built LR(0) automaton"
        );
        automaton
    }

    /// The augmented grammar.
    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// The production `S' -> S` added by augmentation.
    #[must_use]
    pub const fn start_production(&self) -> ProductionId {
        self.start_production
    }

    /// All item sets, indexed by state id.
    #[must_use]
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    /// The item set of state `id`.
    #[must_use]
    pub fn state(&self, id: StateId) -> &ItemSet {
        &self.states[id]
    }

    /// Number of states.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// The goto function. `None` when the transition does not exist.
    #[must_use]
    pub fn goto(&self, state: StateId, symbol: Symbol) -> Option<StateId> {
        let edges = &self.transitions[state];
        edges
            .binary_search_by_key(&symbol, |&(symbol, _)| symbol)
            .ok()
            .map(|found| edges[found].1)
    }

    /// Outgoing transitions of `state`, sorted by symbol.
    #[must_use]
    pub fn transitions_from(&self, state: StateId) -> &[(Symbol, StateId)] {
        &self.transitions[state]
    }

    /// Every transition as `(from, symbol, to)`, ordered by source state.
    pub fn transitions(&self) -> impl Iterator<Item = (StateId, Symbol, StateId)> + '_ {
        self.transitions
            .iter()
            .enumerate()
            .flat_map(|(from, edges)| edges.iter().map(move |&(symbol, to)| (from, symbol, to)))
    }

    /// Number of goto edges over terminals and nonterminals.
    #[must_use]
    pub fn transition_count(&self) -> usize {
        self.transitions.iter().map(Vec::len).sum()
    }
}
