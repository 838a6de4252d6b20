//! Earley recognizer used as ground truth for the LR machinery.
//!
//! Shares nothing with the automaton or the table: it works straight from
//! the productions, so agreement between the two is a meaningful check.
//! Nullable nonterminals are handled by advancing over them at prediction
//! time, which covers completions of empty spans inside the current set.

use hashbrown::HashSet;

use crate::grammar::{Grammar, ProductionId, Symbol, TerminalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct ItemKey {
    production: ProductionId,
    dot: usize,
    start: usize,
}

#[derive(Default)]
struct ItemSet {
    items: Vec<ItemKey>,
    seen: HashSet<ItemKey, ahash::RandomState>,
}

impl ItemSet {
    fn add(&mut self, item: ItemKey) {
        if self.seen.insert(item) {
            self.items.push(item);
        }
    }
}

/// Membership test for `L(G)` by Earley's algorithm.
pub struct EarleyRecognizer<'g> {
    grammar: &'g Grammar,
}

impl<'g> EarleyRecognizer<'g> {
    /// A recognizer for `grammar`.
    #[must_use]
    pub const fn new(grammar: &'g Grammar) -> Self {
        Self { grammar }
    }

    /// Whether `input` derives from the start symbol.
    #[must_use]
    pub fn recognizes(&self, input: &[TerminalId]) -> bool {
        let grammar = self.grammar;
        let mut chart: Vec<ItemSet> = (0..=input.len()).map(|_| ItemSet::default()).collect();
        for &production in grammar.production_ids_for(grammar.start()) {
            chart[0].add(ItemKey {
                production,
                dot: 0,
                start: 0,
            });
        }

        for position in 0..=input.len() {
            let mut index = 0;
            while index < chart[position].items.len() {
                let item = chart[position].items[index];
                index += 1;
                let body = grammar.production(item.production).body();
                match body.get(item.dot) {
                    None => {
                        let head = Symbol::NonTerminal(grammar.production(item.production).head());
                        let waiting: Vec<ItemKey> = chart[item.start]
                            .items
                            .iter()
                            .filter(|parent| {
                                grammar.production(parent.production).body().get(parent.dot)
                                    == Some(&head)
                            })
                            .map(|parent| ItemKey {
                                dot: parent.dot + 1,
                                ..*parent
                            })
                            .collect();
                        for parent in waiting {
                            chart[position].add(parent);
                        }
                    }
                    Some(&Symbol::NonTerminal(nt)) => {
                        for &production in grammar.production_ids_for(nt) {
                            chart[position].add(ItemKey {
                                production,
                                dot: 0,
                                start: position,
                            });
                        }
                        if grammar.is_nullable(Symbol::NonTerminal(nt)) {
                            chart[position].add(ItemKey {
                                dot: item.dot + 1,
                                ..item
                            });
                        }
                    }
                    Some(&Symbol::Terminal(terminal)) => {
                        if input.get(position) == Some(&terminal) {
                            chart[position + 1].add(ItemKey {
                                dot: item.dot + 1,
                                ..item
                            });
                        }
                    }
                }
            }
        }

        chart[input.len()].items.iter().any(|item| {
            let production = grammar.production(item.production);
            item.start == 0 && production.head() == grammar.start() && item.dot == production.len()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terminals(grammar: &Grammar, names: &[&str]) -> Vec<TerminalId> {
        names.iter().map(|name| grammar.terminal(name).unwrap()).collect()
    }

    #[test]
    fn test_palindrome_membership() {
        let grammar = Grammar::builder()
            .terminal("a")
            .rule("S", ["a", "S", "a"])
            .rule("S", ["a"])
            .build()
            .unwrap();
        let oracle = EarleyRecognizer::new(&grammar);
        assert!(oracle.recognizes(&terminals(&grammar, &["a"])));
        assert!(oracle.recognizes(&terminals(&grammar, &["a", "a", "a"])));
        assert!(!oracle.recognizes(&terminals(&grammar, &["a", "a"])));
        assert!(!oracle.recognizes(&[]));
    }

    #[test]
    fn test_nullable_completion_in_same_set() {
        let grammar = Grammar::builder()
            .terminals(["x", "b"])
            .rule("S", ["M", "N"])
            .rule("M", ["A", "M", "b"])
            .rule("M", ["x"])
            .rule("N", ["b", "N", "A"])
            .rule("N", ["x"])
            .epsilon("A")
            .build()
            .unwrap();
        let oracle = EarleyRecognizer::new(&grammar);
        assert!(oracle.recognizes(&terminals(&grammar, &["x", "b", "b", "x"])));
        assert!(oracle.recognizes(&terminals(&grammar, &["x", "x"])));
        assert!(!oracle.recognizes(&terminals(&grammar, &["x", "b"])));
    }

    #[test]
    fn test_empty_input_with_nullable_start() {
        let grammar = Grammar::builder()
            .terminal("a")
            .rule("S", ["S", "S"])
            .rule("S", ["a"])
            .epsilon("S")
            .build()
            .unwrap();
        let oracle = EarleyRecognizer::new(&grammar);
        assert!(oracle.recognizes(&[]));
        assert!(oracle.recognizes(&terminals(&grammar, &["a", "a", "a"])));
    }
}
