//! # Grammar Analysis
//!
//! Fixpoint computation of the nullable set, FIRST sets and FOLLOW sets.
//!
//! ## Overview
//!
//! All three relations are mutually recursive over the productions, and
//! grammars may be cyclic, so each is computed by repeated passes over the
//! production list until a full pass changes nothing. Every set only grows
//! and is bounded by the terminal alphabet, which bounds the number of
//! passes. Nothing here recurses on derivation depth.
//!
//! The results live in [`GrammarSets`], computed once when a
//! [`Grammar`](super::Grammar) is built and owned by it.

use std::collections::BTreeSet;

#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};

use super::{Lookahead, NonTerminalId, Production, Symbol, TerminalId};

/// Nullable, FIRST and FOLLOW facts for every nonterminal of a grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct GrammarSets {
    nullable: Vec<bool>,
    first: Vec<BTreeSet<TerminalId>>,
    follow: Vec<BTreeSet<Lookahead>>,
}

/// FIRST set of a symbol string together with its nullability.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceFirst {
    pub terminals: BTreeSet<TerminalId>,
    /// Whether the whole string can derive the empty string.
    pub nullable: bool,
}

impl GrammarSets {
    /// Compute all sets for `productions` over `non_terminal_count` nonterminals.
    #[must_use]
    pub fn compute(
        non_terminal_count: usize,
        productions: &[Production],
        start: NonTerminalId,
    ) -> Self {
        let nullable = compute_nullable(non_terminal_count, productions);
        let first = compute_first(non_terminal_count, productions, &nullable);
        let mut sets = Self {
            nullable,
            first,
            follow: Vec::new(),
        };
        sets.follow = sets.compute_follow(non_terminal_count, productions, start);
        sets
    }

    /// Whether `symbol` derives the empty string. Terminals never do.
    #[must_use]
    pub fn is_nullable(&self, symbol: Symbol) -> bool {
        match symbol {
            Symbol::Terminal(_) => false,
            Symbol::NonTerminal(nt) => self.nullable[nt.index()],
        }
    }

    /// Terminals that can begin a string derived from `nt`.
    #[must_use]
    pub fn first(&self, nt: NonTerminalId) -> &BTreeSet<TerminalId> {
        &self.first[nt.index()]
    }

    /// Lookaheads that can immediately follow `nt` in a sentential form.
    #[must_use]
    pub fn follow(&self, nt: NonTerminalId) -> &BTreeSet<Lookahead> {
        &self.follow[nt.index()]
    }

    /// Every nullable nonterminal, in index order.
    pub fn nullable_non_terminals(&self) -> impl Iterator<Item = NonTerminalId> + '_ {
        self.nullable
            .iter()
            .enumerate()
            .filter(|(_, nullable)| **nullable)
            .map(|(index, _)| NonTerminalId::new(index))
    }

    /// FIRST of a symbol string, propagated through nullable prefixes.
    ///
    /// The empty string has an empty FIRST set and is nullable.
    #[must_use]
    pub fn first_of(&self, symbols: &[Symbol]) -> SequenceFirst {
        let mut result = SequenceFirst::default();
        for &symbol in symbols {
            match symbol {
                Symbol::Terminal(t) => {
                    result.terminals.insert(t);
                    return result;
                }
                Symbol::NonTerminal(nt) => {
                    result.terminals.extend(self.first[nt.index()].iter().copied());
                    if !self.nullable[nt.index()] {
                        return result;
                    }
                }
            }
        }
        result.nullable = true;
        result
    }

    fn compute_follow(
        &self,
        non_terminal_count: usize,
        productions: &[Production],
        start: NonTerminalId,
    ) -> Vec<BTreeSet<Lookahead>> {
        let mut follow = vec![BTreeSet::new(); non_terminal_count];
        follow[start.index()].insert(Lookahead::End);

        let mut changed = true;
        while changed {
            changed = false;
            for production in productions {
                let body = production.body();
                for (position, &symbol) in body.iter().enumerate() {
                    let Symbol::NonTerminal(nt) = symbol else {
                        continue;
                    };
                    let rest = self.first_of(&body[position + 1..]);
                    let target = &mut follow[nt.index()];
                    let before = target.len();
                    target.extend(rest.terminals.into_iter().map(Lookahead::Terminal));
                    changed |= target.len() != before;

                    if rest.nullable && nt != production.head() {
                        let inherited = follow[production.head().index()].clone();
                        let target = &mut follow[nt.index()];
                        let before = target.len();
                        target.extend(inherited);
                        changed |= target.len() != before;
                    }
                }
            }
        }
        follow
    }
}

fn compute_nullable(non_terminal_count: usize, productions: &[Production]) -> Vec<bool> {
    let mut nullable = vec![false; non_terminal_count];
    let mut changed = true;
    while changed {
        changed = false;
        for production in productions {
            let head = production.head().index();
            if nullable[head] {
                continue;
            }
            let derives_empty = production.body().iter().all(|symbol| match symbol {
                Symbol::Terminal(_) => false,
                Symbol::NonTerminal(nt) => nullable[nt.index()],
            });
            if derives_empty {
                nullable[head] = true;
                changed = true;
            }
        }
    }
    nullable
}

fn compute_first(
    non_terminal_count: usize,
    productions: &[Production],
    nullable: &[bool],
) -> Vec<BTreeSet<TerminalId>> {
    let mut first: Vec<BTreeSet<TerminalId>> = vec![BTreeSet::new(); non_terminal_count];
    let mut changed = true;
    while changed {
        changed = false;
        for production in productions {
            let head = production.head().index();
            for &symbol in production.body() {
                match symbol {
                    Symbol::Terminal(t) => {
                        changed |= first[head].insert(t);
                        break;
                    }
                    Symbol::NonTerminal(nt) => {
                        if nt.index() != head {
                            let from = first[nt.index()].clone();
                            let before = first[head].len();
                            first[head].extend(from);
                            changed |= first[head].len() != before;
                        }
                        if !nullable[nt.index()] {
                            break;
                        }
                    }
                }
            }
        }
    }
    first
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Grammar, Lookahead};

    fn expression_grammar() -> Grammar {
        Grammar::builder()
            .terminals(["+", "*", "(", ")", "id"])
            .rule("E", ["T", "E'"])
            .rule("E'", ["+", "T", "E'"])
            .epsilon("E'")
            .rule("T", ["F", "T'"])
            .rule("T'", ["*", "F", "T'"])
            .epsilon("T'")
            .rule("F", ["(", "E", ")"])
            .rule("F", ["id"])
            .build()
            .unwrap()
    }

    fn terminal_names(grammar: &Grammar, nt: &str) -> Vec<String> {
        let nt = grammar.non_terminal(nt).unwrap();
        grammar
            .first(nt)
            .iter()
            .map(|t| grammar.terminal_name(*t).to_string())
            .collect()
    }

    fn follow_names(grammar: &Grammar, nt: &str) -> Vec<String> {
        let nt = grammar.non_terminal(nt).unwrap();
        grammar
            .follow(nt)
            .iter()
            .map(|la| grammar.lookahead_name(*la).to_string())
            .collect()
    }

    #[test]
    fn test_nullable() {
        let grammar = expression_grammar();
        let nullable: Vec<_> = grammar
            .sets()
            .nullable_non_terminals()
            .map(|nt| grammar.non_terminal_name(nt).to_string())
            .collect();
        assert_eq!(nullable, vec!["E'", "T'"]);
    }

    #[test]
    fn test_first_sets() {
        let grammar = expression_grammar();
        assert_eq!(terminal_names(&grammar, "E"), vec!["(", "id"]);
        assert_eq!(terminal_names(&grammar, "E'"), vec!["+"]);
        assert_eq!(terminal_names(&grammar, "T'"), vec!["*"]);
    }

    #[test]
    fn test_follow_sets() {
        let grammar = expression_grammar();
        assert_eq!(follow_names(&grammar, "E"), vec![")", "$"]);
        assert_eq!(follow_names(&grammar, "T"), vec!["+", ")", "$"]);
        assert_eq!(follow_names(&grammar, "F"), vec!["+", "*", ")", "$"]);
    }

    #[test]
    fn test_first_of_sequence_through_nullable_prefix() {
        let grammar = expression_grammar();
        let e_prime = grammar.symbol("E'").unwrap();
        let t_prime = grammar.symbol("T'").unwrap();
        let seq = grammar.first_of(&[e_prime, t_prime]);
        assert!(seq.nullable);
        assert_eq!(seq.terminals.len(), 2);
        let empty = grammar.first_of(&[]);
        assert!(empty.nullable);
        assert!(empty.terminals.is_empty());
    }

    #[test]
    fn test_cyclic_grammar_terminates() {
        let grammar = Grammar::builder()
            .terminal("a")
            .rule("S", ["S"])
            .rule("S", ["S", "S"])
            .rule("S", ["a"])
            .epsilon("S")
            .build()
            .unwrap();
        let s = grammar.start();
        assert!(grammar.is_nullable(s.into()));
        assert_eq!(grammar.first(s).len(), 1);
        let follow = grammar.follow(s);
        assert!(follow.contains(&Lookahead::End));
        assert_eq!(follow.len(), 2);
    }
}
