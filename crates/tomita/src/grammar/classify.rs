//! Structural facts about a grammar: epsilon rules, left recursion and cycles.
//!
//! Both recursion checks build a digraph over nonterminals and ask which
//! nodes reach themselves. For left recursion there is an edge `A -> B` when
//! some production `A -> α B β` has a nullable `α`. For cycles (`A =>+ A`)
//! the edge additionally requires `β` to be nullable, so the production can
//! rewrite `A` to `B` alone.

use super::{Grammar, NonTerminalId, Symbol};

/// Classification of a grammar, as reported by [`Grammar::classify`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarClass {
    /// Whether any production has an empty body.
    pub has_empty_rules: bool,
    /// Nonterminals `A` with `A =>+ A γ`.
    pub left_recursive: Vec<NonTerminalId>,
    /// Nonterminals `A` with `A =>+ A`.
    pub cyclic: Vec<NonTerminalId>,
}

impl GrammarClass {
    pub(crate) fn of(grammar: &Grammar) -> Self {
        let has_empty_rules = grammar.productions().iter().any(|p| p.is_epsilon());
        let left_edges = edges(grammar, false);
        let unit_edges = edges(grammar, true);
        Self {
            has_empty_rules,
            left_recursive: self_reaching(&left_edges),
            cyclic: self_reaching(&unit_edges),
        }
    }

    /// Whether any nonterminal is left recursive.
    #[must_use]
    pub fn is_left_recursive(&self) -> bool {
        !self.left_recursive.is_empty()
    }

    /// Whether any nonterminal derives itself alone.
    #[must_use]
    pub fn is_cyclic(&self) -> bool {
        !self.cyclic.is_empty()
    }
}

fn edges(grammar: &Grammar, whole_body: bool) -> Vec<Vec<usize>> {
    let mut edges = vec![Vec::new(); grammar.non_terminal_count()];
    for production in grammar.productions() {
        let body = production.body();
        for (position, &symbol) in body.iter().enumerate() {
            let Symbol::NonTerminal(target) = symbol else {
                break;
            };
            let rest_nullable = !whole_body
                || body[position + 1..]
                    .iter()
                    .all(|&symbol| grammar.is_nullable(symbol));
            if rest_nullable {
                edges[production.head().index()].push(target.index());
            }
            if !grammar.is_nullable(symbol) {
                break;
            }
        }
    }
    edges
}

fn self_reaching(edges: &[Vec<usize>]) -> Vec<NonTerminalId> {
    let mut result = Vec::new();
    let mut visited = vec![false; edges.len()];
    let mut pending = Vec::new();
    for origin in 0..edges.len() {
        visited.fill(false);
        pending.clear();
        pending.extend(edges[origin].iter().copied());
        while let Some(node) = pending.pop() {
            if node == origin {
                result.push(NonTerminalId::new(origin));
                break;
            }
            if !std::mem::replace(&mut visited[node], true) {
                pending.extend(edges[node].iter().copied());
            }
        }
    }
    result
}
