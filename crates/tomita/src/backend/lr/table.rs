use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::fmt;

use hashbrown::HashMap;
use hashbrown::hash_map::Entry;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::{debug, trace};

use super::automaton::{Lr0Automaton, StateId};
use crate::grammar::{Grammar, Lookahead, NonTerminalId, ProductionId, Symbol};

/// LR parsing action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum Action {
    /// Shift to state
    Shift(StateId),
    /// Reduce using production
    Reduce(ProductionId),
    /// Accept (successful parse)
    Accept,
}

impl Action {
    /// Shift the lookahead and enter `state`.
    #[must_use]
    pub const fn shift(state: StateId) -> Self {
        Self::Shift(state)
    }

    /// Reduce by `production`.
    #[must_use]
    pub const fn reduce(production: ProductionId) -> Self {
        Self::Reduce(production)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shift(state) => write!(f, "sh{state}"),
            Self::Reduce(production) => write!(f, "re{}", production.index()),
            Self::Accept => f.write_str("acc"),
        }
    }
}

/// The contents of one action-table cell. Empty means syntax error.
pub type ActionSet = SmallVec<[Action; 2]>;

/// A cell holding more than one action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub lookahead: Lookahead,
    pub actions: ActionSet,
}

/// Multi-valued SLR(1) action table with its goto table.
///
/// Conflicts are kept: a cell may hold a shift and several reduces, or
/// several reduces. Choosing among them is left to the GLR engine.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct SlrTable {
    automaton: Lr0Automaton,
    /// Terminals plus the end marker.
    columns: usize,
    /// `state * columns + column`
    actions: Vec<ActionSet>,
    /// `state * non_terminal_count + non_terminal`
    gotos: Vec<Option<StateId>>,
}

impl SlrTable {
    /// Build the LR(0) automaton for `grammar` and its SLR(1) table.
    #[must_use]
    pub fn from_grammar(grammar: &Grammar) -> Self {
        Self::build(Lr0Automaton::build(grammar))
    }

    /// Fill the table from an automaton and the FOLLOW sets of its grammar.
    ///
    /// Never fails. States with no viable action simply have empty cells.
    #[must_use]
    pub fn build(automaton: Lr0Automaton) -> Self {
        let grammar = automaton.grammar();
        let columns = grammar.terminal_count() + 1;
        let non_terminals = grammar.non_terminal_count();
        let mut actions = vec![ActionSet::new(); automaton.state_count() * columns];
        let mut gotos = vec![None; automaton.state_count() * non_terminals];

        for state in 0..automaton.state_count() {
            let row = state * columns;
            for &(symbol, to) in automaton.transitions_from(state) {
                match symbol {
                    Symbol::Terminal(t) => add(&mut actions[row + t.index()], Action::Shift(to)),
                    Symbol::NonTerminal(nt) => gotos[state * non_terminals + nt.index()] = Some(to),
                }
            }

            for item in automaton.state(state).complete_items(grammar) {
                let production = item.production();
                if production == automaton.start_production() {
                    add(&mut actions[row + columns - 1], Action::Accept);
                    continue;
                }
                let head = grammar.production(production).head();
                for &lookahead in grammar.follow(head) {
                    add(
                        &mut actions[row + column(lookahead, columns)],
                        Action::Reduce(production),
                    );
                }
            }
        }

        let table = Self {
            automaton,
            columns,
            actions,
            gotos,
        };
        let conflicts = table.conflicts();
        for conflict in &conflicts {
            trace!(
                state = conflict.state,
                lookahead = table.grammar().lookahead_name(conflict.lookahead),
                actions = conflict.actions.len(),
                "conflicting cell"
            );
        }
        debug!(
            states = table.state_count(),
            conflicts = conflicts.len(),
            "built SLR(1) table"
        );
        table
    }

    /// The LR(0) automaton the table was built from.
    #[must_use]
    pub const fn automaton(&self) -> &Lr0Automaton {
        &self.automaton
    }

    /// The augmented grammar the table was built for.
    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        self.automaton.grammar()
    }

    /// Number of rows.
    #[must_use]
    pub fn state_count(&self) -> usize {
        self.automaton.state_count()
    }

    /// All actions for `state` on `lookahead`.
    #[must_use]
    pub fn actions(&self, state: StateId, lookahead: Lookahead) -> &[Action] {
        &self.actions[state * self.columns + column(lookahead, self.columns)]
    }

    /// The state entered after reducing to `nt` with `state` exposed.
    #[must_use]
    pub fn goto(&self, state: StateId, nt: NonTerminalId) -> Option<StateId> {
        self.gotos[state * self.grammar().non_terminal_count() + nt.index()]
    }

    /// Lookaheads for which `state` has at least one action.
    pub fn expected(&self, state: StateId) -> impl Iterator<Item = Lookahead> + '_ {
        self.grammar()
            .lookaheads()
            .filter(move |&lookahead| !self.actions(state, lookahead).is_empty())
    }

    /// Every non-empty cell, row by row.
    pub fn cells(&self) -> impl Iterator<Item = (StateId, Lookahead, &[Action])> + '_ {
        (0..self.state_count()).flat_map(move |state| {
            self.grammar().lookaheads().filter_map(move |lookahead| {
                let actions = self.actions(state, lookahead);
                (!actions.is_empty()).then_some((state, lookahead, actions))
            })
        })
    }

    /// Cells holding more than one action.
    #[must_use]
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.cells()
            .filter(|(_, _, actions)| actions.len() > 1)
            .map(|(state, lookahead, actions)| Conflict {
                state,
                lookahead,
                actions: actions.iter().copied().collect(),
            })
            .collect()
    }

    /// Whether every cell holds at most one action, i.e. the grammar is SLR(1).
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.actions.iter().all(|cell| cell.len() <= 1)
    }

    /// Whether `other` drives the same parser up to state numbering.
    ///
    /// Symbols and productions are matched by name, so two grammars that only
    /// differ in declaration order give equivalent tables. States are paired
    /// by walking both automata from their initial states in lockstep; the
    /// walk fails as soon as a pairing is inconsistent or two paired rows
    /// reduce differently.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        let (ours, theirs) = (self.grammar(), other.grammar());
        if self.state_count() != other.state_count()
            || self.symbol_names() != other.symbol_names()
        {
            return false;
        }

        let symbols: Vec<(Symbol, Symbol)> = self
            .visible_symbols()
            .filter_map(|symbol| Some((symbol, theirs.symbol(ours.symbol_name(symbol))?)))
            .collect();
        let mut mapping: HashMap<StateId, StateId, ahash::RandomState> = HashMap::default();
        mapping.insert(0, 0);
        let mut queue = VecDeque::from([(0, 0)]);

        while let Some((state, twin)) = queue.pop_front() {
            if self.reductions(state) != other.reductions(twin) {
                trace!(state, twin, "rows reduce differently");
                return false;
            }
            for &(symbol, mirrored) in &symbols {
                match (
                    self.automaton.goto(state, symbol),
                    other.automaton.goto(twin, mirrored),
                ) {
                    (None, None) => {}
                    (Some(to), Some(twin_to)) => match mapping.entry(to) {
                        Entry::Occupied(entry) if *entry.get() != twin_to => return false,
                        Entry::Occupied(_) => {}
                        Entry::Vacant(entry) => {
                            entry.insert(twin_to);
                            queue.push_back((to, twin_to));
                        }
                    },
                    _ => return false,
                }
            }
        }
        true
    }

    /// The nonterminal introduced by augmentation.
    fn augmented_start(&self) -> NonTerminalId {
        self.grammar()
            .production(self.automaton.start_production())
            .head()
    }

    /// Terminals, then nonterminals without the augmented start.
    fn visible_symbols(&self) -> impl Iterator<Item = Symbol> + '_ {
        let start = self.augmented_start();
        let grammar = self.grammar();
        grammar.terminals().map(Symbol::Terminal).chain(
            grammar
                .non_terminals()
                .filter(move |&nt| nt != start)
                .map(Symbol::NonTerminal),
        )
    }

    /// Terminal names and nonterminal names, augmented start excluded.
    fn symbol_names(&self) -> (BTreeSet<&str>, BTreeSet<&str>) {
        let grammar = self.grammar();
        let mut terminals = BTreeSet::new();
        let mut non_terminals = BTreeSet::new();
        for symbol in self.visible_symbols() {
            let name = grammar.symbol_name(symbol);
            if symbol.is_terminal() {
                terminals.insert(name);
            } else {
                non_terminals.insert(name);
            }
        }
        (terminals, non_terminals)
    }

    /// Reduce and accept actions of a row keyed by lookahead name, with
    /// productions rendered as text. Shifts are compared through goto.
    fn reductions(&self, state: StateId) -> BTreeMap<&str, BTreeSet<String>> {
        let grammar = self.grammar();
        grammar
            .lookaheads()
            .filter_map(|lookahead| {
                let reductions: BTreeSet<String> = self
                    .actions(state, lookahead)
                    .iter()
                    .filter_map(|action| match action {
                        Action::Shift(_) => None,
                        Action::Reduce(production) => {
                            Some(grammar.display_production(*production).to_string())
                        }
                        Action::Accept => Some(action.to_string()),
                    })
                    .collect();
                (!reductions.is_empty()).then(|| (grammar.lookahead_name(lookahead), reductions))
            })
            .collect()
    }
}

/// Renders the table as a padded grid: terminal columns, `$`, then goto
/// columns. Conflicting actions share a cell, separated by commas.
impl fmt::Display for SlrTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let grammar = self.grammar();
        let start = self.augmented_start();
        let goto_columns: Vec<NonTerminalId> =
            grammar.non_terminals().filter(|&nt| nt != start).collect();

        let mut rows = Vec::with_capacity(self.state_count() + 1);
        let mut header = vec![String::new()];
        header.extend(grammar.lookaheads().map(|l| grammar.lookahead_name(l).to_string()));
        header.extend(goto_columns.iter().map(|&nt| grammar.non_terminal_name(nt).to_string()));
        rows.push(header);

        for state in 0..self.state_count() {
            let mut row = vec![state.to_string()];
            row.extend(grammar.lookaheads().map(|lookahead| {
                self.actions(state, lookahead)
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
            }));
            row.extend(goto_columns.iter().map(|&nt| {
                self.goto(state, nt)
                    .map_or_else(String::new, |to| to.to_string())
            }));
            rows.push(row);
        }

        let width = rows.iter().flatten().map(String::len).max().unwrap_or(0).max(7) + 1;
        for (index, row) in rows.iter().enumerate() {
            if index > 0 {
                f.write_str("\n")?;
            }
            let line: String = row.iter().map(|cell| format!("{cell:<width$}")).collect();
            f.write_str(line.trim_end())?;
        }
        Ok(())
    }
}

fn column(lookahead: Lookahead, columns: usize) -> usize {
    match lookahead {
        Lookahead::Terminal(t) => t.index(),
        Lookahead::End => columns - 1,
    }
}

fn add(cell: &mut ActionSet, action: Action) {
    if !cell.contains(&action) {
        cell.push(action);
    }
}
