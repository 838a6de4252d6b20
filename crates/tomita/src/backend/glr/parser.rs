//! GLR driver: one generation of the graph-structured stack per input position.
//!
//! For each input symbol the session
//!
//! 1. applies every reduce action of every frontier node along every stack
//!    path, repeating full passes until a pass adds no edge to an existing
//!    node (nodes created during a pass are visited in that same pass),
//! 2. then shifts the symbol from every frontier node that can, which opens
//!    the next generation.
//!
//! Nodes are merged per automaton state within a generation and forest nodes
//! per (nonterminal, span), so the work per position is bounded even when
//! epsilon reductions loop back to the state they started from.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::GlrConfig;
use super::forest::{ForestBuilder, ParseForest};
use super::stack::{GraphStack, GssNodeId};
use crate::backend::lr::{Action, SlrTable, StateId};
use crate::error::{NoParseError, ParseError};
use crate::grammar::{Lookahead, ProductionId, TerminalId};

/// Where a parse currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseStatus {
    /// At least one stack is alive and more input may follow.
    Running,
    /// The input was finished and some stack accepted it.
    Accepted,
    /// Every stack died.
    Rejected,
}

/// Counters collected during one parse.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParseMetrics {
    pub tokens_consumed: usize,
    pub gss_nodes: usize,
    pub gss_edges: usize,
    pub forest_nodes: usize,
    /// Reduction paths applied, counting repeats across fixpoint passes.
    pub reductions: usize,
    pub parse_time: Duration,
}

/// An in-progress parse fed one terminal at a time.
///
/// Obtained from [`GlrParser::session`](super::GlrParser::session). Dropping
/// a session between calls abandons the parse.
///
/// ```rust
/// use tomita::backend::glr::{GlrParser, ParseStatus};
/// use tomita::grammar::Grammar;
///
/// let grammar = Grammar::builder()
///     .terminal("a")
///     .rule("S", ["a", "S", "a"])
///     .rule("S", ["a"])
///     .build()
///     .unwrap();
/// let parser = GlrParser::new(&grammar);
/// let a = grammar.terminal("a").unwrap();
///
/// let mut session = parser.session();
/// for _ in 0..3 {
///     session.push(a).unwrap();
/// }
/// let forest = session.finish().unwrap();
/// assert_eq!(session.status(), ParseStatus::Accepted);
/// assert_eq!(forest.trees(10).len(), 1);
/// ```
pub struct ParseSession<'t> {
    table: &'t SlrTable,
    config: &'t GlrConfig,
    stack: GraphStack,
    forest: ForestBuilder,
    position: usize,
    status: ParseStatus,
    failure: Option<ParseError>,
    reductions: usize,
    forest_nodes: usize,
    started: Instant,
    elapsed: Option<Duration>,
}

impl<'t> ParseSession<'t> {
    pub(crate) fn new(table: &'t SlrTable, config: &'t GlrConfig) -> Self {
        Self {
            table,
            config,
            stack: GraphStack::new(0),
            forest: ForestBuilder::default(),
            position: 0,
            status: ParseStatus::Running,
            failure: None,
            reductions: 0,
            forest_nodes: 0,
            started: Instant::now(),
            elapsed: None,
        }
    }

    /// Number of terminals consumed so far.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Whether the parse is still running, accepted or rejected.
    #[must_use]
    pub const fn status(&self) -> ParseStatus {
        self.status
    }

    /// Automaton states on top of the live stacks.
    #[must_use]
    pub fn frontier_states(&self) -> Vec<StateId> {
        self.stack
            .frontier()
            .iter()
            .map(|&node| self.stack.node(node).state())
            .collect()
    }

    /// Lookaheads some live stack has an action for.
    #[must_use]
    pub fn expected(&self) -> Vec<Lookahead> {
        let mut expected = BTreeSet::new();
        for state in self.frontier_states() {
            expected.extend(self.table.expected(state));
        }
        expected.into_iter().collect()
    }

    /// Counters gathered so far. Timing stops once the parse ends.
    #[must_use]
    pub fn metrics(&self) -> ParseMetrics {
        ParseMetrics {
            tokens_consumed: self.position,
            gss_nodes: self.stack.len(),
            gss_edges: self.stack.edge_count(),
            forest_nodes: self.forest_nodes.max(self.forest.len()),
            reductions: self.reductions,
            parse_time: self.elapsed.unwrap_or_else(|| self.started.elapsed()),
        }
    }

    /// Consume the next input terminal.
    ///
    /// # Errors
    ///
    /// [`ParseError::NoParse`] when no stack can shift `terminal`, and
    /// [`ParseError::TerminalOutOfRange`] when `terminal` does not belong to
    /// the grammar. After any error the session is [`ParseStatus::Rejected`]
    /// and keeps returning the same error.
    pub fn push(&mut self, terminal: TerminalId) -> Result<(), ParseError> {
        self.ensure_running()?;
        let terminal_count = self.table.grammar().terminal_count();
        if terminal.index() >= terminal_count {
            return Err(self.fail(ParseError::TerminalOutOfRange {
                index: terminal.index(),
                terminal_count,
                position: self.position,
            }));
        }
        trace!(
            position = self.position,
            frontier = self.stack.frontier().len(),
            terminal = self.table.grammar().terminal_name(terminal),
            "next input symbol"
        );
        if let Err(err) = self.reduce_all(Lookahead::Terminal(terminal)) {
            return Err(self.fail(err));
        }
        match self.shift_all(terminal) {
            Ok(true) => Ok(()),
            Ok(false) => Err(self.reject(Some(terminal))),
            Err(err) => Err(self.fail(err)),
        }
    }

    /// Signal end of input and collect the parse forest.
    ///
    /// # Errors
    ///
    /// [`ParseError::NoParse`] when no stack accepts, or
    /// [`ParseError::Finished`] when called twice.
    pub fn finish(&mut self) -> Result<ParseForest, ParseError> {
        self.ensure_running()?;
        if let Err(err) = self.reduce_all(Lookahead::End) {
            return Err(self.fail(err));
        }

        let table = self.table;
        let root = self.stack.root();
        let accepted = self
            .stack
            .frontier()
            .iter()
            .filter(|&&node| {
                table
                    .actions(self.stack.node(node).state(), Lookahead::End)
                    .contains(&Action::Accept)
            })
            .flat_map(|&node| self.stack.node(node).predecessors())
            .find(|edge| edge.target == root)
            .map(|edge| edge.label);
        let Some(label) = accepted else {
            return Err(self.reject(None));
        };

        self.status = ParseStatus::Accepted;
        self.forest_nodes = self.forest.len();
        self.elapsed = Some(self.started.elapsed());
        let forest = std::mem::take(&mut self.forest).finish(label);
        debug!(
            position = self.position,
            gss_nodes = self.stack.len(),
            forest_nodes = forest.len(),
            "input accepted"
        );
        Ok(forest)
    }

    fn ensure_running(&self) -> Result<(), ParseError> {
        match self.status {
            ParseStatus::Running => Ok(()),
            ParseStatus::Rejected => Err(self.failure.clone().unwrap_or(ParseError::Finished)),
            ParseStatus::Accepted => Err(ParseError::Finished),
        }
    }

    fn fail(&mut self, err: ParseError) -> ParseError {
        self.status = ParseStatus::Rejected;
        self.elapsed = Some(self.started.elapsed());
        self.failure = Some(err.clone());
        err
    }

    fn reject(&mut self, found: Option<TerminalId>) -> ParseError {
        let table = self.table;
        let grammar = table.grammar();
        let err = NoParseError {
            position: self.position,
            found: found.map(|terminal| grammar.terminal_name(terminal).into()),
            expected: self
                .expected()
                .into_iter()
                .map(|lookahead| grammar.lookahead_name(lookahead).into())
                .collect(),
        };
        debug!(position = self.position, "input rejected");
        self.fail(err.into())
    }

    /// Run every reduction at the current position to a fixpoint.
    fn reduce_all(&mut self, lookahead: Lookahead) -> Result<(), ParseError> {
        let table = self.table;
        loop {
            let mut grew = false;
            let mut index = 0;
            while index < self.stack.frontier().len() {
                let node = self.stack.frontier()[index];
                let state = self.stack.node(node).state();
                for action in table.actions(state, lookahead) {
                    if let Action::Reduce(production) = *action {
                        grew |= self.reduce(node, production)?;
                    }
                }
                index += 1;
            }
            if !grew {
                return Ok(());
            }
        }
    }

    /// Apply `production` along every path below `node`.
    ///
    /// Returns whether an existing frontier node gained an edge, which can
    /// open paths for nodes already visited in this pass.
    fn reduce(&mut self, node: GssNodeId, production: ProductionId) -> Result<bool, ParseError> {
        let table = self.table;
        let rule = table.grammar().production(production);
        let head = rule.head();
        let end = self.position;

        let mut grew = false;
        for path in self.stack.paths(node, rule.len()) {
            let ancestor = self.stack.node(path.ancestor);
            let (ancestor_state, start) = (ancestor.state(), ancestor.generation());
            let Some(target) = table.goto(ancestor_state, head) else {
                unreachable!(
                    "no goto on `{}` from state {ancestor_state}",
                    table.grammar().non_terminal_name(head)
                );
            };

            let label = self.forest.symbol(head, start, end);
            self.forest.add_alternative(label, production, path.labels);
            self.reductions += 1;
            trace!(
                production = production.index(),
                start,
                end,
                target,
                "reduce"
            );

            match self.stack.find_in_frontier(target) {
                Some(existing) => grew |= self.stack.add_edge(existing, path.ancestor, label),
                None => {
                    let created = self.new_node(target)?;
                    self.stack.add_edge(created, path.ancestor, label);
                }
            }
        }
        Ok(grew)
    }

    /// Shift `terminal` from every frontier node that can. Returns `false`
    /// without touching the stack when none can.
    fn shift_all(&mut self, terminal: TerminalId) -> Result<bool, ParseError> {
        let table = self.table;
        let lookahead = Lookahead::Terminal(terminal);
        let shifts: Vec<(GssNodeId, StateId)> = self
            .stack
            .frontier()
            .iter()
            .flat_map(|&node| {
                table
                    .actions(self.stack.node(node).state(), lookahead)
                    .iter()
                    .filter_map(move |action| match *action {
                        Action::Shift(target) => Some((node, target)),
                        Action::Reduce(_) | Action::Accept => None,
                    })
            })
            .collect();
        if shifts.is_empty() {
            return Ok(false);
        }

        let leaf = self.forest.leaf(terminal, self.position);
        self.stack.advance();
        for (from, target) in shifts {
            let next = match self.stack.find_in_frontier(target) {
                Some(existing) => existing,
                None => self.new_node(target)?,
            };
            self.stack.add_edge(next, from, leaf);
        }
        self.position += 1;
        Ok(true)
    }

    fn new_node(&mut self, state: StateId) -> Result<GssNodeId, ParseError> {
        if let Some(limit) = self.config.max_gss_nodes
            && self.stack.len() >= limit
        {
            return Err(ParseError::LimitExceeded {
                limit,
                position: self.position,
            });
        }
        Ok(self.stack.push_node(state))
    }
}
