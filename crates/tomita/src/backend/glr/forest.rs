//! Shared packed parse forest
//!
//! Every nonterminal node stands for one nonterminal over one input span and
//! is created at most once per parse. Each of its packed alternatives is one
//! way to derive that span: a production plus the child nodes for its body.
//! Subtrees are shared between alternatives, so a forest stays polynomial in
//! size while encoding exponentially (or, for cyclic grammars, infinitely)
//! many derivation trees.
//!
//! Cyclic grammars such as `S -> S | a` produce cyclic forests: `S(0,1)` is
//! one of its own children. [`ParseForest::count_trees`] reports those as
//! [`TreeCount::Infinite`], and [`ParseForest::trees`] only yields trees in
//! which no node repeats along a root-to-leaf path.

use std::fmt;

use hashbrown::HashMap;
#[cfg(feature = "serialize")]
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::grammar::{Grammar, NonTerminalId, ProductionId, Symbol, TerminalId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ForestId(usize);

impl ForestId {
    /// Wrap a raw node index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Position of the node in the forest arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// One derivation of a nonterminal node's span.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct PackedAlternative {
    pub production: ProductionId,
    /// One child per body symbol, left to right.
    pub children: SmallVec<[ForestId; 4]>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub enum ForestNode {
    /// A matched input symbol.
    Leaf { terminal: TerminalId, position: usize },
    /// A nonterminal over `start..end` with every way to derive it.
    Symbol {
        non_terminal: NonTerminalId,
        start: usize,
        end: usize,
        alternatives: Vec<PackedAlternative>,
    },
}

impl ForestNode {
    /// The half-open input range this node covers.
    #[must_use]
    pub const fn span(&self) -> (usize, usize) {
        match self {
            Self::Leaf { position, .. } => (*position, *position + 1),
            Self::Symbol { start, end, .. } => (*start, *end),
        }
    }

    /// Packed derivations of this node. Empty for leaves.
    #[must_use]
    pub fn alternatives(&self) -> &[PackedAlternative] {
        match self {
            Self::Leaf { .. } => &[],
            Self::Symbol { alternatives, .. } => alternatives,
        }
    }

    /// Whether more than one derivation is packed here.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.alternatives().len() > 1
    }
}

/// Number of derivation trees a forest encodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TreeCount {
    /// Saturates at `u128::MAX`.
    Finite(u128),
    Infinite,
}

impl TreeCount {
    /// Whether the count is a number rather than unbounded.
    #[must_use]
    pub const fn is_finite(self) -> bool {
        matches!(self, Self::Finite(_))
    }
}

/// Arena the engine grows during a parse.
#[derive(Debug, Default)]
pub(crate) struct ForestBuilder {
    nodes: Vec<ForestNode>,
    symbols: HashMap<(NonTerminalId, usize, usize), ForestId, ahash::RandomState>,
    leaves: HashMap<usize, ForestId, ahash::RandomState>,
}

impl ForestBuilder {
    pub(crate) fn leaf(&mut self, terminal: TerminalId, position: usize) -> ForestId {
        if let Some(&id) = self.leaves.get(&position) {
            return id;
        }
        let id = ForestId(self.nodes.len());
        self.nodes.push(ForestNode::Leaf { terminal, position });
        self.leaves.insert(position, id);
        id
    }

    /// The node for `non_terminal` over `start..end`, created if missing.
    pub(crate) fn symbol(&mut self, non_terminal: NonTerminalId, start: usize, end: usize) -> ForestId {
        let next = ForestId(self.nodes.len());
        let id = *self.symbols.entry((non_terminal, start, end)).or_insert(next);
        if id == next {
            self.nodes.push(ForestNode::Symbol {
                non_terminal,
                start,
                end,
                alternatives: Vec::new(),
            });
        }
        id
    }

    /// Pack another derivation into `node`. Returns `false` for a duplicate.
    pub(crate) fn add_alternative(
        &mut self,
        node: ForestId,
        production: ProductionId,
        children: SmallVec<[ForestId; 4]>,
    ) -> bool {
        let ForestNode::Symbol { alternatives, .. } = &mut self.nodes[node.0] else {
            return false;
        };
        let alternative = PackedAlternative {
            production,
            children,
        };
        if alternatives.contains(&alternative) {
            return false;
        }
        alternatives.push(alternative);
        true
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Keep only the nodes reachable from `root`, renumbered breadth first.
    pub(crate) fn finish(self, root: ForestId) -> ParseForest {
        let mut remap: Vec<Option<ForestId>> = vec![None; self.nodes.len()];
        let mut order = vec![root];
        remap[root.0] = Some(ForestId(0));
        let mut index = 0;
        while index < order.len() {
            for alternative in self.nodes[order[index].0].alternatives() {
                for &child in &alternative.children {
                    if remap[child.0].is_none() {
                        remap[child.0] = Some(ForestId(order.len()));
                        order.push(child);
                    }
                }
            }
            index += 1;
        }

        let renumber = |id: ForestId| remap[id.0].unwrap_or(id);
        let mut slots: Vec<Option<ForestNode>> = self.nodes.into_iter().map(Some).collect();
        let nodes = order
            .iter()
            .filter_map(|old| slots[old.0].take())
            .map(|node| match node {
                ForestNode::Symbol {
                    non_terminal,
                    start,
                    end,
                    alternatives,
                } => ForestNode::Symbol {
                    non_terminal,
                    start,
                    end,
                    alternatives: alternatives
                        .into_iter()
                        .map(|alternative| PackedAlternative {
                            production: alternative.production,
                            children: alternative.children.into_iter().map(renumber).collect(),
                        })
                        .collect(),
                },
                leaf @ ForestNode::Leaf { .. } => leaf,
            })
            .collect();
        ParseForest {
            nodes,
            root: ForestId(0),
        }
    }
}

/// All derivations of one accepted input, packed and shared.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(Serialize, Deserialize))]
pub struct ParseForest {
    nodes: Vec<ForestNode>,
    root: ForestId,
}

impl ParseForest {
    /// The start symbol over the whole input.
    #[must_use]
    pub const fn root(&self) -> ForestId {
        self.root
    }

    /// The node stored under `id`.
    #[must_use]
    pub fn node(&self, id: ForestId) -> &ForestNode {
        &self.nodes[id.0]
    }

    /// Every node reachable from the root, root first.
    #[must_use]
    pub fn nodes(&self) -> &[ForestNode] {
        &self.nodes
    }

    /// Number of nodes, leaves included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the forest holds no nodes. Never true for an accepted parse.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with more than one packed alternative.
    #[must_use]
    pub fn ambiguities(&self) -> Vec<ForestId> {
        (0..self.nodes.len())
            .map(ForestId)
            .filter(|&id| self.node(id).is_ambiguous())
            .collect()
    }

    /// Whether any node packs more than one derivation.
    #[must_use]
    pub fn is_ambiguous(&self) -> bool {
        self.nodes.iter().any(ForestNode::is_ambiguous)
    }

    /// Count the derivation trees below the root.
    ///
    /// Any cycle reachable from the root can be pumped, so it makes the
    /// count infinite. Otherwise counts are summed over alternatives and
    /// multiplied over children in post-order.
    #[must_use]
    pub fn count_trees(&self) -> TreeCount {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Mark {
            New,
            Open,
            Done,
        }

        let mut marks = vec![Mark::New; self.nodes.len()];
        let mut post_order = Vec::with_capacity(self.nodes.len());
        let mut pending = vec![(self.root, false)];
        while let Some((id, exiting)) = pending.pop() {
            if exiting {
                marks[id.0] = Mark::Done;
                post_order.push(id);
                continue;
            }
            match marks[id.0] {
                Mark::Done => continue,
                Mark::Open => return TreeCount::Infinite,
                Mark::New => {}
            }
            marks[id.0] = Mark::Open;
            pending.push((id, true));
            for alternative in self.node(id).alternatives() {
                for &child in &alternative.children {
                    match marks[child.0] {
                        Mark::Open => return TreeCount::Infinite,
                        Mark::New => pending.push((child, false)),
                        Mark::Done => {}
                    }
                }
            }
        }

        let mut counts = vec![0u128; self.nodes.len()];
        for id in post_order {
            counts[id.0] = match self.node(id) {
                ForestNode::Leaf { .. } => 1,
                ForestNode::Symbol { alternatives, .. } => alternatives
                    .iter()
                    .map(|alternative| {
                        alternative
                            .children
                            .iter()
                            .fold(1u128, |acc, child| acc.saturating_mul(counts[child.0]))
                    })
                    .fold(0u128, u128::saturating_add),
            };
        }
        TreeCount::Finite(counts[self.root.0])
    }

    /// Up to `limit` distinct derivation trees, skipping cyclic expansions.
    #[must_use]
    pub fn trees(&self, limit: usize) -> Vec<ParseTree> {
        if limit == 0 {
            return Vec::new();
        }
        let mut on_path = vec![false; self.nodes.len()];
        self.expand(self.root, limit, &mut on_path)
    }

    fn expand(&self, id: ForestId, limit: usize, on_path: &mut [bool]) -> Vec<ParseTree> {
        let (non_terminal, alternatives) = match self.node(id) {
            ForestNode::Leaf { terminal, position } => {
                return vec![ParseTree::Leaf {
                    terminal: *terminal,
                    position: *position,
                }];
            }
            ForestNode::Symbol {
                non_terminal,
                alternatives,
                ..
            } => (*non_terminal, alternatives),
        };
        if on_path[id.0] {
            return Vec::new();
        }
        on_path[id.0] = true;

        let mut trees = Vec::new();
        for alternative in alternatives {
            let mut partial: Vec<Vec<ParseTree>> = vec![Vec::new()];
            for &child in &alternative.children {
                let options = self.expand(child, limit, on_path);
                let mut next = Vec::new();
                'product: for prefix in &partial {
                    for option in &options {
                        if next.len() >= limit {
                            break 'product;
                        }
                        let mut children = prefix.clone();
                        children.push(option.clone());
                        next.push(children);
                    }
                }
                partial = next;
                if partial.is_empty() {
                    break;
                }
            }
            for children in partial {
                if trees.len() >= limit {
                    break;
                }
                trees.push(ParseTree::Node {
                    non_terminal,
                    production: alternative.production,
                    children,
                });
            }
            if trees.len() >= limit {
                break;
            }
        }

        on_path[id.0] = false;
        trees
    }
}

/// A single derivation tree extracted from a [`ParseForest`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParseTree {
    Leaf {
        terminal: TerminalId,
        position: usize,
    },
    Node {
        non_terminal: NonTerminalId,
        production: ProductionId,
        children: Vec<ParseTree>,
    },
}

impl ParseTree {
    /// The terminals at the leaves, left to right.
    #[must_use]
    pub fn terminals(&self) -> Vec<TerminalId> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            match tree {
                Self::Leaf { terminal, .. } => out.push(*terminal),
                Self::Node { children, .. } => pending.extend(children.iter().rev()),
            }
        }
        out
    }

    /// Productions in the order a leftmost derivation applies them.
    #[must_use]
    pub fn leftmost_derivation(&self) -> Vec<ProductionId> {
        let mut out = Vec::new();
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            if let Self::Node {
                production,
                children,
                ..
            } = tree
            {
                out.push(*production);
                pending.extend(children.iter().rev());
            }
        }
        out
    }

    /// Whether every node matches its production's head and body.
    #[must_use]
    pub fn conforms_to(&self, grammar: &Grammar) -> bool {
        let mut pending = vec![self];
        while let Some(tree) = pending.pop() {
            let Self::Node {
                non_terminal,
                production,
                children,
            } = tree
            else {
                continue;
            };
            let production = grammar.production(*production);
            if production.head() != *non_terminal || production.len() != children.len() {
                return false;
            }
            let matches = production.body().iter().zip(children).all(|(symbol, child)| {
                match (symbol, child) {
                    (Symbol::Terminal(expected), Self::Leaf { terminal, .. }) => expected == terminal,
                    (Symbol::NonTerminal(expected), Self::Node { non_terminal, .. }) => {
                        expected == non_terminal
                    }
                    _ => false,
                }
            });
            if !matches {
                return false;
            }
            pending.extend(children);
        }
        true
    }

    /// Bracketed rendering such as `S(a S(a) a)`.
    #[must_use]
    pub fn display<'g>(&'g self, grammar: &'g Grammar) -> ParseTreeDisplay<'g> {
        ParseTreeDisplay { tree: self, grammar }
    }
}

pub struct ParseTreeDisplay<'g> {
    tree: &'g ParseTree,
    grammar: &'g Grammar,
}

impl fmt::Display for ParseTreeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree {
            ParseTree::Leaf { terminal, .. } => f.write_str(self.grammar.terminal_name(*terminal)),
            ParseTree::Node {
                non_terminal,
                children,
                ..
            } => {
                write!(f, "{}(", self.grammar.non_terminal_name(*non_terminal))?;
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" ")?;
                    }
                    write!(f, "{}", child.display(self.grammar))?;
                }
                f.write_str(")")
            }
        }
    }
}
