//! Graph-structured stack.
//!
//! All parse stacks live in one arena of nodes addressed by [`GssNodeId`].
//! A node is an automaton state reached at some input position (its
//! generation). Edges point from a node to the node below it and carry the
//! forest node for the symbol between them. Forked stacks share their lower
//! part; merged stacks share their top node and differ in predecessors.
//!
//! Within the current generation there is at most one node per state, which
//! is what makes merging a lookup instead of a comparison of whole stacks.
//! The arena lives for one parse and is dropped with it.

use hashbrown::HashMap;
use smallvec::SmallVec;

use super::forest::ForestId;
use crate::backend::lr::StateId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GssNodeId(usize);

impl GssNodeId {
    /// Position of the node in the stack arena.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// Link from a node to its predecessor, labelled with a forest node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GssEdge {
    pub target: GssNodeId,
    pub label: ForestId,
}

#[derive(Debug, Clone)]
pub struct GssNode {
    state: StateId,
    generation: usize,
    predecessors: SmallVec<[GssEdge; 2]>,
    successors: SmallVec<[GssNodeId; 2]>,
}

impl GssNode {
    /// Automaton state on top of the stacks through this node.
    #[must_use]
    pub const fn state(&self) -> StateId {
        self.state
    }

    /// Input position at which this node was created.
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    /// Edges down to the nodes below.
    #[must_use]
    pub fn predecessors(&self) -> &[GssEdge] {
        &self.predecessors
    }

    /// Nodes whose edges point down to this one.
    #[must_use]
    pub fn successors(&self) -> &[GssNodeId] {
        &self.successors
    }
}

/// A path of `k` edges walked down from a node during a reduction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackPath {
    /// The node exposed after popping the path.
    pub ancestor: GssNodeId,
    /// Edge labels from the ancestor upwards, i.e. in production body order.
    pub labels: SmallVec<[ForestId; 4]>,
}

#[derive(Debug, Clone)]
pub struct GraphStack {
    nodes: Vec<GssNode>,
    frontier: HashMap<StateId, GssNodeId, ahash::RandomState>,
    frontier_order: Vec<GssNodeId>,
    generation: usize,
    edges: usize,
}

impl GraphStack {
    /// A stack holding only the root node in `initial_state`.
    #[must_use]
    pub fn new(initial_state: StateId) -> Self {
        let mut stack = Self {
            nodes: Vec::new(),
            frontier: HashMap::default(),
            frontier_order: Vec::new(),
            generation: 0,
            edges: 0,
        };
        stack.push_node(initial_state);
        stack
    }

    /// The bottom node every stack starts from.
    #[must_use]
    pub const fn root(&self) -> GssNodeId {
        GssNodeId(0)
    }

    /// The node stored under `id`.
    #[must_use]
    pub fn node(&self, id: GssNodeId) -> &GssNode {
        &self.nodes[id.0]
    }

    /// Input position of the current frontier.
    #[must_use]
    pub const fn generation(&self) -> usize {
        self.generation
    }

    /// Nodes of the current generation, in creation order.
    #[must_use]
    pub fn frontier(&self) -> &[GssNodeId] {
        &self.frontier_order
    }

    /// The current-generation node for `state`, if one exists.
    #[must_use]
    pub fn find_in_frontier(&self, state: StateId) -> Option<GssNodeId> {
        self.frontier.get(&state).copied()
    }

    /// Create a node for `state` in the current generation.
    pub fn push_node(&mut self, state: StateId) -> GssNodeId {
        let id = GssNodeId(self.nodes.len());
        self.nodes.push(GssNode {
            state,
            generation: self.generation,
            predecessors: SmallVec::new(),
            successors: SmallVec::new(),
        });
        self.frontier.insert(state, id);
        self.frontier_order.push(id);
        id
    }

    /// The frontier node for `state`, created if missing.
    pub fn frontier_node(&mut self, state: StateId) -> GssNodeId {
        match self.find_in_frontier(state) {
            Some(existing) => existing,
            None => self.push_node(state),
        }
    }

    /// Link `from` down to `to`. Returns `false` if the edge already exists.
    pub fn add_edge(&mut self, from: GssNodeId, to: GssNodeId, label: ForestId) -> bool {
        let edge = GssEdge { target: to, label };
        if self.nodes[from.0].predecessors.contains(&edge) {
            return false;
        }
        self.nodes[from.0].predecessors.push(edge);
        if !self.nodes[to.0].successors.contains(&from) {
            self.nodes[to.0].successors.push(from);
        }
        self.edges += 1;
        true
    }

    /// Start the next generation with an empty frontier.
    pub fn advance(&mut self) {
        self.generation += 1;
        self.frontier.clear();
        self.frontier_order.clear();
    }

    /// Every path of exactly `length` edges going down from `from`.
    ///
    /// Walks iteratively. Paths may repeat nodes when the stack holds epsilon
    /// self-loops; their length still bounds the walk.
    #[must_use]
    pub fn paths(&self, from: GssNodeId, length: usize) -> Vec<StackPath> {
        let mut paths = Vec::new();
        let mut pending: Vec<(GssNodeId, SmallVec<[ForestId; 4]>)> = vec![(from, SmallVec::new())];
        while let Some((node, mut labels)) = pending.pop() {
            if labels.len() == length {
                labels.reverse();
                paths.push(StackPath {
                    ancestor: node,
                    labels,
                });
                continue;
            }
            for edge in self.nodes[node.0].predecessors.iter().rev() {
                let mut next = labels.clone();
                next.push(edge.label);
                pending.push((edge.target, next));
            }
        }
        paths
    }

    /// Total number of nodes created so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the arena is empty. Never true once constructed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Total number of edges added so far.
    #[must_use]
    pub const fn edge_count(&self) -> usize {
        self.edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frontier_merges_by_state() {
        let mut stack = GraphStack::new(0);
        let root = stack.root();
        stack.advance();
        let a = stack.frontier_node(3);
        let b = stack.frontier_node(3);
        assert_eq!(a, b);
        assert!(stack.add_edge(a, root, ForestId::new(0)));
        assert!(!stack.add_edge(a, root, ForestId::new(0)));
        assert!(stack.add_edge(a, root, ForestId::new(1)));
        assert_eq!(stack.edge_count(), 2);
        assert_eq!(stack.node(root).successors(), &[a]);
        assert_eq!(stack.node(a).generation(), 1);
    }

    #[test]
    fn test_paths_enumerate_every_branch() {
        // root <- x <- top, root <- y <- top
        let mut stack = GraphStack::new(0);
        let root = stack.root();
        stack.advance();
        let x = stack.push_node(1);
        let y = stack.push_node(2);
        stack.add_edge(x, root, ForestId::new(10));
        stack.add_edge(y, root, ForestId::new(11));
        stack.advance();
        let top = stack.push_node(5);
        stack.add_edge(top, x, ForestId::new(20));
        stack.add_edge(top, y, ForestId::new(21));

        let paths = stack.paths(top, 2);
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().all(|p| p.ancestor == root));
        let labels: Vec<Vec<usize>> = paths
            .iter()
            .map(|p| p.labels.iter().map(|l| l.index()).collect())
            .collect();
        assert_eq!(labels, vec![vec![10, 20], vec![11, 21]]);

        let empty = stack.paths(top, 0);
        assert_eq!(empty.len(), 1);
        assert_eq!(empty[0].ancestor, top);
        assert!(empty[0].labels.is_empty());
    }

    #[test]
    fn test_paths_through_self_loop_are_bounded() {
        let mut stack = GraphStack::new(0);
        let root = stack.root();
        let node = stack.push_node(1);
        stack.add_edge(node, root, ForestId::new(0));
        stack.add_edge(node, node, ForestId::new(1));
        let paths = stack.paths(node, 3);
        // loop, loop, loop or loop, loop, exit; the root has no predecessors
        assert_eq!(paths.len(), 2);
        assert!(paths.iter().any(|p| p.ancestor == root));
        assert!(paths.iter().any(|p| p.ancestor == node));
    }
}
