/// Persistent traversal paths over kmer path subnodes.
///
/// The path finder explores the graph by extending paths one subnode at a
/// time. Each extension allocates a new `TraversalNode` whose parent pointer
/// shares the existing chain, so alternative extensions of one path share
/// their common prefix; the back-chains form a DAG in aggregate. Nodes are
/// immutable after construction and are reclaimed when the last path
/// referencing them is dropped.
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::debruijn::kmer_path::{KmerPathNode, KmerPathSubnode};
use crate::interval::overlaps_closed;

#[derive(Debug)]
pub struct TraversalNode {
    node: KmerPathSubnode,
    score: i64,
    /// Length of the path in kmers.
    path_length: i32,
    parent: Option<Rc<TraversalNode>>,
}

impl TraversalNode {
    /// Start a new path at `node`.
    pub fn root(node: KmerPathSubnode, base_score: i64) -> Self {
        let score = base_score + i64::from(node.weight());
        let path_length = node.length();
        Self {
            node,
            score,
            path_length,
            parent: None,
        }
    }

    /// Extend the path ending at `prev` by `node`.
    pub fn extend(prev: &Rc<TraversalNode>, node: KmerPathSubnode) -> Self {
        let score = prev.score + i64::from(node.weight());
        let path_length = prev.path_length + node.length();
        Self {
            node,
            score,
            path_length,
            parent: Some(Rc::clone(prev)),
        }
    }

    /// Restrict the first-kmer interval of the head subnode to
    /// `[start, end]`. Score, path length and parent are unchanged.
    pub fn restrict(node: &TraversalNode, start: i32, end: i32) -> Self {
        debug_assert!(end >= start);
        debug_assert!(node.node.first_start() <= start);
        debug_assert!(node.node.first_end() >= end);
        Self {
            node: KmerPathSubnode::new(Rc::clone(node.node.node()), start, end),
            score: node.score,
            path_length: node.path_length,
            parent: node.parent.clone(),
        }
    }

    pub fn node(&self) -> &KmerPathSubnode {
        &self.node
    }

    pub fn score(&self) -> i64 {
        self.score
    }

    pub fn path_length(&self) -> i32 {
        self.path_length
    }

    pub fn parent(&self) -> Option<&Rc<TraversalNode>> {
        self.parent.as_ref()
    }

    /// Subnode at which the path started.
    pub fn get_root(&self) -> &KmerPathSubnode {
        let mut n = self;
        while let Some(parent) = n.parent.as_deref() {
            n = parent;
        }
        &n.node
    }

    /// Whether this path already traverses `node`, excluding the head.
    ///
    /// Walking the ancestry, identity with `node` proves traversal. An
    /// ancestor whose first-kmer interval overlaps `node`'s without being
    /// identical short-circuits to false: past that point the path lies in
    /// positions from which `node` cannot be re-entered, so the cycle check
    /// can stop early.
    pub fn contains(&self, node: &Rc<KmerPathNode>) -> bool {
        let mut current = self.parent.as_deref();
        while let Some(n) = current {
            let pn = n.node.node();
            if Rc::ptr_eq(pn, node) {
                return true;
            }
            if overlaps_closed(
                pn.first_start(),
                pn.first_end(),
                node.first_start(),
                node.first_end(),
            ) {
                return false;
            }
            current = n.parent.as_deref();
        }
        false
    }

    /// Materialise the path in root-to-leaf order, assuming every parent
    /// edge was a step to a successor. Each parent head is re-intervalled to
    /// the positions from which the already-materialised suffix follows.
    pub fn to_subnode_next_path(&self) -> VecDeque<KmerPathSubnode> {
        let mut path = VecDeque::new();
        let mut last = self.node.clone();
        path.push_front(last.clone());
        let mut current = self.parent.as_deref();
        while let Some(n) = current {
            let restricted = n.node.given_next(&last);
            last = restricted.clone();
            path.push_front(restricted);
            current = n.parent.as_deref();
        }
        path
    }

    /// Materialise the path assuming every parent edge was a step to a
    /// predecessor; the head comes first and the root last.
    pub fn to_subnode_prev_path(&self) -> VecDeque<KmerPathSubnode> {
        let mut path = VecDeque::new();
        let mut last = self.node.clone();
        path.push_back(last.clone());
        let mut current = self.parent.as_deref();
        while let Some(n) = current {
            let restricted = n.node.given_prev(&last);
            last = restricted.clone();
            path.push_back(restricted);
            current = n.parent.as_deref();
        }
        path
    }

    /// Ordering by the head subnode's earliest first-kmer position.
    pub fn by_first_start(left: &TraversalNode, right: &TraversalNode) -> Ordering {
        left.node.first_start().cmp(&right.node.first_start())
    }

    /// Ordering by the head subnode's latest last-kmer position.
    pub fn by_last_end(left: &TraversalNode, right: &TraversalNode) -> Ordering {
        left.node.last_end().cmp(&right.node.last_end())
    }
}

impl fmt::Display for TraversalNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "score={} pathlength={}", self.score, self.path_length)?;
        let mut current = Some(self);
        while let Some(n) = current {
            write!(f, "{}", n.node)?;
            current = n.parent.as_deref();
        }
        Ok(())
    }
}
