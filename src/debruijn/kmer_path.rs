/// Positional de Bruijn graph path nodes.
///
/// A `KmerPathNode` is a maximal run of kmers whose first kmer may start
/// anywhere in a closed position interval; every kmer in the run shifts that
/// interval by one. A `KmerPathSubnode` is the same node restricted to a
/// sub-interval of first-kmer start positions, which is what path traversal
/// operates on.
use std::fmt;
use std::rc::Rc;

use crate::interval::overlaps_closed;

// ---------------------------------------------------------------------------
// KmerPathNode
// ---------------------------------------------------------------------------

/// A run of kmers sharing an interval of starting positions. Nodes are
/// created by the graph builder and shared by reference; node identity (not
/// content equality) is what path membership tests compare.
#[derive(Debug)]
pub struct KmerPathNode {
    kmers: Vec<u64>,
    weights: Vec<i32>,
    total_weight: i32,
    first_start: i32,
    first_end: i32,
}

impl KmerPathNode {
    pub fn new(kmers: Vec<u64>, weights: Vec<i32>, first_start: i32, first_end: i32) -> Rc<Self> {
        assert!(!kmers.is_empty(), "kmer path node must contain kmers");
        assert_eq!(
            kmers.len(),
            weights.len(),
            "kmer and weight runs must have equal length"
        );
        assert!(first_start <= first_end, "first-kmer interval inverted");
        let total_weight = weights.iter().sum();
        Rc::new(Self {
            kmers,
            weights,
            total_weight,
            first_start,
            first_end,
        })
    }

    /// Number of kmers in the run.
    pub fn length(&self) -> i32 {
        self.kmers.len() as i32
    }

    /// Total support weight over all kmers.
    pub fn weight(&self) -> i32 {
        self.total_weight
    }

    pub fn weight_at(&self, offset: usize) -> i32 {
        self.weights[offset]
    }

    pub fn first_kmer(&self) -> u64 {
        self.kmers[0]
    }

    pub fn last_kmer(&self) -> u64 {
        *self.kmers.last().unwrap()
    }

    pub fn kmer_at(&self, offset: usize) -> u64 {
        self.kmers[offset]
    }

    /// Earliest position of the first kmer.
    pub fn first_start(&self) -> i32 {
        self.first_start
    }

    /// Latest position of the first kmer.
    pub fn first_end(&self) -> i32 {
        self.first_end
    }

    /// Earliest position of the last kmer.
    pub fn last_start(&self) -> i32 {
        self.first_start + self.length() - 1
    }

    /// Latest position of the last kmer.
    pub fn last_end(&self) -> i32 {
        self.first_end + self.length() - 1
    }
}

// ---------------------------------------------------------------------------
// KmerPathSubnode
// ---------------------------------------------------------------------------

/// A path node restricted to a sub-interval of first-kmer positions.
#[derive(Debug, Clone)]
pub struct KmerPathSubnode {
    node: Rc<KmerPathNode>,
    first_start: i32,
    first_end: i32,
}

impl KmerPathSubnode {
    /// View of the whole node interval.
    pub fn from_node(node: Rc<KmerPathNode>) -> Self {
        let (first_start, first_end) = (node.first_start(), node.first_end());
        Self {
            node,
            first_start,
            first_end,
        }
    }

    pub fn new(node: Rc<KmerPathNode>, first_start: i32, first_end: i32) -> Self {
        assert!(first_start <= first_end, "subnode interval inverted");
        assert!(
            node.first_start() <= first_start && node.first_end() >= first_end,
            "subnode interval outside node bounds"
        );
        Self {
            node,
            first_start,
            first_end,
        }
    }

    pub fn node(&self) -> &Rc<KmerPathNode> {
        &self.node
    }

    pub fn length(&self) -> i32 {
        self.node.length()
    }

    pub fn weight(&self) -> i32 {
        self.node.weight()
    }

    pub fn first_start(&self) -> i32 {
        self.first_start
    }

    pub fn first_end(&self) -> i32 {
        self.first_end
    }

    pub fn last_start(&self) -> i32 {
        self.first_start + self.length() - 1
    }

    pub fn last_end(&self) -> i32 {
        self.first_end + self.length() - 1
    }

    /// Number of distinct first-kmer positions in the interval.
    pub fn width(&self) -> i32 {
        self.first_end - self.first_start + 1
    }

    /// Restrict this subnode to the positions from which `next` is reachable
    /// as the immediate successor: the successor's first kmer starts exactly
    /// `length()` after this node's first kmer.
    pub fn given_next(&self, next: &KmerPathSubnode) -> KmerPathSubnode {
        let start = next.first_start() - self.length();
        let end = next.first_end() - self.length();
        KmerPathSubnode::new(
            Rc::clone(&self.node),
            start.max(self.first_start),
            end.min(self.first_end),
        )
    }

    /// Restrict this subnode to the positions reachable from `prev` as the
    /// immediate predecessor.
    pub fn given_prev(&self, prev: &KmerPathSubnode) -> KmerPathSubnode {
        let start = prev.first_start() + prev.length();
        let end = prev.first_end() + prev.length();
        KmerPathSubnode::new(
            Rc::clone(&self.node),
            start.max(self.first_start),
            end.min(self.first_end),
        )
    }

    /// True iff the first-kmer intervals of the two subnodes share a point.
    pub fn overlaps(&self, other: &KmerPathSubnode) -> bool {
        overlaps_closed(
            self.first_start,
            self.first_end,
            other.first_start,
            other.first_end,
        )
    }
}

impl fmt::Display for KmerPathSubnode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{},{}]{}kmers w={}",
            self.first_start,
            self.first_end,
            self.length(),
            self.weight()
        )
    }
}
