use std::fmt;

use crate::interval::overlaps_closed;
use crate::params::SequenceDictionary;

// ---------------------------------------------------------------------------
// Breakend direction
// ---------------------------------------------------------------------------

/// Side of the reference at which an inferred novel adjacency attaches.
///
/// `Forward`: reference bases up to and including the breakend position are
/// retained and the adjacency continues past it. `Backward`: the adjacency
/// attaches before the position and the reference continues after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Forward,
    Backward,
}

impl Direction {
    pub fn as_char(self) -> char {
        match self {
            Self::Forward => 'f',
            Self::Backward => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'f' => Some(Self::Forward),
            'b' => Some(Self::Backward),
            _ => None,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }
}

impl std::str::FromStr for Direction {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "f" => Ok(Self::Forward),
            "b" => Ok(Self::Backward),
            _ => Err(format!("unknown direction '{s}'; expected 'f' or 'b'")),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ---------------------------------------------------------------------------
// Breakend summary
// ---------------------------------------------------------------------------

/// A contiguous reference interval on one contig with a direction: one side
/// of a putative novel adjacency. `start <= end`, both 1-based inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakendSummary {
    pub contig_index: usize,
    pub start: i64,
    pub end: i64,
    pub direction: Direction,
}

impl BreakendSummary {
    pub fn new(contig_index: usize, start: i64, end: i64, direction: Direction) -> Self {
        debug_assert!(start <= end, "breakend interval [{start},{end}] inverted");
        Self {
            contig_index,
            start,
            end,
            direction,
        }
    }

    /// Exact single-position breakend.
    pub fn at(contig_index: usize, position: i64, direction: Direction) -> Self {
        Self::new(contig_index, position, position, direction)
    }

    /// True iff the intervals share a point and the directions match.
    pub fn overlaps(&self, other: &BreakendSummary) -> bool {
        self.contig_index == other.contig_index
            && self.direction == other.direction
            && overlaps_closed(self.start, self.end, other.start, other.end)
    }

    /// Expand the interval by `margin` on both sides, clamped to contig
    /// bounds.
    pub fn with_margin(&self, dictionary: &SequenceDictionary, margin: i64) -> Self {
        Self {
            contig_index: self.contig_index,
            start: dictionary.clamp(self.contig_index, self.start - margin),
            end: dictionary.clamp(self.contig_index, self.end + margin),
            direction: self.direction,
        }
    }
}

impl fmt::Display for BreakendSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}-{}({})",
            self.contig_index, self.start, self.end, self.direction
        )
    }
}

// ---------------------------------------------------------------------------
// Breakpoint summary
// ---------------------------------------------------------------------------

/// An ordered pair of breakends defining a novel adjacency: the local side
/// (where the evidence was anchored) and the remote side (where the
/// unanchored sequence realigned).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BreakpointSummary {
    pub local: BreakendSummary,
    pub remote: BreakendSummary,
}

impl BreakpointSummary {
    pub fn new(local: BreakendSummary, remote: BreakendSummary) -> Self {
        Self { local, remote }
    }

    /// True iff both endpoints overlap and directions match.
    pub fn overlaps(&self, other: &BreakpointSummary) -> bool {
        self.local.overlaps(&other.local) && self.remote.overlaps(&other.remote)
    }

    /// True iff the local side overlaps the given breakend. Used when the
    /// other evidence only locates one side of the adjacency.
    pub fn overlaps_breakend(&self, breakend: &BreakendSummary) -> bool {
        self.local.overlaps(breakend)
    }

    /// Expand both endpoints by `margin`, clamped to contig bounds.
    pub fn with_margin(&self, dictionary: &SequenceDictionary, margin: i64) -> Self {
        Self {
            local: self.local.with_margin(dictionary, margin),
            remote: self.remote.with_margin(dictionary, margin),
        }
    }
}

impl fmt::Display for BreakpointSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.local, self.remote)
    }
}
