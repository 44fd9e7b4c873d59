/// Realignment correlation and remote-breakend geometry.
///
/// The breakend sequence of soft-clip evidence or an assembly is realigned
/// to the reference by an external aligner; the resulting records come back
/// named with the call position and evidence ID of their origin so the
/// joiner can reattach them.
use std::fmt;

use noodles::sam::alignment::record_buf::RecordBuf;

use crate::breakend::{BreakendSummary, BreakpointSummary, Direction};
use crate::error::Error;

const KEY_SEPARATOR: char = '#';

/// The identity a realignment record carries in its read name:
/// `<contigIndex>#<position>#<evidenceID>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RealignmentKey {
    pub contig_index: usize,
    pub position: i64,
    pub evidence_id: String,
}

impl RealignmentKey {
    pub fn new(contig_index: usize, position: i64, evidence_id: impl Into<String>) -> Self {
        Self {
            contig_index,
            position,
            evidence_id: evidence_id.into(),
        }
    }

    /// Key for the call position of a piece of evidence.
    pub fn for_breakend(breakend: &BreakendSummary, evidence_id: &str) -> Self {
        Self::new(breakend.contig_index, breakend.start, evidence_id)
    }

    /// Parse a realignment read name. The evidence ID may itself contain
    /// the separator, so only the first two are structural.
    pub fn parse(name: &str) -> Result<Self, Error> {
        let mut parts = name.splitn(3, KEY_SEPARATOR);
        let malformed = || Error::RealignmentKey(name.to_string());
        let contig_index = parts
            .next()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(malformed)?;
        let position = parts
            .next()
            .and_then(|s| s.parse::<i64>().ok())
            .ok_or_else(malformed)?;
        let evidence_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(malformed)?;
        Ok(Self::new(contig_index, position, evidence_id))
    }
}

impl fmt::Display for RealignmentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{KEY_SEPARATOR}{}{KEY_SEPARATOR}{}",
            self.contig_index, self.position, self.evidence_id
        )
    }
}

/// Outcome of realigning a breakend sequence.
#[derive(Debug, Clone)]
pub enum Realignment {
    /// The aligner could not place the breakend sequence anywhere; the
    /// evidence stays a breakend but is marked as having been attempted.
    Unmapped,
    /// The breakend sequence mapped, locating the remote side.
    Mapped {
        record: RecordBuf,
        breakpoint: BreakpointSummary,
    },
}

impl Realignment {
    pub fn breakpoint(&self) -> Option<&BreakpointSummary> {
        match self {
            Self::Unmapped => None,
            Self::Mapped { breakpoint, .. } => Some(breakpoint),
        }
    }
}

/// Derive the breakpoint implied by a mapped realignment of the breakend
/// sequence belonging to `local`.
///
/// The clip reads away from the local breakend, so a same-orientation
/// mapping means the remote reference continues in the clip's reading
/// direction: the adjacency attaches at the realignment start facing
/// backward. An opposite-orientation mapping mirrors that.
pub fn realigned_breakpoint(
    local: &BreakendSummary,
    record: &RecordBuf,
) -> Option<BreakpointSummary> {
    if record.flags().is_unmapped() {
        return None;
    }
    let contig_index = record.reference_sequence_id()?;
    let start = record.alignment_start().map(|p| usize::from(p) as i64)?;
    let end = record
        .alignment_end()
        .map(|p| usize::from(p) as i64)
        .unwrap_or(start);
    let is_reverse = record.flags().is_reverse_complemented();
    let remote = if (local.direction == Direction::Forward) != is_reverse {
        BreakendSummary::at(contig_index, start, Direction::Backward)
    } else {
        BreakendSummary::at(contig_index, end, Direction::Forward)
    };
    Some(BreakpointSummary::new(*local, remote))
}
