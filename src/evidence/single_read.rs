/// Single-read breakend evidence.
///
/// A soft-clipped alignment locates a breakend exactly: a leading clip
/// attaches before the alignment start, a trailing clip past the alignment
/// end, and the clipped bases are the breakend sequence to be realigned.
use noodles::sam::alignment::record::cigar::op::Kind;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::breakend::{BreakendSummary, Direction};

#[derive(Debug, Clone)]
pub struct SingleReadEvidence {
    pub evidence_id: String,
    pub fragment_id: String,
    pub category: usize,
    pub breakend: BreakendSummary,
    pub breakend_qual: f32,
    pub local_mapq: u8,
    pub strand_bias: f64,
    /// The clipped bases, read 5' to 3' in reference orientation.
    pub breakend_sequence: Vec<u8>,
}

impl SingleReadEvidence {
    /// Extract soft-clip evidence from an aligned record: one entry per
    /// clipped side, at most two. Records without a name, position, or soft
    /// clips yield nothing.
    pub fn from_soft_clips(record: &RecordBuf, category: usize) -> Vec<SingleReadEvidence> {
        let mut out = Vec::new();
        let name = match record.name() {
            Some(n) => n.to_string(),
            None => return out,
        };
        let contig_index = match record.reference_sequence_id() {
            Some(id) => id,
            None => return out,
        };
        let start = match record.alignment_start() {
            Some(p) => usize::from(p) as i64,
            None => return out,
        };
        let (leading, trailing) = soft_clip_lengths(record);
        let sequence = record.sequence().as_ref();
        let quals = record.quality_scores().as_ref();
        let local_mapq = record.mapping_quality().map(u8::from).unwrap_or(0);
        let strand_bias = if record.flags().is_reverse_complemented() {
            0.0
        } else {
            1.0
        };

        if leading > 0 {
            let clipped = &sequence[..leading.min(sequence.len())];
            out.push(SingleReadEvidence {
                evidence_id: format!("{}{name}", Direction::Backward.as_char()),
                fragment_id: name.clone(),
                category,
                breakend: BreakendSummary::at(contig_index, start, Direction::Backward),
                breakend_qual: mean_quality(&quals[..leading.min(quals.len())]),
                local_mapq,
                strand_bias,
                breakend_sequence: clipped.to_vec(),
            });
        }
        if trailing > 0 {
            let end = record
                .alignment_end()
                .map(|p| usize::from(p) as i64)
                .unwrap_or(start);
            let seq_from = sequence.len().saturating_sub(trailing);
            let qual_from = quals.len().saturating_sub(trailing);
            out.push(SingleReadEvidence {
                evidence_id: format!("{}{name}", Direction::Forward.as_char()),
                fragment_id: name,
                category,
                breakend: BreakendSummary::at(contig_index, end, Direction::Forward),
                breakend_qual: mean_quality(&quals[qual_from..]),
                local_mapq,
                strand_bias,
                breakend_sequence: sequence[seq_from..].to_vec(),
            });
        }
        out
    }

    pub fn fragment_ids_for(&self, category: usize) -> Vec<String> {
        if category == self.category {
            vec![self.fragment_id.clone()]
        } else {
            Vec::new()
        }
    }
}

/// Soft-clip lengths on each side of the alignment, ignoring hard clips.
fn soft_clip_lengths(record: &RecordBuf) -> (usize, usize) {
    let ops = record.cigar().as_ref();
    let leading = ops
        .iter()
        .find(|op| op.kind() != Kind::HardClip)
        .filter(|op| op.kind() == Kind::SoftClip)
        .map(|op| op.len())
        .unwrap_or(0);
    let trailing = ops
        .iter()
        .rev()
        .find(|op| op.kind() != Kind::HardClip)
        .filter(|op| op.kind() == Kind::SoftClip)
        .map(|op| op.len())
        .unwrap_or(0);
    (leading, trailing)
}

fn mean_quality(quals: &[u8]) -> f32 {
    if quals.is_empty() {
        return 0.0;
    }
    quals.iter().map(|&q| f32::from(q)).sum::<f32>() / quals.len() as f32
}
