/// Read-pair breakend evidence.
///
/// A paired-end read whose mate is unmapped or discordantly mapped implies a
/// breakend somewhere within a fragment-size window beyond the anchored
/// read. The mate record supplies the non-reference read length; everything
/// else comes from the anchor.
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::breakend::{BreakendSummary, Direction};
use crate::error::Error;
use crate::evidence::validate_identifier;
use crate::params::ProcessingContext;

#[derive(Debug, Clone)]
pub struct NonReferenceReadPair {
    pub evidence_id: String,
    pub fragment_id: String,
    pub category: usize,
    pub breakend: BreakendSummary,
    pub breakend_qual: f32,
    pub local_mapq: u8,
    pub strand_bias: f64,
    /// Read length of the unanchored mate.
    pub non_reference_read_length: u32,
}

impl NonReferenceReadPair {
    /// Build evidence from an anchored record and its mate.
    ///
    /// The breakend window extends one fragment length past the anchor in
    /// the direction the mate should have mapped: rightward for a forward
    /// anchor, leftward for a reverse anchor.
    pub fn from_records(
        ctx: &ProcessingContext,
        anchor: &RecordBuf,
        mate: &RecordBuf,
        category: usize,
    ) -> Result<Self, Error> {
        let name = anchor
            .name()
            .map(|n| n.to_string())
            .ok_or_else(|| Error::InvalidEvidenceId(String::new()))?;
        let contig_index = anchor.reference_sequence_id().ok_or_else(|| {
            Error::InvariantViolation(format!("read pair anchor {name} is unplaced"))
        })?;
        let start = anchor
            .alignment_start()
            .map(|p| usize::from(p) as i64)
            .ok_or_else(|| {
                Error::InvariantViolation(format!("read pair anchor {name} has no position"))
            })?;
        let end = anchor
            .alignment_end()
            .map(|p| usize::from(p) as i64)
            .unwrap_or(start);

        let is_reverse = anchor.flags().is_reverse_complemented();
        let breakend = if is_reverse {
            let s = ctx.dictionary.clamp(contig_index, start - ctx.max_fragment_size);
            let e = ctx.dictionary.clamp(contig_index, start - 1).max(s);
            BreakendSummary::new(contig_index, s, e, Direction::Backward)
        } else {
            let s = ctx.dictionary.clamp(contig_index, end + 1);
            let e = ctx.dictionary.clamp(contig_index, start + ctx.max_fragment_size).max(s);
            BreakendSummary::new(contig_index, s, e, Direction::Forward)
        };

        let segment = if anchor.flags().is_first_segment() { 1 } else { 2 };
        let evidence_id = format!("{name}/{segment}");
        validate_identifier(&evidence_id)?;
        let local_mapq = anchor.mapping_quality().map(u8::from).unwrap_or(0);

        Ok(Self {
            evidence_id,
            fragment_id: name,
            category,
            breakend,
            breakend_qual: f32::from(local_mapq),
            local_mapq,
            strand_bias: if is_reverse { 0.0 } else { 1.0 },
            non_reference_read_length: mate.sequence().as_ref().len() as u32,
        })
    }

    pub fn fragment_ids_for(&self, category: usize) -> Vec<String> {
        if category == self.category {
            vec![self.fragment_id.clone()]
        } else {
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::SequenceDictionary;
    use noodles::core::Position;
    use noodles::sam::alignment::record::cigar::op::{Kind, Op};
    use noodles::sam::alignment::record::Flags;
    use noodles::sam::alignment::record_buf::{Cigar, Sequence};

    fn context() -> ProcessingContext {
        let dict =
            SequenceDictionary::new(vec![("chr1".to_string(), 10_000)]).unwrap();
        let mut ctx = ProcessingContext::new(dict, 1);
        ctx.max_fragment_size = 100;
        ctx
    }

    fn anchor(name: &str, start: usize, len: usize, reverse: bool) -> RecordBuf {
        let mut record = RecordBuf::default();
        record.name_mut().replace(name.into());
        let mut flags = Flags::SEGMENTED | Flags::FIRST_SEGMENT | Flags::MATE_UNMAPPED;
        if reverse {
            flags |= Flags::REVERSE_COMPLEMENTED;
        }
        *record.flags_mut() = flags;
        *record.reference_sequence_id_mut() = Some(0);
        *record.alignment_start_mut() = Position::new(start);
        let mut cigar = Cigar::default();
        cigar.as_mut().push(Op::new(Kind::Match, len));
        *record.cigar_mut() = cigar;
        *record.sequence_mut() = Sequence::from(vec![b'A'; len]);
        *record.mapping_quality_mut() =
            noodles::sam::alignment::record::MappingQuality::new(44);
        record
    }

    fn unmapped_mate(name: &str, len: usize) -> RecordBuf {
        let mut record = RecordBuf::default();
        record.name_mut().replace(name.into());
        *record.flags_mut() = Flags::SEGMENTED | Flags::UNMAPPED | Flags::LAST_SEGMENT;
        *record.sequence_mut() = Sequence::from(vec![b'C'; len]);
        record
    }

    #[test]
    fn test_forward_anchor_window() {
        let ctx = context();
        let a = anchor("r1", 100, 50, false);
        let m = unmapped_mate("r1", 75);
        let rp = NonReferenceReadPair::from_records(&ctx, &a, &m, 0).unwrap();

        assert_eq!(rp.evidence_id, "r1/1");
        assert_eq!(rp.fragment_id, "r1");
        assert_eq!(rp.breakend.direction, Direction::Forward);
        // anchor covers [100,149]; window is (149, 100+100]
        assert_eq!(rp.breakend.start, 150);
        assert_eq!(rp.breakend.end, 200);
        assert_eq!(rp.non_reference_read_length, 75);
        assert_eq!(rp.local_mapq, 44);
        assert_eq!(rp.strand_bias, 1.0);
    }

    #[test]
    fn test_reverse_anchor_window() {
        let ctx = context();
        let a = anchor("r2", 500, 50, true);
        let m = unmapped_mate("r2", 60);
        let rp = NonReferenceReadPair::from_records(&ctx, &a, &m, 0).unwrap();

        assert_eq!(rp.breakend.direction, Direction::Backward);
        assert_eq!(rp.breakend.start, 400);
        assert_eq!(rp.breakend.end, 499);
        assert_eq!(rp.strand_bias, 0.0);
    }

    #[test]
    fn test_window_clamped_to_contig_start() {
        let ctx = context();
        let a = anchor("r3", 10, 50, true);
        let m = unmapped_mate("r3", 60);
        let rp = NonReferenceReadPair::from_records(&ctx, &a, &m, 0).unwrap();
        assert_eq!(rp.breakend.start, 1);
        assert_eq!(rp.breakend.end, 9);
    }

    #[test]
    fn test_fragment_ids_keyed_by_category() {
        let ctx = context();
        let a = anchor("r4", 100, 50, false);
        let m = unmapped_mate("r4", 60);
        let rp = NonReferenceReadPair::from_records(&ctx, &a, &m, 0).unwrap();
        assert_eq!(rp.fragment_ids_for(0), vec!["r4".to_string()]);
        assert!(rp.fragment_ids_for(1).is_empty());
    }
}
