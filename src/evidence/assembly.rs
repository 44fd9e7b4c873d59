/// Assemblies flowing through the pipeline as evidence.
///
/// An assembly is an aligned record carrying the attributes written by
/// [`crate::assembly::AssemblyAttributes::annotate_assembly`]. This wrapper
/// derives the call breakend from the persisted direction and the alignment
/// bounds so the joiner can order and correlate assemblies like any other
/// evidence.
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::assembly::{attrs, tags, AssemblyAttributes};
use crate::breakend::{BreakendSummary, Direction};
use crate::error::Error;
use crate::evidence::validate_identifier;

#[derive(Debug, Clone)]
pub struct AssemblyEvidence {
    record: RecordBuf,
    evidence_id: String,
    source_category: usize,
    breakend: BreakendSummary,
    breakend_qual: f32,
}

impl AssemblyEvidence {
    pub fn from_record(record: RecordBuf, source_category: usize) -> Result<Self, Error> {
        let name = record
            .name()
            .map(|n| n.to_string())
            .unwrap_or_default();
        if !AssemblyAttributes::is_assembly(&record) {
            return Err(Error::missing_attribute("EVIDENCE_ID", name));
        }
        validate_identifier(&name)?;
        let direction = AssemblyAttributes::new(&record)
            .direction()
            .ok_or_else(|| Error::missing_attribute("DIRECTION", name.clone()))?;
        let breakend_qual = assembly_qual(&record);
        let contig_index = record.reference_sequence_id().ok_or_else(|| {
            Error::InvariantViolation(format!("assembly {name} is unplaced"))
        })?;
        let start = record
            .alignment_start()
            .map(|p| usize::from(p) as i64)
            .ok_or_else(|| {
                Error::InvariantViolation(format!("assembly {name} has no position"))
            })?;
        let position = match direction {
            Direction::Backward => start,
            Direction::Forward => record
                .alignment_end()
                .map(|p| usize::from(p) as i64)
                .unwrap_or(start),
        };
        Ok(Self {
            evidence_id: name,
            source_category,
            breakend: BreakendSummary::at(contig_index, position, direction),
            breakend_qual,
            record,
        })
    }

    pub fn evidence_id(&self) -> &str {
        &self.evidence_id
    }

    pub fn source_category(&self) -> usize {
        self.source_category
    }

    pub fn breakend(&self) -> &BreakendSummary {
        &self.breakend
    }

    /// Total support quality across all categories and evidence kinds.
    pub fn breakend_qual(&self) -> f32 {
        self.breakend_qual
    }

    pub fn local_mapq(&self) -> u8 {
        self.record.mapping_quality().map(u8::from).unwrap_or(0)
    }

    pub fn strand_bias(&self) -> f64 {
        AssemblyAttributes::new(&self.record).strand_bias()
    }

    pub fn attributes(&self) -> AssemblyAttributes<'_> {
        AssemblyAttributes::new(&self.record)
    }

    pub fn record(&self) -> &RecordBuf {
        &self.record
    }

    pub fn into_record(self) -> RecordBuf {
        self.record
    }
}

fn assembly_qual(record: &RecordBuf) -> f32 {
    let data = record.data();
    attrs::as_float_list(data.get(&tags::READPAIR_QUAL))
        .iter()
        .chain(attrs::as_float_list(data.get(&tags::SOFTCLIP_QUAL)).iter())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assembly::tags;
    use crate::evidence::{DirectedEvidence, SingleReadEvidence};
    use crate::params::{ProcessingContext, SequenceDictionary};
    use noodles::core::Position;
    use noodles::sam::alignment::record_buf::data::field::Value;

    fn context() -> ProcessingContext {
        let dict =
            SequenceDictionary::new(vec![("chr1".to_string(), 10_000)]).unwrap();
        ProcessingContext::new(dict, 1)
    }

    fn annotated_assembly(name: &str, position: usize, direction: u8) -> RecordBuf {
        let ctx = context();
        let mut record = RecordBuf::default();
        record.name_mut().replace(name.into());
        *record.reference_sequence_id_mut() = Some(0);
        *record.alignment_start_mut() = Position::new(position);
        let support = vec![DirectedEvidence::SingleRead(SingleReadEvidence {
            evidence_id: "sc1".to_string(),
            fragment_id: "frag1".to_string(),
            category: 0,
            breakend: BreakendSummary::at(0, position as i64, Direction::Backward),
            breakend_qual: 6.5,
            local_mapq: 50,
            strand_bias: 1.0,
            breakend_sequence: b"ACGT".to_vec(),
        })];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();
        record
            .data_mut()
            .insert(tags::DIRECTION, Value::Character(direction));
        record
    }

    #[test]
    fn test_backward_assembly_breakend_at_start() {
        let record = annotated_assembly("asm1", 42, b'b');
        let assembly = AssemblyEvidence::from_record(record, 0).unwrap();
        assert_eq!(assembly.evidence_id(), "asm1");
        assert_eq!(assembly.breakend().start, 42);
        assert_eq!(assembly.breakend().direction, Direction::Backward);
        assert_eq!(assembly.local_mapq(), 50);
        assert_eq!(assembly.breakend_qual(), 6.5);
    }

    #[test]
    fn test_plain_record_is_rejected() {
        let mut record = RecordBuf::default();
        record.name_mut().replace("read1".into());
        assert!(matches!(
            AssemblyEvidence::from_record(record, 0),
            Err(Error::MissingAttribute { .. })
        ));
    }

    #[test]
    fn test_direction_is_required() {
        let ctx = context();
        let mut record = RecordBuf::default();
        record.name_mut().replace("asm2".into());
        *record.reference_sequence_id_mut() = Some(0);
        *record.alignment_start_mut() = Position::new(10);
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&[])).unwrap();
        assert!(matches!(
            AssemblyEvidence::from_record(record, 0),
            Err(Error::MissingAttribute { .. })
        ));
    }
}
