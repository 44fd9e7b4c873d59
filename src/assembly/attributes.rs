/// Assembly provenance annotation and support queries.
///
/// The write path ([`AssemblyAttributes::annotate_assembly`]) summarises the
/// evidence used to build an assembly into per-category tag arrays plus the
/// two encoded ID strings, after which the evidence objects can be dropped:
/// the record carries everything downstream scoring needs. The read path is
/// a lazy view over one record that memoises the parsed evidence-ID set.
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::OnceLock;

use bstr::BString;
use noodles::sam::alignment::record::data::field::Tag;
use noodles::sam::alignment::record::MappingQuality;
use noodles::sam::alignment::record_buf::data::field::value::Array;
use noodles::sam::alignment::record_buf::data::field::Value;
use noodles::sam::alignment::record_buf::RecordBuf;

use crate::assembly::attrs;
use crate::assembly::tags;
use crate::breakend::{BreakpointSummary, Direction};
use crate::error::Error;
use crate::evidence::DirectedEvidence;
use crate::params::ProcessingContext;

fn read_name(record: &RecordBuf) -> String {
    record
        .name()
        .map(|n| n.to_string())
        .unwrap_or_else(|| String::from("<unnamed>"))
}

/// Lazy support-statistics view over a single assembly record.
pub struct AssemblyAttributes<'a> {
    record: &'a RecordBuf,
    evidence_ids: OnceLock<HashSet<String>>,
}

impl<'a> AssemblyAttributes<'a> {
    pub fn new(record: &'a RecordBuf) -> Self {
        Self {
            record,
            evidence_ids: OnceLock::new(),
        }
    }

    /// A record is an assembly iff it carries the evidence-ID attribute.
    /// An empty value still counts: that is an assembly whose evidence
    /// tracking was stripped, not a plain read.
    pub fn is_assembly(record: &RecordBuf) -> bool {
        record.data().get(&tags::EVIDENCE_ID).is_some()
    }

    pub fn is_unanchored(record: &RecordBuf) -> bool {
        record.data().get(&tags::UNANCHORED).is_some()
    }

    // -----------------------------------------------------------------------
    // Provenance queries
    // -----------------------------------------------------------------------

    /// The set of evidence IDs recorded at annotation time. Parsed once and
    /// cached; subsequent calls are free.
    pub fn evidence_ids(&self) -> Result<&HashSet<String>, Error> {
        if let Some(ids) = self.evidence_ids.get() {
            return Ok(ids);
        }
        let encoded = self.string_attribute(tags::EVIDENCE_ID).ok_or_else(|| {
            Error::missing_attribute("EVIDENCE_ID", read_name(self.record))
        })?;
        let parsed: HashSet<String> = encoded
            .split(tags::ID_COMPONENT_SEPARATOR)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();
        Ok(self.evidence_ids.get_or_init(|| parsed))
    }

    /// Probabilistic membership test: false means the evidence is definitely
    /// not part of this assembly; true may rarely be a collision, which is
    /// acceptable to callers that use this only for pruning.
    pub fn is_part_of_assembly(&self, evidence: &DirectedEvidence) -> Result<bool, Error> {
        Ok(self.evidence_ids()?.contains(evidence.evidence_id()))
    }

    /// All originating fragment IDs, ignoring category boundaries.
    pub fn originating_fragment_ids(&self) -> Vec<String> {
        match self.string_attribute(tags::SUPPORTING_FRAGMENTS) {
            None => Vec::new(),
            Some(encoded) => encoded
                .split(tags::ID_COMPONENT_SEPARATOR)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Originating fragment IDs for one category; empty when the category is
    /// beyond the number of encoded slots.
    pub fn originating_fragment_ids_for(&self, category: usize) -> Vec<String> {
        match self.string_attribute(tags::SUPPORTING_FRAGMENTS) {
            None => Vec::new(),
            Some(encoded) => attrs::split_categories(&encoded)
                .get(category)
                .map(|tokens| tokens.iter().map(|s| s.to_string()).collect())
                .unwrap_or_default(),
        }
    }

    pub fn direction(&self) -> Option<Direction> {
        match self.record.data().get(&tags::DIRECTION) {
            Some(Value::Character(c)) => Direction::from_char(*c as char),
            _ => None,
        }
    }

    pub fn strand_bias(&self) -> f64 {
        attrs::as_f64(self.record.data().get(&tags::STRAND_BIAS), 0.0)
    }

    // -----------------------------------------------------------------------
    // Per-category scalar accessors (0 when absent)
    // -----------------------------------------------------------------------

    pub fn support_count_read_pair(&self, category: usize) -> i32 {
        self.int_at(tags::READPAIR_COUNT, category)
    }

    pub fn support_count_soft_clip(&self, category: usize) -> i32 {
        self.int_at(tags::SOFTCLIP_COUNT, category)
    }

    pub fn read_pair_length_max(&self, category: usize) -> i32 {
        self.int_at(tags::READPAIR_LENGTH_MAX, category)
    }

    pub fn soft_clip_length_max(&self, category: usize) -> i32 {
        self.int_at(tags::SOFTCLIP_CLIPLENGTH_MAX, category)
    }

    pub fn soft_clip_length_total(&self, category: usize) -> i32 {
        self.int_at(tags::SOFTCLIP_CLIPLENGTH_TOTAL, category)
    }

    pub fn support_qual_read_pair(&self, category: usize) -> f32 {
        self.float_at(tags::READPAIR_QUAL, category)
    }

    pub fn support_qual_soft_clip(&self, category: usize) -> f32 {
        self.float_at(tags::SOFTCLIP_QUAL, category)
    }

    pub fn non_supporting_count_read_pair(&self, category: usize) -> i32 {
        self.int_at(tags::NONSUPPORTING_READPAIR_COUNT, category)
    }

    pub fn non_supporting_count_soft_clip(&self, category: usize) -> i32 {
        self.int_at(tags::NONSUPPORTING_SOFTCLIP_COUNT, category)
    }

    pub fn non_supporting_qual_read_pair(&self, category: usize) -> f32 {
        self.float_at(tags::NONSUPPORTING_READPAIR_QUAL, category)
    }

    pub fn non_supporting_qual_soft_clip(&self, category: usize) -> f32 {
        self.float_at(tags::NONSUPPORTING_SOFTCLIP_QUAL, category)
    }

    // -----------------------------------------------------------------------
    // Masked aggregates
    // -----------------------------------------------------------------------

    pub fn support_count_masked(&self, mask: &[bool]) -> i32 {
        self.support_count_read_pair_masked(mask) + self.support_count_soft_clip_masked(mask)
    }

    pub fn support_count_read_pair_masked(&self, mask: &[bool]) -> i32 {
        self.masked_int(tags::READPAIR_COUNT, mask)
    }

    pub fn support_count_soft_clip_masked(&self, mask: &[bool]) -> i32 {
        self.masked_int(tags::SOFTCLIP_COUNT, mask)
    }

    pub fn support_qual_read_pair_masked(&self, mask: &[bool]) -> f32 {
        self.masked_float(tags::READPAIR_QUAL, mask)
    }

    pub fn support_qual_soft_clip_masked(&self, mask: &[bool]) -> f32 {
        self.masked_float(tags::SOFTCLIP_QUAL, mask)
    }

    pub fn non_supporting_count_masked(&self, mask: &[bool]) -> i32 {
        self.non_supporting_count_read_pair_masked(mask)
            + self.non_supporting_count_soft_clip_masked(mask)
    }

    pub fn non_supporting_count_read_pair_masked(&self, mask: &[bool]) -> i32 {
        self.masked_int(tags::NONSUPPORTING_READPAIR_COUNT, mask)
    }

    pub fn non_supporting_count_soft_clip_masked(&self, mask: &[bool]) -> i32 {
        self.masked_int(tags::NONSUPPORTING_SOFTCLIP_COUNT, mask)
    }

    pub fn non_supporting_qual_masked(&self, mask: &[bool]) -> f32 {
        self.non_supporting_qual_read_pair_masked(mask)
            + self.non_supporting_qual_soft_clip_masked(mask)
    }

    pub fn non_supporting_qual_read_pair_masked(&self, mask: &[bool]) -> f32 {
        self.masked_float(tags::NONSUPPORTING_READPAIR_QUAL, mask)
    }

    pub fn non_supporting_qual_soft_clip_masked(&self, mask: &[bool]) -> f32 {
        self.masked_float(tags::NONSUPPORTING_SOFTCLIP_QUAL, mask)
    }

    /// Sum of soft-clip and read-pair support counts over all categories.
    pub fn total_read_support_count(&self) -> i32 {
        let data = self.record.data();
        attrs::as_int_list(data.get(&tags::SOFTCLIP_COUNT))
            .iter()
            .chain(attrs::as_int_list(data.get(&tags::READPAIR_COUNT)).iter())
            .sum()
    }

    // -----------------------------------------------------------------------
    // Annotation (write path)
    // -----------------------------------------------------------------------

    /// Summarise `support` onto the assembly record.
    ///
    /// Missing support is tolerated (logged, annotated as empty); a support
    /// set containing an assembly is a programming error and fails fast.
    /// The persisted ID strings are deterministic: IDs are deduplicated and
    /// sorted within each category.
    pub fn annotate_assembly(
        ctx: &ProcessingContext,
        record: &mut RecordBuf,
        support: Option<&[DirectedEvidence]>,
    ) -> Result<(), Error> {
        let support = match support {
            Some(s) => s,
            None => {
                if !ctx.throttler.should_suppress("assemblies with no support") {
                    log::error!("No support for assembly {}", read_name(record));
                }
                &[]
            }
        };
        let n = ctx.category_count;
        let mut rp_qual = vec![0f32; n];
        let mut sc_qual = vec![0f32; n];
        let mut rp_count = vec![0i32; n];
        let mut rp_max_len = vec![0i32; n];
        let mut sc_count = vec![0i32; n];
        let mut sc_len_max = vec![0i32; n];
        let mut sc_len_total = vec![0i32; n];
        let mut max_local_mapq = 0u8;
        for e in support {
            max_local_mapq = max_local_mapq.max(e.local_mapq());
            match e {
                DirectedEvidence::ReadPair(rp) => {
                    let cat = category_index(rp.category, n)?;
                    rp_count[cat] += 1;
                    rp_qual[cat] += rp.breakend_qual;
                    rp_max_len[cat] = rp_max_len[cat].max(rp.non_reference_read_length as i32);
                }
                DirectedEvidence::SingleRead(sr) => {
                    let cat = category_index(sr.category, n)?;
                    let clip_length = sr.breakend_sequence.len() as i32;
                    sc_count[cat] += 1;
                    sc_qual[cat] += sr.breakend_qual;
                    sc_len_max[cat] = sc_len_max[cat].max(clip_length);
                    sc_len_total[cat] += clip_length;
                }
                DirectedEvidence::Assembly(_) => {
                    return Err(Error::InvariantViolation(
                        "assembly support must be a read or a read pair".to_string(),
                    ));
                }
            }
        }
        ensure_unique_evidence_ids(ctx, &read_name(record), support);

        let by_category: BTreeMap<usize, Vec<&DirectedEvidence>> =
            support.iter().fold(BTreeMap::new(), |mut acc, e| {
                acc.entry(e.source_category()).or_default().push(e);
                acc
            });
        let slots = by_category.keys().next_back().map_or(0, |&max| max + 1);
        let evidence_string = attrs::join_categories(
            &(0..slots)
                .map(|i| {
                    by_category
                        .get(&i)
                        .map(|group| {
                            group
                                .iter()
                                .map(|e| e.evidence_id().to_string())
                                .collect::<BTreeSet<_>>()
                                .into_iter()
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect::<Vec<Vec<String>>>(),
        );
        let fragment_string = attrs::join_categories(
            &(0..slots)
                .map(|i| {
                    by_category
                        .get(&i)
                        .map(|group| {
                            group
                                .iter()
                                .flat_map(|e| e.originating_fragment_ids(i))
                                .collect::<BTreeSet<_>>()
                                .into_iter()
                                .collect()
                        })
                        .unwrap_or_default()
                })
                .collect::<Vec<Vec<String>>>(),
        );
        let strand_bias = if support.is_empty() {
            0.0
        } else {
            support.iter().map(DirectedEvidence::strand_bias).sum::<f64>() / support.len() as f64
        };

        let data = record.data_mut();
        data.insert(
            tags::EVIDENCE_ID,
            Value::String(BString::from(evidence_string)),
        );
        data.insert(
            tags::SUPPORTING_FRAGMENTS,
            Value::String(BString::from(fragment_string)),
        );
        data.insert(tags::READPAIR_COUNT, Value::Array(Array::Int32(rp_count)));
        data.insert(
            tags::READPAIR_LENGTH_MAX,
            Value::Array(Array::Int32(rp_max_len)),
        );
        data.insert(tags::SOFTCLIP_COUNT, Value::Array(Array::Int32(sc_count)));
        data.insert(
            tags::SOFTCLIP_CLIPLENGTH_MAX,
            Value::Array(Array::Int32(sc_len_max)),
        );
        data.insert(
            tags::SOFTCLIP_CLIPLENGTH_TOTAL,
            Value::Array(Array::Int32(sc_len_total)),
        );
        data.insert(tags::READPAIR_QUAL, Value::Array(Array::Float(rp_qual)));
        data.insert(tags::SOFTCLIP_QUAL, Value::Array(Array::Float(sc_qual)));
        data.insert(tags::STRAND_BIAS, Value::Float(strand_bias as f32));
        *record.mapping_quality_mut() = MappingQuality::new(max_local_mapq);
        if max_local_mapq < ctx.min_mapq
            && !ctx.throttler.should_suppress("below minimum mapq")
        {
            log::warn!(
                "Sanity check failure: {} has mapq below minimum",
                read_name(record)
            );
        }
        Ok(())
    }

    /// Accumulate evidence that does NOT support the assembly breakpoint
    /// (after margin expansion) into the non-supporting count/qual arrays.
    pub fn annotate_non_supporting(
        ctx: &ProcessingContext,
        assembly_breakpoint: &BreakpointSummary,
        record: &mut RecordBuf,
        candidates: &[DirectedEvidence],
    ) -> Result<(), Error> {
        let n = ctx.category_count;
        let mut nsrp_qual = vec![0f32; n];
        let mut nssc_qual = vec![0f32; n];
        let mut nsrp_count = vec![0i32; n];
        let mut nssc_count = vec![0i32; n];
        let with_margin = ctx.with_margin(assembly_breakpoint);
        for e in candidates {
            match e {
                DirectedEvidence::ReadPair(rp) => {
                    if !with_margin.overlaps_breakend(&rp.breakend) {
                        let cat = category_index(rp.category, n)?;
                        nsrp_count[cat] += 1;
                        nsrp_qual[cat] += rp.breakend_qual;
                    }
                }
                DirectedEvidence::SingleRead(sr) => {
                    if !with_margin.overlaps_breakend(&sr.breakend) {
                        let cat = category_index(sr.category, n)?;
                        nssc_count[cat] += 1;
                        nssc_qual[cat] += sr.breakend_qual;
                    }
                }
                DirectedEvidence::Assembly(_) => {
                    return Err(Error::InvariantViolation(
                        "non-supporting candidates must be reads or read pairs".to_string(),
                    ));
                }
            }
        }
        let data = record.data_mut();
        data.insert(
            tags::NONSUPPORTING_READPAIR_COUNT,
            Value::Array(Array::Int32(nsrp_count)),
        );
        data.insert(
            tags::NONSUPPORTING_SOFTCLIP_COUNT,
            Value::Array(Array::Int32(nssc_count)),
        );
        data.insert(
            tags::NONSUPPORTING_READPAIR_QUAL,
            Value::Array(Array::Float(nsrp_qual)),
        );
        data.insert(
            tags::NONSUPPORTING_SOFTCLIP_QUAL,
            Value::Array(Array::Float(nssc_qual)),
        );
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn string_attribute(&self, tag: Tag) -> Option<String> {
        match self.record.data().get(&tag) {
            Some(Value::String(s)) => Some(s.to_string()),
            _ => None,
        }
    }

    fn int_at(&self, tag: Tag, category: usize) -> i32 {
        attrs::as_int_at(self.record.data().get(&tag), category, 0)
    }

    fn float_at(&self, tag: Tag, category: usize) -> f32 {
        attrs::as_float_at(self.record.data().get(&tag), category, 0.0)
    }

    fn masked_int(&self, tag: Tag, mask: &[bool]) -> i32 {
        attrs::masked_int_sum(self.record.data().get(&tag), mask)
    }

    fn masked_float(&self, tag: Tag, mask: &[bool]) -> f32 {
        attrs::masked_float_sum(self.record.data().get(&tag), mask)
    }
}

fn category_index(category: usize, category_count: usize) -> Result<usize, Error> {
    if category >= category_count {
        return Err(Error::InvariantViolation(format!(
            "evidence category {category} out of range for {category_count} categories"
        )));
    }
    Ok(category)
}

fn ensure_unique_evidence_ids(
    ctx: &ProcessingContext,
    assembly_name: &str,
    support: &[DirectedEvidence],
) -> bool {
    let mut seen = HashSet::new();
    let mut unique = true;
    for e in support {
        if !seen.insert(e.evidence_id()) {
            if !ctx.throttler.should_suppress("duplicated evidenceIDs") {
                log::error!(
                    "Found evidenceID {} multiple times in assembly {}",
                    e.evidence_id(),
                    assembly_name
                );
            }
            unique = false;
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::breakend::BreakendSummary;
    use crate::evidence::{NonReferenceReadPair, SingleReadEvidence};
    use crate::params::SequenceDictionary;

    fn context(category_count: usize) -> ProcessingContext {
        let dict = SequenceDictionary::new(vec![
            ("chr1".to_string(), 10_000),
            ("chr2".to_string(), 10_000),
        ])
        .unwrap();
        ProcessingContext::new(dict, category_count)
    }

    fn assembly_record() -> RecordBuf {
        let mut record = RecordBuf::default();
        record.name_mut().replace("asm1".into());
        record
    }

    fn nrp(id: &str, category: usize, qual: f32, mate_len: u32) -> DirectedEvidence {
        DirectedEvidence::ReadPair(NonReferenceReadPair {
            evidence_id: id.to_string(),
            fragment_id: format!("frag-{id}"),
            category,
            breakend: BreakendSummary::at(0, 100, Direction::Forward),
            breakend_qual: qual,
            local_mapq: 40,
            strand_bias: 1.0,
            non_reference_read_length: mate_len,
        })
    }

    fn sce(id: &str, category: usize, qual: f32, clip_len: usize) -> DirectedEvidence {
        DirectedEvidence::SingleRead(SingleReadEvidence {
            evidence_id: id.to_string(),
            fragment_id: format!("frag-{id}"),
            category,
            breakend: BreakendSummary::at(0, 100, Direction::Forward),
            breakend_qual: qual,
            local_mapq: 30,
            strand_bias: 0.0,
            breakend_sequence: vec![b'A'; clip_len],
        })
    }

    fn int_array(record: &RecordBuf, tag: Tag) -> Vec<i32> {
        attrs::as_int_list(record.data().get(&tag))
    }

    fn float_array(record: &RecordBuf, tag: Tag) -> Vec<f32> {
        attrs::as_float_list(record.data().get(&tag))
    }

    #[test]
    fn test_annotate_empty_support() {
        let ctx = context(2);
        let mut record = assembly_record();
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, None).unwrap();

        assert_eq!(int_array(&record, tags::READPAIR_COUNT), vec![0, 0]);
        assert_eq!(int_array(&record, tags::SOFTCLIP_COUNT), vec![0, 0]);
        assert_eq!(float_array(&record, tags::READPAIR_QUAL), vec![0.0, 0.0]);
        assert_eq!(
            record.data().get(&tags::EVIDENCE_ID),
            Some(&Value::String(BString::from("")))
        );
        let view = AssemblyAttributes::new(&record);
        assert!(AssemblyAttributes::is_assembly(&record));
        assert_eq!(view.strand_bias(), 0.0);
        assert!(view.evidence_ids().unwrap().is_empty());
        assert_eq!(record.mapping_quality().map(u8::from), Some(0));
        assert_eq!(ctx.throttler.occurrences("assemblies with no support"), 1);
    }

    #[test]
    fn test_annotate_mixed_single_category_support() {
        let ctx = context(2);
        let mut record = assembly_record();
        let support = vec![nrp("a", 0, 5.0, 100), sce("b", 0, 3.0, 40)];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();

        assert_eq!(int_array(&record, tags::READPAIR_COUNT), vec![1, 0]);
        assert_eq!(int_array(&record, tags::SOFTCLIP_COUNT), vec![1, 0]);
        assert_eq!(float_array(&record, tags::READPAIR_QUAL), vec![5.0, 0.0]);
        assert_eq!(float_array(&record, tags::SOFTCLIP_QUAL), vec![3.0, 0.0]);
        assert_eq!(int_array(&record, tags::READPAIR_LENGTH_MAX), vec![100, 0]);
        assert_eq!(
            int_array(&record, tags::SOFTCLIP_CLIPLENGTH_MAX),
            vec![40, 0]
        );
        assert_eq!(
            int_array(&record, tags::SOFTCLIP_CLIPLENGTH_TOTAL),
            vec![40, 0]
        );
        assert_eq!(
            record.data().get(&tags::EVIDENCE_ID),
            Some(&Value::String(BString::from("a b")))
        );
        // mapq = max local mapq of support
        assert_eq!(record.mapping_quality().map(u8::from), Some(40));
        // strand bias = mean(1.0, 0.0)
        let view = AssemblyAttributes::new(&record);
        assert_eq!(view.strand_bias(), 0.5);
    }

    #[test]
    fn test_annotate_duplicate_evidence_id() {
        let ctx = context(1);
        let mut record = assembly_record();
        let support = vec![sce("x", 0, 1.0, 10), sce("x", 0, 2.0, 20)];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();

        // both contribute to the numeric summaries, the ID is kept once
        assert_eq!(int_array(&record, tags::SOFTCLIP_COUNT), vec![2]);
        assert_eq!(
            record.data().get(&tags::EVIDENCE_ID),
            Some(&Value::String(BString::from("x")))
        );
        assert_eq!(ctx.throttler.occurrences("duplicated evidenceIDs"), 1);
    }

    #[test]
    fn test_annotate_rejects_assembly_support() {
        use crate::evidence::AssemblyEvidence;
        use noodles::core::Position;

        let ctx = context(1);
        let mut inner = assembly_record();
        AssemblyAttributes::annotate_assembly(&ctx, &mut inner, Some(&[])).unwrap();
        inner
            .data_mut()
            .insert(tags::DIRECTION, Value::Character(b'b'));
        *inner.reference_sequence_id_mut() = Some(0);
        *inner.alignment_start_mut() = Position::new(5);
        let nested =
            DirectedEvidence::Assembly(AssemblyEvidence::from_record(inner, 0).unwrap());

        let mut record = assembly_record();
        let err =
            AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&[nested]))
                .unwrap_err();
        assert!(matches!(err, Error::InvariantViolation(_)));
    }

    #[test]
    fn test_evidence_id_round_trip_with_empty_category() {
        let ctx = context(3);
        let mut record = assembly_record();
        // categories 0 and 2 populated, category 1 empty
        let support = vec![sce("b", 0, 1.0, 5), sce("a", 0, 1.0, 5), sce("c", 2, 1.0, 5)];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();

        assert_eq!(
            record.data().get(&tags::EVIDENCE_ID),
            Some(&Value::String(BString::from("a b    c")))
        );
        let view = AssemblyAttributes::new(&record);
        let ids = view.evidence_ids().unwrap();
        assert_eq!(ids.len(), 3);
        assert!(ids.contains("a") && ids.contains("b") && ids.contains("c"));
        assert_eq!(
            view.originating_fragment_ids_for(0),
            vec!["frag-a".to_string(), "frag-b".to_string()]
        );
        assert!(view.originating_fragment_ids_for(1).is_empty());
        assert_eq!(
            view.originating_fragment_ids_for(2),
            vec!["frag-c".to_string()]
        );
        // beyond the encoded slots
        assert!(view.originating_fragment_ids_for(7).is_empty());
    }

    #[test]
    fn test_annotation_is_idempotent() {
        let ctx = context(2);
        let support = vec![nrp("a", 1, 5.0, 100), sce("b", 0, 3.0, 40)];

        let mut first = assembly_record();
        AssemblyAttributes::annotate_assembly(&ctx, &mut first, Some(&support)).unwrap();
        let mut second = first.clone();
        AssemblyAttributes::annotate_assembly(&ctx, &mut second, Some(&support)).unwrap();

        assert_eq!(first.data(), second.data());
        assert_eq!(first.mapping_quality(), second.mapping_quality());
    }

    #[test]
    fn test_is_part_of_assembly_holds_for_support() {
        let ctx = context(2);
        let mut record = assembly_record();
        let support = vec![nrp("a", 0, 5.0, 100), sce("b", 1, 3.0, 40)];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();

        let view = AssemblyAttributes::new(&record);
        for e in &support {
            assert!(view.is_part_of_assembly(e).unwrap());
        }
        assert!(!view.is_part_of_assembly(&sce("z", 0, 1.0, 1)).unwrap());
    }

    #[test]
    fn test_masked_aggregation() {
        let mut record = assembly_record();
        record.data_mut().insert(
            tags::READPAIR_COUNT,
            Value::Array(Array::Int32(vec![2, 5, 7])),
        );
        let view = AssemblyAttributes::new(&record);
        assert_eq!(
            view.support_count_read_pair_masked(&[true, false, true]),
            9
        );
        assert_eq!(view.support_count_read_pair_masked(&[]), 0);
    }

    #[test]
    fn test_support_count_identity() {
        // supportCount(mask) == supportCountReadPair(mask) + supportCountSoftClip(mask)
        let ctx = context(3);
        let mut record = assembly_record();
        let support = vec![
            nrp("a", 0, 5.0, 100),
            nrp("b", 1, 2.0, 90),
            sce("c", 1, 3.0, 40),
            sce("d", 2, 4.0, 50),
        ];
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&support)).unwrap();
        let view = AssemblyAttributes::new(&record);

        for mask in [
            vec![true, true, true],
            vec![true, false, true],
            vec![false, false, false],
            vec![true],
        ] {
            assert_eq!(
                view.support_count_masked(&mask),
                view.support_count_read_pair_masked(&mask)
                    + view.support_count_soft_clip_masked(&mask)
            );
        }

        // all-true mask equals the per-category sum and the total
        let all = vec![true; 3];
        let per_category: i32 = (0..3)
            .map(|c| view.support_count_read_pair(c) + view.support_count_soft_clip(c))
            .sum();
        assert_eq!(view.support_count_masked(&all), per_category);
        assert_eq!(view.total_read_support_count(), per_category);
    }

    #[test]
    fn test_non_supporting_annotation() {
        let ctx = context(2);
        let mut record = assembly_record();
        let bp = BreakpointSummary::new(
            BreakendSummary::at(0, 100, Direction::Forward),
            BreakendSummary::at(1, 500, Direction::Backward),
        );
        // within margin of the local side
        let supporting = sce("near", 0, 3.0, 10);
        // same contig, far away
        let mut far = sce("far", 0, 7.0, 10);
        if let DirectedEvidence::SingleRead(ref mut sr) = far {
            sr.breakend = BreakendSummary::at(0, 5_000, Direction::Forward);
        }
        // read pair on the wrong contig
        let mut far_rp = nrp("farrp", 1, 2.0, 100);
        if let DirectedEvidence::ReadPair(ref mut rp) = far_rp {
            rp.breakend = BreakendSummary::at(1, 9_000, Direction::Forward);
        }
        AssemblyAttributes::annotate_non_supporting(
            &ctx,
            &bp,
            &mut record,
            &[supporting, far, far_rp],
        )
        .unwrap();

        let view = AssemblyAttributes::new(&record);
        assert_eq!(view.non_supporting_count_soft_clip(0), 1);
        assert_eq!(view.non_supporting_count_soft_clip(1), 0);
        assert_eq!(view.non_supporting_count_read_pair(1), 1);
        assert_eq!(view.non_supporting_qual_soft_clip(0), 7.0);
        assert_eq!(view.non_supporting_qual_read_pair(1), 2.0);
        assert_eq!(view.non_supporting_count_masked(&[true, true]), 2);
        assert_eq!(view.non_supporting_qual_masked(&[true, false]), 7.0);
    }

    #[test]
    fn test_missing_evidence_id_is_surfaced() {
        let record = assembly_record();
        let view = AssemblyAttributes::new(&record);
        assert!(matches!(
            view.evidence_ids(),
            Err(Error::MissingAttribute { .. })
        ));
        assert!(!AssemblyAttributes::is_assembly(&record));
    }

    #[test]
    fn test_direction_and_unanchored() {
        let mut record = assembly_record();
        assert!(!AssemblyAttributes::is_unanchored(&record));
        record
            .data_mut()
            .insert(tags::DIRECTION, Value::Character(b'b'));
        record.data_mut().insert(tags::UNANCHORED, Value::UInt8(1));
        let view = AssemblyAttributes::new(&record);
        assert_eq!(view.direction(), Some(Direction::Backward));
        assert!(AssemblyAttributes::is_unanchored(&record));
    }

    #[test]
    fn test_below_min_mapq_warns_but_annotates() {
        let ctx = context(1);
        let mut record = assembly_record();
        let mut low = sce("low", 0, 1.0, 5);
        if let DirectedEvidence::SingleRead(ref mut sr) = low {
            sr.local_mapq = 3;
        }
        AssemblyAttributes::annotate_assembly(&ctx, &mut record, Some(&[low])).unwrap();
        assert_eq!(record.mapping_quality().map(u8::from), Some(3));
        assert_eq!(ctx.throttler.occurrences("below minimum mapq"), 1);
    }
}
