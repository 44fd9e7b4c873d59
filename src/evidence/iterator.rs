/// Streaming, order-preserving join of evidence and realignment streams.
///
/// Up to four position-sorted inputs are merged into one stream of enriched
/// breakend records: soft-clipped/anchored SV reads, their mates (sorted by
/// mate coordinate), realigned breakend sequences (sorted by the call
/// position embedded in their read names), and pre-formed assembly records.
///
/// Evidence is buffered keyed by call position and evidence ID, realignments
/// attach to buffered evidence by exact key match, and a buffered entry is
/// emitted once every input has advanced far enough that nothing earlier can
/// still arrive. Outputs are therefore non-decreasing in call position.
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::iter::Peekable;

use noodles::sam::alignment::record_buf::RecordBuf;

use crate::assembly::AssemblyAttributes;
use crate::breakend::{BreakendSummary, BreakpointSummary};
use crate::error::Error;
use crate::evidence::realign::{realigned_breakpoint, Realignment, RealignmentKey};
use crate::evidence::{
    AssemblyEvidence, DirectedEvidence, NonReferenceReadPair, SingleReadEvidence,
};
use crate::params::{ProcessingContext, SequenceDictionary};

// ---------------------------------------------------------------------------
// Output type
// ---------------------------------------------------------------------------

/// One piece of evidence, enriched with its realignment when one arrived.
#[derive(Debug, Clone)]
pub struct BreakendRecord {
    pub evidence: DirectedEvidence,
    pub realignment: Option<Realignment>,
}

impl BreakendRecord {
    pub fn breakend(&self) -> &BreakendSummary {
        self.evidence.breakend()
    }

    /// The full breakpoint when the breakend sequence realigned somewhere.
    pub fn breakpoint(&self) -> Option<&BreakpointSummary> {
        self.realignment.as_ref().and_then(Realignment::breakpoint)
    }

    /// Whether a realignment was attempted for this evidence, mapped or not.
    pub fn is_realigned(&self) -> bool {
        self.realignment.is_some()
    }
}

// ---------------------------------------------------------------------------
// Mate stream matching
// ---------------------------------------------------------------------------

/// Ordering of the mate stream: records sorted by the coordinate of their
/// mate, unplaced mates last.
pub fn mate_coordinate_cmp(a: &RecordBuf, b: &RecordBuf) -> Ordering {
    let key = |r: &RecordBuf| {
        (
            r.mate_reference_sequence_id().is_none(),
            r.mate_reference_sequence_id().unwrap_or(0),
            r.mate_alignment_start().map(usize::from).unwrap_or(0),
        )
    };
    key(a).cmp(&key(b))
}

/// Pulls mate records out of a mate-coordinate-sorted stream as the anchor
/// stream reaches their partner's position.
struct MateMatcher<M: Iterator<Item = RecordBuf>> {
    stream: Option<Peekable<M>>,
    current: Option<i64>,
    at_current: HashMap<String, RecordBuf>,
}

impl<M: Iterator<Item = RecordBuf>> MateMatcher<M> {
    fn new(stream: Option<M>) -> Self {
        Self {
            stream: stream.map(Iterator::peekable),
            current: None,
            at_current: HashMap::new(),
        }
    }

    /// The mate of `anchor`, if the stream holds a record whose mate
    /// coordinate equals the anchor's position and whose name matches.
    fn take(&mut self, dict: &SequenceDictionary, anchor: &RecordBuf) -> Option<RecordBuf> {
        let key = record_linear(dict, anchor)?;
        let stream = self.stream.as_mut()?;
        if self.current != Some(key) {
            self.at_current.clear();
            while let Some(mate) = stream.peek() {
                match mate_linear(dict, mate) {
                    Some(p) if p < key => {
                        stream.next();
                    }
                    Some(p) if p == key => {
                        let mate = stream.next().unwrap();
                        let name = mate.name().map(|n| n.to_string());
                        if let Some(name) = name {
                            self.at_current.insert(name, mate);
                        }
                    }
                    _ => break,
                }
            }
            self.current = Some(key);
        }
        let name = anchor.name()?.to_string();
        self.at_current.remove(&name)
    }
}

fn record_linear(dict: &SequenceDictionary, record: &RecordBuf) -> Option<i64> {
    let contig = record.reference_sequence_id()?;
    if contig >= dict.len() {
        return None;
    }
    let position = record.alignment_start().map(|p| usize::from(p) as i64)?;
    Some(dict.linear(contig, position))
}

fn mate_linear(dict: &SequenceDictionary, record: &RecordBuf) -> Option<i64> {
    let contig = record.mate_reference_sequence_id()?;
    if contig >= dict.len() {
        return None;
    }
    let position = record.mate_alignment_start().map(|p| usize::from(p) as i64)?;
    Some(dict.linear(contig, position))
}

// ---------------------------------------------------------------------------
// The join iterator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct PendingKey {
    linear: i64,
    evidence_id: String,
}

struct PendingEntry {
    evidence: DirectedEvidence,
    realignment: Option<Realignment>,
    /// Soft clips and assemblies await realignment; read pairs do not.
    realignable: bool,
}

enum Source {
    Sv,
    Assembly,
    Realigned,
}

pub struct DirectedEvidenceIterator<'a, S, M, R, A>
where
    S: Iterator<Item = RecordBuf>,
    M: Iterator<Item = RecordBuf>,
    R: Iterator<Item = RecordBuf>,
    A: Iterator<Item = RecordBuf>,
{
    ctx: &'a ProcessingContext,
    source_category: usize,
    sv: Peekable<S>,
    mates: MateMatcher<M>,
    realigned: Option<Peekable<R>>,
    assemblies: Option<Peekable<A>>,
    pending: BTreeMap<PendingKey, PendingEntry>,
    realign_watermark: i64,
}

impl<'a, S, M, R, A> DirectedEvidenceIterator<'a, S, M, R, A>
where
    S: Iterator<Item = RecordBuf>,
    M: Iterator<Item = RecordBuf>,
    R: Iterator<Item = RecordBuf>,
    A: Iterator<Item = RecordBuf>,
{
    pub fn new(
        ctx: &'a ProcessingContext,
        source_category: usize,
        sv: S,
        mates: Option<M>,
        realigned: Option<R>,
        assemblies: Option<A>,
    ) -> Self {
        Self {
            ctx,
            source_category,
            sv: sv.peekable(),
            mates: MateMatcher::new(mates),
            realigned: realigned.map(Iterator::peekable),
            assemblies: assemblies.map(Iterator::peekable),
            pending: BTreeMap::new(),
            realign_watermark: i64::MIN,
        }
    }

    /// Effective position of the next SV record; unplaced records sort last
    /// so they are drained and skipped after everything positioned.
    fn sv_position(&mut self) -> Option<i64> {
        self.sv
            .peek()
            .map(|r| record_linear(&self.ctx.dictionary, r).unwrap_or(i64::MAX))
    }

    fn assembly_position(&mut self) -> Option<i64> {
        self.assemblies
            .as_mut()?
            .peek()
            .map(|r| record_linear(&self.ctx.dictionary, r).unwrap_or(i64::MAX))
    }

    /// Embedded call position of the next realignment. Malformed names sort
    /// first so they are consumed and dropped immediately.
    fn realigned_position(&mut self) -> Option<i64> {
        let dict = &self.ctx.dictionary;
        self.realigned.as_mut()?.peek().map(|r| {
            r.name()
                .and_then(|name| RealignmentKey::parse(&name.to_string()).ok())
                .filter(|key| key.contig_index < dict.len())
                .map(|key| dict.linear(key.contig_index, key.position))
                .unwrap_or(i64::MIN)
        })
    }

    /// Position below which no further evidence or realignment can arrive.
    /// Read-pair call windows may begin up to one fragment length before
    /// their anchor record, hence the look-back on the SV stream.
    fn frontier(&mut self) -> i64 {
        let window = self.ctx.max_fragment_size;
        let mut frontier = i64::MAX;
        if let Some(p) = self.sv_position() {
            frontier = frontier.min(p.saturating_sub(window));
        }
        if let Some(p) = self.assembly_position() {
            frontier = frontier.min(p);
        }
        if let Some(p) = self.realigned_position() {
            frontier = frontier.min(p);
        }
        frontier
    }

    /// Consume one record from the stream with the smallest next position.
    /// Evidence streams win ties against the realignment stream so that
    /// realignments always find their evidence already buffered.
    fn advance(&mut self) -> bool {
        let mut best: Option<(i64, Source)> = None;
        for (position, source) in [
            (self.sv_position(), Source::Sv),
            (self.assembly_position(), Source::Assembly),
            (self.realigned_position(), Source::Realigned),
        ]
        .into_iter()
        .filter_map(|(p, s)| p.map(|p| (p, s)))
        {
            if best.as_ref().map_or(true, |(b, _)| position < *b) {
                best = Some((position, source));
            }
        }
        match best {
            None => false,
            Some((_, Source::Sv)) => {
                let record = self.sv.next().unwrap();
                self.process_sv_record(record);
                true
            }
            Some((_, Source::Assembly)) => {
                let record = self.assemblies.as_mut().unwrap().next().unwrap();
                self.process_assembly_record(record);
                true
            }
            Some((_, Source::Realigned)) => {
                let record = self.realigned.as_mut().unwrap().next().unwrap();
                if let Err(err) = self.process_realignment(record) {
                    let key = match err {
                        Error::RealignmentOutOfOrder { .. } => "realignment out of order",
                        Error::RealignmentUnmatched { .. } => "unmatched realignment",
                        _ => "malformed realignment key",
                    };
                    if !self.ctx.throttler.should_suppress(key) {
                        log::warn!("{err}");
                    }
                }
                true
            }
        }
    }

    fn process_sv_record(&mut self, record: RecordBuf) {
        let flags = record.flags();
        if flags.is_unmapped()
            || flags.is_secondary()
            || flags.is_supplementary()
            || flags.is_duplicate()
        {
            return;
        }
        if record.name().is_none() || record_linear(&self.ctx.dictionary, &record).is_none() {
            if !self.ctx.throttler.should_suppress("unusable sv record") {
                log::warn!("Skipping record with no usable name or position");
            }
            return;
        }
        if AssemblyAttributes::is_assembly(&record) {
            self.process_assembly_record(record);
            return;
        }
        if flags.is_segmented() && !flags.is_properly_segmented() {
            match self.mates.take(&self.ctx.dictionary, &record) {
                Some(mate) => {
                    match NonReferenceReadPair::from_records(
                        self.ctx,
                        &record,
                        &mate,
                        self.source_category,
                    ) {
                        Ok(rp) => self.push(DirectedEvidence::ReadPair(rp), false),
                        Err(err) => {
                            if !self.ctx.throttler.should_suppress("invalid read pair") {
                                log::warn!("{err}");
                            }
                        }
                    }
                }
                None => {
                    if !self.ctx.throttler.should_suppress("mate not found") {
                        log::warn!(
                            "No mate record for {}",
                            record.name().map(|n| n.to_string()).unwrap_or_default()
                        );
                    }
                }
            }
        }
        for sr in SingleReadEvidence::from_soft_clips(&record, self.source_category) {
            self.push(DirectedEvidence::SingleRead(sr), true);
        }
    }

    fn process_assembly_record(&mut self, record: RecordBuf) {
        match AssemblyEvidence::from_record(record, self.source_category) {
            Ok(assembly) => self.push(DirectedEvidence::Assembly(assembly), true),
            Err(err) => {
                if !self.ctx.throttler.should_suppress("invalid assembly record") {
                    log::warn!("{err}");
                }
            }
        }
    }

    fn process_realignment(&mut self, record: RecordBuf) -> Result<(), Error> {
        let name = record
            .name()
            .map(|n| n.to_string())
            .ok_or_else(|| Error::RealignmentKey(String::new()))?;
        let key = RealignmentKey::parse(&name)?;
        if key.contig_index >= self.ctx.dictionary.len() {
            return Err(Error::RealignmentKey(name));
        }
        let linear = self.ctx.dictionary.linear(key.contig_index, key.position);
        if linear < self.realign_watermark {
            return Err(Error::RealignmentOutOfOrder {
                read_name: name,
                position: linear,
                watermark: self.realign_watermark,
            });
        }
        self.realign_watermark = linear;
        let pending_key = PendingKey {
            linear,
            evidence_id: key.evidence_id,
        };
        match self.pending.get_mut(&pending_key) {
            Some(entry) if entry.realignable && entry.realignment.is_none() => {
                entry.realignment = Some(if record.flags().is_unmapped() {
                    Realignment::Unmapped
                } else {
                    match realigned_breakpoint(entry.evidence.breakend(), &record) {
                        Some(breakpoint) => Realignment::Mapped { record, breakpoint },
                        None => Realignment::Unmapped,
                    }
                });
                Ok(())
            }
            _ => Err(Error::RealignmentUnmatched { read_name: name }),
        }
    }

    fn push(&mut self, evidence: DirectedEvidence, realignable: bool) {
        let breakend = evidence.breakend();
        let key = PendingKey {
            linear: self
                .ctx
                .dictionary
                .linear(breakend.contig_index, breakend.start),
            evidence_id: evidence.evidence_id().to_string(),
        };
        if self.pending.contains_key(&key) {
            if !self.ctx.throttler.should_suppress("duplicate pending evidence") {
                log::warn!("Duplicate evidence {} buffered at one position", key.evidence_id);
            }
            return;
        }
        self.pending.insert(
            key,
            PendingEntry {
                evidence,
                realignment: None,
                realignable,
            },
        );
    }

    fn emit(entry: PendingEntry) -> BreakendRecord {
        BreakendRecord {
            evidence: entry.evidence,
            realignment: entry.realignment,
        }
    }
}

impl<'a, S, M, R, A> Iterator for DirectedEvidenceIterator<'a, S, M, R, A>
where
    S: Iterator<Item = RecordBuf>,
    M: Iterator<Item = RecordBuf>,
    R: Iterator<Item = RecordBuf>,
    A: Iterator<Item = RecordBuf>,
{
    type Item = BreakendRecord;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let frontier = self.frontier();
            let emit_now = self
                .pending
                .first_key_value()
                .map_or(false, |(key, _)| key.linear < frontier);
            if emit_now {
                let (_, entry) = self.pending.pop_first().unwrap();
                return Some(Self::emit(entry));
            }
            if !self.advance() {
                return self.pending.pop_first().map(|(_, entry)| Self::emit(entry));
            }
        }
    }
}
