use crate::breakend::BreakpointSummary;
use crate::error::Error;
use crate::throttle::MessageThrottler;

// ---------------------------------------------------------------------------
// Reference sequence dictionary
// ---------------------------------------------------------------------------

/// Contig names and lengths, with cumulative offsets for flattening
/// `(contig, position)` pairs into a single linear coordinate.
///
/// Positions are 1-based inclusive; `linear()` is strictly increasing in
/// `(contig_index, position)` order, which is what the streaming join relies
/// on for its frontier arithmetic.
#[derive(Debug, Clone)]
pub struct SequenceDictionary {
    names: Vec<String>,
    lengths: Vec<i64>,
    starts: Vec<i64>,
}

impl SequenceDictionary {
    pub fn new(contigs: Vec<(String, i64)>) -> Result<Self, Error> {
        if contigs.is_empty() {
            return Err(Error::Parameter(
                "sequence dictionary has no contigs".to_string(),
            ));
        }
        let mut names = Vec::with_capacity(contigs.len());
        let mut lengths = Vec::with_capacity(contigs.len());
        let mut starts = Vec::with_capacity(contigs.len());
        let mut offset = 0i64;
        for (name, length) in contigs {
            if length <= 0 {
                return Err(Error::Parameter(format!(
                    "contig {name} has non-positive length {length}"
                )));
            }
            names.push(name);
            lengths.push(length);
            starts.push(offset);
            offset += length;
        }
        Ok(Self {
            names,
            lengths,
            starts,
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, contig_index: usize) -> &str {
        &self.names[contig_index]
    }

    pub fn length(&self, contig_index: usize) -> i64 {
        self.lengths[contig_index]
    }

    /// Flatten a per-contig 1-based position into a genome-wide coordinate.
    pub fn linear(&self, contig_index: usize, position: i64) -> i64 {
        self.starts[contig_index] + position
    }

    /// Clamp a position into the valid range of the contig.
    pub fn clamp(&self, contig_index: usize, position: i64) -> i64 {
        position.clamp(1, self.lengths[contig_index])
    }
}

// ---------------------------------------------------------------------------
// Variant calling parameters
// ---------------------------------------------------------------------------

/// Tunables used when comparing evidence against a called breakpoint.
#[derive(Debug, Clone)]
pub struct VariantCallingParameters {
    /// Positional slack applied to each breakpoint endpoint when testing
    /// whether evidence supports the call.
    pub breakend_margin: i64,
}

impl Default for VariantCallingParameters {
    fn default() -> Self {
        Self { breakend_margin: 10 }
    }
}

impl VariantCallingParameters {
    /// Expand both endpoints of a breakpoint by the configured margin,
    /// clamped to contig bounds.
    pub fn with_margin(
        &self,
        dictionary: &SequenceDictionary,
        breakpoint: &BreakpointSummary,
    ) -> BreakpointSummary {
        breakpoint.with_margin(dictionary, self.breakend_margin)
    }
}

// ---------------------------------------------------------------------------
// Processing context
// ---------------------------------------------------------------------------

/// Shared state for one processing pipeline: the reference dictionary, the
/// sample/library table size, quality thresholds, and the log throttler.
#[derive(Debug)]
pub struct ProcessingContext {
    pub dictionary: SequenceDictionary,
    /// Number of input sample/library categories. All per-category attribute
    /// arrays have this length.
    pub category_count: usize,
    /// Assemblies whose mapping quality falls below this are flagged.
    pub min_mapq: u8,
    /// Upper bound on the library fragment size; bounds how far an evidence
    /// call position can precede its record position.
    pub max_fragment_size: i64,
    pub variant_calling: VariantCallingParameters,
    pub throttler: MessageThrottler,
}

impl ProcessingContext {
    pub fn new(dictionary: SequenceDictionary, category_count: usize) -> Self {
        Self {
            dictionary,
            category_count,
            min_mapq: 10,
            max_fragment_size: 300,
            variant_calling: VariantCallingParameters::default(),
            throttler: MessageThrottler::new(),
        }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if self.category_count == 0 {
            return Err(Error::Parameter(
                "category_count must be at least 1".to_string(),
            ));
        }
        if self.max_fragment_size <= 0 {
            return Err(Error::Parameter(format!(
                "max_fragment_size must be positive, got {}",
                self.max_fragment_size
            )));
        }
        Ok(())
    }

    /// Expand a breakpoint by the calling margin, clamped to contig bounds.
    pub fn with_margin(&self, breakpoint: &BreakpointSummary) -> BreakpointSummary {
        self.variant_calling.with_margin(&self.dictionary, breakpoint)
    }
}
