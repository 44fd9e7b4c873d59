/// Errors surfaced by the assembly-evidence core.
///
/// Data-quality problems (duplicate evidence IDs, missing support, unmatched
/// realignments) are logged and absorbed rather than surfaced; the variants
/// here are the structural failures a caller must handle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid parameter: {0}")]
    Parameter(String),

    #[error("invariant violation: {0}")]
    InvariantViolation(String),

    #[error("record '{read_name}' has no {tag} attribute")]
    MissingAttribute { tag: &'static str, read_name: String },

    #[error("invalid evidence identifier {0:?}")]
    InvalidEvidenceId(String),

    #[error("malformed realignment key {0:?}")]
    RealignmentKey(String),

    #[error("realignment '{read_name}' at linear position {position} arrived after position {watermark}")]
    RealignmentOutOfOrder {
        read_name: String,
        position: i64,
        watermark: i64,
    },

    #[error("realignment '{read_name}' matches no pending evidence")]
    RealignmentUnmatched { read_name: String },
}

impl Error {
    /// Convenience for wrapping a missing-attribute query with the record name.
    pub fn missing_attribute(tag: &'static str, read_name: impl Into<String>) -> Self {
        Self::MissingAttribute {
            tag,
            read_name: read_name.into(),
        }
    }
}
