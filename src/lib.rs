//! Assembly-evidence core for structural variant calling.
//!
//! Takes per-read directed evidence of putative breakends (soft-clipped
//! reads, discordant read pairs), annotates the assemblies built from that
//! evidence with bit-reproducible provenance and support statistics, and
//! joins assemblies and evidence with their realigned remote breakends in
//! call-position order. Alignment, sorting, variant scoring and file I/O
//! live outside this crate; records cross the boundary as
//! `noodles` SAM record buffers.

pub mod error;
pub mod params;

pub mod assembly;
pub mod breakend;
pub mod debruijn;
pub mod evidence;
pub mod interval;
pub mod throttle;

pub use error::Error;
pub use params::{ProcessingContext, SequenceDictionary, VariantCallingParameters};
