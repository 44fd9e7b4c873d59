/// Auxiliary tag names persisted on assembly records.
///
/// All tags use the locally-defined lowercase-first namespace. Array-valued
/// tags are per-category; their length equals the context's category count.
use noodles::sam::alignment::record::data::field::Tag;

/// Evidence IDs grouped by category. Presence of this tag defines
/// "is an assembly".
pub const EVIDENCE_ID: Tag = Tag::new(b'e', b'z');
/// Originating DNA fragment IDs, same encoding as `EVIDENCE_ID`.
pub const SUPPORTING_FRAGMENTS: Tag = Tag::new(b'f', b'z');
/// Assembly breakend direction, `f` or `b`.
pub const DIRECTION: Tag = Tag::new(b'a', b'd');
/// Present iff neither side of the assembly could be anchored.
pub const UNANCHORED: Tag = Tag::new(b'u', b'a');
/// Mean strand bias across supporting evidence.
pub const STRAND_BIAS: Tag = Tag::new(b's', b'b');

pub const READPAIR_COUNT: Tag = Tag::new(b'p', b'c');
pub const READPAIR_LENGTH_MAX: Tag = Tag::new(b'p', b'm');
pub const READPAIR_QUAL: Tag = Tag::new(b'p', b'q');
pub const SOFTCLIP_COUNT: Tag = Tag::new(b's', b'c');
pub const SOFTCLIP_CLIPLENGTH_MAX: Tag = Tag::new(b's', b'm');
pub const SOFTCLIP_CLIPLENGTH_TOTAL: Tag = Tag::new(b's', b't');
pub const SOFTCLIP_QUAL: Tag = Tag::new(b's', b'q');

pub const NONSUPPORTING_READPAIR_COUNT: Tag = Tag::new(b'n', b'c');
pub const NONSUPPORTING_READPAIR_QUAL: Tag = Tag::new(b'n', b'q');
pub const NONSUPPORTING_SOFTCLIP_COUNT: Tag = Tag::new(b'm', b'c');
pub const NONSUPPORTING_SOFTCLIP_QUAL: Tag = Tag::new(b'm', b'q');

/// Item separator within one category of an ID string.
pub const ID_COMPONENT_SEPARATOR: &str = " ";
/// Category separator of an ID string. Two separators back to back; parsers
/// must not collapse runs, or empty category slots would be lost.
pub const ID_CATEGORY_SEPARATOR: &str = "  ";
