pub mod kmer_path;
pub mod traversal;

// Re-export commonly used types
pub use kmer_path::{KmerPathNode, KmerPathSubnode};
pub use traversal::TraversalNode;
