//! Core data model for the corpus hierarchy.
//!
//! This module contains:
//! - Document identity, language, and provenance metadata
//! - The arena document tree with cached token aggregates
//! - Structural node types and depth ranks
//! - Single-writer handles with snapshot isolation
//! - Versioned sentence alignments

mod alignment;
mod document;
mod node;
mod snapshot;
mod tree;

// Re-export document types
pub use document::{DocumentId, DocumentMeta, Language};

// Re-export node types
pub use node::{NodeId, SentenceLeaf, StructuralNode, TextRange, SENTENCE_RANK};

// Re-export tree and iteration
pub use tree::{ChildIter, DfsIter, DocumentTree, LeafIter, TreeBuilder};

// Re-export snapshot handle
pub use snapshot::TreeHandle;

// Re-export alignment types
pub use alignment::{Alignment, AlignmentId, GlobalLeafId};
