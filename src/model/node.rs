//! Structural node types for the document hierarchy.

use serde::{Deserialize, Serialize};

use super::document::Language;

/// Reserved depth rank for sentence leaves.
///
/// Rank 0 ("word") is conceptual only and never materialized as a node;
/// every stored leaf sits at this rank, whatever the shape of the levels
/// above it.
pub const SENTENCE_RANK: u8 = 1;

/// Unique identifier for a node within a [`DocumentTree`](super::DocumentTree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    /// The root node ID (always 0).
    pub const ROOT: NodeId = NodeId(0);
}

/// Range into a document's shared text buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextRange {
    /// Byte offset into `DocumentTree::text`.
    pub start: u32,
    /// Length in bytes.
    pub len: u32,
}

impl TextRange {
    pub fn new(start: u32, len: u32) -> Self {
        Self { start, len }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn end(&self) -> u32 {
        self.start + self.len
    }
}

/// Sentence payload carried by leaf nodes.
///
/// The text itself lives in the document's shared buffer; the leaf only
/// holds the range. A leaf's language can differ from the document's (e.g.
/// scripture quotations left untranslated), so it is stored per leaf.
#[derive(Debug, Clone)]
pub struct SentenceLeaf {
    pub text: TextRange,
    pub language: Language,
}

/// A node in the document hierarchy.
///
/// Nodes are created once during ingestion with their parent fixed at
/// creation time and never reparented; the parent is a back-reference only,
/// ownership lives in the arena. The only field that changes after
/// construction is the cached `token_count`, maintained along the ancestor
/// chain when a leaf's text is edited.
#[derive(Debug, Clone)]
pub struct StructuralNode {
    /// Back-reference to the parent; `None` only for the root.
    pub parent: Option<NodeId>,
    /// Semantic level label ("book", "chapter", "paragraph", ...). Free-form:
    /// hierarchy shape varies per work, so labels are not an enumeration.
    pub label: String,
    /// Numeric depth rank, strictly decreasing from root toward leaves.
    /// Leaves always carry [`SENTENCE_RANK`].
    pub rank: u8,
    /// 0-based position among siblings; contiguous and unique per parent.
    pub ordinal: u32,
    /// Sum of all descendant leaf token counts (for leaves, the measured
    /// count of the leaf's own text).
    pub token_count: u64,
    /// Ordered children; insertion order is document order.
    pub children: Vec<NodeId>,
    /// Present iff this node is a sentence leaf.
    pub leaf: Option<SentenceLeaf>,
}

impl StructuralNode {
    /// Whether this node is a sentence leaf.
    pub fn is_leaf(&self) -> bool {
        self.leaf.is_some()
    }
}
