//! Sentence alignment entities.
//!
//! An alignment pairs one sentence leaf in each language of a parallel
//! document pair. Alignments are versioned: a correction creates a successor
//! record linked to its predecessor rather than mutating history, matching
//! the manual correction workflow (a corrector inserts a shifted row, the
//! old row stays). Removal is the terminal `Rejected` status, not a delete.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::document::DocumentId;
use super::node::NodeId;
use crate::status::ProcessingStatus;

/// Identity of a sentence leaf across documents: the owning document plus
/// the node's ID within that document's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GlobalLeafId {
    pub document: DocumentId,
    pub node: NodeId,
}

impl GlobalLeafId {
    pub fn new(document: DocumentId, node: NodeId) -> Self {
        Self { document, node }
    }
}

/// Stable identifier for an alignment lineage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlignmentId(pub Uuid);

impl AlignmentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AlignmentId {
    fn default() -> Self {
        Self::new()
    }
}

/// One version of a sentence-to-sentence pairing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Alignment {
    pub id: AlignmentId,
    /// 1-based version within the lineage.
    pub version: u32,
    /// The version this record corrects, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predecessor: Option<u32>,
    pub source: GlobalLeafId,
    pub target: GlobalLeafId,
    pub status: ProcessingStatus,
}

impl Alignment {
    /// First version of a new alignment lineage, starting `Raw`.
    pub fn new(source: GlobalLeafId, target: GlobalLeafId) -> Self {
        Self {
            id: AlignmentId::new(),
            version: 1,
            predecessor: None,
            source,
            target,
            status: ProcessingStatus::Raw,
        }
    }

    /// Create the successor version with a corrected pairing.
    ///
    /// The current record is left untouched; the successor starts `Raw` and
    /// re-enters review.
    pub fn correct(&self, source: GlobalLeafId, target: GlobalLeafId) -> Self {
        Self {
            id: self.id,
            version: self.version + 1,
            predecessor: Some(self.version),
            source,
            target,
            status: ProcessingStatus::Raw,
        }
    }
}
