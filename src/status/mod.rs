//! Processing-status state machine for sentences and alignments.
//!
//! Every sentence and alignment carries a processing status that decides
//! whether it is usable in the corpus. Status changes are only legal along
//! the explicit transition table below; anything else is rejected with
//! [`TransitionError::Illegal`] and leaves the entity untouched. Accepted
//! transitions produce an immutable [`AuditRecord`], written transactionally
//! with the status change.
//!
//! ```text
//!            ┌────────────── redo ──────────────┐
//!            ▼                                  │
//!          raw ── auto ──▶ machine_generated ───┼── approve ──▶ validated
//!            │                                  │
//!            └── manual ─▶ human_generated ─────┴── reject ───▶ rejected
//! ```
//!
//! `validated` and `rejected` are terminal: `validated` content is usable,
//! `rejected` content is retained but excluded from the corpus.

mod store;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::{AlignmentId, GlobalLeafId};

pub use store::{MemoryStatusStore, StatusStore};

/// Workflow status of a sentence or alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingStatus {
    /// Initial state: collected but not yet labeled.
    #[default]
    Raw,
    /// Labeled by an automatic process, pending review.
    MachineGenerated,
    /// Labeled by a human, pending review.
    HumanGenerated,
    /// Approved; usable in the corpus. Terminal.
    Validated,
    /// Rejected; retained but excluded from the corpus. Terminal.
    Rejected,
}

impl ProcessingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProcessingStatus::Raw => "raw",
            ProcessingStatus::MachineGenerated => "machine_generated",
            ProcessingStatus::HumanGenerated => "human_generated",
            ProcessingStatus::Validated => "validated",
            ProcessingStatus::Rejected => "rejected",
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProcessingStatus::Validated | ProcessingStatus::Rejected)
    }
}

impl std::fmt::Display for ProcessingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A reviewer's verdict on labeled content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    /// Send back for relabeling.
    Redo,
    /// Accept into the corpus.
    Approve,
    /// Exclude from the corpus.
    Reject,
}

impl ReviewDecision {
    /// The status this decision moves an entity to.
    pub fn target(&self) -> ProcessingStatus {
        match self {
            ReviewDecision::Redo => ProcessingStatus::Raw,
            ReviewDecision::Approve => ProcessingStatus::Validated,
            ReviewDecision::Reject => ProcessingStatus::Rejected,
        }
    }
}

/// The transition table. Everything not listed is illegal.
pub fn transition_allowed(from: ProcessingStatus, to: ProcessingStatus) -> bool {
    use ProcessingStatus::*;
    matches!(
        (from, to),
        (Raw, MachineGenerated)
            | (Raw, HumanGenerated)
            | (MachineGenerated | HumanGenerated, Raw | Validated | Rejected)
    )
}

/// Check a requested transition against the table.
pub fn check_transition(
    from: ProcessingStatus,
    to: ProcessingStatus,
) -> Result<(), TransitionError> {
    if transition_allowed(from, to) {
        Ok(())
    } else {
        Err(TransitionError::Illegal { from, to })
    }
}

/// What kind of entity a status belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Sentence,
    Alignment,
}

/// Identity of a status-carrying entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityId {
    Sentence(GlobalLeafId),
    Alignment(AlignmentId),
}

impl EntityId {
    pub fn kind(&self) -> EntityKind {
        match self {
            EntityId::Sentence(_) => EntityKind::Sentence,
            EntityId::Alignment(_) => EntityKind::Alignment,
        }
    }
}

/// A rejected transition request. The entity is left unchanged.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("illegal status transition {from} -> {to}")]
    Illegal {
        from: ProcessingStatus,
        to: ProcessingStatus,
    },
    /// A conditional write lost to a concurrent transition.
    #[error("status changed concurrently: expected {expected}, found {actual}")]
    Conflict {
        expected: ProcessingStatus,
        actual: ProcessingStatus,
    },
}

/// Immutable record of one accepted transition: who moved what, from where
/// to where, and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditRecord {
    pub entity: EntityId,
    pub kind: EntityKind,
    pub actor: String,
    pub previous: ProcessingStatus,
    pub new_status: ProcessingStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    pub recorded_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use ProcessingStatus::*;

    const ALL: [ProcessingStatus; 5] =
        [Raw, MachineGenerated, HumanGenerated, Validated, Rejected];

    #[test]
    fn test_legal_transitions() {
        assert!(transition_allowed(Raw, MachineGenerated));
        assert!(transition_allowed(Raw, HumanGenerated));
        for labeled in [MachineGenerated, HumanGenerated] {
            assert!(transition_allowed(labeled, Raw));
            assert!(transition_allowed(labeled, Validated));
            assert!(transition_allowed(labeled, Rejected));
        }
    }

    #[test]
    fn test_terminal_states_admit_nothing() {
        for terminal in [Validated, Rejected] {
            for to in ALL {
                assert!(
                    !transition_allowed(terminal, to),
                    "{terminal} -> {to} must be illegal"
                );
            }
        }
    }

    #[test]
    fn test_everything_not_listed_is_illegal() {
        let listed = [
            (Raw, MachineGenerated),
            (Raw, HumanGenerated),
            (MachineGenerated, Raw),
            (MachineGenerated, Validated),
            (MachineGenerated, Rejected),
            (HumanGenerated, Raw),
            (HumanGenerated, Validated),
            (HumanGenerated, Rejected),
        ];
        for from in ALL {
            for to in ALL {
                assert_eq!(
                    transition_allowed(from, to),
                    listed.contains(&(from, to)),
                    "table mismatch for {from} -> {to}"
                );
            }
        }
    }

    #[test]
    fn test_review_decision_targets() {
        assert_eq!(ReviewDecision::Redo.target(), Raw);
        assert_eq!(ReviewDecision::Approve.target(), Validated);
        assert_eq!(ReviewDecision::Reject.target(), Rejected);
    }
}
