//! Status storage with atomic check-then-write.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::Utc;
use tracing::{debug, warn};

use super::{
    check_transition, AuditRecord, EntityId, ProcessingStatus, TransitionError,
};

/// Status persistence with per-entity transition atomicity.
///
/// Implementations must make `request_transition` atomic per entity: of two
/// simultaneous requests on the same entity, exactly one may win, and the
/// audit record must be persisted together with the status change (both or
/// neither). A relational store would use a conditional `UPDATE ... WHERE
/// status = expected` plus the audit insert in one transaction.
pub trait StatusStore {
    /// Current status of an entity. Entities never seen before are `Raw`.
    fn status(&self, entity: &EntityId) -> ProcessingStatus;

    /// Check the requested transition against the table and, if legal,
    /// apply it and append the audit record.
    ///
    /// Rejected requests leave the entity unchanged and write no
    /// status-change record.
    fn request_transition(
        &self,
        entity: EntityId,
        new_status: ProcessingStatus,
        actor: &str,
        note: Option<String>,
    ) -> Result<AuditRecord, TransitionError>;
}

#[derive(Default)]
struct StoreInner {
    statuses: HashMap<EntityId, ProcessingStatus>,
    audit: Vec<AuditRecord>,
}

/// In-memory reference store.
///
/// One mutex guards both the status map and the audit trail, so the
/// check-then-write and the audit append happen in a single critical
/// section; a losing concurrent request re-reads the committed status and
/// fails the table check.
#[derive(Default)]
pub struct MemoryStatusStore {
    inner: Mutex<StoreInner>,
}

impl MemoryStatusStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The audit trail so far, in commit order.
    pub fn audit_trail(&self) -> Vec<AuditRecord> {
        self.lock().audit.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl StatusStore for MemoryStatusStore {
    fn status(&self, entity: &EntityId) -> ProcessingStatus {
        self.lock().statuses.get(entity).copied().unwrap_or_default()
    }

    fn request_transition(
        &self,
        entity: EntityId,
        new_status: ProcessingStatus,
        actor: &str,
        note: Option<String>,
    ) -> Result<AuditRecord, TransitionError> {
        let mut inner = self.lock();
        let current = inner.statuses.get(&entity).copied().unwrap_or_default();

        if let Err(err) = check_transition(current, new_status) {
            warn!(
                entity = ?entity,
                %current,
                requested = %new_status,
                actor,
                "rejected illegal status transition"
            );
            return Err(err);
        }

        let record = AuditRecord {
            entity,
            kind: entity.kind(),
            actor: actor.to_string(),
            previous: current,
            new_status,
            note,
            recorded_at: Utc::now(),
        };

        // Audit before status, inside one critical section: the trail is
        // authoritative and must never lag a committed change.
        inner.audit.push(record.clone());
        inner.statuses.insert(entity, new_status);

        debug!(entity = ?entity, from = %current, to = %new_status, actor, "status transition applied");
        Ok(record)
    }
}
