use std::sync::Arc;

use tracing::warn;
use uuid::Uuid;

use crate::archiver::Archiver;
use crate::codec::{JsonCodec, SnapshotCodec};
use crate::domain::{Auditable, HistoryAction, HistoryEntry};
use crate::recorder::HistoryRecorder;
use crate::rollback::{RollbackEngine, RollbackResult};
use crate::store::{EntityStore, HistoryStore, StoreResult, UserDirectory};

/// How many entries the audit trail view shows unless asked otherwise.
pub const DEFAULT_LIST_LIMIT: usize = 30;

/// Decoded view of a history entry for the read path. A corrupt snapshot
/// decodes to `None` here instead of failing the whole listing.
#[derive(Debug)]
pub struct EntryPreview<E> {
    pub before: Option<E>,
    pub after: Option<E>,
}

/// Audit log for one entity family: routes committed mutations into the
/// recorder, undo requests into the rollback engine, and exposes the
/// administrative read and purge operations. Instantiate one per family at
/// startup; families never share a log or a cap.
pub struct AuditLog<E> {
    family: String,
    codec: Arc<dyn SnapshotCodec<E>>,
    history: Arc<dyn HistoryStore>,
    recorder: HistoryRecorder<E>,
    rollback: RollbackEngine<E>,
}

impl<E: Auditable> AuditLog<E> {
    pub fn new(
        family: impl Into<String>,
        entities: Arc<dyn EntityStore<E>>,
        history: Arc<dyn HistoryStore>,
        directory: Arc<dyn UserDirectory>,
        codec: Arc<dyn SnapshotCodec<E>>,
        cap: usize,
    ) -> Self {
        let family = family.into();
        let archiver = Archiver::new(family.clone(), Arc::clone(&history), cap);
        let recorder = HistoryRecorder::new(
            family.clone(),
            Arc::clone(&codec),
            Arc::clone(&history),
            directory,
            archiver,
        );
        let rollback = RollbackEngine::new(
            family.clone(),
            Arc::clone(&codec),
            entities,
            Arc::clone(&history),
        );
        Self {
            family,
            codec,
            history,
            recorder,
            rollback,
        }
    }

    /// Convenience constructor using the JSON snapshot codec.
    pub fn with_json_codec(
        family: impl Into<String>,
        entities: Arc<dyn EntityStore<E>>,
        history: Arc<dyn HistoryStore>,
        directory: Arc<dyn UserDirectory>,
        cap: usize,
    ) -> Self {
        Self::new(
            family,
            entities,
            history,
            directory,
            Arc::new(JsonCodec::<E>::new()),
            cap,
        )
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    /// Record one committed mutation; fail-soft, see
    /// [`HistoryRecorder::record`].
    pub async fn record_mutation(
        &self,
        action: HistoryAction,
        before: Option<&E>,
        after: Option<&E>,
        actor_id: Option<&str>,
    ) {
        self.recorder.record(action, before, after, actor_id).await;
    }

    /// Undo one recorded mutation; fail-hard, see
    /// [`RollbackEngine::rollback`].
    pub async fn rollback(&self, entry_id: Uuid) -> RollbackResult<()> {
        self.rollback.rollback(entry_id).await
    }

    /// Most recent entries first; backs the audit trail view.
    pub async fn list_recent(&self, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        self.history.list_recent(limit).await
    }

    /// [`Self::list_recent`] with the default page size of
    /// [`DEFAULT_LIST_LIMIT`] entries.
    pub async fn recent(&self) -> StoreResult<Vec<HistoryEntry>> {
        self.list_recent(DEFAULT_LIST_LIMIT).await
    }

    pub async fn count(&self) -> StoreResult<usize> {
        self.history.count().await
    }

    /// Administrative bulk purge of the family's whole log.
    pub async fn clear_all(&self) -> StoreResult<()> {
        self.history.delete_all().await
    }

    /// Decode both snapshots of an entry for display. Corrupt payloads are
    /// logged and rendered as `None`; the read path never fails on them.
    pub fn preview(&self, entry: &HistoryEntry) -> EntryPreview<E> {
        let decode = |snapshot: Option<&crate::codec::Snapshot>, which: &str| {
            let snapshot = snapshot?;
            match self.codec.decode(snapshot) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(
                        family = %self.family,
                        entry = %entry.id,
                        which,
                        error = %e,
                        "corrupt snapshot on read path"
                    );
                    None
                }
            }
        };
        EntryPreview {
            before: decode(entry.before.as_ref(), "before"),
            after: decode(entry.after.as_ref(), "after"),
        }
    }
}
