use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use uuid::Uuid;

use crate::codec::{SnapshotCodec, SnapshotError};
use crate::domain::{Auditable, HistoryAction, HistoryEntry};
use crate::store::{EntityStore, HistoryStore, StoreError};

#[derive(Error, Debug)]
pub enum RollbackError {
    #[error("history entry not found")]
    NotFound,
    #[error("rollback conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type RollbackResult<T> = Result<T, RollbackError>;

/// Undoes a recorded mutation and consumes its history entry.
///
/// This is the fail-hard side of the subsystem: any failure aborts the whole
/// rollback, surfaces to the caller, and leaves the entry retained. A partial
/// rollback would corrupt both the entity and the meaning of the log.
pub struct RollbackEngine<E> {
    family: String,
    codec: Arc<dyn SnapshotCodec<E>>,
    entities: Arc<dyn EntityStore<E>>,
    history: Arc<dyn HistoryStore>,
}

impl<E: Auditable> RollbackEngine<E> {
    pub fn new(
        family: impl Into<String>,
        codec: Arc<dyn SnapshotCodec<E>>,
        entities: Arc<dyn EntityStore<E>>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            family: family.into(),
            codec,
            entities,
            history,
        }
    }

    /// Undo the mutation described by `entry_id`. On success the entry is
    /// deleted from the history; rolling back is not itself recorded, so
    /// there is no redo. Failed attempts are not retried.
    pub async fn rollback(&self, entry_id: Uuid) -> RollbackResult<()> {
        let entry = self
            .history
            .get(entry_id)
            .await?
            .ok_or(RollbackError::NotFound)?;

        match entry.action {
            HistoryAction::Create => self.undo_create(&entry).await?,
            HistoryAction::Update => self.undo_update(&entry).await?,
            HistoryAction::Delete => self.undo_delete(&entry).await?,
        }

        // the entry is consumed by its own rollback; a failure above leaves
        // it retained instead
        self.history.delete_by_id(entry.id).await?;
        info!(
            family = %self.family,
            action = %entry.action,
            subject = %entry.subject_id,
            "rollback applied"
        );
        Ok(())
    }

    async fn undo_create(&self, entry: &HistoryEntry) -> RollbackResult<()> {
        if !self.entities.delete(&entry.subject_id).await? {
            warn!(
                family = %self.family,
                subject = %entry.subject_id,
                "entity already gone, treating the create as undone"
            );
        }
        Ok(())
    }

    async fn undo_update(&self, entry: &HistoryEntry) -> RollbackResult<()> {
        let previous = self.decode_before(entry)?;
        let mut current = self
            .entities
            .get(&entry.subject_id)
            .await?
            .ok_or_else(|| {
                RollbackError::Conflict(format!(
                    "entity {} was deleted after the recorded update",
                    entry.subject_id
                ))
            })?;
        current.restore(previous);
        self.entities.save(&current).await?;
        Ok(())
    }

    async fn undo_delete(&self, entry: &HistoryEntry) -> RollbackResult<()> {
        let previous = self.decode_before(entry)?;
        if self.entities.get(&entry.subject_id).await?.is_some() {
            return Err(RollbackError::Conflict(format!(
                "entity {} was recreated after the recorded delete",
                entry.subject_id
            )));
        }
        self.entities.save(&previous).await?;
        Ok(())
    }

    fn decode_before(&self, entry: &HistoryEntry) -> RollbackResult<E> {
        let snapshot = entry.before.as_ref().ok_or_else(|| {
            SnapshotError::Corrupt("entry is missing its before snapshot".to_string())
        })?;
        Ok(self.codec.decode(snapshot)?)
    }
}
