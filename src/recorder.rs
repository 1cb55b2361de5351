use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::archiver::Archiver;
use crate::codec::{SnapshotCodec, SnapshotError};
use crate::domain::{Auditable, HistoryAction, HistoryEntry};
use crate::store::{HistoryStore, StoreError, UserDirectory};

#[derive(Error, Debug)]
enum RecordError {
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Shape(&'static str),
}

/// Builds and appends history entries after a committed mutation.
///
/// This is the fail-soft side of the subsystem: `record` returns nothing and
/// cannot fail observably. Losing an audit entry is acceptable; failing the
/// business mutation that triggered it is not.
pub struct HistoryRecorder<E> {
    family: String,
    codec: Arc<dyn SnapshotCodec<E>>,
    history: Arc<dyn HistoryStore>,
    directory: Arc<dyn UserDirectory>,
    archiver: Archiver,
}

impl<E: Auditable> HistoryRecorder<E> {
    pub fn new(
        family: impl Into<String>,
        codec: Arc<dyn SnapshotCodec<E>>,
        history: Arc<dyn HistoryStore>,
        directory: Arc<dyn UserDirectory>,
        archiver: Archiver,
    ) -> Self {
        Self {
            family: family.into(),
            codec,
            history,
            directory,
            archiver,
        }
    }

    /// Record one committed mutation. `before` is required for update and
    /// delete, `after` for create and update; `actor_id` is optional
    /// (anonymous mutations are allowed).
    pub async fn record(
        &self,
        action: HistoryAction,
        before: Option<&E>,
        after: Option<&E>,
        actor_id: Option<&str>,
    ) {
        if let Err(e) = self.try_record(action, before, after, actor_id).await {
            warn!(
                family = %self.family,
                %action,
                error = %e,
                "failed to record history entry, dropping it"
            );
        }
    }

    async fn try_record(
        &self,
        action: HistoryAction,
        before: Option<&E>,
        after: Option<&E>,
        actor_id: Option<&str>,
    ) -> Result<(), RecordError> {
        let subject = after
            .or(before)
            .ok_or(RecordError::Shape("mutation recorded without entity state"))?;
        let subject_id = subject.id().to_string();

        let before = before.map(|e| self.codec.encode(e)).transpose()?;
        let after = after.map(|e| self.codec.encode(e)).transpose()?;

        let actor_display_name = match actor_id {
            Some(id) => match self.directory.display_name(id).await {
                Ok(name) => name,
                Err(e) => {
                    // best effort only; the entry is still worth keeping
                    debug!(actor = id, error = %e, "actor display name lookup failed");
                    None
                }
            },
            None => None,
        };

        let entry = HistoryEntry {
            id: Uuid::new_v4(),
            action,
            subject_id,
            before,
            after,
            actor_id: actor_id.map(str::to_string),
            actor_display_name,
            recorded_at: Utc::now(),
        };
        if !entry.snapshot_shape_ok() {
            return Err(RecordError::Shape(
                "provided entity states do not match the action",
            ));
        }

        self.history.append(entry).await?;
        debug!(family = %self.family, %action, "history entry appended");

        // the entry is already safe; an eviction failure gets its own warning
        if let Err(e) = self.archiver.archive().await {
            warn!(family = %self.family, error = %e, "history eviction failed");
        }
        Ok(())
    }
}
