use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::codec::Snapshot;

/// Kind of tracked mutation a history entry describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            HistoryAction::Create => "create",
            HistoryAction::Update => "update",
            HistoryAction::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// One recorded mutation on a tracked entity. Immutable once appended; the
/// only lifecycle transitions are eviction, rollback consumption, and bulk
/// clear.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub id: Uuid,
    pub action: HistoryAction,
    /// Identifier of the entity instance the mutation touched.
    pub subject_id: String,
    /// Entity state before the mutation; present for update and delete.
    pub before: Option<Snapshot>,
    /// Entity state after the mutation; present for create and update.
    pub after: Option<Snapshot>,
    pub actor_id: Option<String>,
    /// Display name resolved at record time; a point-in-time value that is
    /// not updated if the actor is later renamed or removed.
    pub actor_display_name: Option<String>,
    /// Append-time timestamp, the sole ordering key. Ties are broken by
    /// insertion order in the backing store.
    pub recorded_at: DateTime<Utc>,
}

impl HistoryEntry {
    /// Whether the populated snapshot fields match what `action` implies:
    /// create carries only `after`, delete only `before`, update both.
    pub fn snapshot_shape_ok(&self) -> bool {
        match self.action {
            HistoryAction::Create => self.before.is_none() && self.after.is_some(),
            HistoryAction::Update => self.before.is_some() && self.after.is_some(),
            HistoryAction::Delete => self.before.is_some() && self.after.is_none(),
        }
    }
}
