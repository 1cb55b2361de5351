use async_trait::async_trait;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::HistoryEntry;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("backend error: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Keyed persistence for one tracked entity type. The audit log never owns
/// entity persistence; the embedding application supplies this.
#[async_trait]
pub trait EntityStore<E>: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<E>>;

    /// Create-or-update under the entity's own id.
    async fn save(&self, entity: &E) -> StoreResult<()>;

    /// Returns `false` when no entity with `id` existed. Absence is not an
    /// error; rollback of a create relies on that.
    async fn delete(&self, id: &str) -> StoreResult<bool>;
}

/// Append-only collection of history entries for one entity family.
///
/// There is deliberately no update operation: entries are immutable and are
/// only ever appended, listed, and deleted. Listing order is `recorded_at`
/// with ties broken by insertion order.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn append(&self, entry: HistoryEntry) -> StoreResult<()>;

    async fn get(&self, id: Uuid) -> StoreResult<Option<HistoryEntry>>;

    /// Most recent entries first, at most `limit` of them.
    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<HistoryEntry>>;

    /// Oldest entries first, at most `count` of them. Used by eviction.
    async fn list_oldest(&self, count: usize) -> StoreResult<Vec<HistoryEntry>>;

    /// Returns `false` when the entry was already gone.
    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool>;

    async fn delete_all(&self) -> StoreResult<()>;

    async fn count(&self) -> StoreResult<usize>;
}

/// Best-effort lookup used to denormalize the actor display name at record
/// time. Failures are tolerated by the recorder; this must never be load
/// bearing.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn display_name(&self, actor_id: &str) -> StoreResult<Option<String>>;
}
