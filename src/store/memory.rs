use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EntityStore, HistoryStore, StoreResult, UserDirectory};
use crate::domain::{Auditable, HistoryEntry};

/// In-memory entity store used by tests and small single-process
/// deployments.
pub struct MemoryEntityStore<E> {
    entities: RwLock<HashMap<String, E>>,
}

impl<E> MemoryEntityStore<E> {
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
        }
    }
}

impl<E> Default for MemoryEntityStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: Auditable> EntityStore<E> for MemoryEntityStore<E> {
    async fn get(&self, id: &str) -> StoreResult<Option<E>> {
        Ok(self.entities.read().await.get(id).cloned())
    }

    async fn save(&self, entity: &E) -> StoreResult<()> {
        self.entities
            .write()
            .await
            .insert(entity.id().to_string(), entity.clone());
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<bool> {
        Ok(self.entities.write().await.remove(id).is_some())
    }
}

/// In-memory history store. Entries are held in insertion order, which is
/// the tie-break for identical timestamps.
pub struct MemoryHistoryStore {
    entries: RwLock<Vec<HistoryEntry>>,
}

impl MemoryHistoryStore {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
        }
    }
}

impl Default for MemoryHistoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HistoryStore for MemoryHistoryStore {
    async fn append(&self, entry: HistoryEntry) -> StoreResult<()> {
        self.entries.write().await.push(entry);
        Ok(())
    }

    async fn get(&self, id: Uuid) -> StoreResult<Option<HistoryEntry>> {
        Ok(self
            .entries
            .read()
            .await
            .iter()
            .find(|e| e.id == id)
            .cloned())
    }

    async fn list_recent(&self, limit: usize) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self.entries.read().await.clone();
        // stable ascending sort keeps insertion order among ties, so after
        // the reverse the newest insertion comes first
        entries.sort_by_key(|e| e.recorded_at);
        entries.reverse();
        entries.truncate(limit);
        Ok(entries)
    }

    async fn list_oldest(&self, count: usize) -> StoreResult<Vec<HistoryEntry>> {
        let mut entries = self.entries.read().await.clone();
        entries.sort_by_key(|e| e.recorded_at);
        entries.truncate(count);
        Ok(entries)
    }

    async fn delete_by_id(&self, id: Uuid) -> StoreResult<bool> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() < before)
    }

    async fn delete_all(&self) -> StoreResult<()> {
        self.entries.write().await.clear();
        Ok(())
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.entries.read().await.len())
    }
}

/// Static name table standing in for the application's user directory.
pub struct MemoryUserDirectory {
    names: HashMap<String, String>,
}

impl MemoryUserDirectory {
    pub fn new(names: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            names: names.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }
}

#[async_trait]
impl UserDirectory for MemoryUserDirectory {
    async fn display_name(&self, actor_id: &str) -> StoreResult<Option<String>> {
        Ok(self.names.get(actor_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};

    use super::*;
    use crate::codec::Snapshot;
    use crate::domain::HistoryAction;
    use crate::testutil::event;

    fn entry_at(offset_secs: i64, subject: &str) -> HistoryEntry {
        HistoryEntry {
            id: Uuid::new_v4(),
            action: HistoryAction::Create,
            subject_id: subject.to_string(),
            before: None,
            after: Some(Snapshot::new("{}")),
            actor_id: None,
            actor_display_name: None,
            recorded_at: Utc::now() + Duration::seconds(offset_secs),
        }
    }

    #[tokio::test]
    async fn entity_store_save_get_delete() {
        let store = MemoryEntityStore::new();
        let ev = event("ev-1", "Planning");

        store.save(&ev).await.unwrap();
        assert_eq!(store.get("ev-1").await.unwrap(), Some(ev.clone()));

        assert!(store.delete("ev-1").await.unwrap());
        assert!(!store.delete("ev-1").await.unwrap());
        assert_eq!(store.get("ev-1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn list_recent_is_descending_by_timestamp() {
        let store = MemoryHistoryStore::new();
        store.append(entry_at(0, "a")).await.unwrap();
        store.append(entry_at(2, "c")).await.unwrap();
        store.append(entry_at(1, "b")).await.unwrap();

        let recent = store.list_recent(10).await.unwrap();
        let subjects: Vec<_> = recent.iter().map(|e| e.subject_id.as_str()).collect();
        assert_eq!(subjects, vec!["c", "b", "a"]);
    }

    #[tokio::test]
    async fn list_oldest_is_ascending_and_limited() {
        let store = MemoryHistoryStore::new();
        store.append(entry_at(1, "b")).await.unwrap();
        store.append(entry_at(0, "a")).await.unwrap();
        store.append(entry_at(2, "c")).await.unwrap();

        let oldest = store.list_oldest(2).await.unwrap();
        let subjects: Vec<_> = oldest.iter().map(|e| e.subject_id.as_str()).collect();
        assert_eq!(subjects, vec!["a", "b"]);
    }

    #[tokio::test]
    async fn identical_timestamps_keep_insertion_order() {
        let store = MemoryHistoryStore::new();
        let ts = Utc::now();
        for subject in ["first", "second", "third"] {
            let mut e = entry_at(0, subject);
            e.recorded_at = ts;
            store.append(e).await.unwrap();
        }

        let oldest = store.list_oldest(3).await.unwrap();
        let subjects: Vec<_> = oldest.iter().map(|e| e.subject_id.as_str()).collect();
        assert_eq!(subjects, vec!["first", "second", "third"]);

        let recent = store.list_recent(3).await.unwrap();
        let subjects: Vec<_> = recent.iter().map(|e| e.subject_id.as_str()).collect();
        assert_eq!(subjects, vec!["third", "second", "first"]);
    }

    #[tokio::test]
    async fn delete_by_id_reports_absence() {
        let store = MemoryHistoryStore::new();
        let entry = entry_at(0, "a");
        let id = entry.id;
        store.append(entry).await.unwrap();

        assert!(store.delete_by_id(id).await.unwrap());
        assert!(!store.delete_by_id(id).await.unwrap());
        assert_eq!(store.count().await.unwrap(), 0);
    }
}
