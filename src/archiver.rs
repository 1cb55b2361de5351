use std::sync::Arc;

use tracing::info;

use crate::store::{HistoryStore, StoreError};

/// Enforces the retention cap for one entity family by evicting the oldest
/// entries after every append.
pub struct Archiver {
    family: String,
    cap: usize,
    history: Arc<dyn HistoryStore>,
}

impl Archiver {
    pub fn new(family: impl Into<String>, history: Arc<dyn HistoryStore>, cap: usize) -> Self {
        Self {
            family: family.into(),
            cap,
            history,
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Trim the log down to the cap, oldest timestamps first. Returns the
    /// number of entries actually evicted; at or under cap this is a no-op.
    ///
    /// Two concurrent appends may both observe a stale count and both trim.
    /// That is tolerated: deleting an already-deleted entry is silently
    /// ignored, and a transient overshoot of the cap is acceptable. No lock
    /// is taken here; this runs on the mutation path.
    pub async fn archive(&self) -> Result<usize, StoreError> {
        let count = self.history.count().await?;
        if count <= self.cap {
            return Ok(0);
        }

        let excess = count - self.cap;
        let oldest = self.history.list_oldest(excess).await?;
        let mut evicted = 0;
        for entry in oldest {
            if self.history.delete_by_id(entry.id).await? {
                evicted += 1;
            }
        }

        if evicted > 0 {
            info!(
                family = %self.family,
                evicted,
                cap = self.cap,
                "evicted oldest history entries"
            );
        }
        Ok(evicted)
    }
}
