use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::Auditable;
use crate::engine::AuditLog;
use crate::store::memory::{MemoryEntityStore, MemoryHistoryStore, MemoryUserDirectory};
use crate::store::{EntityStore, HistoryStore, UserDirectory};

/// Representative tracked entity for tests.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub location: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl Auditable for CalendarEvent {
    fn id(&self) -> &str {
        &self.id
    }

    fn restore(&mut self, previous: Self) {
        // id and created_at are identity fields and stay as they are
        self.title = previous.title;
        self.location = previous.location;
        self.starts_at = previous.starts_at;
    }
}

pub fn event(id: &str, title: &str) -> CalendarEvent {
    CalendarEvent {
        id: id.to_string(),
        title: title.to_string(),
        location: Some("room 1".to_string()),
        starts_at: Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap(),
        created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    }
}

pub struct Harness {
    pub log: AuditLog<CalendarEvent>,
    pub entities: Arc<MemoryEntityStore<CalendarEvent>>,
    pub history: Arc<MemoryHistoryStore>,
}

/// Fully wired in-memory audit log for the "events" family.
pub fn harness(cap: usize) -> Harness {
    let entities = Arc::new(MemoryEntityStore::new());
    let history = Arc::new(MemoryHistoryStore::new());
    let directory = Arc::new(MemoryUserDirectory::new([(
        "u1".to_string(),
        "Alice".to_string(),
    )]));
    let log = AuditLog::with_json_codec(
        "events",
        entities.clone() as Arc<dyn EntityStore<CalendarEvent>>,
        history.clone() as Arc<dyn HistoryStore>,
        directory as Arc<dyn UserDirectory>,
        cap,
    );
    Harness {
        log,
        entities,
        history,
    }
}
