use std::marker::PhantomData;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Auditable;

/// Serialized entity state at a point in time, as stored inside a history
/// entry. The payload is opaque to the history store; only the codec that
/// produced it can turn it back into an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot(String);

impl Snapshot {
    pub fn new(payload: impl Into<String>) -> Self {
        Self(payload.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Error, Debug)]
pub enum SnapshotError {
    #[error("corrupt snapshot: {0}")]
    Corrupt(String),
    #[error("snapshot encoding failed: {0}")]
    Encode(String),
}

/// Entity to/from snapshot conversion for one tracked entity type.
///
/// `decode` must accept snapshots written by an older schema of the entity:
/// unknown fields are ignored, missing fields take their serde defaults.
/// A payload that cannot be decoded at all yields [`SnapshotError::Corrupt`],
/// never a panic.
pub trait SnapshotCodec<E>: Send + Sync {
    fn encode(&self, entity: &E) -> Result<Snapshot, SnapshotError>;
    fn decode(&self, snapshot: &Snapshot) -> Result<E, SnapshotError>;
}

/// Default codec storing entities as JSON text.
pub struct JsonCodec<E> {
    _marker: PhantomData<fn() -> E>,
}

impl<E> JsonCodec<E> {
    pub fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<E> Default for JsonCodec<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Auditable> SnapshotCodec<E> for JsonCodec<E> {
    fn encode(&self, entity: &E) -> Result<Snapshot, SnapshotError> {
        serde_json::to_string(entity)
            .map(Snapshot)
            .map_err(|e| SnapshotError::Encode(e.to_string()))
    }

    fn decode(&self, snapshot: &Snapshot) -> Result<E, SnapshotError> {
        serde_json::from_str(snapshot.as_str()).map_err(|e| SnapshotError::Corrupt(e.to_string()))
    }
}
