use serde::de::DeserializeOwned;
use serde::Serialize;

/// An entity type whose mutations are captured in the audit log.
///
/// The serde bounds are what the JSON snapshot codec needs. Implementors
/// should mark fields added after entries may already exist with
/// `#[serde(default)]` so older snapshots still decode.
pub trait Auditable: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Stable identifier of this entity instance.
    fn id(&self) -> &str;

    /// Overwrite the mutable fields of `self` with the values captured in
    /// `previous`. Identity and creation-time fields keep their current
    /// values; rollback of an update must not rewrite them.
    fn restore(&mut self, previous: Self);
}
