use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Property, PropertyId};

/// Storage abstraction for the managed portfolio so the service module can
/// be exercised in isolation. Implementations must keep the stored checklist
/// maps byte-for-byte (no reordering, no normalization on their own).
pub trait PropertyRepository: Send + Sync {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError>;
    fn update(&self, property: Property) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError>;
    fn list(&self) -> Result<Vec<Property>, RepositoryError>;
    fn remove(&self, id: &PropertyId) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("property already exists")]
    Conflict,
    #[error("property not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Outbound hook fired when a property finishes its settlement. Injected
/// explicitly so callers without a transport plug in the no-op below instead
/// of being probed for optional functions at call time.
pub trait CompletionNotifier: Send + Sync {
    fn publish(&self, alert: SettlementAlert) -> Result<(), NotifyError>;
}

/// Payload describing a finished settlement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettlementAlert {
    pub property_id: PropertyId,
    pub property_name: String,
    pub accounting_year: i32,
    pub details: BTreeMap<String, String>,
}

/// Notifier dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notifier transport unavailable: {0}")]
    Transport(String),
}

/// Default notifier that swallows alerts.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopNotifier;

impl CompletionNotifier for NoopNotifier {
    fn publish(&self, _alert: SettlementAlert) -> Result<(), NotifyError> {
        Ok(())
    }
}
