use hausverwaltung::workflows::settlement::{
    CompletionNotifier, NotifyError, Property, PropertyId, PropertyRepository, RepositoryError,
    SettlementAlert,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::BTreeMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Portfolio store backing the HTTP service. Keyed by property id; generated
/// ids are zero-padded, so iteration follows creation order.
#[derive(Default, Clone)]
pub(crate) struct InMemoryPropertyRepository {
    records: Arc<Mutex<BTreeMap<PropertyId, Property>>>,
}

impl PropertyRepository for InMemoryPropertyRepository {
    fn insert(&self, property: Property) -> Result<Property, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&property.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(property.id.clone(), property.clone());
        Ok(property)
    }

    fn update(&self, property: Property) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&property.id) {
            guard.insert(property.id.clone(), property);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    fn fetch(&self, id: &PropertyId) -> Result<Option<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn list(&self) -> Result<Vec<Property>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().cloned().collect())
    }

    fn remove(&self, id: &PropertyId) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        guard
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }
}

/// Notifier that records completion alerts so the CLI demo and tests can
/// show what would have been dispatched.
#[derive(Default, Clone)]
pub(crate) struct RecordingNotifier {
    events: Arc<Mutex<Vec<SettlementAlert>>>,
}

impl CompletionNotifier for RecordingNotifier {
    fn publish(&self, alert: SettlementAlert) -> Result<(), NotifyError> {
        let mut guard = self.events.lock().expect("notifier mutex poisoned");
        guard.push(alert);
        Ok(())
    }
}

impl RecordingNotifier {
    pub(crate) fn events(&self) -> Vec<SettlementAlert> {
        self.events.lock().expect("notifier mutex poisoned").clone()
    }
}
