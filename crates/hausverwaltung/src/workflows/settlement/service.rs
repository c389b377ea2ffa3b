use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{Property, PropertyId, PropertyKind, SettlementError, StatusToken, TaskKind};
use super::repository::{
    CompletionNotifier, NotifyError, PropertyRepository, RepositoryError, SettlementAlert,
};
use super::snapshot::{normalize_snapshot, PortfolioSnapshot, RepairNote, SnapshotError};
use super::stats::{stats_for, summarize_portfolio, ChecklistStats, PortfolioSummary, PropertyOverview};
use super::template::ChecklistBlueprint;
use super::validate::{rebuild_on_config_change, repair_checklist};

/// Intake payload for a new property. The checklist is never supplied by the
/// caller; it is instantiated from the blueprint for the configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProperty {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub has_heating: bool,
    pub accounting_year: i32,
    #[serde(default)]
    pub accounting_period: Option<String>,
    #[serde(default)]
    pub portfolio: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub special_features: Vec<String>,
}

/// One administrator response to a checklist task.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TaskResponse {
    /// Set or clear the terminal flag of a simple task.
    Completed(bool),
    /// Select (or clear) the single ja/nein/korrektur token.
    Status(Option<StatusToken>),
    /// Toggle the legacy special-option checkbox.
    SpecialOption(bool),
}

/// Requested configuration for an existing property.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconfiguration {
    #[serde(rename = "type")]
    pub kind: PropertyKind,
    pub has_heating: bool,
}

/// Result of accepting a snapshot into the portfolio.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportOutcome {
    pub created: usize,
    pub updated: usize,
    pub repairs: Vec<RepairNote>,
}

/// Service composing the repository, the completion notifier, and the
/// checklist engine.
pub struct SettlementService<R, N> {
    repository: Arc<R>,
    notifier: Arc<N>,
}

static PROPERTY_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_property_id() -> PropertyId {
    let id = PROPERTY_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PropertyId(format!("prop-{id:06}"))
}

impl<R, N> SettlementService<R, N>
where
    R: PropertyRepository + 'static,
    N: CompletionNotifier + 'static,
{
    pub fn new(repository: Arc<R>, notifier: Arc<N>) -> Self {
        Self {
            repository,
            notifier,
        }
    }

    /// Register a property and instantiate its checklist.
    pub fn create(&self, intake: NewProperty) -> Result<Property, SettlementServiceError> {
        let checklist =
            ChecklistBlueprint::for_configuration(intake.kind, intake.has_heating).instantiate();
        let property = Property {
            id: next_property_id(),
            name: intake.name,
            kind: intake.kind,
            has_heating: intake.has_heating,
            accounting_year: intake.accounting_year,
            accounting_period: intake.accounting_period,
            portfolio: intake.portfolio,
            notes: intake.notes,
            special_features: intake.special_features,
            checklist,
        };

        let stored = self.repository.insert(property)?;
        info!(property = %stored.id, year = stored.accounting_year, "property registered");
        Ok(stored)
    }

    pub fn get(&self, id: &PropertyId) -> Result<Property, SettlementServiceError> {
        let property = self.repository.fetch(id)?.ok_or(RepositoryError::NotFound)?;
        Ok(property)
    }

    pub fn overviews(&self) -> Result<Vec<PropertyOverview>, SettlementServiceError> {
        let properties = self.repository.list()?;
        Ok(properties.iter().map(Property::overview).collect())
    }

    pub fn portfolio_summary(&self) -> Result<PortfolioSummary, SettlementServiceError> {
        let properties = self.repository.list()?;
        Ok(summarize_portfolio(&properties))
    }

    pub fn remove(&self, id: &PropertyId) -> Result<(), SettlementServiceError> {
        self.repository.remove(id)?;
        Ok(())
    }

    /// Apply one checklist response and persist. Structural drift is repaired
    /// before the response is applied, so answers land on blueprint tasks.
    /// Crossing the 100% mark publishes a completion alert.
    pub fn respond(
        &self,
        id: &PropertyId,
        task: &str,
        response: TaskResponse,
    ) -> Result<ChecklistStats, SettlementServiceError> {
        let mut property = self.get(id)?;

        if let Some(rebuilt) = repair_checklist(&property) {
            property.checklist = rebuilt;
        }

        let before = stats_for(&property.checklist);

        let kind = task_kind(&property, task);
        let item = property
            .checklist
            .get_mut(task)
            .ok_or_else(|| SettlementError::TaskNotFound(task.to_string()))?;

        match response {
            TaskResponse::Completed(flag) => item.completed = flag,
            TaskResponse::SpecialOption(flag) => item.special_option_checked = flag,
            TaskResponse::Status(token) => {
                if !item.select_status(kind, token) {
                    return Err(SettlementError::StatusNotSupported(task.to_string()).into());
                }
            }
        }

        let after = stats_for(&property.checklist);
        let alert = (before.progress < 100 && after.progress == 100)
            .then(|| completion_alert(&property, &after));

        self.repository.update(property)?;

        if let Some(alert) = alert {
            self.notifier.publish(alert)?;
        }

        Ok(after)
    }

    /// Change the management regime and/or heating flag, rebuilding the
    /// checklist while keeping answers for surviving tasks.
    pub fn reconfigure(
        &self,
        id: &PropertyId,
        requested: Reconfiguration,
    ) -> Result<Property, SettlementServiceError> {
        let mut property = self.get(id)?;
        let old_kind = property.kind;
        let old_has_heating = property.has_heating;

        property.kind = requested.kind;
        property.has_heating = requested.has_heating;

        if let Some(rebuilt) = rebuild_on_config_change(&property, old_kind, old_has_heating) {
            info!(
                property = %property.id,
                from = old_kind.code(),
                to = property.kind.code(),
                has_heating = property.has_heating,
                "configuration changed, checklist rebuilt"
            );
            property.checklist = rebuilt;
            self.repository.update(property.clone())?;
        }

        Ok(property)
    }

    pub fn stats(&self, id: &PropertyId) -> Result<ChecklistStats, SettlementServiceError> {
        let property = self.get(id)?;
        Ok(stats_for(&property.checklist))
    }

    /// Embed the current portfolio into a snapshot document.
    pub fn export(&self) -> Result<PortfolioSnapshot, SettlementServiceError> {
        let properties = self.repository.list()?;
        Ok(PortfolioSnapshot::new(properties, Utc::now()))
    }

    /// Accept a snapshot: normalize every checklist, then upsert by id.
    pub fn import(
        &self,
        snapshot: PortfolioSnapshot,
    ) -> Result<ImportOutcome, SettlementServiceError> {
        let normalized = normalize_snapshot(snapshot)?;

        let mut created = 0;
        let mut updated = 0;
        for property in normalized.properties {
            match self.repository.fetch(&property.id)? {
                Some(_) => {
                    self.repository.update(property)?;
                    updated += 1;
                }
                None => {
                    self.repository.insert(property)?;
                    created += 1;
                }
            }
        }

        info!(created, updated, repairs = normalized.repairs.len(), "snapshot imported");
        Ok(ImportOutcome {
            created,
            updated,
            repairs: normalized.repairs,
        })
    }
}

/// Kind of a checklist task on this property: the blueprint tag when the
/// task is canonical, name inference for foreign tasks kept by older data.
fn task_kind(property: &Property, task: &str) -> TaskKind {
    ChecklistBlueprint::for_configuration(property.kind, property.has_heating)
        .template_for(task)
        .map(|template| template.kind)
        .unwrap_or_else(|| TaskKind::infer(task))
}

fn completion_alert(property: &Property, stats: &ChecklistStats) -> SettlementAlert {
    let mut details = BTreeMap::new();
    details.insert("progress".to_string(), stats.progress.to_string());
    details.insert("status".to_string(), stats.status_label.to_string());
    SettlementAlert {
        property_id: property.id.clone(),
        property_name: property.name.clone(),
        accounting_year: property.accounting_year,
        details,
    }
}

/// Error raised by the settlement service.
#[derive(Debug, thiserror::Error)]
pub enum SettlementServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Settlement(#[from] SettlementError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
}
