use serde::Serialize;

use super::checklist::Checklist;
use super::domain::{Property, PropertyId, PropertyKind, SettlementStatus};
use super::engine::{calculate_progress, is_item_completed, status_from_progress};

/// Aggregated view of a single checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistStats {
    pub total: usize,
    pub completed: usize,
    pub remaining: usize,
    pub progress: u8,
    pub status: SettlementStatus,
    pub status_label: &'static str,
    pub next_task: Option<String>,
}

/// Compute totals, weighted progress, lifecycle status, and the first open
/// task in checklist order.
pub fn stats_for(checklist: &Checklist) -> ChecklistStats {
    let total = checklist.len();
    let completed = checklist
        .iter()
        .filter(|(name, item)| is_item_completed(name, item))
        .count();
    let progress = calculate_progress(checklist);
    let status = status_from_progress(progress);
    let next_task = checklist
        .iter()
        .find(|(name, item)| !is_item_completed(name, item))
        .map(|(name, _)| name.to_string());

    ChecklistStats {
        total,
        completed,
        remaining: total - completed,
        progress,
        status,
        status_label: status.label(),
        next_task,
    }
}

/// Card-style summary of a property for portfolio listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PropertyOverview {
    pub id: PropertyId,
    pub name: String,
    pub kind: PropertyKind,
    pub kind_label: &'static str,
    pub has_heating: bool,
    pub accounting_year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub portfolio: Option<String>,
    pub progress: u8,
    pub status: SettlementStatus,
    pub status_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_task: Option<String>,
}

impl Property {
    pub fn overview(&self) -> PropertyOverview {
        let stats = stats_for(&self.checklist);
        PropertyOverview {
            id: self.id.clone(),
            name: self.name.clone(),
            kind: self.kind,
            kind_label: self.kind.label(),
            has_heating: self.has_heating,
            accounting_year: self.accounting_year,
            portfolio: self.portfolio.clone(),
            progress: stats.progress,
            status: stats.status,
            status_label: stats.status_label,
            next_task: stats.next_task,
        }
    }

    pub fn stats(&self) -> ChecklistStats {
        stats_for(&self.checklist)
    }
}

/// Roll-up across a whole portfolio, used by the report command and endpoint.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSummary {
    pub properties: usize,
    pub not_started: usize,
    pub in_progress: usize,
    pub completed: usize,
    pub average_progress: u8,
}

pub fn summarize_portfolio(properties: &[Property]) -> PortfolioSummary {
    let mut summary = PortfolioSummary {
        properties: properties.len(),
        ..PortfolioSummary::default()
    };

    let mut progress_sum: u32 = 0;
    for property in properties {
        let progress = calculate_progress(&property.checklist);
        progress_sum += u32::from(progress);
        match status_from_progress(progress) {
            SettlementStatus::NotStarted => summary.not_started += 1,
            SettlementStatus::InProgress => summary.in_progress += 1,
            SettlementStatus::Completed => summary.completed += 1,
        }
    }

    if !properties.is_empty() {
        summary.average_progress = (progress_sum / properties.len() as u32) as u8;
    }

    summary
}
