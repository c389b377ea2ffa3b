//! Annual utility-cost settlement ("Abrechnung") workflow.
//!
//! A property's configuration (management regime × heating) selects one of
//! four fixed checklist blueprints. The engine derives weighted progress and
//! lifecycle status from the stored checklist, keeps it structurally aligned
//! with its blueprint, and round-trips the whole portfolio through JSON
//! snapshots.

pub mod checklist;
pub mod domain;
mod engine;
pub mod repository;
pub mod router;
pub mod service;
pub mod snapshot;
mod stats;
mod template;
mod validate;

pub use checklist::{Checklist, ChecklistItem};
pub use domain::{
    has_special_option, Property, PropertyId, PropertyKind, SettlementError, SettlementStatus,
    StatusToken, TaskKind,
};
pub use engine::{calculate_progress, is_item_completed, status_from_progress};
pub use repository::{
    CompletionNotifier, NoopNotifier, NotifyError, PropertyRepository, RepositoryError,
    SettlementAlert,
};
pub use router::settlement_router;
pub use service::{
    ImportOutcome, NewProperty, Reconfiguration, SettlementService, SettlementServiceError,
    TaskResponse,
};
pub use snapshot::{
    normalize_snapshot, NormalizedPortfolio, PortfolioSnapshot, RepairNote, SnapshotError,
    SNAPSHOT_VERSION,
};
pub use stats::{
    stats_for, summarize_portfolio, ChecklistStats, PortfolioSummary, PropertyOverview,
};
pub use template::{ChecklistBlueprint, TaskTemplate};
pub use validate::{
    rebuild_on_config_change, repair_checklist, validate_checklist, ChecklistValidation,
};
