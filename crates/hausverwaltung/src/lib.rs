//! Core crate for the Hausverwaltung settlement tracker.
//!
//! The `workflows::settlement` module owns the annual utility-cost settlement
//! ("Abrechnung") domain: checklist blueprints per property configuration,
//! weighted progress scoring, drift repair, and portfolio snapshots. The
//! remaining modules carry service plumbing shared with the API crate.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
