use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::warn;

use super::domain::Property;
use super::validate::{repair_checklist, validate_checklist};

/// Current snapshot document version. Bumped only for incompatible shape
/// changes; the checklist item shape itself is frozen.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Portable JSON document holding a whole portfolio. Checklists are embedded
/// verbatim so answers survive an export/import round-trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioSnapshot {
    pub version: u32,
    #[serde(default)]
    pub exported_at: Option<DateTime<Utc>>,
    pub properties: Vec<Property>,
}

impl PortfolioSnapshot {
    pub fn new(properties: Vec<Property>, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: SNAPSHOT_VERSION,
            exported_at: Some(exported_at),
            properties,
        }
    }

    /// Strict parse of an external snapshot document. Unknown property kinds
    /// or status tokens fail here with a typed error instead of producing
    /// half-read records.
    pub fn parse(raw: &str) -> Result<Self, SnapshotError> {
        let snapshot: PortfolioSnapshot = serde_json::from_str(raw)?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(SnapshotError::UnsupportedVersion(snapshot.version));
        }
        Ok(snapshot)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("snapshot is not a valid portfolio document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unsupported snapshot version {0}")]
    UnsupportedVersion(u32),
    #[error("snapshot contains duplicate property id '{0}'")]
    DuplicateProperty(String),
}

/// What normalization had to change for one imported property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairNote {
    pub property_id: String,
    pub missing_tasks: Vec<String>,
    pub extra_tasks: Vec<String>,
    pub clamped_items: usize,
}

/// Import-ready portfolio plus the repair trail for operator feedback.
#[derive(Debug)]
pub struct NormalizedPortfolio {
    pub properties: Vec<Property>,
    pub repairs: Vec<RepairNote>,
}

/// Normalize an imported snapshot before it is accepted: duplicate ids are
/// rejected, multi-token status lists are clamped back to single-select, and
/// checklists that drifted from their blueprint are rebuilt with surviving
/// answers kept.
pub fn normalize_snapshot(
    snapshot: PortfolioSnapshot,
) -> Result<NormalizedPortfolio, SnapshotError> {
    if snapshot.version > SNAPSHOT_VERSION {
        return Err(SnapshotError::UnsupportedVersion(snapshot.version));
    }

    let mut seen_ids = BTreeSet::new();
    for property in &snapshot.properties {
        if !seen_ids.insert(property.id.0.clone()) {
            return Err(SnapshotError::DuplicateProperty(property.id.0.clone()));
        }
    }

    let mut properties = snapshot.properties;
    let mut repairs = Vec::new();

    for property in &mut properties {
        let mut clamped_items = 0;
        for (_, item) in property.checklist.iter_mut() {
            if item.clamp_single_select() {
                clamped_items += 1;
            }
        }

        let validation =
            validate_checklist(&property.checklist, property.kind, property.has_heating);
        let drifted = !validation.is_valid();
        if drifted {
            if let Some(rebuilt) = repair_checklist(property) {
                property.checklist = rebuilt;
            }
        }

        if drifted || clamped_items > 0 {
            if clamped_items > 0 {
                warn!(
                    property = %property.id,
                    clamped_items,
                    "imported checklist carried multi-token status lists"
                );
            }
            repairs.push(RepairNote {
                property_id: property.id.0.clone(),
                missing_tasks: validation.missing_tasks,
                extra_tasks: validation.extra_tasks,
                clamped_items,
            });
        }
    }

    Ok(NormalizedPortfolio {
        properties,
        repairs,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::settlement::checklist::ChecklistItem;
    use crate::workflows::settlement::domain::{PropertyId, PropertyKind, StatusToken, TaskKind};
    use crate::workflows::settlement::template::ChecklistBlueprint;
    use chrono::TimeZone;

    fn property(id: &str, kind: PropertyKind, has_heating: bool) -> Property {
        Property {
            id: PropertyId(id.to_string()),
            name: format!("Objekt {id}"),
            kind,
            has_heating,
            accounting_year: 2023,
            accounting_period: None,
            portfolio: None,
            notes: None,
            special_features: Vec::new(),
            checklist: ChecklistBlueprint::for_configuration(kind, has_heating).instantiate(),
        }
    }

    fn exported_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 8, 30, 0).single().expect("valid timestamp")
    }

    #[test]
    fn snapshot_round_trips_answers_verbatim() {
        let mut original = property("prop-000001", PropertyKind::Mietverwaltung, true);
        original
            .checklist
            .get_mut("Heizkostenabrechnung zurückerhalten")
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Korrektur));

        let snapshot = PortfolioSnapshot::new(vec![original.clone()], exported_at());
        let raw = serde_json::to_string_pretty(&snapshot).expect("snapshot serializes");
        let restored = PortfolioSnapshot::parse(&raw).expect("snapshot parses");

        assert_eq!(restored, snapshot);
        let normalized = normalize_snapshot(restored).expect("snapshot normalizes");
        assert!(normalized.repairs.is_empty());
        assert_eq!(normalized.properties, vec![original]);
    }

    #[test]
    fn unknown_property_kind_fails_parsing() {
        let raw = r#"{
            "version": 1,
            "properties": [{
                "id": "prop-000009",
                "name": "Gewerbehof",
                "type": "GEWERBE",
                "hasHeating": false,
                "accountingYear": 2023,
                "checklist": {}
            }]
        }"#;
        assert!(matches!(
            PortfolioSnapshot::parse(raw),
            Err(SnapshotError::Malformed(_))
        ));
    }

    #[test]
    fn future_version_is_rejected() {
        let raw = r#"{ "version": 99, "properties": [] }"#;
        assert!(matches!(
            PortfolioSnapshot::parse(raw),
            Err(SnapshotError::UnsupportedVersion(99))
        ));
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let snapshot = PortfolioSnapshot::new(
            vec![
                property("prop-000001", PropertyKind::Mietverwaltung, false),
                property("prop-000001", PropertyKind::WegVerwaltung, false),
            ],
            exported_at(),
        );
        assert!(matches!(
            normalize_snapshot(snapshot),
            Err(SnapshotError::DuplicateProperty(id)) if id == "prop-000001"
        ));
    }

    #[test]
    fn normalization_repairs_drift_and_clamps_tokens() {
        let mut drifted = property("prop-000002", PropertyKind::WegVerwaltung, true);
        drifted
            .checklist
            .insert("Foo", ChecklistItem::default_for(TaskKind::Simple, false));
        drifted
            .checklist
            .get_mut("Heizkostenaufstellung zurückerhalten")
            .expect("task present")
            .heating_status = Some(vec![StatusToken::Ja, StatusToken::Nein]);

        let snapshot = PortfolioSnapshot::new(vec![drifted], exported_at());
        let normalized = normalize_snapshot(snapshot).expect("snapshot normalizes");

        assert_eq!(normalized.repairs.len(), 1);
        let note = &normalized.repairs[0];
        assert_eq!(note.property_id, "prop-000002");
        assert_eq!(note.extra_tasks, vec!["Foo"]);
        assert_eq!(note.clamped_items, 1);

        let repaired = &normalized.properties[0];
        assert!(!repaired.checklist.contains("Foo"));
        assert_eq!(
            repaired
                .checklist
                .get("Heizkostenaufstellung zurückerhalten")
                .expect("task present")
                .heating_status
                .as_deref(),
            Some(&[StatusToken::Ja][..])
        );
    }
}
