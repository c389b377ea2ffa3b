use serde::{Deserialize, Serialize};
use std::fmt;

use super::checklist::Checklist;

/// Identifier wrapper for managed properties.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PropertyId(pub String);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Management regime of a property. Serialized exactly as the stored
/// discriminator strings so existing snapshots round-trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    #[serde(rename = "MV")]
    Mietverwaltung,
    #[serde(rename = "WEG")]
    WegVerwaltung,
}

impl PropertyKind {
    pub const fn ordered() -> [Self; 2] {
        [Self::Mietverwaltung, Self::WegVerwaltung]
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Mietverwaltung => "Mietverwaltung",
            Self::WegVerwaltung => "WEG-Verwaltung",
        }
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Mietverwaltung => "MV",
            Self::WegVerwaltung => "WEG",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "MV" => Some(Self::Mietverwaltung),
            "WEG" => Some(Self::WegVerwaltung),
            _ => None,
        }
    }
}

/// Behavioral class of a checklist task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Simple,
    HeatingReturn,
    OwnerApproval,
}

/// Task-name fragments marking the heating-cost return step.
const HEATING_RETURN_FRAGMENTS: [&str; 2] = [
    "Heizkostenabrechnung zurückerhalten",
    "Heizkostenaufstellung zurückerhalten",
];

/// Task-name fragments marking the owner sign-off step.
const OWNER_APPROVAL_FRAGMENTS: [&str; 2] = [
    "Freigabe vom Eigentümer erhalten",
    "Jahresabrechnung von Eigentümergemeinschaft freigegeben",
];

/// Additional fragment that carries the auxiliary special-option checkbox
/// without changing the task's scoring class.
const SPECIAL_OPTION_EXTRA_FRAGMENT: &str = "Abrechnung dem Eigentümer zur Freigabe geschickt";

impl TaskKind {
    /// Classify a task by name. Heating-return fragments win over
    /// owner-approval fragments; anything else is a simple task. Checklists
    /// imported from foreign snapshots may contain task names outside the
    /// canonical blueprints, so classification stays name-driven here while
    /// blueprint entries additionally carry an explicit tag.
    pub fn infer(name: &str) -> Self {
        if HEATING_RETURN_FRAGMENTS
            .iter()
            .any(|fragment| name.contains(fragment))
        {
            Self::HeatingReturn
        } else if OWNER_APPROVAL_FRAGMENTS
            .iter()
            .any(|fragment| name.contains(fragment))
        {
            Self::OwnerApproval
        } else {
            Self::Simple
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Simple => "simple",
            Self::HeatingReturn => "heating_return",
            Self::OwnerApproval => "owner_approval",
        }
    }
}

/// True if the task shows the auxiliary special-option control in the UI.
pub fn has_special_option(name: &str) -> bool {
    TaskKind::infer(name) != TaskKind::Simple || name.contains(SPECIAL_OPTION_EXTRA_FRAGMENT)
}

/// Single-select response token for heating-return and owner-approval tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusToken {
    Ja,
    Nein,
    Korrektur,
}

impl StatusToken {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ja => "ja",
            Self::Nein => "nein",
            Self::Korrektur => "korrektur",
        }
    }
}

/// Settlement state derived from checklist progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettlementStatus {
    NotStarted,
    InProgress,
    Completed,
}

impl SettlementStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::NotStarted => "Nicht begonnen",
            Self::InProgress => "In Bearbeitung",
            Self::Completed => "Abgeschlossen",
        }
    }
}

/// A managed property with its settlement checklist. Field names follow the
/// stored JSON contract so snapshots round-trip without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub id: PropertyId,
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
    #[serde(default)]
    pub checklist: Checklist,
}

#[derive(Debug)]
pub enum SettlementError {
    TaskNotFound(String),
    StatusNotSupported(String),
}

impl fmt::Display for SettlementError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SettlementError::TaskNotFound(name) => {
                write!(f, "checklist task '{}' not found", name)
            }
            SettlementError::StatusNotSupported(name) => {
                write!(
                    f,
                    "task '{}' does not take a ja/nein/korrektur response",
                    name
                )
            }
        }
    }
}

impl std::error::Error for SettlementError {}
