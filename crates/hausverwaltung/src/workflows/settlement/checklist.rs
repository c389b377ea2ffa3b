use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use super::domain::{StatusToken, TaskKind};

/// Stored state of a single checklist task. The field names and the
/// list-shaped single-select status fields are the persisted JSON contract;
/// snapshots must round-trip through export and import without loss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChecklistItem {
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub has_special_option: bool,
    /// Legacy secondary flag for special-option tasks, superseded by the
    /// status tokens but still persisted.
    #[serde(default)]
    pub special_option_checked: bool,
    #[serde(default)]
    pub heating_status: Option<Vec<StatusToken>>,
    #[serde(default)]
    pub owner_approval_status: Option<Vec<StatusToken>>,
}

impl ChecklistItem {
    /// Fresh item for a task of the given kind, all answers unset.
    pub fn default_for(kind: TaskKind, special_option: bool) -> Self {
        Self {
            completed: false,
            has_special_option: special_option,
            special_option_checked: false,
            heating_status: (kind == TaskKind::HeatingReturn).then(Vec::new),
            owner_approval_status: (kind == TaskKind::OwnerApproval).then(Vec::new),
        }
    }

    /// The status list relevant for the task kind, if the kind carries one.
    pub fn status_tokens(&self, kind: TaskKind) -> Option<&[StatusToken]> {
        match kind {
            TaskKind::HeatingReturn => self.heating_status.as_deref(),
            TaskKind::OwnerApproval => self.owner_approval_status.as_deref(),
            TaskKind::Simple => None,
        }
    }

    pub fn has_token(&self, kind: TaskKind, token: StatusToken) -> bool {
        self.status_tokens(kind)
            .is_some_and(|tokens| tokens.contains(&token))
    }

    /// Apply a single-select response: the new token replaces any previous
    /// one, `None` clears the selection. Returns false for kinds without a
    /// status field.
    pub fn select_status(&mut self, kind: TaskKind, token: Option<StatusToken>) -> bool {
        let tokens: Vec<StatusToken> = token.into_iter().collect();
        match kind {
            TaskKind::HeatingReturn => {
                self.heating_status = Some(tokens);
                true
            }
            TaskKind::OwnerApproval => {
                self.owner_approval_status = Some(tokens);
                true
            }
            TaskKind::Simple => false,
        }
    }

    /// Clamp both status lists to single-select shape, keeping the first
    /// token. Returns true if anything was dropped.
    pub fn clamp_single_select(&mut self) -> bool {
        let mut clamped = false;
        for field in [&mut self.heating_status, &mut self.owner_approval_status] {
            if let Some(tokens) = field {
                if tokens.len() > 1 {
                    tokens.truncate(1);
                    clamped = true;
                }
            }
        }
        clamped
    }
}

/// Insertion-ordered task-name → item map. Template order is meaningful
/// (progress views show "what's next" as the first open task), so this keeps
/// entry order through mutation and JSON round-trips instead of sorting keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Checklist {
    entries: Vec<(String, ChecklistItem)>,
}

impl Checklist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(task, _)| task == name)
    }

    pub fn get(&self, name: &str) -> Option<&ChecklistItem> {
        self.entries
            .iter()
            .find(|(task, _)| task == name)
            .map(|(_, item)| item)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut ChecklistItem> {
        self.entries
            .iter_mut()
            .find(|(task, _)| task == name)
            .map(|(_, item)| item)
    }

    /// Insert or replace, keeping the original position on replace.
    pub fn insert(&mut self, name: impl Into<String>, item: ChecklistItem) {
        let name = name.into();
        match self.get_mut(&name) {
            Some(existing) => *existing = item,
            None => self.entries.push((name, item)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ChecklistItem)> {
        self.entries.iter().map(|(task, item)| (task.as_str(), item))
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut ChecklistItem)> {
        self.entries
            .iter_mut()
            .map(|(task, item)| (task.as_str(), item))
    }

    pub fn task_names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(task, _)| task.as_str())
    }
}

impl FromIterator<(String, ChecklistItem)> for Checklist {
    fn from_iter<I: IntoIterator<Item = (String, ChecklistItem)>>(iter: I) -> Self {
        let mut checklist = Checklist::new();
        for (name, item) in iter {
            checklist.insert(name, item);
        }
        checklist
    }
}

impl Serialize for Checklist {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (task, item) in &self.entries {
            map.serialize_entry(task, item)?;
        }
        map.end()
    }
}

struct ChecklistVisitor;

impl<'de> Visitor<'de> for ChecklistVisitor {
    type Value = Checklist;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map of task names to checklist items")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut checklist = Checklist::new();
        while let Some((task, item)) = access.next_entry::<String, ChecklistItem>()? {
            checklist.insert(task, item);
        }
        Ok(checklist)
    }
}

impl<'de> Deserialize<'de> for Checklist {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ChecklistVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_item() -> ChecklistItem {
        ChecklistItem::default_for(TaskKind::Simple, false)
    }

    #[test]
    fn insert_preserves_position_on_replace() {
        let mut checklist = Checklist::new();
        checklist.insert("erste Aufgabe", simple_item());
        checklist.insert("zweite Aufgabe", simple_item());

        let mut replacement = simple_item();
        replacement.completed = true;
        checklist.insert("erste Aufgabe", replacement);

        let names: Vec<&str> = checklist.task_names().collect();
        assert_eq!(names, vec!["erste Aufgabe", "zweite Aufgabe"]);
        assert!(checklist.get("erste Aufgabe").expect("item present").completed);
    }

    #[test]
    fn json_round_trip_keeps_insertion_order() {
        let mut checklist = Checklist::new();
        checklist.insert("Zettel sortiert", simple_item());
        checklist.insert(
            "Heizkostenabrechnung zurückerhalten",
            ChecklistItem::default_for(TaskKind::HeatingReturn, true),
        );
        checklist.insert("Abrechnung verschickt", simple_item());

        let json = serde_json::to_string(&checklist).expect("checklist serializes");
        let restored: Checklist = serde_json::from_str(&json).expect("checklist deserializes");

        let names: Vec<&str> = restored.task_names().collect();
        assert_eq!(
            names,
            vec![
                "Zettel sortiert",
                "Heizkostenabrechnung zurückerhalten",
                "Abrechnung verschickt"
            ]
        );
        assert_eq!(restored, checklist);
    }

    #[test]
    fn item_wire_shape_matches_stored_contract() {
        let item = ChecklistItem::default_for(TaskKind::HeatingReturn, true);
        let value = serde_json::to_value(&item).expect("item serializes");
        assert_eq!(
            value,
            serde_json::json!({
                "completed": false,
                "hasSpecialOption": true,
                "specialOptionChecked": false,
                "heatingStatus": [],
                "ownerApprovalStatus": null,
            })
        );
    }

    #[test]
    fn select_status_is_single_select() {
        let mut item = ChecklistItem::default_for(TaskKind::OwnerApproval, true);
        assert!(item.select_status(TaskKind::OwnerApproval, Some(StatusToken::Nein)));
        assert!(item.select_status(TaskKind::OwnerApproval, Some(StatusToken::Ja)));
        assert_eq!(
            item.owner_approval_status.as_deref(),
            Some(&[StatusToken::Ja][..])
        );

        assert!(item.select_status(TaskKind::OwnerApproval, None));
        assert_eq!(item.owner_approval_status.as_deref(), Some(&[][..]));

        let mut simple = simple_item();
        assert!(!simple.select_status(TaskKind::Simple, Some(StatusToken::Ja)));
    }

    #[test]
    fn clamp_drops_all_but_first_token() {
        let mut item = ChecklistItem::default_for(TaskKind::HeatingReturn, true);
        item.heating_status = Some(vec![StatusToken::Korrektur, StatusToken::Ja]);
        assert!(item.clamp_single_select());
        assert_eq!(
            item.heating_status.as_deref(),
            Some(&[StatusToken::Korrektur][..])
        );
        assert!(!item.clamp_single_select());
    }
}
