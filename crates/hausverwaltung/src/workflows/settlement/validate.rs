use tracing::warn;

use super::checklist::Checklist;
use super::domain::{Property, PropertyKind};
use super::template::ChecklistBlueprint;

/// Outcome of comparing a stored checklist against its canonical blueprint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChecklistValidation {
    pub missing_tasks: Vec<String>,
    pub extra_tasks: Vec<String>,
}

impl ChecklistValidation {
    pub fn is_valid(&self) -> bool {
        self.missing_tasks.is_empty() && self.extra_tasks.is_empty()
    }
}

/// Compare the checklist's key set against the blueprint implied by the
/// property configuration.
pub fn validate_checklist(
    checklist: &Checklist,
    kind: PropertyKind,
    has_heating: bool,
) -> ChecklistValidation {
    let blueprint = ChecklistBlueprint::for_configuration(kind, has_heating);

    let missing_tasks = blueprint
        .task_names()
        .filter(|name| !checklist.contains(name))
        .map(str::to_string)
        .collect();

    let extra_tasks = checklist
        .task_names()
        .filter(|name| !blueprint.contains(name))
        .map(str::to_string)
        .collect();

    ChecklistValidation {
        missing_tasks,
        extra_tasks,
    }
}

/// Repair structural drift against the canonical blueprint. Returns `None`
/// when the checklist already matches (the stored map stays untouched);
/// otherwise a rebuilt checklist that keeps every answer for tasks present in
/// both and drops tasks the blueprint no longer knows.
pub fn repair_checklist(property: &Property) -> Option<Checklist> {
    let validation = validate_checklist(&property.checklist, property.kind, property.has_heating);
    if validation.is_valid() {
        return None;
    }

    warn!(
        property = %property.id,
        missing = validation.missing_tasks.len(),
        extra = validation.extra_tasks.len(),
        "checklist drifted from its blueprint, rebuilding"
    );

    let blueprint = ChecklistBlueprint::for_configuration(property.kind, property.has_heating);
    Some(merge_into_blueprint(&blueprint, &property.checklist))
}

/// Rebuild the checklist after the property's kind or heating flag changed,
/// merging prior answers for tasks that survive under the new configuration.
/// `None` when the configuration did not actually change.
pub fn rebuild_on_config_change(
    property: &Property,
    old_kind: PropertyKind,
    old_has_heating: bool,
) -> Option<Checklist> {
    if property.kind == old_kind && property.has_heating == old_has_heating {
        return None;
    }

    let blueprint = ChecklistBlueprint::for_configuration(property.kind, property.has_heating);
    Some(merge_into_blueprint(&blueprint, &property.checklist))
}

fn merge_into_blueprint(blueprint: &ChecklistBlueprint, previous: &Checklist) -> Checklist {
    let mut rebuilt = blueprint.instantiate();

    for (name, fresh) in rebuilt.iter_mut() {
        let Some(old) = previous.get(name) else {
            continue;
        };

        fresh.completed = old.completed;
        fresh.special_option_checked = old.special_option_checked;
        if old.heating_status.is_some() {
            fresh.heating_status = old.heating_status.clone();
        }
        if old.owner_approval_status.is_some() {
            fresh.owner_approval_status = old.owner_approval_status.clone();
        }
    }

    rebuilt
}
