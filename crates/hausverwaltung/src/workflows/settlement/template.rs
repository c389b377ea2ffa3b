use super::checklist::{Checklist, ChecklistItem};
use super::domain::{PropertyKind, TaskKind};

/// One entry of a checklist blueprint. The kind and special-option flag are
/// explicit tags; `TaskKind::infer` must agree with them for every canonical
/// task so checklists stored by name keep classifying identically.
#[derive(Debug, Clone, Copy)]
pub struct TaskTemplate {
    pub name: &'static str,
    pub kind: TaskKind,
    pub special_option: bool,
}

const fn simple(name: &'static str) -> TaskTemplate {
    TaskTemplate {
        name,
        kind: TaskKind::Simple,
        special_option: false,
    }
}

/// Fixed checklist blueprint for one (kind, heating) configuration.
#[derive(Debug)]
pub struct ChecklistBlueprint {
    tasks: Vec<TaskTemplate>,
}

impl ChecklistBlueprint {
    /// Canonical blueprint for the property configuration. Total over the
    /// typed discriminators; unknown discriminator strings never reach this
    /// point because they fail snapshot parsing.
    pub fn for_configuration(kind: PropertyKind, has_heating: bool) -> Self {
        let tasks = match kind {
            PropertyKind::Mietverwaltung => mietverwaltung_tasks(has_heating),
            PropertyKind::WegVerwaltung => weg_tasks(has_heating),
        };
        Self { tasks }
    }

    pub fn task_templates(&self) -> &[TaskTemplate] {
        &self.tasks
    }

    pub fn task_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.tasks.iter().map(|task| task.name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tasks.iter().any(|task| task.name == name)
    }

    pub fn template_for(&self, name: &str) -> Option<&TaskTemplate> {
        self.tasks.iter().find(|task| task.name == name)
    }

    /// Instantiate the blueprint into a fresh checklist with every answer
    /// unset and status lists defaulted per task kind.
    pub fn instantiate(&self) -> Checklist {
        self.tasks
            .iter()
            .map(|task| {
                (
                    task.name.to_string(),
                    ChecklistItem::default_for(task.kind, task.special_option),
                )
            })
            .collect()
    }
}

fn mietverwaltung_tasks(has_heating: bool) -> Vec<TaskTemplate> {
    let mut tasks = vec![
        simple("Belege vollständig gesammelt"),
        simple("Wartungsrechnung vorhanden"),
        simple("Grundsteuerbescheid vorhanden"),
        simple("Versicherungsrechnungen vorhanden"),
    ];

    if has_heating {
        tasks.push(simple("Heizkostenaufstellung an Abrechnungsdienst geschickt"));
        tasks.push(TaskTemplate {
            name: "Heizkostenabrechnung zurückerhalten",
            kind: TaskKind::HeatingReturn,
            special_option: true,
        });
    }

    tasks.extend([
        simple("Betriebskostenabrechnung erstellt"),
        TaskTemplate {
            name: "Abrechnung dem Eigentümer zur Freigabe geschickt",
            kind: TaskKind::Simple,
            special_option: true,
        },
        TaskTemplate {
            name: "Freigabe vom Eigentümer erhalten",
            kind: TaskKind::OwnerApproval,
            special_option: true,
        },
        simple("Abrechnung an Mieter versendet"),
    ]);

    tasks
}

fn weg_tasks(has_heating: bool) -> Vec<TaskTemplate> {
    let mut tasks = vec![
        simple("Belege vollständig gesammelt"),
        simple("Wartungsrechnung vorhanden"),
        simple("Versicherungsrechnungen vorhanden"),
    ];

    if has_heating {
        tasks.push(simple("Verbrauchsdaten an Messdienst übermittelt"));
        tasks.push(TaskTemplate {
            name: "Heizkostenaufstellung zurückerhalten",
            kind: TaskKind::HeatingReturn,
            special_option: true,
        });
    }

    tasks.extend([
        simple("Rücklagenentwicklung dokumentiert"),
        simple("Jahresabrechnung erstellt"),
        TaskTemplate {
            name: "Jahresabrechnung von Eigentümergemeinschaft freigegeben",
            kind: TaskKind::OwnerApproval,
            special_option: true,
        },
        simple("Einzelabrechnungen an Eigentümer versendet"),
        simple("Beschlussprotokoll abgelegt"),
    ]);

    tasks
}
