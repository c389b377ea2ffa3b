use super::checklist::{Checklist, ChecklistItem};
use super::domain::{SettlementStatus, StatusToken, TaskKind};

/// Single completion predicate for a checklist task. Heating-return and
/// owner-approval tasks are complete only when their status token is "ja";
/// the `completed` flag is not authoritative for them. Every consumer of
/// "done" (progress, views, stats) funnels through here.
pub fn is_item_completed(name: &str, item: &ChecklistItem) -> bool {
    match TaskKind::infer(name) {
        TaskKind::HeatingReturn => item.has_token(TaskKind::HeatingReturn, StatusToken::Ja),
        TaskKind::OwnerApproval => item.has_token(TaskKind::OwnerApproval, StatusToken::Ja),
        TaskKind::Simple => item.completed,
    }
}

/// Weighted completion score in percent, clamped to 0..=100.
///
/// Per task: 1.0 when complete, else 0.7 for "korrektur", 0.3 for "nein",
/// 0 otherwise; only heating-return and owner-approval tasks carry status
/// tokens, simple tasks contribute 0 or 1.0. Items at "ja" additionally earn
/// a 0.1 bonus weighted at 0.5 on top of their full credit; the final clamp
/// absorbs the overshoot. The double credit is long-standing stored-data
/// behavior and must not be normalized away.
pub fn calculate_progress(checklist: &Checklist) -> u8 {
    if checklist.is_empty() {
        return 0;
    }

    let mut base_score = 0.0_f64;
    let mut bonus_score = 0.0_f64;

    for (name, item) in checklist.iter() {
        let kind = TaskKind::infer(name);

        if is_item_completed(name, item) {
            base_score += 1.0;
        } else if item.has_token(kind, StatusToken::Korrektur) {
            base_score += 0.7;
        } else if item.has_token(kind, StatusToken::Nein) {
            base_score += 0.3;
        }

        if item.has_token(kind, StatusToken::Ja) {
            bonus_score += 0.1;
        }
    }

    let total_score = base_score + bonus_score * 0.5;
    let raw_progress = total_score / checklist.len() as f64 * 100.0;
    raw_progress.round().min(100.0) as u8
}

/// Classify a progress value into the settlement lifecycle state.
pub const fn status_from_progress(progress: u8) -> SettlementStatus {
    match progress {
        0 => SettlementStatus::NotStarted,
        100 => SettlementStatus::Completed,
        _ => SettlementStatus::InProgress,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::settlement::domain::PropertyKind;
    use crate::workflows::settlement::template::ChecklistBlueprint;

    const HEATING_TASK: &str = "Heizkostenabrechnung zurückerhalten";
    const APPROVAL_TASK: &str = "Freigabe vom Eigentümer erhalten";

    fn single_task_checklist(name: &str, kind: TaskKind) -> Checklist {
        let mut checklist = Checklist::new();
        checklist.insert(name, ChecklistItem::default_for(kind, true));
        checklist
    }

    #[test]
    fn empty_checklist_scores_zero() {
        assert_eq!(calculate_progress(&Checklist::new()), 0);
    }

    #[test]
    fn simple_items_score_all_or_nothing() {
        let blueprint = ChecklistBlueprint::for_configuration(PropertyKind::Mietverwaltung, true);
        let mut checklist = blueprint.instantiate();
        assert_eq!(checklist.len(), 10);

        // Seven simple tasks done, the special tasks and the rest untouched.
        let simple_names: Vec<String> = checklist
            .task_names()
            .filter(|name| TaskKind::infer(name) == TaskKind::Simple)
            .map(str::to_string)
            .collect();
        for name in simple_names.iter().take(7) {
            checklist.get_mut(name).expect("task present").completed = true;
        }

        assert_eq!(calculate_progress(&checklist), 70);
    }

    #[test]
    fn korrektur_alone_scores_seventy() {
        let mut checklist = single_task_checklist(HEATING_TASK, TaskKind::HeatingReturn);
        checklist
            .get_mut(HEATING_TASK)
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Korrektur));
        assert_eq!(calculate_progress(&checklist), 70);
    }

    #[test]
    fn nein_alone_scores_thirty() {
        let mut checklist = single_task_checklist(APPROVAL_TASK, TaskKind::OwnerApproval);
        checklist
            .get_mut(APPROVAL_TASK)
            .expect("task present")
            .select_status(TaskKind::OwnerApproval, Some(StatusToken::Nein));
        assert_eq!(calculate_progress(&checklist), 30);
    }

    #[test]
    fn ja_bonus_overshoot_clamps_to_hundred() {
        // base 1.0 + bonus 0.1 * 0.5 = 1.05 → raw 105, clamped.
        let mut checklist = single_task_checklist(HEATING_TASK, TaskKind::HeatingReturn);
        checklist
            .get_mut(HEATING_TASK)
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Ja));
        assert_eq!(calculate_progress(&checklist), 100);
    }

    #[test]
    fn completed_flag_does_not_complete_special_tasks() {
        let mut checklist = single_task_checklist(HEATING_TASK, TaskKind::HeatingReturn);
        checklist.get_mut(HEATING_TASK).expect("task present").completed = true;
        let item = checklist.get(HEATING_TASK).expect("task present");
        assert!(!is_item_completed(HEATING_TASK, item));
        assert_eq!(calculate_progress(&checklist), 0);
    }

    #[test]
    fn progress_is_monotonic_along_the_response_ladder() {
        let mut checklist = ChecklistBlueprint::for_configuration(PropertyKind::WegVerwaltung, true)
            .instantiate();
        let heating_task = "Heizkostenaufstellung zurückerhalten";

        let untouched = calculate_progress(&checklist);
        checklist
            .get_mut(heating_task)
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Nein));
        let nein = calculate_progress(&checklist);
        checklist
            .get_mut(heating_task)
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Korrektur));
        let korrektur = calculate_progress(&checklist);
        checklist
            .get_mut(heating_task)
            .expect("task present")
            .select_status(TaskKind::HeatingReturn, Some(StatusToken::Ja));
        let ja = calculate_progress(&checklist);

        assert!(untouched <= nein && nein <= korrektur && korrektur <= ja);
        assert!(untouched < ja);
    }

    #[test]
    fn hundred_iff_every_item_complete() {
        let blueprint = ChecklistBlueprint::for_configuration(PropertyKind::Mietverwaltung, false);
        let mut checklist = blueprint.instantiate();

        let names: Vec<String> = checklist.task_names().map(str::to_string).collect();
        for name in &names {
            let kind = TaskKind::infer(name);
            let item = checklist.get_mut(name).expect("task present");
            if kind == TaskKind::Simple {
                item.completed = true;
            } else {
                item.select_status(kind, Some(StatusToken::Ja));
            }
        }
        assert_eq!(calculate_progress(&checklist), 100);
        assert!(checklist
            .iter()
            .all(|(name, item)| is_item_completed(name, item)));

        // Reopen one task: the score must drop below 100.
        checklist
            .get_mut("Abrechnung an Mieter versendet")
            .expect("task present")
            .completed = false;
        assert!(calculate_progress(&checklist) < 100);
    }

    #[test]
    fn status_boundaries() {
        assert_eq!(status_from_progress(0), SettlementStatus::NotStarted);
        assert_eq!(status_from_progress(1), SettlementStatus::InProgress);
        assert_eq!(status_from_progress(99), SettlementStatus::InProgress);
        assert_eq!(status_from_progress(100), SettlementStatus::Completed);
    }
}
