use crate::infra::{InMemoryPropertyRepository, RecordingNotifier};
use clap::Args;
use hausverwaltung::error::AppError;
use hausverwaltung::workflows::settlement::{
    normalize_snapshot, stats_for, summarize_portfolio, NewProperty, PortfolioSnapshot,
    PropertyKind, SettlementService, StatusToken, TaskKind, TaskResponse,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct PortfolioReportArgs {
    /// Path to a portfolio snapshot JSON file
    #[arg(long)]
    pub(crate) snapshot: PathBuf,
    /// Print every checklist task instead of the per-property summary line
    #[arg(long)]
    pub(crate) list_tasks: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Print the exported snapshot document at the end of the demo
    #[arg(long)]
    pub(crate) print_snapshot: bool,
}

pub(crate) fn run_portfolio_report(args: PortfolioReportArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.snapshot)?;
    let snapshot = PortfolioSnapshot::parse(&raw)?;
    let normalized = normalize_snapshot(snapshot)?;

    let summary = summarize_portfolio(&normalized.properties);
    println!("Portfolio settlement report");
    println!(
        "- {} properties | {} not started | {} in progress | {} completed | Ø {}%",
        summary.properties,
        summary.not_started,
        summary.in_progress,
        summary.completed,
        summary.average_progress
    );

    if !normalized.repairs.is_empty() {
        println!("Normalization repairs:");
        for repair in &normalized.repairs {
            println!(
                "  - {}: {} task(s) missing, {} unknown, {} status list(s) clamped",
                repair.property_id,
                repair.missing_tasks.len(),
                repair.extra_tasks.len(),
                repair.clamped_items
            );
        }
    }

    for property in &normalized.properties {
        let stats = stats_for(&property.checklist);
        println!(
            "\n{} ({}, {}{})",
            property.name,
            property.kind.label(),
            property.accounting_year,
            if property.has_heating {
                ", mit Heizkosten"
            } else {
                ""
            }
        );
        println!(
            "  {}% | {} | {}/{} tasks done",
            stats.progress, stats.status_label, stats.completed, stats.total
        );
        if let Some(next_task) = &stats.next_task {
            println!("  next: {next_task}");
        }
        if args.list_tasks {
            for (name, item) in property.checklist.iter() {
                let done = hausverwaltung::workflows::settlement::is_item_completed(name, item);
                println!("    [{}] {}", if done { "x" } else { " " }, name);
            }
        }
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    println!("Settlement workflow demo");

    let repository = Arc::new(InMemoryPropertyRepository::default());
    let notifier = Arc::new(RecordingNotifier::default());
    let service = Arc::new(SettlementService::new(repository, notifier.clone()));

    let mietshaus = service.create(NewProperty {
        name: "Lindenstraße 12".to_string(),
        kind: PropertyKind::Mietverwaltung,
        has_heating: true,
        accounting_year: 2024,
        accounting_period: Some("01.01. – 31.12.".to_string()),
        portfolio: Some("Bestand Nord".to_string()),
        notes: Some("Neue Heizungsanlage seit März".to_string()),
        special_features: vec!["Aufzug".to_string()],
    })?;
    let weg = service.create(NewProperty {
        name: "WEG Am Stadtpark 5".to_string(),
        kind: PropertyKind::WegVerwaltung,
        has_heating: false,
        accounting_year: 2024,
        accounting_period: None,
        portfolio: Some("Bestand Süd".to_string()),
        notes: None,
        special_features: Vec::new(),
    })?;

    println!(
        "- Registered {} and {} ({} checklist tasks / {} tasks)",
        mietshaus.name,
        weg.name,
        mietshaus.checklist.len(),
        weg.checklist.len()
    );

    // Work the rental property through its full settlement.
    let tasks: Vec<String> = mietshaus.checklist.task_names().map(str::to_string).collect();
    for task in &tasks {
        let response = match TaskKind::infer(task) {
            TaskKind::Simple => TaskResponse::Completed(true),
            _ => TaskResponse::Status(Some(StatusToken::Ja)),
        };
        let stats = service.respond(&mietshaus.id, task, response)?;
        println!("  {} -> {}% ({})", task, stats.progress, stats.status_label);
    }

    // One answer on the WEG property to show a partially worked checklist.
    let weg_stats = service.respond(
        &weg.id,
        "Belege vollständig gesammelt",
        TaskResponse::Completed(true),
    )?;
    println!(
        "- {}: {}% after the first task, next: {}",
        weg.name,
        weg_stats.progress,
        weg_stats.next_task.as_deref().unwrap_or("–")
    );

    let summary = service.portfolio_summary()?;
    println!(
        "- Portfolio: {} properties | {} completed | Ø {}%",
        summary.properties, summary.completed, summary.average_progress
    );

    let events = notifier.events();
    if events.is_empty() {
        println!("- Completion alerts: none dispatched");
    } else {
        println!("- Completion alerts:");
        for alert in events {
            println!(
                "    - {} ({}, {})",
                alert.property_name, alert.property_id, alert.accounting_year
            );
        }
    }

    if args.print_snapshot {
        let snapshot = service.export()?;
        match serde_json::to_string_pretty(&snapshot) {
            Ok(json) => println!("Exported snapshot:\n{json}"),
            Err(err) => println!("Snapshot unavailable: {err}"),
        }
    }

    Ok(())
}

/// Preload the service with a small sample portfolio for local exploration.
pub(crate) fn seed_demo_portfolio(
    service: &SettlementService<InMemoryPropertyRepository, RecordingNotifier>,
) -> Result<usize, AppError> {
    let seeds = [
        ("Lindenstraße 12", PropertyKind::Mietverwaltung, true),
        ("Gartenweg 3", PropertyKind::Mietverwaltung, false),
        ("WEG Am Stadtpark 5", PropertyKind::WegVerwaltung, true),
    ];

    for (name, kind, has_heating) in seeds {
        service.create(NewProperty {
            name: name.to_string(),
            kind,
            has_heating,
            accounting_year: 2024,
            accounting_period: None,
            portfolio: None,
            notes: None,
            special_features: Vec::new(),
        })?;
    }

    Ok(seeds.len())
}
