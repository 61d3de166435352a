//! File organization commands.

use std::path::Path;

use super::OrganizeSettings;
use crate::model::Catalog;
use crate::organizer::{self, Action, EntryKind, EntryOutcome, OrganizeReport, PlanEntry, sidecar};
use crate::scanner::ScanError;

/// Organize catalog tracks (and their sidecars) under the destination root
pub fn cmd_organize(catalog: &Catalog, settings: &OrganizeSettings) -> OrganizeReport {
    println!("Organizing {} tracks into {}", catalog.len(), settings.dest_root.display());

    let plan = organizer::plan_with_sidecars(catalog, &settings.dest_root);
    run_plan(plan, settings)
}

/// Move sidecars from "Artist - Album" folders into existing organized folders
///
/// Returns the report plus warnings for directories with no destination.
pub fn cmd_sidecars_only(root: &Path, settings: &OrganizeSettings) -> Result<(OrganizeReport, Vec<String>), ScanError> {
    println!(
        "Organizing sidecar files from {} into {}",
        root.display(),
        settings.dest_root.display()
    );

    let plan = sidecar::plan_sidecars_only(root, &settings.dest_root)?;
    for warning in &plan.warnings {
        println!("SKIPPED: {warning}");
    }
    Ok((run_plan(plan.entries, settings), plan.warnings))
}

fn run_plan(mut plan: Vec<PlanEntry>, settings: &OrganizeSettings) -> OrganizeReport {
    if settings.resolve_collisions {
        plan = organizer::disambiguate(plan);
    }

    if !settings.options.apply {
        println!("\n[PREVIEW MODE - No files will be changed; pass --apply to perform]\n");
    }

    let report = organizer::execute(&plan, settings.options);
    print_report(&report);
    report
}

fn print_report(report: &OrganizeReport) {
    for entry in &report.entries {
        let label = match &entry.outcome {
            EntryOutcome::Planned(action) => action_label(*action, false).to_string(),
            EntryOutcome::Performed(action) => action_label(*action, true).to_string(),
            EntryOutcome::NoOp => "IN PLACE".to_string(),
            EntryOutcome::Collision => "COLLISION".to_string(),
            EntryOutcome::Failed(e) => format!("ERROR ({e})"),
        };
        let kind = match entry.kind {
            EntryKind::Track => "",
            EntryKind::Sidecar => " [sidecar]",
        };
        println!(
            "{label}{kind}: {} -> {}",
            entry.source.display(),
            entry.destination.display()
        );
    }
}

fn action_label(action: Action, performed: bool) -> &'static str {
    match (action, performed) {
        (Action::Move, true) => "MOVED",
        (Action::Copy, true) => "COPIED",
        (Action::Move, false) => "WOULD MOVE",
        (Action::Copy, false) => "WOULD COPY",
    }
}
