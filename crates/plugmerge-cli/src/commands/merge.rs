//! Merge command

use std::path::Path;

use colored::Colorize;
use plugmerge_core::{MergeSummary, Project};

use crate::error::Result;

/// Run the merge command
pub fn run_merge(path: &Path) -> Result<()> {
    let project = Project::open(path)?;
    let summary = project.merge()?;
    print_merge(&summary);
    Ok(())
}

pub(super) fn print_merge(summary: &MergeSummary) {
    let report = &summary.plugins;
    if let Some(seeded) = &summary.seeded {
        println!("  {} seeded destination from baseline: {} files", "+".green(), seeded.files);
    }
    if report.discovered() == 0 {
        println!("{}", "No installed plugins to merge".dimmed());
    }

    for plugin in &report.plugins {
        let marker = if plugin.result.is_clean() { "+".green() } else { "!".yellow() };
        println!(
            "  {} {} {}",
            marker,
            plugin.key.to_string().cyan(),
            format!("(prio {}, {} files)", plugin.prio, plugin.result.stats.files).dimmed()
        );
        for error in &plugin.result.errors {
            println!("      {}", error.yellow());
        }
    }

    if summary.overrides.stats.files > 0 {
        println!("  {} custom overrides: {} files", "+".green(), summary.overrides.stats.files);
    }
    for error in &summary.overrides.errors {
        println!("      {}", error.yellow());
    }
    if summary.schema.sources > 0 {
        println!(
            "  {} schema: {} entries from {} plugin(s)",
            "+".green(),
            summary.schema.entries,
            summary.schema.sources
        );
    }

    println!();
    println!(
        "{} {}/{} plugin(s) merged cleanly, {} files",
        "Merge".bold(),
        report.clean(),
        report.discovered(),
        report.files()
    );
}
