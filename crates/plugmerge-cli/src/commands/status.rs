//! Status command implementation

use std::path::Path;

use colored::Colorize;
use plugmerge_core::{Error, Project};

use crate::error::Result;

/// Run the status command
pub fn run_status(path: &Path, json: bool) -> Result<()> {
    let project = Project::open(path)?;

    let statuses = match project.status() {
        Ok(statuses) => statuses,
        Err(Error::InstalledSetMissing(_)) => {
            if json {
                println!("[]");
            } else {
                println!("{}", "Nothing resolved yet".red().bold());
                println!();
                println!("Run {} to create the installed set.", "plugmerge resolve".cyan());
            }
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    println!("{}", "Plugin Status".bold());
    println!();
    println!("{}:   {}", "Path".dimmed(), project.root().display());
    println!("{}:   {}", "Repos".dimmed(), project.repos_dir().display());
    println!();

    if statuses.is_empty() {
        println!("  {}", "None".dimmed());
    }
    for status in &statuses {
        let state = if !status.installed {
            "missing".red()
        } else if status.is_drifted() {
            "changed".yellow()
        } else {
            "installed".green()
        };
        println!(
            "  {} {} {} [{}] {}",
            "+".green(),
            status.plugin.key().to_string().cyan(),
            status.plugin.version,
            state,
            format!("prio {}", status.plugin.prio).dimmed()
        );
    }

    Ok(())
}
