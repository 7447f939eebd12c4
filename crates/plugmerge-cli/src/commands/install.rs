//! Install command

use std::path::Path;

use colored::Colorize;
use plugmerge_core::{Error, InstallReport, Project};

use super::{failure_policy, print_install_event};
use crate::error::Result;

/// Run the install command
pub fn run_install(path: &Path, fail_fast: bool) -> Result<()> {
    let project = Project::open(path)?;
    let policy = failure_policy(&project, fail_fast);

    let report = project.install(policy, print_install_event)?;
    finish_install(&report)
}

/// Print the install summary; any failure becomes the command's error.
pub(super) fn finish_install(report: &InstallReport) -> Result<()> {
    println!();
    println!(
        "{} {} installed, {} failed",
        "Install".bold(),
        report.installed.len().to_string().green(),
        report.failures.len().to_string().red()
    );
    if report.aborted {
        println!("  {}", "stopped at the first failure".yellow());
    }

    if report.is_success() {
        Ok(())
    } else {
        Err(Error::FetchFailed {
            failures: report.failure_messages(),
        }
        .into())
    }
}
