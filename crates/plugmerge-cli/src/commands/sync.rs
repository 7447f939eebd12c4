//! Sync command: resolve, install and merge

use std::path::Path;

use colored::Colorize;
use plugmerge_core::Project;

use super::install::finish_install;
use super::merge::print_merge;
use super::{failure_policy, print_install_event};
use crate::error::Result;

/// Run the sync command
pub fn run_sync(path: &Path, deep: bool, fail_fast: bool) -> Result<()> {
    let project = Project::open(path)?;
    let policy = failure_policy(&project, fail_fast);

    let summary = project.sync(deep, policy, print_install_event)?;

    for warning in &summary.resolution.warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
    println!();
    print_merge(&summary.merge);
    // Merge ran over what installed; failed installs still fail the run
    finish_install(&summary.install)
}
