//! Command implementations for plugmerge-cli

pub mod install;
pub mod merge;
pub mod resolve;
pub mod status;
pub mod sync;

pub use install::run_install;
pub use merge::run_merge;
pub use resolve::{run_resolve, run_tree};
pub use status::run_status;
pub use sync::run_sync;

use colored::Colorize;
use plugmerge_core::{FailurePolicy, InstallEvent, Project};

/// Policy from config, forced to abort by `--fail-fast`.
fn failure_policy(project: &Project, fail_fast: bool) -> FailurePolicy {
    if fail_fast {
        FailurePolicy::Abort
    } else {
        project.config().install.failure_policy
    }
}

/// Print one line per install step.
fn print_install_event(event: InstallEvent<'_>) {
    match event {
        InstallEvent::Started { key, index, total } => {
            println!("{} {}", format!("[{}/{}]", index + 1, total).dimmed(), key.to_string().cyan());
        }
        InstallEvent::Installed(outcome) => {
            println!(
                "  {} {} files, revision {}",
                "+".green(),
                outcome.files,
                short_revision(&outcome.revision.value).dimmed()
            );
        }
        InstallEvent::Failed { error, .. } => {
            println!("  {} {}", "x".red(), error);
        }
    }
}

fn short_revision(revision: &str) -> &str {
    let hex = revision.strip_prefix("sha256:").unwrap_or(revision);
    hex.get(..12).unwrap_or(hex)
}
