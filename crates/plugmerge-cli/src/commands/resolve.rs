//! Resolve and tree commands

use std::path::Path;

use colored::Colorize;
use plugmerge_core::{Project, Resolution};

use crate::error::Result;

/// Run the resolve command
pub fn run_resolve(path: &Path, deep: bool, tree: bool) -> Result<()> {
    let project = Project::open(path)?;
    let resolution = project.resolve(deep)?;

    print_warnings(&resolution);
    println!(
        "{} {} plugin(s) in the installed set",
        "Resolved".green().bold(),
        resolution.plugins.len()
    );
    for plugin in &resolution.plugins {
        println!(
            "  {} {} {} {}",
            "+".green(),
            plugin.key().to_string().cyan(),
            plugin.version,
            format!("({})", plugin.source).dimmed()
        );
    }

    if tree {
        println!();
        print!("{}", resolution.render_tree());
    }
    Ok(())
}

/// Run the tree command
pub fn run_tree(path: &Path) -> Result<()> {
    let project = Project::open(path)?;
    let resolution = project.plan(false)?;

    print_warnings(&resolution);
    if resolution.plugins.is_empty() {
        println!("{}", "No plugins declared".dimmed());
    } else {
        print!("{}", resolution.render_tree());
    }
    Ok(())
}

fn print_warnings(resolution: &Resolution) {
    for warning in &resolution.warnings {
        eprintln!("{}: {}", "warning".yellow().bold(), warning);
    }
}
