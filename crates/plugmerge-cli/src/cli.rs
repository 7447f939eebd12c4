//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// plugmerge - Resolve, fetch and merge storefront plugins
#[derive(Parser, Debug)]
#[command(name = "plugmerge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Project root
    #[arg(
        short = 'C',
        long = "directory",
        global = true,
        env = "PLUGMERGE_DIR",
        default_value = "."
    )]
    pub directory: PathBuf,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Resolve manifest layers into the installed set
    ///
    /// Writes .plugins/installed.json. Requirements are only expanded for
    /// plugins already installed, unless --deep is given.
    Resolve {
        /// Download plugins that are not installed yet to read their requirements
        #[arg(long)]
        deep: bool,

        /// Print the dependency tree afterwards
        #[arg(long)]
        tree: bool,
    },

    /// Download and extract every plugin in the installed set
    Install {
        /// Stop at the first failed plugin
        #[arg(long)]
        fail_fast: bool,
    },

    /// Merge installed plugins into the destination tree
    Merge,

    /// Resolve, install and merge in one run
    Sync {
        /// Download plugins that are not installed yet to read their requirements
        #[arg(long)]
        deep: bool,

        /// Stop at the first failed plugin
        #[arg(long)]
        fail_fast: bool,
    },

    /// Show installed plugins and whether they changed on disk
    Status {
        /// Output as JSON for scripting
        #[arg(long)]
        json: bool,
    },

    /// Print the dependency tree without writing anything
    Tree,
}
