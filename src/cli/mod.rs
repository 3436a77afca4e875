//! Command-line interface for tick
//!
//! This module defines the CLI structure using clap derive macros.
//! Each command family is implemented in its own submodule.

use clap::{Parser, Subcommand};

use crate::error::Result;

mod init;
mod list;
mod update;

/// tick - checkbox tasks in Markdown notes
///
/// Scans a vault of Markdown documents for `- [ ]` task lines and lets you
/// list, filter, complete, and edit them from the terminal.
#[derive(Parser, Debug)]
#[command(name = "tick")]
#[command(author, version, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Vault directory (defaults to the configured vault, then the
    /// current directory)
    #[arg(long, global = true, env = "TICK_DIR")]
    pub dir: Option<std::path::PathBuf>,

    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Initialize a vault (write a default .tick.toml)
    Init,

    /// List open tasks grouped by priority
    List {
        /// Only tasks in this category (chat, reading, coding, ...)
        #[arg(long)]
        category: Option<String>,

        /// Only tasks at this priority (p1..p4, none)
        #[arg(long)]
        priority: Option<String>,

        /// Only tasks tagged with this project
        #[arg(long)]
        project: Option<String>,
    },

    /// List open tasks due today or earlier
    Today,

    /// List completed tasks grouped by completion date
    Done,

    /// Show one task in full
    Show {
        /// Task id as printed by list (<path>:<line>)
        id: String,
    },

    /// Complete a task and write it back immediately
    Complete {
        /// Task id as printed by list (<path>:<line>)
        id: String,
    },

    /// Set a task's priority
    Priority {
        /// Task id as printed by list (<path>:<line>)
        id: String,

        /// New priority: p1, p2, p3, p4 or none
        value: String,
    },

    /// Set or clear a task's due date
    Due {
        /// Task id as printed by list (<path>:<line>)
        id: String,

        /// Due date as YYYY-MM-DD, or "clear"
        value: String,
    },

    /// Replace a task's text
    Edit {
        /// Task id as printed by list (<path>:<line>)
        id: String,

        /// New task text (markup-free)
        content: String,
    },

    /// Browse tasks interactively
    Browse {
        /// Include completed tasks
        #[arg(long)]
        all: bool,
    },
}

impl Cli {
    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Init => init::run(self.dir, self.json, self.quiet),
            Commands::List {
                category,
                priority,
                project,
            } => list::run_list(list::ListOptions {
                category,
                priority,
                project,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Today => list::run_today(list::TodayOptions {
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Done => list::run_done(list::DoneOptions {
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Show { id } => list::run_show(list::ShowOptions {
                id,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Complete { id } => update::run_complete(update::CompleteOptions {
                id,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Priority { id, value } => update::run_priority(update::PriorityOptions {
                id,
                value,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Due { id, value } => update::run_due(update::DueOptions {
                id,
                value,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit { id, content } => update::run_edit(update::EditOptions {
                id,
                content,
                dir: self.dir,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Browse { all } => crate::ui::browser::run(self.dir, all),
        }
    }
}
