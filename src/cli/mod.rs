//! Command-line interface for tasktrail
//!
//! This module defines the CLI structure using clap derive macros.
//! Each subcommand is defined in its own submodule.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::error::Result;

mod edit;
mod search;

/// tasktrail - transition-history search and atomic batch edits
///
/// Filters tracker tasks by how they moved between columns, priorities and
/// statuses, and validates batch edits before anything is applied.
#[derive(Parser, Debug)]
#[command(name = "tasktrail")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Configuration file (defaults to ./.tasktrail.toml)
    #[arg(long, global = true, env = "TASKTRAIL_CONFIG")]
    pub config: Option<PathBuf>,

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
    /// Find tasks by transition history and live fields
    Search {
        /// Tracker snapshot (JSON)
        #[arg(long, env = "TASKTRAIL_SNAPSHOT")]
        snapshot: PathBuf,

        /// Column transition pattern (e.g. "from:Doing:backward+in:Todo")
        #[arg(long)]
        column: Option<String>,

        /// Priority transition pattern (e.g. "raised", "to:High")
        #[arg(long)]
        priority: Option<String>,

        /// Status transition pattern (e.g. "from:Open+in:Resolved")
        #[arg(long)]
        status: Option<String>,

        /// Case-insensitive substring of the title
        #[arg(long)]
        text: Option<String>,

        /// Board membership pattern: ',' = OR, '+' = AND, '*' wildcards
        #[arg(long)]
        tag: Option<String>,

        /// Only tasks updated at or after this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        updated_after: Option<String>,

        /// Only tasks created at or after this time (RFC 3339 or YYYY-MM-DD)
        #[arg(long)]
        created_after: Option<String>,
    },

    /// Validate a batch edit; approve all tasks or none
    Edit {
        /// Tracker snapshot (JSON)
        #[arg(long, env = "TASKTRAIL_SNAPSHOT")]
        snapshot: PathBuf,

        /// Task references (T123, 123 or a task URL); read from stdin when omitted
        tasks: Vec<String>,

        /// Priority to set, or raise/lower
        #[arg(long)]
        priority: Option<String>,

        /// Status to set
        #[arg(long)]
        status: Option<String>,

        /// Board the column change applies to
        #[arg(long, alias = "tag")]
        board: Option<String>,

        /// Column to move to, or forward/backward
        #[arg(long)]
        column: Option<String>,

        /// Assignee to set
        #[arg(long)]
        assign: Option<String>,

        /// Comment to add
        #[arg(long)]
        comment: Option<String>,

        /// Validate and report without emitting change events
        #[arg(long)]
        dry_run: bool,

        /// Write approved change-sets as JSON lines ('-' for stdout)
        #[arg(long)]
        events: Option<String>,
    },
}

impl Cli {
    /// Whether change events share stdout with command output.
    pub fn events_to_stdout(&self) -> bool {
        match &self.command {
            Commands::Edit { events, .. } => events
                .as_deref()
                .map(|value| value.trim() == "-")
                .unwrap_or(false),
            Commands::Search { .. } => false,
        }
    }

    /// Execute the CLI command
    pub fn run(self) -> Result<()> {
        match self.command {
            Commands::Search {
                snapshot,
                column,
                priority,
                status,
                text,
                tag,
                updated_after,
                created_after,
            } => search::run(search::SearchOptions {
                snapshot,
                column,
                priority,
                status,
                text,
                tag,
                updated_after,
                created_after,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
            Commands::Edit {
                snapshot,
                tasks,
                priority,
                status,
                board,
                column,
                assign,
                comment,
                dry_run,
                events,
            } => edit::run(edit::EditOptions {
                snapshot,
                tasks,
                priority,
                status,
                board,
                column,
                assign,
                comment,
                dry_run,
                events,
                config: self.config,
                json: self.json,
                quiet: self.quiet,
            }),
        }
    }
}
