//! CLI command definitions for the `todo` binary.
//!
//! Each subcommand drives the task list controller the same way an
//! interactive front end would: open the dialog, edit the text, save.

use crate::format::OutputFormat;
use crate::types::TaskId;
use clap::{Parser, Subcommand, ValueEnum};

/// Output format selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    Text,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Minimal task list
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Path to database file (overrides config)
    #[arg(short, long, global = true)]
    pub database: Option<String>,

    /// Output format (overrides config)
    #[arg(short, long, value_enum, global = true)]
    pub format: Option<FormatArg>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Logging output: 0/off, 2/stderr (default), or filename
    #[arg(short, long, default_value = "2", global = true)]
    pub log: String,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List tasks, incomplete first (default if no subcommand given)
    List {
        /// Only show tasks whose text contains this string
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Add a new task
    Add {
        /// Task description
        text: String,
    },

    /// Replace a task's text; blank text deletes the task
    Edit {
        id: TaskId,
        text: String,
    },

    /// Mark a task as completed
    Done { id: TaskId },

    /// Mark a task as not completed
    Undone { id: TaskId },

    /// Delete a task
    Rm { id: TaskId },
}
