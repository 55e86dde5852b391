//! Command-line interface definitions.

use std::collections::HashMap;
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "doistkit",
    version,
    about = "Backup, template and calendar-import toolkit for Todoist"
)]
pub struct Cli {
    /// More verbose output
    #[arg(short = 'd', long = "debug", global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Capture a full account snapshot into a compressed file
    Backup {
        /// Base name for the backup artifact
        #[arg(short, long)]
        file: String,
    },

    /// Replay a previously captured snapshot into the account
    Restore {
        /// Backup file to restore from
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Materialize a template file against the account
    Template {
        /// Template document (YAML)
        template: PathBuf,

        /// Placeholder values substituted into the template
        #[arg(short = 'D', value_name = "KEY=VALUE,...", value_parser = parse_placeholders)]
        placeholders: Option<HashMap<String, String>>,
    },

    /// Import calendar events as tasks
    Ics {
        /// ICS calendar file
        #[arg(short, long)]
        calendar: PathBuf,

        /// Label assigned to all the events
        #[arg(short, long)]
        label: Option<String>,

        /// Events project name; if not set, events are put to the Inbox
        #[arg(short, long)]
        project: Option<String>,

        /// Name of section to put all events into
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Create tasks from lines read on standard input
    Quick {
        /// Project name the tasks go to
        #[arg(short, long)]
        project: Option<String>,

        /// Section name the tasks go to
        #[arg(short, long)]
        section: Option<String>,

        /// Label assigned to all the tasks
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Print a JSON-encoded array containing all user projects
    Projects,

    /// Print a JSON-encoded array containing all sections
    Sections,

    /// Print a JSON-encoded array containing all user labels
    Labels,
}

fn parse_placeholders(raw: &str) -> Result<HashMap<String, String>, String> {
    let mut values = HashMap::new();
    for pair in raw.split(',') {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("'{pair}' is not a KEY=VALUE pair"))?;
        values.insert(key.to_string(), value.to_string());
    }
    Ok(values)
}
