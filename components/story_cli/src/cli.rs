//! Command line arguments

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Inspect and re-encode compiled story documents
#[derive(Debug, Parser)]
#[command(name = "storyc", version)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// What to do
    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Print format version, node counts and flow names of a compiled story
    Inspect {
        /// Compiled story JSON
        file: PathBuf,
    },
    /// Decode and re-encode a compiled story, reporting whether it survived
    Roundtrip {
        /// Compiled story JSON
        file: PathBuf,
        /// Write the re-encoded document here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode a save-state document and summarise it
    CheckSave {
        /// Save-state JSON
        file: PathBuf,
    },
    /// Compile the built-in sample story and print or write its JSON
    Sample {
        /// Write the compiled document here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

impl Cli {
    /// Arguments for inspecting `file`
    pub fn inspect(file: impl Into<PathBuf>) -> Self {
        Self {
            verbose: false,
            command: Command::Inspect { file: file.into() },
        }
    }

    /// Default log filter for this invocation
    pub fn default_log_filter(&self) -> &'static str {
        if self.verbose {
            "debug"
        } else {
            "warn,story_cli=info"
        }
    }
}
