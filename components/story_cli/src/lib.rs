//! Story tooling CLI library
//!
//! Provides the StoryTool and argument types behind the `storyc` binary.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod cli;
pub mod error;
pub mod sample;
pub mod tool;

pub use cli::{Cli, Command};
pub use error::{CliError, CliResult};
pub use sample::sample_story;
pub use tool::{RoundtripReport, SaveReport, StoryReport, StoryTool};
