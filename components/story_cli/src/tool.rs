//! Command execution
//!
//! The StoryTool owns the codec and runs one subcommand at a time,
//! returning a printable report.

use crate::cli::Command;
use crate::error::CliResult;
use crate::sample::sample_story;
use bytecode_system::{Codec, JsonWriter, Opcode, SaveState, StoryDocument};
use compiler::{Compiler, CompilerOptions};
use std::fmt;
use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Summary of a compiled story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoryReport {
    /// Format version recorded in the document
    pub version: i32,
    /// Nodes reachable from the root
    pub nodes: usize,
    /// Containers among them
    pub containers: usize,
    /// Names of the root's named-only content
    pub flows: Vec<String>,
}

impl fmt::Display for StoryReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "format version: {}", self.version)?;
        writeln!(f, "nodes: {} ({} containers)", self.nodes, self.containers)?;
        write!(f, "flows: {}", self.flows.join(", "))
    }
}

/// Outcome of decoding and re-encoding a story
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundtripReport {
    /// Size of the input text
    pub bytes_in: usize,
    /// Size of the re-encoded text
    pub bytes_out: usize,
    /// The re-encoded document decodes to the same tree
    pub same_structure: bool,
}

impl fmt::Display for RoundtripReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.same_structure { "identical" } else { "DIFFERENT" };
        write!(f, "{} bytes in, {} bytes out: {}", self.bytes_in, self.bytes_out, verdict)
    }
}

/// Summary of a save-state document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    /// Turn the save was made on
    pub turn_index: i32,
    /// Text of each pending choice
    pub choices: Vec<String>,
    /// Kinds of the evaluation stack entries, bottom first
    pub eval_stack: Vec<String>,
    /// Names of saved variables
    pub variables: Vec<String>,
    /// Number of containers with a visit count
    pub visit_counts: usize,
}

impl fmt::Display for SaveReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "turn: {}", self.turn_index)?;
        writeln!(f, "choices: {}", self.choices.join(" | "))?;
        writeln!(f, "evaluation stack: {}", self.eval_stack.join(", "))?;
        writeln!(f, "variables: {}", self.variables.join(", "))?;
        write!(f, "visit counts: {}", self.visit_counts)
    }
}

/// Runs subcommands against story and save-state documents
#[derive(Debug)]
pub struct StoryTool {
    codec: Codec,
}

impl StoryTool {
    /// Create a tool with a fresh codec
    ///
    /// # Example
    /// ```
    /// use story_cli::StoryTool;
    ///
    /// let tool = StoryTool::new().unwrap();
    /// ```
    pub fn new() -> CliResult<Self> {
        Ok(Self {
            codec: Codec::new()?,
        })
    }

    /// Run one subcommand and return the text to print
    pub fn run(&self, command: &Command) -> CliResult<String> {
        match command {
            Command::Inspect { file } => Ok(self.inspect_file(file)?.to_string()),
            Command::Roundtrip { file, output } => {
                Ok(self.roundtrip_file(file, output.as_deref())?.to_string())
            }
            Command::CheckSave { file } => Ok(self.check_save_file(file)?.to_string()),
            Command::Sample { output } => self.sample(output.as_deref()),
        }
    }

    /// Decode a compiled story file
    pub fn load_story(&self, path: &Path) -> CliResult<StoryDocument> {
        let text = fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = text.len(), "read story");
        Ok(StoryDocument::from_str(&self.codec, &text)?)
    }

    /// Summarise a compiled story file
    pub fn inspect_file(&self, path: &Path) -> CliResult<StoryReport> {
        let document = self.load_story(path)?;
        Ok(self.inspect(&document))
    }

    /// Summarise a decoded story
    pub fn inspect(&self, document: &StoryDocument) -> StoryReport {
        let reachable = document.tree.descendants(document.root);
        let containers = reachable
            .iter()
            .filter(|id| document.tree.container(**id).is_some())
            .count();
        StoryReport {
            version: document.version,
            nodes: reachable.len(),
            containers,
            flows: document.flow_names().into_iter().map(String::from).collect(),
        }
    }

    /// Decode, re-encode and decode again, optionally writing the result
    pub fn roundtrip_file(&self, path: &Path, output: Option<&Path>) -> CliResult<RoundtripReport> {
        let text = fs::read_to_string(path)?;
        let document = StoryDocument::from_str(&self.codec, &text)?;
        let encoded = document.to_json_string(&self.codec)?;
        let restored = StoryDocument::from_str(&self.codec, &encoded)?;

        let same_structure = document
            .tree
            .same_structure(document.root, &restored.tree, restored.root);
        if let Some(output) = output {
            self.write_story(&restored, output)?;
        }

        let report = RoundtripReport {
            bytes_in: text.len(),
            bytes_out: encoded.len(),
            same_structure,
        };
        info!(path = %path.display(), same_structure, "round trip finished");
        Ok(report)
    }

    /// Summarise a save-state file
    pub fn check_save_file(&self, path: &Path) -> CliResult<SaveReport> {
        let text = fs::read_to_string(path)?;
        let state = SaveState::from_str(&self.codec, &text)?;
        Ok(SaveReport {
            turn_index: state.turn_index,
            choices: state.current_choices.iter().map(|c| c.text.clone()).collect(),
            eval_stack: state
                .eval_stack
                .iter()
                .map(|id| describe(state.tree.opcode(*id)))
                .collect(),
            variables: state.variables.iter().map(|(name, _)| name.clone()).collect(),
            visit_counts: state.visit_counts.len(),
        })
    }

    /// Compile the sample story; write it to `output` or return its text
    pub fn sample(&self, output: Option<&Path>) -> CliResult<String> {
        let mut compiler = Compiler::new(CompilerOptions::new().with_source_filename("sample"));
        let document = compiler.compile(&sample_story())?;
        match output {
            Some(path) => {
                self.write_story(&document, path)?;
                Ok(format!("wrote {}", path.display()))
            }
            None => Ok(document.to_json_string(&self.codec)?),
        }
    }

    /// Stream a story straight into a file
    pub fn write_story(&self, document: &StoryDocument, path: &Path) -> CliResult<()> {
        let file = fs::File::create(path)?;
        let mut writer = JsonWriter::from_writer(BufWriter::new(file));
        document.write_to(&self.codec, &mut writer)?;
        let bytes = writer.bytes_written();
        writer.into_inner().flush()?;
        info!(path = %path.display(), bytes, "story written");
        Ok(())
    }
}

fn describe(opcode: &Opcode) -> String {
    match opcode {
        Opcode::Value(value) => format!("{} {}", value.type_name(), value),
        other => other.kind_name().to_string(),
    }
}
