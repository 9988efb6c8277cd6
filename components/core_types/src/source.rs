//! Debug metadata describing where a compiled node came from.
//!
//! Nodes carry this optionally; a node without its own metadata inherits
//! the nearest ancestor's when asked.

use std::fmt;

/// A range of source text that produced a compiled node.
///
/// Line and character numbers are 1-based.
///
/// # Examples
///
/// ```
/// use core_types::DebugMetadata;
///
/// let dm = DebugMetadata::new(Some("intro.ink".to_string()), 3, 3);
/// assert_eq!(dm.start_line_number, 3);
/// assert_eq!(dm.to_string(), "line 3 of intro.ink");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DebugMetadata {
    /// Name of the file the range lives in, if known
    pub file_name: Option<String>,
    /// Name of the logical source (e.g. an included module), if distinct
    pub source_name: Option<String>,
    /// First line of the range
    pub start_line_number: u32,
    /// Last line of the range
    pub end_line_number: u32,
    /// Character offset within the first line
    pub start_character_number: u32,
    /// Character offset within the last line
    pub end_character_number: u32,
}

impl DebugMetadata {
    /// Create metadata covering whole lines, with character numbers at 1
    pub fn new(file_name: Option<String>, start_line: u32, end_line: u32) -> Self {
        Self {
            file_name,
            source_name: None,
            start_line_number: start_line,
            end_line_number: end_line,
            start_character_number: 1,
            end_character_number: 1,
        }
    }

    /// Set the character range
    pub fn with_characters(mut self, start: u32, end: u32) -> Self {
        self.start_character_number = start;
        self.end_character_number = end;
        self
    }

    /// Smallest range covering both `self` and `other`.
    ///
    /// File and source names are taken from `self`.
    pub fn merge(&self, other: &DebugMetadata) -> DebugMetadata {
        let (start_line, start_char) = earliest(
            (self.start_line_number, self.start_character_number),
            (other.start_line_number, other.start_character_number),
        );
        let (end_line, end_char) = latest(
            (self.end_line_number, self.end_character_number),
            (other.end_line_number, other.end_character_number),
        );

        DebugMetadata {
            file_name: self.file_name.clone(),
            source_name: self.source_name.clone(),
            start_line_number: start_line,
            end_line_number: end_line,
            start_character_number: start_char,
            end_character_number: end_char,
        }
    }
}

fn earliest(a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
    if a <= b {
        a
    } else {
        b
    }
}

fn latest(a: (u32, u32), b: (u32, u32)) -> (u32, u32) {
    if a >= b {
        a
    } else {
        b
    }
}

impl fmt::Display for DebugMetadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file_name {
            Some(file) => write!(f, "line {} of {}", self.start_line_number, file),
            None => write!(f, "line {}", self.start_line_number),
        }
    }
}
