//! Diagnostic severities shared by the compiler and its callers.

use std::fmt;

/// Severity of a diagnostic reported while compiling a story.
///
/// Only [`ErrorType::Error`] invalidates the compiled output; callers must
/// discard a tree produced while any error was reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// A note left by the story's author (e.g. a TODO line)
    Author,
    /// Suspicious but compilable construct
    Warning,
    /// The produced code is unreliable
    Error,
}

impl ErrorType {
    /// True for severities that invalidate the compiled story
    pub fn is_error(self) -> bool {
        matches!(self, ErrorType::Error)
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ErrorType::Author => "TODO",
            ErrorType::Warning => "WARNING",
            ErrorType::Error => "ERROR",
        };
        f.write_str(label)
    }
}
