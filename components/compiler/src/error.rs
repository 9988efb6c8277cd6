//! Compile diagnostics and error types

use bytecode_system::TreeError;
use core_types::{DebugMetadata, ErrorType};
use std::fmt;
use thiserror::Error;
use tracing::{error, info, warn};

/// Result type for compilation
pub type Result<T> = std::result::Result<T, CompileError>;

/// Caller-supplied sink for diagnostics, called with the rendered message
pub type ErrorHandler = Box<dyn FnMut(&str, ErrorType)>;

/// Fatal outcome of a compile
#[derive(Debug, Error)]
pub enum CompileError {
    /// The arena was used incorrectly while lowering
    #[error("tree construction failed: {0}")]
    Tree(#[from] TreeError),

    /// Error diagnostics were reported; the generated tree was discarded
    #[error("story had {errors} error(s)")]
    Diagnostics {
        /// Number of error-severity diagnostics
        errors: usize,
    },
}

/// A message reported while lowering or resolving
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Human-readable text
    pub message: String,
    /// Severity
    pub error_type: ErrorType,
    /// Where it happened, if known
    pub debug_metadata: Option<DebugMetadata>,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.debug_metadata {
            Some(dm) => write!(f, "{}: {}: {}", self.error_type, dm, self.message),
            None => write!(f, "{}: {}", self.error_type, self.message),
        }
    }
}

/// Collects diagnostics and forwards them to the optional handler
#[derive(Default)]
pub struct Diagnostics {
    reported: Vec<Diagnostic>,
    handler: Option<ErrorHandler>,
}

impl Diagnostics {
    /// Collector without a handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Collector that also forwards to `handler`
    pub fn with_handler(handler: Option<ErrorHandler>) -> Self {
        Self {
            reported: Vec::new(),
            handler,
        }
    }

    /// Record a diagnostic
    pub fn report(
        &mut self,
        message: impl Into<String>,
        error_type: ErrorType,
        debug_metadata: Option<DebugMetadata>,
    ) {
        let diagnostic = Diagnostic {
            message: message.into(),
            error_type,
            debug_metadata,
        };
        let rendered = diagnostic.to_string();
        match error_type {
            ErrorType::Error => error!(diagnostic = %rendered, "compile error"),
            ErrorType::Warning => warn!(diagnostic = %rendered, "compile warning"),
            ErrorType::Author => info!(diagnostic = %rendered, "author note"),
        }
        if let Some(handler) = self.handler.as_mut() {
            handler(&rendered, error_type);
        }
        self.reported.push(diagnostic);
    }

    /// Every diagnostic so far, in report order
    pub fn all(&self) -> &[Diagnostic] {
        &self.reported
    }

    /// Number of error-severity diagnostics
    pub fn error_count(&self) -> usize {
        self.reported
            .iter()
            .filter(|d| d.error_type.is_error())
            .count()
    }

    /// Check if any diagnostic was an error
    pub fn has_errors(&self) -> bool {
        self.error_count() > 0
    }

    /// Forget collected diagnostics, keeping the handler
    pub fn clear(&mut self) {
        self.reported.clear();
    }
}

impl fmt::Debug for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Diagnostics")
            .field("reported", &self.reported)
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}
