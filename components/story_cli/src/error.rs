//! Error types for the CLI

use bytecode_system::DecodeError;
use compiler::CompileError;
use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O error
    #[error("File error: {0}")]
    IoError(#[from] std::io::Error),

    /// The document could not be decoded; usually an incompatible format
    #[error("Incompatible or malformed document: {0}")]
    DecodeError(#[from] DecodeError),

    /// The sample story failed to compile
    #[error("Compile error: {0}")]
    CompileError(#[from] CompileError),
}

/// Result type for CLI operations
pub type CliResult<T> = Result<T, CliError>;
