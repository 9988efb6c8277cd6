//! Shared leaf types for the story compiler and bytecode crates.
//!
//! # Overview
//!
//! - [`DebugMetadata`] - Source range a compiled node came from
//! - [`ErrorType`] - Severity of a compile diagnostic
//!
//! # Examples
//!
//! ```
//! use core_types::{DebugMetadata, ErrorType};
//!
//! let dm = DebugMetadata::new(None, 12, 14);
//! assert_eq!(dm.end_line_number, 14);
//! assert!(ErrorType::Error.is_error());
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod source;

pub use error::ErrorType;
pub use source::DebugMetadata;
