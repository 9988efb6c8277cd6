//! Integration test suite for the story compiler
//!
//! This crate provides integration tests that verify
//! components work together correctly across component boundaries.

/// Re-export components for test convenience
pub mod components {
    pub use bytecode_system;
    pub use compiler;
    pub use core_types;
    pub use story_cli;
}
