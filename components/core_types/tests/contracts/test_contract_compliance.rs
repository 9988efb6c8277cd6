//! Contract compliance tests for core_types
//!
//! Verifies the public surface other components depend on.

use core_types::{DebugMetadata, ErrorType};

#[test]
fn test_error_type_has_all_severities() {
    let _ = ErrorType::Author;
    let _ = ErrorType::Warning;
    let _ = ErrorType::Error;
}

#[test]
fn test_debug_metadata_fields_are_public() {
    let dm = DebugMetadata {
        file_name: None,
        source_name: Some("module".to_string()),
        start_line_number: 1,
        end_line_number: 2,
        start_character_number: 3,
        end_character_number: 4,
    };
    assert_eq!(dm.source_name.as_deref(), Some("module"));
    assert_eq!(dm.end_character_number, 4);
}

#[test]
fn test_debug_metadata_is_clone_and_eq() {
    let dm = DebugMetadata::new(None, 1, 1);
    assert_eq!(dm.clone(), dm);
}
