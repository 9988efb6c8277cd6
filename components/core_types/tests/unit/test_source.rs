//! Unit tests for DebugMetadata

use core_types::DebugMetadata;

#[cfg(test)]
mod debug_metadata_tests {
    use super::*;

    #[test]
    fn test_new_spans_whole_lines() {
        let dm = DebugMetadata::new(Some("main.ink".to_string()), 10, 12);
        assert_eq!(dm.start_line_number, 10);
        assert_eq!(dm.end_line_number, 12);
        assert_eq!(dm.start_character_number, 1);
        assert_eq!(dm.end_character_number, 1);
        assert!(dm.source_name.is_none());
    }

    #[test]
    fn test_display_with_file() {
        let dm = DebugMetadata::new(Some("main.ink".to_string()), 10, 12);
        assert_eq!(format!("{}", dm), "line 10 of main.ink");
    }

    #[test]
    fn test_default_is_line_zero() {
        let dm = DebugMetadata::default();
        assert_eq!(dm.start_line_number, 0);
        assert!(dm.file_name.is_none());
    }

    #[test]
    fn test_merge_keeps_own_file_name() {
        let a = DebugMetadata::new(Some("a.ink".to_string()), 1, 1);
        let b = DebugMetadata::new(Some("b.ink".to_string()), 5, 6);
        let merged = a.merge(&b);
        assert_eq!(merged.file_name.as_deref(), Some("a.ink"));
        assert_eq!(merged.start_line_number, 1);
        assert_eq!(merged.end_line_number, 6);
    }

    #[test]
    fn test_merge_is_symmetric_in_range() {
        let a = DebugMetadata::new(None, 3, 8).with_characters(4, 2);
        let b = DebugMetadata::new(None, 5, 9).with_characters(1, 7);
        let ab = a.merge(&b);
        let ba = b.merge(&a);
        assert_eq!(ab.start_line_number, ba.start_line_number);
        assert_eq!(ab.end_line_number, ba.end_line_number);
        assert_eq!(ab.start_character_number, ba.start_character_number);
        assert_eq!(ab.end_character_number, ba.end_character_number);
    }
}
