//! Unit tests for ErrorType

use core_types::ErrorType;

#[cfg(test)]
mod error_type_tests {
    use super::*;

    #[test]
    fn test_error_invalidates_output() {
        assert!(ErrorType::Error.is_error());
    }

    #[test]
    fn test_warning_and_author_do_not_invalidate_output() {
        assert!(!ErrorType::Warning.is_error());
        assert!(!ErrorType::Author.is_error());
    }

    #[test]
    fn test_error_type_is_copy_and_eq() {
        let a = ErrorType::Warning;
        let b = a;
        assert_eq!(a, b);
        assert_ne!(a, ErrorType::Error);
    }

    #[test]
    fn test_error_display() {
        assert_eq!(ErrorType::Error.to_string(), "ERROR");
    }
}
