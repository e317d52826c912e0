//! Error types for building spec trees.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using [`SpecError`] as the error type.
pub type Result<T> = std::result::Result<T, SpecError>;

/// Errors raised while turning declarations into a spec tree.
///
/// None of these are fatal: a failing table is dropped from the tree and the
/// caller decides whether to continue with what was built.
#[derive(Error, Debug)]
pub enum SpecError {
    /// The declaration sequence is malformed.
    #[error("structural error in {context}: {reason}")]
    Structural {
        /// Table label, or source location for scanner errors.
        context: String,
        /// What was wrong.
        reason: String,
    },

    /// An entry's argument count differs from the unit of work's arity.
    #[error(
        "table \"{table}\": entry {index} supplies {found} argument(s) but the unit of work takes {expected}"
    )]
    ArityMismatch {
        table: String,
        /// Zero-based entry index.
        index: usize,
        expected: usize,
        found: usize,
    },

    /// A subtree body panicked while declaring the subtree for one entry.
    #[error("table \"{table}\": subtree body for entry {index} panicked: {message}")]
    SubtreeBodyPanicked {
        table: String,
        index: usize,
        message: String,
    },

    /// A spec source file could not be read.
    #[error("failed to read spec source {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SpecError {
    pub(crate) fn structural(context: impl Into<String>, reason: impl Into<String>) -> Self {
        SpecError::Structural {
            context: context.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_arity_mismatch() {
        let err = SpecError::ArityMismatch {
            table: "Addition".to_string(),
            index: 1,
            expected: 3,
            found: 2,
        };
        assert_eq!(
            err.to_string(),
            "table \"Addition\": entry 1 supplies 2 argument(s) but the unit of work takes 3"
        );
    }

    #[test]
    fn test_error_display_structural() {
        let err = SpecError::structural("nested_test.go:4:1", "unterminated string literal");
        assert_eq!(
            err.to_string(),
            "structural error in nested_test.go:4:1: unterminated string literal"
        );
    }

    #[test]
    fn test_error_display_panicked() {
        let err = SpecError::SubtreeBodyPanicked {
            table: "Math Operations".to_string(),
            index: 0,
            message: "boom".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "table \"Math Operations\": subtree body for entry 0 panicked: boom"
        );
    }
}
