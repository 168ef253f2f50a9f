//! Error types for the diff tool.

use std::path::PathBuf;

use oxide_mysql_core::{DiffError, ParseError};

/// Errors that can occur while loading inputs or rendering a diff.
#[derive(Debug, thiserror::Error)]
pub enum DiffToolError {
    /// IO error (reading snapshots, SQL files or option files).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A file could not be read or decoded.
    #[error("Failed to load '{path}': {source}")]
    Load {
        path: PathBuf,
        #[source]
        source: Box<DiffToolError>,
    },

    /// SQL could not be split into statements.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A diff could not be rendered at all.
    #[error(transparent)]
    Diff(#[from] DiffError),

    /// A snapshot failed validation.
    #[error("Invalid snapshot '{path}': {message}")]
    InvalidSnapshot {
        path: PathBuf,
        message: String,
    },
}

impl DiffToolError {
    /// Wraps this error with the path of the file being loaded.
    #[must_use]
    pub fn in_file(self, path: impl Into<PathBuf>) -> Self {
        Self::Load {
            path: path.into(),
            source: Box::new(self),
        }
    }
}

/// Result type for diff tool operations.
pub type Result<T> = std::result::Result<T, DiffToolError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_error_names_the_file() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = DiffToolError::from(io).in_file("schema/a.json");
        assert_eq!(err.to_string(), "Failed to load 'schema/a.json': IO error: gone");
    }

    #[test]
    fn diff_errors_are_transparent() {
        let err = DiffToolError::from(DiffError::NoClauses);
        assert_eq!(err.to_string(), DiffError::NoClauses.to_string());
    }
}
