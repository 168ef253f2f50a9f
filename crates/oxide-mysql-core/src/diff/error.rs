//! Diff rendering errors.
//!
//! Rendering never throws away its output: both the unsafe and unsupported
//! errors carry the statement text that would have been returned, so callers
//! can log it or force it through.

use std::fmt;

use super::DiffType;

/// A generated statement is destructive or risky and the modifiers in use do
/// not allow unsafe DDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct UnsafeDiffError {
    pub reason: String,
    /// The withheld statement.
    pub statement: String,
}

/// Which side of a table diff made it unsupported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnsupportedSide {
    /// Only the desired ("to") table uses unsupported features.
    To,
    /// Only the original ("from") table uses unsupported features.
    From,
    Both,
    /// Both tables are supported but their difference could not be expressed,
    /// e.g. a partition list change for HASH partitioning.
    Neither,
}

impl fmt::Display for UnsupportedSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Self::To => "the desired state (\"to\" side of diff) contains unsupported features",
            Self::From => "the original state (\"from\" side of diff) contains unsupported features",
            Self::Both => "both sides of the diff contain unsupported features",
            Self::Neither => "the difference cannot be expressed in ALTER TABLE clauses",
        };
        f.write_str(msg)
    }
}

/// Errors returned when rendering diffs into DDL.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DiffError {
    #[error(transparent)]
    Unsafe(#[from] UnsafeDiffError),

    /// The generated statement is likely incomplete or incorrect. An unsafe
    /// condition found in the same statement is kept in `unsafe_error`.
    #[error("unsupported diff for {table}: {side}")]
    Unsupported {
        /// Escaped table name.
        table: String,
        side: UnsupportedSide,
        /// Best-effort partial statement; may be empty.
        statement: String,
        unsafe_error: Option<UnsafeDiffError>,
    },

    #[error("cannot mark TableDiff as supported: no alter clauses were generated")]
    NoClauses,

    #[error("cannot mark TableDiff as supported: supported is already true")]
    AlreadySupported,

    #[error("unsupported diff type {0}")]
    UnsupportedDiffType(DiffType),
}

impl DiffError {
    /// The statement text withheld by this error, if any.
    #[must_use]
    pub fn statement(&self) -> Option<&str> {
        match self {
            Self::Unsafe(err) => Some(&err.statement),
            Self::Unsupported { statement, .. } => Some(statement),
            _ => None,
        }
    }

    /// True if the withheld statement contains unsafe DDL.
    #[must_use]
    pub const fn is_unsafe(&self) -> bool {
        matches!(
            self,
            Self::Unsafe(_) | Self::Unsupported { unsafe_error: Some(_), .. }
        )
    }

    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }
}
