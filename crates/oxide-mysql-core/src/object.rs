//! Object types and keys shared by the parser, schema model and diffs.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::schema::escape_identifier;

/// A type of object that can be created, altered or dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectType {
    Database,
    Table,
    Procedure,
    Function,
}

impl ObjectType {
    /// Lowercase name as used in messages and statements.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Database => "database",
            Self::Table => "table",
            Self::Procedure => "procedure",
            Self::Function => "function",
        }
    }

    /// Uppercase keyword, e.g. `PROCEDURE`.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Database => "DATABASE",
            Self::Table => "TABLE",
            Self::Procedure => "PROCEDURE",
            Self::Function => "FUNCTION",
        }
    }
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ObjectType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "database" => Ok(Self::Database),
            "table" => Ok(Self::Table),
            "procedure" => Ok(Self::Procedure),
            "function" => Ok(Self::Function),
            _ => Err(format!("unknown object type {s:?}")),
        }
    }
}

/// Uniquely identifies an object within a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectKey {
    pub object_type: ObjectType,
    pub name: String,
}

impl ObjectKey {
    #[must_use]
    pub fn new(object_type: ObjectType, name: impl Into<String>) -> Self {
        Self {
            object_type,
            name: name.into(),
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.object_type, escape_identifier(&self.name))
    }
}
