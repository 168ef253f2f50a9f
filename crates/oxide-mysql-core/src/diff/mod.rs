//! Schema diffing and DDL generation.
//!
//! [`SchemaDiff::new`] compares two [`Schema`](crate::schema::Schema) values
//! and produces one [`ObjectDiff`] per changed database, table or routine, in
//! an order whose statements can be run as-is. Each diff renders its DDL
//! through [`ObjectDiff::statement`], shaped by [`StatementModifiers`].

mod clause;
mod error;
mod routine;
mod schema;
mod table;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

pub use clause::{
    AddCheck, AddColumn, AddForeignKey, AddIndex, AlterCheck, AlterIndex, ChangeAutoIncrement,
    ChangeCharSet, ChangeComment, ChangeCreateOptions, ChangeStorageEngine, ChangeTablespace,
    ColumnPosition, DropCheck, DropColumn, DropForeignKey, DropIndex, ModifyColumn, ModifyIndex,
    ModifyPartitions, PartitionBy, RenameColumn, TableAlterClause,
};
pub use error::{DiffError, UnsafeDiffError, UnsupportedSide};
pub use routine::{compare_routines, RoutineDiff};
pub use schema::{DatabaseDiff, SchemaDiff};
pub use table::{diff_partitioning, diff_tables, TableDiff};

use crate::flavor::Flavor;
use crate::object::ObjectKey;

/// How two objects differ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DiffType {
    #[default]
    None,
    Create,
    Drop,
    Alter,
    /// Reserved; no diff currently produces it.
    Rename,
}

impl DiffType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Create => "create",
            Self::Drop => "drop",
            Self::Alter => "alter",
            Self::Rename => "rename",
        }
    }
}

impl fmt::Display for DiffType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A difference in one object that can be rendered as a DDL statement.
pub trait ObjectDiff {
    fn object_key(&self) -> ObjectKey;

    fn diff_type(&self) -> DiffType;

    /// Renders the DDL for this diff. An empty string means there is nothing
    /// to run under `mods`.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::Unsafe`] when `mods` disallow the statement and
    /// [`DiffError::Unsupported`] when the statement may be incomplete. Both
    /// carry the statement text.
    fn statement(&self, mods: &StatementModifiers) -> Result<String, DiffError>;
}

// ================================================================
// Statement modifiers
// ================================================================

/// Handling of next-auto-increment differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NextAutoInc {
    /// Never emit auto-increment changes.
    #[default]
    Ignore,
    /// Only when the "from" value is lower than the "to" value.
    IfIncreased,
    /// Only when the "from" value is already greater than 1.
    IfAlready,
    Always,
}

impl NextAutoInc {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Ignore => "ignore",
            Self::IfIncreased => "if-increased",
            Self::IfAlready => "if-already",
            Self::Always => "always",
        }
    }
}

impl fmt::Display for NextAutoInc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NextAutoInc {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "ignore" => Ok(Self::Ignore),
            "if-increased" | "increase" => Ok(Self::IfIncreased),
            "if-already" | "already" => Ok(Self::IfAlready),
            "always" => Ok(Self::Always),
            other => Err(format!("unknown next-auto-inc mode: {other}")),
        }
    }
}

/// Handling of partitioning status differences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartitioningMode {
    /// Emit every partitioning clause.
    #[default]
    Permissive,
    /// Suppress PARTITION BY, and create new tables unpartitioned.
    Remove,
    /// Suppress REMOVE PARTITIONING and re-partitioning.
    Keep,
}

impl PartitioningMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Permissive => "permissive",
            Self::Remove => "remove",
            Self::Keep => "keep",
        }
    }
}

impl fmt::Display for PartitioningMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PartitioningMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "permissive" => Ok(Self::Permissive),
            "remove" => Ok(Self::Remove),
            "keep" => Ok(Self::Keep),
            other => Err(format!("unknown partitioning mode: {other}")),
        }
    }
}

/// Options adjusting the DDL emitted for a diff, and which statements are
/// refused as unsafe.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatementModifiers {
    pub next_auto_inc: NextAutoInc,
    pub partitioning: PartitioningMode,
    /// Permit destructive DDL: drops, lossy column changes, engine changes.
    pub allow_unsafe: bool,
    /// Value for a `LOCK=` clause on generated ALTER TABLEs.
    pub lock_clause: String,
    /// Value for an `ALGORITHM=` clause on generated ALTER TABLEs.
    pub algorithm_clause: String,
    /// Keep secondary index order even when it has no functional effect.
    pub strict_index_order: bool,
    /// Keep check constraint names, and their order in MariaDB.
    pub strict_check_constraints: bool,
    /// Keep foreign key names and cosmetic rule differences.
    pub strict_foreign_key_naming: bool,
    /// Keep purely cosmetic column differences.
    pub strict_column_definition: bool,
    /// Ignore columns that only differ in position.
    pub lax_column_order: bool,
    /// Ignore comment-only differences.
    pub lax_comments: bool,
    /// Recreate routines whose creation-time metadata differs.
    pub compare_metadata: bool,
    /// Add `WITH VALIDATION` to ALTERs touching virtual columns.
    pub virtual_col_validation: bool,
    /// Skip the partition drops emitted ahead of DROP TABLE.
    pub skip_pre_drop_alters: bool,
    /// Target server. The default (unknown) flavor makes no adjustments.
    pub flavor: Flavor,
}

impl StatementModifiers {
    #[must_use]
    pub fn new(flavor: Flavor) -> Self {
        Self {
            flavor,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn allow_unsafe(mut self) -> Self {
        self.allow_unsafe = true;
        self
    }
}
