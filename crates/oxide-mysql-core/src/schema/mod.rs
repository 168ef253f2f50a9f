//! In-memory schema model.
//!
//! A [`Schema`] holds ordered tables and routines. Every type here can be
//! built by hand, loaded from a JSON snapshot, or produced by an external
//! introspector that runs the [`fixup`] pass over each table.

mod check;
mod column;
mod foreign_key;
pub mod fixup;
mod index;
mod partition;
mod routine;
mod table;
mod util;

use serde::{Deserialize, Serialize};

pub use check::Check;
pub use column::Column;
pub use foreign_key::ForeignKey;
pub use index::{Index, IndexPart};
pub use partition::{Partition, PartitionListMode, TablePartitioning};
pub use routine::{Routine, RoutineParseError};
pub use table::Table;
pub use util::{
    escape_identifier, escape_value_for_create_table, filter_sql_mode, longest_increasing_subsequence,
    normalize_create_options, parse_create_auto_inc, parse_create_partitioning, parse_create_tablespace,
    reformat_create_options, strip_display_width, INTROSPECTION_BAD_SQL_MODES, NON_PORTABLE_SQL_MODES,
};

use crate::object::{ObjectKey, ObjectType};

/// A database: default charset and collation plus its tables and routines.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schema {
    pub name: String,
    #[serde(rename = "defaultCharSet")]
    pub charset: String,
    #[serde(rename = "defaultCollation")]
    pub collation: String,
    pub tables: Vec<Table>,
    pub routines: Vec<Routine>,
}

impl Schema {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    #[must_use]
    pub fn with_routine(mut self, routine: Routine) -> Self {
        self.routines.push(routine);
        self
    }

    #[must_use]
    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(ObjectType::Database, self.name.clone())
    }

    #[must_use]
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.table(name).is_some()
    }

    /// Procedures in schema order.
    pub fn procedures(&self) -> impl Iterator<Item = &Routine> {
        self.routines_of(ObjectType::Procedure)
    }

    /// Functions in schema order.
    pub fn functions(&self) -> impl Iterator<Item = &Routine> {
        self.routines_of(ObjectType::Function)
    }

    fn routines_of(&self, routine_type: ObjectType) -> impl Iterator<Item = &Routine> {
        self.routines.iter().filter(move |r| r.routine_type == routine_type)
    }

    #[must_use]
    pub fn routine(&self, key: &ObjectKey) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|r| r.routine_type == key.object_type && r.name == key.name)
    }

    #[must_use]
    pub fn create_statement(&self) -> String {
        let mut stmt = format!("CREATE DATABASE {}", escape_identifier(&self.name));
        if !self.charset.is_empty() {
            stmt.push_str(&format!(" CHARACTER SET {}", self.charset));
        }
        if !self.collation.is_empty() {
            stmt.push_str(&format!(" COLLATE {}", self.collation));
        }
        stmt
    }

    /// ALTER DATABASE changing the defaults to `charset` and `collation`.
    /// Empty arguments, and values equal to the current ones, are left out;
    /// returns an empty string when nothing changes.
    #[must_use]
    pub fn alter_statement(&self, charset: &str, collation: &str) -> String {
        let mut clauses = String::new();
        if !charset.is_empty() && self.charset != charset {
            clauses.push_str(&format!(" CHARACTER SET {charset}"));
        }
        if !collation.is_empty() && self.collation != collation {
            clauses.push_str(&format!(" COLLATE {collation}"));
        }
        if clauses.is_empty() {
            return clauses;
        }
        format!("ALTER DATABASE {}{clauses}", escape_identifier(&self.name))
    }

    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP DATABASE {}", escape_identifier(&self.name))
    }
}
