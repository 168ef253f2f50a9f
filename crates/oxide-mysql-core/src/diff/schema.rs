//! Schema and database diffs.

use std::fmt;

use tracing::debug;

use super::routine::compare_routine_lists;
use super::{DiffError, DiffType, ObjectDiff, RoutineDiff, StatementModifiers, TableDiff};
use crate::object::{ObjectKey, ObjectType};
use crate::schema::{escape_identifier, Schema, Table};

/// Differences in database-level defaults, or a database being created.
///
/// Dropping a database is never emitted: a desired state without the
/// database compares as no difference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatabaseDiff<'a> {
    pub from: Option<&'a Schema>,
    pub to: Option<&'a Schema>,
}

impl<'a> DatabaseDiff<'a> {
    /// Returns `None` when no database-level DDL is needed.
    #[must_use]
    pub fn new(from: Option<&'a Schema>, to: Option<&'a Schema>) -> Option<Self> {
        let diff = Self { from, to };
        (diff.diff_type() != DiffType::None).then_some(diff)
    }
}

impl ObjectDiff for DatabaseDiff<'_> {
    fn object_key(&self) -> ObjectKey {
        self.from
            .or(self.to)
            .map_or_else(|| ObjectKey::new(ObjectType::Database, ""), Schema::object_key)
    }

    fn diff_type(&self) -> DiffType {
        match (self.from, self.to) {
            (None, Some(_)) => DiffType::Create,
            (Some(from), Some(to)) if from.charset != to.charset || from.collation != to.collation => {
                DiffType::Alter
            }
            _ => DiffType::None,
        }
    }

    fn statement(&self, _mods: &StatementModifiers) -> Result<String, DiffError> {
        match (self.diff_type(), self.from, self.to) {
            (DiffType::Create, _, Some(to)) => Ok(format!(
                "{};\nUSE {}",
                to.create_statement(),
                escape_identifier(&to.name)
            )),
            (DiffType::Alter, Some(from), Some(to)) => Ok(from.alter_statement(&to.charset, &to.collation)),
            _ => Ok(String::new()),
        }
    }
}

/// Every difference between two versions of a schema.
///
/// Either side may be absent, for a database that doesn't exist yet.
#[derive(Debug, Clone)]
pub struct SchemaDiff<'a> {
    pub from: Option<&'a Schema>,
    pub to: Option<&'a Schema>,
    pub database_diff: Option<DatabaseDiff<'a>>,
    pub table_diffs: Vec<TableDiff<'a>>,
    pub routine_diffs: Vec<RoutineDiff<'a>>,
}

impl<'a> SchemaDiff<'a> {
    #[must_use]
    pub fn new(from: Option<&'a Schema>, to: Option<&'a Schema>) -> Self {
        let from_tables = from.map_or(&[][..], |s| s.tables.as_slice());
        let to_tables = to.map_or(&[][..], |s| s.tables.as_slice());
        let from_routines = from.map_or(&[][..], |s| s.routines.as_slice());
        let to_routines = to.map_or(&[][..], |s| s.routines.as_slice());

        let table_diffs = compare_tables(from_tables, to_tables);
        let routine_diffs = compare_routine_lists(from_routines, to_routines);
        debug!(
            tables = table_diffs.len(),
            routines = routine_diffs.len(),
            "compared schemas"
        );
        Self {
            from,
            to,
            database_diff: DatabaseDiff::new(from, to),
            table_diffs,
            routine_diffs,
        }
    }

    /// All diffs in an order whose statements can be run as listed: the
    /// database first, then tables, then routines.
    #[must_use]
    pub fn object_diffs(&self) -> Vec<&dyn ObjectDiff> {
        let mut result: Vec<&dyn ObjectDiff> =
            Vec::with_capacity(1 + self.table_diffs.len() + self.routine_diffs.len());
        if let Some(dd) = &self.database_diff {
            result.push(dd);
        }
        result.extend(self.table_diffs.iter().map(|td| td as &dyn ObjectDiff));
        result.extend(self.routine_diffs.iter().map(|rd| rd as &dyn ObjectDiff));
        result
    }
}

/// For display only: renders every diff with default modifiers, including
/// statements that would be refused as unsafe or unsupported.
impl fmt::Display for SchemaDiff<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mods = StatementModifiers::default();
        for diff in self.object_diffs() {
            let stmt = match diff.statement(&mods) {
                Ok(stmt) => stmt,
                Err(err) => err.statement().unwrap_or_default().to_string(),
            };
            writeln!(f, "{stmt};")?;
        }
        Ok(())
    }
}

/// Tables are compared in "from" order. Alters adding foreign keys go last,
/// since the keys may reference tables, columns or indexes created earlier
/// in the diff.
fn compare_tables<'a>(from: &'a [Table], to: &'a [Table]) -> Vec<TableDiff<'a>> {
    let mut table_diffs = Vec::new();
    let mut add_fk_alters = Vec::new();

    for from_table in from {
        let Some(to_table) = to.iter().find(|t| t.name == from_table.name) else {
            table_diffs.extend(TableDiff::pre_drop_alters(from_table));
            table_diffs.push(TableDiff::new_drop(from_table));
            continue;
        };
        let Some(td) = TableDiff::new_alter(from_table, to_table) else {
            continue;
        };
        let (other_alter, add_fk_alter) = td.split_add_foreign_keys();
        if let Some(other_alter) = other_alter {
            table_diffs.extend(other_alter.split_conflicts());
        }
        add_fk_alters.extend(add_fk_alter);
    }
    for to_table in to {
        if !from.iter().any(|t| t.name == to_table.name) {
            table_diffs.push(TableDiff::new_create(to_table));
        }
    }

    table_diffs.extend(add_fk_alters);
    table_diffs
}
