//! Stored procedure and function diffs.
//!
//! A change limited to characteristics (comment, data access, security) is a
//! single ALTER. Anything else becomes a DROP/CREATE pair, which MariaDB
//! collapses into one `CREATE OR REPLACE`.

use tracing::debug;

use super::{DiffError, DiffType, ObjectDiff, StatementModifiers, UnsafeDiffError};
use crate::object::{ObjectKey, ObjectType};
use crate::parser::parse_statement_in_string;
use crate::schema::{escape_identifier, escape_value_for_create_table, Routine, Schema};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutineDiff<'a> {
    pub diff_type: DiffType,
    pub from: Option<&'a Routine>,
    pub to: Option<&'a Routine>,
}

/// How a DROP/CREATE pair replacing one routine should be rendered.
#[derive(Debug, Clone, Copy, Default)]
struct Replacement {
    /// Only creation-time metadata (sql_mode, collation) differs.
    metadata_only: bool,
    /// Only characteristics differ, including a comment being cleared.
    clear_comment: bool,
    maria_replace: bool,
}

impl<'a> RoutineDiff<'a> {
    #[must_use]
    pub const fn new(diff_type: DiffType, from: Option<&'a Routine>, to: Option<&'a Routine>) -> Self {
        Self { diff_type, from, to }
    }

    /// True for a CREATE whose body needs alternate delimiter handling.
    #[must_use]
    pub fn is_compound_statement(&self) -> bool {
        self.diff_type == DiffType::Create
            && self
                .to
                .is_some_and(|to| parse_statement_in_string(&to.create_statement).compound)
    }

    fn alter_statement(from: &Routine, to: &Routine, mods: &StatementModifiers) -> String {
        let mut clauses = Vec::new();
        if from.sql_data_access != to.sql_data_access {
            clauses.push(to.sql_data_access.clone());
        }
        if from.security_type != to.security_type {
            clauses.push(format!("SQL SECURITY {}", to.security_type));
        }
        if from.comment != to.comment && (!clauses.is_empty() || !mods.lax_comments) {
            clauses.push(format!("COMMENT '{}'", escape_value_for_create_table(&to.comment)));
        }
        if clauses.is_empty() {
            return String::new();
        }
        format!(
            "ALTER {} {} {}",
            to.routine_type.keyword(),
            escape_identifier(&to.name),
            clauses.join(" ")
        )
    }

    /// Classifies a DROP/CREATE pair. `None` means the pair should render
    /// nothing under `mods`.
    fn replacement(from: &Routine, to: &Routine, mods: &StatementModifiers) -> Option<Replacement> {
        let mut replacement = Replacement::default();
        if from.create_statement == to.create_statement {
            if !mods.compare_metadata {
                return None;
            }
            replacement.metadata_only = true;
        } else if from.comment != to.comment && from.equals_ignoring_characteristics(to) {
            // Only MySQL 8 needs the pair to clear a comment; older flavors
            // turn it back into an ALTER
            replacement.clear_comment = true;
            if mods.lax_comments
                && from.sql_data_access == to.sql_data_access
                && from.security_type == to.security_type
            {
                return None;
            }
        }
        replacement.maria_replace = mods.flavor.is_mariadb(&[]);
        Some(replacement)
    }

    fn drop_statement(&self, from: &Routine, replacement: Replacement, mods: &StatementModifiers) -> Result<String, DiffError> {
        if replacement.maria_replace || (replacement.clear_comment && !mods.flavor.min_mysql(&[8])) {
            return Ok(String::new());
        }
        let mut statement = from.drop_statement();
        if replacement.metadata_only {
            statement = format!(
                "# Dropping and re-creating {} to update metadata\n{statement}",
                self.object_key()
            );
        }
        if mods.allow_unsafe {
            return Ok(statement);
        }
        let reason = if self.to.is_none() {
            format!(
                "Desired drop of {} is risky, since you must first ensure that it is not used in any application queries, or referenced by other routines.",
                self.object_key()
            )
        } else {
            format!(
                "Desired modification to {} requires dropping and re-creating it, and application queries may fail if they attempt to call the routine during the brief moment after the DROP but before the re-CREATE.",
                self.object_key()
            )
        };
        Err(UnsafeDiffError { reason, statement }.into())
    }

    fn create_statement(&self, to: &Routine, replacement: Replacement, mods: &StatementModifiers) -> Result<String, DiffError> {
        if let Some(from) = self.from {
            if replacement.clear_comment && !mods.flavor.min_mysql(&[8]) {
                return Ok(Self::alter_statement(from, to, mods));
            }
        }

        let mut statement = if to.create_statement.is_empty() {
            to.definition(mods.flavor)
        } else {
            to.create_statement.clone()
        };
        if replacement.maria_replace {
            statement = statement.replacen("CREATE ", "CREATE OR REPLACE ", 1);
            if replacement.metadata_only {
                statement = format!("# Replacing {} to update metadata\n{statement}", self.object_key());
            }
        }

        // Unsafe even with CREATE OR REPLACE: call sites may break
        let signature_changed = self.from.is_some_and(|from| {
            from.param_string != to.param_string || from.return_data_type != to.return_data_type
        });
        if signature_changed && !mods.allow_unsafe {
            debug!(routine = %to.name, "routine signature changes");
            return Err(UnsafeDiffError {
                reason: format!(
                    "Desired modification to {} affects its parameters or return type, which may break call-sites in application queries, or in other routines. There is no way to simultaneously deploy application and routine changes in an atomic fashion.",
                    self.object_key()
                ),
                statement,
            }
            .into());
        }
        Ok(statement)
    }
}

impl ObjectDiff for RoutineDiff<'_> {
    fn object_key(&self) -> ObjectKey {
        self.from
            .or(self.to)
            .map_or_else(|| ObjectKey::new(ObjectType::Procedure, ""), Routine::object_key)
    }

    fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    fn statement(&self, mods: &StatementModifiers) -> Result<String, DiffError> {
        if self.diff_type == DiffType::Alter {
            return match (self.from, self.to) {
                (Some(from), Some(to)) => Ok(Self::alter_statement(from, to, mods)),
                _ => Err(DiffError::UnsupportedDiffType(self.diff_type)),
            };
        }

        let replacement = match (self.from, self.to) {
            (Some(from), Some(to)) => match Self::replacement(from, to, mods) {
                Some(replacement) => replacement,
                None => return Ok(String::new()),
            },
            _ => Replacement::default(),
        };
        match (self.diff_type, self.from, self.to) {
            (DiffType::Drop, Some(from), _) => self.drop_statement(from, replacement, mods),
            (DiffType::Create, _, Some(to)) => self.create_statement(to, replacement, mods),
            _ => Err(DiffError::UnsupportedDiffType(self.diff_type)),
        }
    }
}

/// Compares procedures, then functions. Within each type, diffs for existing
/// routines follow the "from" schema's order and new routines come last.
#[must_use]
pub fn compare_routines<'a>(from: &'a Schema, to: &'a Schema) -> Vec<RoutineDiff<'a>> {
    compare_routine_lists(&from.routines, &to.routines)
}

pub(super) fn compare_routine_lists<'a>(from: &'a [Routine], to: &'a [Routine]) -> Vec<RoutineDiff<'a>> {
    let of_type = |routines: &'a [Routine], routine_type: ObjectType| {
        routines.iter().filter(move |r| r.routine_type == routine_type)
    };
    let mut diffs = compare_routines_by_name(of_type(from, ObjectType::Procedure), of_type(to, ObjectType::Procedure));
    diffs.extend(compare_routines_by_name(
        of_type(from, ObjectType::Function),
        of_type(to, ObjectType::Function),
    ));
    diffs
}

fn compare_routines_by_name<'a>(
    from: impl Iterator<Item = &'a Routine>,
    to: impl Iterator<Item = &'a Routine>,
) -> Vec<RoutineDiff<'a>> {
    let from: Vec<&Routine> = from.collect();
    let to: Vec<&Routine> = to.collect();
    let mut diffs = Vec::new();

    for &old in &from {
        let Some(&new) = to.iter().find(|r| r.name == old.name) else {
            diffs.push(RoutineDiff::new(DiffType::Drop, Some(old), None));
            continue;
        };
        if old.equals(new) {
            continue;
        }
        // MySQL 8 cannot clear a comment with ALTER, and the flavor isn't
        // known yet, so clearing one always takes a DROP/CREATE pair
        if old.equals_ignoring_characteristics(new) && (old.comment.is_empty() || !new.comment.is_empty()) {
            diffs.push(RoutineDiff::new(DiffType::Alter, Some(old), Some(new)));
        } else {
            diffs.push(RoutineDiff::new(DiffType::Drop, Some(old), Some(new)));
            diffs.push(RoutineDiff::new(DiffType::Create, Some(old), Some(new)));
        }
    }
    for &new in &to {
        if !from.iter().any(|r| r.name == new.name) {
            diffs.push(RoutineDiff::new(DiffType::Create, None, Some(new)));
        }
    }
    diffs
}
