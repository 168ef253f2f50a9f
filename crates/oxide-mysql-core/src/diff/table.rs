//! Table diffs.
//!
//! [`diff_tables`] compares two versions of a table and returns the ALTER
//! clauses transforming one into the other. [`TableDiff`] wraps those clauses
//! (or a whole-table create/drop) and assembles the final statement.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use super::clause::{
    AddCheck, AddColumn, AddForeignKey, AddIndex, AlterCheck, AlterIndex, ChangeAutoIncrement,
    ChangeCharSet, ChangeComment, ChangeCreateOptions, ChangeStorageEngine, ChangeTablespace,
    ColumnPosition, DropCheck, DropColumn, DropForeignKey, DropIndex, ModifyColumn, ModifyIndex,
    ModifyPartitions, PartitionBy, TableAlterClause,
};
use super::{
    DiffError, DiffType, NextAutoInc, ObjectDiff, PartitioningMode, StatementModifiers,
    UnsafeDiffError, UnsupportedSide,
};
use crate::object::{ObjectKey, ObjectType};
use crate::schema::{
    escape_identifier, longest_increasing_subsequence, parse_create_auto_inc, Check, Column,
    ForeignKey, Index, Table, TablePartitioning,
};

/// A difference in one table: created, dropped or altered.
///
/// For alters, `to` is usually borrowed. The partition drops emitted ahead
/// of a DROP TABLE own a copy of the table with partitioning removed.
#[derive(Debug, Clone)]
pub struct TableDiff<'a> {
    pub diff_type: DiffType,
    pub from: Option<&'a Table>,
    pub to: Option<Cow<'a, Table>>,
    clauses: Vec<TableAlterClause<'a>>,
    supported: bool,
}

impl<'a> TableDiff<'a> {
    #[must_use]
    pub const fn new_create(table: &'a Table) -> Self {
        Self {
            diff_type: DiffType::Create,
            from: None,
            to: Some(Cow::Borrowed(table)),
            clauses: Vec::new(),
            supported: true,
        }
    }

    /// Returns `None` when the tables are identical.
    #[must_use]
    pub fn new_alter(from: &'a Table, to: &'a Table) -> Option<Self> {
        let (clauses, supported) = diff_tables(from, to);
        if supported && clauses.is_empty() {
            return None;
        }
        Some(Self {
            diff_type: DiffType::Alter,
            from: Some(from),
            to: Some(Cow::Borrowed(to)),
            clauses,
            supported,
        })
    }

    #[must_use]
    pub const fn new_drop(table: &'a Table) -> Self {
        Self {
            diff_type: DiffType::Drop,
            from: Some(table),
            to: None,
            clauses: Vec::new(),
            supported: true,
        }
    }

    /// ALTERs dropping all but the last partition of a RANGE or LIST
    /// partitioned table, one partition per statement. Run ahead of DROP
    /// TABLE, they keep a large drop from stalling the server.
    #[must_use]
    pub fn pre_drop_alters(table: &'a Table) -> Vec<Self> {
        let Some(partitioning) = &table.partitioning else {
            return Vec::new();
        };
        if !partitioning.sub_method.is_empty() || !partitioning.has_value_list() {
            return Vec::new();
        }

        let unpartitioned = Table {
            partitioning: None,
            ..table.clone()
        };
        let keep_last = partitioning.partitions.len().saturating_sub(1);
        partitioning.partitions[..keep_last]
            .iter()
            .map(|partition| Self {
                diff_type: DiffType::Alter,
                from: Some(table),
                to: Some(Cow::Owned(unpartitioned.clone())),
                clauses: vec![ModifyPartitions {
                    add: Vec::new(),
                    drop: vec![partition],
                    for_drop_table: true,
                }
                .into()],
                supported: true,
            })
            .collect()
    }

    #[must_use]
    pub fn to_table(&self) -> Option<&Table> {
        self.to.as_deref()
    }

    #[must_use]
    pub fn clauses(&self) -> &[TableAlterClause<'a>] {
        &self.clauses
    }

    #[must_use]
    pub const fn is_supported(&self) -> bool {
        self.supported
    }

    /// Vouches for an alter that was flagged unsupported. Only appropriate
    /// once the caller has verified that the rendered statement is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DiffError::NoClauses`] if there is nothing to vouch for, or
    /// [`DiffError::AlreadySupported`].
    pub fn mark_supported(&mut self) -> Result<(), DiffError> {
        if self.clauses.is_empty() {
            return Err(DiffError::NoClauses);
        }
        if self.supported {
            return Err(DiffError::AlreadySupported);
        }
        self.supported = true;
        Ok(())
    }

    fn with_clauses(&self, clauses: Vec<TableAlterClause<'a>>) -> Self {
        Self {
            diff_type: DiffType::Alter,
            from: self.from,
            to: self.to.clone(),
            clauses,
            supported: true,
        }
    }

    /// Moves ADD FOREIGN KEY clauses into a second diff, so foreign keys are
    /// added after everything they may depend on. Either side is `None` when
    /// it would be empty.
    #[must_use]
    pub fn split_add_foreign_keys(self) -> (Option<Self>, Option<Self>) {
        if self.diff_type != DiffType::Alter || !self.supported || self.clauses.is_empty() {
            return (Some(self), None);
        }
        let (add_fks, others): (Vec<_>, Vec<_>) = self
            .clauses
            .iter()
            .cloned()
            .partition(|c| matches!(c, TableAlterClause::AddForeignKey(_)));
        if add_fks.is_empty() {
            return (Some(self), None);
        }
        if others.is_empty() {
            return (None, Some(self));
        }
        (Some(self.with_clauses(others)), Some(self.with_clauses(add_fks)))
    }

    /// Moves clauses that cannot share one ALTER TABLE into separate diffs:
    /// every FULLTEXT index after the first, and the visibility half of an
    /// index that is also renamed. The first element keeps everything else.
    #[must_use]
    pub fn split_conflicts(self) -> Vec<Self> {
        if self.diff_type != DiffType::Alter || !self.supported || self.clauses.is_empty() {
            return vec![self];
        }

        let mut seen_add_fulltext = false;
        let mut keep = Vec::with_capacity(self.clauses.len());
        let mut separate = Vec::new();
        for clause in &self.clauses {
            match clause {
                TableAlterClause::AddIndex(ai) if ai.index.index_type == "FULLTEXT" => {
                    if seen_add_fulltext {
                        separate.push(clause.clone());
                        continue;
                    }
                    seen_add_fulltext = true;
                }
                TableAlterClause::ModifyIndex(mi)
                    if mi.from.equivalent(mi.to)
                        && mi.from.name != mi.to.name
                        && mi.from.invisible != mi.to.invisible =>
                {
                    // The rename runs first, so the visibility change uses the new name
                    let renamed: &'a Index = mi.to;
                    separate.push(
                        AlterIndex {
                            name: &renamed.name,
                            invisible: renamed.invisible,
                            linked_rename: Some(Box::new(mi.clone())),
                        }
                        .into(),
                    );
                }
                _ => {}
            }
            keep.push(clause.clone());
        }

        let mut result = vec![self.with_clauses(keep)];
        result.extend(separate.into_iter().map(|c| self.with_clauses(vec![c])));
        result
    }

    /// The statement without its `CREATE TABLE name ` or `ALTER TABLE name `
    /// prefix. Empty for drops.
    ///
    /// # Errors
    ///
    /// Same as [`ObjectDiff::statement`].
    pub fn clauses_text(&self, mods: &StatementModifiers) -> Result<String, DiffError> {
        let stmt = self.statement(mods)?;
        if stmt.is_empty() {
            return Ok(stmt);
        }
        let prefix = match (self.diff_type, self.from, self.to_table()) {
            (DiffType::Create, _, Some(to)) => format!("CREATE TABLE {} ", escape_identifier(&to.name)),
            (DiffType::Alter, Some(from), _) => format!("{} ", from.alter_statement()),
            (DiffType::Drop, ..) => return Ok(String::new()),
            _ => return Err(DiffError::UnsupportedDiffType(self.diff_type)),
        };
        Ok(stmt.replacen(&prefix, "", 1))
    }

    fn create_statement(to: &Table, mods: &StatementModifiers) -> String {
        let mut stmt = if to.partitioning.is_some() && mods.partitioning == PartitioningMode::Remove {
            if to.create_statement.is_empty() {
                Table {
                    partitioning: None,
                    ..to.clone()
                }
                .generated_create_statement(mods.flavor)
            } else {
                to.unpartitioned_create_statement(mods.flavor)
            }
        } else if to.create_statement.is_empty() {
            to.generated_create_statement(mods.flavor)
        } else {
            to.create_statement.clone()
        };
        if to.has_auto_increment()
            && matches!(mods.next_auto_inc, NextAutoInc::Ignore | NextAutoInc::IfAlready)
        {
            stmt = parse_create_auto_inc(&stmt).0;
        }
        stmt
    }

    fn alter_statement(&self, mods: &StatementModifiers) -> Result<String, DiffError> {
        let (Some(from), Some(to)) = (self.from, self.to_table()) else {
            return Err(DiffError::UnsupportedDiffType(self.diff_type));
        };

        // InnoDB clusters by the first unique NOT NULL index when there is no
        // primary key, so index order matters there
        let mut mods = mods.clone();
        if !mods.strict_index_order && to.primary_key.is_none() && to.clustered_index_key().is_some() {
            mods.strict_index_order = true;
        }

        let mut clause_strings = Vec::with_capacity(self.clauses.len());
        let mut unsafe_reasons = Vec::new();
        let mut partition_clause = String::new();
        let mut changing_comment = false;
        for clause in &self.clauses {
            if !mods.allow_unsafe {
                if let Some(reason) = clause.unsafe_reason(&mods) {
                    debug!(table = %from.name, %reason, "unsafe alter clause");
                    unsafe_reasons.push(reason);
                }
            }
            let text = clause.clause(&mods);
            if text.is_empty() {
                continue;
            }
            // Must come last, without a preceding comma
            if clause.is_partitioning_change() {
                partition_clause = text;
                continue;
            }
            match clause {
                // Can't be combined with ALGORITHM or LOCK
                TableAlterClause::ModifyPartitions(_) => {
                    mods.lock_clause.clear();
                    mods.algorithm_clause.clear();
                }
                TableAlterClause::ChangeComment(_) => changing_comment = true,
                _ => {}
            }
            clause_strings.push(text);
        }

        let statement = if clause_strings.is_empty() && partition_clause.is_empty() {
            String::new()
        } else if mods.lax_comments
            && clause_strings.len() == 1
            && partition_clause.is_empty()
            && changing_comment
        {
            // A comment change alone is skipped with lax comments
            String::new()
        } else {
            if !mods.lock_clause.is_empty() {
                clause_strings.insert(0, format!("LOCK={}", mods.lock_clause.to_uppercase()));
            }
            if !mods.algorithm_clause.is_empty() {
                clause_strings.insert(0, format!("ALGORITHM={}", mods.algorithm_clause.to_uppercase()));
            }
            if mods.virtual_col_validation && self.touches_virtual_column() {
                clause_strings.push("WITH VALIDATION".to_string());
            }
            let spacer = if !clause_strings.is_empty() && !partition_clause.is_empty() {
                " "
            } else {
                ""
            };
            format!(
                "{} {}{spacer}{partition_clause}",
                from.alter_statement(),
                clause_strings.join(", ")
            )
        };

        let unsafe_error = (!unsafe_reasons.is_empty() && !statement.is_empty()).then(|| UnsafeDiffError {
            reason: format!(
                "Desired alteration for {} is not safe: {}.",
                self.object_key(),
                unsafe_reasons.join("; ")
            ),
            statement: statement.clone(),
        });

        if !self.supported {
            let side = match (from.unsupported_ddl, to.unsupported_ddl) {
                (true, true) => UnsupportedSide::Both,
                (false, true) => UnsupportedSide::To,
                (true, false) => UnsupportedSide::From,
                (false, false) => UnsupportedSide::Neither,
            };
            return Err(DiffError::Unsupported {
                table: self.object_key().to_string(),
                side,
                statement,
                unsafe_error,
            });
        }
        match unsafe_error {
            Some(err) => Err(err.into()),
            None => Ok(statement),
        }
    }

    fn touches_virtual_column(&self) -> bool {
        self.clauses.iter().any(|clause| match clause {
            TableAlterClause::AddColumn(ac) => ac.column.is_virtual,
            TableAlterClause::ModifyColumn(mc) => mc.new.is_virtual,
            _ => false,
        })
    }
}

impl ObjectDiff for TableDiff<'_> {
    fn object_key(&self) -> ObjectKey {
        self.from
            .or_else(|| self.to_table())
            .map(Table::object_key)
            .unwrap_or_else(|| ObjectKey::new(ObjectType::Table, ""))
    }

    fn diff_type(&self) -> DiffType {
        self.diff_type
    }

    /// An ALTER whose clauses all render empty under `mods` yields
    /// `Ok(String::new())`, even when a clause is unsafe: an empty statement
    /// is never reported as unsafe. With `skip_pre_drop_alters` set, a
    /// pre-drop partition alter is therefore `Ok("")` rather than an error.
    fn statement(&self, mods: &StatementModifiers) -> Result<String, DiffError> {
        match (self.diff_type, self.from, self.to_table()) {
            (DiffType::Create, _, Some(to)) => Ok(Self::create_statement(to, mods)),
            (DiffType::Alter, ..) => self.alter_statement(mods),
            (DiffType::Drop, Some(from), _) => {
                let statement = from.drop_statement();
                if mods.allow_unsafe {
                    return Ok(statement);
                }
                Err(UnsafeDiffError {
                    reason: format!(
                        "Desired drop of table {} would cause all of its data to be lost.",
                        escape_identifier(&from.name)
                    ),
                    statement,
                }
                .into())
            }
            _ => Err(DiffError::UnsupportedDiffType(self.diff_type)),
        }
    }
}

impl Table {
    /// Clauses transforming this table into `to`; see [`diff_tables`].
    #[must_use]
    pub fn diff<'a>(&'a self, to: &'a Self) -> (Vec<TableAlterClause<'a>>, bool) {
        diff_tables(self, to)
    }
}

// ================================================================
// Table comparison
// ================================================================

/// Returns the clauses transforming `from` into `to`, and whether the result
/// can be trusted. An untrusted result may still hold useful clauses.
#[must_use]
pub fn diff_tables<'a>(from: &'a Table, to: &'a Table) -> (Vec<TableAlterClause<'a>>, bool) {
    if from.name != to.name {
        return (Vec::new(), false);
    }
    if !from.create_statement.is_empty() && from.create_statement == to.create_statement {
        return (Vec::new(), true);
    }

    // Altering a supported table into an unsupported one would certainly
    // produce incomplete DDL
    let mut supported = !from.unsupported_ddl && !to.unsupported_ddl;
    if !from.unsupported_ddl && to.unsupported_ddl {
        debug!(table = %to.name, "desired table uses unsupported features");
        return (Vec::new(), false);
    }

    let mut clauses = Vec::new();

    // Charset first, so added columns pick up the new default
    if from.charset != to.charset || from.collation != to.collation {
        clauses.push(
            ChangeCharSet {
                from_charset: &from.charset,
                from_collation: &from.collation,
                to_charset: &to.charset,
                to_collation: &to.collation,
            }
            .into(),
        );
    }

    let columns = ColumnsComparison::new(from, to);
    clauses.extend(columns.drops());
    clauses.extend(columns.modifications());
    clauses.extend(columns.adds());

    let pk_changed = match (&from.primary_key, &to.primary_key) {
        (Some(old), Some(new)) => !old.equals(new),
        (None, None) => false,
        _ => true,
    };
    if pk_changed {
        if let Some(pk) = &from.primary_key {
            clauses.push(DropIndex { index: pk }.into());
        }
        if let Some(pk) = &to.primary_key {
            clauses.push(AddIndex { index: pk }.into());
        }
    }

    clauses.extend(compare_secondary_indexes(from, to));
    clauses.extend(compare_foreign_keys(from, to));
    clauses.extend(compare_checks(from, to));

    if from.engine != to.engine {
        clauses.push(ChangeStorageEngine { new_engine: &to.engine }.into());
    }
    if from.next_auto_increment != to.next_auto_increment && to.has_auto_increment() {
        clauses.push(
            ChangeAutoIncrement {
                old: from.next_auto_increment,
                new: to.next_auto_increment,
            }
            .into(),
        );
    }
    if from.create_options != to.create_options {
        clauses.push(
            ChangeCreateOptions {
                old: &from.create_options,
                new: &to.create_options,
            }
            .into(),
        );
    }
    if from.comment != to.comment {
        clauses.push(ChangeComment { new_comment: &to.comment }.into());
    }
    if from.tablespace != to.tablespace {
        clauses.push(ChangeTablespace { new_tablespace: &to.tablespace }.into());
    }

    // Partitioning goes last: PARTITION BY must end the ALTER TABLE
    let (partition_clauses, partitioning_supported) =
        diff_partitioning(from.partitioning.as_ref(), to.partitioning.as_ref());
    clauses.extend(partition_clauses);
    if !partitioning_supported {
        debug!(table = %to.name, "partition list change is not supported for this method");
        supported = false;
    }

    // Differing CREATE text with no clauses means something was missed
    if clauses.is_empty() && !from.create_statement.is_empty() && !to.create_statement.is_empty() {
        debug!(table = %to.name, "CREATE statements differ but no clauses were generated");
        supported = false;
    }

    (clauses, supported)
}

/// Compares partitioning. Returns `false` for partition list changes that
/// can't be expressed, i.e. on HASH or KEY partitioned tables.
#[must_use]
pub fn diff_partitioning<'a>(
    from: Option<&'a TablePartitioning>,
    to: Option<&'a TablePartitioning>,
) -> (Vec<TableAlterClause<'a>>, bool) {
    let (from, to) = match (from, to) {
        (None, None) => return (Vec::new(), true),
        (None, Some(to)) => {
            return (
                vec![PartitionBy { partitioning: to, repartition: false }.into()],
                true,
            )
        }
        (Some(_), None) => return (vec![TableAlterClause::RemovePartitioning], true),
        (Some(from), Some(to)) => (from, to),
    };

    let repartition = || vec![PartitionBy { partitioning: to, repartition: true }.into()];
    if from.method != to.method
        || from.sub_method != to.sub_method
        || from.expression != to.expression
        || from.sub_expression != to.sub_expression
        || from.algo_clause != to.algo_clause
    {
        return (repartition(), true);
    }

    let partitions_differ = from.partitions != to.partitions;
    if partitions_differ && from.has_value_list() {
        return (repartition(), true);
    }
    (Vec::new(), !partitions_differ)
}

struct ColumnsComparison<'a> {
    from: &'a Table,
    to: &'a Table,
    from_still_present: Vec<bool>,
    to_already_existed: Vec<bool>,
    from_order_common: Vec<&'a Column>,
    to_order_common: Vec<&'a Column>,
    common_moved: bool,
}

impl<'a> ColumnsComparison<'a> {
    fn new(from: &'a Table, to: &'a Table) -> Self {
        let from_still_present: Vec<bool> =
            from.columns.iter().map(|c| to.column(&c.name).is_some()).collect();
        let to_already_existed: Vec<bool> =
            to.columns.iter().map(|c| from.column(&c.name).is_some()).collect();
        let from_order_common: Vec<&Column> = from
            .columns
            .iter()
            .zip(&from_still_present)
            .filter_map(|(c, present)| present.then_some(c))
            .collect();
        let to_order_common: Vec<&Column> = to
            .columns
            .iter()
            .zip(&to_already_existed)
            .filter_map(|(c, existed)| existed.then_some(c))
            .collect();
        let common_moved = from_order_common
            .iter()
            .zip(&to_order_common)
            .any(|(f, t)| f.name != t.name);
        Self {
            from,
            to,
            from_still_present,
            to_already_existed,
            from_order_common,
            to_order_common,
            common_moved,
        }
    }

    fn drops(&self) -> impl Iterator<Item = TableAlterClause<'a>> + '_ {
        self.from
            .columns
            .iter()
            .zip(&self.from_still_present)
            .filter(|(_, present)| !**present)
            .map(|(column, _)| DropColumn { column }.into())
    }

    /// Columns that exist on both sides and changed or moved. When columns
    /// moved, only those outside the longest run already in order are
    /// repositioned.
    fn modifications(&self) -> Vec<TableAlterClause<'a>> {
        let mut clauses = Vec::new();
        if !self.common_moved {
            for (old, new) in self.from_order_common.iter().zip(&self.to_order_common) {
                if !old.equals(new) {
                    clauses.push(self.modify(old, new, ColumnPosition::Unchanged));
                }
            }
            return clauses;
        }

        let to_positions: HashMap<&str, usize> = self
            .to_order_common
            .iter()
            .enumerate()
            .map(|(pos, c)| (c.name.as_str(), pos))
            .collect();
        let sequence: Vec<usize> = self
            .from_order_common
            .iter()
            .filter_map(|c| to_positions.get(c.name.as_str()).copied())
            .collect();
        let mut stay_put = vec![false; self.to_order_common.len()];
        for pos in longest_increasing_subsequence(&sequence) {
            stay_put[pos] = true;
        }

        for (pos, new) in self.to_order_common.iter().enumerate() {
            let Some(old) = self.from.column(&new.name) else {
                continue;
            };
            let moved = !stay_put[pos];
            if !moved && old.equals(new) {
                continue;
            }
            let position = match (moved, pos) {
                (false, _) => ColumnPosition::Unchanged,
                (true, 0) => ColumnPosition::First,
                (true, n) => ColumnPosition::After(self.to_order_common[n - 1]),
            };
            clauses.push(self.modify(old, new, position));
        }
        clauses
    }

    /// New columns, positioned only if some pre-existing column follows.
    fn adds(&self) -> Vec<TableAlterClause<'a>> {
        let mut clauses = Vec::new();
        for (pos, column) in self.to.columns.iter().enumerate() {
            if self.to_already_existed[pos] {
                continue;
            }
            let existing_after = self.to_already_existed[pos + 1..].iter().any(|e| *e);
            let position = match pos {
                _ if !existing_after => ColumnPosition::Unchanged,
                0 => ColumnPosition::First,
                n => ColumnPosition::After(&self.to.columns[n - 1]),
            };
            clauses.push(AddColumn { column, position }.into());
        }
        clauses
    }

    fn modify(&self, old: &'a Column, new: &'a Column, position: ColumnPosition<'a>) -> TableAlterClause<'a> {
        ModifyColumn {
            old,
            new,
            position,
            in_unique_constraint: self.in_unique_constraint(old, new),
        }
        .into()
    }

    /// True if both versions of the column belong to a same-named unique
    /// index on both sides.
    fn in_unique_constraint(&self, old: &Column, new: &Column) -> bool {
        let from_uniques = self.from.unique_constraints_with_column(&old.name);
        if from_uniques.is_empty() {
            return false;
        }
        let to_uniques = self.to.unique_constraints_with_column(&new.name);
        from_uniques
            .iter()
            .any(|f| to_uniques.iter().any(|t| t.name == f.name))
    }
}

/// Secondary indexes are matched by name, with renames detected through
/// equivalence. Order is tracked so strict index order can rebuild every
/// index after the first one that moved.
fn compare_secondary_indexes<'a>(from: &'a Table, to: &'a Table) -> Vec<TableAlterClause<'a>> {
    let mut clauses = Vec::new();
    // Keyed by the index's name in "to", once a rename is detected
    let mut from_indexes: HashMap<&'a str, &'a Index> = from
        .secondary_indexes
        .iter()
        .map(|idx| (idx.name.as_str(), idx))
        .collect();
    let mut from_still_exist: Vec<&'a Index> = Vec::with_capacity(from.secondary_indexes.len());

    for from_index in &from.secondary_indexes {
        let mut still_exists = to.secondary_index(&from_index.name).is_some();
        if !still_exists {
            // Claiming the new name keeps one index from matching two renames
            let renamed = to.secondary_indexes.iter().find(|to_index| {
                !from_indexes.contains_key(to_index.name.as_str()) && to_index.equivalent(from_index)
            });
            if let Some(to_index) = renamed {
                from_indexes.remove(from_index.name.as_str());
                from_indexes.insert(to_index.name.as_str(), from_index);
                still_exists = true;
            }
        }
        if still_exists {
            from_still_exist.push(from_index);
        } else {
            clauses.push(DropIndex { index: from_index }.into());
        }
    }

    let mut reorder_due_to_clause: Vec<TableAlterClause<'a>> = Vec::new();
    let mut reorder_due_to_move = false;
    for (n, to_index) in to.secondary_indexes.iter().enumerate() {
        let Some(&from_index) = from_indexes.get(to_index.name.as_str()) else {
            clauses.push(AddIndex { index: to_index }.into());
            reorder_due_to_move = true;
            continue;
        };

        if !from_index.equals(to_index) || reorder_due_to_move || !reorder_due_to_clause.is_empty() {
            let clause: TableAlterClause<'a> = ModifyIndex {
                from: from_index,
                to: to_index,
                reorder_due_to_clause: Arc::from(reorder_due_to_clause.as_slice()),
                reorder_due_to_move,
            }
            .into();
            clauses.push(clause.clone());
            reorder_due_to_clause.push(clause);
        }

        // This one stays put; everything after it must move
        if !reorder_due_to_move && from_still_exist.get(n).is_some_and(|f| f.name != from_index.name) {
            reorder_due_to_move = true;
        }
    }
    clauses
}

fn fk_cosmetic_only(fk: &ForeignKey, others: &[ForeignKey]) -> bool {
    others.iter().any(|other| fk.equivalent(other))
}

/// Foreign keys are matched by name. A change that leaves behavior intact,
/// such as a rename, is flagged cosmetic.
fn compare_foreign_keys<'a>(from: &'a Table, to: &'a Table) -> Vec<TableAlterClause<'a>> {
    let mut clauses = Vec::new();
    for to_fk in &to.foreign_keys {
        if from.foreign_key(&to_fk.name).is_none() {
            clauses.push(
                AddForeignKey {
                    foreign_key: to_fk,
                    cosmetic_only: fk_cosmetic_only(to_fk, &from.foreign_keys),
                }
                .into(),
            );
        }
    }
    for from_fk in &from.foreign_keys {
        match to.foreign_key(&from_fk.name) {
            None => clauses.push(
                DropForeignKey {
                    foreign_key: from_fk,
                    cosmetic_only: fk_cosmetic_only(from_fk, &to.foreign_keys),
                }
                .into(),
            ),
            Some(to_fk) if !from_fk.equals(to_fk) => {
                let cosmetic_only = from_fk.equivalent(to_fk);
                clauses.push(
                    DropForeignKey {
                        foreign_key: from_fk,
                        cosmetic_only,
                    }
                    .into(),
                );
                clauses.push(
                    AddForeignKey {
                        foreign_key: to_fk,
                        cosmetic_only,
                    }
                    .into(),
                );
            }
            Some(_) => {}
        }
    }
    clauses
}

fn check_rename_only(check: &Check, others: &[Check]) -> bool {
    others
        .iter()
        .any(|other| check.clause == other.clause && check.enforced == other.enforced)
}

/// Checks are matched by name. Order is compared too, since MariaDB lists
/// checks in creation order.
fn compare_checks<'a>(from: &'a Table, to: &'a Table) -> Vec<TableAlterClause<'a>> {
    let mut clauses = Vec::new();
    let mut from_still_exist: Vec<&Check> = Vec::with_capacity(from.checks.len());
    for from_check in &from.checks {
        if to.check(&from_check.name).is_some() {
            from_still_exist.push(from_check);
        } else {
            clauses.push(
                DropCheck {
                    check: from_check,
                    reorder_only: false,
                    rename_only: check_rename_only(from_check, &to.checks),
                }
                .into(),
            );
        }
    }

    let mut reorder = false;
    for (n, to_check) in to.checks.iter().enumerate() {
        let Some(from_check) = from.check(&to_check.name) else {
            clauses.push(
                AddCheck {
                    check: to_check,
                    reorder_only: false,
                    rename_only: check_rename_only(to_check, &from.checks),
                }
                .into(),
            );
            reorder = true;
            continue;
        };
        if from_check.clause != to_check.clause {
            clauses.push(DropCheck { check: from_check, reorder_only: false, rename_only: false }.into());
            clauses.push(AddCheck { check: to_check, reorder_only: false, rename_only: false }.into());
            reorder = true;
        } else if from_check.enforced != to_check.enforced {
            clauses.push(
                AlterCheck {
                    check: from_check,
                    new_enforcement: to_check.enforced,
                }
                .into(),
            );
        } else if reorder {
            clauses.push(DropCheck { check: from_check, reorder_only: true, rename_only: false }.into());
            clauses.push(AddCheck { check: to_check, reorder_only: true, rename_only: false }.into());
        } else if from_still_exist.get(n).is_some_and(|c| c.name != to_check.name) {
            // Everything before this position is identical, so this check
            // stays put and the ones after it move
            reorder = true;
        }
    }
    clauses
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavor::{Flavor, Vendor};
    use crate::schema::Partition;

    const MYSQL8: Flavor = Flavor::new(Vendor::MySql, 8, 0, 34);
    const MARIADB: Flavor = Flavor::new(Vendor::MariaDb, 10, 6, 0);

    fn default_mods(flavor: Flavor) -> StatementModifiers {
        StatementModifiers::new(flavor)
    }

    fn col(name: &str) -> Column {
        Column::new(name, "int")
    }

    fn table(columns: &[&str]) -> Table {
        columns
            .iter()
            .fold(Table::new("t"), |t, name| t.with_column(col(name)))
    }

    fn finish(t: Table) -> Table {
        t.with_generated_create(MYSQL8)
    }

    fn alter(from: &Table, to: &Table, mods: &StatementModifiers) -> Result<String, DiffError> {
        TableDiff::new_alter(from, to)
            .map_or(Ok(String::new()), |td| td.statement(mods))
    }

    #[test]
    fn identical_tables_have_no_diff() {
        let from = finish(table(&["id", "name"]).with_primary_key(&["id"]));
        let to = from.clone();
        assert_eq!(diff_tables(&from, &to), (Vec::new(), true));
        assert!(TableDiff::new_alter(&from, &to).is_none());

        // Same fields, CREATE text not populated
        let bare = table(&["id"]);
        assert_eq!(bare.diff(&bare.clone()), (Vec::new(), true));
    }

    #[test]
    fn add_column_at_end() {
        let from = finish(table(&["id"]));
        let to = finish(table(&["id"]).with_column(Column::new("name", "varchar(10)").not_null()));
        let td = TableDiff::new_alter(&from, &to).unwrap();
        assert!(td.is_supported());
        assert_eq!(td.clauses().len(), 1);
        assert!(td.clauses()[0].unsafe_reason(&StatementModifiers::default()).is_none());
        assert_eq!(
            td.statement(&default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ADD COLUMN `name` varchar(10) NOT NULL"
        );
        assert_eq!(
            td.clauses_text(&default_mods(MYSQL8)).unwrap(),
            "ADD COLUMN `name` varchar(10) NOT NULL"
        );
    }

    #[test]
    fn add_columns_with_position() {
        let from = finish(table(&["b", "d"]));
        let to = finish(table(&["a", "b", "c", "d", "e"]));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ADD COLUMN `a` int FIRST, ADD COLUMN `c` int AFTER `b`, ADD COLUMN `e` int"
        );
    }

    #[test]
    fn drop_column_is_unsafe() {
        let from = finish(table(&["a", "b"]));
        let to = finish(table(&["a"]));
        let err = alter(&from, &to, &default_mods(MYSQL8)).unwrap_err();
        assert!(err.is_unsafe());
        assert_eq!(
            err.to_string(),
            "Desired alteration for table `t` is not safe: column `b` would be dropped."
        );
        assert_eq!(err.statement(), Some("ALTER TABLE `t` DROP COLUMN `b`"));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8).allow_unsafe()).unwrap(),
            "ALTER TABLE `t` DROP COLUMN `b`"
        );
    }

    #[test]
    fn narrowing_column_returns_statement_and_error() {
        let from = finish(Table::new("t").with_column(Column::new("v", "varchar(10)")));
        let to = finish(Table::new("t").with_column(Column::new("v", "varchar(5)")));
        let err = alter(&from, &to, &default_mods(MYSQL8)).unwrap_err();
        assert_eq!(err.statement(), Some("ALTER TABLE `t` MODIFY COLUMN `v` varchar(5)"));
        assert!(err.to_string().contains("modification to column v may require lossy data conversion"));
    }

    #[test]
    fn reordered_columns_move_minimally() {
        let from = finish(table(&["a", "b", "c", "d"]));
        let to = finish(table(&["b", "c", "d", "a"]));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` MODIFY COLUMN `a` int AFTER `d`"
        );

        let to = finish(table(&["d", "a", "b", "c"]));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` MODIFY COLUMN `d` int FIRST"
        );

        let mut lax = default_mods(MYSQL8);
        lax.lax_column_order = true;
        assert_eq!(alter(&from, &to, &lax).unwrap(), "");
    }

    #[test]
    fn primary_key_is_replaced() {
        let from = finish(table(&["a", "b"]).with_primary_key(&["a"]));
        let to = finish(table(&["a", "b"]).with_primary_key(&["a", "b"]));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` DROP PRIMARY KEY, ADD PRIMARY KEY (`a`,`b`)"
        );
    }

    #[test]
    fn index_rename_and_visibility_split() {
        let base = table(&["id", "a"]).with_primary_key(&["id"]);
        let from = finish(base.clone().with_index(Index::new("idx_a", &["a"])));
        let mut renamed = Index::new("idx_b", &["a"]);
        renamed.invisible = true;
        let to = finish(base.with_index(renamed));

        let td = TableDiff::new_alter(&from, &to).unwrap();
        assert_eq!(td.clauses().len(), 1);
        let parts = td.split_conflicts();
        assert_eq!(parts.len(), 2);
        let mods = default_mods(MYSQL8);
        assert_eq!(parts[0].statement(&mods).unwrap(), "ALTER TABLE `t` RENAME KEY `idx_a` TO `idx_b`");
        assert_eq!(parts[1].statement(&mods).unwrap(), "ALTER TABLE `t` ALTER INDEX `idx_b` INVISIBLE");
    }

    #[test]
    fn multiple_fulltext_indexes_split() {
        let mut ft1 = Index::new("ft1", &["a"]);
        ft1.index_type = "FULLTEXT".into();
        let mut ft2 = Index::new("ft2", &["b"]);
        ft2.index_type = "FULLTEXT".into();
        let base = Table::new("t")
            .with_column(Column::new("a", "text"))
            .with_column(Column::new("b", "text"));
        let from = finish(base.clone());
        let to = finish(base.with_index(ft1).with_index(ft2));
        let parts = TableDiff::new_alter(&from, &to).unwrap().split_conflicts();
        let mods = default_mods(MYSQL8);
        let stmts: Vec<String> = parts.iter().map(|td| td.statement(&mods).unwrap()).collect();
        assert_eq!(
            stmts,
            [
                "ALTER TABLE `t` ADD FULLTEXT KEY `ft1` (`a`)",
                "ALTER TABLE `t` ADD FULLTEXT KEY `ft2` (`b`)"
            ]
        );
    }

    #[test]
    fn strict_index_order_forced_without_primary_key() {
        let base = Table::new("t")
            .with_column(col("a").not_null())
            .with_column(col("b"))
            .with_column(col("c"));
        let from = finish(
            base.clone()
                .with_index(Index::new("uk", &["a"]).unique())
                .with_index(Index::new("idx_b", &["b"])),
        );
        let to = finish(
            base.clone()
                .with_index(Index::new("uk", &["a"]).unique())
                .with_index(Index::new("idx_c", &["c"]))
                .with_index(Index::new("idx_b", &["b"])),
        );
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ADD KEY `idx_c` (`c`), DROP KEY `idx_b`, ADD KEY `idx_b` (`b`)"
        );

        // With a primary key, index order is cosmetic
        let mut from = from;
        let mut to = to;
        from.primary_key = Some(Index::primary(&["a"]));
        to.primary_key = Some(Index::primary(&["a"]));
        let (from, to) = (finish(from), finish(to));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ADD KEY `idx_c` (`c`)"
        );
    }

    fn fk(name: &str) -> ForeignKey {
        ForeignKey {
            name: name.into(),
            column_names: vec!["pid".into()],
            referenced_table_name: "parent".into(),
            referenced_column_names: vec!["id".into()],
            ..ForeignKey::default()
        }
    }

    #[test]
    fn foreign_key_rename_is_cosmetic_and_split() {
        let from = finish(table(&["pid"]).with_foreign_key(fk("fk_old")));
        let to = finish(table(&["pid"]).with_foreign_key(fk("fk_new")));
        let td = TableDiff::new_alter(&from, &to).unwrap();
        assert_eq!(td.statement(&default_mods(MYSQL8)).unwrap(), "");

        let (others, add_fks) = td.split_add_foreign_keys();
        let (others, add_fks) = (others.unwrap(), add_fks.unwrap());
        let mut strict = default_mods(MYSQL8);
        strict.strict_foreign_key_naming = true;
        assert_eq!(others.statement(&strict).unwrap(), "ALTER TABLE `t` DROP FOREIGN KEY `fk_old`");
        assert_eq!(
            add_fks.statement(&strict).unwrap(),
            "ALTER TABLE `t` ADD CONSTRAINT `fk_new` FOREIGN KEY (`pid`) REFERENCES `parent` (`id`)"
        );
    }

    #[test]
    fn foreign_key_only_alter_is_not_split() {
        let from = finish(table(&["pid"]));
        let to = finish(table(&["pid"]).with_foreign_key(fk("fk1")));
        let (others, add_fks) = TableDiff::new_alter(&from, &to).unwrap().split_add_foreign_keys();
        assert!(others.is_none());
        assert_eq!(add_fks.map(|td| td.clauses().len()), Some(1));
    }

    #[test]
    fn check_reorder_only_matters_on_mariadb() {
        let c1 = Check::new("c1", "`a` > 0");
        let c2 = Check::new("c2", "`b` > 0");
        let from = finish(table(&["a", "b"]).with_check(c1.clone()).with_check(c2.clone()));
        let to = finish(table(&["a", "b"]).with_check(c2).with_check(c1));

        let mut strict = default_mods(MYSQL8);
        strict.strict_check_constraints = true;
        assert_eq!(alter(&from, &to, &strict).unwrap(), "");

        let mut strict = default_mods(MARIADB);
        strict.strict_check_constraints = true;
        assert_eq!(
            alter(&from, &to, &strict).unwrap(),
            "ALTER TABLE `t` DROP CONSTRAINT `c1`, ADD CONSTRAINT `c1` CHECK (`a` > 0)"
        );
    }

    #[test]
    fn check_enforcement_change() {
        let mut relaxed = Check::new("c1", "`a` > 0");
        relaxed.enforced = false;
        let from = finish(table(&["a"]).with_check(Check::new("c1", "`a` > 0")));
        let to = finish(table(&["a"]).with_check(relaxed));
        assert_eq!(
            alter(&from, &to, &default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ALTER CHECK `c1` NOT ENFORCED"
        );
    }

    #[test]
    fn table_options_and_lock_algorithm() {
        let from = finish(table(&["id"]).with_column(col("x")));
        let mut to = table(&["id"]).with_column(col("x"));
        to.charset = "utf8mb4".into();
        to.collation = "utf8mb4_general_ci".into();
        to.comment = "hello".into();
        let to = finish(to);

        let mut mods = default_mods(MYSQL8);
        mods.lock_clause = "none".into();
        mods.algorithm_clause = "inplace".into();
        assert_eq!(
            alter(&from, &to, &mods).unwrap(),
            "ALTER TABLE `t` ALGORITHM=INPLACE, LOCK=NONE, \
             DEFAULT CHARACTER SET = utf8mb4 COLLATE = utf8mb4_general_ci, COMMENT 'hello'"
        );
    }

    #[test]
    fn lax_comments_skip_comment_only_change() {
        let from = finish(table(&["id"]));
        let mut to = table(&["id"]);
        to.comment = "hello".into();
        let to = finish(to);
        let mut mods = default_mods(MYSQL8);
        assert_eq!(alter(&from, &to, &mods).unwrap(), "ALTER TABLE `t` COMMENT 'hello'");
        mods.lax_comments = true;
        assert_eq!(alter(&from, &to, &mods).unwrap(), "");
    }

    #[test]
    fn engine_change_is_unsafe() {
        let from = finish(table(&["id"]));
        let mut to = table(&["id"]);
        to.engine = "MyISAM".into();
        let to = finish(to);
        let err = alter(&from, &to, &default_mods(MYSQL8)).unwrap_err();
        assert_eq!(err.statement(), Some("ALTER TABLE `t` ENGINE=MyISAM"));
    }

    #[test]
    fn auto_increment_change_needs_auto_increment_column() {
        let build = |next| {
            let mut t = Table::new("t").with_column(col("id").not_null().auto_increment());
            t.next_auto_increment = next;
            finish(t)
        };
        let (from, to) = (build(1), build(10));
        let mut mods = default_mods(MYSQL8);
        assert_eq!(alter(&from, &to, &mods).unwrap(), "");
        mods.next_auto_inc = NextAutoInc::Always;
        assert_eq!(alter(&from, &to, &mods).unwrap(), "ALTER TABLE `t` AUTO_INCREMENT = 10");

        let mut plain_from = table(&["id"]);
        plain_from.next_auto_increment = 1;
        let mut plain_to = plain_from.clone();
        plain_to.next_auto_increment = 10;
        assert!(diff_tables(&plain_from, &plain_to).0.is_empty());
    }

    #[test]
    fn virtual_column_validation() {
        let from = finish(table(&["a"]));
        let to = finish(table(&["a"]).with_column(col("v").generated("`a` + 1", true)));
        let mut mods = default_mods(MYSQL8);
        mods.virtual_col_validation = true;
        assert_eq!(
            alter(&from, &to, &mods).unwrap(),
            "ALTER TABLE `t` ADD COLUMN `v` int GENERATED ALWAYS AS (`a` + 1) VIRTUAL, WITH VALIDATION"
        );
    }

    fn hash_partitioned(count: usize) -> TablePartitioning {
        TablePartitioning {
            method: "HASH".into(),
            expression: "`id`".into(),
            partitions: (0..count)
                .map(|n| Partition {
                    name: format!("p{n}"),
                    engine: "InnoDB".into(),
                    ..Partition::default()
                })
                .collect(),
            ..TablePartitioning::default()
        }
    }

    fn range_partitioned() -> TablePartitioning {
        let partition = |name: &str, values: &str| Partition {
            name: name.into(),
            values: values.into(),
            engine: "InnoDB".into(),
            ..Partition::default()
        };
        TablePartitioning {
            method: "RANGE".into(),
            expression: "`id`".into(),
            partitions: vec![
                partition("p0", "100"),
                partition("p1", "200"),
                partition("pmax", "MAXVALUE"),
            ],
            ..TablePartitioning::default()
        }
    }

    #[test]
    fn partitioning_changes() {
        let from = finish(table(&["id"]));
        let mut to = table(&["id"]);
        to.partitioning = Some(hash_partitioned(2));
        let to = finish(to);

        let mut mods = default_mods(MYSQL8);
        assert_eq!(
            alter(&from, &to, &mods).unwrap(),
            "ALTER TABLE `t` /*!50100 PARTITION BY HASH (`id`)\nPARTITIONS 2 */"
        );
        mods.partitioning = PartitioningMode::Remove;
        assert_eq!(alter(&from, &to, &mods).unwrap(), "");
        assert_eq!(alter(&to, &from, &mods).unwrap(), "ALTER TABLE `t` REMOVE PARTITIONING");
        mods.partitioning = PartitioningMode::Keep;
        assert_eq!(alter(&to, &from, &mods).unwrap(), "");
    }

    #[test]
    fn partitioning_diff_rules() {
        let hash2 = hash_partitioned(2);
        let hash4 = hash_partitioned(4);
        assert_eq!(diff_partitioning(None, None), (Vec::new(), true));
        assert_eq!(diff_partitioning(Some(&hash2), Some(&hash2)), (Vec::new(), true));
        assert_eq!(diff_partitioning(Some(&hash2), Some(&hash4)), (Vec::new(), false));

        let range = range_partitioned();
        let mut fewer = range.clone();
        fewer.partitions.remove(1);
        let (clauses, supported) = diff_partitioning(Some(&range), Some(&fewer));
        assert!(supported);
        assert_eq!(
            clauses,
            vec![TableAlterClause::from(PartitionBy { partitioning: &fewer, repartition: true })]
        );

        let mut linear = hash2.clone();
        linear.method = "LINEAR HASH".into();
        let (clauses, _) = diff_partitioning(Some(&hash2), Some(&linear));
        assert!(matches!(clauses[..], [TableAlterClause::PartitionBy(PartitionBy { repartition: true, .. })]));
    }

    #[test]
    fn hash_partition_count_change_is_unsupported() {
        let mut from = table(&["id"]);
        from.partitioning = Some(hash_partitioned(2));
        let mut to = from.clone();
        to.partitioning = Some(hash_partitioned(4));
        let (from, to) = (finish(from), finish(to));

        let mut td = TableDiff::new_alter(&from, &to).unwrap();
        assert!(!td.is_supported());
        let err = td.statement(&default_mods(MYSQL8)).unwrap_err();
        assert!(matches!(err, DiffError::Unsupported { side: UnsupportedSide::Neither, .. }));
        assert_eq!(td.mark_supported(), Err(DiffError::NoClauses));
    }

    #[test]
    fn unsupported_desired_table() {
        let from = finish(table(&["id"]));
        let mut to = finish(table(&["id", "geo"]));
        to.unsupported_ddl = true;
        let (clauses, supported) = diff_tables(&from, &to);
        assert!(clauses.is_empty());
        assert!(!supported);

        let err = alter(&from, &to, &default_mods(MYSQL8)).unwrap_err();
        assert!(err.is_unsupported());
        assert_eq!(
            err.to_string(),
            "unsupported diff for table `t`: the desired state (\"to\" side of diff) contains unsupported features"
        );
        assert_eq!(err.statement(), Some(""));
    }

    #[test]
    fn unsupported_original_table_keeps_clauses() {
        let mut from = finish(table(&["id"]));
        from.unsupported_ddl = true;
        let to = finish(table(&["id", "x"]));
        let mut td = TableDiff::new_alter(&from, &to).unwrap();
        let err = td.statement(&default_mods(MYSQL8)).unwrap_err();
        assert_eq!(err.statement(), Some("ALTER TABLE `t` ADD COLUMN `x` int"));

        td.mark_supported().unwrap();
        assert_eq!(td.mark_supported(), Err(DiffError::AlreadySupported));
        assert_eq!(
            td.statement(&default_mods(MYSQL8)).unwrap(),
            "ALTER TABLE `t` ADD COLUMN `x` int"
        );
    }

    #[test]
    fn create_statement_modifiers() {
        let mut t = Table::new("t").with_column(col("id").not_null().auto_increment());
        t.next_auto_increment = 5;
        t.partitioning = Some(hash_partitioned(2));
        let t = finish(t);
        let td = TableDiff::new_create(&t);

        let mut mods = default_mods(MYSQL8);
        let stmt = td.statement(&mods).unwrap();
        assert!(!stmt.contains("AUTO_INCREMENT=5"));
        assert!(stmt.contains("PARTITION BY HASH"));

        mods.next_auto_inc = NextAutoInc::Always;
        mods.partitioning = PartitioningMode::Remove;
        let stmt = td.statement(&mods).unwrap();
        assert!(stmt.contains("AUTO_INCREMENT=5"));
        assert!(!stmt.contains("PARTITION"));
        assert!(td.clauses_text(&mods).unwrap().starts_with("(\n  `id` int NOT NULL AUTO_INCREMENT"));
    }

    #[test]
    fn create_from_hand_built_table() {
        let t = table(&["id"]);
        assert_eq!(
            TableDiff::new_create(&t).statement(&default_mods(MYSQL8)).unwrap(),
            "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB DEFAULT CHARSET=latin1"
        );
    }

    #[test]
    fn drop_table_is_unsafe() {
        let t = finish(table(&["id"]));
        let td = TableDiff::new_drop(&t);
        let err = td.statement(&default_mods(MYSQL8)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Desired drop of table `t` would cause all of its data to be lost."
        );
        assert_eq!(err.statement(), Some("DROP TABLE `t`"));
        assert_eq!(td.statement(&default_mods(MYSQL8).allow_unsafe()).unwrap(), "DROP TABLE `t`");
        assert_eq!(td.clauses_text(&default_mods(MYSQL8).allow_unsafe()).unwrap(), "");
        assert_eq!(td.object_key().to_string(), "table `t`");
    }

    #[test]
    fn pre_drop_alters_drop_all_but_last_partition() {
        let mut t = table(&["id"]);
        t.partitioning = Some(range_partitioned());
        let t = finish(t);

        let alters = TableDiff::pre_drop_alters(&t);
        assert_eq!(alters.len(), 2);
        assert!(alters.iter().all(|td| td.to_table().is_some_and(|to| to.partitioning.is_none())));

        let mut mods = default_mods(MYSQL8).allow_unsafe();
        mods.lock_clause = "none".into();
        assert_eq!(alters[0].statement(&mods).unwrap(), "ALTER TABLE `t` DROP PARTITION p0");
        assert_eq!(alters[1].statement(&mods).unwrap(), "ALTER TABLE `t` DROP PARTITION p1");

        let err = alters[0].statement(&default_mods(MYSQL8)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Desired alteration for table `t` is not safe: a partition would be dropped."
        );

        mods.skip_pre_drop_alters = true;
        assert_eq!(alters[0].statement(&mods).unwrap(), "");
        let mut unsafe_skip = default_mods(MYSQL8);
        unsafe_skip.skip_pre_drop_alters = true;
        assert_eq!(alters[0].statement(&unsafe_skip).unwrap(), "");

        let mut hashed = table(&["id"]);
        hashed.partitioning = Some(hash_partitioned(4));
        assert!(TableDiff::pre_drop_alters(&hashed).is_empty());
        assert!(TableDiff::pre_drop_alters(&table(&["id"])).is_empty());
    }

    #[test]
    fn empty_alter_is_never_unsafe() {
        let mut t = table(&["id"]);
        t.partitioning = Some(range_partitioned());
        let t = finish(t);
        let alters = TableDiff::pre_drop_alters(&t);
        assert!(alters[0].clauses[0].unsafe_reason(&default_mods(MYSQL8)).is_some());

        let mut mods = default_mods(MYSQL8);
        mods.skip_pre_drop_alters = true;
        assert!(!mods.allow_unsafe);
        assert_eq!(alters[0].statement(&mods).unwrap(), "");
        assert_eq!(alters[0].clauses_text(&mods).unwrap(), "");
    }
}
