//! ALTER TABLE clauses.
//!
//! Each detected table difference is one [`TableAlterClause`]. Rendering a
//! clause can yield an empty string, meaning the difference is suppressed by
//! the [`StatementModifiers`] or the target flavor. Clauses that may destroy
//! data report a reason through [`TableAlterClause::unsafe_reason`].

use std::borrow::Cow;
use std::sync::{Arc, LazyLock};

use regex::Regex;

use super::{NextAutoInc, PartitioningMode, StatementModifiers};
use crate::flavor::Flavor;
use crate::schema::{
    escape_identifier, escape_value_for_create_table, Check, Column, ForeignKey, Index, Partition,
    TablePartitioning,
};

static RE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^decimal\((\d+),(\d+)\)").expect("invalid regex"));
static RE_BIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^bit\((\d+)\)").expect("invalid regex"));
static RE_FRACTIONAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^(]+\((\d+)\)").expect("invalid regex"));
static RE_FLOAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:float|double)\((\d+),(\d+)\)").expect("invalid regex"));
static RE_CHAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:varchar|char)\((\d+)\)").expect("invalid regex"));
static RE_VARBINARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^varbinary\((\d+)\)").expect("invalid regex"));

const INT_RANKS: [&str; 5] = ["tinyint", "smallint", "mediumint", "int", "bigint"];

const TEXT_SIZES: [(&str, u64); 4] = [
    ("tinytext", 255),
    ("text", 65_535),
    ("mediumtext", 16_777_215),
    ("longtext", 4_294_967_295),
];

const BLOB_SIZES: [(&str, u64); 4] = [
    ("tinyblob", 255),
    ("blob", 65_535),
    ("mediumblob", 16_777_215),
    ("longblob", 4_294_967_295),
];

/// Values that make a create option disappear from `SHOW CREATE TABLE`.
const CREATE_OPTION_DEFAULTS: [(&str, &str); 12] = [
    ("MIN_ROWS", "0"),
    ("MAX_ROWS", "0"),
    ("AVG_ROW_LENGTH", "0"),
    ("PACK_KEYS", "DEFAULT"),
    ("STATS_PERSISTENT", "DEFAULT"),
    ("STATS_AUTO_RECALC", "DEFAULT"),
    ("STATS_SAMPLE_PAGES", "DEFAULT"),
    ("CHECKSUM", "0"),
    ("DELAY_KEY_WRITE", "0"),
    ("ROW_FORMAT", "DEFAULT"),
    ("KEY_BLOCK_SIZE", "0"),
    ("COMPRESSION", "''"),
];

// ================================================================
// Clause enum
// ================================================================

/// A single difference between two versions of a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableAlterClause<'a> {
    AddColumn(AddColumn<'a>),
    DropColumn(DropColumn<'a>),
    ModifyColumn(ModifyColumn<'a>),
    RenameColumn(RenameColumn<'a>),
    AddIndex(AddIndex<'a>),
    DropIndex(DropIndex<'a>),
    ModifyIndex(ModifyIndex<'a>),
    AlterIndex(AlterIndex<'a>),
    AddForeignKey(AddForeignKey<'a>),
    DropForeignKey(DropForeignKey<'a>),
    AddCheck(AddCheck<'a>),
    DropCheck(DropCheck<'a>),
    AlterCheck(AlterCheck<'a>),
    ChangeAutoIncrement(ChangeAutoIncrement),
    ChangeCharSet(ChangeCharSet<'a>),
    ChangeCreateOptions(ChangeCreateOptions<'a>),
    ChangeComment(ChangeComment<'a>),
    ChangeTablespace(ChangeTablespace<'a>),
    ChangeStorageEngine(ChangeStorageEngine<'a>),
    PartitionBy(PartitionBy<'a>),
    RemovePartitioning,
    ModifyPartitions(ModifyPartitions<'a>),
}

impl TableAlterClause<'_> {
    /// Renders the clause, or an empty string if `mods` suppress it.
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        match self {
            Self::AddColumn(c) => c.clause(mods),
            Self::DropColumn(c) => c.clause(),
            Self::ModifyColumn(c) => c.clause(mods),
            Self::RenameColumn(c) => c.clause(),
            Self::AddIndex(c) => c.clause(mods),
            Self::DropIndex(c) => c.clause(),
            Self::ModifyIndex(c) => c.clause(mods),
            Self::AlterIndex(c) => c.clause(mods),
            Self::AddForeignKey(c) => c.clause(mods),
            Self::DropForeignKey(c) => c.clause(mods),
            Self::AddCheck(c) => c.clause(mods),
            Self::DropCheck(c) => c.clause(mods),
            Self::AlterCheck(c) => c.clause(),
            Self::ChangeAutoIncrement(c) => c.clause(mods),
            Self::ChangeCharSet(c) => c.clause(),
            Self::ChangeCreateOptions(c) => c.clause(),
            Self::ChangeComment(c) => c.clause(),
            Self::ChangeTablespace(c) => c.clause(),
            Self::ChangeStorageEngine(c) => c.clause(),
            Self::PartitionBy(c) => c.clause(mods),
            Self::RemovePartitioning => {
                if mods.partitioning == PartitioningMode::Keep {
                    String::new()
                } else {
                    "REMOVE PARTITIONING".to_string()
                }
            }
            Self::ModifyPartitions(c) => c.clause(mods),
        }
    }

    /// Returns why this clause may destroy data, or `None` if it is safe.
    #[must_use]
    pub fn unsafe_reason(&self, mods: &StatementModifiers) -> Option<String> {
        match self {
            Self::DropColumn(c) => c.unsafe_reason(),
            Self::ModifyColumn(c) => c.unsafe_reason(mods.flavor),
            Self::RenameColumn(c) => Some(c.unsafe_reason()),
            Self::ChangeStorageEngine(_) => {
                Some("storage engine changes have significant operational implications".to_string())
            }
            Self::ModifyPartitions(c) => c.unsafe_reason(),
            _ => None,
        }
    }

    /// True for PARTITION BY and REMOVE PARTITIONING, which must come last in
    /// an ALTER TABLE without a preceding comma.
    #[must_use]
    pub const fn is_partitioning_change(&self) -> bool {
        matches!(self, Self::PartitionBy(_) | Self::RemovePartitioning)
    }
}

macro_rules! impl_from_clause {
    ($($variant:ident),* $(,)?) => {
        $(
            impl<'a> From<$variant<'a>> for TableAlterClause<'a> {
                fn from(clause: $variant<'a>) -> Self {
                    Self::$variant(clause)
                }
            }
        )*
    };
}

impl_from_clause!(
    AddColumn,
    DropColumn,
    ModifyColumn,
    RenameColumn,
    AddIndex,
    DropIndex,
    ModifyIndex,
    AlterIndex,
    AddForeignKey,
    DropForeignKey,
    AddCheck,
    DropCheck,
    AlterCheck,
    ChangeCharSet,
    ChangeCreateOptions,
    ChangeComment,
    ChangeTablespace,
    ChangeStorageEngine,
    PartitionBy,
    ModifyPartitions,
);

impl From<ChangeAutoIncrement> for TableAlterClause<'_> {
    fn from(clause: ChangeAutoIncrement) -> Self {
        Self::ChangeAutoIncrement(clause)
    }
}

// ================================================================
// Columns
// ================================================================

/// Where an added or modified column is placed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnPosition<'a> {
    /// Appended (for adds) or left in place (for modifications).
    #[default]
    Unchanged,
    First,
    After(&'a Column),
}

impl ColumnPosition<'_> {
    fn clause(self) -> String {
        match self {
            Self::Unchanged => String::new(),
            Self::First => " FIRST".to_string(),
            Self::After(col) => format!(" AFTER {}", escape_identifier(&col.name)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddColumn<'a> {
    pub column: &'a Column,
    pub position: ColumnPosition<'a>,
}

impl AddColumn<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        format!(
            "ADD COLUMN {}{}",
            self.column.definition(mods.flavor),
            self.position.clause()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropColumn<'a> {
    pub column: &'a Column,
}

impl DropColumn<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        format!("DROP COLUMN {}", escape_identifier(&self.column.name))
    }

    /// Dropping a virtual column loses nothing; any other drop does.
    #[must_use]
    pub fn unsafe_reason(&self) -> Option<String> {
        (!self.column.is_virtual)
            .then(|| format!("column {} would be dropped", escape_identifier(&self.column.name)))
    }
}

/// Renames a column. Never detected by the table diff, but may be built by
/// callers that know about a rename.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenameColumn<'a> {
    pub column: &'a Column,
    pub new_name: &'a str,
}

impl RenameColumn<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        format!(
            "RENAME COLUMN {} TO {}",
            escape_identifier(&self.column.name),
            escape_identifier(self.new_name)
        )
    }

    /// Always unsafe: application code cannot switch names atomically.
    #[must_use]
    pub fn unsafe_reason(&self) -> String {
        format!(
            "column {} would be renamed, and there is no way to deploy application code for this change at the same moment as the schema change",
            escape_identifier(&self.column.name)
        )
    }
}

/// A column present in both tables with a different definition or position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyColumn<'a> {
    pub old: &'a Column,
    pub new: &'a Column,
    pub position: ColumnPosition<'a>,
    /// The column belongs to a unique index present in both tables.
    pub in_unique_constraint: bool,
}

impl ModifyColumn<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        let position = self.position.clause();

        // With lax comments the new comment is still applied, but a comment
        // change alone emits nothing
        let mut old = Cow::Borrowed(self.old);
        if mods.lax_comments && self.old.comment != self.new.comment {
            let copy = Column {
                comment: self.new.comment.clone(),
                ..self.old.clone()
            };
            if position.is_empty() && copy.equals(self.new) {
                return String::new();
            }
            old = Cow::Owned(copy);
        }

        if !position.is_empty() && mods.lax_column_order && old.equals(self.new) {
            return String::new();
        }
        if !mods.strict_column_definition
            && (position.is_empty() || mods.lax_column_order)
            && old.equivalent(self.new)
        {
            return String::new();
        }

        format!("MODIFY COLUMN {}{position}", self.new.definition(mods.flavor))
    }

    /// Classifies the change. Virtual columns are always safe; charset, SRID
    /// and (inside a unique index) collation changes never are; type changes
    /// are safe only when the new type can hold every old value.
    #[must_use]
    pub fn unsafe_reason(&self, flavor: Flavor) -> Option<String> {
        let lossy = || {
            Some(format!(
                "modification to column {} may require lossy data conversion",
                self.old.name
            ))
        };

        if self.old.is_virtual {
            return None;
        }
        if self.old.charset != self.new.charset {
            return lossy();
        }
        if self.old.collation != self.new.collation && self.in_unique_constraint {
            return Some(format!(
                "collation change for column {} affects equality comparisons in unique index",
                self.old.name
            ));
        }
        if self.old.srid != self.new.srid || self.old.has_srid != self.new.has_srid {
            return lossy();
        }
        if self.old.type_in_db.eq_ignore_ascii_case(&self.new.type_in_db) {
            return None;
        }

        let old_type = self.old.type_in_db.to_lowercase();
        let new_type = self.new.type_in_db.to_lowercase();
        if is_safe_type_change(&old_type, &new_type, flavor) {
            None
        } else {
            lossy()
        }
    }
}

fn capture_numbers(re: &Regex, s: &str) -> Option<Vec<u64>> {
    let caps = re.captures(s)?;
    caps.iter()
        .skip(1)
        .map(|m| m.and_then(|m| m.as_str().parse().ok()))
        .collect()
}

/// Compares the numeric captures of `re` on both types: safe when each new
/// value is at least the old one, unsafe when either type fails to match.
fn no_smaller(re: &Regex, old_type: &str, new_type: &str) -> bool {
    match (capture_numbers(re, old_type), capture_numbers(re, new_type)) {
        (Some(old), Some(new)) => old.iter().zip(&new).all(|(o, n)| n >= o),
        _ => false,
    }
}

fn int_rank(col_type: &str) -> Option<usize> {
    INT_RANKS
        .iter()
        .rposition(|prefix| col_type.starts_with(prefix))
}

fn sized_type(col_type: &str, named: &[(&str, u64)], re: &Regex) -> Option<u64> {
    if let Some((_, size)) = named.iter().find(|(name, _)| *name == col_type) {
        return Some(*size);
    }
    capture_numbers(re, col_type).and_then(|sizes| sizes.first().copied())
}

/// True if converting a column from `old_type` to `new_type` (both
/// lowercased, and different) can't lose or reinterpret data.
fn is_safe_type_change(old_type: &str, new_type: &str, flavor: Flavor) -> bool {
    // Negative values no longer fit
    if !old_type.contains("unsigned") && new_type.contains("unsigned") {
        return false;
    }

    let both_prefix = |prefixes: &[&str]| {
        prefixes
            .iter()
            .any(|p| old_type.starts_with(p) && new_type.starts_with(p))
    };

    // Only appending values to an enum or set keeps existing numbering
    if both_prefix(&["enum", "set"]) {
        let open = old_type.char_indices().last().map_or(old_type, |(n, _)| &old_type[..n]);
        return new_type.starts_with(open);
    }
    if both_prefix(&["decimal"]) {
        return no_smaller(&RE_DECIMAL, old_type, new_type);
    }
    if both_prefix(&["bit"]) {
        return no_smaller(&RE_BIT, old_type, new_type);
    }
    if both_prefix(&["time", "timestamp", "datetime"]) {
        if old_type.starts_with("timestamp") != new_type.starts_with("timestamp") {
            return false;
        }
        if !old_type.contains('(') {
            return true;
        }
        if !new_type.contains('(') {
            return false;
        }
        return no_smaller(&RE_FRACTIONAL, old_type, new_type);
    }
    // No parens means the hardware maximum. Double to float always narrows.
    if both_prefix(&["float", "double"]) || (old_type.starts_with("float") && new_type.starts_with("double")) {
        if !new_type.contains('(') {
            return true;
        }
        if !old_type.contains('(') {
            return false;
        }
        return no_smaller(&RE_FLOAT, old_type, new_type);
    }

    if let (Some(old_rank), Some(new_rank)) = (int_rank(old_type), int_rank(new_type)) {
        if old_rank > new_rank {
            return false;
        }
        return !(old_rank == new_rank && old_type.contains("unsigned") && !new_type.contains("unsigned"));
    }

    if let (Some(old_size), Some(new_size)) = (
        sized_type(old_type, &TEXT_SIZES, &RE_CHAR),
        sized_type(new_type, &TEXT_SIZES, &RE_CHAR),
    ) {
        return new_size >= old_size;
    }

    // MariaDB convenience types convert losslessly to and from specific
    // binary and text types
    let conversion_between = |typ: &str, others: &[&str]| {
        (old_type == typ || new_type == typ) && others.iter().any(|o| old_type == *o || new_type == *o)
    };
    if conversion_between("inet6", &["binary(16)", "char(39)", "varchar(39)"])
        || conversion_between("inet4", &["binary(4)", "char(15)", "varchar(15)"])
        || conversion_between(
            "uuid",
            &["binary(16)", "char(32)", "varchar(32)", "char(36)", "varchar(36)"],
        )
    {
        return true;
    }
    if old_type == "inet4" && new_type == "inet6" && flavor.min_mariadb(&[11, 3]) {
        return true;
    }

    // Fixed-length binary(n) is deliberately absent: its zero padding changes
    // stored values on any resize
    if let (Some(old_size), Some(new_size)) = (
        sized_type(old_type, &BLOB_SIZES, &RE_VARBINARY),
        sized_type(new_type, &BLOB_SIZES, &RE_VARBINARY),
    ) {
        return new_size >= old_size;
    }

    false
}

// ================================================================
// Indexes
// ================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddIndex<'a> {
    pub index: &'a Index,
}

impl AddIndex<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        format!("ADD {}", self.index.definition(mods.flavor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropIndex<'a> {
    pub index: &'a Index,
}

impl DropIndex<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        if self.index.primary_key {
            "DROP PRIMARY KEY".to_string()
        } else {
            format!("DROP KEY {}", escape_identifier(&self.index.name))
        }
    }
}

/// Any change to an existing secondary index. Renders as a rename or
/// visibility change when the flavor allows, otherwise as a drop and re-add.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModifyIndex<'a> {
    pub from: &'a Index,
    pub to: &'a Index,
    /// Earlier modified indexes, in order. With strict index order, this
    /// index is rebuilt if the most recent one renders as a DROP; a rebuild
    /// propagates down the chain, so earlier entries need no separate check.
    pub reorder_due_to_clause: Arc<[TableAlterClause<'a>]>,
    /// An earlier index moved or was added, so this one must be rebuilt to
    /// keep strict index order.
    pub reorder_due_to_move: bool,
}

impl<'a> ModifyIndex<'a> {
    #[must_use]
    pub fn new(from: &'a Index, to: &'a Index) -> Self {
        Self {
            from,
            to,
            reorder_due_to_clause: Arc::from(Vec::new()),
            reorder_due_to_move: false,
        }
    }

    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        let rebuild = || {
            format!(
                "{}, {}",
                DropIndex { index: self.from }.clause(),
                AddIndex { index: self.to }.clause(mods)
            )
        };
        if !self.from.equivalent(self.to) || (self.from.comment != self.to.comment && !mods.lax_comments) {
            return rebuild();
        }

        if mods.strict_index_order
            && (self.reorder_due_to_move
                || self
                    .reorder_due_to_clause
                    .last()
                    .is_some_and(|c| c.clause(mods).starts_with("DROP")))
        {
            return rebuild();
        }

        // Renames are checked before visibility, since a combined change is
        // split into a separate AlterIndex
        if self.from.name != self.to.name {
            if mods.flavor.min_mysql(&[5, 7]) || mods.flavor.min_mariadb(&[10, 5]) {
                return format!(
                    "RENAME KEY {} TO {}",
                    escape_identifier(&self.from.name),
                    escape_identifier(&self.to.name)
                );
            }
            return rebuild();
        }

        if self.from.invisible != self.to.invisible {
            return AlterIndex {
                name: &self.to.name,
                invisible: self.to.invisible,
                linked_rename: None,
            }
            .clause(mods);
        }
        String::new()
    }
}

/// Changes index visibility (MySQL `VISIBLE`/`INVISIBLE`, MariaDB `IGNORED`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterIndex<'a> {
    pub name: &'a str,
    pub invisible: bool,
    /// The rename this was split from. If that rename rebuilds the index,
    /// this clause has nothing left to do.
    pub linked_rename: Option<Box<ModifyIndex<'a>>>,
}

impl AlterIndex<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if self
            .linked_rename
            .as_ref()
            .is_some_and(|mi| mi.clause(mods).starts_with("DROP"))
        {
            return String::new();
        }
        let keyword = if mods.flavor.min_mysql(&[8]) {
            if self.invisible { "INVISIBLE" } else { "VISIBLE" }
        } else if mods.flavor.min_mariadb(&[10, 6]) {
            if self.invisible { "IGNORED" } else { "NOT IGNORED" }
        } else {
            return String::new();
        };
        format!("ALTER INDEX {} {keyword}", escape_identifier(self.name))
    }
}

// ================================================================
// Foreign keys and checks
// ================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddForeignKey<'a> {
    pub foreign_key: &'a ForeignKey,
    /// Re-added only for a name or rule-spelling change.
    pub cosmetic_only: bool,
}

impl AddForeignKey<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if self.cosmetic_only && !mods.strict_foreign_key_naming {
            return String::new();
        }
        format!("ADD {}", self.foreign_key.definition(mods.flavor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropForeignKey<'a> {
    pub foreign_key: &'a ForeignKey,
    pub cosmetic_only: bool,
}

impl DropForeignKey<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if self.cosmetic_only && !mods.strict_foreign_key_naming {
            return String::new();
        }
        format!("DROP FOREIGN KEY {}", escape_identifier(&self.foreign_key.name))
    }
}

/// Shared suppression rule for check drops and adds. Renames are ignored
/// unless strict; reordering only matters on MariaDB, also only if strict.
const fn check_suppressed(rename_only: bool, reorder_only: bool, mods: &StatementModifiers, mariadb: bool) -> bool {
    if rename_only {
        !mods.strict_check_constraints
    } else if reorder_only {
        !mods.strict_check_constraints || !mariadb
    } else {
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddCheck<'a> {
    pub check: &'a Check,
    pub reorder_only: bool,
    pub rename_only: bool,
}

impl AddCheck<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if check_suppressed(self.rename_only, self.reorder_only, mods, mods.flavor.is_mariadb(&[])) {
            return String::new();
        }
        format!("ADD {}", self.check.definition(mods.flavor))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DropCheck<'a> {
    pub check: &'a Check,
    pub reorder_only: bool,
    pub rename_only: bool,
}

impl DropCheck<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        let mariadb = mods.flavor.is_mariadb(&[]);
        if check_suppressed(self.rename_only, self.reorder_only, mods, mariadb) {
            return String::new();
        }
        let keyword = if mariadb { "CONSTRAINT" } else { "CHECK" };
        format!("DROP {keyword} {}", escape_identifier(&self.check.name))
    }
}

/// Changes check enforcement (MySQL 8.0.16+).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterCheck<'a> {
    pub check: &'a Check,
    pub new_enforcement: bool,
}

impl AlterCheck<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        let status = if self.new_enforcement { "ENFORCED" } else { "NOT ENFORCED" };
        format!("ALTER CHECK {} {status}", escape_identifier(&self.check.name))
    }
}

// ================================================================
// Table options
// ================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChangeAutoIncrement {
    pub old: u64,
    pub new: u64,
}

impl ChangeAutoIncrement {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        let skip = match mods.next_auto_inc {
            NextAutoInc::Ignore => true,
            NextAutoInc::IfIncreased => self.old >= self.new,
            NextAutoInc::IfAlready => self.old <= 1,
            NextAutoInc::Always => false,
        };
        if skip {
            String::new()
        } else {
            format!("AUTO_INCREMENT = {}", self.new)
        }
    }
}

/// Default charset/collation change. Renders nothing when only the `utf8`
/// vs `utf8mb3` spelling differs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCharSet<'a> {
    pub from_charset: &'a str,
    pub from_collation: &'a str,
    pub to_charset: &'a str,
    pub to_collation: &'a str,
}

impl ChangeCharSet<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        if self.from_collation == self.to_collation {
            return String::new();
        }
        if self.from_collation.starts_with("utf8mb3_") || self.to_collation.starts_with("utf8mb3_") {
            let from = self.from_collation.replacen("utf8_", "utf8mb3_", 1);
            let to = self.to_collation.replacen("utf8_", "utf8mb3_", 1);
            if from == to {
                return String::new();
            }
        }
        format!(
            "DEFAULT CHARACTER SET = {} COLLATE = {}",
            self.to_charset, self.to_collation
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeCreateOptions<'a> {
    pub old: &'a str,
    pub new: &'a str,
}

impl ChangeCreateOptions<'_> {
    /// Sets changed and new options, and resets removed ones to their
    /// default.
    #[must_use]
    pub fn clause(&self) -> String {
        fn split(options: &str) -> Vec<(&str, &str)> {
            options
                .split(' ')
                .filter_map(|kv| {
                    let mut parts = kv.split('=');
                    match (parts.next(), parts.next(), parts.next()) {
                        (Some(k), Some(v), None) => Some((k, v)),
                        _ => None,
                    }
                })
                .collect()
        }
        fn lookup<'o>(options: &[(&str, &'o str)], key: &str) -> Option<&'o str> {
            options.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
        }

        let old = split(self.old);
        let new = split(self.new);
        let mut subclauses = Vec::new();
        for (key, value) in &old {
            match lookup(&new, key) {
                Some(new_value) if new_value != *value => subclauses.push(format!("{key}={new_value}")),
                Some(_) => {}
                None => {
                    let default = CREATE_OPTION_DEFAULTS
                        .iter()
                        .find(|(k, _)| k == key)
                        .map_or("DEFAULT", |(_, v)| *v);
                    subclauses.push(format!("{key}={default}"));
                }
            }
        }
        for (key, value) in &new {
            if lookup(&old, key).is_none() {
                subclauses.push(format!("{key}={value}"));
            }
        }
        subclauses.join(" ")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeComment<'a> {
    pub new_comment: &'a str,
}

impl ChangeComment<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        format!("COMMENT '{}'", escape_value_for_create_table(self.new_comment))
    }
}

/// An explicit tablespace can't be removed again; moving to no tablespace
/// renders nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeTablespace<'a> {
    pub new_tablespace: &'a str,
}

impl ChangeTablespace<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        if self.new_tablespace.is_empty() {
            return String::new();
        }
        format!("TABLESPACE {}", escape_identifier(self.new_tablespace))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeStorageEngine<'a> {
    pub new_engine: &'a str,
}

impl ChangeStorageEngine<'_> {
    #[must_use]
    pub fn clause(&self) -> String {
        format!("ENGINE={}", self.new_engine)
    }
}

// ================================================================
// Partitioning
// ================================================================

/// Partitions a table, or changes the method or expression of an already
/// partitioned one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartitionBy<'a> {
    pub partitioning: &'a TablePartitioning,
    pub repartition: bool,
}

impl PartitionBy<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if mods.partitioning == PartitioningMode::Remove
            || (self.repartition && mods.partitioning == PartitioningMode::Keep)
        {
            return String::new();
        }
        self.partitioning.definition(mods.flavor).trim().to_string()
    }
}

/// A change to the partition list. Only rendered when dropping partitions
/// ahead of a DROP TABLE; otherwise it just records that a difference exists.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModifyPartitions<'a> {
    pub add: Vec<&'a Partition>,
    pub drop: Vec<&'a Partition>,
    pub for_drop_table: bool,
}

impl ModifyPartitions<'_> {
    #[must_use]
    pub fn clause(&self, mods: &StatementModifiers) -> String {
        if !self.for_drop_table || self.drop.is_empty() || mods.skip_pre_drop_alters {
            return String::new();
        }
        let names: Vec<&str> = self.drop.iter().map(|p| p.name.as_str()).collect();
        format!("DROP PARTITION {}", names.join(", "))
    }

    #[must_use]
    pub fn unsafe_reason(&self) -> Option<String> {
        match self.drop.len() {
            0 => None,
            1 => Some("a partition would be dropped".to_string()),
            n => Some(format!("{n} partitions would be dropped")),
        }
    }
}
