//! Tables.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::check::Check;
use super::column::Column;
use super::foreign_key::ForeignKey;
use super::index::Index;
use super::partition::TablePartitioning;
use super::util::{escape_identifier, escape_value_for_create_table, parse_create_partitioning};
use crate::flavor::Flavor;
use crate::object::{ObjectKey, ObjectType};

static RE_ROW_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"ROW_FORMAT=(\w+)").expect("invalid regex"));

/// A single table.
///
/// `create_statement` is the authoritative `SHOW CREATE TABLE` text. When the
/// CREATE generated from the other fields does not match it,
/// `unsupported_ddl` is set and the table can only be diffed with reduced
/// confidence.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Table {
    pub name: String,
    #[serde(rename = "storageEngine")]
    pub engine: String,
    #[serde(rename = "defaultCharSet")]
    pub charset: String,
    #[serde(rename = "defaultCollation")]
    pub collation: String,
    /// Whether the default COLLATE is shown in `SHOW CREATE TABLE`.
    pub show_collation: bool,
    /// `ROW_FORMAT`, `STATS_PERSISTENT` and friends, space-separated.
    pub create_options: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<Index>,
    pub secondary_indexes: Vec<Index>,
    pub foreign_keys: Vec<ForeignKey>,
    pub checks: Vec<Check>,
    pub comment: String,
    pub tablespace: String,
    pub next_auto_increment: u64,
    pub partitioning: Option<TablePartitioning>,
    #[serde(rename = "unsupportedForDiff")]
    pub unsupported_ddl: bool,
    #[serde(rename = "showCreateTable")]
    pub create_statement: String,
}

impl Table {
    /// An empty InnoDB table with a latin1 default charset.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            engine: "InnoDB".to_string(),
            charset: "latin1".to_string(),
            collation: "latin1_swedish_ci".to_string(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn with_primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = Some(Index::primary(columns));
        self
    }

    #[must_use]
    pub fn with_index(mut self, index: Index) -> Self {
        self.secondary_indexes.push(index);
        self
    }

    #[must_use]
    pub fn with_foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    #[must_use]
    pub fn with_check(mut self, check: Check) -> Self {
        self.checks.push(check);
        self
    }

    /// Sets `create_statement` to the generated CREATE for `flavor`, as if
    /// the table had been introspected from that server.
    #[must_use]
    pub fn with_generated_create(mut self, flavor: Flavor) -> Self {
        self.create_statement = self.generated_create_statement(flavor);
        self
    }

    #[must_use]
    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(ObjectType::Table, self.name.clone())
    }

    /// The table's CREATE statement.
    #[must_use]
    pub fn def(&self) -> &str {
        &self.create_statement
    }

    #[must_use]
    pub fn alter_statement(&self) -> String {
        format!("ALTER TABLE {}", escape_identifier(&self.name))
    }

    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP TABLE {}", escape_identifier(&self.name))
    }

    /// Builds a CREATE TABLE from the table's fields, formatted like `SHOW
    /// CREATE TABLE` on `flavor`.
    #[must_use]
    pub fn generated_create_statement(&self, flavor: Flavor) -> String {
        let mut defs: Vec<String> = self.columns.iter().map(|c| c.definition(flavor)).collect();
        defs.extend(self.primary_key.iter().map(|pk| pk.definition(flavor)));
        defs.extend(self.secondary_indexes.iter().map(|idx| idx.definition(flavor)));
        defs.extend(self.foreign_keys.iter().map(|fk| fk.definition(flavor)));
        defs.extend(self.checks.iter().map(|cc| cc.definition(flavor)));

        let tablespace = if self.tablespace.is_empty() {
            String::new()
        } else {
            format!(" /*!50100 TABLESPACE {} */", escape_identifier(&self.tablespace))
        };
        let auto_inc = if self.next_auto_increment > 1 {
            format!(" AUTO_INCREMENT={}", self.next_auto_increment)
        } else {
            String::new()
        };
        let charset = if self.charset == "utf8" && flavor.min_mysql(&[8, 0, 24]) {
            "utf8mb3"
        } else {
            self.charset.as_str()
        };
        let collate = if self.show_collation {
            format!(" COLLATE={}", self.collation)
        } else {
            String::new()
        };
        let create_options = if self.create_options.is_empty() {
            String::new()
        } else {
            format!(" {}", self.create_options)
        };
        let comment = if self.comment.is_empty() {
            String::new()
        } else {
            format!(" COMMENT='{}'", escape_value_for_create_table(&self.comment))
        };
        let partitioning = self
            .partitioning
            .as_ref()
            .map(|p| p.definition(flavor))
            .unwrap_or_default();

        format!(
            "CREATE TABLE {} (\n  {}\n){tablespace} ENGINE={}{auto_inc} DEFAULT CHARSET={charset}{collate}{create_options}{comment}{partitioning}",
            escape_identifier(&self.name),
            defs.join(",\n  "),
            self.engine,
        )
    }

    /// Returns the CREATE statement without its partitioning clause.
    #[must_use]
    pub fn unpartitioned_create_statement(&self, flavor: Flavor) -> String {
        let Some(partitioning) = &self.partitioning else {
            return self.create_statement.clone();
        };
        let clause = partitioning.definition(flavor);
        if let Some(base) = self.create_statement.strip_suffix(clause.as_str()) {
            return base.to_string();
        }
        parse_create_partitioning(&self.create_statement).0.to_string()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn secondary_index(&self, name: &str) -> Option<&Index> {
        self.secondary_indexes.iter().find(|idx| idx.name == name)
    }

    #[must_use]
    pub fn foreign_key(&self, name: &str) -> Option<&ForeignKey> {
        self.foreign_keys.iter().find(|fk| fk.name == name)
    }

    #[must_use]
    pub fn check(&self, name: &str) -> Option<&Check> {
        self.checks.iter().find(|cc| cc.name == name)
    }

    #[must_use]
    pub fn has_auto_increment(&self) -> bool {
        self.columns.iter().any(|c| c.auto_increment)
    }

    /// The index InnoDB clusters rows by: the primary key, or else the first
    /// non-functional unique index over NOT NULL columns. `None` for other
    /// engines.
    #[must_use]
    pub fn clustered_index_key(&self) -> Option<&Index> {
        if self.engine != "InnoDB" {
            return None;
        }
        if self.primary_key.is_some() {
            return self.primary_key.as_ref();
        }
        self.secondary_indexes.iter().find(|idx| {
            idx.unique
                && !idx.functional()
                && idx
                    .parts
                    .iter()
                    .all(|part| self.column(&part.column_name).is_some_and(|c| !c.nullable))
        })
    }

    /// The table's row format: the explicit `ROW_FORMAT`, `COMPRESSED` when
    /// only `KEY_BLOCK_SIZE` is set, or empty.
    #[must_use]
    pub fn row_format_clause(&self) -> String {
        if let Some(caps) = RE_ROW_FORMAT.captures(&self.create_options) {
            return caps[1].to_string();
        }
        if self.create_options.contains("KEY_BLOCK_SIZE") {
            return "COMPRESSED".to_string();
        }
        String::new()
    }

    /// Primary key and unique indexes containing the named column.
    #[must_use]
    pub fn unique_constraints_with_column(&self, column_name: &str) -> Vec<&Index> {
        let has_column = |idx: &Index| idx.parts.iter().any(|p| p.column_name == column_name);
        self.primary_key
            .iter()
            .chain(self.secondary_indexes.iter().filter(|idx| idx.unique))
            .filter(|idx| has_column(idx))
            .collect()
    }
}
