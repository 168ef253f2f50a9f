//! Primary keys and secondary indexes.

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::util::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;

/// A primary key or secondary index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Index {
    pub name: String,
    pub parts: Vec<IndexPart>,
    pub primary_key: bool,
    pub unique: bool,
    /// INVISIBLE in MySQL 8, IGNORED in MariaDB 10.6.
    pub invisible: bool,
    pub comment: String,
    /// `BTREE`, `FULLTEXT`, `SPATIAL`, `HASH` or empty.
    #[serde(rename = "type")]
    pub index_type: String,
    #[serde(rename = "parser")]
    pub fulltext_parser: String,
}

/// One column or expression of an index.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IndexPart {
    /// Empty for an expression part.
    pub column_name: String,
    /// Functional index expression (MySQL 8+), empty for a column part.
    pub expression: String,
    /// Non-zero if only a prefix of the column is indexed.
    pub prefix_length: u16,
    pub descending: bool,
}

impl IndexPart {
    #[must_use]
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            column_name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn expression(expr: impl Into<String>) -> Self {
        Self {
            expression: expr.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn prefix(mut self, length: u16) -> Self {
        self.prefix_length = length;
        self
    }

    #[must_use]
    pub const fn desc(mut self) -> Self {
        self.descending = true;
        self
    }

    #[must_use]
    pub fn definition(&self, _flavor: Flavor) -> String {
        let base = if self.column_name.is_empty() {
            format!("({})", self.expression)
        } else {
            escape_identifier(&self.column_name)
        };
        let prefix = if self.prefix_length > 0 {
            format!("({})", self.prefix_length)
        } else {
            String::new()
        };
        let collation = if self.descending { " DESC" } else { "" };
        format!("{base}{prefix}{collation}")
    }
}

impl Index {
    /// A non-unique BTREE index over the named columns.
    #[must_use]
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            parts: columns.iter().map(|c| IndexPart::column(*c)).collect(),
            index_type: "BTREE".to_string(),
            ..Self::default()
        }
    }

    /// A primary key over the named columns.
    #[must_use]
    pub fn primary(columns: &[&str]) -> Self {
        Self {
            primary_key: true,
            unique: true,
            ..Self::new("PRIMARY", columns)
        }
    }

    #[must_use]
    pub const fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    #[must_use]
    pub fn with_parts(mut self, parts: Vec<IndexPart>) -> Self {
        self.parts = parts;
        self
    }

    /// Returns the index definition as shown in `SHOW CREATE TABLE`.
    ///
    /// A primary key is always rendered as `PRIMARY KEY`, even when the
    /// `unique` flag was left unset.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        let parts: Vec<String> = self.parts.iter().map(|p| p.definition(flavor)).collect();
        let type_and_name = if self.primary_key {
            if !self.unique {
                warn!(index = %self.name, "primary key is not marked unique");
            }
            "PRIMARY KEY".to_string()
        } else if self.unique {
            format!("UNIQUE KEY {}", escape_identifier(&self.name))
        } else if !self.index_type.is_empty() && self.index_type != "BTREE" {
            format!("{} KEY {}", self.index_type, escape_identifier(&self.name))
        } else {
            format!("KEY {}", escape_identifier(&self.name))
        };

        let comment = if self.comment.is_empty() {
            String::new()
        } else {
            format!(" COMMENT '{}'", escape_value_for_create_table(&self.comment))
        };
        let invis = match (self.invisible, flavor.is_mariadb(&[])) {
            (false, _) => "",
            (true, true) => " IGNORED",
            (true, false) => " /*!80000 INVISIBLE */",
        };
        let parser = if self.index_type == "FULLTEXT" && !self.fulltext_parser.is_empty() {
            format!(" /*!50100 WITH PARSER `{}` */ ", self.fulltext_parser)
        } else {
            String::new()
        };
        format!("{type_and_name} ({}){comment}{invis}{parser}", parts.join(","))
    }

    /// Equivalent, and also the same name, comment and visibility.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self.name == other.name
            && self.comment == other.comment
            && self.invisible == other.invisible
            && self.equivalent(other)
    }

    /// Same functional behavior: name, comment and visibility are ignored.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.primary_key == other.primary_key
            && self.unique == other.unique
            && self.index_type == other.index_type
            && self.fulltext_parser == other.fulltext_parser
            && self.parts == other.parts
    }

    /// Returns true if `other` makes this index unnecessary, e.g. `KEY (a)`
    /// is redundant to `KEY (a, b)`. A primary key is never redundant, and a
    /// visible index is never redundant to an invisible one.
    #[must_use]
    pub fn redundant_to(&self, other: &Self) -> bool {
        if self.primary_key
            || (self.unique && !other.unique)
            || self.index_type != other.index_type
            || self.fulltext_parser != other.fulltext_parser
        {
            return false;
        }
        if !self.invisible && other.invisible {
            return false;
        }
        if self.unique && other.unique {
            return self.parts == other.parts;
        }
        // Composite FULLTEXT indexes don't allow left-prefix lookups
        if self.index_type == "FULLTEXT" && self.parts.len() != other.parts.len() {
            return false;
        }
        if self.parts.len() > other.parts.len() {
            return false;
        }
        self.parts.iter().zip(&other.parts).all(|(part, other_part)| {
            part.column_name == other_part.column_name
                && part.expression == other_part.expression
                && part.descending == other_part.descending
                && (other_part.prefix_length == 0
                    || (part.prefix_length > 0 && part.prefix_length <= other_part.prefix_length))
        })
    }

    /// True if any part is an expression.
    #[must_use]
    pub fn functional(&self) -> bool {
        self.parts.iter().any(|p| !p.expression.is_empty())
    }
}
