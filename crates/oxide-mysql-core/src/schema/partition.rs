//! Table partitioning.

use serde::{Deserialize, Serialize};

use super::util::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;

/// How the partition list is rendered in a partitioning clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum PartitionListMode {
    /// Decided by the partitions themselves.
    #[default]
    #[serde(rename = "")]
    Default,
    /// Every partition listed individually.
    #[serde(rename = "full")]
    Explicit,
    /// Only `PARTITIONS n`.
    #[serde(rename = "countOnly")]
    Count,
    /// Neither list nor count, implying a single partition.
    #[serde(rename = "omit")]
    None,
}

/// Partitioning of a table. Sub-partitioning is modeled but not rendered.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TablePartitioning {
    /// `RANGE`, `RANGE COLUMNS`, `LIST`, `LIST COLUMNS`, `HASH`,
    /// `LINEAR HASH`, `KEY` or `LINEAR KEY`.
    pub method: String,
    pub sub_method: String,
    pub expression: String,
    pub sub_expression: String,
    pub partitions: Vec<Partition>,
    pub force_partition_list: PartitionListMode,
    /// Full text of an `ALGORITHM=n ` clause for KEY partitioning.
    pub algo_clause: String,
}

/// A single partition.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Partition {
    pub name: String,
    pub sub_name: String,
    /// Only set for RANGE or LIST partitioning.
    pub values: String,
    pub comment: String,
    pub engine: String,
    /// Already escaped as shown by the server.
    pub data_dir: String,
}

impl TablePartitioning {
    /// Returns the partitioning clause as shown at the end of `SHOW CREATE
    /// TABLE`, including its leading newline.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        let mode = match self.force_partition_list {
            PartitionListMode::Default => {
                let explicit = self.partitions.iter().enumerate().any(|(n, p)| {
                    !p.values.is_empty()
                        || !p.comment.is_empty()
                        || !p.data_dir.is_empty()
                        || p.name != format!("p{n}")
                });
                if explicit {
                    PartitionListMode::Explicit
                } else {
                    PartitionListMode::Count
                }
            }
            mode => mode,
        };
        let partitions_clause = match mode {
            PartitionListMode::Explicit => {
                let defs: Vec<String> = self
                    .partitions
                    .iter()
                    .map(|p| p.definition(flavor, &self.method))
                    .collect();
                format!("\n({})", defs.join(",\n "))
            }
            PartitionListMode::Count => format!("\nPARTITIONS {}", self.partitions.len()),
            PartitionListMode::Default | PartitionListMode::None => String::new(),
        };

        let (opener, closer) = if flavor.min_mariadb(&[10, 2]) {
            ("", "")
        } else if self.method.ends_with("COLUMNS") {
            ("/*!50500", " */")
        } else {
            ("/*!50100", " */")
        };
        format!(
            "\n{opener} PARTITION BY {}{partitions_clause}{closer}",
            self.partition_by(flavor)
        )
    }

    fn partition_by(&self, flavor: Flavor) -> String {
        let method = match self.method.as_str() {
            "RANGE COLUMNS" => "RANGE  COLUMNS".to_string(),
            "LIST COLUMNS" => "LIST  COLUMNS".to_string(),
            other => format!("{other} "),
        };
        let strip = (self.method.ends_with("COLUMNS") || self.method.ends_with("KEY"))
            && !flavor.min_mariadb(&[10, 2]);
        let expr = if strip {
            self.expression.replace('`', "")
        } else {
            self.expression.clone()
        };
        format!("{method}{}({expr})", self.algo_clause)
    }

    /// True for RANGE and LIST partitioning, whose partition lists carry
    /// meaning beyond a count.
    #[must_use]
    pub fn has_value_list(&self) -> bool {
        self.method.starts_with("RANGE") || self.method.starts_with("LIST")
    }
}

impl Partition {
    #[must_use]
    pub fn definition(&self, flavor: Flavor, method: &str) -> String {
        let name = if flavor.min_mariadb(&[10, 2]) {
            escape_identifier(&self.name)
        } else {
            self.name.clone()
        };

        let values = if method == "RANGE" && self.values == "MAXVALUE" {
            "VALUES LESS THAN MAXVALUE ".to_string()
        } else if method.contains("RANGE") {
            format!("VALUES LESS THAN ({}) ", self.values)
        } else if method.contains("LIST") {
            format!("VALUES IN ({}) ", self.values)
        } else {
            String::new()
        };
        let data_dir = if self.data_dir.is_empty() {
            String::new()
        } else {
            format!("DATA DIRECTORY = '{}' ", self.data_dir)
        };
        let comment = if self.comment.is_empty() {
            String::new()
        } else {
            format!("COMMENT = '{}' ", escape_value_for_create_table(&self.comment))
        };
        format!("PARTITION {name} {values}{data_dir}{comment}ENGINE = {}", self.engine)
    }
}
