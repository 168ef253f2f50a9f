//! Foreign key constraints.

use serde::{Deserialize, Serialize};

use super::util::escape_identifier;
use crate::flavor::Flavor;

/// A foreign key constraint. `column_names` and `referenced_column_names`
/// always have the same length.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ForeignKey {
    pub name: String,
    pub column_names: Vec<String>,
    /// Empty when the parent table is in the same schema.
    pub referenced_schema_name: String,
    pub referenced_table_name: String,
    pub referenced_column_names: Vec<String>,
    pub update_rule: String,
    pub delete_rule: String,
}

impl ForeignKey {
    /// Returns the constraint definition as shown in `SHOW CREATE TABLE`.
    /// RESTRICT rules are left out, matching the server.
    #[must_use]
    pub fn definition(&self, _flavor: Flavor) -> String {
        let child_cols = join_escaped(&self.column_names);
        let parent_cols = join_escaped(&self.referenced_column_names);
        let mut referenced_table = escape_identifier(&self.referenced_table_name);
        if !self.referenced_schema_name.is_empty() {
            referenced_table = format!(
                "{}.{referenced_table}",
                escape_identifier(&self.referenced_schema_name)
            );
        }
        format!(
            "CONSTRAINT {} FOREIGN KEY ({child_cols}) REFERENCES {referenced_table} ({parent_cols}){}{}",
            escape_identifier(&self.name),
            rule_clause("DELETE", &self.delete_rule),
            rule_clause("UPDATE", &self.update_rule),
        )
    }

    /// Strict equality, including the constraint name.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Same behavior regardless of name. NO ACTION, RESTRICT and a missing
    /// rule all behave identically in MySQL.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        self.column_names == other.column_names
            && self.referenced_schema_name == other.referenced_schema_name
            && self.referenced_table_name == other.referenced_table_name
            && self.referenced_column_names == other.referenced_column_names
            && normalize_rule(&self.update_rule) == normalize_rule(&other.update_rule)
            && normalize_rule(&self.delete_rule) == normalize_rule(&other.delete_rule)
    }
}

fn join_escaped(names: &[String]) -> String {
    names
        .iter()
        .map(|n| escape_identifier(n))
        .collect::<Vec<_>>()
        .join(", ")
}

fn rule_clause(action: &str, rule: &str) -> String {
    if rule.is_empty() || rule == "RESTRICT" {
        String::new()
    } else {
        format!(" ON {action} {rule}")
    }
}

fn normalize_rule(rule: &str) -> &str {
    match rule {
        "" | "NO ACTION" => "RESTRICT",
        other => other,
    }
}
