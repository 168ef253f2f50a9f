//! Stored procedures and functions.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::util::{escape_identifier, escape_value_for_create_table};
use crate::flavor::Flavor;
use crate::object::{ObjectKey, ObjectType};

/// A `SHOW CREATE PROCEDURE`/`FUNCTION` result whose parameter list or
/// return type could not be located.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failed to parse show create {keyword} {schema}.{name}: {create_statement}")]
pub struct RoutineParseError {
    pub keyword: &'static str,
    pub schema: String,
    pub name: String,
    pub create_statement: String,
}

/// A stored procedure or function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Routine {
    pub name: String,
    /// [`ObjectType::Procedure`] or [`ObjectType::Function`].
    #[serde(rename = "type")]
    pub routine_type: ObjectType,
    pub body: String,
    /// Parameter list as written in the original CREATE.
    pub param_string: String,
    /// Functions only; includes charset/collation when relevant.
    pub return_data_type: String,
    pub definer: String,
    #[serde(rename = "dbCollation")]
    pub database_collation: String,
    pub comment: String,
    pub deterministic: bool,
    pub sql_data_access: String,
    pub security_type: String,
    /// `sql_mode` in effect at creation time.
    pub sql_mode: String,
    #[serde(rename = "showCreate")]
    pub create_statement: String,
}

impl Default for Routine {
    fn default() -> Self {
        Self {
            name: String::new(),
            routine_type: ObjectType::Procedure,
            body: String::new(),
            param_string: String::new(),
            return_data_type: String::new(),
            definer: String::new(),
            database_collation: String::new(),
            comment: String::new(),
            deterministic: false,
            sql_data_access: "CONTAINS SQL".to_string(),
            security_type: "DEFINER".to_string(),
            sql_mode: String::new(),
            create_statement: String::new(),
        }
    }
}

impl Routine {
    #[must_use]
    pub fn object_key(&self) -> ObjectKey {
        ObjectKey::new(self.routine_type, self.name.clone())
    }

    #[must_use]
    pub fn def(&self) -> &str {
        &self.create_statement
    }

    /// Builds the CREATE statement from the routine's fields, formatted like
    /// `SHOW CREATE`.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        format!("{}{}", self.head(flavor), self.body)
    }

    /// `DEFINER=`user`@`host``, quoting both halves when an `@` is present.
    #[must_use]
    pub fn definer_clause(&self) -> String {
        match self.definer.rsplit_once('@') {
            Some((user, host)) => format!("DEFINER={}@{}", escape_identifier(user), escape_identifier(host)),
            None => format!("DEFINER={}", self.definer),
        }
    }

    fn head(&self, _flavor: Flavor) -> String {
        let definer = if self.definer.is_empty() {
            String::new()
        } else {
            format!("{} ", self.definer_clause())
        };
        let return_clause = if self.routine_type == ObjectType::Function {
            format!(" RETURNS {}", self.return_data_type)
        } else {
            String::new()
        };

        let mut characteristics = String::new();
        if self.sql_data_access != "CONTAINS SQL" {
            characteristics.push_str(&format!("    {}\n", self.sql_data_access));
        }
        if self.deterministic {
            characteristics.push_str("    DETERMINISTIC\n");
        }
        if self.security_type != "DEFINER" {
            characteristics.push_str(&format!("    SQL SECURITY {}\n", self.security_type));
        }
        if !self.comment.is_empty() {
            characteristics.push_str(&format!(
                "    COMMENT '{}'\n",
                escape_value_for_create_table(&self.comment)
            ));
        }

        format!(
            "CREATE {definer}{} {}({}){return_clause}\n{characteristics}",
            self.routine_type.keyword(),
            escape_identifier(&self.name),
            self.param_string,
        )
    }

    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// True if the routines differ at most in characteristics that `ALTER
    /// PROCEDURE`/`FUNCTION` can change: comment, data access and security.
    #[must_use]
    pub fn equals_ignoring_characteristics(&self, other: &Self) -> bool {
        self.name == other.name
            && self.routine_type == other.routine_type
            && self.body == other.body
            && self.definer == other.definer
            && self.deterministic == other.deterministic
            && self.param_string == other.param_string
            && self.return_data_type == other.return_data_type
            && self.database_collation == other.database_collation
            && self.sql_mode == other.sql_mode
    }

    #[must_use]
    pub fn drop_statement(&self) -> String {
        format!("DROP {} {}", self.routine_type.keyword(), escape_identifier(&self.name))
    }

    /// Fills in `param_string`, `return_data_type` and `body` from
    /// `create_statement`. The body is only set when the rest of the
    /// statement matches what the other fields would generate.
    ///
    /// # Errors
    ///
    /// Returns [`RoutineParseError`] if the parameter list or return type
    /// cannot be located.
    pub fn parse_create_statement(&mut self, flavor: Flavor, schema: &str) -> Result<(), RoutineParseError> {
        let error = || RoutineParseError {
            keyword: self.routine_type.keyword(),
            schema: escape_identifier(schema),
            name: escape_identifier(&self.name),
            create_statement: self.create_statement.clone(),
        };

        let create = self.create_statement.as_str();
        let arg_start = create.find('(').filter(|&pos| pos > 0).ok_or_else(error)?;
        let mut depth = 1usize;
        let mut arg_end = None;
        for (pos, ch) in create.char_indices().skip_while(|&(pos, _)| pos <= arg_start) {
            if depth == 0 {
                arg_end = Some(pos);
                break;
            }
            match ch {
                '(' => depth += 1,
                ')' => depth -= 1,
                _ => {}
            }
        }
        let arg_end = arg_end.ok_or_else(error)?;
        let param_string = create[arg_start + 1..arg_end - 1].to_string();

        let mut return_data_type = String::new();
        if self.routine_type == ObjectType::Function {
            let ret_start = arg_end + " RETURNS ".len();
            let ret_len = create
                .get(ret_start..)
                .and_then(|rest| rest.find('\n'))
                .ok_or_else(error)?;
            return_data_type = create[ret_start..ret_start + ret_len].to_string();
        }

        self.param_string = param_string;
        self.return_data_type = return_data_type;
        let header = self.head(flavor);
        if let Some(body) = self.create_statement.strip_prefix(header.as_str()) {
            self.body = body.to_string();
        }
        Ok(())
    }
}
