//! CHECK constraints.

use serde::{Deserialize, Serialize};

use super::util::escape_identifier;
use crate::flavor::Flavor;

/// A CHECK constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Check {
    pub name: String,
    pub clause: String,
    /// Always true in MariaDB.
    pub enforced: bool,
}

impl Default for Check {
    fn default() -> Self {
        Self {
            name: String::new(),
            clause: String::new(),
            enforced: true,
        }
    }
}

impl Check {
    #[must_use]
    pub fn new(name: impl Into<String>, clause: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            clause: clause.into(),
            enforced: true,
        }
    }

    #[must_use]
    pub fn definition(&self, _flavor: Flavor) -> String {
        let not_enforced = if self.enforced { "" } else { " /*!80016 NOT ENFORCED */" };
        format!(
            "CONSTRAINT {} CHECK ({}){not_enforced}",
            escape_identifier(&self.name),
            self.clause
        )
    }
}
