//! Statement modifier configuration.
//!
//! Modifiers come from an optional JSON options file, then command-line
//! flags. A flag only overrides the file when it is given.

use std::fs;
use std::path::{Path, PathBuf};

use clap::Args;
use oxide_mysql_core::diff::{NextAutoInc, PartitioningMode};
use oxide_mysql_core::{Flavor, StatementModifiers};
use tracing::{debug, warn};

use crate::error::Result;

/// Environment variable holding the default target flavor.
pub const FLAVOR_ENV: &str = "OXIDE_MYSQL_FLAVOR";

/// Command-line flags for every [`StatementModifiers`] field.
#[derive(Debug, Clone, Default, Args)]
pub struct ModifierArgs {
    /// JSON file with base modifiers (camelCase keys, all optional).
    #[arg(long, value_name = "FILE")]
    pub options: Option<PathBuf>,

    /// Target server, e.g. `mysql:8.0.34` or `mariadb:10.11`.
    #[arg(long, env = FLAVOR_ENV)]
    pub flavor: Option<Flavor>,

    /// Emit destructive statements instead of withholding them.
    #[arg(long)]
    pub allow_unsafe: bool,

    /// Handling of next AUTO_INCREMENT differences.
    #[arg(long, value_name = "MODE")]
    pub next_auto_inc: Option<NextAutoInc>,

    /// Handling of partitioning differences.
    #[arg(long, value_name = "MODE")]
    pub partitioning: Option<PartitioningMode>,

    /// Add a LOCK clause to every ALTER TABLE.
    #[arg(long = "lock", value_name = "LOCK")]
    pub lock_clause: Option<String>,

    /// Add an ALGORITHM clause to every ALTER TABLE.
    #[arg(long = "algorithm", value_name = "ALGORITHM")]
    pub algorithm_clause: Option<String>,

    /// Keep secondary index order.
    #[arg(long)]
    pub strict_index_order: bool,

    /// Keep check constraint names and MariaDB check order.
    #[arg(long)]
    pub strict_check_constraints: bool,

    /// Keep foreign key names and cosmetic rule differences.
    #[arg(long)]
    pub strict_foreign_key_naming: bool,

    /// Keep cosmetic column differences such as int display width.
    #[arg(long)]
    pub strict_column_definition: bool,

    /// Ignore columns that only moved.
    #[arg(long)]
    pub lax_column_order: bool,

    /// Ignore comment-only changes.
    #[arg(long)]
    pub lax_comments: bool,

    /// Recreate routines whose creation metadata differs.
    #[arg(long)]
    pub compare_metadata: bool,

    /// Add WITH VALIDATION to ALTERs touching virtual columns.
    #[arg(long)]
    pub virtual_col_validation: bool,

    /// Don't drop partitions ahead of DROP TABLE.
    #[arg(long)]
    pub skip_pre_drop_alters: bool,
}

impl ModifierArgs {
    /// Loads the options file, if any, and applies the flags on top.
    ///
    /// # Errors
    ///
    /// Returns an error if the options file can't be read or decoded.
    pub fn modifiers(&self) -> Result<StatementModifiers> {
        let base = match &self.options {
            Some(path) => load_options(path)?,
            None => StatementModifiers::default(),
        };
        Ok(self.apply(base))
    }

    /// Overrides fields of `mods` with every flag that was given.
    #[must_use]
    pub fn apply(&self, mut mods: StatementModifiers) -> StatementModifiers {
        if let Some(flavor) = self.flavor {
            mods.flavor = flavor;
        }
        if let Some(mode) = self.next_auto_inc {
            mods.next_auto_inc = mode;
        }
        if let Some(mode) = self.partitioning {
            mods.partitioning = mode;
        }
        if let Some(lock) = &self.lock_clause {
            mods.lock_clause.clone_from(lock);
        }
        if let Some(algorithm) = &self.algorithm_clause {
            mods.algorithm_clause.clone_from(algorithm);
        }

        mods.allow_unsafe |= self.allow_unsafe;
        mods.strict_index_order |= self.strict_index_order;
        mods.strict_check_constraints |= self.strict_check_constraints;
        mods.strict_foreign_key_naming |= self.strict_foreign_key_naming;
        mods.strict_column_definition |= self.strict_column_definition;
        mods.lax_column_order |= self.lax_column_order;
        mods.lax_comments |= self.lax_comments;
        mods.compare_metadata |= self.compare_metadata;
        mods.virtual_col_validation |= self.virtual_col_validation;
        mods.skip_pre_drop_alters |= self.skip_pre_drop_alters;

        if !mods.flavor.known() {
            warn!(flavor = %mods.flavor, "target flavor is unknown, output may not match the server");
        } else if mods.flavor.too_new() {
            warn!(flavor = %mods.flavor, "target flavor is newer than any release known to this tool");
        }
        debug!(?mods, "statement modifiers");
        mods
    }
}

/// Reads [`StatementModifiers`] from a JSON file.
///
/// # Errors
///
/// Returns an error naming `path` if it can't be read or decoded.
pub fn load_options(path: &Path) -> Result<StatementModifiers> {
    let read = || -> Result<StatementModifiers> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    };
    read().map_err(|e| e.in_file(path))
}
