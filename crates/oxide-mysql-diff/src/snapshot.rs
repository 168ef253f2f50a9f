//! JSON schema snapshots.
//!
//! A snapshot is a serialized [`Schema`]. Snapshots taken straight from
//! `information_schema` can be passed through [`prepare`] to run the
//! introspection fixups against each table's `SHOW CREATE TABLE` text.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use oxide_mysql_core::schema::fixup::apply_table_fixups;
use oxide_mysql_core::{Flavor, Schema};
use tracing::{debug, info};

use crate::error::{DiffToolError, Result};

/// Reads a schema snapshot from a JSON file and validates it.
///
/// # Errors
///
/// Returns an error naming `path` if the file can't be read, isn't a valid
/// snapshot, or holds two objects with the same name.
pub fn load_schema(path: &Path) -> Result<Schema> {
    let read = || -> Result<Schema> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    };
    let schema = read().map_err(|e| e.in_file(path))?;
    validate(&schema).map_err(|message| DiffToolError::InvalidSnapshot {
        path: path.to_path_buf(),
        message,
    })?;
    debug!(
        path = %path.display(),
        tables = schema.tables.len(),
        routines = schema.routines.len(),
        "loaded snapshot"
    );
    Ok(schema)
}

/// Writes `schema` as pretty-printed JSON.
///
/// # Errors
///
/// Returns an error if the file can't be written.
pub fn save_schema(schema: &Schema, path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(schema)?;
    fs::write(path, json).map_err(|e| DiffToolError::from(e).in_file(path))
}

/// Runs the introspection fixups for `flavor` on every table that has
/// `SHOW CREATE TABLE` text. Tables without it are left alone.
pub fn prepare(schema: &mut Schema, flavor: Flavor) {
    for table in schema.tables.iter_mut().filter(|t| !t.create_statement.is_empty()) {
        apply_table_fixups(table, flavor);
        if table.unsupported_ddl {
            info!(table = %table.name, "table uses features not supported for diffing");
        }
    }
}

fn validate(schema: &Schema) -> std::result::Result<(), String> {
    let mut tables = HashSet::new();
    for table in &schema.tables {
        if table.name.is_empty() {
            return Err("table with empty name".to_string());
        }
        if !tables.insert(table.name.as_str()) {
            return Err(format!("duplicate table {}", table.object_key()));
        }
    }
    let mut routines = HashSet::new();
    for routine in &schema.routines {
        if !routines.insert(routine.object_key()) {
            return Err(format!("duplicate {}", routine.object_key()));
        }
    }
    Ok(())
}
