//! Schema diff tooling for MySQL and MariaDB.
//!
//! `oxide-mysql-diff` wraps [`oxide_mysql_core`] with the pieces a command
//! line tool needs:
//!
//! - **Snapshots** - loading and saving [`Schema`](oxide_mysql_core::Schema)
//!   values as JSON, optionally running the introspection fixups
//! - **Configuration** - building
//!   [`StatementModifiers`](oxide_mysql_core::StatementModifiers) from an
//!   options file and flags
//! - **Reports** - writing a diff as a runnable SQL script, with withheld
//!   statements commented out
//!
//! # CLI Usage
//!
//! ```bash
//! # Split a SQL file into statements
//! oxide-mysql-diff split schema.sql --json
//!
//! # Print the DDL turning one snapshot into another
//! oxide-mysql-diff diff before.json after.json --flavor mysql:8.0.34
//!
//! # Inspect a flavor string
//! oxide-mysql-diff flavor mariadb:10.11
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod snapshot;

pub use config::{load_options, ModifierArgs, FLAVOR_ENV};
pub use error::{DiffToolError, Result};
pub use report::{write_script, ScriptSummary};
pub use snapshot::{load_schema, prepare, save_schema};
