//! # oxide-mysql-core
//!
//! Schema diffing and DDL generation for MySQL and MariaDB.
//!
//! This crate provides:
//! - A streaming, delimiter-aware lexer and a statement splitter that never
//!   fails on SQL it does not understand
//! - An in-memory schema model that round-trips through JSON
//! - A diff engine producing vendor and version specific DDL, with a safety
//!   classification of every statement
//!
//! ## Diffing two schemas
//!
//! ```rust
//! use oxide_mysql_core::diff::{ObjectDiff, SchemaDiff, StatementModifiers};
//! use oxide_mysql_core::schema::{Column, Schema, Table};
//! use oxide_mysql_core::Flavor;
//!
//! let flavor: Flavor = "mysql:8.0".parse().unwrap();
//! let from = Schema::new("app").with_table(
//!     Table::new("users").with_column(Column::new("id", "int").not_null()),
//! );
//! let to = Schema::new("app").with_table(
//!     Table::new("users")
//!         .with_column(Column::new("id", "int").not_null())
//!         .with_column(Column::new("email", "varchar(100)")),
//! );
//!
//! let diff = SchemaDiff::new(Some(&from), Some(&to));
//! let mods = StatementModifiers::new(flavor);
//! let stmts: Vec<String> = diff
//!     .object_diffs()
//!     .iter()
//!     .map(|d| d.statement(&mods).unwrap())
//!     .collect();
//! assert_eq!(stmts, ["ALTER TABLE `users` ADD COLUMN `email` varchar(100)"]);
//! ```
//!
//! ## Splitting SQL
//!
//! ```rust
//! use oxide_mysql_core::parser::{parse_statements_in_string, StatementType};
//!
//! let stmts = parse_statements_in_string("USE app;\nCREATE TABLE t (id int);\n").unwrap();
//! assert_eq!(stmts[1].statement_type, StatementType::Create);
//! assert_eq!(stmts[1].object_name, "t");
//! ```

pub mod diff;
pub mod flavor;
pub mod lexer;
pub mod object;
pub mod parser;
pub mod schema;

pub use diff::{DiffError, DiffType, ObjectDiff, SchemaDiff, StatementModifiers, TableDiff};
pub use flavor::{Flavor, Vendor, Version};
pub use lexer::{Lexer, MalformedSqlError, TokenKind};
pub use object::{ObjectKey, ObjectType};
pub use parser::{ParseError, Statement, StatementType};
pub use schema::{Column, Index, Routine, Schema, Table};
