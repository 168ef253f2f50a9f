#![allow(dead_code)]

use oxide_mysql_core::diff::{DiffError, ObjectDiff, SchemaDiff, StatementModifiers, TableDiff};
use oxide_mysql_core::flavor::Vendor;
use oxide_mysql_core::parser::{parse_statements_in_string, Statement};
use oxide_mysql_core::schema::{Column, Schema, Table};
use oxide_mysql_core::Flavor;

pub const MYSQL8: Flavor = Flavor::new(Vendor::MySql, 8, 0, 34);
pub const MYSQL57: Flavor = Flavor::new(Vendor::MySql, 5, 7, 44);
pub const MARIADB: Flavor = Flavor::new(Vendor::MariaDb, 10, 11, 6);

pub fn split(sql: &str) -> Vec<Statement> {
    parse_statements_in_string(sql).unwrap_or_else(|e| panic!("Failed to split: {sql}\nError: {e}"))
}

pub fn mods(flavor: Flavor) -> StatementModifiers {
    StatementModifiers::new(flavor)
}

/// A table of `int` columns with its CREATE text generated for MySQL 8.
pub fn table(name: &str, columns: &[&str]) -> Table {
    columns
        .iter()
        .fold(Table::new(name), |t, c| t.with_column(Column::new(*c, "int")))
        .with_generated_create(MYSQL8)
}

pub fn schema(tables: Vec<Table>) -> Schema {
    let mut s = Schema::new("app");
    s.tables = tables;
    s
}

/// The ALTER turning `from` into `to`, empty when the tables match.
pub fn alter(from: &Table, to: &Table, mods: &StatementModifiers) -> Result<String, DiffError> {
    TableDiff::new_alter(from, to).map_or(Ok(String::new()), |td| td.statement(mods))
}

/// Non-empty statements of a schema diff, panicking on any error.
pub fn statements(diff: &SchemaDiff<'_>, mods: &StatementModifiers) -> Vec<String> {
    diff.object_diffs()
        .iter()
        .map(|d| {
            d.statement(mods)
                .unwrap_or_else(|e| panic!("{} failed: {e}", d.object_key()))
        })
        .filter(|s| !s.is_empty())
        .collect()
}
