#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

pub fn bin() -> Command {
    Command::new(env!("CARGO_BIN_EXE_oxide-mysql-diff"))
}

pub fn run(args: &[&str]) -> Output {
    bin()
        .env_remove("OXIDE_MYSQL_FLAVOR")
        .args(args)
        .output()
        .unwrap_or_else(|e| panic!("Failed to run oxide-mysql-diff {args:?}: {e}"))
}

pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

pub fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap_or_else(|e| panic!("Failed to write {name}: {e}"));
    path
}

/// A snapshot of database `shop` holding one table with the given
/// `(name, type)` columns.
pub fn snapshot(table: &str, columns: &[(&str, &str)]) -> String {
    let columns: Vec<String> = columns
        .iter()
        .map(|(name, ty)| format!(r#"{{"name": "{name}", "type": "{ty}", "nullable": true}}"#))
        .collect();
    format!(
        r#"{{"name": "shop", "tables": [{{"name": "{table}", "storageEngine": "InnoDB", "defaultCharSet": "utf8mb4", "columns": [{}]}}]}}"#,
        columns.join(", ")
    )
}
