//! Corrections for table metadata that `information_schema` reports lossily.
//!
//! An introspector builds a [`Table`] from `information_schema` rows plus the
//! raw `SHOW CREATE TABLE` text, then calls [`apply_table_fixups`]. Each fixup
//! re-derives one field from the CREATE text and only runs for the flavors
//! whose `information_schema` is known to get that field wrong.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use super::util::{escape_identifier, normalize_create_options, parse_create_auto_inc, parse_create_tablespace};
use super::{PartitionListMode, Table};
use crate::flavor::Flavor;

static RE_INDEX_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+(?:UNIQUE |FULLTEXT |SPATIAL )?KEY `((?:[^`]|``)+)` (?:USING \w+ )?\([`(]")
        .expect("invalid regex")
});

static RE_FOREIGN_KEY_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+CONSTRAINT `((?:[^`]|``)+)` FOREIGN KEY").expect("invalid regex")
});

static RE_PERCONA_COMPRESSION_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s+`((?:[^`]|``)+)` .* /\*!50633 COLUMN_FORMAT (COMPRESSED[^*]*) \*/")
        .expect("invalid regex")
});

const CREATE_OPTIONS_PLACEHOLDER: &str = "!!!CREATEOPTS!!!";
const EXPRESSION_PLACEHOLDER: &str = "!!!EXPR!!!";
const CHECK_CLAUSE_PLACEHOLDER: &str = "!!!CHECKCLAUSE!!!";

/// Compiles a pattern built from CREATE text. Such patterns can't be checked
/// ahead of time, so a failure just skips the fixup.
fn compile(pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(err) => {
            debug!(%err, "skipping fixup with unusable pattern");
            None
        }
    }
}

/// Applies every fixup relevant to `flavor`, then flags the table as
/// unsupported if its generated CREATE still differs from the real one.
pub fn apply_table_fixups(table: &mut Table, flavor: Flavor) {
    if let Some(partitioning) = table.partitioning.as_mut() {
        for partition in &mut partitioning.partitions {
            partition.engine.clone_from(&table.engine);
        }
        fix_partitioning_edge_cases(table, flavor);
    }

    table.tablespace = parse_create_tablespace(&table.create_statement);
    table.next_auto_increment = parse_create_auto_inc(&table.create_statement).1;
    if table.next_auto_increment == 0 && table.has_auto_increment() {
        table.next_auto_increment = 1;
    }
    if table.engine == "InnoDB" {
        table.create_statement = normalize_create_options(&table.create_statement);
    }

    if flavor.min_mysql(&[8]) && table.secondary_indexes.len() > 1 {
        fix_index_order(table);
    }
    if !flavor.sorted_foreign_keys() && table.foreign_keys.len() > 1 {
        fix_foreign_key_order(table);
    }
    if flavor.min_mysql(&[8]) {
        fix_create_options_order(table, flavor);
        fix_show_charsets(table);
    }
    if flavor.min_mysql(&[5, 7]) {
        fix_generation_expr(table, flavor);
    }
    if flavor.is_percona(&[])
        && flavor.min_mysql(&[5, 6, 33])
        && table.create_statement.contains("COLUMN_FORMAT COMPRESSED")
    {
        fix_percona_col_compression(table);
    }
    if table.create_statement.contains("WITH PARSER") {
        fix_fulltext_index_parsers(table, flavor);
    }
    if flavor.min_mysql(&[8]) {
        fix_default_expression(table, flavor);
        fix_index_expression(table, flavor);
    }
    if !table.checks.is_empty() {
        fix_checks(table, flavor);
    }

    if table.create_statement != table.generated_create_statement(flavor) {
        debug!(table = %table.name, "generated CREATE differs from introspected CREATE");
        table.unsupported_ddl = true;
    }
}

/// Reorders secondary indexes to match the CREATE text. MySQL 8's data
/// dictionary returns them in an unrelated order.
pub fn fix_index_order(table: &mut Table) {
    let names: Vec<&str> = table
        .create_statement
        .lines()
        .filter_map(|line| RE_INDEX_LINE.captures(line))
        .filter_map(|caps| caps.get(1).map(|m| m.as_str()))
        .collect();
    let mut reordered = Vec::with_capacity(table.secondary_indexes.len());
    for name in names {
        if let Some(idx) = table.secondary_index(name) {
            reordered.push(idx.clone());
        }
    }
    if reordered.len() == table.secondary_indexes.len() {
        table.secondary_indexes = reordered;
    } else {
        warn!(
            table = %table.name,
            matched = reordered.len(),
            expected = table.secondary_indexes.len(),
            "failed to parse secondary indexes for reordering"
        );
    }
}

/// Reorders foreign keys to match the CREATE text.
pub fn fix_foreign_key_order(table: &mut Table) {
    let reordered: Vec<_> = table
        .create_statement
        .lines()
        .filter_map(|line| RE_FOREIGN_KEY_LINE.captures(line))
        .filter_map(|caps| caps.get(1).and_then(|m| table.foreign_key(m.as_str())).cloned())
        .collect();
    if reordered.len() == table.foreign_keys.len() {
        table.foreign_keys = reordered;
    } else {
        warn!(table = %table.name, "failed to parse foreign keys for reordering");
    }
}

/// Takes the create options string verbatim from the CREATE text, since
/// MySQL 8 orders them differently than `information_schema`.
pub fn fix_create_options_order(table: &mut Table, flavor: Flavor) {
    if !table.create_options.contains(' ') {
        return;
    }
    let generated = table.generated_create_statement(flavor);
    let Some(template) = generated.lines().find(|line| line.starts_with(") ENGINE=")) else {
        return;
    };
    let template = regex::escape(&template.replacen(&table.create_options, CREATE_OPTIONS_PLACEHOLDER, 1))
        .replacen(CREATE_OPTIONS_PLACEHOLDER, "(.+)", 1);
    let Some(re) = compile(&format!("^{template}$")) else {
        return;
    };
    let found = table
        .create_statement
        .lines()
        .filter(|line| line.starts_with(") ENGINE="))
        .find_map(|line| re.captures(line).map(|caps| caps[1].to_string()));
    if let Some(options) = found {
        table.create_options = options;
    }
}

/// Sets the per-column "show charset/collation" flags from the CREATE text.
/// MySQL 8 shows these clauses in more situations than older servers.
pub fn fix_show_charsets(table: &mut Table) {
    let lines: Vec<&str> = table.create_statement.lines().collect();
    for (n, col) in table.columns.iter_mut().enumerate() {
        if col.charset.is_empty() || col.collation.is_empty() {
            continue;
        }
        // Columns start on the second line
        let Some(line) = lines.get(n + 1) else {
            break;
        };
        if !col.show_charset && line.contains(&format!("CHARACTER SET {}", col.charset)) {
            col.show_charset = true;
        }
        if !col.show_collation && line.contains(&format!("COLLATE {}", col.collation)) {
            col.show_collation = true;
        }
    }
}

/// Re-reads generation expressions from the CREATE text, which unlike
/// `information_schema` keeps 4-byte characters and correct escaping.
pub fn fix_generation_expr(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.clone();
    for col in &mut table.columns {
        if col.generation_expr.is_empty() || create.contains(&col.definition(flavor)) {
            continue;
        }
        let kind = if col.is_virtual { "VIRTUAL" } else { "STORED" };
        let pattern = format!(
            r"(?m)^\s*{}.+GENERATED ALWAYS AS \((.+)\) {kind}",
            regex::escape(&escape_identifier(&col.name))
        );
        if let Some(caps) = compile(&pattern).and_then(|re| re.captures(&create)) {
            col.generation_expr = caps[1].to_string();
        }
    }
}

/// Recovers partition-list rendering, KEY algorithm and DATA DIRECTORY
/// details that only appear in the CREATE text.
pub fn fix_partitioning_edge_cases(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.as_str();
    let Some(partitioning) = table.partitioning.as_mut() else {
        return;
    };

    if partitioning.method.ends_with("HASH") || partitioning.method.ends_with("KEY") {
        let count_clause = format!("\nPARTITIONS {}", partitioning.partitions.len());
        if create.contains(&count_clause) {
            partitioning.force_partition_list = PartitionListMode::Count;
        } else if create.contains("\n(PARTITION ") {
            partitioning.force_partition_list = PartitionListMode::Explicit;
        } else if partitioning.partitions.len() == 1 {
            partitioning.force_partition_list = PartitionListMode::None;
        }
    }

    if partitioning.method.ends_with("KEY") && create.contains("ALGORITHM") {
        let pattern = format!(r"PARTITION BY {} ([^(]*)\(", regex::escape(&partitioning.method));
        if let Some(caps) = compile(&pattern).and_then(|re| re.captures(create)) {
            partitioning.algo_clause = caps[1].to_string();
        }
    }

    if matches!(
        partitioning.force_partition_list,
        PartitionListMode::Default | PartitionListMode::Explicit
    ) && create.contains(" DATA DIRECTORY = ")
    {
        for partition in &mut partitioning.partitions {
            let name = if flavor.min_mariadb(&[10, 2]) {
                escape_identifier(&partition.name)
            } else {
                partition.name.clone()
            };
            let pattern = format!(
                r"PARTITION {} .*DATA DIRECTORY = '((?:\\\\|\\'|''|[^'])*)'",
                regex::escape(&name)
            );
            if let Some(caps) = compile(&pattern).and_then(|re| re.captures(create)) {
                partition.data_dir = caps[1].to_string();
            }
        }
    }
}

/// Percona Server column compression is only visible in the CREATE text.
pub fn fix_percona_col_compression(table: &mut Table) {
    let found: Vec<(String, String)> = table
        .create_statement
        .lines()
        .filter_map(|line| RE_PERCONA_COMPRESSION_LINE.captures(line))
        .map(|caps| (caps[1].to_string(), caps[2].to_string()))
        .collect();
    for (name, compression) in found {
        if let Some(col) = table.columns.iter_mut().find(|c| c.name == name) {
            col.compression = compression;
        }
    }
}

/// FULLTEXT parser names are not exposed in `information_schema`.
pub fn fix_fulltext_index_parsers(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.clone();
    for idx in table.secondary_indexes.iter_mut().filter(|idx| idx.index_type == "FULLTEXT") {
        let pattern = format!(
            "{}`([^`]+)`",
            regex::escape(&format!("{} /*!50100 WITH PARSER ", idx.definition(flavor)))
        );
        if let Some(caps) = compile(&pattern).and_then(|re| re.captures(&create)) {
            idx.fulltext_parser = caps[1].to_string();
        }
    }
}

/// Re-reads default expressions and binary literal defaults, which MySQL 8
/// mangles or omits in `information_schema`.
pub fn fix_default_expression(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.clone();
    for col in &mut table.columns {
        let matcher = if col.default.starts_with('(') {
            r".+DEFAULT (\(.+\))"
        } else if col.default.starts_with("'0x") && col.type_in_db.contains("binary") {
            r".+DEFAULT ('(''|[^'])*')"
        } else {
            continue;
        };
        let definition = col.definition(flavor);
        if create.contains(&definition) {
            continue;
        }
        let default_clause = format!(" DEFAULT {}", col.default);
        let Some(pos) = definition.find(&default_clause) else {
            continue;
        };
        let after = &definition[pos + default_clause.len()..];
        let pattern = format!(
            r"(?m)^\s*{}{matcher}{}",
            regex::escape(&escape_identifier(&col.name)),
            regex::escape(after)
        );
        if let Some(caps) = compile(&pattern).and_then(|re| re.captures(&create)) {
            col.default = caps[1].to_string();
        }
    }
}

/// Re-reads functional index expressions from the CREATE text.
pub fn fix_index_expression(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.clone();
    for idx in table.secondary_indexes.iter_mut().filter(|idx| idx.functional()) {
        let mut definition = idx.definition(flavor);
        if create.contains(&definition) {
            continue;
        }
        let mut expr_parts = Vec::new();
        for (n, part) in idx.parts.iter().enumerate() {
            if !part.expression.is_empty() {
                definition = definition.replacen(&part.expression, EXPRESSION_PLACEHOLDER, 1);
                expr_parts.push(n);
            }
        }
        let pattern = format!(
            r"(?m)^\s*{},?$",
            regex::escape(&definition).replace(EXPRESSION_PLACEHOLDER, "(.*)")
        );
        let Some(caps) = compile(&pattern).and_then(|re| re.captures(&create)) else {
            continue;
        };
        for (group, &n) in expr_parts.iter().enumerate() {
            if let Some(m) = caps.get(group + 1) {
                idx.parts[n].expression = m.as_str().to_string();
            }
        }
    }
}

/// Repairs check clauses. MariaDB truncates them at 64 bytes and reports
/// inline column checks as named checks. MySQL breaks escaping.
pub fn fix_checks(table: &mut Table, flavor: Flavor) {
    let create = table.create_statement.clone();

    if flavor.is_mariadb(&[]) {
        let checks = std::mem::take(&mut table.checks);
        for mut check in checks {
            if check.clause.len() == 64 {
                let pattern = format!(
                    r"{}[^\n]+CHECK \(({}[^\n]*)\),?\n",
                    regex::escape(&escape_identifier(&check.name)),
                    regex::escape(&check.clause)
                );
                if let Some(caps) = compile(&pattern).and_then(|re| re.captures(&create)) {
                    check.clause = caps[1].to_string();
                }
            }
            let inline = !create.contains(&check.definition(flavor));
            match table.columns.iter_mut().find(|c| c.name == check.name) {
                Some(col) if inline => col.check_clause = check.clause,
                _ => table.checks.push(check),
            }
        }
        return;
    }

    for check in &mut table.checks {
        let original = std::mem::replace(&mut check.clause, CHECK_CLAUSE_PLACEHOLDER.to_string());
        let pattern = format!(
            "{},?\n",
            regex::escape(&check.definition(flavor)).replacen(CHECK_CLAUSE_PLACEHOLDER, "(.+?)", 1)
        );
        check.clause = compile(&pattern)
            .and_then(|re| re.captures(&create))
            .map_or(original, |caps| caps[1].to_string());
    }
}
