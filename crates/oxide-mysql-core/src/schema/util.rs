//! Helpers for producing and picking apart `SHOW CREATE TABLE` text.

use std::sync::LazyLock;

use regex::Regex;

/// Wraps an identifier in backticks, doubling any backticks it contains.
#[must_use]
pub fn escape_identifier(input: &str) -> String {
    format!("`{}`", input.replace('`', "``"))
}

/// Escapes a value (default, comment, ...) the same way `SHOW CREATE TABLE`
/// displays it.
#[must_use]
pub fn escape_value_for_create_table(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('\0', "\\0")
        .replace('\'', "''")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

static RE_TABLESPACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[)] /\*!50100 TABLESPACE `((?:[^`]|``)+)` \*/ ENGINE=").expect("invalid regex")
});

static RE_AUTO_INC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[)/] ENGINE=\w+ (AUTO_INCREMENT=(\d+) )DEFAULT CHARSET=").expect("invalid regex")
});

static RE_PARTITIONING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)(\s*(?:/\*!?\d*)?\s*partition\s+by .*)$").expect("invalid regex")
});

static RE_NORMALIZE: LazyLock<[(Regex, &'static str); 3]> = LazyLock::new(|| {
    [
        (
            Regex::new(r" /\*!50606 (STORAGE|COLUMN_FORMAT) (DISK|MEMORY|FIXED|DYNAMIC) \*/")
                .expect("invalid regex"),
            "",
        ),
        (Regex::new(r" USING (HASH|BTREE)").expect("invalid regex"), ""),
        (Regex::new(r"`\) KEY_BLOCK_SIZE=\d+").expect("invalid regex"), "`)"),
    ]
});

/// Returns the name in a `/*!50100 TABLESPACE ... */` clause, or an empty
/// string.
#[must_use]
pub fn parse_create_tablespace(create_stmt: &str) -> String {
    RE_TABLESPACE
        .captures(create_stmt)
        .map(|caps| caps[1].to_string())
        .unwrap_or_default()
}

/// Removes the table-level `AUTO_INCREMENT=n` clause, returning the modified
/// statement and `n` (0 when absent).
#[must_use]
pub fn parse_create_auto_inc(create_stmt: &str) -> (String, u64) {
    let Some(caps) = RE_AUTO_INC.captures(create_stmt) else {
        return (create_stmt.to_string(), 0);
    };
    let next_auto_inc = caps[2].parse().unwrap_or(0);
    (create_stmt.replacen(&caps[1], "", 1), next_auto_inc)
}

/// Splits a CREATE TABLE into its base and trailing partitioning clause.
#[must_use]
pub fn parse_create_partitioning(create_stmt: &str) -> (&str, &str) {
    match RE_PARTITIONING.captures(create_stmt).and_then(|caps| caps.get(1)) {
        Some(m) => create_stmt.split_at(m.start()),
        None => (create_stmt, ""),
    }
}

/// Converts `information_schema.tables.create_options` into the format of
/// `SHOW CREATE TABLE`.
#[must_use]
pub fn reformat_create_options(input: &str) -> String {
    if input.is_empty() {
        return String::new();
    }
    let mut result = Vec::new();
    for kv in input.split(' ') {
        let (key, value) = match kv.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (kv, None),
        };
        // MariaDB keeps the case of backtick-quoted option names
        let key = if key.starts_with('`') {
            key.to_string()
        } else {
            key.to_uppercase()
        };
        match value {
            None => {
                if key != "PARTITIONED" {
                    result.push(key);
                }
            }
            Some(v) => {
                let v = match v.strip_prefix('"').and_then(|s| s.strip_suffix('"')) {
                    Some(inner) => format!("'{inner}'"),
                    None => v.to_string(),
                };
                result.push(format!("{key}={v}"));
            }
        }
    }
    result.join(" ")
}

/// Removes no-op options that `SHOW CREATE TABLE` persists for InnoDB but
/// `information_schema` does not report.
#[must_use]
pub fn normalize_create_options(create_stmt: &str) -> String {
    RE_NORMALIZE
        .iter()
        .fold(create_stmt.to_string(), |stmt, (re, replacement)| {
            re.replace_all(&stmt, *replacement).into_owned()
        })
}

/// Strips the display width from an int-family or `year(4)` type. Leaves
/// `tinyint(1)` and zerofill types alone.
#[must_use]
pub fn strip_display_width(col_type: &str) -> (String, bool) {
    let input = col_type.to_lowercase();
    if (!input.contains("int(") && input != "year(4)")
        || input == "tinyint(1)"
        || input.ends_with("zerofill")
    {
        return (col_type.to_string(), false);
    }
    let Some(open_paren) = col_type.find('(') else {
        return (col_type.to_string(), false);
    };
    let modifier = if input.ends_with(" unsigned") { " unsigned" } else { "" };
    (format!("{}{modifier}", &col_type[..open_paren]), true)
}

/// `sql_mode` values that break introspection.
pub const INTROSPECTION_BAD_SQL_MODES: &[&str] = &[
    "ANSI",
    "ANSI_QUOTES",
    "NO_FIELD_OPTIONS",
    "NO_KEY_OPTIONS",
    "NO_TABLE_OPTIONS",
    "IGNORE_BAD_TABLE_OPTIONS",
];

/// `sql_mode` values that only exist in some flavors.
pub const NON_PORTABLE_SQL_MODES: &[&str] = &[
    "NO_AUTO_CREATE_USER",
    "NO_FIELD_OPTIONS",
    "NO_KEY_OPTIONS",
    "NO_TABLE_OPTIONS",
    "DB2",
    "MAXDB",
    "MSSQL",
    "MYSQL323",
    "MYSQL40",
    "ORACLE",
    "POSTGRESQL",
    "TIME_TRUNCATE_FRACTIONAL",
    "IGNORE_BAD_TABLE_OPTIONS",
    "EMPTY_STRING_IS_NULL",
    "SIMULTANEOUS_ASSIGNMENT",
    "TIME_ROUND_FRACTIONAL",
];

/// Removes every mode in `filter` from a comma-separated `sql_mode` value.
#[must_use]
pub fn filter_sql_mode(sql_mode: &str, filter: &[&str]) -> String {
    sql_mode
        .split(',')
        .filter(|mode| !filter.contains(mode))
        .collect::<Vec<_>>()
        .join(",")
}

/// Longest strictly increasing subsequence, keeping the smallest tail values
/// for each candidate length.
#[must_use]
pub fn longest_increasing_subsequence(input: &[usize]) -> Vec<usize> {
    if input.len() < 2 {
        return input.to_vec();
    }
    let mut candidates: Vec<Vec<usize>> = vec![vec![input[0]]];
    for &comp in &input[1..] {
        let last_len = candidates.len();
        if comp < candidates[0][0] {
            candidates[0][0] = comp;
        } else if candidates[last_len - 1].last().is_some_and(|&tail| comp > tail) {
            let mut longer = candidates[last_len - 1].clone();
            longer.push(comp);
            candidates.push(longer);
        } else {
            for j in (0..last_len - 1).rev() {
                if candidates[j].last().is_some_and(|&tail| comp > tail) {
                    let mut next = candidates[j].clone();
                    next.push(comp);
                    candidates[j + 1] = next;
                    break;
                }
            }
        }
    }
    candidates.pop().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_identifier() {
        assert_eq!(escape_identifier("foo"), "`foo`");
        assert_eq!(escape_identifier("fo`o"), "`fo``o`");
        assert_eq!(escape_identifier(""), "``");
    }

    #[test]
    fn test_escape_value_for_create_table() {
        assert_eq!(escape_value_for_create_table("it's"), "it''s");
        assert_eq!(escape_value_for_create_table("a\\b"), "a\\\\b");
        assert_eq!(escape_value_for_create_table("a\nb\r\0"), "a\\nb\\r\\0");
    }

    #[test]
    fn test_parse_create_tablespace() {
        let stmt = "CREATE TABLE `t` (\n  `id` int\n) /*!50100 TABLESPACE `ts1` */ ENGINE=InnoDB DEFAULT CHARSET=latin1";
        assert_eq!(parse_create_tablespace(stmt), "ts1");
        assert_eq!(parse_create_tablespace("CREATE TABLE `t` (\n) ENGINE=InnoDB"), "");
    }

    #[test]
    fn test_parse_create_auto_inc() {
        let stmt = "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB AUTO_INCREMENT=123 DEFAULT CHARSET=latin1";
        let (stripped, next) = parse_create_auto_inc(stmt);
        assert_eq!(next, 123);
        assert_eq!(stripped, "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB DEFAULT CHARSET=latin1");

        let (same, next) = parse_create_auto_inc(&stripped);
        assert_eq!(next, 0);
        assert_eq!(same, stripped);
    }

    #[test]
    fn test_parse_create_partitioning() {
        let stmt = "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB DEFAULT CHARSET=latin1\n/*!50100 PARTITION BY HASH (id)\nPARTITIONS 4 */";
        let (base, clause) = parse_create_partitioning(stmt);
        assert_eq!(base, "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB DEFAULT CHARSET=latin1");
        assert_eq!(clause, "\n/*!50100 PARTITION BY HASH (id)\nPARTITIONS 4 */");

        let plain = "CREATE TABLE `t` (\n  `id` int\n) ENGINE=InnoDB";
        assert_eq!(parse_create_partitioning(plain), (plain, ""));
    }

    #[test]
    fn test_reformat_create_options() {
        assert_eq!(reformat_create_options(""), "");
        assert_eq!(
            reformat_create_options("row_format=COMPRESSED partitioned key_block_size=8"),
            "ROW_FORMAT=COMPRESSED KEY_BLOCK_SIZE=8"
        );
        assert_eq!(reformat_create_options("`Foo`=\"bar\""), "`Foo`='bar'");
    }

    #[test]
    fn test_normalize_create_options() {
        let stmt = "  `a` int /*!50606 STORAGE DISK */,\n  KEY `k` (`a`) USING BTREE,\n  KEY `k2` (`a`) KEY_BLOCK_SIZE=8\n";
        assert_eq!(
            normalize_create_options(stmt),
            "  `a` int,\n  KEY `k` (`a`),\n  KEY `k2` (`a`)\n"
        );
    }

    #[test]
    fn test_strip_display_width() {
        let cases = [
            ("int(11)", "int", true),
            ("int(10) unsigned", "int unsigned", true),
            ("bigint(20) UNSIGNED", "bigint UNSIGNED", true),
            ("year(4)", "year", true),
            ("tinyint(1)", "tinyint(1)", false),
            ("int(10) unsigned zerofill", "int(10) unsigned zerofill", false),
            ("varchar(20)", "varchar(20)", false),
            ("int", "int", false),
        ];
        for (input, expected, stripped) in cases {
            assert_eq!(strip_display_width(input), (expected.to_string(), stripped), "{input}");
        }
    }

    #[test]
    fn test_filter_sql_mode() {
        assert_eq!(
            filter_sql_mode("ANSI_QUOTES,STRICT_TRANS_TABLES,NO_TABLE_OPTIONS", INTROSPECTION_BAD_SQL_MODES),
            "STRICT_TRANS_TABLES"
        );
        assert_eq!(
            filter_sql_mode("NO_AUTO_CREATE_USER,ONLY_FULL_GROUP_BY", NON_PORTABLE_SQL_MODES),
            "ONLY_FULL_GROUP_BY"
        );
    }

    #[test]
    fn test_longest_increasing_subsequence() {
        assert_eq!(longest_increasing_subsequence(&[]), Vec::<usize>::new());
        assert_eq!(longest_increasing_subsequence(&[3]), vec![3]);
        assert_eq!(longest_increasing_subsequence(&[0, 1, 2, 3]), vec![0, 1, 2, 3]);
        assert_eq!(longest_increasing_subsequence(&[3, 0, 1, 2]), vec![0, 1, 2]);
        assert_eq!(longest_increasing_subsequence(&[1, 2, 3, 0]), vec![1, 2, 3]);
        assert_eq!(
            longest_increasing_subsequence(&[0, 8, 4, 12, 2, 10, 6, 14, 1, 9, 5, 13, 3, 11, 7, 15]),
            vec![0, 2, 6, 9, 11, 15]
        );
    }
}
