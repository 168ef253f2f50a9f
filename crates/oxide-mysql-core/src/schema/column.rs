//! Table columns.

use serde::{Deserialize, Serialize};

use super::util::{escape_identifier, escape_value_for_create_table, strip_display_width};
use crate::flavor::Flavor;

/// A single column of a table.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Column {
    pub name: String,
    /// Column type as shown by the server, e.g. `varchar(20)`.
    #[serde(rename = "type")]
    pub type_in_db: String,
    pub nullable: bool,
    pub auto_increment: bool,
    /// Default as an expression, so quote-wrapped for strings. Empty when the
    /// column has no default.
    pub default: String,
    pub on_update: String,
    /// Only set for generated columns.
    #[serde(rename = "generationExpression")]
    pub generation_expr: String,
    #[serde(rename = "virtual")]
    pub is_virtual: bool,
    pub charset: String,
    pub collation: String,
    /// Whether `CHARACTER SET` appears in `SHOW CREATE TABLE`.
    pub show_charset: bool,
    /// Whether `COLLATE` appears in `SHOW CREATE TABLE`.
    pub show_collation: bool,
    /// Column compression format (Percona Server or MariaDB).
    pub compression: String,
    pub comment: String,
    pub invisible: bool,
    /// Inline CHECK clause; MariaDB only.
    #[serde(rename = "check")]
    pub check_clause: String,
    pub srid: u32,
    /// Disambiguates SRID 0 from no SRID attribute.
    #[serde(rename = "hasSrid")]
    pub has_srid: bool,
}

impl Column {
    /// Creates a nullable column with no other attributes.
    #[must_use]
    pub fn new(name: impl Into<String>, type_in_db: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_in_db: type_in_db.into(),
            nullable: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub const fn not_null(mut self) -> Self {
        self.nullable = false;
        self
    }

    #[must_use]
    pub const fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, default: impl Into<String>) -> Self {
        self.default = default.into();
        self
    }

    #[must_use]
    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Sets charset and collation, both shown in the column definition.
    #[must_use]
    pub fn charset(mut self, charset: impl Into<String>, collation: impl Into<String>) -> Self {
        self.charset = charset.into();
        self.collation = collation.into();
        self.show_charset = true;
        self.show_collation = true;
        self
    }

    /// Makes this a generated column.
    #[must_use]
    pub fn generated(mut self, expr: impl Into<String>, is_virtual: bool) -> Self {
        self.generation_expr = expr.into();
        self.is_virtual = is_virtual;
        self
    }

    /// Returns the column definition clause as rendered by `SHOW CREATE TABLE`
    /// for `flavor`.
    #[must_use]
    pub fn definition(&self, flavor: Flavor) -> String {
        let mut clauses = Vec::with_capacity(6);
        clauses.push(escape_identifier(&self.name));

        // MariaDB puts the compression marker right after the type
        if !self.compression.is_empty() && flavor.is_mariadb(&[]) {
            clauses.push(format!(
                "{} {}{}*/",
                self.type_in_db,
                flavor.compressed_column_open_comment(),
                self.compression
            ));
        } else {
            clauses.push(self.type_in_db.clone());
        }

        if !self.charset.is_empty() && self.show_charset {
            clauses.push(format!("CHARACTER SET {}", self.charset));
        }
        if !self.collation.is_empty() && self.show_collation {
            clauses.push(format!("COLLATE {}", self.collation));
        }
        if !self.generation_expr.is_empty() {
            let kind = if self.is_virtual { "VIRTUAL" } else { "STORED" };
            clauses.push(format!("GENERATED ALWAYS AS ({}) {kind}", self.generation_expr));
        }

        if !self.nullable {
            clauses.push("NOT NULL".to_string());
        } else if self.type_in_db.starts_with("timestamp") {
            clauses.push("NULL".to_string());
        }

        if self.invisible && flavor.is_mariadb(&[]) {
            clauses.push("INVISIBLE".to_string());
        }
        if self.auto_increment {
            clauses.push("AUTO_INCREMENT".to_string());
        }
        if self.has_srid && flavor.min_mysql(&[8]) {
            clauses.push(format!("/*!80003 SRID {} */", self.srid));
        }
        if !self.default.is_empty() {
            clauses.push(format!("DEFAULT {}", self.default));
        }
        if !self.on_update.is_empty() {
            clauses.push(format!("ON UPDATE {}", self.on_update));
        }
        if self.invisible && flavor.is_mysql(&[]) {
            clauses.push("/*!80023 INVISIBLE */".to_string());
        }
        if !self.compression.is_empty() && flavor.is_percona(&[]) {
            clauses.push(format!(
                "{}COLUMN_FORMAT {} */",
                flavor.compressed_column_open_comment(),
                self.compression
            ));
        }
        if !self.comment.is_empty() {
            clauses.push(format!("COMMENT '{}'", escape_value_for_create_table(&self.comment)));
        }
        if !self.check_clause.is_empty() {
            clauses.push(format!("CHECK ({})", self.check_clause));
        }

        clauses.join(" ")
    }

    /// Strict field-by-field equality.
    #[must_use]
    pub fn equals(&self, other: &Self) -> bool {
        self == other
    }

    /// Returns true if the columns are equal or differ only cosmetically: the
    /// presence (not value) of an int display width, whether charset and
    /// collation are shown, and `utf8` vs `utf8mb3` naming. Comments are not
    /// cosmetic.
    #[must_use]
    pub fn equivalent(&self, other: &Self) -> bool {
        if self.equals(other) {
            return true;
        }

        let (self_stripped, self_had_width) = strip_display_width(&self.type_in_db);
        let (other_stripped, other_had_width) = strip_display_width(&other.type_in_db);
        if self_stripped != other_stripped
            || (self.type_in_db != other.type_in_db && self_had_width && other_had_width)
        {
            return false;
        }

        let mut copy = self.clone();
        copy.type_in_db.clone_from(&other.type_in_db);
        copy.show_charset = other.show_charset;
        copy.show_collation = other.show_collation;
        if matches!(
            (self.charset.as_str(), other.charset.as_str()),
            ("utf8", "utf8mb3") | ("utf8mb3", "utf8")
        ) {
            copy.charset.clone_from(&other.charset);
        }
        if other.collation.starts_with("utf8mb3_") {
            copy.collation = copy.collation.replacen("utf8_", "utf8mb3_", 1);
        } else if other.collation.starts_with("utf8_") {
            copy.collation = copy.collation.replacen("utf8mb3_", "utf8_", 1);
        }
        copy == *other
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flavor::{Flavor, Vendor, Variant};

    #[test]
    fn definition_basic() {
        let col = Column::new("id", "int unsigned").not_null().auto_increment();
        assert_eq!(col.definition(Flavor::default()), "`id` int unsigned NOT NULL AUTO_INCREMENT");

        let col = Column::new("name", "varchar(30)")
            .charset("utf8mb4", "utf8mb4_bin")
            .default_value("'x'")
            .comment("it's");
        assert_eq!(
            col.definition(Flavor::default()),
            "`name` varchar(30) CHARACTER SET utf8mb4 COLLATE utf8mb4_bin DEFAULT 'x' COMMENT 'it''s'"
        );
    }

    #[test]
    fn definition_timestamp_shows_null() {
        let col = Column::new("ts", "timestamp").default_value("NULL");
        assert_eq!(col.definition(Flavor::default()), "`ts` timestamp NULL DEFAULT NULL");
    }

    #[test]
    fn definition_generated() {
        let col = Column::new("full", "varchar(60)").generated("concat(`a`,`b`)", true);
        assert_eq!(
            col.definition(Flavor::default()),
            "`full` varchar(60) GENERATED ALWAYS AS (concat(`a`,`b`)) VIRTUAL"
        );
    }

    #[test]
    fn definition_invisible_by_vendor() {
        let mut col = Column::new("x", "int");
        col.invisible = true;
        let mysql = Flavor::new(Vendor::MySql, 8, 0, 23);
        let maria = Flavor::new(Vendor::MariaDb, 10, 3, 0);
        assert_eq!(col.definition(mysql), "`x` int /*!80023 INVISIBLE */");
        assert_eq!(col.definition(maria), "`x` int INVISIBLE");
    }

    #[test]
    fn definition_srid_and_compression() {
        let mut col = Column::new("g", "point").not_null();
        col.has_srid = true;
        col.srid = 4326;
        assert_eq!(
            col.definition(Flavor::new(Vendor::MySql, 8, 0, 0)),
            "`g` point NOT NULL /*!80003 SRID 4326 */"
        );
        assert_eq!(col.definition(Flavor::new(Vendor::MySql, 5, 7, 0)), "`g` point NOT NULL");

        let mut col = Column::new("b", "blob");
        col.compression = "COMPRESSED".into();
        let percona = Flavor::new(Vendor::MySql, 5, 7, 20).with_variants(Variant::PERCONA);
        assert_eq!(col.definition(percona), "`b` blob /*!50633 COLUMN_FORMAT COMPRESSED */");
        let maria = Flavor::new(Vendor::MariaDb, 10, 3, 1);
        assert!(col.definition(maria).starts_with("`b` blob /*"));
        assert!(col.definition(maria).ends_with("COMPRESSED*/"));
    }

    #[test]
    fn equivalent_ignores_display_width() {
        let a = Column::new("id", "int(11)").not_null();
        let b = Column::new("id", "int").not_null();
        assert!(!a.equals(&b));
        assert!(a.equivalent(&b));
        assert!(b.equivalent(&a));

        let c = Column::new("id", "int(10)").not_null();
        assert!(!a.equivalent(&c));
        let d = Column::new("id", "bigint").not_null();
        assert!(!a.equivalent(&d));
    }

    #[test]
    fn equivalent_charset_aliases() {
        let a = Column::new("s", "varchar(10)").charset("utf8", "utf8_general_ci");
        let mut b = Column::new("s", "varchar(10)").charset("utf8mb3", "utf8mb3_general_ci");
        b.show_charset = false;
        assert!(a.equivalent(&b));
        assert!(b.equivalent(&a));
    }

    #[test]
    fn comment_is_not_cosmetic() {
        let a = Column::new("s", "int");
        let b = Column::new("s", "int").comment("hi");
        assert!(!a.equivalent(&b));
    }
}
