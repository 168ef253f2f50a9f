//! End-to-end table diff scenarios.

mod common;
use common::*;

use oxide_mysql_core::diff::{diff_tables, ModifyColumn, StatementModifiers, TableAlterClause, TableDiff};
use oxide_mysql_core::schema::{Column, ForeignKey, Index, Table};
use oxide_mysql_core::{Flavor, Vendor};
use oxide_mysql_core::{DiffType, ObjectDiff, SchemaDiff};

#[test]
fn diffing_a_table_against_itself_is_empty() {
    let t = table("t", &["id", "name"])
        .with_primary_key(&["id"])
        .with_index(Index::new("idx_name", &["name"]))
        .with_generated_create(MYSQL8);
    let t_clone = t.clone();
    let (clauses, supported) = diff_tables(&t, &t_clone);
    assert!(clauses.is_empty());
    assert!(supported);
    assert!(TableDiff::new_alter(&t, &t).is_none());

    let s = schema(vec![t]);
    let diff = SchemaDiff::new(Some(&s), Some(&s));
    assert!(diff.object_diffs().is_empty());
}

#[test]
fn adding_not_null_column() {
    let from = table("t", &["id"]);
    let to = table("t", &["id"])
        .with_column(Column::new("name", "varchar(10)").not_null())
        .with_generated_create(MYSQL8);

    let td = TableDiff::new_alter(&from, &to).expect("tables differ");
    assert_eq!(td.diff_type, DiffType::Alter);
    assert!(td.is_supported());
    let m = StatementModifiers::default();
    assert!(td.clauses().iter().all(|c| c.unsafe_reason(&m).is_none()));
    assert_eq!(
        td.statement(&m).unwrap(),
        "ALTER TABLE `t` ADD COLUMN `name` varchar(10) NOT NULL"
    );
}

#[test]
fn narrowing_returns_statement_with_unsafe_error() {
    let from = Table::new("t")
        .with_column(Column::new("v", "varchar(10)"))
        .with_generated_create(MYSQL8);
    let to = Table::new("t")
        .with_column(Column::new("v", "varchar(5)"))
        .with_generated_create(MYSQL8);
    let err = alter(&from, &to, &mods(MYSQL8)).unwrap_err();
    assert!(err.is_unsafe());
    assert_eq!(err.statement(), Some("ALTER TABLE `t` MODIFY COLUMN `v` varchar(5)"));
    assert_eq!(
        alter(&from, &to, &mods(MYSQL8).allow_unsafe()).unwrap(),
        "ALTER TABLE `t` MODIFY COLUMN `v` varchar(5)"
    );
}

#[test]
fn column_safety_monotonicity() {
    let base = Column::new("v", "varchar(10)");
    let commented = base.clone().comment("a note");
    let wider = Column::new("v", "varchar(20)");
    let narrower = Column::new("v", "varchar(5)");
    let m = mods(MYSQL8);
    let reason = |new: &Column| {
        TableAlterClause::from(ModifyColumn {
            old: &base,
            new,
            position: Default::default(),
            in_unique_constraint: false,
        })
        .unsafe_reason(&m)
    };
    assert!(reason(&commented).is_none());
    assert!(reason(&wider).is_none());
    assert!(reason(&narrower).is_some());
}

#[test]
fn display_width_is_cosmetic() {
    let old = Column::new("a", "int(11)");
    let new = Column::new("a", "int");
    assert!(MYSQL8.omit_int_display_width());
    assert!(old.equivalent(&new));
    assert!(!old.equals(&new));

    let from = Table::new("t").with_column(old).with_generated_create(MYSQL57);
    let to = Table::new("t").with_column(new).with_generated_create(MYSQL8);
    assert_eq!(alter(&from, &to, &mods(MYSQL8)).unwrap(), "");
    let mut strict = mods(MYSQL8);
    strict.strict_column_definition = true;
    assert_eq!(alter(&from, &to, &strict).unwrap(), "ALTER TABLE `t` MODIFY COLUMN `a` int");
}

#[test]
fn restrict_rule_is_normalized() {
    let fk = ForeignKey {
        name: "fk".into(),
        column_names: vec!["pid".into()],
        referenced_table_name: "parent".into(),
        referenced_column_names: vec!["id".into()],
        ..ForeignKey::default()
    };
    let restrict = ForeignKey {
        update_rule: "RESTRICT".into(),
        ..fk.clone()
    };
    assert!(fk.equivalent(&restrict));
    assert!(!fk.equals(&restrict));

    let from = table("t", &["pid"]).with_foreign_key(fk).with_generated_create(MYSQL8);
    let to = table("t", &["pid"]).with_foreign_key(restrict).with_generated_create(MYSQL8);
    assert_eq!(alter(&from, &to, &mods(MYSQL8)).unwrap(), "");
}

#[test]
fn index_redundancy() {
    let a_b = Index::new("a_b", &["a", "b"]);
    let a = Index::new("a", &["a"]);
    let pk = Index::primary(&["a"]);
    assert!(a.redundant_to(&a_b));
    assert!(!a_b.redundant_to(&a));
    assert!(!pk.redundant_to(&a_b));
}

#[test]
fn column_moves_use_fewest_clauses() {
    let from = table("t", &["a", "b", "c", "d", "e"]);
    let to = table("t", &["b", "c", "a", "d", "e"]);
    assert_eq!(
        alter(&from, &to, &mods(MYSQL8)).unwrap(),
        "ALTER TABLE `t` MODIFY COLUMN `a` int AFTER `c`"
    );

    let to = table("t", &["e", "a", "b", "c", "d"]);
    assert_eq!(
        alter(&from, &to, &mods(MYSQL8)).unwrap(),
        "ALTER TABLE `t` MODIFY COLUMN `e` int FIRST"
    );
}

#[test]
fn drops_modifications_then_adds() {
    let from = table("t", &["a", "b", "c"]);
    let to = Table::new("t")
        .with_column(Column::new("a", "bigint"))
        .with_column(Column::new("x", "int"))
        .with_column(Column::new("c", "int"))
        .with_generated_create(MYSQL8);
    assert_eq!(
        alter(&from, &to, &mods(MYSQL8).allow_unsafe()).unwrap(),
        "ALTER TABLE `t` DROP COLUMN `b`, MODIFY COLUMN `a` bigint, ADD COLUMN `x` int AFTER `a`"
    );
}

#[test]
fn mariadb_and_old_mysql_render_differently() {
    let from = table("t", &["a"]).with_index(Index::new("old_name", &["a"])).with_generated_create(MYSQL8);
    let to = table("t", &["a"]).with_index(Index::new("new_name", &["a"])).with_generated_create(MYSQL8);
    assert_eq!(
        alter(&from, &to, &mods(MARIADB)).unwrap(),
        "ALTER TABLE `t` RENAME KEY `old_name` TO `new_name`"
    );
    let old_mysql = Flavor::new(Vendor::MySql, 5, 6, 51);
    assert_eq!(
        alter(&from, &to, &mods(old_mysql)).unwrap(),
        "ALTER TABLE `t` DROP KEY `old_name`, ADD KEY `new_name` (`a`)"
    );
}
