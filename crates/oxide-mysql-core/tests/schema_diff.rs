//! Tests for whole-schema diffs built from JSON snapshots.

mod common;
use common::*;

use oxide_mysql_core::schema::{ForeignKey, Index, Schema};
use oxide_mysql_core::{DiffType, ObjectType, SchemaDiff};

fn load(json: &str) -> Schema {
    serde_json::from_str(json).unwrap_or_else(|e| panic!("Failed to load snapshot: {e}"))
}

const BEFORE: &str = r#"{
  "name": "shop",
  "defaultCharSet": "utf8mb4",
  "defaultCollation": "utf8mb4_general_ci",
  "tables": [
    {
      "name": "orders",
      "storageEngine": "InnoDB",
      "defaultCharSet": "utf8mb4",
      "columns": [
        {"name": "id", "type": "int", "nullable": false, "autoIncrement": true},
        {"name": "note", "type": "varchar(10)", "nullable": true}
      ],
      "primaryKey": {"name": "PRIMARY", "primaryKey": true, "parts": [{"columnName": "id"}]}
    },
    {
      "name": "legacy",
      "storageEngine": "InnoDB",
      "defaultCharSet": "utf8mb4",
      "columns": [{"name": "id", "type": "int", "nullable": true}]
    }
  ]
}"#;

const AFTER: &str = r#"{
  "name": "shop",
  "defaultCharSet": "utf8mb4",
  "defaultCollation": "utf8mb4_unicode_ci",
  "tables": [
    {
      "name": "orders",
      "storageEngine": "InnoDB",
      "defaultCharSet": "utf8mb4",
      "columns": [
        {"name": "id", "type": "int", "nullable": false, "autoIncrement": true},
        {"name": "note", "type": "varchar(20)", "nullable": true},
        {"name": "customer_id", "type": "int", "nullable": true}
      ],
      "primaryKey": {"name": "PRIMARY", "primaryKey": true, "parts": [{"columnName": "id"}]}
    },
    {
      "name": "customers",
      "storageEngine": "InnoDB",
      "defaultCharSet": "utf8mb4",
      "columns": [{"name": "id", "type": "int", "nullable": false}],
      "primaryKey": {"name": "PRIMARY", "primaryKey": true, "parts": [{"columnName": "id"}]}
    }
  ],
  "routines": [
    {
      "name": "order_count",
      "type": "function",
      "body": "RETURN (SELECT COUNT(*) FROM orders)",
      "returnDataType": "int",
      "showCreate": "CREATE FUNCTION `order_count`() RETURNS int\nRETURN (SELECT COUNT(*) FROM orders)"
    }
  ]
}"#;

#[test]
fn snapshot_diff_in_execution_order() {
    let before = load(BEFORE);
    let after = load(AFTER);
    let diff = SchemaDiff::new(Some(&before), Some(&after));

    let summary: Vec<(DiffType, ObjectType, String)> = diff
        .object_diffs()
        .iter()
        .map(|d| {
            let key = d.object_key();
            (d.diff_type(), key.object_type, key.name)
        })
        .collect();
    assert_eq!(
        summary,
        [
            (DiffType::Alter, ObjectType::Database, "shop".to_string()),
            (DiffType::Alter, ObjectType::Table, "orders".to_string()),
            (DiffType::Drop, ObjectType::Table, "legacy".to_string()),
            (DiffType::Create, ObjectType::Table, "customers".to_string()),
            (DiffType::Create, ObjectType::Function, "order_count".to_string()),
        ]
    );
}

#[test]
fn snapshot_diff_statements() {
    let before = load(BEFORE);
    let after = load(AFTER);
    let diff = SchemaDiff::new(Some(&before), Some(&after));
    let m = mods(MYSQL8);
    let diffs = diff.object_diffs();

    assert_eq!(
        diffs[0].statement(&m).unwrap(),
        "ALTER DATABASE `shop` COLLATE utf8mb4_unicode_ci"
    );
    assert_eq!(
        diffs[1].statement(&m).unwrap(),
        "ALTER TABLE `orders` MODIFY COLUMN `note` varchar(20), ADD COLUMN `customer_id` int"
    );
    let err = diffs[2].statement(&m).unwrap_err();
    assert!(err.is_unsafe());
    assert_eq!(err.statement(), Some("DROP TABLE `legacy`"));
    assert!(diffs[3].statement(&m).unwrap().starts_with("CREATE TABLE `customers` ("));
    assert!(diffs[4].statement(&m).unwrap().starts_with("CREATE FUNCTION `order_count`()"));
}

#[test]
fn foreign_key_alters_run_after_creates() {
    let before = schema(vec![table("orders", &["id", "customer_id"])]);
    let mut orders = table("orders", &["id", "customer_id"])
        .with_index(Index::new("customer_id", &["customer_id"]))
        .with_foreign_key(ForeignKey {
            name: "orders_customer".into(),
            column_names: vec!["customer_id".into()],
            referenced_table_name: "customers".into(),
            referenced_column_names: vec!["id".into()],
            ..ForeignKey::default()
        });
    orders = orders.with_generated_create(MYSQL8);
    let customers = table("customers", &["id"]).with_primary_key(&["id"]).with_generated_create(MYSQL8);
    let after = schema(vec![orders, customers]);

    let diff = SchemaDiff::new(Some(&before), Some(&after));
    let stmts = statements(&diff, &mods(MYSQL8));
    assert_eq!(stmts.len(), 3);
    assert_eq!(stmts[0], "ALTER TABLE `orders` ADD KEY `customer_id` (`customer_id`)");
    assert!(stmts[1].starts_with("CREATE TABLE `customers`"));
    assert_eq!(
        stmts[2],
        "ALTER TABLE `orders` ADD CONSTRAINT `orders_customer` FOREIGN KEY (`customer_id`) REFERENCES `customers` (`id`)"
    );
}

#[test]
fn creating_a_database() {
    let after = load(AFTER);
    let diff = SchemaDiff::new(None, Some(&after));
    let diffs = diff.object_diffs();
    assert_eq!(diffs[0].diff_type(), DiffType::Create);
    assert_eq!(
        diffs[0].statement(&mods(MYSQL8)).unwrap(),
        "CREATE DATABASE `shop` CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\nUSE `shop`"
    );
    assert!(diffs[1..].iter().all(|d| d.diff_type() == DiffType::Create));
}

#[test]
fn schema_survives_json_round_trip() {
    let after = load(AFTER);
    let json = serde_json::to_string(&after).unwrap();
    assert_eq!(load(&json), after);
}
