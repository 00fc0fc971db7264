//! Transaction Scenario Tests
//!
//! - Insert a row and reference it from a later operation in the same batch
//! - Named uuids are distinct and extracted in append order
//! - Rejected operations leave the batch intact
//! - Merged batches stay internally consistent
//! - The emitted params follow the protocol encoding

use std::collections::BTreeSet;
use std::sync::Arc;

use ovsdb_txn::notation::{
    Column, ColumnData, Condition, Datum, Function, Mutator, Row, RowUuid, ValidationError, Version,
};
use ovsdb_txn::schema::{AtomicType, BaseType, ColumnSchema, ColumnType, DatabaseSchema, TableSchema};
use ovsdb_txn::tables::{Bridge, OpenVSwitch};
use ovsdb_txn::transaction::{Delete, Insert, Mutate, Operation, Select, TransactionBuilder, Update};
use ovsdb_txn::typed::{TypedRow, TypedTable};
use ovsdb_txn::{BuilderConfig, Error};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

/// Bridge(name: string) and Open_vSwitch(bridges: set of uuid)
fn minimal_schema() -> Arc<DatabaseSchema> {
    Arc::new(
        DatabaseSchema::new("Open_vSwitch", Version::new(8, 3, 0))
            .with_table(
                TableSchema::new("Bridge")
                    .root()
                    .with_column(ColumnSchema::new("name", ColumnType::atom(AtomicType::String)).immutable())
                    .with_column(ColumnSchema::new(
                        "fail_mode",
                        ColumnType::optional(AtomicType::String),
                    )),
            )
            .with_table(TableSchema::new("Open_vSwitch").root().with_column(ColumnSchema::new(
                "bridges",
                ColumnType::set_of(BaseType::reference("Bridge")),
            ))),
    )
}

fn bridge_row(schema: &DatabaseSchema, name: &str) -> Row {
    let table = schema.table_schema("Bridge").unwrap();
    let mut row = Row::with_schema(Arc::clone(table));
    row.set(table.column_schema("name").unwrap(), name.to_string())
        .unwrap();
    row
}

/// For every pending Bridge insert, add the new bridge to Open_vSwitch.bridges.
fn wire_new_bridges(txn: &mut TransactionBuilder) {
    let schema = Arc::clone(txn.database_schema());
    let bridge: Bridge = TypedRow::wrap(&schema).unwrap();

    let names: Vec<RowUuid> = txn
        .extract_insert(bridge.table_schema())
        .into_iter()
        .filter_map(TransactionBuilder::extract_named_uuid)
        .collect();

    for name in names {
        let mut ovs: OpenVSwitch = TypedRow::wrap(&schema).unwrap();
        ovs.set_bridges(BTreeSet::from([name])).unwrap();
        let mutation = ovs.typed().mutation("bridges", Mutator::Insert).unwrap();
        txn.add(Mutate::new(ovs.table_schema().name()).with_mutation(mutation))
            .unwrap();
    }
}

// =============================================================================
// Insert Then Reference
// =============================================================================

/// Insert "br0", then insert its named uuid into Open_vSwitch.bridges.
#[test]
fn test_insert_then_mutate_parent() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let mut txn = TransactionBuilder::new(Arc::clone(&schema));

    let br0 = txn.add_insert(&bridge_table, bridge_row(&schema, "br0")).unwrap();
    txn.add(Mutate::new("Open_vSwitch").add_mutation(
        "bridges",
        Mutator::Insert,
        Datum::uuid_set([br0.clone()]),
    ))
    .unwrap();

    assert_eq!(txn.len(), 2);
    let declared = txn.operations()[0].as_insert().and_then(Insert::uuid_name);
    assert_eq!(declared, br0.as_named());

    match &txn.operations()[1] {
        Operation::Mutate(mutate) => {
            assert_eq!(mutate.mutations()[0].value().uuids(), vec![&br0]);
        }
        other => panic!("expected mutate, got {:?}", other),
    }
}

/// The bridge-add wiring: one parent mutation per pending insert.
#[test]
fn test_bridge_add_wiring() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let mut txn = TransactionBuilder::new(Arc::clone(&schema));

    txn.add_insert(&bridge_table, bridge_row(&schema, "br0")).unwrap();
    txn.add_insert(&bridge_table, bridge_row(&schema, "br1")).unwrap();
    wire_new_bridges(&mut txn);

    let params = txn.build().unwrap();
    assert_eq!(params[0], json!("Open_vSwitch"));
    assert_eq!(
        params[3],
        json!({
            "op": "mutate",
            "table": "Open_vSwitch",
            "where": [],
            "mutations": [["bridges", "insert", ["named-uuid", "row1"]]]
        })
    );
    assert_eq!(
        params[4]["mutations"][0][2],
        json!(["named-uuid", "row2"])
    );
}

/// N inserts give N distinct names, extracted in append order.
#[test]
fn test_distinct_names_in_append_order() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let mut txn = TransactionBuilder::new(Arc::clone(&schema));

    let names: Vec<RowUuid> = (0..5)
        .map(|i| {
            txn.add_insert(&bridge_table, bridge_row(&schema, &format!("br{}", i)))
                .unwrap()
        })
        .collect();
    let distinct: BTreeSet<&RowUuid> = names.iter().collect();
    assert_eq!(distinct.len(), 5);

    let extracted: Vec<RowUuid> = txn
        .extract_insert(&bridge_table)
        .into_iter()
        .filter_map(TransactionBuilder::extract_named_uuid)
        .collect();
    assert_eq!(extracted, names);

    let rows: Vec<String> = txn
        .extract_insert(&bridge_table)
        .iter()
        .map(|insert| insert.row().column("name").unwrap().to_json().to_string())
        .collect();
    assert_eq!(rows, vec!["\"br0\"", "\"br1\"", "\"br2\"", "\"br3\"", "\"br4\""]);
}

// =============================================================================
// Rejection
// =============================================================================

/// A failed lookup rejects only that operation.
#[test]
fn test_rejection_keeps_earlier_operations() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let mut txn = TransactionBuilder::new(Arc::clone(&schema));
    txn.add_insert(&bridge_table, bridge_row(&schema, "br0")).unwrap();
    let before = txn.build().unwrap();

    assert!(txn.add(Delete::new("Brigde")).is_err());
    assert!(txn
        .add(Update::new("Bridge", Row::new()).with_condition(Condition::equals(
            "nmae",
            "br0".to_string().into_datum()
        )))
        .is_err());
    assert!(txn
        .add(Mutate::new("Open_vSwitch").add_mutation(
            "bridges",
            Mutator::Insert,
            "br0".to_string().into_datum()
        ))
        .is_err());

    assert_eq!(txn.len(), 1);
    assert_eq!(txn.build().unwrap(), before);
}

/// A scalar for a set-valued column is rejected, never coerced.
#[test]
fn test_scalar_for_set_column_rejected() {
    let schema = minimal_schema();
    let ovs_table = schema.table_schema("Open_vSwitch").unwrap();
    let stale = Arc::new(ColumnSchema::new("bridges", ColumnType::atom(AtomicType::Uuid)));
    let mut row = Row::new();
    row.set(&stale, RowUuid::named("row1")).unwrap();

    let mut txn = TransactionBuilder::new(Arc::clone(&schema));
    let err = txn.add(Insert::new(ovs_table.name(), row)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(txn.names().is_empty());
}

/// A set-valued column cannot ride under a string column's key.
#[test]
fn test_column_under_wrong_key_never_queued() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let ports = Arc::new(ColumnSchema::new(
        "ports",
        ColumnType::set_of(BaseType::reference("Port")),
    ));
    let column = Column::from_data(
        ports,
        BTreeSet::from([RowUuid::named("a"), RowUuid::named("b")]),
    )
    .unwrap();

    let mut row = Row::with_schema(Arc::clone(&bridge_table));
    let err = row.add_column("name", column).unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::MisplacedColumn { .. })
    ));

    let mut txn = TransactionBuilder::new(Arc::clone(&schema));
    let declared = row.clone();
    assert!(txn.add_insert(&bridge_table, row).is_ok());
    let params = txn.build().unwrap();
    assert_eq!(params[1]["row"], declared.to_json());
    assert_eq!(params[1]["row"], json!({}));
}

#[test]
fn test_ordering_function_on_string_rejected() {
    let mut txn = TransactionBuilder::new(minimal_schema());
    let err = txn
        .add(Select::new("Bridge").with_condition(Condition::new(
            "name",
            Function::LessThan,
            "br0".to_string().into_datum(),
        )))
        .unwrap_err();
    assert!(err.to_string().contains("name"));
}

// =============================================================================
// Update, Delete and Select Encoding
// =============================================================================

#[test]
fn test_update_by_match_row() {
    let schema = minimal_schema();
    let table = schema.table_schema("Bridge").unwrap();
    let mut change = Row::with_schema(Arc::clone(table));
    change
        .set(table.column_schema("fail_mode").unwrap(), BTreeSet::from(["secure".to_string()]))
        .unwrap();

    let mut txn = TransactionBuilder::new(Arc::clone(&schema));
    txn.add(Update::new("Bridge", change).matching(&bridge_row(&schema, "br0")))
        .unwrap();
    txn.add(Delete::new("Bridge").matching(&bridge_row(&schema, "br9")))
        .unwrap();
    txn.add(Operation::Comment("reconcile br0".into())).unwrap();

    assert_eq!(
        txn.build().unwrap(),
        json!([
            "Open_vSwitch",
            {"op": "update", "table": "Bridge", "where": [["name", "==", "br0"]], "row": {"fail_mode": "secure"}},
            {"op": "delete", "table": "Bridge", "where": [["name", "==", "br9"]]},
            {"op": "comment", "comment": "reconcile br0"}
        ])
    );
}

// =============================================================================
// Merge
// =============================================================================

/// Two producers build separately; the merged batch keeps names unique.
#[test]
fn test_merge_independent_batches() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());

    let mut first = TransactionBuilder::new(Arc::clone(&schema));
    first.add_insert(&bridge_table, bridge_row(&schema, "br0")).unwrap();
    wire_new_bridges(&mut first);

    let mut second = TransactionBuilder::new(Arc::clone(&schema));
    second.add_insert(&bridge_table, bridge_row(&schema, "br1")).unwrap();
    wire_new_bridges(&mut second);

    first.merge(second).unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(first.names().len(), 2);

    let params = first.build().unwrap();
    assert_eq!(params[1]["uuid-name"], json!("row1"));
    assert_eq!(params[2]["mutations"][0][2], json!(["named-uuid", "row1"]));
    assert_eq!(params[3]["uuid-name"], json!("row2"));
    assert_eq!(params[4]["mutations"][0][2], json!(["named-uuid", "row2"]));
}

#[test]
fn test_configured_prefix_in_params() {
    let schema = minimal_schema();
    let bridge_table = Arc::clone(schema.table_schema("Bridge").unwrap());
    let config = BuilderConfig::from_json_str(r#"{"named_uuid_prefix": "bridge_"}"#).unwrap();
    let mut txn = TransactionBuilder::with_config(Arc::clone(&schema), config).unwrap();

    txn.add_insert(&bridge_table, bridge_row(&schema, "br0")).unwrap();
    let params = txn.build().unwrap();
    assert_eq!(params[1]["uuid-name"], json!("bridge_1"));
}
