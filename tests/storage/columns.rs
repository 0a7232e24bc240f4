//! Integration tests for columns and rows
//!
//! Tests value round trips through each column shape, unsetting, and
//! validate-then-write semantics.

use beanstalk_foundation::ErrorKind;
use beanstalk_storage::{
    ColumnKind, Component, ComponentValue, Engine, IndexSpec, Payload, RowId, tag_component,
};

#[derive(Clone, Debug, PartialEq)]
struct Name(String);

impl Component for Name {
    const NAME: &'static str = "Name";

    fn into_payload(self) -> Payload {
        Payload::Str(self.0.into())
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_str().map(|s| Name(s.to_string()))
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Count(i64);

impl Component for Count {
    const NAME: &'static str = "Count";
    const KIND: ColumnKind = ColumnKind::Slice;

    fn into_payload(self) -> Payload {
        Payload::Int(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_int().map(Count)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Parent(RowId);

impl Component for Parent {
    const NAME: &'static str = "Parent";

    fn into_payload(self) -> Payload {
        Payload::Row(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_row().map(Parent)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Unregistered;

impl Component for Unregistered {
    const NAME: &'static str = "Unregistered";

    fn into_payload(self) -> Payload {
        Payload::Tag
    }

    fn from_payload(_: &Payload) -> Option<Self> {
        Some(Self)
    }
}

tag_component! {
    /// Test tag.
    IsBottle,
}

fn engine() -> Engine {
    let mut engine = Engine::new();
    engine.create_column::<Name>().unwrap();
    engine.create_column::<Count>().unwrap();
    engine.create_column::<Parent>().unwrap();
    engine.create_column::<IsBottle>().unwrap();
    engine.create_index::<Name>(IndexSpec::unique()).unwrap();
    engine
}

// =============================================================================
// Round Trips
// =============================================================================

#[test]
fn every_column_shape_round_trips() {
    let mut engine = engine();
    let root = engine.insert_row([ComponentValue::of(Name("Root".into()))]).unwrap();
    let row = engine.insert_row([]).unwrap();

    engine.set(row, Name("Bottle".into())).unwrap();
    engine.set(row, Count(3)).unwrap();
    engine.set(row, Parent(root)).unwrap();
    engine.set(row, IsBottle).unwrap();

    assert_eq!(engine.get::<Name>(row).unwrap(), Some(Name("Bottle".into())));
    assert_eq!(engine.get::<Count>(row).unwrap(), Some(Count(3)));
    assert_eq!(engine.get::<Parent>(row).unwrap(), Some(Parent(root)));
    assert_eq!(engine.get::<IsBottle>(row).unwrap(), Some(IsBottle));
    assert_eq!(engine.get::<Count>(root).unwrap(), None);
}

#[test]
fn unset_admits_not_exists() {
    let mut engine = engine();
    let row = engine
        .insert_row([ComponentValue::of(IsBottle), ComponentValue::of(Count(1))])
        .unwrap();
    engine.unset::<IsBottle>(row).unwrap();

    assert_eq!(engine.get::<IsBottle>(row).unwrap(), None);
    let rows = engine
        .create_query()
        .not_exists::<IsBottle>()
        .exists::<Count>()
        .retrieve()
        .unwrap();
    assert_eq!(rows.ids().elems(), [row.index()]);
}

#[test]
fn overwrites_replace_values() {
    let mut engine = engine();
    let row = engine.insert_row([ComponentValue::of(Count(1))]).unwrap();
    engine.set(row, Count(2)).unwrap();
    assert_eq!(engine.get::<Count>(row).unwrap(), Some(Count(2)));
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn unknown_types_write_nothing() {
    let mut engine = engine();
    let row = engine.insert_row([ComponentValue::of(Count(1))]).unwrap();
    let err = engine
        .set_values(
            row,
            [ComponentValue::of(Count(9)), ComponentValue::of(Unregistered)],
        )
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UnknownColumn(ref name) if name == "Unregistered"));
    assert_eq!(engine.get::<Count>(row).unwrap(), Some(Count(1)));
}

#[test]
fn columns_register_once() {
    let mut engine = engine();
    let err = engine.create_column::<Name>().unwrap_err();
    assert!(matches!(err.kind, ErrorKind::ColumnExists(_)));

    let existing = engine.column_id::<Name>().unwrap();
    assert_eq!(engine.create_column_if_not_exists::<Name>(), existing);
    let fresh = engine.create_column_if_not_exists::<Unregistered>();
    assert_ne!(fresh, existing);
}

#[test]
fn missing_rows_are_reported() {
    let mut engine = engine();
    let err = engine.set(RowId::new(40), Count(1)).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::RowNotFound(40)));
    assert!(engine.membership(RowId::new(40)).is_err());
}

// =============================================================================
// Indexes
// =============================================================================

#[test]
fn unique_names_resolve_to_one_row() {
    let mut engine = engine();
    let forest = engine
        .insert_row([ComponentValue::of(Name("Kokiri Forest".into()))])
        .unwrap();
    engine.insert_row([ComponentValue::of(Name("Lost Woods".into()))]).unwrap();

    assert_eq!(
        engine.lookup_one(Name("Kokiri Forest".into())).unwrap(),
        Some(forest)
    );
    assert_eq!(engine.lookup_one(Name("Hyrule Field".into())).unwrap(), None);
}

#[test]
fn unindexed_lookup_scans() {
    let mut engine = engine();
    let a = engine.insert_row([ComponentValue::of(Count(5))]).unwrap();
    engine.insert_row([ComponentValue::of(Count(6))]).unwrap();
    let c = engine.insert_row([ComponentValue::of(Count(5))]).unwrap();

    let rows = engine.lookup(Count(5)).unwrap();
    assert_eq!(rows.elems(), [a.index(), c.index()]);
    assert_eq!(engine.lookup_one(Count(5)).unwrap(), None);
}

#[test]
fn get_values_follows_column_order() {
    let mut engine = engine();
    let row = engine
        .insert_row([ComponentValue::of(Name("Bottle".into())), ComponentValue::of(Count(2))])
        .unwrap();
    let cols = [
        engine.column_id::<Count>().unwrap(),
        engine.column_id::<IsBottle>().unwrap(),
        engine.column_id::<Name>().unwrap(),
    ];
    let values = engine.get_values(row, &cols).unwrap();
    assert_eq!(
        values,
        [Some(Payload::Int(2)), None, Some(Payload::Str("Bottle".into()))]
    );
}
