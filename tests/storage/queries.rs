//! Integration tests for queries
//!
//! Checks admitted rows against a brute-force reading of the predicate, and
//! the single-row and deferred-error behaviors.

use beanstalk_foundation::{Bitset, ErrorKind};
use beanstalk_storage::{ColumnId, Component, Engine, Payload, Query, RowSet, tag_component};
use proptest::prelude::*;

tag_component! {
    /// Test tag.
    A,
    /// Test tag.
    B,
    /// Test tag.
    C,
    /// Test tag.
    D,
    /// Never registered.
    Ghost,
}

#[derive(Clone, Copy, Debug, PartialEq)]
struct Weight(i64);

impl Component for Weight {
    const NAME: &'static str = "Weight";

    fn into_payload(self) -> Payload {
        Payload::Int(self.0)
    }

    fn from_payload(payload: &Payload) -> Option<Self> {
        payload.as_int().map(Weight)
    }
}

const TAGS: usize = 4;

fn engine_with(rows: &[[bool; TAGS]]) -> (Engine, [ColumnId; TAGS]) {
    let mut engine = Engine::new();
    let cols = [
        engine.create_column::<A>().unwrap(),
        engine.create_column::<B>().unwrap(),
        engine.create_column::<C>().unwrap(),
        engine.create_column::<D>().unwrap(),
    ];
    for tags in rows {
        let row = engine.insert_row([]).unwrap();
        if tags[0] {
            engine.set(row, A).unwrap();
        }
        if tags[1] {
            engine.set(row, B).unwrap();
        }
        if tags[2] {
            engine.set(row, C).unwrap();
        }
        if tags[3] {
            engine.set(row, D).unwrap();
        }
    }
    (engine, cols)
}

fn mask(cols: &[ColumnId; TAGS], picked: [bool; TAGS]) -> Bitset {
    cols.iter()
        .zip(picked)
        .filter(|(_, p)| *p)
        .map(|(c, _)| c.index())
        .collect()
}

proptest! {
    #[test]
    fn admitted_rows_match_brute_force(
        rows in prop::collection::vec(prop::array::uniform4(any::<bool>()), 0..40),
        exists in prop::array::uniform4(any::<bool>()),
        not_exists in prop::array::uniform4(any::<bool>()),
    ) {
        let (engine, cols) = engine_with(&rows);
        let query = Query::from_parts(Vec::new(), mask(&cols, exists), mask(&cols, not_exists));
        let got = engine.retrieve(&query).ids();

        let expected: Bitset = rows
            .iter()
            .enumerate()
            .filter(|(_, tags)| {
                (0..TAGS).all(|i| (!exists[i] || tags[i]) && (!not_exists[i] || !tags[i]))
            })
            .map(|(i, _)| u32::try_from(i).unwrap())
            .collect();
        prop_assert_eq!(got, expected);
    }
}

// =============================================================================
// Result Shapes
// =============================================================================

#[test]
fn one_hit_is_a_single_row() {
    let (engine, _) = engine_with(&[[true, false, false, false], [false, true, false, false]]);
    let rows = engine.create_query().exists::<A>().retrieve().unwrap();
    assert!(matches!(rows, RowSet::One(_)));
    let row = rows.single().unwrap();
    assert_eq!(row.id.index(), 0);
}

#[test]
fn many_hits_iterate_with_loaded_values() {
    let mut engine = Engine::new();
    engine.create_column::<Weight>().unwrap();
    engine.create_column::<A>().unwrap();
    engine.insert_row([Weight(1).into(), A.into()]).unwrap();
    engine.insert_row([Weight(2).into()]).unwrap();
    engine.insert_row([Weight(3).into(), A.into()]).unwrap();

    let rows = engine
        .create_query()
        .load::<Weight>()
        .exists::<A>()
        .retrieve()
        .unwrap();
    assert_eq!(rows.len(), 2);
    let total: i64 = rows
        .into_iter()
        .filter_map(|row| row.get::<Weight>())
        .map(|Weight(w)| w)
        .sum();
    assert_eq!(total, 4);
}

#[test]
fn subsets_restrict_candidates() {
    let (engine, _) = engine_with(&[[true; TAGS], [true; TAGS], [true; TAGS]]);
    let subset: Bitset = [0, 2].into_iter().collect();
    let rows = engine
        .create_query()
        .exists::<B>()
        .from_subset(subset.clone())
        .retrieve()
        .unwrap();
    assert_eq!(rows.ids(), subset);
}

#[test]
fn captured_results_ignore_later_writes() {
    let (mut engine, _) = engine_with(&[[true, false, false, false]]);
    let query = engine.create_query().exists::<A>().build().unwrap();
    let before = engine.retrieve(&query).ids();
    let row = engine.insert_row([A.into()]).unwrap();
    assert_eq!(before.len(), 1);
    assert!(engine.retrieve(&query).ids().is_set(row.index()));
}

// =============================================================================
// Deferred Errors
// =============================================================================

#[test]
fn unknown_columns_are_reported_together() {
    let (engine, _) = engine_with(&[]);
    let err = engine
        .create_query()
        .load::<Weight>()
        .exists::<A>()
        .not_exists::<Ghost>()
        .retrieve()
        .unwrap_err();
    let ErrorKind::Joined(errors) = err.kind else {
        panic!("expected two joined errors");
    };
    assert_eq!(errors.len(), 2);
    assert!(errors
        .iter()
        .all(|e| matches!(e.kind, ErrorKind::UnknownColumn(_))));
}
