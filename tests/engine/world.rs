//! Integration tests for world building

use beanstalk_engine::components::{
    Destination, EdgeKind, IsCheck, IsEdge, IsEvent, IsLocation, Origin, Placed, Rule,
};
use beanstalk_engine::{World, WorldBuilder};
use beanstalk_foundation::ErrorKind;
use beanstalk_language::{Session, Source, SourceKind, StaticSettings, SymbolKind};

fn builder() -> WorldBuilder<StaticSettings> {
    let session = Session::new(StaticSettings::new()).unwrap();
    let mut builder = WorldBuilder::new(session).unwrap();
    builder.add_token("Kokiri Sword", &[]).unwrap();
    builder.add_root("Links House").unwrap();
    builder
}

fn small_world() -> World {
    let mut builder = builder();
    let sources = [
        Source::transit("Links House", "Kokiri Forest", "True"),
        Source::check("Kokiri Forest", "KF Kokiri Sword Chest", "is_child"),
        Source::event("Kokiri Forest", "Showed Mido Sword & Shield", "Kokiri_Sword"),
    ];
    assert!(builder.add_sources(&sources).is_empty());
    builder.place("KF Kokiri Sword Chest", "Kokiri Sword").unwrap();
    builder.build().unwrap()
}

#[test]
fn rows_carry_their_kind() {
    let world = small_world();
    let storage = world.storage();

    let forest = world.row("Kokiri Forest").unwrap();
    let chest = world.row("KF Kokiri Sword Chest").unwrap();
    let mido = world.row("Showed Mido Sword & Shield").unwrap();

    assert_eq!(storage.get::<IsLocation>(forest).unwrap(), Some(IsLocation));
    assert_eq!(storage.get::<IsCheck>(chest).unwrap(), Some(IsCheck));
    assert_eq!(storage.get::<IsEvent>(mido).unwrap(), Some(IsEvent));
    assert_eq!(world.collected(mido), 0);
}

#[test]
fn edges_are_rows_and_graph_arcs() {
    let world = small_world();
    let house = world.row("Links House").unwrap();
    let forest = world.row("Kokiri Forest").unwrap();
    let edge = world.edge(house, forest).unwrap();

    let storage = world.storage();
    assert_eq!(storage.get::<IsEdge>(edge).unwrap(), Some(IsEdge));
    assert_eq!(storage.get::<Origin>(edge).unwrap(), Some(Origin(house)));
    assert_eq!(storage.get::<Destination>(edge).unwrap(), Some(Destination(forest)));
    assert_eq!(
        storage.get::<EdgeKind>(edge).unwrap(),
        Some(EdgeKind(SourceKind::Transit))
    );
    assert!(storage.get::<Rule>(edge).unwrap().is_some());
    assert_eq!(world.name_of(edge), "Links House -> Kokiri Forest");

    assert!(world.graph().has_edge(house.index(), forest.index()));
    assert_eq!(world.graph().roots().elems(), [house.index()]);
    assert_eq!(world.edge_count(), 3);
}

#[test]
fn transit_edges_are_symbols() {
    let world = small_world();
    let edge = world.symbols().lookup("Links House -> Kokiri Forest").unwrap();
    assert_eq!(edge.kind, SymbolKind::Transit);
    assert!(world.row_of(edge.id).is_some());
}

#[test]
fn escaped_names_find_rows() {
    let world = small_world();
    assert_eq!(world.row("Kokiri_Sword"), world.row("Kokiri Sword"));
    assert!(world.row("Kokiri_Sword").is_some());
}

#[test]
fn checks_hold_placed_items() {
    let world = small_world();
    let chest = world.row("KF Kokiri Sword Chest").unwrap();
    let sword = world.row("Kokiri Sword").unwrap();
    assert_eq!(world.storage().get::<Placed>(chest).unwrap(), Some(Placed(sword)));
}

#[test]
fn placing_needs_existing_rows() {
    let mut builder = builder();
    let err = builder.place("Nowhere", "Kokiri Sword").unwrap_err();
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
}

#[test]
fn recompiling_an_edge_replaces_its_rule() {
    let mut builder = builder();
    let first = builder
        .add_source(&Source::transit("Links House", "Kokiri Forest", "False"))
        .unwrap();
    let second = builder
        .add_source(&Source::transit("Links House", "Kokiri Forest", "True"))
        .unwrap();
    assert_eq!(first, second);
    let world = builder.build().unwrap();
    assert_eq!(world.edge_count(), 1);
}

#[test]
fn bad_rules_are_reported_not_stored() {
    let mut builder = builder();
    let failed = builder.add_sources(&[
        Source::transit("Links House", "Kokiri Forest", "True"),
        Source::transit("Kokiri Forest", "Lost Woods", "Kokiri_Sword and ("),
    ]);
    assert_eq!(failed.len(), 1);
    let world = builder.build().unwrap();
    assert_eq!(world.edge_count(), 1);
    assert!(world.row("Lost Woods").is_none());
}

#[test]
fn collecting_counts_up_and_down() {
    let mut world = small_world();
    let sword = world.row("Kokiri Sword").unwrap();
    assert_eq!(world.collect(sword, 2).unwrap(), 2);
    assert_eq!(world.remove(sword, 5).unwrap(), 2);
    assert_eq!(world.collected(sword), 0);
}
