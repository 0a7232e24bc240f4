//! Generated connections from `at` and `here`

use beanstalk::engine::{Exploration, PlayerState, WorldBuilder};
use beanstalk::language::{Session, Source, StaticSettings, SymbolKind, disassemble};

fn builder() -> WorldBuilder<StaticSettings> {
    let session = Session::new(StaticSettings::new()).unwrap();
    let mut builder = WorldBuilder::new(session).unwrap();
    builder.add_token("Sticks", &[]).unwrap();
    builder.add_root("Kokiri Forest").unwrap();
    builder
}

#[test]
fn at_generates_exactly_one_guarded_edge() {
    let mut builder = builder();
    builder
        .add_source(&Source::transit("Kokiri Forest", "Lost Woods", "True"))
        .unwrap();
    builder
        .add_source(&Source::check(
            "Kokiri Forest",
            "KF Deku Baba Sticks",
            "at('Lost Woods', Sticks)",
        ))
        .unwrap();
    assert_eq!(builder.session().pending_connections(), 1);
    let world = builder.build().unwrap();

    let name = "Token$0000#0000@Lost Woods";
    let synthetic = world.symbols().lookup(name).unwrap();
    assert_eq!(synthetic.kind, SymbolKind::Event);

    let woods = world.row("Lost Woods").unwrap();
    let token = world.row(name).unwrap();
    let edge = world.edge(woods, token).unwrap();
    let listing = disassemble(&world.rule(edge).unwrap().0).unwrap();
    assert!(listing.starts_with("0000 CHK_QTY"), "{listing}");

    // the call site checks for the synthetic token
    let forest = world.row("Kokiri Forest").unwrap();
    let chest = world.row("KF Deku Baba Sticks").unwrap();
    let call_site = world.edge(forest, chest).unwrap();
    let listing = disassemble(&world.rule(call_site).unwrap().0).unwrap();
    assert!(listing.starts_with("0000 CHK_QTY"), "{listing}");
    assert_eq!(world.edge_count(), 3);
}

#[test]
fn exploration_goes_through_the_synthetic_token() {
    let mut builder = builder();
    let sources = [
        Source::transit("Kokiri Forest", "Lost Woods", "True"),
        Source::check("Kokiri Forest", "KF Deku Baba Sticks", "at('Lost Woods', Sticks)"),
    ];
    assert!(builder.add_sources(&sources).is_empty());
    let mut world = builder.build().unwrap();
    let chest = world.row("KF Deku Baba Sticks").unwrap();

    let mut without = Exploration::from_roots(&world, PlayerState::new());
    without.explore_all(&mut world).unwrap();
    assert!(!without.visited().is_set(chest.index()));

    let sticks = world.row("Sticks").unwrap();
    world.collect(sticks, 1).unwrap();
    let mut with = Exploration::from_roots(&world, PlayerState::new());
    let reached = with.explore_all(&mut world).unwrap();
    assert!(reached.checks.is_set(chest.index()));
    assert_eq!(reached.events.len(), 1);
}

#[test]
fn here_stays_at_the_current_location() {
    let mut builder = builder();
    builder
        .add_source(&Source::check("Kokiri Forest", "KF Storms Grotto", "here(Sticks)"))
        .unwrap();
    let world = builder.build().unwrap();

    let forest = world.row("Kokiri Forest").unwrap();
    let token = world.row("Token$0000#0000@Kokiri Forest").unwrap();
    assert!(world.edge(forest, token).is_some());
}
