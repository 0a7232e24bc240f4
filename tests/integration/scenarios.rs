//! End-to-end rule scenarios
//!
//! Each rule is compiled through a session and run against hand-built host
//! states, then against a storage-backed world.

use beanstalk::engine::{Age, Exploration, PlayerState, WorldBuilder};
use beanstalk::language::{
    MemoryHost, Session, Source, StaticSettings, SymbolId, Vm, disassemble,
};

fn session() -> Session<StaticSettings> {
    beanstalk::init_logging();
    let mut session = Session::new(StaticSettings::new()).unwrap();
    session
        .declare_tokens(["Kokiri Sword", "Master Sword", "Bottle", "Bottle with Milk"])
        .unwrap();
    session
}

fn id(session: &Session<StaticSettings>, name: &str) -> SymbolId {
    session.symbols().lookup(name).unwrap().id
}

#[test]
fn sword_rule_depends_on_age() {
    let mut session = session();
    let compiled = session
        .compile(&Source::check(
            "Kokiri Forest",
            "KF Midos Top Left Chest",
            "Kokiri_Sword or (is_adult and Master_Sword)",
        ))
        .unwrap();
    let master = id(&session, "Master Sword");
    let kokiri = id(&session, "Kokiri Sword");

    let adult = MemoryHost::new().with(kokiri, 0).with(master, 1).adult(true);
    let child = MemoryHost::new().with(kokiri, 0).with(master, 1).adult(false);
    let mut vm = Vm::new();
    assert!(vm.evaluate(&compiled.tape, session.objects(), &adult).unwrap());
    assert!(!vm.evaluate(&compiled.tape, session.objects(), &child).unwrap());
}

#[test]
fn bottles_collapse_into_one_check() {
    let mut session = session();
    let compiled = session
        .compile(&Source::check(
            "Lon Lon Ranch",
            "LLR Talons Chickens",
            "Bottle or Bottle_with_Milk",
        ))
        .unwrap();
    let listing = disassemble(&compiled.tape).unwrap();
    assert!(listing.contains("CHK_ANY 2"), "{listing}");
    assert!(!listing.contains("NEED_ANY"), "{listing}");

    let bottle = id(&session, "Bottle");
    let milk = id(&session, "Bottle with Milk");
    let mut vm = Vm::new();
    for (bottles, milks) in [(0, 0), (1, 0), (0, 1), (1, 1)] {
        let host = MemoryHost::new().with(bottle, bottles).with(milk, milks);
        let reached = vm.evaluate(&compiled.tape, session.objects(), &host).unwrap();
        assert_eq!(reached, bottles + milks > 0);
    }
}

#[test]
fn sword_rule_in_a_world() {
    let session = Session::new(StaticSettings::new()).unwrap();
    let mut builder = WorldBuilder::new(session).unwrap();
    builder.add_token("Kokiri Sword", &[]).unwrap();
    builder.add_token("Master Sword", &[]).unwrap();
    builder.add_root("Kokiri Forest").unwrap();
    builder
        .add_source(&Source::check(
            "Kokiri Forest",
            "KF Midos Top Left Chest",
            "Kokiri_Sword or (is_adult and Master_Sword)",
        ))
        .unwrap();
    let mut world = builder.build().unwrap();
    let master = world.row("Master Sword").unwrap();
    world.collect(master, 1).unwrap();
    let chest = world.row("KF Midos Top Left Chest").unwrap();

    let mut child = Exploration::from_roots(&world, PlayerState::new());
    child.explore_all(&mut world).unwrap();
    assert!(!child.visited().is_set(chest.index()));

    let mut adult = Exploration::from_roots(&world, PlayerState::new().with_age(Age::Adult));
    let reached = adult.explore_all(&mut world).unwrap();
    assert_eq!(reached.checks.elems(), [chest.index()]);
}
