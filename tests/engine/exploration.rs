//! Integration tests for exploration
//!
//! Two ages explore one world; whatever one collects the other can use.

use beanstalk_engine::{Age, Exploration, ExplorationConfig, PlayerState, World, WorldBuilder};
use beanstalk_foundation::ErrorKind;
use beanstalk_language::{Session, Source, StaticSettings, VmConfig};

fn temple_world() -> World {
    let session = Session::new(StaticSettings::new()).unwrap();
    let mut builder = WorldBuilder::new(session).unwrap();
    builder.add_token("Kokiri Emerald", &[]).unwrap();
    builder.add_token("Song of Time", &[]).unwrap();
    builder.add_token("Master Sword", &[]).unwrap();
    builder.add_root("Market").unwrap();

    let sources = [
        Source::transit("Market", "Temple of Time", "True"),
        Source::check("Market", "Market Treasure Chest Game Reward", "is_child"),
        Source::event("Temple of Time", "Time Travel", "Kokiri_Emerald and Song_of_Time"),
        Source::check("Temple of Time", "ToT Master Sword Pedestal", "Time_Travel"),
        Source::transit("Temple of Time", "Sacred Forest Meadow", "is_adult and Master_Sword"),
    ];
    assert!(builder.add_sources(&sources).is_empty());
    builder.place("Market Treasure Chest Game Reward", "Song of Time").unwrap();
    builder.place("ToT Master Sword Pedestal", "Master Sword").unwrap();
    builder.build().unwrap()
}

fn collected(world: &World, name: &str) -> u32 {
    world.collected(world.row(name).unwrap())
}

#[test]
fn child_alone_stalls_without_the_emerald() {
    let mut world = temple_world();
    let mut child = Exploration::from_roots(&world, PlayerState::new());
    child.explore_all(&mut world).unwrap();

    assert_eq!(collected(&world, "Song of Time"), 1);
    assert_eq!(collected(&world, "Time Travel"), 0);
    let err = child.explore(&mut world).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::NoProgress));
}

#[test]
fn adult_uses_what_the_child_found() {
    let mut world = temple_world();
    let emerald = world.row("Kokiri Emerald").unwrap();
    world.collect(emerald, 1).unwrap();

    let mut child = Exploration::from_roots(&world, PlayerState::new());
    child.explore_all(&mut world).unwrap();
    assert_eq!(collected(&world, "Time Travel"), 1);
    assert_eq!(collected(&world, "Master Sword"), 1);

    let adult_state = PlayerState::new().with_age(Age::Adult);
    let mut adult = Exploration::from_roots(&world, adult_state);
    let reached = adult.explore_all(&mut world).unwrap();
    let meadow = world.row("Sacred Forest Meadow").unwrap();
    assert!(reached.locations.is_set(meadow.index()));
    // the adult cannot play the treasure chest game
    let reward = world.row("Market Treasure Chest Game Reward").unwrap();
    assert!(!adult.visited().is_set(reward.index()));
}

#[test]
fn vm_limits_apply_to_every_rule() {
    let mut world = temple_world();
    let config = ExplorationConfig::default().with_vm(VmConfig::default().with_stack_size(0));
    let mut exploration = Exploration::with_config(PlayerState::new(), config);
    exploration.start_at(world.row("Market").unwrap());

    let err = exploration.explore(&mut world).unwrap_err();
    assert!(err.is_vm_fault());
}
