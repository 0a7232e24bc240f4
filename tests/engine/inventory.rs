//! Integration tests for the storage-backed inventory

use beanstalk_engine::{Age, Inventory, PlayerState, TokenCategory, World, WorldBuilder};
use beanstalk_language::{HostState, Session, StaticSettings};

fn world() -> World {
    let session = Session::new(StaticSettings::new()).unwrap();
    let mut builder = WorldBuilder::new(session).unwrap();
    let tokens: [(&str, Vec<TokenCategory>); 9] = [
        ("Bottle", vec![TokenCategory::Bottle]),
        ("Bottle with Milk", vec![TokenCategory::Bottle]),
        ("Forest Medallion", vec![TokenCategory::Medallion]),
        ("Fire Medallion", vec![TokenCategory::Medallion]),
        ("Kokiri Emerald", vec![TokenCategory::SpiritualStone]),
        ("Piece of Heart", vec![TokenCategory::Heart(1)]),
        ("Heart Container", vec![TokenCategory::Heart(4)]),
        ("Ocarina A Button", vec![]),
        (
            "Zeldas Lullaby",
            vec![TokenCategory::Song(vec![
                "Ocarina A Button".to_string(),
                "Ocarina C up Button".to_string(),
            ])],
        ),
    ];
    for (name, categories) in &tokens {
        builder.add_token(name, categories).unwrap();
    }
    builder.add_token("Ocarina C up Button", &[]).unwrap();
    builder.add_root("Links House").unwrap();
    builder.build().unwrap()
}

fn collect(world: &mut World, name: &str, qty: u32) {
    let row = world.row(name).unwrap();
    world.collect(row, qty).unwrap();
}

#[test]
fn quantities_come_from_storage() {
    let mut world = world();
    collect(&mut world, "Bottle with Milk", 2);
    let milk = world.symbols().lookup("Bottle_with_Milk").unwrap().id;

    let state = PlayerState::new();
    let inventory = Inventory::snapshot(&world, &state).unwrap();
    assert_eq!(inventory.quantity(milk), 2);
    assert!(inventory.has(milk, 2));
    assert!(!inventory.has(milk, 3));
}

#[test]
fn any_bottle_counts() {
    let mut world = world();
    let state = PlayerState::new();
    assert!(!Inventory::snapshot(&world, &state).unwrap().has_bottle());

    collect(&mut world, "Bottle with Milk", 1);
    assert!(Inventory::snapshot(&world, &state).unwrap().has_bottle());
}

#[test]
fn rewards_count_medallions_and_stones() {
    let mut world = world();
    collect(&mut world, "Forest Medallion", 1);
    collect(&mut world, "Fire Medallion", 1);
    collect(&mut world, "Kokiri Emerald", 1);

    let state = PlayerState::new();
    let inventory = Inventory::snapshot(&world, &state).unwrap();
    assert!(inventory.has_medallions(2));
    assert!(!inventory.has_medallions(3));
    assert!(inventory.has_stones(1));
    assert!(inventory.has_dungeon_rewards(3));
    assert!(!inventory.has_dungeon_rewards(4));
}

#[test]
fn hearts_are_counted_in_quarters() {
    let mut world = world();
    let state = PlayerState::new();
    assert_eq!(Inventory::snapshot(&world, &state).unwrap().hearts(), 3);

    collect(&mut world, "Piece of Heart", 3);
    assert_eq!(Inventory::snapshot(&world, &state).unwrap().hearts(), 3);

    collect(&mut world, "Piece of Heart", 1);
    collect(&mut world, "Heart Container", 1);
    let inventory = Inventory::snapshot(&world, &state).unwrap();
    assert_eq!(inventory.hearts(), 5);
    assert!(inventory.has_hearts(5));
    assert!(!inventory.has_hearts(6));
}

#[test]
fn songs_need_notes_only_when_shuffled() {
    let mut world = world();
    let lullaby = world.symbols().lookup("Zeldas Lullaby").unwrap().id;

    let plain = PlayerState::new();
    assert!(Inventory::snapshot(&world, &plain).unwrap().has_all_notes_for_song(lullaby));

    let shuffled = PlayerState::new().with_shuffled_notes(true);
    collect(&mut world, "Ocarina A Button", 1);
    assert!(!Inventory::snapshot(&world, &shuffled).unwrap().has_all_notes_for_song(lullaby));

    collect(&mut world, "Ocarina C up Button", 1);
    assert!(Inventory::snapshot(&world, &shuffled).unwrap().has_all_notes_for_song(lullaby));
}

#[test]
fn age_and_time_come_from_the_player() {
    let world = world();
    let state = PlayerState::new()
        .with_age(Age::Adult)
        .with_starting_age(Age::Child)
        .with_times(true, false, false)
        .with_shortcuts("Deku Tree");
    let inventory = Inventory::snapshot(&world, &state).unwrap();

    assert!(inventory.is_adult());
    assert!(!inventory.is_child());
    assert!(!inventory.is_starting_age());
    assert!(inventory.at_day());
    assert!(!inventory.at_night());
    assert!(!inventory.at_dampe_time());
    assert!(inventory.region_has_shortcuts("Deku Tree"));
    assert!(!inventory.region_has_shortcuts("Jabu Jabus Belly"));
}
