//! Integration tests for the symbol table

use beanstalk_foundation::ErrorKind;
use beanstalk_language::{SymbolKind, SymbolTable, escape_name};

#[test]
fn indexes_follow_declaration_order() {
    let mut symbols = SymbolTable::new();
    let ids = symbols
        .declare_many(SymbolKind::Token, ["Bow", "Hookshot", "Bow"])
        .unwrap();
    assert_eq!(ids[0].index(), 0);
    assert_eq!(ids[1].index(), 1);
    assert_eq!(ids[2], ids[0]);
    assert_eq!(symbols.size(), 2);
}

#[test]
fn aliases_do_not_count_toward_size() {
    let mut symbols = SymbolTable::new();
    let milk = symbols.declare("Bottle with Milk", SymbolKind::Token).unwrap();
    symbols.alias(milk, &escape_name("Bottle with Milk")).unwrap();

    assert_eq!(symbols.lookup("Bottle_with_Milk").unwrap().id, milk);
    assert_eq!(symbols.size(), 1);
    assert_eq!(symbols.alias_count(), 1);
    assert_eq!(symbols.alias_count() + symbols.size(), symbols.raw_size());
}

#[test]
fn events_refine_tokens() {
    let mut symbols = SymbolTable::new();
    let id = symbols.declare("Deku Tree Clear", SymbolKind::Token).unwrap();
    assert_eq!(symbols.declare("Deku Tree Clear", SymbolKind::Event).unwrap(), id);
    symbols.declare("Deku Tree Clear", SymbolKind::Token).unwrap();
    assert_eq!(symbols.kind_of(id), SymbolKind::Event);
}

#[test]
fn conflicting_kinds_leave_the_table_alone() {
    let mut symbols = SymbolTable::new();
    let id = symbols.declare("Kokiri Forest", SymbolKind::Location).unwrap();
    let err = symbols
        .declare("Kokiri Forest", SymbolKind::Setting)
        .unwrap_err();
    assert!(matches!(err.kind, ErrorKind::SymbolRedeclared { .. }));
    assert_eq!(symbols.kind_of(id), SymbolKind::Location);
    assert_eq!(symbols.size(), 1);
}

#[test]
fn escaping_drops_punctuation() {
    assert_eq!(escape_name("Gerudo's Fortress"), "Gerudos_Fortress");
    assert_eq!(escape_name("Bottle with Big Poe"), "Bottle_with_Big_Poe");
    assert_eq!(escape_name("Deku Nut Capacity (30)"), "Deku_Nut_Capacity_30");
}
