//! Integration tests for the lexer

use beanstalk_language::{Lexer, TokenKind};
use proptest::prelude::*;

const CORPUS: [&str; 6] = [
    "Kokiri_Sword or (is_adult and Master_Sword)",
    "Bottle or Bottle_with_Milk",
    "at('Lost Woods', can_use(Sticks))",
    "has(Gold_Skulltula_Token, 10) and not is_child",
    "open_forest == 'closed' or 'Deku Tree' in dungeon_shortcuts",
    "skipped_trials[Forest] or (Progressive_Strength_Upgrade, 2)",
];

#[test]
fn well_formed_rules_end_in_eof() {
    for rule in CORPUS {
        let tokens = Lexer::tokenize_all(rule);
        assert_eq!(tokens.last().map(|t| &t.kind), Some(&TokenKind::Eof), "{rule}");
        assert!(!tokens.iter().any(|t| matches!(t.kind, TokenKind::Error(_))));
    }
}

#[test]
fn malformed_inputs_report_positions() {
    let cases = [("99'", 2), ("Compiler'", 8), ("(Compiler", 9)];
    for (input, start) in cases {
        let tokens = Lexer::tokenize_all(input);
        let last = tokens.last().unwrap();
        assert!(matches!(last.kind, TokenKind::Error(_)), "{input}");
        assert_eq!(last.span.start, start, "{input}");
    }
}

#[test]
fn spans_slice_the_source() {
    let rule = "has(Bombchus, 5)";
    let tokens = Lexer::tokenize_all(rule);
    assert_eq!(tokens[2].text(rule), "Bombchus");
    assert_eq!(tokens[4].kind, TokenKind::Number(5.0));
}

proptest! {
    #[test]
    fn lexing_always_terminates(source in "[a-zA-Z0-9_ ()\\[\\],'=!<>\n]{0,64}") {
        let tokens = Lexer::tokenize_all(&source);
        let last = tokens.last().unwrap();
        prop_assert!(matches!(last.kind, TokenKind::Eof | TokenKind::Error(_)));
        let terminals = tokens
            .iter()
            .filter(|t| matches!(t.kind, TokenKind::Eof | TokenKind::Error(_)))
            .count();
        prop_assert_eq!(terminals, 1);
    }
}
