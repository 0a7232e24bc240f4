//! Integration tests for the compile pipeline
//!
//! Rule text goes in through a [`Session`]; tapes come out and are run
//! against a [`MemoryHost`].

use beanstalk_foundation::ErrorKind;
use beanstalk_language::{
    MemoryHost, Session, Source, StaticSettings, SymbolId, Vm, disassemble, parse, render,
};

fn session(settings: StaticSettings) -> Session<StaticSettings> {
    let mut session = Session::new(settings).unwrap();
    session
        .declare_tokens(["Master Sword", "Hookshot", "Sticks", "Deku Shield"])
        .unwrap();
    session
        .declare_helpers([
            ("can_use(item)", "is_adult and item"),
            ("can_cross_gap", "can_use(Hookshot) or Sticks"),
        ])
        .unwrap();
    session
}

fn token(session: &Session<StaticSettings>, name: &str) -> SymbolId {
    session.symbols().lookup(name).unwrap().id
}

fn run(session: &Session<StaticSettings>, tape: &[u8], host: &MemoryHost) -> bool {
    Vm::new().evaluate(tape, session.objects(), host).unwrap()
}

// =============================================================================
// Helpers
// =============================================================================

#[test]
fn helpers_inline_with_their_arguments() {
    let mut session = session(StaticSettings::new());
    let compiled = session
        .compile(&Source::check("Kokiri Forest", "Sword Chest", "can_use(Master_Sword)"))
        .unwrap();
    let master = token(&session, "Master Sword");

    let adult = MemoryHost::new().with(master, 1).adult(true);
    let child = MemoryHost::new().with(master, 1).adult(false);
    assert!(run(&session, &compiled.tape, &adult));
    assert!(!run(&session, &compiled.tape, &child));
}

#[test]
fn helpers_call_helpers() {
    let mut session = session(StaticSettings::new());
    let compiled = session
        .compile(&Source::transit("Lake Hylia", "Water Temple", "can_cross_gap"))
        .unwrap();
    let hookshot = token(&session, "Hookshot");
    let sticks = token(&session, "Sticks");

    assert!(run(&session, &compiled.tape, &MemoryHost::new().with(sticks, 1)));
    assert!(run(
        &session,
        &compiled.tape,
        &MemoryHost::new().with(hookshot, 1).adult(true)
    ));
    assert!(!run(&session, &compiled.tape, &MemoryHost::new().with(hookshot, 1)));
}

// =============================================================================
// Settings and Tricks
// =============================================================================

#[test]
fn disabled_tricks_fold_to_the_rest_of_the_rule() {
    let mut session = session(StaticSettings::new());
    let compiled = session
        .compile(&Source::check(
            "Kokiri Forest",
            "KF Grotto",
            "logic_grottos_without_agony or Sticks",
        ))
        .unwrap();
    let sticks = token(&session, "Sticks");
    assert!(!run(&session, &compiled.tape, &MemoryHost::new()));
    assert!(run(&session, &compiled.tape, &MemoryHost::new().with(sticks, 1)));
}

#[test]
fn known_settings_leave_no_setting_loads() {
    let mut session = session(StaticSettings::new().with("open_forest", "open"));
    session.declare_settings(["open_forest"]).unwrap();
    let compiled = session
        .compile(&Source::transit(
            "Kokiri Forest",
            "Lost Woods",
            "open_forest == 'open' or Deku_Shield",
        ))
        .unwrap();
    assert_eq!(disassemble(&compiled.tape).unwrap().lines().next(), Some("0000 PUSH_T"));
}

#[test]
fn unknown_settings_load_at_run_time() {
    let mut session = session(StaticSettings::new());
    session.declare_settings(["open_forest"]).unwrap();
    let compiled = session
        .compile(&Source::transit(
            "Kokiri Forest",
            "Lost Woods",
            "open_forest == 'open'",
        ))
        .unwrap();
    let open = MemoryHost::new().with_setting("open_forest", "open");
    let closed = MemoryHost::new().with_setting("open_forest", "closed");
    assert!(run(&session, &compiled.tape, &open));
    assert!(!run(&session, &compiled.tape, &closed));

    let err = Vm::new()
        .evaluate(&compiled.tape, session.objects(), &MemoryHost::new())
        .unwrap_err();
    assert!(err.is_vm_fault());
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn one_bad_rule_does_not_stop_the_rest() {
    let mut session = session(StaticSettings::new());
    let sources = [
        Source::check("Kokiri Forest", "A", "Sticks and ("),
        Source::check("Kokiri Forest", "B", "can_use(Sticks, Hookshot)"),
        Source::check("Kokiri Forest", "C", "Sticks"),
    ];
    let report = session.compile_all(&sources);
    assert_eq!(report.compiled.len(), 1);
    assert_eq!(report.failed.len(), 2);

    let parse_failure = &report.failed[0];
    assert!(matches!(parse_failure.kind, ErrorKind::ParseError { .. }));
    let context = parse_failure.context.as_ref().unwrap();
    assert_eq!(context.source.as_deref(), Some("Sticks and ("));

    assert!(matches!(report.failed[1].kind, ErrorKind::ArityMismatch { .. }));
}

// =============================================================================
// Rendering
// =============================================================================

#[test]
fn render_reaches_a_fixpoint() {
    let rules = [
        "Kokiri_Sword or (is_adult and Master_Sword)",
        "not (Sticks and has(Deku_Shield, 1))",
        "at('Lost Woods', Sticks) or here(is_child)",
        "'Deku Tree' in dungeon_shortcuts",
        "(Hookshot, 2) and skipped_trials[Forest]",
        "bridge != 'open' and 3 < count",
    ];
    for rule in rules {
        let once = render(&parse(rule).unwrap());
        let twice = render(&parse(&once).unwrap());
        assert_eq!(once, twice, "{rule}");
        assert_eq!(parse(&once).unwrap(), parse(rule).unwrap(), "{rule}");
    }
}
