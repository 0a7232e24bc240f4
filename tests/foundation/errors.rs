//! Integration tests for Error types
//!
//! Tests error construction, display, context, and joining.

use beanstalk_foundation::{Error, ErrorContext, ErrorKind, VmFault};

// =============================================================================
// Error Construction
// =============================================================================

#[test]
fn error_undefined_symbol() {
    let err = Error::undefined_symbol("Kokiri Sword");
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
    assert!(format!("{err}").contains("Kokiri Sword"));
}

#[test]
fn error_arity_mismatch() {
    let err = Error::arity_mismatch("2", 3);
    let msg = format!("{err}");
    assert!(msg.contains('2'));
    assert!(msg.contains('3'));
}

#[test]
fn error_parse_position() {
    let err = Error::new(ErrorKind::ParseError {
        message: "expected ')'".to_string(),
        line: 1,
        column: 9,
        context: "Sticks and (".to_string(),
    });
    assert_eq!(format!("{err}"), "parse error at 1:9: expected ')'");
}

// =============================================================================
// VM Faults
// =============================================================================

#[test]
fn vm_faults_are_distinguishable() {
    let fault = Error::vm(VmFault::StackOverflow { ip: 4, limit: 2 });
    assert!(fault.is_vm_fault());
    assert_eq!(format!("{fault}"), "vm fault: stack overflow at 4 (limit 2)");

    assert!(!Error::new(ErrorKind::NoProgress).is_vm_fault());
    assert!(!Error::internal("corrupt table").is_vm_fault());
}

#[test]
fn unknown_opcode_display() {
    let err = Error::vm(VmFault::UnknownOpcode { opcode: 0x99, ip: 1 });
    assert!(format!("{err}").contains("0x99"));
}

// =============================================================================
// Context
// =============================================================================

#[test]
fn context_frames_accumulate() {
    let err = Error::undefined_symbol("Sticks")
        .in_frame("Kokiri Forest -> Lost Woods")
        .in_frame("compile");
    let context = err.context.unwrap();
    assert_eq!(context.stack, ["Kokiri Forest -> Lost Woods", "compile"]);
    assert!(context.source.is_none());
}

#[test]
fn context_source_and_position() {
    let context = ErrorContext::new()
        .with_source("Sticks and (")
        .with_position(1, 12);
    let err = Error::internal("boom").with_context(context.clone());
    assert_eq!(err.context.unwrap().line, Some(1));
    assert!(format!("{context}").starts_with("at Sticks and (:1:12"));
}

// =============================================================================
// Joining
// =============================================================================

#[test]
fn join_keeps_a_single_error() {
    let err = Error::join(vec![Error::undefined_symbol("a")]);
    assert!(matches!(err.kind, ErrorKind::UndefinedSymbol(_)));
}

#[test]
fn join_lists_every_error() {
    let err = Error::join(vec![
        Error::undefined_symbol("a"),
        Error::new(ErrorKind::UnknownColumn("Name".to_string())),
    ]);
    let ErrorKind::Joined(errors) = &err.kind else {
        panic!("expected joined, got {err}");
    };
    assert_eq!(errors.len(), 2);
    let msg = format!("{err}");
    assert!(msg.starts_with("2 errors"));
    assert!(msg.contains("Name"));
}

#[test]
fn joining_nothing_is_internal() {
    let err = Error::join(Vec::new());
    assert!(matches!(err.kind, ErrorKind::Internal(_)));
    assert!(format!("{err}").contains("empty error list"));
}
