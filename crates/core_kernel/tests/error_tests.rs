//! Tests for core_kernel error types

use core_kernel::error::CoreError;

#[test]
fn test_core_error_validation() {
    let error = CoreError::validation("Invalid input");

    match error {
        CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
        _ => panic!("Expected Validation error"),
    }
}

#[test]
fn test_core_error_invalid_state() {
    let error = CoreError::invalid_state("Cannot transition from activa to cotizacion");

    match error {
        CoreError::InvalidStateTransition(msg) => assert!(msg.contains("Cannot transition")),
        _ => panic!("Expected InvalidStateTransition error"),
    }
}

#[test]
fn test_core_error_not_found() {
    let error = CoreError::not_found("Policy not found");

    match error {
        CoreError::NotFound(msg) => assert_eq!(msg, "Policy not found"),
        _ => panic!("Expected NotFound error"),
    }
}

#[test]
fn test_unknown_value_names_kind_and_value() {
    let error = CoreError::unknown_value("policy status", "borrador");
    let display = error.to_string();

    assert!(display.contains("policy status"));
    assert!(display.contains("borrador"));
}
