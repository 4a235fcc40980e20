//! Custom Test Assertions
//!
//! Assertion helpers for domain types with messages that name the entity.

use rust_decimal::Decimal;

use core_kernel::PortError;
use domain_billing::{Invoice, InvoiceStatus};
use domain_claims::{Claim, ClaimStatus};
use domain_policy::{Policy, PolicyStatus};

/// Asserts the status of a policy
pub fn assert_policy_status(policy: &Policy, expected: PolicyStatus) {
    assert_eq!(
        policy.status(),
        expected,
        "policy {} is {}, expected {}",
        policy.policy_number(),
        policy.status(),
        expected
    );
}

/// Asserts the status of an invoice
pub fn assert_invoice_status(invoice: &Invoice, expected: InvoiceStatus) {
    assert_eq!(
        invoice.status,
        expected,
        "invoice {} is {}, expected {}",
        invoice.invoice_number,
        invoice.status.as_str(),
        expected.as_str()
    );
}

/// Asserts the status of a claim and, when given, its approved amount
pub fn assert_claim_resolved(claim: &Claim, expected: ClaimStatus, approved: Option<Decimal>) {
    assert_eq!(
        claim.status,
        expected,
        "claim {} is {}, expected {}",
        claim.claim_number,
        claim.status.as_str(),
        expected.as_str()
    );
    if approved.is_some() {
        assert_eq!(claim.amount_approved, approved, "approved amount of {}", claim.claim_number);
    }
    if expected.is_closed() {
        assert!(claim.resolution_date.is_some(), "closed claim {} has no resolution date", claim.claim_number);
    }
}

/// Asserts that a port call failed with a uniqueness conflict
pub fn assert_conflict<T: std::fmt::Debug>(result: Result<T, PortError>) {
    match result {
        Err(e) if e.is_conflict() => {}
        other => panic!("expected a conflict, got {other:?}"),
    }
}

/// Asserts that a port call failed because the entity does not exist
pub fn assert_not_found<T: std::fmt::Debug>(result: Result<T, PortError>) {
    match result {
        Err(e) if e.is_not_found() => {}
        other => panic!("expected not found, got {other:?}"),
    }
}
