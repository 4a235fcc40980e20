//! Unit tests for the identifier newtypes

use core_kernel::{
    UserId, ClientId, AgentId, PolicyId, BeneficiaryId,
    InvoiceId, PaymentId, ClaimId, NoteId,
};
use proptest::prelude::*;
use uuid::Uuid;

mod policy_id_tests {
    use super::*;

    #[test]
    fn test_new_generates_unique_ids() {
        let id1 = PolicyId::new();
        let id2 = PolicyId::new();
        assert_ne!(id1, id2);
    }

    #[test]
    fn test_new_v7_generates_time_ordered_ids() {
        let id1 = PolicyId::new_v7();
        std::thread::sleep(std::time::Duration::from_millis(1));
        let id2 = PolicyId::new_v7();
        assert!(id1 < id2);
    }

    #[test]
    fn test_from_str_with_prefix() {
        let original = PolicyId::new();
        let parsed: PolicyId = original.to_string().parse().unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_json_is_a_bare_uuid() {
        let uuid = Uuid::new_v4();
        let id = PolicyId::from_uuid(uuid);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{}\"", uuid));
    }
}

#[test]
fn test_prefixes() {
    assert_eq!(UserId::prefix(), "USR");
    assert_eq!(ClientId::prefix(), "CLI");
    assert_eq!(AgentId::prefix(), "AGT");
    assert_eq!(BeneficiaryId::prefix(), "BEN");
    assert_eq!(InvoiceId::prefix(), "FAC");
    assert_eq!(PaymentId::prefix(), "PAG");
    assert_eq!(ClaimId::prefix(), "SIN");
    assert_eq!(NoteId::prefix(), "NOT");
}

#[test]
fn test_invalid_string_is_rejected() {
    assert!("SIN-not-a-uuid".parse::<ClaimId>().is_err());
}

proptest! {
    #[test]
    fn prop_display_then_parse_is_identity(bytes in any::<[u8; 16]>()) {
        let id = InvoiceId::from_uuid(Uuid::from_bytes(bytes));
        let parsed: InvoiceId = id.to_string().parse().unwrap();
        prop_assert_eq!(id, parsed);
    }
}
