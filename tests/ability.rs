//! Ability construction tests
//!
//! These tests verify that an ability grants exactly the decoded flags, the
//! extra capabilities and `read`, and that grants ignore the subject.

use capgate::{build_ability_for, Ability, AclError, Can, FlagRegistry, PermissionValue};
use proptest::prelude::*;

fn crud() -> FlagRegistry {
    FlagRegistry::new(["CAN_READ", "CAN_WRITE", "CAN_DELETE"]).unwrap()
}

#[test]
fn scenario_five_with_premium() {
    let ability = build_ability_for(&crud(), Some("5"), ["COMPANY_SUBSCRIPTION_PREMIUM"], "Lead").unwrap();
    assert!(!ability.can("CAN_WRITE", "Lead"));
    assert!(ability.can("CAN_DELETE", "Lead"));
    assert!(ability.can("CAN_READ", "Lead"));
    assert!(ability.can("COMPANY_SUBSCRIPTION_PREMIUM", "Lead"));
    assert!(ability.can("read", "Lead"));
    assert_eq!(
        ability.granted(),
        vec!["CAN_DELETE", "CAN_READ", "COMPANY_SUBSCRIPTION_PREMIUM", "read"]
    );
}

#[test]
fn absent_profile_value_is_zero() {
    let ability = build_ability_for(&crud(), None, Vec::<String>::new(), "all").unwrap();
    assert_eq!(ability.granted(), vec!["read"]);
}

#[test]
fn bad_profile_value_fails_the_build() {
    let r = build_ability_for(&crud(), Some("five"), Vec::<String>::new(), "all");
    assert!(matches!(r, Err(AclError::InvalidPermissionValue { .. })));
}

#[test]
fn builder_keeps_subject_for_detection_only() {
    let ability = Ability::builder(&crud())
        .permissions(PermissionValue::from(2u64))
        .subject("Document")
        .build();
    assert_eq!(ability.subject(), "Document");
    assert!(ability.can("CAN_WRITE", "Lead"));
}

/// Names are matched exactly
#[test]
fn grants_are_case_sensitive() {
    let ability = Ability::builder(&crud()).extra("LEAD_VIEW").build();
    assert!(!ability.can("lead_view", "all"));
    assert!(!ability.can("READ", "all"));
    assert!(!ability.can("", "all"));
}

#[test]
fn unrestricted_grants_everything() {
    let ability = Ability::unrestricted();
    assert!(ability.is_unrestricted());
    assert!(ability.can("ANYTHING", "Anything"));
}

/// Every subject currently sees the same grants. This documents present
/// behavior rather than an intended subject-scoped model.
#[test]
fn subject_does_not_scope_grants() {
    let ability = build_ability_for(&crud(), Some("1"), ["X"], "Lead").unwrap();
    for subject in ["Lead", "Product", "all", ""] {
        assert!(ability.can("CAN_READ", subject));
        assert!(ability.can("X", subject));
        assert!(!ability.can("CAN_DELETE", subject));
    }
}

proptest! {
    #[test]
    fn read_is_always_granted(v in any::<u64>(), extras in prop::collection::vec("[A-Z_]{1,12}", 0..5), subject in ".*") {
        let ability = build_ability_for(&crud(), Some(v.to_string().as_str()), extras, "all").unwrap();
        prop_assert!(ability.can("read", &subject));
    }

    #[test]
    fn extras_are_granted_regardless_of_bits(v in any::<u64>(), extras in prop::collection::vec("[A-Z][A-Z_]{0,15}", 0..8)) {
        let ability = build_ability_for(&crud(), Some(v.to_string().as_str()), extras.clone(), "all").unwrap();
        for e in &extras {
            prop_assert!(ability.can(e, "Lead"));
        }
    }

    #[test]
    fn subject_independence(v in 0u64..8, s1 in "[A-Za-z]{0,8}", s2 in "[A-Za-z]{0,8}") {
        let ability = build_ability_for(&crud(), Some(v.to_string().as_str()), ["E"], "all").unwrap();
        for name in ["CAN_READ", "CAN_WRITE", "CAN_DELETE", "E", "read", "other"] {
            prop_assert_eq!(ability.can(name, &s1), ability.can(name, &s2));
        }
    }
}
