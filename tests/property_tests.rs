/// Property-based tests using proptest
/// Tests invariants that should hold for all inputs
use proptest::prelude::*;
use rust_leads_api::validation::{is_valid_email, parse_submission};
use serde_json::json;

// Property: email validation should never panic
proptest! {
    #[test]
    fn email_validation_never_panics(email in "\\PC*") {
        let _ = is_valid_email(&email);
    }

    #[test]
    fn well_formed_emails_accepted(
        local in "[a-z0-9._%+-]{1,12}",
        domain in "[a-z0-9-]{1,12}",
        tld in "[a-z]{2,6}"
    ) {
        let email = format!("{}@{}.{}", local, domain, tld);
        prop_assert!(is_valid_email(&email));
    }

    #[test]
    fn embedded_whitespace_rejected(prefix in "[a-z]{1,5}", suffix in "[a-z]{1,5}") {
        let email = format!("{} {}@example.com", prefix, suffix);
        prop_assert!(!is_valid_email(&email));
    }

    #[test]
    fn domain_without_dot_rejected(local in "[a-z]{1,10}", domain in "[a-z]{1,10}") {
        let email = format!("{}@{}", local, domain);
        prop_assert!(!is_valid_email(&email));
    }
}

// Property: the parser is total over arbitrary input
proptest! {
    #[test]
    fn parser_never_panics(body in proptest::collection::vec(any::<u8>(), 0..512)) {
        let _ = parse_submission(&body);
    }

    // The core invariant: a Lead is never created with an invalid or missing
    // email. Honeypot submissions are never persisted at all, so for clean
    // submissions no Submission with a bad email ever leaves the validator.
    #[test]
    fn accepted_clean_submissions_always_carry_valid_email(email in "\\PC{0,40}") {
        let body = serde_json::to_vec(&json!({ "email": email })).unwrap();
        if let Ok(sub) = parse_submission(&body) {
            prop_assert!(!sub.email.is_empty());
            prop_assert!(is_valid_email(&sub.email));
        }
    }

    // A tripped honeypot always yields a deflectable submission, whatever
    // the bot put in the email field
    #[test]
    fn honeypot_payloads_always_parse(email in "\\PC{0,40}") {
        let body = serde_json::to_vec(&json!({ "email": email, "company": "Acme" })).unwrap();
        let sub = parse_submission(&body);
        prop_assert!(sub.is_ok());
        prop_assert!(!sub.unwrap().company.is_empty());
    }

    #[test]
    fn optional_fields_never_block_a_valid_email(
        name in "\\PC{0,20}",
        role in "\\PC{0,20}",
        message in "\\PC{0,40}"
    ) {
        let body = serde_json::to_vec(&json!({
            "email": "jane@x.com",
            "name": name,
            "role": role,
            "message": message
        })).unwrap();
        prop_assert!(parse_submission(&body).is_ok());
    }
}
