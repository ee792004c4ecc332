use super::common::{error_message, run, stored_body};
use fieldguard::{
    Flow, MemoryExchange, RejectionKind, SizeBounds, Validator, check, checks, sanitizers,
};
use pretty_assertions::assert_eq;
use serde_json::json;

fn phone_form() -> fieldguard::Guard {
    Validator::new().form([
        check("name").exists(),
        check(
            "phone",
        ).if_value([checks::is_numeric(), checks::has_length(SizeBounds::between(10, 15))]),
    ])
}

#[test]
fn valid_form() {
    let (flow, exchange) = run(
        &phone_form(),
        MemoryExchange::new().with_body("name=John&phone=1234567890"),
    );

    assert_eq!(flow, Flow::Continue);
    assert_eq!(stored_body(&exchange), json!({ "name": "John", "phone": "1234567890" }));
}

#[test]
fn missing_required_field() {
    let (flow, exchange) = run(&phone_form(), MemoryExchange::new().with_body("phone=1234567890"));

    assert_eq!(flow, Flow::Halt);
    assert_eq!(error_message(&exchange), Some("Invalid name input. Cause: it is required."));
}

#[test]
fn phone_not_numeric() {
    let (_, exchange) = run(
        &phone_form(),
        MemoryExchange::new().with_body("name=John&phone=not-a-number"),
    );
    assert_eq!(
        error_message(&exchange),
        Some("Invalid phone input. Cause: it is not a valid number.")
    );
}

#[test]
fn no_form_data() {
    let guard = phone_form();
    let mut exchange = MemoryExchange::new();
    let rejection = guard.inspect(&mut exchange).unwrap_err();
    assert_eq!(rejection.kind, RejectionKind::MissingFormData);

    let (flow, exchange) = run(&guard, MemoryExchange::new());
    assert_eq!(flow, Flow::Halt);
    assert_eq!(error_message(&exchange), Some("Invalid form data"));
}

#[test]
fn repeated_field_keeps_last_value() {
    let guard = Validator::new().form([check("tag").exists()]);
    let (_, exchange) = run(&guard, MemoryExchange::new().with_body("tag=a&tag=b"));

    assert_eq!(stored_body(&exchange), json!({ "tag": "b" }));
}

#[test]
fn form_values_are_sanitized_in_place() {
    let guard = Validator::new()
        .form([check("name").sanitize_with([sanitizers::upper_case()]).exists()]);
    let (flow, exchange) = run(&guard, MemoryExchange::new().with_body("name=ada+lovelace"));

    assert_eq!(flow, Flow::Continue);
    assert_eq!(stored_body(&exchange), json!({ "name": "ADA LOVELACE" }));
}
