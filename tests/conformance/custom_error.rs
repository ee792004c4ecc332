use super::common::run;
use fieldguard::{
    DefaultErrorHandler, Exchange, Flow, GuardConfig, MemoryExchange, Rejection, RejectionKind,
    Validator, check,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::{Arc, Mutex};

fn coded_validator() -> Validator {
    Validator::new().with_error_handler(|exchange: &mut dyn Exchange, rejection: &Rejection| {
        exchange.set_status(400);
        exchange.set_response_body(json!({ "code": 400, "message": rejection.message() }));
    })
}

#[test]
fn custom_handler_shapes_the_response() {
    let validator = coded_validator();
    let guard = validator.query([validator.check("name").exists()]);
    let (flow, exchange) = run(&guard, MemoryExchange::new());

    assert_eq!(flow, Flow::Halt);
    assert_eq!(exchange.status(), Some(400));
    assert_eq!(
        exchange.response_body(),
        Some(&json!({ "code": 400, "message": "Invalid name input. Cause: it is required." }))
    );
}

#[test]
fn custom_handler_not_called_on_success() {
    let validator = coded_validator();
    let guard = validator.query([check("name").exists()]);
    let (flow, exchange) = run(&guard, MemoryExchange::new().with_query("name=John"));

    assert_eq!(flow, Flow::Continue);
    assert_eq!(exchange.status(), None);
}

#[test]
fn handler_receives_structured_rejection() {
    let seen: Arc<Mutex<Vec<Rejection>>> = Arc::default();
    let sink = Arc::clone(&seen);
    let validator =
        Validator::new().with_error_handler(move |_: &mut dyn Exchange, rejection: &Rejection| {
            sink.lock().unwrap().push(rejection.clone());
        });
    let guard = validator.body([check("age").exists()]);

    run(&guard, MemoryExchange::new().with_body("{}"));
    run(&guard, MemoryExchange::new());

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 2);
    assert_eq!(seen[0].kind, RejectionKind::Required);
    assert_eq!(seen[0].field.as_deref(), Some("age"));
    assert_eq!(seen[1].kind, RejectionKind::MissingBody);
}

#[test]
fn failure_status_comes_from_config() {
    let validator = Validator::with_config(GuardConfig {
        failure_status: 400,
        ..GuardConfig::default()
    });
    let guard = validator.query([check("name").exists()]);
    let (_, exchange) = run(&guard, MemoryExchange::new());

    assert_eq!(exchange.status(), Some(400));
    assert_eq!(
        exchange.response_body(),
        Some(&json!({ "error": "Invalid name input. Cause: it is required." }))
    );
}

#[test]
fn guards_keep_the_handler_they_were_built_with() {
    let validator = Validator::new();
    let default_guard = validator.query([check("name").exists()]);
    let custom = validator.with_handler(DefaultErrorHandler { status: 418 });
    let custom_guard = custom.query([check("name").exists()]);

    let (_, exchange) = run(&default_guard, MemoryExchange::new());
    assert_eq!(exchange.status(), Some(422));

    let (_, exchange) = run(&custom_guard, MemoryExchange::new());
    assert_eq!(exchange.status(), Some(418));
}

#[test]
fn rejection_serializes_with_snake_case_kind() {
    let rejection = Rejection::required("name", None);
    assert_eq!(
        serde_json::to_value(&rejection).unwrap(),
        json!({
            "kind": "required",
            "field": "name",
            "message": "Invalid name input. Cause: it is required.",
        })
    );
    assert_eq!(rejection.to_string(), "Invalid name input. Cause: it is required.");
}
