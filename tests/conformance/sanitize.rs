use super::common::{json_request, run, stored_body};
use fieldguard::{Flow, MemoryExchange, Sanitizer, SizeBounds, Validator, check, checks, sanitizers};
use pretty_assertions::assert_eq;
use serde_json::json;

const SCRIPT: &str = r#"<script>alert("hi")</script>"#;
const ESCAPED: &str = "&lt;script&gt;alert(&quot;hi&quot;)&lt;/script&gt;";

fn sanitized_query(sanitizer: Sanitizer, raw_query: &str) -> Option<String> {
    let guard = Validator::new().query([check("name").sanitize_with([sanitizer]).exists()]);
    let (flow, exchange) = run(&guard, MemoryExchange::new().with_query(raw_query));
    assert_eq!(flow, Flow::Continue);
    assert!(exchange.query_modified());
    exchange.query_param("name").map(str::to_string)
}

// ─── query ───────────────────────────────────────────────────────────────────

#[test]
fn query_escape() {
    let raw = format!("name={}", SCRIPT);
    assert_eq!(sanitized_query(sanitizers::escape(), &raw).as_deref(), Some(ESCAPED));
}

#[test]
fn query_lower_case() {
    assert_eq!(
        sanitized_query(sanitizers::lower_case(), "name=HelloWorld").as_deref(),
        Some("helloworld")
    );
}

#[test]
fn query_upper_case() {
    assert_eq!(
        sanitized_query(sanitizers::upper_case(), "name=HelloWorld").as_deref(),
        Some("HELLOWORLD")
    );
}

#[test]
fn query_trim() {
    assert_eq!(
        sanitized_query(sanitizers::trim(), "name=  HelloWorld  ").as_deref(),
        Some("HelloWorld")
    );
}

#[test]
fn query_write_back_collapses_repeated_key() {
    let guard = Validator::new()
        .query([check("name").sanitize_with([sanitizers::trim()]).exists()]);
    let (_, exchange) = run(&guard, MemoryExchange::new().with_query("name=+a+&x=1&name=b"));

    assert_eq!(exchange.query_string(), "name=a&x=1");
}

// ─── body ────────────────────────────────────────────────────────────────────

#[test]
fn body_escape() {
    let guard = Validator::new()
        .body([check("name").sanitize_with([sanitizers::escape()]).exists()]);
    let (_, exchange) = run(&guard, json_request(json!({ "name": SCRIPT })));
    assert_eq!(stored_body(&exchange), json!({ "name": ESCAPED }));
}

#[test]
fn body_sanitizers_apply_in_declared_order() {
    let guard = Validator::new().body([check("name")
        .sanitize_with([sanitizers::trim(), sanitizers::lower_case()])
        .exists()]);
    let (_, exchange) = run(&guard, json_request(json!({ "name": "  HELLOWORLD  " })));
    assert_eq!(stored_body(&exchange), json!({ "name": "helloworld" }));
}

#[test]
fn body_replace() {
    let guard = Validator::new()
        .body([check("name").sanitize_with([sanitizers::replace(" ", "-")]).exists()]);
    let (_, exchange) = run(&guard, json_request(json!({ "name": "John Ronald Reuel" })));
    assert_eq!(stored_body(&exchange), json!({ "name": "John-Ronald-Reuel" }));
}

#[test]
fn phone_is_trimmed_after_checks_pass() {
    let guard = Validator::new().body([
        check("name").exists(),
        check("phone")
            .sanitize_with([sanitizers::trim()])
            .if_value([checks::is_numeric(), checks::has_length(SizeBounds::between(10, 15))]),
    ]);
    let (flow, exchange) = run(
        &guard,
        json_request(json!({ "name": "John Doe", "phone": "1234567890" })),
    );

    assert_eq!(flow, Flow::Continue);
    assert_eq!(stored_body(&exchange), json!({ "name": "John Doe", "phone": "1234567890" }));
}

#[test]
fn sanitizers_do_not_run_when_a_check_fails() {
    let guard = Validator::new().body([check("name")
        .sanitize_with([sanitizers::upper_case()])
        .if_value([checks::has_length(SizeBounds::min(10))])]);
    let (flow, exchange) = run(&guard, json_request(json!({ "name": "ada" })));

    assert_eq!(flow, Flow::Halt);
    assert_eq!(stored_body(&exchange), json!({ "name": "ada" }));
}

#[test]
fn nested_value_is_written_at_its_own_path() {
    let guard = Validator::new()
        .body([check("account.name").sanitize_with([sanitizers::trim()]).exists()]);
    let (_, exchange) = run(&guard, json_request(json!({ "account": { "name": "  Ada  " } })));

    assert_eq!(stored_body(&exchange), json!({ "account": { "name": "Ada" } }));
}

#[test]
fn wildcard_values_are_written_per_element() {
    let guard = Validator::new()
        .body([check("colors.*.name").sanitize_with([sanitizers::upper_case()]).exists()]);
    let (_, exchange) = run(
        &guard,
        json_request(json!({ "colors": [{ "name": "red" }, { "name": "blue", "hex": "#00f" }] })),
    );

    assert_eq!(
        stored_body(&exchange),
        json!({ "colors": [{ "name": "RED" }, { "name": "BLUE", "hex": "#00f" }] })
    );
}

#[test]
fn later_rules_see_earlier_sanitization() {
    let guard = Validator::new().body([
        check("code").sanitize_with([sanitizers::trim()]).exists(),
        check("code").if_value([checks::has_length(SizeBounds::max(3))]),
    ]);
    let (flow, _) = run(&guard, json_request(json!({ "code": "  abc  " })));
    assert_eq!(flow, Flow::Continue);
}

#[test]
fn container_values_are_left_untouched() {
    let guard = Validator::new()
        .body([check("tags").sanitize_with([sanitizers::upper_case()]).exists()]);
    let (flow, exchange) = run(&guard, json_request(json!({ "tags": ["a", "b"] })));

    assert_eq!(flow, Flow::Continue);
    assert_eq!(stored_body(&exchange), json!({ "tags": ["a", "b"] }));
}

#[test]
fn sanitizing_twice_converges() {
    let guard = Validator::new().body([check("name").sanitize_with([sanitizers::trim()]).exists()]);
    let (_, first) = run(&guard, json_request(json!({ "name": "  Ada  " })));
    let once = stored_body(&first);
    let (_, second) = run(&guard, json_request(once.clone()));

    assert_eq!(stored_body(&second), once);
}
