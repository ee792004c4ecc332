use fieldguard::{
    Check, Node, Outcome, WriteBack, check, checks, enforce, evaluate_rule, sanitizers,
};
use proptest::prelude::*;
use serde_json::{Value, json};

fn always_fail(message: impl Into<String>) -> Check {
    let message = message.into();
    Check::new(move |_, _, _| Outcome::fail(message.clone()))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn optional_rule_with_absent_value_passes(key in "[a-z]{1,8}", other in "[A-Z]{1,8}") {
        let rule = check(key.as_str()).maybe().if_value([always_fail("unreachable")]);
        let root = Node::from(json!({ other: "x" }));
        prop_assert_eq!(evaluate_rule(&rule, &root), Ok(vec![]));
    }

    #[test]
    fn required_rule_with_absent_value_fails(key in "[a-z]{1,8}", other in "[A-Z]{1,8}") {
        let rule = check(key.as_str()).if_value([checks::is_numeric()]);
        let root = Node::from(json!({ other: "x" }));
        let rejection = evaluate_rule(&rule, &root).unwrap_err();
        prop_assert_eq!(
            rejection.message,
            format!("Invalid {} input. Cause: it is required.", key)
        );
    }

    #[test]
    fn first_failing_predicate_wins(
        a in "[a-z ]{1,20}",
        b in "[a-z ]{1,20}",
        value in "[a-z]{1,8}",
    ) {
        let rule = check("f").if_value([
            checks::is_string(),
            always_fail(a.clone()),
            always_fail(b),
        ]);
        let root = Node::from(json!({ "f": value }));
        prop_assert_eq!(evaluate_rule(&rule, &root).unwrap_err().message, a);
    }

    #[test]
    fn trim_then_lower_case(inner in "[A-Za-z]{1,12}", left in " {0,3}", right in " {0,3}") {
        let rule = check("f")
            .sanitize_with([sanitizers::trim(), sanitizers::lower_case()])
            .exists();
        let mut root = Node::from(json!({ "f": format!("{left}{inner}{right}") }));
        enforce(std::slice::from_ref(&rule), &mut root, WriteBack::Enabled).unwrap();
        prop_assert_eq!(Value::from(&root), json!({ "f": inner.to_lowercase() }));
    }

    #[test]
    fn sanitizing_converges_after_one_pass(value in "[ a-zA-Z<>&]{1,16}") {
        prop_assume!(!value.trim().is_empty());
        let rule = check("f")
            .sanitize_with([sanitizers::trim(), sanitizers::upper_case()])
            .exists();

        let mut once = Node::from(json!({ "f": value }));
        enforce(std::slice::from_ref(&rule), &mut once, WriteBack::Enabled).unwrap();
        let mut twice = once.clone();
        enforce(std::slice::from_ref(&rule), &mut twice, WriteBack::Enabled).unwrap();

        prop_assert_eq!(once, twice);
    }

    #[test]
    fn rejected_values_are_never_sanitized(value in "[a-z]{1,8}") {
        let rule = check("f")
            .sanitize_with([sanitizers::upper_case()])
            .if_value([always_fail("no")]);
        let original = Node::from(json!({ "f": value }));
        let mut root = original.clone();

        prop_assert!(enforce(std::slice::from_ref(&rule), &mut root, WriteBack::Enabled).is_err());
        prop_assert_eq!(root, original);
    }

    #[test]
    fn disabled_write_back_leaves_root_untouched(value in " [a-z]{1,8} ") {
        let rule = check("f").sanitize_with([sanitizers::trim()]).exists();
        let original = Node::from(json!({ "f": value }));
        let mut root = original.clone();

        let writes = enforce(std::slice::from_ref(&rule), &mut root, WriteBack::Disabled).unwrap();
        prop_assert!(writes.is_empty());
        prop_assert_eq!(root, original);
    }

    #[test]
    fn evaluation_is_repeatable(value in arb_scalar()) {
        let rule = check("f").if_value([checks::is_numeric()]);
        let root = Node::from(json!({ "f": value }));
        prop_assert_eq!(evaluate_rule(&rule, &root), evaluate_rule(&rule, &root));
    }
}

fn arb_scalar() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(|i| json!(i)),
        "[0-9a-z.+-]{0,8}".prop_map(Value::String),
    ]
}
