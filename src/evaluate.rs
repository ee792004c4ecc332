//! Rule enforcement: resolve, judge optionality, run predicates, sanitize.
//!
//! Enforcement is fail-fast. The first empty required value or rejecting
//! predicate ends the run, and rules after it are never looked at.

use tracing::trace;

use crate::error::Rejection;
use crate::primitives::{resolve, write_at};
use crate::types::{Node, Outcome, Rule, Step};

// ─── Predicate ───────────────────────────────────────────────────────────────

/// Extension point for leaf predicates.
///
/// `key` is the rule's field label and `message` its override message; a
/// predicate should report `message` when present and its own text otherwise.
pub trait Predicate: Send + Sync {
    fn check(&self, value: &Node, key: &str, message: Option<&str>) -> Outcome;
}

impl<F> Predicate for F
where
    F: Fn(&Node, &str, Option<&str>) -> Outcome + Send + Sync,
{
    fn check(&self, value: &Node, key: &str, message: Option<&str>) -> Outcome {
        self(value, key, message)
    }
}

// ─── Transform ───────────────────────────────────────────────────────────────

/// Extension point for leaf transforms applied after every predicate passed.
pub trait Transform: Send + Sync {
    fn apply(&self, value: &str) -> String;
}

impl<F> Transform for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn apply(&self, value: &str) -> String {
        self(value)
    }
}

// ─── evaluate_rule ───────────────────────────────────────────────────────────

/// Whether sanitized values are written into the root container.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteBack {
    Enabled,
    Disabled,
}

/// A sanitized value and where it belongs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Write {
    pub target: Vec<Step>,
    pub value: String,
}

/// Runs one rule against `root` without modifying it.
///
/// Returns the sanitized values to write, one per present scalar when the rule
/// has sanitizers, in resolution order.
pub fn evaluate_rule(rule: &Rule, root: &Node) -> Result<Vec<Write>, Rejection> {
    let mut writes = Vec::new();

    for located in resolve(root, rule.path()) {
        let value: &Node = &located.value;

        if value.is_empty() {
            if rule.is_optional() {
                trace!(field = rule.key(), "optional field absent, skipped");
                continue;
            }
            return Err(Rejection::required(rule.key(), rule.message()));
        }

        for check in rule.checks() {
            if let Outcome::Fail(message) = check.run(value, rule.key(), rule.message()) {
                return Err(Rejection::predicate(rule.key(), message));
            }
        }

        if rule.sanitizers().is_empty() {
            continue;
        }
        let (Some(text), Some(target)) = (value.as_str(), located.target) else {
            trace!(field = rule.key(), "sanitizers skipped for non-scalar value");
            continue;
        };
        let value = rule
            .sanitizers()
            .iter()
            .fold(text.to_string(), |acc, sanitizer| sanitizer.apply(&acc));
        writes.push(Write { target, value });
    }

    Ok(writes)
}

// ─── enforce ─────────────────────────────────────────────────────────────────

/// Runs `rules` in declaration order against `root`.
///
/// With [`WriteBack::Enabled`] each rule's sanitized values are stored before
/// the next rule runs, so later rules see earlier sanitization. Returns every
/// write performed, in order.
pub fn enforce(
    rules: &[Rule],
    root: &mut Node,
    write_back: WriteBack,
) -> Result<Vec<Write>, Rejection> {
    let mut performed = Vec::new();

    for rule in rules {
        let writes = evaluate_rule(rule, root)?;
        if write_back == WriteBack::Disabled {
            continue;
        }
        for write in writes {
            if write_at(root, &write.target, Node::text(write.value.clone())) {
                trace!(field = rule.key(), "sanitized value written back");
                performed.push(write);
            }
        }
    }

    Ok(performed)
}
