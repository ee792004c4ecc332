//! Built-in leaf predicates.
//!
//! Every factory returns a [`Check`]. On failure a check reports the rule's
//! override message when one is set, and otherwise a message of the form
//! `Invalid <key> input. Cause: ...`.

use regex::{Regex, RegexBuilder};

use crate::enums::ScalarKind;
use crate::types::{Check, Node, Outcome, SizeBounds};

fn reject(message: Option<&str>, key: &str, cause: impl AsRef<str>) -> Outcome {
    match message {
        Some(message) => Outcome::fail(message),
        None => Outcome::fail(format!("Invalid {key} input. Cause: {}.", cause.as_ref())),
    }
}

fn accept_if(ok: bool, message: Option<&str>, key: &str, cause: &str) -> Outcome {
    if ok { Outcome::Pass } else { reject(message, key, cause) }
}

// ─── Length and size ─────────────────────────────────────────────────────────

/// Text length in characters, or item count for sequences. Mappings have no
/// length and always pass.
pub fn has_length(bounds: SizeBounds) -> Check {
    Check::new(move |value, key, message| {
        let len = match value {
            Node::Scalar(scalar) => scalar.text.chars().count(),
            Node::Sequence(items) => items.len(),
            Node::Mapping(_) => return Outcome::Pass,
        };
        if let Some(max) = bounds.effective_max().filter(|&max| len > max) {
            return reject(message, key, format!("it exceeds the maximum length of {max}"));
        }
        if let Some(min) = bounds.effective_min().filter(|&min| len < min) {
            return reject(message, key, format!("it is too short for the minimum length of {min}"));
        }
        Outcome::Pass
    })
}

/// The value must be a sequence, optionally within `bounds` items.
pub fn is_array(bounds: Option<SizeBounds>) -> Check {
    Check::new(move |value, key, message| {
        let Node::Sequence(items) = value else {
            return reject(message, key, "it is not a valid array");
        };
        let Some(bounds) = bounds else {
            return Outcome::Pass;
        };
        let len = items.len();
        if let Some(max) = bounds.effective_max().filter(|&max| len > max) {
            return reject(message, key, format!("it exceeds the maximum size of {max}"));
        }
        if let Some(min) = bounds.effective_min().filter(|&min| len < min) {
            return reject(message, key, format!("it is too small for the minimum size of {min}"));
        }
        Outcome::Pass
    })
}

// ─── Character sets and membership ──────────────────────────────────────────

/// Every character must belong to the bracket class `[chars]`.
///
/// `chars` uses regex class syntax, so `a-z0-9_` is a range set. A class that
/// does not compile rejects every value.
pub fn has_allowed_characters(chars: impl Into<String>) -> Check {
    let chars = chars.into();
    let pattern = Regex::new(&format!("^[{chars}]+$")).ok();
    Check::new(move |value, key, message| {
        let ok = match (&pattern, value.as_str()) {
            (Some(pattern), Some(text)) => pattern.is_match(text),
            _ => false,
        };
        accept_if(
            ok,
            message,
            key,
            &format!("it contains invalid characters. Allowed characters: {chars}"),
        )
    })
}

/// A scalar must be one of `values`; every item of a sequence must be.
pub fn is_in<I, S>(values: I) -> Check
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let allowed: Vec<String> = values.into_iter().map(Into::into).collect();
    Check::new(move |value, key, message| {
        let contains = |node: &Node| {
            node.as_str()
                .is_some_and(|text| allowed.iter().any(|a| a == text))
        };
        let ok = match value {
            Node::Sequence(items) => items.iter().all(contains),
            other => contains(other),
        };
        accept_if(ok, message, key, "it is not in the allowed values")
    })
}

pub fn contains(search: impl Into<String>, case_sensitive: bool) -> Check {
    let search = search.into();
    let needle = if case_sensitive { search.clone() } else { search.to_lowercase() };
    Check::new(move |value, key, message| {
        let ok = value.as_str().is_some_and(|text| {
            if case_sensitive {
                text.contains(&needle)
            } else {
                text.to_lowercase().contains(&needle)
            }
        });
        accept_if(ok, message, key, &format!("it does not contain \"{search}\""))
    })
}

pub fn matches(pattern: Regex) -> Check {
    Check::new(move |value, key, message| {
        let ok = value.as_str().is_some_and(|text| pattern.is_match(text));
        accept_if(ok, message, key, "it does not match the pattern")
    })
}

// ─── Shape and format ────────────────────────────────────────────────────────

/// Text must start with an `http:`, `https:` or `file:` scheme, in any case.
pub fn is_url() -> Check {
    let scheme = RegexBuilder::new("^(http|https|file):")
        .case_insensitive(true)
        .build()
        .ok();
    Check::new(move |value, key, message| {
        let ok = match (&scheme, value.as_str()) {
            (Some(scheme), Some(text)) => scheme.is_match(text),
            _ => false,
        };
        accept_if(ok, message, key, "it is not a valid URL")
    })
}

/// JSON numbers pass; text must read as a number.
///
/// Accepted text: surrounding whitespace, an optional sign, decimal and
/// exponent forms, `Infinity`, and unsigned `0x`/`0o`/`0b` integers.
/// Whitespace-only text counts as zero.
pub fn is_numeric() -> Check {
    Check::new(|value, key, message| {
        let ok = match value.as_scalar() {
            Some(scalar) if scalar.kind == ScalarKind::Number => true,
            Some(scalar) => is_number_text(&scalar.text),
            None => false,
        };
        accept_if(ok, message, key, "it is not a valid number")
    })
}

fn is_number_text(text: &str) -> bool {
    let text = text.trim();
    if text.is_empty() {
        return true;
    }

    let radix = match text.get(..2) {
        Some("0x" | "0X") => Some(16),
        Some("0o" | "0O") => Some(8),
        Some("0b" | "0B") => Some(2),
        _ => None,
    };
    if let Some(radix) = radix {
        let digits = &text[2..];
        return !digits.is_empty() && digits.chars().all(|c| c.is_digit(radix));
    }

    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    if unsigned == "Infinity" {
        return true;
    }
    // f64 parsing also takes "inf" and "nan", which are not numbers here.
    if unsigned.chars().any(|c| c.is_alphabetic() && c != 'e' && c != 'E') {
        return false;
    }
    text.parse::<f64>().is_ok()
}

pub fn is_boolean() -> Check {
    Check::new(|value, key, message| {
        let ok = matches!(value.as_str(), Some("true" | "false"));
        accept_if(ok, message, key, "it is not a valid boolean")
    })
}

pub fn is_object() -> Check {
    Check::new(|value, key, message| {
        accept_if(matches!(value, Node::Mapping(_)), message, key, "it is not a valid object")
    })
}

/// Only text scalars pass; JSON numbers and booleans do not.
pub fn is_string() -> Check {
    Check::new(|value, key, message| {
        let ok = value.as_scalar().is_some_and(|s| s.kind == ScalarKind::Text);
        accept_if(ok, message, key, "it is not a valid string")
    })
}
