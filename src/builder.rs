//! Fluent construction of [`Rule`] descriptors.
//!
//! ```rust
//! use fieldguard::{check, checks, sanitizers, SizeBounds};
//!
//! let phone = check("phone")
//!     .sanitize_with([sanitizers::trim()])
//!     .if_value([checks::is_numeric(), checks::has_length(SizeBounds::between(10, 15))]);
//!
//! let nickname = check("nickname").is_optional();
//! assert!(nickname.is_optional());
//! assert_eq!(phone.checks().len(), 2);
//! ```

use crate::types::{Check, Path, Rule, Sanitizer};

/// Starts a rule for `path`.
pub fn check(path: impl Into<Path>) -> RuleBuilder {
    RuleBuilder::new(path)
}

/// Starts a rule for `path` whose failures all report `message`.
pub fn check_with(path: impl Into<Path>, message: impl Into<String>) -> RuleBuilder {
    RuleBuilder::new(path).with_message(message)
}

/// Step builder for one rule.
///
/// Every call consumes the builder and returns a new one; terminal calls return
/// the finished [`Rule`]. Clone a builder to branch two rules from a common prefix.
#[derive(Clone, Debug)]
#[must_use = "a rule builder does nothing until a terminal call produces a Rule"]
pub struct RuleBuilder {
    rule: Rule,
}

impl RuleBuilder {
    pub fn new(path: impl Into<Path>) -> Self {
        let path = path.into();
        Self {
            rule: Rule {
                key: path.as_str().to_string(),
                path,
                optional: false,
                checks: Vec::new(),
                sanitizers: Vec::new(),
                message: None,
            },
        }
    }

    /// Sets the override message handed to every predicate.
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.rule.message = Some(message.into());
        self
    }

    /// Marks the field optional: an absent value skips the rule.
    pub fn maybe(mut self) -> Self {
        self.rule.optional = true;
        self
    }

    /// Replaces the sanitizer list.
    pub fn sanitize_with(mut self, sanitizers: impl IntoIterator<Item = Sanitizer>) -> Self {
        self.rule.sanitizers = sanitizers.into_iter().collect();
        self
    }

    /// Finishes the rule with `checks` run in order.
    pub fn if_value(mut self, checks: impl IntoIterator<Item = Check>) -> Rule {
        self.rule.checks = checks.into_iter().collect();
        self.rule
    }

    /// Like [`if_value`](Self::if_value), also setting the override message.
    pub fn if_value_with(
        self,
        checks: impl IntoIterator<Item = Check>,
        message: impl Into<String>,
    ) -> Rule {
        self.with_message(message).if_value(checks)
    }

    /// Finishes the rule with no predicates: the field only has to be present.
    pub fn exists(self) -> Rule {
        self.rule
    }

    pub fn exists_with(self, message: impl Into<String>) -> Rule {
        self.with_message(message).exists()
    }

    /// Finishes an optional rule with no predicates.
    pub fn is_optional(self) -> Rule {
        self.maybe().rule
    }

    pub fn is_optional_with(self, message: impl Into<String>) -> Rule {
        self.maybe().with_message(message).rule
    }
}
