//! Declarative validation and sanitization of inbound request data.
//!
//! Rules name a field by a dotted path, say whether it may be absent, list
//! the checks it must pass and the sanitizers applied once it does. Rule sets
//! are bound to one request source (query, body, form or header) as a
//! [`Guard`], which enforces them fail-fast:
//!
//! ```text
//! check(path) → RuleBuilder → Rule
//! Validator::body([Rule, ..]) → Guard → apply(exchange) → Flow::{Continue, Halt}
//! ```
//!
//! # Quick Start
//!
//! ```rust
//! use fieldguard::{check, checks, Flow, MemoryExchange, SizeBounds, Validator};
//!
//! let validator = Validator::new();
//! let guard = validator.body([
//!     check("colors.*.name").if_value([checks::has_length(SizeBounds::min(3))]),
//! ]);
//!
//! let mut exchange = MemoryExchange::new()
//!     .with_body(r#"{"colors":[{"name":"red"},{"name":"r"}]}"#);
//!
//! assert_eq!(guard.apply(&mut exchange), Flow::Halt);
//! assert_eq!(exchange.status(), Some(422));
//! ```
//!
//! # Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `axum`  | yes     | The [`axum`](mod@crate::axum) middleware binding. |

pub mod builder;
pub mod checks;
pub mod config;
pub mod enums;
pub mod error;
pub mod evaluate;
pub mod middleware;
pub mod primitives;
pub mod sanitizers;
pub mod serialize;
pub mod types;

#[cfg(feature = "axum")]
pub mod axum;

pub use config::GuardConfig;
pub use enums::*;
pub use error::*;
pub use types::*;

pub use builder::{RuleBuilder, check, check_with};
pub use evaluate::{Predicate, Transform, WriteBack, enforce, evaluate_rule};
pub use middleware::{
    DefaultErrorHandler, ErrorHandler, Exchange, Flow, Guard, MemoryExchange, Validator,
};
