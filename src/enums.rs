//! Closed enumerations shared by the resolver, the pipeline and the adapters.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The JSON kind a scalar was parsed from.
///
/// Predicates only ever see the scalar's text; the kind is kept so a parsed
/// body can be written back with its original types.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    #[default]
    Text,
    Number,
    Bool,
    Null,
}

/// Request aspect a rule set is enforced against.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Query,
    Body,
    Form,
    Header,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Source::Query => "query",
            Source::Body => "body",
            Source::Form => "form",
            Source::Header => "header",
        };
        f.write_str(name)
    }
}

/// Why a request was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    /// The raw body was empty or could not be parsed.
    MissingBody,
    /// The form body decoded to zero fields.
    MissingFormData,
    /// A non-optional rule resolved to an empty value.
    Required,
    /// A predicate rejected a present value.
    PredicateFailed,
}
