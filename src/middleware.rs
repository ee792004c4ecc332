//! Source adapters and the guards that run rule sets against a request.
//!
//! A [`Guard`] is one rule set bound to one [`Source`]. The host hands it an
//! [`Exchange`] (its view of the request and the response under construction);
//! the guard builds the root container for its source, enforces the rules and,
//! on the first failure, passes the [`Rejection`] to the configured
//! [`ErrorHandler`].

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Value, json};
use tracing::{debug, trace};
use url::form_urlencoded;

use crate::builder::{self, RuleBuilder};
use crate::config::GuardConfig;
use crate::enums::Source;
use crate::error::Rejection;
use crate::evaluate::{Write, WriteBack, enforce};
use crate::types::{Node, Path, Rule, Step};

// ─── Exchange ────────────────────────────────────────────────────────────────

/// What a guard needs from the host's per-request object.
pub trait Exchange {
    /// Query pairs in URL order; a key may repeat.
    fn query_pairs(&self) -> Vec<(String, String)>;

    /// Replaces every occurrence of `key` with a single pair, appending it when absent.
    fn set_query_param(&mut self, key: &str, value: &str);

    /// Header pairs as received; names are matched case-insensitively by guards.
    fn header_pairs(&self) -> Vec<(String, String)>;

    /// The raw request body; empty when there is none.
    fn body_text(&self) -> &str;

    /// The body container stored by a body or form guard, if any ran.
    fn parsed_body(&self) -> Option<&Node>;

    fn store_parsed_body(&mut self, body: Node);

    fn set_status(&mut self, status: u16);

    fn set_response_body(&mut self, body: Value);
}

// ─── MemoryExchange ──────────────────────────────────────────────────────────

/// An owned, in-memory [`Exchange`].
///
/// Used by the axum binding and handy for exercising guards directly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MemoryExchange {
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    body: String,
    parsed_body: Option<Node>,
    status: Option<u16>,
    response_body: Option<Value>,
    query_modified: bool,
}

impl MemoryExchange {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the query from its encoded form, with or without a leading `?`.
    pub fn with_query(mut self, query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        self.query = form_urlencoded::parse(query.as_bytes()).into_owned().collect();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// The current query, re-encoded.
    pub fn query_string(&self) -> String {
        crate::serialize::to_query_string(&self.query)
    }

    /// First value for `key`, if present.
    pub fn query_param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// True once a sanitized value has been written to the query.
    pub fn query_modified(&self) -> bool {
        self.query_modified
    }

    pub fn take_parsed_body(&mut self) -> Option<Node> {
        self.parsed_body.take()
    }

    /// Status set by an error handler, if one ran.
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn response_body(&self) -> Option<&Value> {
        self.response_body.as_ref()
    }
}

impl Exchange for MemoryExchange {
    fn query_pairs(&self) -> Vec<(String, String)> {
        self.query.clone()
    }

    fn set_query_param(&mut self, key: &str, value: &str) {
        match self.query.iter().position(|(k, _)| k == key) {
            Some(first) => {
                self.query[first].1 = value.to_string();
                let mut index = 0;
                self.query.retain(|(k, _)| {
                    let keep = index <= first || k != key;
                    index += 1;
                    keep
                });
            }
            None => self.query.push((key.to_string(), value.to_string())),
        }
        self.query_modified = true;
    }

    fn header_pairs(&self) -> Vec<(String, String)> {
        self.headers.clone()
    }

    fn body_text(&self) -> &str {
        &self.body
    }

    fn parsed_body(&self) -> Option<&Node> {
        self.parsed_body.as_ref()
    }

    fn store_parsed_body(&mut self, body: Node) {
        self.parsed_body = Some(body);
    }

    fn set_status(&mut self, status: u16) {
        self.status = Some(status);
    }

    fn set_response_body(&mut self, body: Value) {
        self.response_body = Some(body);
    }
}

// ─── ErrorHandler ────────────────────────────────────────────────────────────

/// Turns a rejection into a response on the exchange.
pub trait ErrorHandler: Send + Sync {
    fn handle(&self, exchange: &mut dyn Exchange, rejection: &Rejection);
}

impl<F> ErrorHandler for F
where
    F: Fn(&mut dyn Exchange, &Rejection) + Send + Sync,
{
    fn handle(&self, exchange: &mut dyn Exchange, rejection: &Rejection) {
        self(exchange, rejection)
    }
}

/// Sets `status` and a `{"error": <message>}` body.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DefaultErrorHandler {
    pub status: u16,
}

impl Default for DefaultErrorHandler {
    fn default() -> Self {
        Self {
            status: GuardConfig::default().failure_status,
        }
    }
}

impl ErrorHandler for DefaultErrorHandler {
    fn handle(&self, exchange: &mut dyn Exchange, rejection: &Rejection) {
        exchange.set_status(self.status);
        exchange.set_response_body(json!({ "error": rejection.message() }));
    }
}

// ─── Guard ───────────────────────────────────────────────────────────────────

/// What the host should do after a guard ran.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    /// Every rule passed; hand the request on.
    Continue,
    /// A rule failed and the error handler has written the response.
    Halt,
}

/// A rule set bound to one request source. Cheap to clone; shares its rules.
#[derive(Clone)]
pub struct Guard {
    source: Source,
    rules: Arc<[Rule]>,
    handler: Arc<dyn ErrorHandler>,
    config: GuardConfig,
}

impl std::fmt::Debug for Guard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Guard")
            .field("source", &self.source)
            .field("rules", &self.rules)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Guard {
    fn new(source: Source, rules: impl IntoIterator<Item = Rule>, validator: &Validator) -> Self {
        let rules = rules
            .into_iter()
            .map(|rule| match source {
                Source::Query => rule.with_path(Path::literal(rule.key())),
                Source::Header => rule.with_path(Path::literal(rule.key().to_ascii_lowercase())),
                Source::Body | Source::Form => rule,
            })
            .collect();
        Self {
            source,
            rules,
            handler: Arc::clone(&validator.handler),
            config: validator.config,
        }
    }

    pub fn source(&self) -> Source {
        self.source
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Runs the guard and, on failure, the error handler.
    pub fn apply(&self, exchange: &mut dyn Exchange) -> Flow {
        match self.inspect(exchange) {
            Ok(_) => Flow::Continue,
            Err(rejection) => {
                self.reject(exchange, &rejection);
                Flow::Halt
            }
        }
    }

    /// Hands `rejection` to the error handler.
    pub fn reject(&self, exchange: &mut dyn Exchange, rejection: &Rejection) {
        self.handler.handle(exchange, rejection);
    }

    /// Enforces the rules without invoking the error handler.
    ///
    /// Query write-back goes through [`Exchange::set_query_param`]; body and
    /// form containers are stored with [`Exchange::store_parsed_body`] whether
    /// or not the rules pass. Returns the writes performed.
    pub fn inspect(&self, exchange: &mut dyn Exchange) -> Result<Vec<Write>, Rejection> {
        let result = match self.source {
            Source::Query => self.inspect_query(exchange),
            Source::Header => self.inspect_header(exchange),
            Source::Body | Source::Form => self.inspect_body(exchange),
        };
        if let Err(rejection) = &result {
            debug!(
                source = %self.source,
                field = rejection.field.as_deref().unwrap_or("-"),
                kind = ?rejection.kind,
                "request rejected"
            );
        }
        result
    }

    fn inspect_query(&self, exchange: &mut dyn Exchange) -> Result<Vec<Write>, Rejection> {
        let mut root = first_wins(exchange.query_pairs());
        let writes = enforce(&self.rules, &mut root, WriteBack::Enabled)?;
        for write in &writes {
            if let [Step::Key(key)] = write.target.as_slice() {
                exchange.set_query_param(key, &write.value);
            }
        }
        Ok(writes)
    }

    fn inspect_header(&self, exchange: &mut dyn Exchange) -> Result<Vec<Write>, Rejection> {
        let mut joined: IndexMap<String, String> = IndexMap::new();
        for (name, value) in exchange.header_pairs() {
            joined
                .entry(name.to_ascii_lowercase())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }
        let mut root = Node::from_pairs(joined);

        if self.rules.iter().any(|rule| !rule.sanitizers().is_empty()) {
            trace!("header sanitizers are not applied");
        }
        enforce(&self.rules, &mut root, WriteBack::Disabled)
    }

    fn inspect_body(&self, exchange: &mut dyn Exchange) -> Result<Vec<Write>, Rejection> {
        let mut root = match self.source {
            Source::Form => {
                decode_form(exchange.body_text()).ok_or_else(Rejection::missing_form_data)?
            }
            _ => decode_json(exchange.body_text()).ok_or_else(Rejection::missing_body)?,
        };
        let result = enforce(&self.rules, &mut root, WriteBack::Enabled);
        exchange.store_parsed_body(root);
        result
    }
}

/// Key→text mapping where the first occurrence of a key wins.
fn first_wins(pairs: Vec<(String, String)>) -> Node {
    let mut map = IndexMap::new();
    for (key, value) in pairs {
        map.entry(key).or_insert_with(|| Node::text(value));
    }
    Node::Mapping(map)
}

fn decode_json(body: &str) -> Option<Node> {
    if body.is_empty() {
        return None;
    }
    serde_json::from_str::<Value>(body).ok().map(Node::from)
}

/// Decodes an urlencoded body; a repeated field keeps its last value.
fn decode_form(body: &str) -> Option<Node> {
    let node = Node::from_pairs(form_urlencoded::parse(body.as_bytes()));
    let has_fields = node.as_mapping().is_some_and(|map| !map.is_empty());
    has_fields.then_some(node)
}

// ─── Validator ───────────────────────────────────────────────────────────────

/// Produces guards sharing one error handler and one [`GuardConfig`].
///
/// ```rust
/// use fieldguard::{checks, sanitizers, Flow, MemoryExchange, SizeBounds, Validator};
///
/// let validator = Validator::new();
/// let guard = validator.body([
///     validator.check("name").exists(),
///     validator
///         .check("phone")
///         .sanitize_with([sanitizers::trim()])
///         .if_value([checks::is_numeric(), checks::has_length(SizeBounds::between(10, 15))]),
/// ]);
///
/// let mut exchange = MemoryExchange::new()
///     .with_body(r#"{"name":"John Doe","phone":" 1234567890 "}"#);
/// assert_eq!(guard.apply(&mut exchange), Flow::Continue);
/// ```
#[derive(Clone)]
pub struct Validator {
    handler: Arc<dyn ErrorHandler>,
    config: GuardConfig,
}

impl Default for Validator {
    fn default() -> Self {
        Self::with_config(GuardConfig::default())
    }
}

impl std::fmt::Debug for Validator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Validator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// A validator whose default error handler uses `config.failure_status`.
    pub fn with_config(config: GuardConfig) -> Self {
        Self {
            handler: Arc::new(DefaultErrorHandler {
                status: config.failure_status,
            }),
            config,
        }
    }

    /// Replaces the error handler with a closure.
    ///
    /// Guards produced before this call keep the handler they were built with.
    pub fn with_error_handler<F>(self, handler: F) -> Self
    where
        F: Fn(&mut dyn Exchange, &Rejection) + Send + Sync + 'static,
    {
        self.with_handler(handler)
    }

    pub fn with_handler(mut self, handler: impl ErrorHandler + 'static) -> Self {
        self.handler = Arc::new(handler);
        self
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Starts a rule; same as [`builder::check`].
    pub fn check(&self, path: impl Into<Path>) -> RuleBuilder {
        builder::check(path)
    }

    pub fn query(&self, rules: impl IntoIterator<Item = Rule>) -> Guard {
        Guard::new(Source::Query, rules, self)
    }

    pub fn body(&self, rules: impl IntoIterator<Item = Rule>) -> Guard {
        Guard::new(Source::Body, rules, self)
    }

    pub fn form(&self, rules: impl IntoIterator<Item = Rule>) -> Guard {
        Guard::new(Source::Form, rules, self)
    }

    /// Header rules are matched case-insensitively and never write back.
    pub fn header(&self, rules: impl IntoIterator<Item = Rule>) -> Guard {
        Guard::new(Source::Header, rules, self)
    }

    /// Builds a guard for `source`.
    pub fn guard(&self, source: Source, rules: impl IntoIterator<Item = Rule>) -> Guard {
        Guard::new(source, rules, self)
    }
}
