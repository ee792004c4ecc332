//! axum binding.
//!
//! ```rust,no_run
//! use axum::{Router, middleware::from_fn_with_state, routing::post};
//! use fieldguard::{axum::guard_request, checks, Validator};
//!
//! let validator = Validator::new();
//! let guard = validator.body([validator.check("email").if_value([checks::contains("@", true)])]);
//!
//! let app: Router = Router::new()
//!     .route("/signup", post(|| async { "ok" }))
//!     .layer(from_fn_with_state(guard, guard_request));
//! ```

use ::axum::Json;
use ::axum::body::{Body, Bytes, to_bytes};
use ::axum::extract::{Request, State};
use ::axum::http::request::Parts;
use ::axum::http::uri::{PathAndQuery, Uri};
use ::axum::http::{StatusCode, header};
use ::axum::middleware::Next;
use ::axum::response::{IntoResponse, Response};
use serde_json::Value;
use tracing::warn;

use crate::enums::Source;
use crate::middleware::{Guard, MemoryExchange};
use crate::serialize::{to_form_string, to_json_string};
use crate::types::Node;

/// The body or form container a guard parsed, after sanitization.
///
/// Inserted into request extensions by [`guard_request`] for body and form guards.
#[derive(Clone, Debug, PartialEq)]
pub struct ParsedBody(pub Node);

/// Middleware function running `guard` before the wrapped handler.
///
/// Mount it with `axum::middleware::from_fn_with_state(guard, guard_request)`.
/// Rejected requests get the response written by the guard's error handler.
pub async fn guard_request(State(guard): State<Guard>, request: Request, next: Next) -> Response {
    let (mut parts, body) = request.into_parts();

    let bytes = match guard.source() {
        Source::Body | Source::Form => read_body(body, guard.config().max_body_bytes).await,
        Source::Query | Source::Header => return guard_flat(&guard, parts, body, next).await,
    };

    let mut exchange = exchange_for(&parts).with_body(String::from_utf8_lossy(&bytes).into_owned());
    let writes = match guard.inspect(&mut exchange) {
        Ok(writes) => writes,
        Err(rejection) => {
            guard.reject(&mut exchange, &rejection);
            return rejection_response(&guard, &exchange);
        }
    };

    let body = match exchange.take_parsed_body() {
        Some(node) => {
            let body = if writes.is_empty() {
                Body::from(bytes)
            } else {
                reserialize(&guard, &node, &mut parts).unwrap_or_else(|| Body::from(bytes))
            };
            parts.extensions.insert(ParsedBody(node));
            body
        }
        None => Body::from(bytes),
    };

    next.run(Request::from_parts(parts, body)).await
}

async fn guard_flat(guard: &Guard, mut parts: Parts, body: Body, next: Next) -> Response {
    let mut exchange = exchange_for(&parts);
    if let Err(rejection) = guard.inspect(&mut exchange) {
        guard.reject(&mut exchange, &rejection);
        return rejection_response(guard, &exchange);
    }

    if exchange.query_modified() {
        match rewrite_query(&parts.uri, &exchange.query_string()) {
            Some(uri) => parts.uri = uri,
            None => warn!(uri = %parts.uri, "sanitized query could not be written back"),
        }
    }

    next.run(Request::from_parts(parts, body)).await
}

/// Over-limit and failed reads count as an empty body.
async fn read_body(body: Body, limit: usize) -> Bytes {
    match to_bytes(body, limit).await {
        Ok(bytes) => bytes,
        Err(error) => {
            warn!(%error, "request body could not be read");
            Bytes::new()
        }
    }
}

fn exchange_for(parts: &Parts) -> MemoryExchange {
    let mut exchange = MemoryExchange::new().with_query(parts.uri.query().unwrap_or_default());
    for (name, value) in &parts.headers {
        if let Ok(value) = value.to_str() {
            exchange = exchange.with_header(name.as_str(), value);
        }
    }
    exchange
}

fn reserialize(guard: &Guard, node: &Node, parts: &mut Parts) -> Option<Body> {
    let text = match guard.source() {
        Source::Form => to_form_string(node),
        _ => to_json_string(node),
    };
    match text {
        Ok(text) => {
            parts.headers.remove(header::CONTENT_LENGTH);
            Some(Body::from(text))
        }
        Err(error) => {
            warn!(%error, "sanitized body could not be serialized");
            None
        }
    }
}

fn rewrite_query(uri: &Uri, query: &str) -> Option<Uri> {
    let path_and_query = if query.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), query)
    };
    let mut uri_parts = uri.clone().into_parts();
    uri_parts.path_and_query = Some(PathAndQuery::try_from(path_and_query).ok()?);
    Uri::from_parts(uri_parts).ok()
}

fn rejection_response(guard: &Guard, exchange: &MemoryExchange) -> Response {
    let status = exchange
        .status()
        .and_then(|code| StatusCode::from_u16(code).ok())
        .or_else(|| StatusCode::from_u16(guard.config().failure_status).ok())
        .unwrap_or(StatusCode::UNPROCESSABLE_ENTITY);
    let body = exchange.response_body().cloned().unwrap_or(Value::Null);
    (status, Json(body)).into_response()
}
