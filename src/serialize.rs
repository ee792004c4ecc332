//! [`Node`] → request text, used to hand sanitized payloads back to the host.

use url::form_urlencoded;

use crate::error::SerializeError;
use crate::types::Node;

/// Serialize a node to compact JSON, keeping the original scalar types.
pub fn to_json_string(node: &Node) -> Result<String, SerializeError> {
    serde_json::to_string(node).map_err(|e| SerializeError {
        message: format!("failed to serialize body to JSON: {}", e),
    })
}

/// Serialize a mapping to `application/x-www-form-urlencoded` text.
///
/// Scalars are written as their text; nested values as compact JSON.
pub fn to_form_string(node: &Node) -> Result<String, SerializeError> {
    let Node::Mapping(map) = node else {
        return Err(SerializeError {
            message: "form data must be a mapping".to_string(),
        });
    };

    let mut out = form_urlencoded::Serializer::new(String::new());
    for (key, value) in map {
        match value.as_str() {
            Some(text) => out.append_pair(key, text),
            None => out.append_pair(key, &to_json_string(value)?),
        };
    }
    Ok(out.finish())
}

/// Serialize ordered query pairs. Returns an empty string for no pairs.
pub fn to_query_string<K, V>(pairs: &[(K, V)]) -> String
where
    K: AsRef<str>,
    V: AsRef<str>,
{
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_ref(), v.as_ref())))
        .finish()
}
