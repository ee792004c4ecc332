use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

use crate::enums::ScalarKind;
use crate::evaluate::{Predicate, Transform};

// ─── Node ────────────────────────────────────────────────────────────────────

/// A scalar leaf of a request payload.
///
/// `text` is what predicates and sanitizers see. `kind` records the JSON type
/// the value was parsed from so it can be written back unchanged.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scalar {
    pub text: String,
    pub kind: ScalarKind,
}

impl Scalar {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ScalarKind::Text,
        }
    }
}

/// Request payload tree: query maps, header maps and parsed bodies all become
/// a `Node` before rules are resolved against them.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(IndexMap<String, Node>),
}

impl Node {
    /// A text scalar.
    pub fn text(text: impl Into<String>) -> Self {
        Node::Scalar(Scalar::text(text))
    }

    /// The empty placeholder produced for absent values.
    pub fn empty() -> Self {
        Node::Scalar(Scalar::default())
    }

    /// Builds a mapping of text scalars. Later duplicates overwrite earlier ones.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Node::Mapping(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), Node::text(v)))
                .collect(),
        )
    }

    /// True for falsy scalars: empty text (which covers JSON `null` and the
    /// absent-value placeholder), a JSON number equal to zero and JSON `false`.
    /// Text is never falsy by content, so the query value `"0"` is present.
    /// Containers are never empty, even with no items.
    pub fn is_empty(&self) -> bool {
        let Node::Scalar(scalar) = self else {
            return false;
        };
        match scalar.kind {
            _ if scalar.text.is_empty() => true,
            ScalarKind::Number => scalar.text.parse::<f64>().is_ok_and(|n| n == 0.0),
            ScalarKind::Bool => scalar.text == "false",
            ScalarKind::Text | ScalarKind::Null => false,
        }
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    /// Text of a scalar node.
    pub fn as_str(&self) -> Option<&str> {
        self.as_scalar().map(|s| s.text.as_str())
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&IndexMap<String, Node>> {
        match self {
            Node::Mapping(map) => Some(map),
            _ => None,
        }
    }

    /// Looks up one path segment: a key on a mapping, or an index on a sequence.
    pub fn get(&self, segment: &str) -> Option<&Node> {
        self.locate(segment).map(|(_, node)| node)
    }

    /// Like [`Node::get`], also returning the step taken.
    pub(crate) fn locate(&self, segment: &str) -> Option<(Step, &Node)> {
        match self {
            Node::Mapping(map) => map
                .get(segment)
                .map(|node| (Step::Key(segment.to_string()), node)),
            Node::Sequence(items) => {
                let index = array_index(segment)?;
                items.get(index).map(|node| (Step::Index(index), node))
            }
            Node::Scalar(_) => None,
        }
    }

    /// Follows a write target from this node.
    pub fn pointer(&self, steps: &[Step]) -> Option<&Node> {
        steps.iter().try_fold(self, |node, step| match (node, step) {
            (Node::Mapping(map), Step::Key(key)) => map.get(key),
            (Node::Sequence(items), Step::Index(i)) => items.get(*i),
            _ => None,
        })
    }

    pub fn pointer_mut(&mut self, steps: &[Step]) -> Option<&mut Node> {
        let mut node = self;
        for step in steps {
            node = match (node, step) {
                (Node::Mapping(map), Step::Key(key)) => map.get_mut(key)?,
                (Node::Sequence(items), Step::Index(i)) => items.get_mut(*i)?,
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Canonical array index: ASCII digits without sign or leading zero.
fn array_index(segment: &str) -> Option<usize> {
    let canonical = !segment.is_empty()
        && segment.bytes().all(|b| b.is_ascii_digit())
        && (segment == "0" || !segment.starts_with('0'));
    if canonical { segment.parse().ok() } else { None }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Node::text(text)
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Node::text(text)
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Node::Scalar(Scalar {
                text: String::new(),
                kind: ScalarKind::Null,
            }),
            Value::Bool(b) => Node::Scalar(Scalar {
                text: b.to_string(),
                kind: ScalarKind::Bool,
            }),
            Value::Number(n) => Node::Scalar(Scalar {
                text: n.to_string(),
                kind: ScalarKind::Number,
            }),
            Value::String(s) => Node::text(s),
            Value::Array(items) => Node::Sequence(items.into_iter().map(Node::from).collect()),
            Value::Object(map) => {
                Node::Mapping(map.into_iter().map(|(k, v)| (k, Node::from(v))).collect())
            }
        }
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        match node {
            Node::Scalar(scalar) => scalar_to_value(scalar),
            Node::Sequence(items) => Value::Array(items.iter().map(Value::from).collect()),
            Node::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), Value::from(v)))
                    .collect(),
            ),
        }
    }
}

fn scalar_to_value(scalar: &Scalar) -> Value {
    match scalar.kind {
        ScalarKind::Text => Value::String(scalar.text.clone()),
        ScalarKind::Null => Value::Null,
        ScalarKind::Bool => Value::Bool(scalar.text == "true"),
        // A number whose text no longer parses falls back to a string.
        ScalarKind::Number => match serde_json::from_str::<Value>(&scalar.text) {
            Ok(n @ Value::Number(_)) => n,
            _ => Value::String(scalar.text.clone()),
        },
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        Value::from(self).serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(Node::from)
    }
}

// ─── Path ────────────────────────────────────────────────────────────────────

/// One dot-separated path segment.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Segment {
    Key(String),
    /// `*`: fan out over the sequence produced by the previous segment.
    Wildcard,
}

/// One step of a write target: how to get from a container to its child.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Step {
    Key(String),
    Index(usize),
}

/// A dotted rule path such as `name`, `account.name` or `color.list.*.hex`.
///
/// Always holds at least one segment: splitting `""` yields a single empty key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path {
    raw: String,
    segments: Vec<Segment>,
}

impl Path {
    pub fn parse(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = raw
            .split('.')
            .map(|s| match s {
                "*" => Segment::Wildcard,
                key => Segment::Key(key.to_string()),
            })
            .collect();
        Self { raw, segments }
    }

    /// Treats the whole string as a single key, dots and stars included.
    pub fn literal(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let segments = vec![Segment::Key(raw.clone())];
        Self { raw, segments }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn has_wildcard(&self) -> bool {
        self.segments.contains(&Segment::Wildcard)
    }
}

impl From<&str> for Path {
    fn from(raw: &str) -> Self {
        Path::parse(raw)
    }
}

impl From<String> for Path {
    fn from(raw: String) -> Self {
        Path::parse(raw)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Result of running one predicate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Pass,
    Fail(String),
}

impl Outcome {
    pub fn fail(message: impl Into<String>) -> Self {
        Outcome::Fail(message.into())
    }

    pub fn is_pass(&self) -> bool {
        matches!(self, Outcome::Pass)
    }
}

/// Length or size limits for `has_length` and `is_array`.
///
/// A zero limit counts as unset.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SizeBounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<usize>,
}

impl SizeBounds {
    pub fn min(min: usize) -> Self {
        Self {
            min: Some(min),
            max: None,
        }
    }

    pub fn max(max: usize) -> Self {
        Self {
            min: None,
            max: Some(max),
        }
    }

    pub fn between(min: usize, max: usize) -> Self {
        Self {
            min: Some(min),
            max: Some(max),
        }
    }

    pub(crate) fn effective_min(&self) -> Option<usize> {
        self.min.filter(|&m| m > 0)
    }

    pub(crate) fn effective_max(&self) -> Option<usize> {
        self.max.filter(|&m| m > 0)
    }
}

// ─── Check / Sanitizer ───────────────────────────────────────────────────────

/// A shareable leaf predicate.
#[derive(Clone)]
pub struct Check(Arc<dyn Predicate>);

impl Check {
    /// Wraps a closure `(value, key, message) -> Outcome`.
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Node, &str, Option<&str>) -> Outcome + Send + Sync + 'static,
    {
        Check(Arc::new(f))
    }

    pub fn from_predicate(predicate: impl Predicate + 'static) -> Self {
        Check(Arc::new(predicate))
    }

    pub fn run(&self, value: &Node, key: &str, message: Option<&str>) -> Outcome {
        self.0.check(value, key, message)
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Check(<predicate>)")
    }
}

/// A shareable leaf transform.
#[derive(Clone)]
pub struct Sanitizer(Arc<dyn Transform>);

impl Sanitizer {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Sanitizer(Arc::new(f))
    }

    pub fn from_transform(transform: impl Transform + 'static) -> Self {
        Sanitizer(Arc::new(transform))
    }

    pub fn apply(&self, value: &str) -> String {
        self.0.apply(value)
    }
}

impl fmt::Debug for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Sanitizer(<transform>)")
    }
}

// ─── Rule ────────────────────────────────────────────────────────────────────

/// An immutable rule descriptor for one field, produced by
/// [`RuleBuilder`](crate::builder::RuleBuilder) terminal calls.
#[derive(Clone, Debug)]
pub struct Rule {
    pub(crate) key: String,
    pub(crate) path: Path,
    pub(crate) optional: bool,
    pub(crate) checks: Vec<Check>,
    pub(crate) sanitizers: Vec<Sanitizer>,
    pub(crate) message: Option<String>,
}

impl Rule {
    /// Field label used in messages: the path as it was declared.
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    pub fn sanitizers(&self) -> &[Sanitizer] {
        &self.sanitizers
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// The same rule resolving through a different path; the key is kept.
    pub(crate) fn with_path(&self, path: Path) -> Rule {
        Rule {
            path,
            ..self.clone()
        }
    }
}
