//! Path resolution over request payload trees.
//!
//! Two resolvers share one contract: given a root [`Node`] and a rule path,
//! produce the ordered list of located values together with the write target
//! each one came from. Absence is never an error here; it yields a single empty
//! placeholder that the pipeline judges against the rule's optionality.

use std::borrow::Cow;

use crate::types::{Node, Path, Segment, Step};

/// A value found by the resolver.
#[derive(Clone, Debug, PartialEq)]
pub struct Located<'a> {
    pub value: Cow<'a, Node>,
    /// Steps from the root to `value`. `None` for the absent-value placeholder.
    pub target: Option<Vec<Step>>,
}

impl<'a> Located<'a> {
    fn at(value: &'a Node, target: Vec<Step>) -> Self {
        Self {
            value: Cow::Borrowed(value),
            target: Some(target),
        }
    }

    fn placeholder() -> Self {
        Self {
            value: Cow::Owned(Node::empty()),
            target: None,
        }
    }
}

// ─── resolve ─────────────────────────────────────────────────────────────────

/// Resolves `path` against `root`, picking the resolver by path shape.
///
/// Paths without `*` always produce exactly one element.
pub fn resolve<'a>(root: &'a Node, path: &Path) -> Vec<Located<'a>> {
    if path.has_wildcard() {
        resolve_wildcard_path(root, path.segments())
    } else {
        vec![resolve_simple_path(root, path.segments())]
    }
}

// ─── resolve_simple_path ─────────────────────────────────────────────────────

/// Descends one segment at a time. Any missing level yields the placeholder.
///
/// Wildcard segments are skipped; callers route wildcard paths to
/// [`resolve_wildcard_path`].
pub fn resolve_simple_path<'a>(root: &'a Node, segments: &[Segment]) -> Located<'a> {
    let mut current = root;
    let mut target = Vec::with_capacity(segments.len());

    for segment in segments {
        let Segment::Key(key) = segment else {
            continue;
        };
        match current.locate(key) {
            Some((step, next)) => {
                target.push(step);
                current = next;
            }
            None => return Located::placeholder(),
        }
    }

    Located::at(current, target)
}

// ─── resolve_wildcard_path ───────────────────────────────────────────────────

/// Resolves a path that may fan out over sequences.
///
/// Every sequence met by a key lookup is expanded element by element, depth
/// first, left to right. A `*` segment itself only consumes a segment: after a
/// lookup that yielded a non-sequence it passes the same value through.
/// A missing or empty lookup ends that branch with one placeholder.
pub fn resolve_wildcard_path<'a>(root: &'a Node, segments: &[Segment]) -> Vec<Located<'a>> {
    let mut out = Vec::new();
    let mut target = Vec::new();
    walk(root, segments, &mut target, &mut out);
    out
}

fn walk<'a>(
    node: &'a Node,
    segments: &[Segment],
    target: &mut Vec<Step>,
    out: &mut Vec<Located<'a>>,
) {
    let Some((first, rest)) = segments.split_first() else {
        out.push(Located::at(node, target.clone()));
        return;
    };

    let key = match first {
        Segment::Wildcard => return walk(node, rest, target, out),
        Segment::Key(key) => key,
    };

    let (step, value) = match node.locate(key) {
        Some(found) if !found.1.is_empty() => found,
        _ => {
            out.push(Located::placeholder());
            return;
        }
    };

    target.push(step);
    match value {
        Node::Sequence(items) => {
            for (index, item) in items.iter().enumerate() {
                target.push(Step::Index(index));
                walk(item, rest, target, out);
                target.pop();
            }
        }
        _ => walk(value, rest, target, out),
    }
    target.pop();
}

// ─── write_at ────────────────────────────────────────────────────────────────

/// Replaces the node at `target`. Returns `false` when the target no longer exists.
pub fn write_at(root: &mut Node, target: &[Step], value: Node) -> bool {
    match root.pointer_mut(target) {
        Some(slot) => {
            *slot = value;
            true
        }
        None => false,
    }
}
