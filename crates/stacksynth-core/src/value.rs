//! Attribute values and references
//!
//! Attribute bags are a tagged [`Value`] tree rather than an untyped blob, so
//! the resolver can match every shape exhaustively.

use indexmap::IndexMap;
use serde_json::Number;
use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// Ordered attribute map
pub type AttributeMap = IndexMap<String, Value>;

/// A declared attribute value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Explicit null
    Null,
    /// Boolean literal
    Bool(bool),
    /// Numeric literal
    Number(Number),
    /// String literal
    String(String),
    /// Ordered list
    List(Vec<Value>),
    /// Ordered map
    Map(AttributeMap),
    /// Pointer to another node's attribute
    Reference(Reference),
}

impl Value {
    /// Build a map value from key/value pairs
    pub fn map<K, V, I>(entries: I) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a list value
    pub fn list<V, I>(items: I) -> Self
    where
        V: Into<Value>,
        I: IntoIterator<Item = V>,
    {
        Self::List(items.into_iter().map(Into::into).collect())
    }

    /// Whether this value or anything nested in it is a reference
    #[must_use]
    pub fn has_references(&self) -> bool {
        match self {
            Self::Reference(_) => true,
            Self::List(items) => items.iter().any(Value::has_references),
            Self::Map(entries) => entries.values().any(Value::has_references),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => false,
        }
    }

    /// Visit every reference nested in this value, depth first
    pub fn for_each_reference<'a>(&'a self, f: &mut impl FnMut(&'a Reference)) {
        match self {
            Self::Reference(r) => f(r),
            Self::List(items) => items.iter().for_each(|v| v.for_each_reference(f)),
            Self::Map(entries) => entries.values().for_each(|v| v.for_each_reference(f)),
            Self::Null | Self::Bool(_) | Self::Number(_) | Self::String(_) => {}
        }
    }

    /// String literal contents, if any
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<&String> for Value {
    fn from(value: &String) -> Self {
        Self::String(value.clone())
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Self::Number(value.into())
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Number(value.into())
    }
}

impl From<f64> for Value {
    /// Non-finite floats have no JSON form and become `Null`
    fn from(value: f64) -> Self {
        Number::from_f64(value).map_or(Self::Null, Self::Number)
    }
}

impl<V: Into<Value>> From<Vec<V>> for Value {
    fn from(value: Vec<V>) -> Self {
        Self::list(value)
    }
}

impl From<AttributeMap> for Value {
    fn from(value: AttributeMap) -> Self {
        Self::Map(value)
    }
}

impl From<Reference> for Value {
    fn from(value: Reference) -> Self {
        Self::Reference(value)
    }
}

/// Dotted attribute path, e.g. `environment.variables.foo` or `statement.0`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AttrPath(Vec<String>);

impl AttrPath {
    /// Create from segments
    #[inline]
    #[must_use]
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    /// Path segments
    #[inline]
    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// True when the path has no segments
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append the segments of another path
    #[must_use]
    pub fn join(&self, rest: &[String]) -> Self {
        let mut segments = self.0.clone();
        segments.extend_from_slice(rest);
        Self(segments)
    }
}

impl Display for AttrPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

impl FromStr for AttrPath {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(
            s.split('.')
                .filter(|seg| !seg.is_empty())
                .map(str::to_owned)
                .collect(),
        ))
    }
}

impl From<&str> for AttrPath {
    fn from(value: &str) -> Self {
        match value.parse() {
            Ok(path) => path,
            Err(never) => match never {},
        }
    }
}

/// Symbolic pointer to `target.path`
///
/// Holds only the target's logical name; the target node is looked up when
/// the graph is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Reference {
    target: String,
    path: AttrPath,
}

impl Reference {
    /// Create a reference to `target`'s attribute at `path`
    pub fn new(target: impl Into<String>, path: impl Into<AttrPath>) -> Self {
        Self {
            target: target.into(),
            path: path.into(),
        }
    }

    /// Logical name of the target node
    #[inline]
    #[must_use]
    pub fn target(&self) -> &str {
        &self.target
    }

    /// Attribute path on the target
    #[inline]
    #[must_use]
    pub fn path(&self) -> &AttrPath {
        &self.path
    }
}

impl Display for Reference {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.target, self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attr_path_parses_dotted_segments() {
        let path = AttrPath::from("environment.variables.foo");
        assert_eq!(path.segments(), ["environment", "variables", "foo"]);
        assert_eq!(path.to_string(), "environment.variables.foo");
    }

    #[test]
    fn attr_path_skips_empty_segments() {
        assert_eq!(AttrPath::from("a..b.").segments(), ["a", "b"]);
        assert!(AttrPath::from("").is_empty());
    }

    #[test]
    fn nested_references_are_visited() {
        let value = Value::map([
            ("role", Value::from(Reference::new("role", "arn"))),
            (
                "env",
                Value::list([Value::from("x"), Reference::new("bucket", "id").into()]),
            ),
        ]);

        let mut seen = Vec::new();
        value.for_each_reference(&mut |r| seen.push(r.to_string()));
        assert_eq!(seen, vec!["role.arn", "bucket.id"]);
        assert!(value.has_references());
        assert!(!Value::from("plain").has_references());
    }

    #[test]
    fn non_finite_float_becomes_null() {
        assert_eq!(Value::from(f64::NAN), Value::Null);
        assert_eq!(Value::from(1.5), Value::Number(Number::from_f64(1.5).unwrap()));
    }
}
