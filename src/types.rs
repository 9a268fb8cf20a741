//! Core, format-agnostic types for phrasebook.
//! Decoders produce these; the merger consumes them.

use std::{
    collections::{BTreeMap, HashMap},
    fmt::Display,
};

/// Literal stored for a null/undefined document value.
pub const UNDEFINED_PHRASE: &str = "<undefined>";

/// A decoded document: keys mapped to values, nested trees for namespaces.
pub type Tree = BTreeMap<String, Value>;

/// One value of a decoded document.
///
/// This is the whole vocabulary a decoder may hand over. Scalars become
/// phrases, trees become namespaces and lists are only accepted as the
/// single-element wrapper of a metadata block.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    String(String),
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    Null,
    Tree(Tree),
    List(Vec<Value>),
}

impl Value {
    /// Human readable name of the value's type, used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::UInt(_) => "unsigned integer",
            Value::Float(_) => "float",
            Value::Null => "null",
            Value::Tree(_) => "table",
            Value::List(_) => "array",
        }
    }

    /// Canonical phrase form of a scalar, `None` for trees and lists.
    ///
    /// Floats keep two fractional digits and non-finite floats read `+Inf`,
    /// `-Inf` or `NaN`. Null becomes [`UNDEFINED_PHRASE`].
    pub fn to_phrase(&self) -> Option<String> {
        match self {
            Value::String(value) => Some(value.clone()),
            Value::Bool(value) => Some(value.to_string()),
            Value::Int(value) => Some(value.to_string()),
            Value::UInt(value) => Some(value.to_string()),
            Value::Float(value) if value.is_nan() => Some("NaN".to_string()),
            Value::Float(value) if value.is_infinite() => {
                Some(if value.is_sign_positive() { "+Inf" } else { "-Inf" }.to_string())
            }
            Value::Float(value) => Some(format!("{:.2}", value)),
            Value::Null => Some(UNDEFINED_PHRASE.to_string()),
            Value::Tree(_) | Value::List(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Value::UInt(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Float(value)
    }
}

impl From<Tree> for Value {
    fn from(value: Tree) -> Self {
        Value::Tree(value)
    }
}

/// Named arguments substituted into `{{name}}` verbs of a phrase.
///
/// Values are rendered through [`Display`] when they are inserted.
///
/// ```rust
/// use phrasebook::Args;
/// let args = Args::new().with("name", "Frank").with("count", 3);
/// assert_eq!(args.get("count"), Some("3"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Args {
    values: HashMap<String, String>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an argument, returning `self` for chaining.
    pub fn with(mut self, name: impl Into<String>, value: impl Display) -> Self {
        self.insert(name, value);
        self
    }

    /// Adds or replaces an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Display) {
        self.values.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Args
where
    K: Into<String>,
    V: Display,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut args = Args::new();
        for (name, value) in iter {
            args.insert(name, value);
        }
        args
    }
}

impl<K, V> From<HashMap<K, V>> for Args
where
    K: Into<String>,
    V: Display,
{
    fn from(values: HashMap<K, V>) -> Self {
        values.into_iter().collect()
    }
}
