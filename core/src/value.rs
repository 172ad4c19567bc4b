//! Value and key types for Cadre concepts.
//!
//! Values are the atomic data stored in concept key and payload fields.
//! A `Key` is a concept's structural identity: its kind plus its key values.
//! References between concepts are values holding the target's `Key`, so two
//! references are equal exactly when their targets are structurally equal.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A value that can be stored in a key or payload field.
///
/// Values are totally ordered and hashable (there is no float variant) so
/// that keys can index ordered and hashed collections alike.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Value {
    /// Null/missing value.
    Null,
    /// Boolean value.
    Bool(bool),
    /// 64-bit signed integer.
    Int(i64),
    /// UTF-8 string.
    String(String),
    /// Non-owning reference to another concept, by structural key.
    Ref(Key),
    /// List of values.
    List(Vec<Value>),
}

impl Value {
    /// Returns true if this is a null value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true if this is a reference.
    pub fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    /// Get as boolean if this is a Bool value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Get as integer if this is an Int value.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Get as string reference if this is a String value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the referenced key if this is a Ref value.
    pub fn as_key(&self) -> Option<&Key> {
        match self {
            Value::Ref(key) => Some(key),
            _ => None,
        }
    }

    /// Get the items if this is a List value.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns the type name of this value.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Null",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::String(_) => "String",
            Value::Ref(_) => "Ref",
            Value::List(_) => "List",
        }
    }

    /// Collect every key referenced directly by this value (lists are walked,
    /// referenced keys are not descended into).
    pub fn collect_refs<'a>(&'a self, out: &mut Vec<&'a Key>) {
        match self {
            Value::Ref(key) => out.push(key),
            Value::List(items) => {
                for item in items {
                    item.collect_refs(out);
                }
            }
            _ => {}
        }
    }

    /// Render this value as a segment of a key path.
    fn write_path(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Ref(key) => key.write_path(f),
            Value::String(s) => write!(f, "{}", s),
            other => write!(f, "{}", other),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "\"{}\"", s),
            Value::Ref(key) => write!(f, "<{}>", key),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
        }
    }
}

/// Structural key of a concept: its kind plus its ordered key values.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Key {
    /// Kind tag of the identified concept.
    pub kind: String,
    /// Key field values, in declaration order.
    pub fields: Vec<Value>,
}

impl Key {
    /// Create a new key.
    pub fn new(kind: impl Into<String>, fields: Vec<Value>) -> Self {
        Self {
            kind: kind.into(),
            fields,
        }
    }

    /// Keys referenced directly from the key fields.
    pub fn refs(&self) -> Vec<&Key> {
        let mut out = Vec::new();
        for field in &self.fields {
            field.collect_refs(&mut out);
        }
        out
    }

    /// Dotted path of the key fields, e.g. `Bookstore.Book.CreatedAt`.
    pub fn path(&self) -> String {
        struct Path<'a>(&'a Key);
        impl fmt::Display for Path<'_> {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.write_path(f)
            }
        }
        Path(self).to_string()
    }

    fn write_path(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ".")?;
            }
            field.write_path(f)?;
        }
        Ok(())
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ", self.kind)?;
        self.write_path(f)
    }
}

// Convenient From implementations
impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i as i64)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Key> for Value {
    fn from(key: Key) -> Self {
        Value::Ref(key)
    }
}

impl From<&Key> for Value {
    fn from(key: &Key) -> Self {
        Value::Ref(key.clone())
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::List(items)
    }
}

/// Type alias for payload storage. Ordered so that equal payloads compare,
/// hash and serialize identically.
pub type Attributes = BTreeMap<String, Value>;

/// Helper macro to create payload maps.
#[macro_export]
macro_rules! attrs {
    () => {
        std::collections::BTreeMap::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        {
            let mut map = std::collections::BTreeMap::new();
            $(
                map.insert($key.to_string(), $crate::Value::from($value));
            )+
            map
        }
    };
}
