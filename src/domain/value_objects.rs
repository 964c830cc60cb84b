//! Domain value objects - Immutable objects that describe aspects of the domain

use serde::{Deserialize, Serialize};

/// Macro to implement common traits for string wrapper types
macro_rules! impl_string_wrapper {
    ($type:ident) => {
        impl $type {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<String> for $type {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $type {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl std::fmt::Display for $type {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

/// Unique identifier for a character
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CharacterId(String);
impl_string_wrapper!(CharacterId);

/// Unique identifier for a category
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CategoryId(String);
impl_string_wrapper!(CategoryId);

/// Unique identifier for an entry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntryId(String);
impl_string_wrapper!(EntryId);

/// Unique identifier for an output window
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OutputId(String);
impl_string_wrapper!(OutputId);

/// A dynamic-data value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    Text(String),
    Integer(i64),
    Float(f64),
}

impl Value {
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Render the value the way it appears in resolved templates.
    ///
    /// Whole-number floats print without a trailing fraction.
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => {
                if f.fract() == 0.0 && f.is_finite() {
                    (*f as i64).to_string()
                } else {
                    f.to_string()
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

/// Declared kind of a dynamic-data value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Text,
    Integer,
    Float,
}

impl ValueKind {
    /// Seed value used the first time a key is touched.
    pub fn seed(self) -> Value {
        match self {
            ValueKind::Text => Value::Text(String::new()),
            ValueKind::Integer => Value::Integer(0),
            ValueKind::Float => Value::Float(0.0),
        }
    }
}

/// Mutation operator applied to a dynamic-data key
///
/// `Assign` is the only operator valid for `ValueKind::Text`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
}

/// Evaluation scope controlling when an operation is applied
/// relative to a history index's processing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Scope {
    /// Applied immediately, visible to later operations
    Instant,
    /// Deferred to the end of the current history index
    Final,
    /// Stored as a named formula, re-resolved on every reference
    Function,
}

/// A single dynamic-data mutation declared on a category or entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicOp {
    pub key: String,
    pub operator: Operator,
    pub kind: ValueKind,
    pub scope: Scope,
    pub expression: String,
}

impl DynamicOp {
    pub fn new(
        key: impl Into<String>,
        operator: Operator,
        kind: ValueKind,
        scope: Scope,
        expression: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            operator,
            kind,
            scope,
            expression: expression.into(),
        }
    }
}

/// Positional schema-edit instruction for a category's property list
///
/// Each instruction must be replayed against every existing entry's value
/// list so data stays aligned with the reordered schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PropertyEdit {
    InsertAt {
        index: usize,
        name: String,
        large_input: bool,
    },
    Delete {
        index: usize,
    },
    MoveUp {
        index: usize,
    },
    MoveDown {
        index: usize,
    },
}
