//! # Native Terms
//!
//! [`Term`] is the native key/sequence/scalar representation accepted by the
//! native front door, and the canonical representation produced by both
//! front doors.
//!
//! ## Proplists
//!
//! A proplist is a [`Term::List`] whose every element is a 2-element
//! [`Term::Tuple`] keyed by an [`Term::Atom`] or a [`Term::Str`]. Keys with
//! the same text match the same declared field regardless of which of the
//! two forms they use.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Runtime-type tag of a value, as reported by a value adapter.
///
/// The document tree reports `object`, `array`, `string`, `number`,
/// `integer`, `boolean` and `null`. Native terms additionally report
/// `atom`, `list` and `tuple`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Object,
    Array,
    String,
    /// A number that is not representable as an integer.
    Number,
    /// A number held in integer representation. Also satisfies `number`.
    Integer,
    Boolean,
    Null,
    Atom,
    List,
    Tuple,
}

impl Kind {
    /// Lowercase name used in rendered errors.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Null => "null",
            Self::Atom => "atom",
            Self::List => "list",
            Self::Tuple => "tuple",
        }
    }

    /// Returns true for both integral and non-integral numbers.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Number | Self::Integer)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A native term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Term {
    Null,
    Bool(bool),
    Int(i64),
    /// An integer above `i64::MAX`. Smaller values are always `Int`.
    UInt(u64),
    Float(f64),
    /// A UTF-8 string (binary).
    Str(String),
    /// A symbolic constant.
    Atom(String),
    List(Vec<Term>),
    Tuple(Vec<Term>),
    /// A document object carried through unchanged, in iteration order.
    Map(Vec<(String, Term)>),
}

impl Term {
    /// Construct an atom.
    pub fn atom(name: impl Into<String>) -> Self {
        Self::Atom(name.into())
    }

    /// Construct a `(key, value)` 2-tuple with a string key.
    pub fn pair(key: impl Into<String>, value: impl Into<Term>) -> Self {
        Self::Tuple(vec![Self::Str(key.into()), value.into()])
    }

    /// Construct a proplist with atom keys, preserving the given order.
    pub fn proplist<K, V, I>(pairs: I) -> Self
    where
        K: Into<String>,
        V: Into<Term>,
        I: IntoIterator<Item = (K, V)>,
    {
        Self::List(
            pairs
                .into_iter()
                .map(|(k, v)| Self::Tuple(vec![Self::Atom(k.into()), v.into()]))
                .collect(),
        )
    }

    /// Runtime-type tag of this term.
    pub fn kind(&self) -> Kind {
        match self {
            Self::Null => Kind::Null,
            Self::Bool(_) => Kind::Boolean,
            Self::Int(_) | Self::UInt(_) => Kind::Integer,
            Self::Float(_) => Kind::Number,
            Self::Str(_) => Kind::String,
            Self::Atom(_) => Kind::Atom,
            Self::List(_) => Kind::List,
            Self::Tuple(_) => Kind::Tuple,
            Self::Map(_) => Kind::Object,
        }
    }

    /// Text of an atom or string term, used when the term is a field key.
    pub fn key_name(&self) -> Option<&str> {
        match self {
            Self::Atom(s) | Self::Str(s) => Some(s),
            _ => None,
        }
    }

    /// View this term as a proplist: `(key, value)` pairs in list order.
    ///
    /// Returns `None` unless the term is a list whose every element is a
    /// 2-tuple keyed by an atom or a string. The empty list is an empty
    /// proplist.
    pub fn as_proplist(&self) -> Option<Vec<(&Term, &Term)>> {
        let Self::List(items) = self else {
            return None;
        };
        items
            .iter()
            .map(|item| match item {
                Self::Tuple(kv) if kv.len() == 2 && kv[0].key_name().is_some() => {
                    Some((&kv[0], &kv[1]))
                }
                _ => None,
            })
            .collect()
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(n) => Some(*n),
            _ => None,
        }
    }

    /// Value of a non-negative integer term.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Self::Int(n) => u64::try_from(*n).ok(),
            Self::UInt(n) => Some(*n),
            _ => None,
        }
    }

    /// Numeric value of an integer or float term.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(n) => Some(*n as f64),
            Self::UInt(n) => Some(*n as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_tuple(&self) -> Option<&[Term]> {
        match self {
            Self::Tuple(items) => Some(items),
            _ => None,
        }
    }
}

fn write_joined<'a, I>(f: &mut fmt::Formatter<'_>, items: I) -> fmt::Result
where
    I: IntoIterator<Item = &'a Term>,
{
    for (i, item) in items.into_iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Literal form used in rendered errors.
impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::UInt(n) => write!(f, "{n}"),
            // Debug keeps the fractional part of integral floats ("3.0").
            Self::Float(x) => write!(f, "{x:?}"),
            Self::Str(s) => write!(f, "{s:?}"),
            Self::Atom(a) => f.write_str(a),
            Self::List(items) => {
                f.write_str("[")?;
                write_joined(f, items)?;
                f.write_str("]")
            }
            Self::Tuple(items) => {
                f.write_str("(")?;
                write_joined(f, items)?;
                f.write_str(")")
            }
            Self::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k:?}: {v}")?;
                }
                f.write_str("}")
            }
        }
    }
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Term {
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<i32> for Term {
    fn from(n: i32) -> Self {
        Self::Int(i64::from(n))
    }
}

impl From<u64> for Term {
    fn from(n: u64) -> Self {
        i64::try_from(n).map_or(Self::UInt(n), Self::Int)
    }
}

impl From<f64> for Term {
    fn from(x: f64) -> Self {
        Self::Float(x)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

impl From<Vec<Term>> for Term {
    fn from(items: Vec<Term>) -> Self {
        Self::List(items)
    }
}

/// Integral numbers become `Int`, or `UInt` above `i64::MAX`. Everything
/// else becomes `Float`.
impl From<&serde_json::Value> for Term {
    fn from(value: &serde_json::Value) -> Self {
        use serde_json::Value;
        match value {
            Value::Null => Self::Null,
            Value::Bool(b) => Self::Bool(*b),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Self::Int(i),
                (None, Some(u)) => Self::UInt(u),
                _ => n.as_f64().map_or(Self::Null, Self::Float),
            },
            Value::String(s) => Self::Str(s.clone()),
            Value::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            Value::Object(map) => Self::Map(
                map.iter()
                    .map(|(k, v)| (k.clone(), Self::from(v)))
                    .collect(),
            ),
        }
    }
}

impl From<serde_json::Value> for Term {
    fn from(value: serde_json::Value) -> Self {
        Self::from(&value)
    }
}
