//! # Value Adapters
//!
//! The matcher is written once against [`ValueView`]. Two adapters exist:
//!
//! - `serde_json::Value` — the document tree. Mappings are JSON objects;
//!   there are no proplists.
//! - [`Term`] — native terms. Mappings are carried-through document
//!   objects ([`Term::Map`]); proplists are lists of keyed 2-tuples.
//!
//! Adapters are read-only views: every query borrows the value and may be
//! repeated.

use spex_core::{Kind, Term};

/// One key/value pair of a mapping or proplist.
#[derive(Debug)]
pub struct Entry<'a, V> {
    /// Key text, compared against declared field names.
    pub name: &'a str,
    /// Key as it appears in a rest-capture residual.
    pub key: Term,
    pub value: &'a V,
}

/// Uniform query interface over an input value.
pub trait ValueView: Sized {
    /// Runtime-type tag. Must not consume or mutate the value.
    fn kind(&self) -> Kind;

    /// Owned native form of the value, used for literals and pass-through.
    fn to_term(&self) -> Term;

    /// Sequence elements in input order, or `None` if not a sequence.
    fn elements(&self) -> Option<Vec<&Self>>;

    /// Entries of a mapping, or `None` if not a mapping.
    fn mapping(&self) -> Option<Vec<Entry<'_, Self>>>;

    /// Entries of a key/value list in list order, or `None` if not one.
    fn proplist(&self) -> Option<Vec<Entry<'_, Self>>>;
}

impl ValueView for serde_json::Value {
    fn kind(&self) -> Kind {
        use serde_json::Value;
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Number(n) if n.is_i64() || n.is_u64() => Kind::Integer,
            Value::Number(_) => Kind::Number,
            Value::String(_) => Kind::String,
            Value::Array(_) => Kind::Array,
            Value::Object(_) => Kind::Object,
        }
    }

    fn to_term(&self) -> Term {
        Term::from(self)
    }

    fn elements(&self) -> Option<Vec<&Self>> {
        self.as_array().map(|items| items.iter().collect())
    }

    fn mapping(&self) -> Option<Vec<Entry<'_, Self>>> {
        self.as_object().map(|map| {
            map.iter()
                .map(|(k, v)| Entry {
                    name: k.as_str(),
                    key: Term::Str(k.clone()),
                    value: v,
                })
                .collect()
        })
    }

    fn proplist(&self) -> Option<Vec<Entry<'_, Self>>> {
        None
    }
}

impl ValueView for Term {
    fn kind(&self) -> Kind {
        Term::kind(self)
    }

    fn to_term(&self) -> Term {
        self.clone()
    }

    fn elements(&self) -> Option<Vec<&Self>> {
        self.as_list().map(|items| items.iter().collect())
    }

    fn mapping(&self) -> Option<Vec<Entry<'_, Self>>> {
        match self {
            Term::Map(entries) => Some(
                entries
                    .iter()
                    .map(|(k, v)| Entry {
                        name: k.as_str(),
                        key: Term::Str(k.clone()),
                        value: v,
                    })
                    .collect(),
            ),
            _ => None,
        }
    }

    fn proplist(&self) -> Option<Vec<Entry<'_, Self>>> {
        let pairs = self.as_proplist()?;
        pairs
            .into_iter()
            .map(|(key, value)| {
                key.key_name().map(|name| Entry {
                    name,
                    key: key.clone(),
                    value,
                })
            })
            .collect()
    }
}
