//! # Type Specifications
//!
//! A [`TypeSpec`] is an immutable tree describing the expected shape of a
//! value. It is built once by the caller and may be shared across threads
//! and reused for any number of validations.
//!
//! ## Construction-Time Checks
//!
//! Field lists are wrapped in [`Fields`], whose only constructor rejects
//! malformed lists (two rest-capture directives, a key declared twice).
//! A malformed object or proplist specification therefore cannot reach
//! the matcher.
//!
//! ## Field Order
//!
//! The declaration order of a field list fixes the layout of the canonical
//! tuple: slot `i` holds the canonical value of the `i`-th declared field,
//! whatever order the input presents its keys in.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use spex_core::{SpecError, Term};

/// Predicate used by [`TypeSpec::Satisfy`].
pub type Predicate = Arc<dyn Fn(&Term) -> bool + Send + Sync>;

/// Fallible transformation used by [`TypeSpec::Convert`] and rest capture.
/// The `Err` string is a reason included in the rendered error.
pub type Converter = Arc<dyn Fn(&Term) -> Result<Term, String> + Send + Sync>;

/// Produces the specification behind a [`TypeSpec::Named`] reference.
pub type Resolver = Arc<dyn Fn() -> TypeSpec + Send + Sync>;

/// Declarative description of an expected value shape.
#[derive(Clone)]
pub enum TypeSpec {
    String,
    /// Any number, integral or not.
    Number,
    /// A number in integer representation.
    Integer,
    Boolean,
    /// Matches anything and passes it through unchanged.
    Any,
    /// Sequence of elements matching the inner spec (document form).
    Array(Box<TypeSpec>),
    /// Sequence of elements matching the inner spec (native form).
    List(Box<TypeSpec>),
    /// Mapping canonicalized to a tuple in declaration order.
    Object(Fields),
    /// Key/value list canonicalized to a tuple in declaration order.
    Proplist(Fields),
    /// One of a fixed set of literals.
    Member(Vec<Term>),
    Satisfy {
        predicate: Predicate,
        description: String,
    },
    Convert {
        function: Converter,
        description: String,
    },
    /// Stages applied left to right, each consuming the previous output.
    Pipeline(Vec<TypeSpec>),
    /// A lazily resolved specification, for recursive shapes. No cycle
    /// detection is performed.
    Named { name: String, resolve: Resolver },
}

impl TypeSpec {
    pub fn array(element: TypeSpec) -> Self {
        Self::Array(Box::new(element))
    }

    pub fn list(element: TypeSpec) -> Self {
        Self::List(Box::new(element))
    }

    /// Build an object specification.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the field list is malformed.
    pub fn object(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, SpecError> {
        Ok(Self::Object(Fields::new(fields)?))
    }

    /// Build a proplist specification.
    ///
    /// # Errors
    ///
    /// Returns a [`SpecError`] if the field list is malformed.
    pub fn proplist(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, SpecError> {
        Ok(Self::Proplist(Fields::new(fields)?))
    }

    pub fn member<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Term>,
    {
        Self::Member(values.into_iter().map(Into::into).collect())
    }

    pub fn satisfy<F>(predicate: F, description: impl Into<String>) -> Self
    where
        F: Fn(&Term) -> bool + Send + Sync + 'static,
    {
        Self::Satisfy {
            predicate: Arc::new(predicate),
            description: description.into(),
        }
    }

    pub fn convert<F>(function: F, description: impl Into<String>) -> Self
    where
        F: Fn(&Term) -> Result<Term, String> + Send + Sync + 'static,
    {
        Self::Convert {
            function: Arc::new(function),
            description: description.into(),
        }
    }

    pub fn pipeline(stages: impl IntoIterator<Item = TypeSpec>) -> Self {
        Self::Pipeline(stages.into_iter().collect())
    }

    pub fn named<F>(name: impl Into<String>, resolve: F) -> Self
    where
        F: Fn() -> TypeSpec + Send + Sync + 'static,
    {
        Self::Named {
            name: name.into(),
            resolve: Arc::new(resolve),
        }
    }

    /// Label used as the expected type in `wrong_type` errors.
    pub fn describe(&self) -> String {
        match self {
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::Any => "any".to_string(),
            Self::Array(_) => "array".to_string(),
            Self::List(_) => "list".to_string(),
            Self::Object(_) => "object".to_string(),
            Self::Proplist(_) => "proplist".to_string(),
            Self::Member(values) => {
                let values: Vec<String> = values.iter().map(ToString::to_string).collect();
                format!("one of [{}]", values.join(", "))
            }
            Self::Satisfy { description, .. } | Self::Convert { description, .. } => {
                description.clone()
            }
            Self::Pipeline(stages) => {
                let stages: Vec<String> = stages.iter().map(Self::describe).collect();
                stages.join(" |> ")
            }
            Self::Named { name, .. } => name.clone(),
        }
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Array(inner) => f.debug_tuple("Array").field(inner).finish(),
            Self::List(inner) => f.debug_tuple("List").field(inner).finish(),
            Self::Object(fields) => f.debug_tuple("Object").field(fields).finish(),
            Self::Proplist(fields) => f.debug_tuple("Proplist").field(fields).finish(),
            Self::Member(values) => f.debug_tuple("Member").field(values).finish(),
            Self::Satisfy { description, .. } => {
                f.debug_struct("Satisfy").field("description", description).finish()
            }
            Self::Convert { description, .. } => {
                f.debug_struct("Convert").field("description", description).finish()
            }
            Self::Pipeline(stages) => f.debug_tuple("Pipeline").field(stages).finish(),
            // The resolved spec is not expanded: it may be recursive.
            Self::Named { name, .. } => f.debug_struct("Named").field("name", name).finish(),
            scalar => f.write_str(&scalar.describe()),
        }
    }
}

/// One entry of an object or proplist field list.
#[derive(Clone)]
pub enum FieldSpec {
    /// Field that must be present.
    Required { key: String, spec: TypeSpec },
    /// Field that may be absent; `default` is used verbatim when it is.
    Optional {
        key: String,
        spec: TypeSpec,
        default: Term,
    },
    /// Collects every undeclared key into one slot via the transform.
    Rest(Converter),
}

impl FieldSpec {
    pub fn required(key: impl Into<String>, spec: TypeSpec) -> Self {
        Self::Required {
            key: key.into(),
            spec,
        }
    }

    pub fn optional(key: impl Into<String>, spec: TypeSpec, default: impl Into<Term>) -> Self {
        Self::Optional {
            key: key.into(),
            spec,
            default: default.into(),
        }
    }

    pub fn rest<F>(transform: F) -> Self
    where
        F: Fn(&Term) -> Result<Term, String> + Send + Sync + 'static,
    {
        Self::Rest(Arc::new(transform))
    }

    /// Rest capture that keeps the residual `(key, value)` list as is.
    pub fn rest_identity() -> Self {
        Self::rest(|residual| Ok(residual.clone()))
    }

    /// Declared key, or `None` for a rest-capture directive.
    pub fn key(&self) -> Option<&str> {
        match self {
            Self::Required { key, .. } | Self::Optional { key, .. } => Some(key),
            Self::Rest(_) => None,
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required { key, spec } => f
                .debug_struct("Required")
                .field("key", key)
                .field("spec", spec)
                .finish(),
            Self::Optional { key, spec, default } => f
                .debug_struct("Optional")
                .field("key", key)
                .field("spec", spec)
                .field("default", default)
                .finish(),
            Self::Rest(_) => f.write_str("Rest"),
        }
    }
}

/// A validated field list.
///
/// # Invariants
///
/// - At most one [`FieldSpec::Rest`] directive.
/// - No key is declared twice.
#[derive(Clone, Debug)]
pub struct Fields {
    fields: Vec<FieldSpec>,
}

impl Fields {
    /// Validate and wrap a field list, preserving declaration order.
    ///
    /// # Errors
    ///
    /// Returns `SpecError::DuplicateRest` for a second rest-capture directive
    /// and `SpecError::DuplicateField` for a repeated key.
    pub fn new(fields: impl IntoIterator<Item = FieldSpec>) -> Result<Self, SpecError> {
        let fields: Vec<FieldSpec> = fields.into_iter().collect();
        let mut keys = HashSet::new();
        let mut rest_seen = false;
        for field in &fields {
            match field.key() {
                Some(key) => {
                    if !keys.insert(key) {
                        return Err(SpecError::DuplicateField(key.to_string()));
                    }
                }
                None if rest_seen => return Err(SpecError::DuplicateRest),
                None => rest_seen = true,
            }
        }
        Ok(Self { fields })
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FieldSpec> {
        self.fields.iter()
    }

    /// Number of slots in the canonical tuple.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns true if `key` is declared as a required or optional field.
    pub fn declares(&self, key: &str) -> bool {
        self.fields.iter().any(|f| f.key() == Some(key))
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = &'a FieldSpec;
    type IntoIter = std::slice::Iter<'a, FieldSpec>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
