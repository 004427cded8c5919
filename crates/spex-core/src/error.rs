//! # Error Types — Path-Located Validation Failures
//!
//! Validation is fail-fast: the first failure detected during a
//! left-to-right, top-to-bottom traversal becomes a single [`MatchError`],
//! built once at the failure site and returned unchanged to the caller.
//!
//! ## Rendering
//!
//! [`error_to_english`] is the `Display` of [`MatchError`]:
//!
//! ```text
//! At path .foo[2] : Value "42" has type string, but number was expected
//! ```
//!
//! Offending literals are always included and truncated to
//! [`MAX_LITERAL_CHARS`] characters.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::path::Path;
use crate::term::{Kind, Term};

/// Longest literal rendered in an error message before truncation.
pub const MAX_LITERAL_CHARS: usize = 64;

/// The closed taxonomy of validation failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ErrorKind {
    /// The value's runtime type (or literal, for `member`) is not the
    /// expected one.
    WrongType {
        /// The offending value.
        value: Term,
        /// Runtime-type tag of the offending value.
        actual: Kind,
        /// Description of what was expected.
        expected: String,
    },

    /// A required field is absent.
    MissingField {
        /// Name of the first missing field, in declaration order.
        field: String,
    },

    /// Undeclared fields are present and no rest capture is declared.
    SuperfluousFields {
        /// Every residual key, sorted by name.
        fields: Vec<String>,
    },

    /// A `satisfy` predicate returned false.
    ConstraintNotSatisfied {
        /// Human-readable label of the predicate.
        description: String,
        /// The value the predicate rejected.
        value: Term,
    },

    /// A `convert` function (or rest-capture transform) failed.
    ConversionFailed {
        /// Human-readable label of the conversion.
        description: String,
        /// The value the conversion was applied to.
        value: Term,
        /// Failure reason reported by the conversion, possibly empty.
        reason: String,
    },
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::WrongType {
                value,
                actual,
                expected,
            } => write!(
                f,
                "Value {} has type {actual}, but {expected} was expected",
                literal(value)
            ),
            Self::MissingField { field } => write!(f, "The object is missing field {field}"),
            Self::SuperfluousFields { fields } => write!(
                f,
                "The object has superfluous fields: {}",
                fields.join(", ")
            ),
            Self::ConstraintNotSatisfied { description, value } => write!(
                f,
                "The value does not satisfy {description}: {}",
                literal(value)
            ),
            Self::ConversionFailed {
                description,
                value,
                reason,
            } => {
                write!(
                    f,
                    "The value could not be converted by {description}: {}",
                    literal(value)
                )?;
                if !reason.is_empty() {
                    write!(f, " ({reason})")?;
                }
                Ok(())
            }
        }
    }
}

/// A validation failure located by its root-to-node path.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("At path {path} : {kind}")]
pub struct MatchError {
    /// Path from the root to the failing node.
    pub path: Path,
    /// What went wrong there.
    pub kind: ErrorKind,
}

impl MatchError {
    pub fn new(path: Path, kind: ErrorKind) -> Self {
        Self { path, kind }
    }

    pub fn wrong_type(path: Path, value: Term, expected: impl Into<String>) -> Self {
        let actual = value.kind();
        Self::wrong_type_with_kind(path, value, actual, expected)
    }

    /// Like [`MatchError::wrong_type`], for adapters whose runtime tag differs
    /// from the tag of the value's canonical term (e.g. document arrays).
    pub fn wrong_type_with_kind(
        path: Path,
        value: Term,
        actual: Kind,
        expected: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            ErrorKind::WrongType {
                value,
                actual,
                expected: expected.into(),
            },
        )
    }

    pub fn missing_field(path: Path, field: impl Into<String>) -> Self {
        Self::new(
            path,
            ErrorKind::MissingField {
                field: field.into(),
            },
        )
    }

    pub fn superfluous_fields(path: Path, fields: Vec<String>) -> Self {
        Self::new(path, ErrorKind::SuperfluousFields { fields })
    }

    pub fn constraint_not_satisfied(
        path: Path,
        description: impl Into<String>,
        value: Term,
    ) -> Self {
        Self::new(
            path,
            ErrorKind::ConstraintNotSatisfied {
                description: description.into(),
                value,
            },
        )
    }

    pub fn conversion_failed(
        path: Path,
        description: impl Into<String>,
        value: Term,
        reason: impl Into<String>,
    ) -> Self {
        Self::new(
            path,
            ErrorKind::ConversionFailed {
                description: description.into(),
                value,
                reason: reason.into(),
            },
        )
    }
}

/// Render an error as a deterministic English sentence.
pub fn error_to_english(error: &MatchError) -> String {
    error.to_string()
}

/// Literal form of a term, truncated to [`MAX_LITERAL_CHARS`] characters.
fn literal(term: &Term) -> String {
    let rendered = term.to_string();
    match rendered.char_indices().nth(MAX_LITERAL_CHARS) {
        Some((cut, _)) => format!("{}...", &rendered[..cut]),
        None => rendered,
    }
}

/// A specification rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpecError {
    /// More than one rest-capture directive in one field list.
    #[error("at most one rest-capture directive is allowed per object or proplist")]
    DuplicateRest,

    /// The same key declared twice in one field list.
    #[error("field '{0}' is declared more than once")]
    DuplicateField(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrong_type_at_index() {
        let err = MatchError::wrong_type(Path::root().index(2), Term::Int(42), "boolean");
        assert_eq!(
            error_to_english(&err),
            "At path [2] : Value 42 has type integer, but boolean was expected"
        );
    }

    #[test]
    fn test_wrong_type_at_root_includes_literal() {
        let err = MatchError::wrong_type(Path::root(), Term::from("42"), "number");
        assert_eq!(
            err.to_string(),
            "At path (root) : Value \"42\" has type string, but number was expected"
        );
    }

    #[test]
    fn test_missing_field_message() {
        let err = MatchError::missing_field(Path::root(), "heavy");
        assert_eq!(
            err.to_string(),
            "At path (root) : The object is missing field heavy"
        );
    }

    #[test]
    fn test_superfluous_fields_message() {
        let err = MatchError::superfluous_fields(
            Path::root().field("cfg"),
            vec!["a".into(), "c".into()],
        );
        assert_eq!(
            err.to_string(),
            "At path .cfg : The object has superfluous fields: a, c"
        );
    }

    #[test]
    fn test_constraint_message() {
        let err = MatchError::constraint_not_satisfied(
            Path::root().field("n"),
            "positive",
            Term::Int(-3),
        );
        assert_eq!(
            err.to_string(),
            "At path .n : The value does not satisfy positive: -3"
        );
    }

    #[test]
    fn test_conversion_message_with_and_without_reason() {
        let bare = MatchError::conversion_failed(Path::root(), "to atom", Term::from("x"), "");
        assert_eq!(
            bare.to_string(),
            "At path (root) : The value could not be converted by to atom: \"x\""
        );
        let reasoned =
            MatchError::conversion_failed(Path::root(), "parse port", Term::from("x"), "not a number");
        assert!(reasoned.to_string().ends_with("(not a number)"));
    }

    #[test]
    fn test_long_literals_are_truncated() {
        let long = Term::Str("x".repeat(200));
        let err = MatchError::wrong_type(Path::root(), long, "number");
        let msg = err.to_string();
        assert!(msg.contains("..."));
        assert!(msg.len() < 150, "message not truncated: {msg}");
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let err = MatchError::missing_field(Path::root().field("a"), "b");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "path": [{"field": "a"}],
                "kind": {"kind": "missing_field", "field": "b"}
            })
        );
    }

    #[test]
    fn test_spec_error_display() {
        assert!(SpecError::DuplicateRest.to_string().contains("rest-capture"));
        assert_eq!(
            SpecError::DuplicateField("a".into()).to_string(),
            "field 'a' is declared more than once"
        );
    }
}
