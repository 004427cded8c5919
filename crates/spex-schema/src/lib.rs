//! # spex-schema — Type Specifications & Matching
//!
//! Validates an untyped value against a declarative [`TypeSpec`] and, on
//! success, rewrites it into a canonical [`Term`] suitable for positional
//! destructuring. On failure it returns a single [`MatchError`] naming the
//! deepest point of failure and its path.
//!
//! ## Front Doors
//!
//! - [`validate_document`] — input is a parsed document tree
//!   (`serde_json::Value`, from JSON or any serde-compatible format).
//! - [`validate_native`] — input is a native [`Term`], with proplists in
//!   place of mappings.
//!
//! Both adapt their input through [`ValueView`] and hand off to the same
//! [`matcher`].
//!
//! ## Example
//!
//! ```
//! use serde_json::json;
//! use spex_schema::{validate_document, FieldSpec, Term, TypeSpec};
//!
//! let spec = TypeSpec::object([
//!     FieldSpec::required("b", TypeSpec::Number),
//!     FieldSpec::rest_identity(),
//! ])
//! .unwrap();
//! let canonical = validate_document(&json!({"a": 12, "b": 23, "c": 34}), &spec).unwrap();
//! assert_eq!(
//!     canonical,
//!     Term::Tuple(vec![
//!         Term::Int(23),
//!         Term::List(vec![Term::pair("a", 12), Term::pair("c", 34)]),
//!     ])
//! );
//! ```
//!
//! ## Crate Policy
//!
//! - Depends only on `spex-core` internally.
//! - Specifications are read-only once built; validation is re-entrant
//!   and performs no I/O.

pub mod adapter;
pub mod matcher;
pub mod spec;

pub use adapter::{Entry, ValueView};
pub use matcher::{match_value, REST_CAPTURE};
pub use spec::{Converter, FieldSpec, Fields, Predicate, Resolver, TypeSpec};

pub use spex_core::{error_to_english, ErrorKind, Kind, MatchError, Path, PathSegment, Term};

/// Validate any adapted value from the root.
///
/// # Errors
///
/// Returns the first [`MatchError`] encountered.
pub fn validate<V: ValueView>(value: &V, spec: &TypeSpec) -> Result<Term, MatchError> {
    match_value(value, spec, &Path::root()).map_err(|err| {
        tracing::trace!(path = %err.path, error = %err, "value rejected");
        err
    })
}

/// Validate a document tree and return its canonical form.
///
/// # Errors
///
/// Returns the first [`MatchError`] encountered.
pub fn validate_document(root: &serde_json::Value, spec: &TypeSpec) -> Result<Term, MatchError> {
    validate(root, spec)
}

/// Validate a native term and return its canonical form.
///
/// # Errors
///
/// Returns the first [`MatchError`] encountered.
pub fn validate_native(root: &Term, spec: &TypeSpec) -> Result<Term, MatchError> {
    validate(root, spec)
}
