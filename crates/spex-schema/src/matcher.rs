//! # Matcher
//!
//! Walks a value and a [`TypeSpec`] in lockstep and returns either the
//! canonical [`Term`] or the first [`MatchError`] encountered.
//!
//! ## Traversal Order
//!
//! Sequence elements are visited by ascending index. Object and proplist
//! fields are visited in declaration order; the residual key check (or the
//! rest capture) runs only after every declared field has matched.
//! Residual keys are ordered by name. The
//! first failure aborts the walk and is returned unchanged, already carrying
//! the full path from the root.
//!
//! ## Canonical Shapes
//!
//! | Spec                  | Canonical term                            |
//! |-----------------------|-------------------------------------------|
//! | scalar, `any`         | the value as a term                       |
//! | `array`, `list`       | `Term::List`, input order                 |
//! | `object`, `proplist`  | `Term::Tuple`, declaration order          |
//! | `member`              | the matched literal from the member set   |
//! | `convert`             | the conversion's output                   |

use std::collections::{HashMap, HashSet};

use spex_core::{Kind, MatchError, Path, Term};

use crate::adapter::{Entry, ValueView};
use crate::spec::{FieldSpec, Fields, TypeSpec};

/// Description passed to `conversion_failed` when a rest transform fails.
pub const REST_CAPTURE: &str = "rest capture";

/// Match `value` against `spec` at `path`.
///
/// # Errors
///
/// Returns the first failure found, located by its full path.
pub fn match_value<V: ValueView>(
    value: &V,
    spec: &TypeSpec,
    path: &Path,
) -> Result<Term, MatchError> {
    match spec {
        TypeSpec::Any => Ok(value.to_term()),
        TypeSpec::String => expect_kind(value, spec, path, |k| k == Kind::String),
        TypeSpec::Number => expect_kind(value, spec, path, |k| k.is_numeric()),
        TypeSpec::Integer => expect_kind(value, spec, path, |k| k == Kind::Integer),
        TypeSpec::Boolean => expect_kind(value, spec, path, |k| k == Kind::Boolean),
        TypeSpec::Array(element) | TypeSpec::List(element) => {
            match_sequence(value, spec, element, path)
        }
        TypeSpec::Object(fields) => match value.mapping() {
            Some(entries) => match_fields(&entries, fields, path),
            None => Err(wrong_type(value, spec, path)),
        },
        TypeSpec::Proplist(fields) => match value.proplist() {
            Some(entries) => match_fields(&entries, fields, path),
            None => Err(wrong_type(value, spec, path)),
        },
        TypeSpec::Member(values) => {
            let term = value.to_term();
            match values.iter().find(|candidate| **candidate == term) {
                Some(matched) => Ok(matched.clone()),
                None => Err(MatchError::wrong_type_with_kind(
                    path.clone(),
                    term,
                    value.kind(),
                    spec.describe(),
                )),
            }
        }
        TypeSpec::Satisfy {
            predicate,
            description,
        } => {
            let term = value.to_term();
            if predicate(&term) {
                Ok(term)
            } else {
                Err(MatchError::constraint_not_satisfied(
                    path.clone(),
                    description.as_str(),
                    term,
                ))
            }
        }
        TypeSpec::Convert {
            function,
            description,
        } => {
            let term = value.to_term();
            function(&term).map_err(|reason| {
                MatchError::conversion_failed(path.clone(), description.as_str(), term, reason)
            })
        }
        TypeSpec::Pipeline(stages) => {
            let Some((first, rest)) = stages.split_first() else {
                return Ok(value.to_term());
            };
            // Later stages see the canonical output of the previous one,
            // adapted through the native view.
            let mut current = match_value(value, first, path)?;
            for stage in rest {
                current = match_value(&current, stage, path)?;
            }
            Ok(current)
        }
        TypeSpec::Named { resolve, .. } => match_value(value, &resolve(), path),
    }
}

fn wrong_type<V: ValueView>(value: &V, spec: &TypeSpec, path: &Path) -> MatchError {
    MatchError::wrong_type_with_kind(path.clone(), value.to_term(), value.kind(), spec.describe())
}

fn expect_kind<V, F>(value: &V, spec: &TypeSpec, path: &Path, accepts: F) -> Result<Term, MatchError>
where
    V: ValueView,
    F: Fn(Kind) -> bool,
{
    if accepts(value.kind()) {
        Ok(value.to_term())
    } else {
        Err(wrong_type(value, spec, path))
    }
}

fn match_sequence<V: ValueView>(
    value: &V,
    spec: &TypeSpec,
    element: &TypeSpec,
    path: &Path,
) -> Result<Term, MatchError> {
    let Some(items) = value.elements() else {
        return Err(wrong_type(value, spec, path));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(i, item)| match_value(item, element, &path.index(i)))
        .collect::<Result<Vec<_>, _>>()
        .map(Term::List)
}

fn match_fields<V: ValueView>(
    entries: &[Entry<'_, V>],
    fields: &Fields,
    path: &Path,
) -> Result<Term, MatchError> {
    // First occurrence wins for repeated proplist keys.
    let mut present: HashMap<&str, &V> = HashMap::with_capacity(entries.len());
    for entry in entries {
        present.entry(entry.name).or_insert(entry.value);
    }

    let mut slots = Vec::with_capacity(fields.len());
    let mut rest = None;
    for field in fields {
        match field {
            FieldSpec::Required { key, spec } => {
                let Some(found) = present.get(key.as_str()) else {
                    return Err(MatchError::missing_field(path.clone(), key.as_str()));
                };
                slots.push(match_value(*found, spec, &path.field(key.as_str()))?);
            }
            FieldSpec::Optional { key, spec, default } => match present.get(key.as_str()) {
                Some(found) => slots.push(match_value(*found, spec, &path.field(key.as_str()))?),
                None => slots.push(default.clone()),
            },
            FieldSpec::Rest(transform) => {
                rest = Some((slots.len(), transform));
                slots.push(Term::Null);
            }
        }
    }

    // Residual keys are reported sorted by name so the result does not
    // depend on the input's key order.
    let mut seen = HashSet::new();
    let mut residual: Vec<&Entry<'_, V>> = entries
        .iter()
        .filter(|e| !fields.declares(e.name) && seen.insert(e.name))
        .collect();
    residual.sort_by(|a, b| a.name.cmp(b.name));

    match rest {
        Some((slot, transform)) => {
            let captured = Term::List(
                residual
                    .iter()
                    .map(|e| Term::Tuple(vec![e.key.clone(), e.value.to_term()]))
                    .collect(),
            );
            slots[slot] = transform(&captured).map_err(|reason| {
                MatchError::conversion_failed(path.clone(), REST_CAPTURE, captured, reason)
            })?;
        }
        None if !residual.is_empty() => {
            let names = residual.iter().map(|e| e.name.to_string()).collect();
            return Err(MatchError::superfluous_fields(path.clone(), names));
        }
        None => {}
    }

    Ok(Term::Tuple(slots))
}
