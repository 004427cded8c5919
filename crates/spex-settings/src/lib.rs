//! # spex-settings — Validated Settings Lookup
//!
//! Layers "look up a named setting, substitute a default, canonicalize the
//! stored value" on top of the `spex-schema` matcher.
//!
//! ## Default Semantics
//!
//! With [`SettingDefault::Value`], an absent setting and an invalid
//! setting are treated identically: the literal default is returned
//! verbatim and unvalidated, and the validation error is not surfaced.
//! With [`SettingDefault::Required`], absence is
//! [`SettingsError::Missing`] and invalidity is [`SettingsError::Invalid`].
//!
//! ## Crate Policy
//!
//! - One read from the store per lookup; no retries, no caching, no writes.
//! - Stores are external collaborators behind [`SettingsStore`].

pub mod error;
pub mod store;

pub use error::SettingsError;
pub use store::{global, EnvStore, MemoryStore, SettingsStore, StoredValue};

use spex_core::Term;
use spex_schema::TypeSpec;

/// What to do when a setting is absent or invalid.
#[derive(Debug, Clone, PartialEq)]
pub enum SettingDefault {
    /// No default: absence and invalidity are errors.
    Required,
    /// Returned verbatim, without validation.
    Value(Term),
}

impl SettingDefault {
    pub fn value(default: impl Into<Term>) -> Self {
        Self::Value(default.into())
    }
}

/// Look up `(namespace, key)` in `store` and canonicalize it against `spec`.
///
/// # Errors
///
/// Only with [`SettingDefault::Required`]: `SettingsError::Missing` if the
/// setting is absent, `SettingsError::Invalid` if it fails validation.
pub fn get_setting<S>(
    store: &S,
    namespace: &str,
    key: &str,
    default: &SettingDefault,
    spec: &TypeSpec,
) -> Result<Term, SettingsError>
where
    S: SettingsStore + ?Sized,
{
    let Some(stored) = store.get(namespace, key) else {
        return match default {
            SettingDefault::Value(value) => {
                tracing::debug!(namespace, key, "setting absent, using default");
                Ok(value.clone())
            }
            SettingDefault::Required => Err(SettingsError::Missing {
                namespace: namespace.to_string(),
                key: key.to_string(),
            }),
        };
    };

    match (stored.validate(spec), default) {
        (Ok(canonical), _) => Ok(canonical),
        (Err(err), SettingDefault::Value(value)) => {
            tracing::debug!(namespace, key, error = %err, "setting invalid, using default");
            Ok(value.clone())
        }
        (Err(source), SettingDefault::Required) => Err(SettingsError::Invalid {
            namespace: namespace.to_string(),
            key: key.to_string(),
            source,
        }),
    }
}

/// [`get_setting`] against the process-wide [`global`] store.
///
/// # Errors
///
/// See [`get_setting`].
pub fn get_env(
    namespace: &str,
    key: &str,
    default: &SettingDefault,
    spec: &TypeSpec,
) -> Result<Term, SettingsError> {
    get_setting(global(), namespace, key, default, spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn port_spec() -> TypeSpec {
        TypeSpec::pipeline([
            TypeSpec::Integer,
            TypeSpec::satisfy(
                |t| t.as_i64().is_some_and(|p| (1..=65535).contains(&p)),
                "a TCP port",
            ),
        ])
    }

    #[test]
    fn test_present_and_valid_is_canonicalized() {
        let store = MemoryStore::new();
        store.set("http", "port", json!(8080));
        let port = get_setting(&store, "http", "port", &SettingDefault::Required, &port_spec());
        assert_eq!(port.unwrap(), Term::Int(8080));
    }

    #[test]
    fn test_absent_uses_default() {
        let store = MemoryStore::new();
        let port = get_setting(&store, "http", "port", &SettingDefault::value(80), &port_spec());
        assert_eq!(port.unwrap(), Term::Int(80));
    }

    #[test]
    fn test_invalid_uses_default() {
        let store = MemoryStore::new();
        store.set("http", "port", json!(70000));
        let port = get_setting(&store, "http", "port", &SettingDefault::value(80), &port_spec());
        assert_eq!(port.unwrap(), Term::Int(80));
    }

    #[test]
    fn test_default_is_not_validated() {
        let store = MemoryStore::new();
        let port = get_setting(
            &store,
            "http",
            "port",
            &SettingDefault::value("not a port"),
            &port_spec(),
        );
        assert_eq!(port.unwrap(), Term::from("not a port"));
    }

    #[test]
    fn test_required_absent_is_missing() {
        let store = MemoryStore::new();
        let err = get_setting(&store, "http", "port", &SettingDefault::Required, &port_spec())
            .unwrap_err();
        assert!(matches!(err, SettingsError::Missing { .. }));
        assert_eq!(err.to_string(), "setting 'http.port' is not set");
    }

    #[test]
    fn test_required_invalid_surfaces_match_error() {
        let store = MemoryStore::new();
        store.set("http", "port", json!("eighty"));
        let err = get_setting(&store, "http", "port", &SettingDefault::Required, &port_spec())
            .unwrap_err();
        match err {
            SettingsError::Invalid { source, .. } => {
                assert!(source.path.is_root());
            }
            other => panic!("expected Invalid, got: {other}"),
        }
    }

    #[test]
    fn test_native_values_use_native_front_door() {
        let store = MemoryStore::new();
        store.set(
            "db",
            "pool",
            Term::proplist([("size", 10)]),
        );
        let spec = TypeSpec::proplist([
            spex_schema::FieldSpec::required("size", TypeSpec::Integer),
            spex_schema::FieldSpec::optional("timeout", TypeSpec::Integer, 30),
        ])
        .unwrap();
        let pool = get_setting(&store, "db", "pool", &SettingDefault::Required, &spec).unwrap();
        assert_eq!(pool, Term::Tuple(vec![Term::Int(10), Term::Int(30)]));
    }

    #[test]
    fn test_works_through_trait_object() {
        let store: Box<dyn SettingsStore> = Box::new(MemoryStore::new());
        let level = get_setting(
            store.as_ref(),
            "log",
            "level",
            &SettingDefault::value(Term::atom("info")),
            &TypeSpec::Any,
        );
        assert_eq!(level.unwrap(), Term::atom("info"));
    }
}
