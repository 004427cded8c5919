//! # Settings Stores
//!
//! A [`SettingsStore`] answers one question: what value, if any, is stored
//! under `(namespace, key)`. Two stores are provided:
//!
//! - [`MemoryStore`] — an in-process map, loadable from YAML. The
//!   process-wide instance is [`global`].
//! - [`EnvStore`] — process environment variables named
//!   `PREFIX_NAMESPACE_KEY`.
//!
//! ## YAML Layout
//!
//! ```yaml
//! http:
//!   port: 8080
//!   hosts: [a.example, b.example]
//! log:
//!   level: info
//! ```
//!
//! Top-level keys are namespaces; each maps setting keys to document values.

use std::collections::HashMap;
use std::path::Path;
use std::sync::OnceLock;

use parking_lot::RwLock;
use serde_json::Value;
use spex_core::{MatchError, Term};
use spex_schema::{validate_document, validate_native, TypeSpec};

use crate::error::SettingsError;

/// A stored setting, in whichever representation the store holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredValue {
    /// A document tree, validated through the document front door.
    Document(Value),
    /// A native term, validated through the native front door.
    Native(Term),
}

impl StoredValue {
    /// Validate against `spec` through the matching front door.
    ///
    /// # Errors
    ///
    /// Returns the first [`MatchError`] encountered.
    pub fn validate(&self, spec: &TypeSpec) -> Result<Term, MatchError> {
        match self {
            Self::Document(doc) => validate_document(doc, spec),
            Self::Native(term) => validate_native(term, spec),
        }
    }
}

impl From<Value> for StoredValue {
    fn from(doc: Value) -> Self {
        Self::Document(doc)
    }
}

impl From<Term> for StoredValue {
    fn from(term: Term) -> Self {
        Self::Native(term)
    }
}

/// Read side of a key/value settings store.
pub trait SettingsStore: Send + Sync {
    /// Look up the value stored under `(namespace, key)`.
    fn get(&self, namespace: &str, key: &str) -> Option<StoredValue>;
}

/// In-memory settings, safe to share across threads.
#[derive(Debug, Default)]
pub struct MemoryStore {
    namespaces: RwLock<HashMap<String, HashMap<String, StoredValue>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `value` under `(namespace, key)`, returning the previous value.
    pub fn set(
        &self,
        namespace: impl Into<String>,
        key: impl Into<String>,
        value: impl Into<StoredValue>,
    ) -> Option<StoredValue> {
        self.namespaces
            .write()
            .entry(namespace.into())
            .or_default()
            .insert(key.into(), value.into())
    }

    /// Remove the value under `(namespace, key)`.
    pub fn remove(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        let mut namespaces = self.namespaces.write();
        let settings = namespaces.get_mut(namespace)?;
        let removed = settings.remove(key);
        if settings.is_empty() {
            namespaces.remove(namespace);
        }
        removed
    }

    /// Keys set in `namespace`, sorted.
    pub fn keys(&self, namespace: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .namespaces
            .read()
            .get(namespace)
            .map(|settings| settings.keys().cloned().collect())
            .unwrap_or_default();
        keys.sort();
        keys
    }

    /// Build a store from a YAML settings document.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Load` if the YAML is malformed or is not a
    /// mapping of namespaces to mappings.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, SettingsError> {
        let store = Self::new();
        store.load_yaml_str(yaml)?;
        Ok(store)
    }

    /// Build a store from a YAML settings file.
    ///
    /// # Errors
    ///
    /// Returns `SettingsError::Io` if the file cannot be read and
    /// `SettingsError::Load` if its content is rejected.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let store = Self::new();
        store.load_yaml_file(path)?;
        Ok(store)
    }

    /// Merge a YAML settings document into this store, overwriting keys
    /// that are already set. Returns the number of settings loaded.
    ///
    /// # Errors
    ///
    /// See [`MemoryStore::from_yaml_str`]. Nothing is merged on error.
    pub fn load_yaml_str(&self, yaml: &str) -> Result<usize, SettingsError> {
        self.load_yaml("<inline>", yaml)
    }

    /// Merge a YAML settings file into this store.
    ///
    /// # Errors
    ///
    /// See [`MemoryStore::from_yaml_file`]. Nothing is merged on error.
    pub fn load_yaml_file(&self, path: impl AsRef<Path>) -> Result<usize, SettingsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        self.load_yaml(&path.display().to_string(), &content)
    }

    fn load_yaml(&self, origin: &str, yaml: &str) -> Result<usize, SettingsError> {
        let load_error = |reason: String| SettingsError::Load {
            origin: origin.to_string(),
            reason,
        };

        let parsed: serde_yaml::Value =
            serde_yaml::from_str(yaml).map_err(|e| load_error(format!("invalid YAML: {e}")))?;

        let mut staged = Vec::new();
        match &parsed {
            serde_yaml::Value::Null => {}
            serde_yaml::Value::Mapping(namespaces) => {
                for (namespace, settings) in namespaces {
                    let namespace = yaml_key(namespace, "the top level").map_err(load_error)?;
                    let serde_yaml::Value::Mapping(settings) = settings else {
                        return Err(load_error(format!(
                            "namespace '{namespace}' must be a mapping of settings"
                        )));
                    };
                    for (key, value) in settings {
                        let key = yaml_key(key, &format!("'{namespace}'")).map_err(load_error)?;
                        let at = format!("{namespace}.{key}");
                        let doc = setting_document(value, &at).map_err(load_error)?;
                        staged.push((namespace.clone(), key, doc));
                    }
                }
            }
            _ => {
                return Err(load_error(
                    "top level must be a mapping of namespaces".to_string(),
                ))
            }
        }

        let count = staged.len();
        let mut namespaces = self.namespaces.write();
        for (namespace, key, value) in staged {
            namespaces
                .entry(namespace)
                .or_default()
                .insert(key, StoredValue::Document(value));
        }
        tracing::debug!(origin, count, "settings loaded");
        Ok(count)
    }
}

impl SettingsStore for MemoryStore {
    fn get(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        self.namespaces
            .read()
            .get(namespace)
            .and_then(|settings| settings.get(key))
            .cloned()
    }
}

/// The process-wide settings store.
pub fn global() -> &'static MemoryStore {
    static GLOBAL: OnceLock<MemoryStore> = OnceLock::new();
    GLOBAL.get_or_init(MemoryStore::new)
}

/// Settings read from environment variables.
///
/// `(namespace, key)` maps to `PREFIX_NAMESPACE_KEY`, upper-cased, with
/// every non-alphanumeric character replaced by `_`. A value that parses as
/// JSON is stored as that document; anything else is stored as a string.
#[derive(Debug, Clone, Default)]
pub struct EnvStore {
    prefix: Option<String>,
}

impl EnvStore {
    /// Store with no prefix: `(log, level)` reads `LOG_LEVEL`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store with a prefix: `("APP", log, level)` reads `APP_LOG_LEVEL`.
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }

    /// Environment variable consulted for `(namespace, key)`.
    pub fn var_name(&self, namespace: &str, key: &str) -> String {
        let parts = self.prefix.as_deref().into_iter().chain([namespace, key]);
        let joined: Vec<String> = parts.map(env_segment).collect();
        joined.join("_")
    }
}

fn env_segment(part: &str) -> String {
    part.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect()
}

impl SettingsStore for EnvStore {
    fn get(&self, namespace: &str, key: &str) -> Option<StoredValue> {
        let raw = std::env::var(self.var_name(namespace, key)).ok()?;
        let doc = match serde_json::from_str(&raw) {
            Ok(doc) => doc,
            Err(_) => Value::String(raw),
        };
        Some(StoredValue::Document(doc))
    }
}

/// Text of a YAML mapping key found under `within`. Scalar keys are
/// stringified.
fn yaml_key(key: &serde_yaml::Value, within: &str) -> Result<String, String> {
    match key {
        serde_yaml::Value::String(s) => Ok(s.clone()),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        other => Err(format!("unsupported key under {within}: {other:?}")),
    }
}

/// Document form of the YAML value stored at setting path `at`
/// (`namespace.key`, extended by `.field` and `[index]` while descending).
///
/// Tags are dropped. Integers keep their full range; `.nan` and `.inf`
/// have no document form and are rejected with the offending path.
fn setting_document(yaml: &serde_yaml::Value, at: &str) -> Result<Value, String> {
    match yaml {
        serde_yaml::Value::Null => Ok(Value::Null),
        serde_yaml::Value::Bool(b) => Ok(Value::Bool(*b)),
        serde_yaml::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Ok(Value::from(i))
            } else if let Some(u) = n.as_u64() {
                Ok(Value::from(u))
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map(Value::Number)
                    .ok_or_else(|| format!("setting '{at}' is not a finite number: {n}"))
            }
        }
        serde_yaml::Value::String(s) => Ok(Value::String(s.clone())),
        serde_yaml::Value::Sequence(seq) => seq
            .iter()
            .enumerate()
            .map(|(i, item)| setting_document(item, &format!("{at}[{i}]")))
            .collect::<Result<Vec<_>, _>>()
            .map(Value::Array),
        serde_yaml::Value::Mapping(map) => {
            let mut fields = serde_json::Map::new();
            for (k, v) in map {
                let name = yaml_key(k, &format!("'{at}'"))?;
                let value = setting_document(v, &format!("{at}.{name}"))?;
                fields.insert(name, value);
            }
            Ok(Value::Object(fields))
        }
        serde_yaml::Value::Tagged(tagged) => setting_document(&tagged.value, at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_memory_set_get_remove() {
        let store = MemoryStore::new();
        assert!(store.set("http", "port", json!(8080)).is_none());
        assert_eq!(
            store.get("http", "port"),
            Some(StoredValue::Document(json!(8080)))
        );
        assert_eq!(
            store.set("http", "port", Term::Int(9090)),
            Some(StoredValue::Document(json!(8080)))
        );
        assert_eq!(store.remove("http", "port"), Some(StoredValue::Native(Term::Int(9090))));
        assert!(store.get("http", "port").is_none());
        assert!(store.keys("http").is_empty());
    }

    #[test]
    fn test_keys_are_sorted() {
        let store = MemoryStore::new();
        store.set("ns", "b", json!(1));
        store.set("ns", "a", json!(2));
        assert_eq!(store.keys("ns"), vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_yaml_namespaces_load() {
        let store = MemoryStore::from_yaml_str(
            r#"
http:
  port: 8080
  hosts: [a, b]
log:
  level: info
"#,
        )
        .unwrap();
        assert_eq!(store.get("http", "hosts"), Some(StoredValue::Document(json!(["a", "b"]))));
        assert_eq!(store.get("log", "level"), Some(StoredValue::Document(json!("info"))));
        assert!(store.get("log", "port").is_none());
    }

    #[test]
    fn test_yaml_rejects_non_mapping_namespace() {
        let err = MemoryStore::from_yaml_str("http: 8080\n").unwrap_err();
        assert!(matches!(err, SettingsError::Load { .. }), "got: {err}");
        let err = MemoryStore::from_yaml_str("- a\n- b\n").unwrap_err();
        assert!(err.to_string().contains("top level"));
    }

    #[test]
    fn test_yaml_error_leaves_store_untouched() {
        let store = MemoryStore::new();
        let result = store.load_yaml_str("good:\n  a: 1\nbad: 2\n");
        assert!(result.is_err());
        assert!(store.get("good", "a").is_none());
    }

    #[test]
    fn test_empty_yaml_loads_nothing() {
        let store = MemoryStore::new();
        assert_eq!(store.load_yaml_str("").unwrap(), 0);
    }

    #[test]
    fn test_yaml_numeric_keys_are_stringified() {
        let store = MemoryStore::from_yaml_str("ports:\n  1: one\n  true: yes\n").unwrap();
        assert_eq!(store.keys("ports"), vec!["1".to_string(), "true".to_string()]);
        assert_eq!(store.get("ports", "1"), Some(StoredValue::Document(json!("one"))));
    }

    #[test]
    fn test_yaml_non_finite_float_names_setting_path() {
        let store = MemoryStore::new();
        let err = store
            .load_yaml_str("limits:\n  ok: 1\n  rates: [0.5, {burst: .inf}]\n")
            .unwrap_err();
        let SettingsError::Load { reason, .. } = &err else {
            panic!("expected Load, got: {err}");
        };
        assert!(reason.contains("'limits.rates[1].burst'"), "got: {reason}");
        assert!(store.get("limits", "ok").is_none());
    }

    #[test]
    fn test_yaml_large_unsigned_integer_is_kept() {
        let store = MemoryStore::from_yaml_str("ids:\n  seed: 18446744073709551615\n").unwrap();
        assert_eq!(
            store.get("ids", "seed"),
            Some(StoredValue::Document(json!(u64::MAX)))
        );
    }

    #[test]
    fn test_env_var_names() {
        assert_eq!(EnvStore::new().var_name("log", "level"), "LOG_LEVEL");
        assert_eq!(
            EnvStore::with_prefix("app").var_name("http.server", "max-conns"),
            "APP_HTTP_SERVER_MAX_CONNS"
        );
    }

    #[test]
    fn test_env_values_parse_as_json_when_possible() {
        let store = EnvStore::with_prefix("SPEX_STORE_UNIT");
        std::env::set_var("SPEX_STORE_UNIT_HTTP_PORT", "8080");
        std::env::set_var("SPEX_STORE_UNIT_HTTP_HOST", "localhost");
        let port = store.get("http", "port");
        let host = store.get("http", "host");
        std::env::remove_var("SPEX_STORE_UNIT_HTTP_PORT");
        std::env::remove_var("SPEX_STORE_UNIT_HTTP_HOST");
        assert_eq!(port, Some(StoredValue::Document(json!(8080))));
        assert_eq!(host, Some(StoredValue::Document(json!("localhost"))));
        assert!(store.get("http", "absent").is_none());
    }
}
