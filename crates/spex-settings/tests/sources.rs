//! Integration test: settings read from YAML files, the environment, and the
//! process-wide store, validated end to end.

use std::io::Write;

use spex_schema::{FieldSpec, Term, TypeSpec};
use spex_settings::{
    get_env, get_setting, global, EnvStore, MemoryStore, SettingDefault, SettingsError,
};

fn log_level() -> TypeSpec {
    TypeSpec::pipeline([
        TypeSpec::member(["debug", "info", "warn", "error"]),
        TypeSpec::convert(
            |t| {
                t.as_str()
                    .map(Term::atom)
                    .ok_or_else(|| "expected a string".to_string())
            },
            "to atom",
        ),
    ])
}

#[test]
fn test_yaml_file_settings() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"
log:
  level: warn
http:
  listen:
    host: 0.0.0.0
    port: 8443
    tls: true
"#
    )
    .unwrap();

    let store = MemoryStore::from_yaml_file(file.path()).unwrap();
    let level = get_setting(&store, "log", "level", &SettingDefault::Required, &log_level());
    assert_eq!(level.unwrap(), Term::atom("warn"));

    let listen = TypeSpec::object([
        FieldSpec::required("host", TypeSpec::String),
        FieldSpec::required("port", TypeSpec::Integer),
        FieldSpec::rest_identity(),
    ])
    .unwrap();
    let out = get_setting(&store, "http", "listen", &SettingDefault::Required, &listen).unwrap();
    assert_eq!(
        out,
        Term::Tuple(vec![
            Term::from("0.0.0.0"),
            Term::Int(8443),
            Term::List(vec![Term::pair("tls", true)]),
        ])
    );
}

#[test]
fn test_missing_yaml_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = MemoryStore::from_yaml_file(dir.path().join("absent.yaml")).unwrap_err();
    assert!(matches!(err, SettingsError::Io(_)), "got: {err}");
}

#[test]
fn test_env_store_end_to_end() {
    let store = EnvStore::with_prefix("SPEX_IT");
    std::env::set_var("SPEX_IT_LOG_LEVEL", "debug");
    std::env::set_var("SPEX_IT_HTTP_WORKERS", "[1, 2]");
    let level = get_setting(&store, "log", "level", &SettingDefault::Required, &log_level());
    let workers = get_setting(
        &store,
        "http",
        "workers",
        &SettingDefault::value(4),
        &TypeSpec::Integer,
    );
    std::env::remove_var("SPEX_IT_LOG_LEVEL");
    std::env::remove_var("SPEX_IT_HTTP_WORKERS");

    assert_eq!(level.unwrap(), Term::atom("debug"));
    // A list where an integer is expected falls back to the default.
    assert_eq!(workers.unwrap(), Term::Int(4));
}

#[test]
fn test_invalid_rendering_reaches_caller_without_default() {
    let store = MemoryStore::from_yaml_str("log:\n  level: verbose\n").unwrap();
    let err = get_setting(&store, "log", "level", &SettingDefault::Required, &log_level())
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "setting 'log.level' is invalid: At path (root) : Value \"verbose\" has type string, \
         but one of [\"debug\", \"info\", \"warn\", \"error\"] was expected"
    );
}

#[test]
fn test_global_store_lookup() {
    global().set("spex_it_global", "retries", serde_json::json!(3));
    let retries = get_env(
        "spex_it_global",
        "retries",
        &SettingDefault::Required,
        &TypeSpec::Integer,
    );
    let absent = get_env(
        "spex_it_global",
        "backoff",
        &SettingDefault::value(250),
        &TypeSpec::Integer,
    );
    global().remove("spex_it_global", "retries");

    assert_eq!(retries.unwrap(), Term::Int(3));
    assert_eq!(absent.unwrap(), Term::Int(250));
}
