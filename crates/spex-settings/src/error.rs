//! # Settings Errors

use spex_core::MatchError;
use thiserror::Error;

/// Error reading or loading settings.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The setting is absent and no default was given.
    #[error("setting '{namespace}.{key}' is not set")]
    Missing {
        /// Namespace the setting was looked up in.
        namespace: String,
        /// Key within the namespace.
        key: String,
    },

    /// The stored value failed validation and no default was given.
    #[error("setting '{namespace}.{key}' is invalid: {source}")]
    Invalid {
        /// Namespace the setting was looked up in.
        namespace: String,
        /// Key within the namespace.
        key: String,
        /// The validation failure.
        #[source]
        source: MatchError,
    },

    /// A settings document could not be parsed or has the wrong shape.
    #[error("settings load error for '{origin}': {reason}")]
    Load {
        /// File path, or `<inline>` for string sources.
        origin: String,
        /// Reason the document was rejected.
        reason: String,
    },

    /// IO error reading a settings file.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
