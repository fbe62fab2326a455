//! Error types for reading configuration trees and building typed configs

use serde_json::Value;

use crate::validators::ConfigValidationError;

/// Errors raised while reading values out of a [`Config`](crate::Config) tree.
///
/// Only [`ConfigError::Missing`] is recoverable: generated readers for
/// `Option<T>` accessors turn it into `None`. Every other variant propagates
/// out of the generated constructor.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Nothing is stored at the requested path, or the stored value is `null`.
    #[error("No configuration setting found for path '{path}'")]
    Missing {
        /// Dotted path that was looked up
        path: String,
    },

    /// A value exists at the path but has an incompatible type.
    #[error("Configuration value at '{path}' has type {found} rather than {expected}")]
    WrongType {
        /// Dotted path of the offending value
        path: String,
        /// Type the reader asked for
        expected: &'static str,
        /// JSON type that was actually found
        found: &'static str,
    },

    /// The value has the right shape but cannot be converted (out of range,
    /// unparsable duration, unknown enum variant, ...).
    #[error("Invalid value at '{path}': {message}")]
    BadValue {
        /// Dotted path of the offending value
        path: String,
        /// What went wrong during conversion
        message: String,
    },

    /// The path itself is malformed, e.g. `"a..b"`.
    #[error("Invalid path '{path}': {message}")]
    BadPath {
        /// The rejected path
        path: String,
        /// Why the path was rejected
        message: String,
    },

    /// The configuration source is not valid JSON.
    #[error("Failed to parse configuration from {origin}: {source}")]
    Parse {
        /// Where the source came from (file path or `"string"`)
        origin: String,
        /// Underlying parser error
        source: serde_json::Error,
    },

    /// The configuration file could not be read.
    #[error("Failed to read configuration file '{path}': {source}")]
    Io {
        /// Path of the file that failed to be read
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },
}

impl ConfigError {
    /// Create a missing value error (used by mappers and generated code)
    #[doc(hidden)]
    pub fn missing(path: impl Into<String>) -> Self {
        Self::Missing { path: path.into() }
    }

    /// Create a wrong type error from the value that was found
    #[doc(hidden)]
    pub fn wrong_type(path: impl Into<String>, expected: &'static str, found: &Value) -> Self {
        Self::WrongType {
            path: path.into(),
            expected,
            found: json_type(found),
        }
    }

    /// Create a conversion error. Custom mappers use this for values that
    /// have the right shape but cannot be converted.
    pub fn bad_value(path: impl Into<String>, message: impl std::fmt::Display) -> Self {
        Self::BadValue {
            path: path.into(),
            message: message.to_string(),
        }
    }

    /// Whether this error only signals an absent value.
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing { .. })
    }
}

/// Errors returned by generated configuration constructors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A value could not be read from the tree.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Every value was read but at least one validator rejected the result.
    #[error(transparent)]
    Validation(#[from] ConfigValidationError),
}

pub(crate) fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
