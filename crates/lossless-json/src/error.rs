//! Error types for lossless-json operations.

use serde_json::Value;
use thiserror::Error;

use crate::coerce::CoerceError;
use crate::KeyPath;

/// Result type alias for lossless-json operations.
pub type Result<T, E = LosslessError> = std::result::Result<T, E>;

/// Malformed call arguments: programmer errors, reported rather than panicked.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// A key path with no keys was given where a member must be addressed.
    #[error("key path must contain at least one key")]
    EmptyPath,

    /// An object-only operation reached a value that is not an object.
    #[error("expected object at {path}, found {found}")]
    NotAnObject {
        /// Location of the offending value.
        path: KeyPath,
        /// JSON type name of the offending value.
        found: &'static str,
    },
}

impl UsageError {
    #[inline]
    pub fn not_an_object(path: KeyPath, found: &Value) -> Self {
        UsageError::NotAnObject {
            path,
            found: value_type_name(found),
        }
    }
}

/// Errors returned by decode, encode and path mutation.
#[derive(Debug, Error)]
pub enum LosslessError {
    /// Input bytes are not valid JSON text.
    #[error("invalid JSON: {0}")]
    Parse(#[source] serde_json::Error),

    /// A document value cannot be converted to the target type.
    #[error("cannot decode `{target}`: {source}")]
    Coerce {
        /// Effective field name, or the record type name for the root.
        target: String,
        #[source]
        source: CoerceError,
    },

    /// A field or mutation value failed to serialize into the document.
    #[error("cannot encode `{target}`: {source}")]
    Encode {
        /// Effective field name or key path.
        target: String,
        #[source]
        source: serde_json::Error,
    },

    /// The document failed to serialize to JSON text.
    #[error("serialization error: {0}")]
    Serialize(#[source] serde_json::Error),

    /// Malformed call arguments.
    #[error(transparent)]
    Usage(#[from] UsageError),
}

impl LosslessError {
    #[inline]
    pub fn coerce(target: impl Into<String>, source: CoerceError) -> Self {
        LosslessError::Coerce {
            target: target.into(),
            source,
        }
    }

    #[inline]
    pub fn encode(target: impl Into<String>, source: serde_json::Error) -> Self {
        LosslessError::Encode {
            target: target.into(),
            source,
        }
    }

    /// Returns the usage error if this is one.
    pub fn as_usage(&self) -> Option<&UsageError> {
        match self {
            LosslessError::Usage(err) => Some(err),
            _ => None,
        }
    }
}

/// Get the type name of a JSON value.
#[inline]
pub fn value_type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
