//! Error taxonomy for env loading.
//!
//! Every variant is fatal for the operation that raised it: configuration
//! loading is all-or-nothing, nothing here is retried or swallowed.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EnvError {
    /// A schema entry carries a type tag other than string/boolean/number.
    #[error("unsupported type '{tag}' for env key '{key}'")]
    Schema { key: String, tag: String },

    /// The runtime is not one we know, or the host has no accessor for it.
    #[error("unsupported runtime: {0}")]
    Runtime(String),

    #[error("an env manager already owns this host namespace")]
    SingletonViolation,

    /// Detection found no worker flag, no deno global and no process global.
    #[error("no supported runtime detected (expected worker, deno or node globals)")]
    UndetectedRuntime,

    #[error("invalid schema document: {0}")]
    SchemaDocument(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, EnvError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_error_names_key_and_tag() {
        let e = EnvError::Schema {
            key: "fetchTimeout".into(),
            tag: "float".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("fetchTimeout"));
        assert!(msg.contains("float"));
    }

    #[test]
    fn undetected_runtime_is_distinct_from_runtime_error() {
        let undetected = EnvError::UndetectedRuntime.to_string();
        let unsupported = EnvError::Runtime("bun".into()).to_string();
        assert_ne!(undetected, unsupported);
        assert!(unsupported.contains("bun"));
    }

    #[test]
    fn io_error_converts() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "schema.yaml");
        let e: EnvError = io_err.into();
        assert!(e.to_string().contains("io error"));
    }
}
