//! Env configuration layer.
//!
//! Every external variable name lives in `env_keys`; callers read the
//! normalized namespace by internal key and never touch `std::env` directly.
//!
//! - `env_keys`: external variable names
//! - `schema`: internal key → per-runtime name and value type
//! - `loader`: lookup and coercion pass

pub mod env_keys;
pub mod loader;
pub mod schema;

pub use loader::{coerce, resolve_all, worker_timeout};
pub use schema::{Mapping, RuntimeNames, Schema, SchemaEntry, TypeTag, ValueType};
