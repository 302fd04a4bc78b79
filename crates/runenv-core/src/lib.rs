pub mod config;
pub mod error;
pub mod host;
pub mod manager;
pub mod namespace;
pub mod observability;
pub mod runtime;
pub mod source;
pub mod value;

pub use error::{EnvError, Result};
pub use host::{Host, HostBuilder};
pub use manager::{EnvManager, LoadState};
pub use namespace::{EnvMap, Namespace};
pub use runtime::{detect_runtime, HostGlobals, RuntimeKind};
pub use source::{LayeredSource, MapSource, SystemEnv, VariableSource};
pub use value::{EnvValue, RawValue};
