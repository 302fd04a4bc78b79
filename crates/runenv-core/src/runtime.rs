//! Runtime identity and detection.
//!
//! Detection is ordered, first match wins. The worker check must come first:
//! worker builds can ship a `process` shim that would otherwise read as node.

use std::fmt;
use std::str::FromStr;

use crate::error::{EnvError, Result};

/// Host runtime kinds. Ids double as the per-runtime keys of schema mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RuntimeKind {
    /// Server-process runtime, reads the process environment table.
    Node,
    /// Secure-scripting runtime, reads through its own env accessor.
    Deno,
    /// Edge-worker runtime, reads global-scope bindings.
    Worker,
}

impl RuntimeKind {
    pub const ALL: [RuntimeKind; 3] = [RuntimeKind::Node, RuntimeKind::Deno, RuntimeKind::Worker];

    pub fn id(self) -> &'static str {
        match self {
            RuntimeKind::Node => "node",
            RuntimeKind::Deno => "deno",
            RuntimeKind::Worker => "worker",
        }
    }
}

impl fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for RuntimeKind {
    type Err = EnvError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "node" => Ok(RuntimeKind::Node),
            "deno" => Ok(RuntimeKind::Deno),
            "worker" => Ok(RuntimeKind::Worker),
            other => Err(EnvError::Runtime(other.to_string())),
        }
    }
}

/// Ambient globals that identify a runtime.
pub trait HostGlobals {
    /// Explicit worker marker in global scope.
    fn worker_flag(&self) -> bool;
    /// The secure-scripting runtime's global object exists.
    fn has_deno_global(&self) -> bool;
    /// A process-like global exists.
    fn has_process_global(&self) -> bool;
}

/// Identify the active runtime from the host's globals.
pub fn detect_runtime<G: HostGlobals + ?Sized>(globals: &G) -> Result<RuntimeKind> {
    if globals.worker_flag() {
        Ok(RuntimeKind::Worker)
    } else if globals.has_deno_global() {
        Ok(RuntimeKind::Deno)
    } else if globals.has_process_global() {
        Ok(RuntimeKind::Node)
    } else {
        Err(EnvError::UndetectedRuntime)
    }
}
