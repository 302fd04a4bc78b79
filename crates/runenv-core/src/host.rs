//! The hosting process: runtime globals, per-runtime accessors and the
//! published namespace.
//!
//! A `Host` stands in for the ambient global state of one process. Exactly one
//! `EnvManager` may own its namespace; `Host::current()` is the host of the
//! real process.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use crate::error::{EnvError, Result};
use crate::namespace::Namespace;
use crate::runtime::{HostGlobals, RuntimeKind};
use crate::source::{LayeredSource, MapSource, SystemEnv, VariableSource};
use crate::value::RawValue;

const DOTENV_FILE: &str = ".env";

pub struct Host {
    process: Option<Box<dyn VariableSource>>,
    deno: Option<Box<dyn VariableSource>>,
    worker: Option<Box<dyn VariableSource>>,
    worker_flag: bool,
    namespace: Namespace,
    claimed: AtomicBool,
}

impl Host {
    pub fn builder() -> HostBuilder {
        HostBuilder::default()
    }

    /// The real process: system env layered over `./.env` (the file never
    /// overrides a variable that is already set).
    pub fn current() -> &'static Host {
        static CURRENT: OnceLock<Host> = OnceLock::new();
        CURRENT.get_or_init(|| {
            let dotenv = std::env::current_dir()
                .map(|d| d.join(DOTENV_FILE))
                .unwrap_or_else(|_| DOTENV_FILE.into());
            Host::builder()
                .process(process_source(Some(dotenv.as_path())))
                .build()
        })
    }

    /// The accessor for `runtime`, or `EnvError::Runtime` if this host has none.
    pub fn source_for(&self, runtime: RuntimeKind) -> Result<&dyn VariableSource> {
        let source = match runtime {
            RuntimeKind::Node => self.process.as_deref(),
            RuntimeKind::Deno => self.deno.as_deref(),
            RuntimeKind::Worker => self.worker.as_deref(),
        };
        source.ok_or_else(|| {
            EnvError::Runtime(format!("{} (no variable source on this host)", runtime))
        })
    }

    /// Direct read of a worker global-scope binding, bypassing the schema.
    pub fn worker_global(&self, name: &str) -> Option<RawValue> {
        self.worker.as_ref().and_then(|w| w.lookup(name))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::SeqCst)
    }

    /// Mark the namespace as owned. Never released.
    pub(crate) fn claim(&self) -> Result<()> {
        self.claimed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .map(|_| ())
            .map_err(|_| EnvError::SingletonViolation)
    }
}

impl HostGlobals for Host {
    fn worker_flag(&self) -> bool {
        self.worker_flag
    }

    fn has_deno_global(&self) -> bool {
        self.deno.is_some()
    }

    fn has_process_global(&self) -> bool {
        self.process.is_some()
    }
}

/// Process env with an optional `.env` fallback layer. A missing or unreadable
/// file is skipped.
pub fn process_source(dotenv: Option<&Path>) -> LayeredSource {
    let mut layered = LayeredSource::new().layer(SystemEnv);
    if let Some(path) = dotenv.filter(|p| p.is_file()) {
        match MapSource::from_dotenv_file(path) {
            Ok(file) => layered = layered.layer(file),
            Err(e) => tracing::warn!(path = %path.display(), "skipping dotenv file: {}", e),
        }
    }
    layered
}

#[derive(Default)]
pub struct HostBuilder {
    process: Option<Box<dyn VariableSource>>,
    deno: Option<Box<dyn VariableSource>>,
    worker: Option<Box<dyn VariableSource>>,
    worker_flag: bool,
}

impl HostBuilder {
    /// Expose a process-like global backed by `source`.
    pub fn process(mut self, source: impl VariableSource + 'static) -> Self {
        self.process = Some(Box::new(source));
        self
    }

    /// Expose the secure-scripting runtime global backed by `source`.
    pub fn deno(mut self, source: impl VariableSource + 'static) -> Self {
        self.deno = Some(Box::new(source));
        self
    }

    /// Worker global scope with the explicit worker flag set.
    pub fn worker(mut self, scope: impl VariableSource + 'static) -> Self {
        self.worker = Some(Box::new(scope));
        self.worker_flag = true;
        self
    }

    /// Override the worker flag, e.g. a worker scope that never set it.
    pub fn worker_flag(mut self, flag: bool) -> Self {
        self.worker_flag = flag;
        self
    }

    pub fn build(self) -> Host {
        Host {
            process: self.process,
            deno: self.deno,
            worker: self.worker,
            worker_flag: self.worker_flag,
            namespace: Namespace::default(),
            claimed: AtomicBool::new(false),
        }
    }
}
