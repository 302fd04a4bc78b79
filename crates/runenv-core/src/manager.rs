//! Env manager: the single owner of a host's namespace.
//!
//! ```no_run
//! use runenv_core::{EnvManager, Host};
//!
//! let mut env = EnvManager::new(Host::current())?;
//! env.load_env()?;
//! let level = env.get("logLevel");
//! # Ok::<(), runenv_core::EnvError>(())
//! ```

use crate::config::env_keys::keys;
use crate::config::{resolve_all, worker_timeout, Schema};
use crate::error::Result;
use crate::host::Host;
use crate::namespace::{EnvMap, Namespace};
use crate::runtime::{detect_runtime, RuntimeKind};
use crate::value::EnvValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Uninitialized,
    Loaded,
}

pub struct EnvManager<'h> {
    host: &'h Host,
    schema: &'h Schema,
    runtime: Option<RuntimeKind>,
    store: EnvMap,
    state: LoadState,
}

impl<'h> EnvManager<'h> {
    /// Claim `host` with the built-in schema. A host accepts exactly one
    /// manager; any later attempt fails with `SingletonViolation`.
    pub fn new(host: &'h Host) -> Result<Self> {
        Self::with_schema(host, Schema::builtin())
    }

    pub fn with_schema(host: &'h Host, schema: &'h Schema) -> Result<Self> {
        host.claim()?;
        Ok(Self {
            host,
            schema,
            runtime: None,
            store: EnvMap::new(),
            state: LoadState::Uninitialized,
        })
    }

    /// Detect the runtime (first call only), resolve the schema, store every
    /// value and publish the full snapshot. Worker hosts also get the derived
    /// `workerTimeout` key. On error nothing is stored or published.
    pub fn load_env(&mut self) -> Result<()> {
        let runtime = match self.runtime {
            Some(rt) => rt,
            None => {
                let rt = detect_runtime(self.host)?;
                tracing::debug!(runtime = %rt, "detected runtime");
                self.runtime = Some(rt);
                rt
            }
        };

        let resolved = resolve_all(self.schema, runtime, self.host)?;
        for (key, value) in resolved.iter() {
            self.store.insert(key, value.clone());
        }
        if runtime == RuntimeKind::Worker {
            self.store.insert(keys::WORKER_TIMEOUT, worker_timeout(self.host));
        }

        self.publish();
        self.state = LoadState::Loaded;
        tracing::info!(runtime = %runtime, keys = self.store.len(), "env loaded");
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.store.get(key)
    }

    /// Insert or overwrite `key` as given (no coercion) and republish.
    pub fn set(&mut self, key: &str, value: impl Into<EnvValue>) {
        self.store.insert(key, value.into());
        self.publish();
        tracing::debug!(key, "env key set");
    }

    /// Snapshot of the store in insertion order.
    pub fn to_object(&self) -> EnvMap {
        self.store.clone()
    }

    pub fn env_map(&self) -> &EnvMap {
        &self.store
    }

    pub fn runtime(&self) -> Option<RuntimeKind> {
        self.runtime
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The published, read-only view collaborators hold on to.
    pub fn namespace(&self) -> &Namespace {
        self.host.namespace()
    }

    fn publish(&self) {
        self.host.namespace().publish(self.store.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{RuntimeNames, SchemaEntry, TypeTag};
    use crate::source::MapSource;
    use crate::EnvError;

    fn node_host(vars: MapSource) -> Host {
        Host::builder().process(vars).build()
    }

    #[test]
    fn starts_uninitialized_and_empty() {
        let host = node_host(MapSource::new());
        let env = EnvManager::new(&host).unwrap();
        assert_eq!(env.state(), LoadState::Uninitialized);
        assert!(env.env_map().is_empty());
        assert_eq!(env.get(keys::LOG_LEVEL), None);
        assert_eq!(env.runtime(), None);
        assert!(env.namespace().is_empty());
    }

    #[test]
    fn node_end_to_end() {
        let host = node_host(
            MapSource::new()
                .with("LOG_LEVEL", "debug")
                .with("CF_BLOCKLIST_DOWNLOAD_TIMEOUT", "30"),
        );
        let mut env = EnvManager::new(&host).unwrap();
        env.load_env().unwrap();

        assert_eq!(env.state(), LoadState::Loaded);
        assert_eq!(env.runtime(), Some(RuntimeKind::Node));
        assert_eq!(env.get(keys::LOG_LEVEL), Some(&EnvValue::Str("debug".into())));
        assert_eq!(env.get(keys::FETCH_TIMEOUT), Some(&EnvValue::Num(30.0)));
        assert_eq!(
            env.get(keys::ON_INVALID_FLAG_STOP_PROCESSING),
            Some(&EnvValue::Bool(false))
        );
        assert_eq!(env.get(keys::BLOCKLIST_URL), Some(&EnvValue::Str(String::new())));
        assert_eq!(env.get(keys::WORKER_TIMEOUT), None);

        let ns = host.namespace();
        assert_eq!(ns.get(keys::LOG_LEVEL), Some(EnvValue::Str("debug".into())));
        assert_eq!(ns.snapshot(), env.to_object());
    }

    #[test]
    fn second_manager_on_same_host_fails() {
        let host = node_host(MapSource::new());
        let _first = EnvManager::new(&host).unwrap();
        let second = EnvManager::new(&host);
        assert!(matches!(second, Err(EnvError::SingletonViolation)));
    }

    #[test]
    fn claim_survives_the_first_manager() {
        let host = node_host(MapSource::new());
        {
            let mut first = EnvManager::new(&host).unwrap();
            first.load_env().unwrap();
        }
        assert!(matches!(
            EnvManager::new(&host),
            Err(EnvError::SingletonViolation)
        ));
        // A failed attempt before any load still blocks later ones.
        let fresh = node_host(MapSource::new());
        let schema = Schema::new(vec![]).unwrap();
        let _owner = EnvManager::with_schema(&fresh, &schema).unwrap();
        assert!(EnvManager::new(&fresh).is_err());
        assert!(EnvManager::new(&fresh).is_err());
    }

    #[test]
    fn load_is_idempotent() {
        let host = node_host(MapSource::new().with("CLOUD_PLATFORM", "fly"));
        let mut env = EnvManager::new(&host).unwrap();
        env.load_env().unwrap();
        let first = env.to_object();
        env.load_env().unwrap();
        assert_eq!(env.to_object(), first);
        assert_eq!(host.namespace().snapshot(), first);
    }

    #[test]
    fn set_then_get_and_publish() {
        let host = node_host(MapSource::new());
        let mut env = EnvManager::new(&host).unwrap();
        let reader = env.namespace().clone();
        env.load_env().unwrap();

        env.set(keys::LOG_LEVEL, "warn");
        env.set("customFlag", true);
        env.set(keys::FETCH_TIMEOUT, "not coerced");

        assert_eq!(env.get(keys::LOG_LEVEL), Some(&EnvValue::Str("warn".into())));
        assert_eq!(env.get("customFlag"), Some(&EnvValue::Bool(true)));
        assert_eq!(
            env.get(keys::FETCH_TIMEOUT),
            Some(&EnvValue::Str("not coerced".into()))
        );
        assert_eq!(reader.get(keys::LOG_LEVEL), Some(EnvValue::Str("warn".into())));
        assert_eq!(reader.get("customFlag"), Some(EnvValue::Bool(true)));
    }

    #[test]
    fn set_before_load_publishes_and_load_overwrites() {
        let host = node_host(MapSource::new().with("LOG_LEVEL", "info"));
        let mut env = EnvManager::new(&host).unwrap();
        env.set(keys::LOG_LEVEL, "trace");
        assert_eq!(env.state(), LoadState::Uninitialized);
        assert_eq!(host.namespace().get(keys::LOG_LEVEL), Some(EnvValue::Str("trace".into())));

        env.load_env().unwrap();
        assert_eq!(env.get(keys::LOG_LEVEL), Some(&EnvValue::Str("info".into())));
        // Overwriting keeps the position of the earlier set.
        assert_eq!(env.env_map().keys().next(), Some(keys::LOG_LEVEL));
    }

    #[test]
    fn worker_gets_derived_timeout() {
        let host = Host::builder()
            .process(MapSource::new())
            .worker(
                MapSource::new()
                    .with("WORKER_TIMEOUT", 5.0)
                    .with("CF_BLOCKLIST_DOWNLOAD_TIMEOUT", 10.0),
            )
            .build();
        let mut env = EnvManager::new(&host).unwrap();
        env.load_env().unwrap();
        assert_eq!(env.runtime(), Some(RuntimeKind::Worker));
        assert_eq!(env.get(keys::WORKER_TIMEOUT), Some(&EnvValue::Num(15.0)));
        assert_eq!(env.get(keys::FETCH_TIMEOUT), Some(&EnvValue::Num(10.0)));
        assert_eq!(
            host.namespace().get(keys::WORKER_TIMEOUT),
            Some(EnvValue::Num(15.0))
        );
    }

    #[test]
    fn deno_has_no_derived_timeout() {
        let host = Host::builder()
            .deno(
                MapSource::new()
                    .with("WORKER_TIMEOUT", "5")
                    .with("CF_BLOCKLIST_DOWNLOAD_TIMEOUT", "10")
                    .with("DENO_ENV", "production"),
            )
            .build();
        let mut env = EnvManager::new(&host).unwrap();
        env.load_env().unwrap();
        assert_eq!(env.runtime(), Some(RuntimeKind::Deno));
        assert_eq!(env.get(keys::WORKER_TIMEOUT), None);
        assert_eq!(
            env.get(keys::RUN_TIME_ENV),
            Some(&EnvValue::Str("production".into()))
        );
    }

    #[test]
    fn undetected_runtime_fails_load() {
        let host = Host::builder().build();
        let mut env = EnvManager::new(&host).unwrap();
        let err = env.load_env().unwrap_err();
        assert!(matches!(err, EnvError::UndetectedRuntime));
        assert_eq!(env.state(), LoadState::Uninitialized);
        assert!(host.namespace().is_empty());
    }

    #[test]
    fn schema_error_leaves_store_untouched() {
        let schema = Schema::new(vec![
            SchemaEntry::named("logLevel", "LOG_LEVEL"),
            SchemaEntry::typed("ttl", TypeTag::new("duration"), RuntimeNames::for_all("TTL")),
        ])
        .unwrap();
        let host = node_host(MapSource::new().with("LOG_LEVEL", "debug"));
        let mut env = EnvManager::with_schema(&host, &schema).unwrap();
        let err = env.load_env().unwrap_err();
        assert!(matches!(err, EnvError::Schema { .. }));
        assert!(env.env_map().is_empty());
        assert!(host.namespace().is_empty());
        assert_eq!(env.state(), LoadState::Uninitialized);
    }
}
