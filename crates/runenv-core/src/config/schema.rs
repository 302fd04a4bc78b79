//! Declarative env schema: internal key → runtime-specific name and type.
//!
//! Mappings are resolved against a runtime at lookup time, so the schema itself
//! never depends on which runtime is active. Type tags are also resolved at
//! lookup time; an unknown tag only fails when a load reaches it.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;
use std::sync::OnceLock;

use serde::Deserialize;

use super::env_keys::{self as env, keys};
use crate::error::{EnvError, Result};
use crate::runtime::RuntimeKind;

pub type Name = Cow<'static, str>;

/// Coercion target of a schema entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    String,
    Boolean,
    Number,
}

impl ValueType {
    pub fn tag(self) -> &'static str {
        match self {
            ValueType::String => "string",
            ValueType::Boolean => "boolean",
            ValueType::Number => "number",
        }
    }
}

/// Unresolved type tag as authored in the schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeTag(Name);

impl TypeTag {
    pub const STRING: TypeTag = TypeTag(Cow::Borrowed("string"));
    pub const BOOLEAN: TypeTag = TypeTag(Cow::Borrowed("boolean"));
    pub const NUMBER: TypeTag = TypeTag(Cow::Borrowed("number"));

    pub fn new(tag: impl Into<Name>) -> Self {
        TypeTag(tag.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `EnvError::Schema` for anything but string/boolean/number.
    pub fn resolve(&self, key: &str) -> Result<ValueType> {
        match self.as_str() {
            "string" => Ok(ValueType::String),
            "boolean" => Ok(ValueType::Boolean),
            "number" => Ok(ValueType::Number),
            other => Err(EnvError::Schema {
                key: key.to_string(),
                tag: other.to_string(),
            }),
        }
    }
}

impl From<ValueType> for TypeTag {
    fn from(t: ValueType) -> Self {
        TypeTag(Cow::Borrowed(t.tag()))
    }
}

/// Per-runtime external names with an optional `all` fallback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuntimeNames {
    /// Applies to every runtime and takes precedence over the per-runtime names.
    pub all: Option<Name>,
    pub node: Option<Name>,
    pub deno: Option<Name>,
    pub worker: Option<Name>,
}

impl RuntimeNames {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn for_all(name: impl Into<Name>) -> Self {
        Self {
            all: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn node(mut self, name: impl Into<Name>) -> Self {
        self.node = Some(name.into());
        self
    }

    pub fn deno(mut self, name: impl Into<Name>) -> Self {
        self.deno = Some(name.into());
        self
    }

    pub fn worker(mut self, name: impl Into<Name>) -> Self {
        self.worker = Some(name.into());
        self
    }

    /// Same name on node, deno and worker (no `all` fallback).
    pub fn each(name: &'static str) -> Self {
        Self::new().node(name).deno(name).worker(name)
    }

    pub fn name_for(&self, runtime: RuntimeKind) -> Option<&str> {
        self.all.as_deref().or(match runtime {
            RuntimeKind::Node => self.node.as_deref(),
            RuntimeKind::Deno => self.deno.as_deref(),
            RuntimeKind::Worker => self.worker.as_deref(),
        })
    }

    fn set(&mut self, runtime_id: &str, name: String) -> Result<()> {
        let slot = match runtime_id {
            "all" => &mut self.all,
            "node" => &mut self.node,
            "deno" => &mut self.deno,
            "worker" => &mut self.worker,
            other => {
                return Err(EnvError::SchemaDocument(format!(
                    "unknown runtime '{}' in name table (expected all, node, deno or worker)",
                    other
                )))
            }
        };
        *slot = Some(Cow::Owned(name));
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mapping {
    /// One string-typed name on every runtime.
    Named(Name),
    Typed {
        value_type: TypeTag,
        names: RuntimeNames,
    },
}

impl Mapping {
    /// `None` means the key is not available on `runtime`.
    pub fn external_name(&self, runtime: RuntimeKind) -> Option<&str> {
        match self {
            Mapping::Named(name) => Some(&**name),
            Mapping::Typed { names, .. } => names.name_for(runtime),
        }
    }

    pub fn type_tag(&self) -> &TypeTag {
        match self {
            Mapping::Named(_) => &TypeTag::STRING,
            Mapping::Typed { value_type, .. } => value_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaEntry {
    pub key: Name,
    pub mapping: Mapping,
}

impl SchemaEntry {
    pub fn named(key: impl Into<Name>, name: impl Into<Name>) -> Self {
        Self {
            key: key.into(),
            mapping: Mapping::Named(name.into()),
        }
    }

    pub fn typed(
        key: impl Into<Name>,
        value_type: impl Into<TypeTag>,
        names: RuntimeNames,
    ) -> Self {
        Self {
            key: key.into(),
            mapping: Mapping::Typed {
                value_type: value_type.into(),
                names,
            },
        }
    }

    pub fn external_name(&self, runtime: RuntimeKind) -> Option<&str> {
        self.mapping.external_name(runtime)
    }
}

/// Ordered, immutable set of schema entries with unique keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    entries: Vec<SchemaEntry>,
}

impl Schema {
    pub fn new(entries: Vec<SchemaEntry>) -> Result<Self> {
        let mut seen = HashSet::new();
        for entry in &entries {
            if !seen.insert(&*entry.key) {
                return Err(EnvError::SchemaDocument(format!(
                    "duplicate key '{}'",
                    entry.key
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The schema every host uses unless a manager is given another one.
    pub fn builtin() -> &'static Schema {
        static BUILTIN: OnceLock<Schema> = OnceLock::new();
        BUILTIN.get_or_init(|| Schema {
            entries: builtin_entries(),
        })
    }

    /// Parse a YAML (or JSON) schema document; declaration order is kept.
    ///
    /// ```yaml
    /// cloudPlatform: CLOUD_PLATFORM
    /// fetchTimeout:
    ///   type: number
    ///   name: { all: CF_BLOCKLIST_DOWNLOAD_TIMEOUT }
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self> {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(text).map_err(|e| EnvError::SchemaDocument(e.to_string()))?;
        let table = match doc {
            serde_yaml::Value::Mapping(m) => m,
            serde_yaml::Value::Null => serde_yaml::Mapping::new(),
            _ => {
                return Err(EnvError::SchemaDocument(
                    "top level must be a mapping of key → name".to_string(),
                ))
            }
        };
        let mut entries = Vec::with_capacity(table.len());
        for (k, v) in table {
            let key = k
                .as_str()
                .ok_or_else(|| EnvError::SchemaDocument(format!("non-string key {:?}", k)))?
                .to_string();
            let raw: RawMapping = serde_yaml::from_value(v)
                .map_err(|e| EnvError::SchemaDocument(format!("{}: {}", key, e)))?;
            entries.push(raw.into_entry(key)?);
        }
        Self::new(entries)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let schema = Self::from_yaml(&text)?;
        tracing::debug!(path = %path.display(), entries = schema.len(), "loaded env schema");
        Ok(schema)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.iter()
    }

    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.iter().find(|e| e.key == key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn builtin_entries() -> Vec<SchemaEntry> {
    use ValueType::{Boolean, Number};

    vec![
        SchemaEntry::typed(keys::RUN_TIME, TypeTag::STRING, RuntimeNames::each(env::RUNTIME)),
        SchemaEntry::typed(
            keys::RUN_TIME_ENV,
            TypeTag::STRING,
            RuntimeNames::new()
                .node(env::NODE_ENV)
                .deno(env::DENO_ENV)
                .worker(env::WORKER_ENV),
        ),
        SchemaEntry::named(keys::CLOUD_PLATFORM, env::CLOUD_PLATFORM),
        SchemaEntry::typed(keys::LOG_LEVEL, TypeTag::STRING, RuntimeNames::for_all(env::LOG_LEVEL)),
        SchemaEntry::named(keys::BLOCKLIST_URL, env::CF_BLOCKLIST_URL),
        SchemaEntry::named(keys::LATEST_TIMESTAMP, env::CF_LATEST_BLOCKLIST_TIMESTAMP),
        SchemaEntry::named(keys::DNS_RESOLVER_URL, env::CF_DNS_RESOLVER_URL),
        SchemaEntry::typed(
            keys::ON_INVALID_FLAG_STOP_PROCESSING,
            Boolean,
            RuntimeNames::for_all(env::CF_ON_INVALID_FLAG_STOP_PROCESSING),
        ),
        SchemaEntry::typed(
            keys::FETCH_TIMEOUT,
            Number,
            RuntimeNames::for_all(env::CF_BLOCKLIST_DOWNLOAD_TIMEOUT),
        ),
        SchemaEntry::typed(keys::TD_NODE_COUNT, Number, RuntimeNames::for_all(env::TD_NODE_COUNT)),
        SchemaEntry::typed(keys::TD_PARTS, Number, RuntimeNames::for_all(env::TD_PARTS)),
        SchemaEntry::typed(keys::CACHE_TTL, Number, RuntimeNames::for_all(env::CACHE_TTL)),
        SchemaEntry::typed(
            keys::TLS_KEY_PATH,
            TypeTag::STRING,
            RuntimeNames::new().node(env::TLS_KEY_PATH).deno(env::TLS_KEY_PATH),
        ),
        SchemaEntry::typed(
            keys::TLS_CRT_PATH,
            TypeTag::STRING,
            RuntimeNames::new().node(env::TLS_CRT_PATH).deno(env::TLS_CRT_PATH),
        ),
        SchemaEntry::typed(
            keys::IS_AGG_CACHE_REQ,
            Boolean,
            RuntimeNames::new().worker(env::IS_AGGREGATE_CACHE_REQ),
        ),
    ]
}

// ─── Schema document shape ───────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(untagged)]
enum RawMapping {
    Name(String),
    Typed {
        #[serde(rename = "type", default)]
        value_type: Option<String>,
        name: RawNames,
    },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawNames {
    One(String),
    PerRuntime(BTreeMap<String, String>),
}

impl RawMapping {
    fn into_entry(self, key: String) -> Result<SchemaEntry> {
        match self {
            RawMapping::Name(name) => Ok(SchemaEntry::named(key, name)),
            RawMapping::Typed { value_type, name } => {
                let names = match name {
                    RawNames::One(n) => RuntimeNames::for_all(n),
                    RawNames::PerRuntime(table) => {
                        let mut names = RuntimeNames::new();
                        for (runtime_id, n) in table {
                            names.set(&runtime_id, n)?;
                        }
                        names
                    }
                };
                let tag = value_type.map_or(TypeTag::STRING, |t| TypeTag::new(t));
                Ok(SchemaEntry::typed(key, tag, names))
            }
        }
    }
}
