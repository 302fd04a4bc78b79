//! Variable sources: one accessor per runtime kind.
//!
//! The lookup pass only sees `&dyn VariableSource`; which implementation
//! backs it is decided once, when the host is built.

use std::collections::HashMap;
use std::env;
use std::path::Path;

use crate::error::Result;
use crate::value::RawValue;

/// A runtime's variable accessor. `None` is a miss, never an error.
pub trait VariableSource: Send + Sync {
    fn lookup(&self, name: &str) -> Option<RawValue>;
}

/// The process environment table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemEnv;

impl VariableSource for SystemEnv {
    fn lookup(&self, name: &str) -> Option<RawValue> {
        // Non-UTF-8 values are treated as unset.
        env::var(name).ok().map(RawValue::Str)
    }
}

/// In-memory table of variables: deno env snapshots, worker bindings, `.env` files.
#[derive(Debug, Clone, Default)]
pub struct MapSource {
    vars: HashMap<String, RawValue>,
}

impl MapSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: &str, value: impl Into<RawValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: &str, value: impl Into<RawValue>) {
        self.vars.insert(name.to_string(), value.into());
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    /// Parse `.env` text. Blank lines and `#` comments are skipped, surrounding
    /// quotes are stripped, and an unquoted trailing `# comment` is dropped.
    /// The first definition of a key wins.
    pub fn from_dotenv_str(content: &str) -> Self {
        let mut vars = HashMap::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line = line.strip_prefix("export ").unwrap_or(line);
            let Some((key, value)) = line.split_once('=') else {
                continue;
            };
            let key = key.trim();
            if key.is_empty() {
                continue;
            }
            let mut value = value.trim();
            if let Some(hash_pos) = value.find('#') {
                let before_hash = value[..hash_pos].trim_end();
                if !before_hash.contains('"') && !before_hash.contains('\'') {
                    value = before_hash;
                }
            }
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }
            vars.entry(key.to_string())
                .or_insert_with(|| RawValue::Str(value.to_string()));
        }
        Self { vars }
    }

    /// Read and parse a `.env` file.
    pub fn from_dotenv_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_dotenv_str(&content);
        tracing::debug!(path = %path.display(), vars = source.len(), "loaded dotenv file");
        Ok(source)
    }
}

impl FromIterator<(String, RawValue)> for MapSource {
    fn from_iter<I: IntoIterator<Item = (String, RawValue)>>(iter: I) -> Self {
        Self {
            vars: iter.into_iter().collect(),
        }
    }
}

impl VariableSource for MapSource {
    fn lookup(&self, name: &str) -> Option<RawValue> {
        self.vars.get(name).cloned()
    }
}

/// Ordered stack of sources; the first layer that has a name wins.
#[derive(Default)]
pub struct LayeredSource {
    layers: Vec<Box<dyn VariableSource>>,
}

impl LayeredSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(mut self, source: impl VariableSource + 'static) -> Self {
        self.layers.push(Box::new(source));
        self
    }
}

impl VariableSource for LayeredSource {
    fn lookup(&self, name: &str) -> Option<RawValue> {
        self.layers.iter().find_map(|l| l.lookup(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn map_source_hit_and_miss() {
        let src = MapSource::new()
            .with("LOG_LEVEL", "debug")
            .with("WORKER_TIMEOUT", 5.0);
        assert_eq!(src.lookup("LOG_LEVEL"), Some(RawValue::Str("debug".into())));
        assert_eq!(src.lookup("WORKER_TIMEOUT"), Some(RawValue::Num(5.0)));
        assert_eq!(src.lookup("CF_BLOCKLIST_URL"), None);
    }

    #[test]
    fn dotenv_parsing() {
        let src = MapSource::from_dotenv_str(
            r#"
# comment line
LOG_LEVEL=debug
CF_BLOCKLIST_URL="https://dist.example.com/blocklists/"
TD_PARTS='2'
CACHE_TTL=1800 # seconds
QUOTED_HASH="a # b"
export NODE_ENV=production
LOG_LEVEL=error
=orphan
no_equals_line
"#,
        );
        let get = |k: &str| src.lookup(k);
        assert_eq!(get("LOG_LEVEL"), Some("debug".into()));
        assert_eq!(
            get("CF_BLOCKLIST_URL"),
            Some("https://dist.example.com/blocklists/".into())
        );
        assert_eq!(get("TD_PARTS"), Some("2".into()));
        assert_eq!(get("CACHE_TTL"), Some("1800".into()));
        assert_eq!(get("QUOTED_HASH"), Some("a # b".into()));
        assert_eq!(get("NODE_ENV"), Some("production".into()));
        assert_eq!(src.len(), 6);
    }

    #[test]
    fn dotenv_file_roundtrip() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CLOUD_PLATFORM=fly").unwrap();
        let src = MapSource::from_dotenv_file(file.path()).unwrap();
        assert_eq!(src.lookup("CLOUD_PLATFORM"), Some("fly".into()));
    }

    #[test]
    fn missing_dotenv_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = MapSource::from_dotenv_file(&dir.path().join("absent.env")).unwrap_err();
        assert!(matches!(err, crate::EnvError::Io(_)));
    }

    #[test]
    fn layered_first_hit_wins() {
        let src = LayeredSource::new()
            .layer(MapSource::new().with("LOG_LEVEL", "warn"))
            .layer(
                MapSource::new()
                    .with("LOG_LEVEL", "debug")
                    .with("CLOUD_PLATFORM", "fly"),
            );
        assert_eq!(src.lookup("LOG_LEVEL"), Some("warn".into()));
        assert_eq!(src.lookup("CLOUD_PLATFORM"), Some("fly".into()));
        assert_eq!(src.lookup("RUNTIME"), None);
    }
}
