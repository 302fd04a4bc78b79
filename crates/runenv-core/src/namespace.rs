//! Ordered env store and the host-wide published namespace.

use std::sync::{Arc, RwLock, RwLockReadGuard};

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::value::EnvValue;

/// Ordered key → value store. Iteration follows first insertion; overwriting
/// a key keeps its position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnvMap {
    entries: Vec<(String, EnvValue)>,
}

impl EnvMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite; returns the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: EnvValue) -> Option<EnvValue> {
        let key = key.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => Some(std::mem::replace(slot, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&EnvValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &EnvValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    /// Pretty JSON object in insertion order. NaN numbers render as `null`.
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl Serialize for EnvMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (k, v) in &self.entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<K: Into<String>> FromIterator<(K, EnvValue)> for EnvMap {
    fn from_iter<I: IntoIterator<Item = (K, EnvValue)>>(iter: I) -> Self {
        let mut map = EnvMap::new();
        for (k, v) in iter {
            map.insert(k, v);
        }
        map
    }
}

/// Read-only view of the values a manager published for its host.
///
/// Cheap to clone; every clone sees each new snapshot as soon as it is
/// published.
#[derive(Debug, Clone, Default)]
pub struct Namespace {
    inner: Arc<RwLock<EnvMap>>,
}

impl Namespace {
    pub fn get(&self, key: &str) -> Option<EnvValue> {
        self.read().get(key).cloned()
    }

    pub fn snapshot(&self) -> EnvMap {
        self.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn to_json_string(&self) -> serde_json::Result<String> {
        self.read().to_json_string()
    }

    /// Replace the whole snapshot.
    pub(crate) fn publish(&self, map: EnvMap) {
        let mut guard = self.inner.write().unwrap_or_else(|p| p.into_inner());
        *guard = map;
    }

    fn read(&self) -> RwLockReadGuard<'_, EnvMap> {
        self.inner.read().unwrap_or_else(|p| p.into_inner())
    }
}
