//! Configuration layers and identity.
//!
//! A [`ConfigLayer`] is one precedence tier of flat `key → value` string
//! properties. Layers are immutable once built: ingestion copies the source
//! data, so mutating the original map afterwards is never observable through
//! the layer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One immutable precedence tier of configuration data.
///
/// Keys carry no hierarchical meaning at this level — `"a.b"` is just a flat
/// key that happens to contain a dot. Precedence among layers is decided by
/// their position in the stack handed to
/// [`PluginConfig`](crate::PluginConfig), not by anything stored here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConfigLayer {
    entries: HashMap<String, String>,
}

impl ConfigLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the raw value for `key`, if present in this layer.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Returns `true` if this layer contains `key` exactly.
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Iterates over this layer's keys in no particular order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Iterates over this layer's entries in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the number of entries in this layer.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this layer holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl From<HashMap<String, String>> for ConfigLayer {
    fn from(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ConfigLayer {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for ConfigLayer {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

/// Identity of a plugin configuration: which subsystem it belongs to
/// (`domain`), which plugin instance it configures (`id`), and the logical
/// grouping it lives in (`namespace`, e.g. a tenant or environment tag).
///
/// Immutable for the lifetime of the configuration it identifies; also the
/// key type of [`PluginConfigRegistry`](crate::PluginConfigRegistry).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ConfigIdentity {
    domain: String,
    id: String,
    namespace: String,
}

impl ConfigIdentity {
    /// Creates a new identity.
    pub fn new(
        domain: impl Into<String>,
        id: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            domain: domain.into(),
            id: id.into(),
            namespace: namespace.into(),
        }
    }

    /// The subsystem name.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// The plugin instance name.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The logical grouping tag.
    pub fn namespace(&self) -> &str {
        &self.namespace
    }
}

impl std::fmt::Display for ConfigIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.domain, self.namespace, self.id)
    }
}
