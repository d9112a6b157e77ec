//! The effective plugin configuration view and its change listeners.
//!
//! [`PluginConfig`] merges an ordered stack of [`ConfigLayer`]s into one
//! effective view at construction time and never changes afterwards. All
//! typed accessors degrade silently — an absent key or a malformed value is
//! reported as absence, never as an error — because this code runs on every
//! intercepted call and must not disturb the host application's control flow.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::layer::{ConfigIdentity, ConfigLayer};

/// Callback invoked when a configuration is hot-reloaded.
///
/// Receives the retired instance and its fully-constructed replacement. The
/// old instance stays valid and immutable, so listeners may diff the two at
/// leisure. Implemented automatically for matching closures.
pub trait ConfigChangeListener: Send + Sync {
    /// Called exactly once per reload with the `(old, new)` pair.
    fn on_change(&self, old: &PluginConfig, new: &PluginConfig);
}

impl<F> ConfigChangeListener for F
where
    F: Fn(&PluginConfig, &PluginConfig) + Send + Sync,
{
    fn on_change(&self, old: &PluginConfig, new: &PluginConfig) {
        self(old, new)
    }
}

/// One logical, typed, hot-swappable configuration view.
///
/// The effective value of a key is taken from the highest-precedence layer
/// that contains it; the effective key set is the union of all layer keys.
/// Both are fixed when the instance is built — a reload constructs a new
/// `PluginConfig` rather than mutating this one, which is what makes
/// concurrent reads lock-free.
///
/// # Accessor semantics
///
/// Numeric accessors ([`get_int`](Self::get_int), [`get_long`](Self::get_long),
/// [`get_double`](Self::get_double)) return `None` both for an absent key and
/// for a value that fails to parse. [`get_boolean`](Self::get_boolean) is the
/// deliberate exception: it has no absent state. A missing key, a malformed
/// value, and the literal `"false"` are all just `false` — boolean keys model
/// feature flags, where "unset" and "off" mean the same thing. Callers that
/// need to distinguish the two must go through
/// [`has_property`](Self::has_property).
pub struct PluginConfig {
    identity: ConfigIdentity,
    properties: HashMap<String, String>,
    listeners: RwLock<Vec<Arc<dyn ConfigChangeListener>>>,
}

impl PluginConfig {
    /// Builds a configuration from an identity and an ordered layer stack.
    ///
    /// Precedence increases with position: for a key present in several
    /// layers, the last layer's value wins.
    pub fn from_layers(
        identity: ConfigIdentity,
        layers: impl IntoIterator<Item = ConfigLayer>,
    ) -> Self {
        let mut properties = HashMap::new();
        for layer in layers {
            for (key, value) in layer.iter() {
                properties.insert(key.to_string(), value.to_string());
            }
        }
        Self {
            identity,
            properties,
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Builds a configuration from the conventional three named layers.
    ///
    /// `global` is the lowest tier, `cover` overrides it, and the optional
    /// `extra` tier overrides both.
    pub fn build(
        domain: impl Into<String>,
        id: impl Into<String>,
        global: ConfigLayer,
        namespace: impl Into<String>,
        cover: ConfigLayer,
        extra: Option<ConfigLayer>,
    ) -> Self {
        let identity = ConfigIdentity::new(domain, id, namespace);
        let layers = [Some(global), Some(cover), extra].into_iter().flatten();
        Self::from_layers(identity, layers)
    }

    /// The configuration's identity.
    pub fn identity(&self) -> &ConfigIdentity {
        &self.identity
    }

    /// The subsystem name.
    pub fn domain(&self) -> &str {
        self.identity.domain()
    }

    /// The plugin instance name.
    pub fn id(&self) -> &str {
        self.identity.id()
    }

    /// The logical grouping tag.
    pub fn namespace(&self) -> &str {
        self.identity.namespace()
    }

    /// Returns the effective raw value for `key`.
    pub fn get_string(&self, key: &str) -> Option<&str> {
        self.properties.get(key).map(String::as_str)
    }

    /// Returns the effective value parsed as `i32`.
    ///
    /// `None` if the key is absent or the value does not parse.
    pub fn get_int(&self, key: &str) -> Option<i32> {
        self.get_string(key)?.parse().ok()
    }

    /// Returns the effective value parsed as `i64`.
    ///
    /// `None` if the key is absent or the value does not parse.
    pub fn get_long(&self, key: &str) -> Option<i64> {
        self.get_string(key)?.parse().ok()
    }

    /// Returns the effective value parsed as `f64`.
    ///
    /// Integer literals parse too. `None` if the key is absent or the value
    /// does not parse.
    pub fn get_double(&self, key: &str) -> Option<f64> {
        self.get_string(key)?.parse().ok()
    }

    /// Returns `true` iff the effective value is exactly the literal `"true"`.
    ///
    /// There is no absent state: a missing key, `"false"`, `"TRUE"`, and
    /// garbage all yield `false`. See the type-level docs for why.
    pub fn get_boolean(&self, key: &str) -> bool {
        self.get_string(key) == Some("true")
    }

    /// Returns the effective value split on `,`, in order.
    ///
    /// No trimming or deduplication beyond the split; an absent key yields an
    /// empty vector.
    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        match self.get_string(key) {
            Some(value) => value.split(',').map(str::to_string).collect(),
            None => Vec::new(),
        }
    }

    /// Returns `true` iff `key` is an exact member of the effective key set.
    ///
    /// No prefix or hierarchical matching: a present `"a.b"` does not imply
    /// `has_property("a.b.c")`.
    pub fn has_property(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    /// The effective key set — the union of all layers' keys.
    pub fn key_set(&self) -> HashSet<&str> {
        self.properties.keys().map(String::as_str).collect()
    }

    /// Registers a change listener.
    ///
    /// Each registered listener is invoked exactly once per reload with the
    /// `(old, new)` pair; delivery order among listeners is unspecified.
    pub fn add_change_listener(&self, listener: impl ConfigChangeListener + 'static) {
        self.listeners.write().push(Arc::new(listener));
    }

    /// Invokes `visitor` once per registered listener.
    ///
    /// Iterates over a snapshot taken under the read lock, so listeners may
    /// be registered concurrently without corrupting the traversal.
    pub fn foreach_change_listener(&self, mut visitor: impl FnMut(&Arc<dyn ConfigChangeListener>)) {
        let snapshot: Vec<_> = self.listeners.read().clone();
        for listener in &snapshot {
            visitor(listener);
        }
    }

    /// Copies `source`'s listener set into this instance.
    ///
    /// Used by the reload path: the replacement config inherits the retired
    /// instance's listeners before it is published.
    pub(crate) fn inherit_listeners(&self, source: &PluginConfig) {
        let inherited: Vec<_> = source.listeners.read().clone();
        *self.listeners.write() = inherited;
    }
}

impl std::fmt::Debug for PluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfig")
            .field("identity", &self.identity)
            .field("properties", &self.properties.len())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}
