//! Process-wide registry of plugin configurations.
//!
//! External configuration loaders hand updated layer stacks to
//! [`PluginConfigRegistry::update`]; observers look their configuration up by
//! [`ConfigIdentity`] and read through the returned
//! [`SharedPluginConfig`](crate::SharedPluginConfig) handle.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::layer::{ConfigIdentity, ConfigLayer};
use crate::plugin_config::PluginConfig;
use crate::shared::SharedPluginConfig;

/// Registry mapping [`ConfigIdentity`] to its active configuration handle.
///
/// The map itself is guarded by a `RwLock`; reads of an individual
/// configuration go through the lock-free [`SharedPluginConfig`] handle, so
/// the hot path — an observer reading its settings during an intercepted
/// call — only touches the lock once to resolve the handle.
#[derive(Default)]
pub struct PluginConfigRegistry {
    configs: RwLock<HashMap<ConfigIdentity, Arc<SharedPluginConfig>>>,
}

impl PluginConfigRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a configuration under its own identity.
    ///
    /// Re-registering an identity replaces the previous handle; the last
    /// registration wins.
    pub fn register(&self, config: PluginConfig) -> Arc<SharedPluginConfig> {
        let identity = config.identity().clone();
        let shared = Arc::new(SharedPluginConfig::new(config));
        let previous = self
            .configs
            .write()
            .insert(identity.clone(), Arc::clone(&shared));
        if previous.is_some() {
            warn!(identity = %identity, "Duplicate config registration — last registration wins");
        } else {
            debug!(identity = %identity, "Registered plugin config");
        }
        shared
    }

    /// Returns the handle registered for `identity`, if any.
    pub fn get(&self, identity: &ConfigIdentity) -> Option<Arc<SharedPluginConfig>> {
        self.configs.read().get(identity).cloned()
    }

    /// Returns the currently-active configuration for `identity`, if any.
    pub fn current(&self, identity: &ConfigIdentity) -> Option<Arc<PluginConfig>> {
        self.get(identity).map(|shared| shared.current())
    }

    /// Hot-reloads the configuration registered for `identity` from `layers`.
    ///
    /// Returns `true` if a reload was published. An unknown identity is
    /// logged and ignored — a reload event for a plugin that never registered
    /// must not disturb anything else.
    pub fn update(
        &self,
        identity: &ConfigIdentity,
        layers: impl IntoIterator<Item = ConfigLayer>,
    ) -> bool {
        match self.get(identity) {
            Some(shared) => {
                shared.reload(layers);
                true
            }
            None => {
                warn!(identity = %identity, "Reload for unregistered config — ignored");
                false
            }
        }
    }

    /// Returns all registered identities.
    pub fn identities(&self) -> Vec<ConfigIdentity> {
        self.configs.read().keys().cloned().collect()
    }

    /// Returns the number of registered configurations.
    pub fn len(&self) -> usize {
        self.configs.read().len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.configs.read().is_empty()
    }
}

impl std::fmt::Debug for PluginConfigRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginConfigRegistry")
            .field("configs", &self.len())
            .finish()
    }
}
