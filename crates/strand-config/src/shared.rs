//! Atomic publication point for hot-reloaded configurations.

use std::sync::Arc;

use arc_swap::ArcSwap;
use tracing::debug;

use crate::layer::{ConfigIdentity, ConfigLayer};
use crate::plugin_config::PluginConfig;

/// Holds the currently-active [`PluginConfig`] behind an atomic reference.
///
/// Reads are lock-free and always see a fully-constructed instance. A reload
/// builds a complete replacement from the updated layer stack, swaps the
/// reference, and only then notifies listeners — concurrent readers during a
/// reload observe either the fully-old or the fully-new config, never a mix.
pub struct SharedPluginConfig {
    current: ArcSwap<PluginConfig>,
}

impl SharedPluginConfig {
    /// Wraps an initial configuration.
    pub fn new(config: PluginConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(config),
        }
    }

    /// Returns the currently-active configuration.
    pub fn current(&self) -> Arc<PluginConfig> {
        self.current.load_full()
    }

    /// The identity shared by every generation of this configuration.
    pub fn identity(&self) -> ConfigIdentity {
        self.current.load().identity().clone()
    }

    /// Replaces the active configuration with one built from `layers`.
    ///
    /// The replacement keeps the identity and inherits the retired instance's
    /// listener set, is published atomically, and each listener is then
    /// invoked exactly once with the `(old, new)` pair. The retired instance
    /// stays valid for readers that already hold it.
    ///
    /// Returns the new active configuration.
    pub fn reload(&self, layers: impl IntoIterator<Item = ConfigLayer>) -> Arc<PluginConfig> {
        let old = self.current.load_full();
        let new = Arc::new(PluginConfig::from_layers(old.identity().clone(), layers));
        new.inherit_listeners(&old);

        self.current.store(Arc::clone(&new));
        debug!(identity = %new.identity(), "Published reloaded plugin config");

        old.foreach_change_listener(|listener| listener.on_change(&old, &new));
        new
    }
}

impl std::fmt::Debug for SharedPluginConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SharedPluginConfig")
            .field("current", &self.current.load())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn initial() -> PluginConfig {
        PluginConfig::build(
            "testdomain",
            "testid",
            [("enabled", "true"), ("count", "127")].into(),
            "NAMESPACE",
            ConfigLayer::new(),
            None,
        )
    }

    #[test]
    fn reload_swaps_the_active_config() {
        let shared = SharedPluginConfig::new(initial());
        let before = shared.current();

        shared.reload([ConfigLayer::from([("count", "256")])]);
        let after = shared.current();

        assert_eq!(after.get_int("count"), Some(256));
        assert!(!after.has_property("enabled"));
        // The retired instance is untouched.
        assert_eq!(before.get_int("count"), Some(127));
        assert!(before.get_boolean("enabled"));
        // Identity survives the reload.
        assert_eq!(after.identity(), before.identity());
    }

    #[test]
    fn every_listener_sees_one_old_new_pair() {
        let shared = SharedPluginConfig::new(initial());
        let hits = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let hits = Arc::clone(&hits);
            shared
                .current()
                .add_change_listener(move |old: &PluginConfig, new: &PluginConfig| {
                    assert_eq!(old.get_int("count"), Some(127));
                    assert_eq!(new.get_int("count"), Some(64));
                    hits.fetch_add(1, Ordering::SeqCst);
                });
        }

        shared.reload([ConfigLayer::from([("count", "64")])]);
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn listeners_survive_across_reloads() {
        let shared = SharedPluginConfig::new(initial());
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_in_listener = Arc::clone(&hits);
        shared
            .current()
            .add_change_listener(move |_: &PluginConfig, _: &PluginConfig| {
                hits_in_listener.fetch_add(1, Ordering::SeqCst);
            });

        shared.reload([ConfigLayer::from([("count", "1")])]);
        shared.reload([ConfigLayer::from([("count", "2")])]);

        // Inherited by the first replacement, so the second reload fires too.
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn listener_sees_fully_constructed_replacement() {
        let shared = SharedPluginConfig::new(initial());
        shared
            .current()
            .add_change_listener(|_: &PluginConfig, new: &PluginConfig| {
                // Both keys of the new stack must already be visible.
                assert_eq!(new.get_int("count"), Some(9));
                assert_eq!(new.get_string("host"), Some("h"));
            });
        shared.reload([ConfigLayer::from([("count", "9"), ("host", "h")])]);
    }
}
