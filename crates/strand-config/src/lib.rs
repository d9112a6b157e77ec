//! Layered plugin configuration for the Strand instrumentation runtime.
//!
//! Observers attached to intercepted calls decide their own behaviour from a
//! [`PluginConfig`]: one logical, typed view over an ordered stack of
//! [`ConfigLayer`]s (precedence increases with position — the last layer
//! wins). A `PluginConfig` is immutable for its whole lifetime; a hot-reload
//! builds a *new* instance from updated layers and publishes it with an
//! atomic reference swap, so concurrent readers never observe a half-updated
//! stack.
//!
//! # Components
//!
//! - [`ConfigLayer`] — one immutable precedence tier of string properties.
//! - [`ConfigIdentity`] — `(domain, id, namespace)` identity of a config.
//! - [`PluginConfig`] — the merged, typed view plus its change-listener set.
//! - [`SharedPluginConfig`] — atomic publication point for hot-reload.
//! - [`PluginConfigRegistry`] — process-wide identity → config map.
//!
//! # Example
//!
//! ```rust
//! use strand_config::{ConfigLayer, PluginConfig};
//!
//! let global: ConfigLayer = [("enabled", "true"), ("count", "127")].into_iter().collect();
//! let cover: ConfigLayer = [("count", "64")].into_iter().collect();
//!
//! let config = PluginConfig::build("observability", "tracer", global, "default", cover, None);
//! assert!(config.get_boolean("enabled"));
//! assert_eq!(config.get_int("count"), Some(64)); // cover wins
//! ```

pub mod layer;
pub mod plugin_config;
pub mod registry;
pub mod shared;

pub use layer::{ConfigIdentity, ConfigLayer};
pub use plugin_config::{ConfigChangeListener, PluginConfig};
pub use registry::PluginConfigRegistry;
pub use shared::SharedPluginConfig;
