//! # Strand
//!
//! The runtime core of an instrumentation framework: for every intercepted
//! call into instrumented code, Strand decides *what configuration applies*
//! and *in what order side-effecting observers run*.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐  MethodInfo + CallContext   ┌──────────────────────┐
//! │  interception    │────────────────────────────▶│ ChainInvoker         │
//! │  mechanism       │   do_before / do_after      │  └─ Chain of         │
//! │  (external)      │◀────────────────────────────│     Interceptors     │
//! └──────────────────┘                             └──────────┬───────────┘
//!                                                             │ reads
//! ┌──────────────────┐   ConfigLayer stacks        ┌──────────▼───────────┐
//! │  config loader   │────────────────────────────▶│ PluginConfigRegistry │
//! │  (external)      │   register / update         │  └─ SharedPluginConfig│
//! └──────────────────┘                             │      └─ PluginConfig │
//!                                                  └──────────────────────┘
//! ```
//!
//! - **strand-core** drives an ordered chain of interceptors around each
//!   call: before-phase forward, after-phase in reverse, with a per-call
//!   context bridging the two.
//! - **strand-config** resolves a plugin's effective settings from ordered
//!   precedence layers, hot-reloads them atomically, and notifies change
//!   listeners.
//!
//! How calls get intercepted, what concrete observers do, and where layer
//! data comes from are all external collaborators — this crate is only the
//! load-bearing middle.
//!
//! ## Quick start
//!
//! ```rust
//! use strand::prelude::*;
//!
//! // Configuration: three precedence tiers, last wins.
//! let config = PluginConfig::build(
//!     "observability",
//!     "tracer",
//!     ConfigLayer::from([("enabled", "true"), ("sample.rate", "0.1")]),
//!     "default",
//!     ConfigLayer::from([("sample.rate", "1.0")]),
//!     None,
//! );
//! assert!(config.get_boolean("enabled"));
//! assert_eq!(config.get_double("sample.rate"), Some(1.0));
//!
//! // Interception: a no-op chain around one call.
//! let invoker = ChainInvoker::new();
//! let builder = ChainBuilder::new();
//! let mut method = MethodInfo::new("app::Client", "send");
//! let mut ctx = CallContext::new();
//! invoker.do_before(Some(&builder), &mut method, &mut ctx);
//! invoker.do_after(Some(&builder), &mut method, &mut ctx, false);
//! ```

pub use strand_config as config;
pub use strand_core as core;

/// Prelude module for convenient imports.
///
/// ```rust,ignore
/// use strand::prelude::*;
/// ```
pub mod prelude {
    // Interceptor chain - driven around every intercepted call
    pub use strand_core::{
        CallContext, Chain, ChainBuilder, ChainError, ChainHandle, ChainInvoker, ChainState,
        Interceptor, MethodInfo,
    };

    // Plugin configuration - read by observers to decide their behaviour
    pub use strand_config::{
        ConfigChangeListener, ConfigIdentity, ConfigLayer, PluginConfig, PluginConfigRegistry,
        SharedPluginConfig,
    };
}
