//! Interceptor chain engine for the Strand instrumentation runtime.
//!
//! An external interception mechanism captures each call into instrumented
//! code as a [`MethodInfo`] plus a fresh [`CallContext`], invokes
//! [`ChainInvoker::do_before`], executes the real call, then invokes
//! [`ChainInvoker::do_after`]. In between, an ordered [`Chain`] of
//! [`Interceptor`]s runs its before-logic forward and its after-logic in
//! reverse, onion-style, around the call:
//!
//! ```text
//!              do_before                          do_after
//! call site ──▶ tracer.before ──▶ metrics.before ─┐
//!                                                 ▼  (real call)
//! call site ◀── tracer.after ◀── metrics.after ◀──┘
//! ```
//!
//! Everything here is scoped to exactly one call — the chain, the method
//! record, and the context are built and discarded per invocation, so no
//! locking is needed on the hot path. This layer never raises into the host
//! call: contract violations degrade to a log line and the call's original
//! return value.
//!
//! # Example
//!
//! ```rust
//! use strand_core::{CallContext, ChainBuilder, ChainInvoker, Interceptor, MethodInfo};
//!
//! struct Noop;
//! impl Interceptor for Noop {}
//!
//! let mut builder = ChainBuilder::new();
//! builder.add(Noop);
//! let invoker = ChainInvoker::new();
//!
//! let mut method = MethodInfo::new("app::Client", "send");
//! let mut ctx = CallContext::new();
//! invoker.do_before(Some(&builder), &mut method, &mut ctx);
//! // ... the intercepted call runs here ...
//! let result = invoker.do_after(Some(&builder), &mut method, &mut ctx, false);
//! assert!(result.is_none());
//! ```

pub mod chain;
pub mod context;
pub mod error;
pub mod invoker;
pub mod method_info;

pub use chain::{Chain, ChainBuilder, ChainHandle, ChainState, Interceptor};
pub use context::CallContext;
pub use error::{ChainError, ChainResult};
pub use invoker::ChainInvoker;
pub use method_info::MethodInfo;
