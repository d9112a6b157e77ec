//! The chain invoker: drives the before/after protocol around each call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use serde_json::Value;
use tracing::{info, warn};

use crate::chain::ChainBuilder;
use crate::context::CallContext;
use crate::method_info::MethodInfo;

/// Orchestrates chain construction, caching, and timing around intercepted
/// calls.
///
/// One `ChainInvoker` is shared (via `Arc`) by every call site the
/// interception mechanism wires up. Its only state is the elapsed-time
/// diagnostics toggle — set once during agent setup, read on every call —
/// so sharing it is free.
///
/// The invoker never raises into the host call. A missing builder means "no
/// interception configured" and both phases degrade to no-ops; a chain
/// state-machine violation is logged and the call's original return value is
/// handed back untouched.
pub struct ChainInvoker {
    log_elapsed_time: AtomicBool,
}

impl ChainInvoker {
    /// Creates an invoker with elapsed-time diagnostics disabled.
    pub fn new() -> Self {
        Self {
            log_elapsed_time: AtomicBool::new(false),
        }
    }

    /// Toggles the per-call elapsed-time diagnostic record.
    pub fn set_log_elapsed_time(&self, enabled: bool) {
        self.log_elapsed_time.store(enabled, Ordering::Relaxed);
    }

    /// Returns `true` if elapsed-time diagnostics are enabled.
    pub fn log_elapsed_time(&self) -> bool {
        self.log_elapsed_time.load(Ordering::Relaxed)
    }

    /// Runs the before phase for one call.
    ///
    /// With a builder present, builds a fresh chain, drives its before phase,
    /// and caches it in `ctx` for the matching [`do_after`](Self::do_after).
    /// Without one, no chain is created and no before-logic runs. The
    /// before-phase elapsed time is recorded in `ctx` either way.
    pub fn do_before(
        &self,
        builder: Option<&ChainBuilder>,
        method: &mut MethodInfo,
        ctx: &mut CallContext,
    ) {
        let begin = Instant::now();
        if let Some(builder) = builder {
            let mut chain = builder.build();
            if let Err(err) = chain.do_before(method, ctx) {
                warn!(
                    error = %err,
                    invoker = method.invoker(),
                    method = method.method(),
                    "Chain protocol violation in before phase"
                );
            }
            ctx.cache_chain(chain);
        }
        ctx.set_before_elapsed(begin.elapsed());
    }

    /// Runs the after phase for one call and returns the final return value.
    ///
    /// Normally the chain cached by [`do_before`](Self::do_before) is taken
    /// from `ctx` and driven in reverse. Two degraded entries are supported:
    ///
    /// - **No cached chain, no builder** — the call's original return value
    ///   comes back unchanged; no interception occurs.
    /// - **No cached chain, builder present** — the before phase never ran
    ///   through this machinery (an exception path, or an after-only call
    ///   site), so a fresh chain is built and entered via `skip_begin` rather
    ///   than fabricating before-phase side effects.
    ///
    /// `new_chain` discards any cached chain first, forcing the
    /// builder-present degraded entry — used when the after phase must run
    /// against a differently-scoped chain, e.g. after an internal retry.
    pub fn do_after(
        &self,
        builder: Option<&ChainBuilder>,
        method: &mut MethodInfo,
        ctx: &mut CallContext,
        new_chain: bool,
    ) -> Option<Value> {
        let begin = Instant::now();
        if new_chain {
            ctx.discard_chain();
        }

        let mut chain = match ctx.take_chain() {
            Some(chain) => chain,
            None => {
                let Some(builder) = builder else {
                    return method.ret_value().cloned();
                };
                let mut chain = builder.build();
                if let Err(err) = chain.skip_begin() {
                    warn!(
                        error = %err,
                        invoker = method.invoker(),
                        method = method.method(),
                        "Chain protocol violation entering degraded after phase"
                    );
                }
                chain
            }
        };

        let result = match chain.do_after(method, ctx) {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    error = %err,
                    invoker = method.invoker(),
                    method = method.method(),
                    "Chain protocol violation in after phase"
                );
                method.ret_value().cloned()
            }
        };

        if self.log_elapsed_time() {
            let before_ms = ctx.before_elapsed().map(|d| d.as_millis() as u64);
            info!(
                invoker = method.invoker(),
                method = method.method(),
                before_ms = ?before_ms,
                after_ms = begin.elapsed().as_millis() as u64,
                "Interceptor chain elapsed time"
            );
        }

        result
    }
}

impl Default for ChainInvoker {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChainInvoker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainInvoker")
            .field("log_elapsed_time", &self.log_elapsed_time())
            .finish()
    }
}
