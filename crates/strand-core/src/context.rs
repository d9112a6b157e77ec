//! Per-call context bridging the before and after phases of one call.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;

use crate::chain::Chain;

/// Short-lived data carrier scoped to exactly one intercepted call.
///
/// The interception mechanism creates one `CallContext` per call and hands it
/// to both [`ChainInvoker::do_before`](crate::ChainInvoker::do_before) and
/// [`ChainInvoker::do_after`](crate::ChainInvoker::do_after). The invoker's
/// own plumbing — the cached [`Chain`] and the before-phase elapsed time —
/// lives in typed fields; interceptors that need to pass data from their
/// before-logic to their after-logic (a span handle, a sample decision) use
/// the string-keyed [`put`](Self::put)/[`get`](Self::get) side-channel.
///
/// Never shared across calls, so no locking is involved.
#[derive(Debug, Default)]
pub struct CallContext {
    chain: Option<Chain>,
    before_elapsed: Option<Duration>,
    values: HashMap<String, Value>,
}

impl CallContext {
    /// Creates an empty context for a new call.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches the chain driving this call, replacing any previous one.
    pub fn cache_chain(&mut self, chain: Chain) {
        self.chain = Some(chain);
    }

    /// Removes and returns the cached chain, if any.
    pub fn take_chain(&mut self) -> Option<Chain> {
        self.chain.take()
    }

    /// Drops the cached chain, if any.
    pub fn discard_chain(&mut self) {
        self.chain = None;
    }

    /// Returns `true` if a chain is currently cached.
    pub fn has_chain(&self) -> bool {
        self.chain.is_some()
    }

    /// The elapsed time recorded for the before phase, if it ran.
    pub fn before_elapsed(&self) -> Option<Duration> {
        self.before_elapsed
    }

    /// Records the before-phase elapsed time.
    pub fn set_before_elapsed(&mut self, elapsed: Duration) {
        self.before_elapsed = Some(elapsed);
    }

    /// Stores an interceptor-owned value under `key`, returning the previous
    /// value if one was present.
    pub fn put(&mut self, key: impl Into<String>, value: Value) -> Option<Value> {
        self.values.insert(key.into(), value)
    }

    /// Returns the interceptor-owned value under `key`, if present.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    /// Removes and returns the interceptor-owned value under `key`.
    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }
}
