//! The interceptor chain: ordered before/after traversal with an explicit
//! state machine.
//!
//! A [`Chain`] is built fresh per intercepted call from a [`ChainBuilder`]
//! whose interceptor list is fixed at registration time. The before phase
//! walks interceptors forward (index 0 first); the after phase walks them in
//! reverse, so each interceptor's after-logic sees results already processed
//! by everything that ran after it. Traversal is continuation-style: each
//! interceptor receives a [`ChainHandle`] for the rest of the chain and may
//! invoke it, or not, to short-circuit the remainder.
//!
//! The per-instance state machine is:
//!
//! ```text
//! Fresh ──do_before()──► BeforeDone ──do_after()──► AfterDone (terminal)
//!   │                        ▲
//!   └─────skip_begin()───────┘   (degraded entry: no interceptor runs)
//! ```
//!
//! `skip_begin` exists for calls whose before phase never went through this
//! machinery (see [`ChainInvoker`](crate::ChainInvoker)): fabricating
//! before-phase side effects at after-time would be wrong, so the transition
//! is taken explicitly and the after phase runs alone.

use std::sync::Arc;

use serde_json::Value;

use crate::context::CallContext;
use crate::error::{ChainError, ChainResult};
use crate::method_info::MethodInfo;

/// A unit of before/after logic attached around intercepted calls.
///
/// Both methods default to "just run the rest of the chain", so an
/// interceptor only overrides the phase it cares about. Not calling
/// [`ChainHandle::proceed`] short-circuits every interceptor further down
/// (before phase) or further up (after phase).
///
/// Implementations are shared across calls (the builder hands the same
/// `Arc`s to every chain it builds), so per-call state belongs in the
/// [`CallContext`], not in the interceptor itself.
pub trait Interceptor: Send + Sync {
    /// Before-phase logic, run in chain order.
    fn before(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
        next.proceed(method, ctx);
    }

    /// After-phase logic, run in reverse chain order. May rewrite the return
    /// value slot of `method` before it propagates further up.
    fn after(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
        next.proceed(method, ctx);
    }
}

/// Lifecycle state of one [`Chain`] instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    /// Before phase not yet run.
    Fresh,
    /// Before phase completed, either by traversal or by
    /// [`Chain::skip_begin`].
    BeforeDone,
    /// After phase completed; the chain must not be reused.
    AfterDone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Before,
    After,
}

/// An ordered, stateful sequence of interceptors scoped to one call.
///
/// Never reused: [`ChainBuilder::build`] produces a fresh instance (and a
/// fresh cursor) per invocation.
pub struct Chain {
    interceptors: Vec<Arc<dyn Interceptor>>,
    state: ChainState,
    phase: Phase,
    cursor: usize,
}

impl Chain {
    fn new(interceptors: Vec<Arc<dyn Interceptor>>) -> Self {
        Self {
            interceptors,
            state: ChainState::Fresh,
            phase: Phase::Before,
            cursor: 0,
        }
    }

    /// The current lifecycle state.
    pub fn state(&self) -> ChainState {
        self.state
    }

    /// The number of interceptors in this chain.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if the chain holds no interceptors.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Runs the before phase: each interceptor in chain order, each receiving
    /// a handle to the remainder.
    ///
    /// Valid only on a [`Fresh`](ChainState::Fresh) chain; transitions to
    /// [`BeforeDone`](ChainState::BeforeDone) even when an interceptor
    /// short-circuits the traversal.
    pub fn do_before(&mut self, method: &mut MethodInfo, ctx: &mut CallContext) -> ChainResult<()> {
        if self.state != ChainState::Fresh {
            return Err(ChainError::BeforeAlreadyRun { state: self.state });
        }
        self.phase = Phase::Before;
        self.cursor = 0;
        self.advance(method, ctx);
        self.state = ChainState::BeforeDone;
        Ok(())
    }

    /// Marks the before phase as done without invoking any interceptor.
    ///
    /// The degraded-entry transition: used when a chain is constructed lazily
    /// at after-time for a call whose real before phase never ran here.
    pub fn skip_begin(&mut self) -> ChainResult<()> {
        if self.state != ChainState::Fresh {
            return Err(ChainError::SkipBeginAlreadyRun { state: self.state });
        }
        self.state = ChainState::BeforeDone;
        Ok(())
    }

    /// Runs the after phase: each interceptor in reverse chain order,
    /// mirroring the before phase onion-style.
    ///
    /// Valid only on a [`BeforeDone`](ChainState::BeforeDone) chain;
    /// transitions to the terminal [`AfterDone`](ChainState::AfterDone) state
    /// and returns the final — possibly rewritten — return value.
    pub fn do_after(
        &mut self,
        method: &mut MethodInfo,
        ctx: &mut CallContext,
    ) -> ChainResult<Option<Value>> {
        if self.state != ChainState::BeforeDone {
            return Err(ChainError::AfterOutOfOrder { state: self.state });
        }
        self.phase = Phase::After;
        self.cursor = self.interceptors.len();
        self.advance(method, ctx);
        self.state = ChainState::AfterDone;
        Ok(method.ret_value().cloned())
    }

    /// Invokes the interceptor under the cursor and moves the cursor one step
    /// in the current phase's direction. The invoked interceptor continues
    /// the traversal (or not) through its [`ChainHandle`].
    fn advance(&mut self, method: &mut MethodInfo, ctx: &mut CallContext) {
        match self.phase {
            Phase::Before => {
                let Some(interceptor) = self.interceptors.get(self.cursor).cloned() else {
                    return;
                };
                self.cursor += 1;
                interceptor.before(method, ctx, ChainHandle { chain: self });
            }
            Phase::After => {
                if self.cursor == 0 {
                    return;
                }
                self.cursor -= 1;
                let interceptor = Arc::clone(&self.interceptors[self.cursor]);
                interceptor.after(method, ctx, ChainHandle { chain: self });
            }
        }
    }
}

impl std::fmt::Debug for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Chain")
            .field("interceptors", &self.interceptors.len())
            .field("state", &self.state)
            .finish()
    }
}

/// The narrow "invoke the rest of the chain" capability handed to each
/// interceptor.
///
/// Borrows the chain's cursor for the duration of one interceptor invocation;
/// exposes nothing beyond [`proceed`](Self::proceed) and the remaining count,
/// so interceptors cannot reach into the chain's internals.
pub struct ChainHandle<'c> {
    chain: &'c mut Chain,
}

impl ChainHandle<'_> {
    /// Invokes the remainder of the chain in the current phase's direction.
    ///
    /// Calling this more than once is harmless: the cursor has already moved
    /// past the remainder, so a second call finds nothing left to run.
    pub fn proceed(&mut self, method: &mut MethodInfo, ctx: &mut CallContext) {
        self.chain.advance(method, ctx);
    }

    /// The number of interceptors the current phase has not yet visited.
    pub fn remaining(&self) -> usize {
        match self.chain.phase {
            Phase::Before => self.chain.interceptors.len() - self.chain.cursor,
            Phase::After => self.chain.cursor,
        }
    }
}

/// Produces fresh [`Chain`] instances over a fixed interceptor list.
///
/// The list is fixed at registration time; every [`build`](Self::build) call
/// returns a new chain with its own cursor and state. An absent builder
/// (`Option::None` at the invoker surface) is the "no chain configured"
/// signal, not an error.
#[derive(Default, Clone)]
pub struct ChainBuilder {
    interceptors: Vec<Arc<dyn Interceptor>>,
}

impl ChainBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an interceptor to the chain order.
    pub fn add(&mut self, interceptor: impl Interceptor + 'static) -> &mut Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// Appends an already-shared interceptor to the chain order.
    pub fn add_shared(&mut self, interceptor: Arc<dyn Interceptor>) -> &mut Self {
        self.interceptors.push(interceptor);
        self
    }

    /// Appends an interceptor (builder pattern).
    pub fn with(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.add(interceptor);
        self
    }

    /// The number of registered interceptors.
    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    /// Returns `true` if no interceptor is registered.
    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Builds a fresh chain over the registered interceptors.
    pub fn build(&self) -> Chain {
        Chain::new(self.interceptors.clone())
    }
}

impl std::fmt::Debug for ChainBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainBuilder")
            .field("interceptors", &self.interceptors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Records the order its phases run in, tagged by name.
    struct Recorder {
        name: &'static str,
        log: Arc<Mutex<Vec<String>>>,
    }

    impl Interceptor for Recorder {
        fn before(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
            self.log.lock().unwrap().push(format!("before:{}", self.name));
            next.proceed(method, ctx);
        }

        fn after(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
            self.log.lock().unwrap().push(format!("after:{}", self.name));
            next.proceed(method, ctx);
        }
    }

    fn recorder_chain(log: &Arc<Mutex<Vec<String>>>) -> ChainBuilder {
        ChainBuilder::new()
            .with(Recorder {
                name: "outer",
                log: Arc::clone(log),
            })
            .with(Recorder {
                name: "inner",
                log: Arc::clone(log),
            })
    }

    #[test]
    fn before_forward_after_reverse() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = recorder_chain(&log).build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        chain.do_before(&mut method, &mut ctx).unwrap();
        chain.do_after(&mut method, &mut ctx).unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec!["before:outer", "before:inner", "after:inner", "after:outer"]
        );
    }

    #[test]
    fn state_machine_transitions() {
        let mut chain = ChainBuilder::new().build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        assert_eq!(chain.state(), ChainState::Fresh);
        chain.do_before(&mut method, &mut ctx).unwrap();
        assert_eq!(chain.state(), ChainState::BeforeDone);
        chain.do_after(&mut method, &mut ctx).unwrap();
        assert_eq!(chain.state(), ChainState::AfterDone);
    }

    #[test]
    fn after_without_before_is_detected() {
        let mut chain = ChainBuilder::new().build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        assert_eq!(
            chain.do_after(&mut method, &mut ctx),
            Err(ChainError::AfterOutOfOrder {
                state: ChainState::Fresh
            })
        );
        // The failed transition must not have changed the state.
        assert_eq!(chain.state(), ChainState::Fresh);
    }

    #[test]
    fn double_before_is_detected() {
        let mut chain = ChainBuilder::new().build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        chain.do_before(&mut method, &mut ctx).unwrap();
        assert_eq!(
            chain.do_before(&mut method, &mut ctx),
            Err(ChainError::BeforeAlreadyRun {
                state: ChainState::BeforeDone
            })
        );
    }

    #[test]
    fn terminal_chain_rejects_reuse() {
        let mut chain = ChainBuilder::new().build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        chain.do_before(&mut method, &mut ctx).unwrap();
        chain.do_after(&mut method, &mut ctx).unwrap();
        assert_eq!(
            chain.do_after(&mut method, &mut ctx),
            Err(ChainError::AfterOutOfOrder {
                state: ChainState::AfterDone
            })
        );
    }

    #[test]
    fn skip_begin_runs_no_before_logic() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let mut chain = recorder_chain(&log).build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        chain.skip_begin().unwrap();
        assert_eq!(chain.state(), ChainState::BeforeDone);
        chain.do_after(&mut method, &mut ctx).unwrap();

        assert_eq!(*log.lock().unwrap(), vec!["after:inner", "after:outer"]);
    }

    #[test]
    fn skip_begin_requires_fresh_chain() {
        let mut chain = ChainBuilder::new().build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        chain.do_before(&mut method, &mut ctx).unwrap();
        assert_eq!(
            chain.skip_begin(),
            Err(ChainError::SkipBeginAlreadyRun {
                state: ChainState::BeforeDone
            })
        );
    }

    #[test]
    fn not_proceeding_short_circuits_the_remainder() {
        struct Gate;
        impl Interceptor for Gate {
            fn before(&self, _: &mut MethodInfo, _: &mut CallContext, _next: ChainHandle<'_>) {
                // Deliberately does not proceed.
            }
        }
        struct Counter {
            calls: Arc<AtomicUsize>,
        }
        impl Interceptor for Counter {
            fn before(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
                self.calls.fetch_add(1, Ordering::SeqCst);
                next.proceed(method, ctx);
            }
        }

        let calls = Arc::new(AtomicUsize::new(0));
        let builder = ChainBuilder::new().with(Gate).with(Counter {
            calls: Arc::clone(&calls),
        });

        let mut chain = builder.build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();
        chain.do_before(&mut method, &mut ctx).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        // The chain still reached BeforeDone.
        assert_eq!(chain.state(), ChainState::BeforeDone);
    }

    #[test]
    fn after_phase_rewrites_propagate_up() {
        // Doubles whatever the interceptors below produced.
        struct Doubler;
        impl Interceptor for Doubler {
            fn after(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
                next.proceed(method, ctx);
                if let Some(Value::Number(n)) = method.ret_value() {
                    let doubled = n.as_i64().unwrap() * 2;
                    method.set_ret_value(json!(doubled));
                }
            }
        }
        // Sets the base value, simulating an interceptor that replaces the result.
        struct Setter;
        impl Interceptor for Setter {
            fn after(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
                method.set_ret_value(json!(21));
                next.proceed(method, ctx);
            }
        }

        // Chain order: [Doubler, Setter]. After phase runs Setter first
        // (reverse order), then Doubler sees its value on the way up.
        let builder = ChainBuilder::new().with(Doubler).with(Setter);
        let mut chain = builder.build();
        let mut method = MethodInfo::new("T", "m").with_ret_value(json!(0));
        let mut ctx = CallContext::new();

        chain.skip_begin().unwrap();
        let result = chain.do_after(&mut method, &mut ctx).unwrap();
        assert_eq!(result, Some(json!(42)));
    }

    #[test]
    fn remaining_counts_down() {
        struct Probe {
            seen: Arc<Mutex<Vec<usize>>>,
        }
        impl Interceptor for Probe {
            fn before(&self, method: &mut MethodInfo, ctx: &mut CallContext, mut next: ChainHandle<'_>) {
                self.seen.lock().unwrap().push(next.remaining());
                next.proceed(method, ctx);
            }
        }

        let seen = Arc::new(Mutex::new(Vec::new()));
        let builder = ChainBuilder::new()
            .with(Probe {
                seen: Arc::clone(&seen),
            })
            .with(Probe {
                seen: Arc::clone(&seen),
            });

        let mut chain = builder.build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();
        chain.do_before(&mut method, &mut ctx).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1, 0]);
    }

    #[test]
    fn builder_produces_independent_chains() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let builder = recorder_chain(&log);

        let mut first = builder.build();
        let mut second = builder.build();
        let mut method = MethodInfo::new("T", "m");
        let mut ctx = CallContext::new();

        first.do_before(&mut method, &mut ctx).unwrap();
        // `second` has its own cursor and state.
        assert_eq!(second.state(), ChainState::Fresh);
        second.do_before(&mut method, &mut ctx).unwrap();
        assert_eq!(first.state(), ChainState::BeforeDone);
    }
}
