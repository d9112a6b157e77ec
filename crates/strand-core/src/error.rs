//! Error types for the interceptor chain engine.

use thiserror::Error;

use crate::chain::ChainState;

/// Chain state-machine violations.
///
/// These mark programming errors at the call site, not runtime failures: the
/// [`ChainInvoker`](crate::ChainInvoker) logs them and falls back to the
/// call's original return value rather than letting them reach the host call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ChainError {
    /// The before phase ran (or was skipped) on this chain already.
    #[error("before phase requires a fresh chain, state is {state:?}")]
    BeforeAlreadyRun {
        /// State the chain was found in.
        state: ChainState,
    },

    /// `skip_begin` is only valid on a fresh chain.
    #[error("skip_begin requires a fresh chain, state is {state:?}")]
    SkipBeginAlreadyRun {
        /// State the chain was found in.
        state: ChainState,
    },

    /// The after phase needs a completed (or skipped) before phase first.
    #[error("after phase requires a completed before phase, state is {state:?}")]
    AfterOutOfOrder {
        /// State the chain was found in.
        state: ChainState,
    },
}

/// Result type for chain state transitions.
pub type ChainResult<T> = Result<T, ChainError>;
