//! Per-call method record.

use serde_json::Value;

/// Everything the chain knows about one intercepted call.
///
/// Holds the receiver's type name, the method identity, the argument list,
/// and slots for the return value and the failure the call raised, if any.
/// Interceptors are free to rewrite individual arguments in the before phase
/// (for example, to inject tracing headers into an outgoing payload) and to
/// read or overwrite the return value and failure slots in the after phase.
/// The argument list itself is fixed-length for the call's lifetime.
///
/// One instance belongs to exactly one call and is never shared across
/// threads; it is discarded once the after phase completes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MethodInfo {
    invoker: String,
    method: String,
    args: Vec<Value>,
    ret_value: Option<Value>,
    error: Option<String>,
}

impl MethodInfo {
    /// Creates a record for a call on `invoker` (receiver type name) to
    /// `method`, with no arguments.
    pub fn new(invoker: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            invoker: invoker.into(),
            method: method.into(),
            ..Self::default()
        }
    }

    /// Sets the argument list (builder style).
    pub fn with_args(mut self, args: Vec<Value>) -> Self {
        self.args = args;
        self
    }

    /// Sets the return value slot (builder style).
    pub fn with_ret_value(mut self, value: Value) -> Self {
        self.ret_value = Some(value);
        self
    }

    /// The receiver's type name.
    pub fn invoker(&self) -> &str {
        &self.invoker
    }

    /// The method identity.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// The argument list.
    pub fn args(&self) -> &[Value] {
        &self.args
    }

    /// Mutable access to the argument list elements.
    pub fn args_mut(&mut self) -> &mut [Value] {
        &mut self.args
    }

    /// Replaces the argument at `index`.
    ///
    /// Returns `false` (and changes nothing) if `index` is out of bounds —
    /// the list is fixed-length per call.
    pub fn set_arg(&mut self, index: usize, value: Value) -> bool {
        match self.args.get_mut(index) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// The return value, if the call (or an interceptor) produced one.
    pub fn ret_value(&self) -> Option<&Value> {
        self.ret_value.as_ref()
    }

    /// Overwrites the return value slot.
    pub fn set_ret_value(&mut self, value: Value) {
        self.ret_value = Some(value);
    }

    /// Clears the return value slot.
    pub fn clear_ret_value(&mut self) {
        self.ret_value = None;
    }

    /// The failure the call raised, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Records a failure for this call.
    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    /// Returns `true` if no failure has been recorded.
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
