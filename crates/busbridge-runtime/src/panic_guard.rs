//! Panic isolation for user callbacks
//!
//! Handlers and reply callbacks run on the connection worker. A panic in one
//! of them must not take the worker (and with it the connection) down, so
//! every invocation goes through [`catch_callback_panic`].

use busbridge_core::BridgeError;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

/// Run a callback, turning a panic into [`BridgeError::Internal`]
///
/// `context` names the callback in the resulting error and log line,
/// e.g. `"handler for 'orders.created'"`.
pub(crate) fn catch_callback_panic<F>(context: &str, f: F) -> Result<(), BridgeError>
where
    F: FnOnce(),
{
    panic::catch_unwind(AssertUnwindSafe(f)).map_err(|payload| {
        let panic_msg = panic_to_string(&payload);
        tracing::error!(callback = context, "Callback panicked: {}", panic_msg);
        BridgeError::Internal(format!("{context} panicked: {panic_msg}"))
    })
}

fn panic_to_string(payload: &Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
#[path = "panic_guard/panic_guard_tests.rs"]
mod panic_guard_tests;
