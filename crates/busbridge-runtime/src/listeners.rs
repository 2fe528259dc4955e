//! Connection-level listeners: exception, end and ready
//!
//! All three are optional and replaceable at any time. Handlers are cloned
//! out of their lock before being invoked, so a listener may replace itself
//! (or another listener) from inside its own callback.

use crate::panic_guard::catch_callback_panic;
use busbridge_core::BridgeError;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;

/// Receives asynchronous errors: gating failures, transport errors, decode
/// errors and unroutable failure replies
pub type ExceptionHandler = Arc<dyn Fn(BridgeError) + Send + Sync>;

/// Invoked once when the peer ends the stream
pub type EndHandler = Arc<dyn Fn() + Send + Sync>;

/// Invoked once when the connection first becomes open
pub type ReadyHandler = Box<dyn FnOnce() + Send>;

#[derive(Default)]
pub(crate) struct Listeners {
    exception: RwLock<Option<ExceptionHandler>>,
    end: RwLock<Option<EndHandler>>,
    ready: Mutex<Option<ReadyHandler>>,
}

impl Listeners {
    pub(crate) fn new(
        exception: Option<ExceptionHandler>,
        end: Option<EndHandler>,
        ready: Option<ReadyHandler>,
    ) -> Self {
        Self {
            exception: RwLock::new(exception),
            end: RwLock::new(end),
            ready: Mutex::new(ready),
        }
    }

    pub(crate) fn set_exception(&self, handler: Option<ExceptionHandler>) {
        *self.exception.write() = handler;
    }

    pub(crate) fn set_end(&self, handler: Option<EndHandler>) {
        *self.end.write() = handler;
    }

    /// Report an error to the exception handler, or log it when none is set
    pub(crate) fn exception(&self, err: BridgeError) {
        let handler = self.exception.read().clone();
        match handler {
            Some(handler) => {
                let message = err.to_string();
                if catch_callback_panic("exception handler", || handler(err)).is_err() {
                    tracing::warn!(error = %message, "Exception handler panicked");
                }
            }
            None => tracing::warn!(error = %err, "Unhandled bridge error"),
        }
    }

    pub(crate) fn end(&self) {
        let handler = self.end.read().clone();
        if let Some(handler) = handler {
            let _ = catch_callback_panic("end handler", || handler());
        }
    }

    /// Fire the ready handler; later calls are no-ops
    pub(crate) fn ready(&self) {
        let handler = self.ready.lock().take();
        if let Some(handler) = handler {
            let _ = catch_callback_panic("ready handler", handler);
        }
    }
}
