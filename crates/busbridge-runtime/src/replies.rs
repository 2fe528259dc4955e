//! One-shot reply callbacks keyed by generated reply address

use crate::message::BridgeMessage;
use crate::panic_guard::catch_callback_panic;
use busbridge_core::BridgeResult;
use std::collections::HashMap;
use uuid::Uuid;

/// Callback invoked with the single reply to a `send`
pub type ReplyHandler = Box<dyn FnOnce(BridgeMessage) + Send>;

#[derive(Default)]
pub struct ReplyRegistry {
    pending: HashMap<String, ReplyHandler>,
}

impl ReplyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a callback under a fresh random reply address and return it
    pub fn register(&mut self, handler: ReplyHandler) -> String {
        let address = Uuid::new_v4().to_string();
        self.pending.insert(address.clone(), handler);
        address
    }

    pub fn contains(&self, address: &str) -> bool {
        self.pending.contains_key(address)
    }

    /// Remove the callback for `address` and invoke it with `message`
    ///
    /// Returns `Ok(false)` when nothing was pending. The entry is removed
    /// before the callback runs, so a second frame for the same address is
    /// never delivered to it. A panicking callback yields the error.
    pub fn resolve(&mut self, address: &str, message: BridgeMessage) -> BridgeResult<bool> {
        let Some(handler) = self.pending.remove(address) else {
            return Ok(false);
        };
        catch_callback_panic("reply callback", || handler(message))?;
        Ok(true)
    }

    /// Drop a pending callback without invoking it
    pub fn remove(&mut self, address: &str) -> bool {
        self.pending.remove(address).is_some()
    }

    /// Drop every pending callback; returns how many were dropped
    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}

#[cfg(test)]
#[path = "replies/replies_tests.rs"]
mod replies_tests;
