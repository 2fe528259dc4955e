//! Address-keyed registry of message handlers
//!
//! Several handlers may listen on one address. The registry reports when an
//! address gains its first handler and when it loses its last, which is when
//! the client writes `register` and `unregister` frames.

use crate::message::BridgeMessage;
use crate::panic_guard::catch_callback_panic;
use busbridge_core::BridgeError;
use std::collections::HashMap;
use std::sync::Arc;

/// Callback invoked for every message delivered to an address
pub type MessageHandler = Arc<dyn Fn(&BridgeMessage) + Send + Sync>;

/// Identifies one registration, used to remove it again
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(pub(crate) u64);

impl HandlerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for HandlerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Result of delivering a message to an address
#[derive(Debug)]
pub enum Dispatch {
    /// Nothing is registered for the address
    NoHandlers,
    /// Every handler was invoked; `panicked` holds one error per handler
    /// that panicked
    Delivered {
        handlers: usize,
        panicked: Vec<BridgeError>,
    },
}

#[derive(Default)]
pub struct HandlerRegistry {
    handlers: HashMap<String, Vec<(HandlerId, MessageHandler)>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handler; returns `true` if it is the first for `address`
    pub fn add(&mut self, address: &str, id: HandlerId, handler: MessageHandler) -> bool {
        let entry = self.handlers.entry(address.to_string()).or_default();
        entry.push((id, handler));
        entry.len() == 1
    }

    /// Remove one registration; returns `true` if `address` has no handlers
    /// left afterwards
    ///
    /// Unknown addresses and ids are a no-op returning `false`.
    pub fn remove(&mut self, address: &str, id: HandlerId) -> bool {
        let Some(entry) = self.handlers.get_mut(address) else {
            return false;
        };
        let before = entry.len();
        entry.retain(|(existing, _)| *existing != id);
        if entry.len() == before {
            return false;
        }
        if entry.is_empty() {
            self.handlers.remove(address);
            return true;
        }
        false
    }

    /// Invoke every handler for `address` in registration order
    pub fn dispatch(&self, address: &str, message: &BridgeMessage) -> Dispatch {
        let Some(entry) = self.handlers.get(address) else {
            return Dispatch::NoHandlers;
        };

        let context = format!("handler for '{address}'");
        let panicked = entry
            .iter()
            .filter_map(|(_, handler)| catch_callback_panic(&context, || handler(message)).err())
            .collect();

        Dispatch::Delivered {
            handlers: entry.len(),
            panicked,
        }
    }

    pub fn contains(&self, address: &str) -> bool {
        self.handlers.contains_key(address)
    }

    /// Number of handlers registered for `address`
    pub fn handler_count(&self, address: &str) -> usize {
        self.handlers.get(address).map_or(0, Vec::len)
    }

    /// Number of addresses with at least one handler
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}
