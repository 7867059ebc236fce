// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Routing of inbound method calls to channel handlers.

use std::collections::HashMap;
use std::fmt;

use parking_lot::RwLock;

use crate::channel::Channel;
use crate::error::TransportError;

use super::{Actuation, ActuationHandler};

/// Maps `(device, channel)` to the handler registered at announcement.
///
/// Each handler is bound to exactly one light; there is no catch-all.
#[derive(Default)]
pub struct HandlerRegistry {
    handlers: RwLock<HashMap<(String, Channel), ActuationHandler>>,
}

impl HandlerRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the handler for one device channel.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::AlreadyAnnounced` if the slot is taken.
    pub fn register(
        &self,
        device_id: &str,
        channel: Channel,
        handler: ActuationHandler,
    ) -> Result<(), TransportError> {
        let key = (device_id.to_string(), channel);
        let mut handlers = self.handlers.write();
        if handlers.contains_key(&key) {
            return Err(TransportError::AlreadyAnnounced {
                device: device_id.to_string(),
                channel: channel.id().to_string(),
            });
        }
        tracing::debug!(device = %device_id, %channel, "Registering channel handler");
        handlers.insert(key, handler);
        Ok(())
    }

    /// Removes a device channel. Returns `true` if it was registered.
    pub fn unregister(&self, device_id: &str, channel: Channel) -> bool {
        tracing::debug!(device = %device_id, %channel, "Unregistering channel handler");
        self.handlers
            .write()
            .remove(&(device_id.to_string(), channel))
            .is_some()
    }

    /// Hands `actuation` to the handler of `(device_id, channel)`.
    ///
    /// Returns `true` if a handler was found.
    pub fn route(&self, device_id: &str, channel: Channel, actuation: Actuation) -> bool {
        // Clone out of the lock so the handler runs unlocked
        let handler = self
            .handlers
            .read()
            .get(&(device_id.to_string(), channel))
            .cloned();

        let Some(handler) = handler else {
            tracing::trace!(device = %device_id, %channel, "No handler for channel");
            return false;
        };

        handler(actuation);
        true
    }

    /// Returns the channels registered for a device.
    #[must_use]
    pub fn channels(&self, device_id: &str) -> Vec<Channel> {
        let handlers = self.handlers.read();
        Channel::ALL
            .into_iter()
            .filter(|channel| handlers.contains_key(&(device_id.to_string(), *channel)))
            .collect()
    }

    /// Returns the number of registered handlers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.handlers.read().len()
    }

    /// Returns `true` if no handler is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handlers.read().is_empty()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("handlers", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU32, Ordering};

    use serde_json::Value;

    use super::*;

    fn counting_handler(counter: &Arc<AtomicU32>) -> ActuationHandler {
        let counter = Arc::clone(counter);
        Arc::new(move |_: Actuation| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
    }

    #[test]
    fn routes_to_registered_handler() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        registry
            .register("a", Channel::Color, counting_handler(&counter))
            .unwrap();

        assert!(registry.route("a", Channel::Color, Actuation::new("set", Value::Null)));
        assert!(!registry.route("a", Channel::OnOff, Actuation::new("set", Value::Null)));
        assert!(!registry.route("b", Channel::Color, Actuation::new("set", Value::Null)));
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn duplicate_registration_fails() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        registry
            .register("a", Channel::OnOff, counting_handler(&counter))
            .unwrap();
        let err = registry
            .register("a", Channel::OnOff, counting_handler(&counter))
            .unwrap_err();
        assert!(matches!(err, TransportError::AlreadyAnnounced { .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn unregister_frees_slot() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        registry
            .register("a", Channel::OnOff, counting_handler(&counter))
            .unwrap();
        assert!(registry.unregister("a", Channel::OnOff));
        assert!(!registry.unregister("a", Channel::OnOff));
        assert!(registry.is_empty());
    }

    #[test]
    fn channels_in_announcement_order() {
        let registry = HandlerRegistry::new();
        let counter = Arc::new(AtomicU32::new(0));
        registry
            .register("a", Channel::Batching, counting_handler(&counter))
            .unwrap();
        registry
            .register("a", Channel::OnOff, counting_handler(&counter))
            .unwrap();
        assert_eq!(
            registry.channels("a"),
            vec![Channel::OnOff, Channel::Batching]
        );
    }
}
