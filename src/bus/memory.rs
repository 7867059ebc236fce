// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process bus.

use std::sync::Arc;

use parking_lot::RwLock;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::channel::Channel;
use crate::error::TransportError;

use super::{
    Actuation, ActuationHandler, ChannelBus, DeviceInfo, DriverInfo, EventPublisher,
    HandlerRegistry, Transport,
};

/// Default channel capacity for published events.
const DEFAULT_CHANNEL_CAPACITY: usize = 256;

/// An event published on the bus.
#[derive(Debug, Clone, PartialEq)]
pub struct BusEvent {
    /// Publishing device.
    pub device_id: String,
    /// Publishing channel.
    pub channel: Channel,
    /// Event name, e.g. `state`.
    pub event: String,
    /// Event payload.
    pub body: Value,
}

#[derive(Debug)]
struct MemoryBusInner {
    registry: HandlerRegistry,
    drivers: RwLock<Vec<DriverInfo>>,
    devices: RwLock<Vec<DeviceInfo>>,
    sender: broadcast::Sender<BusEvent>,
}

/// A bus living inside the process.
///
/// Method calls are injected with [`dispatch`](Self::dispatch) and events
/// are observed through [`subscribe`](Self::subscribe). Clones share the
/// same bus.
///
/// # Capacity
///
/// Events are fanned out over a broadcast channel (default capacity 256).
/// A slow subscriber loses the oldest events and receives
/// `RecvError::Lagged`.
#[derive(Debug, Clone)]
pub struct MemoryBus {
    inner: Arc<MemoryBusInner>,
}

impl MemoryBus {
    /// Creates a bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a bus buffering up to `capacity` events per subscriber.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            inner: Arc::new(MemoryBusInner {
                registry: HandlerRegistry::new(),
                drivers: RwLock::new(Vec::new()),
                devices: RwLock::new(Vec::new()),
                sender,
            }),
        }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BusEvent> {
        self.inner.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.sender.receiver_count()
    }

    /// Delivers a method call to a channel.
    ///
    /// Returns `false` if nothing is announced on that channel.
    pub fn dispatch(
        &self,
        device_id: &str,
        channel: Channel,
        method: &str,
        params: Value,
    ) -> bool {
        self.inner
            .registry
            .route(device_id, channel, Actuation::new(method, params))
    }

    /// Returns the announced drivers.
    #[must_use]
    pub fn drivers(&self) -> Vec<DriverInfo> {
        self.inner.drivers.read().clone()
    }

    /// Returns the announced devices, in announcement order.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceInfo> {
        self.inner.devices.read().clone()
    }

    /// Returns the channels announced for a device.
    #[must_use]
    pub fn channels(&self, device_id: &str) -> Vec<Channel> {
        self.inner.registry.channels(device_id)
    }
}

impl Default for MemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for MemoryBus {
    fn publish_event(
        &self,
        device_id: &str,
        channel: Channel,
        event: &str,
        body: &Value,
    ) -> Result<(), TransportError> {
        // No subscribers is not an error
        let _ = self.inner.sender.send(BusEvent {
            device_id: device_id.to_string(),
            channel,
            event: event.to_string(),
            body: body.clone(),
        });
        Ok(())
    }
}

impl Transport for MemoryBus {
    fn announce_driver(&self, driver: &DriverInfo) -> Result<(), TransportError> {
        tracing::debug!(driver = %driver.id, "Announcing driver");
        self.inner.drivers.write().push(driver.clone());
        Ok(())
    }

    fn announce_device(&self, device: &DeviceInfo) -> Result<(), TransportError> {
        tracing::debug!(device = %device.id, name = %device.name, "Announcing device");
        self.inner.devices.write().push(device.clone());
        Ok(())
    }

    fn announce_channel(
        &self,
        device_id: &str,
        channel: Channel,
        handler: ActuationHandler,
    ) -> Result<ChannelBus, TransportError> {
        self.inner.registry.register(device_id, channel, handler)?;
        Ok(ChannelBus::new(device_id, channel, Arc::new(self.clone())))
    }
}
