// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Bus transport abstraction.
//!
//! A [`Transport`] announces the driver, its devices and their channels.
//! Announcing a channel registers an [`ActuationHandler`] for inbound method
//! calls and returns a [`ChannelBus`], the publish handle for that channel's
//! events.
//!
//! Two transports are provided:
//!
//! - [`MemoryBus`]: in-process, events fan out over a tokio broadcast channel
//! - [`MqttBus`]: MQTT broker connection (feature `mqtt`)
//!
//! # Examples
//!
//! ```
//! use std::sync::Arc;
//! use lifx_driver::Channel;
//! use lifx_driver::bus::{Actuation, MemoryBus, Transport};
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = MemoryBus::new();
//! let mut events = bus.subscribe();
//!
//! let publisher = bus
//!     .announce_channel("bulb-1", Channel::OnOff, Arc::new(|_: Actuation| {}))
//!     .unwrap();
//! publisher.send_event("state", &json!({ "on": true })).unwrap();
//!
//! let event = events.recv().await.unwrap();
//! assert_eq!(event.channel, Channel::OnOff);
//! # }
//! ```

mod memory;
#[cfg(feature = "mqtt")]
mod mqtt;
mod registry;
pub mod topic;

pub use memory::{BusEvent, MemoryBus};
#[cfg(feature = "mqtt")]
pub use mqtt::{MqttBus, MqttBusBuilder};
pub use registry::HandlerRegistry;

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::channel::Channel;
use crate::error::TransportError;

/// An inbound method call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actuation {
    /// Method name, e.g. `turnOn` or `setBatch`.
    pub method: String,
    /// Method parameters. Absent parameters read as `null`.
    #[serde(default)]
    pub params: Value,
}

impl Actuation {
    /// Creates an actuation.
    #[must_use]
    pub fn new(method: impl Into<String>, params: Value) -> Self {
        Self {
            method: method.into(),
            params,
        }
    }
}

/// Callback invoked for every method call on an announced channel.
///
/// Called on the transport's task; implementations must not block.
pub type ActuationHandler = Arc<dyn Fn(Actuation) + Send + Sync>;

/// The driver as announced on the bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DriverInfo {
    /// Driver identifier, e.g. `com.ninjablocks.lifx`.
    pub id: String,
    /// Human readable driver name.
    pub name: String,
}

/// A device as announced on the bus.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceInfo {
    /// Device identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Device kind, always `light` here.
    #[serde(rename = "type")]
    pub kind: String,
    /// Descriptive signatures used by bus consumers.
    pub signatures: Map<String, Value>,
}

impl DeviceInfo {
    /// Describes a LIFX bulb.
    #[must_use]
    pub fn light(id: impl Into<String>, name: impl Into<String>) -> Self {
        let mut signatures = Map::new();
        for (key, value) in [
            ("ninja:manufacturer", "Lifx"),
            ("ninja:productName", "Lifx"),
            ("manufacturer:productModelId", "Lifx"),
            ("ninja:productType", "Light"),
            ("ninja:thingType", "light"),
        ] {
            signatures.insert(key.to_string(), Value::String(value.to_string()));
        }
        Self {
            id: id.into(),
            name: name.into(),
            kind: "light".to_string(),
            signatures,
        }
    }
}

/// Outbound half of a transport.
pub trait EventPublisher: Send + Sync {
    /// Publishes `body` as event `event` of `channel` on `device_id`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the bus rejects the message.
    fn publish_event(
        &self,
        device_id: &str,
        channel: Channel,
        event: &str,
        body: &Value,
    ) -> Result<(), TransportError>;
}

/// A pub/sub bus the driver can announce itself on.
pub trait Transport: Send + Sync {
    /// Announces the driver.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the announcement cannot be published.
    fn announce_driver(&self, driver: &DriverInfo) -> Result<(), TransportError>;

    /// Announces a device.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the announcement cannot be published.
    fn announce_device(&self, device: &DeviceInfo) -> Result<(), TransportError>;

    /// Announces a channel and routes its method calls to `handler`.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::AlreadyAnnounced` if the channel already has
    /// a handler, or a transport error if the announcement fails.
    fn announce_channel(
        &self,
        device_id: &str,
        channel: Channel,
        handler: ActuationHandler,
    ) -> Result<ChannelBus, TransportError>;
}

/// Publish handle for one channel of one device.
#[derive(Clone)]
pub struct ChannelBus {
    device_id: String,
    channel: Channel,
    publisher: Arc<dyn EventPublisher>,
}

impl ChannelBus {
    /// Creates a handle publishing through `publisher`.
    #[must_use]
    pub fn new(
        device_id: impl Into<String>,
        channel: Channel,
        publisher: Arc<dyn EventPublisher>,
    ) -> Self {
        Self {
            device_id: device_id.into(),
            channel,
            publisher,
        }
    }

    /// Returns the device this handle publishes for.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Returns the channel this handle publishes for.
    #[must_use]
    pub fn channel(&self) -> Channel {
        self.channel
    }

    /// Publishes an event on this channel.
    ///
    /// # Errors
    ///
    /// Returns `TransportError` if the bus rejects the message.
    pub fn send_event(&self, event: &str, body: &Value) -> Result<(), TransportError> {
        self.publisher
            .publish_event(&self.device_id, self.channel, event, body)
    }
}

impl fmt::Debug for ChannelBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChannelBus")
            .field("device_id", &self.device_id)
            .field("channel", &self.channel)
            .finish_non_exhaustive()
    }
}
