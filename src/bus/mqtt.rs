// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT bus transport.
//!
//! Topic layout is described in [`topic`](super::topic). Method calls arrive
//! as JSON `{"method": ..., "params": ...}` on the channel topic; events and
//! announcements are published as JSON with QoS 1.
//!
//! # Examples
//!
//! ```no_run
//! use lifx_driver::bus::MqttBus;
//!
//! # async fn example() -> Result<(), lifx_driver::error::TransportError> {
//! let bus = MqttBus::builder()
//!     .host("192.168.1.50")
//!     .port(1883)
//!     .credentials("user", "password")
//!     .build()
//!     .await?;
//!
//! if bus.is_connected() {
//!     println!("Connected to MQTT broker");
//! }
//!
//! bus.disconnect().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;
use uuid::Uuid;

use crate::channel::Channel;
use crate::error::{ProtocolError, TransportError};

use super::topic::{self, CommandTopic};
use super::{
    Actuation, ActuationHandler, ChannelBus, DeviceInfo, DriverInfo, EventPublisher,
    HandlerRegistry, Transport,
};

/// Capacity of the request queue between client and event loop.
const REQUEST_CAPACITY: usize = 64;

/// Configuration for an MQTT bus connection.
#[derive(Debug, Clone)]
struct MqttBusConfig {
    host: String,
    port: u16,
    credentials: Option<(String, String)>,
    keep_alive: Duration,
    connection_timeout: Duration,
}

impl Default for MqttBusConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: 1883,
            credentials: None,
            keep_alive: Duration::from_secs(30),
            connection_timeout: Duration::from_secs(10),
        }
    }
}

struct MqttBusInner {
    client: AsyncClient,
    registry: HandlerRegistry,
    config: MqttBusConfig,
    connected: AtomicBool,
}

/// A bus backed by an MQTT broker.
///
/// Cheaply cloneable; clones share the connection.
#[derive(Clone)]
pub struct MqttBus {
    inner: Arc<MqttBusInner>,
}

impl MqttBus {
    /// Creates a builder for an MQTT bus connection.
    #[must_use]
    pub fn builder() -> MqttBusBuilder {
        MqttBusBuilder::default()
    }

    /// Returns whether the broker connection is up.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.inner.connected.load(Ordering::Acquire)
    }

    /// Returns the broker host.
    #[must_use]
    pub fn host(&self) -> &str {
        &self.inner.config.host
    }

    /// Returns the broker port.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.inner.config.port
    }

    /// Returns the number of announced channels.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.inner.registry.len()
    }

    /// Disconnects from the broker.
    ///
    /// # Errors
    ///
    /// Returns error if the disconnect request cannot be queued.
    pub async fn disconnect(&self) -> Result<(), TransportError> {
        tracing::info!(
            host = %self.inner.config.host,
            port = %self.inner.config.port,
            "Disconnecting from MQTT broker"
        );
        self.inner.client.disconnect().await?;
        self.inner.connected.store(false, Ordering::Release);
        Ok(())
    }

    fn publish_json<T: Serialize + ?Sized>(
        &self,
        topic: &str,
        body: &T,
    ) -> Result<(), TransportError> {
        let payload = serde_json::to_vec(body)?;
        tracing::trace!(topic = %topic, "Publishing");
        self.inner
            .client
            .try_publish(topic, QoS::AtLeastOnce, false, payload)?;
        Ok(())
    }

    fn route_message(&self, topic: &str, payload: &[u8]) {
        let Some(command) = CommandTopic::parse(topic) else {
            return;
        };

        let actuation = match serde_json::from_slice::<Actuation>(payload) {
            Ok(actuation) => actuation,
            Err(e) => {
                let err = ProtocolError::from(e);
                tracing::error!(topic = %topic, error = %err, "Dropping malformed method call");
                return;
            }
        };

        self.inner
            .registry
            .route(command.device_id, command.channel, actuation);
    }
}

impl EventPublisher for MqttBus {
    fn publish_event(
        &self,
        device_id: &str,
        channel: Channel,
        event: &str,
        body: &Value,
    ) -> Result<(), TransportError> {
        self.publish_json(&topic::channel_event(device_id, channel, event), body)
    }
}

impl Transport for MqttBus {
    fn announce_driver(&self, driver: &DriverInfo) -> Result<(), TransportError> {
        tracing::debug!(driver = %driver.id, "Announcing driver");
        self.publish_json(&topic::driver_announce(&driver.id), driver)
    }

    fn announce_device(&self, device: &DeviceInfo) -> Result<(), TransportError> {
        tracing::debug!(device = %device.id, "Announcing device");
        self.publish_json(&topic::device_announce(&device.id), device)
    }

    fn announce_channel(
        &self,
        device_id: &str,
        channel: Channel,
        handler: ActuationHandler,
    ) -> Result<ChannelBus, TransportError> {
        self.inner.registry.register(device_id, channel, handler)?;

        let command_topic = topic::channel(device_id, channel);
        let announced = self
            .inner
            .client
            .try_subscribe(&command_topic, QoS::AtLeastOnce)
            .map_err(TransportError::from)
            .and_then(|()| {
                self.publish_json(
                    &topic::channel_announce(device_id, channel),
                    &serde_json::json!({
                        "channel": channel.id(),
                        "protocol": channel.protocol(),
                        "supportedMethods": channel.methods(),
                        "supportedEvents": channel.events(),
                    }),
                )
            });

        if let Err(e) = announced {
            self.inner.registry.unregister(device_id, channel);
            return Err(e);
        }

        tracing::debug!(topic = %command_topic, "Subscribed to channel topic");
        Ok(ChannelBus::new(device_id, channel, Arc::new(self.clone())))
    }
}

impl std::fmt::Debug for MqttBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MqttBus")
            .field("host", &self.inner.config.host)
            .field("port", &self.inner.config.port)
            .field("connected", &self.is_connected())
            .finish()
    }
}

/// Builder for an MQTT bus connection.
///
/// # Examples
///
/// ```no_run
/// use std::time::Duration;
/// use lifx_driver::bus::MqttBus;
///
/// # async fn example() -> Result<(), lifx_driver::error::TransportError> {
/// let bus = MqttBus::builder()
///     .host("192.168.1.50")
///     .keep_alive(Duration::from_secs(60))
///     .connection_timeout(Duration::from_secs(5))
///     .build()
///     .await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct MqttBusBuilder {
    config: MqttBusConfig,
}

impl MqttBusBuilder {
    /// Sets the broker host address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the broker port (default: 1883).
    #[must_use]
    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets authentication credentials.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.credentials = Some((username.into(), password.into()));
        self
    }

    /// Sets the keep-alive interval (default: 30 seconds).
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.config.keep_alive = duration;
        self
    }

    /// Sets the connection timeout (default: 10 seconds).
    #[must_use]
    pub fn connection_timeout(mut self, duration: Duration) -> Self {
        self.config.connection_timeout = duration;
        self
    }

    /// Connects to the broker.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - Host is not set
    /// - Connection fails
    /// - Connection times out
    pub async fn build(self) -> Result<MqttBus, TransportError> {
        if self.config.host.is_empty() {
            return Err(TransportError::InvalidAddress(
                "MQTT broker host is required".to_string(),
            ));
        }

        let client_id = format!("lifx_driver_{}", Uuid::new_v4().simple());
        let mut mqtt_options = MqttOptions::new(&client_id, &self.config.host, self.config.port);
        mqtt_options.set_keep_alive(self.config.keep_alive);
        mqtt_options.set_clean_session(true);

        if let Some((ref username, ref password)) = self.config.credentials {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, REQUEST_CAPACITY);

        let bus = MqttBus {
            inner: Arc::new(MqttBusInner {
                client,
                registry: HandlerRegistry::new(),
                config: self.config.clone(),
                connected: AtomicBool::new(false),
            }),
        };

        let (connack_tx, connack_rx) = oneshot::channel();
        tokio::spawn(handle_bus_events(event_loop, bus.clone(), connack_tx));

        let timeout = self.config.connection_timeout;
        match tokio::time::timeout(timeout, connack_rx).await {
            Ok(Ok(())) => {
                tracing::info!(
                    host = %self.config.host,
                    port = %self.config.port,
                    client_id = %client_id,
                    "Connected to MQTT broker"
                );
                Ok(bus)
            }
            Ok(Err(_)) => Err(TransportError::ConnectionFailed(
                "MQTT event loop terminated unexpectedly".to_string(),
            )),
            Err(_) => Err(TransportError::ConnectionFailed(format!(
                "MQTT connection timeout after {}s",
                timeout.as_secs()
            ))),
        }
    }
}

/// Drives the MQTT event loop until the connection drops.
async fn handle_bus_events(
    mut event_loop: EventLoop,
    bus: MqttBus,
    connack_tx: oneshot::Sender<()>,
) {
    use rumqttc::{Event, Packet};

    let mut connack_tx = Some(connack_tx);

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT broker connected");
                bus.inner.connected.store(true, Ordering::Release);
                if let Some(tx) = connack_tx.take() {
                    let _ = tx.send(());
                }
            }
            Ok(Event::Incoming(Packet::SubAck(suback))) => {
                tracing::debug!(?suback, "MQTT subscription acknowledged");
            }
            Ok(Event::Incoming(Packet::Publish(publish))) => {
                tracing::debug!(topic = %publish.topic, "MQTT message received");
                bus.route_message(&publish.topic, &publish.payload);
            }
            Ok(Event::Incoming(Packet::Disconnect)) => {
                tracing::info!("MQTT broker disconnected");
                bus.inner.connected.store(false, Ordering::Release);
                break;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::error!(error = %e, "MQTT event loop error");
                bus.inner.connected.store(false, Ordering::Release);
                break;
            }
        }
    }
}
