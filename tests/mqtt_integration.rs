// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT bus using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::time::Duration;

use lifx_driver::bus::MqttBus;
use lifx_driver::device::{DeviceCall, VirtualDiscovery, VirtualLight};
use lifx_driver::{Driver, DriverConfig, RunningDriver, TransportError};
use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use rumqttc::{AsyncClient, Event, MqttOptions, Packet, QoS};
use serde_json::Value;
use tokio::sync::{mpsc, oneshot};
use tokio::time::{sleep, timeout};

const STATE_TOPIC: &str = "$device/d1/channel/on-off/event/state";

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind
    sleep(Duration::from_millis(500)).await;
}

/// Connects a second client to the broker, subscribed to `topic`.
///
/// Returns once the subscription is acknowledged. Received publishes are
/// forwarded as `(topic, json)` pairs.
async fn start_peer(
    port: u16,
    topic: &str,
) -> (AsyncClient, mpsc::UnboundedReceiver<(String, Value)>) {
    let options = MqttOptions::new(format!("peer_{port}"), "127.0.0.1", port);
    let (client, mut event_loop) = AsyncClient::new(options, 10);
    client.subscribe(topic, QoS::AtLeastOnce).await.unwrap();

    let (tx, rx) = mpsc::unbounded_channel();
    let (suback_tx, suback_rx) = oneshot::channel();
    tokio::spawn(async move {
        let mut suback_tx = Some(suback_tx);
        while let Ok(event) = event_loop.poll().await {
            match event {
                Event::Incoming(Packet::SubAck(_)) => {
                    if let Some(tx) = suback_tx.take() {
                        let _ = tx.send(());
                    }
                }
                Event::Incoming(Packet::Publish(publish)) => {
                    let body = serde_json::from_slice(&publish.payload).unwrap_or(Value::Null);
                    let _ = tx.send((publish.topic, body));
                }
                _ => {}
            }
        }
    });

    timeout(Duration::from_secs(5), suback_rx)
        .await
        .expect("peer subscription not acknowledged")
        .unwrap();
    (client, rx)
}

/// Starts a driver for one bulb over MQTT and waits for its subscriptions.
async fn start_driver(port: u16, bulb: VirtualLight) -> (MqttBus, RunningDriver<VirtualLight>) {
    let bus = MqttBus::builder()
        .host("127.0.0.1")
        .port(port)
        .build()
        .await
        .unwrap();

    let config = DriverConfig::default().with_blink(0, Duration::ZERO);
    let driver = Driver::new(bus.clone(), VirtualDiscovery::new([bulb]), config)
        .start()
        .await
        .unwrap();

    // Channel subscriptions are acknowledged asynchronously
    sleep(Duration::from_millis(500)).await;
    (bus, driver)
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttBus::builder().host("127.0.0.1").port(port).build().await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
        let bus = result.unwrap();
        assert!(bus.is_connected());
        assert_eq!(bus.host(), "127.0.0.1");
        assert_eq!(bus.port(), port);
    }

    #[tokio::test]
    async fn missing_host_fails() {
        let err = MqttBus::builder().port(1883).build().await.unwrap_err();
        assert!(matches!(err, TransportError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn no_broker_fails() {
        let port = get_test_port();

        let err = MqttBus::builder()
            .host("127.0.0.1")
            .port(port)
            .connection_timeout(Duration::from_secs(2))
            .build()
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::ConnectionFailed(_)));
    }

    #[tokio::test]
    async fn disconnect() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let bus = MqttBus::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        assert!(bus.disconnect().await.is_ok());
        assert!(!bus.is_connected());
    }
}

// ============================================================================
// Driver over MQTT
// ============================================================================

mod driver {
    use super::*;

    #[tokio::test]
    async fn start_announces_every_channel() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let bus = MqttBus::builder()
            .host("127.0.0.1")
            .port(port)
            .build()
            .await
            .unwrap();

        let discovery = VirtualDiscovery::new([VirtualLight::new("d073d5000001")]);
        let config = DriverConfig::default().with_blink(0, Duration::ZERO);
        let driver = Driver::new(bus.clone(), discovery, config)
            .start()
            .await
            .unwrap();

        assert_eq!(driver.len(), 1);
        assert_eq!(bus.channel_count(), 4);
    }

    #[tokio::test]
    async fn method_call_reaches_bulb_and_emits_state() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let bulb = VirtualLight::new("d1");
        let (_bus, _driver) = start_driver(port, bulb.clone()).await;
        let (peer, mut events) = start_peer(port, STATE_TOPIC).await;

        peer.publish(
            "$device/d1/channel/on-off",
            QoS::AtLeastOnce,
            false,
            r#"{"method":"turnOn"}"#,
        )
        .await
        .unwrap();

        let (topic, body) = timeout(Duration::from_secs(5), events.recv())
            .await
            .expect("no state event received")
            .unwrap();
        assert_eq!(topic, STATE_TOPIC);
        assert_eq!(body["on"], true);
        assert!(bulb.calls().contains(&DeviceCall::TurnOn));
    }

    #[tokio::test]
    async fn malformed_payload_is_dropped() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let bulb = VirtualLight::new("d1");
        let (_bus, _driver) = start_driver(port, bulb.clone()).await;
        let (peer, mut events) = start_peer(port, STATE_TOPIC).await;

        peer.publish(
            "$device/d1/channel/on-off",
            QoS::AtLeastOnce,
            false,
            "{\"method\": turnOn",
        )
        .await
        .unwrap();

        assert!(
            timeout(Duration::from_secs(1), events.recv()).await.is_err(),
            "malformed call must not emit"
        );
        assert!(bulb.calls().is_empty());
    }
}
