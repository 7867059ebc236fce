// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `lifx_driver` - A bus driver for LIFX smart bulbs.
//!
//! Each discovered bulb is exposed on a pub/sub bus as a device with four
//! channels. Method calls on those channels are validated, translated into
//! a desired [`LightState`], actuated on the bulb, and echoed back as a
//! `state` event.
//!
//! # Channels
//!
//! | Channel         | Methods                      | Effect                          |
//! |-----------------|------------------------------|---------------------------------|
//! | `on-off`        | `turnOn`, `turnOff`, `set`   | Power                           |
//! | `brightness`    | `set`                        | Brightness fraction `[0, 1]`    |
//! | `color`         | `set`                        | Hue/saturation, CIE xy or Kelvin|
//! | `core.batching` | `setBatch`                   | Several attributes, one event   |
//!
//! # Quick Start
//!
//! ```
//! use std::time::Duration;
//! use lifx_driver::{Channel, Driver, DriverConfig};
//! use lifx_driver::bus::MemoryBus;
//! use lifx_driver::device::{VirtualDiscovery, VirtualLight};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> lifx_driver::Result<()> {
//!     let bus = MemoryBus::new();
//!     let mut events = bus.subscribe();
//!
//!     let bulb = VirtualLight::new("d073d5000001").with_label("Desk");
//!     let config = DriverConfig::default().with_blink(0, Duration::ZERO);
//!     let driver = Driver::new(bus.clone(), VirtualDiscovery::new([bulb]), config)
//!         .start()
//!         .await?;
//!
//!     bus.dispatch(
//!         "d073d5000001",
//!         Channel::Batching,
//!         "setBatch",
//!         json!([{ "on-off": true, "brightness": 0.5 }]),
//!     );
//!
//!     let event = events.recv().await.expect("state event");
//!     assert_eq!(event.channel, Channel::OnOff);
//!     assert_eq!(event.body["bri"], 32768);
//!
//!     driver.shutdown();
//!     Ok(())
//! }
//! ```
//!
//! ## MQTT
//!
//! ```no_run
//! use lifx_driver::{Driver, DriverConfig};
//! use lifx_driver::bus::MqttBus;
//! use lifx_driver::device::VirtualDiscovery;
//!
//! #[tokio::main]
//! async fn main() -> lifx_driver::Result<()> {
//!     let bus = MqttBus::builder().host("192.168.1.50").build().await?;
//!     let _driver = Driver::new(bus, VirtualDiscovery::default(), DriverConfig::default())
//!         .start()
//!         .await?;
//!     std::future::pending::<()>().await;
//!     Ok(())
//! }
//! ```
//!
//! # Logging
//!
//! The crate logs through `tracing` and installs no subscriber. Inbound
//! actuations are logged at `info`, emitted state at `debug`, device
//! failures at `warn` and malformed commands at `error`.

pub mod bus;
mod channel;
pub mod command;
mod config;
pub mod device;
mod driver;
pub mod error;
pub mod light;
pub mod state;
pub mod types;

pub use channel::{Channel, STATE_EVENT};
pub use command::{BatchCommand, BrightnessCommand, ColorCommand, LightCommand, OnOffCommand};
pub use config::DriverConfig;
pub use driver::{Driver, RunningDriver};
pub use error::{ActuationError, Error, ProtocolError, Result, TransportError, ValueError};
pub use light::{Light, LightHandle};
pub use state::{LightState, StateSnapshot};
pub use types::{ColorSetting, Level, Mireds, Transition, Xy};
