// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver bootstrap.
//!
//! [`Driver::start`] announces the driver, discovers bulbs, announces each
//! one with its four channels, starts one task per light and finally blinks
//! every bulb so the user can see which ones were found.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::bus::{DeviceInfo, DriverInfo, Transport};
use crate::channel::Channel;
use crate::config::DriverConfig;
use crate::device::{DeviceClient, Discovery, with_deadline};
use crate::error::{Error, Result};
use crate::light::{Light, LightHandle, Notifier, mailbox};

/// A LIFX driver bound to a bus and a discovery source.
///
/// # Examples
///
/// ```
/// use lifx_driver::{Channel, Driver, DriverConfig};
/// use lifx_driver::bus::MemoryBus;
/// use lifx_driver::device::{VirtualDiscovery, VirtualLight};
/// use serde_json::Value;
///
/// # #[tokio::main]
/// # async fn main() -> lifx_driver::Result<()> {
/// let bus = MemoryBus::new();
/// let discovery = VirtualDiscovery::new([VirtualLight::new("d073d5000001")]);
/// let config = DriverConfig::default().with_blink(0, std::time::Duration::ZERO);
///
/// let driver = Driver::new(bus.clone(), discovery, config).start().await?;
/// bus.dispatch("d073d5000001", Channel::OnOff, "turnOn", Value::Null);
///
/// let state = driver.light("d073d5000001").unwrap().state().await?;
/// assert_eq!(state.on(), Some(true));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Driver<T, S> {
    transport: T,
    discovery: S,
    config: DriverConfig,
}

impl<T: Transport, S: Discovery> Driver<T, S> {
    /// Creates a driver.
    #[must_use]
    pub fn new(transport: T, discovery: S, config: DriverConfig) -> Self {
        Self {
            transport,
            discovery,
            config,
        }
    }

    /// Announces everything, starts the lights and runs the startup blink.
    ///
    /// # Errors
    ///
    /// Returns error if the driver, a device or a channel cannot be
    /// announced, or if discovery fails. Lights started before the failure
    /// are stopped.
    pub async fn start(self) -> Result<RunningDriver<S::Device>> {
        let config = &self.config;
        tracing::info!(driver = %config.driver_id, "Starting driver");

        self.transport.announce_driver(&DriverInfo {
            id: config.driver_id.clone(),
            name: config.driver_name.clone(),
        })?;

        let devices = self
            .discovery
            .discover()
            .await
            .map_err(|e| Error::Discovery(e.to_string()))?;
        tracing::info!(count = devices.len(), "Discovered lights");

        let mut running = RunningDriver { lights: Vec::new() };
        for device in devices {
            let light = self.start_light(Arc::new(device))?;
            running.lights.push(light);
        }

        blink(
            running.lights.iter().map(|light| light.device.as_ref()),
            config.blink_cycles,
            config.blink_interval,
            config.actuation_timeout,
        )
        .await;

        tracing::info!(lights = running.lights.len(), "Driver started");
        Ok(running)
    }

    fn start_light(&self, device: Arc<S::Device>) -> Result<RunningLight<S::Device>> {
        let id = device.id().to_string();
        let name = device
            .label()
            .unwrap_or(&self.config.default_light_name)
            .to_string();
        tracing::info!(device = %id, name = %name, "Announcing light");

        self.transport
            .announce_device(&DeviceInfo::light(&id, &name))?;

        let (handle, inbox) = mailbox(&id, self.config.command_queue_capacity);
        let buses = Channel::ALL
            .into_iter()
            .map(|channel| {
                self.transport
                    .announce_channel(&id, channel, handle.handler(channel))
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let light = Light::new(
            Arc::clone(&device),
            name,
            Notifier::new(buses),
            self.config.actuation_timeout,
        );
        let task = inbox.spawn(light);

        Ok(RunningLight {
            handle,
            device,
            task,
        })
    }
}

struct RunningLight<D> {
    handle: LightHandle,
    device: Arc<D>,
    task: JoinHandle<()>,
}

/// A started driver.
///
/// Dropping it stops every light task.
pub struct RunningDriver<D> {
    lights: Vec<RunningLight<D>>,
}

impl<D: DeviceClient> RunningDriver<D> {
    /// Returns the handles of every light, in discovery order.
    pub fn lights(&self) -> impl Iterator<Item = &LightHandle> {
        self.lights.iter().map(|light| &light.handle)
    }

    /// Returns the handle of one light.
    #[must_use]
    pub fn light(&self, device_id: &str) -> Option<&LightHandle> {
        self.lights()
            .find(|handle| handle.device_id() == device_id)
    }

    /// Returns the number of lights.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lights.len()
    }

    /// Returns `true` if no light was discovered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lights.is_empty()
    }

    /// Stops every light task.
    pub fn shutdown(self) {
        tracing::info!(lights = self.lights.len(), "Stopping driver");
        drop(self);
    }
}

impl<D> Drop for RunningDriver<D> {
    fn drop(&mut self) {
        for light in &self.lights {
            light.task.abort();
        }
    }
}

impl<D> std::fmt::Debug for RunningDriver<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let ids: Vec<_> = self
            .lights
            .iter()
            .map(|light| light.handle.device_id())
            .collect();
        f.debug_struct("RunningDriver").field("lights", &ids).finish()
    }
}

/// Turns every device off then on, `cycles` times.
///
/// Goes straight to the devices; the desired light state is not touched.
async fn blink<'a, D: DeviceClient>(
    devices: impl Iterator<Item = &'a D> + Clone,
    cycles: u32,
    interval: Duration,
    timeout: Duration,
) {
    for cycle in 0..cycles {
        tracing::debug!(cycle, "Blinking lights");
        for device in devices.clone() {
            if let Err(e) = with_deadline(timeout, device.turn_off()).await {
                tracing::warn!(device = %device.id(), error = %e, "Blink off failed");
            }
        }
        tokio::time::sleep(interval).await;
        for device in devices.clone() {
            if let Err(e) = with_deadline(timeout, device.turn_on()).await {
                tracing::warn!(device = %device.id(), error = %e, "Blink on failed");
            }
        }
        tokio::time::sleep(interval).await;
    }
}
