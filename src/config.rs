// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Driver configuration.

use std::time::Duration;

/// Configuration for a [`Driver`](crate::Driver).
///
/// # Examples
///
/// ```
/// use std::time::Duration;
/// use lifx_driver::DriverConfig;
///
/// let config = DriverConfig::default()
///     .with_default_light_name("Bulb")
///     .with_blink(0, Duration::ZERO)
///     .with_actuation_timeout(Duration::from_secs(2));
///
/// assert_eq!(config.driver_id, "com.ninjablocks.lifx");
/// assert_eq!(config.blink_cycles, 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverConfig {
    /// Driver identifier announced on the bus.
    pub driver_id: String,
    /// Human readable driver name.
    pub driver_name: String,
    /// Name used for lights that report no label.
    pub default_light_name: String,
    /// Upper bound on a single device call.
    pub actuation_timeout: Duration,
    /// Off/on cycles run on every light after startup.
    pub blink_cycles: u32,
    /// Pause between blink steps.
    pub blink_interval: Duration,
    /// Commands queued per light before new ones are dropped.
    pub command_queue_capacity: usize,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            driver_id: "com.ninjablocks.lifx".to_string(),
            driver_name: "driver-lifx".to_string(),
            default_light_name: "LiFX Bulb".to_string(),
            actuation_timeout: Duration::from_secs(5),
            blink_cycles: 3,
            blink_interval: Duration::from_secs(1),
            command_queue_capacity: 32,
        }
    }
}

impl DriverConfig {
    /// Sets the announced driver identity.
    #[must_use]
    pub fn with_driver(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.driver_id = id.into();
        self.driver_name = name.into();
        self
    }

    /// Sets the name for lights without a label.
    #[must_use]
    pub fn with_default_light_name(mut self, name: impl Into<String>) -> Self {
        self.default_light_name = name.into();
        self
    }

    /// Sets the device call timeout.
    #[must_use]
    pub fn with_actuation_timeout(mut self, timeout: Duration) -> Self {
        self.actuation_timeout = timeout;
        self
    }

    /// Sets the startup blink. Zero cycles disables it.
    #[must_use]
    pub fn with_blink(mut self, cycles: u32, interval: Duration) -> Self {
        self.blink_cycles = cycles;
        self.blink_interval = interval;
        self
    }

    /// Sets the per-light command queue capacity (minimum 1).
    #[must_use]
    pub fn with_command_queue_capacity(mut self, capacity: usize) -> Self {
        self.command_queue_capacity = capacity.max(1);
        self
    }
}
