// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-process light for dry runs and tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;

use crate::error::ActuationError;
use crate::types::{ColorSetting, Level, Transition};

use super::{DeviceClient, Discovery};

/// A call received by a [`VirtualLight`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DeviceCall {
    /// `turn_on`
    TurnOn,
    /// `turn_off`
    TurnOff,
    /// `power` query
    QueryPower,
    /// `set_brightness`
    SetBrightness(Level, Transition),
    /// `set_color`
    SetColor(ColorSetting, Transition),
}

#[derive(Debug, Default)]
struct VirtualLightInner {
    power: Mutex<Option<bool>>,
    calls: Mutex<Vec<DeviceCall>>,
    unreachable: AtomicBool,
    latency: Mutex<Option<Duration>>,
}

/// A simulated bulb.
///
/// Clones share the same simulated hardware, so a test can keep one clone
/// to inspect what the driver did with another.
///
/// # Examples
///
/// ```
/// use lifx_driver::device::{DeviceCall, DeviceClient, VirtualLight};
///
/// # #[tokio::main]
/// # async fn main() {
/// let bulb = VirtualLight::new("d073d5000001");
/// let probe = bulb.clone();
///
/// bulb.turn_off().await.unwrap();
/// assert_eq!(probe.calls(), vec![DeviceCall::TurnOff]);
///
/// probe.set_reachable(false);
/// assert!(bulb.turn_on().await.is_err());
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct VirtualLight {
    id: String,
    label: Option<String>,
    inner: Arc<VirtualLightInner>,
}

impl VirtualLight {
    /// Creates a reachable light with unknown power state.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: None,
            inner: Arc::new(VirtualLightInner::default()),
        }
    }

    /// Sets the label the light reports.
    #[must_use]
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Sets the power state the light reports before any actuation.
    #[must_use]
    pub fn with_power(self, on: bool) -> Self {
        *self.inner.power.lock() = Some(on);
        self
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(self, latency: Duration) -> Self {
        *self.inner.latency.lock() = Some(latency);
        self
    }

    /// Makes every subsequent call fail (or succeed again).
    pub fn set_reachable(&self, reachable: bool) {
        self.inner.unreachable.store(!reachable, Ordering::Release);
    }

    /// Changes the power state behind the driver's back.
    pub fn set_reported_power(&self, on: Option<bool>) {
        *self.inner.power.lock() = on;
    }

    /// Returns the simulated power state.
    #[must_use]
    pub fn is_on(&self) -> Option<bool> {
        *self.inner.power.lock()
    }

    /// Returns every call received so far, oldest first.
    #[must_use]
    pub fn calls(&self) -> Vec<DeviceCall> {
        self.inner.calls.lock().clone()
    }

    /// Forgets recorded calls.
    pub fn clear_calls(&self) {
        self.inner.calls.lock().clear();
    }

    async fn record(&self, call: DeviceCall) -> Result<(), ActuationError> {
        let latency = *self.inner.latency.lock();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
        self.inner.calls.lock().push(call);
        if self.inner.unreachable.load(Ordering::Acquire) {
            return Err(ActuationError::Unreachable(self.id.clone()));
        }
        Ok(())
    }
}

impl DeviceClient for VirtualLight {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    async fn turn_on(&self) -> Result<(), ActuationError> {
        self.record(DeviceCall::TurnOn).await?;
        *self.inner.power.lock() = Some(true);
        Ok(())
    }

    async fn turn_off(&self) -> Result<(), ActuationError> {
        self.record(DeviceCall::TurnOff).await?;
        *self.inner.power.lock() = Some(false);
        Ok(())
    }

    async fn power(&self) -> Result<Option<bool>, ActuationError> {
        self.record(DeviceCall::QueryPower).await?;
        Ok(*self.inner.power.lock())
    }

    async fn set_brightness(
        &self,
        level: Level,
        transition: Transition,
    ) -> Result<(), ActuationError> {
        self.record(DeviceCall::SetBrightness(level, transition)).await
    }

    async fn set_color(
        &self,
        setting: ColorSetting,
        transition: Transition,
    ) -> Result<(), ActuationError> {
        self.record(DeviceCall::SetColor(setting, transition)).await
    }
}

/// Discovery over a fixed set of [`VirtualLight`]s.
#[derive(Debug, Clone, Default)]
pub struct VirtualDiscovery {
    lights: Vec<VirtualLight>,
    fail: bool,
}

impl VirtualDiscovery {
    /// Creates a discovery that finds `lights`.
    #[must_use]
    pub fn new(lights: impl IntoIterator<Item = VirtualLight>) -> Self {
        Self {
            lights: lights.into_iter().collect(),
            fail: false,
        }
    }

    /// Creates a discovery whose transport is down.
    #[must_use]
    pub fn failing() -> Self {
        Self {
            lights: Vec::new(),
            fail: true,
        }
    }
}

impl Discovery for VirtualDiscovery {
    type Device = VirtualLight;

    async fn discover(&self) -> Result<Vec<VirtualLight>, ActuationError> {
        if self.fail {
            return Err(ActuationError::Unreachable("discovery".to_string()));
        }
        Ok(self.lights.clone())
    }
}
