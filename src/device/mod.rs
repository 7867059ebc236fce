// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Physical device adapter.
//!
//! The driver talks to bulbs only through [`DeviceClient`]. Power control is
//! mandatory; brightness and color actuation are extension points that
//! default to [`ActuationError::Unsupported`]. A failed or unsupported
//! actuation never rolls back the desired light state.
//!
//! [`Discovery`] produces the clients at startup. [`VirtualLight`] and
//! [`VirtualDiscovery`] are in-process implementations for dry runs and
//! tests.
//!
//! # Examples
//!
//! ```
//! use lifx_driver::device::{DeviceClient, VirtualLight};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bulb = VirtualLight::new("d073d5000001").with_label("Kitchen");
//! bulb.turn_on().await.unwrap();
//! assert_eq!(bulb.power().await.unwrap(), Some(true));
//! # }
//! ```

mod virtual_light;

pub use virtual_light::{DeviceCall, VirtualDiscovery, VirtualLight};

use std::future::Future;
use std::time::Duration;

use crate::error::ActuationError;
use crate::types::{ColorSetting, Level, Transition};

/// A physical light the driver can actuate.
///
/// Futures are `Send` so each light can be driven from its own task.
pub trait DeviceClient: Send + Sync + 'static {
    /// Returns the stable device identifier.
    fn id(&self) -> &str;

    /// Returns the user-facing label reported by the device, if any.
    fn label(&self) -> Option<&str> {
        None
    }

    /// Switches the light on.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError` on transport failure.
    fn turn_on(&self) -> impl Future<Output = Result<(), ActuationError>> + Send;

    /// Switches the light off.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError` on transport failure.
    fn turn_off(&self) -> impl Future<Output = Result<(), ActuationError>> + Send;

    /// Reads the power state reported by the device.
    ///
    /// `Ok(None)` means the device does not report power and the desired
    /// state stays as it is.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError` on transport failure.
    fn power(&self) -> impl Future<Output = Result<Option<bool>, ActuationError>> + Send {
        async { Ok(None) }
    }

    /// Applies a brightness level.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError::Unsupported` unless the adapter overrides it.
    fn set_brightness(
        &self,
        level: Level,
        transition: Transition,
    ) -> impl Future<Output = Result<(), ActuationError>> + Send {
        let _ = (level, transition);
        async { Err(ActuationError::Unsupported("brightness")) }
    }

    /// Applies a color.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError::Unsupported` unless the adapter overrides it.
    fn set_color(
        &self,
        setting: ColorSetting,
        transition: Transition,
    ) -> impl Future<Output = Result<(), ActuationError>> + Send {
        let _ = (setting, transition);
        async { Err(ActuationError::Unsupported("color")) }
    }
}

/// Finds the lights reachable from this host.
pub trait Discovery: Send + Sync {
    /// The client type produced for each light.
    type Device: DeviceClient;

    /// Runs discovery once and returns every device found.
    ///
    /// # Errors
    ///
    /// Returns `ActuationError` if the discovery transport fails.
    fn discover(&self) -> impl Future<Output = Result<Vec<Self::Device>, ActuationError>> + Send;
}

/// Runs a device call, failing with [`ActuationError::Timeout`] once
/// `deadline` elapses.
///
/// # Errors
///
/// Returns the call's own error, or `Timeout` if it did not finish in time.
pub async fn with_deadline<T>(
    deadline: Duration,
    call: impl Future<Output = Result<T, ActuationError>>,
) -> Result<T, ActuationError> {
    match tokio::time::timeout(deadline, call).await {
        Ok(result) => result,
        Err(_) => Err(ActuationError::Timeout(
            u64::try_from(deadline.as_millis()).unwrap_or(u64::MAX),
        )),
    }
}
