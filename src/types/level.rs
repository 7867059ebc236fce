// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Native 16-bit intensity levels.
//!
//! Channels speak in fractions between 0.0 and 1.0, the light speaks in
//! unsigned 16-bit values. [`Level`] is the bridge: every fraction is mapped
//! with `round(value * 65535)`.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// A 16-bit intensity (0-65535) used for brightness, hue and saturation.
///
/// # Examples
///
/// ```
/// use lifx_driver::types::Level;
///
/// let half = Level::from_fraction("brightness", 0.5).unwrap();
/// assert_eq!(half.value(), 32768);
///
/// assert_eq!(Level::MIN.value(), 0);
/// assert_eq!(Level::MAX.value(), 65535);
///
/// // Fractions outside [0, 1] are rejected
/// assert!(Level::from_fraction("hue", 1.01).is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Level(u16);

impl Level {
    /// Lowest level.
    pub const MIN: Self = Self(0);

    /// Highest level.
    pub const MAX: Self = Self(u16::MAX);

    /// Wraps a raw native value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Converts a fraction in `[0, 1]` to a native level.
    ///
    /// `field` names the value in the error message.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinite input and
    /// `ValueError::OutOfRange` when the fraction lies outside `[0, 1]`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_fraction(field: &'static str, fraction: f64) -> Result<Self, ValueError> {
        if !fraction.is_finite() {
            return Err(ValueError::NotFinite(field));
        }
        if !(0.0..=1.0).contains(&fraction) {
            return Err(ValueError::OutOfRange {
                field,
                min: 0.0,
                max: 1.0,
                actual: fraction,
            });
        }
        // In range, so the rounded product fits in u16
        Ok(Self((fraction * f64::from(u16::MAX)).round() as u16))
    }

    /// Returns the native value.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u16> for Level {
    fn from(value: u16) -> Self {
        Self(value)
    }
}
