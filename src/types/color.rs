// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! A light holds its color in exactly one of three representations:
//! hue/saturation, CIE xy chromaticity, or color temperature.
//! [`ColorSetting`] names one of them together with its values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

use super::Level;

/// Color temperature in mireds, derived from a Kelvin value.
///
/// # Examples
///
/// ```
/// use lifx_driver::types::Mireds;
///
/// let ct = Mireds::from_kelvin(4000.0).unwrap();
/// assert_eq!(ct.value(), 250);
///
/// // floor(1_000_000 / 3000) = 333
/// assert_eq!(Mireds::from_kelvin(3000.0).unwrap().value(), 333);
///
/// // Zero Kelvin is rejected
/// assert!(Mireds::from_kelvin(0.0).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mireds(u16);

impl Mireds {
    /// Creates a value from raw mireds.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Computes `floor(1_000_000 / kelvin)`.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` for NaN or infinite input and
    /// `ValueError::OutOfRange` when `kelvin` is not positive or so low that
    /// the result exceeds 16 bits.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_kelvin(kelvin: f64) -> Result<Self, ValueError> {
        if !kelvin.is_finite() {
            return Err(ValueError::NotFinite("temperature"));
        }
        let min_kelvin = 1_000_000.0 / (f64::from(u16::MAX) + 1.0);
        if kelvin <= min_kelvin {
            return Err(ValueError::OutOfRange {
                field: "temperature",
                min: min_kelvin,
                max: f64::MAX,
                actual: kelvin,
            });
        }
        // kelvin > 1e6 / 65536, so the quotient is below 65536
        Ok(Self((1_000_000.0 / kelvin).floor() as u16))
    }

    /// Returns the value in mireds.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Mireds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} mireds", self.0)
    }
}

/// A CIE 1931 chromaticity coordinate pair.
///
/// Coordinates are stored verbatim; only NaN and infinities are refused.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "[f64; 2]", try_from = "[f64; 2]")]
pub struct Xy {
    x: f64,
    y: f64,
}

impl Xy {
    /// Creates a coordinate pair.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::NotFinite` if either coordinate is NaN or
    /// infinite.
    pub fn new(x: f64, y: f64) -> Result<Self, ValueError> {
        if !x.is_finite() {
            return Err(ValueError::NotFinite("x"));
        }
        if !y.is_finite() {
            return Err(ValueError::NotFinite("y"));
        }
        Ok(Self { x, y })
    }

    /// Returns the x coordinate.
    #[must_use]
    pub const fn x(&self) -> f64 {
        self.x
    }

    /// Returns the y coordinate.
    #[must_use]
    pub const fn y(&self) -> f64 {
        self.y
    }
}

impl From<Xy> for [f64; 2] {
    fn from(xy: Xy) -> Self {
        [xy.x, xy.y]
    }
}

impl TryFrom<[f64; 2]> for Xy {
    type Error = ValueError;

    fn try_from([x, y]: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(x, y)
    }
}

/// One of the three mutually exclusive color representations.
///
/// # Examples
///
/// ```
/// use lifx_driver::types::{ColorSetting, Level};
///
/// let setting = ColorSetting::hue_saturation(0.5, 1.0).unwrap();
/// assert_eq!(
///     setting,
///     ColorSetting::HueSaturation {
///         hue: Level::new(32768),
///         saturation: Level::MAX,
///     }
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorSetting {
    /// Hue and saturation, both as native levels.
    HueSaturation {
        /// Hue level.
        hue: Level,
        /// Saturation level.
        saturation: Level,
    },
    /// Chromaticity coordinates.
    Xy(Xy),
    /// White color temperature.
    Temperature(Mireds),
}

impl ColorSetting {
    /// Builds a hue/saturation setting from fractions in `[0, 1]`.
    ///
    /// # Errors
    ///
    /// Returns error if either fraction is invalid.
    pub fn hue_saturation(hue: f64, saturation: f64) -> Result<Self, ValueError> {
        Ok(Self::HueSaturation {
            hue: Level::from_fraction("hue", hue)?,
            saturation: Level::from_fraction("saturation", saturation)?,
        })
    }

    /// Builds an xy setting.
    ///
    /// # Errors
    ///
    /// Returns error if either coordinate is not finite.
    pub fn xy(x: f64, y: f64) -> Result<Self, ValueError> {
        Xy::new(x, y).map(Self::Xy)
    }

    /// Builds a temperature setting from Kelvin.
    ///
    /// # Errors
    ///
    /// Returns error if the temperature cannot be converted to mireds.
    pub fn temperature(kelvin: f64) -> Result<Self, ValueError> {
        Mireds::from_kelvin(kelvin).map(Self::Temperature)
    }

    /// Returns the mode name used on the color channel.
    #[must_use]
    pub const fn mode(&self) -> &'static str {
        match self {
            Self::HueSaturation { .. } => "hue",
            Self::Xy(_) => "xy",
            Self::Temperature(_) => "temperature",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mireds_floor() {
        assert_eq!(Mireds::from_kelvin(2700.0).unwrap().value(), 370);
        assert_eq!(Mireds::from_kelvin(6500.0).unwrap().value(), 153);
        assert_eq!(Mireds::from_kelvin(1_000_000.0).unwrap().value(), 1);
        assert_eq!(Mireds::from_kelvin(2_000_000.0).unwrap().value(), 0);
    }

    #[test]
    fn mireds_rejects_zero_and_negative() {
        assert!(matches!(
            Mireds::from_kelvin(0.0),
            Err(ValueError::OutOfRange {
                field: "temperature",
                ..
            })
        ));
        assert!(Mireds::from_kelvin(-2700.0).is_err());
    }

    #[test]
    fn mireds_rejects_overflowing_quotient() {
        // 1e6 / 15 = 66666, does not fit in 16 bits
        assert!(Mireds::from_kelvin(15.0).is_err());
        assert_eq!(Mireds::from_kelvin(16.0).unwrap().value(), 62500);
    }

    #[test]
    fn mireds_rejects_nan() {
        assert_eq!(
            Mireds::from_kelvin(f64::NAN),
            Err(ValueError::NotFinite("temperature"))
        );
    }

    #[test]
    fn xy_stores_verbatim() {
        let xy = Xy::new(0.3127, 0.329).unwrap();
        assert!((xy.x() - 0.3127).abs() < f64::EPSILON);
        assert!((xy.y() - 0.329).abs() < f64::EPSILON);
    }

    #[test]
    fn xy_rejects_infinite() {
        assert_eq!(Xy::new(f64::INFINITY, 0.1), Err(ValueError::NotFinite("x")));
        assert_eq!(Xy::new(0.1, f64::NAN), Err(ValueError::NotFinite("y")));
    }

    #[test]
    fn xy_serializes_as_pair() {
        let json = serde_json::to_value(Xy::new(0.25, 0.5).unwrap()).unwrap();
        assert_eq!(json, serde_json::json!([0.25, 0.5]));
    }

    #[test]
    fn xy_pair_conversion_is_validated() {
        assert_eq!(Xy::try_from([f64::NAN, 0.4]), Err(ValueError::NotFinite("x")));
        assert_eq!(
            Xy::try_from([0.3, f64::NEG_INFINITY]),
            Err(ValueError::NotFinite("y"))
        );

        let xy: Xy = serde_json::from_str("[0.3, 0.4]").unwrap();
        assert_eq!(xy, Xy::new(0.3, 0.4).unwrap());
    }

    #[test]
    fn setting_modes() {
        assert_eq!(ColorSetting::hue_saturation(0.0, 0.0).unwrap().mode(), "hue");
        assert_eq!(ColorSetting::xy(0.1, 0.2).unwrap().mode(), "xy");
        assert_eq!(ColorSetting::temperature(3000.0).unwrap().mode(), "temperature");
    }

    #[test]
    fn hue_saturation_validates_each_component() {
        assert!(matches!(
            ColorSetting::hue_saturation(0.5, 2.0),
            Err(ValueError::OutOfRange {
                field: "saturation",
                ..
            })
        ));
    }
}
