// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light state tracking.

use crate::types::{ColorSetting, Level, Mireds, Transition, Xy};

use super::StateSnapshot;

/// Desired state of one light.
///
/// Every field is optional: `None` means "unset" and is reported as `null`,
/// never as zero. Power, brightness and transition are independent of the
/// color representation and survive color mode switches.
///
/// # Color Modes
///
/// At most one of {hue + saturation}, {color temperature}, {xy} is populated.
/// [`apply_color`](Self::apply_color) writes one representation and clears
/// the fields of the other two in the same call.
///
/// # Examples
///
/// ```
/// use lifx_driver::state::LightState;
/// use lifx_driver::types::ColorSetting;
///
/// let mut state = LightState::new();
/// state.apply_color(ColorSetting::temperature(2700.0).unwrap());
///
/// assert_eq!(state.color_temperature().map(|ct| ct.value()), Some(370));
/// assert!(state.hue().is_none());
/// assert!(state.xy().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LightState {
    on: Option<bool>,
    brightness: Option<Level>,
    hue: Option<Level>,
    saturation: Option<Level>,
    color_temperature: Option<Mireds>,
    xy: Option<Xy>,
    transition: Option<Transition>,
}

impl LightState {
    /// Creates the state a freshly discovered light starts with.
    ///
    /// Power is off; brightness, hue, saturation and transition are zero;
    /// color temperature and xy are unset.
    #[must_use]
    pub fn new() -> Self {
        Self {
            on: Some(false),
            brightness: Some(Level::MIN),
            hue: Some(Level::MIN),
            saturation: Some(Level::MIN),
            color_temperature: None,
            xy: None,
            transition: Some(Transition::INSTANT),
        }
    }

    /// Creates a state with every field unset.
    #[must_use]
    pub fn unset() -> Self {
        Self {
            on: None,
            brightness: None,
            hue: None,
            saturation: None,
            color_temperature: None,
            xy: None,
            transition: None,
        }
    }

    /// Gets the power state.
    #[must_use]
    pub fn on(&self) -> Option<bool> {
        self.on
    }

    /// Gets the brightness level.
    #[must_use]
    pub fn brightness(&self) -> Option<Level> {
        self.brightness
    }

    /// Gets the hue level.
    #[must_use]
    pub fn hue(&self) -> Option<Level> {
        self.hue
    }

    /// Gets the saturation level.
    #[must_use]
    pub fn saturation(&self) -> Option<Level> {
        self.saturation
    }

    /// Gets the color temperature.
    #[must_use]
    pub fn color_temperature(&self) -> Option<Mireds> {
        self.color_temperature
    }

    /// Gets the xy chromaticity.
    #[must_use]
    pub fn xy(&self) -> Option<Xy> {
        self.xy
    }

    /// Gets the shared transition time.
    #[must_use]
    pub fn transition(&self) -> Option<Transition> {
        self.transition
    }

    /// Returns the active color representation, if any.
    #[must_use]
    pub fn color(&self) -> Option<ColorSetting> {
        if let Some(xy) = self.xy {
            return Some(ColorSetting::Xy(xy));
        }
        if let Some(ct) = self.color_temperature {
            return Some(ColorSetting::Temperature(ct));
        }
        match (self.hue, self.saturation) {
            (Some(hue), Some(saturation)) => Some(ColorSetting::HueSaturation { hue, saturation }),
            _ => None,
        }
    }

    /// Sets the power state.
    pub fn apply_on_off(&mut self, on: bool) {
        self.on = Some(on);
    }

    /// Sets the brightness.
    pub fn apply_brightness(&mut self, level: Level) {
        self.brightness = Some(level);
    }

    /// Sets the color, clearing the other two representations.
    ///
    /// Hue/saturation also switches the light on: choosing a color implies
    /// power.
    pub fn apply_color(&mut self, setting: ColorSetting) {
        match setting {
            ColorSetting::HueSaturation { hue, saturation } => {
                self.hue = Some(hue);
                self.saturation = Some(saturation);
                self.color_temperature = None;
                self.xy = None;
                self.on = Some(true);
            }
            ColorSetting::Xy(xy) => {
                self.xy = Some(xy);
                self.hue = None;
                self.saturation = None;
                self.color_temperature = None;
            }
            ColorSetting::Temperature(ct) => {
                self.color_temperature = Some(ct);
                self.hue = None;
                self.saturation = None;
                self.xy = None;
            }
        }
    }

    /// Sets the shared transition time.
    pub fn apply_transition(&mut self, transition: Transition) {
        self.transition = Some(transition);
    }

    /// Produces the wire representation of this state.
    #[must_use]
    pub fn serialize(&self) -> StateSnapshot {
        StateSnapshot {
            on: self.on,
            bri: self.brightness.map(|l| l.value()),
            sat: self.saturation.map(|l| l.value()),
            hue: self.hue.map(|l| l.value()),
            ct: self.color_temperature.map(|ct| ct.value()),
            transition_time: self.transition.map(|t| t.seconds()),
            xy: self.xy.map(Into::into),
        }
    }
}

impl Default for LightState {
    fn default() -> Self {
        Self::new()
    }
}
