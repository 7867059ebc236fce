// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color channel commands.

use serde_json::Value;

use crate::channel::Channel;
use crate::error::ProtocolError;
use crate::types::{ColorSetting, Transition};

use super::payload::Payload;

/// Command received on the `color` channel.
///
/// The payload carries a `mode` and the fields for that mode:
///
/// | mode | fields |
/// |------|--------|
/// | `hue` | `hue`, `saturation` (fractions in `[0, 1]`) |
/// | `xy` | `x`, `y` |
/// | `temperature` | `temperature` (Kelvin, greater than zero) |
///
/// Every mode accepts an optional `transition` in milliseconds.
///
/// # Examples
///
/// ```
/// use lifx_driver::command::ColorCommand;
/// use lifx_driver::types::Mireds;
/// use serde_json::json;
///
/// let cmd = ColorCommand::parse("set", &json!({
///     "mode": "temperature",
///     "temperature": 2700,
///     "transition": 1500,
/// })).unwrap();
///
/// assert_eq!(cmd.setting.mode(), "temperature");
/// assert_eq!(cmd.transition.map(|t| t.seconds()), Some(1));
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorCommand {
    /// The requested color.
    pub setting: ColorSetting,
    /// Optional transition time.
    pub transition: Option<Transition>,
}

impl ColorCommand {
    /// Parses a method call on the `color` channel.
    ///
    /// # Errors
    ///
    /// Returns error for unknown methods, a missing or unknown `mode`, and
    /// missing or invalid mode fields.
    pub fn parse(method: &str, params: &Value) -> Result<Self, ProtocolError> {
        match method {
            "set" => Self::from_payload(Payload::new(params).first_argument()?),
            _ => Err(ProtocolError::UnknownMethod {
                channel: Channel::Color.id().to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn from_payload(payload: Payload<'_>) -> Result<Self, ProtocolError> {
        let mode = payload.require("mode")?.as_str("mode")?;
        let setting = match mode {
            "hue" => return Self::hue_from_payload(payload),
            "xy" => ColorSetting::xy(payload.require_f64("x")?, payload.require_f64("y")?)?,
            "temperature" => ColorSetting::temperature(payload.require_f64("temperature")?)?,
            other => return Err(ProtocolError::UnknownColorMode(other.to_string())),
        };
        Ok(Self {
            setting,
            transition: transition(payload)?,
        })
    }

    /// Parses the hue/saturation fields of `payload`, ignoring any `mode`.
    pub(crate) fn hue_from_payload(payload: Payload<'_>) -> Result<Self, ProtocolError> {
        let setting = ColorSetting::hue_saturation(
            payload.require_f64("hue")?,
            payload.require_f64("saturation")?,
        )?;
        Ok(Self {
            setting,
            transition: transition(payload)?,
        })
    }
}

pub(crate) fn transition(payload: Payload<'_>) -> Result<Option<Transition>, ProtocolError> {
    payload
        .optional_u64("transition")?
        .map(Transition::from_millis)
        .transpose()
        .map_err(Into::into)
}
