// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Batching channel commands.

use serde_json::Value;

use crate::channel::Channel;
use crate::error::ProtocolError;
use crate::types::{Level, Transition};

use super::ColorCommand;
use super::color::transition;
use super::payload::Payload;

/// A `setBatch` call: whichever attributes are present, applied together.
///
/// Absent fields are skipped. A present field of the wrong type rejects
/// the whole batch. The `color` object always follows the hue/saturation
/// path.
///
/// # Examples
///
/// ```
/// use lifx_driver::command::BatchCommand;
/// use serde_json::json;
///
/// let batch = BatchCommand::parse("setBatch", &json!([{
///     "brightness": 0.25,
///     "on-off": true,
/// }])).unwrap();
///
/// assert!(batch.color.is_none());
/// assert_eq!(batch.on_off, Some(true));
/// assert_eq!(batch.brightness.map(|b| b.value()), Some(16384));
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BatchCommand {
    /// Hue/saturation color, with its own optional transition.
    pub color: Option<ColorCommand>,
    /// Brightness level.
    pub brightness: Option<Level>,
    /// Power state.
    pub on_off: Option<bool>,
    /// Shared transition time.
    pub transition: Option<Transition>,
}

impl BatchCommand {
    /// Parses a method call on the `core.batching` channel.
    ///
    /// # Errors
    ///
    /// Returns error for unknown methods or any present-but-invalid field.
    pub fn parse(method: &str, params: &Value) -> Result<Self, ProtocolError> {
        match method {
            "setBatch" => Self::from_payload(Payload::new(params).first_argument()?),
            _ => Err(ProtocolError::UnknownMethod {
                channel: Channel::Batching.id().to_string(),
                method: method.to_string(),
            }),
        }
    }

    fn from_payload(payload: Payload<'_>) -> Result<Self, ProtocolError> {
        let color = payload
            .field("color")?
            .map(ColorCommand::hue_from_payload)
            .transpose()?;
        let brightness = payload
            .optional_f64("brightness")?
            .map(|b| Level::from_fraction("brightness", b))
            .transpose()?;
        Ok(Self {
            color,
            brightness,
            on_off: payload.optional_bool("on-off")?,
            transition: transition(payload)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::types::ColorSetting;

    #[test]
    fn empty_object_is_an_empty_batch() {
        let batch = BatchCommand::parse("setBatch", &json!([{}])).unwrap();
        assert_eq!(batch, BatchCommand::default());
    }

    #[test]
    fn all_fields() {
        let batch = BatchCommand::parse(
            "setBatch",
            &json!([{
                "color": { "hue": 0.0, "saturation": 0.5, "transition": 1000 },
                "brightness": 1.0,
                "on-off": false,
                "transition": 3000,
            }]),
        )
        .unwrap();

        let color = batch.color.unwrap();
        assert_eq!(color.setting, ColorSetting::hue_saturation(0.0, 0.5).unwrap());
        assert_eq!(color.transition, Some(Transition::from_seconds(1)));
        assert_eq!(batch.brightness, Some(Level::MAX));
        assert_eq!(batch.on_off, Some(false));
        assert_eq!(batch.transition, Some(Transition::from_seconds(3)));
    }

    #[test]
    fn color_mode_key_is_ignored() {
        let batch = BatchCommand::parse(
            "setBatch",
            &json!([{ "color": { "mode": "xy", "hue": 0.1, "saturation": 0.1 } }]),
        )
        .unwrap();
        assert_eq!(batch.color.unwrap().setting.mode(), "hue");
    }

    #[test]
    fn invalid_present_field_rejects_whole_batch() {
        let err = BatchCommand::parse(
            "setBatch",
            &json!([{ "brightness": 0.5, "on-off": "yes" }]),
        )
        .unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { ref field, .. } if field == "on-off"));
    }

    #[test]
    fn incomplete_color_rejects_batch() {
        let err = BatchCommand::parse("setBatch", &json!([{ "color": { "hue": 0.5 } }]))
            .unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField(ref f) if f == "saturation"));
    }

    #[test]
    fn unknown_method() {
        assert!(matches!(
            BatchCommand::parse("set", &json!([{}])),
            Err(ProtocolError::UnknownMethod { .. })
        ));
    }
}
