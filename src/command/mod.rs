// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed light commands.
//!
//! Inbound bus messages are a method name plus a JSON value. This module
//! turns them into statically validated requests, one type per channel.
//! Parsing fails closed: a missing or mistyped field rejects the command
//! before anything touches the light state.
//!
//! # Available Commands
//!
//! | Channel | Command Type | Methods |
//! |---------|-------------|---------|
//! | `on-off` | [`OnOffCommand`] | `turnOn`, `turnOff`, `set` |
//! | `brightness` | [`BrightnessCommand`] | `set` |
//! | `color` | [`ColorCommand`] | `set` |
//! | `core.batching` | [`BatchCommand`] | `setBatch` |
//!
//! # Examples
//!
//! ```
//! use lifx_driver::Channel;
//! use lifx_driver::command::{LightCommand, OnOffCommand};
//! use serde_json::json;
//!
//! let cmd = LightCommand::parse(Channel::OnOff, "set", &json!([true])).unwrap();
//! assert_eq!(cmd, LightCommand::OnOff(OnOffCommand::Set(true)));
//! assert_eq!(cmd.channel(), Channel::OnOff);
//! ```

mod batch;
mod brightness;
mod color;
mod on_off;
mod payload;

pub use batch::BatchCommand;
pub use brightness::BrightnessCommand;
pub use color::ColorCommand;
pub use on_off::OnOffCommand;

use serde_json::Value;

use crate::channel::Channel;
use crate::error::ProtocolError;

/// A validated command for one light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LightCommand {
    /// `on-off` channel.
    OnOff(OnOffCommand),
    /// `brightness` channel.
    Brightness(BrightnessCommand),
    /// `color` channel.
    Color(ColorCommand),
    /// `core.batching` channel.
    Batch(BatchCommand),
}

impl LightCommand {
    /// Parses a method call addressed to `channel`.
    ///
    /// # Errors
    ///
    /// Returns the channel parser's error unchanged.
    pub fn parse(channel: Channel, method: &str, params: &Value) -> Result<Self, ProtocolError> {
        match channel {
            Channel::OnOff => OnOffCommand::parse(method, params).map(Self::OnOff),
            Channel::Brightness => BrightnessCommand::parse(method, params).map(Self::Brightness),
            Channel::Color => ColorCommand::parse(method, params).map(Self::Color),
            Channel::Batching => BatchCommand::parse(method, params).map(Self::Batch),
        }
    }

    /// Returns the channel this command belongs to.
    #[must_use]
    pub const fn channel(&self) -> Channel {
        match self {
            Self::OnOff(_) => Channel::OnOff,
            Self::Brightness(_) => Channel::Brightness,
            Self::Color(_) => Channel::Color,
            Self::Batch(_) => Channel::Batching,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn dispatches_by_channel() {
        let params = json!([{ "mode": "xy", "x": 0.3, "y": 0.3 }]);
        let cmd = LightCommand::parse(Channel::Color, "set", &params).unwrap();
        assert!(matches!(cmd, LightCommand::Color(_)));
        assert_eq!(cmd.channel(), Channel::Color);
    }

    #[test]
    fn same_method_name_means_different_things_per_channel() {
        let on_off = LightCommand::parse(Channel::OnOff, "set", &json!([true]));
        let brightness = LightCommand::parse(Channel::Brightness, "set", &json!([true]));
        assert!(on_off.is_ok());
        assert!(brightness.is_err());
    }

    #[test]
    fn unknown_method_reports_channel() {
        let err = LightCommand::parse(Channel::Batching, "turnOn", &json!(null)).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnknownMethod { ref channel, .. } if channel == "core.batching"
        ));
    }
}
