// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness channel commands.

use serde_json::Value;

use crate::channel::Channel;
use crate::error::ProtocolError;
use crate::types::Level;

use super::payload::Payload;

/// Command received on the `brightness` channel.
///
/// The channel value is a fraction in `[0, 1]`, mapped linearly onto the
/// native 0-65535 scale with rounding.
///
/// # Examples
///
/// ```
/// use lifx_driver::command::BrightnessCommand;
/// use lifx_driver::types::Level;
/// use serde_json::json;
///
/// let cmd = BrightnessCommand::parse("set", &json!([0.5])).unwrap();
/// assert_eq!(cmd, BrightnessCommand::Set(Level::new(32768)));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrightnessCommand {
    /// Set the brightness.
    Set(Level),
}

impl BrightnessCommand {
    /// Parses a method call on the `brightness` channel.
    ///
    /// # Errors
    ///
    /// Returns error for unknown methods, non-numeric values and fractions
    /// outside `[0, 1]`.
    pub fn parse(method: &str, params: &Value) -> Result<Self, ProtocolError> {
        match method {
            "set" => {
                let fraction = Payload::new(params)
                    .first_argument()?
                    .as_f64("brightness")?;
                Ok(Self::Set(Level::from_fraction("brightness", fraction)?))
            }
            _ => Err(ProtocolError::UnknownMethod {
                channel: Channel::Brightness.id().to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// Returns the requested level.
    #[must_use]
    pub const fn level(&self) -> Level {
        match self {
            Self::Set(level) => *level,
        }
    }
}
