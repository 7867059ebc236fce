// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Power channel commands.

use serde_json::Value;

use crate::channel::Channel;
use crate::error::ProtocolError;

use super::payload::Payload;

/// Command received on the `on-off` channel.
///
/// # Examples
///
/// ```
/// use lifx_driver::command::OnOffCommand;
/// use serde_json::json;
///
/// let cmd = OnOffCommand::parse("set", &json!([true])).unwrap();
/// assert_eq!(cmd, OnOffCommand::Set(true));
/// assert!(cmd.target());
///
/// let cmd = OnOffCommand::parse("turnOff", &json!(null)).unwrap();
/// assert_eq!(cmd, OnOffCommand::TurnOff);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnOffCommand {
    /// Switch the light on.
    TurnOn,
    /// Refresh from the device, then switch the light off.
    TurnOff,
    /// Switch to the given power state.
    Set(bool),
}

impl OnOffCommand {
    /// Parses a method call on the `on-off` channel.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::UnknownMethod` for unrecognised methods and a
    /// field error when `set` is not given a boolean.
    pub fn parse(method: &str, params: &Value) -> Result<Self, ProtocolError> {
        match method {
            "turnOn" => Ok(Self::TurnOn),
            "turnOff" => Ok(Self::TurnOff),
            "set" => Payload::new(params)
                .first_argument()?
                .as_bool("on-off")
                .map(Self::Set),
            _ => Err(ProtocolError::UnknownMethod {
                channel: Channel::OnOff.id().to_string(),
                method: method.to_string(),
            }),
        }
    }

    /// Returns the power state this command asks for.
    #[must_use]
    pub const fn target(&self) -> bool {
        match self {
            Self::TurnOn => true,
            Self::TurnOff => false,
            Self::Set(on) => *on,
        }
    }

    /// Returns `true` if the device state must be refreshed first.
    ///
    /// Only the explicit `turnOff` method refreshes.
    #[must_use]
    pub const fn refreshes_first(&self) -> bool {
        matches!(self, Self::TurnOff)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn turn_on_ignores_params() {
        assert_eq!(
            OnOffCommand::parse("turnOn", &json!([1, 2])).unwrap(),
            OnOffCommand::TurnOn
        );
    }

    #[test]
    fn set_accepts_bare_bool() {
        assert_eq!(
            OnOffCommand::parse("set", &json!(false)).unwrap(),
            OnOffCommand::Set(false)
        );
    }

    #[test]
    fn set_rejects_non_bool() {
        let err = OnOffCommand::parse("set", &json!([1])).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidField { .. }));
    }

    #[test]
    fn set_rejects_empty_params() {
        let err = OnOffCommand::parse("set", &json!([])).unwrap_err();
        assert!(matches!(err, ProtocolError::MissingField(_)));
    }

    #[test]
    fn unknown_method() {
        let err = OnOffCommand::parse("toggle", &json!(null)).unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::UnknownMethod { ref channel, ref method }
                if channel == "on-off" && method == "toggle"
        ));
    }

    #[test]
    fn refresh_only_before_turn_off() {
        assert!(OnOffCommand::TurnOff.refreshes_first());
        assert!(!OnOffCommand::TurnOn.refreshes_first());
        assert!(!OnOffCommand::Set(false).refreshes_first());
    }
}
