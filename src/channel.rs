// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Channels a light exposes on the bus.

use std::fmt;
use std::str::FromStr;

use crate::error::ProtocolError;

/// Name of the only event a channel emits.
pub const STATE_EVENT: &str = "state";

/// A named sub-interface of a light.
///
/// # Examples
///
/// ```
/// use lifx_driver::Channel;
///
/// let channel: Channel = "core.batching".parse().unwrap();
/// assert_eq!(channel, Channel::Batching);
/// assert_eq!(channel.methods(), &["setBatch"]);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Power control.
    OnOff,
    /// Brightness control.
    Brightness,
    /// Color control.
    Color,
    /// Multi-attribute batched updates.
    Batching,
}

impl Channel {
    /// Every channel, in announcement order.
    pub const ALL: [Self; 4] = [Self::OnOff, Self::Brightness, Self::Color, Self::Batching];

    /// Returns the channel identifier used on the bus.
    #[must_use]
    pub const fn id(&self) -> &'static str {
        match self {
            Self::OnOff => "on-off",
            Self::Brightness => "brightness",
            Self::Color => "color",
            Self::Batching => "core.batching",
        }
    }

    /// Returns the capability identifier. Same as the channel id.
    #[must_use]
    pub const fn protocol(&self) -> &'static str {
        self.id()
    }

    /// Returns the method names this channel accepts.
    #[must_use]
    pub const fn methods(&self) -> &'static [&'static str] {
        match self {
            Self::OnOff => &["turnOn", "turnOff", "set"],
            Self::Brightness | Self::Color => &["set"],
            Self::Batching => &["setBatch"],
        }
    }

    /// Returns the event names this channel emits.
    #[must_use]
    pub const fn events(&self) -> &'static [&'static str] {
        &[STATE_EVENT]
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Channel {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|channel| channel.id() == s)
            .ok_or_else(|| ProtocolError::UnknownChannel(s.to_string()))
    }
}
