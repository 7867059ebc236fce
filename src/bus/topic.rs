// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic layout.
//!
//! ```text
//! $driver/<driver>/announce                         driver announcement
//! $device/<device>/announce                         device announcement
//! $device/<device>/channel/<channel>/announce       channel announcement
//! $device/<device>/channel/<channel>                inbound method calls
//! $device/<device>/channel/<channel>/event/<event>  outbound events
//! ```

use crate::channel::Channel;

/// Topic of a driver announcement.
#[must_use]
pub fn driver_announce(driver_id: &str) -> String {
    format!("$driver/{driver_id}/announce")
}

/// Topic of a device announcement.
#[must_use]
pub fn device_announce(device_id: &str) -> String {
    format!("$device/{device_id}/announce")
}

/// Topic a channel receives method calls on.
#[must_use]
pub fn channel(device_id: &str, channel: Channel) -> String {
    format!("$device/{device_id}/channel/{}", channel.id())
}

/// Topic of a channel announcement.
#[must_use]
pub fn channel_announce(device_id: &str, channel: Channel) -> String {
    format!("{}/announce", self::channel(device_id, channel))
}

/// Topic a channel publishes `event` on.
#[must_use]
pub fn channel_event(device_id: &str, channel: Channel, event: &str) -> String {
    format!("{}/event/{event}", self::channel(device_id, channel))
}

/// A parsed inbound method call topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommandTopic<'a> {
    /// Addressed device.
    pub device_id: &'a str,
    /// Addressed channel.
    pub channel: Channel,
}

impl<'a> CommandTopic<'a> {
    /// Parses `$device/<device>/channel/<channel>`.
    ///
    /// Returns `None` for any other topic, including announcements and
    /// events.
    #[must_use]
    pub fn parse(topic: &'a str) -> Option<Self> {
        let mut parts = topic.split('/');
        let (Some("$device"), Some(device_id), Some("channel"), Some(channel), None) = (
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
            parts.next(),
        ) else {
            return None;
        };
        if device_id.is_empty() {
            return None;
        }
        Some(Self {
            device_id,
            channel: channel.parse().ok()?,
        })
    }
}
