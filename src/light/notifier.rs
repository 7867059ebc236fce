// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Publishing of state events.

use std::collections::HashMap;

use crate::bus::ChannelBus;
use crate::channel::{Channel, STATE_EVENT};
use crate::state::StateSnapshot;

/// The announced channels of one light.
#[derive(Debug, Clone, Default)]
pub struct Notifier {
    buses: HashMap<Channel, ChannelBus>,
}

impl Notifier {
    /// Collects the publish handles returned by channel announcement.
    #[must_use]
    pub fn new(buses: impl IntoIterator<Item = ChannelBus>) -> Self {
        Self {
            buses: buses
                .into_iter()
                .map(|bus| (bus.channel(), bus))
                .collect(),
        }
    }

    /// Publishes a `state` event on `channel`.
    ///
    /// Publish failures are logged; the state itself is unaffected.
    pub fn emit(&self, channel: Channel, snapshot: &StateSnapshot) {
        let Some(bus) = self.buses.get(&channel) else {
            tracing::warn!(%channel, "Channel not announced, dropping state event");
            return;
        };

        tracing::debug!(
            device = %bus.device_id(),
            %channel,
            state = ?snapshot,
            "Emitting state"
        );
        if let Err(e) = bus.send_event(STATE_EVENT, &snapshot.to_json()) {
            tracing::warn!(
                device = %bus.device_id(),
                %channel,
                error = %e,
                "Failed to publish state event"
            );
        }
    }
}
