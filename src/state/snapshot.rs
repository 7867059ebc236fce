// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Wire form of the light state.

use serde::{Deserialize, Serialize};

/// Body of a `state` event.
///
/// All seven keys are always present; an unset attribute is written as
/// `null`. Consumers must read `null` as "unknown", not as zero.
///
/// # Examples
///
/// ```
/// use lifx_driver::state::LightState;
///
/// let json = serde_json::to_value(LightState::new().serialize()).unwrap();
/// assert_eq!(
///     json,
///     serde_json::json!({
///         "on": false,
///         "bri": 0,
///         "sat": 0,
///         "hue": 0,
///         "ct": null,
///         "transitionTime": 0,
///         "xy": null,
///     })
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    /// Power state.
    pub on: Option<bool>,
    /// Brightness (0-65535).
    pub bri: Option<u16>,
    /// Saturation (0-65535).
    pub sat: Option<u16>,
    /// Hue (0-65535).
    pub hue: Option<u16>,
    /// Color temperature in mireds.
    pub ct: Option<u16>,
    /// Transition time in seconds.
    #[serde(rename = "transitionTime")]
    pub transition_time: Option<u16>,
    /// Chromaticity as `[x, y]`.
    pub xy: Option<[f64; 2]>,
}

impl StateSnapshot {
    /// Converts the snapshot to a JSON value for publishing.
    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        // Plain struct of options and numbers, serialization cannot fail
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unset_fields_serialize_as_null() {
        let json = StateSnapshot::default().to_json();
        let object = json.as_object().unwrap();
        assert_eq!(object.len(), 7);
        for key in ["on", "bri", "sat", "hue", "ct", "transitionTime", "xy"] {
            assert!(object[key].is_null(), "{key} should be null");
        }
    }

    #[test]
    fn null_round_trips_as_none() {
        let snapshot = StateSnapshot {
            on: Some(true),
            xy: Some([0.5, 0.25]),
            ..StateSnapshot::default()
        };
        let json = serde_json::to_string(&snapshot).unwrap();
        let decoded: StateSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, snapshot);
    }
}
