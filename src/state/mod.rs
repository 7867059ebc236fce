// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Light state model.
//!
//! [`LightState`] is the canonical in-memory state of one light and
//! [`StateSnapshot`] is the body published on `state` events.
//!
//! # Examples
//!
//! ```
//! use lifx_driver::state::LightState;
//! use lifx_driver::types::{ColorSetting, Transition};
//!
//! let mut state = LightState::new();
//! state.apply_color(ColorSetting::hue_saturation(0.5, 1.0).unwrap());
//! state.apply_transition(Transition::from_millis(500).unwrap());
//!
//! let snapshot = state.serialize();
//! assert_eq!(snapshot.hue, Some(32768));
//! assert_eq!(snapshot.on, Some(true));
//! assert_eq!(snapshot.transition_time, Some(0));
//! ```

mod light_state;
mod snapshot;

pub use light_state::LightState;
pub use snapshot::StateSnapshot;
