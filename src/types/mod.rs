// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for light control.
//!
//! Each type checks its range at construction time, so a value that made it
//! into [`LightState`](crate::state::LightState) is always valid.
//!
//! # Types
//!
//! - [`Level`] - Native 16-bit intensity (brightness, hue, saturation)
//! - [`Transition`] - Transition time in whole seconds
//! - [`Mireds`] - Color temperature derived from Kelvin
//! - [`Xy`] - Chromaticity coordinates
//! - [`ColorSetting`] - One of the three color representations

mod color;
mod level;
mod transition;

pub use color::{ColorSetting, Mireds, Xy};
pub use level::Level;
pub use transition::Transition;
