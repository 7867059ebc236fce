// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Transition time type.
//!
//! Channels express transitions in milliseconds while the light works in
//! whole seconds. Conversion truncates: anything under a second becomes 0.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValueError;

/// Transition duration in whole seconds.
///
/// # Examples
///
/// ```
/// use lifx_driver::types::Transition;
///
/// assert_eq!(Transition::from_millis(2500).unwrap().seconds(), 2);
/// assert_eq!(Transition::from_millis(500).unwrap().seconds(), 0);
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Transition(u16);

impl Transition {
    /// No transition.
    pub const INSTANT: Self = Self(0);

    /// Creates a transition from a number of seconds.
    #[must_use]
    pub const fn from_seconds(seconds: u16) -> Self {
        Self(seconds)
    }

    /// Creates a transition from milliseconds, truncating to whole seconds.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if the number of seconds does not fit
    /// in 16 bits.
    #[allow(clippy::cast_precision_loss)]
    pub fn from_millis(millis: u64) -> Result<Self, ValueError> {
        let seconds = millis / 1000;
        u16::try_from(seconds)
            .map(Self)
            .map_err(|_| ValueError::OutOfRange {
                field: "transition",
                min: 0.0,
                max: f64::from(u16::MAX) * 1000.0,
                actual: millis as f64,
            })
    }

    /// Returns the duration in seconds.
    #[must_use]
    pub const fn seconds(&self) -> u16 {
        self.0
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sub_second_truncates_to_zero() {
        assert_eq!(Transition::from_millis(0).unwrap(), Transition::INSTANT);
        assert_eq!(Transition::from_millis(500).unwrap().seconds(), 0);
        assert_eq!(Transition::from_millis(999).unwrap().seconds(), 0);
    }

    #[test]
    fn whole_seconds_truncate() {
        assert_eq!(Transition::from_millis(1000).unwrap().seconds(), 1);
        assert_eq!(Transition::from_millis(2500).unwrap().seconds(), 2);
    }

    #[test]
    fn upper_bound() {
        assert_eq!(
            Transition::from_millis(65_535_999).unwrap().seconds(),
            u16::MAX
        );
        assert!(Transition::from_millis(65_536_000).is_err());
    }

    #[test]
    fn display() {
        assert_eq!(Transition::from_seconds(3).to_string(), "3s");
    }
}
