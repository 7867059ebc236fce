// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the driver.
//!
//! Errors fall into three groups with different propagation rules:
//!
//! - [`ProtocolError`] and [`ValueError`]: a command could not be parsed or
//!   validated. The command is logged and dropped; light state is untouched.
//! - [`ActuationError`]: the physical device could not be reached. The
//!   desired light state is kept and the failure is logged.
//! - [`TransportError`]: the bus could not be reached or a device/channel
//!   could not be announced. Fatal during startup.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// An inbound command could not be understood.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// The physical device could not be driven.
    #[error("actuation error: {0}")]
    Actuation(#[from] ActuationError),

    /// The bus transport failed.
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Device discovery failed.
    #[error("discovery failed: {0}")]
    Discovery(String),
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("{field} value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Name of the constrained value.
        field: &'static str,
        /// Minimum allowed value.
        min: f64,
        /// Maximum allowed value.
        max: f64,
        /// The actual value that was provided.
        actual: f64,
    },

    /// A value was NaN or infinite.
    #[error("{0} must be a finite number")]
    NotFinite(&'static str),
}

/// Errors raised while translating an inbound command.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The channel does not expose the requested method.
    #[error("channel {channel} has no method {method}")]
    UnknownMethod {
        /// Channel that received the command.
        channel: String,
        /// The method name that was sent.
        method: String,
    },

    /// The channel identifier is not one this driver announces.
    #[error("unknown channel: {0}")]
    UnknownChannel(String),

    /// A required payload field is absent.
    #[error("missing field in payload: {0}")]
    MissingField(String),

    /// A payload field is present but has the wrong type.
    #[error("field {field} must be {expected}")]
    InvalidField {
        /// The offending field.
        field: String,
        /// Human readable description of the expected type.
        expected: &'static str,
    },

    /// The `mode` of a color command is not recognised.
    #[error("unknown color mode: {0}")]
    UnknownColorMode(String),

    /// A field value failed validation.
    #[error(transparent)]
    Value(#[from] ValueError),

    /// The raw message is not valid JSON.
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors raised by the physical device adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ActuationError {
    /// The device did not answer.
    #[error("device unreachable: {0}")]
    Unreachable(String),

    /// The device call did not complete in time.
    #[error("actuation timed out after {0} ms")]
    Timeout(u64),

    /// The adapter does not implement this kind of actuation.
    #[error("{0} actuation is not supported")]
    Unsupported(&'static str),
}

/// Errors related to the bus transport.
#[derive(Debug, Error)]
pub enum TransportError {
    /// MQTT connection or communication failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the bus failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// A handler is already registered for this device channel.
    #[error("channel {channel} already announced for device {device}")]
    AlreadyAnnounced {
        /// Device identifier.
        device: String,
        /// Channel identifier.
        channel: String,
    },

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),

    /// The light's command queue is full.
    #[error("command queue full for device {0}")]
    QueueFull(String),

    /// An outbound payload could not be encoded.
    #[error("failed to encode payload: {0}")]
    Encode(#[from] serde_json::Error),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::OutOfRange {
            field: "brightness",
            min: 0.0,
            max: 1.0,
            actual: 1.5,
        };
        assert_eq!(err.to_string(), "brightness value 1.5 is out of range [0, 1]");
    }

    #[test]
    fn protocol_error_wraps_value_error_transparently() {
        let err: ProtocolError = ValueError::NotFinite("hue").into();
        assert_eq!(err.to_string(), "hue must be a finite number");
    }

    #[test]
    fn error_from_actuation_error() {
        let err: Error = ActuationError::Timeout(5000).into();
        assert!(matches!(err, Error::Actuation(ActuationError::Timeout(5000))));
    }

    #[test]
    fn unknown_method_display() {
        let err = ProtocolError::UnknownMethod {
            channel: "color".to_string(),
            method: "blink".to_string(),
        };
        assert_eq!(err.to_string(), "channel color has no method blink");
    }

    #[test]
    fn transport_error_display() {
        let err = TransportError::AlreadyAnnounced {
            device: "d073d5".to_string(),
            channel: "on-off".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "channel on-off already announced for device d073d5"
        );
    }
}
