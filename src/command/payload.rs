// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Typed access to JSON command parameters.
//!
//! Every accessor fails closed: a field of the wrong type is an error, it is
//! never read as zero or `false`.

use serde_json::Value;

use crate::error::ProtocolError;

/// A borrowed view over command parameters.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Payload<'a>(&'a Value);

impl<'a> Payload<'a> {
    pub(crate) fn new(value: &'a Value) -> Self {
        Self(value)
    }

    /// Unwraps a positional parameter list to its first element.
    ///
    /// Non-array values are taken as the argument itself.
    pub(crate) fn first_argument(self) -> Result<Self, ProtocolError> {
        match self.0 {
            Value::Array(items) => items
                .first()
                .map(Self)
                .ok_or_else(|| ProtocolError::MissingField("params[0]".to_string())),
            other => Ok(Self(other)),
        }
    }

    pub(crate) fn as_bool(self, name: &str) -> Result<bool, ProtocolError> {
        self.0.as_bool().ok_or_else(|| invalid(name, "a boolean"))
    }

    pub(crate) fn as_f64(self, name: &str) -> Result<f64, ProtocolError> {
        self.0.as_f64().ok_or_else(|| invalid(name, "a number"))
    }

    pub(crate) fn as_u64(self, name: &str) -> Result<u64, ProtocolError> {
        self.0
            .as_u64()
            .ok_or_else(|| invalid(name, "a non-negative integer"))
    }

    pub(crate) fn as_str(self, name: &str) -> Result<&'a str, ProtocolError> {
        self.0.as_str().ok_or_else(|| invalid(name, "a string"))
    }

    /// Looks up a named field. `null` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::InvalidField` if the payload is not an object.
    pub(crate) fn field(self, name: &str) -> Result<Option<Self>, ProtocolError> {
        let object = self
            .0
            .as_object()
            .ok_or_else(|| invalid("payload", "an object"))?;
        Ok(object.get(name).filter(|v| !v.is_null()).map(Self))
    }

    pub(crate) fn require(self, name: &str) -> Result<Self, ProtocolError> {
        self.field(name)?
            .ok_or_else(|| ProtocolError::MissingField(name.to_string()))
    }

    pub(crate) fn require_f64(self, name: &str) -> Result<f64, ProtocolError> {
        self.require(name)?.as_f64(name)
    }

    pub(crate) fn optional_f64(self, name: &str) -> Result<Option<f64>, ProtocolError> {
        self.field(name)?.map(|v| v.as_f64(name)).transpose()
    }

    pub(crate) fn optional_bool(self, name: &str) -> Result<Option<bool>, ProtocolError> {
        self.field(name)?.map(|v| v.as_bool(name)).transpose()
    }

    pub(crate) fn optional_u64(self, name: &str) -> Result<Option<u64>, ProtocolError> {
        self.field(name)?.map(|v| v.as_u64(name)).transpose()
    }
}

fn invalid(field: &str, expected: &'static str) -> ProtocolError {
    ProtocolError::InvalidField {
        field: field.to_string(),
        expected,
    }
}
