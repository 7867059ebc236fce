// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The per-bulb controller.
//!
//! A [`Light`] owns the desired [`LightState`] of one bulb. Each handled
//! command mutates the state, actuates the device and emits one `state`
//! event on the channel that received it.
//!
//! # Batching
//!
//! While a batch is open, channel commands only mutate state: nothing is
//! actuated and nothing is emitted. Closing the batch emits a single event
//! on the `on-off` channel. `setBatch` opens a batch, applies every present
//! attribute, actuates once per attribute and closes the batch.
//!
//! Actuation failures are logged and never roll the state back.
//!
//! Lights are normally driven through a [`LightHandle`], which runs the
//! [`Light`] on its own task and serializes every command it receives.

mod actor;
mod notifier;

pub use actor::{LightHandle, LightInbox, LightMessage, mailbox};
pub use notifier::Notifier;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::channel::Channel;
use crate::command::{BatchCommand, ColorCommand, LightCommand, OnOffCommand};
use crate::device::{DeviceClient, with_deadline};
use crate::error::ActuationError;
use crate::state::LightState;
use crate::types::Level;

/// Controller for one bulb.
pub struct Light<D> {
    id: String,
    name: String,
    device: Arc<D>,
    state: LightState,
    batching: bool,
    notifier: Notifier,
    actuation_timeout: Duration,
}

impl<D: DeviceClient> Light<D> {
    /// Creates a light with the default state (off, zero brightness).
    #[must_use]
    pub fn new(
        device: Arc<D>,
        name: impl Into<String>,
        notifier: Notifier,
        actuation_timeout: Duration,
    ) -> Self {
        Self {
            id: device.id().to_string(),
            name: name.into(),
            device,
            state: LightState::new(),
            batching: false,
            notifier,
            actuation_timeout,
        }
    }

    /// Returns the device identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the desired state.
    #[must_use]
    pub fn state(&self) -> &LightState {
        &self.state
    }

    /// Returns `true` while a batch is open.
    #[must_use]
    pub fn is_batching(&self) -> bool {
        self.batching
    }

    /// Handles one command.
    pub async fn handle(&mut self, command: LightCommand) {
        match command {
            LightCommand::Batch(batch) => self.set_batch(batch).await,
            command if self.batching => {
                tracing::debug!(
                    device = %self.id,
                    channel = %command.channel(),
                    "Batch open, updating state only"
                );
                self.apply(command);
            }
            LightCommand::OnOff(cmd) => self.switch(cmd).await,
            LightCommand::Brightness(cmd) => self.set_brightness(cmd.level()).await,
            LightCommand::Color(cmd) => self.set_color(cmd).await,
        }
    }

    /// Opens a batch. Idempotent.
    pub fn start_batch(&mut self) {
        tracing::debug!(device = %self.id, "Starting batch");
        self.batching = true;
    }

    /// Closes the batch and emits the accumulated state on `on-off`.
    ///
    /// Emits even if no batch was open.
    pub fn end_batch(&mut self) {
        if !self.batching {
            tracing::debug!(device = %self.id, "Ending batch that was not open");
        }
        self.batching = false;
        self.emit(Channel::OnOff);
    }

    async fn switch(&mut self, cmd: OnOffCommand) {
        if cmd.refreshes_first() {
            self.refresh_state().await;
        }
        let on = cmd.target();
        self.state.apply_on_off(on);
        self.actuate_power(on).await;
        self.emit(Channel::OnOff);
    }

    async fn set_brightness(&mut self, level: Level) {
        self.state.apply_brightness(level);
        self.actuate_brightness().await;
        self.emit(Channel::Brightness);
    }

    async fn set_color(&mut self, cmd: ColorCommand) {
        self.refresh_state().await;
        self.apply_color(cmd);
        self.actuate_color().await;
        self.emit(Channel::Color);
    }

    async fn set_batch(&mut self, batch: BatchCommand) {
        tracing::debug!(device = %self.id, ?batch, "Applying batch");
        self.start_batch();

        if batch.color.is_some() {
            self.refresh_state().await;
        }
        self.apply_batch(&batch);

        if let Some(on) = batch.on_off {
            self.actuate_power(on).await;
        }
        if batch.brightness.is_some() {
            self.actuate_brightness().await;
        }
        if batch.color.is_some() {
            self.actuate_color().await;
        }

        self.end_batch();
    }

    fn apply(&mut self, command: LightCommand) {
        match command {
            LightCommand::OnOff(cmd) => self.state.apply_on_off(cmd.target()),
            LightCommand::Brightness(cmd) => self.state.apply_brightness(cmd.level()),
            LightCommand::Color(cmd) => self.apply_color(cmd),
            LightCommand::Batch(batch) => self.apply_batch(&batch),
        }
    }

    fn apply_color(&mut self, cmd: ColorCommand) {
        if let Some(transition) = cmd.transition {
            self.state.apply_transition(transition);
        }
        self.state.apply_color(cmd.setting);
    }

    // Color first: a hue color implies on, an explicit on-off wins.
    fn apply_batch(&mut self, batch: &BatchCommand) {
        if let Some(color) = batch.color {
            self.apply_color(color);
        }
        if let Some(level) = batch.brightness {
            self.state.apply_brightness(level);
        }
        if let Some(on) = batch.on_off {
            self.state.apply_on_off(on);
        }
        if let Some(transition) = batch.transition {
            self.state.apply_transition(transition);
        }
    }

    /// Reads the reported power state into the desired state.
    async fn refresh_state(&mut self) {
        let power = self.call("power query", self.device.power()).await;
        if let Some(Some(on)) = power {
            tracing::debug!(device = %self.id, on, "Refreshed power state");
            self.state.apply_on_off(on);
        }
    }

    async fn actuate_power(&self, on: bool) {
        if on {
            self.call("turn on", self.device.turn_on()).await;
        } else {
            self.call("turn off", self.device.turn_off()).await;
        }
    }

    async fn actuate_brightness(&self) {
        let Some(level) = self.state.brightness() else {
            return;
        };
        let transition = self.state.transition().unwrap_or_default();
        self.call("brightness", self.device.set_brightness(level, transition))
            .await;
    }

    async fn actuate_color(&self) {
        let Some(setting) = self.state.color() else {
            return;
        };
        let transition = self.state.transition().unwrap_or_default();
        self.call("color", self.device.set_color(setting, transition))
            .await;
    }

    /// Runs a device call under the actuation timeout and logs its failure.
    async fn call<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ActuationError>>,
    ) -> Option<T> {
        match with_deadline(self.actuation_timeout, call).await {
            Ok(value) => Some(value),
            Err(ActuationError::Unsupported(what)) => {
                tracing::debug!(device = %self.id, operation, what, "Actuation not supported");
                None
            }
            Err(e) => {
                tracing::warn!(device = %self.id, operation, error = %e, "Actuation failed");
                None
            }
        }
    }

    fn emit(&self, channel: Channel) {
        debug_assert!(!self.batching, "state emitted while a batch is open");
        self.notifier.emit(channel, &self.state.serialize());
    }
}

impl<D> std::fmt::Debug for Light<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Light")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("state", &self.state)
            .field("batching", &self.batching)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{Value, json};
    use tokio::sync::broadcast;

    use super::*;
    use crate::bus::{Actuation, BusEvent, MemoryBus, Transport};
    use crate::device::{DeviceCall, VirtualLight};
    use crate::types::{ColorSetting, Mireds, Transition};

    fn light(bulb: &VirtualLight) -> (Light<VirtualLight>, broadcast::Receiver<BusEvent>) {
        let bus = MemoryBus::new();
        let events = bus.subscribe();
        let notifier = Notifier::new(Channel::ALL.map(|channel| {
            bus.announce_channel(bulb.id(), channel, Arc::new(|_: Actuation| {}))
                .unwrap()
        }));
        let light = Light::new(
            Arc::new(bulb.clone()),
            "Test",
            notifier,
            Duration::from_secs(5),
        );
        (light, events)
    }

    fn command(channel: Channel, method: &str, params: Value) -> LightCommand {
        LightCommand::parse(channel, method, &params).unwrap()
    }

    fn drain(events: &mut broadcast::Receiver<BusEvent>) -> Vec<BusEvent> {
        std::iter::from_fn(|| events.try_recv().ok()).collect()
    }

    #[tokio::test]
    async fn turn_on_actuates_and_emits() {
        let bulb = VirtualLight::new("a");
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(Channel::OnOff, "turnOn", Value::Null))
            .await;

        assert_eq!(light.state().on(), Some(true));
        assert_eq!(bulb.calls(), vec![DeviceCall::TurnOn]);
        let emitted = drain(&mut events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].channel, Channel::OnOff);
        assert_eq!(emitted[0].body["on"], true);
    }

    #[tokio::test]
    async fn turn_off_refreshes_first() {
        let bulb = VirtualLight::new("a").with_power(true);
        let (mut light, _events) = light(&bulb);

        light
            .handle(command(Channel::OnOff, "turnOff", Value::Null))
            .await;

        assert_eq!(bulb.calls(), vec![DeviceCall::QueryPower, DeviceCall::TurnOff]);
        assert_eq!(light.state().on(), Some(false));
    }

    #[tokio::test]
    async fn brightness_uses_stored_transition() {
        let bulb = VirtualLight::new("a");
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(
                Channel::Color,
                "set",
                json!({"mode": "temperature", "temperature": 2700, "transition": 1500}),
            ))
            .await;
        bulb.clear_calls();
        light
            .handle(command(Channel::Brightness, "set", json!([0.5])))
            .await;

        assert_eq!(
            bulb.calls(),
            vec![DeviceCall::SetBrightness(Level::new(32768), Transition::from_seconds(1))]
        );
        let emitted = drain(&mut events);
        assert_eq!(emitted.last().unwrap().channel, Channel::Brightness);
        assert_eq!(emitted.last().unwrap().body["bri"], 32768);
    }

    #[tokio::test]
    async fn color_refreshes_then_emits_on_color() {
        let bulb = VirtualLight::new("a").with_power(false);
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(
                Channel::Color,
                "set",
                json!({"mode": "temperature", "temperature": 2700}),
            ))
            .await;

        assert_eq!(
            bulb.calls(),
            vec![
                DeviceCall::QueryPower,
                DeviceCall::SetColor(ColorSetting::Temperature(Mireds::new(370)), Transition::INSTANT)
            ]
        );
        let emitted = drain(&mut events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].channel, Channel::Color);
        assert_eq!(emitted[0].body["ct"], 370);
        assert_eq!(emitted[0].body["hue"], Value::Null);
    }

    #[tokio::test]
    async fn open_batch_suppresses_actuation_and_events() {
        let bulb = VirtualLight::new("a");
        let (mut light, mut events) = light(&bulb);

        light.start_batch();
        light
            .handle(command(Channel::OnOff, "turnOn", Value::Null))
            .await;
        light
            .handle(command(Channel::Brightness, "set", json!([1.0])))
            .await;

        assert!(bulb.calls().is_empty());
        assert!(drain(&mut events).is_empty());
        assert_eq!(light.state().on(), Some(true));
        assert_eq!(light.state().brightness(), Some(Level::MAX));

        light.end_batch();
        let emitted = drain(&mut events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].channel, Channel::OnOff);
        assert_eq!(emitted[0].body["bri"], 65535);
        assert!(!light.is_batching());
    }

    #[tokio::test]
    async fn end_batch_without_start_still_emits() {
        let bulb = VirtualLight::new("a");
        let (mut light, mut events) = light(&bulb);
        light.end_batch();
        assert_eq!(drain(&mut events).len(), 1);
    }

    #[tokio::test]
    async fn set_batch_emits_once_and_actuates_each_attribute() {
        let bulb = VirtualLight::new("a").with_power(false);
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(
                Channel::Batching,
                "setBatch",
                json!([{
                    "on-off": false,
                    "brightness": 0.25,
                    "color": {"hue": 0.5, "saturation": 1.0},
                    "transition": 2000
                }]),
            ))
            .await;

        let state = light.state();
        assert_eq!(state.on(), Some(false));
        assert_eq!(state.brightness(), Some(Level::new(16384)));
        assert_eq!(state.hue(), Some(Level::new(32768)));
        assert_eq!(state.transition(), Some(Transition::from_seconds(2)));

        let two = Transition::from_seconds(2);
        assert_eq!(
            bulb.calls(),
            vec![
                DeviceCall::QueryPower,
                DeviceCall::TurnOff,
                DeviceCall::SetBrightness(Level::new(16384), two),
                DeviceCall::SetColor(
                    ColorSetting::HueSaturation {
                        hue: Level::new(32768),
                        saturation: Level::MAX
                    },
                    two
                ),
            ]
        );

        let emitted = drain(&mut events);
        assert_eq!(emitted.len(), 1);
        assert_eq!(emitted[0].channel, Channel::OnOff);
        assert!(!light.is_batching());
    }

    #[tokio::test]
    async fn hue_implies_on_within_batch() {
        let bulb = VirtualLight::new("a");
        let (mut light, _events) = light(&bulb);

        light
            .handle(command(
                Channel::Batching,
                "setBatch",
                json!({"color": {"hue": 0.1, "saturation": 0.2}}),
            ))
            .await;

        assert_eq!(light.state().on(), Some(true));
        // No on-off attribute, so power is not actuated
        assert!(!bulb.calls().contains(&DeviceCall::TurnOn));
    }

    #[tokio::test]
    async fn failed_actuation_keeps_state() {
        let bulb = VirtualLight::new("a");
        bulb.set_reachable(false);
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(Channel::OnOff, "set", json!([true])))
            .await;

        assert_eq!(light.state().on(), Some(true));
        assert_eq!(drain(&mut events).len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_device_times_out() {
        let bulb = VirtualLight::new("a").with_latency(Duration::from_secs(60));
        let (mut light, mut events) = light(&bulb);

        light
            .handle(command(Channel::OnOff, "turnOn", Value::Null))
            .await;

        assert_eq!(light.state().on(), Some(true));
        assert_eq!(drain(&mut events).len(), 1);
        // The timed out call never reached the device
        assert!(bulb.calls().is_empty());
    }
}
