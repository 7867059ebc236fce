// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Task that owns a [`Light`] and serializes its commands.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::bus::{Actuation, ActuationHandler};
use crate::channel::Channel;
use crate::command::LightCommand;
use crate::device::DeviceClient;
use crate::error::{Error, TransportError};
use crate::state::LightState;

use super::Light;

/// A message for a light's task.
#[derive(Debug)]
pub enum LightMessage {
    /// A validated channel command.
    Command(LightCommand),
    /// Open a batch.
    StartBatch,
    /// Close the batch and emit.
    EndBatch,
    /// Reply with the current desired state.
    State(oneshot::Sender<LightState>),
}

/// Creates the two ends of a light's command queue.
///
/// The handle exists before the [`Light`] so that it can be wired into
/// channel announcements whose publish handles the light needs.
#[must_use]
pub fn mailbox(device_id: impl Into<String>, capacity: usize) -> (LightHandle, LightInbox) {
    let device_id: Arc<str> = device_id.into().into();
    let (sender, receiver) = mpsc::channel(capacity.max(1));
    (
        LightHandle {
            device_id: Arc::clone(&device_id),
            sender,
        },
        LightInbox {
            device_id,
            receiver,
        },
    )
}

/// Sending side of a light's command queue.
///
/// Cheap to clone. Commands are validated before they are queued, so a
/// malformed call never reaches the light.
#[derive(Debug, Clone)]
pub struct LightHandle {
    device_id: Arc<str>,
    sender: mpsc::Sender<LightMessage>,
}

impl LightHandle {
    /// Returns the device identifier.
    #[must_use]
    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Queues a command, waiting for room.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if the light's task is gone.
    pub async fn send(&self, command: LightCommand) -> Result<(), TransportError> {
        self.enqueue(LightMessage::Command(command)).await
    }

    /// Opens a batch on the light.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if the light's task is gone.
    pub async fn start_batch(&self) -> Result<(), TransportError> {
        self.enqueue(LightMessage::StartBatch).await
    }

    /// Closes the batch on the light.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if the light's task is gone.
    pub async fn end_batch(&self) -> Result<(), TransportError> {
        self.enqueue(LightMessage::EndBatch).await
    }

    /// Returns the desired state once every earlier message is handled.
    ///
    /// # Errors
    ///
    /// Returns `TransportError::ChannelClosed` if the light's task is gone.
    pub async fn state(&self) -> Result<LightState, TransportError> {
        let (tx, rx) = oneshot::channel();
        self.enqueue(LightMessage::State(tx)).await?;
        rx.await.map_err(|_| self.closed())
    }

    /// Parses a method call and queues it without waiting.
    ///
    /// # Errors
    ///
    /// Returns `Error::Protocol` for a malformed call, or a transport error
    /// if the queue is full or the light's task is gone.
    pub fn dispatch(&self, channel: Channel, actuation: &Actuation) -> Result<(), Error> {
        let command = LightCommand::parse(channel, &actuation.method, &actuation.params)?;
        self.sender
            .try_send(LightMessage::Command(command))
            .map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => {
                    TransportError::QueueFull(self.device_id.to_string())
                }
                mpsc::error::TrySendError::Closed(_) => self.closed(),
            })?;
        Ok(())
    }

    /// Builds the bus handler for one of this light's channels.
    #[must_use]
    pub fn handler(&self, channel: Channel) -> ActuationHandler {
        let handle = self.clone();
        Arc::new(move |actuation: Actuation| {
            tracing::info!(
                device = %handle.device_id,
                %channel,
                method = %actuation.method,
                "Received actuation"
            );
            match handle.dispatch(channel, &actuation) {
                Ok(()) => {}
                Err(Error::Protocol(e)) => tracing::error!(
                    device = %handle.device_id,
                    %channel,
                    method = %actuation.method,
                    error = %e,
                    "Dropping invalid command"
                ),
                Err(e) => tracing::warn!(
                    device = %handle.device_id,
                    %channel,
                    error = %e,
                    "Dropping command"
                ),
            }
        })
    }

    async fn enqueue(&self, message: LightMessage) -> Result<(), TransportError> {
        self.sender.send(message).await.map_err(|_| self.closed())
    }

    fn closed(&self) -> TransportError {
        TransportError::ChannelClosed(format!("light {}", self.device_id))
    }
}

/// Receiving side of a light's command queue.
#[derive(Debug)]
pub struct LightInbox {
    device_id: Arc<str>,
    receiver: mpsc::Receiver<LightMessage>,
}

impl LightInbox {
    /// Handles messages until every [`LightHandle`] is dropped.
    pub async fn run<D: DeviceClient>(mut self, mut light: Light<D>) {
        tracing::debug!(device = %self.device_id, "Light task started");
        while let Some(message) = self.receiver.recv().await {
            match message {
                LightMessage::Command(command) => light.handle(command).await,
                LightMessage::StartBatch => light.start_batch(),
                LightMessage::EndBatch => light.end_batch(),
                LightMessage::State(reply) => {
                    let _ = reply.send(light.state().clone());
                }
            }
        }
        tracing::debug!(device = %self.device_id, "Light task stopped");
    }

    /// Runs the light on a new task.
    pub fn spawn<D: DeviceClient>(self, light: Light<D>) -> JoinHandle<()> {
        tokio::spawn(self.run(light))
    }
}
