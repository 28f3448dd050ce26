//! Outbound queue for relayed (`RT`) commands.
//!
//! The radio link is not simulated; relayed commands wait here until the
//! session hands them out with the output of the serial event that queued
//! them.

use std::collections::VecDeque;

use rfmodem_at::{Destination, Relay};

/// Commands held before the oldest is dropped.
pub const RELAY_QUEUE_DEPTH: usize = 32;

/// A command addressed to another node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelayedCommand {
    pub destination: Destination,
    pub command: String,
}

#[derive(Debug, Clone, Default)]
pub struct RelayQueue {
    queue: VecDeque<RelayedCommand>,
}

impl RelayQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Take every queued command, oldest first.
    pub fn drain(&mut self) -> Vec<RelayedCommand> {
        self.queue.drain(..).collect()
    }
}

impl Relay for RelayQueue {
    fn forward(&mut self, destination: Destination, command: &str) {
        tracing::info!(
            "relaying {:?} to {:#06x}",
            command,
            destination.address()
        );
        if self.queue.len() == RELAY_QUEUE_DEPTH {
            if let Some(dropped) = self.queue.pop_front() {
                tracing::warn!("relay queue full, dropping {:?}", dropped.command);
            }
        }
        self.queue.push_back(RelayedCommand {
            destination,
            command: command.to_string(),
        });
    }
}
