//! Single-slot message store between agents of one run

use super::types::{AgentId, Message};
use crate::error::{Error, Result};
use std::collections::HashMap;

/// A message together with the identity of its sender
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope<V> {
    pub sender: AgentId,
    pub message: Message<V>,
}

/// Pigeonhole store holding at most one pending envelope per recipient
///
/// Owned by a single engine, so nothing leaks between runs. A second send to
/// the same recipient before it reads replaces the unread envelope.
#[derive(Debug)]
pub struct Mailbox<V> {
    slots: HashMap<AgentId, Envelope<V>>,
}

impl<V> Default for Mailbox<V> {
    fn default() -> Self {
        Self {
            slots: HashMap::new(),
        }
    }
}

impl<V> Mailbox<V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `message` for `recipient`, returning the unread envelope it displaced
    pub fn send(
        &mut self,
        sender: AgentId,
        recipient: AgentId,
        message: Message<V>,
    ) -> Option<Envelope<V>> {
        self.slots.insert(recipient, Envelope { sender, message })
    }

    /// Take the pending envelope for `recipient`
    ///
    /// The protocol only reads when a message is due, so an empty slot is
    /// reported as [`Error::MailboxEmpty`].
    pub fn receive(&mut self, recipient: AgentId) -> Result<Envelope<V>> {
        self.slots
            .remove(&recipient)
            .ok_or(Error::MailboxEmpty(recipient))
    }

    pub fn has_pending(&self, recipient: AgentId) -> bool {
        self.slots.contains_key(&recipient)
    }

    pub fn pending(&self) -> usize {
        self.slots.len()
    }
}
