use crate::message::Message;
use crate::{Error, Result};

use std::sync::Arc;

/// A bounded FIFO of messages awaiting transmission to one peer.
///
/// Entries are shared references; a broadcast message may sit in the queues of
/// several peers at once. The queue is a ring over fixed storage so that
/// popping the front is O(1), with `front` wrapping modulo the capacity.
#[derive(Debug)]
pub struct SendQueue {
    slots: Vec<Option<Arc<Message>>>,
    front: usize,
    len: usize,
}

impl SendQueue {
    /// Creates an empty queue with room for `capacity` messages. Fails with
    /// `AllocationFailure` when the backing storage cannot be reserved.
    pub fn new(capacity: usize) -> Result<Self> {
        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity)?;
        slots.resize_with(capacity, || None);
        Ok(SendQueue { slots, front: 0, len: 0 })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Appends a message at the back. Fails with `QueueFull` at capacity,
    /// leaving the queued messages and their order untouched.
    pub fn push(&mut self, message: Arc<Message>) -> Result<()> {
        if self.is_full() {
            return Err(Error::QueueFull);
        }
        let back = (self.front + self.len) % self.slots.len();
        self.slots[back] = Some(message);
        self.len += 1;
        Ok(())
    }

    /// Fetches the front message without removing it, so a partial write can
    /// resume from the same message on the next writability event.
    pub fn front(&self) -> Result<&Arc<Message>> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        self.slots[self.front].as_ref().ok_or(Error::Empty)
    }

    /// Removes and returns the front message. Only called once the message
    /// has been written to the wire in full.
    pub fn pop(&mut self) -> Result<Arc<Message>> {
        if self.is_empty() {
            return Err(Error::Empty);
        }
        let message = self.slots[self.front].take().ok_or(Error::Empty)?;
        self.front = (self.front + 1) % self.slots.len();
        self.len -= 1;
        Ok(message)
    }
}
