//! The queued message payload definition.
use super::kind::MessageKind;

use bytes::Bytes;

/// An already encoded message awaiting transmission.
///
/// The payload is opaque to this crate. Callers construct one from the codec's
/// output and share it behind an `Arc`, so the same message may sit in the
/// send queues of several peers at once without copying. Nothing in this crate
/// mutates a queued message in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub kind: MessageKind,
    pub bytes: Bytes,
}

impl Message {
    pub fn new(kind: MessageKind, bytes: Bytes) -> Self {
        Message { kind, bytes }
    }

    /// The number of bytes this message occupies on the wire.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
