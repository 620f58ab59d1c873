use crate::message::Message;

use std::sync::Arc;

/// Progress of the two way version exchange with a peer.
///
/// Both flags only ever move from `false` to `true` and stay there for the
/// rest of the session. Whether a connection in a given state may carry
/// normal traffic is the caller's decision; [Handshake::is_ready] is only the
/// predicate.
#[derive(Debug, Default)]
pub struct Handshake {
    version_sent: bool,
    version_ack: bool,
    version: Option<Arc<Message>>,
}

impl Handshake {
    pub fn new() -> Self {
        Handshake::default()
    }

    pub fn version_sent(&self) -> bool {
        self.version_sent
    }

    pub fn version_ack(&self) -> bool {
        self.version_ack
    }

    /// Records that our version announcement went out.
    pub fn mark_version_sent(&mut self) {
        self.version_sent = true;
    }

    /// Records that the peer acknowledged our version announcement.
    pub fn mark_version_ack(&mut self) {
        self.version_ack = true;
    }

    /// Stores the version announcement received from the peer. The first one
    /// wins; the payload is opaque here.
    pub fn set_version(&mut self, version: Arc<Message>) {
        if self.version.is_none() {
            self.version = Some(version);
        }
    }

    pub fn version(&self) -> Option<&Arc<Message>> {
        self.version.as_ref()
    }

    /// Both directions of the exchange are satisfied.
    pub fn is_ready(&self) -> bool {
        self.version_sent && self.version_ack
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use crate::message::MessageKind;

    use bytes::Bytes;

    #[actix_rt::test]
    async fn test_one_directional_transitions() {
        let mut handshake = Handshake::new();
        assert!(!handshake.version_sent());
        assert!(!handshake.version_ack());
        assert!(!handshake.is_ready());

        handshake.mark_version_sent();
        assert!(handshake.version_sent());
        assert!(!handshake.is_ready());

        handshake.mark_version_ack();
        assert!(handshake.is_ready());

        // marking again is idempotent and nothing resets
        handshake.mark_version_sent();
        handshake.mark_version_ack();
        assert!(handshake.version_sent());
        assert!(handshake.version_ack());
        assert!(handshake.is_ready());
    }

    #[actix_rt::test]
    async fn test_first_version_wins() {
        let mut handshake = Handshake::new();
        let first = Arc::new(Message::new(MessageKind::Version, Bytes::from_static(b"a")));
        let second = Arc::new(Message::new(MessageKind::Version, Bytes::from_static(b"b")));
        handshake.set_version(first.clone());
        handshake.set_version(second);
        assert_eq!(handshake.version().unwrap().bytes, first.bytes);
    }
}
