use super::assembler::Assembler;
use super::handshake::Handshake;
use super::meter::TransferMeter;
use super::prelude::*;
use super::reactor::{EventHandle, SocketHandle};
use super::send_queue::SendQueue;

use bytes::Bytes;

use std::any::Any;
use std::collections::HashSet;
use std::time::Instant;

/// The connection state for one peer.
///
/// A `Peer` owns the [PeerMetadata] it was created from and composes the send
/// queue, the inbound assembler, the handshake tracker and the transfer meter
/// around it. All mutation goes through the reactor driven event handler for
/// this connection; nothing here blocks, waiting happens at the reactor.
///
/// The socket and event handles are stored for the driver loop's benefit and
/// are never closed when the `Peer` is dropped.
pub struct Peer {
    meta: PeerMetadata,
    /// Handles into the reactor, assigned once the reactor registers them.
    pub socket: Option<SocketHandle>,
    pub recv_event: Option<EventHandle>,
    pub send_event: Option<EventHandle>,
    pub connect_event: Option<EventHandle>,
    send_queue: SendQueue,
    /// Bytes of the front message written so far; survives partial writes.
    message_sent: u32,
    /// Whether the front message's header has gone out.
    header_sent: bool,
    assembler: Assembler,
    /// When receiving the current message began.
    receive_start: Option<Instant>,
    handshake: Handshake,
    meter: TransferMeter,
    /// Outstanding pings awaiting a response.
    pings_sent: u16,
    accepted: HashSet<MessageKind>,
    /// Estimated offset of the peers clock from ours, in seconds.
    pub time_offset: i64,
    /// Whether we asked this peer for addresses.
    pub sent_get_addresses: bool,
    extension: Option<Box<dyn Any + Send>>,
}

impl Peer {
    /// Creates the connection state for a fresh session, taking ownership of
    /// the peers address. The queue is empty, the assembler awaits a header,
    /// the counters are zeroed, the accepted set is empty and no handshake
    /// progress has been made. Fails with `AllocationFailure` without leaking
    /// a partially constructed connection.
    pub fn from_meta(meta: PeerMetadata) -> Result<Self> {
        let send_queue = SendQueue::new(SEND_QUEUE_MAX)?;
        Ok(Peer {
            meta,
            socket: None,
            recv_event: None,
            send_event: None,
            connect_event: None,
            send_queue,
            message_sent: 0,
            header_sent: false,
            assembler: Assembler::new(),
            receive_start: None,
            handshake: Handshake::new(),
            meter: TransferMeter::new(),
            pings_sent: 0,
            accepted: HashSet::new(),
            time_offset: 0,
            sent_get_addresses: false,
            extension: None,
        })
    }

    pub fn meta(&self) -> &PeerMetadata {
        &self.meta
    }

    // Sending

    /// Queues a message for transmission. Messages go out in queue order.
    pub fn queue_send(&mut self, message: Arc<Message>) -> Result<()> {
        match self.send_queue.push(message) {
            Ok(()) => {
                debug!("[{}] queued message {}", self.meta.ip, self.send_queue.len());
                Ok(())
            }
            Err(err) => {
                warn!("[{}] send queue full", self.meta.ip);
                Err(err)
            }
        }
    }

    /// The message the next writability event should (continue to) write.
    pub fn next_send(&self) -> Result<&Arc<Message>> {
        self.send_queue.front()
    }

    /// Records that `bytes` more of the front message went out.
    pub fn advance_send(&mut self, bytes: u32) {
        self.message_sent += bytes;
    }

    /// Records that the front message's header went out in full.
    pub fn mark_header_sent(&mut self) {
        self.header_sent = true;
    }

    pub fn header_sent(&self) -> bool {
        self.header_sent
    }

    pub fn message_sent(&self) -> u32 {
        self.message_sent
    }

    /// Removes the front message once fully written and resets the write
    /// progress for the next one.
    pub fn complete_send(&mut self) -> Result<Arc<Message>> {
        let message = self.send_queue.pop()?;
        debug!("[{}] sent {}", self.meta.ip, message.kind);
        self.message_sent = 0;
        self.header_sent = false;
        Ok(message)
    }

    pub fn send_queue_len(&self) -> usize {
        self.send_queue.len()
    }

    pub fn has_pending_sends(&self) -> bool {
        !self.send_queue.is_empty()
    }

    // Receiving

    /// Feeds bytes read from the stream into the assembler, stamping the
    /// receive start time when a new message begins. Returns how many bytes
    /// were consumed; the caller re-feeds any remainder once the completed
    /// message has been taken.
    pub fn recv_bytes(&mut self, bytes: &[u8]) -> Result<usize> {
        if self.receive_start.is_none() && !bytes.is_empty() {
            self.receive_start = Some(Instant::now());
        }
        match self.assembler.feed(bytes) {
            Ok(consumed) => Ok(consumed),
            Err(err) => {
                warn!("[{}] malformed header", self.meta.ip);
                Err(err)
            }
        }
    }

    pub fn recv_complete(&self) -> bool {
        self.assembler.is_complete()
    }

    /// Hands out the completed message for the external decoder, charging its
    /// bytes and elapsed receive time to the meter. `Ok(None)` when no message
    /// is complete yet.
    ///
    /// Fails with `ProtocolTypeRejected` when the message's kind is not in
    /// the accepted set; the caller is expected to drop the connection.
    pub fn take_message(&mut self) -> Result<Option<(MessageKind, Bytes)>> {
        if !self.assembler.is_complete() {
            return Ok(None);
        }
        let bytes = match self.assembler.take() {
            Some(bytes) => bytes,
            None => return Ok(None),
        };
        let elapsed = match self.receive_start.take() {
            Some(start) => start.elapsed(),
            None => std::time::Duration::ZERO,
        };
        let command =
            &bytes[MESSAGE_COMMAND_OFFSET..MESSAGE_COMMAND_OFFSET + MESSAGE_COMMAND_SIZE];
        let kind = match MessageKind::from_command(command) {
            Some(kind) => kind,
            None => {
                warn!("[{}] rejected message with undefined command", self.meta.ip);
                return Err(Error::ProtocolTypeRejected);
            }
        };
        if !self.accepted.contains(&kind) {
            warn!("[{}] rejected unaccepted {}", self.meta.ip, kind);
            return Err(Error::ProtocolTypeRejected);
        }
        self.meter.record(bytes.len() as u64, elapsed);
        debug!("[{}] received {}", self.meta.ip, kind);
        Ok(Some((kind, bytes)))
    }

    /// Discards any partially assembled message.
    pub fn reset_recv(&mut self) {
        self.assembler.reset();
        self.receive_start = None;
    }

    // Accepted types

    /// Permits receiving `kind` from here on. Which kinds become acceptable
    /// after which handshake step is the caller's policy.
    pub fn accept(&mut self, kind: MessageKind) {
        self.accepted.insert(kind);
    }

    pub fn accepts(&self, kind: MessageKind) -> bool {
        self.accepted.contains(&kind)
    }

    // Handshake

    pub fn handshake(&self) -> &Handshake {
        &self.handshake
    }

    pub fn mark_version_sent(&mut self) {
        debug!("[{}] version sent", self.meta.ip);
        self.handshake.mark_version_sent();
    }

    pub fn mark_version_ack(&mut self) {
        debug!("[{}] version acknowledged", self.meta.ip);
        self.handshake.mark_version_ack();
    }

    pub fn set_version(&mut self, version: Arc<Message>) {
        self.handshake.set_version(version);
    }

    pub fn is_ready(&self) -> bool {
        self.handshake.is_ready()
    }

    // Pings

    /// Records an outgoing ping awaiting a response.
    pub fn ping_sent(&mut self) {
        self.pings_sent += 1;
    }

    /// Records a response to an outstanding ping.
    pub fn pong_received(&mut self) {
        if self.pings_sent == 0 {
            warn!("[{}] unsolicited pong", self.meta.ip);
            return;
        }
        self.pings_sent -= 1;
    }

    pub fn pings_outstanding(&self) -> u16 {
        self.pings_sent
    }

    // Ranking

    /// Charges a transfer performed outside the receive path, e.g. a write.
    pub fn record_transfer(&mut self, bytes: u64, time: std::time::Duration) {
        self.meter.record(bytes, time);
    }

    pub fn meter(&self) -> &TransferMeter {
        &self.meter
    }

    pub fn efficiency(&self) -> Option<f64> {
        self.meter.efficiency()
    }

    // Extension slot

    /// Attaches caller data to this connection. Opaque here.
    pub fn set_extension(&mut self, extension: Box<dyn Any + Send>) {
        self.extension = Some(extension);
    }

    pub fn extension(&self) -> Option<&(dyn Any + Send)> {
        self.extension.as_deref()
    }

    pub fn take_extension(&mut self) -> Option<Box<dyn Any + Send>> {
        self.extension.take()
    }
}

impl std::fmt::Debug for Peer {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Peer")
            .field("meta", &self.meta)
            .field("send_queue_len", &self.send_queue.len())
            .field("assembler", &self.assembler.state())
            .field("handshake", &self.handshake)
            .field("pings_sent", &self.pings_sent)
            .finish()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    use byteorder::{ByteOrder, LittleEndian};

    fn meta() -> PeerMetadata {
        PeerMetadata::new("127.0.0.1:1234".parse().unwrap(), Services::NETWORK, 0)
    }

    fn wire(kind: MessageKind, body: &[u8]) -> Vec<u8> {
        let mut bytes = vec![0u8; MESSAGE_HEADER_SIZE];
        let command = kind.command().as_bytes();
        bytes[MESSAGE_COMMAND_OFFSET..MESSAGE_COMMAND_OFFSET + command.len()]
            .copy_from_slice(command);
        LittleEndian::write_u32(
            &mut bytes[MESSAGE_LENGTH_OFFSET..MESSAGE_LENGTH_OFFSET + 4],
            body.len() as u32,
        );
        bytes.extend_from_slice(body);
        bytes
    }

    fn message(kind: MessageKind) -> Arc<Message> {
        Arc::new(Message::new(kind, bytes::Bytes::from_static(b"payload")))
    }

    #[actix_rt::test]
    async fn test_fresh_connection() {
        let peer = Peer::from_meta(meta()).unwrap();
        assert_eq!(peer.meta().ip, "127.0.0.1:1234".parse().unwrap());
        assert!(!peer.has_pending_sends());
        assert!(!peer.recv_complete());
        assert!(!peer.is_ready());
        assert_eq!(peer.efficiency(), None);
        assert_eq!(peer.pings_outstanding(), 0);
        assert!(!peer.accepts(MessageKind::Version));
        assert!(peer.socket.is_none());
    }

    #[actix_rt::test]
    async fn test_send_pipeline() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        for _ in 0..SEND_QUEUE_MAX {
            peer.queue_send(message(MessageKind::Ping)).unwrap();
        }
        assert!(matches!(
            peer.queue_send(message(MessageKind::Ping)),
            Err(Error::QueueFull)
        ));
        assert_eq!(peer.send_queue_len(), SEND_QUEUE_MAX);

        // a partial write keeps its position across events
        assert_eq!(peer.next_send().unwrap().kind, MessageKind::Ping);
        peer.mark_header_sent();
        peer.advance_send(3);
        assert_eq!(peer.message_sent(), 3);
        assert!(peer.header_sent());
        peer.advance_send(4);
        let sent = peer.complete_send().unwrap();
        assert_eq!(sent.kind, MessageKind::Ping);
        assert_eq!(peer.message_sent(), 0);
        assert!(!peer.header_sent());
        assert_eq!(peer.send_queue_len(), SEND_QUEUE_MAX - 1);
    }

    #[actix_rt::test]
    async fn test_receive_accepted_message() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        peer.accept(MessageKind::Version);
        let bytes = wire(MessageKind::Version, &[1u8; 32]);
        assert_eq!(peer.recv_bytes(&bytes).unwrap(), bytes.len());
        assert!(peer.recv_complete());
        let (kind, taken) = peer.take_message().unwrap().unwrap();
        assert_eq!(kind, MessageKind::Version);
        assert_eq!(taken, &bytes[..]);
        assert_eq!(peer.meter().bytes_transferred(), bytes.len() as u64);
        // ready for the next message
        assert!(!peer.recv_complete());
        assert_eq!(peer.take_message().unwrap(), None);
    }

    #[actix_rt::test]
    async fn test_unaccepted_type_rejected() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        peer.accept(MessageKind::Version);
        let bytes = wire(MessageKind::Ping, &[]);
        assert_eq!(peer.recv_bytes(&bytes).unwrap(), bytes.len());
        assert!(matches!(peer.take_message(), Err(Error::ProtocolTypeRejected)));
        // nothing was charged to the meter for the rejected message
        assert_eq!(peer.meter().bytes_transferred(), 0);
    }

    #[actix_rt::test]
    async fn test_handshake_progress() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        peer.mark_version_sent();
        assert!(!peer.is_ready());
        peer.set_version(message(MessageKind::Version));
        peer.mark_version_ack();
        assert!(peer.is_ready());
        assert!(peer.handshake().version().is_some());
    }

    #[actix_rt::test]
    async fn test_ping_accounting() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        peer.ping_sent();
        peer.ping_sent();
        assert_eq!(peer.pings_outstanding(), 2);
        peer.pong_received();
        assert_eq!(peer.pings_outstanding(), 1);
        peer.pong_received();
        peer.pong_received();
        assert_eq!(peer.pings_outstanding(), 0);
    }

    #[actix_rt::test]
    async fn test_broadcast_shares_one_message() {
        let broadcast = message(MessageKind::Inv);
        let mut peer1 = Peer::from_meta(meta()).unwrap();
        let mut peer2 =
            Peer::from_meta(PeerMetadata::new("127.0.0.1:1235".parse().unwrap(), Services::NONE, 0))
                .unwrap();
        peer1.queue_send(broadcast.clone()).unwrap();
        peer2.queue_send(broadcast.clone()).unwrap();
        assert_eq!(Arc::strong_count(&broadcast), 3);
        drop(peer1);
        drop(peer2);
        assert_eq!(Arc::strong_count(&broadcast), 1);
    }

    #[actix_rt::test]
    async fn test_extension_slot() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        assert!(peer.extension().is_none());
        peer.set_extension(Box::new(42u32));
        let value = peer.extension().unwrap().downcast_ref::<u32>().unwrap();
        assert_eq!(*value, 42);
        let boxed = peer.take_extension().unwrap();
        assert_eq!(*boxed.downcast::<u32>().unwrap(), 42);
        assert!(peer.extension().is_none());
    }

    #[actix_rt::test]
    async fn test_reset_recv_discards_partial() {
        let mut peer = Peer::from_meta(meta()).unwrap();
        let bytes = wire(MessageKind::Addr, &[7u8; 20]);
        assert_eq!(peer.recv_bytes(&bytes[..10]).unwrap(), 10);
        peer.reset_recv();
        assert!(!peer.recv_complete());
        peer.accept(MessageKind::Addr);
        assert_eq!(peer.recv_bytes(&bytes).unwrap(), bytes.len());
        let (kind, _) = peer.take_message().unwrap().unwrap();
        assert_eq!(kind, MessageKind::Addr);
    }
}
