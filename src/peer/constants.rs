// Queue settings

/// Maximum number of messages queued for sending to one peer.
pub const SEND_QUEUE_MAX: usize = 10;

// Wire settings

/// Size of a message header on the wire.
pub const MESSAGE_HEADER_SIZE: usize = 24;
/// Offset of the command field within the header.
pub const MESSAGE_COMMAND_OFFSET: usize = 4;
/// Length of the command field.
pub const MESSAGE_COMMAND_SIZE: usize = 12;
/// Offset of the little endian body length within the header.
pub const MESSAGE_LENGTH_OFFSET: usize = 16;
/// Largest body length a header may declare (32 MiB). Anything above this is
/// treated as a malformed header and the peer is dropped.
pub const MAX_BODY_SIZE: usize = 0x0200_0000;
