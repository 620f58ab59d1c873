//! Message type tags.

/// The type of a wire message, read out of the command field of its header.
///
/// A connection keeps a set of the kinds it is currently willing to receive
/// and drops peers which send anything else, so the tag is compared and
/// hashed but never interpreted further here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageKind {
    Version,
    VersionAck,
    Addr,
    GetAddr,
    Inv,
    GetData,
    Ping,
    Pong,
}

impl MessageKind {
    /// The command string for this kind as it appears on the wire.
    pub fn command(&self) -> &'static str {
        match self {
            MessageKind::Version => "version",
            MessageKind::VersionAck => "verack",
            MessageKind::Addr => "addr",
            MessageKind::GetAddr => "getaddr",
            MessageKind::Inv => "inv",
            MessageKind::GetData => "getdata",
            MessageKind::Ping => "ping",
            MessageKind::Pong => "pong",
        }
    }

    /// Parses a null padded command field. Returns `None` for commands this
    /// protocol does not define.
    pub fn from_command(command: &[u8]) -> Option<MessageKind> {
        let end = command.iter().position(|&b| b == 0u8).unwrap_or(command.len());
        match &command[..end] {
            b"version" => Some(MessageKind::Version),
            b"verack" => Some(MessageKind::VersionAck),
            b"addr" => Some(MessageKind::Addr),
            b"getaddr" => Some(MessageKind::GetAddr),
            b"inv" => Some(MessageKind::Inv),
            b"getdata" => Some(MessageKind::GetData),
            b"ping" => Some(MessageKind::Ping),
            b"pong" => Some(MessageKind::Pong),
            _ => None,
        }
    }
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.command())
    }
}
