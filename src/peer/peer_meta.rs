use std::net::SocketAddr;

/// Service bits a peer advertises.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Services(pub u64);

impl Services {
    pub const NONE: Services = Services(0);
    /// The peer serves the full network.
    pub const NETWORK: Services = Services(1);

    pub fn contains(&self, other: Services) -> bool {
        self.0 & other.0 == other.0
    }
}

/// The network address of a peer.
///
/// Constructed by the address book and moved into a [Peer][super::peer::Peer]
/// for the lifetime of a connection attempt; it does not change once the
/// connection exists.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PeerMetadata {
    /// The peers ip address.
    pub ip: SocketAddr,
    /// The services the peer advertised.
    pub services: Services,
    /// Unix time the peer was last seen, as reported by the address book.
    pub last_seen: u64,
}

impl PeerMetadata {
    pub fn new(ip: SocketAddr, services: Services, last_seen: u64) -> Self {
        PeerMetadata { ip, services, last_seen }
    }
}
