pub mod constants;
pub mod prelude;

// the address book supplies a `PeerMetadata` per connection worthy address
pub mod peer_meta;
// handles into the reactor which owns the sockets (opaque here)
pub mod reactor;

// bounded FIFO of messages awaiting transmission to one peer
pub mod send_queue;
// reassembles one inbound message at a time from stream fragments
pub mod assembler;
// tracks the two way version exchange
pub mod handshake;
// accumulates transfer totals for ranking peers
pub mod meter;

// `Peer` composes the above around a `PeerMetadata`; the reactor's event
// handler for the connection is the sole writer.
pub mod peer;

pub use assembler::{Assembler, AssemblerState};
pub use handshake::Handshake;
pub use meter::TransferMeter;
pub use peer::Peer;
pub use peer_meta::{PeerMetadata, Services};
pub use reactor::{EventHandle, SocketHandle};
pub use send_queue::SendQueue;
