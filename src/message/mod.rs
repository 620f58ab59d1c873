//! Wire message tags and queued message payloads.
//!
//! The encoder / decoder for message contents lives outside this crate. What
//! is kept here is the minimum the connection state needs: a type tag which can
//! be checked against a peer's accepted set, and an opaque payload which can be
//! queued for sending to one or more peers.
mod kind;
mod message;

pub use kind::MessageKind;
pub use message::Message;
