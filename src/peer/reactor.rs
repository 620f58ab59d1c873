//! Opaque handles into the external reactor.
//!
//! The reactor owns the sockets and the readiness events behind these handles.
//! This crate stores them so the driver loop can find the right connection
//! when an event fires, and compares them for equality, nothing more. Dropping
//! a [Peer][super::peer::Peer] must not close the socket; deregistering and
//! closing is the reactor's job.

/// A socket owned by the reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SocketHandle(pub u64);

/// A readiness event registered with the reactor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EventHandle(pub u64);
