#[macro_use]
extern crate serde_derive;

pub mod message;
pub mod peer;

#[derive(Debug)]
pub enum Error {
    /// The send queue for this peer is at capacity. Recoverable; the caller
    /// should back off or drop low priority messages.
    QueueFull,
    /// Pop or peek on an empty send queue.
    Empty,
    /// A received header declared a body larger than the configured maximum
    /// or could not be read. The connection should be dropped.
    HeaderMalformed,
    /// Backing storage for a connection could not be reserved.
    AllocationFailure,
    /// A message arrived whose type is not in the accepted set for this
    /// connection. The connection should be dropped.
    ProtocolTypeRejected,
}

impl std::error::Error for Error {}

impl std::convert::From<std::collections::TryReserveError> for Error {
    fn from(_error: std::collections::TryReserveError) -> Self {
        Error::AllocationFailure
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
