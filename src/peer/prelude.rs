pub use crate::{Error, Result};

pub use super::constants::*;
pub use super::peer_meta::{PeerMetadata, Services};

pub use crate::message::{Message, MessageKind};

pub use std::sync::Arc;

pub use tracing::{debug, info, warn};
