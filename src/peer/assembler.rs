use super::constants::*;
use crate::{Error, Result};

use byteorder::{ByteOrder, LittleEndian};
use bytes::{BufMut, Bytes, BytesMut};

/// Where the assembler is within the current message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssemblerState {
    /// No bytes of the next message have arrived.
    AwaitingHeader,
    /// Part of the header has arrived.
    ReceivingHeader,
    /// The header is complete; no body bytes have arrived.
    AwaitingBody,
    /// Part of the body has arrived.
    ReceivingBody,
    /// Header and body are complete. Terminal until [Assembler::take].
    Complete,
}

/// Reassembles one message at a time from stream fragments.
///
/// The stream delivers bytes in arbitrary sized pieces, so a message is built
/// up incrementally: first the fixed size header, then a body of the length
/// the header declares. Bytes already buffered are never overwritten; a second
/// partial read appends where the first left off. The assembler is exclusive
/// to one connection and holds at most one message under construction.
#[derive(Debug)]
pub struct Assembler {
    state: AssemblerState,
    buf: BytesMut,
    body_size: usize,
    max_body_size: usize,
}

impl Assembler {
    pub fn new() -> Self {
        Assembler::with_max_body_size(MAX_BODY_SIZE)
    }

    pub fn with_max_body_size(max_body_size: usize) -> Self {
        Assembler {
            state: AssemblerState::AwaitingHeader,
            buf: BytesMut::new(),
            body_size: 0,
            max_body_size,
        }
    }

    pub fn state(&self) -> AssemblerState {
        self.state
    }

    pub fn is_complete(&self) -> bool {
        self.state == AssemblerState::Complete
    }

    /// Total bytes buffered for the message under construction.
    pub fn bytes_received(&self) -> usize {
        self.buf.len()
    }

    /// Consumes as many of `bytes` as the current state needs and returns how
    /// many were taken. Consumption stops at `Complete`; the caller feeds the
    /// remainder into the next assembly cycle after [Assembler::take].
    ///
    /// Fails with `HeaderMalformed`, leaving the state untouched, when a
    /// completed header declares a body larger than the configured maximum or
    /// an undefined command. The caller is expected to drop the connection.
    pub fn feed(&mut self, bytes: &[u8]) -> Result<usize> {
        let mut consumed = 0;
        loop {
            match self.state {
                AssemblerState::AwaitingHeader | AssemblerState::ReceivingHeader => {
                    let need = MESSAGE_HEADER_SIZE - self.buf.len();
                    let take = std::cmp::min(need, bytes.len() - consumed);
                    self.buf.put_slice(&bytes[consumed..consumed + take]);
                    consumed += take;
                    if self.buf.len() < MESSAGE_HEADER_SIZE {
                        if self.buf.len() > 0 {
                            self.state = AssemblerState::ReceivingHeader;
                        }
                        return Ok(consumed);
                    }
                    let declared = self.read_header()?;
                    self.body_size = declared;
                    if self.body_size == 0 {
                        self.state = AssemblerState::Complete;
                    } else {
                        self.state = AssemblerState::AwaitingBody;
                    }
                }
                AssemblerState::AwaitingBody | AssemblerState::ReceivingBody => {
                    let have = self.buf.len() - MESSAGE_HEADER_SIZE;
                    let need = self.body_size - have;
                    let take = std::cmp::min(need, bytes.len() - consumed);
                    self.buf.put_slice(&bytes[consumed..consumed + take]);
                    consumed += take;
                    if self.buf.len() - MESSAGE_HEADER_SIZE == self.body_size {
                        self.state = AssemblerState::Complete;
                    } else {
                        if take > 0 {
                            self.state = AssemblerState::ReceivingBody;
                        }
                        return Ok(consumed);
                    }
                }
                AssemblerState::Complete => return Ok(consumed),
            }
        }
    }

    /// Hands out the completed header and body bytes for the external decoder
    /// and resets for the next message. Returns `None` before `Complete`.
    pub fn take(&mut self) -> Option<Bytes> {
        if !self.is_complete() {
            return None;
        }
        let bytes = self.buf.split().freeze();
        self.reset();
        Some(bytes)
    }

    /// Discards the message under construction, e.g. after a protocol
    /// violation, returning to `AwaitingHeader`.
    pub fn reset(&mut self) {
        self.state = AssemblerState::AwaitingHeader;
        self.buf.clear();
        self.body_size = 0;
    }

    /// Validates the buffered header and returns the declared body length.
    fn read_header(&self) -> Result<usize> {
        let command =
            &self.buf[MESSAGE_COMMAND_OFFSET..MESSAGE_COMMAND_OFFSET + MESSAGE_COMMAND_SIZE];
        if crate::message::MessageKind::from_command(command).is_none() {
            return Err(Error::HeaderMalformed);
        }
        let declared =
            LittleEndian::read_u32(&self.buf[MESSAGE_LENGTH_OFFSET..MESSAGE_LENGTH_OFFSET + 4]);
        if declared as usize > self.max_body_size {
            return Err(Error::HeaderMalformed);
        }
        Ok(declared as usize)
    }
}
