//! Non-blocking status frame reception
//!
//! [`StatusReceiver`] assembles a status frame from whatever bytes the
//! transport has buffered so far. It resynchronises on the `FF FF` header, so
//! line noise in front of a frame is skipped.

use super::packet::{Frame, StatusPacket};
use super::protocol::{idx, HEADER, MAX_PACKET_LEN};
use super::result::CommResult;
use crate::platform::UartInterface;

/// Incremental status frame assembler
#[derive(Debug, Default)]
pub struct StatusReceiver {
    frame: Frame,
    bytes_seen: usize,
}

impl StatusReceiver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget any partial frame.
    pub fn reset(&mut self) {
        self.frame.clear();
        self.bytes_seen = 0;
    }

    /// Bytes consumed since the last reset, noise included
    pub fn bytes_seen(&self) -> usize {
        self.bytes_seen
    }

    /// Feed one byte; returns the decoded frame once it is complete.
    pub fn push(&mut self, byte: u8) -> Option<Result<StatusPacket, CommResult>> {
        self.bytes_seen += 1;

        if self.frame.len() < HEADER.len() {
            if byte == HEADER[0] {
                let _ = self.frame.push(byte);
            } else {
                self.frame.clear();
            }
            return None;
        }
        // a third 0xFF is still header; ids never take that value
        if self.frame.len() == idx::ID && byte == HEADER[0] {
            return None;
        }
        if self.frame.push(byte).is_err() {
            self.frame.clear();
            return Some(Err(CommResult::RxCorrupted));
        }
        if self.frame.len() == idx::LENGTH + 1 {
            let total = usize::from(byte) + 4;
            if byte < 2 || total > MAX_PACKET_LEN {
                self.frame.clear();
                return Some(Err(CommResult::RxCorrupted));
            }
        }
        if self.frame.len() > idx::LENGTH {
            let total = usize::from(self.frame[idx::LENGTH]) + 4;
            if self.frame.len() == total {
                let result = StatusPacket::decode(&self.frame);
                self.frame.clear();
                return Some(result);
            }
        }
        None
    }

    /// Drain the transport one byte at a time.
    ///
    /// Returns the frame once complete, `Err(RxInProgress)` while more bytes
    /// are needed and `Err(RxFailure)` if the transport reports an error.
    /// Bytes after a completed frame stay in the transport.
    pub fn poll<U: UartInterface>(&mut self, uart: &mut U) -> Result<StatusPacket, CommResult> {
        let mut byte = [0u8; 1];
        loop {
            match uart.read(&mut byte) {
                Ok(0) => return Err(CommResult::RxInProgress),
                Ok(_) => {
                    if let Some(result) = self.push(byte[0]) {
                        return result;
                    }
                }
                Err(_) => return Err(CommResult::RxFailure),
            }
        }
    }
}
