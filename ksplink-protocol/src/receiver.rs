//! Receive state machine
//!
//! Consumes the device byte stream one byte at a time, resynchronizes on
//! garbage and assembles one payload at a time.
//!
//! ```text
//!           ┌────────── other ──────────┐
//!           ▼                           │
//!  Idle ──0xBE──▶ Sync ──0xEF──▶ Length ──▶ Id ──size ok──▶ Collecting
//!   ▲               │                       │                   │
//!   │             other                 mismatch           LENGTH bytes
//!   │               │                       │               + checksum
//!   └───────────────┴───────────────────────┴───────────────────┘
//! ```
//!
//! Rejections return the machine to Idle immediately. Bytes consumed by a
//! rejected frame are never rescanned, so a valid header hidden inside a
//! corrupted frame is lost with it.

use heapless::Vec;

use crate::checksum::checksum;
use crate::frame::{Frame, FrameError, FRAME_MAGIC, MAX_PAYLOAD_SIZE};
use crate::registry::inbound_len;

/// Coarse receiver phase, for diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReceiverPhase {
    /// Scanning for the magic pair
    Idle,
    /// Magic seen, reading LENGTH and id
    Header,
    /// Collecting payload and checksum
    Collecting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RxState {
    /// Waiting for the first magic byte
    Idle,
    /// Got 0xBE, the next byte must be 0xEF
    Sync,
    /// Waiting for LENGTH
    Length,
    /// Waiting for the packet id
    Id { declared: u8 },
    /// Reading payload bytes, then the checksum
    Collecting { expected_len: usize },
}

/// Frame receiver for the device-to-host direction
#[derive(Debug, Clone)]
pub struct FrameReceiver {
    state: RxState,
    buffer: Vec<u8, MAX_PAYLOAD_SIZE>,
    discarded: u32,
}

impl Default for FrameReceiver {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameReceiver {
    /// Create a receiver in the Idle state
    pub fn new() -> Self {
        Self {
            state: RxState::Idle,
            buffer: Vec::new(),
            discarded: 0,
        }
    }

    /// Drop any partial frame and return to Idle
    pub fn reset(&mut self) {
        self.state = RxState::Idle;
        self.buffer.clear();
    }

    /// Current phase
    pub fn phase(&self) -> ReceiverPhase {
        match self.state {
            RxState::Idle => ReceiverPhase::Idle,
            RxState::Sync | RxState::Length | RxState::Id { .. } => ReceiverPhase::Header,
            RxState::Collecting { .. } => ReceiverPhase::Collecting,
        }
    }

    /// Whether the receiver is between frames
    pub fn is_idle(&self) -> bool {
        self.state == RxState::Idle
    }

    /// Bytes thrown away while hunting for the magic pair
    pub fn discarded(&self) -> u32 {
        self.discarded
    }

    /// Feed a single byte to the receiver
    ///
    /// Returns `Ok(Some(frame))` when a complete valid frame is assembled,
    /// `Ok(None)` when more bytes are needed, or `Err` when a frame was
    /// rejected. The receiver is back in Idle after every `Err`.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, FrameError> {
        match self.state {
            RxState::Idle => {
                if byte == FRAME_MAGIC[0] {
                    self.state = RxState::Sync;
                } else {
                    self.discarded = self.discarded.wrapping_add(1);
                }
                Ok(None)
            }
            RxState::Sync => {
                if byte == FRAME_MAGIC[1] {
                    self.state = RxState::Length;
                } else {
                    // Both bytes go; the second is not rescanned as a start
                    self.discarded = self.discarded.wrapping_add(2);
                    self.state = RxState::Idle;
                }
                Ok(None)
            }
            RxState::Length => {
                self.state = RxState::Id { declared: byte };
                Ok(None)
            }
            RxState::Id { declared } => {
                let expected = inbound_len(byte);
                if expected == 0 || usize::from(declared) != expected {
                    self.reset();
                    return Err(FrameError::SizeMismatch {
                        id: byte,
                        declared,
                        expected,
                    });
                }

                self.buffer.clear();
                // Cannot fail: expected <= MAX_PAYLOAD_SIZE
                let _ = self.buffer.push(byte);
                self.state = RxState::Collecting {
                    expected_len: expected,
                };
                Ok(None)
            }
            RxState::Collecting { expected_len } => {
                if self.buffer.len() < expected_len {
                    let _ = self.buffer.push(byte);
                    return Ok(None);
                }

                // Payload complete, this byte is the checksum
                let length = expected_len as u8;
                let computed = checksum(length, &self.buffer);
                let id = self.buffer.first().copied().unwrap_or_default();

                if byte != computed {
                    self.reset();
                    return Err(FrameError::InvalidChecksum {
                        id,
                        expected: computed,
                        received: byte,
                    });
                }

                let frame = Frame::new(&self.buffer);
                self.reset();
                frame.map(Some)
            }
        }
    }

    /// Feed a slice, yielding every completed frame and every rejection
    pub fn feed_slice<'a>(&'a mut self, bytes: &'a [u8]) -> FeedIter<'a> {
        FeedIter {
            receiver: self,
            bytes: bytes.iter(),
        }
    }
}

/// Iterator over the outcomes of feeding a slice
pub struct FeedIter<'a> {
    receiver: &'a mut FrameReceiver,
    bytes: core::slice::Iter<'a, u8>,
}

impl Iterator for FeedIter<'_> {
    type Item = Result<Frame, FrameError>;

    fn next(&mut self) -> Option<Self::Item> {
        for &byte in self.bytes.by_ref() {
            match self.receiver.feed(byte) {
                Ok(Some(frame)) => return Some(Ok(frame)),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}
