//! Frame encoding for the cockpit link.
//!
//! Frame format:
//! - MAGIC (2 bytes): 0xBE 0xEF synchronization pair
//! - LENGTH (1 byte): payload length, id byte included (1-255)
//! - PAYLOAD (LENGTH bytes): packet id followed by the type-specific body
//! - CHECKSUM (1 byte): XOR of LENGTH and all PAYLOAD bytes
//!
//! Decoding lives in [`crate::receiver`]; a frame only needs to be taken
//! apart one byte at a time.

use heapless::Vec;

use crate::checksum::checksum;
use crate::registry::PacketId;

/// Frame synchronization bytes
pub const FRAME_MAGIC: [u8; 2] = [0xBE, 0xEF];

/// Maximum payload size in bytes (single-byte LENGTH field)
pub const MAX_PAYLOAD_SIZE: usize = 255;

/// Bytes a frame adds around its payload (MAGIC + LENGTH + CHECKSUM)
pub const FRAME_OVERHEAD: usize = 4;

/// Maximum complete frame size
pub const MAX_FRAME_SIZE: usize = MAX_PAYLOAD_SIZE + FRAME_OVERHEAD;

/// Errors that can occur while encoding, receiving or decoding frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameError {
    /// Payload does not fit the single-byte LENGTH field
    PayloadTooLarge,
    /// Payload has no id byte
    EmptyPayload,
    /// Output buffer too small for the encoded frame
    BufferTooSmall,
    /// Packet id is not in the registry
    UnknownPacket(u8),
    /// Declared LENGTH disagrees with the registered size for the id
    ///
    /// `expected` is zero when the id is not accepted on this side.
    SizeMismatch { id: u8, declared: u8, expected: usize },
    /// Trailing byte disagrees with the computed checksum
    InvalidChecksum { id: u8, expected: u8, received: u8 },
    /// Payload carries a different id than the one requested
    WrongPacket { expected: u8, found: u8 },
}

/// A complete, checksum-valid frame payload
///
/// `payload[0]` is always the packet id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    payload: Vec<u8, MAX_PAYLOAD_SIZE>,
}

impl Frame {
    /// Wrap a payload whose first byte is the packet id
    pub fn new(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.is_empty() {
            return Err(FrameError::EmptyPayload);
        }
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge);
        }

        let mut payload_vec = Vec::new();
        payload_vec
            .extend_from_slice(payload)
            .map_err(|_| FrameError::PayloadTooLarge)?;

        Ok(Self {
            payload: payload_vec,
        })
    }

    /// Raw packet id byte
    pub fn id(&self) -> u8 {
        // new() rejects empty payloads
        self.payload.first().copied().unwrap_or_default()
    }

    /// Registered packet id, if the id byte is known
    pub fn packet_id(&self) -> Option<PacketId> {
        PacketId::from_byte(self.id())
    }

    /// Whole payload, id byte included
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// The LENGTH byte this frame carries on the wire
    pub fn length_byte(&self) -> u8 {
        self.payload.len() as u8
    }

    /// Checksum this frame carries on the wire
    pub fn checksum(&self) -> u8 {
        checksum(self.length_byte(), &self.payload)
    }

    /// Size of the encoded frame in bytes
    pub fn encoded_len(&self) -> usize {
        FRAME_OVERHEAD + self.payload.len()
    }

    /// Encode this frame into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, FrameError> {
        let frame_len = self.encoded_len();
        if buffer.len() < frame_len {
            return Err(FrameError::BufferTooSmall);
        }

        let len = self.payload.len();
        buffer[0] = FRAME_MAGIC[0];
        buffer[1] = FRAME_MAGIC[1];
        buffer[2] = self.length_byte();
        buffer[3..3 + len].copy_from_slice(&self.payload);
        buffer[3 + len] = self.checksum();

        Ok(frame_len)
    }

    /// Encode this frame into a heapless Vec
    pub fn encode_to_vec(&self) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = self.encode(&mut buffer)?;
        let mut vec = Vec::new();
        vec.extend_from_slice(&buffer[..len])
            .map_err(|_| FrameError::BufferTooSmall)?;
        Ok(vec)
    }
}

/// Frame a payload for the given packet id
///
/// The caller has already placed the id in `payload[0]`; a payload that
/// starts with a different id is refused rather than silently relabelled.
pub fn encode(id: PacketId, payload: &[u8]) -> Result<Vec<u8, MAX_FRAME_SIZE>, FrameError> {
    match payload.first() {
        None => Err(FrameError::EmptyPayload),
        Some(&found) if found != id.to_byte() => Err(FrameError::WrongPacket {
            expected: id.to_byte(),
            found,
        }),
        Some(_) => Frame::new(payload)?.encode_to_vec(),
    }
}
