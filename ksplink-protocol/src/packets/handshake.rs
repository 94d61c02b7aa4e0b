//! Handshake packet
//!
//! The host sends a fixed challenge right after opening the port; a
//! compatible device answers with a fixed reply. Nothing else about the
//! device is learned from it.

use crate::frame::{Frame, FrameError};
use crate::packets::wire::PayloadReader;
use crate::registry::PacketId;

/// Handshake payload size, id byte included
pub const HANDSHAKE_LEN: usize = 4;

/// Markers the host sends
pub const CHALLENGE_MARKERS: [u8; 3] = [1, 2, 3];

/// Markers a compatible device replies with
pub const REPLY_MARKERS: [u8; 3] = [3, 1, 4];

/// Handshake payload: three marker bytes after the id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct HandshakePacket {
    pub markers: [u8; 3],
}

impl HandshakePacket {
    /// The host's challenge
    pub const fn challenge() -> Self {
        Self {
            markers: CHALLENGE_MARKERS,
        }
    }

    /// A confirming device reply
    pub const fn reply() -> Self {
        Self {
            markers: REPLY_MARKERS,
        }
    }

    /// Whether these markers confirm a compatible device
    pub fn is_confirmation(&self) -> bool {
        self.markers == REPLY_MARKERS
    }

    /// Unpack from a payload whose first byte is the handshake id
    pub fn from_payload(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() != HANDSHAKE_LEN {
            return Err(FrameError::SizeMismatch {
                id: payload.first().copied().unwrap_or_default(),
                declared: payload.len() as u8,
                expected: HANDSHAKE_LEN,
            });
        }

        let mut reader = PayloadReader::new(payload);
        let id = reader.u8()?;
        if id != PacketId::Handshake.to_byte() {
            return Err(FrameError::WrongPacket {
                expected: PacketId::Handshake.to_byte(),
                found: id,
            });
        }

        Ok(Self {
            markers: [reader.u8()?, reader.u8()?, reader.u8()?],
        })
    }

    /// Pack into wire order
    pub fn to_payload(&self) -> [u8; HANDSHAKE_LEN] {
        [
            PacketId::Handshake.to_byte(),
            self.markers[0],
            self.markers[1],
            self.markers[2],
        ]
    }

    /// Wrap into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(&self.to_payload())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_challenge_payload() {
        assert_eq!(HandshakePacket::challenge().to_payload(), [0, 1, 2, 3]);
    }

    #[test]
    fn test_challenge_frame_bytes() {
        let encoded = HandshakePacket::challenge()
            .to_frame()
            .unwrap()
            .encode_to_vec()
            .unwrap();
        assert_eq!(&encoded[..], &[0xBE, 0xEF, 4, 0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_confirmation() {
        assert!(HandshakePacket::reply().is_confirmation());
        assert!(!HandshakePacket::challenge().is_confirmation());
        assert!(!HandshakePacket { markers: [3, 1, 5] }.is_confirmation());
    }

    #[test]
    fn test_from_payload() {
        let packet = HandshakePacket::from_payload(&[0, 3, 1, 4]).unwrap();
        assert_eq!(packet, HandshakePacket::reply());
    }

    #[test]
    fn test_from_payload_wrong_id() {
        assert_eq!(
            HandshakePacket::from_payload(&[101, 3, 1, 4]),
            Err(FrameError::WrongPacket {
                expected: 0,
                found: 101
            })
        );
    }

    #[test]
    fn test_from_payload_short() {
        assert!(matches!(
            HandshakePacket::from_payload(&[0, 3]),
            Err(FrameError::SizeMismatch { declared: 2, .. })
        ));
    }
}
