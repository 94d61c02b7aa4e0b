//! Packet registry
//!
//! Every packet id maps to exactly one payload size. The receiver uses the
//! registry to reject frames whose LENGTH does not match before collecting
//! a single payload byte.

use crate::frame::FrameError;
use crate::packets::control::CONTROL_LEN;
use crate::packets::handshake::HANDSHAKE_LEN;
use crate::packets::telemetry::TELEMETRY_LEN;

// Wire values
const ID_HANDSHAKE: u8 = 0;
const ID_TELEMETRY: u8 = 1;
const ID_CONTROL: u8 = 101;

/// Registered packet identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketId {
    /// Connect-time challenge and reply
    Handshake,
    /// Vessel state, host to device
    Telemetry,
    /// Pilot inputs, device to host
    Control,
}

/// Which side of the link sends a packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    /// Sent by both ends
    Both,
    /// Host to device only
    ToDevice,
    /// Device to host only
    ToHost,
}

impl PacketId {
    /// Parse an id from its wire byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            ID_HANDSHAKE => Some(PacketId::Handshake),
            ID_TELEMETRY => Some(PacketId::Telemetry),
            ID_CONTROL => Some(PacketId::Control),
            _ => None,
        }
    }

    /// Convert to wire byte
    pub fn to_byte(self) -> u8 {
        match self {
            PacketId::Handshake => ID_HANDSHAKE,
            PacketId::Telemetry => ID_TELEMETRY,
            PacketId::Control => ID_CONTROL,
        }
    }

    /// Fixed payload size, id byte included
    pub fn payload_len(self) -> usize {
        match self {
            PacketId::Handshake => HANDSHAKE_LEN,
            PacketId::Telemetry => TELEMETRY_LEN,
            PacketId::Control => CONTROL_LEN,
        }
    }

    /// Which side sends this packet
    pub fn direction(self) -> Direction {
        match self {
            PacketId::Handshake => Direction::Both,
            PacketId::Telemetry => Direction::ToDevice,
            PacketId::Control => Direction::ToHost,
        }
    }

    /// Whether the host accepts this packet from the device
    pub fn is_inbound(self) -> bool {
        matches!(self.direction(), Direction::Both | Direction::ToHost)
    }
}

/// Expected payload size for a frame arriving from the device
///
/// Returns zero for unknown ids and for host-to-device packets; the receiver
/// treats both as a size mismatch.
pub fn inbound_len(id: u8) -> usize {
    match PacketId::from_byte(id) {
        Some(packet) if packet.is_inbound() => packet.payload_len(),
        _ => 0,
    }
}

/// Look up the fixed payload size for a packet id
pub fn decode_header(id: u8) -> Result<usize, FrameError> {
    PacketId::from_byte(id)
        .map(PacketId::payload_len)
        .ok_or(FrameError::UnknownPacket(id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_roundtrip() {
        for id in [PacketId::Handshake, PacketId::Telemetry, PacketId::Control] {
            assert_eq!(PacketId::from_byte(id.to_byte()), Some(id));
        }
    }

    #[test]
    fn test_wire_values() {
        assert_eq!(PacketId::Handshake.to_byte(), 0);
        assert_eq!(PacketId::Telemetry.to_byte(), 1);
        assert_eq!(PacketId::Control.to_byte(), 101);
    }

    #[test]
    fn test_payload_sizes() {
        assert_eq!(PacketId::Handshake.payload_len(), 4);
        assert_eq!(PacketId::Control.payload_len(), 25);
        assert_eq!(PacketId::Telemetry.payload_len(), 214);
    }

    #[test]
    fn test_decode_header() {
        assert_eq!(decode_header(0), Ok(4));
        assert_eq!(decode_header(101), Ok(25));
        assert_eq!(decode_header(1), Ok(214));
        assert_eq!(decode_header(7), Err(FrameError::UnknownPacket(7)));
    }

    #[test]
    fn test_inbound_len() {
        assert_eq!(inbound_len(0), 4);
        assert_eq!(inbound_len(101), 25);
        // Telemetry is never sent by the device
        assert_eq!(inbound_len(1), 0);
        assert_eq!(inbound_len(0xFF), 0);
    }

    #[test]
    fn test_unknown_id() {
        assert!(PacketId::from_byte(2).is_none());
        assert!(PacketId::from_byte(100).is_none());
    }
}
