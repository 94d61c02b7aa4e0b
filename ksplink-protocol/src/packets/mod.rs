//! Typed packet payloads
//!
//! Each packet type packs and unpacks its payload field by field in wire
//! order. Multi-byte fields are little-endian, matching the AVR device.

pub mod control;
pub mod handshake;
pub mod telemetry;
mod wire;

use crate::frame::{Frame, FrameError};
use crate::registry::PacketId;

use control::ControlPacket;
use handshake::HandshakePacket;

/// Packets the host accepts from the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Packet {
    /// Handshake reply
    Handshake(HandshakePacket),
    /// Pilot input snapshot
    Control(ControlPacket),
}

impl Packet {
    /// Decode a completed frame into its typed payload
    pub fn from_frame(frame: &Frame) -> Result<Self, FrameError> {
        match frame.packet_id() {
            Some(PacketId::Handshake) => {
                HandshakePacket::from_payload(frame.payload()).map(Packet::Handshake)
            }
            Some(PacketId::Control) => {
                ControlPacket::from_payload(frame.payload()).map(Packet::Control)
            }
            Some(PacketId::Telemetry) | None => Err(FrameError::UnknownPacket(frame.id())),
        }
    }

    /// Packet id of this payload
    pub fn id(&self) -> PacketId {
        match self {
            Packet::Handshake(_) => PacketId::Handshake,
            Packet::Control(_) => PacketId::Control,
        }
    }
}
