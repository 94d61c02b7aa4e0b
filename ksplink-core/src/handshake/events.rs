//! Events that advance the handshake

use ksplink_protocol::HandshakePacket;

/// Events that can trigger handshake transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeEvent {
    /// Challenge written; the device has `budget` polls to answer
    ChallengeSent { budget: u8 },
    /// A poll finished without a handshake packet
    PollEmpty,
    /// The device sent a handshake packet
    Reply(HandshakePacket),
    /// Handshake disabled in configuration
    Bypass,
    /// Shutdown requested while waiting
    Cancel,
    /// Port closed
    Reset,
}
