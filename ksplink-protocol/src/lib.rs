//! Cockpit Serial Link Protocol
//!
//! This crate defines the byte-level protocol between the flight simulator
//! host and an Arduino-class cockpit controller. The device reports switch
//! and axis state; the host streams vessel telemetry back.
//!
//! # Protocol Overview
//!
//! All packets use the same binary frame:
//! ```text
//! ┌──────┬──────┬────────┬────┬─────────────┬──────────┐
//! │ 0xBE │ 0xEF │ LENGTH │ ID │ BODY        │ CHECKSUM │
//! │ 1B   │ 1B   │ 1B     │ 1B │ LENGTH-1 B  │ 1B       │
//! └──────┴──────┴────────┴────┴─────────────┴──────────┘
//! ```
//!
//! LENGTH counts the id byte plus the body. CHECKSUM is LENGTH XOR every
//! payload byte, id included. Every packet id has exactly one payload size;
//! a frame whose LENGTH disagrees with the registry is dropped.

#![no_std]
#![deny(unsafe_code)]

pub mod checksum;
pub mod frame;
pub mod packets;
pub mod receiver;
pub mod registry;

pub use checksum::checksum;
pub use frame::{encode, Frame, FrameError, FRAME_MAGIC, MAX_FRAME_SIZE, MAX_PAYLOAD_SIZE};
pub use packets::{
    control::{ControlPacket, CONTROL_LEN},
    handshake::{HandshakePacket, HANDSHAKE_LEN},
    telemetry::{
        pack_navball_mode, quantize_angle, ActionGroupStatus, NavHeading, StatusGroup,
        VesselData, TELEMETRY_LEN,
    },
    Packet,
};
pub use receiver::{FrameReceiver, ReceiverPhase};
pub use registry::{decode_header, inbound_len, Direction, PacketId};
