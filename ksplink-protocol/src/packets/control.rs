//! Control packet
//!
//! Sent by the device whenever it samples its switches and axes. The
//! payload is kept raw here; `ksplink-core` turns it into physical units.
//!
//! Layout (25 bytes):
//! ```text
//! id  main  mode  group(u16)  navball  extra  9 × axis(i16)
//! 1   1     1     2           1        1      18
//! ```

use crate::frame::{Frame, FrameError};
use crate::packets::wire::{PayloadReader, PayloadWriter};
use crate::registry::PacketId;

/// Control payload size, id byte included
pub const CONTROL_LEN: usize = 25;

// MainControls bit positions
pub const BIT_SAS: u8 = 7;
pub const BIT_RCS: u8 = 6;
pub const BIT_LIGHTS: u8 = 5;
pub const BIT_GEAR: u8 = 4;
pub const BIT_BRAKES: u8 = 3;
pub const BIT_PRECISION: u8 = 2;
pub const BIT_ABORT: u8 = 1;
pub const BIT_STAGE: u8 = 0;

/// Number of custom action groups carried in the group bitmask (bits 1..=10)
pub const CONTROL_GROUPS: usize = 10;

/// Raw control payload, field for field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlPacket {
    /// SAS RCS Lights Gear Brakes Precision Abort Stage, bit 7 first
    pub main_controls: u8,
    /// 0 = stage, 1 = docking, 2 = map
    pub mode: u8,
    /// Custom action groups 1-10 in bits 1-10
    pub control_group: u16,
    /// Low nibble autopilot mode, high nibble speed display mode
    pub navball_sas_mode: u8,
    /// Reserved
    pub additional_control_byte: u8,
    /// -1000..=1000
    pub pitch: i16,
    pub roll: i16,
    pub yaw: i16,
    pub tx: i16,
    pub ty: i16,
    pub tz: i16,
    pub wheel_steer: i16,
    /// 0..=1000
    pub throttle: i16,
    pub wheel_throttle: i16,
}

impl ControlPacket {
    /// Test one bit of the MainControls byte
    pub fn main_bit(&self, bit: u8) -> bool {
        (self.main_controls >> bit) & 1 == 1
    }

    /// Test custom action group `group` (1..=10)
    pub fn group_bit(&self, group: usize) -> bool {
        group < 16 && (self.control_group >> group) & 1 == 1
    }

    /// Autopilot mode nibble
    pub fn autopilot_nibble(&self) -> u8 {
        self.navball_sas_mode & 0x0F
    }

    /// Speed display mode nibble
    pub fn speed_nibble(&self) -> u8 {
        self.navball_sas_mode >> 4
    }

    /// Unpack from a payload whose first byte is the control id
    pub fn from_payload(payload: &[u8]) -> Result<Self, FrameError> {
        if payload.len() != CONTROL_LEN {
            return Err(FrameError::SizeMismatch {
                id: payload.first().copied().unwrap_or_default(),
                declared: payload.len() as u8,
                expected: CONTROL_LEN,
            });
        }

        let mut r = PayloadReader::new(payload);
        let id = r.u8()?;
        if id != PacketId::Control.to_byte() {
            return Err(FrameError::WrongPacket {
                expected: PacketId::Control.to_byte(),
                found: id,
            });
        }

        Ok(Self {
            main_controls: r.u8()?,
            mode: r.u8()?,
            control_group: r.u16()?,
            navball_sas_mode: r.u8()?,
            additional_control_byte: r.u8()?,
            pitch: r.i16()?,
            roll: r.i16()?,
            yaw: r.i16()?,
            tx: r.i16()?,
            ty: r.i16()?,
            tz: r.i16()?,
            wheel_steer: r.i16()?,
            throttle: r.i16()?,
            wheel_throttle: r.i16()?,
        })
    }

    /// Pack into wire order, as the device would send it
    pub fn to_payload(&self) -> Result<[u8; CONTROL_LEN], FrameError> {
        let mut out = [0u8; CONTROL_LEN];
        let mut w = PayloadWriter::new(&mut out);
        self.write_fields(&mut w)?;

        if w.position() != CONTROL_LEN {
            return Err(FrameError::SizeMismatch {
                id: PacketId::Control.to_byte(),
                declared: w.position() as u8,
                expected: CONTROL_LEN,
            });
        }
        Ok(out)
    }

    fn write_fields(&self, w: &mut PayloadWriter<'_>) -> Result<(), FrameError> {
        w.u8(PacketId::Control.to_byte())?;
        w.u8(self.main_controls)?;
        w.u8(self.mode)?;
        w.u16(self.control_group)?;
        w.u8(self.navball_sas_mode)?;
        w.u8(self.additional_control_byte)?;
        for axis in [
            self.pitch,
            self.roll,
            self.yaw,
            self.tx,
            self.ty,
            self.tz,
            self.wheel_steer,
            self.throttle,
            self.wheel_throttle,
        ] {
            w.i16(axis)?;
        }
        Ok(())
    }

    /// Wrap into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(&self.to_payload()?)
    }
}
