//! Decoded control snapshot

use ksplink_protocol::packets::control::{
    BIT_ABORT, BIT_BRAKES, BIT_GEAR, BIT_LIGHTS, BIT_PRECISION, BIT_RCS, BIT_SAS, BIT_STAGE,
    CONTROL_GROUPS,
};
use ksplink_protocol::{ControlPacket, FrameError};

use super::modes::{AutopilotMode, ControlMode, SpeedMode};

/// Raw axis units per physical unit
pub const AXIS_SCALE: f32 = 1000.0;

/// Switches in the MainControls byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Toggle {
    Sas,
    Rcs,
    Lights,
    Gear,
    Brakes,
    Precision,
    Abort,
    Stage,
}

impl Toggle {
    /// Every toggle, MSB first
    pub const ALL: [Toggle; 8] = [
        Toggle::Sas,
        Toggle::Rcs,
        Toggle::Lights,
        Toggle::Gear,
        Toggle::Brakes,
        Toggle::Precision,
        Toggle::Abort,
        Toggle::Stage,
    ];

    /// Bit position in MainControls
    pub fn bit(self) -> u8 {
        match self {
            Toggle::Sas => BIT_SAS,
            Toggle::Rcs => BIT_RCS,
            Toggle::Lights => BIT_LIGHTS,
            Toggle::Gear => BIT_GEAR,
            Toggle::Brakes => BIT_BRAKES,
            Toggle::Precision => BIT_PRECISION,
            Toggle::Abort => BIT_ABORT,
            Toggle::Stage => BIT_STAGE,
        }
    }
}

/// Typed pilot input snapshot
///
/// Axes are in physical units: -1.0..=1.0, or 0.0..=1.0 for the
/// throttles. `control_groups` is indexed by group number, so index 0 is
/// never set.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlState {
    pub sas: bool,
    pub rcs: bool,
    pub lights: bool,
    pub gear: bool,
    pub brakes: bool,
    pub precision: bool,
    pub abort: bool,
    pub stage: bool,
    /// Raw display mode byte
    pub mode: u8,
    /// Low nibble of the navball byte, 0..=15
    pub autopilot_mode: u8,
    /// High nibble of the navball byte, 0..=15
    pub speed_mode: u8,
    pub control_groups: [bool; CONTROL_GROUPS + 1],
    pub pitch: f32,
    pub roll: f32,
    pub yaw: f32,
    pub tx: f32,
    pub ty: f32,
    pub tz: f32,
    pub wheel_steer: f32,
    pub throttle: f32,
    pub wheel_throttle: f32,
}

fn scale(raw: i16) -> f32 {
    f32::from(raw) / AXIS_SCALE
}

impl ControlState {
    /// Decode a validated control packet
    pub fn decode(packet: &ControlPacket) -> Self {
        let mut control_groups = [false; CONTROL_GROUPS + 1];
        for (group, slot) in control_groups.iter_mut().enumerate().skip(1) {
            *slot = packet.group_bit(group);
        }

        Self {
            sas: packet.main_bit(BIT_SAS),
            rcs: packet.main_bit(BIT_RCS),
            lights: packet.main_bit(BIT_LIGHTS),
            gear: packet.main_bit(BIT_GEAR),
            brakes: packet.main_bit(BIT_BRAKES),
            precision: packet.main_bit(BIT_PRECISION),
            abort: packet.main_bit(BIT_ABORT),
            stage: packet.main_bit(BIT_STAGE),
            mode: packet.mode,
            autopilot_mode: packet.autopilot_nibble(),
            speed_mode: packet.speed_nibble(),
            control_groups,
            pitch: scale(packet.pitch),
            roll: scale(packet.roll),
            yaw: scale(packet.yaw),
            tx: scale(packet.tx),
            ty: scale(packet.ty),
            tz: scale(packet.tz),
            wheel_steer: scale(packet.wheel_steer),
            throttle: scale(packet.throttle),
            wheel_throttle: scale(packet.wheel_throttle),
        }
    }

    /// Decode straight from a control payload
    pub fn from_payload(payload: &[u8]) -> Result<Self, FrameError> {
        ControlPacket::from_payload(payload).map(|packet| Self::decode(&packet))
    }

    /// Read one MainControls toggle
    pub fn toggle(&self, toggle: Toggle) -> bool {
        match toggle {
            Toggle::Sas => self.sas,
            Toggle::Rcs => self.rcs,
            Toggle::Lights => self.lights,
            Toggle::Gear => self.gear,
            Toggle::Brakes => self.brakes,
            Toggle::Precision => self.precision,
            Toggle::Abort => self.abort,
            Toggle::Stage => self.stage,
        }
    }

    /// Custom action group `group` (1..=10); false outside that range
    pub fn control_group(&self, group: usize) -> bool {
        group != 0 && self.control_groups.get(group).copied().unwrap_or(false)
    }

    /// Requested autopilot mode, if the nibble names one
    pub fn autopilot(&self) -> Option<AutopilotMode> {
        AutopilotMode::from_nibble(self.autopilot_mode)
    }

    /// Requested speed display mode, if any
    pub fn speed(&self) -> Option<SpeedMode> {
        SpeedMode::from_nibble(self.speed_mode)
    }

    /// Selected display mode, if known
    pub fn control_mode(&self) -> Option<ControlMode> {
        ControlMode::from_byte(self.mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sas_and_autopilot() {
        let packet = ControlPacket {
            main_controls: 0b1000_0000,
            navball_sas_mode: 0x21,
            ..Default::default()
        };
        let state = ControlState::decode(&packet);

        assert!(state.sas);
        assert!(!state.rcs && !state.lights && !state.gear && !state.brakes);
        assert!(!state.precision && !state.abort && !state.stage);
        assert_eq!(state.autopilot_mode, 1);
        assert_eq!(state.speed_mode, 2);
        assert_eq!(state.autopilot(), Some(AutopilotMode::StabilityAssist));
        assert_eq!(state.speed(), Some(SpeedMode::Surface));
    }

    #[test]
    fn test_every_toggle_bit() {
        for toggle in Toggle::ALL {
            let packet = ControlPacket {
                main_controls: 1 << toggle.bit(),
                ..Default::default()
            };
            let state = ControlState::decode(&packet);
            for other in Toggle::ALL {
                assert_eq!(state.toggle(other), other == toggle);
            }
        }
    }

    #[test]
    fn test_axis_scaling() {
        let packet = ControlPacket {
            pitch: 500,
            roll: -1000,
            throttle: 1000,
            wheel_steer: -1,
            ..Default::default()
        };
        let state = ControlState::decode(&packet);

        assert_eq!(state.pitch, 0.5);
        assert_eq!(state.roll, -1.0);
        assert_eq!(state.throttle, 1.0);
        assert_eq!(state.wheel_steer, -0.001);
        assert_eq!(state.yaw, 0.0);
    }

    #[test]
    fn test_control_groups() {
        let packet = ControlPacket {
            control_group: 0b0000_0100_0000_0011,
            ..Default::default()
        };
        let state = ControlState::decode(&packet);

        // Bit 0 is not a group
        assert!(!state.control_groups[0]);
        assert!(state.control_group(1));
        assert!(!state.control_group(2));
        assert!(state.control_group(10));
        assert!(!state.control_group(0));
        assert!(!state.control_group(11));
    }

    #[test]
    fn test_high_group_bits_ignored() {
        let packet = ControlPacket {
            control_group: 0xF800,
            ..Default::default()
        };
        let state = ControlState::decode(&packet);
        assert!(state.control_groups.iter().all(|&on| !on));
    }

    #[test]
    fn test_out_of_range_autopilot() {
        let packet = ControlPacket {
            navball_sas_mode: 0x0B,
            ..Default::default()
        };
        let state = ControlState::decode(&packet);
        assert_eq!(state.autopilot_mode, 11);
        assert_eq!(state.autopilot(), None);
    }

    #[test]
    fn test_from_payload() {
        let packet = ControlPacket {
            main_controls: 0b0000_0001,
            mode: 2,
            ..Default::default()
        };
        let state = ControlState::from_payload(&packet.to_payload().unwrap()).unwrap();
        assert!(state.stage);
        assert_eq!(state.control_mode(), Some(ControlMode::Map));

        assert!(ControlState::from_payload(&[101, 0]).is_err());
    }
}
