//! Telemetry packet
//!
//! The host streams one `VesselData` record per refresh period. The
//! simulation fills the record; this module only fixes its byte layout.
//! Angles travel as fixed point (degrees × 50 in an i16).

use crate::frame::{Frame, FrameError};
use crate::packets::wire::PayloadWriter;
use crate::registry::PacketId;

/// Telemetry payload size, id byte included
pub const TELEMETRY_LEN: usize = 214;

/// Fixed-point scale for angles (≈0.02° resolution)
pub const ANGLE_SCALE: f32 = 50.0;

/// Convert degrees to the wire's fixed-point angle
///
/// Results outside the i16 range clamp to its ends. NaN maps to zero.
pub fn quantize_angle(degrees: f32) -> i16 {
    let scaled = round_half_away(degrees * ANGLE_SCALE);
    if scaled.is_nan() {
        0
    } else if scaled >= i16::MAX as f32 {
        i16::MAX
    } else if scaled <= i16::MIN as f32 {
        i16::MIN
    } else {
        scaled as i16
    }
}

// Round half away from zero; `f32::round` needs std
fn round_half_away(value: f32) -> f32 {
    if value.is_nan() || value.is_infinite() {
        return value;
    }
    let truncated = value as i64 as f32;
    let fraction = value - truncated;
    if fraction >= 0.5 {
        truncated + 1.0
    } else if fraction <= -0.5 {
        truncated - 1.0
    } else {
        truncated
    }
}

/// Pack autopilot and speed display modes into the combined navball byte
pub fn pack_navball_mode(autopilot: u8, speed: u8) -> u8 {
    (speed << 4) | (autopilot & 0x0F)
}

/// A direction on the navball, in degrees
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct NavHeading {
    pub pitch: f32,
    pub heading: f32,
}

impl NavHeading {
    pub const fn new(pitch: f32, heading: f32) -> Self {
        Self { pitch, heading }
    }

    /// Fixed-point (pitch, heading)
    pub fn quantized(&self) -> (i16, i16) {
        (quantize_angle(self.pitch), quantize_angle(self.heading))
    }
}

/// Status flags mirrored back to the device in `action_groups`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StatusGroup {
    Sas,
    Rcs,
    Light,
    Gear,
    Brakes,
    Abort,
    /// Custom action group 1..=10
    Custom(u8),
}

impl StatusGroup {
    /// Bit position in the status word, `None` for out-of-range customs
    pub fn bit(self) -> Option<u8> {
        match self {
            StatusGroup::Sas => Some(0),
            StatusGroup::Rcs => Some(1),
            StatusGroup::Light => Some(2),
            StatusGroup::Gear => Some(3),
            StatusGroup::Brakes => Some(4),
            StatusGroup::Abort => Some(5),
            StatusGroup::Custom(n @ 1..=10) => Some(5 + n),
            StatusGroup::Custom(_) => None,
        }
    }
}

/// Action group status word
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ActionGroupStatus(pub u16);

impl ActionGroupStatus {
    /// Set or clear one flag, leaving the others alone
    pub fn set(&mut self, group: StatusGroup, on: bool) {
        if let Some(bit) = group.bit() {
            if on {
                self.0 |= 1 << bit;
            } else {
                self.0 &= !(1 << bit);
            }
        }
    }

    /// Read one flag
    pub fn get(&self, group: StatusGroup) -> bool {
        group.bit().is_some_and(|bit| (self.0 >> bit) & 1 == 1)
    }
}

/// Vessel telemetry record, in wire order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct VesselData {
    // Orbit
    pub ap: f32,
    pub pe: f32,
    pub semi_major_axis: f32,
    pub semi_minor_axis: f32,
    pub vvi: f32,
    pub e: f32,
    pub inc: f32,
    pub g: f32,
    pub t_ap: i32,
    pub t_pe: i32,
    pub true_anomaly: f32,
    pub density: f32,
    pub period: i32,
    pub r_alt: f32,
    pub alt: f32,
    pub v_surf: f32,
    pub lat: f32,
    pub lon: f32,

    // Resources, vessel totals
    pub liquid_fuel_tot: f32,
    pub liquid_fuel: f32,
    pub oxidizer_tot: f32,
    pub oxidizer: f32,
    pub echarge_tot: f32,
    pub echarge: f32,
    pub mono_prop_tot: f32,
    pub mono_prop: f32,
    pub intake_air_tot: f32,
    pub intake_air: f32,
    pub solid_fuel_tot: f32,
    pub solid_fuel: f32,
    pub xenon_gas_tot: f32,
    pub xenon_gas: f32,

    // Resources, current stage
    pub liquid_fuel_tot_s: f32,
    pub liquid_fuel_s: f32,
    pub oxidizer_tot_s: f32,
    pub oxidizer_s: f32,

    pub mission_time: u32,
    pub delta_time: f32,
    pub v_orbit: f32,
    pub mn_time: u32,
    pub mn_delta_v: f32,

    // Attitude
    pub pitch: f32,
    pub roll: f32,
    pub heading: f32,

    pub action_groups: ActionGroupStatus,
    /// Sun-planet-moon digits, e.g. 130 = Kerbin, 131 = Mun
    pub soi_number: u8,
    /// Hottest part, percent of its limit
    pub max_over_heat: u8,
    pub mach_number: f32,
    pub ias: f32,
    pub current_stage: u8,
    pub total_stage: u8,
    pub target_dist: f32,
    pub target_v: f32,
    /// See [`pack_navball_mode`]
    pub navball_sas_mode: u8,

    // Fixed-point navball vectors
    pub prograde_pitch: i16,
    pub prograde_heading: i16,
    pub maneuver_pitch: i16,
    pub maneuver_heading: i16,
    pub target_pitch: i16,
    pub target_heading: i16,
    pub normal_heading: i16,
}

impl VesselData {
    pub fn set_prograde(&mut self, heading: NavHeading) {
        (self.prograde_pitch, self.prograde_heading) = heading.quantized();
    }

    /// Zero when there is no maneuver node
    pub fn set_maneuver(&mut self, heading: NavHeading) {
        (self.maneuver_pitch, self.maneuver_heading) = heading.quantized();
    }

    /// Zero when there is no target
    pub fn set_target(&mut self, heading: NavHeading) {
        (self.target_pitch, self.target_heading) = heading.quantized();
    }

    /// Pitch of the normal vector is always zero, so only heading travels
    pub fn set_normal_heading(&mut self, degrees: f32) {
        self.normal_heading = quantize_angle(degrees);
    }

    /// Serialize field by field into wire order
    pub fn to_payload(&self) -> Result<[u8; TELEMETRY_LEN], FrameError> {
        let mut out = [0u8; TELEMETRY_LEN];
        let mut w = PayloadWriter::new(&mut out);

        w.u8(PacketId::Telemetry.to_byte())?;
        for value in [
            self.ap,
            self.pe,
            self.semi_major_axis,
            self.semi_minor_axis,
            self.vvi,
            self.e,
            self.inc,
            self.g,
        ] {
            w.f32(value)?;
        }
        w.i32(self.t_ap)?;
        w.i32(self.t_pe)?;
        w.f32(self.true_anomaly)?;
        w.f32(self.density)?;
        w.i32(self.period)?;
        for value in [
            self.r_alt,
            self.alt,
            self.v_surf,
            self.lat,
            self.lon,
            self.liquid_fuel_tot,
            self.liquid_fuel,
            self.oxidizer_tot,
            self.oxidizer,
            self.echarge_tot,
            self.echarge,
            self.mono_prop_tot,
            self.mono_prop,
            self.intake_air_tot,
            self.intake_air,
            self.solid_fuel_tot,
            self.solid_fuel,
            self.xenon_gas_tot,
            self.xenon_gas,
            self.liquid_fuel_tot_s,
            self.liquid_fuel_s,
            self.oxidizer_tot_s,
            self.oxidizer_s,
        ] {
            w.f32(value)?;
        }
        w.u32(self.mission_time)?;
        w.f32(self.delta_time)?;
        w.f32(self.v_orbit)?;
        w.u32(self.mn_time)?;
        for value in [self.mn_delta_v, self.pitch, self.roll, self.heading] {
            w.f32(value)?;
        }
        w.u16(self.action_groups.0)?;
        w.u8(self.soi_number)?;
        w.u8(self.max_over_heat)?;
        w.f32(self.mach_number)?;
        w.f32(self.ias)?;
        w.u8(self.current_stage)?;
        w.u8(self.total_stage)?;
        w.f32(self.target_dist)?;
        w.f32(self.target_v)?;
        w.u8(self.navball_sas_mode)?;
        for value in [
            self.prograde_pitch,
            self.prograde_heading,
            self.maneuver_pitch,
            self.maneuver_heading,
            self.target_pitch,
            self.target_heading,
            self.normal_heading,
        ] {
            w.i16(value)?;
        }

        if w.position() != TELEMETRY_LEN {
            return Err(FrameError::SizeMismatch {
                id: PacketId::Telemetry.to_byte(),
                declared: w.position() as u8,
                expected: TELEMETRY_LEN,
            });
        }
        Ok(out)
    }

    /// Wrap into a frame
    pub fn to_frame(&self) -> Result<Frame, FrameError> {
        Frame::new(&self.to_payload()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_reference_points() {
        assert_eq!(quantize_angle(0.0), 0);
        assert_eq!(quantize_angle(180.0), 9000);
        assert_eq!(quantize_angle(-180.0), -9000);
        assert_eq!(quantize_angle(90.0), 4500);
        assert_eq!(quantize_angle(0.1), 5);
        assert_eq!(quantize_angle(0.015), 1);
        assert_eq!(quantize_angle(-0.015), -1);
        assert_eq!(quantize_angle(0.009), 0);
    }

    #[test]
    fn test_quantize_clamps() {
        assert_eq!(quantize_angle(1000.0), i16::MAX);
        assert_eq!(quantize_angle(-1000.0), i16::MIN);
        assert_eq!(quantize_angle(f32::INFINITY), i16::MAX);
        assert_eq!(quantize_angle(f32::NEG_INFINITY), i16::MIN);
        assert_eq!(quantize_angle(f32::NAN), 0);
    }

    #[test]
    fn test_payload_size_and_id() {
        let payload = VesselData::default().to_payload().unwrap();
        assert_eq!(payload.len(), TELEMETRY_LEN);
        assert_eq!(payload[0], 1);
    }

    #[test]
    fn test_field_offsets() {
        let data = VesselData {
            ap: 1.5,
            mission_time: 0xDEAD_BEEF,
            action_groups: ActionGroupStatus(0x0102),
            navball_sas_mode: 0x32,
            normal_heading: -2,
            ..Default::default()
        };
        let payload = data.to_payload().unwrap();

        assert_eq!(&payload[1..5], &1.5f32.to_le_bytes());
        // id + 36 four-byte fields before mission time
        assert_eq!(&payload[145..149], &0xDEAD_BEEFu32.to_le_bytes());
        assert_eq!(&payload[177..179], &[0x02, 0x01]);
        assert_eq!(payload[199], 0x32);
        assert_eq!(&payload[212..214], &(-2i16).to_le_bytes());
    }

    #[test]
    fn test_navheading_setters() {
        let mut data = VesselData::default();
        data.set_prograde(NavHeading::new(45.0, 90.0));
        data.set_normal_heading(-90.0);
        assert_eq!(data.prograde_pitch, 2250);
        assert_eq!(data.prograde_heading, 4500);
        assert_eq!(data.normal_heading, -4500);
    }

    #[test]
    fn test_action_group_status() {
        let mut status = ActionGroupStatus::default();
        status.set(StatusGroup::Sas, true);
        status.set(StatusGroup::Custom(1), true);
        status.set(StatusGroup::Custom(10), true);
        // Custom groups start at bit 6, so group 10 is bit 15
        assert_eq!(status.0, 0b1000_0000_0100_0001);

        status.set(StatusGroup::Custom(1), false);
        assert!(!status.get(StatusGroup::Custom(1)));
        assert!(status.get(StatusGroup::Sas));

        // Out of range is ignored
        status.set(StatusGroup::Custom(11), true);
        assert_eq!(status.0, 0b1000_0000_0000_0001);
    }

    #[test]
    fn test_pack_navball_mode() {
        assert_eq!(pack_navball_mode(1, 2), 0x21);
        assert_eq!(pack_navball_mode(10, 3), 0x3A);
        assert_eq!(pack_navball_mode(0, 0), 0);
    }

    #[test]
    fn test_frame_fits_length_byte() {
        let frame = VesselData::default().to_frame().unwrap();
        assert_eq!(frame.length_byte() as usize, TELEMETRY_LEN);
        assert_eq!(frame.encoded_len(), TELEMETRY_LEN + 4);
    }
}
