//! Mode values carried in the control payload

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Autopilot hold mode, low nibble of the navball byte
///
/// Zero and values above ten mean "leave the autopilot alone".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AutopilotMode {
    StabilityAssist = 1,
    Prograde = 2,
    Retrograde = 3,
    Normal = 4,
    Antinormal = 5,
    RadialIn = 6,
    RadialOut = 7,
    Target = 8,
    AntiTarget = 9,
    Maneuver = 10,
}

impl AutopilotMode {
    /// Parse the low nibble of the navball byte
    pub fn from_nibble(value: u8) -> Option<Self> {
        use AutopilotMode::*;
        Some(match value {
            1 => StabilityAssist,
            2 => Prograde,
            3 => Retrograde,
            4 => Normal,
            5 => Antinormal,
            6 => RadialIn,
            7 => RadialOut,
            8 => Target,
            9 => AntiTarget,
            10 => Maneuver,
            _ => return None,
        })
    }

    /// Wire value
    pub fn to_nibble(self) -> u8 {
        self as u8
    }
}

/// Navball speed display mode, high nibble of the navball byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SpeedMode {
    Orbit = 1,
    Surface = 2,
    Target = 3,
}

impl SpeedMode {
    /// Parse the high nibble of the navball byte; zero means "no request"
    pub fn from_nibble(value: u8) -> Option<Self> {
        match value {
            1 => Some(SpeedMode::Orbit),
            2 => Some(SpeedMode::Surface),
            3 => Some(SpeedMode::Target),
            _ => None,
        }
    }

    /// Wire value
    pub fn to_nibble(self) -> u8 {
        self as u8
    }
}

/// Cockpit display mode selected on the device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ControlMode {
    Stage = 0,
    Docking = 1,
    Map = 2,
}

impl ControlMode {
    pub fn from_byte(value: u8) -> Option<Self> {
        match value {
            0 => Some(ControlMode::Stage),
            1 => Some(ControlMode::Docking),
            2 => Some(ControlMode::Map),
            _ => None,
        }
    }
}
