//! Axis override policy
//!
//! Each of the nine axes can come from the simulator's own input, from the
//! device, or from whichever of the two is currently moving.
//!
//! | Setting | Policy          | Result                                    |
//! |---------|-----------------|-------------------------------------------|
//! | 0       | Internal        | simulator input untouched                 |
//! | 1       | External        | device value always                       |
//! | 2       | PreferInternal  | device value only while simulator is zero |
//! | 3       | PreferExternal  | device value whenever it is non-zero      |

use super::state::ControlState;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Where one axis takes its value from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "u8", into = "u8"))]
pub enum AxisPolicy {
    #[default]
    Internal = 0,
    External = 1,
    PreferInternal = 2,
    PreferExternal = 3,
}

/// Setting value outside 0..=3
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct InvalidAxisPolicy(pub u8);

impl core::fmt::Display for InvalidAxisPolicy {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "axis policy {} is not one of 0, 1, 2, 3", self.0)
    }
}

impl TryFrom<u8> for AxisPolicy {
    type Error = InvalidAxisPolicy;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(AxisPolicy::Internal),
            1 => Ok(AxisPolicy::External),
            2 => Ok(AxisPolicy::PreferInternal),
            3 => Ok(AxisPolicy::PreferExternal),
            other => Err(InvalidAxisPolicy(other)),
        }
    }
}

impl From<AxisPolicy> for u8 {
    fn from(policy: AxisPolicy) -> Self {
        policy as u8
    }
}

impl AxisPolicy {
    /// Pick the value for one axis
    pub fn resolve(self, internal: f32, external: f32) -> f32 {
        match self {
            AxisPolicy::Internal => internal,
            AxisPolicy::External => external,
            AxisPolicy::PreferInternal if internal == 0.0 => external,
            AxisPolicy::PreferInternal => internal,
            AxisPolicy::PreferExternal if external != 0.0 => external,
            AxisPolicy::PreferExternal => internal,
        }
    }
}

/// Simulator-side flight input for the nine device axes
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct FlightInputs {
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

/// Per-axis policy table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct AxisPolicies {
    pub pitch: AxisPolicy,
    pub roll: AxisPolicy,
    pub yaw: AxisPolicy,
    pub tx: AxisPolicy,
    pub ty: AxisPolicy,
    pub tz: AxisPolicy,
    pub wheel_steer: AxisPolicy,
    pub throttle: AxisPolicy,
    pub wheel_throttle: AxisPolicy,
}

impl AxisPolicies {
    /// Same policy on every axis
    pub const fn uniform(policy: AxisPolicy) -> Self {
        Self {
            pitch: policy,
            roll: policy,
            yaw: policy,
            tx: policy,
            ty: policy,
            tz: policy,
            wheel_steer: policy,
            throttle: policy,
            wheel_throttle: policy,
        }
    }

    /// Merge device axes into the simulator's input in place
    pub fn apply(&self, inputs: &mut FlightInputs, controls: &ControlState) {
        inputs.pitch = self.pitch.resolve(inputs.pitch, controls.pitch);
        inputs.roll = self.roll.resolve(inputs.roll, controls.roll);
        inputs.yaw = self.yaw.resolve(inputs.yaw, controls.yaw);
        inputs.tx = self.tx.resolve(inputs.tx, controls.tx);
        inputs.ty = self.ty.resolve(inputs.ty, controls.ty);
        inputs.tz = self.tz.resolve(inputs.tz, controls.tz);
        inputs.wheel_steer = self
            .wheel_steer
            .resolve(inputs.wheel_steer, controls.wheel_steer);
        inputs.throttle = self.throttle.resolve(inputs.throttle, controls.throttle);
        inputs.wheel_throttle = self
            .wheel_throttle
            .resolve(inputs.wheel_throttle, controls.wheel_throttle);
    }
}
