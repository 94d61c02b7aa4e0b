//! Bench vessel
//!
//! Stands in for the simulator when the bridge runs on its own: it applies
//! the panel's switch changes to a vessel record, flies the attitude from
//! the merged axes and produces the telemetry the panel displays.

use ksplink_core::{AxisPolicies, ControlChanges, ControlState, FlightInputs, Toggle};
use ksplink_protocol::{pack_navball_mode, NavHeading, StatusGroup, VesselData};

/// Degrees per second at full stick deflection
const TURN_RATE_DPS: f32 = 30.0;

/// Liquid fuel units per second at full throttle
const BURN_RATE: f32 = 8.0;

const FULL_TANK: f32 = 360.0;
const STAGES: u8 = 4;

/// A vessel the bridge can fly without a simulator
#[derive(Debug, Clone)]
pub struct BenchVessel {
    data: VesselData,
    policies: AxisPolicies,
    autopilot: u8,
    speed: u8,
    started_ms: Option<u64>,
    last_ms: Option<u64>,
}

impl BenchVessel {
    pub fn new(policies: AxisPolicies) -> Self {
        let data = VesselData {
            liquid_fuel_tot: FULL_TANK,
            liquid_fuel: FULL_TANK,
            liquid_fuel_tot_s: FULL_TANK,
            liquid_fuel_s: FULL_TANK,
            current_stage: STAGES,
            total_stage: STAGES,
            // Kerbin
            soi_number: 130,
            ..Default::default()
        };

        Self {
            data,
            policies,
            autopilot: 0,
            speed: 0,
            started_ms: None,
            last_ms: None,
        }
    }

    pub fn data(&self) -> &VesselData {
        &self.data
    }

    /// Act on switch changes reported by the panel
    pub fn apply(&mut self, changes: &ControlChanges) {
        let groups = &mut self.data.action_groups;
        for (toggle, group) in [
            (Toggle::Sas, StatusGroup::Sas),
            (Toggle::Rcs, StatusGroup::Rcs),
            (Toggle::Lights, StatusGroup::Light),
            (Toggle::Gear, StatusGroup::Gear),
            (Toggle::Brakes, StatusGroup::Brakes),
            (Toggle::Abort, StatusGroup::Abort),
        ] {
            if let Some(on) = changes.toggle(toggle) {
                groups.set(group, on);
            }
        }
        for (group, on) in changes.changed_groups() {
            groups.set(StatusGroup::Custom(group as u8), on);
        }

        if changes.stage_pressed && self.data.current_stage > 0 {
            self.data.current_stage -= 1;
            self.data.liquid_fuel_s = self.data.liquid_fuel_tot_s;
        }

        if let Some(mode) = changes.autopilot {
            self.autopilot = mode.to_nibble();
        }
        if let Some(mode) = changes.speed {
            self.speed = mode.to_nibble();
        }
        self.data.navball_sas_mode = pack_navball_mode(self.autopilot, self.speed);
    }

    /// Advance to `now_ms` under the panel's inputs and return the record
    pub fn sample(&mut self, now_ms: u64, controls: &ControlState) -> VesselData {
        let started = *self.started_ms.get_or_insert(now_ms);
        let dt = match self.last_ms {
            Some(last) => now_ms.saturating_sub(last) as f32 / 1000.0,
            None => 0.0,
        };
        self.last_ms = Some(now_ms);

        let mut inputs = FlightInputs::default();
        self.policies.apply(&mut inputs, controls);

        let data = &mut self.data;
        data.mission_time = (now_ms.saturating_sub(started) / 1000) as u32;
        data.delta_time = dt;

        data.pitch = (data.pitch + inputs.pitch * TURN_RATE_DPS * dt).clamp(-90.0, 90.0);
        data.roll = wrap_signed(data.roll + inputs.roll * TURN_RATE_DPS * dt);
        data.heading = (data.heading + inputs.yaw * TURN_RATE_DPS * dt).rem_euclid(360.0);
        data.set_prograde(NavHeading::new(data.pitch, data.heading));
        data.set_normal_heading((data.heading + 90.0).rem_euclid(360.0));

        let burn = inputs.throttle.max(0.0) * BURN_RATE * dt;
        data.liquid_fuel = (data.liquid_fuel - burn).max(0.0);
        data.liquid_fuel_s = (data.liquid_fuel_s - burn).max(0.0);

        *data
    }
}

fn wrap_signed(degrees: f32) -> f32 {
    (degrees + 180.0).rem_euclid(360.0) - 180.0
}
