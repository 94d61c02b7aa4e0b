//! Edge detection between control snapshots
//!
//! The link keeps the latest decoded snapshot as `current` and the last
//! reconciled one as `previous`. Reconciling diffs the two, then copies
//! current into previous in the same step, so no change is reported twice
//! and none is skipped between reconciles.

use ksplink_protocol::packets::control::CONTROL_GROUPS;

use super::modes::{AutopilotMode, ControlMode, SpeedMode};
use super::state::{ControlState, Toggle};

/// Field-level differences worth acting on
///
/// `None` means "unchanged". The stage field is special: it only reports
/// presses, never releases or a held switch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ControlChanges {
    pub sas: Option<bool>,
    pub rcs: Option<bool>,
    pub lights: Option<bool>,
    pub gear: Option<bool>,
    pub brakes: Option<bool>,
    pub precision: Option<bool>,
    pub abort: Option<bool>,
    /// Stage switch went from released to pressed
    pub stage_pressed: bool,
    pub control_groups: [Option<bool>; CONTROL_GROUPS + 1],
    /// New autopilot mode; only reported for values 1..=10
    pub autopilot: Option<AutopilotMode>,
    /// New speed display mode; zero is never reported
    pub speed: Option<SpeedMode>,
    pub mode: Option<ControlMode>,
}

fn changed(previous: bool, current: bool) -> Option<bool> {
    (previous != current).then_some(current)
}

impl ControlChanges {
    /// Diff two snapshots
    pub fn between(previous: &ControlState, current: &ControlState) -> Self {
        let mut control_groups = [None; CONTROL_GROUPS + 1];
        for group in 1..=CONTROL_GROUPS {
            control_groups[group] = changed(
                previous.control_groups[group],
                current.control_groups[group],
            );
        }

        let autopilot = if previous.autopilot_mode != current.autopilot_mode {
            current.autopilot()
        } else {
            None
        };
        let speed = if previous.speed_mode != current.speed_mode {
            current.speed()
        } else {
            None
        };
        let mode = if previous.mode != current.mode {
            current.control_mode()
        } else {
            None
        };

        Self {
            sas: changed(previous.sas, current.sas),
            rcs: changed(previous.rcs, current.rcs),
            lights: changed(previous.lights, current.lights),
            gear: changed(previous.gear, current.gear),
            brakes: changed(previous.brakes, current.brakes),
            precision: changed(previous.precision, current.precision),
            abort: changed(previous.abort, current.abort),
            stage_pressed: current.stage && !previous.stage,
            control_groups,
            autopilot,
            speed,
            mode,
        }
    }

    /// Every switch position of `current`, as if all of them had changed
    ///
    /// Used once after connecting so the simulator matches the panel.
    /// Stage is left out: a held stage switch must not fire on connect.
    pub fn initial_sync(current: &ControlState) -> Self {
        let mut control_groups = [None; CONTROL_GROUPS + 1];
        for group in 1..=CONTROL_GROUPS {
            control_groups[group] = Some(current.control_groups[group]);
        }

        Self {
            sas: Some(current.sas),
            rcs: Some(current.rcs),
            lights: Some(current.lights),
            gear: Some(current.gear),
            brakes: Some(current.brakes),
            precision: Some(current.precision),
            abort: Some(current.abort),
            stage_pressed: false,
            control_groups,
            autopilot: current.autopilot(),
            speed: current.speed(),
            mode: current.control_mode(),
        }
    }

    /// Change reported for one toggle; stage reports presses only
    pub fn toggle(&self, toggle: Toggle) -> Option<bool> {
        match toggle {
            Toggle::Sas => self.sas,
            Toggle::Rcs => self.rcs,
            Toggle::Lights => self.lights,
            Toggle::Gear => self.gear,
            Toggle::Brakes => self.brakes,
            Toggle::Precision => self.precision,
            Toggle::Abort => self.abort,
            Toggle::Stage => self.stage_pressed.then_some(true),
        }
    }

    /// Groups that changed, with their new state
    pub fn changed_groups(&self) -> impl Iterator<Item = (usize, bool)> + '_ {
        self.control_groups
            .iter()
            .enumerate()
            .filter_map(|(group, change)| change.map(|on| (group, on)))
    }

    /// Whether nothing needs doing
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Current and previous control snapshots
#[derive(Debug, Clone, Default)]
pub struct ControlPair {
    current: ControlState,
    previous: ControlState,
    /// Stage press seen by `update` that the next reconcile must report
    stage_latched: bool,
    updates: u32,
}

impl ControlPair {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest decoded snapshot
    pub fn current(&self) -> &ControlState {
        &self.current
    }

    /// Snapshot as of the last reconcile
    pub fn previous(&self) -> &ControlState {
        &self.previous
    }

    /// Number of snapshots received since the last reset
    pub fn updates(&self) -> u32 {
        self.updates
    }

    /// Whether current differs from the last reconciled snapshot
    pub fn has_update(&self) -> bool {
        self.updates > 0 && self.current != self.previous
    }

    /// Replace the current snapshot
    ///
    /// A stage press that is released again before the next reconcile is
    /// still reported once.
    pub fn update(&mut self, state: ControlState) {
        if state.stage && !self.current.stage {
            self.stage_latched = true;
        }
        self.current = state;
        self.updates = self.updates.wrapping_add(1);
    }

    /// Diff current against previous, then make current the new previous
    pub fn reconcile(&mut self) -> ControlChanges {
        let mut changes = ControlChanges::between(&self.previous, &self.current);
        changes.stage_pressed |= self.stage_latched;
        self.stage_latched = false;
        self.previous = self.current;
        changes
    }

    /// Forget both snapshots
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksplink_protocol::ControlPacket;

    fn state(main_controls: u8, navball: u8, groups: u16) -> ControlState {
        ControlState::decode(&ControlPacket {
            main_controls,
            navball_sas_mode: navball,
            control_group: groups,
            ..Default::default()
        })
    }

    const STAGE: u8 = 0b0000_0001;
    const SAS: u8 = 0b1000_0000;

    #[test]
    fn test_stage_fires_once_per_press() {
        let mut pair = ControlPair::new();

        pair.update(state(STAGE, 0, 0));
        assert!(pair.reconcile().stage_pressed);

        // Held: no repeat
        pair.update(state(STAGE, 0, 0));
        assert!(!pair.reconcile().stage_pressed);

        // Released: no event
        pair.update(state(0, 0, 0));
        let changes = pair.reconcile();
        assert!(!changes.stage_pressed);
        assert!(changes.is_empty());

        // Pressed again
        pair.update(state(STAGE, 0, 0));
        assert!(pair.reconcile().stage_pressed);
    }

    #[test]
    fn test_quick_press_between_reconciles() {
        let mut pair = ControlPair::new();
        pair.update(state(STAGE, 0, 0));
        pair.update(state(0, 0, 0));

        let changes = pair.reconcile();
        assert!(changes.stage_pressed);
        assert!(!pair.reconcile().stage_pressed);
    }

    #[test]
    fn test_toggle_changes() {
        let mut pair = ControlPair::new();
        pair.update(state(SAS, 0, 0));
        let changes = pair.reconcile();
        assert_eq!(changes.sas, Some(true));
        assert_eq!(changes.toggle(Toggle::Sas), Some(true));
        assert_eq!(changes.rcs, None);

        pair.update(state(0, 0, 0));
        assert_eq!(pair.reconcile().sas, Some(false));

        pair.update(state(0, 0, 0));
        assert_eq!(pair.reconcile().sas, None);
    }

    #[test]
    fn test_previous_follows_current() {
        let mut pair = ControlPair::new();
        pair.update(state(SAS, 0x21, 0));
        assert!(pair.has_update());
        assert!(!pair.previous().sas);

        pair.reconcile();
        assert_eq!(pair.previous(), pair.current());
        assert!(!pair.has_update());
    }

    #[test]
    fn test_group_changes() {
        let mut pair = ControlPair::new();
        pair.update(state(0, 0, 1 << 3 | 1 << 10));
        let changes = pair.reconcile();

        let mut groups = changes.changed_groups();
        assert_eq!(groups.next(), Some((3, true)));
        assert_eq!(groups.next(), Some((10, true)));
        assert_eq!(groups.next(), None);

        pair.update(state(0, 0, 1 << 10));
        let changes = pair.reconcile();
        assert_eq!(changes.control_groups[3], Some(false));
        assert_eq!(changes.control_groups[10], None);
    }

    #[test]
    fn test_autopilot_only_on_change_and_in_range() {
        let mut pair = ControlPair::new();

        pair.update(state(0, 0x02, 0));
        assert_eq!(pair.reconcile().autopilot, Some(AutopilotMode::Prograde));

        // Unchanged
        pair.update(state(0, 0x02, 0));
        assert_eq!(pair.reconcile().autopilot, None);

        // Changed but out of range
        pair.update(state(0, 0x0C, 0));
        assert_eq!(pair.reconcile().autopilot, None);

        // Changed to zero
        pair.update(state(0, 0x00, 0));
        assert_eq!(pair.reconcile().autopilot, None);
    }

    #[test]
    fn test_speed_zero_ignored() {
        let mut pair = ControlPair::new();
        pair.update(state(0, 0x30, 0));
        assert_eq!(pair.reconcile().speed, Some(SpeedMode::Target));

        pair.update(state(0, 0x00, 0));
        assert_eq!(pair.reconcile().speed, None);
    }

    #[test]
    fn test_initial_sync() {
        let current = state(SAS | STAGE, 0x11, 1 << 2);
        let changes = ControlChanges::initial_sync(&current);

        assert_eq!(changes.sas, Some(true));
        assert_eq!(changes.rcs, Some(false));
        assert!(!changes.stage_pressed);
        assert_eq!(changes.control_groups[0], None);
        assert_eq!(changes.control_groups[2], Some(true));
        assert_eq!(changes.control_groups[5], Some(false));
        assert_eq!(changes.autopilot, Some(AutopilotMode::StabilityAssist));
        assert_eq!(changes.speed, Some(SpeedMode::Orbit));
        assert_eq!(changes.mode, Some(ControlMode::Stage));
    }

    #[test]
    fn test_reset() {
        let mut pair = ControlPair::new();
        pair.update(state(STAGE, 0, 0));
        pair.reset();
        assert_eq!(pair.updates(), 0);
        assert!(!pair.reconcile().stage_pressed);
    }
}
