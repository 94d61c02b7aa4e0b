//! Pilot input handling
//!
//! Turns raw control payloads into typed snapshots, keeps the current and
//! previous snapshot for edge detection, and merges device axes with the
//! simulator's own input.

pub mod axis;
pub mod changes;
pub mod modes;
pub mod state;

pub use axis::{AxisPolicies, AxisPolicy, FlightInputs};
pub use changes::{ControlChanges, ControlPair};
pub use modes::{AutopilotMode, ControlMode, SpeedMode};
pub use state::{ControlState, Toggle};
