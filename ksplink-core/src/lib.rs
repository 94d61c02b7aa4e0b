//! Board-agnostic link logic for the cockpit bridge
//!
//! This crate contains everything between the byte protocol and the
//! simulator that does not depend on a particular serial port:
//!
//! - Handshake state machine and the blocking connect-time exchange
//! - Control decoding, current/previous snapshots and change detection
//! - Axis override policy for merging device axes with simulator input
//! - Telemetry send scheduling
//! - The `SerialLink` connection object and device probing
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod control;
pub mod handshake;
pub mod link;
pub mod telemetry;

pub use config::{HandshakeConfig, LinkConfig};
pub use control::{
    AutopilotMode, AxisPolicies, AxisPolicy, ControlChanges, ControlMode, ControlPair,
    ControlState, FlightInputs, SpeedMode, Toggle,
};
pub use handshake::{HandshakeEvent, HandshakeOutcome, HandshakeState};
pub use link::{
    probe, CancelSignal, LinkError, LinkStats, PollSummary, Probe, ProbeAttempt, SerialLink,
};
pub use telemetry::TelemetrySchedule;
