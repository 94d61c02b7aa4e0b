//! ksplink Hardware Abstraction Layer
//!
//! This crate defines the transport abstraction the link engine talks to.
//! Concrete transports (a host serial port, an in-memory script for tests)
//! implement [`Transport`] so the same protocol code runs against either.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  ksplink-core (SerialLink, handshake)   │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  ksplink-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  serial port  │       │   scripted    │
//! │   (bridge)    │       │  (sim, tests) │
//! └───────────────┘       └───────────────┘
//! ```

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "sim")]
pub mod sim;
pub mod transport;

pub use transport::{DataBits, Parity, SerialConfig, StopBits, Transport};

#[cfg(feature = "sim")]
pub use sim::{ScriptedTransport, SimError};
