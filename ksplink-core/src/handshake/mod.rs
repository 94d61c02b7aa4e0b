//! Connect-time handshake
//!
//! The handshake is an explicit, finite state machine. The blocking
//! exchange that drives it over a transport lives in [`crate::link`].

pub mod events;
pub mod machine;

pub use events::HandshakeEvent;
pub use machine::{HandshakeOutcome, HandshakeState};

pub use crate::config::HandshakeConfig;
