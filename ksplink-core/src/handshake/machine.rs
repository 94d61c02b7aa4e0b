//! Handshake state machine
//!
//! ```text
//! NotStarted ──ChallengeSent──▶ AwaitingReply ──reply [3,1,4]──▶ Confirmed
//!      │                              │
//!      │                     budget spent / wrong reply
//!      │                              ▼
//!      └──────────Bypass──────▶   TimedOut
//! ```
//!
//! Cancel abandons a pending exchange and Reset returns any state to
//! NotStarted.

use super::events::HandshakeEvent;

/// Handshake states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeState {
    /// Port not yet challenged
    #[default]
    NotStarted,
    /// Challenge sent, polling for the reply
    AwaitingReply { attempts_left: u8 },
    /// Device answered with the expected markers
    Confirmed,
    /// Poll budget spent or the device answered wrongly
    TimedOut,
}

/// How a handshake attempt ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum HandshakeOutcome {
    /// Device confirmed
    Confirmed,
    /// Handshake disabled; the port is trusted as-is
    Skipped,
    /// No valid reply within the poll budget
    TimedOut,
    /// Shutdown requested before the exchange finished
    Cancelled,
}

impl HandshakeOutcome {
    /// Whether the port may be used for control and telemetry
    pub fn is_usable(&self) -> bool {
        matches!(self, HandshakeOutcome::Confirmed | HandshakeOutcome::Skipped)
    }
}

impl HandshakeState {
    /// Whether the link may carry control and telemetry
    pub fn is_confirmed(&self) -> bool {
        matches!(self, HandshakeState::Confirmed)
    }

    /// Whether the exchange has finished one way or the other
    pub fn is_terminal(&self) -> bool {
        matches!(self, HandshakeState::Confirmed | HandshakeState::TimedOut)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: HandshakeEvent) -> Self {
        use HandshakeEvent::*;
        use HandshakeState::*;

        match (self, event) {
            (_, Reset) => NotStarted,

            (NotStarted, ChallengeSent { budget: 0 }) => TimedOut,
            (NotStarted, ChallengeSent { budget }) => AwaitingReply {
                attempts_left: budget,
            },
            (NotStarted, Bypass) => Confirmed,

            (AwaitingReply { .. }, Reply(packet)) if packet.is_confirmation() => Confirmed,
            (AwaitingReply { .. }, Reply(_)) => TimedOut,
            (AwaitingReply { attempts_left }, PollEmpty) if attempts_left <= 1 => TimedOut,
            (AwaitingReply { attempts_left }, PollEmpty) => AwaitingReply {
                attempts_left: attempts_left - 1,
            },
            (AwaitingReply { .. }, Cancel) => NotStarted,

            // Stray replies after the exchange are ignored
            _ => self,
        }
    }
}
