//! Cross-thread signals
//!
//! Uses embassy-sync primitives so the link code can share the same cancel
//! type it uses in tests.

use ksplink_core::CancelSignal;

/// Raised once when the operator asks the bridge to stop
pub static SHUTDOWN: CancelSignal = CancelSignal::new();
