//! Telemetry send scheduling
//!
//! Telemetry goes out at a fixed period. The schedule works on caller
//! supplied millisecond timestamps so it can run from any clock.

/// Fixed-period telemetry schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetrySchedule {
    period_ms: u64,
    last_ms: Option<u64>,
}

impl TelemetrySchedule {
    /// Schedule with the given period; zero sends on every check
    pub const fn new(period_ms: u32) -> Self {
        Self {
            period_ms: period_ms as u64,
            last_ms: None,
        }
    }

    pub fn period_ms(&self) -> u64 {
        self.period_ms
    }

    /// Returns true and restarts the period when a send is due
    ///
    /// The first check is always due. A clock that goes backwards restarts
    /// the period from the new reading.
    pub fn due(&mut self, now_ms: u64) -> bool {
        let due = match self.last_ms {
            None => true,
            Some(last) if now_ms < last => true,
            Some(last) => now_ms - last >= self.period_ms,
        };
        if due {
            self.last_ms = Some(now_ms);
        }
        due
    }

    /// Milliseconds until the next send, zero when already due
    pub fn remaining_ms(&self, now_ms: u64) -> u64 {
        match self.last_ms {
            None => 0,
            Some(last) => (last + self.period_ms).saturating_sub(now_ms),
        }
    }

    /// Forget the last send so the next check is due
    pub fn reset(&mut self) {
        self.last_ms = None;
    }
}
