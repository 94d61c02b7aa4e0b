//! Link task
//!
//! Probes the candidate ports, then runs the bridge loop on the port that
//! answered: poll the device, act on control changes, and send telemetry
//! at the configured period. The loop ends when the shutdown signal is
//! raised or the link fails; the port is closed either way.

use std::fmt::Debug;

use embassy_time::{block_for, Delay, Duration, Instant};
use log::{debug, info, warn};

use ksplink_core::{
    probe, CancelSignal, ControlChanges, HandshakeOutcome, LinkConfig, LinkError, LinkStats,
    SerialLink, TelemetrySchedule, Toggle,
};
use ksplink_hal::Transport;

use crate::bench::BenchVessel;
use crate::config::BridgeConfig;
use crate::error::BridgeError;
use crate::transport::{discover_ports, SerialPortTransport};

/// Bridge loop period
const TICK: Duration = Duration::from_millis(10);

/// What one tick did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickReport {
    pub frames: usize,
    pub rejects: usize,
    /// Changes acted on, when a control packet arrived
    pub changes: Option<ControlChanges>,
    pub telemetry_sent: bool,
}

/// One confirmed link plus the vessel it drives
pub struct Bridge<T: Transport> {
    link: SerialLink<T>,
    schedule: TelemetrySchedule,
    vessel: BenchVessel,
    synced: bool,
}

impl<T> Bridge<T>
where
    T: Transport,
    T::Error: Debug,
{
    pub fn new(link: SerialLink<T>, config: &LinkConfig) -> Self {
        Self {
            link,
            schedule: TelemetrySchedule::new(config.refresh_ms),
            vessel: BenchVessel::new(config.axes),
            synced: false,
        }
    }

    pub fn link(&self) -> &SerialLink<T> {
        &self.link
    }

    pub fn vessel(&self) -> &BenchVessel {
        &self.vessel
    }

    pub fn into_link(self) -> SerialLink<T> {
        self.link
    }

    /// Run one pass of the bridge loop
    pub fn tick(&mut self, now_ms: u64) -> Result<TickReport, BridgeError> {
        let summary = self.link.poll().map_err(BridgeError::link)?;
        for reject in &summary.rejects {
            warn!("Dropped frame: {:?}", reject);
        }

        let mut report = TickReport {
            frames: summary.frames,
            rejects: summary.rejects.len(),
            ..Default::default()
        };

        if summary.control_updated {
            let changes = self.link.reconcile_controls();
            let changes = if self.synced {
                changes
            } else {
                self.synced = true;
                info!("Panel connected, syncing switch positions");
                ControlChanges::initial_sync(self.link.current_control_state())
            };
            log_changes(&changes);
            self.vessel.apply(&changes);
            report.changes = Some(changes);
        }

        if self.schedule.due(now_ms) {
            let data = self.vessel.sample(now_ms, self.link.current_control_state());
            self.link.set_telemetry(data);
            report.telemetry_sent = self.link.send_telemetry().map_err(BridgeError::link)?;
        }

        Ok(report)
    }
}

fn on_off(on: bool) -> &'static str {
    if on {
        "on"
    } else {
        "off"
    }
}

fn log_changes(changes: &ControlChanges) {
    for toggle in Toggle::ALL {
        if toggle == Toggle::Stage {
            continue;
        }
        if let Some(on) = changes.toggle(toggle) {
            info!("{:?} {}", toggle, on_off(on));
        }
    }
    if changes.stage_pressed {
        info!("Stage!");
    }
    for (group, on) in changes.changed_groups() {
        info!("Action group {} {}", group, on_off(on));
    }
    if let Some(mode) = changes.autopilot {
        info!("Autopilot {:?}", mode);
    }
    if let Some(mode) = changes.speed {
        info!("Speed display {:?}", mode);
    }
    if let Some(mode) = changes.mode {
        debug!("Panel mode {:?}", mode);
    }
}

fn log_attempt(name: &str, result: &Result<HandshakeOutcome, LinkError<serialport::Error>>) {
    match result {
        Ok(HandshakeOutcome::Confirmed) => info!("{}: cockpit device confirmed", name),
        Ok(HandshakeOutcome::Skipped) => info!("{}: handshake disabled, using this port", name),
        Ok(HandshakeOutcome::TimedOut) => info!("{}: no cockpit device", name),
        Ok(HandshakeOutcome::Cancelled) => info!("{}: probe cancelled", name),
        Err(LinkError::Transport(e)) => warn!("{}: cannot open: {}", name, e),
        Err(e) => warn!("{}: {}", name, e),
    }
}

fn log_stats(stats: &LinkStats) {
    info!(
        "Link closed: {} frames in, {} telemetry out, {} rejected",
        stats.frames,
        stats.telemetry_sent,
        stats.rejects()
    );
    debug!(
        "  {} size mismatches, {} checksum failures, {} bytes skipped",
        stats.size_mismatches, stats.checksum_failures, stats.discarded
    );
}

/// Find the device and run the bridge until shutdown
pub fn run_link(config: &BridgeConfig, cancel: &CancelSignal) -> Result<(), BridgeError> {
    let names = config.candidate_ports(&discover_ports());
    if names.is_empty() {
        return Err(BridgeError::NoPorts);
    }
    info!("Probing {} port(s): {}", names.len(), names.join(", "));

    let serial = config.link.serial();
    let candidates = names.iter().map(|name| {
        debug!("Trying {}", name);
        SerialPortTransport::new(name.as_str(), serial)
    });

    let mut delay = Delay;
    let found = probe(candidates, &config.link.handshake, &mut delay, cancel);
    for attempt in &found.attempts {
        let name = names.get(attempt.index).map_or("?", String::as_str);
        log_attempt(name, &attempt.result);
    }

    let Some(link) = found.link else {
        if cancel.signaled() {
            info!("Stopped while probing");
            return Ok(());
        }
        return Err(BridgeError::NoDevice {
            tried: found.attempts.len(),
        });
    };
    let mut bridge = Bridge::new(link, &config.link);
    info!("Using {}", bridge.link().transport().name());
    let clock = Instant::now();
    let result = loop {
        if cancel.signaled() {
            break Ok(());
        }
        if let Err(e) = bridge.tick(clock.elapsed().as_millis()) {
            break Err(e);
        }
        block_for(TICK);
    };

    debug!(
        "Bench vessel: T+{} s, stage {}",
        bridge.vessel().data().mission_time,
        bridge.vessel().data().current_stage
    );
    let mut link = bridge.into_link();
    link.close();
    log_stats(link.stats());
    result
}
