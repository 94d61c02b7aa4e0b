//! Serial link to one device
//!
//! [`SerialLink`] owns a transport together with the receiver, the control
//! snapshots and the handshake state for it. All reads and writes go
//! through `&mut self`, so one owner drives the link and frames can never
//! interleave on the wire.
//!
//! Cancellation is a [`CancelSignal`] checked between handshake polls and
//! by the caller's own loop.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use embedded_hal::delay::DelayNs;
use heapless::Vec;

use ksplink_hal::Transport;
use ksplink_protocol::{
    Frame, FrameError, FrameReceiver, HandshakePacket, Packet, VesselData, MAX_FRAME_SIZE,
};

use crate::config::HandshakeConfig;
use crate::control::{ControlChanges, ControlPair, ControlState};
use crate::handshake::{HandshakeEvent, HandshakeOutcome, HandshakeState};

/// Shutdown request shared between the link owner and whoever stops it
pub type CancelSignal = Signal<CriticalSectionRawMutex, ()>;

/// Rejections kept per poll; further ones are only counted
pub const MAX_REJECTS: usize = 8;

/// Candidates recorded by one probe run
pub const MAX_PROBE_CANDIDATES: usize = 16;

/// Longest single sleep while waiting, so cancellation stays responsive
const WAIT_SLICE_MS: u32 = 100;

/// Link errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError<E> {
    /// The transport failed
    Transport(E),
    /// A frame could not be built
    Frame(FrameError),
    /// Operation needs an open port
    NotOpen,
}

impl<E> From<FrameError> for LinkError<E> {
    fn from(e: FrameError) -> Self {
        LinkError::Frame(e)
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for LinkError<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LinkError::Transport(e) => write!(f, "transport error: {:?}", e),
            LinkError::Frame(e) => write!(f, "frame error: {:?}", e),
            LinkError::NotOpen => f.write_str("port is not open"),
        }
    }
}

/// Running counters for one link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    pub bytes_received: u32,
    pub bytes_sent: u32,
    /// Checksum-valid frames
    pub frames: u32,
    pub handshakes: u32,
    pub controls: u32,
    pub telemetry_sent: u32,
    pub size_mismatches: u32,
    pub checksum_failures: u32,
    /// Valid frames whose payload could not be decoded
    pub decode_errors: u32,
    /// Bytes skipped while hunting for the magic pair
    pub discarded: u32,
}

impl LinkStats {
    /// Every rejected frame, whatever the reason
    pub fn rejects(&self) -> u32 {
        self.size_mismatches
            .wrapping_add(self.checksum_failures)
            .wrapping_add(self.decode_errors)
    }
}

/// What one poll consumed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollSummary {
    pub bytes: usize,
    pub frames: usize,
    /// Last handshake packet seen in this poll
    pub handshake: Option<HandshakePacket>,
    /// At least one control snapshot arrived
    pub control_updated: bool,
    pub rejects: Vec<FrameError, MAX_REJECTS>,
}

impl PollSummary {
    /// Nothing was waiting on the port
    pub fn is_idle(&self) -> bool {
        self.bytes == 0
    }
}

/// Connection to one device
pub struct SerialLink<T: Transport> {
    transport: T,
    receiver: FrameReceiver,
    controls: ControlPair,
    handshake: HandshakeState,
    telemetry: Option<VesselData>,
    stats: LinkStats,
}

impl<T: Transport> SerialLink<T> {
    /// Wrap a transport; the port is not opened yet
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            receiver: FrameReceiver::new(),
            controls: ControlPair::new(),
            handshake: HandshakeState::NotStarted,
            telemetry: None,
            stats: LinkStats::default(),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Open the port with a clean receiver
    pub fn open(&mut self) -> Result<(), LinkError<T::Error>> {
        self.transport.open().map_err(LinkError::Transport)?;
        self.receiver.reset();
        Ok(())
    }

    /// Close the port and drop every piece of per-connection state
    pub fn close(&mut self) {
        self.transport.close();
        self.receiver.reset();
        self.controls.reset();
        self.handshake = self.handshake.transition(HandshakeEvent::Reset);
        self.telemetry = None;
    }

    pub fn handshake_state(&self) -> HandshakeState {
        self.handshake
    }

    /// Whether control and telemetry may flow
    pub fn is_confirmed(&self) -> bool {
        self.handshake.is_confirmed()
    }

    pub fn stats(&self) -> &LinkStats {
        &self.stats
    }

    /// Run the connect-time handshake on an open port
    ///
    /// Waits `settle_delay_ms`, sends the challenge, then polls up to
    /// `max_attempts` times, `poll_interval_ms` apart, for the reply. A
    /// handshake packet with the wrong markers ends the exchange at once.
    /// Control packets that arrive meanwhile are decoded as usual.
    pub fn handshake<D: DelayNs>(
        &mut self,
        config: &HandshakeConfig,
        delay: &mut D,
        cancel: &CancelSignal,
    ) -> Result<HandshakeOutcome, LinkError<T::Error>> {
        if !self.transport.is_open() {
            return Err(LinkError::NotOpen);
        }
        self.handshake = self.handshake.transition(HandshakeEvent::Reset);

        if !config.enabled {
            self.handshake = self.handshake.transition(HandshakeEvent::Bypass);
            return Ok(HandshakeOutcome::Skipped);
        }

        if !wait(delay, config.settle_delay_ms, cancel) {
            return Ok(HandshakeOutcome::Cancelled);
        }

        self.receiver.reset();
        self.send_frame(&HandshakePacket::challenge().to_frame()?)?;
        self.handshake = self.handshake.transition(HandshakeEvent::ChallengeSent {
            budget: config.max_attempts,
        });

        while let HandshakeState::AwaitingReply { .. } = self.handshake {
            if !wait(delay, config.poll_interval_ms, cancel) {
                self.handshake = self.handshake.transition(HandshakeEvent::Cancel);
                return Ok(HandshakeOutcome::Cancelled);
            }

            let summary = self.poll()?;
            if summary.handshake.is_none() {
                self.handshake = self.handshake.transition(HandshakeEvent::PollEmpty);
            }
        }

        Ok(match self.handshake {
            HandshakeState::Confirmed => HandshakeOutcome::Confirmed,
            _ => HandshakeOutcome::TimedOut,
        })
    }

    /// Drain the bytes waiting on the port right now
    ///
    /// Every completed frame is dispatched: handshake packets advance the
    /// handshake and control packets replace the current snapshot.
    pub fn poll(&mut self) -> Result<PollSummary, LinkError<T::Error>> {
        if !self.transport.is_open() {
            return Err(LinkError::NotOpen);
        }

        let mut summary = PollSummary::default();
        let available = self
            .transport
            .bytes_available()
            .map_err(LinkError::Transport)?;

        for _ in 0..available {
            let byte = self.transport.read_byte().map_err(LinkError::Transport)?;
            summary.bytes += 1;

            match self.receiver.feed(byte) {
                Ok(Some(frame)) => self.dispatch(&frame, &mut summary),
                Ok(None) => {}
                Err(e) => self.reject(e, &mut summary),
            }
        }

        self.stats.bytes_received = self.stats.bytes_received.wrapping_add(summary.bytes as u32);
        self.stats.discarded = self.receiver.discarded();
        Ok(summary)
    }

    fn dispatch(&mut self, frame: &Frame, summary: &mut PollSummary) {
        summary.frames += 1;
        self.stats.frames = self.stats.frames.wrapping_add(1);

        match Packet::from_frame(frame) {
            Ok(Packet::Handshake(packet)) => {
                self.stats.handshakes = self.stats.handshakes.wrapping_add(1);
                summary.handshake = Some(packet);
                self.handshake = self.handshake.transition(HandshakeEvent::Reply(packet));
            }
            Ok(Packet::Control(packet)) => {
                self.stats.controls = self.stats.controls.wrapping_add(1);
                self.controls.update(ControlState::decode(&packet));
                summary.control_updated = true;
            }
            Err(e) => self.reject(e, summary),
        }
    }

    fn reject(&mut self, error: FrameError, summary: &mut PollSummary) {
        let counter = match error {
            FrameError::SizeMismatch { .. } => &mut self.stats.size_mismatches,
            FrameError::InvalidChecksum { .. } => &mut self.stats.checksum_failures,
            _ => &mut self.stats.decode_errors,
        };
        *counter = counter.wrapping_add(1);
        let _ = summary.rejects.push(error);
    }

    /// Latest decoded control snapshot
    pub fn current_control_state(&self) -> &ControlState {
        self.controls.current()
    }

    /// Control snapshot as of the last reconcile
    pub fn previous_control_state(&self) -> &ControlState {
        self.controls.previous()
    }

    /// Changes since the last reconcile; current becomes previous
    pub fn reconcile_controls(&mut self) -> ControlChanges {
        self.controls.reconcile()
    }

    /// Replace the telemetry record sent by [`Self::send_telemetry`]
    pub fn set_telemetry(&mut self, data: VesselData) {
        self.telemetry = Some(data);
    }

    pub fn telemetry(&self) -> Option<&VesselData> {
        self.telemetry.as_ref()
    }

    /// Send the latest telemetry record
    ///
    /// Returns false when no record has been set since the port opened.
    pub fn send_telemetry(&mut self) -> Result<bool, LinkError<T::Error>> {
        let Some(data) = self.telemetry.as_ref() else {
            return Ok(false);
        };
        let frame = data.to_frame()?;
        self.send_frame(&frame)?;
        self.stats.telemetry_sent = self.stats.telemetry_sent.wrapping_add(1);
        Ok(true)
    }

    /// Encode and write one frame
    pub fn send_frame(&mut self, frame: &Frame) -> Result<(), LinkError<T::Error>> {
        if !self.transport.is_open() {
            return Err(LinkError::NotOpen);
        }

        let mut buffer = [0u8; MAX_FRAME_SIZE];
        let len = frame.encode(&mut buffer)?;
        self.transport
            .write(&buffer[..len])
            .map_err(LinkError::Transport)?;
        self.stats.bytes_sent = self.stats.bytes_sent.wrapping_add(len as u32);
        Ok(())
    }
}

/// Sleep `ms` in short slices; false if cancelled first
fn wait<D: DelayNs>(delay: &mut D, ms: u32, cancel: &CancelSignal) -> bool {
    let mut remaining = ms;
    loop {
        if cancel.signaled() {
            return false;
        }
        if remaining == 0 {
            return true;
        }
        let slice = remaining.min(WAIT_SLICE_MS);
        delay.delay_ms(slice);
        remaining -= slice;
    }
}

/// One candidate tried by [`probe`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAttempt<E> {
    /// Position in the candidate list
    pub index: usize,
    pub result: Result<HandshakeOutcome, LinkError<E>>,
}

/// Result of probing a candidate list
pub struct Probe<T: Transport> {
    /// The first usable link, still open
    pub link: Option<SerialLink<T>>,
    pub attempts: Vec<ProbeAttempt<T::Error>, MAX_PROBE_CANDIDATES>,
}

/// Try candidates in order until one opens and passes the handshake
///
/// Ports that fail are closed again. With the handshake disabled the first
/// port that opens is taken. Only the first [`MAX_PROBE_CANDIDATES`] are
/// tried.
pub fn probe<T, I, D>(
    candidates: I,
    config: &HandshakeConfig,
    delay: &mut D,
    cancel: &CancelSignal,
) -> Probe<T>
where
    T: Transport,
    I: IntoIterator<Item = T>,
    D: DelayNs,
{
    let mut attempts = Vec::new();

    for (index, transport) in candidates
        .into_iter()
        .take(MAX_PROBE_CANDIDATES)
        .enumerate()
    {
        if cancel.signaled() {
            break;
        }

        let mut link = SerialLink::new(transport);
        let result = match link.open() {
            Ok(()) => link.handshake(config, delay, cancel),
            Err(e) => Err(e),
        };
        let usable = matches!(result, Ok(outcome) if outcome.is_usable());
        let cancelled = matches!(result, Ok(HandshakeOutcome::Cancelled));
        // Cannot fail: at most MAX_PROBE_CANDIDATES iterations
        let _ = attempts.push(ProbeAttempt { index, result });

        if usable {
            return Probe {
                link: Some(link),
                attempts,
            };
        }
        link.close();
        if cancelled {
            break;
        }
    }

    Probe {
        link: None,
        attempts,
    }
}
