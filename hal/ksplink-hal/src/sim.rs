//! Scripted in-memory transport
//!
//! Models the serial channel as a plain byte stream for host tests. Incoming
//! bytes are either queued immediately or scheduled to appear after a number
//! of [`Transport::bytes_available`] polls, which lets a test say "the reply
//! arrives on the fifth poll" without real time.

use heapless::{Deque, Vec};

use crate::transport::Transport;

/// Capacity of the receive queue
pub const SIM_RX_CAPACITY: usize = 1024;

/// Capacity of the captured write log
pub const SIM_TX_CAPACITY: usize = 2048;

/// Maximum number of pending scheduled deliveries
const MAX_SCHEDULED: usize = 8;

/// Maximum size of one scheduled delivery
const MAX_DELIVERY: usize = 256;

/// Errors produced by the scripted transport
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SimError {
    /// Open was scripted to fail
    OpenFailed,
    /// Operation on a closed transport
    NotOpen,
    /// Read with nothing queued
    Empty,
    /// Queue or log capacity exceeded
    Overflow,
}

#[derive(Debug)]
struct Delivery {
    after_polls: u32,
    bytes: Vec<u8, MAX_DELIVERY>,
}

/// In-memory transport with scripted input and captured output
#[derive(Debug)]
pub struct ScriptedTransport {
    open: bool,
    fail_open: bool,
    polls: u32,
    rx: Deque<u8, SIM_RX_CAPACITY>,
    tx: Vec<u8, SIM_TX_CAPACITY>,
    scheduled: Vec<Delivery, MAX_SCHEDULED>,
    opens: u32,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedTransport {
    /// Create a closed transport with nothing queued
    pub fn new() -> Self {
        Self {
            open: false,
            fail_open: false,
            polls: 0,
            rx: Deque::new(),
            tx: Vec::new(),
            scheduled: Vec::new(),
            opens: 0,
        }
    }

    /// Create a transport whose `open` always fails
    pub fn failing() -> Self {
        let mut transport = Self::new();
        transport.fail_open = true;
        transport
    }

    /// Queue bytes that are available immediately
    pub fn push_rx(&mut self, bytes: &[u8]) -> Result<(), SimError> {
        for &byte in bytes {
            self.rx.push_back(byte).map_err(|_| SimError::Overflow)?;
        }
        Ok(())
    }

    /// Queue bytes that become available once `after_polls` availability
    /// polls have happened (counted from now)
    pub fn schedule_rx(&mut self, after_polls: u32, bytes: &[u8]) -> Result<(), SimError> {
        let mut delivery = Vec::new();
        delivery
            .extend_from_slice(bytes)
            .map_err(|_| SimError::Overflow)?;
        self.scheduled
            .push(Delivery {
                after_polls: self.polls + after_polls,
                bytes: delivery,
            })
            .map_err(|_| SimError::Overflow)
    }

    /// Everything written so far
    pub fn written(&self) -> &[u8] {
        &self.tx
    }

    /// Forget the captured writes
    pub fn clear_written(&mut self) {
        self.tx.clear();
    }

    /// Number of successful opens
    pub fn open_count(&self) -> u32 {
        self.opens
    }

    fn release_due(&mut self) -> Result<(), SimError> {
        let polls = self.polls;
        let mut index = 0;
        while index < self.scheduled.len() {
            if self.scheduled[index].after_polls <= polls {
                let delivery = self.scheduled.remove(index);
                for &byte in delivery.bytes.iter() {
                    self.rx.push_back(byte).map_err(|_| SimError::Overflow)?;
                }
            } else {
                index += 1;
            }
        }
        Ok(())
    }
}

impl Transport for ScriptedTransport {
    type Error = SimError;

    fn open(&mut self) -> Result<(), SimError> {
        if self.fail_open {
            return Err(SimError::OpenFailed);
        }
        if !self.open {
            self.open = true;
            self.opens += 1;
        }
        Ok(())
    }

    fn close(&mut self) {
        self.open = false;
    }

    fn is_open(&self) -> bool {
        self.open
    }

    fn write(&mut self, data: &[u8]) -> Result<(), SimError> {
        if !self.open {
            return Err(SimError::NotOpen);
        }
        self.tx.extend_from_slice(data).map_err(|_| SimError::Overflow)
    }

    fn bytes_available(&mut self) -> Result<usize, SimError> {
        if !self.open {
            return Ok(0);
        }
        self.polls += 1;
        self.release_due()?;
        Ok(self.rx.len())
    }

    fn read_byte(&mut self) -> Result<u8, SimError> {
        if !self.open {
            return Err(SimError::NotOpen);
        }
        self.rx.pop_front().ok_or(SimError::Empty)
    }
}
