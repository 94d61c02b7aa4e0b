//! Serial transport abstraction
//!
//! The link engine needs very little from the channel: open and close it,
//! write whole frames, ask how many bytes are waiting, and pull them one at
//! a time.

/// Byte-stream transport to the cockpit device
pub trait Transport {
    /// Error type for transport operations
    type Error;

    /// Open the underlying channel
    ///
    /// Opening an already open transport is not an error.
    fn open(&mut self) -> Result<(), Self::Error>;

    /// Close the underlying channel
    ///
    /// After closing, [`Transport::bytes_available`] reports zero.
    fn close(&mut self);

    /// Whether the channel is currently open
    fn is_open(&self) -> bool;

    /// Write a complete buffer
    ///
    /// Blocks until all data has been handed to the channel.
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Number of received bytes that can be read without blocking
    fn bytes_available(&mut self) -> Result<usize, Self::Error>;

    /// Read a single byte
    ///
    /// Blocks if nothing is available; callers check
    /// [`Transport::bytes_available`] first.
    fn read_byte(&mut self) -> Result<u8, Self::Error>;
}

/// Serial line configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SerialConfig {
    /// Baud rate in bits per second
    pub baudrate: u32,
    /// Number of data bits (typically 8)
    pub data_bits: DataBits,
    /// Parity mode
    pub parity: Parity,
    /// Number of stop bits
    pub stop_bits: StopBits,
}

impl SerialConfig {
    /// 8N1 at the given baud rate
    pub const fn with_baudrate(baudrate: u32) -> Self {
        Self {
            baudrate,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
        }
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        // Arduino sketches for the cockpit run at 38400
        Self::with_baudrate(38_400)
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DataBits {
    Seven,
    Eight,
}

/// Parity mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Parity {
    None,
    Even,
    Odd,
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StopBits {
    One,
    Two,
}
