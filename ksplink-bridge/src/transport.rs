//! Serial port transport
//!
//! Implements the link transport on top of the `serialport` crate. The
//! port is opened lazily so a list of candidates can be built up front and
//! probed one at a time.

use std::io::{Read, Write};
use std::time::Duration;

use log::{debug, trace};
use serialport::SerialPort;

use ksplink_hal::{DataBits, Parity, SerialConfig, StopBits, Transport};

/// Read and write timeout
const PORT_TIMEOUT: Duration = Duration::from_millis(50);

/// Transport over one named serial port
pub struct SerialPortTransport {
    name: String,
    config: SerialConfig,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialPortTransport {
    /// Describe a port without opening it
    pub fn new(name: impl Into<String>, config: SerialConfig) -> Self {
        Self {
            name: name.into(),
            config,
            port: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    fn port(&mut self) -> Result<&mut Box<dyn SerialPort>, serialport::Error> {
        self.port.as_mut().ok_or_else(|| {
            serialport::Error::new(serialport::ErrorKind::NoDevice, "port is not open")
        })
    }
}

fn data_bits(bits: DataBits) -> serialport::DataBits {
    match bits {
        DataBits::Seven => serialport::DataBits::Seven,
        DataBits::Eight => serialport::DataBits::Eight,
    }
}

fn parity(parity: Parity) -> serialport::Parity {
    match parity {
        Parity::None => serialport::Parity::None,
        Parity::Even => serialport::Parity::Even,
        Parity::Odd => serialport::Parity::Odd,
    }
}

fn stop_bits(bits: StopBits) -> serialport::StopBits {
    match bits {
        StopBits::One => serialport::StopBits::One,
        StopBits::Two => serialport::StopBits::Two,
    }
}

impl Transport for SerialPortTransport {
    type Error = serialport::Error;

    fn open(&mut self) -> Result<(), serialport::Error> {
        if self.port.is_some() {
            return Ok(());
        }

        let port = serialport::new(&self.name, self.config.baudrate)
            .data_bits(data_bits(self.config.data_bits))
            .parity(parity(self.config.parity))
            .stop_bits(stop_bits(self.config.stop_bits))
            .flow_control(serialport::FlowControl::None)
            .timeout(PORT_TIMEOUT)
            .open()?;

        debug!("Opened {} at {} baud", self.name, self.config.baudrate);
        self.port = Some(port);
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            debug!("Closed {}", self.name);
        }
    }

    fn is_open(&self) -> bool {
        self.port.is_some()
    }

    fn write(&mut self, data: &[u8]) -> Result<(), serialport::Error> {
        let port = self.port()?;
        port.write_all(data)?;
        port.flush()?;
        trace!("TX: {} bytes", data.len());
        Ok(())
    }

    fn bytes_available(&mut self) -> Result<usize, serialport::Error> {
        match self.port.as_ref() {
            Some(port) => Ok(port.bytes_to_read()? as usize),
            None => Ok(0),
        }
    }

    fn read_byte(&mut self) -> Result<u8, serialport::Error> {
        let mut byte = [0u8; 1];
        self.port()?.read_exact(&mut byte)?;
        Ok(byte[0])
    }
}

/// Names of the serial ports the operating system reports
pub fn discover_ports() -> Vec<String> {
    match serialport::available_ports() {
        Ok(ports) => ports.into_iter().map(|info| info.port_name).collect(),
        Err(e) => {
            debug!("Port enumeration failed: {}", e);
            Vec::new()
        }
    }
}
