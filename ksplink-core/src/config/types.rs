//! Configuration type definitions

use heapless::String;
use ksplink_hal::SerialConfig;

use crate::control::AxisPolicies;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Maximum serial port name length
pub const MAX_PORT_NAME_LEN: usize = 64;

/// Default line speed of the device firmware
pub const DEFAULT_BAUD_RATE: u32 = 38_400;

/// Default telemetry period in milliseconds
pub const DEFAULT_REFRESH_MS: u32 = 80;

/// Connect-time handshake settings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct HandshakeConfig {
    /// When false, the first port that opens is used without a challenge
    pub enabled: bool,
    /// Wait after opening, so a board that resets on open can boot
    pub settle_delay_ms: u32,
    /// Gap between reply polls
    pub poll_interval_ms: u32,
    /// Number of reply polls before giving up
    pub max_attempts: u8,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            settle_delay_ms: 2500,
            poll_interval_ms: 100,
            max_attempts: 15,
        }
    }
}

impl HandshakeConfig {
    /// Longest time a single port can spend in the handshake
    pub fn worst_case_ms(&self) -> u32 {
        self.settle_delay_ms
            .saturating_add(self.poll_interval_ms.saturating_mul(u32::from(self.max_attempts)))
    }
}

/// Link configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LinkConfig {
    /// Config layout version
    pub version: u8,
    /// Port tried before any other; empty for none
    pub default_port: String<MAX_PORT_NAME_LEN>,
    /// Line speed
    pub baud_rate: u32,
    /// Telemetry period in milliseconds
    pub refresh_ms: u32,
    /// Handshake settings
    pub handshake: HandshakeConfig,
    /// Per-axis override policy
    pub axes: AxisPolicies,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            default_port: String::new(),
            baud_rate: DEFAULT_BAUD_RATE,
            refresh_ms: DEFAULT_REFRESH_MS,
            handshake: HandshakeConfig::default(),
            axes: AxisPolicies::default(),
        }
    }
}

/// Reasons a configuration is refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigIssue {
    /// Baud rate of zero
    ZeroBaudRate,
    /// Telemetry period of zero
    ZeroRefresh,
    /// Handshake enabled with no reply polls
    ZeroAttempts,
    /// Layout version this build does not understand
    UnsupportedVersion(u8),
}

impl LinkConfig {
    /// Serial line settings for this configuration
    pub fn serial(&self) -> SerialConfig {
        SerialConfig::with_baudrate(self.baud_rate)
    }

    /// The configured default port, if any
    pub fn default_port(&self) -> Option<&str> {
        let port = self.default_port.trim();
        (!port.is_empty()).then_some(port)
    }

    /// Check the values the link cannot run with
    pub fn validate(&self) -> Result<(), ConfigIssue> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigIssue::UnsupportedVersion(self.version));
        }
        if self.baud_rate == 0 {
            return Err(ConfigIssue::ZeroBaudRate);
        }
        if self.refresh_ms == 0 {
            return Err(ConfigIssue::ZeroRefresh);
        }
        if self.handshake.enabled && self.handshake.max_attempts == 0 {
            return Err(ConfigIssue::ZeroAttempts);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = LinkConfig::default();
        assert_eq!(config.baud_rate, 38_400);
        assert_eq!(config.refresh_ms, 80);
        assert!(config.handshake.enabled);
        assert_eq!(config.handshake.settle_delay_ms, 2500);
        assert_eq!(config.handshake.poll_interval_ms, 100);
        assert_eq!(config.handshake.max_attempts, 15);
        assert_eq!(config.default_port(), None);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_worst_case() {
        assert_eq!(HandshakeConfig::default().worst_case_ms(), 4000);
    }

    #[test]
    fn test_default_port_trimmed() {
        let mut config = LinkConfig::default();
        config.default_port = String::try_from("  COM3 ").unwrap();
        assert_eq!(config.default_port(), Some("COM3"));

        config.default_port = String::try_from("   ").unwrap();
        assert_eq!(config.default_port(), None);
    }

    #[test]
    fn test_validate() {
        let mut config = LinkConfig::default();
        config.refresh_ms = 0;
        assert_eq!(config.validate(), Err(ConfigIssue::ZeroRefresh));

        let mut config = LinkConfig::default();
        config.baud_rate = 0;
        assert_eq!(config.validate(), Err(ConfigIssue::ZeroBaudRate));

        let mut config = LinkConfig::default();
        config.handshake.max_attempts = 0;
        assert_eq!(config.validate(), Err(ConfigIssue::ZeroAttempts));
        config.handshake.enabled = false;
        assert_eq!(config.validate(), Ok(()));

        let mut config = LinkConfig::default();
        config.version = 9;
        assert_eq!(config.validate(), Err(ConfigIssue::UnsupportedVersion(9)));
    }

    #[test]
    fn test_serial_settings() {
        let mut config = LinkConfig::default();
        config.baud_rate = 115_200;
        assert_eq!(config.serial().baudrate, 115_200);
    }
}
