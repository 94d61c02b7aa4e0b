//! Bridge configuration
//!
//! Loads `ksplink.toml` (or the file given on the command line). A missing
//! default file is not an error: the built-in defaults are used instead.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use serde::Deserialize;

use ksplink_core::config::ConfigIssue;
use ksplink_core::link::MAX_PROBE_CANDIDATES;
use ksplink_core::LinkConfig;

/// File looked for in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "ksplink.toml";

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid TOML in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("port name too long: {0}")]
    PortName(String),

    #[error("invalid link settings: {0:?}")]
    Invalid(ConfigIssue),
}

/// Which ports to probe
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PortsConfig {
    /// Tried after the default port, in order
    pub candidates: Vec<String>,
    /// Append every port the operating system reports
    pub scan: bool,
}

impl Default for PortsConfig {
    fn default() -> Self {
        Self {
            candidates: Vec::new(),
            scan: true,
        }
    }
}

/// Complete bridge configuration
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub link: LinkConfig,
    pub ports: PortsConfig,
}

impl BridgeConfig {
    /// Parse from TOML text
    pub fn from_toml(text: &str, origin: &Path) -> Result<Self, ConfigError> {
        let config: BridgeConfig = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: origin.to_path_buf(),
            source,
        })?;
        config.link.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Load from `path`, or from [`DEFAULT_CONFIG_FILE`] when it exists
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.exists() {
                    info!("No {} found, using defaults", DEFAULT_CONFIG_FILE);
                    return Ok(Self::default());
                }
                default
            }
        };

        let text = fs::read_to_string(&path).map_err(|source| ConfigError::Read {
            path: path.clone(),
            source,
        })?;
        let config = Self::from_toml(&text, &path)?;

        info!("Loaded configuration from {}", path.display());
        log_config_summary(&config);
        Ok(config)
    }

    /// Replace the default port, as `--port` does
    pub fn set_default_port(&mut self, port: &str) -> Result<(), ConfigError> {
        self.link.default_port = heapless::String::try_from(port)
            .map_err(|_| ConfigError::PortName(port.to_string()))?;
        Ok(())
    }

    /// Ports to probe: default first, then configured, then discovered
    ///
    /// Duplicates and blank names are dropped; the first occurrence wins.
    /// The list stops at the number of ports one probe run tries.
    pub fn candidate_ports(&self, discovered: &[String]) -> Vec<String> {
        let mut ports: Vec<String> = Vec::new();
        let configured = self
            .link
            .default_port()
            .into_iter()
            .chain(self.ports.candidates.iter().map(String::as_str));
        let scanned = discovered
            .iter()
            .map(String::as_str)
            .filter(|_| self.ports.scan);

        for name in configured.chain(scanned) {
            let name = name.trim();
            if !name.is_empty() && !ports.iter().any(|known| known == name) {
                if ports.len() == MAX_PROBE_CANDIDATES {
                    warn!("More than {} ports, ignoring {}", MAX_PROBE_CANDIDATES, name);
                    continue;
                }
                ports.push(name.to_string());
            }
        }
        ports
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(config: &BridgeConfig) {
    let link = &config.link;
    debug!("  default port: {:?}", link.default_port());
    debug!("  {} baud, telemetry every {} ms", link.baud_rate, link.refresh_ms);
    debug!(
        "  handshake: enabled={} settle={} ms attempts={}",
        link.handshake.enabled, link.handshake.settle_delay_ms, link.handshake.max_attempts
    );
    debug!("  axes: {:?}", link.axes);
    debug!(
        "  {} extra candidate(s), scan={}",
        config.ports.candidates.len(),
        config.ports.scan
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use ksplink_core::AxisPolicy;

    fn parse(text: &str) -> Result<BridgeConfig, ConfigError> {
        BridgeConfig::from_toml(text, Path::new("test.toml"))
    }

    #[test]
    fn test_empty_file_gives_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config, BridgeConfig::default());
        assert_eq!(config.link.baud_rate, 38_400);
        assert!(config.ports.scan);
    }

    #[test]
    fn test_full_file() {
        let config = parse(
            r#"
            [link]
            default_port = "COM4"
            baud_rate = 115200
            refresh_ms = 40

            [link.handshake]
            enabled = false
            settle_delay_ms = 0

            [link.axes]
            throttle = 1
            pitch = 3

            [ports]
            candidates = ["COM5", "COM6"]
            scan = false
            "#,
        )
        .unwrap();

        assert_eq!(config.link.default_port(), Some("COM4"));
        assert_eq!(config.link.baud_rate, 115_200);
        assert_eq!(config.link.refresh_ms, 40);
        assert!(!config.link.handshake.enabled);
        assert_eq!(config.link.handshake.settle_delay_ms, 0);
        // Unset keys keep their defaults
        assert_eq!(config.link.handshake.max_attempts, 15);
        assert_eq!(config.link.axes.throttle, AxisPolicy::External);
        assert_eq!(config.link.axes.pitch, AxisPolicy::PreferExternal);
        assert_eq!(config.link.axes.roll, AxisPolicy::Internal);
        assert_eq!(config.ports.candidates, ["COM5", "COM6"]);
        assert!(!config.ports.scan);
    }

    #[test]
    fn test_bad_axis_policy() {
        let result = parse("[link.axes]\nyaw = 7\n");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_invalid_values() {
        let result = parse("[link]\nrefresh_ms = 0\n");
        assert!(matches!(
            result,
            Err(ConfigError::Invalid(ConfigIssue::ZeroRefresh))
        ));
    }

    #[test]
    fn test_candidate_order() {
        let mut config = BridgeConfig::default();
        config.set_default_port("COM3").unwrap();
        config.ports.candidates = vec!["COM5".into(), "COM3".into(), " ".into()];

        let discovered = vec!["COM1".to_string(), "COM5".to_string()];
        assert_eq!(
            config.candidate_ports(&discovered),
            ["COM3", "COM5", "COM1"]
        );

        config.ports.scan = false;
        assert_eq!(config.candidate_ports(&discovered), ["COM3", "COM5"]);
    }

    #[test]
    fn test_candidates_capped() {
        let config = BridgeConfig::default();
        let discovered: Vec<String> = (0..40).map(|n| format!("/dev/ttyUSB{}", n)).collect();

        let ports = config.candidate_ports(&discovered);
        assert_eq!(ports.len(), MAX_PROBE_CANDIDATES);
        assert_eq!(ports[0], "/dev/ttyUSB0");
        assert_eq!(
            ports[MAX_PROBE_CANDIDATES - 1],
            format!("/dev/ttyUSB{}", MAX_PROBE_CANDIDATES - 1)
        );
    }

    #[test]
    fn test_port_name_too_long() {
        let mut config = BridgeConfig::default();
        let long = "x".repeat(200);
        assert!(matches!(
            config.set_default_port(&long),
            Err(ConfigError::PortName(_))
        ));
    }
}
