//! Bridge errors

use crate::config::ConfigError;

/// Errors that end a bridge run
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("no serial ports to probe")]
    NoPorts,

    #[error("no cockpit device answered on {tried} port(s)")]
    NoDevice { tried: usize },

    #[error("link failed: {0}")]
    Link(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Wrap any link error
    pub fn link(error: impl std::fmt::Display) -> Self {
        BridgeError::Link(error.to_string())
    }
}
