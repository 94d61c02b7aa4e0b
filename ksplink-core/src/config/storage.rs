//! Binary configuration storage
//!
//! Settings can be persisted as postcard binary data, for example next to
//! a cached port list, and read back without a TOML parser.

use super::types::{LinkConfig, CONFIG_VERSION};

/// Maximum serialized config size
pub const MAX_CONFIG_SIZE: usize = 256;

/// Binary storage errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Serialization failed or the buffer is too small
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Stored layout version differs from this build
    VersionMismatch(u8),
}

/// Serialize a configuration into `buffer`, returning the used prefix
pub fn encode_config<'a>(
    config: &LinkConfig,
    buffer: &'a mut [u8],
) -> Result<&'a mut [u8], StorageError> {
    postcard::to_slice(config, buffer).map_err(|_| StorageError::Serialize)
}

/// Deserialize a configuration and check its layout version
pub fn decode_config(bytes: &[u8]) -> Result<LinkConfig, StorageError> {
    let config: LinkConfig = postcard::from_bytes(bytes).map_err(|_| StorageError::Deserialize)?;
    if config.version != CONFIG_VERSION {
        return Err(StorageError::VersionMismatch(config.version));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::AxisPolicy;

    #[test]
    fn test_roundtrip() {
        let mut config = LinkConfig::default();
        config.default_port = heapless::String::try_from("/dev/ttyUSB0").unwrap();
        config.refresh_ms = 40;
        config.handshake.enabled = false;
        config.axes.throttle = AxisPolicy::PreferExternal;

        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let used = encode_config(&config, &mut buffer).unwrap().len();
        let decoded = decode_config(&buffer[..used]).unwrap();

        assert_eq!(decoded, config);
    }

    #[test]
    fn test_version_mismatch() {
        let mut config = LinkConfig::default();
        config.version = 2;

        let mut buffer = [0u8; MAX_CONFIG_SIZE];
        let used = encode_config(&config, &mut buffer).unwrap().len();
        assert_eq!(
            decode_config(&buffer[..used]),
            Err(StorageError::VersionMismatch(2))
        );
    }

    #[test]
    fn test_garbage() {
        assert_eq!(decode_config(&[]), Err(StorageError::Deserialize));
    }

    #[test]
    fn test_buffer_too_small() {
        let mut buffer = [0u8; 2];
        assert_eq!(
            encode_config(&LinkConfig::default(), &mut buffer),
            Err(StorageError::Serialize)
        );
    }
}
