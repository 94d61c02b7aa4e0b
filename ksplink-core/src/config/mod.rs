//! Configuration types
//!
//! Board-agnostic link settings. The host application reads them from TOML;
//! with the `serde` feature they can also be stored as postcard binary data.

#[cfg(feature = "serde")]
pub mod storage;
pub mod types;

#[cfg(feature = "serde")]
pub use storage::{decode_config, encode_config, StorageError, MAX_CONFIG_SIZE};
pub use types::*;
