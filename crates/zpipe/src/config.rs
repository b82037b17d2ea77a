//! Session configuration for the inflate and deflate stages.
//!
//! Both structs follow the same shape: `Default` gives the engine defaults,
//! chained `with_*` setters adjust individual fields, and [`validate`] checks
//! combinations that cannot be expressed in the field types alone. Stages
//! validate their configuration when constructed, so an invalid combination
//! surfaces before any input is pulled.
//!
//! [`validate`]: DeflateConfig::validate

use crate::error::ConfigError;
use crate::framing::{Framing, WindowBits};
use crate::level::CompressionLevel;

/// Size of the scratch buffer each session drains into (32 KiB).
///
/// Every `Chunk` emitted by a drain step holds at most this many bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Configuration for a decompression session.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InflateConfig {
    window_bits: WindowBits,
    dictionary: Option<Vec<u8>>,
    chunk_size: usize,
}

impl InflateConfig {
    /// Creates a configuration decoding the given framing.
    #[must_use]
    pub fn new(window_bits: WindowBits) -> Self {
        Self {
            window_bits,
            ..Self::default()
        }
    }

    /// Sets the preset dictionary used by zlib and raw streams.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: impl Into<Vec<u8>>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    /// Sets the maximum size of each decoded chunk.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Window bits selecting framing and window size.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window_bits
    }

    /// Preset dictionary, if any.
    #[must_use]
    pub fn dictionary(&self) -> Option<&[u8]> {
        self.dictionary.as_deref()
    }

    /// Maximum size of each decoded chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Checks the configuration for unsupported combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(self.window_bits, self.dictionary.as_deref(), self.chunk_size)
    }
}

impl Default for InflateConfig {
    fn default() -> Self {
        Self {
            window_bits: WindowBits::default(),
            dictionary: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

/// Configuration for a compression session.
#[derive(Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DeflateConfig {
    level: CompressionLevel,
    window_bits: WindowBits,
    dictionary: Option<Vec<u8>>,
    chunk_size: usize,
}

impl DeflateConfig {
    /// Creates a configuration with the given level and framing.
    #[must_use]
    pub fn new(level: CompressionLevel, window_bits: WindowBits) -> Self {
        Self {
            level,
            window_bits,
            ..Self::default()
        }
    }

    /// Sets the preset dictionary. Not available with gzip framing.
    #[must_use]
    pub fn with_dictionary(mut self, dictionary: impl Into<Vec<u8>>) -> Self {
        self.dictionary = Some(dictionary.into());
        self
    }

    /// Sets the maximum size of each compressed chunk.
    #[must_use]
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// Compression level.
    #[must_use]
    pub const fn level(&self) -> CompressionLevel {
        self.level
    }

    /// Window bits selecting framing and window size.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window_bits
    }

    /// Preset dictionary, if any.
    #[must_use]
    pub fn dictionary(&self) -> Option<&[u8]> {
        self.dictionary.as_deref()
    }

    /// Maximum size of each compressed chunk.
    #[must_use]
    pub const fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Checks the configuration for unsupported combinations.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_common(self.window_bits, self.dictionary.as_deref(), self.chunk_size)
    }
}

impl Default for DeflateConfig {
    fn default() -> Self {
        Self {
            level: CompressionLevel::Default,
            window_bits: WindowBits::default(),
            dictionary: None,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

fn validate_common(
    window_bits: WindowBits,
    dictionary: Option<&[u8]>,
    chunk_size: usize,
) -> Result<(), ConfigError> {
    if chunk_size == 0 {
        return Err(ConfigError::ChunkSize);
    }
    if dictionary.is_some() && window_bits.framing() == Framing::Gzip {
        return Err(ConfigError::DictionaryWithGzip);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_use_zlib_framing_and_default_level() {
        let deflate = DeflateConfig::default();
        assert_eq!(deflate.level(), CompressionLevel::Default);
        assert_eq!(deflate.window_bits(), WindowBits::ZLIB);
        assert_eq!(deflate.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert!(deflate.dictionary().is_none());
        assert_eq!(deflate.validate(), Ok(()));

        let inflate = InflateConfig::default();
        assert_eq!(inflate.window_bits(), WindowBits::ZLIB);
        assert_eq!(inflate.validate(), Ok(()));
    }

    #[test]
    fn zero_chunk_size_is_rejected() {
        let config = InflateConfig::new(WindowBits::GZIP).with_chunk_size(0);
        assert_eq!(config.validate(), Err(ConfigError::ChunkSize));
    }

    #[test]
    fn gzip_dictionary_is_rejected() {
        let config =
            DeflateConfig::new(CompressionLevel::Best, WindowBits::GZIP).with_dictionary("abc");
        assert_eq!(config.validate(), Err(ConfigError::DictionaryWithGzip));
        let config = InflateConfig::new(WindowBits::GZIP).with_dictionary("abc");
        assert_eq!(config.validate(), Err(ConfigError::DictionaryWithGzip));
    }

    #[test]
    fn zlib_and_raw_accept_dictionaries() {
        for bits in [WindowBits::ZLIB, WindowBits::RAW] {
            let config = DeflateConfig::new(CompressionLevel::Fast, bits).with_dictionary("abc");
            assert_eq!(config.validate(), Ok(()));
            assert_eq!(config.dictionary(), Some(&b"abc"[..]));
        }
    }

    #[cfg(feature = "serde")]
    #[test]
    fn deflate_config_deserializes_with_defaults() {
        let config: DeflateConfig =
            serde_json::from_str(r#"{"level": 9, "window_bits": 31}"#).expect("valid config");
        assert_eq!(config.level(), CompressionLevel::from_numeric(9).unwrap());
        assert_eq!(config.window_bits(), WindowBits::GZIP);
        assert_eq!(config.chunk_size(), DEFAULT_CHUNK_SIZE);
    }

    #[cfg(feature = "serde")]
    #[test]
    fn invalid_window_bits_fail_to_deserialize() {
        let result = serde_json::from_str::<InflateConfig>(r#"{"window_bits": 16}"#);
        assert!(result.is_err());
    }
}
