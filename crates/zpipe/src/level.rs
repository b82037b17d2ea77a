//! Compression effort levels accepted by the deflate stage.

use core::fmt;
use std::num::NonZeroU8;

use flate2::Compression;

use crate::error::ConfigError;

/// Compression levels recognised by the deflate engine.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub enum CompressionLevel {
    /// Emit stored blocks only (level 0).
    Stored,
    /// Favour speed over compression ratio.
    Fast,
    /// Use zlib's default balance between speed and ratio.
    #[default]
    Default,
    /// Favour the best possible compression ratio.
    Best,
    /// Use an explicit zlib compression level in the range `1..=9`.
    Precise(NonZeroU8),
}

impl CompressionLevel {
    /// Parses a zlib-style numeric level.
    ///
    /// `-1` selects [`CompressionLevel::Default`], `0` selects
    /// [`CompressionLevel::Stored`] and `1..=9` map to
    /// [`CompressionLevel::Precise`].
    pub fn from_numeric(level: i32) -> Result<Self, ConfigError> {
        match level {
            -1 => Ok(Self::Default),
            0 => Ok(Self::Stored),
            1..=9 => NonZeroU8::new(level as u8)
                .map(Self::Precise)
                .ok_or(ConfigError::Level(level)),
            _ => Err(ConfigError::Level(level)),
        }
    }

    /// Constructs a [`CompressionLevel::Precise`] variant from the provided zlib level.
    #[must_use]
    pub const fn precise(level: NonZeroU8) -> Self {
        Self::Precise(level)
    }

    /// Returns the numeric zlib level, with `-1` for the engine default.
    #[must_use]
    pub const fn numeric(self) -> i32 {
        match self {
            Self::Stored => 0,
            Self::Fast => 1,
            Self::Default => -1,
            Self::Best => 9,
            Self::Precise(value) => value.get() as i32,
        }
    }
}

impl From<CompressionLevel> for Compression {
    fn from(level: CompressionLevel) -> Self {
        match level {
            CompressionLevel::Stored => Compression::none(),
            CompressionLevel::Fast => Compression::fast(),
            CompressionLevel::Default => Compression::default(),
            CompressionLevel::Best => Compression::best(),
            CompressionLevel::Precise(value) => Compression::new(u32::from(value.get())),
        }
    }
}

impl TryFrom<i32> for CompressionLevel {
    type Error = ConfigError;

    fn try_from(level: i32) -> Result<Self, Self::Error> {
        Self::from_numeric(level)
    }
}

impl From<CompressionLevel> for i32 {
    fn from(level: CompressionLevel) -> Self {
        level.numeric()
    }
}

impl fmt::Display for CompressionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Default => f.write_str("default"),
            other => write!(f, "{}", other.numeric()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn precise_level_converts_to_requested_value() {
        let level = NonZeroU8::new(7).expect("non-zero");
        let compression = Compression::from(CompressionLevel::precise(level));
        assert_eq!(compression.level(), u32::from(level.get()));
    }

    #[test]
    fn numeric_level_constructor_accepts_valid_range() {
        for level in 1..=9 {
            let precise = CompressionLevel::from_numeric(level).expect("valid level");
            let expected = NonZeroU8::new(level as u8).expect("validated");
            assert_eq!(precise, CompressionLevel::Precise(expected));
        }
        assert_eq!(
            CompressionLevel::from_numeric(-1),
            Ok(CompressionLevel::Default)
        );
        assert_eq!(CompressionLevel::from_numeric(0), Ok(CompressionLevel::Stored));
    }

    #[test]
    fn numeric_level_constructor_rejects_out_of_range() {
        let err = CompressionLevel::from_numeric(10).expect_err("level above 9 rejected");
        assert_eq!(err, ConfigError::Level(10));
        assert!(CompressionLevel::from_numeric(-2).is_err());
    }

    #[test]
    fn stored_level_disables_compression() {
        assert_eq!(Compression::from(CompressionLevel::Stored).level(), 0);
    }

    #[test]
    fn numeric_round_trips() {
        for level in -1..=9 {
            let parsed = CompressionLevel::from_numeric(level).unwrap();
            assert_eq!(CompressionLevel::from_numeric(parsed.numeric()), Ok(parsed));
        }
    }
}
