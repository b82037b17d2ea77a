//! Container framing and the zlib window-bits convention that selects it.

use core::fmt;
use core::str::FromStr;

use crate::error::ConfigError;

/// Container format wrapped around the DEFLATE stream.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum Framing {
    /// Bare DEFLATE blocks with no header or trailer.
    Raw,
    /// Two-byte zlib header and Adler-32 trailer.
    Zlib,
    /// Gzip member header and CRC-32/size trailer.
    Gzip,
}

impl Framing {
    /// Returns the canonical name used in diagnostics and configuration.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Zlib => "zlib",
            Self::Gzip => "gzip",
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Framing {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "raw" | "deflate" => Ok(Self::Raw),
            "zlib" => Ok(Self::Zlib),
            "gzip" | "gz" => Ok(Self::Gzip),
            other => Err(ConfigError::Framing(other.to_string())),
        }
    }
}

/// Window-bits parameter in the zlib convention.
///
/// The sign and offset of the value select the framing while the magnitude
/// selects the LZ77 window size (`2^bits` bytes):
///
/// | value | framing |
/// | --- | --- |
/// | `-15..=-9` | raw DEFLATE |
/// | `9..=15` | zlib |
/// | `25..=31` | gzip (`16 + bits`) |
///
/// [`WindowBits::GZIP`] is the reserved value selecting the widest window
/// together with gzip framing.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "i32", into = "i32"))]
pub struct WindowBits(i8);

impl WindowBits {
    /// Widest window with zlib framing. This is the default.
    pub const ZLIB: Self = Self(15);
    /// Widest window with raw DEFLATE framing.
    pub const RAW: Self = Self(-15);
    /// Widest window with gzip framing.
    pub const GZIP: Self = Self(31);

    const MIN_BITS: i32 = 9;
    const MAX_BITS: i32 = 15;
    const GZIP_OFFSET: i32 = 16;

    /// Validates a raw window-bits value.
    pub fn new(value: i32) -> Result<Self, ConfigError> {
        let bits = Self::bits_of(value).ok_or(ConfigError::WindowBits(value))?;
        debug_assert!((Self::MIN_BITS..=Self::MAX_BITS).contains(&i32::from(bits)));
        Ok(Self(value as i8))
    }

    /// Builds a value from a framing and a window size in bits (`9..=15`).
    pub fn with_framing(framing: Framing, bits: u8) -> Result<Self, ConfigError> {
        let bits = i32::from(bits);
        let value = match framing {
            Framing::Raw => -bits,
            Framing::Zlib => bits,
            Framing::Gzip => bits + Self::GZIP_OFFSET,
        };
        Self::new(value)
    }

    fn bits_of(value: i32) -> Option<u8> {
        let bits = match value {
            v if v < 0 => -v,
            v if v > Self::GZIP_OFFSET => v - Self::GZIP_OFFSET,
            v => v,
        };
        (Self::MIN_BITS..=Self::MAX_BITS)
            .contains(&bits)
            .then_some(bits as u8)
    }

    /// Returns the framing selected by this value.
    #[must_use]
    pub const fn framing(self) -> Framing {
        if self.0 < 0 {
            Framing::Raw
        } else if self.0 as i32 > Self::GZIP_OFFSET {
            Framing::Gzip
        } else {
            Framing::Zlib
        }
    }

    /// Returns the window size in bits (`9..=15`).
    #[must_use]
    pub const fn bits(self) -> u8 {
        match self.framing() {
            Framing::Raw => self.0.unsigned_abs(),
            Framing::Zlib => self.0 as u8,
            Framing::Gzip => (self.0 as i32 - Self::GZIP_OFFSET) as u8,
        }
    }

    /// Returns the raw zlib-convention value.
    #[must_use]
    pub const fn get(self) -> i32 {
        self.0 as i32
    }
}

impl Default for WindowBits {
    fn default() -> Self {
        Self::ZLIB
    }
}

impl TryFrom<i32> for WindowBits {
    type Error = ConfigError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<WindowBits> for i32 {
    fn from(bits: WindowBits) -> Self {
        bits.get()
    }
}

impl fmt::Display for WindowBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {} bits)", self.0, self.framing(), self.bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserved_gzip_value_selects_widest_window() {
        assert_eq!(WindowBits::GZIP.get(), 31);
        assert_eq!(WindowBits::GZIP.framing(), Framing::Gzip);
        assert_eq!(WindowBits::GZIP.bits(), 15);
    }

    #[test]
    fn sign_and_offset_select_framing() {
        let raw = WindowBits::new(-12).unwrap();
        assert_eq!((raw.framing(), raw.bits()), (Framing::Raw, 12));
        let zlib = WindowBits::new(9).unwrap();
        assert_eq!((zlib.framing(), zlib.bits()), (Framing::Zlib, 9));
        let gzip = WindowBits::new(25).unwrap();
        assert_eq!((gzip.framing(), gzip.bits()), (Framing::Gzip, 9));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        for value in [0, 8, -8, 16, 24, 32, 47, -16] {
            assert_eq!(WindowBits::new(value), Err(ConfigError::WindowBits(value)));
        }
    }

    #[test]
    fn with_framing_round_trips() {
        for framing in [Framing::Raw, Framing::Zlib, Framing::Gzip] {
            for bits in 9..=15 {
                let wb = WindowBits::with_framing(framing, bits).unwrap();
                assert_eq!(wb.framing(), framing);
                assert_eq!(wb.bits(), bits);
            }
        }
    }

    #[test]
    fn default_is_zlib() {
        assert_eq!(WindowBits::default(), WindowBits::ZLIB);
    }

    #[test]
    fn parsing_accepts_known_framings() {
        assert_eq!("gzip".parse::<Framing>().unwrap(), Framing::Gzip);
        assert_eq!(" GZ ".parse::<Framing>().unwrap(), Framing::Gzip);
        assert_eq!("deflate".parse::<Framing>().unwrap(), Framing::Raw);
        assert_eq!("zlib".parse::<Framing>().unwrap(), Framing::Zlib);
    }

    #[test]
    fn parsing_rejects_unknown_framings() {
        let err = "brotli".parse::<Framing>().expect_err("brotli unsupported");
        assert_eq!(err, ConfigError::Framing("brotli".into()));
    }
}
