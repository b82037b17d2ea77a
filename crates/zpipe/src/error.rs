//! Error types shared by the codec sessions and the pipeline stages.

use std::io;

/// Failure reported by the codec engine while feeding, draining, flushing or
/// finishing a session.
///
/// Codec errors are fatal to the stage that observed them: the session is
/// released and the stage stops. Output emitted before the failure is not
/// retracted.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum CodecError {
    /// The inflate engine rejected the compressed input.
    #[error("inflate failed: {0}")]
    Inflate(String),

    /// The deflate engine reported an internal failure.
    #[error("deflate failed: {0}")]
    Deflate(String),

    /// A zlib stream requested a preset dictionary but none was configured.
    #[error("compressed stream requires a preset dictionary (adler32 {adler:#010x})")]
    DictionaryRequired {
        /// Adler-32 checksum of the dictionary the stream was compressed with.
        adler: u32,
    },

    /// The engine refused the configured preset dictionary.
    #[error("preset dictionary rejected: {0}")]
    Dictionary(String),
}

impl From<flate2::DecompressError> for CodecError {
    fn from(err: flate2::DecompressError) -> Self {
        match err.needs_dictionary() {
            Some(adler) => Self::DictionaryRequired { adler },
            None => Self::Inflate(err.to_string()),
        }
    }
}

impl From<flate2::CompressError> for CodecError {
    fn from(err: flate2::CompressError) -> Self {
        Self::Deflate(err.to_string())
    }
}

/// Rejected stage configuration.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// Window bits outside the raw (`-15..=-9`), zlib (`9..=15`) and gzip
    /// (`25..=31`) ranges.
    #[error("window bits {0} select no supported framing (expected -15..=-9, 9..=15 or 25..=31)")]
    WindowBits(i32),

    /// Compression level outside `-1..=9`.
    #[error("compression level {0} is outside the supported range -1..=9")]
    Level(i32),

    /// Output chunks must hold at least one byte.
    #[error("output chunk size must be non-zero")]
    ChunkSize,

    /// Gzip containers carry no dictionary identifier.
    #[error("preset dictionaries are not supported with gzip framing")]
    DictionaryWithGzip,

    /// Framing name not recognised by [`crate::Framing::from_str`](std::str::FromStr).
    #[error("unsupported framing: {0}")]
    Framing(String),
}

/// Crate-level error covering codec failures, configuration mistakes and
/// I/O errors from byte sources feeding a pipeline.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Codec engine failure.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// Invalid configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Failure reading pipeline input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Result alias using the crate-level [`Error`].
pub type Result<T> = std::result::Result<T, Error>;
