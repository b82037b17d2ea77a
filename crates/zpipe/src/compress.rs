//! Compression stage.
//!
//! [`Compress`] is the encode-side twin of
//! [`Decompress`](crate::Decompress): one [`DeflateSession`] per run,
//! created on the first input unit and finished once the upstream is
//! exhausted. Compression always consumes all of its input, so there is no
//! leftover handling.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::DeflateConfig;
use crate::engine::{DeflateSession, Pop, drain_into};
use crate::error::{CodecError, ConfigError};
use crate::flushable::Flushable;
use crate::framing::WindowBits;
use crate::level::CompressionLevel;
use crate::pipe::{Pull, Stage, Step};
use crate::unflushed::Unflushed;

/// Flush-aware compression stage producing a single compressed entity.
#[derive(Debug)]
pub struct Compress {
    config: DeflateConfig,
    session: Option<DeflateSession>,
    closed: bool,
}

impl Compress {
    /// Creates a stage with the given level and framing.
    #[must_use]
    pub fn new(level: CompressionLevel, window_bits: WindowBits) -> Self {
        Self::from_valid(DeflateConfig::new(level, window_bits))
    }

    /// Creates a stage from a full configuration.
    pub fn with_config(config: DeflateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: DeflateConfig) -> Self {
        Self {
            config,
            session: None,
            closed: false,
        }
    }

    /// Returns `true` once the session has been torn down.
    #[must_use]
    pub const fn is_closed(&self) -> bool {
        self.closed
    }

    fn process(
        &mut self,
        unit: Flushable<Vec<u8>>,
        output: &mut VecDeque<Flushable<Vec<u8>>>,
    ) -> Result<(), CodecError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => DeflateSession::new(&self.config)?,
        };
        let session = self.session.insert(session);

        match unit {
            Flushable::Chunk(bytes) => {
                session.feed(&bytes);
                drain_into(|| session.pop(), output)
            }
            Flushable::Flush => {
                match session.flush() {
                    Pop::Next(bytes) => output.push_back(Flushable::Chunk(bytes)),
                    Pop::Done => {}
                    Pop::Error(err) => return Err(err),
                }
                output.push_back(Flushable::Flush);
                Ok(())
            }
        }
    }

    fn close(&mut self, output: &mut VecDeque<Flushable<Vec<u8>>>) -> Result<(), CodecError> {
        self.closed = true;
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };
        drain_into(|| session.finish(), output)?;
        debug!(
            total_in = session.total_in(),
            total_out = session.total_out(),
            "deflate entity closed"
        );
        Ok(())
    }

    fn abort(&mut self, err: &CodecError) {
        warn!(error = %err, "compression aborted");
        self.release();
    }

    fn release(&mut self) {
        self.closed = true;
        self.session = None;
    }
}

impl Stage for Compress {
    type Input = Flushable<Vec<u8>>;
    type Output = Flushable<Vec<u8>>;

    fn step<P>(
        &mut self,
        input: &mut P,
        output: &mut VecDeque<Self::Output>,
    ) -> Result<Step, P::Error>
    where
        P: Pull<Item = Self::Input>,
        P::Error: From<CodecError>,
    {
        if self.closed {
            return Ok(Step::Done);
        }

        let unit = match input.pull() {
            Ok(unit) => unit,
            Err(err) => {
                debug!("upstream failed, releasing deflate session");
                self.release();
                return Err(err);
            }
        };
        let (result, step) = match unit {
            Some(unit) => (self.process(unit, output), Step::Continue),
            None => (self.close(output), Step::Done),
        };
        match result {
            Ok(()) => Ok(step),
            Err(err) => {
                self.abort(&err);
                Err(err.into())
            }
        }
    }
}

/// Flush-aware compression with the given level and framing.
#[must_use]
pub fn compress_flush(level: CompressionLevel, window_bits: WindowBits) -> Compress {
    Compress::new(level, window_bits)
}

/// Compression of plain byte chunks.
#[must_use]
pub fn compress(level: CompressionLevel, window_bits: WindowBits) -> Unflushed<Compress> {
    Unflushed::new(Compress::new(level, window_bits))
}

/// Gzip compression at the default level.
#[must_use]
pub fn gzip() -> Unflushed<Compress> {
    compress(CompressionLevel::Default, WindowBits::GZIP)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    use flate2::read::{GzDecoder, MultiGzDecoder};

    use crate::pipe::{PipeExt, Upstream};

    #[test]
    fn empty_chunk_produces_a_complete_empty_member() {
        let compressed: Vec<u8> = vec![Ok::<_, CodecError>(Vec::new())]
            .into_iter()
            .pipe(gzip())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .concat();
        assert!(!compressed.is_empty());
        let mut decoded = Vec::new();
        GzDecoder::new(&compressed[..])
            .read_to_end(&mut decoded)
            .unwrap();
        assert!(decoded.is_empty());
    }

    #[test]
    fn upstream_error_releases_the_session() {
        let mut upstream: Upstream<_, Flushable<Vec<u8>>> = Upstream::new(vec![
            Ok(Flushable::Chunk(b"partial".to_vec())),
            Err(CodecError::Deflate("source went away".into())),
        ]);
        let mut stage = compress_flush(CompressionLevel::Default, WindowBits::GZIP);
        let mut output = VecDeque::new();
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Continue));
        assert!(stage.session.is_some());
        assert!(stage.step(&mut upstream, &mut output).is_err());
        assert!(stage.is_closed());
        assert!(stage.session.is_none());
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Done));
    }

    #[test]
    fn empty_input_produces_nothing() {
        let mut upstream: Upstream<_, Vec<u8>> =
            Upstream::new(Vec::<Result<Vec<u8>, CodecError>>::new());
        let mut stage = gzip();
        let mut output = VecDeque::new();
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Done));
        assert!(output.is_empty());
        assert!(stage.get_ref().is_closed());
    }

    #[test]
    fn gzip_output_is_readable_by_a_reference_decoder() {
        let compressed: Vec<u8> = vec![Ok::<_, CodecError>(b"hello ".to_vec()), Ok(b"gzip".to_vec())]
            .into_iter()
            .pipe(gzip())
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
            .concat();
        let mut decoded = String::new();
        MultiGzDecoder::new(&compressed[..])
            .read_to_string(&mut decoded)
            .unwrap();
        assert_eq!(decoded, "hello gzip");
    }

    #[test]
    fn every_flush_is_followed_by_a_marker() {
        let output: Vec<_> = vec![
            Ok::<_, CodecError>(Flushable::Chunk(b"a".to_vec())),
            Ok(Flushable::Flush),
            Ok(Flushable::Flush),
        ]
        .into_iter()
        .pipe(compress_flush(CompressionLevel::Fast, WindowBits::RAW))
        .collect::<Result<_, _>>()
        .unwrap();
        let flushes = output.iter().filter(|unit| unit.is_flush()).count();
        assert_eq!(flushes, 2);
        assert!(!output.last().unwrap().is_flush(), "finish emits the final block");
    }

    #[test]
    fn stage_is_done_after_finishing() {
        let mut stage = compress_flush(CompressionLevel::Best, WindowBits::ZLIB);
        let mut upstream: Upstream<_, Flushable<Vec<u8>>> =
            Upstream::new(vec![Ok::<_, CodecError>(Flushable::Chunk(b"x".to_vec()))]);
        let mut output = VecDeque::new();
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Continue));
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Done));
        assert!(stage.is_closed());
        let before = output.len();
        assert_eq!(stage.step(&mut upstream, &mut output), Ok(Step::Done));
        assert_eq!(output.len(), before);
    }
}
