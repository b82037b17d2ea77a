//! Decompression stage.
//!
//! [`Decompress`] drives one [`InflateSession`] over a stream of
//! [`Flushable`] chunks. The session is created when the first unit arrives
//! and torn down exactly once: when the upstream runs out, when the engine
//! reports the end of the entity, or when the engine rejects the input.
//!
//! At teardown any bytes fed to the session beyond the end of its entity are
//! pushed back onto the input, where [`multiple()`](crate::multiple()) or a
//! plain consumer can pick them up.

use std::collections::VecDeque;

use tracing::{debug, warn};

use crate::config::InflateConfig;
use crate::engine::{InflateSession, drain_into};
use crate::error::{CodecError, ConfigError};
use crate::flushable::Flushable;
use crate::framing::WindowBits;
use crate::pipe::{Pull, Stage, Step};
use crate::unflushed::Unflushed;

/// Flush-aware decompression stage decoding a single compressed entity.
#[derive(Debug)]
pub struct Decompress {
    config: InflateConfig,
    session: Option<InflateSession>,
    closed: bool,
}

impl Decompress {
    /// Creates a stage decoding the framing selected by `window_bits`.
    #[must_use]
    pub fn new(window_bits: WindowBits) -> Self {
        Self::from_valid(InflateConfig::new(window_bits))
    }

    /// Creates a stage from a full configuration.
    pub fn with_config(config: InflateConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::from_valid(config))
    }

    fn from_valid(config: InflateConfig) -> Self {
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

    /// Feeds one unit to the session, creating it on the first unit.
    /// Returns whether the entity is complete.
    fn process(
        &mut self,
        unit: Flushable<Vec<u8>>,
        output: &mut VecDeque<Flushable<Vec<u8>>>,
    ) -> Result<bool, CodecError> {
        let session = match self.session.take() {
            Some(session) => session,
            None => InflateSession::new(&self.config)?,
        };
        let session = self.session.insert(session);

        match unit {
            Flushable::Chunk(bytes) => {
                session.feed(&bytes);
                drain_into(|| session.pop(), output)?;
                Ok(session.is_complete())
            }
            Flushable::Flush => {
                let bytes = session.flush()?;
                if !bytes.is_empty() {
                    output.push_back(Flushable::Chunk(bytes));
                }
                output.push_back(Flushable::Flush);
                Ok(false)
            }
        }
    }

    /// Finishes the session and hands its unused input back to `input`.
    fn close<P>(
        &mut self,
        input: &mut P,
        output: &mut VecDeque<Flushable<Vec<u8>>>,
    ) -> Result<(), CodecError>
    where
        P: Pull<Item = Flushable<Vec<u8>>>,
    {
        self.closed = true;
        let Some(mut session) = self.session.take() else {
            return Ok(());
        };

        let trailing = session.finish()?;
        if !trailing.is_empty() {
            output.push_back(Flushable::Chunk(trailing));
        }
        if !session.is_complete() {
            warn!(
                framing = %session.window_bits().framing(),
                total_in = session.total_in(),
                "input ended before the compressed entity was complete"
            );
        }

        let unused = session.into_unused();
        debug!(leftover = unused.len(), "inflate entity closed");
        if !unused.is_empty() {
            input.push_back(Flushable::Chunk(unused));
        }
        Ok(())
    }

    fn abort(&mut self, err: &CodecError) {
        warn!(error = %err, "decompression aborted");
        self.release();
    }

    fn release(&mut self) {
        self.closed = true;
        self.session = None;
    }
}

impl Stage for Decompress {
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
                debug!("upstream failed, releasing inflate session");
                self.release();
                return Err(err);
            }
        };
        let outcome = match unit {
            Some(unit) => self.process(unit, output),
            None => Ok(true),
        };
        let result = match outcome {
            Ok(false) => return Ok(Step::Continue),
            Ok(true) => self.close(input, output),
            Err(err) => Err(err),
        };
        match result {
            Ok(()) => Ok(Step::Done),
            Err(err) => {
                self.abort(&err);
                Err(err.into())
            }
        }
    }
}

/// Flush-aware decompression of the framing selected by `window_bits`.
#[must_use]
pub fn decompress_flush(window_bits: WindowBits) -> Decompress {
    Decompress::new(window_bits)
}

/// Decompression of plain byte chunks.
#[must_use]
pub fn decompress(window_bits: WindowBits) -> Unflushed<Decompress> {
    Unflushed::new(Decompress::new(window_bits))
}

/// Decompression of a single gzip member.
#[must_use]
pub fn ungzip() -> Unflushed<Decompress> {
    decompress(WindowBits::GZIP)
}
