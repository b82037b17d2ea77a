use flate2::{Compress, FlushCompress, Status};
use tracing::{debug, trace};

use super::{Pending, Pop, delta};
use crate::config::DeflateConfig;
use crate::error::CodecError;
use crate::framing::Framing;

/// Compression session producing one compressed entity.
#[derive(Debug)]
pub struct DeflateSession {
    stream: Compress,
    pending: Pending,
    scratch: Vec<u8>,
    finished: bool,
}

impl DeflateSession {
    /// Initialises a deflate stream for the configured level and framing.
    pub fn new(config: &DeflateConfig) -> Result<Self, CodecError> {
        let window_bits = config.window_bits();
        let level = config.level().into();
        let mut stream = match window_bits.framing() {
            Framing::Raw => Compress::new_with_window_bits(level, false, window_bits.bits()),
            Framing::Zlib => Compress::new_with_window_bits(level, true, window_bits.bits()),
            Framing::Gzip => Compress::new_gzip(level, window_bits.bits()),
        };
        if let Some(dictionary) = config.dictionary() {
            stream
                .set_dictionary(dictionary)
                .map_err(|err| CodecError::Dictionary(err.to_string()))?;
        }

        debug!(
            level = %config.level(),
            window_bits = window_bits.get(),
            framing = %window_bits.framing(),
            "deflate session created"
        );

        Ok(Self {
            stream,
            pending: Pending::default(),
            scratch: vec![0; config.chunk_size()],
            finished: false,
        })
    }

    /// Queues uncompressed bytes.
    pub fn feed(&mut self, input: &[u8]) {
        self.pending.push(input);
    }

    /// Drains the next burst of compressed bytes.
    pub fn pop(&mut self) -> Pop {
        self.drain(FlushCompress::None)
    }

    /// Forces out everything buffered so far on a byte boundary, so the
    /// receiver can decode all input fed before the flush.
    ///
    /// The whole flush is returned as one [`Pop::Next`]; [`Pop::Done`] means
    /// the engine had nothing to emit.
    pub fn flush(&mut self) -> Pop {
        let mut output = Vec::new();
        loop {
            match self.drain(FlushCompress::Sync) {
                Pop::Next(bytes) => output.extend_from_slice(&bytes),
                Pop::Done if output.is_empty() => return Pop::Done,
                Pop::Done => return Pop::Next(output),
                Pop::Error(err) => return Pop::Error(err),
            }
        }
    }

    /// Writes the end of the entity. Call repeatedly until [`Pop::Done`].
    pub fn finish(&mut self) -> Pop {
        self.drain(FlushCompress::Finish)
    }

    /// Returns whether the trailer has been written.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Total uncompressed bytes consumed by the engine.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Total compressed bytes produced by the engine.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    fn drain(&mut self, mode: FlushCompress) -> Pop {
        loop {
            if self.finished {
                return Pop::Done;
            }

            let input = self.pending.remaining();
            let input_len = input.len();
            let before_in = self.stream.total_in();
            let before_out = self.stream.total_out();
            let result = self.stream.compress(input, &mut self.scratch, mode);
            let consumed = delta(before_in, self.stream.total_in());
            let produced = delta(before_out, self.stream.total_out());
            self.pending.advance(consumed);

            let status = match result {
                Ok(status) => status,
                Err(err) => return Pop::Error(err.into()),
            };
            if status == Status::StreamEnd {
                self.finished = true;
            }
            if produced > 0 {
                trace!(consumed, produced, "deflate burst");
                return Pop::Next(self.scratch[..produced].to_vec());
            }
            if self.finished || consumed == 0 || consumed == input_len {
                return Pop::Done;
            }
        }
    }
}

impl Drop for DeflateSession {
    fn drop(&mut self) {
        trace!(
            total_in = self.stream.total_in(),
            total_out = self.stream.total_out(),
            finished = self.finished,
            "deflate session released"
        );
    }
}
