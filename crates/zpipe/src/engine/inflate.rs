use flate2::{Decompress, FlushDecompress, Status};
use tracing::{debug, trace};

use super::{Pending, Pop, delta};
use crate::config::InflateConfig;
use crate::error::CodecError;
use crate::framing::{Framing, WindowBits};

/// Decompression session over a single compressed entity.
///
/// Once the engine reaches the end of the entity (the gzip or zlib trailer,
/// or the final raw block) the session stops consuming input. Bytes fed past
/// that point stay pending and are handed back by [`into_unused`] when the
/// session is torn down.
///
/// [`into_unused`]: InflateSession::into_unused
#[derive(Debug)]
pub struct InflateSession {
    stream: Decompress,
    window_bits: WindowBits,
    dictionary: Option<Vec<u8>>,
    pending: Pending,
    scratch: Vec<u8>,
    complete: bool,
}

impl InflateSession {
    /// Initialises an inflate stream for the configured framing.
    pub fn new(config: &InflateConfig) -> Result<Self, CodecError> {
        let window_bits = config.window_bits();
        let mut stream = match window_bits.framing() {
            Framing::Raw => Decompress::new_with_window_bits(false, window_bits.bits()),
            Framing::Zlib => Decompress::new_with_window_bits(true, window_bits.bits()),
            Framing::Gzip => Decompress::new_gzip(window_bits.bits()),
        };

        // Raw streams carry no dictionary id, so the dictionary goes in up
        // front. Zlib streams ask for it once the header has been read.
        if window_bits.framing() == Framing::Raw {
            if let Some(dictionary) = config.dictionary() {
                stream
                    .set_dictionary(dictionary)
                    .map_err(|err| CodecError::Dictionary(err.to_string()))?;
            }
        }

        debug!(
            window_bits = window_bits.get(),
            framing = %window_bits.framing(),
            "inflate session created"
        );

        Ok(Self {
            stream,
            window_bits,
            dictionary: config.dictionary().map(<[u8]>::to_vec),
            pending: Pending::default(),
            scratch: vec![0; config.chunk_size()],
            complete: false,
        })
    }

    /// Queues compressed bytes for decoding.
    pub fn feed(&mut self, input: &[u8]) {
        self.pending.push(input);
    }

    /// Drains the next burst of decoded bytes.
    pub fn pop(&mut self) -> Pop {
        self.drain(FlushDecompress::None)
    }

    /// Returns all output the engine can produce from the input fed so far.
    pub fn flush(&mut self) -> Result<Vec<u8>, CodecError> {
        self.drain_all(FlushDecompress::Sync)
    }

    /// Returns the trailing output of the entity.
    ///
    /// Finishing an entity whose trailer has not arrived is not an error;
    /// [`is_complete`](Self::is_complete) tells the two cases apart.
    pub fn finish(&mut self) -> Result<Vec<u8>, CodecError> {
        self.drain_all(FlushDecompress::Finish)
    }

    /// Returns whether the engine has decoded the end of the entity.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.complete
    }

    /// Framing this session decodes.
    #[must_use]
    pub const fn window_bits(&self) -> WindowBits {
        self.window_bits
    }

    /// Total compressed bytes consumed by the engine.
    #[must_use]
    pub fn total_in(&self) -> u64 {
        self.stream.total_in()
    }

    /// Total decoded bytes produced by the engine.
    #[must_use]
    pub fn total_out(&self) -> u64 {
        self.stream.total_out()
    }

    /// Tears the session down, returning the bytes fed to it that do not
    /// belong to the entity it decoded.
    #[must_use]
    pub fn into_unused(mut self) -> Vec<u8> {
        self.pending.take_remaining()
    }

    fn drain_all(&mut self, mode: FlushDecompress) -> Result<Vec<u8>, CodecError> {
        let mut output = Vec::new();
        loop {
            match self.drain(mode) {
                Pop::Next(bytes) => output.extend_from_slice(&bytes),
                Pop::Done => return Ok(output),
                Pop::Error(err) => return Err(err),
            }
        }
    }

    fn drain(&mut self, mode: FlushDecompress) -> Pop {
        loop {
            if self.complete {
                return Pop::Done;
            }

            let input = self.pending.remaining();
            let input_len = input.len();
            let before_in = self.stream.total_in();
            let before_out = self.stream.total_out();
            let result = self.stream.decompress(input, &mut self.scratch, mode);
            let consumed = delta(before_in, self.stream.total_in());
            let produced = delta(before_out, self.stream.total_out());
            self.pending.advance(consumed);

            match result {
                Ok(status) => {
                    if status == Status::StreamEnd {
                        self.complete = true;
                    }
                    if produced > 0 {
                        trace!(consumed, produced, "inflate burst");
                        return Pop::Next(self.scratch[..produced].to_vec());
                    }
                    if self.complete || consumed == 0 || consumed == input_len {
                        return Pop::Done;
                    }
                }
                Err(err) => match (err.needs_dictionary(), self.dictionary.as_deref()) {
                    (Some(adler), Some(dictionary)) => {
                        trace!(adler, "installing preset dictionary");
                        if let Err(err) = self.stream.set_dictionary(dictionary) {
                            return Pop::Error(CodecError::Dictionary(err.to_string()));
                        }
                    }
                    _ => return Pop::Error(err.into()),
                },
            }
        }
    }
}

impl Drop for InflateSession {
    fn drop(&mut self) {
        trace!(
            total_in = self.stream.total_in(),
            total_out = self.stream.total_out(),
            complete = self.complete,
            "inflate session released"
        );
    }
}
