//! Stateful codec sessions bridging chunked input to the DEFLATE engine.
//!
//! A session owns exactly one `flate2` stream together with the bytes fed to
//! it but not yet consumed. Callers feed input with `feed` and then call
//! `pop` until it reports [`Pop::Done`]; each call hands back at most one
//! scratch buffer worth of output. Flushing and finishing follow the same
//! drain discipline.
//!
//! The sessions rely on the zlib-API backends of `flate2` (`zlib-rs` or
//! `zlib-ng`) for window-bits selection, gzip framing and preset
//! dictionaries.

mod deflate;
mod inflate;

pub use deflate::DeflateSession;
pub use inflate::InflateSession;

use std::collections::VecDeque;

use crate::error::CodecError;
use crate::flushable::Flushable;

/// Result of a single drain step.
#[derive(Clone, Debug, Eq, PartialEq)]
#[must_use]
pub enum Pop {
    /// No further output is available until more input is fed.
    Done,
    /// A burst of output bytes; more may follow.
    Next(Vec<u8>),
    /// The engine rejected the stream.
    Error(CodecError),
}

/// Input bytes fed to a session, with a cursor marking how many the engine
/// has consumed.
#[derive(Debug, Default)]
struct Pending {
    bytes: Vec<u8>,
    consumed: usize,
}

impl Pending {
    fn push(&mut self, input: &[u8]) {
        if self.consumed > 0 {
            self.bytes.drain(..self.consumed);
            self.consumed = 0;
        }
        self.bytes.extend_from_slice(input);
    }

    fn remaining(&self) -> &[u8] {
        &self.bytes[self.consumed..]
    }

    fn advance(&mut self, count: usize) {
        self.consumed = (self.consumed + count).min(self.bytes.len());
    }

    fn take_remaining(&mut self) -> Vec<u8> {
        let rest = self.bytes.split_off(self.consumed);
        self.bytes.clear();
        self.consumed = 0;
        rest
    }
}

/// Calls `pop` until it reports [`Pop::Done`], queueing every burst as a chunk.
pub(crate) fn drain_into<F>(
    mut pop: F,
    output: &mut VecDeque<Flushable<Vec<u8>>>,
) -> Result<(), CodecError>
where
    F: FnMut() -> Pop,
{
    loop {
        match pop() {
            Pop::Next(bytes) => output.push_back(Flushable::Chunk(bytes)),
            Pop::Done => return Ok(()),
            Pop::Error(err) => return Err(err),
        }
    }
}

/// Converts a pair of monotonically increasing engine counters into the
/// delta produced by one engine call.
fn delta(before: u64, after: u64) -> usize {
    (after - before) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pending_compacts_consumed_prefix_on_push() {
        let mut pending = Pending::default();
        pending.push(b"abcdef");
        pending.advance(4);
        assert_eq!(pending.remaining(), b"ef");
        pending.push(b"gh");
        assert_eq!(pending.remaining(), b"efgh");
        assert_eq!(pending.consumed, 0);
    }

    #[test]
    fn take_remaining_leaves_pending_empty() {
        let mut pending = Pending::default();
        pending.push(b"header|trailing");
        pending.advance(7);
        assert_eq!(pending.take_remaining(), b"trailing");
        assert!(pending.remaining().is_empty());
    }

    #[test]
    fn drain_into_stops_at_done_and_surfaces_errors() {
        let mut script = vec![Pop::Done, Pop::Next(b"b".to_vec()), Pop::Next(b"a".to_vec())];
        let mut output = VecDeque::new();
        drain_into(|| script.pop().unwrap_or(Pop::Done), &mut output).unwrap();
        assert_eq!(
            Vec::from(output),
            [Flushable::Chunk(b"a".to_vec()), Flushable::Chunk(b"b".to_vec())]
        );

        let failure = CodecError::Deflate("stream error".into());
        let mut output = VecDeque::new();
        let result = drain_into(|| Pop::Error(failure.clone()), &mut output);
        assert_eq!(result, Err(failure));
        assert!(output.is_empty());
    }

    #[test]
    fn advance_never_passes_the_end() {
        let mut pending = Pending::default();
        pending.push(b"abc");
        pending.advance(10);
        assert!(pending.remaining().is_empty());
    }
}
