//! Decoding of compressed entities concatenated back to back.

use std::collections::VecDeque;

use tracing::debug;

use crate::error::CodecError;
use crate::pipe::{Pull, Stage, Step};

/// Runs a fresh inner stage for every entity found in the input.
///
/// Each inner stage stops at the end of its entity and pushes the bytes that
/// follow back onto the shared input, so the next inner stage starts exactly
/// where the previous one stopped. Empty chunks between entities are skipped
/// and an empty input yields no entities at all. The first failing entity
/// aborts the whole run.
#[derive(Debug)]
pub struct Multiple<S, F> {
    factory: F,
    current: Option<S>,
    entities: u64,
}

impl<S, F> Multiple<S, F>
where
    F: FnMut() -> S,
{
    /// Creates the combinator; `factory` builds the stage for each entity.
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            current: None,
            entities: 0,
        }
    }

    /// Number of entities whose inner stage has finished so far.
    ///
    /// A final entity cut short by the end of the input is counted too.
    #[must_use]
    pub const fn entities(&self) -> u64 {
        self.entities
    }
}

impl<S, F> Stage for Multiple<S, F>
where
    S: Stage,
    S::Input: AsRef<[u8]>,
    F: FnMut() -> S,
{
    type Input = S::Input;
    type Output = S::Output;

    fn step<P>(
        &mut self,
        input: &mut P,
        output: &mut VecDeque<Self::Output>,
    ) -> Result<Step, P::Error>
    where
        P: Pull<Item = Self::Input>,
        P::Error: From<CodecError>,
    {
        if let Some(inner) = self.current.as_mut() {
            match inner.step(input, output) {
                Ok(Step::Continue) => {}
                Ok(Step::Done) => {
                    self.current = None;
                    self.entities += 1;
                    debug!(entities = self.entities, "entity finished");
                }
                Err(err) => {
                    self.current = None;
                    return Err(err);
                }
            }
            return Ok(Step::Continue);
        }

        match input.pull()? {
            None => Ok(Step::Done),
            Some(unit) if unit.as_ref().is_empty() => Ok(Step::Continue),
            Some(unit) => {
                input.push_back(unit);
                self.current = Some((self.factory)());
                Ok(Step::Continue)
            }
        }
    }
}

/// Runs the stage built by `factory` once per concatenated entity.
pub fn multiple<S, F>(factory: F) -> Multiple<S, F>
where
    F: FnMut() -> S,
{
    Multiple::new(factory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use flate2::Compression;
    use flate2::write::GzEncoder;

    use crate::decompress::ungzip;
    use crate::pipe::{Pipe, Upstream};

    fn gzip_bytes(payload: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(payload).expect("compress");
        encoder.finish().expect("finish")
    }

    #[test]
    fn counts_finished_entities() {
        let mut stream = gzip_bytes(b"one");
        stream.extend(gzip_bytes(b"two"));
        stream.extend(gzip_bytes(b"three"));
        let mut upstream: Upstream<_, Vec<u8>> =
            Upstream::new(vec![Ok::<_, CodecError>(stream)]);

        let mut pipe = Pipe::new(&mut upstream, multiple(ungzip));
        let decoded: Vec<Vec<u8>> = pipe.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(decoded.concat(), b"onetwothree");
        assert_eq!(pipe.into_stage().entities(), 3);
    }

    #[test]
    fn truncated_final_entity_is_counted() {
        let mut stream = gzip_bytes(b"whole");
        let tail = gzip_bytes(b"cut short");
        stream.extend_from_slice(&tail[..tail.len() - 4]);
        let mut upstream: Upstream<_, Vec<u8>> =
            Upstream::new(vec![Ok::<_, CodecError>(stream)]);

        let mut pipe = Pipe::new(&mut upstream, multiple(ungzip));
        let decoded: Vec<Vec<u8>> = pipe.by_ref().collect::<Result<_, _>>().unwrap();
        assert_eq!(decoded.concat(), b"wholecut short");
        assert_eq!(pipe.into_stage().entities(), 2);
    }

    #[test]
    fn empty_chunks_between_entities_are_skipped() {
        let units = vec![
            Ok::<_, CodecError>(Vec::new()),
            Ok(gzip_bytes(b"a")),
            Ok(Vec::new()),
            Ok(Vec::new()),
            Ok(gzip_bytes(b"b")),
            Ok(Vec::new()),
        ];
        let mut upstream: Upstream<_, Vec<u8>> = Upstream::new(units);
        let mut stage = multiple(ungzip);
        let mut output = VecDeque::new();
        while stage.step(&mut upstream, &mut output).unwrap() == Step::Continue {}
        assert_eq!(Vec::from(output).concat(), b"ab");
        assert_eq!(stage.entities(), 2);
    }
}
