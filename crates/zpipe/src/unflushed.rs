//! Plain-chunk view of a flush-aware stage.

use std::collections::VecDeque;

use crate::error::CodecError;
use crate::flushable::Flushable;
use crate::pipe::{Pull, Stage, Step};

/// Runs a flush-aware stage over plain chunks.
///
/// Input chunks reach the inner stage as [`Flushable::Chunk`]; any
/// [`Flushable::Flush`] the inner stage emits is dropped and chunks are
/// unwrapped on the way out.
pub struct Unflushed<S>
where
    S: Stage,
{
    inner: S,
    scratch: VecDeque<S::Output>,
}

impl<S> Unflushed<S>
where
    S: Stage,
{
    /// Wraps a flush-aware stage.
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            scratch: VecDeque::new(),
        }
    }

    /// Borrows the wrapped stage.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Returns the wrapped stage.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S, T, U> Stage for Unflushed<S>
where
    S: Stage<Input = Flushable<T>, Output = Flushable<U>>,
{
    type Input = T;
    type Output = U;

    fn step<P>(&mut self, input: &mut P, output: &mut VecDeque<U>) -> Result<Step, P::Error>
    where
        P: Pull<Item = T>,
        P::Error: From<CodecError>,
    {
        let step = self.inner.step(&mut Chunks(input), &mut self.scratch);
        output.extend(self.scratch.drain(..).filter_map(Flushable::into_chunk));
        step
    }
}

/// Presents a plain source as a source of [`Flushable::Chunk`]s.
struct Chunks<'a, P>(&'a mut P);

impl<P> Pull for Chunks<'_, P>
where
    P: Pull,
{
    type Item = Flushable<P::Item>;
    type Error = P::Error;

    fn pull(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        Ok(self.0.pull()?.map(Flushable::Chunk))
    }

    fn push_back(&mut self, item: Self::Item) {
        if let Flushable::Chunk(chunk) = item {
            self.0.push_back(chunk);
        }
    }
}
