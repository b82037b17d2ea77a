//! Pull-driven pipeline plumbing.
//!
//! A pipeline is a chain of [`Stage`]s. Each stage is an explicit state
//! machine: [`Stage::step`] pulls as many input units as it needs from a
//! [`Pull`] source, pushes the output it produced into a queue and returns.
//! [`Pipe`] wraps a source and a stage into an [`Iterator`], stepping the
//! stage only when its queue runs dry, so work happens exactly when the
//! consumer asks for the next item.
//!
//! Input that a stage read but did not use goes back through
//! [`Pull::push_back`]. [`Upstream`] keeps those units in a replay buffer
//! that is checked before the underlying iterator, which is how leftover
//! bytes of one compressed entity become the first input of the next.

use std::collections::VecDeque;
use std::iter::FusedIterator;

use crate::error::CodecError;

/// Source of input units with a replay buffer.
pub trait Pull {
    /// Unit produced by the source.
    type Item;
    /// Error produced by the source and by stages reading from it.
    type Error;

    /// Returns the next unit, or `None` once the source is exhausted.
    fn pull(&mut self) -> Result<Option<Self::Item>, Self::Error>;

    /// Re-queues `item` so that it is the next unit returned by [`pull`].
    ///
    /// [`pull`]: Pull::pull
    fn push_back(&mut self, item: Self::Item);
}

impl<P> Pull for &mut P
where
    P: Pull + ?Sized,
{
    type Item = P::Item;
    type Error = P::Error;

    fn pull(&mut self) -> Result<Option<Self::Item>, Self::Error> {
        (**self).pull()
    }

    fn push_back(&mut self, item: Self::Item) {
        (**self).push_back(item);
    }
}

/// [`Pull`] adapter over an iterator of `Result<T, E>` items.
///
/// Errors yielded by the iterator are handed to the stage unchanged.
#[derive(Debug)]
pub struct Upstream<I, T> {
    source: I,
    replay: Vec<T>,
    exhausted: bool,
}

impl<I, T> Upstream<I, T> {
    /// Wraps `source`.
    pub fn new<S>(source: S) -> Self
    where
        S: IntoIterator<IntoIter = I>,
    {
        Self {
            source: source.into_iter(),
            replay: Vec::new(),
            exhausted: false,
        }
    }

    /// Units pushed back and not yet pulled again, most recent last.
    #[must_use]
    pub fn replayed(&self) -> &[T] {
        &self.replay
    }

    /// Returns the underlying iterator, discarding any replayed units.
    pub fn into_inner(self) -> I {
        self.source
    }
}

impl<I, T, E> Pull for Upstream<I, T>
where
    I: Iterator<Item = Result<T, E>>,
{
    type Item = T;
    type Error = E;

    fn pull(&mut self) -> Result<Option<T>, E> {
        if let Some(item) = self.replay.pop() {
            return Ok(Some(item));
        }
        if self.exhausted {
            return Ok(None);
        }
        match self.source.next() {
            Some(item) => item.map(Some),
            None => {
                self.exhausted = true;
                Ok(None)
            }
        }
    }

    fn push_back(&mut self, item: T) {
        self.replay.push(item);
    }
}

/// Outcome of a single [`Stage::step`].
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Step {
    /// The stage can make more progress.
    Continue,
    /// The stage has finished; further steps produce nothing.
    Done,
}

/// A pipeline stage driven one input unit at a time.
pub trait Stage {
    /// Input unit the stage consumes.
    type Input;
    /// Output unit the stage produces.
    type Output;

    /// Pulls input and queues the output it produced.
    ///
    /// Returns [`Step::Done`] once the stage has finished. A stage that
    /// returns an error has already released its resources and must not be
    /// stepped again.
    fn step<P>(
        &mut self,
        input: &mut P,
        output: &mut VecDeque<Self::Output>,
    ) -> Result<Step, P::Error>
    where
        P: Pull<Item = Self::Input>,
        P::Error: From<CodecError>;
}

/// Iterator running a [`Stage`] over a [`Pull`] source.
///
/// The pipe yields every queued output before stepping the stage again. When
/// a step fails, the output it queued before failing is still yielded, then
/// the error, and then nothing more.
pub struct Pipe<P, S>
where
    P: Pull,
    S: Stage,
{
    input: P,
    stage: S,
    queue: VecDeque<S::Output>,
    failure: Option<P::Error>,
    done: bool,
}

impl<P, S> Pipe<P, S>
where
    P: Pull,
    S: Stage,
{
    /// Creates a pipe reading from `input`.
    pub fn new(input: P, stage: S) -> Self {
        Self {
            input,
            stage,
            queue: VecDeque::new(),
            failure: None,
            done: false,
        }
    }

    /// Returns the input source, e.g. to hand leftover bytes to another consumer.
    pub fn into_input(self) -> P {
        self.input
    }

    /// Returns the stage.
    pub fn into_stage(self) -> S {
        self.stage
    }
}

impl<P, S> Iterator for Pipe<P, S>
where
    P: Pull<Item = S::Input>,
    P::Error: From<CodecError>,
    S: Stage,
{
    type Item = Result<S::Output, P::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(unit) = self.queue.pop_front() {
                return Some(Ok(unit));
            }
            if let Some(err) = self.failure.take() {
                return Some(Err(err));
            }
            if self.done {
                return None;
            }
            match self.stage.step(&mut self.input, &mut self.queue) {
                Ok(Step::Continue) => {}
                Ok(Step::Done) => self.done = true,
                Err(err) => {
                    self.done = true;
                    self.failure = Some(err);
                }
            }
        }
    }
}

impl<P, S> FusedIterator for Pipe<P, S>
where
    P: Pull<Item = S::Input>,
    P::Error: From<CodecError>,
    S: Stage,
{
}

/// Chains a [`Stage`] onto an iterator of `Result<T, E>` units.
pub trait PipeExt<T, E>: Iterator<Item = Result<T, E>> + Sized {
    /// Runs `stage` over the units of `self`.
    fn pipe<S>(self, stage: S) -> Pipe<Upstream<Self, T>, S>
    where
        S: Stage<Input = T>,
        E: From<CodecError>,
    {
        Pipe::new(Upstream::new(self), stage)
    }
}

impl<I, T, E> PipeExt<T, E> for I where I: Iterator<Item = Result<T, E>> {}
