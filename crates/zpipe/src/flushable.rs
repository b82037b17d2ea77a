//! Units flowing through flush-aware stages.

/// Either a payload chunk or an explicit flush boundary.
///
/// A `Flush` asks every stage downstream to emit whatever it has buffered
/// without ending the stream, so the receiving end can decode all data sent
/// before the boundary.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Flushable<T> {
    /// Payload.
    Chunk(T),
    /// Synchronization boundary.
    Flush,
}

impl<T> Flushable<T> {
    /// Returns `true` for [`Flushable::Flush`].
    #[must_use]
    pub const fn is_flush(&self) -> bool {
        matches!(self, Self::Flush)
    }

    /// Returns the payload of a chunk.
    pub fn into_chunk(self) -> Option<T> {
        match self {
            Self::Chunk(chunk) => Some(chunk),
            Self::Flush => None,
        }
    }

    /// Borrows the payload of a chunk.
    #[must_use]
    pub const fn as_chunk(&self) -> Option<&T> {
        match self {
            Self::Chunk(chunk) => Some(chunk),
            Self::Flush => None,
        }
    }

    /// Maps the payload, keeping flush markers in place.
    pub fn map<U, F>(self, f: F) -> Flushable<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Chunk(chunk) => Flushable::Chunk(f(chunk)),
            Self::Flush => Flushable::Flush,
        }
    }
}

impl<T> From<T> for Flushable<T> {
    fn from(chunk: T) -> Self {
        Self::Chunk(chunk)
    }
}
