//! Chunked byte sources for feeding pipelines from [`std::io::Read`].

use std::io::{self, Read};
use std::iter::FusedIterator;

use crate::error::{ConfigError, Error};

/// Iterator reading a [`Read`] implementation in chunks of at most
/// `chunk_size` bytes.
///
/// Yields `Result<Vec<u8>, Error>` so it can drive any stage directly; read
/// failures surface as [`Error::Io`] and end the iteration.
#[derive(Debug)]
pub struct ReadChunks<R> {
    reader: R,
    chunk_size: usize,
    done: bool,
}

impl<R: Read> ReadChunks<R> {
    /// Returns the wrapped reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ReadChunks<R> {
    type Item = Result<Vec<u8>, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let mut chunk = vec![0u8; self.chunk_size];
        loop {
            match self.reader.read(&mut chunk) {
                Ok(0) => {
                    self.done = true;
                    return None;
                }
                Ok(read) => {
                    chunk.truncate(read);
                    return Some(Ok(chunk));
                }
                Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }
    }
}

impl<R: Read> FusedIterator for ReadChunks<R> {}

/// Reads `reader` in chunks of at most `chunk_size` bytes.
pub fn read_chunks<R: Read>(reader: R, chunk_size: usize) -> Result<ReadChunks<R>, ConfigError> {
    if chunk_size == 0 {
        return Err(ConfigError::ChunkSize);
    }
    Ok(ReadChunks {
        reader,
        chunk_size,
        done: false,
    })
}
