#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `zpipe` provides streaming DEFLATE, zlib and gzip stages for pull-driven,
//! chunk-oriented pipelines. A pipeline is any iterator of
//! `Result<T, E>` units; chaining a stage onto it with [`PipeExt::pipe`]
//! yields another such iterator, so stages compose without buffering whole
//! payloads.
//!
//! # Design
//!
//! Each direction has one flush-aware core, [`Decompress`] and [`Compress`],
//! operating on [`Flushable`] units. The plain entry points
//! ([`decompress()`], [`compress()`], [`gzip`] and [`ungzip`]) wrap those
//! cores in [`Unflushed`]. The cores own a codec session from the
//! [`engine`] module, which bridges arbitrarily sized input to the bursty
//! output of the [`flate2`](https://docs.rs/flate2) low-level streams. The
//! framing (raw DEFLATE, zlib or gzip) is selected by [`WindowBits`]
//! following the zlib convention.
//!
//! Decompression stops at the end of the entity it decodes and pushes any
//! bytes that follow back onto its input. [`multiple()`] builds on that to
//! decode entities concatenated back to back, such as multi-member gzip
//! files.
//!
//! # Invariants
//!
//! - A codec session is created when the stage receives its first unit, so
//!   an empty chunk still yields a complete empty entity while an input with
//!   no units yields nothing. The session is released exactly once on every
//!   exit path.
//! - Flush-aware stages forward every [`Flushable::Flush`] after emitting the
//!   bytes the engine produced for it. [`Unflushed`] never emits one.
//! - Leftover bytes after an entity are only reported when its session is
//!   torn down.
//!
//! # Errors
//!
//! Stages are generic over the pipeline's error type `E` as long as
//! `E: From<`[`CodecError`]`>`. Errors yielded by the upstream iterator pass
//! through unchanged; engine failures are converted into `E`. Either kind
//! ends the pipe. Invalid configuration is rejected up front with
//! [`ConfigError`], and [`Error`] unifies both with I/O failures from
//! [`read_chunks`].
//!
//! # Examples
//!
//! Round-tripping chunks through gzip and back:
//!
//! ```
//! use zpipe::{CodecError, PipeExt, gzip, ungzip};
//!
//! # fn main() -> Result<(), CodecError> {
//! let chunks = vec![Ok::<_, CodecError>(b"hello ".to_vec()), Ok(b"world".to_vec())];
//! let decoded: Vec<Vec<u8>> = chunks
//!     .into_iter()
//!     .pipe(gzip())
//!     .pipe(ungzip())
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(decoded.concat(), b"hello world");
//! # Ok(())
//! # }
//! ```
//!
//! Decoding concatenated gzip members:
//!
//! ```
//! use zpipe::{CodecError, PipeExt, multiple, oneshot, ungzip};
//! use zpipe::{CompressionLevel, WindowBits};
//!
//! # fn main() -> Result<(), CodecError> {
//! let mut stream = oneshot::compress_to_vec(b"hello", CompressionLevel::Default, WindowBits::GZIP)?;
//! stream.extend(oneshot::compress_to_vec(b"world", CompressionLevel::Default, WindowBits::GZIP)?);
//!
//! let decoded: Vec<Vec<u8>> = std::iter::once(Ok::<_, CodecError>(stream))
//!     .pipe(multiple(ungzip))
//!     .collect::<Result<_, _>>()?;
//! assert_eq!(decoded.concat(), b"helloworld");
//! # Ok(())
//! # }
//! ```
//!
//! # See also
//!
//! - [`pipe`] for the pull, push-back and stage plumbing.
//! - [`engine`] for the codec sessions driving `flate2`.

#[cfg(not(any(feature = "zlib-rs", feature = "zlib-ng")))]
compile_error!("zpipe requires a zlib-API backend: enable the `zlib-rs` or `zlib-ng` feature");

mod compress;
mod config;
mod decompress;
pub mod engine;
mod error;
mod flushable;
mod framing;
mod level;
mod multiple;
pub mod oneshot;
pub mod pipe;
mod source;
mod unflushed;

pub use compress::{Compress, compress, compress_flush, gzip};
pub use config::{DEFAULT_CHUNK_SIZE, DeflateConfig, InflateConfig};
pub use decompress::{Decompress, decompress, decompress_flush, ungzip};
pub use error::{CodecError, ConfigError, Error, Result};
pub use flushable::Flushable;
pub use framing::{Framing, WindowBits};
pub use level::CompressionLevel;
pub use multiple::{Multiple, multiple};
pub use pipe::{Pipe, PipeExt, Pull, Stage, Step, Upstream};
pub use source::{ReadChunks, read_chunks};
pub use unflushed::Unflushed;
