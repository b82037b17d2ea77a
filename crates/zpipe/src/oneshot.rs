//! Whole-buffer helpers built on the streaming stages.

use crate::compress::compress;
use crate::decompress::decompress;
use crate::error::CodecError;
use crate::framing::WindowBits;
use crate::level::CompressionLevel;
use crate::multiple::multiple;
use crate::pipe::PipeExt;

/// Compresses `input` into a new [`Vec`] holding one complete entity.
pub fn compress_to_vec(
    input: &[u8],
    level: CompressionLevel,
    window_bits: WindowBits,
) -> Result<Vec<u8>, CodecError> {
    std::iter::once(Ok::<_, CodecError>(input.to_vec()))
        .pipe(compress(level, window_bits))
        .try_fold(Vec::new(), |mut output, chunk| {
            output.extend_from_slice(&chunk?);
            Ok(output)
        })
}

/// Decompresses the first entity in `input` into a new [`Vec`].
///
/// Bytes following the end of the entity are ignored.
pub fn decompress_to_vec(input: &[u8], window_bits: WindowBits) -> Result<Vec<u8>, CodecError> {
    std::iter::once(Ok::<_, CodecError>(input.to_vec()))
        .pipe(decompress(window_bits))
        .try_fold(Vec::new(), |mut output, chunk| {
            output.extend_from_slice(&chunk?);
            Ok(output)
        })
}

/// Decompresses every entity concatenated in `input` into a new [`Vec`].
pub fn decompress_concatenated_to_vec(
    input: &[u8],
    window_bits: WindowBits,
) -> Result<Vec<u8>, CodecError> {
    std::iter::once(Ok::<_, CodecError>(input.to_vec()))
        .pipe(multiple(move || decompress(window_bits)))
        .try_fold(Vec::new(), |mut output, chunk| {
            output.extend_from_slice(&chunk?);
            Ok(output)
        })
}
