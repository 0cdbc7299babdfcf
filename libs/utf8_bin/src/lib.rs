//! Reversibly maps arbitrary binary data to UTF-8 text.
//!
//! Unlike the formats in a base-N style encoding, the output keeps any valid
//! UTF-8 in the input readable: text stays text, and only the bytes that
//! aren't part of a well-formed sequence get mapped individually.
//!
//! The format is as follows:
//!
//! - The input is scanned one UTF-8 sequence at a time, see
//!   [`decode_char`](decode_char::decode_char).
//! - A well-formed multi-byte sequence is emitted as its [`char`], unless its
//!   value lies in `U+0080..=U+00FF` or `U+D801..=U+DFFF`.
//! - Every other byte, including each byte of such an excluded sequence, is
//!   emitted as the [`char`] with the code point equal to the byte's value.
//!
//! Decoding works on the raw UTF-8 representation of the text. Each 2-byte
//! sequence with a `0xC2` or `0xC3` lead byte, that is `U+0080..=U+00FF`,
//! becomes the single byte of its code point value. Every other byte is kept
//! as is.
//!
//! Excluding `U+0080..=U+00FF` on the encoding side is what makes this
//! reversible: those chars only ever come out of single bytes, so decoding
//! can turn them back into single bytes.
//!
//! Each direction provides a streaming function writing to a buffer
//! ([`encode`] and [`decode`]) and a convenience function allocating its
//! output ([`to_string`], [`from_bytes`], and [`from_str`]).
//!
//! # Examples
//!
//! ```
//! let data = b"caf\xC3\xA9 \xF0\x9F\x98\x80 \x80\xFF";
//! let text = utf8_bin::to_string(data);
//! assert_eq!(text, "caf\u{C3}\u{A9} \u{1F600} \u{80}\u{FF}");
//!
//! let back = utf8_bin::from_str(&text).expect("valid encoded text");
//! assert_eq!(back, data);
//! ```

// for benchmarks and randomized tests
#[cfg(test)]
use {criterion as _, rand as _, smallvec as _};

use std::{fmt, io};

pub mod decode_char;
#[cfg(test)]
mod tests;

use decode_char::decode_char;

/// Error decoding [`utf8_bin`](self) text.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// A `0xC2` or `0xC3` lead byte was not followed by a valid continuation
    /// byte, so the input cannot have been produced by [`encode`].
    #[error("invalid encoded text: malformed sequence at byte offset {offset}")]
    Malformed {
        /// The offset of the lead byte in the raw input.
        offset: usize,
    },
    /// The written buffer returned an error.
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// The maximum byte length raw text of the specified length may decode to.
///
/// Decoding never grows its input, so this is the length itself. This can be
/// used to reserve space in a buffer.
pub const fn max_byte_len(text_len: usize) -> usize {
    text_len
}

/// Encodes bytes as text, returning a [`String`] with the result.
///
/// This is equivalent to using [`encode`] with a [`String`].
///
/// Use [`from_str`] to reverse the operation.
#[must_use]
pub fn to_string(bytes: &[u8]) -> String {
    // Text input stays about the same size, while high bytes grow to 2.
    // Mostly binary data averages out at ~150%.
    let expected_size = bytes.len() + (bytes.len() >> 1);
    let mut result = String::with_capacity(expected_size);

    encode(&mut result, bytes).expect("write to String cannot fail");

    log::trace!(
        "encoded {} bytes into {} chars",
        bytes.len(),
        result.chars().count()
    );
    result
}

/// Encodes bytes as text, writing them to a buffer.
///
/// Use [`decode`] to reverse the operation.
///
/// # Errors
///
/// This can only return an [`Err`] if the `writer` does so.
pub fn encode<W: fmt::Write>(mut writer: W, bytes: &[u8]) -> fmt::Result {
    let mut rest = bytes;
    while !rest.is_empty() {
        let decoded = decode_char(rest);

        // invalid sequences still span 1 byte, so this always makes progress
        let (chunk, tail) = rest.split_at(decoded.len);
        match decoded.to_char() {
            Some(c) if decoded.is_multi_byte() && !is_excluded(decoded.code) => {
                writer.write_char(c)?;
            },
            _ => {
                for &b in chunk {
                    writer.write_char(char::from(b))?;
                }
            },
        }

        rest = tail;
    }

    Ok(())
}

/// Whether a multi-byte sequence decoding to this code point has to be
/// emitted byte-by-byte instead.
///
/// [`decode_char()`] never produces surrogates.
const fn is_excluded(code: u32) -> bool {
    matches!(code, 0x80..=0xFF | 0xD801..=0xDFFF)
}

/// Decodes text produced by [`to_string`] back into the original bytes.
///
/// This is equivalent to [`from_bytes`] with the string's UTF-8 bytes. Since
/// a [`str`] is always valid UTF-8, this in practice does not fail.
///
/// # Errors
///
/// Returns [`Err`] if the text is malformed.
pub fn from_str(input: &str) -> Result<Vec<u8>, Error> {
    from_bytes(input.as_bytes())
}

/// Decodes the raw UTF-8 bytes of text produced by [`to_string`].
///
/// The input does not need to be entirely valid UTF-8. Only sequences
/// starting with `0xC2` or `0xC3` are checked.
///
/// On error, no partially decoded data is returned.
///
/// # Errors
///
/// Returns [`Err`] if a `0xC2` or `0xC3` byte is not followed by a valid
/// continuation byte.
pub fn from_bytes(input: &[u8]) -> Result<Vec<u8>, Error> {
    let mut result = Vec::with_capacity(max_byte_len(input.len()));

    decode(&mut result, input)?;

    log::trace!(
        "decoded {} text bytes into {} bytes",
        input.len(),
        result.len()
    );
    Ok(result)
}

/// Decodes the raw UTF-8 bytes of text, writing the bytes to a buffer.
///
/// Use [`encode`] to reverse the operation.
///
/// If this returns an error, the `writer` may have already received part of
/// the output. Discard it in that case.
///
/// # Errors
///
/// Returns [`Err`] if a `0xC2` or `0xC3` byte is not followed by a valid
/// continuation byte, or if the writer returned an error.
pub fn decode<W: io::Write>(mut writer: W, input: &[u8]) -> Result<(), Error> {
    let mut rest = input;
    while let Some(pos) = rest.iter().position(|&b| matches!(b, 0xC2 | 0xC3)) {
        let (plain, tail) = rest.split_at(pos);
        writer.write_all(plain)?;

        let decoded = decode_char(tail);
        let Some(byte) = decoded.to_char().and_then(|c| u8::try_from(c).ok()) else {
            let offset = input.len() - tail.len();
            log::debug!("rejecting encoded text: malformed sequence at byte offset {offset}");
            return Err(Error::Malformed { offset });
        };

        writer.write_all(&[byte])?;
        rest = &tail[decoded.len..];
    }

    writer.write_all(rest)?;
    Ok(())
}
