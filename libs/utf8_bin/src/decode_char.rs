//! Decoding of a single UTF-8 encoded code point.
//!
//! Unlike [`str::from_utf8`], this looks at exactly one code point at the
//! start of the input and reports how many bytes it spans. Whatever follows
//! that code point does not need to be valid.
//!
//! Only well-formed sequences per RFC 3629 are accepted, so overlong forms,
//! surrogates, and code points past `U+10FFFF` are rejected.

use std::ops::RangeInclusive;

const REPLACEMENT: u32 = 0xFFFD;
const CONTINUATION: RangeInclusive<u8> = 0x80..=0xBF;

/// The result of [`decode_char`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Decoded {
    /// The decoded code point.
    ///
    /// This is `U+FFFD` if the sequence was invalid, however a validly encoded
    /// `U+FFFD` exists too. Check [`Self::valid`] instead.
    pub code: u32,
    /// The amount of bytes the sequence spans.
    ///
    /// Invalid sequences always span 1 byte. Only empty input spans 0.
    pub len: usize,
    /// Whether the sequence was well-formed.
    pub valid: bool,
}

impl Decoded {
    const EMPTY: Self = Self {
        code: REPLACEMENT,
        len: 0,
        valid: false,
    };

    const INVALID: Self = Self {
        code: REPLACEMENT,
        len: 1,
        valid: false,
    };

    const fn ok(code: u32, len: usize) -> Self {
        Self {
            code,
            len,
            valid: true,
        }
    }

    /// Gets the decoded [`char`], if the sequence was valid.
    #[must_use]
    pub fn to_char(self) -> Option<char> {
        if self.valid {
            char::from_u32(self.code)
        } else {
            None
        }
    }

    /// Whether this is a valid sequence longer than a single byte.
    #[must_use]
    pub const fn is_multi_byte(self) -> bool {
        self.valid && self.len > 1
    }
}

/// Decodes the code point at the start of `bytes`.
///
/// # Examples
///
/// ```
/// use utf8_bin::decode_char::decode_char;
///
/// let decoded = decode_char("ü!".as_bytes());
/// assert!(decoded.valid);
/// assert_eq!(decoded.code, 0xFC);
/// assert_eq!(decoded.len, 2);
///
/// // a stray continuation byte
/// let decoded = decode_char(b"\x80ABC");
/// assert!(!decoded.valid);
/// assert_eq!(decoded.len, 1);
/// ```
#[must_use]
pub fn decode_char(bytes: &[u8]) -> Decoded {
    let Some((&lead, rest)) = bytes.split_first() else {
        return Decoded::EMPTY;
    };

    // the allowed range of the first continuation byte depends on the lead
    // this is what excludes overlong forms, surrogates, and too large values
    let (extra, first) = match lead {
        0x00..=0x7F => return Decoded::ok(u32::from(lead), 1),
        0xC2..=0xDF => (1, CONTINUATION),
        0xE0 => (2, 0xA0..=0xBF),
        0xE1..=0xEC | 0xEE..=0xEF => (2, CONTINUATION),
        0xED => (2, 0x80..=0x9F),
        0xF0 => (3, 0x90..=0xBF),
        0xF1..=0xF3 => (3, CONTINUATION),
        0xF4 => (3, 0x80..=0x8F),
        _ => return Decoded::INVALID,
    };

    let Some(tail) = rest.get(..extra) else {
        return Decoded::INVALID;
    };

    let mut code = u32::from(lead) & (0x7F >> (extra + 1));
    for (index, &byte) in tail.iter().enumerate() {
        let in_range = match index {
            0 => first.contains(&byte),
            _ => CONTINUATION.contains(&byte),
        };

        if !in_range {
            return Decoded::INVALID;
        }

        code = (code << 6) | u32::from(byte & 0x3F);
    }

    Decoded::ok(code, extra + 1)
}
