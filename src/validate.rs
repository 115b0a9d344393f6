//! Input validation.
//!
//! Runs before any scanning: the parser only ever sees valid text with
//! no NUL bytes.

use std::fmt;

use crate::error::{EncodingFault, Error};

/// Declared encoding of raw input bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Encoding {
    #[default]
    Utf8,
    Ascii,
    /// Opaque bytes; never accepted as markup.
    Binary,
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Encoding::Utf8 => "UTF-8",
            Encoding::Ascii => "ASCII",
            Encoding::Binary => "binary",
        })
    }
}

/// Check raw bytes against their declared encoding.
///
/// # Example
/// ```
/// use dtext::validate::{validate, Encoding};
///
/// assert_eq!(validate(b"[b]ok[/b]", Encoding::Utf8), Ok("[b]ok[/b]"));
/// assert!(validate(b"foo\0bar", Encoding::Utf8).is_err());
/// ```
pub fn validate(bytes: &[u8], encoding: Encoding) -> Result<&str, Error> {
    let text = match encoding {
        Encoding::Binary => {
            tracing::debug!(len = bytes.len(), "rejected binary input");
            return Err(Error::TypeMismatch {
                found: "binary data",
            });
        }
        Encoding::Ascii => {
            if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
                return Err(reject(encoding, offset, EncodingFault::NonAscii));
            }
            // All bytes are ASCII, which is always valid UTF-8.
            std::str::from_utf8(bytes)
                .map_err(|e| reject(encoding, e.valid_up_to(), EncodingFault::MalformedSequence))?
        }
        Encoding::Utf8 => std::str::from_utf8(bytes)
            .map_err(|e| reject(encoding, e.valid_up_to(), EncodingFault::MalformedSequence))?,
    };
    validate_str(text, encoding)
}

/// Check text that is already known to be UTF-8.
pub fn validate_str(text: &str, encoding: Encoding) -> Result<&str, Error> {
    match memchr::memchr(0, text.as_bytes()) {
        Some(offset) => Err(reject(encoding, offset, EncodingFault::NullByte)),
        None => Ok(text),
    }
}

fn reject(encoding: Encoding, offset: usize, reason: EncodingFault) -> Error {
    tracing::debug!(%encoding, offset, %reason, "rejected input");
    Error::InvalidEncoding {
        encoding,
        offset,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_utf8() {
        assert_eq!(validate("東方 [b]x[/b]".as_bytes(), Encoding::Utf8), Ok("東方 [b]x[/b]"));
    }

    #[test]
    fn test_null_byte_offset() {
        assert_eq!(
            validate(b"foo\0bar", Encoding::Utf8),
            Err(Error::InvalidEncoding {
                encoding: Encoding::Utf8,
                offset: 3,
                reason: EncodingFault::NullByte,
            })
        );
    }

    #[test]
    fn test_malformed_utf8() {
        let err = validate(b"ab\xff\xfe", Encoding::Utf8).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidEncoding {
                encoding: Encoding::Utf8,
                offset: 2,
                reason: EncodingFault::MalformedSequence,
            }
        );
    }

    #[test]
    fn test_truncated_sequence() {
        // First two bytes of a three-byte sequence.
        assert!(validate(b"x\xe6\x9d", Encoding::Utf8).is_err());
    }

    #[test]
    fn test_ascii_rejects_high_bytes() {
        assert!(validate(b"plain", Encoding::Ascii).is_ok());
        assert_eq!(
            validate("café".as_bytes(), Encoding::Ascii),
            Err(Error::InvalidEncoding {
                encoding: Encoding::Ascii,
                offset: 3,
                reason: EncodingFault::NonAscii,
            })
        );
    }

    #[test]
    fn test_binary_is_type_mismatch() {
        assert!(matches!(
            validate(b"abc", Encoding::Binary),
            Err(Error::TypeMismatch { .. })
        ));
    }
}
