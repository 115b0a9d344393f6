//! Error taxonomy.
//!
//! Only unusable input is an error. Malformed markup never is: it
//! degrades to literal text.

use std::fmt;

use crate::validate::Encoding;

/// Input rejected before any parsing begins.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The input is not text at all.
    #[error("expected text input, found {found}")]
    TypeMismatch { found: &'static str },

    /// The bytes do not form valid text in the declared encoding.
    #[error("invalid {encoding} input at byte {offset}: {reason}")]
    InvalidEncoding {
        encoding: Encoding,
        offset: usize,
        reason: EncodingFault,
    },

    /// The input exceeds the largest supported document.
    #[error("input of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },
}

/// What exactly was wrong with rejected bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncodingFault {
    MalformedSequence,
    NullByte,
    NonAscii,
}

impl fmt::Display for EncodingFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            EncodingFault::MalformedSequence => "malformed byte sequence",
            EncodingFault::NullByte => "null byte",
            EncodingFault::NonAscii => "byte outside ASCII",
        })
    }
}
