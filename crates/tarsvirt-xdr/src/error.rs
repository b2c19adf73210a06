//! XDR codec errors.

use std::fmt;

/// Result type for XDR operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while encoding or decoding XDR.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Error reported by a serde impl.
    #[error("{0}")]
    Message(String),

    /// The serde data model construct has no XDR encoding.
    #[error("{0} is not representable in XDR")]
    Unsupported(&'static str),

    /// Input ended in the middle of a value.
    #[error("unexpected end of input")]
    Eof,

    /// Boolean word other than 0 or 1.
    #[error("invalid boolean value: {0}")]
    InvalidBool(u32),

    /// Optional-data discriminant other than 0 or 1.
    #[error("invalid optional-data discriminant: {0}")]
    InvalidOption(u32),

    /// String payload is not UTF-8.
    #[error("invalid UTF-8 string")]
    InvalidUtf8,

    /// Length prefix larger than the remaining input.
    #[error("length {0} exceeds remaining input {1}")]
    LengthOverflow(usize, usize),

    /// Sequences must know their length up front.
    #[error("sequence length must be known before encoding")]
    UnknownLength,

    /// Bytes left over after decoding.
    #[error("trailing data: {0} bytes remaining")]
    TrailingData(usize),
}

impl serde::ser::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}

impl serde::de::Error for Error {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        Error::Message(msg.to_string())
    }
}
