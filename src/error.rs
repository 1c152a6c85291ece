//! Error type shared by the configuration layer, the codec and the drivers.
//!
//! Structural problems inside the suffix tree are bugs, not runtime conditions,
//! and are reported through assertions instead of this type.

use thiserror::Error;

/// Errors reported by the compressor.
#[derive(Error, Debug)]
pub enum Error {
    /// The sliding window size is outside the supported range.
    #[error("window size bits {bits} out of range, choose a value in {min}..={max}")]
    InvalidWindowBits {
        /// Requested number of bits
        bits: u8,
        /// Smallest accepted value
        min: u8,
        /// Largest accepted value
        max: u8,
    },

    /// The compressed stream ended before its terminating zero-length match.
    #[error("compressed stream truncated while reading {context}")]
    Truncated {
        /// What the decoder was reading when input ran out
        context: &'static str,
    },

    /// The compressed stream contains a field no encoder produces.
    #[error("malformed compressed stream: {reason}")]
    MalformedStream {
        /// What was wrong
        reason: &'static str,
    },

    /// A serialized token dictionary could not be parsed.
    #[error("invalid token dictionary: {message}")]
    InvalidDictionary {
        /// Description of the problem
        message: String,
    },

    /// A decoded symbol has no entry in the token dictionary.
    #[error("token id {id} is not in the dictionary")]
    UnknownToken {
        /// The offending token id
        id: u64,
    },

    /// An input symbol does not belong to the declared alphabet.
    #[error("symbol {symbol} is outside an alphabet of {alphabet_size} symbols")]
    SymbolOutOfRange {
        /// The offending symbol
        symbol: u64,
        /// Declared alphabet size
        alphabet_size: u64,
    },

    /// I/O failure of an underlying reader or writer.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_bits_message() {
        let err = Error::InvalidWindowBits {
            bits: 1,
            min: 2,
            max: 25,
        };
        assert_eq!(
            err.to_string(),
            "window size bits 1 out of range, choose a value in 2..=25"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
