use crate::error::{Error, Result};

/// Smallest accepted window size in bits.
pub const MIN_WINDOW_BITS: u8 = 2;

/// Largest accepted window size in bits.
pub const MAX_WINDOW_BITS: u8 = 25;

/// Window size used when nothing else is requested (128 Ki symbols).
pub const DEFAULT_WINDOW_BITS: u8 = 17;

/// Session configuration shared by the compressor and the decompressor.
///
/// Both sides must use the same configuration: the window size fixes the width of
/// the match fields, and nothing about it is stored in the compressed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    window_bits: u8,
    binary_mode: bool,
}

impl Config {
    /// Creates a configuration with a window of `2^window_bits` symbols.
    ///
    /// Fails if `window_bits` is outside `MIN_WINDOW_BITS..=MAX_WINDOW_BITS`.
    pub fn new(window_bits: u8) -> Result<Self> {
        if !(MIN_WINDOW_BITS..=MAX_WINDOW_BITS).contains(&window_bits) {
            return Err(Error::InvalidWindowBits {
                bits: window_bits,
                min: MIN_WINDOW_BITS,
                max: MAX_WINDOW_BITS,
            });
        }

        Ok(Self {
            window_bits,
            binary_mode: false,
        })
    }

    /// Treats input as raw bytes instead of word tokens.
    pub fn with_binary_mode(mut self, binary_mode: bool) -> Self {
        self.binary_mode = binary_mode;
        self
    }

    pub fn window_bits(&self) -> u8 {
        self.window_bits
    }

    pub fn binary_mode(&self) -> bool {
        self.binary_mode
    }

    /// Number of symbols in the sliding window.
    pub fn window_size(&self) -> usize {
        1 << self.window_bits
    }

    /// Capacity of the circular buffer backing the window (window plus history).
    pub fn buffer_size(&self) -> usize {
        self.window_size() << 1
    }

    /// Width of the match-length field.
    ///
    /// Chosen so that index and length together fill whole bytes minus one bit,
    /// which leaves the index field `window_bits + 1` bits wide.
    pub fn match_length_bits(&self) -> u8 {
        8 - self.window_bits % 8 - 1
    }

    /// Number of bytes one encoded match occupies.
    pub fn match_bytes(&self) -> usize {
        (self.window_bits as usize + self.match_length_bits() as usize).div_ceil(8)
    }

    /// Longest match the length field can carry.
    pub fn max_match_length(&self) -> usize {
        (1 << self.match_length_bits()) - 1
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_bits: DEFAULT_WINDOW_BITS,
            binary_mode: false,
        }
    }
}
