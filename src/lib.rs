//! # stlz - Suffix Tree LZ Compression
//!
//! A streaming, bounded-memory LZ77-style compressor whose match finder is an
//! online suffix tree over a sliding window.
//!
//! Every input symbol extends the tree by Ukkonen's algorithm; once the window is
//! full, the suffix starting at the oldest symbol is removed again. Walking the
//! tree to insert a symbol is also how repeats are found:
//! 1. **Matches**: symbols consumed along an existing path form a back-reference
//! 2. **Literals**: symbols the tree has never seen in that context, and matches
//!    too short to pay for their encoding, are emitted verbatim
//!
//! Tokens are packed eight to a group behind a flags byte, and the stream closes
//! with a zero-length match that tells the decoder how much of the last group is
//! used.
//!
//! ## Example
//!
//! ```
//! use stlz_rs::{Compressor, Config, Decompressor, SliceSource};
//!
//! let config = Config::new(10).unwrap();
//! let input = b"how much wood would a woodchuck chuck if a woodchuck could chuck wood";
//!
//! let mut compressed: Vec<u8> = Vec::new();
//! let stats = Compressor::<u8>::new(config)
//!     .compress(SliceSource::new(input), &mut compressed)
//!     .unwrap();
//! assert!(stats.bytes_out < stats.bytes_in);
//!
//! let mut restored: Vec<u8> = Vec::new();
//! Decompressor::<u8>::new(config)
//!     .decompress(&compressed[..], &mut restored)
//!     .unwrap();
//! assert_eq!(restored, input);
//! ```
//!
//! Integer alphabets of any size go through [`compress_symbols`] and
//! [`decompress_symbols`], which pick the narrowest symbol width for the alphabet.
//! Text can be turned into such an alphabet with [`TokenDictionary`].
//!
//! ## Performance
//!
//! - O(1) amortized tree work per symbol, plus a child-list scan per vertex visited
//! - Memory fixed by the window: `2 * window` buffered symbols and at most
//!   `2 * window + 2` tree nodes
//! - Memory-safe node links using generational indices (SlotMap)

mod codec;
mod compressor;
mod config;
mod decompressor;
mod error;
mod node;
mod stats;
mod stream;
mod symbol;
mod tokenizer;
mod tracker;
mod tree;
mod window;


pub use codec::{FrameReader, FrameWriter, Match, MatchCodec, Token, TokenSink};
pub use compressor::{compress_symbols, Compressor};
pub use config::{Config, DEFAULT_WINDOW_BITS, MAX_WINDOW_BITS, MIN_WINDOW_BITS};
pub use decompressor::{
    decompress_symbols, decompress_to_sink, decompress_to_sink_with_progress, Decompressor,
};
pub use error::{Error, Result};
pub use stats::{CompressionStats, DecompressionStats, Progress};
pub use stream::{IterSource, SliceSource, SymbolBuffer, SymbolSink, SymbolSource};
pub use symbol::{Symbol, SymbolWidth};
pub use tokenizer::{TokenDictionary, WordTokenizer};
pub use tree::SuffixTree;
pub use window::SlidingWindow;
