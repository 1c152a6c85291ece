//! Token model and byte framing of the compressed stream.
//!
//! The stream is a sequence of groups. A group is one flags byte followed by the
//! payload of up to eight tokens, one flag bit per token, most significant bit
//! first: 1 announces a literal of `T::BYTES` big-endian bytes, 0 a match of
//! `match_bytes` bytes. The last group starts with a zero-length match whose index
//! is the number of tokens that follow it in that group.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::symbol::Symbol;
use std::io::{self, Read, Write};
use std::marker::PhantomData;

/// A back-reference: replay `length` symbols starting `index` slots after the
/// window front, modulo the buffer size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    pub index: usize,
    pub length: usize,
}

impl Match {
    pub fn new(index: usize, length: usize) -> Self {
        Self { index, length }
    }
}

/// One unit of compressor output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<T> {
    Literal(T),
    Match(Match),
}

/// Receiver of the tokens produced by the suffix tree.
pub trait TokenSink<T> {
    fn literal(&mut self, symbol: T);

    fn reference(&mut self, m: Match);
}

impl<T> TokenSink<T> for Vec<Token<T>> {
    fn literal(&mut self, symbol: T) {
        self.push(Token::Literal(symbol));
    }

    fn reference(&mut self, m: Match) {
        self.push(Token::Match(m));
    }
}

/// Fixed-width packing of a match into `index << length_bits | length`,
/// serialized big-endian.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCodec {
    length_bits: u8,
    bytes: usize,
}

impl MatchCodec {
    pub fn new(config: &Config) -> Self {
        Self {
            length_bits: config.match_length_bits(),
            bytes: config.match_bytes(),
        }
    }

    /// Serialized size of one match.
    pub fn bytes(&self) -> usize {
        self.bytes
    }

    fn index_bits(&self) -> usize {
        self.bytes * 8 - self.length_bits as usize
    }

    pub fn encode(&self, m: Match, out: &mut Vec<u8>) {
        debug_assert!(
            m.length < 1 << self.length_bits,
            "match length {} does not fit in {} bits",
            m.length,
            self.length_bits
        );
        debug_assert!(
            (m.index as u64) < 1 << self.index_bits(),
            "match index {} does not fit in {} bits",
            m.index,
            self.index_bits()
        );

        let value = ((m.index as u64) << self.length_bits) | m.length as u64;
        for i in (0..self.bytes).rev() {
            out.push((value >> (i * 8)) as u8);
        }
    }

    /// Decodes the first `self.bytes()` bytes of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Match {
        let value = bytes[..self.bytes]
            .iter()
            .fold(0u64, |value, &byte| (value << 8) | byte as u64);
        let length_mask = (1u64 << self.length_bits) - 1;

        Match {
            index: (value >> self.length_bits) as usize,
            length: (value & length_mask) as usize,
        }
    }
}

/// Groups tokens under flags bytes.
///
/// Completed groups accumulate in an output buffer that the caller drains with
/// [`FrameWriter::write_ready`]; the open group is kept apart until it fills or
/// [`FrameWriter::finish`] closes the stream.
pub struct FrameWriter<T> {
    codec: MatchCodec,
    flags: u8,
    /// Tokens in the open group
    flag_count: u8,
    /// Payload of the open group
    group: Vec<u8>,
    /// Completed groups not yet handed to a writer
    ready: Vec<u8>,
    literals: u64,
    matches: u64,
    _symbol: PhantomData<T>,
}

impl<T: Symbol> FrameWriter<T> {
    pub fn new(codec: MatchCodec) -> Self {
        let item_bytes = codec.bytes().max(T::BYTES);

        Self {
            codec,
            flags: 0,
            flag_count: 0,
            group: Vec::with_capacity(8 * item_bytes),
            ready: Vec::with_capacity(1 + 8 * item_bytes),
            literals: 0,
            matches: 0,
            _symbol: PhantomData,
        }
    }

    /// Literals written so far.
    pub fn literals(&self) -> u64 {
        self.literals
    }

    /// Matches written so far, excluding the end-of-stream sentinel.
    pub fn matches(&self) -> u64 {
        self.matches
    }

    /// Bytes of completed groups waiting to be written.
    pub fn ready(&self) -> &[u8] {
        &self.ready
    }

    /// Writes every completed group to `writer` and returns the byte count.
    pub fn write_ready<W: Write>(&mut self, writer: &mut W) -> io::Result<usize> {
        let written = self.ready.len();
        if written > 0 {
            writer.write_all(&self.ready)?;
            self.ready.clear();
        }
        Ok(written)
    }

    /// Closes the stream: the open group is emitted behind a zero-length match
    /// that counts its tokens. The sentinel takes the first flag slot, so the
    /// recorded flags move one bit down.
    pub fn finish(&mut self) {
        self.ready.push((self.flags >> 1) & 0x7f);
        self.codec
            .encode(Match::new(self.flag_count as usize, 0), &mut self.ready);
        self.ready.append(&mut self.group);

        self.flags = 0;
        self.flag_count = 0;
    }

    fn next_flag(&mut self) {
        self.flag_count += 1;
        if self.flag_count == 8 {
            self.ready.push(self.flags);
            self.ready.append(&mut self.group);
            self.flags = 0;
            self.flag_count = 0;
        }
    }
}

impl<T: Symbol> TokenSink<T> for FrameWriter<T> {
    fn literal(&mut self, symbol: T) {
        self.flags |= 1 << (7 - self.flag_count);
        symbol.write_be(&mut self.group);
        self.literals += 1;
        self.next_flag();
    }

    fn reference(&mut self, m: Match) {
        self.flags &= !(1 << (7 - self.flag_count));
        self.codec.encode(m, &mut self.group);
        self.matches += 1;
        self.next_flag();
    }
}

/// Parses groups back into tokens.
pub struct FrameReader<R, T> {
    reader: R,
    codec: MatchCodec,
    flags: u8,
    /// Next flag bit to consume
    bit: u8,
    /// Flag bits in the current group
    bits: u8,
    /// Set once the sentinel has been read
    last_group: bool,
    finished: bool,
    bytes_read: u64,
    scratch: [u8; 8],
    _symbol: PhantomData<T>,
}

impl<R: Read, T: Symbol> FrameReader<R, T> {
    pub fn new(reader: R, codec: MatchCodec) -> Self {
        Self {
            reader,
            codec,
            flags: 0,
            bit: 0,
            bits: 0,
            last_group: false,
            finished: false,
            bytes_read: 0,
            scratch: [0; 8],
            _symbol: PhantomData,
        }
    }

    /// Bytes consumed from the underlying reader.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Returns the next token, or None after the final group.
    ///
    /// Bytes after the final group are never read.
    pub fn next_token(&mut self) -> Result<Option<Token<T>>> {
        loop {
            if self.finished {
                return Ok(None);
            }

            if self.bit == self.bits {
                if self.last_group {
                    self.finished = true;
                    continue;
                }
                self.read_exact(1, "flags byte")?;
                self.flags = self.scratch[0];
                self.bit = 0;
                self.bits = 8;
            }

            let is_literal = self.flags & (1 << (7 - self.bit)) != 0;
            self.bit += 1;

            if is_literal {
                self.read_exact(T::BYTES, "literal")?;
                return Ok(Some(Token::Literal(T::read_be(&self.scratch))));
            }

            self.read_exact(self.codec.bytes(), "match")?;
            let m = self.codec.decode(&self.scratch);
            if m.length > 0 {
                return Ok(Some(Token::Match(m)));
            }

            // Zero-length match: `index` more tokens remain in this group.
            if self.last_group || m.index > (self.bits - self.bit) as usize {
                return Err(Error::MalformedStream {
                    reason: "end-of-stream marker does not fit its flags byte",
                });
            }
            self.bits = self.bit + m.index as u8;
            self.last_group = true;
        }
    }

    fn read_exact(&mut self, len: usize, context: &'static str) -> Result<()> {
        match self.reader.read_exact(&mut self.scratch[..len]) {
            Ok(()) => {
                self.bytes_read += len as u64;
                Ok(())
            }
            Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => {
                Err(Error::Truncated { context })
            }
            Err(err) => Err(err.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec(bits: u8) -> MatchCodec {
        MatchCodec::new(&Config::new(bits).unwrap())
    }

    fn encode_tokens<T: Symbol>(bits: u8, tokens: &[Token<T>]) -> Vec<u8> {
        let mut writer = FrameWriter::<T>::new(codec(bits));
        for token in tokens {
            match *token {
                Token::Literal(symbol) => writer.literal(symbol),
                Token::Match(m) => writer.reference(m),
            }
        }
        writer.finish();

        let mut out = Vec::new();
        writer.write_ready(&mut out).unwrap();
        out
    }

    fn decode_tokens<T: Symbol>(bits: u8, bytes: &[u8]) -> Result<Vec<Token<T>>> {
        let mut reader = FrameReader::<_, T>::new(bytes, codec(bits));
        let mut tokens = Vec::new();
        while let Some(token) = reader.next_token()? {
            tokens.push(token);
        }
        Ok(tokens)
    }

    #[test]
    fn test_match_packing() {
        // 4 window bits: 3 length bits, 5 index bits, one byte.
        let codec = codec(4);
        let mut out = Vec::new();
        codec.encode(Match::new(31, 7), &mut out);
        assert_eq!(out, vec![0xff]);

        out.clear();
        codec.encode(Match::new(5, 2), &mut out);
        assert_eq!(out, vec![0b0010_1010]);
        assert_eq!(codec.decode(&out), Match::new(5, 2));
    }

    #[test]
    fn test_match_packing_multibyte() {
        // 17 window bits: 6 length bits, 18 index bits, three bytes.
        let codec = codec(17);
        let mut out = Vec::new();
        codec.encode(Match::new(0x3_0001, 63), &mut out);
        assert_eq!(out, vec![0xc0, 0x00, 0x7f]);
        assert_eq!(codec.decode(&out), Match::new(0x3_0001, 63));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "does not fit")]
    fn test_oversized_index_rejected() {
        let mut out = Vec::new();
        codec(4).encode(Match::new(32, 1), &mut out);
    }

    #[test]
    fn test_empty_stream_is_sentinel_only() {
        let bytes = encode_tokens::<u8>(4, &[]);
        assert_eq!(bytes, vec![0x00, 0x00]);
        assert!(decode_tokens::<u8>(4, &bytes).unwrap().is_empty());
    }

    #[test]
    fn test_final_group_layout() {
        let tokens = [
            Token::Literal(b'a'),
            Token::Match(Match::new(3, 4)),
            Token::Literal(b'b'),
        ];
        let bytes = encode_tokens(4, &tokens);
        // Flags 1,0,1 shifted behind the sentinel's 0 bit.
        assert_eq!(bytes[0], 0b0101_0000);
        // Sentinel: index 3, length 0.
        assert_eq!(bytes[1], 3 << 3);
        assert_eq!(&bytes[2..], &[b'a', (3 << 3) | 4, b'b']);

        assert_eq!(decode_tokens::<u8>(4, &bytes).unwrap(), tokens);
    }

    #[test]
    fn test_full_group_then_sentinel() {
        let tokens: Vec<Token<u16>> = (0..8).map(|i| Token::Literal(0x100 + i)).collect();
        let bytes = encode_tokens(4, &tokens);
        assert_eq!(bytes[0], 0xff);
        assert_eq!(bytes.len(), 1 + 16 + 2);
        // Closing group is empty: flags 0, sentinel index 0.
        assert_eq!(&bytes[17..], &[0x00, 0x00]);

        assert_eq!(decode_tokens::<u16>(4, &bytes).unwrap(), tokens);
    }

    #[test]
    fn test_decoder_stops_after_announced_bits() {
        let tokens = [Token::Literal(1u8), Token::Literal(2u8)];
        let mut bytes = encode_tokens(4, &tokens);
        // Trailing garbage after the final group is never consumed.
        bytes.extend_from_slice(&[0xff, 0xff, 0xff]);

        let mut reader = FrameReader::<_, u8>::new(&bytes[..], codec(4));
        let mut count = 0;
        while reader.next_token().unwrap().is_some() {
            count += 1;
        }
        assert_eq!(count, 2);
        assert_eq!(reader.bytes_read(), 4);
    }

    #[test]
    fn test_truncated_stream() {
        let bytes = encode_tokens(4, &[Token::Literal(7u32), Token::Literal(8u32)]);
        let err = decode_tokens::<u32>(4, &bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "literal" }));

        let err = decode_tokens::<u32>(4, &[]).unwrap_err();
        assert!(matches!(err, Error::Truncated { context: "flags byte" }));
    }

    #[test]
    fn test_oversized_sentinel_count() {
        // Sentinel in the last flag slot announcing one more token.
        let bytes = [0xfe, 1, 2, 3, 4, 5, 6, 7, 1 << 3];
        let err = decode_tokens::<u8>(4, &bytes).unwrap_err();
        assert!(matches!(err, Error::MalformedStream { .. }));
    }

    #[test]
    fn test_counters() {
        let mut writer = FrameWriter::<u8>::new(codec(4));
        writer.literal(1);
        writer.reference(Match::new(2, 3));
        writer.reference(Match::new(2, 3));
        writer.finish();
        assert_eq!(writer.literals(), 1);
        assert_eq!(writer.matches(), 2);
        assert_eq!(writer.ready().len(), 1 + 1 + 1 + 2);
    }
}
