use crate::error::{Error, Result};
use crate::symbol::Symbol;

/// Sequential supplier of symbols to compress.
pub trait SymbolSource<T> {
    /// Returns the next symbol, or None at the end of the stream.
    fn next_symbol(&mut self) -> Option<T>;

    /// Number of symbols the source will produce in total, if known.
    fn total_count(&self) -> Option<u64> {
        None
    }
}

/// Receiver of decompressed symbols.
pub trait SymbolSink<T> {
    fn write_symbol(&mut self, symbol: T) -> Result<()>;

    /// Number of distinct symbols the sink accepts.
    fn alphabet_size(&self) -> u64;
}

/// Symbols borrowed from a slice.
#[derive(Debug, Clone)]
pub struct SliceSource<'a, T> {
    symbols: &'a [T],
    position: usize,
}

impl<'a, T> SliceSource<'a, T> {
    pub fn new(symbols: &'a [T]) -> Self {
        Self {
            symbols,
            position: 0,
        }
    }
}

impl<T: Copy> SymbolSource<T> for SliceSource<'_, T> {
    fn next_symbol(&mut self) -> Option<T> {
        let symbol = self.symbols.get(self.position).copied()?;
        self.position += 1;
        Some(symbol)
    }

    fn total_count(&self) -> Option<u64> {
        Some(self.symbols.len() as u64)
    }
}

/// Adapts any iterator into a source. The total is known when the iterator
/// reports an exact size hint.
#[derive(Debug, Clone)]
pub struct IterSource<I> {
    iter: I,
}

impl<I> IterSource<I> {
    pub fn new(iter: I) -> Self {
        Self { iter }
    }
}

impl<T, I: Iterator<Item = T>> SymbolSource<T> for IterSource<I> {
    fn next_symbol(&mut self) -> Option<T> {
        self.iter.next()
    }

    fn total_count(&self) -> Option<u64> {
        match self.iter.size_hint() {
            (lower, Some(upper)) if lower == upper => Some(lower as u64),
            _ => None,
        }
    }
}

impl<T: Symbol> SymbolSink<T> for Vec<T> {
    fn write_symbol(&mut self, symbol: T) -> Result<()> {
        self.push(symbol);
        Ok(())
    }

    fn alphabet_size(&self) -> u64 {
        1u64.checked_shl(8 * T::BYTES as u32).unwrap_or(u64::MAX)
    }
}

/// Integer symbols from a declared alphabet, collected as they are decoded.
///
/// The alphabet size decides the literal width the decompressor reads, and every
/// decoded symbol is checked against it.
#[derive(Debug, Clone)]
pub struct SymbolBuffer {
    symbols: Vec<u64>,
    alphabet_size: u64,
}

impl SymbolBuffer {
    pub fn new(alphabet_size: u64) -> Self {
        Self {
            symbols: Vec::new(),
            alphabet_size,
        }
    }

    pub fn symbols(&self) -> &[u64] {
        &self.symbols
    }

    pub fn into_symbols(self) -> Vec<u64> {
        self.symbols
    }
}

impl SymbolSink<u64> for SymbolBuffer {
    fn write_symbol(&mut self, symbol: u64) -> Result<()> {
        if symbol >= self.alphabet_size {
            return Err(Error::SymbolOutOfRange {
                symbol,
                alphabet_size: self.alphabet_size,
            });
        }
        self.symbols.push(symbol);
        Ok(())
    }

    fn alphabet_size(&self) -> u64 {
        self.alphabet_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slice_source() {
        let symbols = [3u16, 1, 4];
        let mut source = SliceSource::new(&symbols);
        assert_eq!(source.total_count(), Some(3));

        let mut collected = Vec::new();
        while let Some(symbol) = source.next_symbol() {
            collected.push(symbol);
        }
        assert_eq!(collected, symbols);
        assert_eq!(source.next_symbol(), None);
    }

    #[test]
    fn test_iter_source_total() {
        let source = IterSource::new(0u8..10);
        assert_eq!(source.total_count(), Some(10));

        let source = IterSource::new((0u8..10).filter(|x| x % 2 == 0));
        assert_eq!(source.total_count(), None);
    }

    #[test]
    fn test_vec_sink() {
        let mut sink: Vec<u8> = Vec::new();
        sink.write_symbol(9).unwrap();
        assert_eq!(sink, vec![9]);
        assert_eq!(SymbolSink::<u8>::alphabet_size(&sink), 256);
        assert_eq!(SymbolSink::<u64>::alphabet_size(&Vec::<u64>::new()), u64::MAX);
    }

    #[test]
    fn test_symbol_buffer_checks_alphabet() {
        let mut sink = SymbolBuffer::new(300);
        assert_eq!(sink.alphabet_size(), 300);
        sink.write_symbol(299).unwrap();
        assert!(matches!(
            sink.write_symbol(300),
            Err(Error::SymbolOutOfRange {
                symbol: 300,
                alphabet_size: 300
            })
        ));
        assert_eq!(sink.symbols(), &[299]);
        assert_eq!(sink.into_symbols(), vec![299]);
    }
}
