use std::fmt::Debug;
use std::hash::Hash;

/// An alphabet symbol the engine can store, compare and serialize.
///
/// Implemented for the four unsigned widths an alphabet can need. The engine is
/// generic over this trait and is instantiated once per session.
pub trait Symbol: Copy + Eq + Default + Debug + Hash {
    /// Serialized width of a literal.
    const BYTES: usize;

    /// Appends the big-endian encoding of `self` to `out`.
    fn write_be(self, out: &mut Vec<u8>);

    /// Decodes a symbol from exactly `Self::BYTES` big-endian bytes.
    fn read_be(bytes: &[u8]) -> Self;

    fn to_u64(self) -> u64;

    /// Narrows a value to this width, keeping the low bits.
    fn from_u64(value: u64) -> Self;
}

macro_rules! impl_symbol {
    ($($ty:ty),*) => {
        $(
            impl Symbol for $ty {
                const BYTES: usize = std::mem::size_of::<$ty>();

                #[inline]
                fn write_be(self, out: &mut Vec<u8>) {
                    out.extend_from_slice(&self.to_be_bytes());
                }

                #[inline]
                fn read_be(bytes: &[u8]) -> Self {
                    let mut raw = [0u8; std::mem::size_of::<$ty>()];
                    raw.copy_from_slice(&bytes[..Self::BYTES]);
                    <$ty>::from_be_bytes(raw)
                }

                #[inline]
                fn to_u64(self) -> u64 {
                    self as u64
                }

                #[inline]
                fn from_u64(value: u64) -> Self {
                    value as $ty
                }
            }
        )*
    };
}

impl_symbol!(u8, u16, u32, u64);

/// Symbol width picked for an alphabet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolWidth {
    U8,
    U16,
    U32,
    U64,
}

impl SymbolWidth {
    /// Picks the narrowest width whose value range holds every symbol of an alphabet
    /// with `alphabet_size` distinct symbols.
    pub fn for_alphabet(alphabet_size: u64) -> Self {
        if alphabet_size <= 1 << 8 {
            SymbolWidth::U8
        } else if alphabet_size <= 1 << 16 {
            SymbolWidth::U16
        } else if alphabet_size <= 1 << 32 {
            SymbolWidth::U32
        } else {
            SymbolWidth::U64
        }
    }

    /// Serialized width of one literal.
    pub fn bytes(self) -> usize {
        match self {
            SymbolWidth::U8 => u8::BYTES,
            SymbolWidth::U16 => u16::BYTES,
            SymbolWidth::U32 => u32::BYTES,
            SymbolWidth::U64 => u64::BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_layout() {
        let mut out = Vec::new();
        0x0102u16.write_be(&mut out);
        0x0a0b0c0du32.write_be(&mut out);
        assert_eq!(out, vec![0x01, 0x02, 0x0a, 0x0b, 0x0c, 0x0d]);

        assert_eq!(u16::read_be(&out[..2]), 0x0102);
        assert_eq!(u32::read_be(&out[2..]), 0x0a0b0c0d);
    }

    #[test]
    fn test_narrowing() {
        assert_eq!(u8::from_u64(0x1ff), 0xff);
        assert_eq!(u64::from_u64(u64::MAX).to_u64(), u64::MAX);
    }

    #[test]
    fn test_width_selection() {
        assert_eq!(SymbolWidth::for_alphabet(0), SymbolWidth::U8);
        assert_eq!(SymbolWidth::for_alphabet(256), SymbolWidth::U8);
        assert_eq!(SymbolWidth::for_alphabet(257), SymbolWidth::U16);
        assert_eq!(SymbolWidth::for_alphabet(1 << 16), SymbolWidth::U16);
        assert_eq!(SymbolWidth::for_alphabet((1 << 16) + 1), SymbolWidth::U32);
        assert_eq!(SymbolWidth::for_alphabet((1 << 32) + 1), SymbolWidth::U64);
        assert_eq!(SymbolWidth::for_alphabet(u64::MAX), SymbolWidth::U64);
    }

    #[test]
    fn test_width_bytes() {
        assert_eq!(SymbolWidth::U8.bytes(), 1);
        assert_eq!(SymbolWidth::U64.bytes(), 8);
    }
}
