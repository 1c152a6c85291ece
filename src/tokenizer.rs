//! Word tokenization for text input.
//!
//! Text is split into maximal runs of ASCII-alphanumeric bytes and maximal runs of
//! everything else, and every distinct run gets a dense integer ID. The IDs are the
//! symbols the compressor sees; the dictionary travels next to the compressed
//! stream.

use crate::error::{Error, Result};
use ahash::AHashMap as HashMap;

/// Iterator over the tokens of a byte string.
///
/// Concatenating the tokens gives back the input.
#[derive(Debug, Clone)]
pub struct WordTokenizer<'a> {
    input: &'a [u8],
    position: usize,
}

impl<'a> WordTokenizer<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self { input, position: 0 }
    }
}

impl<'a> Iterator for WordTokenizer<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        let rest = &self.input[self.position..];
        let first = rest.first()?;
        let is_word = first.is_ascii_alphanumeric();

        let len = rest
            .iter()
            .position(|byte| byte.is_ascii_alphanumeric() != is_word)
            .unwrap_or(rest.len());
        self.position += len;
        Some(&rest[..len])
    }
}

/// Bidirectional mapping between tokens and IDs, assigned in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TokenDictionary {
    ids: HashMap<Vec<u8>, u64>,
    tokens: Vec<Vec<u8>>,
}

impl TokenDictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct tokens, which is also the alphabet size of the IDs.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    pub fn alphabet_size(&self) -> u64 {
        self.tokens.len() as u64
    }

    /// Returns the ID of `token`, assigning the next free one if it is new.
    pub fn insert(&mut self, token: &[u8]) -> u64 {
        if let Some(&id) = self.ids.get(token) {
            return id;
        }
        let id = self.tokens.len() as u64;
        self.ids.insert(token.to_vec(), id);
        self.tokens.push(token.to_vec());
        id
    }

    pub fn id(&self, token: &[u8]) -> Option<u64> {
        self.ids.get(token).copied()
    }

    pub fn token(&self, id: u64) -> Option<&[u8]> {
        self.tokens.get(usize::try_from(id).ok()?).map(Vec::as_slice)
    }

    /// Tokenizes `text`, extending the dictionary, and returns the token IDs.
    pub fn encode(&mut self, text: &[u8]) -> Vec<u64> {
        WordTokenizer::new(text)
            .map(|token| self.insert(token))
            .collect()
    }

    /// Concatenates the tokens named by `ids`.
    pub fn decode(&self, ids: &[u64]) -> Result<Vec<u8>> {
        let mut text = Vec::new();
        for &id in ids {
            let token = self.token(id).ok_or(Error::UnknownToken { id })?;
            text.extend_from_slice(token);
        }
        Ok(text)
    }

    /// Serializes the dictionary: a little-endian `u32` count, then for each ID in
    /// order a little-endian `u32` length followed by the token bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let size = 4 + self.tokens.iter().map(|t| 4 + t.len()).sum::<usize>();
        let mut out = Vec::with_capacity(size);

        out.extend_from_slice(&(self.tokens.len() as u32).to_le_bytes());
        for token in &self.tokens {
            out.extend_from_slice(&(token.len() as u32).to_le_bytes());
            out.extend_from_slice(token);
        }
        out
    }

    /// Parses the format written by [`TokenDictionary::to_bytes`].
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut rest = bytes;
        let count = read_u32(&mut rest, "token count")?;

        let mut dictionary = Self::new();
        for id in 0..count {
            let len = read_u32(&mut rest, "token length")? as usize;
            if rest.len() < len {
                return Err(Error::InvalidDictionary {
                    message: format!("token {} needs {} bytes, {} left", id, len, rest.len()),
                });
            }
            let (token, tail) = rest.split_at(len);
            rest = tail;

            if dictionary.insert(token) != id as u64 {
                return Err(Error::InvalidDictionary {
                    message: format!("token {} is a duplicate", id),
                });
            }
        }

        if !rest.is_empty() {
            return Err(Error::InvalidDictionary {
                message: format!("{} trailing bytes", rest.len()),
            });
        }
        Ok(dictionary)
    }
}

fn read_u32(rest: &mut &[u8], what: &str) -> Result<u32> {
    if rest.len() < 4 {
        return Err(Error::InvalidDictionary {
            message: format!("missing {}", what),
        });
    }
    let (head, tail) = rest.split_at(4);
    *rest = tail;
    Ok(u32::from_le_bytes([head[0], head[1], head[2], head[3]]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tokenizer_splits_runs() {
        let tokens: Vec<&[u8]> = WordTokenizer::new(b"hello,  world42!").collect();
        assert_eq!(
            tokens,
            vec![&b"hello"[..], &b",  "[..], &b"world42"[..], &b"!"[..]]
        );
    }

    #[test]
    fn test_tokenizer_edge_cases() {
        assert_eq!(WordTokenizer::new(b"").count(), 0);
        assert_eq!(WordTokenizer::new(b"   \n").count(), 1);
        // Non-ASCII bytes group with punctuation.
        let tokens: Vec<&[u8]> = WordTokenizer::new("a\u{e9}b".as_bytes()).collect();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_ids_in_first_seen_order() {
        let mut dictionary = TokenDictionary::new();
        let ids = dictionary.encode(b"to be or not to be");
        assert_eq!(ids, vec![0, 1, 2, 1, 3, 1, 4, 1, 0, 1, 2]);
        assert_eq!(dictionary.alphabet_size(), 5);
        assert_eq!(dictionary.token(3), Some(&b"or"[..]));
        assert_eq!(dictionary.id(b"not"), Some(4));
    }

    #[test]
    fn test_decode_restores_text() {
        let text = b"The cat sat; the cat ran.\n";
        let mut dictionary = TokenDictionary::new();
        let ids = dictionary.encode(text);
        assert_eq!(dictionary.decode(&ids).unwrap(), text);
    }

    #[test]
    fn test_decode_unknown_id() {
        let dictionary = TokenDictionary::new();
        assert!(matches!(
            dictionary.decode(&[7]),
            Err(Error::UnknownToken { id: 7 })
        ));
    }

    #[test]
    fn test_serialization() {
        let mut dictionary = TokenDictionary::new();
        dictionary.encode(b"ab ab");

        let bytes = dictionary.to_bytes();
        assert_eq!(
            bytes,
            vec![2, 0, 0, 0, 2, 0, 0, 0, b'a', b'b', 1, 0, 0, 0, b' ']
        );

        let restored = TokenDictionary::from_bytes(&bytes).unwrap();
        assert_eq!(restored.len(), 2);
        assert_eq!(restored.id(b"ab"), Some(0));
        assert_eq!(restored.token(1), Some(&b" "[..]));
    }

    #[test]
    fn test_malformed_dictionary() {
        assert!(TokenDictionary::from_bytes(&[1, 0]).is_err());
        assert!(TokenDictionary::from_bytes(&[1, 0, 0, 0, 5, 0, 0, 0, b'x']).is_err());
        // Same token twice.
        let duplicate = [2, 0, 0, 0, 1, 0, 0, 0, b'x', 1, 0, 0, 0, b'x'];
        assert!(matches!(
            TokenDictionary::from_bytes(&duplicate),
            Err(Error::InvalidDictionary { .. })
        ));
        assert!(TokenDictionary::from_bytes(&[0, 0, 0, 0, 9]).is_err());
        assert!(TokenDictionary::from_bytes(&[0, 0, 0, 0]).unwrap().is_empty());
    }
}
