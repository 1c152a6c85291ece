use crate::codec::{Match, TokenSink};
use crate::symbol::Symbol;

/// The match currently being extended by the active point.
///
/// Every symbol consumed while the active point walks down the tree extends the
/// match by one. When the walk stops, the match is flushed: long matches become a
/// single back-reference, short ones are re-emitted as the literals they replace.
/// Only the first `bytes_per_match` symbols are kept, since a match any longer is
/// always emitted as a reference.
pub(crate) struct MatchTracker<T> {
    length: usize,
    /// Distance from the window front to the match source, modulo the buffer size
    distance: Option<usize>,
    /// Buffer slot of the match source
    buffer_position: usize,
    literals: Vec<T>,
    max_length: usize,
    bytes_per_match: usize,
    mask: usize,
}

impl<T: Symbol> MatchTracker<T> {
    pub fn new(max_length: usize, bytes_per_match: usize, mask: usize) -> Self {
        Self {
            length: 0,
            distance: None,
            buffer_position: 0,
            literals: Vec::with_capacity(bytes_per_match),
            max_length,
            bytes_per_match,
            mask,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    #[cfg(test)]
    pub fn distance(&self) -> Option<usize> {
        self.distance
    }

    #[inline]
    pub fn buffer_position(&self) -> usize {
        self.buffer_position
    }

    /// Extends the match by `symbol`, found at `distance` / `buffer_position`.
    ///
    /// The source of a match is fixed by its first symbol, so later locations are
    /// ignored. Returns false once the length field is saturated; the caller must
    /// flush before extending again.
    pub fn try_extend(&mut self, distance: usize, buffer_position: usize, symbol: T) -> bool {
        if self.length < self.bytes_per_match {
            self.literals.push(symbol);
        }
        self.length += 1;

        if self.length >= self.max_length {
            return false;
        }

        if self.distance.is_none() {
            self.distance = Some(distance);
            self.buffer_position = buffer_position;
        }
        true
    }

    /// Moves the match source when the active point continues along another edge.
    pub fn relocate(&mut self, distance: usize, buffer_position: usize) {
        self.distance = Some(distance);
        self.buffer_position = buffer_position;
    }

    /// Moves the match source forward by `delta` slots after a unary node collapse.
    ///
    /// `delta` is a forward distance inside the buffer; anything larger means the
    /// caller lost track of a wrap.
    pub fn shift(&mut self, delta: usize) {
        assert!(delta <= self.mask, "shift of {} slots exceeds the buffer", delta);
        let distance = self.distance.expect("shifted match has a source");

        self.distance = Some((distance + delta) & self.mask);
        self.buffer_position = (self.buffer_position + delta) & self.mask;
    }

    /// Re-anchors the match source on refreshed node offsets.
    ///
    /// The distance moves by `delta` while the recorded buffer slot becomes
    /// `buffer_position`.
    pub fn realign(&mut self, delta: usize, buffer_position: usize) {
        assert!(delta <= self.mask, "realignment of {} slots exceeds the buffer", delta);
        let distance = self.distance.expect("realigned match has a source");

        self.distance = Some((distance + delta) & self.mask);
        self.buffer_position = buffer_position;
    }

    /// Emits the pending match and resets the tracker.
    pub fn flush<S: TokenSink<T>>(&mut self, out: &mut S) {
        if self.length > self.bytes_per_match {
            let index = self
                .distance
                .expect("match longer than a literal run has a source");
            out.reference(Match::new(index, self.length));
        } else {
            for &symbol in &self.literals[..self.length] {
                out.literal(symbol);
            }
        }

        self.length = 0;
        self.distance = None;
        self.literals.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::Token;

    #[test]
    fn test_short_match_becomes_literals() {
        let mut tracker = MatchTracker::<u8>::new(7, 2, 15);
        assert!(tracker.try_extend(3, 5, b'a'));
        assert!(tracker.try_extend(9, 6, b'b'));
        assert_eq!(tracker.distance(), Some(3));
        assert_eq!(tracker.buffer_position(), 5);

        let mut out: Vec<Token<u8>> = Vec::new();
        tracker.flush(&mut out);
        assert_eq!(out, vec![Token::Literal(b'a'), Token::Literal(b'b')]);
        assert!(tracker.is_empty());
        assert_eq!(tracker.distance(), None);
    }

    #[test]
    fn test_long_match_becomes_reference() {
        let mut tracker = MatchTracker::<u8>::new(7, 1, 15);
        for symbol in b"abc" {
            assert!(tracker.try_extend(12, 4, *symbol));
        }

        let mut out: Vec<Token<u8>> = Vec::new();
        tracker.flush(&mut out);
        assert_eq!(out, vec![Token::Match(Match::new(12, 3))]);
    }

    #[test]
    fn test_saturation_forces_flush() {
        let mut tracker = MatchTracker::<u8>::new(3, 1, 15);
        assert!(tracker.try_extend(2, 2, 1));
        assert!(tracker.try_extend(2, 3, 1));
        assert!(!tracker.try_extend(2, 4, 1));
        assert_eq!(tracker.len(), 3);

        let mut out: Vec<Token<u8>> = Vec::new();
        tracker.flush(&mut out);
        assert_eq!(out, vec![Token::Match(Match::new(2, 3))]);
    }

    #[test]
    fn test_zero_length_field_never_matches() {
        let mut tracker = MatchTracker::<u16>::new(0, 1, 7);
        assert!(!tracker.try_extend(1, 1, 300));

        let mut out: Vec<Token<u16>> = Vec::new();
        tracker.flush(&mut out);
        assert_eq!(out, vec![Token::Literal(300)]);
    }

    #[test]
    fn test_shift_wraps() {
        let mut tracker = MatchTracker::<u8>::new(7, 1, 15);
        tracker.try_extend(14, 13, 0);
        tracker.shift(3);
        assert_eq!(tracker.distance(), Some(1));
        assert_eq!(tracker.buffer_position(), 0);
    }

    #[test]
    #[should_panic(expected = "exceeds the buffer")]
    fn test_shift_rejects_unwrapped_delta() {
        let mut tracker = MatchTracker::<u8>::new(7, 1, 15);
        tracker.try_extend(2, 2, 0);
        tracker.shift(16);
    }

    #[test]
    #[should_panic(expected = "exceeds the buffer")]
    fn test_realign_rejects_unwrapped_delta() {
        let mut tracker = MatchTracker::<u8>::new(7, 1, 15);
        tracker.try_extend(2, 2, 0);
        tracker.realign(20, 4);
    }

    #[test]
    fn test_relocate_and_realign() {
        let mut tracker = MatchTracker::<u8>::new(7, 1, 15);
        tracker.try_extend(4, 4, 0);
        tracker.relocate(8, 6);
        assert_eq!(tracker.distance(), Some(8));

        tracker.realign(10, 2);
        assert_eq!(tracker.distance(), Some(2));
        assert_eq!(tracker.buffer_position(), 2);
    }
}
