//! Circular symbol storage behind the sliding window.
//!
//! The buffer holds `2 * window_size` slots. The live window is the range
//! `back..front` and never spans more than `window_size` slots while compressing;
//! the other half keeps recent history so back-references and implicit edge labels
//! can be read without copying. A symbol at stream position `p` lives in slot
//! `p & mask`.

use crate::symbol::Symbol;

pub struct SlidingWindow<T> {
    slots: Vec<T>,
    /// Next slot to write
    front: usize,
    /// Next slot to evict
    back: usize,
    window_size: usize,
    mask: usize,
    /// Distance (mod buffer size) from `front` to the source of a replayed match
    replay_distance: usize,
}

impl<T: Symbol> SlidingWindow<T> {
    pub fn new(window_size: usize) -> Self {
        assert!(
            window_size.is_power_of_two() && window_size >= 2,
            "window size must be a power of two"
        );
        let capacity = window_size << 1;

        Self {
            slots: vec![T::default(); capacity],
            front: 0,
            back: 0,
            window_size,
            mask: capacity - 1,
            replay_distance: 0,
        }
    }

    #[inline]
    pub fn front(&self) -> usize {
        self.front
    }

    #[inline]
    pub fn back(&self) -> usize {
        self.back
    }

    #[inline]
    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Buffer size minus one; offsets are reduced with it.
    #[inline]
    pub fn mask(&self) -> usize {
        self.mask
    }

    /// Number of symbols between `back` and `front`.
    #[inline]
    pub fn len(&self) -> usize {
        self.front.wrapping_sub(self.back) & self.mask
    }

    /// Reads the symbol stored for an offset. Offsets past the buffer end wrap.
    #[inline]
    pub fn read(&self, offset: usize) -> T {
        self.slots[offset & self.mask]
    }

    #[inline]
    pub fn append(&mut self, symbol: T) {
        self.slots[self.front] = symbol;
        self.front = (self.front + 1) & self.mask;
    }

    /// Removes and returns the oldest symbol.
    #[inline]
    pub fn evict_oldest(&mut self) -> T {
        let symbol = self.slots[self.back];
        self.advance_back();
        symbol
    }

    /// Drops the oldest symbol without reading it.
    #[inline]
    pub fn advance_back(&mut self) {
        self.back = (self.back + 1) & self.mask;
    }

    /// True once the window holds `window_size` symbols.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() >= self.window_size
    }

    /// While replaying, `front == back` means every slot holds an undelivered symbol
    /// (or, before the first append, that nothing was written yet).
    #[inline]
    pub fn is_empty_during_replay(&self) -> bool {
        self.front == self.back
    }

    /// True when `front` sits at the start of either buffer half.
    #[inline]
    pub fn front_is_at_half_boundary(&self) -> bool {
        self.front == 0 || self.front == self.window_size
    }

    /// Slots from `back` forward to `offset`. Offsets inside the live window map to
    /// `0..len()`; older history wraps to the top of the range.
    #[inline]
    pub fn distance_from_back(&self, offset: usize) -> usize {
        offset.wrapping_sub(self.back) & self.mask
    }

    /// Whether offset `a` was written after offset `b`.
    ///
    /// Both offsets must lie in the recent history, so ages are measured from `back`
    /// instead of comparing raw slot numbers, which wrap every `window_size` appends.
    #[inline]
    pub fn is_later(&self, a: usize, b: usize) -> bool {
        self.distance_from_back(a) > self.distance_from_back(b)
    }

    /// Sets the source of the next replayed symbols to `front + distance`.
    pub fn set_replay_source(&mut self, distance: usize) {
        self.replay_distance = distance & self.mask;
    }

    /// Copies one symbol from the replay source to `front`.
    ///
    /// The source advances together with `front`, so a source that overlaps the
    /// symbols being produced repeats them, as a back-reference must.
    #[inline]
    pub fn append_replayed_symbol(&mut self) {
        let symbol = self.read(self.front + self.replay_distance);
        self.append(symbol);
    }
}
