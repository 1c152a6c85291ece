use crate::codec::TokenSink;
use crate::config::Config;
use crate::node::{Node, Nodes};
use crate::symbol::Symbol;
use crate::tracker::MatchTracker;
use crate::window::SlidingWindow;
use log::trace;
use slotmap::DefaultKey;

/// Reference point of the longest suffix still waiting for its own leaf.
///
/// The pending string is spelled by the path to `start` followed by `length`
/// symbols along the edge into `end`. When `length` is zero the point sits on
/// `start` and `end` is meaningless (it may name an edge the point already left).
#[derive(Debug, Clone, Copy)]
struct ActivePoint {
    start: DefaultKey,
    end: Option<DefaultKey>,
    length: usize,
    /// Buffer slot of the first pending symbol not yet consumed by `start`
    offset: usize,
}

/// Online suffix tree over a sliding window.
///
/// Every appended symbol extends the tree in Ukkonen's manner and, once the window
/// is full, removes the suffix that starts at the evicted symbol. The walk of the
/// active point doubles as the match finder: each symbol consumed along an
/// existing path extends the current match, and every stop flushes it to a
/// [`TokenSink`].
///
/// Node usage stays below `2 * window_size + 2` regardless of input.
pub struct SuffixTree<T> {
    window: SlidingWindow<T>,
    nodes: Nodes,
    root: DefaultKey,
    bot: DefaultKey,

    /// Leaf pool, handed out and recycled in FIFO order
    leaves: Vec<DefaultKey>,
    next_leaf: usize,
    oldest_leaf: usize,

    active: ActivePoint,
    /// Inner node created by the previous split that still needs its suffix link
    unlinked: Option<DefaultKey>,

    tracker: MatchTracker<T>,
    /// The leaf ending the active edge was recycled; the pending match must be
    /// written before it is continued from a vertex
    match_after_eviction: bool,

    mask: usize,
    symbols_processed: u64,
    evictions: u64,
    peak_nodes: usize,
}

impl<T: Symbol> SuffixTree<T> {
    /// Creates an empty tree with all `window_size` leaves preallocated.
    pub fn new(config: &Config) -> Self {
        let window_size = config.window_size();
        let mask = config.buffer_size() - 1;

        let mut nodes = Nodes::with_capacity(window_size + 2);
        let root = nodes.insert(Node::inner(0, 0));
        let bot = nodes.insert(Node::bot());
        nodes.set_suffix_link(root, bot);

        let leaves = (0..window_size).map(|_| nodes.insert(Node::leaf())).collect();
        let peak_nodes = nodes.len();

        Self {
            window: SlidingWindow::new(window_size),
            nodes,
            root,
            bot,
            leaves,
            next_leaf: 0,
            oldest_leaf: 0,
            active: ActivePoint {
                start: root,
                end: None,
                length: 0,
                offset: 0,
            },
            unlinked: None,
            tracker: MatchTracker::new(config.max_match_length(), config.match_bytes(), mask),
            match_after_eviction: false,
            mask,
            symbols_processed: 0,
            evictions: 0,
            peak_nodes,
        }
    }

    /// Adds one symbol to the window and writes every token it completes to `out`.
    pub fn append_symbol<S: TokenSink<T>>(&mut self, symbol: T, out: &mut S) {
        self.move_down(symbol, out);
        self.window.append(symbol);
        self.canonize();

        if self.window.is_full() {
            self.remove_oldest(out);
            if self.window.front_is_at_half_boundary() {
                self.refresh_offsets(out);
            }
        }

        self.symbols_processed += 1;
        self.peak_nodes = self.peak_nodes.max(self.nodes.len());
    }

    /// Writes the match still in flight, if any.
    pub fn finish<S: TokenSink<T>>(&mut self, out: &mut S) {
        self.tracker.flush(out);
    }

    pub fn window_size(&self) -> usize {
        self.window.window_size()
    }

    /// Live nodes, including root, bot and the whole leaf pool.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Highest node count observed after any append.
    pub fn peak_node_count(&self) -> usize {
        self.peak_nodes
    }

    pub fn symbols_processed(&self) -> u64 {
        self.symbols_processed
    }

    /// Suffixes removed so far. Eviction starts once `window_size` symbols are in
    /// the window, so `n` symbols evict `n - window_size + 1` of them.
    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    // ========================================================================
    // Extension
    // ========================================================================

    /// Inserts leaves for every pending suffix that cannot be extended by `symbol`.
    fn move_down<S: TokenSink<T>>(&mut self, symbol: T, out: &mut S) {
        while !self.try_move_down(symbol, out) {
            let start = self.active.start;

            if self.active.length == 0 {
                let leaf = self.new_leaf(start);
                self.nodes.add_child(start, leaf);
                self.move_sideways();
                continue;
            }

            // Split the active edge at the active point
            let end = self
                .active
                .end
                .expect("active point inside an edge has an end");
            let mut split = Node::inner(
                self.nodes[end].offset,
                self.nodes.depth(start) + self.active.length,
            );
            split.parent = Some(start);
            let split = self.nodes.insert(split);

            self.nodes.replace_child(start, end, split);
            self.nodes.add_child(split, end);
            self.nodes[end].parent = Some(split);

            let leaf = self.new_leaf(split);
            self.nodes.add_child(split, leaf);

            if let Some(unlinked) = self.unlinked.take() {
                self.nodes.set_suffix_link(unlinked, split);
            }

            self.move_sideways();

            if self.active.length > 0 {
                self.unlinked = Some(split);
            } else {
                self.nodes.set_suffix_link(split, self.active.start);
            }
        }
    }

    /// Advances the active point over `symbol` if the tree already contains the
    /// pending string followed by it.
    fn try_move_down<S: TokenSink<T>>(&mut self, symbol: T, out: &mut S) -> bool {
        let start = self.active.start;

        // Every symbol leads from bot to the root.
        if start == self.bot {
            debug_assert!(self.tracker.is_empty(), "match pending at bot");
            self.active.start = self.root;
            self.active.end = None;
            self.active.offset = (self.active.offset + 1) & self.mask;
            self.active.length = self.active.length.saturating_sub(1);
            out.literal(symbol);
            return true;
        }

        let depth = self.nodes.depth(start);

        if self.active.length == 0 {
            let mut prev = None;
            let mut child = self.nodes.first_child(start);

            while let Some(key) = child {
                let position = self.nodes[key].offset + depth;
                if self.window.read(position) == symbol {
                    self.extend_from_vertex(position, symbol, out);
                    self.active.end = Some(key);
                    self.active.length += 1;
                    if let Some(prev) = prev {
                        self.nodes.move_to_front(start, prev, key);
                    }
                    return true;
                }
                prev = child;
                child = self.nodes[key].next_sibling;
            }
        } else {
            let end = self
                .active
                .end
                .expect("active point inside an edge has an end");
            let position = depth + self.nodes[end].offset + self.active.length;

            if self.window.read(position) == symbol {
                let distance = self.distance_from_front(position);
                if !self.tracker.try_extend(distance, position & self.mask, symbol) {
                    self.tracker.flush(out);
                }
                self.active.length += 1;
                return true;
            }
        }

        self.tracker.flush(out);
        false
    }

    /// Extends the match with a symbol found on a new edge below a vertex.
    ///
    /// The edge may start at a different occurrence of the matched string, so the
    /// match source moves there.
    fn extend_from_vertex<S: TokenSink<T>>(&mut self, position: usize, symbol: T, out: &mut S) {
        if self.match_after_eviction && !self.tracker.is_empty() {
            self.tracker.flush(out);
            self.match_after_eviction = false;
        }

        let buffer_position = position & self.mask;
        let distance = self.distance_from_front(position);

        if !self.tracker.is_empty() {
            let source = buffer_position.wrapping_sub(self.tracker.len()) & self.mask;
            self.tracker.relocate(distance, source);
        }
        if !self.tracker.try_extend(distance, buffer_position, symbol) {
            self.tracker.flush(out);
        }
    }

    /// Follows the suffix link of `start` to the next shorter pending suffix.
    fn move_sideways(&mut self) {
        let link = self
            .nodes
            .suffix_link(self.active.start)
            .expect("vertex left by the active point has a suffix link");
        self.active.start = link;
        self.canonize();
    }

    /// Walks the active point down over whole edges until it lies strictly inside
    /// an edge or exactly on a vertex.
    fn canonize(&mut self) {
        if self.active.length == 0 {
            return;
        }

        let (mut end, mut edge) = if self.nodes.is_inner(self.active.start) {
            let end = self.out_edge_end(self.active.start, self.active.offset);
            (end, self.edge_length(self.active.start, end))
        } else {
            (self.root, 1)
        };
        self.active.end = Some(end);

        while self.active.length >= edge {
            self.active.start = end;
            self.active.offset = (self.active.offset + edge) & self.mask;
            self.active.length -= edge;

            if self.active.length == 0 {
                return;
            }

            end = self.out_edge_end(self.active.start, self.active.offset);
            self.active.end = Some(end);
            edge = self.edge_length(self.active.start, end);
        }
    }

    // ========================================================================
    // Eviction
    // ========================================================================

    /// Removes the leaf of the oldest suffix and releases the oldest window slot.
    fn remove_oldest<S: TokenSink<T>>(&mut self, out: &mut S) {
        let oldest = self.leaves[self.oldest_leaf];
        self.oldest_leaf = (self.oldest_leaf + 1) % self.leaves.len();
        let start = self.active.start;

        if self.active.end == Some(oldest) {
            // The active edge ends at the evicted leaf: hand the edge to a fresh leaf
            // and make the current suffix explicit.
            let leaf = self.new_leaf(start);
            assert_ne!(leaf, oldest, "leaf pool recycled the leaf being evicted");
            self.nodes.replace_child(start, oldest, leaf);

            if self.tracker.len() == 1 && start == self.root {
                self.tracker.flush(out);
            } else {
                self.match_after_eviction = true;
            }
            self.move_sideways();
        } else {
            let parent = self.nodes[oldest]
                .parent
                .expect("leaf in the window has a parent");
            self.nodes.remove_child(parent, oldest);

            if parent != self.root {
                self.collapse_if_unary(parent, out);
            }
        }

        self.window.advance_back();
        self.evictions += 1;
    }

    /// Splices the only remaining child of `parent` into the grandparent.
    fn collapse_if_unary<S: TokenSink<T>>(&mut self, parent: DefaultKey, out: &mut S) {
        let child = self
            .nodes
            .first_child(parent)
            .expect("inner node keeps a child after losing one");
        if self.nodes[child].next_sibling.is_some() {
            return;
        }

        let grandparent = self.nodes[parent]
            .parent
            .expect("inner node below the root has a parent");
        trace!(
            "collapsing unary node at depth {}",
            self.nodes.depth(parent)
        );

        if parent == self.active.start {
            if self.active.end == Some(parent) {
                self.flush_after_eviction(out);
                self.change_match_position(child, parent);
            }
            let edge = self.nodes.depth(parent) - self.nodes.depth(grandparent);
            self.active.start = grandparent;
            self.active.length += edge;
            self.active.offset = self.active.offset.wrapping_sub(edge) & self.mask;
        } else if self.active.end == Some(parent) {
            self.flush_after_eviction(out);
            self.change_match_position(child, parent);
            self.active.end = Some(child);
        }

        self.nodes.add_child(grandparent, child);
        self.nodes.remove_child(grandparent, parent);
        self.nodes[child].parent = Some(grandparent);

        debug_assert_ne!(
            self.unlinked,
            Some(parent),
            "collapsed node still waits for a suffix link"
        );
        self.nodes.remove(parent);
        self.canonize();
    }

    fn flush_after_eviction<S: TokenSink<T>>(&mut self, out: &mut S) {
        if self.match_after_eviction {
            self.tracker.flush(out);
            self.match_after_eviction = false;
        }
    }

    /// Moves the match source from the occurrence recorded by `parent` to the one
    /// recorded by `child`, which now labels the merged edge.
    fn change_match_position(&mut self, child: DefaultKey, parent: DefaultKey) {
        if self.tracker.is_empty() {
            return;
        }
        let delta = self.forward_distance(self.nodes[parent].offset, self.nodes[child].offset);
        self.tracker.shift(delta);
    }

    /// Brings inner node offsets up to date and re-anchors the pending match on the
    /// refreshed active edge.
    ///
    /// Runs each time the front crosses a half of the buffer, so no offset is ever
    /// older than one window when it is read.
    fn refresh_offsets<S: TokenSink<T>>(&mut self, out: &mut S) {
        self.nodes.refresh_offsets(self.root, &self.window);

        let Some(end) = self.active.end else {
            return;
        };
        if self.tracker.is_empty() {
            return;
        }

        let reach = self.nodes.depth(self.active.start) + self.active.length;
        if self.tracker.len() > reach {
            trace!(
                "match of {} symbols outruns the active point, flushing",
                self.tracker.len()
            );
            self.tracker.flush(out);
            self.match_after_eviction = false;
            return;
        }

        let end_offset = self.nodes[end].offset;
        let refreshed = (end_offset + reach - self.tracker.len()) & self.mask;
        if refreshed != self.tracker.buffer_position() {
            debug_assert!(
                self.window.distance_from_back(refreshed) + self.tracker.len() <= self.window.len(),
                "refreshed match source is not inside the window"
            );
            let delta = self.forward_distance(self.tracker.buffer_position(), refreshed);
            trace!("moving match source by {} slots", delta);
            self.tracker.realign(delta, end_offset);
        }
    }

    // ========================================================================
    // Helpers
    // ========================================================================

    /// Takes the next leaf from the pool for the suffix at the active point.
    fn new_leaf(&mut self, parent: DefaultKey) -> DefaultKey {
        let leaf = self.leaves[self.next_leaf];
        self.next_leaf = (self.next_leaf + 1) % self.leaves.len();

        let reach = self.nodes.depth(self.active.start) + self.active.length;
        let offset = self.window.front().wrapping_sub(reach) & self.mask;

        let node = &mut self.nodes[leaf];
        node.parent = Some(parent);
        node.next_sibling = None;
        node.offset = offset;
        leaf
    }

    /// Number of symbols on the edge into `end`; leaf edges count as a full window.
    fn edge_length(&self, start: DefaultKey, end: DefaultKey) -> usize {
        if self.nodes.is_inner(end) {
            self.nodes.depth(end) - self.nodes.depth(start)
        } else {
            self.window.window_size()
        }
    }

    fn out_edge_end(&self, start: DefaultKey, offset: usize) -> DefaultKey {
        self.nodes
            .find_out_edge_end(start, self.window.read(offset), &self.window)
            .expect("canonical active point continues along an existing edge")
    }

    /// Slots from buffer slot `from` forward to buffer slot `to`, wrapping at most
    /// once around the buffer.
    fn forward_distance(&self, from: usize, to: usize) -> usize {
        assert!(
            from <= self.mask && to <= self.mask,
            "offsets {} and {} are not buffer slots",
            from,
            to
        );
        if to >= from {
            to - from
        } else {
            to + self.mask + 1 - from
        }
    }

    #[inline]
    fn distance_from_front(&self, position: usize) -> usize {
        position.wrapping_sub(self.window.front()) & self.mask
    }
}
