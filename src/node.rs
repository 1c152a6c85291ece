use crate::symbol::Symbol;
use crate::window::SlidingWindow;
use slotmap::{DefaultKey, SlotMap};
use std::ops::{Index, IndexMut};

/// Variant-specific node data.
#[derive(Debug)]
pub(crate) enum NodeKind {
    /// Branching node. Its children form a singly linked list through `next_sibling`.
    Inner {
        /// Length of the string spelled from the root to this node
        depth: usize,
        first_child: Option<DefaultKey>,
        suffix_link: Option<DefaultKey>,
    },

    /// One suffix of the window. Leaves are preallocated and reused.
    Leaf,

    /// Sentinel above the root: every symbol leads from it to the root.
    Bot,
}

/// A suffix tree node.
///
/// `offset` is the buffer slot where an occurrence of the node's path label starts,
/// so the label of the edge into a node at depth `d` under a parent at depth `p`
/// reads from `offset + p` to `offset + d`. Leaf edges have no stored end and run to
/// the window front.
#[derive(Debug)]
pub(crate) struct Node {
    pub parent: Option<DefaultKey>,
    pub next_sibling: Option<DefaultKey>,
    pub offset: usize,
    pub kind: NodeKind,
}

impl Node {
    pub fn inner(offset: usize, depth: usize) -> Self {
        Self {
            parent: None,
            next_sibling: None,
            offset,
            kind: NodeKind::Inner {
                depth,
                first_child: None,
                suffix_link: None,
            },
        }
    }

    pub fn leaf() -> Self {
        Self {
            parent: None,
            next_sibling: None,
            offset: 0,
            kind: NodeKind::Leaf,
        }
    }

    pub fn bot() -> Self {
        Self {
            parent: None,
            next_sibling: None,
            offset: 0,
            kind: NodeKind::Bot,
        }
    }
}

/// Arena of suffix tree nodes plus the child-list operations on it.
pub(crate) struct Nodes {
    arena: SlotMap<DefaultKey, Node>,
}

impl Nodes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotMap::with_capacity(capacity),
        }
    }

    pub fn insert(&mut self, node: Node) -> DefaultKey {
        self.arena.insert(node)
    }

    pub fn remove(&mut self, key: DefaultKey) {
        self.arena
            .remove(key)
            .expect("removed node should be live");
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    #[inline]
    pub fn is_inner(&self, key: DefaultKey) -> bool {
        matches!(self.arena[key].kind, NodeKind::Inner { .. })
    }

    #[inline]
    pub fn depth(&self, key: DefaultKey) -> usize {
        let NodeKind::Inner { depth, .. } = self.arena[key].kind else {
            unreachable!("depth of a non-inner node")
        };
        depth
    }

    #[inline]
    pub fn first_child(&self, key: DefaultKey) -> Option<DefaultKey> {
        let NodeKind::Inner { first_child, .. } = self.arena[key].kind else {
            unreachable!("children of a non-inner node")
        };
        first_child
    }

    fn set_first_child(&mut self, key: DefaultKey, child: Option<DefaultKey>) {
        let NodeKind::Inner { first_child, .. } = &mut self.arena[key].kind else {
            unreachable!("children of a non-inner node")
        };
        *first_child = child;
    }

    #[inline]
    pub fn suffix_link(&self, key: DefaultKey) -> Option<DefaultKey> {
        let NodeKind::Inner { suffix_link, .. } = self.arena[key].kind else {
            unreachable!("suffix link of a non-inner node")
        };
        suffix_link
    }

    pub fn set_suffix_link(&mut self, key: DefaultKey, target: DefaultKey) {
        let NodeKind::Inner { suffix_link, .. } = &mut self.arena[key].kind else {
            unreachable!("suffix link of a non-inner node")
        };
        *suffix_link = Some(target);
    }

    /// Iterates over the children of an inner node, most recently used first.
    pub fn children(&self, key: DefaultKey) -> Children<'_> {
        Children {
            nodes: self,
            next: self.first_child(key),
        }
    }

    /// Pushes `child` to the front of the child list of `parent`.
    pub fn add_child(&mut self, parent: DefaultKey, child: DefaultKey) {
        let first = self.first_child(parent);
        self.arena[child].next_sibling = first;
        self.set_first_child(parent, Some(child));
    }

    /// The child preceding `child` in the list of `parent`, or None if it is first.
    fn prev_sibling(&self, parent: DefaultKey, child: DefaultKey) -> Option<DefaultKey> {
        let mut current = self.first_child(parent);
        if current == Some(child) {
            return None;
        }

        loop {
            let key = current.expect("child should be in its parent's list");
            let next = self.arena[key].next_sibling;
            if next == Some(child) {
                return Some(key);
            }
            current = next;
        }
    }

    /// Puts `new` where `old` is in the list of `parent`.
    pub fn replace_child(&mut self, parent: DefaultKey, old: DefaultKey, new: DefaultKey) {
        let prev = self.prev_sibling(parent, old);
        self.arena[new].next_sibling = self.arena[old].next_sibling;

        match prev {
            Some(prev) => self.arena[prev].next_sibling = Some(new),
            None => self.set_first_child(parent, Some(new)),
        }
    }

    /// Unlinks `child` from the list of `parent`.
    pub fn remove_child(&mut self, parent: DefaultKey, child: DefaultKey) {
        let prev = self.prev_sibling(parent, child);
        let next = self.arena[child].next_sibling;

        match prev {
            Some(prev) => self.arena[prev].next_sibling = next,
            None => self.set_first_child(parent, next),
        }
    }

    /// Moves `child`, currently after `prev`, to the front of the list of `parent`.
    pub fn move_to_front(&mut self, parent: DefaultKey, prev: DefaultKey, child: DefaultKey) {
        self.arena[prev].next_sibling = self.arena[child].next_sibling;
        let first = self.first_child(parent);
        self.arena[child].next_sibling = first;
        self.set_first_child(parent, Some(child));
    }

    /// Finds the child of `parent` whose edge label starts with `symbol`.
    pub fn find_out_edge_end<T: Symbol>(
        &self,
        parent: DefaultKey,
        symbol: T,
        window: &SlidingWindow<T>,
    ) -> Option<DefaultKey> {
        let depth = self.depth(parent);
        self.children(parent)
            .find(|&child| window.read(self.arena[child].offset + depth) == symbol)
    }

    /// Sets the offset of every inner node below `root` to the latest offset among
    /// its children, visiting children before parents.
    pub fn refresh_offsets<T: Symbol>(&mut self, root: DefaultKey, window: &SlidingWindow<T>) {
        let mut stack = vec![(root, false)];

        while let Some((key, expanded)) = stack.pop() {
            if !self.is_inner(key) {
                continue;
            }

            if !expanded {
                stack.push((key, true));
                let mut child = self.first_child(key);
                while let Some(c) = child {
                    stack.push((c, false));
                    child = self.arena[c].next_sibling;
                }
                continue;
            }

            let latest = self
                .children(key)
                .map(|child| self.arena[child].offset)
                .reduce(|best, offset| {
                    if window.is_later(offset, best) {
                        offset
                    } else {
                        best
                    }
                });
            if let Some(offset) = latest {
                self.arena[key].offset = offset;
            }
        }
    }
}

impl Index<DefaultKey> for Nodes {
    type Output = Node;

    #[inline]
    fn index(&self, key: DefaultKey) -> &Node {
        &self.arena[key]
    }
}

impl IndexMut<DefaultKey> for Nodes {
    #[inline]
    fn index_mut(&mut self, key: DefaultKey) -> &mut Node {
        &mut self.arena[key]
    }
}

/// Iterator over a child list.
pub(crate) struct Children<'a> {
    nodes: &'a Nodes,
    next: Option<DefaultKey>,
}

impl Iterator for Children<'_> {
    type Item = DefaultKey;

    fn next(&mut self) -> Option<DefaultKey> {
        let key = self.next?;
        self.next = self.nodes[key].next_sibling;
        Some(key)
    }
}
