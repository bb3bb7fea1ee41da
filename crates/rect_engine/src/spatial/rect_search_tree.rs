//! Rect search tree: a fixed-depth binary spatial index
//!
//! Stores values so that the set of values overlapping or touching a
//! given rectangle can be retrieved efficiently. The region is bisected
//! along its currently longest axis for a fixed number of levels at
//! construction; the partition never changes afterwards.
//!
//! Nodes live in a flat arena addressed by [`NodeId`]; stored values live
//! in a slot map keyed by generation-checked [`EntryKey`]s, so relocation
//! and removal are O(1) lookups plus an O(depth) descent and stale
//! handles are detected rather than dereferenced.
//!
//! Example:
//! ```rust
//! use rect_engine::foundation::math::Rect;
//! use rect_engine::spatial::RectSearchTree;
//!
//! let mut tree = RectSearchTree::<2, &str>::create(Rect::from_xywh(0, 0, 100, 100), 3)
//!     .expect("nonzero depth");
//! tree.insert(Rect::from_xywh(10, 10, 5, 5), "a");
//! tree.insert(Rect::from_xywh(80, 80, 5, 5), "b");
//! let found: Vec<&&str> = tree.near(Rect::from_xywh(0, 0, 20, 20)).map(|(_, v)| v).collect();
//! assert_eq!(found, vec![&"a"]);
//! ```

use slotmap::{new_key_type, SlotMap};

use crate::foundation::math::Rect;

new_key_type! {
    /// Generation-checked handle to a value stored in a [`RectSearchTree`].
    pub struct EntryKey;
}

/// Index of a node in the tree arena. The root is node 0. Node ids are
/// stable for the lifetime of the tree.
pub type NodeId = usize;

const ROOT: NodeId = 0;

/// Receiver for [`RectSearchTree::run_callbacks_on`] notifications.
pub trait SpatialVisitor<T> {
    /// Called for each stored value whose rect shares interior area with
    /// the subject's rect.
    fn on_overlap(&mut self, other: &T);

    /// Called for each stored value whose rect is adjacent to the
    /// subject's rect with zero gap.
    fn on_touch(&mut self, other: &T);
}

struct Node<const N: usize> {
    bound: Rect<i64, N>,
    children: Option<(NodeId, NodeId)>,
    entries: Vec<EntryKey>,
}

struct Entry<const N: usize, T> {
    node: NodeId,
    rect: Rect<i64, N>,
    value: T,
}

/// A fixed-depth, statically partitioned binary spatial index over an
/// N-dimensional region.
///
/// Invariant: an entry is stored at the smallest-region node whose bound
/// fully contains a boundary-dilated copy of the entry's rect; entries
/// the tree region does not contain are stored at the root as a
/// catch-all (queries involving them carry no geometric guarantee).
pub struct RectSearchTree<const N: usize, T> {
    nodes: Vec<Node<N>>,
    entries: SlotMap<EntryKey, Entry<N, T>>,
}

impl<const N: usize, T> RectSearchTree<N, T> {
    /// Create a new tree of `depth` levels spanning `rect`.
    ///
    /// A depth of zero is the explicit absent-tree state: `None` is
    /// returned and callers treat `rect` as an implicit single node.
    pub fn create(rect: Rect<i64, N>, depth: usize) -> Option<Self> {
        if depth == 0 {
            return None;
        }
        let mut nodes = Vec::with_capacity((1 << depth) - 1);
        Self::build(&mut nodes, rect, depth);
        Some(Self {
            nodes,
            entries: SlotMap::with_key(),
        })
    }

    fn build(nodes: &mut Vec<Node<N>>, bound: Rect<i64, N>, depth: usize) -> NodeId {
        let id = nodes.len();
        nodes.push(Node {
            bound,
            children: None,
            entries: Vec::new(),
        });

        if depth > 1 {
            // Bisect across the longest axis; ties favor the earlier
            // axis, so an equal-sided 2-D region splits vertically.
            let mut axis = 0;
            let mut longest = 0;
            for i in 0..N {
                if bound.size[i] > longest {
                    axis = i;
                    longest = bound.size[i];
                }
            }
            let half = longest / 2;

            let mut size_a = bound.size;
            size_a[axis] = half;
            let mut size_b = bound.size;
            size_b[axis] = longest - half;
            let mut pos_b = bound.pos;
            pos_b[axis] += half;

            let a = Self::build(nodes, Rect::new(bound.pos, size_a), depth - 1);
            let b = Self::build(nodes, Rect::new(pos_b, size_b), depth - 1);
            nodes[id].children = Some((a, b));
        }
        id
    }

    /// The region this tree spans.
    pub fn bound(&self) -> &Rect<i64, N> {
        &self.nodes[ROOT].bound
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the tree stores no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // A node accepts a rect if its bound contains the rect dilated by one
    // unit on every axis where the rect is strictly smaller than the node
    // extent. The dilation keeps boundary-flush rects in the parent node,
    // where neighbors needing touch detection can still reach them.
    fn node_accepts(&self, id: NodeId, rect: &Rect<i64, N>) -> bool {
        let bound = &self.nodes[id].bound;
        let mut probe = *rect;
        for i in 0..N {
            if probe.size[i] < bound.size[i] {
                probe.size[i] += 1;
            }
        }
        bound.contains_rect(&probe)
    }

    fn find_from(&self, start: NodeId, rect: &Rect<i64, N>) -> Option<NodeId> {
        if !self.node_accepts(start, rect) {
            return None;
        }
        let mut id = start;
        loop {
            match self.nodes[id].children {
                Some((a, _)) if self.node_accepts(a, rect) => id = a,
                Some((_, b)) if self.node_accepts(b, rect) => id = b,
                _ => return Some(id),
            }
        }
    }

    /// Find the smallest node `rect` belongs to, or `None` if not even
    /// the root region contains it.
    pub fn find(&self, rect: &Rect<i64, N>) -> Option<NodeId> {
        self.find_from(ROOT, rect)
    }

    fn attach(&mut self, node: NodeId, rect: Rect<i64, N>, value: T) -> EntryKey {
        let key = self.entries.insert(Entry { node, rect, value });
        self.nodes[node].entries.push(key);
        key
    }

    /// Add a value keyed by `rect`. Returns a handle for later
    /// relocation or removal.
    ///
    /// Rects the tree region does not contain are stored at the root.
    pub fn insert(&mut self, rect: Rect<i64, N>, value: T) -> EntryKey {
        let node = self.find(&rect).unwrap_or(ROOT);
        self.attach(node, rect, value)
    }

    /// Same as [`insert`](Self::insert), but first clips `rect` to the
    /// tree's own bound — for values that lie partly or fully outside
    /// the indexed region.
    pub fn insert_trimmed(&mut self, rect: Rect<i64, N>, value: T) -> EntryKey {
        let trimmed = rect.overlap(self.bound());
        self.insert(trimmed, value)
    }

    /// Move the entry at `key` to the node matching `new_rect`.
    ///
    /// The search starts from the entry's current node, falls back to a
    /// root-wide search, and falls back to the root itself. Returns
    /// `false` for a stale key.
    pub fn relocate(&mut self, key: EntryKey, new_rect: Rect<i64, N>) -> bool {
        let Some(entry) = self.entries.get(key) else {
            return false;
        };
        let current = entry.node;
        let target = match self.find_from(current, &new_rect) {
            Some(node) => node,
            None => {
                log::trace!("relocate falling back to root-wide search");
                self.find(&new_rect).unwrap_or(ROOT)
            }
        };

        if target != current {
            let list = &mut self.nodes[current].entries;
            if let Some(pos) = list.iter().position(|k| *k == key) {
                list.swap_remove(pos);
            }
            self.nodes[target].entries.push(key);
        }
        if let Some(entry) = self.entries.get_mut(key) {
            entry.node = target;
            entry.rect = new_rect;
        }
        true
    }

    /// Remove the entry at `key`, returning its value. Stale keys return
    /// `None`.
    pub fn remove(&mut self, key: EntryKey) -> Option<T> {
        let entry = self.entries.remove(key)?;
        let list = &mut self.nodes[entry.node].entries;
        if let Some(pos) = list.iter().position(|k| *k == key) {
            list.swap_remove(pos);
        }
        Some(entry.value)
    }

    /// Shared access to a stored value.
    pub fn get(&self, key: EntryKey) -> Option<&T> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Mutable access to a stored value.
    pub fn get_mut(&mut self, key: EntryKey) -> Option<&mut T> {
        self.entries.get_mut(key).map(|entry| &mut entry.value)
    }

    /// The rect an entry is currently stored under.
    pub fn entry_rect(&self, key: EntryKey) -> Option<&Rect<i64, N>> {
        self.entries.get(key).map(|entry| &entry.rect)
    }

    /// The node an entry is currently stored at.
    pub fn entry_node(&self, key: EntryKey) -> Option<NodeId> {
        self.entries.get(key).map(|entry| entry.node)
    }

    /// The region covered by a node.
    pub fn node_bound(&self, id: NodeId) -> Option<&Rect<i64, N>> {
        self.nodes.get(id).map(|node| &node.bound)
    }

    /// Iterate over every stored entry, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (EntryKey, &T)> {
        self.entries.iter().map(|(key, entry)| (key, &entry.value))
    }

    // Whether a query rect should descend into this node.
    fn node_qualifies(&self, id: NodeId, rect: &Rect<i64, N>) -> bool {
        let bound = &self.nodes[id].bound;
        rect.overlaps(bound) || rect.touches(bound)
    }

    /// Lazily visit entries in every node whose region overlaps or
    /// touches `rect`. Restartable: calling `near` again yields an
    /// equivalent sequence as long as the tree is not mutated in
    /// between.
    ///
    /// In the best case only `depth` nodes are visited. Entries are
    /// proposed per node region, so callers still need an exact rect
    /// comparison; see [`run_callbacks_on`](Self::run_callbacks_on).
    pub fn near(&self, rect: Rect<i64, N>) -> Near<'_, N, T> {
        let stack = if self.node_qualifies(ROOT, &rect) {
            vec![ROOT]
        } else {
            Vec::new()
        };
        Near {
            tree: self,
            rect,
            stack,
            current: None,
        }
    }

    /// Exact overlap/touch dispatch for the entry at `key`: for every
    /// other entry stored near it, invoke `visitor.on_overlap` on area
    /// overlap or `visitor.on_touch` on zero-gap adjacency. The entry is
    /// never compared with itself; only the visitor (one side) is
    /// notified per call.
    pub fn run_callbacks_on<V: SpatialVisitor<T>>(&self, key: EntryKey, visitor: &mut V) {
        let Some(entry) = self.entries.get(key) else {
            return;
        };
        let rect = entry.rect;
        for (other_key, other) in self.near(rect) {
            if other_key == key {
                continue;
            }
            let other_rect = self.entries[other_key].rect;
            if rect.overlaps(&other_rect) {
                visitor.on_overlap(other);
            } else if rect.touches(&other_rect) {
                visitor.on_touch(other);
            }
        }
    }
}

/// Lazy iterator over entries near a query rect.
///
/// Created by [`RectSearchTree::near`]. Yields `(key, value)` pairs for
/// every entry stored in a node whose region overlaps or touches the
/// query.
pub struct Near<'a, const N: usize, T> {
    tree: &'a RectSearchTree<N, T>,
    rect: Rect<i64, N>,
    stack: Vec<NodeId>,
    current: Option<(NodeId, usize)>,
}

impl<'a, const N: usize, T> Iterator for Near<'a, N, T> {
    type Item = (EntryKey, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((node, index)) = self.current {
                let entries = &self.tree.nodes[node].entries;
                if index < entries.len() {
                    self.current = Some((node, index + 1));
                    let key = entries[index];
                    return Some((key, &self.tree.entries[key].value));
                }
                self.current = None;
            }

            let node = self.stack.pop()?;
            if let Some((a, b)) = self.tree.nodes[node].children {
                if self.tree.node_qualifies(a, &self.rect) {
                    self.stack.push(a);
                }
                if self.tree.node_qualifies(b, &self.rect) {
                    self.stack.push(b);
                }
            }
            self.current = Some((node, 0));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(x: i64, y: i64, w: i64, h: i64) -> Rect<i64, 2> {
        Rect::from_xywh(x, y, w, h)
    }

    fn tree(depth: usize) -> RectSearchTree<2, i32> {
        RectSearchTree::create(rect(0, 0, 100, 100), depth).unwrap()
    }

    #[test]
    fn test_zero_depth_is_absent() {
        assert!(RectSearchTree::<2, i32>::create(rect(0, 0, 100, 100), 0).is_none());
    }

    #[test]
    fn test_split_favors_vertical_on_tie() {
        // 100x100 root splits along x first.
        let t = tree(2);
        assert_eq!(t.node_bound(1), Some(&rect(0, 0, 50, 100)));
        assert_eq!(t.node_bound(2), Some(&rect(50, 0, 50, 100)));
    }

    #[test]
    fn test_insert_descends_to_leaf() {
        let mut t = tree(2);
        let key = t.insert(rect(10, 10, 5, 5), 1);
        assert_eq!(t.entry_node(key), Some(1));
        assert_eq!(t.len(), 1);
    }

    #[test]
    fn test_straddling_entry_stays_at_ancestor() {
        let mut t = tree(2);
        // Crosses the x=50 split, so neither child contains it.
        let key = t.insert(rect(48, 10, 5, 5), 1);
        assert_eq!(t.entry_node(key), Some(ROOT));
    }

    #[test]
    fn test_boundary_flush_entry_promoted_by_dilation() {
        let mut t = tree(2);
        // Flush against the x=50 split from the left: the one-unit
        // dilation pushes it out of the left child so a right-side query
        // can still reach it for touch detection.
        let key = t.insert(rect(45, 10, 5, 5), 1);
        assert_eq!(t.entry_node(key), Some(ROOT));

        let found: Vec<i32> = t.near(rect(50, 10, 5, 5)).map(|(_, v)| *v).collect();
        assert_eq!(found, vec![1]);
    }

    #[test]
    fn test_out_of_bounds_entry_stored_at_root() {
        let mut t = tree(3);
        let key = t.insert(rect(200, 200, 10, 10), 7);
        assert_eq!(t.entry_node(key), Some(ROOT));
        assert_eq!(t.get(key), Some(&7));
    }

    #[test]
    fn test_insert_trimmed_clips_to_bound() {
        let mut t = tree(2);
        let key = t.insert_trimmed(rect(-10, 10, 20, 5), 3);
        // Clipped to (0, 10, 10, 5), which lands in the left child.
        assert_eq!(t.entry_rect(key), Some(&rect(0, 10, 10, 5)));
        assert_eq!(t.entry_node(key), Some(1));
    }

    #[test]
    fn test_near_finds_leaf_entry_from_root() {
        let mut t = tree(3);
        t.insert(rect(10, 10, 5, 5), 1);
        t.insert(rect(80, 80, 5, 5), 2);

        let found: Vec<i32> = t.near(rect(0, 0, 30, 30)).map(|(_, v)| *v).collect();
        assert_eq!(found, vec![1]);

        let all: Vec<i32> = t.near(rect(0, 0, 100, 100)).map(|(_, v)| *v).collect();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_near_is_restartable() {
        let mut t = tree(3);
        t.insert(rect(10, 10, 5, 5), 1);
        t.insert(rect(20, 20, 5, 5), 2);

        let mut first: Vec<i32> = t.near(rect(0, 0, 40, 40)).map(|(_, v)| *v).collect();
        let mut second: Vec<i32> = t.near(rect(0, 0, 40, 40)).map(|(_, v)| *v).collect();
        first.sort_unstable();
        second.sort_unstable();
        assert_eq!(first, second);
    }

    #[test]
    fn test_relocate_moves_between_nodes() {
        let mut t = tree(2);
        let key = t.insert(rect(10, 10, 5, 5), 1);
        assert_eq!(t.entry_node(key), Some(1));

        assert!(t.relocate(key, rect(80, 10, 5, 5)));
        assert_eq!(t.entry_node(key), Some(2));
        assert_eq!(t.entry_rect(key), Some(&rect(80, 10, 5, 5)));

        let left: Vec<i32> = t.near(rect(0, 0, 30, 30)).map(|(_, v)| *v).collect();
        assert!(left.is_empty());
        let right: Vec<i32> = t.near(rect(70, 0, 30, 30)).map(|(_, v)| *v).collect();
        assert_eq!(right, vec![1]);
    }

    #[test]
    fn test_remove_invalidates_key() {
        let mut t = tree(2);
        let key = t.insert(rect(10, 10, 5, 5), 1);
        assert_eq!(t.remove(key), Some(1));
        assert_eq!(t.remove(key), None);
        assert!(!t.relocate(key, rect(20, 20, 5, 5)));
        assert!(t.is_empty());
    }

    struct Counter {
        overlaps: usize,
        touches: usize,
    }

    impl SpatialVisitor<i32> for Counter {
        fn on_overlap(&mut self, _other: &i32) {
            self.overlaps += 1;
        }

        fn on_touch(&mut self, _other: &i32) {
            self.touches += 1;
        }
    }

    #[test]
    fn test_run_callbacks_on_skips_self() {
        let mut t = tree(2);
        let subject = t.insert(rect(10, 10, 10, 10), 1);
        t.insert(rect(15, 15, 10, 10), 2); // overlaps
        t.insert(rect(20, 10, 10, 10), 3); // touches
        t.insert(rect(80, 80, 5, 5), 4); // far away

        let mut counter = Counter {
            overlaps: 0,
            touches: 0,
        };
        t.run_callbacks_on(subject, &mut counter);
        assert_eq!(counter.overlaps, 1);
        assert_eq!(counter.touches, 1);
    }
}
