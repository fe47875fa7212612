use core::borrow::Borrow;
use core::cmp::Ordering;
use core::mem;

use alloc::vec::Vec;

use crate::NodeIndex;
use crate::compare::{Compare, Natural, ValueCompare};
use crate::cursor::{Cursor, CursorMut, Position};
use crate::error::TableError;
use crate::node::{Side, Slot, TableNode};

/// Outcome of a descent looking for a key.
enum Search {
    Found(NodeIndex),
    Vacant { parent: NodeIndex, side: Side },
}

/// An ordered associative container with unique keys.
///
/// Keys are kept in the order given by the comparator `C`, a height-balanced (AVL) tree guarantees logarithmic
/// lookup, insertion and removal.
///
/// Mutating operations return [`Position`] handles rather than borrowing cursors, so a position obtained from one call
/// can be fed to the next. A position stays valid until the element it designates is removed, regardless of how
/// many other elements are inserted or removed meanwhile.
pub struct Table<K, V, C = Natural> {
    pub(crate) storage: Vec<Slot<K, V>>,
    pub(crate) free_head: NodeIndex,
    pub(crate) root: NodeIndex,
    pub(crate) len: usize,
    /// Generation handed to the next allocated node.
    pub(crate) next_generation: u64,
    pub(crate) comp: C,
}

impl<K, V> Table<K, V> {
    /// Creates an empty table ordered by the keys' [`Ord`] implementation.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(Natural)
    }
}

impl<K, V, C> Table<K, V, C> {
    /// Creates an empty table ordered by `comp`.
    #[must_use]
    pub const fn with_comparator(comp: C) -> Self {
        Self {
            storage: Vec::new(),
            free_head: NodeIndex::NIL,
            root: NodeIndex::NIL,
            len: 0,
            next_generation: 0,
            comp,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn max_size(&self) -> usize {
        usize::MAX
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        log::debug!("clearing table of {} elements", self.len);

        // `next_generation` survives the clear, positions taken before it stay stale
        self.storage.clear();
        self.free_head = NodeIndex::NIL;
        self.root = NodeIndex::NIL;
        self.len = 0;
    }

    /// The comparator ordering the keys.
    pub fn key_comp(&self) -> &C {
        &self.comp
    }

    /// A comparator ordering `(key, value)` pairs by key.
    pub fn value_comp(&self) -> ValueCompare<'_, C> {
        ValueCompare { comp: &self.comp }
    }

    /// Exchanges the contents of two tables without touching any node.
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(self, other);
    }

    pub fn first_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.first_node())
    }

    pub fn last_key_value(&self) -> Option<(&K, &V)> {
        self.entry_at(self.last_node())
    }

    pub fn pop_first(&mut self) -> Option<(K, V)> {
        let first = self.first_node();
        (!first.is_nil()).then(|| self.unlink(first))
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        let last = self.last_node();
        (!last.is_nil()).then(|| self.unlink(last))
    }

    /// A cursor on the smallest element, or at the end if the table is empty.
    pub fn begin(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self, self.first_node())
    }

    /// A cursor at the end position.
    pub fn end(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(self, NodeIndex::NIL)
    }

    pub fn begin_mut(&mut self) -> CursorMut<'_, K, V, C> {
        let first = self.first_node();
        CursorMut::new(self, first)
    }

    pub fn end_mut(&mut self) -> CursorMut<'_, K, V, C> {
        CursorMut::new(self, NodeIndex::NIL)
    }

    /// A cursor at `pos`. A position whose element was removed yields an end cursor.
    pub fn cursor_at(&self, pos: Position) -> Cursor<'_, K, V, C> {
        Cursor::new(self, self.resolve(pos))
    }

    pub fn cursor_mut_at(&mut self, pos: Position) -> CursorMut<'_, K, V, C> {
        let node = self.resolve(pos);
        CursorMut::new(self, node)
    }

    /// Removes the element at `pos` and returns the position of the element that followed it.
    ///
    /// Erasing the end position, or a position whose element is already gone, does nothing and returns the end
    /// position. This holds even after the element's arena slot has been reused by a later insertion.
    pub fn erase(&mut self, pos: Position) -> Position {
        let target = self.resolve(pos);
        if target.is_nil() {
            return Position::END;
        }

        let next = self.successor(target);
        self.unlink(target);

        self.position_of(next)
    }

    /// Removes the elements of the half-open range `[first, last)` and returns `last`.
    pub fn erase_range(&mut self, first: Position, last: Position) -> Position {
        let last_node = self.resolve(last);
        let mut current = self.resolve(first);
        let mut erased = 0usize;

        while current != last_node && !current.is_nil() {
            let next = self.successor(current);
            self.unlink(current);
            erased += 1;
            current = next;
        }

        if erased > 0 {
            log::debug!("erased a range of {erased} elements");
        }

        self.position_of(last_node)
    }

    pub(crate) fn get_node_by_idx(&self, idx: NodeIndex) -> &TableNode<K, V> {
        match self.storage.get(idx.0).and_then(Slot::as_node) {
            Some(node) => node,
            None => panic!("followed a link to vacant node slot {}", idx.0),
        }
    }

    pub(crate) fn get_node_by_idx_mut(&mut self, idx: NodeIndex) -> &mut TableNode<K, V> {
        match self.storage.get_mut(idx.0).and_then(Slot::as_node_mut) {
            Some(node) => node,
            None => panic!("followed a link to vacant node slot {}", idx.0),
        }
    }

    /// Maps a position to the node it designates, or to `NIL` if that node is gone.
    ///
    /// The generation must match as well, a recycled slot holds a different element.
    pub(crate) fn resolve(&self, pos: Position) -> NodeIndex {
        match self.storage.get(pos.node.0) {
            Some(Slot::Occupied(node)) if node.generation == pos.generation => pos.node,
            _ => NodeIndex::NIL,
        }
    }

    pub(crate) fn position_of(&self, idx: NodeIndex) -> Position {
        if idx.is_nil() {
            return Position::END;
        }

        Position {
            node: idx,
            generation: self.get_node_by_idx(idx).generation,
        }
    }

    pub(crate) fn entry_at(&self, idx: NodeIndex) -> Option<(&K, &V)> {
        if idx.is_nil() {
            return None;
        }

        let node = self.get_node_by_idx(idx);
        Some((&node.key, &node.value))
    }

    fn allocate(&mut self, mut node: TableNode<K, V>) -> NodeIndex {
        node.generation = self.next_generation;
        self.next_generation += 1;

        if self.free_head.is_nil() {
            self.storage.push(Slot::Occupied(node));
            return NodeIndex(self.storage.len() - 1);
        }

        let idx = self.free_head;
        match mem::replace(&mut self.storage[idx.0], Slot::Occupied(node)) {
            Slot::Vacant { next_free } => self.free_head = next_free,
            Slot::Occupied(_) => panic!("free list points at occupied node slot {}", idx.0),
        }
        log::trace!("recycled node slot {}", idx.0);

        idx
    }

    fn release(&mut self, idx: NodeIndex) -> TableNode<K, V> {
        let vacant = Slot::Vacant {
            next_free: self.free_head,
        };

        match mem::replace(&mut self.storage[idx.0], vacant).into_node() {
            Some(node) => {
                self.free_head = idx;
                node
            }
            None => panic!("released vacant node slot {}", idx.0),
        }
    }

    pub(crate) fn leftmost(&self, mut idx: NodeIndex) -> NodeIndex {
        if idx.is_nil() {
            return idx;
        }

        loop {
            let left = self.get_node_by_idx(idx).left;
            if left.is_nil() {
                return idx;
            }
            idx = left;
        }
    }

    pub(crate) fn rightmost(&self, mut idx: NodeIndex) -> NodeIndex {
        if idx.is_nil() {
            return idx;
        }

        loop {
            let right = self.get_node_by_idx(idx).right;
            if right.is_nil() {
                return idx;
            }
            idx = right;
        }
    }

    pub(crate) fn first_node(&self) -> NodeIndex {
        self.leftmost(self.root)
    }

    pub(crate) fn last_node(&self) -> NodeIndex {
        self.rightmost(self.root)
    }

    /// In-order successor of `idx`, `NIL` past the largest key or when `idx` is `NIL`.
    pub(crate) fn successor(&self, idx: NodeIndex) -> NodeIndex {
        if idx.is_nil() {
            return NodeIndex::NIL;
        }

        let right = self.get_node_by_idx(idx).right;
        if !right.is_nil() {
            return self.leftmost(right);
        }

        let mut child = idx;
        let mut parent = self.get_node_by_idx(idx).parent;
        while !parent.is_nil() && self.get_node_by_idx(parent).right == child {
            child = parent;
            parent = self.get_node_by_idx(parent).parent;
        }

        parent
    }

    /// In-order predecessor of `idx`, `NIL` before the smallest key or when `idx` is `NIL`.
    pub(crate) fn predecessor(&self, idx: NodeIndex) -> NodeIndex {
        if idx.is_nil() {
            return NodeIndex::NIL;
        }

        let left = self.get_node_by_idx(idx).left;
        if !left.is_nil() {
            return self.rightmost(left);
        }

        let mut child = idx;
        let mut parent = self.get_node_by_idx(idx).parent;
        while !parent.is_nil() && self.get_node_by_idx(parent).left == child {
            child = parent;
            parent = self.get_node_by_idx(parent).parent;
        }

        parent
    }

    /// Node handles in key order.
    pub(crate) fn in_order_indices(&self) -> Vec<NodeIndex> {
        let mut order = Vec::with_capacity(self.len);
        let mut current = self.first_node();

        while !current.is_nil() {
            order.push(current);
            current = self.successor(current);
        }

        order
    }

    /// Points the link of `parent` that currently holds `old` at `new`, or makes `new` the root.
    pub(crate) fn replace_child(&mut self, parent: NodeIndex, old: NodeIndex, new: NodeIndex) {
        if parent.is_nil() {
            self.root = new;
            return;
        }

        let parent_node = self.get_node_by_idx_mut(parent);
        if parent_node.left == old {
            parent_node.left = new;
        } else {
            parent_node.right = new;
        }
    }

    fn link_new(&mut self, parent: NodeIndex, side: Side, key: K, value: V) -> NodeIndex {
        let new_node = self.allocate(TableNode::new_isolated(key, value, parent));

        if parent.is_nil() {
            self.root = new_node;
        } else {
            *self.get_node_by_idx_mut(parent).child_mut(side) = new_node;
        }

        self.len += 1;
        self.rebalance_from(parent, false);

        new_node
    }

    /// Detaches `target` from the tree, frees its slot and restores balance up to the root.
    ///
    /// A node with two children is replaced by its in-order successor, which is relinked in place rather than having
    /// its pair copied, so that positions referring to the successor stay valid.
    pub(crate) fn unlink(&mut self, target: NodeIndex) -> (K, V) {
        let TableNode {
            left,
            right,
            parent,
            height,
            ..
        } = *self.get_node_by_idx(target);

        let rebalance_start = if left.is_nil() || right.is_nil() {
            let child = if left.is_nil() { right } else { left };

            self.replace_child(parent, target, child);
            if !child.is_nil() {
                self.get_node_by_idx_mut(child).parent = parent;
            }

            parent
        } else {
            let successor = self.leftmost(right);
            let successor_parent = self.get_node_by_idx(successor).parent;

            let start = if successor_parent == target {
                successor
            } else {
                let successor_right = self.get_node_by_idx(successor).right;

                self.get_node_by_idx_mut(successor_parent).left = successor_right;
                if !successor_right.is_nil() {
                    self.get_node_by_idx_mut(successor_right).parent = successor_parent;
                }

                self.get_node_by_idx_mut(successor).right = right;
                self.get_node_by_idx_mut(right).parent = successor;

                successor_parent
            };

            self.get_node_by_idx_mut(left).parent = successor;
            let successor_node = self.get_node_by_idx_mut(successor);
            successor_node.left = left;
            successor_node.parent = parent;
            successor_node.height = height;
            self.replace_child(parent, target, successor);

            start
        };

        let removed = self.release(target);
        self.len -= 1;
        self.rebalance_from(rebalance_start, true);

        (removed.key, removed.value)
    }
}

impl<K, V, C: Compare<K>> Table<K, V, C> {
    /// Inserts `key` with `value` unless the key is already present.
    ///
    /// Returns the position of the element holding `key` and whether it was newly inserted. An existing value is
    /// never overwritten.
    pub fn insert(&mut self, key: K, value: V) -> (Position, bool) {
        match self.search(&key) {
            Search::Found(existing) => (self.position_of(existing), false),
            Search::Vacant { parent, side } => {
                let idx = self.link_new(parent, side, key, value);
                (self.position_of(idx), true)
            }
        }
    }

    /// Inserts `key` with `value`, overwriting the value of an existing element.
    ///
    /// The returned flag is `true` only if a new element was created.
    pub fn insert_or_assign(&mut self, key: K, value: V) -> (Position, bool) {
        match self.search(&key) {
            Search::Found(existing) => {
                self.get_node_by_idx_mut(existing).value = value;
                (self.position_of(existing), false)
            }
            Search::Vacant { parent, side } => {
                let idx = self.link_new(parent, side, key, value);
                (self.position_of(idx), true)
            }
        }
    }

    /// Inserts a `(key, value)` pair unless the key is already present.
    pub fn emplace(&mut self, entry: impl Into<(K, V)>) -> (Position, bool) {
        let (key, value) = entry.into();
        self.insert(key, value)
    }

    /// Inserts a pair, using `hint` as the position the new element should precede.
    ///
    /// When the key belongs right before `hint` the node is attached without a descent from the root. Any other hint
    /// is ignored and a regular insertion takes place. Returns the position of the inserted or already present
    /// element.
    pub fn emplace_hint(&mut self, hint: Position, entry: impl Into<(K, V)>) -> Position {
        let (key, value) = entry.into();

        let next = self.resolve(hint);
        let prev = if next.is_nil() {
            self.last_node()
        } else {
            self.predecessor(next)
        };

        let after_prev = prev.is_nil() || self.comp.less(&self.get_node_by_idx(prev).key, &key);
        let before_next = next.is_nil() || self.comp.less(&key, &self.get_node_by_idx(next).key);

        if !(after_prev && before_next) {
            log::trace!("insertion hint does not match the key, falling back to a full descent");
            return self.insert(key, value).0;
        }

        // `prev` and `next` are adjacent, so one of them has a free slot facing the other.
        let (parent, side) = if !next.is_nil() && self.get_node_by_idx(next).left.is_nil() {
            (next, Side::Left)
        } else {
            (prev, Side::Right)
        };

        let idx = self.link_new(parent, side, key, value);
        self.position_of(idx)
    }

    /// Inserts `key` with the value produced by `make_value`, which is only called if the key is absent.
    pub fn try_emplace<F>(&mut self, key: K, make_value: F) -> (Position, bool)
    where
        F: FnOnce() -> V,
    {
        match self.search(&key) {
            Search::Found(existing) => (self.position_of(existing), false),
            Search::Vacant { parent, side } => {
                let idx = self.link_new(parent, side, key, make_value());
                (self.position_of(idx), true)
            }
        }
    }

    /// Inserts every pair of `iter`, keeping the first occurrence of a repeated key.
    pub fn insert_range<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }

    /// Replaces the contents of the table with the pairs of `iter`.
    pub fn assign<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        self.clear();
        self.insert_range(iter);

        log::debug!("assigned {} elements", self.len);
    }

    /// Returns the value for `key`, inserting `V::default()` first if the key is absent.
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        let idx = match self.search(&key) {
            Search::Found(existing) => existing,
            Search::Vacant { parent, side } => self.link_new(parent, side, key, V::default()),
        };

        &mut self.get_node_by_idx_mut(idx).value
    }
}

impl<K, V, C> Table<K, V, C> {
    fn search<Q>(&self, key: &Q) -> Search
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let mut current_node = self.root;
        let mut parent_node = NodeIndex::NIL;
        let mut side = Side::Left;

        while !current_node.is_nil() {
            parent_node = current_node;
            let curr_node_storage = self.get_node_by_idx(current_node);

            match self.comp.compare(key, curr_node_storage.key.borrow()) {
                Ordering::Less => {
                    side = Side::Left;
                    current_node = curr_node_storage.left;
                }
                Ordering::Equal => {
                    return Search::Found(current_node);
                }
                Ordering::Greater => {
                    side = Side::Right;
                    current_node = curr_node_storage.right;
                }
            }
        }

        Search::Vacant {
            parent: parent_node,
            side,
        }
    }

    pub(crate) fn find_node<Q>(&self, key: &Q) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        match self.search(key) {
            Search::Found(idx) => idx,
            Search::Vacant { .. } => NodeIndex::NIL,
        }
    }

    /// First node whose key is not ordered before `key`, or strictly after it when `strict` is set.
    fn bound_node<Q>(&self, key: &Q, strict: bool) -> NodeIndex
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let mut candidate = NodeIndex::NIL;
        let mut current_node = self.root;

        while !current_node.is_nil() {
            let curr_node_storage = self.get_node_by_idx(current_node);

            let go_right = match self.comp.compare(curr_node_storage.key.borrow(), key) {
                Ordering::Less => true,
                Ordering::Equal => strict,
                Ordering::Greater => false,
            };

            if go_right {
                current_node = curr_node_storage.right;
            } else {
                candidate = current_node;
                current_node = curr_node_storage.left;
            }
        }

        candidate
    }

    /// A cursor on the element with `key`, or an end cursor if there is none.
    pub fn find<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(self, self.find_node(key))
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let node = self.find_node(key);
        CursorMut::new(self, node)
    }

    /// Number of elements with `key`, either 0 or 1.
    pub fn count<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        usize::from(self.contains(key))
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        !self.find_node(key).is_nil()
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.entry_at(self.find_node(key)).map(|(_, value)| value)
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let idx = self.find_node(key);
        if idx.is_nil() {
            return None;
        }

        Some(&mut self.get_node_by_idx_mut(idx).value)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.entry_at(self.find_node(key))
    }

    /// Checked access to the value of `key`.
    ///
    /// # Errors
    /// Returns [`TableError::KeyNotFound`] if no element has this key.
    pub fn at<Q>(&self, key: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.get(key).ok_or(TableError::KeyNotFound)
    }

    /// Checked mutable access to the value of `key`.
    ///
    /// # Errors
    /// Returns [`TableError::KeyNotFound`] if no element has this key.
    pub fn at_mut<Q>(&mut self, key: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.get_mut(key).ok_or(TableError::KeyNotFound)
    }

    /// A cursor on the first element whose key is not ordered before `key`.
    pub fn lower_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(self, self.bound_node(key, false))
    }

    /// A cursor on the first element whose key is ordered after `key`.
    pub fn upper_bound<Q>(&self, key: &Q) -> Cursor<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        Cursor::new(self, self.bound_node(key, true))
    }

    pub fn lower_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let node = self.bound_node(key, false);
        CursorMut::new(self, node)
    }

    pub fn upper_bound_mut<Q>(&mut self, key: &Q) -> CursorMut<'_, K, V, C>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let node = self.bound_node(key, true);
        CursorMut::new(self, node)
    }

    /// The range of elements with `key` as a pair of cursors `(lower_bound, upper_bound)`.
    ///
    /// For an absent key both cursors designate the place where the key would be inserted.
    pub fn equal_range<Q>(&self, key: &Q) -> (Cursor<'_, K, V, C>, Cursor<'_, K, V, C>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        (self.lower_bound(key), self.upper_bound(key))
    }

    /// Removes the element with `key` and returns how many elements were removed, either 0 or 1.
    pub fn erase_key<Q>(&mut self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        usize::from(self.remove_entry(key).is_some())
    }

    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        self.remove_entry(key).map(|(_, value)| value)
    }

    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Compare<Q>,
    {
        let idx = self.find_node(key);
        (!idx.is_nil()).then(|| self.unlink(idx))
    }
}

impl<K, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}
