//! Whole-table operations: deep copies, comparisons, conversions and the free functions `swap` and `erase_if`.

use core::borrow::Borrow;
use core::cmp::Ordering;
use core::fmt;
use core::hash::{Hash, Hasher};
use core::ops::Index;

use alloc::vec::Vec;

use crate::NodeIndex;
use crate::compare::{Compare, Natural};
use crate::node::{Slot, TableNode};
use crate::table::Table;

impl<K: Clone, V: Clone, C: Clone> Clone for Table<K, V, C> {
    /// Copies every node into a fresh, compact arena with the same shape as the source.
    fn clone(&self) -> Self {
        let mut storage = Vec::with_capacity(self.len);
        let root = self.clone_subtree(self.root, NodeIndex::NIL, &mut storage);

        Self {
            storage,
            free_head: NodeIndex::NIL,
            root,
            len: self.len,
            next_generation: self.next_generation,
            comp: self.comp.clone(),
        }
    }
}

impl<K: Clone, V: Clone, C> Table<K, V, C> {
    /// Copies the subtree rooted at `src` into `storage`, parents first, and returns the index of the copy.
    fn clone_subtree(&self, src: NodeIndex, parent: NodeIndex, storage: &mut Vec<Slot<K, V>>) -> NodeIndex {
        if src.is_nil() {
            return NodeIndex::NIL;
        }

        let source = self.get_node_by_idx(src);
        let copy = NodeIndex(storage.len());
        storage.push(Slot::Occupied(TableNode {
            key: source.key.clone(),
            value: source.value.clone(),
            height: source.height,
            generation: source.generation,
            parent,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        }));

        let left = self.clone_subtree(source.left, copy, storage);
        let right = self.clone_subtree(source.right, copy, storage);

        if let Slot::Occupied(node) = &mut storage[copy.0] {
            node.left = left;
            node.right = right;
        }

        copy
    }
}

impl<K: PartialEq, V: PartialEq, C> PartialEq for Table<K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        self.len == other.len && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq, C> Eq for Table<K, V, C> {}

impl<K: PartialOrd, V: PartialOrd, C> PartialOrd for Table<K, V, C> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.iter().partial_cmp(other.iter())
    }
}

impl<K: Ord, V: Ord, C> Ord for Table<K, V, C> {
    /// Lexicographic comparison of the `(key, value)` sequences.
    fn cmp(&self, other: &Self) -> Ordering {
        self.iter().cmp(other.iter())
    }
}

impl<K: Hash, V: Hash, C> Hash for Table<K, V, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len);
        for entry in self {
            entry.hash(state);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Table<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K, V, C, Q> Index<&Q> for Table<K, V, C>
where
    K: Borrow<Q>,
    Q: ?Sized,
    C: Compare<Q>,
{
    type Output = V;

    /// # Panics
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.get(key) {
            Some(value) => value,
            None => panic!("key not found in table"),
        }
    }
}

impl<K, V, C: Compare<K> + Default> FromIterator<(K, V)> for Table<K, V, C> {
    /// Builds a table from pairs, the first occurrence of a key wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Table::with_comparator(C::default());
        table.insert_range(iter);
        table
    }
}

impl<K, V, C: Compare<K>> Extend<(K, V)> for Table<K, V, C> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.insert_range(iter);
    }
}

impl<'a, K: Copy, V: Copy, C: Compare<K>> Extend<(&'a K, &'a V)> for Table<K, V, C> {
    fn extend<I: IntoIterator<Item = (&'a K, &'a V)>>(&mut self, iter: I) {
        self.insert_range(iter.into_iter().map(|(key, value)| (*key, *value)));
    }
}

impl<K: Ord, V, const N: usize> From<[(K, V); N]> for Table<K, V, Natural> {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl<K, V, C> Table<K, V, C> {
    /// Keeps only the elements for which `keep` returns `true`, visiting them in key order.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        erase_if(self, |key, value| !keep(key, value));
    }
}

/// Exchanges the contents of two tables in constant time.
pub fn swap<K, V, C>(lhs: &mut Table<K, V, C>, rhs: &mut Table<K, V, C>) {
    lhs.swap(rhs);
}

/// Removes every element satisfying `predicate` and returns how many were removed.
///
/// Elements are visited in key order. The successor of each element is resolved before the element is removed, so the
/// walk is unaffected by the rotations removals trigger.
pub fn erase_if<K, V, C, F>(table: &mut Table<K, V, C>, mut predicate: F) -> usize
where
    F: FnMut(&K, &mut V) -> bool,
{
    let mut removed = 0;
    let mut current = table.first_node();

    while !current.is_nil() {
        let next = table.successor(current);

        let node = table.get_node_by_idx_mut(current);
        if predicate(&node.key, &mut node.value) {
            table.unlink(current);
            removed += 1;
        }

        current = next;
    }

    log::debug!("erase_if removed {removed} elements");

    removed
}

#[cfg(test)]
mod tests {
    use alloc::format;
    use core::cmp::Ordering;

    use crate::{Table, erase_if, swap};

    #[test]
    pub fn clone_mirrors_shape() {
        let mut source = Table::new();
        for key in [5, 3, 8, 1, 4, 7, 9] {
            source.insert(key, key);
        }
        source.erase_key(&4);

        let copy = source.clone();
        assert_eq!(copy.storage.len(), copy.len());
        assert_eq!(copy.height(copy.root), source.height(source.root));
        assert_eq!(copy, source);
        copy.check().unwrap();
    }

    #[test]
    pub fn lexicographic_ordering() {
        let lhs = Table::from([(1, 10), (2, 20), (5, 50)]);
        let rhs = Table::from([(1, 10), (2, 20), (4, 40)]);
        assert_eq!(lhs.cmp(&rhs), Ordering::Greater);

        let lhs = Table::from([(1, 10), (2, 5)]);
        let rhs = Table::from([(1, 10), (2, 7)]);
        assert!(lhs < rhs);

        let prefix = Table::from([(1, 10)]);
        assert!(prefix < rhs);
    }

    #[test]
    pub fn debug_formats_as_map() {
        let table = Table::from([(2, 'b'), (1, 'a')]);

        assert_eq!(format!("{table:?}"), "{1: 'a', 2: 'b'}");
    }

    #[test]
    pub fn free_swap() {
        let mut lhs = Table::from([(1, 10), (2, 20)]);
        let mut rhs = Table::from([(100, 1000)]);

        swap(&mut lhs, &mut rhs);

        assert_eq!(lhs.len(), 1);
        assert_eq!(lhs[&100], 1000);
        assert_eq!(rhs.len(), 2);
        assert_eq!(rhs[&1], 10);
    }

    #[test]
    pub fn erase_if_everything() {
        let mut table = Table::from([(1, 1), (2, 2)]);

        assert_eq!(erase_if(&mut table, |_, _| true), 2);
        assert!(table.is_empty());
        table.check().unwrap();
    }

    #[test]
    pub fn retain_keeps_matching() {
        let mut table: Table<i32, i32> = (0..20).map(|key| (key, key)).collect();

        table.retain(|key, value| {
            *value += 1;
            key % 3 == 0
        });

        assert_eq!(table.values().copied().collect::<alloc::vec::Vec<_>>(), [1, 4, 7, 10, 13, 16, 19]);
        table.check().unwrap();
    }
}
