//! Iterators over the elements of a [`Table`], in key order.

use core::iter::FusedIterator;

use alloc::vec::{self, Vec};

use crate::NodeIndex;
use crate::compare::Natural;
use crate::node::{Slot, TableNode};
use crate::table::Table;

/// Borrowing iterator over `(key, value)` pairs, walking the tree through parent links.
pub struct Iter<'a, K, V, C = Natural> {
    pub(crate) tree: &'a Table<K, V, C>,
    pub(crate) front: NodeIndex,
    pub(crate) back: NodeIndex,
    pub(crate) remaining: usize,
}

impl<'a, K, V, C> Iterator for Iter<'a, K, V, C> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.front;
        self.front = self.tree.successor(node);
        self.remaining -= 1;

        self.tree.entry_at(node)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V, C> DoubleEndedIterator for Iter<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let node = self.back;
        self.back = self.tree.predecessor(node);
        self.remaining -= 1;

        self.tree.entry_at(node)
    }
}

impl<K, V, C> ExactSizeIterator for Iter<'_, K, V, C> {}

impl<K, V, C> FusedIterator for Iter<'_, K, V, C> {}

impl<K, V, C> Clone for Iter<'_, K, V, C> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

/// Iterator over `(key, value)` pairs with mutable access to the values.
///
/// The key order is resolved when the iterator is created, so that every value can be lent out independently.
pub struct IterMut<'a, K, V> {
    entries: vec::IntoIter<(&'a K, &'a mut V)>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IterMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// Owning iterator over `(key, value)` pairs.
pub struct IntoIter<K, V> {
    entries: vec::IntoIter<(K, V)>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.entries.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.entries.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.entries.next_back()
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

pub struct Keys<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Keys<'a, K, V, C> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Keys<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(key, _)| key)
    }
}

impl<K, V, C> ExactSizeIterator for Keys<'_, K, V, C> {}

pub struct Values<'a, K, V, C = Natural> {
    inner: Iter<'a, K, V, C>,
}

impl<'a, K, V, C> Iterator for Values<'a, K, V, C> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V, C> DoubleEndedIterator for Values<'_, K, V, C> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V, C> ExactSizeIterator for Values<'_, K, V, C> {}

pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> DoubleEndedIterator for ValuesMut<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back().map(|(_, value)| value)
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

impl<K, V, C> Table<K, V, C> {
    /// Iterates over the elements in key order. The iterator is double ended, `.rev()` walks from the largest key.
    pub fn iter(&self) -> Iter<'_, K, V, C> {
        Iter {
            tree: self,
            front: self.first_node(),
            back: self.last_node(),
            remaining: self.len,
        }
    }

    /// Iterates over the elements in key order with mutable access to the values.
    ///
    /// Creating the iterator allocates a snapshot of the arena, so its cost is proportional to the largest size the
    /// table ever reached since it was last cleared rather than to its current length.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let order = self.in_order_indices();
        let mut nodes: Vec<Option<&mut TableNode<K, V>>> = self.storage.iter_mut().map(Slot::as_node_mut).collect();

        let entries: Vec<(&K, &mut V)> = order
            .into_iter()
            .filter_map(|idx| nodes[idx.0].take())
            .map(|node| {
                let TableNode { key, value, .. } = node;
                (&*key, value)
            })
            .collect();

        IterMut {
            entries: entries.into_iter(),
        }
    }

    pub fn keys(&self) -> Keys<'_, K, V, C> {
        Keys { inner: self.iter() }
    }

    pub fn values(&self) -> Values<'_, K, V, C> {
        Values { inner: self.iter() }
    }

    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }
}

impl<'a, K, V, C> IntoIterator for &'a Table<K, V, C> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V, C>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, C> IntoIterator for &'a mut Table<K, V, C> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

impl<K, V, C> IntoIterator for Table<K, V, C> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    /// Drains the table in key order. Like [`Table::iter_mut`], this snapshots the whole arena first.
    fn into_iter(self) -> Self::IntoIter {
        let order = self.in_order_indices();
        let mut nodes: Vec<Option<TableNode<K, V>>> = self.storage.into_iter().map(Slot::into_node).collect();

        let entries: Vec<(K, V)> = order
            .into_iter()
            .filter_map(|idx| nodes[idx.0].take())
            .map(|node| (node.key, node.value))
            .collect();

        IntoIter {
            entries: entries.into_iter(),
        }
    }
}
