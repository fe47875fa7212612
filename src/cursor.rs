//! Bidirectional cursors over a [`Table`].
//!
//! A cursor designates either an element or the *end* position, which sits past the largest key and before the
//! smallest one at the same time: stepping forward from the last element or backward from the first one lands on
//! end, stepping backward from end lands on the last element.
//!
//! Moving a cursor only follows child and parent links, no auxiliary stack is kept.

use core::fmt;
use core::ptr;

use crate::NodeIndex;
use crate::compare::Natural;
use crate::table::Table;

/// A detached cursor location.
///
/// A position does not borrow its table. It remains valid across insertions and removals of other elements and
/// becomes stale once its own element is removed. A stale position behaves like [`Position::END`], even once a later
/// insertion reuses the arena slot of the removed element.
///
/// Positions are only meaningful for the table that produced them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub(crate) node: NodeIndex,
    pub(crate) generation: u64,
}

impl Position {
    /// The end position of any table.
    pub const END: Position = Position {
        node: NodeIndex::NIL,
        generation: 0,
    };

    #[must_use]
    pub fn is_end(self) -> bool {
        self.node.is_nil()
    }
}

/// A read-only cursor.
pub struct Cursor<'a, K, V, C = Natural> {
    table: &'a Table<K, V, C>,
    node: NodeIndex,
}

impl<'a, K, V, C> Cursor<'a, K, V, C> {
    pub(crate) fn new(table: &'a Table<K, V, C>, node: NodeIndex) -> Self {
        Self { table, node }
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_nil()
    }

    /// The detached location of this cursor.
    #[must_use]
    pub fn position(&self) -> Position {
        self.table.position_of(self.node)
    }

    pub fn key(&self) -> Option<&'a K> {
        self.entry().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&'a V> {
        self.entry().map(|(_, value)| value)
    }

    /// The element under the cursor, `None` at end.
    pub fn entry(&self) -> Option<(&'a K, &'a V)> {
        self.table.entry_at(self.node)
    }

    /// Steps to the next element in key order. Past the last element the cursor is at end, and stays there.
    pub fn move_next(&mut self) {
        self.node = self.table.successor(self.node);
    }

    /// Steps to the previous element in key order.
    ///
    /// Before the first element the cursor is at end. From end it moves to the last element, if any.
    pub fn move_prev(&mut self) {
        self.node = if self.node.is_nil() {
            self.table.last_node()
        } else {
            self.table.predecessor(self.node)
        };
    }

    pub fn peek_next(&self) -> Option<(&'a K, &'a V)> {
        self.table.entry_at(self.table.successor(self.node))
    }

    pub fn peek_prev(&self) -> Option<(&'a K, &'a V)> {
        let mut prev = *self;
        prev.move_prev();
        prev.entry()
    }
}

impl<K, V, C> Clone for Cursor<'_, K, V, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V, C> Copy for Cursor<'_, K, V, C> {}

impl<K, V, C> PartialEq for Cursor<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(self.table, other.table) && self.node == other.node
    }
}

impl<K, V, C> Eq for Cursor<'_, K, V, C> {}

impl<K, V, C> PartialEq<CursorMut<'_, K, V, C>> for Cursor<'_, K, V, C> {
    fn eq(&self, other: &CursorMut<'_, K, V, C>) -> bool {
        ptr::eq(self.table, &*other.table) && self.node == other.node
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for Cursor<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.entry()).finish()
    }
}

/// A cursor with mutable access to the values of its table.
///
/// Besides moving around, it can update the value under it and remove the current element.
pub struct CursorMut<'a, K, V, C = Natural> {
    table: &'a mut Table<K, V, C>,
    node: NodeIndex,
}

impl<'a, K, V, C> CursorMut<'a, K, V, C> {
    pub(crate) fn new(table: &'a mut Table<K, V, C>, node: NodeIndex) -> Self {
        Self { table, node }
    }

    #[must_use]
    pub fn is_end(&self) -> bool {
        self.node.is_nil()
    }

    #[must_use]
    pub fn position(&self) -> Position {
        self.table.position_of(self.node)
    }

    pub fn key(&self) -> Option<&K> {
        self.entry().map(|(key, _)| key)
    }

    pub fn value(&self) -> Option<&V> {
        self.entry().map(|(_, value)| value)
    }

    pub fn value_mut(&mut self) -> Option<&mut V> {
        self.entry_mut().map(|(_, value)| value)
    }

    pub fn entry(&self) -> Option<(&K, &V)> {
        self.table.entry_at(self.node)
    }

    /// The element under the cursor with its value borrowed mutably. Keys are never handed out mutably.
    pub fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        if self.node.is_nil() {
            return None;
        }

        let node = self.table.get_node_by_idx_mut(self.node);
        Some((&node.key, &mut node.value))
    }

    /// Consumes the cursor, keeping the mutable borrow of the current value for the whole lifetime of the table
    /// borrow.
    pub fn into_value_mut(self) -> Option<&'a mut V> {
        let CursorMut { table, node } = self;
        if node.is_nil() {
            return None;
        }

        Some(&mut table.get_node_by_idx_mut(node).value)
    }

    pub fn move_next(&mut self) {
        self.node = self.table.successor(self.node);
    }

    pub fn move_prev(&mut self) {
        self.node = if self.node.is_nil() {
            self.table.last_node()
        } else {
            self.table.predecessor(self.node)
        };
    }

    pub fn peek_next(&self) -> Option<(&K, &V)> {
        self.as_cursor().peek_next()
    }

    pub fn peek_prev(&self) -> Option<(&K, &V)> {
        self.as_cursor().peek_prev()
    }

    /// Removes the current element and moves to the one that followed it.
    ///
    /// Returns `None` and does nothing at end.
    pub fn remove_current(&mut self) -> Option<(K, V)> {
        if self.node.is_nil() {
            return None;
        }

        let removed = self.node;
        self.node = self.table.successor(removed);

        Some(self.table.unlink(removed))
    }

    /// A read-only view of this cursor.
    pub fn as_cursor(&self) -> Cursor<'_, K, V, C> {
        Cursor::new(&*self.table, self.node)
    }

    /// Downgrades into a read-only cursor for the rest of the borrow.
    pub fn into_cursor(self) -> Cursor<'a, K, V, C> {
        let CursorMut { table, node } = self;
        Cursor::new(table, node)
    }
}

impl<'a, K, V, C> From<CursorMut<'a, K, V, C>> for Cursor<'a, K, V, C> {
    fn from(cursor: CursorMut<'a, K, V, C>) -> Self {
        cursor.into_cursor()
    }
}

impl<K, V, C> PartialEq for CursorMut<'_, K, V, C> {
    fn eq(&self, other: &Self) -> bool {
        ptr::eq(&*self.table, &*other.table) && self.node == other.node
    }
}

impl<K, V, C> PartialEq<Cursor<'_, K, V, C>> for CursorMut<'_, K, V, C> {
    fn eq(&self, other: &Cursor<'_, K, V, C>) -> bool {
        other == self
    }
}

impl<K: fmt::Debug, V: fmt::Debug, C> fmt::Debug for CursorMut<'_, K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.entry()).finish()
    }
}
