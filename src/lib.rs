//! An ordered associative container backed by an AVL tree.
//!
//! [`Table`] stores unique keys in the order given by a pluggable [`Compare`] implementation and supports
//! logarithmic lookup, insertion and removal, bidirectional [`Cursor`]s and detached [`Position`] handles.
//!
//! Nodes live in an arena owned by the table and reference each other through index handles. Child links
//! express ownership of the subtree, parent links are plain back-references used to walk the tree upwards when
//! rebalancing and when moving a cursor.
//!
//! ```
//! use avl_table::Table;
//!
//! let mut table = Table::from([(5, "five"), (3, "three"), (8, "eight")]);
//! table.insert_or_assign(3, "THREE");
//!
//! let keys: Vec<_> = table.keys().copied().collect();
//! assert_eq!(keys, [3, 5, 8]);
//! assert_eq!(table.at(&3), Ok(&"THREE"));
//! ```
#![no_std]

extern crate alloc;

mod balance;
pub mod compare;
mod cursor;
mod error;
pub mod iter;
mod node;
mod ops;
mod table;

pub use compare::{Compare, Natural, Reverse, ValueCompare};
pub use cursor::{Cursor, CursorMut, Position};
pub use error::{InvariantError, TableError};
pub use ops::{erase_if, swap};
pub use table::Table;

/// Handle of a node inside the arena of a [`Table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub(crate) struct NodeIndex(pub(crate) usize);

impl NodeIndex {
    /// Marks an absent link: a missing child, the parent of the root, or the end position.
    pub(crate) const NIL: NodeIndex = NodeIndex(usize::MAX);

    pub(crate) fn is_nil(self) -> bool {
        self == Self::NIL
    }
}
