use crate::NodeIndex;

/// Which child slot of a parent a node hangs from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

#[derive(Debug, Clone)]
pub(crate) struct TableNode<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Height of the subtree rooted at this node, a leaf has height 1.
    pub(crate) height: u8,
    /// Stamp assigned when the node is allocated, unique within its table.
    pub(crate) generation: u64,
    pub(crate) parent: NodeIndex,
    pub(crate) left: NodeIndex,
    pub(crate) right: NodeIndex,
}

impl<K, V> TableNode<K, V> {
    pub(crate) fn new_isolated(key: K, value: V, parent: NodeIndex) -> Self {
        Self {
            key,
            value,
            height: 1,
            generation: 0,
            parent,
            left: NodeIndex::NIL,
            right: NodeIndex::NIL,
        }
    }

    pub(crate) fn child_mut(&mut self, side: Side) -> &mut NodeIndex {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }
}

/// A cell of the node arena.
///
/// Vacant cells form a singly linked free list threaded through `next_free`, the head of which is stored in the
/// table itself.
#[derive(Debug, Clone)]
pub(crate) enum Slot<K, V> {
    Occupied(TableNode<K, V>),
    Vacant { next_free: NodeIndex },
}

impl<K, V> Slot<K, V> {
    pub(crate) fn as_node(&self) -> Option<&TableNode<K, V>> {
        match self {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub(crate) fn as_node_mut(&mut self) -> Option<&mut TableNode<K, V>> {
        match self {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }

    pub(crate) fn into_node(self) -> Option<TableNode<K, V>> {
        match self {
            Slot::Occupied(node) => Some(node),
            Slot::Vacant { .. } => None,
        }
    }
}
