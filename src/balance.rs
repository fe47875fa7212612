//! Rotations, rebalancing and the structural self check.

use crate::NodeIndex;
use crate::compare::Compare;
use crate::error::InvariantError;
use crate::table::Table;

impl<K, V, C> Table<K, V, C> {
    pub(crate) fn height(&self, idx: NodeIndex) -> u8 {
        if idx.is_nil() {
            0
        } else {
            self.get_node_by_idx(idx).height
        }
    }

    /// `height(right) - height(left)` of the subtree rooted at `idx`.
    pub(crate) fn balance_factor(&self, idx: NodeIndex) -> i16 {
        let node = self.get_node_by_idx(idx);
        i16::from(self.height(node.right)) - i16::from(self.height(node.left))
    }

    fn update_height(&mut self, idx: NodeIndex) {
        let node = self.get_node_by_idx(idx);
        let height = self.height(node.left).max(self.height(node.right)) + 1;
        self.get_node_by_idx_mut(idx).height = height;
    }

    /// Rotates the subtree rooted at `center` to the left and returns its new root.
    ///
    /// ```text
    ///     center               pivot
    ///     /    \               /   \
    ///    a    pivot   =>   center   c
    ///         /   \        /    \
    ///      inner   c      a    inner
    /// ```
    pub(crate) fn rotate_left(&mut self, center: NodeIndex) -> NodeIndex {
        let grandparent_idx = self.get_node_by_idx(center).parent;
        let pivot_idx = self.get_node_by_idx(center).right;
        let inner_idx = self.get_node_by_idx(pivot_idx).left;

        self.get_node_by_idx_mut(center).right = inner_idx;
        if !inner_idx.is_nil() {
            self.get_node_by_idx_mut(inner_idx).parent = center;
        }

        self.get_node_by_idx_mut(pivot_idx).left = center;
        self.get_node_by_idx_mut(center).parent = pivot_idx;
        self.get_node_by_idx_mut(pivot_idx).parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, pivot_idx);

        self.update_height(center);
        self.update_height(pivot_idx);

        log::trace!("rotated node {} left under {}", center.0, pivot_idx.0);

        pivot_idx
    }

    /// Mirror image of [`Self::rotate_left`].
    pub(crate) fn rotate_right(&mut self, center: NodeIndex) -> NodeIndex {
        let grandparent_idx = self.get_node_by_idx(center).parent;
        let pivot_idx = self.get_node_by_idx(center).left;
        let inner_idx = self.get_node_by_idx(pivot_idx).right;

        self.get_node_by_idx_mut(center).left = inner_idx;
        if !inner_idx.is_nil() {
            self.get_node_by_idx_mut(inner_idx).parent = center;
        }

        self.get_node_by_idx_mut(pivot_idx).right = center;
        self.get_node_by_idx_mut(center).parent = pivot_idx;
        self.get_node_by_idx_mut(pivot_idx).parent = grandparent_idx;

        self.replace_child(grandparent_idx, center, pivot_idx);

        self.update_height(center);
        self.update_height(pivot_idx);

        log::trace!("rotated node {} right under {}", center.0, pivot_idx.0);

        pivot_idx
    }

    /// Refreshes the height of `idx` and rotates if its subtree leans by two levels.
    ///
    /// Returns the root of the subtree after rotation.
    pub(crate) fn balance(&mut self, idx: NodeIndex) -> NodeIndex {
        self.update_height(idx);

        match self.balance_factor(idx) {
            -2 => {
                let left = self.get_node_by_idx(idx).left;
                if self.balance_factor(left) > 0 {
                    self.rotate_left(left);
                }
                self.rotate_right(idx)
            }
            2 => {
                let right = self.get_node_by_idx(idx).right;
                if self.balance_factor(right) < 0 {
                    self.rotate_right(right);
                }
                self.rotate_left(idx)
            }
            _ => idx,
        }
    }

    /// Walks from `start` to the root, rebalancing every ancestor.
    ///
    /// After an insertion the walk stops at the first subtree whose height did not change, a removal may unbalance
    /// several ancestors and always walks up to the root (`to_root`).
    pub(crate) fn rebalance_from(&mut self, start: NodeIndex, to_root: bool) {
        let mut current_node = start;

        while !current_node.is_nil() {
            let previous_height = self.get_node_by_idx(current_node).height;
            let subtree_root = self.balance(current_node);

            if !to_root && self.get_node_by_idx(subtree_root).height == previous_height {
                break;
            }

            current_node = self.get_node_by_idx(subtree_root).parent;
        }
    }
}

impl<K, V, C: Compare<K>> Table<K, V, C> {
    /// Verifies every structural invariant of the tree.
    ///
    /// Checks key order, AVL balance, cached heights, parent links and the element count. A correct table always
    /// passes, this exists for tests.
    ///
    /// # Errors
    /// Returns the first violation found.
    pub fn check(&self) -> Result<(), InvariantError> {
        let (_, reachable) = self.check_subtree(self.root, NodeIndex::NIL, None, None)?;

        if reachable != self.len {
            return Err(InvariantError::SizeMismatch {
                recorded: self.len,
                reachable,
            });
        }

        Ok(())
    }

    /// Returns the height and node count of the subtree rooted at `idx`.
    fn check_subtree(
        &self,
        idx: NodeIndex,
        expected_parent: NodeIndex,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<(u8, usize), InvariantError> {
        if idx.is_nil() {
            return Ok((0, 0));
        }

        let node = self
            .storage
            .get(idx.0)
            .and_then(|slot| slot.as_node())
            .ok_or(InvariantError::DanglingLink { node: idx.0 })?;

        if node.parent != expected_parent {
            return Err(InvariantError::BrokenParentLink {
                node: idx.0,
                expected: expected_parent.0,
            });
        }

        let above_lower = lower.is_none_or(|lower| self.comp.less(lower, &node.key));
        let below_upper = upper.is_none_or(|upper| self.comp.less(&node.key, upper));
        if !(above_lower && below_upper) {
            return Err(InvariantError::Unordered { node: idx.0 });
        }

        let (left_height, left_count) = self.check_subtree(node.left, idx, lower, Some(&node.key))?;
        let (right_height, right_count) = self.check_subtree(node.right, idx, Some(&node.key), upper)?;

        let balance = i16::from(right_height) - i16::from(left_height);
        if balance.abs() > 1 {
            return Err(InvariantError::Unbalanced { node: idx.0, balance });
        }

        let actual = left_height.max(right_height) + 1;
        if node.height != actual {
            return Err(InvariantError::StaleHeight {
                node: idx.0,
                cached: node.height,
                actual,
            });
        }

        Ok((actual, left_count + right_count + 1))
    }
}
