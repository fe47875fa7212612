use thiserror_no_std::Error;

/// The error returned by checked element access.
#[derive(Debug, Error, Clone, Copy, Eq, PartialEq)]
pub enum TableError {
    #[error("key not found in table")]
    KeyNotFound,
}

/// A structural defect found by [`Table::check`](crate::Table::check).
///
/// None of these can be produced through the public API of a correct table; they exist so that tests can pinpoint
/// which invariant broke.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum InvariantError {
    #[error("node {node} is out of order with respect to its ancestors")]
    Unordered { node: usize },
    #[error("node {node} has balance factor {balance}")]
    Unbalanced { node: usize, balance: i16 },
    #[error("node {node} caches height {cached} but its subtree has height {actual}")]
    StaleHeight { node: usize, cached: u8, actual: u8 },
    #[error("node {node} does not point back to its parent {expected}")]
    BrokenParentLink { node: usize, expected: usize },
    #[error("link to vacant slot {node}")]
    DanglingLink { node: usize },
    #[error("table records {recorded} elements but {reachable} are reachable")]
    SizeMismatch { recorded: usize, reachable: usize },
}
