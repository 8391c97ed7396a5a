use crate::domain::{CartLine, ProductId};

/// Custom actions for Cart entities.
///
/// Each action is applied by the owning cart actor with exclusive access to
/// the cart, so read-modify-write sequences cannot interleave.
#[derive(Debug, Clone)]
pub enum CartAction {
    /// Adds `delta` to a line, creating it when absent.
    ///
    /// The resulting quantity is floored at 1.
    AddOrIncrement { product_id: ProductId, delta: i64 },
    /// Removes every line. A no-op on an empty cart.
    Clear,
    /// Copies the current lines, ordered by product id.
    SnapshotLines,
}

/// Results from CartActions - variants match 1:1 with CartAction
#[derive(Debug, Clone, PartialEq)]
pub enum CartActionResult {
    /// Result from AddOrIncrement - the line's new quantity
    AddOrIncrement(u32),
    /// Result from Clear - how many lines were removed
    Clear(usize),
    /// Result from SnapshotLines
    SnapshotLines(Vec<CartLine>),
}
