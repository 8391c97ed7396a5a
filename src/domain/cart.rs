use super::{ConversationId, ProductId};
use std::collections::BTreeMap;

/// One product and how many of it sit in a cart. `quantity` is always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Per-conversation cart. At most one line per product; lines iterate in
/// product id order.
///
/// Each line keeps the raw sum of every delta applied to it. The visible
/// quantity is that sum floored at 1, so the floor never eats part of a later
/// delta.
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub conversation: ConversationId,
    lines: BTreeMap<ProductId, i64>,
}

impl Cart {
    pub fn new(conversation: ConversationId) -> Self {
        Self {
            conversation,
            lines: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn quantity_of(&self, product_id: ProductId) -> Option<u32> {
        self.lines.get(&product_id).map(|&raw| floor_quantity(raw))
    }

    pub fn lines(&self) -> Vec<CartLine> {
        self.lines
            .iter()
            .map(|(&product_id, &raw)| CartLine { product_id, quantity: floor_quantity(raw) })
            .collect()
    }

    /// Adds `delta` to the line for `product_id`, creating it when absent.
    ///
    /// Returns the line's quantity: the sum of all its deltas, or 1 when that
    /// sum is zero or less. A line is never removed this way. There is no
    /// upper cap besides `u32::MAX`.
    pub fn add_or_increment(&mut self, product_id: ProductId, delta: i64) -> u32 {
        let raw = self.lines.entry(product_id).or_insert(0);
        *raw = raw.saturating_add(delta);
        floor_quantity(*raw)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Clamp a raw quantity into the valid `1..=u32::MAX` range.
pub fn floor_quantity(raw: i64) -> u32 {
    u32::try_from(raw.max(1)).unwrap_or(u32::MAX)
}
