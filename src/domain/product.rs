use rust_decimal::Decimal;
use std::fmt;

/// Stable identifier of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(pub i64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Represents a product in the catalog.
///
/// Products are never mutated in place: a catalog refresh replaces the whole
/// snapshot they live in.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
    /// Category label, e.g. "Lager" or "Stout".
    pub kind: String,
    pub image_url: String,
}

impl Product {
    /// Creates a new Product instance.
    ///
    /// # Arguments
    /// * `id` - Catalog identifier
    /// * `name` - Product name
    /// * `price` - Unit price
    /// * `stock` - Quantity available
    ///
    /// Description, kind and image start empty; the first two have `with_*` builders.
    pub fn new(id: i64, name: impl Into<String>, price: Decimal, stock: u32) -> Self {
        Self {
            id: ProductId(id),
            name: name.into(),
            description: String::new(),
            price,
            stock,
            kind: String::new(),
            image_url: String::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Case-insensitive substring match over name and kind.
    pub fn matches(&self, query: &str) -> bool {
        let needle = query.trim().to_lowercase();
        self.name.to_lowercase().contains(&needle) || self.kind.to_lowercase().contains(&needle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_ignores_case_and_checks_kind() {
        let product = Product::new(1, "Pilsner Urquell", Decimal::new(250, 2), 4).with_kind("Lager");

        assert!(product.matches("pilsner"));
        assert!(product.matches("  URQUELL "));
        assert!(product.matches("lag"));
        assert!(!product.matches("stout"));
    }
}
