//! Keyboard layouts attached to replies.

use super::{Action, Button, Keyboard};
use crate::domain::{Product, ProductId};

pub const SHOW_BEER_LABEL: &str = "Show beer";
pub const FIND_BEER_LABEL: &str = "Find beer";
pub const CART_LABEL: &str = "Cart";

pub fn main_menu() -> Keyboard {
    Keyboard::Menu(vec![
        vec![SHOW_BEER_LABEL.to_string(), FIND_BEER_LABEL.to_string()],
        vec![CART_LABEL.to_string()],
    ])
}

/// One "add" button per product, one product per row.
pub fn add_buttons(products: &[Product]) -> Keyboard {
    Keyboard::Inline(
        products
            .iter()
            .map(|product| vec![Button::new(format!("Add {} to cart", product.name), &Action::AddToCart(product.id))])
            .collect(),
    )
}

/// `-` / current quantity / `+`, then confirm.
///
/// The middle cell only shows the quantity; its payload decodes to an unknown action.
pub fn quantity_control(product_id: ProductId, quantity: i64) -> Keyboard {
    Keyboard::Inline(vec![
        vec![
            Button::new("-", &Action::AdjustQuantity { product_id, quantity, delta: -1 }),
            Button::inert(quantity.to_string(), format!("quantity:{product_id}:{quantity}")),
            Button::new("+", &Action::AdjustQuantity { product_id, quantity, delta: 1 }),
        ],
        vec![Button::new("Confirm", &Action::ConfirmAdd { product_id, quantity })],
    ])
}

pub fn cart_actions() -> Keyboard {
    Keyboard::Inline(vec![vec![
        Button::new("Checkout", &Action::Checkout),
        Button::new("Clear cart", &Action::ClearCart),
    ]])
}

/// Shown after a successful order.
pub fn browse_again() -> Keyboard {
    Keyboard::Inline(vec![
        vec![
            Button::new(SHOW_BEER_LABEL, &Action::ShowCatalog),
            Button::new(FIND_BEER_LABEL, &Action::Search),
        ],
        vec![Button::new("Go to cart", &Action::ViewCart)],
    ])
}
