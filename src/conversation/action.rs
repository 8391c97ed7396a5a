use crate::domain::ProductId;
use std::fmt;

/// A decoded button payload.
///
/// Payloads are decoded exactly once, when the event enters the controller.
/// Nothing past this point looks at the raw string again, except to echo a
/// malformed or unknown payload in a log line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    AddToCart(ProductId),
    AdjustQuantity { product_id: ProductId, quantity: i64, delta: i64 },
    ConfirmAdd { product_id: ProductId, quantity: i64 },
    Checkout,
    ClearCart,
    ShowCatalog,
    Search,
    ViewCart,
    /// Known prefix, unusable fields.
    Malformed(String),
    Unknown(String),
}

const ADD_TO_CART: &str = "add_to_cart";
const ADJUST_QUANTITY: &str = "adjust_quantity";
const CONFIRM_ADD: &str = "confirm_add";
const CHECKOUT: &str = "checkout";
const CLEAR_CART: &str = "clear_cart";
const SHOW_CATALOG: &str = "beer";
const SEARCH: &str = "search";
const VIEW_CART: &str = "cart";

const PREFIXES: [&str; 8] = [
    ADD_TO_CART,
    ADJUST_QUANTITY,
    CONFIRM_ADD,
    CHECKOUT,
    CLEAR_CART,
    SHOW_CATALOG,
    SEARCH,
    VIEW_CART,
];

impl Action {
    pub fn parse(payload: &str) -> Self {
        let mut parts = payload.split(':');
        let head = parts.next().unwrap_or_default();
        if !PREFIXES.contains(&head) {
            return Action::Unknown(payload.to_string());
        }
        let fields: Vec<&str> = parts.collect();
        decode(head, &fields).unwrap_or_else(|| Action::Malformed(payload.to_string()))
    }
}

fn decode(head: &str, fields: &[&str]) -> Option<Action> {
    let action = match (head, fields) {
        // A trailing quantity is tolerated and ignored.
        (ADD_TO_CART, [id] | [id, _]) => Action::AddToCart(parse_id(id)?),
        (ADJUST_QUANTITY, [id, quantity, delta]) => Action::AdjustQuantity {
            product_id: parse_id(id)?,
            quantity: quantity.parse().ok()?,
            delta: delta.parse().ok()?,
        },
        (CONFIRM_ADD, [id, quantity]) => Action::ConfirmAdd {
            product_id: parse_id(id)?,
            quantity: quantity.parse().ok()?,
        },
        (CHECKOUT, []) => Action::Checkout,
        (CLEAR_CART, []) => Action::ClearCart,
        (SHOW_CATALOG, []) => Action::ShowCatalog,
        (SEARCH, []) => Action::Search,
        (VIEW_CART, []) => Action::ViewCart,
        _ => return None,
    };
    Some(action)
}

fn parse_id(field: &str) -> Option<ProductId> {
    field.parse().ok().map(ProductId)
}

/// Encodes the payload a button carries. `Malformed` and `Unknown` echo the
/// raw text they were decoded from.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::AddToCart(id) => write!(f, "{ADD_TO_CART}:{id}"),
            Action::AdjustQuantity { product_id, quantity, delta } => {
                write!(f, "{ADJUST_QUANTITY}:{product_id}:{quantity}:{delta}")
            }
            Action::ConfirmAdd { product_id, quantity } => write!(f, "{CONFIRM_ADD}:{product_id}:{quantity}"),
            Action::Checkout => f.write_str(CHECKOUT),
            Action::ClearCart => f.write_str(CLEAR_CART),
            Action::ShowCatalog => f.write_str(SHOW_CATALOG),
            Action::Search => f.write_str(SEARCH),
            Action::ViewCart => f.write_str(VIEW_CART),
            Action::Malformed(raw) | Action::Unknown(raw) => f.write_str(raw),
        }
    }
}
