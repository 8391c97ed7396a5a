use super::format::{product_info, product_list, CartView};
use super::keyboards::{self, CART_LABEL, FIND_BEER_LABEL, SHOW_BEER_LABEL};
use super::{Action, ConvState, EventKind, InboundEvent, Reply};
use crate::cart_actor::{CartError, CartStore};
use crate::catalog::{CatalogError, CatalogStore, SearchOutcome};
use crate::domain::{ConversationId, Product, ProductId};
use crate::order_submitter::{OrderError, OrderSubmitter};
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

pub const GREETING: &str = "Hi! I'm a bot for buying beer.";
pub const SEARCH_PROMPT: &str = "Enter the beer name to search:";
pub const NOT_FOUND: &str = "Beer not found.";
pub const SOLD_OUT: &str = "Beer is sold out :(";
pub const CART_EMPTY: &str = "Your cart is empty.";
pub const NOTHING_TO_ORDER: &str = "Your cart is empty. Nothing to order.";
pub const ORDER_PLACED: &str = "Thank you for your order!";
pub const ORDER_FAILED: &str = "Error placing order. Please try again later.";
pub const CART_CLEARED: &str = "Cart cleared.";
pub const UNKNOWN_COMMAND: &str = "Unknown command.";
pub const UNKNOWN_ACTION: &str = "Unknown action.";
pub const INVALID_FORMAT: &str = "Invalid data format.";
pub const TRY_AGAIN_LATER: &str = "Something went wrong. Please try again later.";

/// Infrastructure failures while serving one event. Never fatal.
#[derive(Debug, Error)]
enum HandlerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Cart(#[from] CartError),
}

type HandlerResult = Result<Reply, HandlerError>;

/// Turns inbound events into replies.
///
/// Holds no cart or catalog state of its own, only the dialogue flag of each
/// conversation. Callers must not feed two events of the same conversation
/// concurrently; the dispatcher guarantees this with one lane per conversation.
pub struct ConversationController {
    catalog: CatalogStore,
    carts: CartStore,
    orders: OrderSubmitter,
    states: DashMap<ConversationId, ConvState>,
}

impl ConversationController {
    pub fn new(catalog: CatalogStore, carts: CartStore, orders: OrderSubmitter) -> Self {
        Self { catalog, carts, orders, states: DashMap::new() }
    }

    pub fn state(&self, conversation: ConversationId) -> ConvState {
        self.states.get(&conversation).map(|s| *s).unwrap_or_default()
    }

    fn set_state(&self, conversation: ConversationId, state: ConvState) {
        self.states.insert(conversation, state);
    }

    /// Handle one event and produce exactly one reply.
    #[instrument(skip(self, event), fields(conversation = %event.conversation))]
    pub async fn handle(&self, event: InboundEvent) -> Reply {
        let conversation = event.conversation;
        let result = match event.kind {
            EventKind::Command(name) => Ok(self.on_command(conversation, &name)),
            EventKind::Text(text) => self.on_text(conversation, &text).await,
            EventKind::Action(payload) => self.on_action(conversation, Action::parse(&payload)).await,
        };

        result.unwrap_or_else(|e| {
            error!(error = %e, "Failed to handle event");
            Reply::plain(TRY_AGAIN_LATER)
        })
    }

    fn on_command(&self, conversation: ConversationId, name: &str) -> Reply {
        match name {
            "start" => {
                self.set_state(conversation, ConvState::Idle);
                Reply::plain(GREETING).with_keyboard(keyboards::main_menu())
            }
            other => {
                debug!(command = other, "Unknown command");
                Reply::plain(UNKNOWN_COMMAND)
            }
        }
    }

    async fn on_text(&self, conversation: ConversationId, text: &str) -> HandlerResult {
        if self.state(conversation) == ConvState::AwaitingSearchText {
            return self.run_search(conversation, text).await;
        }
        match text.trim() {
            SHOW_BEER_LABEL => self.show_catalog(conversation).await,
            FIND_BEER_LABEL => Ok(self.prompt_search(conversation)),
            CART_LABEL => self.view_cart(conversation).await,
            _ => {
                debug!("Free text outside of a search");
                Ok(Reply::plain(UNKNOWN_COMMAND))
            }
        }
    }

    async fn on_action(&self, conversation: ConversationId, action: Action) -> HandlerResult {
        match action {
            Action::AddToCart(product_id) => self.offer_quantity(product_id).await,
            Action::AdjustQuantity { product_id, quantity, delta } => {
                self.adjust_quantity(product_id, quantity, delta).await
            }
            Action::ConfirmAdd { product_id, quantity } => self.confirm_add(conversation, product_id, quantity).await,
            Action::Checkout => self.checkout(conversation).await,
            Action::ClearCart => self.clear_cart(conversation).await,
            Action::ShowCatalog => self.show_catalog(conversation).await,
            Action::Search => Ok(self.prompt_search(conversation)),
            Action::ViewCart => self.view_cart(conversation).await,
            Action::Malformed(payload) => {
                debug!(%payload, "Malformed action payload");
                Ok(Reply::plain(INVALID_FORMAT))
            }
            Action::Unknown(payload) => {
                debug!(%payload, "Unknown action payload");
                Ok(Reply::plain(UNKNOWN_ACTION))
            }
        }
    }

    fn prompt_search(&self, conversation: ConversationId) -> Reply {
        self.set_state(conversation, ConvState::AwaitingSearchText);
        Reply::plain(SEARCH_PROMPT)
    }

    async fn run_search(&self, conversation: ConversationId, query: &str) -> HandlerResult {
        self.set_state(conversation, ConvState::Idle);
        let reply = match self.catalog.search(query).await? {
            SearchOutcome::NoMatches => {
                debug!(query, "Search found nothing");
                Reply::plain(NOT_FOUND)
            }
            SearchOutcome::Single(product) => Reply::markdown(product_info(&product, true))
                .with_keyboard(keyboards::add_buttons(std::slice::from_ref(&product))),
            SearchOutcome::Many(products) => {
                Reply::markdown(product_list(&products)).with_keyboard(keyboards::add_buttons(&products))
            }
        };
        Ok(reply)
    }

    async fn show_catalog(&self, conversation: ConversationId) -> HandlerResult {
        self.set_state(conversation, ConvState::Idle);
        let mut snapshot = self.catalog.current();
        if !snapshot.is_loaded() {
            debug!("Catalog not loaded yet, refreshing before listing");
            snapshot = self.catalog.refresh().await?;
        }
        if snapshot.products.is_empty() {
            return Ok(Reply::plain(SOLD_OUT));
        }
        Ok(Reply::markdown(product_list(&snapshot.products)).with_keyboard(keyboards::add_buttons(&snapshot.products)))
    }

    async fn lookup(&self, product_id: ProductId) -> Result<Option<Product>, HandlerError> {
        let product = self.catalog.find_by_id(product_id).await?;
        if product.is_none() {
            debug!(%product_id, "Product not in catalog");
        }
        Ok(product)
    }

    async fn offer_quantity(&self, product_id: ProductId) -> HandlerResult {
        let Some(product) = self.lookup(product_id).await? else {
            return Ok(Reply::plain(NOT_FOUND));
        };
        Ok(quantity_prompt(&product, 1))
    }

    /// Re-render the quantity control in place. The cart is not touched.
    async fn adjust_quantity(&self, product_id: ProductId, quantity: i64, delta: i64) -> HandlerResult {
        let Some(product) = self.lookup(product_id).await? else {
            return Ok(Reply::plain(NOT_FOUND));
        };
        let adjusted = quantity.saturating_add(delta).max(1);
        Ok(quantity_prompt(&product, adjusted).edit_previous())
    }

    async fn confirm_add(&self, conversation: ConversationId, product_id: ProductId, quantity: i64) -> HandlerResult {
        let Some(product) = self.lookup(product_id).await? else {
            return Ok(Reply::plain(NOT_FOUND));
        };
        // Events of one conversation are serialised, so nothing lands in between.
        let before = self.carts.get(conversation).await?.quantity_of(product_id).unwrap_or(0);
        let in_cart = self.carts.add_or_increment(conversation, product_id, quantity).await?;
        info!(%product_id, quantity, before, in_cart, "Added to cart");
        let text = match in_cart.checked_sub(before) {
            Some(added) if added > 0 => format!("{} ({added} pcs) added to cart.", product.name),
            _ => format!("{}: {in_cart} pcs in cart.", product.name),
        };
        Ok(Reply::plain(text))
    }

    async fn view_cart(&self, conversation: ConversationId) -> HandlerResult {
        let cart = self.carts.get(conversation).await?;
        if cart.is_empty() {
            return Ok(Reply::plain(CART_EMPTY));
        }

        let mut resolved = Vec::with_capacity(cart.len());
        for line in cart.lines() {
            let Some(product) = self.lookup(line.product_id).await? else {
                warn!(product_id = %line.product_id, "Carted product left the catalog");
                return Ok(Reply::plain(NOT_FOUND));
            };
            resolved.push((product, line.quantity));
        }

        Ok(Reply::markdown(CartView::new(resolved).render()).with_keyboard(keyboards::cart_actions()))
    }

    async fn checkout(&self, conversation: ConversationId) -> HandlerResult {
        let lines = self.carts.snapshot_lines(conversation).await?;
        match self.orders.submit(conversation, lines).await {
            Ok(order_id) => {
                if let Err(e) = self.carts.clear(conversation).await {
                    // The order is already committed; report it as placed.
                    error!(%order_id, error = %e, "Failed to clear cart after order");
                }
                Ok(Reply::plain(ORDER_PLACED).with_keyboard(keyboards::browse_again()))
            }
            Err(OrderError::EmptyOrder) => Ok(Reply::plain(NOTHING_TO_ORDER)),
            Err(e) => {
                warn!(error = %e, "Checkout failed, cart kept");
                Ok(Reply::plain(ORDER_FAILED))
            }
        }
    }

    async fn clear_cart(&self, conversation: ConversationId) -> HandlerResult {
        self.carts.clear(conversation).await?;
        Ok(Reply::plain(CART_CLEARED))
    }
}

fn quantity_prompt(product: &Product, quantity: i64) -> Reply {
    Reply::plain(format!("Choose quantity of {}:", product.name))
        .with_keyboard(keyboards::quantity_control(product.id, quantity))
}
