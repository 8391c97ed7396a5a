//! The conversational front: decoding inbound events, driving the catalog,
//! carts and order submission, and routing replies back to the transport.

mod action;
pub mod controller;
pub mod dispatcher;
mod event;
pub mod format;
pub mod keyboards;
mod reply;
mod state;

pub use action::Action;
pub use controller::ConversationController;
pub use dispatcher::{DispatchError, Dispatcher};
pub use event::{EventKind, InboundEvent};
pub use reply::*;
pub use state::ConvState;
