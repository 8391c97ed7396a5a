//! Typed clients in front of the generic actor framework.

#[macro_use]
mod macros;

pub mod cart_client;

pub use cart_client::*;
