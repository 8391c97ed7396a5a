pub mod product;
pub mod cart;
pub mod order;
pub mod conversation;

pub use product::*;
pub use cart::*;
pub use order::*;
pub use conversation::*;
