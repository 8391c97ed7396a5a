use super::{CartLine, ConversationId};
use chrono::{DateTime, Utc};
use std::fmt;

/// Identifier assigned by the order store on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderId(pub i64);

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrderStatus {
    New,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::New => "new",
        }
    }
}

/// An order that has not been persisted yet: header fields plus one line per
/// cart line.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOrder {
    pub owner: ConversationId,
    pub created_at: DateTime<Utc>,
    pub status: OrderStatus,
    pub lines: Vec<CartLine>,
}

impl NewOrder {
    pub fn new(owner: ConversationId, lines: Vec<CartLine>) -> Self {
        Self {
            owner,
            created_at: Utc::now(),
            status: OrderStatus::New,
            lines,
        }
    }
}
