use super::Action;
use crate::domain::ConversationId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextFormat {
    #[default]
    Plain,
    Markdown,
}

/// Whether a reply is a new message or replaces the one its button sat on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Delivery {
    #[default]
    Send,
    EditPrevious,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Button {
    pub label: String,
    pub payload: String,
}

impl Button {
    pub fn new(label: impl Into<String>, action: &Action) -> Self {
        Self { label: label.into(), payload: action.to_string() }
    }

    /// A button whose payload no handler understands; used for display-only cells.
    pub fn inert(label: impl Into<String>, payload: impl Into<String>) -> Self {
        Self { label: label.into(), payload: payload.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Keyboard {
    /// Rows of buttons attached to the message.
    Inline(Vec<Vec<Button>>),
    /// Persistent reply menu; pressing a label sends it back as text.
    Menu(Vec<Vec<String>>),
}

impl Keyboard {
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        let rows: &[Vec<Button>] = match self {
            Keyboard::Inline(rows) => rows,
            Keyboard::Menu(_) => &[],
        };
        rows.iter().flatten()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub format: TextFormat,
    pub keyboard: Option<Keyboard>,
    pub delivery: Delivery,
}

impl Reply {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            format: TextFormat::Plain,
            keyboard: None,
            delivery: Delivery::Send,
        }
    }

    pub fn markdown(text: impl Into<String>) -> Self {
        Self { format: TextFormat::Markdown, ..Self::plain(text) }
    }

    pub fn with_keyboard(mut self, keyboard: Keyboard) -> Self {
        self.keyboard = Some(keyboard);
        self
    }

    pub fn edit_previous(mut self) -> Self {
        self.delivery = Delivery::EditPrevious;
        self
    }
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Transport closed")]
    Closed,
    #[error("Transport I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where replies go. Implemented by each chat transport.
#[async_trait]
pub trait ReplySink: Send + Sync {
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), TransportError>;
}

/// Sink that keeps every delivered reply, in delivery order.
#[cfg(test)]
#[derive(Default)]
pub struct RecordingSink {
    delivered: parking_lot::Mutex<Vec<(ConversationId, Reply)>>,
}

#[cfg(test)]
impl RecordingSink {
    pub fn delivered(&self) -> Vec<(ConversationId, Reply)> {
        self.delivered.lock().clone()
    }

    pub fn replies_for(&self, conversation: ConversationId) -> Vec<Reply> {
        self.delivered
            .lock()
            .iter()
            .filter(|(c, _)| *c == conversation)
            .map(|(_, reply)| reply.clone())
            .collect()
    }
}

#[cfg(test)]
#[async_trait]
impl ReplySink for RecordingSink {
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), TransportError> {
        self.delivered.lock().push((conversation, reply));
        Ok(())
    }
}
