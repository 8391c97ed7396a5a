use crate::domain::ConversationId;

/// One inbound message from the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub conversation: ConversationId,
    pub kind: EventKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EventKind {
    /// Command name without the leading slash.
    Command(String),
    /// Raw button payload.
    Action(String),
    Text(String),
}

impl InboundEvent {
    pub fn command(conversation: ConversationId, name: impl Into<String>) -> Self {
        Self { conversation, kind: EventKind::Command(name.into()) }
    }

    pub fn action(conversation: ConversationId, payload: impl Into<String>) -> Self {
        Self { conversation, kind: EventKind::Action(payload.into()) }
    }

    pub fn text(conversation: ConversationId, text: impl Into<String>) -> Self {
        Self { conversation, kind: EventKind::Text(text.into()) }
    }
}
