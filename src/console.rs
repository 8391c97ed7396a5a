//! Line-based console transport.
//!
//! Each input line is `<conversation-id> <input>`. Input starting with `/` is a
//! command, input starting with `!` is a button payload, anything else is
//! free text. Replies are printed to stdout with their keyboards underneath.

use crate::conversation::{
    Delivery, DispatchError, Dispatcher, EventKind, InboundEvent, Keyboard, Reply, ReplySink, TransportError,
};
use crate::domain::ConversationId;
use async_trait::async_trait;
use std::fmt::Write as _;
use tokio::io::{AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Parse one input line. Blank lines and lines without a numeric id yield `None`.
pub fn parse_line(line: &str) -> Option<InboundEvent> {
    let (id, input) = line.trim().split_once(char::is_whitespace)?;
    let conversation = ConversationId(id.parse().ok()?);
    let input = input.trim();

    let kind = if let Some(command) = input.strip_prefix('/') {
        EventKind::Command(command.to_string())
    } else if let Some(payload) = input.strip_prefix('!') {
        EventKind::Action(payload.to_string())
    } else if input.is_empty() {
        return None;
    } else {
        EventKind::Text(input.to_string())
    };
    Some(InboundEvent { conversation, kind })
}

pub fn render(conversation: ConversationId, reply: &Reply) -> String {
    let mut out = String::new();
    let marker = match reply.delivery {
        Delivery::Send => "",
        Delivery::EditPrevious => " (edit)",
    };
    let _ = writeln!(out, "[{conversation}]{marker} {}", reply.text);
    match &reply.keyboard {
        Some(Keyboard::Inline(rows)) => {
            for row in rows {
                let cells: Vec<String> = row.iter().map(|b| format!("[{}] !{}", b.label, b.payload)).collect();
                let _ = writeln!(out, "    {}", cells.join("  "));
            }
        }
        Some(Keyboard::Menu(rows)) => {
            let labels: Vec<&str> = rows.iter().flatten().map(String::as_str).collect();
            let _ = writeln!(out, "    menu: {}", labels.join(" | "));
        }
        None => {}
    }
    out
}

/// Writes rendered replies to any async writer, stdout in the binary.
pub struct ConsoleSink<W> {
    out: Mutex<W>,
}

impl ConsoleSink<tokio::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout())
    }
}

impl<W> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out: Mutex::new(out) }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

#[async_trait]
impl<W: AsyncWrite + Unpin + Send + 'static> ReplySink for ConsoleSink<W> {
    async fn deliver(&self, conversation: ConversationId, reply: Reply) -> Result<(), TransportError> {
        let mut out = self.out.lock().await;
        out.write_all(render(conversation, &reply).as_bytes()).await?;
        out.flush().await?;
        Ok(())
    }
}

/// Feed stdin lines to `dispatcher` until EOF or Ctrl-C.
pub async fn run(dispatcher: Dispatcher) -> Result<(), TransportError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("Console ready: enter `<conversation-id> <input>`, e.g. `1 /start`");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };
                let Some(event) = parse_line(&line) else {
                    warn!(%line, "Ignoring unparseable input line");
                    continue;
                };
                if let Err(DispatchError::Closed) = dispatcher.dispatch(event).await {
                    return Err(TransportError::Closed);
                }
            }
        }
    }
    Ok(())
}
