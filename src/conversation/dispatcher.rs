use super::{ConversationController, InboundEvent, ReplySink};
use crate::domain::ConversationId;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Dispatcher is shut down")]
    Closed,
}

/// Routes events to one ordered lane per conversation.
///
/// A lane is an mpsc queue drained by its own task, so events of one
/// conversation are handled and answered strictly in arrival order while
/// different conversations proceed in parallel. A lane that stays idle for
/// `lane_idle` is stopped and reopened by the next event.
#[derive(Clone)]
pub struct Dispatcher {
    inner: Arc<Inner>,
}

struct Inner {
    controller: Arc<ConversationController>,
    sink: Arc<dyn ReplySink>,
    lanes: DashMap<ConversationId, Slot>,
    /// Lock order: `tasks` before any `lanes` shard.
    tasks: Mutex<Tasks>,
    lane_size: usize,
    lane_idle: Duration,
}

#[derive(Default)]
struct Tasks {
    closed: bool,
    handles: Vec<JoinHandle<()>>,
}

/// Serialises successive lanes of one conversation: a new lane waits until
/// its retiring predecessor has answered its last events.
type Turn = Arc<tokio::sync::Mutex<()>>;

enum Slot {
    Open(mpsc::Sender<InboundEvent>),
    /// The lane stopped taking events and is answering what it still holds.
    Retiring(Turn),
}

impl Dispatcher {
    pub fn new(
        controller: Arc<ConversationController>,
        sink: Arc<dyn ReplySink>,
        lane_size: usize,
        lane_idle: Duration,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                controller,
                sink,
                lanes: DashMap::new(),
                tasks: Mutex::new(Tasks::default()),
                lane_size,
                lane_idle,
            }),
        }
    }

    /// Queue `event` on its conversation's lane. Waits only when that lane is full.
    pub async fn dispatch(&self, event: InboundEvent) -> Result<(), DispatchError> {
        let lane = self.lane_for(event.conversation)?;
        match lane.send(event).await {
            Ok(()) => Ok(()),
            // The lane retired between lookup and send.
            Err(mpsc::error::SendError(event)) => {
                let lane = self.lane_for(event.conversation)?;
                lane.send(event).await.map_err(|_| DispatchError::Closed)
            }
        }
    }

    fn lane_for(&self, conversation: ConversationId) -> Result<mpsc::Sender<InboundEvent>, DispatchError> {
        if let Some(slot) = self.inner.lanes.get(&conversation) {
            if let Slot::Open(sender) = slot.value() {
                if !sender.is_closed() {
                    return Ok(sender.clone());
                }
            }
        }

        let mut tasks = self.inner.tasks.lock();
        if tasks.closed {
            return Err(DispatchError::Closed);
        }
        let mut slot = self
            .inner
            .lanes
            .entry(conversation)
            .or_insert_with(|| Slot::Retiring(Turn::default()));
        let turn = match slot.value() {
            Slot::Open(sender) if !sender.is_closed() => return Ok(sender.clone()),
            Slot::Open(_) => Turn::default(),
            Slot::Retiring(turn) => turn.clone(),
        };

        debug!(%conversation, "Opening conversation lane");
        let (sender, receiver) = mpsc::channel(self.inner.lane_size);
        let handle = tokio::spawn(run_lane(conversation, receiver, turn, self.inner.clone()));
        tasks.handles.retain(|handle| !handle.is_finished());
        tasks.handles.push(handle);
        *slot = Slot::Open(sender.clone());
        Ok(sender)
    }

    /// Stop accepting events, let every lane drain, and wait for the lane tasks.
    pub async fn close(&self) {
        let handles = {
            let mut tasks = self.inner.tasks.lock();
            tasks.closed = true;
            self.inner.lanes.clear();
            std::mem::take(&mut tasks.handles)
        };

        info!(lanes = handles.len(), "Draining conversation lanes");
        for handle in handles {
            if let Err(e) = handle.await {
                error!(error = %e, "Conversation lane task failed");
            }
        }
    }

    #[cfg(test)]
    fn lane_count(&self) -> usize {
        self.inner.lanes.len()
    }
}

impl Inner {
    /// Called by an idle lane. Returns false when the dispatcher already
    /// dropped the lane on close.
    fn retire(&self, conversation: ConversationId, turn: &Turn) -> bool {
        let Some(mut slot) = self.lanes.get_mut(&conversation) else {
            return false;
        };
        if !matches!(slot.value(), Slot::Open(_)) {
            return false;
        }
        *slot = Slot::Retiring(turn.clone());
        true
    }
}

#[instrument(name = "conversation_lane", skip(receiver, turn, inner))]
async fn run_lane(
    conversation: ConversationId,
    mut receiver: mpsc::Receiver<InboundEvent>,
    turn: Turn,
    inner: Arc<Inner>,
) {
    let _turn = turn.clone().lock_owned().await;

    loop {
        let event = match tokio::time::timeout(inner.lane_idle, receiver.recv()).await {
            Ok(Some(event)) => event,
            Ok(None) => break,
            Err(_) => {
                if inner.retire(conversation, &turn) {
                    debug!("Lane idle, retiring");
                    // Buffered events are still delivered before `recv` yields `None`.
                    receiver.close();
                }
                continue;
            }
        };

        let reply = inner.controller.handle(event).await;
        if let Err(e) = inner.sink.deliver(conversation, reply).await {
            warn!(error = %e, "Failed to deliver reply");
        }
    }

    inner.lanes.remove_if(&conversation, |_, slot| matches!(slot, Slot::Retiring(_)));
    debug!("Lane closed");
}
