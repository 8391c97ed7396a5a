use std::fmt::{Debug, Display};
use std::hash::Hash;
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

// =============================================================================
// 1. THE ABSTRACTION (Entity trait with Actions)
// =============================================================================

/// Trait that any domain entity must implement to be owned by a [`ResourceActor`].
///
/// Each actor owns exactly one entity. Every request for that entity queues on
/// the actor's mailbox and is applied one at a time, so a read-modify-write
/// inside [`Entity::handle_action`] can never interleave with another request
/// for the same entity.
pub trait Entity: Clone + Send + Sync + 'static {
    type Id: Eq + Hash + Clone + Send + Sync + Display + Debug;
    type Action: Send + Sync + Debug;
    type ActionResult: Send + Sync + Debug;

    /// Get the ID of the entity
    fn id(&self) -> &Self::Id;

    /// Construct the initial (empty) entity for a freshly spawned actor
    fn from_id(id: Self::Id) -> Self;

    /// Handle a domain-specific action
    fn handle_action(&mut self, action: Self::Action) -> Result<Self::ActionResult, String>;
}

/// Failures of the actor plumbing itself, independent of any domain.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum FrameworkError {
    #[error("Actor closed")]
    ActorClosed,
    #[error("Actor dropped the request")]
    ActorDropped,
    #[error("Action rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// 2. THE GENERIC MESSAGES
// =============================================================================

pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

#[derive(Debug)]
pub enum ResourceRequest<T: Entity> {
    Get {
        respond_to: Response<T>,
    },
    Action {
        action: T::Action,
        respond_to: Response<T::ActionResult>,
    },
}

// =============================================================================
// 3. THE GENERIC ACTOR SERVER
// =============================================================================

pub struct ResourceActor<T: Entity> {
    receiver: mpsc::Receiver<ResourceRequest<T>>,
    entity: T,
}

impl<T: Entity> ResourceActor<T> {
    pub fn new(buffer_size: usize, id: T::Id) -> (Self, ResourceClient<T>) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            entity: T::from_id(id),
        };
        (actor, ResourceClient::new(sender))
    }

    /// Spawn the actor on the current runtime and return its client.
    pub fn spawn(buffer_size: usize, id: T::Id) -> ResourceClient<T> {
        let (actor, client) = Self::new(buffer_size, id);
        tokio::spawn(actor.run());
        client
    }

    /// Process requests until every client has been dropped.
    #[instrument(name = "resource_actor", skip(self), fields(id = %self.entity.id()))]
    pub async fn run(mut self) {
        debug!("Actor starting");
        while let Some(msg) = self.receiver.recv().await {
            match msg {
                ResourceRequest::Get { respond_to } => {
                    let _ = respond_to.send(Ok(self.entity.clone()));
                }
                ResourceRequest::Action { action, respond_to } => {
                    let result = self
                        .entity
                        .handle_action(action)
                        .map_err(FrameworkError::Rejected);
                    let _ = respond_to.send(result);
                }
            }
        }
        debug!("Actor stopped");
    }
}

// =============================================================================
// 4. THE GENERIC CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ResourceClient<T: Entity> {
    sender: mpsc::Sender<ResourceRequest<T>>,
}

impl<T: Entity> ResourceClient<T> {
    pub fn new(sender: mpsc::Sender<ResourceRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn get(&self) -> Result<T, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Get { respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }

    pub async fn perform_action(&self, action: T::Action) -> Result<T::ActionResult, FrameworkError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(ResourceRequest::Action { action, respond_to })
            .await
            .map_err(|_| FrameworkError::ActorClosed)?;
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}

// =============================================================================
// 5. EXAMPLE USAGE (Test)
// =============================================================================
