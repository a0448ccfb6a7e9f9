//! # Input Module
//!
//! The input gate: how the engine pauses for a human decision.
//!
//! The engine side ([`InputGate`]) publishes a [`PendingRequest`] on a channel and
//! waits. The UI side reads requests from the receiver and answers through a
//! [`GateHandle`]. Only one request is ever outstanding, and each one accepts
//! exactly one valid answer.

pub mod autoplay;

pub use autoplay::*;

use crate::events::EventCategory;
use crate::game::{Direction, PlayerId};
use crate::{BoardError, BoardResult};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot};

/// Identifier of a single request.
pub type RequestId = u64;

/// What the engine is asking for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Prompt {
    /// Pick one of the offered directions
    Direction {
        text: String,
        options: Vec<Direction>,
    },
    /// Yes or no
    Confirm { text: String },
    /// Pick one of the offered players
    Target {
        text: String,
        candidates: Vec<PlayerId>,
    },
    /// Acknowledge a dice roll before it is used
    Dice { faces: Vec<u32>, total: u32 },
    /// Deliver a verdict on an open event
    Event {
        category: EventCategory,
        title: String,
        description: String,
        has_fail: bool,
    },
}

/// An answer to a prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Response {
    Direction(Direction),
    Confirm(bool),
    Target(PlayerId),
    Acknowledged,
    Verdict(bool),
}

/// A request published by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRequest {
    pub id: RequestId,
    /// The player the decision belongs to
    pub player: PlayerId,
    pub prompt: Prompt,
}

impl Prompt {
    /// Checks that `response` is an acceptable answer.
    fn accepts(&self, response: &Response) -> bool {
        match (self, response) {
            (Prompt::Direction { options, .. }, Response::Direction(direction)) => {
                options.contains(direction)
            }
            (Prompt::Confirm { .. }, Response::Confirm(_)) => true,
            (Prompt::Target { candidates, .. }, Response::Target(target)) => {
                candidates.contains(target)
            }
            (Prompt::Dice { .. }, Response::Acknowledged) => true,
            (Prompt::Event { .. }, Response::Verdict(_)) => true,
            (Prompt::Event { has_fail: false, .. }, Response::Acknowledged) => true,
            _ => false,
        }
    }
}

struct Outstanding {
    request: PendingRequest,
    reply: oneshot::Sender<Response>,
}

type Slot = Arc<Mutex<Option<Outstanding>>>;

fn lock(slot: &Slot) -> BoardResult<MutexGuard<'_, Option<Outstanding>>> {
    slot.lock()
        .map_err(|_| BoardError::InvalidState("input gate lock poisoned".to_string()))
}

/// Creates a connected gate, handle and request receiver.
///
/// # Examples
///
/// ```
/// use boardwalk::{input_channel, Response};
///
/// let (_gate, handle, _requests) = input_channel();
/// // Nothing is outstanding yet, so resolving fails
/// assert!(handle.resolve(0, Response::Acknowledged).is_err());
/// ```
pub fn input_channel() -> (InputGate, GateHandle, mpsc::UnboundedReceiver<PendingRequest>) {
    let (outbox, requests) = mpsc::unbounded_channel();
    let slot: Slot = Arc::new(Mutex::new(None));
    let gate = InputGate {
        next_id: 0,
        slot: Arc::clone(&slot),
        outbox,
    };
    (gate, GateHandle { slot }, requests)
}

/// Engine side of the input channel.
#[derive(Debug)]
pub struct InputGate {
    next_id: RequestId,
    slot: Slot,
    outbox: mpsc::UnboundedSender<PendingRequest>,
}

impl std::fmt::Debug for Outstanding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Outstanding")
            .field("request", &self.request)
            .finish()
    }
}

impl InputGate {
    /// Publishes a prompt and waits for its answer.
    ///
    /// Fails with `InputClosed` if the request receiver is dropped before an answer
    /// arrives. The outstanding slot is cleared in that case.
    pub async fn request(&mut self, player: PlayerId, prompt: Prompt) -> BoardResult<Response> {
        let (reply, answer) = oneshot::channel();
        let request = PendingRequest {
            id: self.next_id,
            player,
            prompt,
        };

        {
            let mut slot = lock(&self.slot)?;
            if let Some(outstanding) = slot.as_ref() {
                return Err(BoardError::RequestOutstanding(outstanding.request.id));
            }
            *slot = Some(Outstanding {
                request: request.clone(),
                reply,
            });
        }
        self.next_id += 1;

        let request_id = request.id;
        log::debug!("Request {} for player {}: {:?}", request.id, player, request.prompt);
        if self.outbox.send(request).is_err() {
            lock(&self.slot)?.take();
            return Err(BoardError::InputClosed);
        }

        let outcome = tokio::select! {
            biased;
            answer = answer => answer.map_err(|_| BoardError::InputClosed),
            _ = self.outbox.closed() => Err(BoardError::InputClosed),
        };
        if outcome.is_err() {
            log::warn!("Input side closed while request {} was outstanding", request_id);
            lock(&self.slot)?.take();
        }
        outcome
    }

    pub async fn choose_direction(
        &mut self,
        player: PlayerId,
        options: Vec<Direction>,
    ) -> BoardResult<Direction> {
        let prompt = Prompt::Direction {
            text: "Choose a direction".to_string(),
            options,
        };
        match self.request(player, prompt).await? {
            Response::Direction(direction) => Ok(direction),
            other => Err(unexpected(other)),
        }
    }

    pub async fn confirm(&mut self, player: PlayerId, text: impl Into<String>) -> BoardResult<bool> {
        let prompt = Prompt::Confirm { text: text.into() };
        match self.request(player, prompt).await? {
            Response::Confirm(answer) => Ok(answer),
            other => Err(unexpected(other)),
        }
    }

    pub async fn choose_target(
        &mut self,
        player: PlayerId,
        text: impl Into<String>,
        candidates: Vec<PlayerId>,
    ) -> BoardResult<PlayerId> {
        let prompt = Prompt::Target {
            text: text.into(),
            candidates,
        };
        match self.request(player, prompt).await? {
            Response::Target(target) => Ok(target),
            other => Err(unexpected(other)),
        }
    }

    pub async fn acknowledge_dice(
        &mut self,
        player: PlayerId,
        faces: Vec<u32>,
        total: u32,
    ) -> BoardResult<()> {
        match self.request(player, Prompt::Dice { faces, total }).await? {
            Response::Acknowledged => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Asks for an event verdict. Events that cannot fail always succeed.
    pub async fn verdict(
        &mut self,
        player: PlayerId,
        category: EventCategory,
        title: &str,
        description: &str,
        has_fail: bool,
    ) -> BoardResult<bool> {
        let prompt = Prompt::Event {
            category,
            title: title.to_string(),
            description: description.to_string(),
            has_fail,
        };
        match self.request(player, prompt).await? {
            Response::Verdict(success) => Ok(success || !has_fail),
            Response::Acknowledged => Ok(true),
            other => Err(unexpected(other)),
        }
    }
}

fn unexpected(response: Response) -> BoardError {
    BoardError::InvalidResponse(format!("unexpected answer {:?}", response))
}

/// UI side of the input channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct GateHandle {
    slot: Slot,
}

impl GateHandle {
    /// The request currently waiting for an answer.
    pub fn pending(&self) -> BoardResult<Option<PendingRequest>> {
        Ok(lock(&self.slot)?
            .as_ref()
            .map(|outstanding| outstanding.request.clone()))
    }

    /// Answers the outstanding request `id`.
    ///
    /// Fails without consuming the request if `id` is not outstanding or the
    /// response does not fit the prompt. A request can be answered only once.
    pub fn resolve(&self, id: RequestId, response: Response) -> BoardResult<()> {
        let outstanding = {
            let mut slot = lock(&self.slot)?;
            match slot.as_ref() {
                Some(outstanding) if outstanding.request.id == id => {
                    if !outstanding.request.prompt.accepts(&response) {
                        return Err(BoardError::InvalidResponse(format!(
                            "{:?} does not answer {:?}",
                            response, outstanding.request.prompt
                        )));
                    }
                }
                _ => return Err(BoardError::NoPendingRequest(id)),
            }
            slot.take().ok_or(BoardError::NoPendingRequest(id))?
        };

        log::debug!("Request {} resolved with {:?}", id, response);
        outstanding
            .reply
            .send(response)
            .map_err(|_| BoardError::InputClosed)
    }
}
