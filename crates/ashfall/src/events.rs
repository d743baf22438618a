//! # Collision Events
//!
//! The collision callback runs inside the collision pass with both entities
//! borrowed. Consumers that want to react later (sound, damage, UI) read
//! [`CollisionEvent`]s from a bounded channel instead.
//!
//! ```text
//! CollisionSystem ──callback──> CollisionEventSender ──channel──> CollisionEventReceiver
//! ```
//!
//! Sending never blocks. When the channel is full the event is dropped and
//! counted; the frame keeps its budget.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use ashfall_core::{Collider, Entity, EntityId};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};

/// How a colliding pair was handled.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CollisionKind {
    /// At least one side is a trigger or non-solid; nothing was pushed.
    Trigger,
    /// Both sides are solid; the pair was separated.
    Blocking,
}

impl CollisionKind {
    /// Classifies a colliding pair.
    #[must_use]
    pub fn classify(a: &Entity, b: &Entity) -> Self {
        let blocking = |e: &Entity| e.get::<Collider>().is_some_and(Collider::is_blocking);
        if blocking(a) && blocking(b) {
            CollisionKind::Blocking
        } else {
            CollisionKind::Trigger
        }
    }
}

/// One colliding pair from one collision pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Lower id of the pair.
    pub a: EntityId,
    /// Higher id of the pair.
    pub b: EntityId,
    /// Trigger or blocking.
    pub kind: CollisionKind,
    /// World frame the pass ran in.
    pub frame: u64,
}

/// Bounded channel of collision events.
pub struct CollisionEventBus {
    sender: Sender<CollisionEvent>,
    receiver: Receiver<CollisionEvent>,
    dropped: Arc<AtomicU64>,
}

impl CollisionEventBus {
    /// Creates a bus holding at most `capacity` undelivered events.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);
        Self {
            sender,
            receiver,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a sender handle (clone for multiple producers).
    #[must_use]
    pub fn sender(&self) -> CollisionEventSender {
        CollisionEventSender {
            sender: self.sender.clone(),
            dropped: Arc::clone(&self.dropped),
        }
    }

    /// Creates a receiver handle (clone for multiple consumers).
    #[must_use]
    pub fn receiver(&self) -> CollisionEventReceiver {
        CollisionEventReceiver {
            receiver: self.receiver.clone(),
        }
    }

    /// Events dropped because the channel was full.
    #[must_use]
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

/// Handle for publishing events.
#[derive(Clone)]
pub struct CollisionEventSender {
    sender: Sender<CollisionEvent>,
    dropped: Arc<AtomicU64>,
}

impl CollisionEventSender {
    /// Publishes an event without blocking.
    ///
    /// Returns `false` if the channel is full or every receiver is gone; the
    /// event is dropped.
    #[inline]
    pub fn send(&self, event: CollisionEvent) -> bool {
        match self.sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_) | TrySendError::Disconnected(_)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                false
            }
        }
    }
}

/// Handle for consuming events.
#[derive(Clone)]
pub struct CollisionEventReceiver {
    receiver: Receiver<CollisionEvent>,
}

impl CollisionEventReceiver {
    /// Takes every pending event.
    pub fn drain(&self) -> Vec<CollisionEvent> {
        self.receiver.try_iter().collect()
    }

    /// Takes one pending event.
    pub fn try_recv(&self) -> Option<CollisionEvent> {
        self.receiver.try_recv().ok()
    }

    /// Number of pending events.
    #[must_use]
    pub fn pending_count(&self) -> usize {
        self.receiver.len()
    }
}
