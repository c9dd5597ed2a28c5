//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus is transport-agnostic and gives **at-least-once** delivery: a
//! publisher that retries after a failed publish may deliver twice, so
//! consumers must tolerate duplicates.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// Each subscription receives a copy of every message published after it was
/// created (broadcast semantics). Meant to be drained by a single consumer.
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Block until the next message is available.
    pub fn recv(&self) -> Result<M, std::sync::mpsc::RecvError> {
        self.receiver.recv()
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain every message that is already queued.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// ```text
/// write → commit → EventBus::publish → subscribers (mailers, audit, ...)
/// ```
///
/// `publish()` can fail; the caller decides whether to surface or retry. The
/// write is already committed at that point, so a retry only repeats the
/// notification.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
