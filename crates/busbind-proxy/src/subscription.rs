//! Per-object signal delivery.
//!
//! Each live subscription owns a forwarder task that moves matching bus
//! messages into a bounded delivery queue. Overflow policy: when the queue
//! is full the forwarder awaits until the consumer catches up
//! (block-producer); the zbus stream buffer, bounded to the same capacity,
//! is the transport-side backstop.

use futures_util::{Stream, StreamExt};
use tokio::sync::{mpsc, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use zbus::message::Message;
use zbus::names::{OwnedInterfaceName, OwnedMemberName};
use zbus::OwnedMatchRule;
use zvariant::{OwnedObjectPath, OwnedValue, Structure};

use crate::error::Result;
use crate::signals::ParseError;

/// Fixed capacity of every signal delivery queue.
pub const SIGNAL_QUEUE_CAPACITY: usize = 32;

/// One asynchronous notification as delivered by the transport.
#[derive(Debug, Clone)]
pub struct NotificationEvent {
    interface: Option<OwnedInterfaceName>,
    path: Option<OwnedObjectPath>,
    member: Option<OwnedMemberName>,
    message: Message,
}

impl NotificationEvent {
    pub(crate) fn from_message(message: Message) -> Self {
        let header = message.header();
        let interface = header.interface().cloned().map(Into::into);
        let path = header.path().cloned().map(Into::into);
        let member = header.member().cloned().map(Into::into);
        drop(header);
        Self {
            interface,
            path,
            member,
            message,
        }
    }

    /// The interface that emitted the signal.
    pub fn interface(&self) -> Option<&str> {
        self.interface.as_ref().map(|i| i.as_str())
    }

    /// The object path the signal originated from.
    pub fn path(&self) -> Option<&str> {
        self.path.as_ref().map(|p| p.as_str())
    }

    /// The signal member name.
    pub fn member(&self) -> Option<&str> {
        self.member.as_ref().map(|m| m.as_str())
    }

    /// The ordered, untyped signal body.
    pub fn args(&self) -> std::result::Result<Vec<OwnedValue>, ParseError> {
        let body = self.message.body();
        let fields: Structure<'_> = body.deserialize().map_err(ParseError::Body)?;
        fields
            .fields()
            .iter()
            .map(|value| {
                value
                    .try_to_owned()
                    .map_err(|e| ParseError::Body(e.into()))
            })
            .collect()
    }

    /// The raw bus message, for signal shapes this crate has no parser for.
    pub fn message(&self) -> &Message {
        &self.message
    }
}

/// A bounded queue of [`NotificationEvent`]s for one subscription.
///
/// Events arrive in transport order; nothing is promised relative to other
/// subscriptions or to concurrent method calls on the same object.
///
/// [`close`](Self::close) is idempotent: it stops the forwarder (dropping
/// the underlying message stream, which deregisters the match rule from the
/// bus) and unblocks a consumer waiting in [`next`](Self::next). Events
/// already buffered at close time are still delivered before `next` starts
/// returning `None`.
#[derive(Debug)]
pub struct SignalQueue {
    events: Mutex<mpsc::Receiver<NotificationEvent>>,
    shutdown: CancellationToken,
    rule: OwnedMatchRule,
}

impl SignalQueue {
    /// Starts a forwarder task moving messages from `stream` into a new
    /// bounded queue.
    pub(crate) fn spawn<S>(mut stream: S, rule: OwnedMatchRule) -> std::sync::Arc<Self>
    where
        S: Stream<Item = zbus::Result<Message>> + Send + Unpin + 'static,
    {
        let (tx, rx) = mpsc::channel(SIGNAL_QUEUE_CAPACITY);
        let shutdown = CancellationToken::new();
        let worker = shutdown.clone();

        tokio::spawn(async move {
            loop {
                let message = tokio::select! {
                    _ = worker.cancelled() => break,
                    next = stream.next() => match next {
                        Some(Ok(message)) => message,
                        Some(Err(error)) => {
                            debug!(%error, "dropping undecodable bus message");
                            continue;
                        }
                        None => break,
                    },
                };
                trace!(member = ?message.header().member(), "forwarding signal");
                let event = NotificationEvent::from_message(message);
                tokio::select! {
                    _ = worker.cancelled() => break,
                    sent = tx.send(event) => {
                        if sent.is_err() {
                            break;
                        }
                    }
                }
            }
        });

        std::sync::Arc::new(Self {
            events: Mutex::new(rx),
            shutdown,
            rule,
        })
    }

    /// Waits for the next notification.
    ///
    /// Returns `None` once the queue is closed (or the transport stream
    /// ended) and every buffered event has been consumed.
    pub async fn next(&self) -> Option<NotificationEvent> {
        self.events.lock().await.recv().await
    }

    /// Stops delivery. Idempotent; unblocks a waiting consumer.
    pub fn close(&self) {
        self.shutdown.cancel();
    }

    /// Whether [`close`](Self::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.shutdown.is_cancelled()
    }

    /// The match rule this queue was installed with.
    pub fn rule(&self) -> &OwnedMatchRule {
        &self.rule
    }
}

/// The one-live-subscription slot of a [`crate::RemoteObject`].
///
/// State machine: Unsubscribed -> Subscribed -> Unsubscribed, re-entrant.
/// The async mutex serializes concurrent transitions on one object.
#[derive(Debug, Default)]
pub(crate) struct SignalSlot {
    active: Mutex<Option<std::sync::Arc<SignalQueue>>>,
}

impl SignalSlot {
    /// Returns the live queue, or runs `install` to create one.
    ///
    /// Idempotent while a live queue exists: the same `Arc` is returned and
    /// no duplicate match rule is installed. A closed queue counts as
    /// unsubscribed and is replaced.
    pub async fn get_or_install<F, Fut>(&self, install: F) -> Result<std::sync::Arc<SignalQueue>>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<std::sync::Arc<SignalQueue>>>,
    {
        let mut active = self.active.lock().await;
        if let Some(queue) = active.as_ref() {
            if !queue.is_closed() {
                return Ok(queue.clone());
            }
        }
        let queue = install().await?;
        *active = Some(queue.clone());
        Ok(queue)
    }

    /// Clears the slot, returning the queue that was live, if any.
    pub async fn clear(&self) -> Option<std::sync::Arc<SignalQueue>> {
        self.active.lock().await.take()
    }
}
