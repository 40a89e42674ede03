//! Shared client-side state, handed to consumers explicitly.
//!
//! Three providers are composed in a fixed order: identity (outermost),
//! counter, messaging (innermost). An inner provider may hold a handle to an
//! outer one; messaging reads identity to stamp message authors. Consumers
//! take whichever providers they need as plain parameters and can
//! [`subscribe`](IdentityProvider::subscribe) to observe changes.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::db::Identity;

#[derive(Clone)]
pub struct IdentityProvider {
    tx: Arc<watch::Sender<Option<Identity>>>,
}

impl IdentityProvider {
    pub fn new(initial: Option<Identity>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn sign_in(&self, identity: Identity) {
        debug!(user_id = identity.user_id, "identity signed in");
        self.tx.send_replace(Some(identity));
    }

    pub fn sign_out(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

#[derive(Clone)]
pub struct CounterProvider {
    tx: Arc<watch::Sender<u64>>,
}

impl CounterProvider {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(0);
        Self { tx: Arc::new(tx) }
    }

    pub fn value(&self) -> u64 {
        *self.tx.borrow()
    }

    /// Returns the value after the update.
    pub fn increment(&self) -> u64 {
        self.update(|v| v.saturating_add(1))
    }

    /// Saturates at zero.
    pub fn decrement(&self) -> u64 {
        self.update(|v| v.saturating_sub(1))
    }

    pub fn reset(&self) {
        self.tx.send_replace(0);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.tx.subscribe()
    }

    fn update(&self, f: impl FnOnce(u64) -> u64) -> u64 {
        let mut next = 0;
        self.tx.send_modify(|v| {
            *v = f(*v);
            next = *v;
        });
        next
    }
}

impl Default for CounterProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    /// Email of the identity signed in when the message was posted.
    pub author: Option<String>,
    pub text: String,
}

#[derive(Clone)]
pub struct MessagingProvider {
    identity: IdentityProvider,
    tx: Arc<watch::Sender<Vec<Message>>>,
    next_id: Arc<AtomicU64>,
}

impl MessagingProvider {
    pub fn new(identity: IdentityProvider) -> Self {
        let (tx, _rx) = watch::channel(Vec::new());
        Self {
            identity,
            tx: Arc::new(tx),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    pub fn post(&self, text: impl Into<String>) -> Message {
        let message = Message {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            author: self.identity.current().map(|i| i.email),
            text: text.into(),
        };
        self.tx.send_modify(|messages| messages.push(message.clone()));
        message
    }

    pub fn messages(&self) -> Vec<Message> {
        self.tx.borrow().clone()
    }

    /// Returns whether a message with `id` was present.
    pub fn dismiss(&self, id: u64) -> bool {
        let mut removed = false;
        self.tx.send_if_modified(|messages| {
            let before = messages.len();
            messages.retain(|m| m.id != id);
            removed = messages.len() != before;
            removed
        });
        removed
    }

    pub fn clear(&self) {
        self.tx.send_replace(Vec::new());
    }

    pub fn subscribe(&self) -> watch::Receiver<Vec<Message>> {
        self.tx.subscribe()
    }
}

/// The composed provider stack.
#[derive(Clone)]
pub struct Providers {
    pub identity: IdentityProvider,
    pub counter: CounterProvider,
    pub messaging: MessagingProvider,
}

impl Providers {
    pub fn compose(initial_identity: Option<Identity>) -> Self {
        let identity = IdentityProvider::new(initial_identity);
        let counter = CounterProvider::new();
        let messaging = MessagingProvider::new(identity.clone());
        Self {
            identity,
            counter,
            messaging,
        }
    }
}
