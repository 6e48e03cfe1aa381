use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::Identity;

/// What the provider currently believes. `Pending` only exists before the provider has
/// resolved its first answer, and is never delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Emission {
    Pending,
    Resolved(Option<Identity>),
}

#[derive(Debug)]
struct Registry {
    current: Emission,
    subscribers: Vec<mpsc::UnboundedSender<Option<Identity>>>,
}

/// Publishes "current identity changed" notifications.
///
/// Every subscriber receives the current identity as its first emission as soon as the
/// provider has resolved one, then one emission per change, in order. Each subscriber has
/// its own queue, so a quick sign-in then sign-out reaches it as two emissions. Publishing
/// an unchanged value does not wake anyone.
#[derive(Debug, Clone)]
pub struct IdentityNotifier {
    registry: Arc<Mutex<Registry>>,
}

impl Default for IdentityNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityNotifier {
    pub fn new() -> Self {
        Self {
            registry: Arc::new(Mutex::new(Registry {
                current: Emission::Pending,
                subscribers: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Registry> {
        self.registry
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn publish(&self, identity: Option<Identity>) {
        let mut registry = self.lock();
        let next = Emission::Resolved(identity.clone());
        if registry.current == next {
            return;
        }
        registry.current = next;
        // Subscribers whose receiving half is gone are pruned here.
        registry
            .subscribers
            .retain(|tx| tx.send(identity.clone()).is_ok());
    }

    /// `None` while unresolved, otherwise the last published identity (which may be absent).
    pub fn current(&self) -> Option<Option<Identity>> {
        match &self.lock().current {
            Emission::Pending => None,
            Emission::Resolved(identity) => Some(identity.clone()),
        }
    }

    pub fn subscribe(&self) -> IdentitySubscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut registry = self.lock();
        if let Emission::Resolved(identity) = &registry.current {
            let _ = tx.send(identity.clone());
        }
        registry.subscribers.push(tx);
        IdentitySubscription { rx }
    }

    /// Callback flavour of `subscribe`. The callback runs on a spawned task until the
    /// returned `Listener` is unsubscribed or dropped.
    pub fn listen<F>(&self, mut callback: F) -> Listener
    where
        F: FnMut(Option<Identity>) + Send + 'static,
    {
        let mut subscription = self.subscribe();
        let handle = tokio::spawn(async move {
            while let Some(identity) = subscription.next().await {
                callback(identity);
            }
        });
        Listener { handle }
    }
}

#[derive(Debug)]
pub struct IdentitySubscription {
    rx: mpsc::UnboundedReceiver<Option<Identity>>,
}

impl IdentitySubscription {
    /// Next emission. The first call returns immediately if the provider has already
    /// resolved. `None` once every handle to the notifier is gone.
    pub async fn next(&mut self) -> Option<Option<Identity>> {
        self.rx.recv().await
    }

    pub fn unsubscribe(self) {}
}

#[derive(Debug)]
pub struct Listener {
    handle: JoinHandle<()>,
}

impl Listener {
    pub fn unsubscribe(self) {}
}

impl Drop for Listener {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
