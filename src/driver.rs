use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::auth::IdentityProvider;
use crate::kernel::{Event, Reactor, SideEffect};
use crate::services::Summarizer;

pub const EVENT_CHANNEL_CAPACITY: usize = 100;

/// Executes the reactor's side effects against the real collaborators and feeds every
/// completion back into the reactor's channel. Owns no view state.
#[derive(Clone)]
pub struct Driver {
    tx: mpsc::Sender<Event>,
    identity: Arc<dyn IdentityProvider>,
    summarizer: Arc<dyn Summarizer>,
    shutdown: CancellationToken,
}

impl Driver {
    pub fn new(
        tx: mpsc::Sender<Event>,
        identity: Arc<dyn IdentityProvider>,
        summarizer: Arc<dyn Summarizer>,
    ) -> Self {
        Self {
            tx,
            identity,
            summarizer,
            shutdown: CancellationToken::new(),
        }
    }

    pub fn sender(&self) -> mpsc::Sender<Event> {
        self.tx.clone()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub fn shutdown(&self) {
        self.shutdown.cancel();
    }

    /// Forwards every identity emission into the reactor until shutdown.
    pub fn relay_identity(&self) -> JoinHandle<()> {
        let mut subscription = self.identity.notifier().subscribe();
        let tx = self.tx.clone();
        let shutdown = self.shutdown.clone();

        tokio::spawn(async move {
            loop {
                let identity = tokio::select! {
                    _ = shutdown.cancelled() => break,
                    next = subscription.next() => match next {
                        Some(identity) => identity,
                        None => break,
                    },
                };
                debug!(present = identity.is_some(), "Identity emission relayed");
                if tx.send(Event::IdentityChanged(identity)).await.is_err() {
                    break;
                }
            }
            subscription.unsubscribe();
        })
    }

    pub fn execute(&self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Authenticate { mount, attempt } => {
                    let provider = self.identity.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = attempt.run(provider.as_ref()).await;
                        if let Err(err) = &outcome {
                            warn!(mode = ?attempt.mode, code = %err.code, "Identity provider call failed");
                        }
                        let _ = tx.send(Event::AuthSettled { mount, outcome }).await;
                    });
                }
                SideEffect::RequestSummary { mount, request } => {
                    let summarizer = self.summarizer.clone();
                    let tx = self.tx.clone();
                    tokio::spawn(async move {
                        let outcome = summarizer.summarize(&request.text).await;
                        let _ = tx
                            .send(Event::SummarySettled {
                                mount,
                                seq: request.seq,
                                outcome,
                            })
                            .await;
                    });
                }
                SideEffect::SignOut => {
                    let provider = self.identity.clone();
                    tokio::spawn(async move {
                        if let Err(err) = provider.sign_out().await {
                            warn!(code = %err.code, "Sign-out failed");
                        }
                    });
                }
            }
        }
    }

    /// Event loop: one event at a time, effects dispatched immediately, `render` called
    /// after every step. Returns on shutdown or when every sender is gone.
    pub async fn run<F>(&self, reactor: &mut Reactor, mut render: F)
    where
        F: FnMut(&Reactor),
    {
        info!("Client loop started");
        render(reactor);

        loop {
            let event = tokio::select! {
                _ = self.shutdown.cancelled() => break,
                event = reactor.receiver.recv() => match event {
                    Some(event) => event,
                    None => break,
                },
            };
            let effects = reactor.step(event);
            self.execute(effects);
            render(reactor);
        }

        info!("Client loop stopped");
    }
}
