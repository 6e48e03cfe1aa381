use anyhow::Context;
use clap::Parser;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use notewise::auth::{FirebaseIdentityProvider, IdentityProvider, InMemoryIdentityProvider};
use notewise::config::{ClientConfig, IdentityBackend};
use notewise::console::{self, Command, HELP};
use notewise::driver::{Driver, EVENT_CHANNEL_CAPACITY};
use notewise::kernel::{Event, Reactor, ReactorConfig};
use notewise::services::HttpSummarizer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("notewise=info"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let config = ClientConfig::parse();
    config.validate()?;
    tracing::info!(summarizer = %config.summarizer_url, identity = ?config.identity, "NoteWise starting");

    let identity: Arc<dyn IdentityProvider> = match config.identity {
        IdentityBackend::Memory => {
            let provider = InMemoryIdentityProvider::new();
            provider.start();
            Arc::new(provider)
        }
        IdentityBackend::Firebase => {
            let key = config
                .firebase_api_key
                .clone()
                .context("firebase api key missing")?;
            Arc::new(FirebaseIdentityProvider::new(key, config.request_timeout()))
        }
    };
    let summarizer = Arc::new(HttpSummarizer::new(
        config.summarizer_url.clone(),
        config.request_timeout(),
    ));

    let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
    let mut reactor = Reactor::new(rx, config.route, ReactorConfig::default());
    let driver = Driver::new(tx.clone(), identity, summarizer);
    let relay = driver.relay_identity();

    let shutdown = driver.shutdown_token();
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        println!("Type `help` for commands.");

        while let Ok(Some(line)) = lines.next_line().await {
            if line.trim().is_empty() {
                continue;
            }
            match console::parse_command(&line) {
                Ok(Command::Input(input)) => {
                    if tx.send(Event::Input(input)).await.is_err() {
                        break;
                    }
                }
                Ok(Command::Help) => println!("{}", HELP),
                Ok(Command::Quit) => break,
                Err(e) => println!("{}", e),
            }
        }
        shutdown.cancel();
    });

    driver
        .run(&mut reactor, |reactor| print!("{}", console::render(reactor)))
        .await;

    relay.abort();
    let snapshot = reactor.telemetry.snapshot();
    tracing::info!(
        summaries = snapshot.summary_stats.requested,
        auth_attempts = snapshot.auth_stats.attempts,
        discarded = snapshot.discard_stats.unmounted + snapshot.discard_stats.superseded,
        "NoteWise stopped"
    );
    Ok(())
}
