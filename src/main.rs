use aerogramme::application::classifier::ModelClassifier;
use aerogramme::application::engine::{ConversationEngine, EnginePorts, EngineSettings};
use aerogramme::config::Config;
use aerogramme::domain::ports::{SessionStoreBox, SharedClock, SharedLanguageModel, SharedOrderLedger};
use aerogramme::infrastructure::assets::LocaleImages;
use aerogramme::infrastructure::clock::SystemClock;
use aerogramme::infrastructure::in_memory::InMemorySessionStore;
use aerogramme::infrastructure::openai::OpenAiModel;
use aerogramme::infrastructure::sheets::SheetLedger;
use aerogramme::infrastructure::stripe::StripePaymentLinks;
use aerogramme::interfaces::console::{self, ConsoleMessenger};
use aerogramme::interfaces::webhook::{self, WebhookState};
use chrono::TimeDelta;
use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Postcard ordering chat bot", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Chat with the bot from the terminal, one message per line
    Chat {
        /// Sender id for every message
        #[arg(long, default_value = "console")]
        user: String,

        /// Directory holding the per-language introduction pictures
        #[arg(long, default_value = "images")]
        images_dir: PathBuf,

        /// Forget sessions idle for this many minutes (default: never)
        #[arg(long)]
        idle_ttl_minutes: Option<i64>,
    },
    /// Receive Stripe payment events
    Webhook {
        /// Listen port, overriding WEBHOOK_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr; stdout is the chat transcript
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env().into_diagnostic()?;
    let clock: SharedClock = Arc::new(SystemClock);
    let ledger: SharedOrderLedger = Arc::new(SheetLedger::new(config.sheetbest_api_url.clone()));

    match cli.command {
        Command::Chat {
            user,
            images_dir,
            idle_ttl_minutes,
        } => {
            let sessions: SessionStoreBox = match idle_ttl_minutes {
                Some(minutes) => {
                    let ttl = TimeDelta::try_minutes(minutes)
                        .filter(|ttl| *ttl > TimeDelta::zero())
                        .ok_or_else(|| miette::miette!("--idle-ttl-minutes must be a positive number of minutes"))?;
                    let store = InMemorySessionStore::with_idle_ttl(ttl, clock.clone());
                    spawn_sweeper(store.clone(), ttl);
                    Box::new(store)
                }
                None => Box::new(InMemorySessionStore::new()),
            };
            let model: SharedLanguageModel = Arc::new(OpenAiModel::new(config.openai_api_key.clone()));
            let ports = EnginePorts {
                sessions,
                classifier: Box::new(ModelClassifier::new(model.clone())),
                model,
                messenger: Box::new(ConsoleMessenger::stdout()),
                payments: Box::new(StripePaymentLinks::new(config.stripe_secret_key.clone())),
                ledger,
                images: Box::new(LocaleImages::new(images_dir)),
                clock: clock.clone(),
            };
            let settings = EngineSettings {
                currency: config.currency.clone(),
                unit_amount: config.postcard_price,
                ..EngineSettings::default()
            };
            let engine = ConversationEngine::new(ports, settings);
            info!(
                user = %user,
                price = %config.unit_price(),
                currency = %config.currency,
                "chat ready, say \"bonjour\" to begin"
            );

            let stdin = BufReader::new(tokio::io::stdin());
            console::run(&engine, &user, &clock, stdin)
                .await
                .into_diagnostic()?;
        }
        Command::Webhook { port } => {
            let secret = config.require_webhook_secret().into_diagnostic()?.to_string();
            let state = WebhookState {
                secret,
                ledger,
                clock,
            };
            webhook::serve(port.unwrap_or(config.webhook_port), state)
                .await
                .into_diagnostic()?;
        }
    }

    Ok(())
}

/// Drops idle sessions in the background, checking once per TTL.
fn spawn_sweeper(store: InMemorySessionStore, ttl: TimeDelta) {
    let period = ttl.to_std().unwrap_or(Duration::from_secs(60));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            store.evict_idle().await;
        }
    });
}
