// SPDX-FileCopyrightText: 2026 Pushline Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Pushline demo host.
//!
//! Drives the delivery core from the command line. Every run opens the
//! durable store, performs one operation and prints the resulting SDK
//! events as JSON lines. Pending rows survive between runs; `retry` drains
//! them.

mod host;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use pushline::{
    MobileEventRequest, PushConfiguration, PushEventType, PushProvider, Pushline,
    PushlineError, PushlineSettings, SubscribeOptions,
};
use serde_json::{json, Value};
use tracing::info;

use crate::host::{StaticTokenProvider, StdoutSink};

/// Pushline demo host.
#[derive(Parser, Debug)]
#[command(name = "pushline-demo", version, about, long_about = None)]
struct Cli {
    /// Settings file to use instead of the default hierarchy.
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Override `storage.database_path`.
    #[arg(long, global = true)]
    database: Option<String>,

    /// Device token handed out by the push vendor.
    #[arg(long, global = true)]
    token: Option<String>,

    /// Push vendor the token belongs to.
    #[arg(long, global = true, default_value = "android-firebase")]
    provider: PushProvider,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the API configuration and register periodic retries.
    Init {
        #[arg(long)]
        api_url: String,
        /// Static resource token identifying the user.
        #[arg(long)]
        rtoken: Option<String>,
        /// Run delivery reports inside a foreground window.
        #[arg(long)]
        foreground: bool,
    },
    /// Subscribe the current user to push.
    Subscribe {
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        /// Subscription category; repeat for several.
        #[arg(long = "cat")]
        cats: Vec<String>,
    },
    /// Pause push delivery for the current user.
    Suspend,
    /// Unsubscribe the current user from push.
    Unsubscribe,
    /// Send a custom analytics event.
    Event {
        name: String,
        /// Stream identifier.
        #[arg(long)]
        sid: String,
        /// JSON payload.
        #[arg(long)]
        payload: Option<String>,
    },
    /// Report a delivery or an open of a push message.
    PushEvent {
        kind: ReportKind,
        message_uid: String,
    },
    /// Report the device token if it changed.
    Token,
    /// Download rich-notification content.
    Media { url: String },
    /// Run one retry pass for every kind.
    Retry,
    /// Wipe pending rows, configuration and the saved token.
    Clear,
    /// Print the effective settings as TOML.
    Settings,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ReportKind {
    Deliver,
    Open,
}

impl From<ReportKind> for PushEventType {
    fn from(kind: ReportKind) -> Self {
        match kind {
            ReportKind::Deliver => PushEventType::Delivery,
            ReportKind::Open => PushEventType::Open,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let loaded = match &cli.settings {
        Some(path) => pushline_config::load_and_validate_path(path),
        None => pushline_config::load_and_validate(),
    };
    let mut settings = match loaded {
        Ok(settings) => settings,
        Err(errors) => {
            pushline_config::render_errors(&errors);
            return ExitCode::FAILURE;
        }
    };
    if let Some(database) = cli.database.clone() {
        settings.storage.database_path = database;
    }
    if matches!(cli.command, Commands::Settings) {
        return match pushline_config::to_toml(&settings) {
            Ok(rendered) => {
                print!("{rendered}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                pushline_config::render_errors(&[e]);
                ExitCode::FAILURE
            }
        };
    }
    init_tracing(&settings.logging.level);

    let sink = Arc::new(StdoutSink::new());
    let sdk = match build(settings, &cli, sink.clone()).await {
        Ok(sdk) => sdk,
        Err(e) => {
            eprintln!("pushline-demo: {e}");
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run(&sdk, cli.command).await {
        eprintln!("pushline-demo: {e}");
        return ExitCode::FAILURE;
    }
    if sink.failed() {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

async fn build(
    settings: PushlineSettings,
    cli: &Cli,
    sink: Arc<StdoutSink>,
) -> Result<Pushline, PushlineError> {
    Pushline::builder()
        .settings(settings)
        .token_provider(Arc::new(StaticTokenProvider::new(
            cli.provider,
            cli.token.clone(),
        )))
        .event_sink(sink)
        .build()
        .await
}

async fn run(sdk: &Pushline, command: Commands) -> Result<(), PushlineError> {
    match command {
        Commands::Init {
            api_url,
            rtoken,
            foreground,
        } => {
            let mut config = PushConfiguration::new(api_url);
            config.r_token = rtoken;
            config.use_foreground_bridge = foreground;
            sdk.initialize(config).await
        }
        Commands::Subscribe { email, phone, cats } => {
            let mut options = SubscribeOptions::new();
            let mut fields = serde_json::Map::new();
            if let Some(email) = email {
                fields.insert("email".into(), Value::String(email));
            }
            if let Some(phone) = phone {
                fields.insert("phone".into(), Value::String(phone));
            }
            if !fields.is_empty() {
                options = options.profile_fields(Value::Object(fields));
            }
            if !cats.is_empty() {
                options = options.cats(cats);
            }
            sdk.push_subscribe(options).await
        }
        Commands::Suspend => sdk.push_suspend(SubscribeOptions::new()).await,
        Commands::Unsubscribe => sdk.push_unsubscribe(SubscribeOptions::new()).await,
        Commands::Event { name, sid, payload } => {
            let mut request = MobileEventRequest::new(name, sid);
            if let Some(payload) = payload {
                let value = serde_json::from_str(&payload)
                    .map_err(|e| PushlineError::Validation(format!("--payload: {e}")))?;
                request = request.payload(value);
            }
            sdk.send_mobile_event(request).await
        }
        Commands::PushEvent { kind, message_uid } => {
            sdk.report_push_event(kind.into(), &message_uid).await
        }
        Commands::Token => sdk.update_token().await,
        Commands::Media { url } => {
            if let Some(bytes) = sdk.load_notification_media(&url).await? {
                info!(url = %url, bytes = bytes.len(), "media downloaded");
            }
            Ok(())
        }
        Commands::Retry => {
            for (kind, summary) in sdk.retry_now().await? {
                println!(
                    "{}",
                    json!({
                        "kind": kind.to_string(),
                        "confirmed": summary.confirmed,
                        "rejected": summary.rejected,
                        "kept": summary.kept,
                        "dropped": summary.dropped,
                        "abandoned": summary.abandoned,
                        "expired": summary.expired,
                        "remaining": summary.remaining,
                    })
                );
            }
            Ok(())
        }
        Commands::Clear => sdk.clear().await,
        Commands::Settings => Ok(()),
    }
}

/// Logs go to stderr so stdout carries only events.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("pushline={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();
}
