use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};
use serde_json::{json, Value};
use tracing::error;

use soulseer_client::config::{load_config, print_schema};
use soulseer_client::error::ClientError;
use soulseer_client::pages::load_cms_page;
use soulseer_client::startup::build_state;
use soulseer_client::state::AppState;
use soulseer_client::store::AUTH_TOKEN_KEY;
use soulseer_client::utils::logger::init_logging;

#[derive(Parser)]
#[command(name = "soulseer", version, about = "Command-line client for the SoulSeer backend")]
struct Cli {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "./config.yaml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the configuration JSON schema.
    Schema,
    /// Print the bearer token the client would send.
    Token,
    /// Save a session token in the credential store.
    Login { token: String },
    /// Remove the saved session token.
    Logout,
    /// Fetch a CMS page.
    Page { slug: String },
    /// Show the payment provider mode.
    Payments,
    #[command(subcommand)]
    Notifications(NotificationCommand),
}

#[derive(Subcommand)]
enum NotificationCommand {
    /// Fetch the notification list.
    List,
    /// Mark one notification as read.
    Read { id: i64 },
    /// Mark every notification as read.
    ReadAll,
    /// Request notification permission and subscribe to push.
    Enable,
    /// Register the push subscription with the backend.
    Subscribe,
    /// Show an in-app toast and refresh the list.
    Toast {
        title: String,
        message: String,
        #[arg(long)]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Schema = cli.command {
        return match print_schema() {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error rendering schema: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = Arc::new(load_config(&cli.config));
    if let Err(e) = init_logging(&config.logging) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    let state = match build_state(config) {
        Ok(state) => state,
        Err(e) => {
            error!("Failed to initialize client: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match run(cli.command, &state).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command, state: &AppState) -> Result<Value, ClientError> {
    match command {
        Command::Schema => Ok(Value::Null),
        Command::Token => Ok(json!({ "token": state.api.current_token().await })),
        Command::Login { token } => {
            state
                .store
                .set(AUTH_TOKEN_KEY, &token)
                .await
                .map_err(ClientError::Store)?;
            Ok(json!({ "ok": true }))
        }
        Command::Logout => {
            state
                .store
                .remove(AUTH_TOKEN_KEY)
                .await
                .map_err(ClientError::Store)?;
            Ok(json!({ "ok": true }))
        }
        Command::Page { slug } => {
            let page = load_cms_page(&state.api, &slug).await?;
            Ok(json!(page))
        }
        Command::Payments => match state.payments.get().await {
            Some(sdk) => Ok(json!({ "available": true, "mode": sdk.mode() })),
            None => Ok(json!({ "available": false })),
        },
        Command::Notifications(command) => run_notifications(command, state).await,
    }
}

async fn run_notifications(
    command: NotificationCommand,
    state: &AppState,
) -> Result<Value, ClientError> {
    let store = &state.notifications;
    match command {
        NotificationCommand::List => {
            store.load_notifications().await?;
        }
        NotificationCommand::Read { id } => {
            store.load_notifications().await?;
            store.mark_as_read(id).await?;
        }
        NotificationCommand::ReadAll => {
            store.load_notifications().await?;
            store.mark_all_as_read().await?;
        }
        NotificationCommand::Enable => {
            let granted = store.request_permission().await;
            return Ok(json!({ "granted": granted, "permission": store.snapshot().permission }));
        }
        NotificationCommand::Subscribe => {
            let outcome = store.subscribe_to_push().await?;
            return Ok(json!({ "outcome": outcome }));
        }
        NotificationCommand::Toast {
            title,
            message,
            url,
        } => {
            let id = store.show_in_app(&title, &message, url.as_deref());
            // Stay alive long enough for the dismissal and the background refresh.
            let linger = Duration::from_millis(state.config.toast.dismiss_after_ms + 100);
            tokio::time::sleep(linger).await;
            return Ok(json!({ "toast_id": id, "state": store.snapshot() }));
        }
    }
    Ok(json!(store.snapshot()))
}
