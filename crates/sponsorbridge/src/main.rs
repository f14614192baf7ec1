//! `SponsorBridge` - command-line inbox
//!
//! Logs in against the `SponsorBridge` backend, lists conversations with
//! unread counts, shows threads, sends messages and handles notifications.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod settings;
mod view;

use std::io::BufRead;

use anyhow::{Context, bail};
use clap::Parser;
use sponsorbridge_client::ApiClient;
use sponsorbridge_core::{NotificationId, SessionStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Command};
use settings::{AppSettings, config_dir, load_settings, save_settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "sponsorbridge=info,sponsorbridge_client=info,sponsorbridge_core=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let dir = config_dir();
    let settings = load_settings(&dir).await?;
    let api_url = settings.resolve_api_url(cli.api_url.as_deref());
    let store = SessionStore::new(&dir);

    info!("Using backend {api_url}");
    let client = ApiClient::new(&api_url).with_context(|| format!("invalid API URL {api_url}"))?;

    // A 401 on login means bad credentials, not an expired session.
    let uses_session = !matches!(cli.command, Command::Login { .. });
    run(cli.command, client, &store, settings)
        .await
        .map_err(|e| {
            let rejected = e
                .downcast_ref::<sponsorbridge_client::Error>()
                .is_some_and(sponsorbridge_client::Error::is_unauthorized);
            if uses_session && rejected {
                e.context("session rejected; run `sponsorbridge login <email>` again")
            } else {
                e
            }
        })
}

/// Executes one command.
async fn run(
    command: Command,
    client: ApiClient,
    store: &SessionStore,
    settings: AppSettings,
) -> anyhow::Result<()> {
    match command {
        Command::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => read_password()?,
            };
            let session = client.login(&email, &password).await?;
            let name = session
                .user
                .as_ref()
                .map_or_else(|| session.user_id.to_string(), sponsorbridge_core::UserRef::display_name);
            store.save(&session)?;
            match session.role {
                Some(role) => println!("Logged in as {name} ({})", role.display_name()),
                None => println!("Logged in as {name}"),
            }
        }
        Command::Logout => {
            store.clear()?;
            println!("Logged out");
        }
        Command::Config { url } => {
            ApiClient::new(&url).with_context(|| format!("invalid API URL {url}"))?;
            let mut settings = settings;
            settings.api_url = Some(url);
            save_settings(store.dir(), &settings).await?;
            println!("Saved backend URL");
        }
        Command::Conversations { json } => {
            let client = authenticated(client, store)?;
            let list = client.load_conversations().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else {
                print!("{}", view::render_conversations(&list));
            }
        }
        Command::Thread { user_id } => {
            let client = authenticated(client, store)?;
            let messages = client.conversation(user_id).await?;
            let current_user = client
                .session()
                .map(|s| s.user_id)
                .context("session missing")?;
            print!("{}", view::render_thread(&messages, current_user));
        }
        Command::Send { user_id, content } => {
            let client = authenticated(client, store)?;
            let list = client
                .send_and_refresh(user_id, &content.join(" "))
                .await?;
            println!("Message sent");
            print!("{}", view::render_conversations(&list));
        }
        Command::Reply {
            message_id,
            content,
        } => {
            let client = authenticated(client, store)?;
            let recipient = client
                .reply_to(message_id, &content.join(" "))
                .await?;
            println!("Reply sent to {}", recipient.display_name());
        }
        Command::Notifications => {
            let client = authenticated(client, store)?;
            let list = client.notifications().await?;
            print!("{}", view::render_notifications(&list));
        }
        Command::ReadNotification { id } => {
            let client = authenticated(client, store)?;
            client.mark_notification_read(NotificationId(id)).await?;
            println!("Notification {id} marked as read");
        }
    }
    Ok(())
}

/// Attaches the saved session, failing if there is none.
fn authenticated(client: ApiClient, store: &SessionStore) -> anyhow::Result<ApiClient> {
    let Some(session) = store.load()? else {
        bail!("not logged in; run `sponsorbridge login <email>` first");
    };
    Ok(client.with_session(session))
}

/// Reads a password line from stdin.
fn read_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password from stdin")?;
    let password = line.trim_end_matches(['\r', '\n']).to_string();
    if password.is_empty() {
        bail!("no password given");
    }
    Ok(password)
}
