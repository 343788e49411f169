use anyhow::Context;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use ragchat_client::ClientFactory;
use ragchat_session::{ConversationSession, SessionUpdate, StreamOutcome};
use ragchat_types::ChatModelConfig;

mod commands;
mod config;
mod render;

use commands::{Command, HELP};
use config::{Config, LoggingConfig};
use render::Renderer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    init_logging(&config.logging);

    tracing::info!("Starting ragchat against {}", config.server.base_url);

    let backend = ClientFactory::create_backend(config.client_config())
        .context("Failed to create chat backend")?;
    let session = ConversationSession::new(backend);

    if let Err(e) = session.refresh_conversations().await {
        tracing::warn!("Failed to load conversations: {}", e);
    }

    println!("{}\n", HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            break;
        };

        match Command::parse(&line) {
            Command::Empty => {}
            Command::Quit => break,
            Command::Help => println!("{}", HELP),
            Command::Invalid(message) => eprintln!("{}", message),
            Command::Send(text) => stream_answer(&session, &text, &config.chat).await?,
            Command::New => match session.new_conversation() {
                Ok(()) => println!("Started a new conversation"),
                Err(e) => eprintln!("error: {}", e),
            },
            Command::List => list_conversations(&session).await,
            Command::Switch(id) => match session.switch_conversation(Some(id)).await {
                Ok(()) => {
                    for message in session.messages() {
                        println!("{}\n", render::history_entry(&message));
                    }
                }
                Err(e) => eprintln!("error: {}", e),
            },
            Command::Delete(id) => match session.delete_conversation(&id).await {
                Ok(()) => println!("Deleted {}", id),
                Err(e) => eprintln!("error: {}", e),
            },
            Command::Rename { id, title } => match session.rename_conversation(&id, &title).await {
                Ok(()) => println!("Renamed {} to {}", id, title),
                Err(e) => eprintln!("error: {}", e),
            },
        }
    }

    session.stop();
    Ok(())
}

async fn stream_answer(
    session: &ConversationSession,
    text: &str,
    chat: &ChatModelConfig,
) -> anyhow::Result<()> {
    let mut handle = match session.send(text, chat).await {
        Ok(handle) => handle,
        Err(e) => {
            eprintln!("error: {}", e);
            return Ok(());
        }
    };

    let mut stdout = std::io::stdout();
    let mut renderer = Renderer::default();
    let mut last = None;
    let mut notices = Vec::new();

    loop {
        let update = tokio::select! {
            update = handle.next_update() => update,
            _ = tokio::signal::ctrl_c() => {
                if handle.cancel() {
                    tracing::debug!("Stream stopped by user");
                }
                continue;
            }
        };

        match update {
            Some(SessionUpdate::MessageUpdated(message)) => {
                write!(stdout, "{}", renderer.update(&message))?;
                stdout.flush()?;
                last = Some(message);
            }
            Some(SessionUpdate::Notice(message)) => notices.push(message),
            Some(SessionUpdate::Finished(outcome)) => {
                write!(stdout, "{}", renderer.finish(last.as_ref()))?;
                stdout.flush()?;
                match outcome {
                    StreamOutcome::Finalized | StreamOutcome::Errored(_) => {}
                    StreamOutcome::Cancelled => eprintln!("[stopped]"),
                    StreamOutcome::TransportFailed(message) => {
                        eprintln!("connection lost: {}", message)
                    }
                }
            }
            None => break,
        }
    }

    for notice in notices {
        eprintln!("! {}", notice);
    }
    Ok(())
}

async fn list_conversations(session: &ConversationSession) {
    match session.refresh_conversations().await {
        Ok(conversations) if conversations.is_empty() => println!("No conversations yet"),
        Ok(conversations) => {
            let active = session.start_conversation();
            for conversation in conversations {
                let marker = if active.as_deref() == Some(conversation.id.as_str()) {
                    "*"
                } else {
                    " "
                };
                println!("{} {}  {}", marker, conversation.id, conversation.title);
            }
        }
        Err(e) => eprintln!("error: {}", e),
    }
}

fn init_logging(config: &LoggingConfig) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let registry = tracing_subscriber::registry().with(env_filter);

    // stdout belongs to the conversation
    match config.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }
}
