//! Noughts - Unified CLI
//!
//! Serves games or plays one from the terminal.

#![warn(missing_docs)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Command};
use noughts_board::Marker;
use noughts_server::players::{FirstFree, Player, TerminalPlayer};
use noughts_server::{GameService, PlayerId, RestClient, SessionOutcome, Settings, SyncSession};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,noughts_server=debug")),
        )
        .init();

    let cli = Cli::parse();
    let settings = Settings::load_or_default(&cli.config)?;

    match cli.command {
        Command::Serve { host, port } => serve(settings.with_bind(host, port)).await,
        Command::Play {
            server_url,
            id,
            auto,
        } => play(settings.with_server_url(server_url), id, auto).await,
        Command::Reset { server_url } => {
            let settings = settings.with_server_url(server_url);
            RestClient::new(settings.server_url()).reset().await?;
            println!("Server state cleared.");
            Ok(())
        }
    }
}

/// Run the HTTP game server
#[instrument(skip_all, fields(host = %settings.host(), port = settings.port()))]
async fn serve(settings: Settings) -> Result<()> {
    let app = noughts_server::router(GameService::new());

    let listener = tokio::net::TcpListener::bind((settings.host().as_str(), *settings.port()))
        .await
        .with_context(|| format!("Failed to bind {}:{}", settings.host(), settings.port()))?;
    info!(
        "Server ready at http://{}:{}/",
        settings.host(),
        settings.port()
    );

    axum::serve(listener, app).await?;
    Ok(())
}

/// Join a game on a running server from this terminal
#[instrument(skip(settings))]
async fn play(settings: Settings, id: Option<String>, auto: bool) -> Result<()> {
    println!("Welcome to Tic-Tac-Toe!");
    let mut terminal = TerminalPlayer::new("you");
    let id = match id {
        Some(id) => PlayerId::new(id),
        None => PlayerId::from(terminal.ask_id().await?),
    };

    let transport = RestClient::new(settings.server_url());
    let outcome = if auto {
        run_session(id, transport, FirstFree::new("computer", Marker::X), &settings).await?
    } else {
        run_session(id, transport, terminal, &settings).await?
    };

    println!(
        "{}",
        match outcome {
            SessionOutcome::Won => "You won!",
            SessionOutcome::Lost => "You lost!",
            SessionOutcome::Draw => "It's a draw!",
            SessionOutcome::Rejected => "There already is a maximum number of players.",
        }
    );
    Ok(())
}

async fn run_session<P: Player>(
    id: PlayerId,
    transport: RestClient,
    player: P,
    settings: &Settings,
) -> Result<SessionOutcome> {
    let mut session = SyncSession::new(id, transport, player, settings.sync_settings());
    Ok(session.run().await?)
}
