//! Command-line interface for noughts.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Noughts - two-player tic-tac-toe over HTTP
#[derive(Parser, Debug)]
#[command(name = "noughts")]
#[command(about = "Turn-arbitrated tic-tac-toe server and terminal client", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Settings file (TOML); missing file means defaults
    #[arg(short, long, global = true, default_value = noughts_server::DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the game server
    Serve {
        /// Host to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Join a game from this terminal
    Play {
        /// Game server URL
        #[arg(long)]
        server_url: Option<String>,

        /// Identifier to register with; prompted for when omitted
        #[arg(long)]
        id: Option<String>,

        /// Let the computer pick tiles instead of prompting
        #[arg(long)]
        auto: bool,
    },

    /// Clear all state on a running server
    Reset {
        /// Game server URL
        #[arg(long)]
        server_url: Option<String>,
    },
}
