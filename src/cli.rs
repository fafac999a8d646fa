//! Command-line interface for pictionary.

use clap::{Parser, Subcommand};

/// Pictionary - guess the word behind an AI drawing
#[derive(Parser, Debug)]
#[command(name = "pictionary")]
#[command(about = "Word-guessing game server with AI-generated drawings", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Subcommand to run
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP game server
    Serve {
        /// Path to a TOML config file
        #[arg(short, long, default_value = "pictionary.toml")]
        config: std::path::PathBuf,

        /// Host to bind to (overrides config)
        #[arg(long)]
        host: Option<String>,

        /// Port to bind to (overrides config)
        #[arg(short, long)]
        port: Option<u16>,

        /// SQLite file, or `:memory:` for a process-local store (overrides config)
        #[arg(long)]
        database_url: Option<String>,
    },

    /// Play a game in the terminal against a running server
    Play {
        /// Game server URL
        #[arg(long, default_value = "http://127.0.0.1:3000")]
        server_url: String,
    },

    /// Print the word catalog
    Words,
}
