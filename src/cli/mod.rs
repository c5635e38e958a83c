//! Command-line interface for the ideaforge server binary.

use clap::{Parser, Subcommand};

/// Ideaforge - AI-assisted idea expansion service
#[derive(Parser)]
#[command(name = "ideaforge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API server
    #[command(alias = "run")]
    Serve,

    /// Create a default config file
    #[command(alias = "--init")]
    Init,

    /// Create an admin account
    CreateAdmin {
        /// Email address for the new admin
        #[arg(long)]
        email: String,

        /// Display name for the new admin
        #[arg(long)]
        name: String,

        /// Password for the new admin
        #[arg(long)]
        password: String,
    },

    /// Send a one-token probe to the completion service
    TestCompletion,
}
