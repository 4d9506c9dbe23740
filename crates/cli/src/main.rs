//! Forever CLI - admin role management and feed inspection.
//!
//! # Usage
//!
//! ```bash
//! # Make a signed-up user an admin
//! forever-cli admin grant --uid <uid>
//!
//! # Take the role away again
//! forever-cli admin revoke --uid <uid>
//!
//! # Print a feed as the site composes it
//! forever-cli feed tributes
//! ```
//!
//! # Commands
//!
//! - `admin grant|revoke` - Set `users/{uid}.admin`
//! - `feed tributes|stories|photos` - Print a composed feed

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "forever-cli")]
#[command(author, version, about = "Forever CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage admin roles
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
    /// Print a feed in display order
    Feed {
        #[command(subcommand)]
        kind: FeedKind,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Grant the admin role
    Grant {
        /// Firebase user ID
        #[arg(short, long)]
        uid: String,
    },
    /// Revoke the admin role
    Revoke {
        /// Firebase user ID
        #[arg(short, long)]
        uid: String,
    },
}

#[derive(Subcommand, Clone, Copy)]
enum FeedKind {
    /// Tributes, pinned first then newest first
    Tributes,
    /// Stories in store order
    Stories,
    /// Gallery photos in store order
    Photos,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Admin { action } => match action {
            AdminAction::Grant { uid } => commands::admin::set_role(&uid, true).await?,
            AdminAction::Revoke { uid } => commands::admin::set_role(&uid, false).await?,
        },
        Commands::Feed { kind } => match kind {
            FeedKind::Tributes => commands::feed::tributes().await?,
            FeedKind::Stories => commands::feed::stories().await?,
            FeedKind::Photos => commands::feed::photos().await?,
        },
    }
    Ok(())
}
