//! AgriChain Market CLI - exercise the client SDK from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List or search the catalog
//! agrichain products
//! agrichain products --search tomato
//!
//! # Cart operations (quantity is always the absolute new value)
//! agrichain cart --user 7 show
//! agrichain cart --user 7 add 42 --quantity 3
//! agrichain cart --user 7 set 42 --quantity 1
//! agrichain cart --user 7 remove 42
//!
//! # Traceability and chat
//! agrichain trace 42
//! agrichain chat --user 7 "when do tomatoes ship?"
//!
//! # Unread notification count
//! agrichain unread --user 7
//! ```
//!
//! Configuration comes from the environment (`AGRICHAIN_API_URL`,
//! `AGRICHAIN_TOKEN`, ...); see `agrichain_client::MarketConfig`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "agrichain")]
#[command(author, version, about = "AgriChain Market command-line client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List or search the product catalog
    Products {
        /// Full-text search query
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Cart operations for one user
    Cart {
        /// Acting user id
        #[arg(short, long)]
        user: i64,

        #[command(subcommand)]
        action: CartAction,
    },
    /// Print a product's blockchain trace
    Trace {
        /// Product id
        product: i64,
    },
    /// Send one chatbot message and print the reply
    Chat {
        /// Acting user id
        #[arg(short, long)]
        user: i64,

        /// Message text
        message: String,
    },
    /// Print the authoritative unread notification count
    Unread {
        /// Acting user id
        #[arg(short, long)]
        user: i64,
    },
}

#[derive(Subcommand)]
pub(crate) enum CartAction {
    /// Print the current cart snapshot
    Show,
    /// Add a product
    Add {
        /// Product id
        product: i64,
        /// Quantity to add at
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Set a line's quantity to an absolute value
    Set {
        /// Product id
        product: i64,
        /// New quantity
        #[arg(short, long)]
        quantity: u32,
    },
    /// Remove a product's line
    Remove {
        /// Product id
        product: i64,
    },
}

#[tokio::main]
async fn main() -> Result<(), commands::CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let client = commands::build_client()?;

    match cli.command {
        Commands::Products { search } => commands::products(&client, search.as_deref()).await,
        Commands::Cart { user, action } => commands::cart(&client, user, action).await,
        Commands::Trace { product } => commands::trace(&client, product).await,
        Commands::Chat { user, message } => commands::chat(&client, user, &message).await,
        Commands::Unread { user } => commands::unread(&client, user).await,
    }
}
