//! Command implementations.
//!
//! Each command builds on the [`agrichain_client`] SDK, performs the network
//! work, and prints a plain-text result. Output goes to stdout; diagnostics
//! go through `tracing`.

use thiserror::Error;

use agrichain_client::{ApiError, ConfigError, MarketClient, MarketConfig};
use agrichain_core::{ProductId, UserId};

use crate::CartAction;

/// Errors a command can surface to the shell.
#[derive(Debug, Error)]
pub enum CliError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to open local data directory: {0}")]
    Store(#[from] std::io::Error),

    #[error("{0}")]
    Api(#[from] ApiError),
}

/// Build a client from the environment.
///
/// # Errors
///
/// Configuration parse failures and local-store setup failures.
pub fn build_client() -> Result<MarketClient, CliError> {
    let config = MarketConfig::from_env()?;
    Ok(MarketClient::new(config)?)
}

/// List the catalog, or search it when a query is given.
#[allow(clippy::print_stdout)]
pub async fn products(client: &MarketClient, search: Option<&str>) -> Result<(), CliError> {
    let products = match search {
        Some(query) => client.catalog().search(query).await?,
        None => client.catalog().products().await?,
    };

    if products.is_empty() {
        println!("no products found");
        return Ok(());
    }
    for product in products {
        let price = product.sale_price.unwrap_or(product.price);
        println!(
            "{:>6}  {:<32} {:>10}  stock {}",
            product.id, product.name, price, product.stock
        );
    }
    Ok(())
}

/// Run one cart action and print the resulting snapshot.
#[allow(clippy::print_stdout)]
pub async fn cart(client: &MarketClient, user: i64, action: CartAction) -> Result<(), CliError> {
    let user = UserId::new(user);
    let snapshot = match action {
        CartAction::Show => client.cart().refresh(user).await?,
        CartAction::Add { product, quantity } => {
            client
                .cart()
                .add_item(user, ProductId::new(product), quantity)
                .await?
        }
        CartAction::Set { product, quantity } => {
            client
                .cart()
                .update_item(user, ProductId::new(product), quantity)
                .await?
        }
        CartAction::Remove { product } => {
            client.cart().remove_item(user, ProductId::new(product)).await?
        }
    };

    if snapshot.is_empty() {
        println!("cart is empty");
        return Ok(());
    }
    for line in &snapshot.lines {
        println!(
            "{:>6}  x{:<4} @ {:>10}  = {}",
            line.product_id,
            line.quantity,
            line.effective_price(),
            line.line_total()
        );
    }
    println!("total: {}", snapshot.total());
    Ok(())
}

/// Print a product's supply-chain trace, oldest entry first.
#[allow(clippy::print_stdout)]
pub async fn trace(client: &MarketClient, product: i64) -> Result<(), CliError> {
    let records = client.trace().trace(ProductId::new(product)).await?;
    if records.is_empty() {
        println!("no trace records for product {product}");
        return Ok(());
    }
    for record in records {
        println!(
            "{}  {:<12} {:<20} {}  tx {}",
            record.recorded_at,
            record.stage,
            record.actor,
            record.location.as_deref().unwrap_or("-"),
            record.tx_hash.as_deref().unwrap_or("pending")
        );
    }
    Ok(())
}

/// Send one chatbot message and print the reply.
#[allow(clippy::print_stdout)]
pub async fn chat(client: &MarketClient, user: i64, message: &str) -> Result<(), CliError> {
    let reply = client.chat().send(UserId::new(user), message).await?;
    println!("{}", reply.text);
    Ok(())
}

/// Print the authoritative unread notification count.
#[allow(clippy::print_stdout)]
pub async fn unread(client: &MarketClient, user: i64) -> Result<(), CliError> {
    let count = client.notifications().refresh(UserId::new(user)).await?;
    println!("{count}");
    Ok(())
}
