//! Integration tests for the AgriChain Market client.
//!
//! Tests in `tests/` run the real client against [`MockMarket`], an
//! in-process axum stand-in for the backend. The mock binds an ephemeral
//! port, keeps per-user carts and unread counts in memory, and serves the
//! NDJSON push stream, so every test is self-contained.
//!
//! ```bash
//! cargo test -p agrichain-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::collections::{BTreeMap, HashMap};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::extract::{Path as UrlPath, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post, put};
use futures::StreamExt;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{Value, json};

use agrichain_client::MarketConfig;
use agrichain_core::{CartLine, CartSnapshot, ProductId};

/// Product id the mock treats as permanently out of stock.
pub const OUT_OF_STOCK: i64 = 999;

/// How long `/slow` stalls before answering; longer than any test deadline.
const SLOW_RESPONSE: Duration = Duration::from_secs(2);

type SharedState = Arc<MockState>;

/// In-memory backend state.
struct MockState {
    /// user id -> product id -> quantity
    carts: Mutex<HashMap<i64, BTreeMap<i64, u32>>>,
    /// user id -> unread count
    unread: Mutex<HashMap<i64, u32>>,
    /// NDJSON lines served to each push-stream connection.
    pushes: Mutex<Vec<String>>,
    /// Requests seen by `/slow`.
    slow_hits: AtomicU32,
}

/// An in-process AgriChain backend bound to an ephemeral port.
pub struct MockMarket {
    addr: SocketAddr,
    state: SharedState,
    server: tokio::task::JoinHandle<()>,
}

impl MockMarket {
    /// Bind and start serving. The server stops when the mock is dropped.
    ///
    /// # Panics
    ///
    /// Panics when no local port can be bound.
    pub async fn start() -> Self {
        let state = Arc::new(MockState {
            carts: Mutex::new(HashMap::new()),
            unread: Mutex::new(HashMap::new()),
            pushes: Mutex::new(Vec::new()),
            slow_hits: AtomicU32::new(0),
        });

        let app = Router::new()
            .route("/api/products", get(list_products))
            .route("/api/search", get(search_products))
            .route("/api/cart/{user}", get(get_cart))
            .route("/api/cart/add", post(add_to_cart))
            .route("/api/cart/update", put(update_cart))
            .route("/api/cart/{user}/{product}", delete(remove_from_cart))
            .route(
                "/api/notifications/user/{user}/unread-count",
                get(unread_count),
            )
            .route("/api/slow", get(slow))
            .route("/api/plain", get(plain))
            .route("/realtime/events", get(push_stream))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("mock backend has no address");
        let server = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Client configuration pointing at this mock.
    #[must_use]
    pub fn config(&self, data_dir: &Path) -> MarketConfig {
        MarketConfig {
            api_base_url: format!("http://{}/api", self.addr),
            socket_url: format!("http://{}/realtime", self.addr),
            upload_url: format!("http://{}/upload", self.addr),
            request_timeout: Duration::from_secs(2),
            data_dir: data_dir.to_path_buf(),
            auth_token: None,
        }
    }

    /// Set a user's authoritative unread count.
    pub fn set_unread(&self, user: i64, count: u32) {
        self.state
            .unread
            .lock()
            .expect("unread lock poisoned")
            .insert(user, count);
    }

    /// Queue an NDJSON line for delivery on the next push-stream connection.
    pub fn queue_push(&self, line: &str) {
        self.state
            .pushes
            .lock()
            .expect("push lock poisoned")
            .push(line.to_string());
    }

    /// The quantity the backend holds for one cart line.
    #[must_use]
    pub fn cart_quantity(&self, user: i64, product: i64) -> Option<u32> {
        self.state
            .carts
            .lock()
            .expect("cart lock poisoned")
            .get(&user)
            .and_then(|cart| cart.get(&product).copied())
    }

    /// How many requests `/slow` has received.
    #[must_use]
    pub fn slow_hits(&self) -> u32 {
        self.state.slow_hits.load(Ordering::SeqCst)
    }
}

impl Drop for MockMarket {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// =============================================================================
// Handlers
// =============================================================================

fn product_fixtures() -> Value {
    json!([
        {"id": 1, "name": "Heirloom Tomatoes", "price": "3.50", "stock": 40},
        {"id": 2, "name": "Raw Honey", "price": "9.00", "sale_price": "7.50", "stock": 12},
        {"id": OUT_OF_STOCK, "name": "Truffle Butter", "price": "18.00", "stock": 0},
    ])
}

async fn list_products() -> Response {
    axum::Json(product_fixtures()).into_response()
}

async fn search_products(Query(params): Query<HashMap<String, String>>) -> Response {
    let query = params.get("q").cloned().unwrap_or_default().to_lowercase();
    let products: Vec<Value> = product_fixtures()
        .as_array()
        .map(|all| {
            all.iter()
                .filter(|p| {
                    p.get("name")
                        .and_then(Value::as_str)
                        .is_some_and(|name| name.to_lowercase().contains(&query))
                })
                .cloned()
                .collect()
        })
        .unwrap_or_default();
    axum::Json(Value::Array(products)).into_response()
}

fn snapshot_for(state: &MockState, user: i64) -> CartSnapshot {
    let carts = state.carts.lock().expect("cart lock poisoned");
    let lines = carts
        .get(&user)
        .map(|cart| {
            cart.iter()
                .map(|(&product, &quantity)| CartLine {
                    product_id: ProductId::new(product),
                    quantity,
                    unit_price: Decimal::new(250, 2),
                    sale_price: None,
                })
                .collect()
        })
        .unwrap_or_default();
    CartSnapshot { lines }
}

async fn get_cart(State(state): State<SharedState>, UrlPath(user): UrlPath<i64>) -> Response {
    axum::Json(snapshot_for(&state, user)).into_response()
}

#[derive(Deserialize)]
struct CartChange {
    user_id: i64,
    product_id: i64,
    quantity: u32,
}

async fn add_to_cart(
    State(state): State<SharedState>,
    axum::Json(change): axum::Json<CartChange>,
) -> Response {
    if change.product_id == OUT_OF_STOCK {
        return (
            StatusCode::CONFLICT,
            axum::Json(json!({"error": "out of stock"})),
        )
            .into_response();
    }
    let mut carts = state.carts.lock().expect("cart lock poisoned");
    *carts
        .entry(change.user_id)
        .or_default()
        .entry(change.product_id)
        .or_insert(0) += change.quantity;
    axum::Json(json!({"ok": true})).into_response()
}

async fn update_cart(
    State(state): State<SharedState>,
    axum::Json(change): axum::Json<CartChange>,
) -> Response {
    let mut carts = state.carts.lock().expect("cart lock poisoned");
    carts
        .entry(change.user_id)
        .or_default()
        .insert(change.product_id, change.quantity);
    axum::Json(json!({"ok": true})).into_response()
}

async fn remove_from_cart(
    State(state): State<SharedState>,
    UrlPath((user, product)): UrlPath<(i64, i64)>,
) -> Response {
    let mut carts = state.carts.lock().expect("cart lock poisoned");
    if let Some(cart) = carts.get_mut(&user) {
        cart.remove(&product);
    }
    // Deliberately bodiless, like the real backend's delete.
    StatusCode::OK.into_response()
}

async fn unread_count(
    State(state): State<SharedState>,
    UrlPath(user): UrlPath<i64>,
) -> Response {
    let count = state
        .unread
        .lock()
        .expect("unread lock poisoned")
        .get(&user)
        .copied()
        .unwrap_or(0);
    axum::Json(json!({"count": count})).into_response()
}

async fn slow(State(state): State<SharedState>) -> Response {
    state.slow_hits.fetch_add(1, Ordering::SeqCst);
    tokio::time::sleep(SLOW_RESPONSE).await;
    axum::Json(json!({})).into_response()
}

async fn plain() -> Response {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain")],
        "ok",
    )
        .into_response()
}

/// Serve the queued push lines, then hold the connection open.
async fn push_stream(State(state): State<SharedState>) -> Response {
    let lines: Vec<String> = state
        .pushes
        .lock()
        .expect("push lock poisoned")
        .clone();
    let body = futures::stream::iter(
        lines
            .into_iter()
            .map(|line| Ok::<_, std::io::Error>(Bytes::from(format!("{line}\n")))),
    )
    .chain(futures::stream::pending());

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, "application/x-ndjson")
        .body(Body::from_stream(body))
        .expect("push stream response")
}
