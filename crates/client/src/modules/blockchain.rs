//! Blockchain traceability resource client.
//!
//! Ledger writes happen on the backend; this module only reads a product's
//! trace and submits new log entries for the backend to anchor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agrichain_core::ProductId;

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// One anchored entry in a product's trace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceRecord {
    /// The traced product.
    pub product_id: ProductId,
    /// Supply-chain stage (e.g., "harvested", "packed", "shipped").
    pub stage: String,
    /// Acting party.
    pub actor: String,
    /// Where the stage happened, when recorded.
    #[serde(default)]
    pub location: Option<String>,
    /// When the stage was recorded.
    pub recorded_at: DateTime<Utc>,
    /// Ledger transaction hash, once anchored.
    #[serde(default)]
    pub tx_hash: Option<String>,
}

/// A log entry submitted for anchoring.
#[derive(Debug, Serialize)]
pub struct NewTraceLog {
    /// The traced product.
    pub product_id: ProductId,
    /// Supply-chain stage.
    pub stage: String,
    /// Acting party.
    pub actor: String,
    /// Where the stage happened.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Client for the `/blockchain` resource.
#[derive(Clone)]
pub struct TraceApi {
    gateway: Gateway,
}

impl TraceApi {
    /// Create a trace client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Fetch the full trace for a product, oldest entry first.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn trace(&self, product_id: ProductId) -> ApiResult<Vec<TraceRecord>> {
        self.gateway
            .get_json(&format!("/blockchain/{product_id}"))
            .await
    }

    /// Submit a log entry for anchoring. The backend answers with an
    /// acknowledgement only; anchoring is asynchronous on its side.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self, entry), fields(product_id = %entry.product_id, stage = %entry.stage))]
    pub async fn add_log(&self, entry: &NewTraceLog) -> ApiResult<()> {
        let response = self
            .gateway
            .send(self.gateway.post("/blockchain/add-log").json(entry))
            .await?;
        self.gateway.read_json(response, true).await.map(|_| ())
    }
}
