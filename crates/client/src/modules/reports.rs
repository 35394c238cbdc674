//! Admin reporting resource client.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// Aggregated sales figures for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesReport {
    /// Orders placed in the range.
    pub total_orders: u64,
    /// Revenue in the range.
    pub total_revenue: Decimal,
}

/// Traceability coverage figures for a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraceabilityReport {
    /// Products with at least one ledger entry.
    pub products_tracked: u64,
    /// Ledger entries written in the range.
    pub log_entries: u64,
}

/// Client for the `/reports/*` resources.
#[derive(Clone)]
pub struct ReportApi {
    gateway: Gateway,
}

impl ReportApi {
    /// Create a report client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Sales report for an inclusive date range.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn sales(&self, from: NaiveDate, to: NaiveDate) -> ApiResult<SalesReport> {
        let builder = self
            .gateway
            .get("/reports/sales")
            .query(&[("from", from.to_string()), ("to", to.to_string())]);
        self.gateway.expect_json(builder).await
    }

    /// Traceability report for an inclusive date range.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn traceability(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> ApiResult<TraceabilityReport> {
        let builder = self
            .gateway
            .get("/reports/traceability")
            .query(&[("from", from.to_string()), ("to", to.to_string())]);
        self.gateway.expect_json(builder).await
    }
}
