//! Order and shipping resource client.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agrichain_core::{OrderId, UserId};

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

/// Shipment progress for one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Preparing,
    InTransit,
    Delivered,
}

/// An order as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Backend order id.
    pub id: OrderId,
    /// The ordering user.
    pub user_id: UserId,
    /// Server-computed total.
    pub total: Decimal,
    /// Lifecycle status.
    pub status: OrderStatus,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Shipping details for one order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingInfo {
    /// The order being shipped.
    pub order_id: OrderId,
    /// Delivery address.
    pub address: String,
    /// Shipment progress.
    pub status: ShipmentStatus,
    /// Carrier tracking number, once assigned.
    #[serde(default)]
    pub tracking_number: Option<String>,
}

/// Client for the `/orders` and `/shipping` resources.
#[derive(Clone)]
pub struct OrderApi {
    gateway: Gateway,
}

impl OrderApi {
    /// Create an order client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List a user's orders.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn orders(&self, user_id: UserId) -> ApiResult<Vec<Order>> {
        let builder = self
            .gateway
            .get("/orders")
            .query(&[("user", user_id.as_i64())]);
        self.gateway.expect_json(builder).await
    }

    /// Fetch a single order.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn order(&self, order_id: OrderId) -> ApiResult<Order> {
        self.gateway.get_json(&format!("/orders/{order_id}")).await
    }

    /// Fetch shipping details for an order.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn shipping(&self, order_id: OrderId) -> ApiResult<ShippingInfo> {
        self.gateway
            .get_json(&format!("/shipping/{order_id}"))
            .await
    }

    /// Update an order's shipment status (admin/farmer operation).
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(order_id = %order_id))]
    pub async fn update_shipping(
        &self,
        order_id: OrderId,
        status: ShipmentStatus,
    ) -> ApiResult<ShippingInfo> {
        #[derive(Serialize)]
        struct Body {
            status: ShipmentStatus,
        }
        self.gateway
            .put_json(&format!("/shipping/{order_id}"), &Body { status })
            .await
    }
}
