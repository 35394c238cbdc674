//! Cart resource client.
//!
//! Absolute-set semantics throughout: `quantity` is the new value, never a
//! delta. Mutations return only an acknowledgement - the server computes
//! pricing (sale-price resolution, stock checks), so callers re-fetch the
//! snapshot instead of mutating local state speculatively. This module does
//! not publish events; see [`CartStore`](crate::stores::CartStore) for the
//! fetch-then-publish cycle.

use serde::Serialize;
use tracing::instrument;

use agrichain_core::{CartSnapshot, ProductId, UserId};

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// Client for the `/cart` resource.
#[derive(Clone)]
pub struct CartApi {
    gateway: Gateway,
}

#[derive(Debug, Serialize)]
struct CartMutation {
    user_id: UserId,
    product_id: ProductId,
    quantity: u32,
}

impl CartApi {
    /// Create a cart client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Fetch the authoritative cart snapshot for a user.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id))]
    pub async fn fetch(&self, user_id: UserId) -> ApiResult<CartSnapshot> {
        self.gateway.get_json(&format!("/cart/{user_id}")).await
    }

    /// Add a product to the cart. The backend enforces stock limits; the
    /// quantity is not validated client-side beyond UI affordances.
    ///
    /// # Errors
    ///
    /// Any gateway error; out-of-stock surfaces as an
    /// [`ApiError::Api`](crate::error::ApiError::Api) with the backend's
    /// message.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<()> {
        let body = CartMutation {
            user_id,
            product_id,
            quantity,
        };
        let response = self.gateway.send(self.gateway.post("/cart/add").json(&body)).await?;
        self.gateway.read_json(response, true).await.map(|_| ())
    }

    /// Set a line's quantity to an absolute value.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn update_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> ApiResult<()> {
        let body = CartMutation {
            user_id,
            product_id,
            quantity,
        };
        let response = self
            .gateway
            .send(self.gateway.put("/cart/update").json(&body))
            .await?;
        self.gateway.read_json(response, true).await.map(|_| ())
    }

    /// Remove a product's line from the cart.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(user_id = %user_id, product_id = %product_id))]
    pub async fn remove_item(&self, user_id: UserId, product_id: ProductId) -> ApiResult<()> {
        self.gateway
            .delete_empty(&format!("/cart/{user_id}/{product_id}"))
            .await
    }
}
