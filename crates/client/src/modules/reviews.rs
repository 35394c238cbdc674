//! Product review resource client.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agrichain_core::{ProductId, ReviewId, UserId};

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// A published review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Review {
    /// Backend review id.
    pub id: ReviewId,
    /// Reviewed product.
    pub product_id: ProductId,
    /// Reviewing user.
    pub user_id: UserId,
    /// Star rating, 1-5 (backend-enforced).
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
    /// Publication timestamp.
    pub created_at: DateTime<Utc>,
}

/// A review submission.
#[derive(Debug, Serialize)]
pub struct NewReview {
    /// Product being reviewed.
    pub product_id: ProductId,
    /// Star rating, 1-5.
    pub rating: u8,
    /// Free-text comment.
    pub comment: String,
}

/// Client for the `/reviews` resource.
#[derive(Clone)]
pub struct ReviewApi {
    gateway: Gateway,
}

impl ReviewApi {
    /// Create a review client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List reviews for a product.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn for_product(&self, product_id: ProductId) -> ApiResult<Vec<Review>> {
        let builder = self
            .gateway
            .get("/reviews")
            .query(&[("product", product_id.as_i64())]);
        self.gateway.expect_json(builder).await
    }

    /// Submit a review. The backend attributes it to the bearer token's
    /// user.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self, review), fields(product_id = %review.product_id))]
    pub async fn submit(&self, review: &NewReview) -> ApiResult<Review> {
        self.gateway.post_json("/reviews", review).await
    }
}
