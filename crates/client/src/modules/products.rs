//! Product catalog client.
//!
//! Read-mostly data: list and detail responses are cached in-process via
//! `moka` with a 5-minute TTL. Search responses are never cached - queries
//! are too sparse for the hit rate to matter.

use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use agrichain_core::{CategoryId, ProductId, UserId};

use crate::error::{ApiError, ApiResult};
use crate::gateway::Gateway;

const CACHE_CAPACITY: u64 = 1000;
const CACHE_TTL: Duration = Duration::from_secs(300);

/// A product listing as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Backend product id.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Longer description, when the producer provided one.
    #[serde(default)]
    pub description: Option<String>,
    /// Category, when assigned.
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    /// Regular unit price.
    pub price: Decimal,
    /// Discounted price, when on sale.
    #[serde(default)]
    pub sale_price: Option<Decimal>,
    /// Units in stock.
    pub stock: u32,
    /// Primary image URL.
    #[serde(default)]
    pub image_url: Option<String>,
    /// The producing farmer, when the product carries traceability data.
    #[serde(default)]
    pub farmer_id: Option<UserId>,
}

/// A product category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Backend category id.
    pub id: CategoryId,
    /// Display name.
    pub name: String,
}

/// Cached API responses, boxed where large.
#[derive(Clone)]
enum CacheValue {
    Product(Box<Product>),
    Products(Vec<Product>),
    Categories(Vec<Category>),
}

/// Client for the `/products`, `/categories`, and `/search` resources.
#[derive(Clone)]
pub struct CatalogApi {
    gateway: Gateway,
    cache: Cache<String, CacheValue>,
}

impl CatalogApi {
    /// Create a catalog client over the shared gateway.
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        let cache = Cache::builder()
            .max_capacity(CACHE_CAPACITY)
            .time_to_live(CACHE_TTL)
            .build();
        Self { gateway, cache }
    }

    /// List the full product catalog.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn products(&self) -> ApiResult<Vec<Product>> {
        let cache_key = "products".to_string();
        if let Some(CacheValue::Products(products)) = self.cache.get(&cache_key).await {
            debug!("cache hit for products");
            return Ok(products);
        }

        let products: Vec<Product> = self.gateway.get_json("/products").await?;
        self.cache
            .insert(cache_key, CacheValue::Products(products.clone()))
            .await;
        Ok(products)
    }

    /// Fetch a single product by id.
    ///
    /// # Errors
    ///
    /// [`ApiError::NotFound`] when the backend has no such product, plus any
    /// gateway error.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn product(&self, product_id: ProductId) -> ApiResult<Product> {
        let cache_key = format!("product:{product_id}");
        if let Some(CacheValue::Product(product)) = self.cache.get(&cache_key).await {
            debug!("cache hit for product");
            return Ok(*product);
        }

        let product: Product = self
            .gateway
            .get_json(&format!("/products/{product_id}"))
            .await
            .map_err(|e| match e.status() {
                Some(404) => ApiError::NotFound(format!("product {product_id}")),
                _ => e,
            })?;
        self.cache
            .insert(cache_key, CacheValue::Product(Box::new(product.clone())))
            .await;
        Ok(product)
    }

    /// Full-text search over the catalog. Never cached.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn search(&self, query: &str) -> ApiResult<Vec<Product>> {
        let builder = self.gateway.get("/search").query(&[("q", query)]);
        self.gateway.expect_json(builder).await
    }

    /// List product categories.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn categories(&self) -> ApiResult<Vec<Category>> {
        let cache_key = "categories".to_string();
        if let Some(CacheValue::Categories(categories)) = self.cache.get(&cache_key).await {
            debug!("cache hit for categories");
            return Ok(categories);
        }

        let categories: Vec<Category> = self.gateway.get_json("/categories").await?;
        self.cache
            .insert(cache_key, CacheValue::Categories(categories.clone()))
            .await;
        Ok(categories)
    }

    /// Drop all cached catalog responses (e.g., after an admin edit).
    pub async fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.cache.run_pending_tasks().await;
    }
}
