//! Admin panel editor resource client.
//!
//! Panels are the admin-managed content blocks rendered on the storefront
//! home page. Their `content` is an opaque JSON document owned by the
//! backend's editor schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::instrument;

use agrichain_core::PanelId;

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// A storefront content panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Panel {
    /// Backend panel id.
    pub id: PanelId,
    /// Editor-facing title.
    pub title: String,
    /// Opaque editor document.
    pub content: Value,
    /// Render order on the page.
    pub position: u32,
    /// Whether the storefront renders it.
    pub visible: bool,
}

/// Payload for creating or replacing a panel.
#[derive(Debug, Serialize)]
pub struct NewPanel {
    /// Editor-facing title.
    pub title: String,
    /// Opaque editor document.
    pub content: Value,
    /// Render order on the page.
    pub position: u32,
    /// Whether the storefront renders it.
    pub visible: bool,
}

/// Client for the `/panels` resource.
#[derive(Clone)]
pub struct PanelApi {
    gateway: Gateway,
}

impl PanelApi {
    /// Create a panel client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// List all panels.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self))]
    pub async fn list(&self) -> ApiResult<Vec<Panel>> {
        self.gateway.get_json("/panels").await
    }

    /// Create a panel.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self, panel), fields(title = %panel.title))]
    pub async fn create(&self, panel: &NewPanel) -> ApiResult<Panel> {
        self.gateway.post_json("/panels", panel).await
    }

    /// Replace a panel's content.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self, panel), fields(panel_id = %panel_id))]
    pub async fn update(&self, panel_id: PanelId, panel: &NewPanel) -> ApiResult<Panel> {
        self.gateway
            .put_json(&format!("/panels/{panel_id}"), panel)
            .await
    }

    /// Delete a panel.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self), fields(panel_id = %panel_id))]
    pub async fn delete(&self, panel_id: PanelId) -> ApiResult<()> {
        self.gateway.delete_empty(&format!("/panels/{panel_id}")).await
    }
}
