//! Authentication resource client.
//!
//! Session issuance is owned by the backend; this module performs the
//! round trips and hands the resulting session/token to the caller. Key
//! material is persisted by [`MarketClient`](crate::client::MarketClient),
//! which also clears it (and the cart mirror) on logout.

use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use agrichain_core::Session;

use crate::error::ApiResult;
use crate::gateway::Gateway;

/// Login credentials.
#[derive(Debug, Serialize)]
pub struct Credentials {
    /// Account email.
    pub email: String,
    /// Plaintext password (sent over the wire, never stored).
    pub password: String,
}

/// New-account registration payload.
#[derive(Debug, Serialize)]
pub struct Registration {
    /// Account email.
    pub email: String,
    /// Plaintext password.
    pub password: String,
    /// Display name.
    #[serde(rename = "fullName")]
    pub full_name: String,
}

/// Successful login: the session plus an opaque bearer token.
#[derive(Debug, Deserialize)]
pub struct LoginResponse {
    /// The authenticated session.
    pub user: Session,
    /// Opaque bearer token for subsequent requests.
    pub token: String,
}

impl LoginResponse {
    /// The token wrapped for redacted logging.
    #[must_use]
    pub fn secret_token(&self) -> SecretString {
        SecretString::from(self.token.clone())
    }
}

/// Client for the `/auth` and `/admin/users` resources.
#[derive(Clone)]
pub struct AuthApi {
    gateway: Gateway,
}

impl AuthApi {
    /// Create an auth client over the shared gateway.
    #[must_use]
    pub const fn new(gateway: Gateway) -> Self {
        Self { gateway }
    }

    /// Exchange credentials for a session and token.
    ///
    /// # Errors
    ///
    /// Any gateway error; invalid credentials surface as the backend's
    /// 401 message.
    #[instrument(skip(self, credentials), fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> ApiResult<LoginResponse> {
        self.gateway.post_json("/auth/login", credentials).await
    }

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Any gateway error.
    #[instrument(skip(self, registration), fields(email = %registration.email))]
    pub async fn register(&self, registration: &Registration) -> ApiResult<Session> {
        self.gateway.post_json("/auth/register", registration).await
    }

    /// List platform users (admin-only endpoint).
    ///
    /// # Errors
    ///
    /// Any gateway error; non-admin tokens surface the backend's 403
    /// message.
    #[instrument(skip(self))]
    pub async fn admin_users(&self) -> ApiResult<Vec<Session>> {
        self.gateway.get_json("/admin/users").await
    }
}
