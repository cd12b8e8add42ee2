//! Bearer token verification against the hosted identity service.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

use crate::error::AppError;

/// User resolved from a bearer token.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AuthenticatedUser {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
}

/// Resolves bearer tokens to users.
///
/// Implementations return `AppError::Unauthorized` for any token they do
/// not accept.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError>;
}

/// Identity provider backed by the hosted auth API (`/auth/v1/user`).
#[derive(Debug, Clone)]
pub struct SupabaseIdentity {
    client: reqwest::Client,
    user_url: String,
    api_key: String,
}

impl SupabaseIdentity {
    pub fn new(base_url: &str, api_key: &str) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            user_url: format!("{}/auth/v1/user", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        })
    }
}

#[async_trait]
impl IdentityProvider for SupabaseIdentity {
    /// # Flow
    ///
    /// 1. `GET {SUPABASE_URL}/auth/v1/user` with `apikey` and the caller's token
    /// 2. 2xx: parse the user
    /// 3. 4xx other than 429: token rejected, 401
    /// 4. 429, 5xx or transport failure: 502
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AppError> {
        let response = self
            .client
            .get(&self.user_url)
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "identity service unreachable");
                AppError::Upstream("Identity service unavailable".to_string())
            })?;

        let status = response.status();
        // 429 is a service failure, not a rejected token
        if status.is_client_error() && status != StatusCode::TOO_MANY_REQUESTS {
            tracing::debug!(%status, "identity service rejected token");
            return Err(AppError::Unauthorized);
        }
        if !status.is_success() {
            tracing::error!(%status, "identity service error");
            return Err(AppError::Upstream("Identity service unavailable".to_string()));
        }

        response.json::<AuthenticatedUser>().await.map_err(|e| {
            tracing::error!(error = %e, "unexpected identity service response");
            AppError::Upstream("Identity service returned an invalid user".to_string())
        })
    }
}
