//! Bearer-token authentication extractor.

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use coin_shop_core::AccountId;

use crate::error::ApiError;
use crate::state::AppState;

/// An account authenticated by its session token.
#[derive(Debug, Clone, Copy)]
pub struct AuthAccount {
    /// The account ID.
    pub account_id: AccountId,
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for AuthAccount {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        // Extract the Authorization header
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::Unauthorized)?;

        // Extract the Bearer token
        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::Unauthorized)?;

        let account_id = state.engine.identity().verify_token(token)?;
        Ok(Self { account_id })
    }
}
