//! Coin transfer handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::handlers::StatusResponse;
use crate::state::AppState;

/// Transfer request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username.
    pub to_user: String,
    /// Amount in coins.
    pub amount: i64,
}

/// Send coins to another user.
pub async fn send_coin(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Json(body): Json<SendCoinRequest>,
) -> Result<Json<StatusResponse>, ApiError> {
    state
        .engine
        .transfers()
        .transfer(&auth.account_id, &body.to_user, body.amount)
        .await?;

    Ok(Json(StatusResponse::success()))
}
