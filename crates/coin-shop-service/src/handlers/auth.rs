//! Login handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::AppState;

/// Login request.
#[derive(Debug, Deserialize)]
pub struct AuthRequest {
    /// Username; unknown names are registered on first login.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    /// Session token for the `Authorization: Bearer` header.
    pub token: String,
}

/// Log in, registering the account on first use.
pub async fn authenticate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AuthRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let token = state
        .engine
        .identity()
        .login_or_register(&body.username, &body.password)
        .await?;

    Ok(Json(AuthResponse { token }))
}
