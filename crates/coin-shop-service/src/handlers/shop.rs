//! Shop handlers.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::handlers::StatusResponse;
use crate::state::AppState;

/// One catalog entry.
#[derive(Debug, Serialize)]
pub struct ItemResponse {
    /// Item name.
    pub name: String,
    /// Price in coins.
    pub price: i64,
}

/// Catalog listing.
#[derive(Debug, Serialize)]
pub struct ItemsResponse {
    /// Items ordered by name.
    pub items: Vec<ItemResponse>,
}

/// Buy one unit of an item.
pub async fn buy_item(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
    Path(item): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    state.engine.purchases().buy(&auth.account_id, &item).await?;
    Ok(Json(StatusResponse::success()))
}

/// List the catalog.
pub async fn list_items(
    State(state): State<Arc<AppState>>,
    _auth: AuthAccount,
) -> Result<Json<ItemsResponse>, ApiError> {
    let items = state
        .engine
        .catalog()
        .await?
        .into_iter()
        .map(|item| ItemResponse {
            name: item.name,
            price: item.price,
        })
        .collect();

    Ok(Json(ItemsResponse { items }))
}
