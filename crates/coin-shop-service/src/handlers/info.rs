//! Account statement handler.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use coin_shop_core::{InventoryItem, Statement};

use crate::auth::AuthAccount;
use crate::error::ApiError;
use crate::state::AppState;

/// Statement response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance.
    pub coins: i64,
    /// Owned items as `{type, quantity}`.
    pub inventory: Vec<InventoryItem>,
    /// Received and sent coins, newest first.
    pub coin_history: CoinHistoryResponse,
}

/// Coin history section of [`InfoResponse`].
#[derive(Debug, Serialize)]
pub struct CoinHistoryResponse {
    /// Incoming transfers.
    pub received: Vec<ReceivedResponse>,
    /// Outgoing transfers and purchases.
    pub sent: Vec<SentResponse>,
}

/// One incoming transfer.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedResponse {
    /// Sender username.
    pub from_user: String,
    /// Amount in coins.
    pub amount: i64,
}

/// One outgoing transfer or purchase.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SentResponse {
    /// Recipient username, or `"SHOP"`.
    pub to_user: String,
    /// Amount in coins.
    pub amount: i64,
}

impl From<Statement> for InfoResponse {
    fn from(statement: Statement) -> Self {
        let history = statement.coin_history;
        Self {
            coins: statement.coins,
            inventory: statement.inventory,
            coin_history: CoinHistoryResponse {
                received: history
                    .received
                    .into_iter()
                    .map(|r| ReceivedResponse {
                        from_user: r.from_user,
                        amount: r.amount,
                    })
                    .collect(),
                sent: history
                    .sent
                    .into_iter()
                    .map(|s| SentResponse {
                        to_user: s.to_user,
                        amount: s.amount,
                    })
                    .collect(),
            },
        }
    }
}

/// Get the caller's balance, inventory and coin history.
pub async fn get_info(
    State(state): State<Arc<AppState>>,
    auth: AuthAccount,
) -> Result<Json<InfoResponse>, ApiError> {
    let statement = state.engine.statements().build(&auth.account_id).await?;
    Ok(Json(statement.into()))
}
