//! Request and response types for the coin shop client.

use serde::{Deserialize, Serialize};

/// Login request.
#[derive(Debug, Clone, Serialize)]
pub struct AuthRequest {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

/// Login response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    /// Session token.
    pub token: String,
}

/// Transfer request.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendCoinRequest {
    /// Recipient username.
    pub to_user: String,
    /// Amount in coins.
    pub amount: i64,
}

/// `{"status": "success"}` body of mutating calls.
#[derive(Debug, Clone, Deserialize)]
pub struct StatusResponse {
    /// Status string.
    pub status: String,
}

/// Account statement.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InfoResponse {
    /// Current balance.
    pub coins: i64,
    /// Owned items.
    pub inventory: Vec<InventoryEntry>,
    /// Coin history.
    pub coin_history: CoinHistory,
}

/// Owned quantity of one item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct InventoryEntry {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Units owned.
    pub quantity: i64,
}

/// Received and sent coins, newest first.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CoinHistory {
    /// Incoming transfers.
    pub received: Vec<Received>,
    /// Outgoing transfers and purchases.
    pub sent: Vec<Sent>,
}

/// One incoming transfer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Received {
    /// Sender username.
    pub from_user: String,
    /// Amount.
    pub amount: i64,
}

/// One outgoing transfer or purchase.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sent {
    /// Recipient username, or `"SHOP"` for purchases.
    pub to_user: String,
    /// Amount.
    pub amount: i64,
}

/// Catalog listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ItemsResponse {
    /// Items ordered by name.
    pub items: Vec<Item>,
}

/// One catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Item {
    /// Item name.
    pub name: String,
    /// Price in coins.
    pub price: i64,
}

/// Health check response.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Service name.
    pub service: String,
    /// Service version.
    pub version: String,
}

/// API error response.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    /// Error details.
    pub error: ApiErrorBody,
}

/// API error body.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    /// Error code.
    pub code: String,
    /// Error message.
    pub message: String,
    /// Additional details.
    pub details: Option<serde_json::Value>,
}
