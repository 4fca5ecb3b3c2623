//! Account statement types.
//!
//! A statement is derived on demand from the account, ledger, and inventory
//! stores. It is never persisted.

use serde::{Deserialize, Serialize};

use crate::InventoryItem;

/// Counterparty shown for purchases.
pub const SHOP_COUNTERPARTY: &str = "SHOP";

/// Counterparty shown when the other account no longer resolves.
pub const UNKNOWN_COUNTERPARTY: &str = "Unknown";

/// Balance, inventory, and categorized history of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Current balance.
    pub coins: i64,
    /// Owned items with quantities.
    pub inventory: Vec<InventoryItem>,
    /// Coin movements, newest first.
    pub coin_history: CoinHistory,
}

/// Received and sent coin movements, each newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinHistory {
    /// Transfers into the account.
    pub received: Vec<CoinReceived>,
    /// Transfers out of the account and shop purchases.
    pub sent: Vec<CoinSent>,
}

/// Coins received from another account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinReceived {
    /// Sender username.
    pub from_user: String,
    /// Amount in coins.
    pub amount: i64,
}

/// Coins sent to another account or spent in the shop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinSent {
    /// Recipient username, or [`SHOP_COUNTERPARTY`] for purchases.
    pub to_user: String,
    /// Amount in coins.
    pub amount: i64,
}

impl CoinHistory {
    /// Total coins received.
    #[must_use]
    pub fn total_received(&self) -> i64 {
        self.received.iter().map(|r| r.amount).sum()
    }

    /// Total coins sent or spent.
    #[must_use]
    pub fn total_sent(&self) -> i64 {
        self.sent.iter().map(|s| s.amount).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_totals() {
        let history = CoinHistory {
            received: vec![CoinReceived {
                from_user: "bob".into(),
                amount: 30,
            }],
            sent: vec![
                CoinSent {
                    to_user: SHOP_COUNTERPARTY.into(),
                    amount: 80,
                },
                CoinSent {
                    to_user: "bob".into(),
                    amount: 20,
                },
            ],
        };

        assert_eq!(history.total_received(), 30);
        assert_eq!(history.total_sent(), 100);
    }
}
