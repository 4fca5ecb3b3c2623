//! Account types for the coin shop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::AccountId;

/// Balance every newly registered account starts with.
pub const STARTING_COINS: i64 = 1000;

/// A shop account.
///
/// The balance is owned by the account store and only changes through signed
/// delta application; nothing outside the store writes `coins` directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    /// The account ID.
    pub id: AccountId,

    /// Unique login name.
    pub username: String,

    /// Password hash in PHC string format.
    pub password_hash: String,

    /// Current coin balance. Never negative in committed state.
    pub coins: i64,

    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with the given starting balance.
    #[must_use]
    pub fn new(username: impl Into<String>, password_hash: impl Into<String>, coins: i64) -> Self {
        Self {
            id: AccountId::generate(),
            username: username.into(),
            password_hash: password_hash.into(),
            coins,
            created_at: Utc::now(),
        }
    }

    /// Check if the account can cover `amount` coins.
    #[must_use]
    pub fn has_sufficient_coins(&self, amount: i64) -> bool {
        self.coins >= amount
    }
}
