//! Ledger types for the coin shop.
//!
//! The ledger is append-only: every completed transfer or purchase produces
//! exactly one entry, and entries are never updated or deleted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, LedgerEntryId};

/// What a ledger entry records.
///
/// Purchases have no receiving account; the shop is the implicit counterparty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type")]
pub enum LedgerKind {
    /// Coins moved from one account to another.
    Transfer {
        /// The receiving account.
        to: AccountId,
    },

    /// Coins spent in the shop.
    Purchase,
}

impl LedgerKind {
    /// The stored name of the kind (`TRANSFER` or `PURCHASE`).
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Transfer { .. } => "TRANSFER",
            Self::Purchase => "PURCHASE",
        }
    }

    /// The receiving account, if any.
    #[must_use]
    pub const fn recipient(&self) -> Option<&AccountId> {
        match self {
            Self::Transfer { to } => Some(to),
            Self::Purchase => None,
        }
    }
}

/// A completed coin movement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Store-assigned, strictly increasing id.
    pub id: LedgerEntryId,

    /// The account that paid.
    pub from: AccountId,

    /// Transfer or purchase.
    pub kind: LedgerKind,

    /// Amount in coins. Always positive.
    pub amount: i64,

    /// When the entry was appended.
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Whether `account` sent or received coins in this entry.
    #[must_use]
    pub fn involves(&self, account: &AccountId) -> bool {
        self.from == *account || self.kind.recipient() == Some(account)
    }

    /// Whether `account` is the receiving side of this entry.
    #[must_use]
    pub fn is_received_by(&self, account: &AccountId) -> bool {
        self.kind.recipient() == Some(account)
    }
}

/// An entry waiting to be appended; the store assigns id and timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NewLedgerEntry {
    /// The account that paid.
    pub from: AccountId,
    /// Transfer or purchase.
    pub kind: LedgerKind,
    /// Amount in coins.
    pub amount: i64,
}

impl NewLedgerEntry {
    /// A transfer of `amount` coins from `from` to `to`.
    #[must_use]
    pub const fn transfer(from: AccountId, to: AccountId, amount: i64) -> Self {
        Self {
            from,
            kind: LedgerKind::Transfer { to },
            amount,
        }
    }

    /// A purchase of `amount` coins by `buyer`.
    #[must_use]
    pub const fn purchase(buyer: AccountId, amount: i64) -> Self {
        Self {
            from: buyer,
            kind: LedgerKind::Purchase,
            amount,
        }
    }

    /// Attach the store-assigned id and timestamp.
    #[must_use]
    pub const fn into_entry(self, id: LedgerEntryId, created_at: DateTime<Utc>) -> LedgerEntry {
        LedgerEntry {
            id,
            from: self.from,
            kind: self.kind,
            amount: self.amount,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transfer_involves_both_sides() {
        let alice = AccountId::generate();
        let bob = AccountId::generate();
        let entry = NewLedgerEntry::transfer(alice, bob, 100)
            .into_entry(LedgerEntryId::new(1), Utc::now());

        assert!(entry.involves(&alice));
        assert!(entry.involves(&bob));
        assert!(entry.is_received_by(&bob));
        assert!(!entry.is_received_by(&alice));
        assert_eq!(entry.kind.as_str(), "TRANSFER");
    }

    #[test]
    fn purchase_has_no_recipient() {
        let alice = AccountId::generate();
        let entry =
            NewLedgerEntry::purchase(alice, 80).into_entry(LedgerEntryId::new(2), Utc::now());

        assert!(entry.involves(&alice));
        assert_eq!(entry.kind.recipient(), None);
        assert_eq!(entry.kind.as_str(), "PURCHASE");
    }

    #[test]
    fn kind_serializes_tagged() {
        let json = serde_json::to_value(LedgerKind::Purchase).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "purchase" }));
    }
}
