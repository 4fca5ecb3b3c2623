//! Inventory types for the coin shop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{AccountId, InventoryRecordId, ItemId};

/// One purchased unit of an item.
///
/// Inventory is a multiset: buying the same item twice yields two records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryRecord {
    /// The record ID.
    pub id: InventoryRecordId,
    /// The owning account.
    pub account_id: AccountId,
    /// The purchased item.
    pub item_id: ItemId,
    /// When the unit was acquired.
    pub acquired_at: DateTime<Utc>,
}

impl InventoryRecord {
    /// Create a new record for one unit of `item_id`.
    #[must_use]
    pub fn new(account_id: AccountId, item_id: ItemId) -> Self {
        Self {
            id: InventoryRecordId::generate(),
            account_id,
            item_id,
            acquired_at: Utc::now(),
        }
    }
}

/// Owned quantity of one item, derived by counting records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    /// Item name.
    #[serde(rename = "type")]
    pub item_type: String,
    /// Number of units owned.
    pub quantity: u64,
}

impl InventoryItem {
    /// Create a new inventory line.
    #[must_use]
    pub fn new(item_type: impl Into<String>, quantity: u64) -> Self {
        Self {
            item_type: item_type.into(),
            quantity,
        }
    }
}
