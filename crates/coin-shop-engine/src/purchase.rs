//! Buying catalog items.
//!
//! A purchase debits the buyer, appends a ledger entry and adds one inventory
//! record. A failed ledger append reverses the debit. A failed inventory write
//! also reverses the debit but leaves the ledger entry in place, so the buyer
//! can end up with a purchase entry and no item.

use std::sync::Arc;

use coin_shop_core::{
    AccountId, CatalogItem, InventoryRecord, LedgerEntry, NewLedgerEntry, Result, ShopError,
};
use coin_shop_store::Store;

use crate::saga::reverse_delta;

/// Everything a successful purchase wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseReceipt {
    /// The item bought.
    pub item: CatalogItem,
    /// The purchase ledger entry.
    pub entry: LedgerEntry,
    /// The new inventory record.
    pub record: InventoryRecord,
}

/// Sells catalog items for coins.
#[derive(Clone)]
pub struct PurchaseEngine {
    store: Arc<dyn Store>,
}

impl PurchaseEngine {
    /// Create an engine over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Buy one unit of `item_name` for `buyer`.
    ///
    /// # Errors
    ///
    /// - `ShopError::InvalidAccount` if `buyer` is the nil id.
    /// - `ShopError::Validation` if `item_name` is empty.
    /// - `ShopError::NotFound` if the item or buyer does not exist.
    /// - `ShopError::InsufficientFunds` if the buyer cannot cover the price.
    /// - `ShopError::Internal` if a store write fails.
    pub async fn buy(&self, buyer: &AccountId, item_name: &str) -> Result<PurchaseReceipt> {
        if buyer.is_nil() {
            return Err(ShopError::InvalidAccount);
        }
        if item_name.is_empty() {
            return Err(ShopError::Validation("item name is required".into()));
        }

        let store = self.store.as_ref();

        let item = store
            .get_item_by_name(item_name)
            .await?
            .ok_or_else(|| ShopError::not_found("item", item_name))?;

        let account = store
            .get_account(buyer)
            .await?
            .ok_or_else(|| ShopError::not_found("account", buyer))?;

        if !account.has_sufficient_coins(item.price) {
            tracing::debug!(account_id = %buyer, balance = account.coins, price = item.price, "Purchase rejected: insufficient funds");
            return Err(ShopError::InsufficientFunds {
                balance: account.coins,
                required: item.price,
            });
        }

        store.apply_delta(buyer, -item.price).await?;
        tracing::debug!(account_id = %buyer, amount = item.price, "Buyer debited");

        let entry = match store
            .append_entry(NewLedgerEntry::purchase(*buyer, item.price))
            .await
        {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "Ledger append failed, reversing debit");
                reverse_delta(store, buyer, -item.price, "purchase").await;
                return Err(e.into());
            }
        };

        let record = match store.add_inventory(buyer, &item.id).await {
            Ok(record) => record,
            Err(e) => {
                tracing::warn!(error = %e, entry_id = %entry.id, "Inventory write failed, reversing debit; ledger entry kept");
                reverse_delta(store, buyer, -item.price, "purchase").await;
                return Err(e.into());
            }
        };

        tracing::info!(account_id = %buyer, item = %item.name, price = item.price, "Purchase completed");
        Ok(PurchaseReceipt {
            item,
            entry,
            record,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{seeded, FaultyStore};
    use coin_shop_core::{InventoryItem, LedgerKind, NewCatalogItem};
    use coin_shop_store::{AccountStore, CatalogStore, InventoryStore, LedgerStore};

    async fn with_catalog() -> (Arc<FaultyStore>, AccountId) {
        let (store, alice, _) = seeded().await;
        store.put_item(&NewCatalogItem::new("mug", 100)).await.unwrap();
        store.put_item(&NewCatalogItem::new("yacht", 1500)).await.unwrap();
        (store, alice)
    }

    async fn coins(store: &FaultyStore, id: &AccountId) -> i64 {
        store.get_account(id).await.unwrap().unwrap().coins
    }

    #[tokio::test]
    async fn buy_debits_and_records() {
        let (store, alice) = with_catalog().await;
        let engine = PurchaseEngine::new(store.clone());

        let receipt = engine.buy(&alice, "mug").await.unwrap();

        assert_eq!(coins(&store, &alice).await, 900);
        assert_eq!(receipt.item.name, "mug");
        assert_eq!(receipt.entry.kind, LedgerKind::Purchase);
        assert_eq!(receipt.entry.amount, 100);
        assert_eq!(receipt.record.account_id, alice);
        assert_eq!(
            store.list_inventory(&alice).await.unwrap(),
            vec![InventoryItem::new("mug", 1)]
        );
    }

    #[tokio::test]
    async fn repeated_purchases_accumulate() {
        let (store, alice) = with_catalog().await;
        let engine = PurchaseEngine::new(store.clone());

        for _ in 0..3 {
            engine.buy(&alice, "mug").await.unwrap();
        }
        assert_eq!(coins(&store, &alice).await, 700);
        assert_eq!(
            store.list_inventory(&alice).await.unwrap(),
            vec![InventoryItem::new("mug", 3)]
        );
    }

    #[tokio::test]
    async fn too_expensive_changes_nothing() {
        let (store, alice) = with_catalog().await;
        let engine = PurchaseEngine::new(store.clone());

        let result = engine.buy(&alice, "yacht").await;
        assert!(matches!(
            result,
            Err(ShopError::InsufficientFunds {
                balance: 1000,
                required: 1500
            })
        ));
        assert_eq!(coins(&store, &alice).await, 1000);
        assert!(store.list_entries_for_account(&alice).await.unwrap().is_empty());
        assert!(store.list_inventory(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn request_validation() {
        let (store, alice) = with_catalog().await;
        let engine = PurchaseEngine::new(store);

        assert!(matches!(
            engine.buy(&AccountId::nil(), "mug").await,
            Err(ShopError::InvalidAccount)
        ));
        assert!(matches!(
            engine.buy(&alice, "").await,
            Err(ShopError::Validation(_))
        ));
        assert!(matches!(
            engine.buy(&alice, "spaceship").await,
            Err(ShopError::NotFound { entity: "item", .. })
        ));
        assert!(matches!(
            engine.buy(&AccountId::generate(), "mug").await,
            Err(ShopError::NotFound {
                entity: "account",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn failed_ledger_restores_balance() {
        let (store, alice) = with_catalog().await;
        store.fail_ledger(true);
        let engine = PurchaseEngine::new(store.clone());

        let result = engine.buy(&alice, "mug").await;
        assert!(matches!(result, Err(ShopError::Internal(_))));

        store.clear_faults();
        assert_eq!(coins(&store, &alice).await, 1000);
        assert!(store.list_entries_for_account(&alice).await.unwrap().is_empty());
        assert!(store.list_inventory(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_inventory_restores_balance_but_keeps_entry() {
        let (store, alice) = with_catalog().await;
        store.fail_inventory(true);
        let engine = PurchaseEngine::new(store.clone());

        let result = engine.buy(&alice, "mug").await;
        assert!(matches!(result, Err(ShopError::Internal(_))));

        store.clear_faults();
        assert_eq!(coins(&store, &alice).await, 1000);
        let entries = store.list_entries_for_account(&alice).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].kind, LedgerKind::Purchase);
        assert!(store.list_inventory(&alice).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_debit_writes_nothing() {
        let (store, alice) = with_catalog().await;
        store.fail_delta_when(|_, delta| delta < 0);
        let engine = PurchaseEngine::new(store.clone());

        assert!(engine.buy(&alice, "mug").await.is_err());

        store.clear_faults();
        assert_eq!(coins(&store, &alice).await, 1000);
        assert!(store.list_entries_for_account(&alice).await.unwrap().is_empty());
    }
}
