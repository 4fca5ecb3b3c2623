//! In-memory storage implementation.
//!
//! Deterministic and test-friendly. All state sits behind one lock, so every
//! individual store call is atomic; multi-step sequences are not.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::Utc;

use coin_shop_core::{
    Account, AccountId, CatalogItem, InventoryItem, InventoryRecord, ItemId, LedgerEntry,
    LedgerEntryId, NewCatalogItem, NewLedgerEntry,
};

use crate::error::{Result, StoreError};
use crate::{AccountStore, CatalogStore, InventoryStore, LedgerStore};

/// In-memory storage backend.
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

#[derive(Debug, Default)]
struct State {
    accounts: HashMap<AccountId, Account>,
    usernames: HashMap<String, AccountId>,
    items: HashMap<ItemId, CatalogItem>,
    item_names: BTreeMap<String, ItemId>,
    ledger: Vec<LedgerEntry>,
    last_entry_seq: u64,
    inventory: Vec<InventoryRecord>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>> {
        self.state
            .read()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>> {
        self.state
            .write()
            .map_err(|_| StoreError::Database("memory store lock poisoned".into()))
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_coins: i64,
    ) -> Result<Account> {
        let mut state = self.write()?;
        if state.usernames.contains_key(username) {
            return Err(StoreError::Conflict(format!(
                "username already taken: {username}"
            )));
        }

        let account = Account::new(username, password_hash, starting_coins);
        state.usernames.insert(username.to_string(), account.id);
        state.accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        Ok(self.read()?.accounts.get(id).cloned())
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let state = self.read()?;
        Ok(state
            .usernames
            .get(username)
            .and_then(|id| state.accounts.get(id))
            .cloned())
    }

    async fn apply_delta(&self, id: &AccountId, delta: i64) -> Result<i64> {
        let mut state = self.write()?;
        let account = state
            .accounts
            .get_mut(id)
            .ok_or_else(|| StoreError::not_found("account", id))?;

        let new_balance = account.coins + delta;
        if new_balance < 0 {
            return Err(StoreError::InsufficientFunds {
                balance: account.coins,
                required: -delta,
            });
        }
        account.coins = new_balance;
        Ok(new_balance)
    }
}

#[async_trait]
impl CatalogStore for MemoryStore {
    async fn put_item(&self, item: &NewCatalogItem) -> Result<CatalogItem> {
        let mut state = self.write()?;
        if state.item_names.contains_key(&item.name) {
            return Err(StoreError::Conflict(format!(
                "item already exists: {}",
                item.name
            )));
        }

        let created = CatalogItem {
            id: ItemId::generate(),
            name: item.name.clone(),
            price: item.price,
        };
        state.item_names.insert(created.name.clone(), created.id);
        state.items.insert(created.id, created.clone());
        Ok(created)
    }

    async fn get_item_by_name(&self, name: &str) -> Result<Option<CatalogItem>> {
        let state = self.read()?;
        Ok(state
            .item_names
            .get(name)
            .and_then(|id| state.items.get(id))
            .cloned())
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        let state = self.read()?;
        Ok(state
            .item_names
            .values()
            .filter_map(|id| state.items.get(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let mut state = self.write()?;
        state.last_entry_seq += 1;
        let id = LedgerEntryId::new(state.last_entry_seq);
        let stored = entry.into_entry(id, Utc::now());
        state.ledger.push(stored.clone());
        Ok(stored)
    }

    async fn list_entries_for_account(&self, id: &AccountId) -> Result<Vec<LedgerEntry>> {
        let state = self.read()?;
        Ok(state
            .ledger
            .iter()
            .rev()
            .filter(|entry| entry.involves(id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InventoryStore for MemoryStore {
    async fn add_inventory(
        &self,
        account_id: &AccountId,
        item_id: &ItemId,
    ) -> Result<InventoryRecord> {
        let mut state = self.write()?;
        let record = InventoryRecord::new(*account_id, *item_id);
        state.inventory.push(record.clone());
        Ok(record)
    }

    async fn list_inventory(&self, account_id: &AccountId) -> Result<Vec<InventoryItem>> {
        let state = self.read()?;
        let mut counts: BTreeMap<&str, u64> = BTreeMap::new();
        for record in state.inventory.iter().filter(|r| r.account_id == *account_id) {
            let item = state
                .items
                .get(&record.item_id)
                .ok_or_else(|| StoreError::not_found("item", record.item_id))?;
            *counts.entry(item.name.as_str()).or_default() += 1;
        }

        Ok(counts
            .into_iter()
            .map(|(name, quantity)| InventoryItem::new(name, quantity))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn account_create_and_lookup() {
        let store = MemoryStore::new();
        let account = store.create_account("alice", "hash", 1000).await.unwrap();

        let by_id = store.get_account(&account.id).await.unwrap().unwrap();
        let by_name = store.get_account_by_username("alice").await.unwrap().unwrap();
        assert_eq!(by_id, account);
        assert_eq!(by_name, account);
        assert!(store.get_account_by_username("bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn duplicate_username_conflicts() {
        let store = MemoryStore::new();
        store.create_account("alice", "hash", 1000).await.unwrap();

        let result = store.create_account("alice", "other", 1000).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn apply_delta_updates_balance() {
        let store = MemoryStore::new();
        let account = store.create_account("alice", "hash", 1000).await.unwrap();

        assert_eq!(store.apply_delta(&account.id, -300).await.unwrap(), 700);
        assert_eq!(store.apply_delta(&account.id, 50).await.unwrap(), 750);
    }

    #[tokio::test]
    async fn apply_delta_refuses_negative_balance() {
        let store = MemoryStore::new();
        let account = store.create_account("alice", "hash", 100).await.unwrap();

        let result = store.apply_delta(&account.id, -101).await;
        assert!(matches!(
            result,
            Err(StoreError::InsufficientFunds {
                balance: 100,
                required: 101
            })
        ));
        let account = store.get_account(&account.id).await.unwrap().unwrap();
        assert_eq!(account.coins, 100);
    }

    #[tokio::test]
    async fn apply_delta_missing_account() {
        let store = MemoryStore::new();
        let result = store.apply_delta(&AccountId::generate(), 10).await;
        assert!(matches!(result, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    async fn ledger_lists_newest_first_for_both_sides() {
        let store = MemoryStore::new();
        let alice = AccountId::generate();
        let bob = AccountId::generate();
        let carol = AccountId::generate();

        let first = store
            .append_entry(NewLedgerEntry::transfer(alice, bob, 10))
            .await
            .unwrap();
        let second = store
            .append_entry(NewLedgerEntry::purchase(alice, 20))
            .await
            .unwrap();
        store
            .append_entry(NewLedgerEntry::transfer(carol, bob, 30))
            .await
            .unwrap();

        assert!(first.id < second.id);

        let entries = store.list_entries_for_account(&alice).await.unwrap();
        let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![20, 10]);

        let entries = store.list_entries_for_account(&bob).await.unwrap();
        let amounts: Vec<i64> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![30, 10]);
    }

    #[tokio::test]
    async fn inventory_groups_by_item_name() {
        let store = MemoryStore::new();
        let alice = AccountId::generate();
        let cup = store.put_item(&NewCatalogItem::new("cup", 20)).await.unwrap();
        let book = store.put_item(&NewCatalogItem::new("book", 50)).await.unwrap();

        store.add_inventory(&alice, &cup.id).await.unwrap();
        store.add_inventory(&alice, &book.id).await.unwrap();
        store.add_inventory(&alice, &cup.id).await.unwrap();
        store.add_inventory(&AccountId::generate(), &cup.id).await.unwrap();

        let inventory = store.list_inventory(&alice).await.unwrap();
        assert_eq!(
            inventory,
            vec![InventoryItem::new("book", 1), InventoryItem::new("cup", 2)]
        );
    }

    #[tokio::test]
    async fn catalog_lists_by_name() {
        let store = MemoryStore::new();
        store.put_item(&NewCatalogItem::new("pen", 10)).await.unwrap();
        store.put_item(&NewCatalogItem::new("cup", 20)).await.unwrap();

        let names: Vec<String> = store
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .collect();
        assert_eq!(names, vec!["cup", "pen"]);

        let duplicate = store.put_item(&NewCatalogItem::new("pen", 11)).await;
        assert!(matches!(duplicate, Err(StoreError::Conflict(_))));
    }
}
