//! Fault-injecting store used by the engine tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use coin_shop_core::{
    Account, AccountId, CatalogItem, InventoryItem, InventoryRecord, ItemId, LedgerEntry,
    NewCatalogItem, NewLedgerEntry, STARTING_COINS,
};
use coin_shop_store::{
    AccountStore, CatalogStore, InventoryStore, LedgerStore, MemoryStore, Result, StoreError,
};

type DeltaRule = Box<dyn Fn(&AccountId, i64) -> bool + Send + Sync>;

/// A [`MemoryStore`] whose writes can be made to fail on demand.
#[derive(Default)]
pub(crate) struct FaultyStore {
    inner: MemoryStore,
    delta_rule: Mutex<Option<DeltaRule>>,
    ledger_fails: AtomicBool,
    inventory_fails: AtomicBool,
    reads: AtomicUsize,
}

impl FaultyStore {
    /// Fail `apply_delta` calls matching `rule`.
    pub(crate) fn fail_delta_when(
        &self,
        rule: impl Fn(&AccountId, i64) -> bool + Send + Sync + 'static,
    ) {
        *self.delta_rule.lock().unwrap() = Some(Box::new(rule));
    }

    pub(crate) fn fail_ledger(&self, fail: bool) {
        self.ledger_fails.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_inventory(&self, fail: bool) {
        self.inventory_fails.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn clear_faults(&self) {
        *self.delta_rule.lock().unwrap() = None;
        self.fail_ledger(false);
        self.fail_inventory(false);
    }

    /// Account lookups served so far.
    pub(crate) fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    fn delta_fails(&self, id: &AccountId, delta: i64) -> bool {
        self.delta_rule
            .lock()
            .unwrap()
            .as_ref()
            .is_some_and(|rule| rule(id, delta))
    }
}

/// A store holding "alice" and "bob" with the starting balance each.
pub(crate) async fn seeded() -> (Arc<FaultyStore>, AccountId, AccountId) {
    let store = Arc::new(FaultyStore::default());
    let alice = store
        .inner
        .create_account("alice", "hash", STARTING_COINS)
        .await
        .unwrap();
    let bob = store
        .inner
        .create_account("bob", "hash", STARTING_COINS)
        .await
        .unwrap();
    (store, alice.id, bob.id)
}

#[async_trait]
impl AccountStore for FaultyStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_coins: i64,
    ) -> Result<Account> {
        self.inner
            .create_account(username, password_hash, starting_coins)
            .await
    }

    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_account(id).await
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.inner.get_account_by_username(username).await
    }

    async fn apply_delta(&self, id: &AccountId, delta: i64) -> Result<i64> {
        if self.delta_fails(id, delta) {
            return Err(StoreError::Database("injected balance fault".into()));
        }
        self.inner.apply_delta(id, delta).await
    }
}

#[async_trait]
impl CatalogStore for FaultyStore {
    async fn put_item(&self, item: &NewCatalogItem) -> Result<CatalogItem> {
        self.inner.put_item(item).await
    }

    async fn get_item_by_name(&self, name: &str) -> Result<Option<CatalogItem>> {
        self.inner.get_item_by_name(name).await
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        self.inner.list_items().await
    }
}

#[async_trait]
impl LedgerStore for FaultyStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        if self.ledger_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Database("injected ledger fault".into()));
        }
        self.inner.append_entry(entry).await
    }

    async fn list_entries_for_account(&self, id: &AccountId) -> Result<Vec<LedgerEntry>> {
        self.inner.list_entries_for_account(id).await
    }
}

#[async_trait]
impl InventoryStore for FaultyStore {
    async fn add_inventory(
        &self,
        account_id: &AccountId,
        item_id: &ItemId,
    ) -> Result<InventoryRecord> {
        if self.inventory_fails.load(Ordering::SeqCst) {
            return Err(StoreError::Database("injected inventory fault".into()));
        }
        self.inner.add_inventory(account_id, item_id).await
    }

    async fn list_inventory(&self, account_id: &AccountId) -> Result<Vec<InventoryItem>> {
        self.inner.list_inventory(account_id).await
    }
}
