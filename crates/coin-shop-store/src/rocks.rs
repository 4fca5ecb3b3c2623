//! `RocksDB` storage implementation.
//!
//! Read-modify-write sequences (balance deltas, unique-name checks and the
//! ledger sequence) run under a single in-process write lock. Multi-key writes
//! go through a `WriteBatch` so indexes never point at missing records.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use rocksdb::{
    BoundColumnFamily, ColumnFamilyDescriptor, DBWithThreadMode, Direction, IteratorMode,
    MultiThreaded, Options, WriteBatch,
};

use coin_shop_core::{
    Account, AccountId, CatalogItem, InventoryItem, InventoryRecord, ItemId, LedgerEntry,
    LedgerEntryId, NewCatalogItem, NewLedgerEntry,
};

use crate::error::{Result, StoreError};
use crate::keys;
use crate::schema::{all_column_families, cf};
use crate::{AccountStore, CatalogStore, InventoryStore, LedgerStore};

/// RocksDB-backed storage implementation.
pub struct RocksStore {
    db: Arc<DBWithThreadMode<MultiThreaded>>,
    write_lock: Mutex<()>,
}

impl std::fmt::Debug for RocksStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RocksStore")
            .field("path", &self.db.path())
            .finish_non_exhaustive()
    }
}

fn db_err(e: impl std::fmt::Display) -> StoreError {
    StoreError::Database(e.to_string())
}

impl RocksStore {
    /// Open or create a `RocksDB` database at the given path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or created.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_descriptors: Vec<_> = all_column_families()
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()))
            .collect();

        let db = DBWithThreadMode::open_cf_descriptors(&opts, path, cf_descriptors)
            .map_err(db_err)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Mutex::new(()),
        })
    }

    /// Get a column family handle.
    fn cf(&self, name: &str) -> Result<Arc<BoundColumnFamily<'_>>> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| StoreError::Database(format!("column family not found: {name}")))
    }

    fn lock(&self) -> Result<MutexGuard<'_, ()>> {
        self.write_lock
            .lock()
            .map_err(|_| StoreError::Database("write lock poisoned".into()))
    }

    /// Serialize a value using CBOR.
    fn serialize<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(value, &mut buf)
            .map_err(|e| StoreError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize a value from CBOR.
    fn deserialize<T: serde::de::DeserializeOwned>(data: &[u8]) -> Result<T> {
        ciborium::from_reader(data).map_err(|e| StoreError::Serialization(e.to_string()))
    }

    fn get_value<T: serde::de::DeserializeOwned>(
        &self,
        cf_name: &str,
        key: &[u8],
    ) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        self.db
            .get_cf(&cf, key)
            .map_err(db_err)?
            .map(|data| Self::deserialize(&data))
            .transpose()
    }

    fn read_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.get_value(cf::ACCOUNTS, &keys::account_key(id))
    }

    fn read_item(&self, id: &ItemId) -> Result<Option<CatalogItem>> {
        self.get_value(cf::CATALOG, &keys::item_key(id))
    }

    fn last_ledger_seq(&self) -> Result<u64> {
        let cf = self.cf(cf::META)?;
        let Some(raw) = self.db.get_cf(&cf, keys::LEDGER_SEQ_KEY).map_err(db_err)? else {
            return Ok(0);
        };
        let bytes: [u8; 8] = raw
            .as_slice()
            .try_into()
            .map_err(|_| StoreError::Serialization("corrupt ledger sequence".into()))?;
        Ok(u64::from_be_bytes(bytes))
    }

    /// Index keys for `account` in `cf_name`, in key order or reversed.
    fn index_scan(
        &self,
        cf_name: &str,
        account: &AccountId,
        newest_first: bool,
    ) -> Result<Vec<(Box<[u8]>, Box<[u8]>)>> {
        let cf = self.cf(cf_name)?;
        let prefix = keys::account_prefix(account);
        let end = keys::account_prefix_end(account);

        let mode = if newest_first {
            match &end {
                Some(end) => IteratorMode::From(end, Direction::Reverse),
                None => IteratorMode::End,
            }
        } else {
            IteratorMode::From(&prefix, Direction::Forward)
        };

        let mut rows = Vec::new();
        for item in self.db.iterator_cf(&cf, mode) {
            let (key, value) = item.map_err(db_err)?;
            if !key.starts_with(&prefix) {
                break;
            }
            rows.push((key, value));
        }
        Ok(rows)
    }
}

#[async_trait]
impl AccountStore for RocksStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_coins: i64,
    ) -> Result<Account> {
        let _guard = self.lock()?;
        let cf_accounts = self.cf(cf::ACCOUNTS)?;
        let cf_usernames = self.cf(cf::ACCOUNTS_BY_USERNAME)?;

        let username_key = keys::username_key(username);
        if self
            .db
            .get_cf(&cf_usernames, &username_key)
            .map_err(db_err)?
            .is_some()
        {
            return Err(StoreError::Conflict(format!(
                "username already taken: {username}"
            )));
        }

        let account = Account::new(username, password_hash, starting_coins);
        let value = Self::serialize(&account)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_accounts, keys::account_key(&account.id), &value);
        batch.put_cf(&cf_usernames, &username_key, account.id.as_bytes());
        self.db.write(batch).map_err(db_err)?;

        Ok(account)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        self.read_account(id)
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        let cf = self.cf(cf::ACCOUNTS_BY_USERNAME)?;
        let Some(raw) = self
            .db
            .get_cf(&cf, keys::username_key(username))
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let id = keys::account_id_from_value(&raw)
            .ok_or_else(|| StoreError::Serialization("corrupt username index".into()))?;
        self.read_account(&id)
    }

    async fn apply_delta(&self, id: &AccountId, delta: i64) -> Result<i64> {
        let _guard = self.lock()?;
        let mut account = self
            .read_account(id)?
            .ok_or_else(|| StoreError::not_found("account", id))?;

        let new_balance = account.coins + delta;
        if new_balance < 0 {
            return Err(StoreError::InsufficientFunds {
                balance: account.coins,
                required: -delta,
            });
        }
        account.coins = new_balance;

        let cf = self.cf(cf::ACCOUNTS)?;
        let value = Self::serialize(&account)?;
        self.db
            .put_cf(&cf, keys::account_key(id), value)
            .map_err(db_err)?;

        Ok(new_balance)
    }
}

#[async_trait]
impl CatalogStore for RocksStore {
    async fn put_item(&self, item: &NewCatalogItem) -> Result<CatalogItem> {
        let _guard = self.lock()?;
        let cf_catalog = self.cf(cf::CATALOG)?;
        let cf_names = self.cf(cf::CATALOG_BY_NAME)?;

        let name_key = keys::item_name_key(&item.name);
        if self.db.get_cf(&cf_names, &name_key).map_err(db_err)?.is_some() {
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
        let value = Self::serialize(&created)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_catalog, keys::item_key(&created.id), &value);
        batch.put_cf(&cf_names, &name_key, created.id.as_bytes());
        self.db.write(batch).map_err(db_err)?;

        Ok(created)
    }

    async fn get_item_by_name(&self, name: &str) -> Result<Option<CatalogItem>> {
        let cf = self.cf(cf::CATALOG_BY_NAME)?;
        let Some(raw) = self
            .db
            .get_cf(&cf, keys::item_name_key(name))
            .map_err(db_err)?
        else {
            return Ok(None);
        };
        let id = keys::item_id_from_value(&raw)
            .ok_or_else(|| StoreError::Serialization("corrupt catalog index".into()))?;
        self.read_item(&id)
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        // The name index iterates in name order.
        let cf = self.cf(cf::CATALOG_BY_NAME)?;
        let mut items = Vec::new();
        for entry in self.db.iterator_cf(&cf, IteratorMode::Start) {
            let (_, value) = entry.map_err(db_err)?;
            let id = keys::item_id_from_value(&value)
                .ok_or_else(|| StoreError::Serialization("corrupt catalog index".into()))?;
            if let Some(item) = self.read_item(&id)? {
                items.push(item);
            }
        }
        Ok(items)
    }
}

#[async_trait]
impl LedgerStore for RocksStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let _guard = self.lock()?;
        let cf_ledger = self.cf(cf::LEDGER)?;
        let cf_by_account = self.cf(cf::LEDGER_BY_ACCOUNT)?;
        let cf_meta = self.cf(cf::META)?;

        let id = LedgerEntryId::new(self.last_ledger_seq()? + 1);
        let stored = entry.into_entry(id, Utc::now());
        let value = Self::serialize(&stored)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_ledger, keys::ledger_key(id), &value);
        batch.put_cf(&cf_by_account, keys::account_ledger_key(&stored.from, id), []);
        if let Some(to) = stored.kind.recipient() {
            if *to != stored.from {
                batch.put_cf(&cf_by_account, keys::account_ledger_key(to, id), []);
            }
        }
        batch.put_cf(&cf_meta, keys::LEDGER_SEQ_KEY, id.to_be_bytes());
        self.db.write(batch).map_err(db_err)?;

        Ok(stored)
    }

    async fn list_entries_for_account(&self, id: &AccountId) -> Result<Vec<LedgerEntry>> {
        let rows = self.index_scan(cf::LEDGER_BY_ACCOUNT, id, true)?;

        let mut entries = Vec::with_capacity(rows.len());
        for (key, _) in rows {
            let seq = keys::ledger_id_from_account_key(&key)
                .ok_or_else(|| StoreError::Serialization("corrupt ledger index".into()))?;
            if let Some(entry) = self.get_value(cf::LEDGER, &keys::ledger_key(seq))? {
                entries.push(entry);
            }
        }
        Ok(entries)
    }
}

#[async_trait]
impl InventoryStore for RocksStore {
    async fn add_inventory(
        &self,
        account_id: &AccountId,
        item_id: &ItemId,
    ) -> Result<InventoryRecord> {
        let cf_inventory = self.cf(cf::INVENTORY)?;
        let cf_by_account = self.cf(cf::INVENTORY_BY_ACCOUNT)?;

        let record = InventoryRecord::new(*account_id, *item_id);
        let value = Self::serialize(&record)?;

        let mut batch = WriteBatch::default();
        batch.put_cf(&cf_inventory, keys::inventory_key(&record.id), &value);
        batch.put_cf(
            &cf_by_account,
            keys::account_inventory_key(account_id, &record.id),
            item_id.as_bytes(),
        );
        self.db.write(batch).map_err(db_err)?;

        Ok(record)
    }

    async fn list_inventory(&self, account_id: &AccountId) -> Result<Vec<InventoryItem>> {
        let rows = self.index_scan(cf::INVENTORY_BY_ACCOUNT, account_id, false)?;

        let mut names: BTreeMap<ItemId, String> = BTreeMap::new();
        let mut counts: BTreeMap<String, u64> = BTreeMap::new();
        for (_, value) in rows {
            let item_id = keys::item_id_from_value(&value)
                .ok_or_else(|| StoreError::Serialization("corrupt inventory index".into()))?;
            if !names.contains_key(&item_id) {
                let item = self
                    .read_item(&item_id)?
                    .ok_or_else(|| StoreError::not_found("item", item_id))?;
                names.insert(item_id, item.name);
            }
            if let Some(name) = names.get(&item_id) {
                *counts.entry(name.clone()).or_default() += 1;
            }
        }

        Ok(counts
            .into_iter()
            .map(|(name, quantity)| InventoryItem::new(name, quantity))
            .collect())
    }
}
