//! Storage layer for the coin shop.
//!
//! This crate provides persistent storage for accounts, the catalog, the coin
//! ledger, and inventory. Each concern has its own trait so the engines can
//! state exactly which stores they touch; [`Store`] bundles all four.
//!
//! # Backends
//!
//! - [`MemoryStore`]: always available, used by tests and ephemeral runs
//! - `RocksStore`: `RocksDB` with column families (feature `rocksdb-backend`)
//! - `PgStore`: `PostgreSQL` through `sqlx` (feature `postgres-backend`)
//!
//! # Balance updates
//!
//! Balances only change through [`AccountStore::apply_delta`], which applies a
//! signed delta to a single account atomically. Callers never read a balance,
//! compute a new value, and write it back.
//!
//! # Example
//!
//! ```no_run
//! use coin_shop_store::{AccountStore, MemoryStore};
//!
//! # async fn example() -> coin_shop_store::Result<()> {
//! let store = MemoryStore::new();
//! let account = store.create_account("alice", "hash", 1000).await?;
//! let balance = store.apply_delta(&account.id, -100).await?;
//! assert_eq!(balance, 900);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod error;
pub mod memory;
#[cfg(feature = "postgres-backend")]
pub mod postgres;
#[cfg(feature = "rocksdb-backend")]
pub mod keys;
#[cfg(feature = "rocksdb-backend")]
pub mod rocks;
#[cfg(feature = "rocksdb-backend")]
pub mod schema;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
#[cfg(feature = "postgres-backend")]
pub use postgres::PgStore;
#[cfg(feature = "rocksdb-backend")]
pub use rocks::RocksStore;

use async_trait::async_trait;
use coin_shop_core::{
    Account, AccountId, CatalogItem, InventoryItem, InventoryRecord, ItemId, LedgerEntry,
    NewCatalogItem, NewLedgerEntry,
};

/// Account records and balances.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Create an account with a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if the username is taken.
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_coins: i64,
    ) -> Result<Account>;

    /// Get an account by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>>;

    /// Get an account by username.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>>;

    /// Apply a signed delta to an account balance atomically.
    ///
    /// Returns the new balance after the update.
    ///
    /// # Errors
    ///
    /// - `StoreError::NotFound` if the account doesn't exist.
    /// - `StoreError::InsufficientFunds` if the balance would become negative;
    ///   nothing is written in that case.
    async fn apply_delta(&self, id: &AccountId, delta: i64) -> Result<i64>;
}

/// Purchasable items. Read-only at runtime apart from seeding.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Insert a new item.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Conflict` if an item with that name exists.
    async fn put_item(&self, item: &NewCatalogItem) -> Result<CatalogItem>;

    /// Get an item by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn get_item_by_name(&self, name: &str) -> Result<Option<CatalogItem>>;

    /// List all items ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_items(&self) -> Result<Vec<CatalogItem>>;
}

/// The append-only coin ledger.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Append an entry, assigning its id and timestamp.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry>;

    /// List entries where the account is sender or receiver, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_entries_for_account(&self, id: &AccountId) -> Result<Vec<LedgerEntry>>;
}

/// Owned items, one record per purchased unit.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    /// Record one unit of `item_id` for the account.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn add_inventory(&self, account_id: &AccountId, item_id: &ItemId)
        -> Result<InventoryRecord>;

    /// Count owned units grouped by item name, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    async fn list_inventory(&self, account_id: &AccountId) -> Result<Vec<InventoryItem>>;
}

/// All four stores behind one handle.
pub trait Store: AccountStore + CatalogStore + LedgerStore + InventoryStore {}

impl<T> Store for T where T: AccountStore + CatalogStore + LedgerStore + InventoryStore {}

/// Insert the catalog items that are not present yet.
///
/// Returns how many items were inserted. Existing items keep their price.
///
/// # Errors
///
/// Returns an error if a lookup or insert fails.
pub async fn seed_catalog<S>(store: &S, items: &[NewCatalogItem]) -> Result<usize>
where
    S: CatalogStore + ?Sized,
{
    let mut inserted = 0;
    for item in items {
        if store.get_item_by_name(&item.name).await?.is_some() {
            continue;
        }
        match store.put_item(item).await {
            Ok(created) => {
                tracing::debug!(item = %created.name, price = created.price, "Catalog item seeded");
                inserted += 1;
            }
            // Another writer seeded it between the lookup and the insert.
            Err(StoreError::Conflict(_)) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(inserted)
}
