//! `PostgreSQL` storage implementation.
//!
//! The non-negative balance rule is enforced twice: by a `CHECK` constraint
//! and by the conditional `UPDATE` in [`AccountStore::apply_delta`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::Row;
use uuid::Uuid;

use coin_shop_core::{
    Account, AccountId, CatalogItem, InventoryItem, InventoryRecord, ItemId, LedgerEntry,
    LedgerEntryId, LedgerKind, NewCatalogItem, NewLedgerEntry,
};

use crate::error::{Result, StoreError};
use crate::{AccountStore, CatalogStore, InventoryStore, LedgerStore};

const SCHEMA: [&str; 7] = [
    r"
    CREATE TABLE IF NOT EXISTS accounts (
        id UUID PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        coins BIGINT NOT NULL CHECK (coins >= 0),
        created_at TIMESTAMPTZ NOT NULL
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS catalog_items (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL UNIQUE,
        price BIGINT NOT NULL CHECK (price > 0)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS ledger_entries (
        id BIGSERIAL PRIMARY KEY,
        from_account UUID NOT NULL,
        to_account UUID,
        kind TEXT NOT NULL,
        amount BIGINT NOT NULL CHECK (amount > 0),
        created_at TIMESTAMPTZ NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS ledger_entries_from_idx ON ledger_entries (from_account)",
    "CREATE INDEX IF NOT EXISTS ledger_entries_to_idx ON ledger_entries (to_account)",
    r"
    CREATE TABLE IF NOT EXISTS inventory_records (
        id TEXT PRIMARY KEY,
        account_id UUID NOT NULL,
        item_id UUID NOT NULL REFERENCES catalog_items (id),
        acquired_at TIMESTAMPTZ NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS inventory_records_account_idx ON inventory_records (account_id)",
];

/// PostgreSQL-backed storage implementation.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

fn db_err(e: sqlx::Error) -> StoreError {
    StoreError::Database(e.to_string())
}

impl PgStore {
    /// Connect to `PostgreSQL` and create the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema setup fails.
    pub async fn connect(database_url: &str) -> Result<Self> {
        Self::connect_with_options(database_url, 10, 5).await
    }

    /// Connect with explicit pool parameters.
    ///
    /// # Errors
    ///
    /// Returns an error if the connection or schema setup fails.
    pub async fn connect_with_options(
        database_url: &str,
        max_connections: u32,
        connect_timeout_secs: u64,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(std::time::Duration::from_secs(connect_timeout_secs))
            .connect(database_url)
            .await
            .map_err(|e| StoreError::Database(format!("failed to connect postgres: {e}")))?;
        Self::from_pool(pool).await
    }

    /// Wrap an existing pool and create the schema if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if schema setup fails.
    pub async fn from_pool(pool: PgPool) -> Result<Self> {
        let store = Self { pool };
        store.init_schema().await?;
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        for stmt in SCHEMA {
            sqlx::query(stmt)
                .execute(&self.pool)
                .await
                .map_err(|e| StoreError::Database(format!("schema init failed: {e}")))?;
        }
        Ok(())
    }
}

fn account_from_row(row: &PgRow) -> Result<Account> {
    Ok(Account {
        id: AccountId::from_uuid(row.try_get("id").map_err(db_err)?),
        username: row.try_get("username").map_err(db_err)?,
        password_hash: row.try_get("password_hash").map_err(db_err)?,
        coins: row.try_get("coins").map_err(db_err)?,
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn item_from_row(row: &PgRow) -> Result<CatalogItem> {
    Ok(CatalogItem {
        id: ItemId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        price: row.try_get("price").map_err(db_err)?,
    })
}

fn entry_from_row(row: &PgRow) -> Result<LedgerEntry> {
    let seq: i64 = row.try_get("id").map_err(db_err)?;
    let seq = u64::try_from(seq)
        .map_err(|_| StoreError::Serialization(format!("negative ledger id: {seq}")))?;
    let kind: String = row.try_get("kind").map_err(db_err)?;
    let to: Option<Uuid> = row.try_get("to_account").map_err(db_err)?;

    let kind = match (kind.as_str(), to) {
        ("TRANSFER", Some(to)) => LedgerKind::Transfer {
            to: AccountId::from_uuid(to),
        },
        ("PURCHASE", None) => LedgerKind::Purchase,
        (other, _) => {
            return Err(StoreError::Serialization(format!(
                "malformed ledger entry {seq}: kind {other}"
            )))
        }
    };

    let created_at: DateTime<Utc> = row.try_get("created_at").map_err(db_err)?;
    Ok(LedgerEntry {
        id: LedgerEntryId::new(seq),
        from: AccountId::from_uuid(row.try_get("from_account").map_err(db_err)?),
        kind,
        amount: row.try_get("amount").map_err(db_err)?,
        created_at,
    })
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_account(
        &self,
        username: &str,
        password_hash: &str,
        starting_coins: i64,
    ) -> Result<Account> {
        let account = Account::new(username, password_hash, starting_coins);
        let inserted = sqlx::query(
            r"
            INSERT INTO accounts (id, username, password_hash, coins, created_at)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (username) DO NOTHING
            RETURNING id
            ",
        )
        .bind(*account.id.as_uuid())
        .bind(&account.username)
        .bind(&account.password_hash)
        .bind(account.coins)
        .bind(account.created_at)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if inserted.is_none() {
            return Err(StoreError::Conflict(format!(
                "username already taken: {username}"
            )));
        }
        Ok(account)
    }

    async fn get_account(&self, id: &AccountId) -> Result<Option<Account>> {
        sqlx::query("SELECT id, username, password_hash, coins, created_at FROM accounts WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(account_from_row)
            .transpose()
    }

    async fn get_account_by_username(&self, username: &str) -> Result<Option<Account>> {
        sqlx::query(
            "SELECT id, username, password_hash, coins, created_at FROM accounts WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .as_ref()
        .map(account_from_row)
        .transpose()
    }

    async fn apply_delta(&self, id: &AccountId, delta: i64) -> Result<i64> {
        let updated = sqlx::query(
            r"
            UPDATE accounts SET coins = coins + $1
            WHERE id = $2 AND coins + $1 >= 0
            RETURNING coins
            ",
        )
        .bind(delta)
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = updated {
            return row.try_get("coins").map_err(db_err);
        }

        // Nothing updated: either the account is missing or the delta overdraws it.
        let current = sqlx::query("SELECT coins FROM accounts WHERE id = $1")
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        match current {
            Some(row) => Err(StoreError::InsufficientFunds {
                balance: row.try_get("coins").map_err(db_err)?,
                required: -delta,
            }),
            None => Err(StoreError::not_found("account", id)),
        }
    }
}

#[async_trait]
impl CatalogStore for PgStore {
    async fn put_item(&self, item: &NewCatalogItem) -> Result<CatalogItem> {
        let created = CatalogItem {
            id: ItemId::generate(),
            name: item.name.clone(),
            price: item.price,
        };
        let inserted = sqlx::query(
            r"
            INSERT INTO catalog_items (id, name, price) VALUES ($1, $2, $3)
            ON CONFLICT (name) DO NOTHING
            RETURNING id
            ",
        )
        .bind(*created.id.as_uuid())
        .bind(&created.name)
        .bind(created.price)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if inserted.is_none() {
            return Err(StoreError::Conflict(format!(
                "item already exists: {}",
                item.name
            )));
        }
        Ok(created)
    }

    async fn get_item_by_name(&self, name: &str) -> Result<Option<CatalogItem>> {
        sqlx::query("SELECT id, name, price FROM catalog_items WHERE name = $1")
            .bind(name)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .as_ref()
            .map(item_from_row)
            .transpose()
    }

    async fn list_items(&self) -> Result<Vec<CatalogItem>> {
        sqlx::query("SELECT id, name, price FROM catalog_items ORDER BY name COLLATE \"C\"")
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?
            .iter()
            .map(item_from_row)
            .collect()
    }
}

#[async_trait]
impl LedgerStore for PgStore {
    async fn append_entry(&self, entry: NewLedgerEntry) -> Result<LedgerEntry> {
        let to = entry.kind.recipient().map(|id| *id.as_uuid());
        let row = sqlx::query(
            r"
            INSERT INTO ledger_entries (from_account, to_account, kind, amount, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, from_account, to_account, kind, amount, created_at
            ",
        )
        .bind(*entry.from.as_uuid())
        .bind(to)
        .bind(entry.kind.as_str())
        .bind(entry.amount)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;

        entry_from_row(&row)
    }

    async fn list_entries_for_account(&self, id: &AccountId) -> Result<Vec<LedgerEntry>> {
        sqlx::query(
            r"
            SELECT id, from_account, to_account, kind, amount, created_at
            FROM ledger_entries
            WHERE from_account = $1 OR to_account = $1
            ORDER BY id DESC
            ",
        )
        .bind(*id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?
        .iter()
        .map(entry_from_row)
        .collect()
    }
}

#[async_trait]
impl InventoryStore for PgStore {
    async fn add_inventory(
        &self,
        account_id: &AccountId,
        item_id: &ItemId,
    ) -> Result<InventoryRecord> {
        let record = InventoryRecord::new(*account_id, *item_id);
        sqlx::query(
            r"
            INSERT INTO inventory_records (id, account_id, item_id, acquired_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(record.id.to_string())
        .bind(*account_id.as_uuid())
        .bind(*item_id.as_uuid())
        .bind(record.acquired_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        Ok(record)
    }

    async fn list_inventory(&self, account_id: &AccountId) -> Result<Vec<InventoryItem>> {
        let rows = sqlx::query(
            r#"
            SELECT c.name, COUNT(*) AS quantity
            FROM inventory_records r
            JOIN catalog_items c ON c.id = r.item_id
            WHERE r.account_id = $1
            GROUP BY c.name
            ORDER BY c.name COLLATE "C"
            "#,
        )
        .bind(*account_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;

        rows.iter()
            .map(|row| {
                let name: String = row.try_get("name").map_err(db_err)?;
                let quantity: i64 = row.try_get("quantity").map_err(db_err)?;
                let quantity = u64::try_from(quantity)
                    .map_err(|_| StoreError::Serialization("negative item count".into()))?;
                Ok(InventoryItem::new(name, quantity))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    //! These run against a live database:
    //! `DATABASE_URL=postgres://... cargo test -p coin-shop-store --features postgres-backend -- --ignored`

    use super::*;

    async fn connect() -> PgStore {
        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        PgStore::connect(&url).await.unwrap()
    }

    fn unique(name: &str) -> String {
        format!("{name}-{}", Uuid::new_v4())
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn apply_delta_enforces_non_negative() {
        let store = connect().await;
        let account = store
            .create_account(&unique("alice"), "hash", 100)
            .await
            .unwrap();

        assert_eq!(store.apply_delta(&account.id, -40).await.unwrap(), 60);
        let overdraft = store.apply_delta(&account.id, -61).await;
        assert!(matches!(
            overdraft,
            Err(StoreError::InsufficientFunds { balance: 60, .. })
        ));

        let missing = store.apply_delta(&AccountId::generate(), 1).await;
        assert!(matches!(missing, Err(StoreError::NotFound { .. })));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn duplicate_username_conflicts() {
        let store = connect().await;
        let name = unique("bob");
        store.create_account(&name, "hash", 10).await.unwrap();
        let again = store.create_account(&name, "hash", 10).await;
        assert!(matches!(again, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn ledger_and_inventory_round_trip() {
        let store = connect().await;
        let alice = AccountId::generate();
        let bob = AccountId::generate();

        store
            .append_entry(NewLedgerEntry::transfer(alice, bob, 5))
            .await
            .unwrap();
        let purchase = store
            .append_entry(NewLedgerEntry::purchase(alice, 7))
            .await
            .unwrap();

        let entries = store.list_entries_for_account(&alice).await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, purchase.id);
        assert_eq!(entries[1].kind, LedgerKind::Transfer { to: bob });

        let item = store
            .put_item(&NewCatalogItem::new(unique("mug"), 3))
            .await
            .unwrap();
        store.add_inventory(&alice, &item.id).await.unwrap();
        store.add_inventory(&alice, &item.id).await.unwrap();

        let inventory = store.list_inventory(&alice).await.unwrap();
        assert_eq!(inventory, vec![InventoryItem::new(item.name, 2)]);
    }

    #[tokio::test]
    #[ignore = "requires PostgreSQL"]
    async fn names_sort_bytewise() {
        let store = connect().await;
        let prefix = unique("sort");
        // '-' sorts before letters bytewise; locale collations skip it
        let hyphenated = format!("{prefix}-zeta");
        let plain = format!("{prefix}alpha");

        let first = store
            .put_item(&NewCatalogItem::new(plain.clone(), 1))
            .await
            .unwrap();
        let second = store
            .put_item(&NewCatalogItem::new(hyphenated.clone(), 1))
            .await
            .unwrap();

        let names: Vec<String> = store
            .list_items()
            .await
            .unwrap()
            .into_iter()
            .map(|item| item.name)
            .filter(|name| name.starts_with(&prefix))
            .collect();
        assert_eq!(names, vec![hyphenated.clone(), plain.clone()]);

        let account = AccountId::generate();
        store.add_inventory(&account, &first.id).await.unwrap();
        store.add_inventory(&account, &second.id).await.unwrap();
        let inventory = store.list_inventory(&account).await.unwrap();
        assert_eq!(
            inventory,
            vec![InventoryItem::new(hyphenated, 1), InventoryItem::new(plain, 1)]
        );
    }
}
