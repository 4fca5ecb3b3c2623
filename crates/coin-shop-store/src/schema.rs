//! Column families used by the `RocksDB` backend.

/// Column family names for the `RocksDB` database.
pub mod cf {
    /// Account records, keyed by `account_id`.
    pub const ACCOUNTS: &str = "accounts";

    /// Index: username to `account_id`.
    pub const ACCOUNTS_BY_USERNAME: &str = "accounts_by_username";

    /// Catalog items, keyed by `item_id`.
    pub const CATALOG: &str = "catalog";

    /// Index: item name to `item_id`.
    pub const CATALOG_BY_NAME: &str = "catalog_by_name";

    /// Ledger entries, keyed by the big-endian sequence number.
    pub const LEDGER: &str = "ledger";

    /// Index: ledger entries by participant, keyed by `account_id || seq`.
    /// Value is empty.
    pub const LEDGER_BY_ACCOUNT: &str = "ledger_by_account";

    /// Inventory records, keyed by `record_id` (ULID).
    pub const INVENTORY: &str = "inventory";

    /// Index: inventory by owner, keyed by `account_id || record_id`.
    /// Value is the `item_id`.
    pub const INVENTORY_BY_ACCOUNT: &str = "inventory_by_account";

    /// Counters and other bookkeeping.
    pub const META: &str = "meta";
}

/// Returns all column family names for database initialization.
#[must_use]
pub fn all_column_families() -> Vec<&'static str> {
    vec![
        cf::ACCOUNTS,
        cf::ACCOUNTS_BY_USERNAME,
        cf::CATALOG,
        cf::CATALOG_BY_NAME,
        cf::LEDGER,
        cf::LEDGER_BY_ACCOUNT,
        cf::INVENTORY,
        cf::INVENTORY_BY_ACCOUNT,
        cf::META,
    ]
}
