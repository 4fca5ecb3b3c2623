//! Key encoding utilities for `RocksDB`.
//!
//! Composite index keys put the 16-byte account id first so a prefix scan
//! returns everything belonging to one account.

use coin_shop_core::{AccountId, InventoryRecordId, ItemId, LedgerEntryId};

/// Key in [`cf::META`](crate::schema::cf::META) holding the last ledger sequence.
pub const LEDGER_SEQ_KEY: &[u8] = b"ledger_seq";

/// Create an account key from an account ID.
#[must_use]
pub fn account_key(id: &AccountId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Create a username index key.
#[must_use]
pub fn username_key(username: &str) -> Vec<u8> {
    username.as_bytes().to_vec()
}

/// Create a catalog key from an item ID.
#[must_use]
pub fn item_key(id: &ItemId) -> Vec<u8> {
    id.as_bytes().to_vec()
}

/// Create a catalog name index key.
#[must_use]
pub fn item_name_key(name: &str) -> Vec<u8> {
    name.as_bytes().to_vec()
}

/// Create a ledger key. Big-endian so keys sort by sequence.
#[must_use]
pub fn ledger_key(id: LedgerEntryId) -> Vec<u8> {
    id.to_be_bytes().to_vec()
}

/// Create an account-ledger index key.
///
/// Format: `account_id (16 bytes) || seq (8 bytes, big-endian)`
#[must_use]
pub fn account_ledger_key(account: &AccountId, id: LedgerEntryId) -> Vec<u8> {
    let mut key = Vec::with_capacity(24);
    key.extend_from_slice(account.as_bytes());
    key.extend_from_slice(&id.to_be_bytes());
    key
}

/// Prefix for iterating all ledger entries of an account.
#[must_use]
pub fn account_prefix(account: &AccountId) -> Vec<u8> {
    account.as_bytes().to_vec()
}

/// Smallest key greater than every key starting with `account`.
///
/// Returns `None` for the all-`0xff` id, which has no upper bound.
#[must_use]
pub fn account_prefix_end(account: &AccountId) -> Option<Vec<u8>> {
    let mut end = account.as_bytes().to_vec();
    while let Some(last) = end.pop() {
        if last < u8::MAX {
            end.push(last + 1);
            return Some(end);
        }
    }
    None
}

/// Extract the ledger id from an account-ledger index key.
///
/// Returns `None` if the key is not 24 bytes long.
#[must_use]
pub fn ledger_id_from_account_key(key: &[u8]) -> Option<LedgerEntryId> {
    let bytes: [u8; 8] = key.get(16..24)?.try_into().ok()?;
    (key.len() == 24).then(|| LedgerEntryId::from_be_bytes(bytes))
}

/// Create an inventory key from a record ID.
#[must_use]
pub fn inventory_key(id: &InventoryRecordId) -> Vec<u8> {
    id.to_bytes().to_vec()
}

/// Create an account-inventory index key.
///
/// Format: `account_id (16 bytes) || record_id (16 bytes)`
#[must_use]
pub fn account_inventory_key(account: &AccountId, id: &InventoryRecordId) -> Vec<u8> {
    let mut key = Vec::with_capacity(32);
    key.extend_from_slice(account.as_bytes());
    key.extend_from_slice(&id.to_bytes());
    key
}

/// Decode a 16-byte item id stored as an index value.
#[must_use]
pub fn item_id_from_value(value: &[u8]) -> Option<ItemId> {
    let bytes: [u8; 16] = value.try_into().ok()?;
    Some(ItemId::from_bytes(bytes))
}

/// Decode a 16-byte account id stored as an index value.
#[must_use]
pub fn account_id_from_value(value: &[u8]) -> Option<AccountId> {
    let bytes: [u8; 16] = value.try_into().ok()?;
    Some(AccountId::from_bytes(bytes))
}
