//! Core types and utilities for the coin shop.
//!
//! This crate provides the foundational types used throughout the shop:
//!
//! - **Identifiers**: `AccountId`, `ItemId`, `LedgerEntryId`, `InventoryRecordId`
//! - **Accounts**: `Account` and the starting balance
//! - **Catalog**: `CatalogItem` and the default merch list
//! - **Ledger**: `LedgerEntry`, `LedgerKind`, `NewLedgerEntry`
//! - **Inventory**: `InventoryRecord`, `InventoryItem`
//! - **Statements**: `Statement`, `CoinHistory`
//!
//! # Coins
//!
//! Coins are whole units stored as `i64`. There is no fractional currency and
//! no rounding anywhere in the shop. Every new account starts with
//! [`STARTING_COINS`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod account;
pub mod catalog;
pub mod error;
pub mod ids;
pub mod inventory;
pub mod ledger;
pub mod statement;

pub use account::{Account, STARTING_COINS};
pub use catalog::{default_catalog, CatalogItem, NewCatalogItem};
pub use error::{Result, ShopError};
pub use ids::{AccountId, IdError, InventoryRecordId, ItemId, LedgerEntryId};
pub use inventory::{InventoryItem, InventoryRecord};
pub use ledger::{LedgerEntry, LedgerKind, NewLedgerEntry};
pub use statement::{
    CoinHistory, CoinReceived, CoinSent, Statement, SHOP_COUNTERPARTY, UNKNOWN_COUNTERPARTY,
};
