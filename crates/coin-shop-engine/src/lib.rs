//! The coin ledger engine.
//!
//! Keeps balances, the append-only ledger, and inventory consistent across
//! transfers and purchases. Each operation is a sequence of independent store
//! writes with backward compensation on failure; see [`TransferEngine`] and
//! [`PurchaseEngine`] for the exact steps.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use coin_shop_engine::{ShopEngine, TokenSigner};
//! use coin_shop_store::MemoryStore;
//!
//! # async fn example() -> coin_shop_core::Result<()> {
//! let engine = ShopEngine::new(Arc::new(MemoryStore::new()), TokenSigner::new(b"secret"));
//! let alice = engine.identity().register("alice", "pw").await?;
//! engine.identity().register("bob", "pw").await?;
//! engine.transfers().transfer(&alice.id, "bob", 100).await?;
//! let statement = engine.statements().build(&alice.id).await?;
//! assert_eq!(statement.coins, 900);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod identity;
pub mod password;
pub mod purchase;
mod saga;
pub mod statement;
#[cfg(test)]
mod testing;
pub mod token;
pub mod transfer;

pub use identity::IdentityService;
pub use purchase::{PurchaseEngine, PurchaseReceipt};
pub use statement::StatementBuilder;
pub use token::{Claims, TokenSigner, TOKEN_TTL_SECS};
pub use transfer::TransferEngine;

use std::sync::Arc;

use coin_shop_core::{CatalogItem, Result};
use coin_shop_store::Store;

/// All engine services over one shared store.
#[derive(Clone)]
pub struct ShopEngine {
    store: Arc<dyn Store>,
    identity: IdentityService,
    transfers: TransferEngine,
    purchases: PurchaseEngine,
    statements: StatementBuilder,
}

impl ShopEngine {
    /// Wire every service to `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, signer: TokenSigner) -> Self {
        Self {
            identity: IdentityService::new(store.clone(), signer),
            transfers: TransferEngine::new(store.clone()),
            purchases: PurchaseEngine::new(store.clone()),
            statements: StatementBuilder::new(store.clone()),
            store,
        }
    }

    /// Registration, login and token checks.
    #[must_use]
    pub fn identity(&self) -> &IdentityService {
        &self.identity
    }

    /// Peer-to-peer transfers.
    #[must_use]
    pub fn transfers(&self) -> &TransferEngine {
        &self.transfers
    }

    /// Catalog purchases.
    #[must_use]
    pub fn purchases(&self) -> &PurchaseEngine {
        &self.purchases
    }

    /// Account statements.
    #[must_use]
    pub fn statements(&self) -> &StatementBuilder {
        &self.statements
    }

    /// All catalog items, ordered by name.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Internal` if the store read fails.
    pub async fn catalog(&self) -> Result<Vec<CatalogItem>> {
        Ok(self.store.list_items().await?)
    }

    /// The underlying store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }
}
