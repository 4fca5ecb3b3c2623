//! Account statements: balance, inventory and categorized coin history.

use std::collections::HashMap;
use std::sync::Arc;

use coin_shop_core::{
    AccountId, CoinHistory, CoinReceived, CoinSent, LedgerKind, Result, ShopError, Statement,
    SHOP_COUNTERPARTY, UNKNOWN_COUNTERPARTY,
};
use coin_shop_store::Store;

/// Builds read-only statements from the stores.
#[derive(Clone)]
pub struct StatementBuilder {
    store: Arc<dyn Store>,
}

impl StatementBuilder {
    /// Create a builder over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Build the statement for `account_id`.
    ///
    /// History keeps the ledger's newest-first order within each partition.
    ///
    /// # Errors
    ///
    /// - `ShopError::NotFound` if the account does not exist.
    /// - `ShopError::Internal` if a store read fails.
    pub async fn build(&self, account_id: &AccountId) -> Result<Statement> {
        let account = self
            .store
            .get_account(account_id)
            .await?
            .ok_or_else(|| ShopError::not_found("account", account_id))?;

        let entries = self.store.list_entries_for_account(account_id).await?;

        let mut names = Usernames::new(self.store.as_ref());
        let mut history = CoinHistory::default();
        for entry in entries {
            if entry.is_received_by(account_id) {
                history.received.push(CoinReceived {
                    from_user: names.resolve(&entry.from).await?,
                    amount: entry.amount,
                });
                continue;
            }

            let to_user = match entry.kind {
                LedgerKind::Purchase => SHOP_COUNTERPARTY.to_string(),
                LedgerKind::Transfer { to } => names.resolve(&to).await?,
            };
            history.sent.push(CoinSent {
                to_user,
                amount: entry.amount,
            });
        }

        let inventory = self.store.list_inventory(account_id).await?;

        Ok(Statement {
            coins: account.coins,
            inventory,
            coin_history: history,
        })
    }
}

/// Per-statement cache of counterparty usernames.
struct Usernames<'a> {
    store: &'a dyn Store,
    cache: HashMap<AccountId, String>,
}

impl<'a> Usernames<'a> {
    fn new(store: &'a dyn Store) -> Self {
        Self {
            store,
            cache: HashMap::new(),
        }
    }

    async fn resolve(&mut self, id: &AccountId) -> Result<String> {
        if let Some(name) = self.cache.get(id) {
            return Ok(name.clone());
        }
        let name = match self.store.get_account(id).await? {
            Some(account) => account.username,
            None => UNKNOWN_COUNTERPARTY.to_string(),
        };
        self.cache.insert(*id, name.clone());
        Ok(name)
    }
}
