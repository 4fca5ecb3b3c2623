//! Peer-to-peer coin transfers.
//!
//! A transfer is three durable writes: debit the sender, credit the
//! recipient, append the ledger entry. They are not atomic as a group. A
//! failed credit reverses the debit; a failed ledger append reverses both
//! balance changes.

use std::sync::Arc;

use coin_shop_core::{AccountId, LedgerEntry, NewLedgerEntry, Result, ShopError};
use coin_shop_store::Store;

use crate::saga::reverse_delta;

/// Moves coins between accounts.
#[derive(Clone)]
pub struct TransferEngine {
    store: Arc<dyn Store>,
}

impl TransferEngine {
    /// Create an engine over a store.
    #[must_use]
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Transfer `amount` coins from `sender` to the account named `to_username`.
    ///
    /// Returns the appended ledger entry.
    ///
    /// # Errors
    ///
    /// - `ShopError::InvalidAmount` if `amount <= 0`.
    /// - `ShopError::InvalidSender` if `sender` is the nil id.
    /// - `ShopError::Validation` if `to_username` names the sender.
    /// - `ShopError::NotFound` if the sender or recipient does not exist.
    /// - `ShopError::InsufficientFunds` if the sender cannot cover `amount`.
    /// - `ShopError::Internal` if a store write fails; earlier writes are
    ///   compensated first.
    pub async fn transfer(
        &self,
        sender: &AccountId,
        to_username: &str,
        amount: i64,
    ) -> Result<LedgerEntry> {
        if amount <= 0 {
            return Err(ShopError::InvalidAmount { amount });
        }
        if sender.is_nil() {
            return Err(ShopError::InvalidSender);
        }

        let from = self
            .store
            .get_account(sender)
            .await?
            .ok_or_else(|| ShopError::not_found("account", sender))?;

        if !from.has_sufficient_coins(amount) {
            tracing::debug!(account_id = %sender, balance = from.coins, amount, "Transfer rejected: insufficient funds");
            return Err(ShopError::InsufficientFunds {
                balance: from.coins,
                required: amount,
            });
        }

        let to = self
            .store
            .get_account_by_username(to_username)
            .await?
            .ok_or_else(|| ShopError::not_found("recipient", to_username))?;

        if to.id == from.id {
            return Err(ShopError::Validation("cannot transfer to yourself".into()));
        }

        let store = self.store.as_ref();

        store.apply_delta(&from.id, -amount).await?;
        tracing::debug!(account_id = %from.id, amount, "Sender debited");

        if let Err(e) = store.apply_delta(&to.id, amount).await {
            tracing::warn!(account_id = %to.id, error = %e, "Recipient credit failed, reversing debit");
            reverse_delta(store, &from.id, -amount, "transfer").await;
            return Err(e.into());
        }
        tracing::debug!(account_id = %to.id, amount, "Recipient credited");

        match store
            .append_entry(NewLedgerEntry::transfer(from.id, to.id, amount))
            .await
        {
            Ok(entry) => {
                tracing::info!(
                    from = %from.id,
                    to = %to.id,
                    amount,
                    entry_id = %entry.id,
                    "Transfer completed"
                );
                Ok(entry)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Ledger append failed, reversing transfer");
                reverse_delta(store, &to.id, amount, "transfer").await;
                reverse_delta(store, &from.id, -amount, "transfer").await;
                Err(e.into())
            }
        }
    }
}
