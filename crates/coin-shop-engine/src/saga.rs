//! Backward compensation for multi-step balance operations.
//!
//! Transfers and purchases apply each step as an independent durable write.
//! When a later step fails, earlier balance deltas are reversed here. A
//! reversal that itself fails is logged and swallowed; the caller still
//! surfaces the error of the step that failed.

use coin_shop_core::AccountId;
use coin_shop_store::Store;

/// Undo a delta previously applied to `account`.
pub(crate) async fn reverse_delta(
    store: &dyn Store,
    account: &AccountId,
    applied: i64,
    operation: &'static str,
) {
    match store.apply_delta(account, -applied).await {
        Ok(balance) => {
            tracing::debug!(account_id = %account, delta = -applied, balance, operation, "Balance compensated");
        }
        Err(e) => {
            tracing::error!(
                account_id = %account,
                delta = -applied,
                operation,
                error = %e,
                "Compensation failed; balance left unreconciled"
            );
        }
    }
}
