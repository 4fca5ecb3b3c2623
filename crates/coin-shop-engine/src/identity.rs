//! Registration and authentication.

use std::sync::Arc;

use coin_shop_core::{Account, AccountId, Result, ShopError, STARTING_COINS};
use coin_shop_store::Store;

use crate::password::{hash_password, verify_password};
use crate::token::TokenSigner;

/// Owns password verification and token issuance.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn Store>,
    signer: TokenSigner,
}

fn require_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() || password.is_empty() {
        return Err(ShopError::Validation(
            "username and password are required".into(),
        ));
    }
    Ok(())
}

async fn blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| ShopError::Internal(format!("blocking task failed: {e}")))
}

impl IdentityService {
    /// Create the service over a store and token signer.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, signer: TokenSigner) -> Self {
        Self { store, signer }
    }

    /// Create an account with [`STARTING_COINS`].
    ///
    /// # Errors
    ///
    /// - `ShopError::Validation` if either field is empty.
    /// - `ShopError::Conflict` if the username is taken.
    pub async fn register(&self, username: &str, password: &str) -> Result<Account> {
        require_credentials(username, password)?;

        if self.store.get_account_by_username(username).await?.is_some() {
            return Err(ShopError::Conflict(format!(
                "username already taken: {username}"
            )));
        }

        let password = password.to_owned();
        let hash = blocking(move || hash_password(&password)).await??;
        let account = self
            .store
            .create_account(username, &hash, STARTING_COINS)
            .await?;

        tracing::info!(account_id = %account.id, username, "Account registered");
        Ok(account)
    }

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    ///
    /// - `ShopError::Validation` if either field is empty.
    /// - `ShopError::NotFound` if no such account exists.
    /// - `ShopError::Auth` if the password does not verify.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<String> {
        require_credentials(username, password)?;

        let account = self
            .store
            .get_account_by_username(username)
            .await?
            .ok_or_else(|| ShopError::not_found("account", username))?;

        let password = password.to_owned();
        let stored = account.password_hash.clone();
        if !blocking(move || verify_password(&password, &stored)).await? {
            tracing::debug!(account_id = %account.id, "Password mismatch");
            return Err(ShopError::Auth);
        }

        self.signer.issue(&account.id)
    }

    /// Log in, registering the username first if login fails.
    ///
    /// A wrong password for an existing username falls through to
    /// registration, which conflicts; that case ends in `ShopError::Auth`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Internal` for store failures and
    /// `ShopError::Auth` for every other failure.
    pub async fn login_or_register(&self, username: &str, password: &str) -> Result<String> {
        match self.authenticate(username, password).await {
            Ok(token) => return Ok(token),
            Err(e) if e.is_internal() => return Err(e),
            Err(e) => tracing::debug!(username, reason = %e, "Login failed, trying registration"),
        }

        if let Err(e) = self.register(username, password).await {
            if e.is_internal() {
                return Err(e);
            }
            tracing::warn!(username, reason = %e, "Authentication rejected");
            return Err(ShopError::Auth);
        }

        self.authenticate(username, password)
            .await
            .map_err(|e| if e.is_internal() { e } else { ShopError::Auth })
    }

    /// Recover the account id from a session token.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Auth` for any invalid token.
    pub fn verify_token(&self, token: &str) -> Result<AccountId> {
        self.signer.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_shop_store::{AccountStore, MemoryStore};

    fn service() -> (IdentityService, Arc<MemoryStore>) {
        let store = Arc::new(MemoryStore::new());
        let identity = IdentityService::new(store.clone(), TokenSigner::new(b"test"));
        (identity, store)
    }

    #[tokio::test]
    async fn register_starts_with_starting_coins() {
        let (identity, store) = service();
        let account = identity.register("alice", "pw").await.unwrap();

        assert_eq!(account.coins, STARTING_COINS);
        let stored = store.get_account(&account.id).await.unwrap().unwrap();
        assert_eq!(stored.coins, 1000);
        assert_ne!(stored.password_hash, "pw");
    }

    #[tokio::test]
    async fn register_rejects_empty_fields() {
        let (identity, _) = service();
        assert!(matches!(
            identity.register("", "pw").await,
            Err(ShopError::Validation(_))
        ));
        assert!(matches!(
            identity.register("alice", "").await,
            Err(ShopError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn register_twice_conflicts() {
        let (identity, _) = service();
        identity.register("alice", "pw").await.unwrap();
        assert!(matches!(
            identity.register("alice", "other").await,
            Err(ShopError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn authenticate_outcomes() {
        let (identity, _) = service();
        let account = identity.register("alice", "pw").await.unwrap();

        let token = identity.authenticate("alice", "pw").await.unwrap();
        assert_eq!(identity.verify_token(&token).unwrap(), account.id);

        assert!(matches!(
            identity.authenticate("alice", "wrong").await,
            Err(ShopError::Auth)
        ));
        assert!(matches!(
            identity.authenticate("bob", "pw").await,
            Err(ShopError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn login_or_register_creates_then_logs_in() {
        let (identity, store) = service();

        let first = identity.login_or_register("alice", "pw").await.unwrap();
        let second = identity.login_or_register("alice", "pw").await.unwrap();

        let account = store.get_account_by_username("alice").await.unwrap().unwrap();
        assert_eq!(identity.verify_token(&first).unwrap(), account.id);
        assert_eq!(identity.verify_token(&second).unwrap(), account.id);
        assert_eq!(account.coins, STARTING_COINS);
    }

    #[tokio::test]
    async fn login_or_register_wrong_password_is_auth() {
        let (identity, _) = service();
        identity.register("alice", "pw").await.unwrap();

        let result = identity.login_or_register("alice", "wrong").await;
        assert!(matches!(result, Err(ShopError::Auth)));
    }

    #[tokio::test]
    async fn login_or_register_empty_password_is_auth() {
        let (identity, _) = service();
        let result = identity.login_or_register("alice", "").await;
        assert!(matches!(result, Err(ShopError::Auth)));
    }
}
