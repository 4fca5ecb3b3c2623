//! Signed session tokens.
//!
//! Tokens are HS256 JWTs whose subject is the account id. They expire a fixed
//! [`TOKEN_TTL_SECS`] after issuance.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use coin_shop_core::{AccountId, Result, ShopError};

/// Token lifetime: 24 hours.
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// JWT claims carried by a session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account id.
    pub sub: String,
    /// Issued at (unix seconds).
    pub iat: i64,
    /// Expiry (unix seconds).
    pub exp: i64,
}

/// Issues and verifies session tokens with a shared secret.
#[derive(Clone)]
pub struct TokenSigner {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenSigner").finish_non_exhaustive()
    }
}

impl TokenSigner {
    /// Create a signer from a shared secret.
    #[must_use]
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
        }
    }

    /// Issue a token for `account` valid for [`TOKEN_TTL_SECS`].
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Internal` if encoding fails.
    pub fn issue(&self, account: &AccountId) -> Result<String> {
        self.issue_at(account, Utc::now())
    }

    /// Issue a token as if the current time were `now`.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Internal` if encoding fails.
    pub fn issue_at(&self, account: &AccountId, now: DateTime<Utc>) -> Result<String> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: account.to_string(),
            iat,
            exp: iat + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ShopError::Internal(format!("token encoding failed: {e}")))
    }

    /// Recover the account id from a token.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Auth` if the token is malformed, expired, signed
    /// with another secret, or names no valid account id.
    pub fn verify(&self, token: &str) -> Result<AccountId> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Token rejected");
            ShopError::Auth
        })?;

        let id: AccountId = data.claims.sub.parse().map_err(|_| ShopError::Auth)?;
        if id.is_nil() {
            return Err(ShopError::Auth);
        }
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn issue_then_verify() {
        let signer = TokenSigner::new(b"secret");
        let account = AccountId::generate();

        let token = signer.issue(&account).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), account);
    }

    #[test]
    fn expired_token_rejected() {
        let signer = TokenSigner::new(b"secret");
        let issued = Utc::now() - Duration::hours(25);

        let token = signer.issue_at(&AccountId::generate(), issued).unwrap();
        assert!(matches!(signer.verify(&token), Err(ShopError::Auth)));
    }

    #[test]
    fn still_valid_just_before_expiry() {
        let signer = TokenSigner::new(b"secret");
        let issued = Utc::now() - Duration::hours(23);

        let account = AccountId::generate();
        let token = signer.issue_at(&account, issued).unwrap();
        assert_eq!(signer.verify(&token).unwrap(), account);
    }

    #[test]
    fn wrong_secret_rejected() {
        let token = TokenSigner::new(b"one")
            .issue(&AccountId::generate())
            .unwrap();
        let result = TokenSigner::new(b"two").verify(&token);
        assert!(matches!(result, Err(ShopError::Auth)));
    }

    #[test]
    fn garbage_rejected() {
        let signer = TokenSigner::new(b"secret");
        assert!(matches!(signer.verify("not-a-jwt"), Err(ShopError::Auth)));
        assert!(matches!(signer.verify(""), Err(ShopError::Auth)));
    }

    #[test]
    fn nil_subject_rejected() {
        let signer = TokenSigner::new(b"secret");
        let token = signer.issue(&AccountId::nil()).unwrap();
        assert!(matches!(signer.verify(&token), Err(ShopError::Auth)));
    }
}
