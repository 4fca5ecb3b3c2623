//! Error types for the coin shop.

/// Result type for shop operations.
pub type Result<T> = std::result::Result<T, ShopError>;

/// Errors that can occur in shop operations.
#[derive(Debug, thiserror::Error)]
pub enum ShopError {
    /// Malformed input (empty username, empty item name, ...).
    #[error("validation error: {0}")]
    Validation(String),

    /// Transfer amount is zero or negative.
    #[error("invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount.
        amount: i64,
    },

    /// The sending account could not be resolved from the request.
    #[error("invalid sender")]
    InvalidSender,

    /// The buying account could not be resolved from the request.
    #[error("invalid account")]
    InvalidAccount,

    /// A resource already exists (duplicate registration).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Account, item, or recipient not found.
    #[error("{entity} not found: {key}")]
    NotFound {
        /// What kind of record was looked up.
        entity: &'static str,
        /// The key that was looked up.
        key: String,
    },

    /// Bad credentials or an invalid token.
    #[error("authentication failed")]
    Auth,

    /// Not enough coins for the operation.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// Storage or other infrastructure failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ShopError {
    /// Build a [`ShopError::NotFound`] for the given entity and key.
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }

    /// Whether this error came from infrastructure rather than from the request.
    #[must_use]
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal(_))
    }
}
