//! Client error types.

/// Errors that can occur when using the coin shop client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server returned an error response.
    #[error("API error: {code} - {message}")]
    Api {
        /// Error code.
        code: String,
        /// Error message.
        message: String,
        /// HTTP status code.
        status: u16,
    },

    /// Not enough coins.
    #[error("insufficient funds: balance={balance}, required={required}")]
    InsufficientFunds {
        /// Current balance.
        balance: i64,
        /// Required amount.
        required: i64,
    },

    /// User or item not found.
    #[error("not found: {0}")]
    NotFound(String),

    /// Bad credentials, or a missing or expired token.
    #[error("unauthorized")]
    Unauthorized,

    /// A call that needs a token was made before `authenticate`.
    #[error("not authenticated")]
    NotAuthenticated,
}
