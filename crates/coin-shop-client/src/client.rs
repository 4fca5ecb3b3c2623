//! Coin shop HTTP client implementation.

use reqwest::{Client, RequestBuilder};
use std::time::Duration;

use crate::error::ClientError;
use crate::types::{
    ApiErrorResponse, AuthRequest, AuthResponse, HealthResponse, InfoResponse, ItemsResponse,
    SendCoinRequest, StatusResponse,
};

/// Coin shop API client.
///
/// Call [`authenticate`](Self::authenticate) (or use [`with_token`](Self::with_token))
/// before any account operation.
#[derive(Debug, Clone)]
pub struct CoinShopClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl CoinShopClient {
    /// Create a new client.
    ///
    /// # Arguments
    ///
    /// * `base_url` - Base URL of the coin shop service (e.g., `"http://localhost:8080"`)
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(base_url: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_options(base_url, ClientOptions::default())
    }

    /// Create a new client with custom options.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_options(
        base_url: impl Into<String>,
        options: ClientOptions,
    ) -> Result<Self, ClientError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Use an existing session token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// The current session token, if any.
    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Log in (registering on first use) and keep the returned token.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Unauthorized`] on a wrong password.
    pub async fn authenticate(
        &mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Result<String, ClientError> {
        let url = format!("{}/api/auth", self.base_url);
        let request = AuthRequest {
            username: username.into(),
            password: password.into(),
        };

        let response = self.client.post(&url).json(&request).send().await?;
        let auth: AuthResponse = Self::handle_response(response).await?;

        tracing::debug!(username = %request.username, "Authenticated");
        self.token = Some(auth.token.clone());
        Ok(auth.token)
    }

    /// Get the balance, inventory and coin history.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn info(&self) -> Result<InfoResponse, ClientError> {
        let url = format!("{}/api/info", self.base_url);
        let response = self.authorized(self.client.get(&url))?.send().await?;
        Self::handle_response(response).await
    }

    /// Send coins to another user.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InsufficientFunds`] or [`ClientError::NotFound`]
    /// for the corresponding server errors.
    pub async fn send_coin(
        &self,
        to_user: impl Into<String>,
        amount: i64,
    ) -> Result<(), ClientError> {
        let url = format!("{}/api/sendCoin", self.base_url);
        let request = SendCoinRequest {
            to_user: to_user.into(),
            amount,
        };

        let response = self
            .authorized(self.client.post(&url))?
            .json(&request)
            .send()
            .await?;
        let _: StatusResponse = Self::handle_response(response).await?;
        Ok(())
    }

    /// Buy one unit of `item`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn buy(&self, item: &str) -> Result<(), ClientError> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .map_err(|e| ClientError::Api {
                code: "invalid_url".to_string(),
                message: e.to_string(),
                status: 0,
            })?;
        url.path_segments_mut()
            .map_err(|()| ClientError::Api {
                code: "invalid_url".to_string(),
                message: format!("cannot be a base: {}", self.base_url),
                status: 0,
            })?
            .pop_if_empty()
            .extend(["api", "buy", item]);

        let response = self.authorized(self.client.get(url))?.send().await?;
        let _: StatusResponse = Self::handle_response(response).await?;
        Ok(())
    }

    /// List the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn items(&self) -> Result<ItemsResponse, ClientError> {
        let url = format!("{}/api/items", self.base_url);
        let response = self.authorized(self.client.get(&url))?.send().await?;
        Self::handle_response(response).await
    }

    /// Check service health.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server returns an error.
    pub async fn health(&self) -> Result<HealthResponse, ClientError> {
        let url = format!("{}/health", self.base_url);
        let response = self.client.get(&url).send().await?;
        Self::handle_response(response).await
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        let token = self.token.as_ref().ok_or(ClientError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Handle API response and convert errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();

        if status.is_success() {
            return Ok(response.json().await?);
        }

        // Try to parse error response
        let error_body: Result<ApiErrorResponse, _> = response.json().await;

        match error_body {
            Ok(api_error) => {
                let detail = |key: &str| {
                    api_error
                        .error
                        .details
                        .as_ref()
                        .and_then(|d| d.get(key))
                        .and_then(serde_json::Value::as_i64)
                        .unwrap_or(0)
                };

                // Map specific error codes to typed errors
                match api_error.error.code.as_str() {
                    "insufficient_funds" => Err(ClientError::InsufficientFunds {
                        balance: detail("balance"),
                        required: detail("required"),
                    }),
                    "not_found" => Err(ClientError::NotFound(api_error.error.message)),
                    "unauthorized" => Err(ClientError::Unauthorized),
                    code => Err(ClientError::Api {
                        code: code.to_string(),
                        message: api_error.error.message.clone(),
                        status: status.as_u16(),
                    }),
                }
            }
            Err(_) => Err(ClientError::Api {
                code: "unknown".to_string(),
                message: format!("HTTP {status}"),
                status: status.as_u16(),
            }),
        }
    }
}

/// Client options for customization.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Request timeout in seconds (default: 30).
    pub timeout_seconds: u64,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_seconds: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_trims_trailing_slash() {
        let client = CoinShopClient::new("http://localhost:8080/").unwrap();
        assert_eq!(client.base_url, "http://localhost:8080");
        assert!(client.token().is_none());
    }

    #[test]
    fn with_token_sets_token() {
        let client = CoinShopClient::new("http://localhost:8080")
            .unwrap()
            .with_token("abc");
        assert_eq!(client.token(), Some("abc"));
    }

    #[tokio::test]
    async fn account_calls_need_a_token() {
        let client = CoinShopClient::new("http://localhost:8080").unwrap();
        assert!(matches!(
            client.info().await,
            Err(ClientError::NotAuthenticated)
        ));
    }
}
