//! Application state.

use std::sync::Arc;

use coin_shop_engine::{ShopEngine, TokenSigner};
use coin_shop_store::Store;

use crate::config::ServiceConfig;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// The ledger engine.
    pub engine: ShopEngine,

    /// Service configuration.
    pub config: ServiceConfig,
}

impl AppState {
    /// Create a new application state over `store`.
    #[must_use]
    pub fn new(store: Arc<dyn Store>, config: ServiceConfig) -> Self {
        let signer = TokenSigner::new(config.jwt_secret.as_bytes());
        Self {
            engine: ShopEngine::new(store, signer),
            config,
        }
    }
}
