//! Coin Shop Client SDK.
//!
//! Async client for the coin shop HTTP API.
//!
//! # Example
//!
//! ```no_run
//! use coin_shop_client::CoinShopClient;
//!
//! # async fn example() -> Result<(), coin_shop_client::ClientError> {
//! let mut client = CoinShopClient::new("http://localhost:8080")?;
//! client.authenticate("alice", "password").await?;
//!
//! client.send_coin("bob", 100).await?;
//! client.buy("cup").await?;
//!
//! let info = client.info().await?;
//! println!("Balance: {} coins", info.coins);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

mod client;
mod error;
mod types;

pub use client::{ClientOptions, CoinShopClient};
pub use error::ClientError;
pub use types::*;
