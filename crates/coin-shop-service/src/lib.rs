//! Coin Shop HTTP API Service.
//!
//! This crate provides the HTTP API for the coin shop:
//!
//! - Login with registration on first use
//! - Account statements (balance, inventory, coin history)
//! - Peer-to-peer coin transfers
//! - Buying catalog items
//!
//! # Authentication
//!
//! `POST /api/auth` returns a session token. Every other `/api` route expects
//! it as `Authorization: Bearer <token>`.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
// Allow some pedantic lints that are noisy for Axum handler functions
#![allow(clippy::missing_errors_doc)] // Axum handlers all return Result
#![allow(clippy::unused_async)] // Health handler needs async for routing

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;
pub mod storage;

pub use config::ServiceConfig;
pub use error::ApiError;
pub use routes::create_router;
pub use state::AppState;
