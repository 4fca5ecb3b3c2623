//! API handlers.

pub mod auth;
pub mod health;
pub mod info;
pub mod shop;
pub mod transfer;

use serde::Serialize;

/// Body returned by mutating endpoints on success.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    /// Always `"success"`.
    pub status: &'static str,
}

impl StatusResponse {
    /// The success body.
    #[must_use]
    pub const fn success() -> Self {
        Self { status: "success" }
    }
}
