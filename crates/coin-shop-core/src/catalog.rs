//! Catalog types for the coin shop.

use serde::{Deserialize, Serialize};

use crate::{ItemId, Result, ShopError};

/// A purchasable item. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    /// The item ID.
    pub id: ItemId,

    /// Unique item name, also used as the inventory `type`.
    pub name: String,

    /// Price in coins. Always positive.
    pub price: i64,
}

/// An item definition used to seed the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCatalogItem {
    /// Item name.
    pub name: String,
    /// Price in coins.
    pub price: i64,
}

impl NewCatalogItem {
    /// Create a new item definition.
    #[must_use]
    pub fn new(name: impl Into<String>, price: i64) -> Self {
        Self {
            name: name.into(),
            price,
        }
    }

    /// Check the definition can be stored.
    ///
    /// # Errors
    ///
    /// Returns `ShopError::Validation` for an empty name or a non-positive price.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ShopError::Validation("item name is required".into()));
        }
        if self.price <= 0 {
            return Err(ShopError::Validation(format!(
                "item {} must have a positive price, got {}",
                self.name, self.price
            )));
        }
        Ok(())
    }
}

/// The merch list the shop ships with.
#[must_use]
pub fn default_catalog() -> Vec<NewCatalogItem> {
    [
        ("t-shirt", 80),
        ("cup", 20),
        ("book", 50),
        ("pen", 10),
        ("powerbank", 200),
        ("hoody", 300),
        ("umbrella", 200),
        ("socks", 10),
        ("wallet", 50),
        ("pink-hoody", 500),
    ]
    .into_iter()
    .map(|(name, price)| NewCatalogItem::new(name, price))
    .collect()
}
