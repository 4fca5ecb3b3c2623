//! Storage backend selection and catalog seeding.

use std::sync::Arc;

use coin_shop_core::{default_catalog, NewCatalogItem};
use coin_shop_store::{seed_catalog, Store, StoreError};

use crate::config::ServiceConfig;

/// Errors raised while preparing storage at startup.
#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    /// The store could not be opened or seeded.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// The catalog file could not be read or is invalid.
    #[error("catalog file {path}: {reason}")]
    Catalog {
        /// File path.
        path: String,
        /// What went wrong.
        reason: String,
    },
}

/// Open the configured backend.
///
/// Postgres is used when compiled in and `DATABASE_URL` is set, then `RocksDB`
/// when compiled in, and the in-memory store otherwise.
///
/// # Errors
///
/// Returns an error if the backend cannot be opened.
pub async fn open_store(config: &ServiceConfig) -> Result<Arc<dyn Store>, StartupError> {
    #[cfg(feature = "postgres-backend")]
    if let Some(url) = &config.database_url {
        tracing::info!("Connecting to PostgreSQL store");
        let store = coin_shop_store::PgStore::connect(url).await?;
        return Ok(Arc::new(store));
    }

    #[cfg(feature = "rocksdb-backend")]
    {
        tracing::info!(path = %config.data_dir, "Opening RocksDB store");
        let store = coin_shop_store::RocksStore::open(&config.data_dir)?;
        Ok(Arc::new(store))
    }

    #[cfg(not(feature = "rocksdb-backend"))]
    {
        if config.database_url.is_some() {
            tracing::warn!("DATABASE_URL is set but the postgres backend is not compiled in");
        }
        tracing::warn!("No persistent backend compiled in; using in-memory store");
        Ok(Arc::new(coin_shop_store::MemoryStore::new()))
    }
}

/// Items to seed: the catalog file if configured, else the default merch list.
///
/// # Errors
///
/// Returns an error if the file cannot be read, parsed, or holds invalid items.
pub fn load_catalog(config: &ServiceConfig) -> Result<Vec<NewCatalogItem>, StartupError> {
    let Some(path) = &config.catalog_file else {
        return Ok(default_catalog());
    };

    let catalog_err = |reason: String| StartupError::Catalog {
        path: path.clone(),
        reason,
    };

    let contents = std::fs::read_to_string(path).map_err(|e| catalog_err(e.to_string()))?;
    let items: Vec<NewCatalogItem> =
        serde_json::from_str(&contents).map_err(|e| catalog_err(e.to_string()))?;
    for item in &items {
        item.validate().map_err(|e| catalog_err(e.to_string()))?;
    }
    Ok(items)
}

/// Seed the catalog if enabled in `config`. Returns how many items were added.
///
/// # Errors
///
/// Returns an error if the catalog cannot be loaded or written.
pub async fn prepare_catalog(
    store: &dyn Store,
    config: &ServiceConfig,
) -> Result<usize, StartupError> {
    if !config.seed_catalog {
        return Ok(0);
    }
    let items = load_catalog(config)?;
    let inserted = seed_catalog(store, &items).await?;
    tracing::info!(inserted, total = items.len(), "Catalog seeded");
    Ok(inserted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use coin_shop_store::{CatalogStore, MemoryStore};

    #[test]
    fn default_catalog_without_file() {
        let config = ServiceConfig::default();
        assert_eq!(load_catalog(&config).unwrap(), default_catalog());
    }

    #[test]
    fn catalog_file_is_parsed_and_validated() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.json");
        std::fs::write(&good, r#"[{"name": "mug", "price": 100}]"#).unwrap();
        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, r#"[{"name": "mug", "price": 0}]"#).unwrap();

        let config = ServiceConfig {
            catalog_file: Some(good.to_string_lossy().into_owned()),
            ..ServiceConfig::default()
        };
        assert_eq!(
            load_catalog(&config).unwrap(),
            vec![NewCatalogItem::new("mug", 100)]
        );

        let config = ServiceConfig {
            catalog_file: Some(bad.to_string_lossy().into_owned()),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            load_catalog(&config),
            Err(StartupError::Catalog { .. })
        ));
    }

    #[tokio::test]
    async fn seeding_can_be_disabled() {
        let store = MemoryStore::new();
        let config = ServiceConfig {
            seed_catalog: false,
            ..ServiceConfig::default()
        };
        assert_eq!(prepare_catalog(&store, &config).await.unwrap(), 0);
        assert!(store.list_items().await.unwrap().is_empty());

        let config = ServiceConfig::default();
        assert_eq!(
            prepare_catalog(&store, &config).await.unwrap(),
            default_catalog().len()
        );
    }
}
