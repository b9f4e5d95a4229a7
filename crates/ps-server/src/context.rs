//! Application context shared by all route handlers via Axum state.

use std::sync::Arc;

use ps_core::config::{Config, StoreBackend, StoreConfig};
use ps_core::{Error, Result};
use ps_images::{ImageRepository, ImagesRepo};
use ps_store::{KvStore, MemoryStore, SqliteStore};

/// Application context shared by all request handlers.
///
/// This is cheaply cloneable because it only holds `Arc`s.
#[derive(Clone)]
pub struct AppContext {
    /// Immutable application configuration snapshot.
    pub config: Arc<Config>,
    /// The image repository.
    pub images: Arc<dyn ImagesRepo>,
}

impl AppContext {
    /// Build a context around an existing repository.
    pub fn new(config: Config, images: Arc<dyn ImagesRepo>) -> Self {
        Self {
            config: Arc::new(config),
            images,
        }
    }

    /// Open the configured store and build the repository on top of it.
    pub fn from_config(config: Config) -> Result<Self> {
        let store = open_store(&config.store)?;
        let repo = ImageRepository::new(store)
            .with_thumbnail_size(config.thumbnails.width, config.thumbnails.height)
            .with_max_content_bytes(config.server.max_upload_bytes);
        Ok(Self::new(config, Arc::new(repo)))
    }
}

/// Open the key-value engine selected by `config`.
pub fn open_store(config: &StoreConfig) -> Result<Arc<dyn KvStore>> {
    match config.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory image store; contents are lost on exit");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            let path = config.path.as_deref().ok_or_else(|| {
                Error::Validation("store.path is required for the sqlite backend".into())
            })?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                    tracing::info!("Created store directory {}", parent.display());
                }
            }
            Ok(Arc::new(SqliteStore::open(path)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_backend_by_default() {
        let ctx = AppContext::from_config(Config::default()).unwrap();
        assert!(ctx.images.list().unwrap().is_empty());
        assert_eq!(ctx.config.server.port, 3000);
    }

    #[test]
    fn sqlite_backend_requires_path() {
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            path: None,
        };
        assert!(matches!(open_store(&config), Err(Error::Validation(_))));
    }

    #[test]
    fn sqlite_backend_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("images.db");
        let config = StoreConfig {
            backend: StoreBackend::Sqlite,
            path: Some(path.clone()),
        };
        open_store(&config).unwrap();
        assert!(path.exists());
    }
}
