use std::sync::Arc;

use crate::auth::cache::AuthCache;
use crate::config::ServerConfig;
use crate::storage::AttachmentStorage;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheap to clone; everything heavy sits behind an `Arc` or is a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: mesa_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Resolved `x-user-email` identities.
    pub auth_cache: Arc<AuthCache>,
    /// On-disk attachment store.
    pub storage: Arc<AttachmentStorage>,
}

impl AppState {
    pub fn new(pool: mesa_db::DbPool, config: ServerConfig) -> Self {
        let auth_cache = Arc::new(AuthCache::new(std::time::Duration::from_secs(
            config.auth_cache_ttl_secs,
        )));
        let storage = Arc::new(AttachmentStorage::new(config.attachment_dir.clone()));
        Self {
            pool,
            config: Arc::new(config),
            auth_cache,
            storage,
        }
    }
}
