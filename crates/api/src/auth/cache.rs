//! Short-lived cache of resolved identities, so the allow-list is not
//! queried on every request.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mesa_core::roles::Role;
use mesa_core::types::DbId;
use tokio::sync::RwLock;

/// A resolved identity and when it was resolved.
#[derive(Debug, Clone, Copy)]
pub struct CachedIdentity {
    pub user_id: DbId,
    pub role: Role,
    cached_at: Instant,
}

/// E-mail keyed identity cache with a fixed time-to-live.
///
/// Thread-safe via interior `RwLock`; shared through `Arc` in `AppState`.
///
/// Every invalidation bumps a generation counter. A resolver reads the
/// generation before it looks at the database and stores its result with
/// [`AuthCache::insert_if_current`], so a lookup that raced an allow-list
/// change is dropped instead of cached.
pub struct AuthCache {
    ttl: Duration,
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<String, CachedIdentity>,
    generation: u64,
}

impl AuthCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Fresh entry for `email`, if any. Expired entries are treated as absent.
    pub async fn get(&self, email: &str) -> Option<CachedIdentity> {
        self.inner
            .read()
            .await
            .entries
            .get(email)
            .filter(|entry| entry.cached_at.elapsed() < self.ttl)
            .copied()
    }

    /// Current invalidation generation; pass it back to
    /// [`AuthCache::insert_if_current`].
    pub async fn generation(&self) -> u64 {
        self.inner.read().await.generation
    }

    /// Insert only if nothing was invalidated since `generation` was read.
    /// Returns whether the entry was stored.
    pub async fn insert_if_current(
        &self,
        email: &str,
        user_id: DbId,
        role: Role,
        generation: u64,
    ) -> bool {
        let mut inner = self.inner.write().await;
        if inner.generation != generation {
            return false;
        }
        let entry = CachedIdentity {
            user_id,
            role,
            cached_at: Instant::now(),
        };
        inner.entries.insert(email.to_string(), entry);
        true
    }

    /// Drop one address, e.g. after its allow-list entry changed.
    pub async fn invalidate(&self, email: &str) {
        let mut inner = self.inner.write().await;
        inner.entries.remove(email);
        inner.generation = inner.generation.wrapping_add(1);
    }

    /// Drop everything, e.g. after a bulk import.
    pub async fn clear(&self) {
        let mut inner = self.inner.write().await;
        inner.entries.clear();
        inner.generation = inner.generation.wrapping_add(1);
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.entries.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}
