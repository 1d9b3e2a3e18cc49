//! Session gate: decides whether a signed-in user may see a page.
//!
//! Verified users are cached per e-mail so page navigation does not hit
//! `/auth/verify` every time.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use mesa_core::authorized_email::normalize_email;
use mesa_core::roles::Role;
use tokio::sync::RwLock;

use crate::api::{ApiClient, Session};
use crate::dto::User;
use crate::error::ClientError;

/// How long a verified user stays cached.
pub const DEFAULT_GATE_TTL: Duration = Duration::from_secs(5 * 60);

/// Outcome of a gate check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Allow(User),
    /// No session: send the visitor to the login page.
    RedirectLogin,
    /// Signed in, but not on the allow-list or lacking the required role.
    RedirectUnauthorized,
}

pub struct AuthGate {
    client: ApiClient,
    ttl: Duration,
    cache: RwLock<HashMap<String, (User, Instant)>>,
}

impl AuthGate {
    pub fn new(client: ApiClient) -> Self {
        Self::with_ttl(client, DEFAULT_GATE_TTL)
    }

    pub fn with_ttl(client: ApiClient, ttl: Duration) -> Self {
        Self {
            client,
            ttl,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Check a session against the server's allow-list.
    ///
    /// Transport failures and unexpected statuses are returned as errors;
    /// 401 and 403 become redirects.
    pub async fn resolve(&self, session: Option<&Session>) -> Result<GateDecision, ClientError> {
        let Some(session) = session else {
            return Ok(GateDecision::RedirectLogin);
        };
        let key = normalize_email(&session.email);
        if key.is_empty() {
            return Ok(GateDecision::RedirectLogin);
        }

        if let Some(user) = self.cached(&key).await {
            return Ok(GateDecision::Allow(user));
        }

        match self.client.verify(&key, session.name.as_deref()).await {
            Ok(user) => {
                self.cache
                    .write()
                    .await
                    .insert(key, (user.clone(), Instant::now()));
                Ok(GateDecision::Allow(user))
            }
            Err(ClientError::Unauthorized { .. }) => {
                tracing::info!(email = %key, "Session e-mail not authorized");
                Ok(GateDecision::RedirectUnauthorized)
            }
            Err(ClientError::NotSignedIn) => Ok(GateDecision::RedirectLogin),
            Err(e) => Err(e),
        }
    }

    /// Like [`resolve`](Self::resolve), but also requires one of `roles`.
    pub async fn require_role(
        &self,
        session: Option<&Session>,
        roles: &[Role],
    ) -> Result<GateDecision, ClientError> {
        match self.resolve(session).await? {
            GateDecision::Allow(user) => {
                let permitted = user
                    .role
                    .parse::<Role>()
                    .map(|role| roles.contains(&role))
                    .unwrap_or(false);
                if permitted {
                    Ok(GateDecision::Allow(user))
                } else {
                    Ok(GateDecision::RedirectUnauthorized)
                }
            }
            other => Ok(other),
        }
    }

    /// Forget every cached user (logout).
    pub async fn clear(&self) {
        self.cache.write().await.clear();
    }

    async fn cached(&self, key: &str) -> Option<User> {
        let cache = self.cache.read().await;
        cache
            .get(key)
            .filter(|(_, at)| at.elapsed() < self.ttl)
            .map(|(user, _)| user.clone())
    }
}
