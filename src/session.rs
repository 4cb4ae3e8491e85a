//! In-memory session registry.
//!
//! One wizard per browser session, keyed by a v4 uuid. Nothing is persisted:
//! a refreshed page gets a fresh session, and idle sessions are pruned so
//! abandoned wizards don't accumulate.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::WizardConfig;
use crate::error::SessionError;
use crate::wizard::manager::WizardManager;
use crate::wizard::verifier::{CodeVerifier, SimulatedVerifier};

struct SessionEntry {
    manager: Arc<WizardManager>,
    last_seen: Instant,
}

/// Registry of live wizard sessions.
pub struct SessionRegistry {
    config: WizardConfig,
    verifier: Arc<dyn CodeVerifier>,
    sessions: RwLock<HashMap<Uuid, SessionEntry>>,
}

impl SessionRegistry {
    /// Create a registry backed by the simulated verification backend.
    pub fn new(config: WizardConfig) -> Arc<Self> {
        let verifier = Arc::new(SimulatedVerifier::new(&config));
        Self::with_verifier(config, verifier)
    }

    /// Create a registry with a custom verification backend.
    pub fn with_verifier(config: WizardConfig, verifier: Arc<dyn CodeVerifier>) -> Arc<Self> {
        Arc::new(Self {
            config,
            verifier,
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Start a fresh wizard session and return its id.
    pub async fn create(&self) -> Uuid {
        let id = Uuid::new_v4();
        let manager = WizardManager::new(self.config.clone(), Arc::clone(&self.verifier));
        self.sessions.write().await.insert(
            id,
            SessionEntry {
                manager,
                last_seen: Instant::now(),
            },
        );
        info!(session_id = %id, "session created");
        id
    }

    /// Look up a session, refreshing its idle clock.
    pub async fn get(&self, id: Uuid) -> Result<Arc<WizardManager>, SessionError> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&id) {
            Some(entry) => {
                entry.last_seen = Instant::now();
                Ok(Arc::clone(&entry.manager))
            }
            None => Err(SessionError::NotFound { id }),
        }
    }

    /// Discard a session, tearing down its timers. Returns whether it
    /// existed.
    pub async fn remove(&self, id: Uuid) -> bool {
        match self.sessions.write().await.remove(&id) {
            Some(entry) => {
                entry.manager.shutdown();
                info!(session_id = %id, "session removed");
                true
            }
            None => false,
        }
    }

    /// Number of live sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for longer than the configured timeout.
    pub async fn prune_idle(&self) {
        let cutoff = self.config.session_idle_timeout;
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_seen.elapsed() < cutoff;
            if !keep {
                entry.manager.shutdown();
                debug!(session_id = %id, "session pruned");
            }
            keep
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            info!(pruned, remaining = sessions.len(), "idle sessions pruned");
        }
    }
}

/// Spawn a background task that periodically prunes idle sessions.
pub fn spawn_prune_task(registry: Arc<SessionRegistry>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(registry.config.prune_interval);
        loop {
            interval.tick().await;
            registry.prune_idle().await;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn create_get_remove() {
        let registry = SessionRegistry::new(WizardConfig::default());
        assert!(registry.is_empty().await);

        let id = registry.create().await;
        assert_eq!(registry.len().await, 1);
        assert!(registry.get(id).await.is_ok());

        assert!(registry.remove(id).await);
        assert!(!registry.remove(id).await);
        assert!(matches!(
            registry.get(id).await,
            Err(SessionError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn unknown_session_is_not_found() {
        let registry = SessionRegistry::new(WizardConfig::default());
        assert!(registry.get(Uuid::new_v4()).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn idle_sessions_are_pruned_and_touch_keeps_alive() {
        let config = WizardConfig {
            session_idle_timeout: Duration::from_secs(60),
            ..WizardConfig::default()
        };
        let registry = SessionRegistry::new(config);
        let stale = registry.create().await;
        let fresh = registry.create().await;

        tokio::time::sleep(Duration::from_secs(45)).await;
        // Touching a session resets its idle clock.
        registry.get(fresh).await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        registry.prune_idle().await;

        assert!(registry.get(stale).await.is_err());
        assert!(registry.get(fresh).await.is_ok());
    }
}
