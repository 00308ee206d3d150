//! Per-visitor conversation sessions.

use chrono::{DateTime, Utc};
use folio_chat::{ChatResources, ConversationEngine};
use folio_core::config::GatewayConfig;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// A conversation engine shared between requests of one session.
pub type SharedEngine = Arc<Mutex<ConversationEngine>>;

struct SessionEntry {
    engine: SharedEngine,
    created_at: DateTime<Utc>,
    last_active: Instant,
}

/// Snapshot of one session.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// Session ID.
    pub id: String,

    /// Created timestamp.
    pub created_at: DateTime<Utc>,

    /// Time since the last request.
    pub idle: Duration,
}

/// Maps session ids to their conversation engines.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<String, SessionEntry>>,
    max_sessions: usize,
    idle_timeout: Duration,
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

impl SessionRegistry {
    /// Create a registry holding at most `max_sessions` sessions.
    pub fn new(max_sessions: usize, idle_timeout: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions: max_sessions.max(1),
            idle_timeout,
        }
    }

    /// Create a registry from the gateway config section.
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self::new(
            config.max_sessions,
            Duration::from_secs(config.session_idle_secs),
        )
    }

    /// Get the engine for `id`, creating it if needed, and mark the session active.
    pub async fn get_or_create(&self, id: &str, resources: &Arc<ChatResources>) -> SharedEngine {
        let mut sessions = self.sessions.write().await;

        if let Some(entry) = sessions.get_mut(id) {
            entry.last_active = Instant::now();
            return entry.engine.clone();
        }

        if sessions.len() >= self.max_sessions {
            let oldest = sessions
                .iter()
                .min_by_key(|(_, entry)| entry.last_active)
                .map(|(key, _)| key.clone());
            if let Some(oldest) = oldest {
                sessions.remove(&oldest);
                info!(session = %oldest, "Evicted least recently active session");
            }
        }

        let engine = Arc::new(Mutex::new(ConversationEngine::new(resources.clone())));
        sessions.insert(
            id.to_string(),
            SessionEntry {
                engine: engine.clone(),
                created_at: Utc::now(),
                last_active: Instant::now(),
            },
        );
        info!(session = %id, total = sessions.len(), "Created chat session");

        engine
    }

    /// Get an existing session's engine.
    pub async fn get(&self, id: &str) -> Option<SharedEngine> {
        let sessions = self.sessions.read().await;
        sessions.get(id).map(|entry| entry.engine.clone())
    }

    /// Remove a session. Returns whether it existed.
    pub async fn remove(&self, id: &str) -> bool {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id).is_some()
    }

    /// Snapshot of all sessions.
    pub async fn list(&self) -> Vec<SessionInfo> {
        let sessions = self.sessions.read().await;
        sessions
            .iter()
            .map(|(id, entry)| SessionInfo {
                id: id.clone(),
                created_at: entry.created_at,
                idle: entry.last_active.elapsed(),
            })
            .collect()
    }

    /// Get session count.
    pub async fn count(&self) -> usize {
        let sessions = self.sessions.read().await;
        sessions.len()
    }

    /// Idle time after which sessions are evicted.
    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Drop sessions idle for at least the idle timeout. Returns how many went.
    pub async fn evict_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let keep = entry.last_active.elapsed() < self.idle_timeout;
            if !keep {
                info!(session = %id, "Evicted idle chat session");
            }
            keep
        });
        before - sessions.len()
    }

    /// Run [`evict_idle`](Self::evict_idle) every `every` until the task is aborted.
    pub fn spawn_sweeper(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let registry = Arc::clone(self);
        let every = every.max(Duration::from_secs(1));

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + every, every);
            loop {
                ticker.tick().await;
                let evicted = registry.evict_idle().await;
                if evicted > 0 {
                    debug!(evicted, "Session sweep finished");
                }
            }
        })
    }
}
