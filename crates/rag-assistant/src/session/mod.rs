//! Chat sessions: per-session transcript and action serialization

mod shell;

pub use shell::{sanitize_filename, SessionShell, INDEX_BUILT_MESSAGE};

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use parking_lot::{Mutex as SyncMutex, RwLock};
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::types::{ChatMessage, Transcript};

/// One user's conversation.
///
/// The transcript only grows. Upload, process, and ask run one at a time per
/// session through [`Session::begin_action`].
#[derive(Debug)]
pub struct Session {
    id: Uuid,
    created_at: DateTime<Utc>,
    last_active: SyncMutex<Instant>,
    transcript: RwLock<Transcript>,
    action: Mutex<()>,
}

impl Session {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            last_active: SyncMutex::new(Instant::now()),
            transcript: RwLock::new(Transcript::new()),
            action: Mutex::new(()),
        }
    }

    fn touch(&self) {
        *self.last_active.lock() = Instant::now();
    }

    /// Idle past `timeout` at `now` and not in the middle of an action
    fn is_expired(&self, now: Instant, timeout: Duration) -> bool {
        let idle = now.saturating_duration_since(*self.last_active.lock());
        idle > timeout && self.action.try_lock().is_ok()
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Snapshot of the transcript in insertion order
    pub fn messages(&self) -> Vec<ChatMessage> {
        self.transcript.read().messages().to_vec()
    }

    pub fn push(&self, message: ChatMessage) {
        self.transcript.write().push(message);
    }

    pub fn transcript_len(&self) -> usize {
        self.transcript.read().len()
    }

    /// Wait for any running action in this session to finish
    pub async fn begin_action(&self) -> MutexGuard<'_, ()> {
        self.action.lock().await
    }
}

/// Default idle time before a session and its transcript are dropped
pub const DEFAULT_IDLE_TIMEOUT: Duration = Duration::from_secs(60 * 60);

/// Registry of live sessions.
///
/// A session ends when it is removed or after sitting idle for longer than
/// the idle timeout. Expired sessions are swept whenever a new one is created
/// and by [`SessionManager::spawn_sweeper`].
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<DashMap<Uuid, Arc<Session>>>,
    idle_timeout: Duration,
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::with_idle_timeout(DEFAULT_IDLE_TIMEOUT)
    }
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_idle_timeout(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(DashMap::new()),
            idle_timeout,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    pub fn create(&self) -> Arc<Session> {
        self.evict_idle();
        let session = Arc::new(Session::new());
        self.sessions.insert(session.id(), Arc::clone(&session));
        tracing::debug!("Created session {}", session.id());
        session
    }

    /// Look up a session and mark it active
    pub fn get(&self, id: &Uuid) -> Result<Arc<Session>> {
        let session = self
            .sessions
            .get(id)
            .map(|s| Arc::clone(s.value()))
            .ok_or_else(|| Error::SessionNotFound(id.to_string()))?;
        session.touch();
        Ok(session)
    }

    /// Drop sessions idle past the timeout; returns how many were dropped
    pub fn evict_idle(&self) -> usize {
        self.evict_idle_at(Instant::now())
    }

    fn evict_idle_at(&self, now: Instant) -> usize {
        let before = self.sessions.len();
        let timeout = self.idle_timeout;
        self.sessions
            .retain(|_, session| !session.is_expired(now, timeout));
        let evicted = before.saturating_sub(self.sessions.len());
        if evicted > 0 {
            tracing::info!("Dropped {} idle sessions", evicted);
        }
        evicted
    }

    /// Sweep idle sessions in the background at a fraction of the timeout
    pub fn spawn_sweeper(&self) -> tokio::task::JoinHandle<()> {
        let manager = self.clone();
        let period = (self.idle_timeout / 4).max(Duration::from_secs(1));
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                manager.evict_idle();
            }
        })
    }

    /// Drop a session; returns false if it did not exist
    pub fn remove(&self, id: &Uuid) -> bool {
        self.sessions.remove(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
