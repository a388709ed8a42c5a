//! Call sessions and the registry that maps call ids to them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::core::realtime::BoxedRealtime;

/// Live association of one call with one realtime AI connection.
pub struct CallSession {
    call_id: String,
    /// Distinguishes sessions that reused a call id over time
    token: Uuid,
    client: BoxedRealtime,
    created_at: Instant,
    active: AtomicBool,
}

impl CallSession {
    /// Create an active session.
    pub fn new(call_id: impl Into<String>, token: Uuid, client: BoxedRealtime) -> Self {
        Self {
            call_id: call_id.into(),
            token,
            client,
            created_at: Instant::now(),
            active: AtomicBool::new(true),
        }
    }

    /// Telephony call id this session serves.
    pub fn call_id(&self) -> &str {
        &self.call_id
    }

    /// Token of this session instance.
    pub fn token(&self) -> Uuid {
        self.token
    }

    /// The realtime AI client of this call.
    pub fn client(&self) -> &BoxedRealtime {
        &self.client
    }

    /// Whether [`CallSession::close`] has not run yet.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Time since the session was created.
    pub fn age(&self) -> Duration {
        self.created_at.elapsed()
    }

    /// Mark the session closed and disconnect its AI client.
    ///
    /// Only the first call does anything. A failed disconnect is logged and
    /// the session still ends up closed.
    pub async fn close(&self) {
        if !self.active.swap(false, Ordering::SeqCst) {
            return;
        }
        if let Err(e) = self.client.disconnect().await {
            warn!(call_id = %self.call_id, "Realtime disconnect failed during teardown: {}", e);
        }
    }
}

impl std::fmt::Debug for CallSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallSession")
            .field("call_id", &self.call_id)
            .field("token", &self.token)
            .field("state", &self.client.connection_state())
            .field("active", &self.is_active())
            .field("age", &self.age())
            .finish()
    }
}

/// Concurrent map from call id to its live session.
///
/// Holds at most one session per call id. Values are cloned out of the map
/// before use so no shard lock is held across an await.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<CallSession>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a session, returning the one it replaced.
    pub fn insert(&self, session: Arc<CallSession>) -> Option<Arc<CallSession>> {
        self.sessions.insert(session.call_id().to_string(), session)
    }

    /// Session registered under `call_id`.
    pub fn get(&self, call_id: &str) -> Option<Arc<CallSession>> {
        self.sessions.get(call_id).map(|entry| entry.value().clone())
    }

    /// Remove whatever session is registered under `call_id`.
    pub fn remove(&self, call_id: &str) -> Option<Arc<CallSession>> {
        self.sessions.remove(call_id).map(|(_, session)| session)
    }

    /// Remove the entry only if it still holds the session with `token`.
    pub fn remove_if_token(&self, call_id: &str, token: Uuid) -> Option<Arc<CallSession>> {
        self.sessions
            .remove_if(call_id, |_, session| session.token() == token)
            .map(|(_, session)| session)
    }

    /// Whether `call_id` has a registered session.
    pub fn contains(&self, call_id: &str) -> bool {
        self.sessions.contains_key(call_id)
    }

    /// Number of registered sessions.
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Snapshot of registered call ids.
    pub fn call_ids(&self) -> Vec<String> {
        self.sessions.iter().map(|entry| entry.key().clone()).collect()
    }
}
