//! Session management
//!
//! Sessions live in process memory, keyed by session id. Two decisions from
//! the design notes are enforced here:
//!
//! - Turns on one session are serialized by a per-session `tokio` mutex,
//!   held for the whole turn. Different sessions proceed in parallel.
//! - Idle sessions are evicted after a configurable timeout by a background
//!   cleanup task; the map is also capacity-bounded.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use tokio::sync::{watch, Mutex};

use loan_agent_agent::Conversation;
use loan_agent_core::LoanType;

use crate::ServerError;

/// One active session
pub struct Session {
    pub id: String,
    pub loan_type: LoanType,
    /// Conversation state; the mutex serializes concurrent turns.
    pub conversation: Mutex<Conversation>,
    pub created_at: Instant,
    last_activity: RwLock<Instant>,
}

impl Session {
    pub fn new(id: impl Into<String>, loan_type: LoanType, conversation: Conversation) -> Self {
        Self {
            id: id.into(),
            loan_type,
            conversation: Mutex::new(conversation),
            created_at: Instant::now(),
            last_activity: RwLock::new(Instant::now()),
        }
    }

    /// Update last activity.
    pub fn touch(&self) {
        *self.last_activity.write() = Instant::now();
    }

    /// Check if the session is expired.
    pub fn is_expired(&self, timeout: Duration) -> bool {
        self.last_activity.read().elapsed() > timeout
    }
}

/// Session manager
pub struct SessionManager {
    sessions: RwLock<HashMap<String, Arc<Session>>>,
    max_sessions: usize,
    session_timeout: Duration,
    cleanup_interval: Duration,
}

impl SessionManager {
    pub fn new(max_sessions: usize) -> Self {
        Self::with_config(
            max_sessions,
            Duration::from_secs(3600),
            Duration::from_secs(300),
        )
    }

    pub fn with_config(
        max_sessions: usize,
        session_timeout: Duration,
        cleanup_interval: Duration,
    ) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_sessions,
            session_timeout,
            cleanup_interval,
        }
    }

    /// Register a new session.
    pub fn create(
        &self,
        id: impl Into<String>,
        loan_type: LoanType,
        conversation: Conversation,
    ) -> Result<Arc<Session>, ServerError> {
        let mut sessions = self.sessions.write();

        if sessions.len() >= self.max_sessions {
            // Try to free capacity before refusing.
            self.cleanup_expired_internal(&mut sessions);
            if sessions.len() >= self.max_sessions {
                return Err(ServerError::Session("Max sessions reached".to_string()));
            }
        }

        let session = Arc::new(Session::new(id, loan_type, conversation));
        sessions.insert(session.id.clone(), session.clone());
        tracing::info!(session_id = %session.id, loan_type = %session.loan_type, "Session created");
        Ok(session)
    }

    pub fn get(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.read().get(id).cloned()
    }

    pub fn remove(&self, id: &str) -> Option<Arc<Session>> {
        self.sessions.write().remove(id)
    }

    pub fn count(&self) -> usize {
        self.sessions.read().len()
    }

    /// Remove expired sessions.
    pub fn cleanup_expired(&self) {
        let mut sessions = self.sessions.write();
        self.cleanup_expired_internal(&mut sessions);
    }

    fn cleanup_expired_internal(&self, sessions: &mut HashMap<String, Arc<Session>>) {
        sessions.retain(|_, session| !session.is_expired(self.session_timeout));
    }

    /// Start a background task that periodically evicts expired sessions.
    ///
    /// Returns a shutdown sender used to stop the task.
    pub fn start_cleanup_task(self: &Arc<Self>) -> watch::Sender<bool> {
        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let manager = Arc::clone(self);
        let interval = manager.cleanup_interval;

        tokio::spawn(async move {
            let mut timer = tokio::time::interval(interval);
            timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = timer.tick() => {
                        let before = manager.count();
                        manager.cleanup_expired();
                        let after = manager.count();
                        if before != after {
                            tracing::info!(
                                "Session cleanup: removed {} expired sessions ({} remaining)",
                                before - after,
                                after
                            );
                        }
                    }
                    _ = shutdown_rx.changed() => {
                        if *shutdown_rx.borrow() {
                            tracing::info!("Session cleanup task shutting down");
                            break;
                        }
                    }
                }
            }
        });

        shutdown_tx
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conversation(id: &str) -> Conversation {
        Conversation::new(id, LoanType::Personal)
    }

    #[test]
    fn test_create_and_get() {
        let manager = SessionManager::new(10);
        let session = manager
            .create("s1", LoanType::Personal, conversation("s1"))
            .unwrap();
        assert_eq!(session.loan_type, LoanType::Personal);
        assert!(manager.get("s1").is_some());
        assert!(manager.get("s2").is_none());
        assert_eq!(manager.count(), 1);
    }

    #[test]
    fn test_capacity_limit() {
        let manager = SessionManager::new(1);
        manager
            .create("s1", LoanType::Personal, conversation("s1"))
            .unwrap();
        let err = manager.create("s2", LoanType::Gold, conversation("s2"));
        assert!(err.is_err());
    }

    #[test]
    fn test_expiry_eviction() {
        let manager =
            SessionManager::with_config(10, Duration::from_millis(0), Duration::from_secs(60));
        manager
            .create("s1", LoanType::Personal, conversation("s1"))
            .unwrap();

        std::thread::sleep(Duration::from_millis(5));
        manager.cleanup_expired();
        assert_eq!(manager.count(), 0);
    }

    #[test]
    fn test_touch_keeps_session_alive() {
        let manager =
            SessionManager::with_config(10, Duration::from_secs(60), Duration::from_secs(60));
        let session = manager
            .create("s1", LoanType::Personal, conversation("s1"))
            .unwrap();
        session.touch();
        manager.cleanup_expired();
        assert_eq!(manager.count(), 1);
    }
}
