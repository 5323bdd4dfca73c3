//! Session-scoped storage for wizard state
//!
//! Each browser is identified by a random UUID carried in a cookie. The store
//! keeps the wizard state and pending one-time messages per session, and
//! drops sessions that have been idle for longer than the configured lifetime.

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

use crate::domain::WizardSession;

#[derive(Debug, Clone)]
struct SessionEntry {
    wizard: Option<WizardSession>,
    messages: Vec<String>,
    last_seen: DateTime<Utc>,
}

impl SessionEntry {
    fn new(now: DateTime<Utc>) -> Self {
        Self {
            wizard: None,
            messages: Vec::new(),
            last_seen: now,
        }
    }
}

/// A resolved session id and whether it was minted by this request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionHandle {
    pub id: String,
    pub created: bool,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionEntry>>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_seconds: u64) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn is_expired(&self, entry: &SessionEntry, now: DateTime<Utc>) -> bool {
        now - entry.last_seen > self.ttl
    }

    /// Reuse the cookie's session if it is still live, otherwise start a new one.
    ///
    /// Unknown or expired ids are never adopted; a fresh id is issued instead.
    pub async fn resolve(&self, candidate: Option<String>) -> SessionHandle {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        if let Some(id) = candidate {
            let live = sessions
                .get(&id)
                .map(|entry| !self.is_expired(entry, now));
            match live {
                Some(true) => {
                    if let Some(entry) = sessions.get_mut(&id) {
                        entry.last_seen = now;
                    }
                    return SessionHandle { id, created: false };
                }
                Some(false) => {
                    sessions.remove(&id);
                    debug!(session_id = %id, "Session expired");
                }
                None => {}
            }
        }

        let id = Uuid::new_v4().to_string();
        sessions.insert(id.clone(), SessionEntry::new(now));
        debug!(session_id = %id, "Created new session");
        SessionHandle { id, created: true }
    }

    /// Wizard state for the session, if the wizard has been started.
    pub async fn load(&self, id: &str) -> Option<WizardSession> {
        let sessions = self.sessions.read().await;
        sessions
            .get(id)
            .filter(|entry| !self.is_expired(entry, Utc::now()))
            .and_then(|entry| entry.wizard.clone())
    }

    pub async fn save(&self, id: &str, wizard: WizardSession) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let entry = sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry::new(now));
        entry.wizard = Some(wizard);
        entry.last_seen = now;
    }

    /// Forget the wizard state but keep the session and its messages.
    pub async fn clear_wizard(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        if let Some(entry) = sessions.get_mut(id) {
            entry.wizard = None;
        }
    }

    pub async fn remove(&self, id: &str) {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
    }

    pub async fn push_message(&self, id: &str, message: impl Into<String>) {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        sessions
            .entry(id.to_string())
            .or_insert_with(|| SessionEntry::new(now))
            .messages
            .push(message.into());
    }

    /// Drain pending messages; each message is returned once.
    pub async fn take_messages(&self, id: &str) -> Vec<String> {
        let mut sessions = self.sessions.write().await;
        sessions
            .get_mut(id)
            .map(|entry| std::mem::take(&mut entry.messages))
            .unwrap_or_default()
    }

    pub async fn purge_expired(&self) -> usize {
        self.purge_expired_at(Utc::now()).await
    }

    pub(crate) async fn purge_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| !self.is_expired(entry, now));
        before - sessions.len()
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// Read the session id from the request's `Cookie` headers.
///
/// Values that are not UUIDs are ignored.
pub fn session_id_from_headers(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .and_then(|(_, value)| Uuid::parse_str(value.trim()).ok())
        .map(|id| id.to_string())
}

/// `Set-Cookie` value for the session id.
pub fn session_cookie(cookie_name: &str, id: &str, max_age_seconds: u64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        cookie_name, id, max_age_seconds
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}
