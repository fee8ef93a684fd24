use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct LoginSession {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

/// Process-local bearer tokens for signed-in users.
pub struct SessionRegistry {
    sessions: Mutex<HashMap<String, LoginSession>>,
    ttl: Duration,
    remember_ttl: Duration,
}

impl SessionRegistry {
    pub fn new(ttl: Duration, remember_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl,
            remember_ttl,
        }
    }

    pub fn issue(&self, user_id: i64, username: &str, remember: bool) -> LoginSession {
        let ttl = if remember { self.remember_ttl } else { self.ttl };
        let session = LoginSession {
            token: uuid::Uuid::new_v4().to_string(),
            user_id,
            username: username.to_string(),
            expires_at: Utc::now() + ttl,
        };

        let mut sessions = self.sessions.lock();
        sessions.retain(|_, s| s.expires_at > Utc::now());
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Expired tokens are dropped on lookup.
    pub fn resolve(&self, token: &str) -> Option<LoginSession> {
        let mut sessions = self.sessions.lock();
        match sessions.get(token) {
            Some(s) if s.expires_at > Utc::now() => Some(s.clone()),
            Some(_) => {
                sessions.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) -> bool {
        self.sessions.lock().remove(token).is_some()
    }

    pub fn active(&self) -> usize {
        let now = Utc::now();
        self.sessions
            .lock()
            .values()
            .filter(|s| s.expires_at > now)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issued_token_resolves_until_revoked() {
        let registry = SessionRegistry::new(Duration::hours(1), Duration::days(30));
        let session = registry.issue(7, "ada", false);

        assert_eq!(registry.resolve(&session.token).unwrap().user_id, 7);
        assert!(registry.revoke(&session.token));
        assert!(registry.resolve(&session.token).is_none());
        assert!(!registry.revoke(&session.token));
    }

    #[test]
    fn remember_me_lives_longer() {
        let registry = SessionRegistry::new(Duration::hours(1), Duration::days(30));
        let short = registry.issue(1, "ada", false);
        let long = registry.issue(1, "ada", true);
        assert!(long.expires_at - short.expires_at > Duration::days(29));
    }

    #[test]
    fn expired_tokens_are_rejected() {
        let registry = SessionRegistry::new(Duration::seconds(-1), Duration::seconds(-1));
        let session = registry.issue(1, "ada", false);
        assert!(registry.resolve(&session.token).is_none());
        assert_eq!(registry.active(), 0);
    }
}
