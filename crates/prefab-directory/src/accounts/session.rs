use std::collections::HashMap;
use std::sync::Mutex;

use axum::http::{header, HeaderMap};
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use super::domain::{Role, User, UserId};

pub const SESSION_COOKIE: &str = "prefab_session";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: UserId,
    pub role: Role,
    pub expires_at: DateTime<Utc>,
}

/// In-process session table keyed by opaque tokens.
#[derive(Debug)]
pub struct SessionManager {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn issue(&self, user: &User) -> Session {
        self.issue_at(user, Utc::now())
    }

    pub fn issue_at(&self, user: &User, now: DateTime<Utc>) -> Session {
        let session = Session {
            token: Uuid::new_v4().simple().to_string(),
            user_id: user.id,
            role: user.role,
            expires_at: now + self.ttl,
        };

        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.retain(|_, existing| existing.expires_at > now);
        guard.insert(session.token.clone(), session.clone());
        session
    }

    pub fn resolve(&self, token: &str) -> Option<Session> {
        self.resolve_at(token, Utc::now())
    }

    /// Returns the live session for `token`, dropping it if it has expired.
    pub fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        match guard.get(token) {
            Some(session) if session.expires_at > now => Some(session.clone()),
            Some(_) => {
                guard.remove(token);
                None
            }
            None => None,
        }
    }

    pub fn revoke(&self, token: &str) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.remove(token);
    }

    pub fn revoke_user(&self, user_id: UserId) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        guard.retain(|_, session| session.user_id != user_id);
    }

    /// Keeps live sessions in step with a role change so demotions apply immediately.
    pub fn update_role(&self, user_id: UserId, role: Role) {
        let mut guard = self.sessions.lock().expect("session mutex poisoned");
        for session in guard.values_mut() {
            if session.user_id == user_id {
                session.role = role;
            }
        }
    }
}

/// Reads the token from `Authorization: Bearer` first, then from the session cookie.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, value)| *name == SESSION_COOKIE && !value.is_empty())
        .map(|(_, value)| value.to_string())
}

pub fn session_cookie(session: &Session, ttl: Duration) -> String {
    format!(
        "{SESSION_COOKIE}={}; HttpOnly; Path=/; SameSite=Lax; Max-Age={}",
        session.token,
        ttl.num_seconds()
    )
}

pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn user(id: i64, role: Role) -> User {
        User {
            id: UserId(id),
            email: format!("user{id}@example.com"),
            name: "Staff".to_string(),
            password_hash: String::new(),
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn sessions_expire_after_ttl() {
        let manager = SessionManager::new(Duration::hours(1));
        let now = Utc::now();
        let session = manager.issue_at(&user(1, Role::Editor), now);

        assert!(manager
            .resolve_at(&session.token, now + Duration::minutes(59))
            .is_some());
        assert!(manager
            .resolve_at(&session.token, now + Duration::minutes(61))
            .is_none());
        assert!(manager.resolve_at(&session.token, now).is_none());
    }

    #[test]
    fn revoke_user_drops_every_session() {
        let manager = SessionManager::new(Duration::hours(1));
        let first = manager.issue(&user(7, Role::Admin));
        let second = manager.issue(&user(7, Role::Admin));
        let other = manager.issue(&user(8, Role::Editor));

        manager.revoke_user(UserId(7));
        assert!(manager.resolve(&first.token).is_none());
        assert!(manager.resolve(&second.token).is_none());
        assert!(manager.resolve(&other.token).is_some());
    }

    #[test]
    fn role_updates_reach_live_sessions() {
        let manager = SessionManager::new(Duration::hours(1));
        let session = manager.issue(&user(3, Role::Admin));
        manager.update_role(UserId(3), Role::Editor);
        let resolved = manager.resolve(&session.token).expect("session live");
        assert_eq!(resolved.role, Role::Editor);
    }

    #[test]
    fn token_prefers_bearer_then_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; prefab_session=cookie-token"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("cookie-token"));

        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_static("Bearer header-token"),
        );
        assert_eq!(session_token(&headers).as_deref(), Some("header-token"));
    }

    #[test]
    fn empty_cookie_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("prefab_session="));
        assert!(session_token(&headers).is_none());
    }
}
