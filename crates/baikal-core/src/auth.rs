//! Login session state.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{LoginResponse, User};
use crate::storage::{SessionStorage, TOKEN_KEY, USER_KEY};

#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, email: &str, password: &str) -> Result<LoginResponse>;
    async fn me(&self) -> Result<User>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub user: Option<User>,
    pub token: Option<String>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }
}

/// Owns the current session and keeps it in step with session storage.
pub struct AuthStore {
    api: Arc<dyn AuthApi>,
    storage: Arc<SessionStorage>,
    session: Mutex<Session>,
}

impl AuthStore {
    /// Rebuild the session from whatever storage holds.
    pub fn restore(api: Arc<dyn AuthApi>, storage: Arc<SessionStorage>) -> Self {
        let token = storage.get_item(TOKEN_KEY);
        let user = storage
            .get_item(USER_KEY)
            .and_then(|raw| serde_json::from_str::<User>(&raw).ok());

        Self {
            api,
            storage,
            session: Mutex::new(Session { user, token }),
        }
    }

    pub fn session(&self) -> Session {
        self.state().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.state().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    /// Exchange credentials for a token. Failures are returned to the
    /// caller without touching the current session.
    pub async fn login(&self, email: &str, password: &str) -> Result<User> {
        let LoginResponse { access_token, user, .. } = self.api.login(email, password).await?;

        let raw_user = serde_json::to_string(&user)?;
        self.storage
            .set_items(&[(TOKEN_KEY, access_token.as_str()), (USER_KEY, raw_user.as_str())])?;

        let mut session = self.state();
        session.token = Some(access_token);
        session.user = Some(user.clone());
        tracing::info!(user = %user.email, "logged in");
        Ok(user)
    }

    /// Drop the session from memory and storage. Safe to call repeatedly.
    pub fn logout(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(err) = self.storage.remove_item(key) {
                tracing::warn!(%err, key, "failed to clear stored session");
            }
        }
        *self.state() = Session::default();
        tracing::info!("logged out");
    }

    /// Refresh the profile with the stored token. Any failure means the
    /// session is no longer valid and ends in a logout; returns whether the
    /// session survived.
    pub async fn fetch_me(&self) -> bool {
        match self.api.me().await {
            Ok(user) => {
                match serde_json::to_string(&user) {
                    Ok(raw) => {
                        if let Err(err) = self.storage.set_item(USER_KEY, &raw) {
                            tracing::warn!(%err, "failed to persist refreshed profile");
                        }
                    }
                    Err(err) => tracing::warn!(%err, "failed to encode refreshed profile"),
                }
                self.state().user = Some(user);
                true
            }
            Err(err) => {
                tracing::warn!(%err, "session probe failed, logging out");
                self.logout();
                false
            }
        }
    }

    fn state(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    struct FakeAuth {
        accept_login: bool,
        me_ok: bool,
    }

    fn user(name: &str) -> User {
        User {
            id: "u1".to_string(),
            email: "admin@baikal.ai".to_string(),
            name: name.to_string(),
            department: "경영지원".to_string(),
            position: "팀장".to_string(),
            role: "admin".to_string(),
            is_active: true,
            created_at: "2025-01-01T00:00:00".to_string(),
        }
    }

    #[async_trait]
    impl AuthApi for FakeAuth {
        async fn login(&self, _email: &str, _password: &str) -> Result<LoginResponse> {
            if self.accept_login {
                Ok(LoginResponse {
                    access_token: "tok".to_string(),
                    token_type: "bearer".to_string(),
                    user: user("관리자"),
                })
            } else {
                Err(Error::Server {
                    status: 401,
                    detail: Some("Invalid email or password".to_string()),
                })
            }
        }

        async fn me(&self) -> Result<User> {
            if self.me_ok {
                Ok(user("관리자(갱신)"))
            } else {
                Err(Error::Server { status: 401, detail: None })
            }
        }
    }

    fn store(api: FakeAuth, storage: Arc<SessionStorage>) -> AuthStore {
        AuthStore::restore(Arc::new(api), storage)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Arc::new(SessionStorage::open(dir.path().join("s.json")).unwrap());
        let auth = store(FakeAuth { accept_login: true, me_ok: true }, storage.clone());
        assert!(!auth.is_authenticated());

        let user = auth.login("admin@baikal.ai", "pw").await.unwrap();
        assert_eq!(user.name, "관리자");
        assert!(auth.is_authenticated());
        assert_eq!(storage.get_item(TOKEN_KEY).as_deref(), Some("tok"));

        let reloaded = store(
            FakeAuth { accept_login: true, me_ok: true },
            Arc::new(SessionStorage::open(dir.path().join("s.json")).unwrap()),
        );
        assert!(reloaded.is_authenticated());
        assert_eq!(reloaded.user().unwrap().name, "관리자");
    }

    #[tokio::test]
    async fn test_failed_login_propagates_and_keeps_state() {
        let auth = store(
            FakeAuth { accept_login: false, me_ok: true },
            Arc::new(SessionStorage::in_memory()),
        );
        let err = auth.login("x@y.z", "bad").await.unwrap_err();
        assert_eq!(err.detail(), Some("Invalid email or password"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn test_login_with_unwritable_storage_stays_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "").unwrap();
        let storage = Arc::new(SessionStorage::open(blocker.join("session.json")).unwrap());
        let auth = store(FakeAuth { accept_login: true, me_ok: true }, storage.clone());

        assert!(matches!(
            auth.login("admin@baikal.ai", "pw").await,
            Err(Error::Storage(_))
        ));
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_item(TOKEN_KEY), None);
        assert_eq!(storage.get_item(USER_KEY), None);
    }

    #[tokio::test]
    async fn test_logout_then_reload_is_unauthenticated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("s.json");
        let auth = store(
            FakeAuth { accept_login: true, me_ok: true },
            Arc::new(SessionStorage::open(&path).unwrap()),
        );
        auth.login("admin@baikal.ai", "pw").await.unwrap();
        auth.logout();
        auth.logout();
        assert_eq!(auth.session(), Session::default());

        let reloaded = store(
            FakeAuth { accept_login: true, me_ok: true },
            Arc::new(SessionStorage::open(&path).unwrap()),
        );
        assert!(!reloaded.is_authenticated());
        assert!(reloaded.user().is_none());
    }

    #[tokio::test]
    async fn test_fetch_me_refreshes_user() {
        let storage = Arc::new(SessionStorage::in_memory());
        let auth = store(FakeAuth { accept_login: true, me_ok: true }, storage.clone());
        auth.login("admin@baikal.ai", "pw").await.unwrap();

        assert!(auth.fetch_me().await);
        assert_eq!(auth.user().unwrap().name, "관리자(갱신)");
        assert!(storage.get_item(USER_KEY).unwrap().contains("관리자(갱신)"));
    }

    #[tokio::test]
    async fn test_failed_profile_check_forces_logout() {
        let storage = Arc::new(SessionStorage::in_memory());
        storage.set_item(TOKEN_KEY, "expired").unwrap();
        let auth = store(FakeAuth { accept_login: true, me_ok: false }, storage.clone());
        assert!(auth.is_authenticated());

        assert!(!auth.fetch_me().await);
        assert!(!auth.is_authenticated());
        assert_eq!(storage.get_item(TOKEN_KEY), None);
    }
}
