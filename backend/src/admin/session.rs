//! Admin session and its on-disk cache.
//!
//! The cache only remembers the token between runs. The user and role it
//! stores are informational: [`restore_session`] asks the server who the
//! token belongs to before anything is trusted, and an [`AdminSession`] can
//! only be built from a server answer.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::domain::{PublicUser, Role};

use super::api::{AdminApi, AdminError, LoginRequest};

/// What the cache file holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedSession {
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
}

/// JSON file holding the cached session.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the cache. A missing file is an empty cache; an unreadable one
    /// is discarded.
    pub async fn load(&self) -> Result<Option<CachedSession>, AdminError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(AdminError::Storage(err.to_string())),
        };
        match serde_json::from_slice(&bytes) {
            Ok(cached) => Ok(Some(cached)),
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "discarding corrupt session cache");
                self.clear().await?;
                Ok(None)
            }
        }
    }

    pub async fn save(&self, session: &CachedSession) -> Result<(), AdminError> {
        let bytes =
            serde_json::to_vec_pretty(session).map_err(|err| AdminError::Storage(err.to_string()))?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| AdminError::Storage(err.to_string()))?;
        }
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|err| AdminError::Storage(err.to_string()))
    }

    /// Forget the cached session. Clearing an empty cache succeeds.
    pub async fn clear(&self) -> Result<(), AdminError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(AdminError::Storage(err.to_string())),
        }
    }
}

/// A token together with the account the server says it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminSession {
    token: String,
    user: PublicUser,
}

impl AdminSession {
    pub(crate) fn verified(token: String, user: PublicUser) -> Self {
        Self { token, user }
    }

    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    #[must_use]
    pub fn user(&self) -> &PublicUser {
        &self.user
    }

    /// Whether the server reported the admin role for this token.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }

    fn to_cache(&self) -> CachedSession {
        CachedSession {
            token: self.token.clone(),
            user: Some(self.user.clone()),
        }
    }
}

/// Sign in with a password and cache the resulting session.
pub async fn login(
    api: &dyn AdminApi,
    store: &SessionStore,
    email: &str,
    password: &str,
) -> Result<AdminSession, AdminError> {
    let reply = api
        .login(&LoginRequest {
            email: email.to_owned(),
            password: password.to_owned(),
        })
        .await?;
    let session = AdminSession::verified(reply.token, reply.user);
    store.save(&session.to_cache()).await?;
    info!(user = %session.user.username, "signed in");
    Ok(session)
}

/// Rehydrate the cached session, verifying the token with the server.
///
/// Returns `Ok(None)` when nothing is cached or the server rejects the token;
/// a rejected token is removed from the cache. Other failures leave the cache
/// alone so a later attempt can retry.
pub async fn restore_session(
    api: &dyn AdminApi,
    store: &SessionStore,
) -> Result<Option<AdminSession>, AdminError> {
    let Some(cached) = store.load().await? else {
        return Ok(None);
    };
    match api.me(&cached.token).await {
        Ok(user) => {
            let session = AdminSession::verified(cached.token, user);
            store.save(&session.to_cache()).await?;
            Ok(Some(session))
        }
        Err(AdminError::Unauthorized(reason)) => {
            warn!(%reason, "cached token rejected; clearing session");
            store.clear().await?;
            Ok(None)
        }
        Err(err) => Err(err),
    }
}

/// Drop the session locally. Tokens are not revocable server-side.
pub async fn logout(store: &SessionStore) -> Result<(), AdminError> {
    store.clear().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::api::MockAdminApi;
    use crate::domain::{AuthSession, Profile, UserId};
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    fn user(role: Role) -> PublicUser {
        PublicUser {
            id: UserId::random(),
            username: "ada".to_owned(),
            email: "ada@example.com".to_owned(),
            role,
            points: 0,
            badges: Vec::new(),
            profile: Profile::default(),
            language_preference: "en".to_owned(),
        }
    }

    #[fixture]
    fn dir() -> TempDir {
        tempfile::tempdir().expect("temp dir")
    }

    fn store_in(dir: &TempDir) -> SessionStore {
        SessionStore::new(dir.path().join("admin").join("session.json"))
    }

    #[rstest]
    #[tokio::test]
    async fn nothing_cached_means_no_session(dir: TempDir) {
        let api = MockAdminApi::new();
        let restored = restore_session(&api, &store_in(&dir)).await.expect("restore");
        assert!(restored.is_none());
    }

    #[rstest]
    #[tokio::test]
    async fn cached_role_is_replaced_by_the_server_answer(dir: TempDir) {
        let store = store_in(&dir);
        store
            .save(&CachedSession {
                token: "t".to_owned(),
                user: Some(user(Role::Admin)),
            })
            .await
            .expect("seed cache");
        let mut api = MockAdminApi::new();
        api.expect_me()
            .withf(|token| token == "t")
            .times(1)
            .returning(|_| Ok(user(Role::Student)));

        let session = restore_session(&api, &store)
            .await
            .expect("restore")
            .expect("session");

        assert!(!session.is_admin());
        let cached = store.load().await.expect("load").expect("cached");
        assert_eq!(cached.user.map(|u| u.role), Some(Role::Student));
    }

    #[rstest]
    #[tokio::test]
    async fn rejected_token_clears_the_cache(dir: TempDir) {
        let store = store_in(&dir);
        store
            .save(&CachedSession {
                token: "expired".to_owned(),
                user: None,
            })
            .await
            .expect("seed cache");
        let mut api = MockAdminApi::new();
        api.expect_me()
            .returning(|_| Err(AdminError::Unauthorized("Invalid or expired token".to_owned())));

        assert!(restore_session(&api, &store).await.expect("restore").is_none());
        assert!(store.load().await.expect("load").is_none());
        assert!(!store.path().exists());
    }

    #[rstest]
    #[tokio::test]
    async fn transport_failures_keep_the_cache(dir: TempDir) {
        let store = store_in(&dir);
        store
            .save(&CachedSession {
                token: "t".to_owned(),
                user: None,
            })
            .await
            .expect("seed cache");
        let mut api = MockAdminApi::new();
        api.expect_me()
            .returning(|_| Err(AdminError::Transport("connection refused".to_owned())));

        let err = restore_session(&api, &store).await.expect_err("offline");
        assert!(matches!(err, AdminError::Transport(_)));
        assert!(store.load().await.expect("load").is_some());
    }

    #[rstest]
    #[tokio::test]
    async fn corrupt_cache_is_discarded(dir: TempDir) {
        let store = store_in(&dir);
        tokio::fs::create_dir_all(dir.path().join("admin")).await.expect("dir");
        tokio::fs::write(store.path(), b"{not json").await.expect("write");

        assert!(store.load().await.expect("load").is_none());
        assert!(!store.path().exists());
    }

    #[rstest]
    #[tokio::test]
    async fn login_caches_the_session_and_logout_forgets_it(dir: TempDir) {
        let store = store_in(&dir);
        let mut api = MockAdminApi::new();
        api.expect_login()
            .withf(|request| request.email == "ada@example.com")
            .returning(|_| {
                Ok(AuthSession {
                    token: "fresh".to_owned(),
                    user: user(Role::Admin),
                })
            });

        let session = login(&api, &store, "ada@example.com", "pw").await.expect("login");
        assert!(session.is_admin());
        assert_eq!(
            store.load().await.expect("load").map(|c| c.token),
            Some("fresh".to_owned())
        );

        logout(&store).await.expect("logout");
        assert!(store.load().await.expect("load").is_none());
    }
}
