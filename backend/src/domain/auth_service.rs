//! Account registration, password and Google sign-in, and token checks.

use std::sync::Arc;

use mockable::Clock;
use tokio::sync::OnceCell;
use tracing::{error, info, warn};

use super::auth::{AuthClaims, AuthSession, ExternalIdentity, LoginCredentials, Registration};
use super::ports::{
    IdentityProvider, IdentityProviderError, PasswordHashError, PasswordHasher, TokenError,
    TokenService, UserRepository, UserRepositoryError,
};
use super::user::{PublicUser, USERNAME_MAX, User, Username};
use super::Error;

/// Badge awarded to accounts created through Google sign-in.
pub const GOOGLE_BADGE: &str = "Google Auth";

const INVALID_CREDENTIALS: &str = "Invalid credentials";
const USERNAME_ATTEMPTS: usize = 5;
/// Password hashed once to give failed lookups a real hash to check against.
const TIMING_DECOY_PASSWORD: &str = "courseware-timing-decoy";

/// Ports the authentication service depends on.
#[derive(Clone)]
pub struct AuthPorts {
    pub users: Arc<dyn UserRepository>,
    pub hasher: Arc<dyn PasswordHasher>,
    pub tokens: Arc<dyn TokenService>,
    pub identity: Arc<dyn IdentityProvider>,
    pub clock: Arc<dyn Clock>,
}

/// Authentication use cases.
#[derive(Clone)]
pub struct AuthService {
    ports: AuthPorts,
    decoy_hash: Arc<OnceCell<String>>,
}

fn map_user_error(err: UserRepositoryError) -> Error {
    match err {
        UserRepositoryError::Duplicate { field } => {
            Error::conflict(format!("A user with this {field} already exists"))
        }
        other => {
            error!(error = %other, kind = other.kind(), "user repository failure");
            Error::internal(other.to_string())
        }
    }
}

fn map_hash_error(err: PasswordHashError) -> Error {
    error!(error = %err, kind = err.kind(), "password hashing failure");
    Error::internal(err.to_string())
}

fn map_token_error(err: TokenError) -> Error {
    match err {
        TokenError::Expired => Error::unauthorized("Token has expired"),
        TokenError::Invalid { .. } => Error::unauthorized("Invalid token"),
        TokenError::Signing { .. } => {
            error!(error = %err, kind = err.kind(), "token signing failure");
            Error::internal(err.to_string())
        }
    }
}

fn map_identity_error(err: IdentityProviderError) -> Error {
    match err {
        IdentityProviderError::InvalidToken { ref message } => {
            warn!(reason = %message, "google id token rejected");
            Error::internal("Google sign-in failed")
        }
        other => {
            error!(error = %other, kind = other.kind(), "identity provider failure");
            Error::internal(other.to_string())
        }
    }
}

/// Username candidates for a Google account: the display name, then the
/// email local part, each truncated to [`USERNAME_MAX`].
fn base_username(identity: &ExternalIdentity) -> String {
    let preferred = identity
        .name
        .as_deref()
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .unwrap_or_else(|| identity.email.local_part());
    preferred.chars().take(USERNAME_MAX - 5).collect()
}

impl AuthService {
    /// Create the service.
    pub fn new(ports: AuthPorts) -> Self {
        Self {
            ports,
            decoy_hash: Arc::new(OnceCell::new()),
        }
    }

    /// Spend one hash verification on a login that has already failed, so
    /// unknown emails take as long as wrong passwords.
    async fn verify_decoy(&self, password: &str) {
        let hasher = &self.ports.hasher;
        let decoy = self
            .decoy_hash
            .get_or_try_init(|| hasher.hash(TIMING_DECOY_PASSWORD))
            .await;
        let outcome = match decoy {
            Ok(hash) => hasher.verify(password, hash).await.map(drop),
            Err(err) => Err(err),
        };
        if let Err(err) = outcome {
            warn!(error = %err, "decoy password verification failed");
        }
    }

    fn session_for(&self, user: &User) -> Result<AuthSession, Error> {
        let claims = AuthClaims {
            user_id: user.id.clone(),
            email: user.email.as_str().to_owned(),
        };
        let token = self.ports.tokens.issue(&claims).map_err(map_token_error)?;
        Ok(AuthSession {
            token,
            user: user.to_public(),
        })
    }

    /// Create a student account and sign it in.
    pub async fn register(&self, registration: Registration) -> Result<AuthSession, Error> {
        let users = &self.ports.users;
        if users
            .find_by_username(registration.username())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(map_user_error(UserRepositoryError::duplicate("username")));
        }
        if users
            .find_by_email(registration.email())
            .await
            .map_err(map_user_error)?
            .is_some()
        {
            return Err(map_user_error(UserRepositoryError::duplicate("email")));
        }

        let hash = self
            .ports
            .hasher
            .hash(registration.password())
            .await
            .map_err(map_hash_error)?;
        let user = User::new_student(
            registration.username().clone(),
            registration.email().clone(),
            Some(hash),
            self.ports.clock.utc(),
        );
        users.insert(&user).await.map_err(map_user_error)?;
        info!(user_id = %user.id, "registered user");
        self.session_for(&user)
    }

    /// Check a password. Unknown emails, Google-only accounts and wrong
    /// passwords all produce the same error.
    pub async fn login(&self, credentials: LoginCredentials) -> Result<AuthSession, Error> {
        let user = self
            .ports
            .users
            .find_by_email(credentials.email())
            .await
            .map_err(map_user_error)?;
        let Some((user, hash)) = user
            .as_ref()
            .and_then(|user| user.password_hash.as_deref().map(|hash| (user, hash)))
        else {
            self.verify_decoy(credentials.password()).await;
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        };
        let matches = self
            .ports
            .hasher
            .verify(credentials.password(), hash)
            .await
            .map_err(map_hash_error)?;
        if !matches {
            return Err(Error::unauthorized(INVALID_CREDENTIALS));
        }
        self.session_for(&user)
    }

    /// Verify a Google ID token and find or create the matching account.
    pub async fn google_login(&self, id_token: &str) -> Result<AuthSession, Error> {
        if id_token.trim().is_empty() {
            return Err(Error::invalid_request("tokenId is required")
                .with_details(serde_json::json!({ "field": "tokenId" })));
        }
        let identity = self
            .ports
            .identity
            .verify_id_token(id_token)
            .await
            .map_err(map_identity_error)?;

        if let Some(existing) = self
            .ports
            .users
            .find_by_email(&identity.email)
            .await
            .map_err(map_user_error)?
        {
            return self.session_for(&existing);
        }

        let user = self.create_google_user(&identity).await?;
        self.session_for(&user)
    }

    async fn create_google_user(&self, identity: &ExternalIdentity) -> Result<User, Error> {
        let username = self.free_username(&base_username(identity)).await?;
        let mut user = User::new_student(
            username,
            identity.email.clone(),
            None,
            self.ports.clock.utc(),
        );
        user.profile.avatar_url = identity.picture.clone();
        user.award_badge(GOOGLE_BADGE);

        match self.ports.users.insert(&user).await {
            Ok(()) => {
                info!(user_id = %user.id, "created account from google sign-in");
                Ok(user)
            }
            // A concurrent sign-in for the same email won the race.
            Err(UserRepositoryError::Duplicate { ref field }) if field == "email" => self
                .ports
                .users
                .find_by_email(&identity.email)
                .await
                .map_err(map_user_error)?
                .ok_or_else(|| Error::internal("account vanished after duplicate insert")),
            Err(other) => Err(map_user_error(other)),
        }
    }

    async fn free_username(&self, base: &str) -> Result<Username, Error> {
        let base = if base.trim().is_empty() { "user" } else { base };
        for attempt in 0..USERNAME_ATTEMPTS {
            let raw = if attempt == 0 {
                base.to_owned()
            } else {
                format!("{base}-{:04x}", rand::random::<u16>())
            };
            let candidate =
                Username::new(&raw).map_err(|err| Error::internal(err.to_string()))?;
            if self
                .ports
                .users
                .find_by_username(&candidate)
                .await
                .map_err(map_user_error)?
                .is_none()
            {
                return Ok(candidate);
            }
        }
        Err(Error::conflict("Could not allocate a unique username"))
    }

    /// Validate a bearer token and expose its claims.
    pub fn verify(&self, token: &str) -> Result<AuthClaims, Error> {
        if token.trim().is_empty() {
            return Err(Error::unauthorized("Missing bearer token"));
        }
        self.ports.tokens.verify(token).map_err(map_token_error)
    }

    /// Public projection of the token's subject.
    pub async fn current_user(&self, claims: &AuthClaims) -> Result<PublicUser, Error> {
        self.ports
            .users
            .find_by_id(&claims.user_id)
            .await
            .map_err(map_user_error)?
            .map(|user| user.to_public())
            .ok_or_else(|| Error::not_found("User not found"))
    }
}
