//! Port for third-party identity assertions (Google sign-in).

use async_trait::async_trait;

use crate::domain::ExternalIdentity;

use super::define_port_error;

define_port_error! {
    /// Failures raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// The ID token failed signature, audience, issuer or expiry checks.
        InvalidToken { message: String } => "identity token rejected: {message}",
        /// The provider's signing keys could not be fetched.
        Unavailable { message: String } => "identity provider unavailable: {message}",
        /// Sign-in is not configured for this deployment.
        NotConfigured => "identity provider is not configured",
    }
}

/// Verifies provider-issued ID tokens.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Verify `id_token` and return the identity it asserts.
    async fn verify_id_token(&self, id_token: &str)
    -> Result<ExternalIdentity, IdentityProviderError>;
}
