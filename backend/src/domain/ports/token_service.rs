//! Port for bearer token issuance and verification.

use crate::domain::AuthClaims;

use super::define_port_error;

define_port_error! {
    /// Failures raised by token adapters.
    pub enum TokenError {
        /// The token's expiry has passed.
        Expired => "token has expired",
        /// The token is malformed or its signature does not verify.
        Invalid { message: String } => "invalid token: {message}",
        /// A token could not be produced.
        Signing { message: String } => "failed to sign token: {message}",
    }
}

/// Issues and verifies signed, time-limited bearer tokens.
#[cfg_attr(test, mockall::automock)]
pub trait TokenService: Send + Sync {
    /// Sign a token carrying `claims`.
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError>;

    /// Check signature and expiry, returning the embedded claims.
    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError>;
}
