//! Credential adapters: bearer tokens, password hashing and Google sign-in.

mod argon2_hasher;
mod google;
mod jwt;

pub use argon2_hasher::Argon2PasswordHasher;
pub use google::{GOOGLE_JWKS_URL, GoogleIdentityProvider, UnconfiguredIdentityProvider};
pub use jwt::{JwtTokenService, TOKEN_LIFETIME_HOURS};
