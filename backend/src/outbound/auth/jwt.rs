//! HS256 bearer tokens.

use std::sync::Arc;

use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use mockable::Clock;
use serde::{Deserialize, Serialize};

use crate::domain::ports::{TokenError, TokenService};
use crate::domain::{AuthClaims, UserId};

/// Lifetime of issued tokens.
pub const TOKEN_LIFETIME_HOURS: i64 = 24;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireClaims {
    user_id: String,
    email: String,
    iat: i64,
    exp: i64,
}

/// Signs and verifies tokens with a shared secret.
///
/// Issue and expiry times come from the injected clock so tests can pin
/// them; verification compares `exp` against the same clock.
pub struct JwtTokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService").finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build a service keyed by `secret`.
    pub fn new(secret: &[u8], clock: Arc<dyn Clock>) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            clock,
        }
    }

    fn validation() -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked against the injected clock below.
        validation.validate_exp = false;
        validation.required_spec_claims.clear();
        validation
    }
}

impl TokenService for JwtTokenService {
    fn issue(&self, claims: &AuthClaims) -> Result<String, TokenError> {
        let now = self.clock.utc().timestamp();
        let wire = WireClaims {
            user_id: claims.user_id.to_string(),
            email: claims.email.clone(),
            iat: now,
            exp: now + TOKEN_LIFETIME_HOURS * 3600,
        };
        encode(&Header::new(Algorithm::HS256), &wire, &self.encoding)
            .map_err(|err| TokenError::signing(err.to_string()))
    }

    fn verify(&self, token: &str) -> Result<AuthClaims, TokenError> {
        let data = decode::<WireClaims>(token, &self.decoding, &Self::validation()).map_err(
            |err| match err.kind() {
                ErrorKind::ExpiredSignature => TokenError::expired(),
                _ => TokenError::invalid(err.to_string()),
            },
        )?;
        let wire = data.claims;
        if wire.exp <= self.clock.utc().timestamp() {
            return Err(TokenError::expired());
        }
        let user_id =
            UserId::new(&wire.user_id).map_err(|err| TokenError::invalid(err.to_string()))?;
        Ok(AuthClaims {
            user_id,
            email: wire.email,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{FixedClock, fixture_clock, fixture_instant};
    use chrono::Duration;
    use rstest::rstest;

    fn claims() -> AuthClaims {
        AuthClaims {
            user_id: UserId::random(),
            email: "ada@example.com".to_owned(),
        }
    }

    #[rstest]
    fn issued_tokens_verify_to_the_same_claims() {
        let service = JwtTokenService::new(b"secret", fixture_clock());
        let claims = claims();
        let token = service.issue(&claims).expect("issued");
        assert_eq!(service.verify(&token).expect("verified"), claims);
    }

    #[rstest]
    fn tokens_expire_after_a_day() {
        let issuer = JwtTokenService::new(b"secret", fixture_clock());
        let token = issuer.issue(&claims()).expect("issued");
        let later = FixedClock::at(fixture_instant() + Duration::hours(TOKEN_LIFETIME_HOURS));
        let verifier = JwtTokenService::new(b"secret", Arc::new(later));
        assert_eq!(verifier.verify(&token), Err(TokenError::expired()));
    }

    #[rstest]
    fn tokens_signed_with_another_secret_are_invalid() {
        let token = JwtTokenService::new(b"one", fixture_clock())
            .issue(&claims())
            .expect("issued");
        let err = JwtTokenService::new(b"two", fixture_clock())
            .verify(&token)
            .expect_err("rejected");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    #[case("")]
    #[case("not.a.token")]
    fn garbage_is_invalid(#[case] token: &str) {
        let err = JwtTokenService::new(b"secret", fixture_clock())
            .verify(token)
            .expect_err("rejected");
        assert!(matches!(err, TokenError::Invalid { .. }));
    }

    #[rstest]
    fn payload_carries_wire_claim_names() {
        let token = JwtTokenService::new(b"secret", fixture_clock())
            .issue(&claims())
            .expect("issued");
        let mut validation = JwtTokenService::validation();
        validation.insecure_disable_signature_validation();
        let raw = decode::<serde_json::Value>(&token, &DecodingKey::from_secret(b""), &validation)
            .expect("decoded");
        let payload = raw.claims;
        assert!(payload.get("userId").is_some());
        assert_eq!(payload["iat"], 1_700_000_000);
        assert_eq!(payload["exp"], 1_700_000_000 + 86_400);
    }
}
