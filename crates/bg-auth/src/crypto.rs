use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

use bg_core::BgError;

use crate::claims::Claims;
use crate::member::Member;
use crate::session::Session;

/// Token lifetime, matching the original service's 30-day access tokens.
const TOKEN_TTL_DAYS: i64 = 30;

/// Wraps `jsonwebtoken` HS256 signing and verification, keyed by
/// `JWT_SECRET`. Rebuilt in the idiom `Claims`/`handlers.rs` already
/// demonstrate — this module itself has no counterpart in the retrieval
/// pack.
#[derive(Clone)]
pub struct Crypto {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Crypto {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    /// Reads `JWT_SECRET` from the environment, falling back to a default
    /// development key (loudly logged) so a local run never fails to
    /// boot for want of a secret.
    pub fn from_env() -> Self {
        match std::env::var("JWT_SECRET") {
            Ok(secret) => Self::new(&secret),
            Err(_) => {
                log::warn!("JWT_SECRET not set, using an insecure development default");
                Self::new("dev-only-secret-change-me")
            }
        }
    }

    pub fn issue(&self, member: &Member, session: &Session) -> Result<String, BgError> {
        let claims = Claims::new(member, session, TOKEN_TTL_DAYS);
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| BgError::Auth(format!("token issuance failed: {e}")))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, BgError> {
        decode::<Claims>(token, &self.decoding, &Validation::default())
            .map(|data| data.claims)
            .map_err(|e| BgError::Auth(format!("invalid or expired token: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bg_core::{Unique, ID};

    #[test]
    fn issued_token_verifies_back_to_the_same_claims() {
        let crypto = Crypto::new("test-secret");
        let member = Member::new(ID::default(), "alice".to_string());
        let session = Session::new();
        let token = crypto.issue(&member, &session).unwrap();
        let claims = crypto.verify(&token).unwrap();
        assert_eq!(claims.usr, "alice");
        assert_eq!(claims.sub, member.id());
    }

    #[test]
    fn tampered_token_fails_verification() {
        let crypto = Crypto::new("test-secret");
        let member = Member::new(ID::default(), "alice".to_string());
        let session = Session::new();
        let token = crypto.issue(&member, &session).unwrap();
        let mut tampered = token.clone();
        tampered.push('x');
        assert!(crypto.verify(&tampered).is_err());
    }
}
