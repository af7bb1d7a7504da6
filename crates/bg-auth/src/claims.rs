use bg_core::{Unique, ID};
use serde::{Deserialize, Serialize};

use crate::member::Member;
use crate::session::Session;

/// JWT payload carried by every signed token: the user id, a per-login
/// session id, and the username (so the gateway doesn't need a database
/// round-trip just to identify the connecting socket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: ID<Member>,
    pub sid: ID<Session>,
    pub usr: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(member: &Member, session: &Session, ttl_days: i64) -> Self {
        let now = chrono_now();
        Self {
            sub: member.id(),
            sid: session.id(),
            usr: member.username().to_string(),
            iat: now,
            exp: now + ttl_days * 86_400,
        }
    }
}

impl Claims {
    /// Belt-and-suspenders check alongside `jsonwebtoken`'s own `exp`
    /// validation in [`crate::Crypto::verify`] — callers that hold onto
    /// a verified `Claims` across an await point re-check this instead
    /// of assuming a token valid a moment ago still is.
    pub fn expired(&self) -> bool {
        chrono_now() > self.exp
    }
}

/// Returns the current unix timestamp. Kept as a single indirection point
/// so the auth crate doesn't pull in a datetime dependency the rest of the
/// workspace doesn't already use.
fn chrono_now() -> i64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .expect("time moves forward")
        .as_secs() as i64
}
