use bg_core::{Unique, ID};

/// A per-login session identifier, minted at login time and carried in
/// the JWT's `sid` claim. Mirrors `Member`'s `Unique` shape; unlike
/// `Member` it is never persisted — revocation is out of scope (§1), so a
/// `Session` is meaningful only for the lifetime of its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Session {
    id: ID<Self>,
}

impl Session {
    pub fn new() -> Self {
        Self { id: ID::default() }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Unique for Session {
    fn id(&self) -> ID<Self> {
        self.id
    }
}
