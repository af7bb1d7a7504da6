use bg_core::{Unique, ID};

/// An authenticated user's public identity. The password hash and the
/// profile columns (`elo`, `money`, `diamonds`, `icon`) live only in the
/// persisted row (see [`crate::repository::UserRecord`]); `Member` is the
/// lightweight handle carried through claims and notifications.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Member {
    id: ID<Self>,
    username: String,
}

impl Member {
    pub fn new(id: ID<Self>, username: String) -> Self {
        Self { id, username }
    }
    pub fn username(&self) -> &str {
        &self.username
    }
}

impl Unique for Member {
    fn id(&self) -> ID<Self> {
        self.id
    }
}

#[cfg(feature = "database")]
mod schema {
    use super::*;

    impl Member {
        /// Builds a `Member` handle from a persisted row's id/username
        /// columns, without carrying the password hash into memory
        /// longer than the verification call needs it.
        pub fn from_row(id: uuid::Uuid, username: String) -> Self {
            Self::new(id.into(), username)
        }
    }
}
