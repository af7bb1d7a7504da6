//! JWT + Argon2 authentication, user identity, and the `users` table
//! repository.
//!
//! Grounded on the teacher's `rbp-auth` crate; `crypto.rs` and
//! `session.rs` are rebuilt here in the same idiom since the retrieval
//! pack's copy of `rbp-auth` references but does not include them.

mod claims;
mod crypto;
mod dto;
mod member;
mod password;
mod session;

#[cfg(feature = "database")]
mod repository;

#[cfg(feature = "server")]
mod handlers;

pub use claims::Claims;
pub use crypto::Crypto;
pub use dto::{AuthResponse, LoginRequest, RegisterRequest, UserInfo};
pub use member::Member;
pub use password::{hash, password_is_valid, username_is_valid, verify};
pub use session::Session;

#[cfg(feature = "database")]
pub use repository::{AuthRepository, PublicProfile, UserRecord};

#[cfg(feature = "server")]
pub use handlers::{login, logout, me, register};
