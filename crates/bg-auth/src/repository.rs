#![cfg(feature = "database")]

use std::sync::Arc;

use bg_core::{BgError, InternalFault};
use tokio_postgres::Client;

use crate::member::Member;

/// The full persisted row behind a username: the public `Member` fields
/// plus the profile columns §6's supplement adds (`elo`, `money`,
/// `diamonds`, `icon`) and the password hash, which never leaves this
/// module.
#[derive(Debug, Clone)]
pub struct UserRecord {
    pub member: Member,
    pub password_hash: String,
    pub elo: i32,
    pub money: i32,
    pub diamonds: i32,
    pub icon: String,
}

/// Public profile fields shared with an opponent on match found / rejoin.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PublicProfile {
    pub username: String,
    pub elo: i32,
    pub icon: String,
}

impl From<&UserRecord> for PublicProfile {
    fn from(record: &UserRecord) -> Self {
        Self {
            username: record.member.username().to_string(),
            elo: record.elo,
            icon: record.icon.clone(),
        }
    }
}

/// Repository over the `users` table, matching the teacher's
/// `AuthRepository` trait shape (`signin`/`exists`/`create`/`lookup`),
/// adapted to this server's row columns.
#[async_trait::async_trait]
pub trait AuthRepository {
    async fn exists(&self, username: &str) -> Result<bool, BgError>;
    async fn create(&self, username: &str, password_hash: &str) -> Result<Member, BgError>;
    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>, BgError>;
    async fn apply_rewards(&self, username: &str, elo_delta: i32, money_delta: i32) -> Result<(), BgError>;
}

#[async_trait::async_trait]
impl AuthRepository for Arc<Client> {
    async fn exists(&self, username: &str) -> Result<bool, BgError> {
        let row = self
            .query_opt(
                const_format::concatcp!("SELECT 1 FROM ", bg_database::USERS, " WHERE LOWER(username) = LOWER($1)"),
                &[&username],
            )
            .await
            .map_err(|e| BgError::Internal(InternalFault::Database(e.to_string())))?;
        Ok(row.is_some())
    }

    async fn create(&self, username: &str, password_hash: &str) -> Result<Member, BgError> {
        let id = uuid::Uuid::now_v7();
        self.execute(
            const_format::concatcp!(
                "INSERT INTO ",
                bg_database::USERS,
                " (id, username, password_hash) VALUES ($1, $2, $3)"
            ),
            &[&id, &username, &password_hash],
        )
        .await
        .map_err(|e| BgError::Internal(InternalFault::Database(e.to_string())))?;
        Ok(Member::from_row(id, username.to_string()))
    }

    async fn lookup(&self, username: &str) -> Result<Option<UserRecord>, BgError> {
        let row = self
            .query_opt(
                const_format::concatcp!(
                    "SELECT id, username, password_hash, elo, money, diamonds, icon FROM ",
                    bg_database::USERS,
                    " WHERE LOWER(username) = LOWER($1)"
                ),
                &[&username],
            )
            .await
            .map_err(|e| BgError::Internal(InternalFault::Database(e.to_string())))?;
        let Some(row) = row else { return Ok(None) };
        Ok(Some(UserRecord {
            member: Member::from_row(row.get(0), row.get(1)),
            password_hash: row.get(2),
            elo: row.get(3),
            money: row.get(4),
            diamonds: row.get(5),
            icon: row.get(6),
        }))
    }

    async fn apply_rewards(&self, username: &str, elo_delta: i32, money_delta: i32) -> Result<(), BgError> {
        self.execute(
            const_format::concatcp!(
                "UPDATE ",
                bg_database::USERS,
                " SET elo = elo + $1, money = money + $2 WHERE LOWER(username) = LOWER($3)"
            ),
            &[&elo_delta, &money_delta, &username],
        )
        .await
        .map_err(|e| BgError::Internal(InternalFault::Database(e.to_string())))?;
        Ok(())
    }
}
