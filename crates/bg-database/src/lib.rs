//! PostgreSQL connection bootstrap, the `users` table schema, and the
//! append-only stats/events logs.
//!
//! Trimmed from the teacher's `database`/`rbp-pg` pattern to just what a
//! backgammon server persists: no bulk-COPY machinery, no training
//! artifacts, one table and two append-only files.

mod logs;
mod schema;

pub use logs::{EventsLog, MatchStats, StatsLog};
pub use schema::{Schema, USERS};

use std::sync::Arc;
use tokio_postgres::Client;

/// PostgreSQL error type alias.
pub type PgErr = tokio_postgres::Error;

/// Establishes a database connection.
///
/// Connects to PostgreSQL using the `DB_URL` environment variable.
/// Returns an `Arc<Client>` suitable for sharing across async tasks.
///
/// # Panics
///
/// Panics if `DB_URL` is not set or if connection fails — matching the
/// teacher's bootstrap convention of failing fast during startup rather
/// than degrading into a half-initialized server.
pub async fn db() -> Arc<Client> {
    log::info!("connecting to database");
    let tls = tokio_postgres::tls::NoTls;
    let url = std::env::var("DB_URL").expect("DB_URL must be set");
    let (client, connection) = tokio_postgres::connect(&url, tls)
        .await
        .expect("database connection failed");
    tokio::spawn(connection);
    client
        .execute("SET client_min_messages TO WARNING", &[])
        .await
        .expect("set client_min_messages");
    Arc::new(client)
}

/// Runs the `users` table's DDL against an already-connected client.
pub async fn migrate(client: &Client) -> Result<(), PgErr> {
    client.batch_execute(UsersSchema::creates()).await?;
    client.batch_execute(UsersSchema::indices()).await?;
    Ok(())
}

/// Marker type carrying the `users` table's `Schema` implementation. The
/// domain-level `Member` type (with its password hash kept out of the
/// in-memory struct) lives in `bg-auth`; this crate only owns the DDL.
pub struct UsersSchema;

impl Schema for UsersSchema {
    fn name() -> &'static str {
        USERS
    }
    fn creates() -> &'static str {
        const_format::concatcp!(
            "CREATE TABLE IF NOT EXISTS ",
            USERS,
            " (
                id              UUID PRIMARY KEY,
                username        VARCHAR(20) UNIQUE NOT NULL,
                password_hash   TEXT NOT NULL,
                reg_date        TIMESTAMPTZ NOT NULL DEFAULT now(),
                elo             INTEGER NOT NULL DEFAULT 0,
                money           INTEGER NOT NULL DEFAULT 500,
                diamonds        INTEGER NOT NULL DEFAULT 10,
                icon            VARCHAR(255) NOT NULL DEFAULT 'default.png'
            );"
        )
    }
    fn indices() -> &'static str {
        const_format::concatcp!(
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_users_username_ci ON ",
            USERS,
            " (LOWER(username));"
        )
    }
}
