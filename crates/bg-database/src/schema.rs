/// Table metadata and DDL generation for persisted entities.
///
/// Unlike the teacher pattern this is trimmed from, there is no bulk-COPY
/// or binary-row machinery here — the only persisted entity is the `users`
/// table, populated one row at a time by the auth collaborator.
pub trait Schema {
    /// Returns the table name in the database.
    fn name() -> &'static str;
    /// Returns the `CREATE TABLE IF NOT EXISTS` DDL statement.
    fn creates() -> &'static str;
    /// Returns `CREATE INDEX IF NOT EXISTS` statements for this table.
    fn indices() -> &'static str;
}

/// Table for registered users and their persisted profile stats.
#[rustfmt::skip]
pub const USERS: &str = "users";
