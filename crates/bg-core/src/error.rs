/// Crate-wide error type, carrying the three fault kinds of the error
/// handling design: a client protocol violation, a transient internal
/// fault, and a terminal authentication fault.
///
/// Handlers return `Result<Vec<Notification>, BgError>` so the gateway can
/// translate an `Err` into the matching outbound event uniformly, without
/// each manager hand-rolling notification construction for its own faults.
#[derive(Debug, thiserror::Error)]
pub enum BgError {
    /// Client protocol violation: unknown game, wrong turn, invalid step,
    /// action in the wrong state, already rolled, ready twice, and so on.
    /// Surfaced as `move_rejection{message}` to the offending socket only.
    #[error("{0}")]
    Rejection(String),

    /// Transient internal fault: rule engine raised, bot adapter failed to
    /// reconcile, database lookup failed.
    #[error("internal fault: {0}")]
    Internal(#[from] InternalFault),

    /// Terminal fault: auth token invalid/expired, or post-auth identity
    /// missing. The gateway emits `auth_failed` and disconnects the socket.
    #[error("auth failed: {0}")]
    Auth(String),
}

impl BgError {
    pub fn rejection(message: impl Into<String>) -> Self {
        Self::Rejection(message.into())
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }
}

/// Underlying causes folded into `BgError::Internal`.
#[derive(Debug, thiserror::Error)]
pub enum InternalFault {
    #[error("bot adapter could not reconcile a move against the rule engine")]
    BotReconciliation,

    #[error("external engine process fault: {0}")]
    EngineProcess(String),

    #[error("first roll tied too many times in a row")]
    FirstRollExhausted,

    #[error("database error: {0}")]
    Database(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),
}
