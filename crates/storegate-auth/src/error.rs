//! Error types for the authentication subsystem

use thiserror::Error;

/// Fatal configuration problems detected while building the passthru pool.
///
/// Startup validation rejects a bad configuration outright; the pool never
/// runs in a partially-configured state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PassthruConfigError {
    /// Zero or multiple server-selection strategies were enabled.
    #[error("exactly one server selection strategy must be configured, found {selected}")]
    StrategyConflict {
        /// Number of strategies enabled in the configuration.
        selected: usize,
    },
    /// Session connect timeout outside the accepted range.
    #[error("session timeout {value_ms} ms outside the range 2000..=30000 ms")]
    TimeoutOutOfRange {
        /// The rejected timeout value in milliseconds.
        value_ms: u64,
    },
    /// Offline re-check interval outside the accepted range.
    #[error("offline re-check interval {value_secs} s outside the range 10..=900 s")]
    RecheckOutOfRange {
        /// The rejected interval value in seconds.
        value_secs: u64,
    },
    /// The protocol order string had unknown, repeated, or too many tokens.
    #[error("invalid protocol order: {order}")]
    InvalidProtocolOrder {
        /// The rejected protocol order string.
        order: String,
    },
    /// Server resolution produced an empty pool.
    #[error("no valid authentication servers")]
    NoValidServers,
}

/// Runtime authentication failures.
#[derive(Error, Debug)]
pub enum AuthError {
    /// The pool configuration was rejected.
    #[error("configuration error: {0}")]
    Config(#[from] PassthruConfigError),
    /// Every pool member was offline or unreachable.
    #[error("no authentication servers available")]
    NoServersAvailable,
    /// An authentication server rejected the presented credentials.
    #[error("credentials rejected: {reason}")]
    Rejected {
        /// Detail reported by the server or service.
        reason: String,
    },
    /// Connecting to a server did not complete within the session timeout.
    #[error("connection to {server} timed out after {timeout_ms} ms")]
    Timeout {
        /// Name of the server that timed out.
        server: String,
        /// The timeout that elapsed, in milliseconds.
        timeout_ms: u64,
    },
    /// Transport-level connection failure.
    #[error("connection to {server} failed: {reason}")]
    Connect {
        /// Name of the unreachable server.
        server: String,
        /// Underlying connection error detail.
        reason: String,
    },
    /// Transaction demarcation failed around a logon.
    #[error("transaction error: {reason}")]
    Transaction {
        /// Detail reported by the transaction service.
        reason: String,
    },
    /// The operation is not supported by this connector or session.
    #[error("unsupported operation: {operation}")]
    Unsupported {
        /// The rejected operation name.
        operation: String,
    },
    /// The pool has been shut down and no longer accepts calls.
    #[error("authentication pool is shut down")]
    ShutDown,
}

/// Result type alias using AuthError as the error type.
pub type Result<T> = std::result::Result<T, AuthError>;
