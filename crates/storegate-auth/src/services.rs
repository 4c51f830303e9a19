//! External service seams consumed by the logon bridge

use crate::error::Result;

/// Credential verification backed by the external user registry.
pub trait AuthenticationService: Send + Sync {
    /// Verifies plaintext credentials, returning an opaque session token.
    fn authenticate(&self, user: &str, password: &str) -> Result<String>;

    /// Obtains a session token for the guest account without a credential check.
    fn authenticate_guest(&self, account: &str) -> Result<String>;
}

/// Authority lookups for authenticated users.
pub trait AuthorityService: Send + Sync {
    /// True when `user` holds the administrator authority.
    fn has_admin_authority(&self, user: &str) -> Result<bool>;
}

/// Transaction demarcation wrapped around non-guest logons.
pub trait TransactionService: Send + Sync {
    /// Begins a new transaction.
    fn begin(&self) -> Result<Box<dyn Transaction>>;
}

/// One in-flight transaction, committed or rolled back exactly once.
pub trait Transaction: Send {
    /// Makes the work performed inside the transaction durable.
    fn commit(self: Box<Self>) -> Result<()>;

    /// Discards the work performed inside the transaction.
    fn rollback(self: Box<Self>) -> Result<()>;
}
