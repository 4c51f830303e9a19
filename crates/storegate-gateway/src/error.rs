//! Gateway error types and NT status mapping
//!
//! Every fallible facade operation funnels into [`GatewayError`] exactly at
//! the boundary the protocol layer consumes; [`GatewayError::nt_status`]
//! turns the error into the 32-bit status word sent back to the client.

use thiserror::Error;

use storegate_auth::error::AuthError;
use storegate_share::error::AddressError;
use storegate_vfs::error::VfsError;

/// NT status: the request completed successfully.
pub const STATUS_SUCCESS: u32 = 0x0000_0000;
/// NT status: the request failed for an unclassified reason.
pub const STATUS_UNSUCCESSFUL: u32 = 0xC000_0001;
/// NT status: a handle value did not refer to a live object.
pub const STATUS_INVALID_HANDLE: u32 = 0xC000_0008;
/// NT status: a request parameter was invalid.
pub const STATUS_INVALID_PARAMETER: u32 = 0xC000_000D;
/// NT status: the caller lacks access to the object.
pub const STATUS_ACCESS_DENIED: u32 = 0xC000_0022;
/// NT status: no object with the given name exists.
pub const STATUS_OBJECT_NAME_NOT_FOUND: u32 = 0xC000_0034;
/// NT status: the object path is syntactically invalid.
pub const STATUS_OBJECT_PATH_SYNTAX_BAD: u32 = 0xC000_003B;
/// NT status: the logon attempt was rejected.
pub const STATUS_LOGON_FAILURE: u32 = 0xC000_006D;
/// NT status: the operation is not supported on this object.
pub const STATUS_NOT_SUPPORTED: u32 = 0xC000_00BB;
/// NT status: the share name does not exist on this server.
pub const STATUS_BAD_NETWORK_NAME: u32 = 0xC000_00CC;
/// NT status: a directory operation was applied to a non-directory.
pub const STATUS_NOT_A_DIRECTORY: u32 = 0xC000_0103;

/// Errors surfaced by the gateway facade.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// A UNC address failed to parse.
    #[error("address error: {0}")]
    Address(#[from] AddressError),

    /// A lookup or enumeration failed in the virtual filesystem layer.
    #[error("vfs error: {0}")]
    Vfs(#[from] VfsError),

    /// Authentication or pool management failed.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// No share with the given name is exported.
    #[error("unknown share: {share}")]
    UnknownShare {
        /// The share name the client asked for.
        share: String,
    },

    /// A search handle was unknown, already closed, or carried a resume
    /// position the cursor cannot return to.
    #[error("invalid search handle: {handle}")]
    InvalidSearchHandle {
        /// The offending handle id.
        handle: u32,
    },

    /// The gateway configuration was rejected.
    #[error("configuration error: {reason}")]
    Config {
        /// Detail of the rejected setting.
        reason: String,
    },

    /// Underlying filesystem I/O failure.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl GatewayError {
    /// Maps this error to the NT status word reported to the client.
    pub fn nt_status(&self) -> u32 {
        match self {
            GatewayError::Address(_) => STATUS_OBJECT_PATH_SYNTAX_BAD,
            GatewayError::Vfs(VfsError::NotFound { .. }) => STATUS_OBJECT_NAME_NOT_FOUND,
            GatewayError::Vfs(VfsError::NotADirectory { .. }) => STATUS_NOT_A_DIRECTORY,
            GatewayError::Vfs(VfsError::UnsupportedOperation { .. }) => STATUS_NOT_SUPPORTED,
            GatewayError::Vfs(VfsError::Store { .. }) => STATUS_UNSUCCESSFUL,
            GatewayError::Auth(_) => STATUS_LOGON_FAILURE,
            GatewayError::UnknownShare { .. } => STATUS_BAD_NETWORK_NAME,
            GatewayError::InvalidSearchHandle { .. } => STATUS_INVALID_HANDLE,
            GatewayError::Config { .. } => STATUS_INVALID_PARAMETER,
            GatewayError::Io(err) => match err.kind() {
                std::io::ErrorKind::NotFound => STATUS_OBJECT_NAME_NOT_FOUND,
                std::io::ErrorKind::PermissionDenied => STATUS_ACCESS_DENIED,
                _ => STATUS_UNSUCCESSFUL,
            },
        }
    }
}

/// Result type alias using GatewayError as the error type.
pub type Result<T> = std::result::Result<T, GatewayError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_share_display() {
        let err = GatewayError::UnknownShare {
            share: "missing".to_string(),
        };
        assert_eq!(err.to_string(), "unknown share: missing");
        assert_eq!(err.nt_status(), STATUS_BAD_NETWORK_NAME);
    }

    #[test]
    fn test_invalid_search_handle_status() {
        let err = GatewayError::InvalidSearchHandle { handle: 42 };
        assert_eq!(err.to_string(), "invalid search handle: 42");
        assert_eq!(err.nt_status(), STATUS_INVALID_HANDLE);
    }

    #[test]
    fn test_address_error_status() {
        let err = GatewayError::Address(AddressError::InvalidAddress {
            raw: "garbage".to_string(),
        });
        assert_eq!(err.nt_status(), STATUS_OBJECT_PATH_SYNTAX_BAD);
    }

    #[test]
    fn test_vfs_not_found_status() {
        let err = GatewayError::Vfs(VfsError::NotFound {
            path: "\\missing.txt".to_string(),
        });
        assert_eq!(err.nt_status(), STATUS_OBJECT_NAME_NOT_FOUND);
    }

    #[test]
    fn test_vfs_not_a_directory_status() {
        let err = GatewayError::Vfs(VfsError::NotADirectory {
            path: "\\a.txt".to_string(),
        });
        assert_eq!(err.nt_status(), STATUS_NOT_A_DIRECTORY);
    }

    #[test]
    fn test_vfs_unsupported_status() {
        let err = GatewayError::Vfs(VfsError::UnsupportedOperation {
            operation: "write".to_string(),
        });
        assert_eq!(err.nt_status(), STATUS_NOT_SUPPORTED);
    }

    #[test]
    fn test_auth_error_status() {
        let err = GatewayError::Auth(AuthError::NoServersAvailable);
        assert_eq!(err.nt_status(), STATUS_LOGON_FAILURE);
    }

    #[test]
    fn test_config_error_status() {
        let err = GatewayError::Config {
            reason: "no shares configured".to_string(),
        };
        assert_eq!(err.to_string(), "configuration error: no shares configured");
        assert_eq!(err.nt_status(), STATUS_INVALID_PARAMETER);
    }

    #[test]
    fn test_io_error_kinds() {
        let not_found = GatewayError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "gone",
        ));
        assert_eq!(not_found.nt_status(), STATUS_OBJECT_NAME_NOT_FOUND);

        let denied = GatewayError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "locked",
        ));
        assert_eq!(denied.nt_status(), STATUS_ACCESS_DENIED);

        let other = GatewayError::Io(std::io::Error::new(
            std::io::ErrorKind::BrokenPipe,
            "pipe",
        ));
        assert_eq!(other.nt_status(), STATUS_UNSUCCESSFUL);
    }
}
