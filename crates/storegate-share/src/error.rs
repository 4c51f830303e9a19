//! Error types for share address handling

use thiserror::Error;

/// Errors raised while parsing share addresses or protocol tokens.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    /// The supplied string is not a well-formed `\\node\share` address.
    #[error("invalid network path: {raw}")]
    InvalidAddress {
        /// The offending address string, exactly as received.
        raw: String,
    },
    /// A transport protocol token was not recognized.
    #[error("invalid protocol token: {token}")]
    InvalidProtocol {
        /// The unrecognized token.
        token: String,
    },
}

/// Result type alias using AddressError as the error type.
pub type Result<T> = std::result::Result<T, AddressError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_address_display() {
        let err = AddressError::InvalidAddress {
            raw: "not-a-path".to_string(),
        };
        assert_eq!(err.to_string(), "invalid network path: not-a-path");
    }

    #[test]
    fn test_invalid_protocol_display() {
        let err = AddressError::InvalidProtocol {
            token: "ipx".to_string(),
        };
        assert_eq!(err.to_string(), "invalid protocol token: ipx");
    }
}
