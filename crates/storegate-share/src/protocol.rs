//! Outbound transport protocol selection for file server connections.

use std::fmt;
use std::str::FromStr;

use crate::error::AddressError;

/// Well-known TCP port for direct-hosted connections.
pub const DIRECT_PORT: u16 = 445;
/// Well-known TCP port for NetBIOS session framing.
pub const NETBIOS_PORT: u16 = 139;

/// Transport protocol used when opening an outbound server connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Direct TCP hosting on port 445.
    Direct,
    /// NetBIOS session framing on port 139.
    NetBios,
}

impl Protocol {
    /// Configuration token for this protocol.
    pub fn as_str(&self) -> &'static str {
        match self {
            Protocol::Direct => "direct",
            Protocol::NetBios => "netbios",
        }
    }

    /// Default TCP port used by this protocol.
    pub fn default_port(&self) -> u16 {
        match self {
            Protocol::Direct => DIRECT_PORT,
            Protocol::NetBios => NETBIOS_PORT,
        }
    }

    /// Matches a configuration token case-insensitively.
    pub fn from_token(token: &str) -> Option<Protocol> {
        if token.eq_ignore_ascii_case("direct") {
            Some(Protocol::Direct)
        } else if token.eq_ignore_ascii_case("netbios") {
            Some(Protocol::NetBios)
        } else {
            None
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Protocol {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Protocol::from_token(s).ok_or_else(|| AddressError::InvalidProtocol {
            token: s.to_string(),
        })
    }
}
