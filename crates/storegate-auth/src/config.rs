//! Passthru gateway and FTP bridge configuration

use serde::{Deserialize, Serialize};
use storegate_share::protocol::Protocol;
use tracing::debug;

use crate::error::PassthruConfigError;

/// Session connect timeout applied when the configuration leaves it unset, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 5_000;
/// Lowest acceptable session connect timeout, in milliseconds.
pub const MIN_TIMEOUT_MS: u64 = 2_000;
/// Highest acceptable session connect timeout, in milliseconds.
pub const MAX_TIMEOUT_MS: u64 = 30_000;
/// Lowest acceptable offline re-check interval, in seconds.
pub const MIN_RECHECK_SECS: u64 = 10;
/// Highest acceptable offline re-check interval, in seconds.
pub const MAX_RECHECK_SECS: u64 = 15 * 60;
/// Offline re-check interval applied when the configuration leaves it unset, in seconds.
pub const DEFAULT_RECHECK_SECS: u64 = 5 * 60;

/// Passthru authentication pool configuration.
///
/// Exactly one of the three server-selection strategies must be enabled:
/// local host addresses, an explicit server list, or a domain name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PassthruConfig {
    /// Use every non-loopback address of the local host as the server list.
    pub use_local_host_addresses: bool,
    /// Explicit authentication server host names or addresses.
    pub server_list: Vec<String>,
    /// Domain whose registered controllers become the server list.
    pub domain_name: Option<String>,
    /// Session connect timeout in milliseconds, range 2000..=30000.
    pub connect_timeout_ms: u64,
    /// Interval between offline server re-checks in seconds, range 10..=900.
    pub offline_recheck_secs: Option<u64>,
    /// Comma-separated transport order, one or two of "direct" and "netbios".
    pub protocol_order: Option<String>,
}

impl PassthruConfig {
    /// Configuration using an explicit server list and defaults elsewhere.
    pub fn with_server_list(servers: &[&str]) -> Self {
        Self {
            use_local_host_addresses: false,
            server_list: servers.iter().map(|s| s.to_string()).collect(),
            domain_name: None,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            offline_recheck_secs: None,
            protocol_order: None,
        }
    }

    /// Configuration resolving servers from the local host addresses.
    pub fn with_local_host() -> Self {
        Self {
            use_local_host_addresses: true,
            server_list: vec![],
            domain_name: None,
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            offline_recheck_secs: None,
            protocol_order: None,
        }
    }

    /// Configuration resolving servers from a domain name.
    pub fn with_domain(domain: &str) -> Self {
        Self {
            use_local_host_addresses: false,
            server_list: vec![],
            domain_name: Some(domain.to_string()),
            connect_timeout_ms: DEFAULT_TIMEOUT_MS,
            offline_recheck_secs: None,
            protocol_order: None,
        }
    }

    /// Validates strategy exclusivity, timeout ranges, and the protocol order.
    ///
    /// Out-of-range values are rejected, never clamped.
    pub fn validate(&self) -> Result<(), PassthruConfigError> {
        let strategies = [
            self.use_local_host_addresses,
            !self.server_list.is_empty(),
            self.domain_name.is_some(),
        ];
        let selected = strategies.iter().filter(|enabled| **enabled).count();
        if selected != 1 {
            return Err(PassthruConfigError::StrategyConflict { selected });
        }

        if !(MIN_TIMEOUT_MS..=MAX_TIMEOUT_MS).contains(&self.connect_timeout_ms) {
            return Err(PassthruConfigError::TimeoutOutOfRange {
                value_ms: self.connect_timeout_ms,
            });
        }

        if let Some(secs) = self.offline_recheck_secs {
            if !(MIN_RECHECK_SECS..=MAX_RECHECK_SECS).contains(&secs) {
                return Err(PassthruConfigError::RecheckOutOfRange { value_secs: secs });
            }
        }

        self.parsed_protocol_order()?;

        debug!("passthru configuration validated");
        Ok(())
    }

    /// The configured protocol order, or the default direct-then-netbios.
    pub fn parsed_protocol_order(
        &self,
    ) -> Result<(Protocol, Option<Protocol>), PassthruConfigError> {
        match &self.protocol_order {
            Some(raw) => parse_protocol_order(raw),
            None => Ok((Protocol::Direct, Some(Protocol::NetBios))),
        }
    }

    /// The offline re-check interval in force, configured or default.
    pub fn recheck_secs(&self) -> u64 {
        self.offline_recheck_secs.unwrap_or(DEFAULT_RECHECK_SECS)
    }
}

impl Default for PassthruConfig {
    fn default() -> Self {
        Self::with_local_host()
    }
}

/// Parses a comma-separated protocol order string.
///
/// Accepts one or two tokens drawn from "direct" and "netbios"; repeats,
/// unknown tokens, and three or more tokens are rejected.
pub fn parse_protocol_order(
    raw: &str,
) -> Result<(Protocol, Option<Protocol>), PassthruConfigError> {
    let tokens: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .collect();

    if tokens.is_empty() || tokens.len() > 2 {
        return Err(PassthruConfigError::InvalidProtocolOrder {
            order: raw.to_string(),
        });
    }

    let primary =
        Protocol::from_token(tokens[0]).ok_or_else(|| PassthruConfigError::InvalidProtocolOrder {
            order: raw.to_string(),
        })?;

    let secondary = match tokens.get(1) {
        Some(token) => {
            let secondary = Protocol::from_token(token).ok_or_else(|| {
                PassthruConfigError::InvalidProtocolOrder {
                    order: raw.to_string(),
                }
            })?;
            if secondary == primary {
                return Err(PassthruConfigError::InvalidProtocolOrder {
                    order: raw.to_string(),
                });
            }
            Some(secondary)
        }
        None => None,
    };

    Ok((primary, secondary))
}

/// FTP bridge configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    /// Account name used for guest logons.
    pub anonymous_account: String,
    /// Whether the protocol layer accepts anonymous logons at all.
    pub allow_anonymous: bool,
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            anonymous_account: "anonymous".to_string(),
            allow_anonymous: true,
        }
    }
}
