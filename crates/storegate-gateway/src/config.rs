//! Gateway configuration: exported shares plus the embedded authentication
//! subsystem settings
//!
//! Validation is eager and fail-fast: a bad setting stops startup before any
//! share is exported or any server connection is attempted.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use storegate_auth::config::{FtpConfig, PassthruConfig};
use storegate_share::address::{ACCESS_MARKER, SEPARATOR};

use crate::error::{GatewayError, Result};

/// One exported share: a name clients address and the local directory
/// backing it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Share name as it appears in UNC addresses.
    pub name: String,
    /// Local directory whose contents the share serves.
    pub root: String,
    /// Pseudo-file names synthesized into the share root folder.
    pub pseudo_files: Vec<String>,
}

impl ShareConfig {
    /// Creates a share export with no pseudo files.
    pub fn new(name: &str, root: &str) -> Self {
        Self {
            name: name.to_string(),
            root: root.to_string(),
            pseudo_files: Vec::new(),
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreGateConfig {
    /// Exported shares.
    pub shares: Vec<ShareConfig>,
    /// Passthru authentication pool settings.
    pub passthru: PassthruConfig,
    /// FTP logon bridge settings.
    pub ftp: FtpConfig,
}

impl StoreGateConfig {
    /// Loads a JSON configuration file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: StoreGateConfig = serde_json::from_str(&contents)
            .map_err(|err| GatewayError::Config {
                reason: err.to_string(),
            })?;
        debug!(path = %path.display(), shares = config.shares.len(), "configuration loaded");
        Ok(config)
    }

    /// Checks every setting, reporting the first problem found.
    ///
    /// Share names must be non-empty, free of address metacharacters, and
    /// unique ignoring case. The embedded passthru settings are checked with
    /// the same fail-fast rules the pool applies at startup.
    pub fn validate(&self) -> Result<()> {
        if self.shares.is_empty() {
            return Err(GatewayError::Config {
                reason: "no shares configured".to_string(),
            });
        }

        let mut seen: Vec<String> = Vec::new();
        for share in &self.shares {
            if share.name.is_empty() {
                return Err(GatewayError::Config {
                    reason: "share name must not be empty".to_string(),
                });
            }
            if share.name.contains(SEPARATOR)
                || share.name.contains('/')
                || share.name.contains(ACCESS_MARKER)
            {
                return Err(GatewayError::Config {
                    reason: format!("share name contains reserved characters: {}", share.name),
                });
            }
            if share.root.is_empty() {
                return Err(GatewayError::Config {
                    reason: format!("share {} has no root directory", share.name),
                });
            }
            let key = share.name.to_lowercase();
            if seen.contains(&key) {
                return Err(GatewayError::Config {
                    reason: format!("duplicate share name: {}", share.name),
                });
            }
            seen.push(key);
        }

        self.passthru.validate().map_err(|err| GatewayError::Config {
            reason: err.to_string(),
        })?;

        debug!(shares = self.shares.len(), "gateway configuration validated");
        Ok(())
    }
}

impl Default for StoreGateConfig {
    fn default() -> Self {
        Self {
            shares: Vec::new(),
            passthru: PassthruConfig::default(),
            ftp: FtpConfig::default(),
        }
    }
}
