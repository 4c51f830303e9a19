//! UNC network address parsing and composition.
//!
//! Addresses take the wire form `\\node\share[\path][\file]`. The share
//! segment may embed credentials as `share%user` or `share%user:password`;
//! parsing strips them into dedicated fields so the share name itself stays
//! clean. Forward slashes are accepted on input and normalized to the
//! canonical backslash separator.

use std::fmt;
use std::str::FromStr;

use crate::error::{AddressError, Result};
use crate::protocol::Protocol;

/// Canonical path separator in composed network addresses.
pub const SEPARATOR: char = '\\';
/// Marker introducing embedded credentials inside the share segment.
pub const ACCESS_MARKER: char = '%';
/// Account name substituted when an address carries no embedded user.
pub const GUEST_USER: &str = "GUEST";

/// Shortest well-formed address, `\\a\b`.
const MIN_ADDRESS_LEN: usize = 5;

/// A parsed `\\node\share` network address.
///
/// Holds the target node and share, any credentials that were embedded in
/// the share segment, the pre-split directory path and file name, and the
/// outbound protocol order assigned by configuration. The directory path is
/// always separator-prefixed and is `\` for the share root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareAddress {
    domain: Option<String>,
    node: String,
    share: String,
    user: String,
    password: Option<String>,
    path: String,
    filename: String,
    primary_protocol: Option<Protocol>,
    secondary_protocol: Option<Protocol>,
}

impl ShareAddress {
    /// Creates an address for the root of a share, with the guest user and
    /// no credentials.
    pub fn new(node: &str, share: &str) -> Self {
        ShareAddress {
            domain: None,
            node: node.to_string(),
            share: share.to_string(),
            user: GUEST_USER.to_string(),
            password: None,
            path: String::from("\\"),
            filename: String::new(),
            primary_protocol: None,
            secondary_protocol: None,
        }
    }

    /// Parses a `\\node\share[\path][\file]` string.
    ///
    /// Forward slashes are treated as separators. When the share segment is
    /// the last segment the path defaults to the share root and the file
    /// name is empty; otherwise the final segment becomes the file name and
    /// the segments between share and file name become the directory path.
    /// Embedded `%user[:password]` credentials are stripped from the share
    /// segment; without them the user defaults to [`GUEST_USER`].
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || AddressError::InvalidAddress {
            raw: raw.to_string(),
        };

        let normalized = raw.replace('/', "\\");
        if !normalized.starts_with("\\\\") || normalized.len() < MIN_ADDRESS_LEN {
            return Err(invalid());
        }

        // Node runs from after the leading separators to the next separator.
        let node_end = normalized[2..]
            .find(SEPARATOR)
            .map(|i| i + 2)
            .ok_or_else(invalid)?;
        let node = &normalized[2..node_end];
        if node.is_empty() {
            return Err(invalid());
        }

        let share_start = node_end + 1;
        let (share_raw, path, filename) = match normalized[share_start..].find(SEPARATOR) {
            None => (
                &normalized[share_start..],
                String::from("\\"),
                String::new(),
            ),
            Some(rel) => {
                let share_end = share_start + rel;
                let tail_start = share_end + 1;
                // The last separator splits directory path from file name.
                let last_sep = normalized.rfind(SEPARATOR).unwrap_or(share_end);
                if last_sep > tail_start {
                    (
                        &normalized[share_start..share_end],
                        normalized[share_end..last_sep].to_string(),
                        normalized[last_sep + 1..].to_string(),
                    )
                } else {
                    (
                        &normalized[share_start..share_end],
                        String::from("\\"),
                        normalized[tail_start..].to_string(),
                    )
                }
            }
        };

        // Split `share%user[:password]` credentials out of the share segment.
        let (share, user, password) = match share_raw.find(ACCESS_MARKER) {
            Some(mark) => {
                let cred = &share_raw[mark + 1..];
                match cred.find(':') {
                    Some(colon) => (
                        &share_raw[..mark],
                        cred[..colon].to_string(),
                        Some(cred[colon + 1..].to_string()),
                    ),
                    None => (&share_raw[..mark], cred.to_string(), None),
                }
            }
            None => (share_raw, String::new(), None),
        };
        if share.is_empty() {
            return Err(invalid());
        }

        let user = if user.is_empty() {
            GUEST_USER.to_string()
        } else {
            user
        };

        Ok(ShareAddress {
            domain: None,
            node: node.to_string(),
            share: share.to_string(),
            user,
            password,
            path,
            filename,
            primary_protocol: None,
            secondary_protocol: None,
        })
    }

    /// Target node name.
    pub fn node(&self) -> &str {
        &self.node
    }

    /// Share name, free of any credential syntax.
    pub fn share(&self) -> &str {
        &self.share
    }

    /// Authentication domain, if one was assigned.
    pub fn domain(&self) -> Option<&str> {
        self.domain.as_deref()
    }

    /// User name embedded in the address, or the guest default.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// Password embedded in the address, if any.
    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    /// Directory path below the share root, always separator-prefixed.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// File name segment, empty when the address names a directory.
    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// First protocol to try when connecting to the node.
    pub fn primary_protocol(&self) -> Option<Protocol> {
        self.primary_protocol
    }

    /// Fallback protocol to try after the primary fails.
    pub fn secondary_protocol(&self) -> Option<Protocol> {
        self.secondary_protocol
    }

    /// Whether an authentication domain has been assigned.
    pub fn has_domain(&self) -> bool {
        self.domain.is_some()
    }

    /// Assigns the authentication domain, stored upper-cased.
    pub fn set_domain(&mut self, domain: &str) {
        self.domain = Some(domain.to_ascii_uppercase());
    }

    /// Replaces the node name.
    pub fn set_node(&mut self, node: &str) {
        self.node = node.to_string();
    }

    /// Replaces the share name.
    pub fn set_share(&mut self, share: &str) {
        self.share = share.to_string();
    }

    /// Replaces the user name.
    pub fn set_user(&mut self, user: &str) {
        self.user = user.to_string();
    }

    /// Replaces the password.
    pub fn set_password(&mut self, password: &str) {
        self.password = Some(password.to_string());
    }

    /// Replaces the directory path, normalizing to the separator-prefixed
    /// form. An empty path becomes the share root.
    pub fn set_path(&mut self, path: &str) {
        if path.is_empty() {
            self.path = String::from("\\");
        } else if path.starts_with(SEPARATOR) {
            self.path = path.to_string();
        } else {
            self.path = format!("\\{path}");
        }
    }

    /// Replaces the file name segment.
    pub fn set_filename(&mut self, filename: &str) {
        self.filename = filename.to_string();
    }

    /// Assigns the outbound protocol order for this address.
    pub fn set_protocol_order(&mut self, primary: Protocol, secondary: Option<Protocol>) {
        self.primary_protocol = Some(primary);
        self.secondary_protocol = secondary;
    }

    /// Recomposes the canonical `\\node\share[\path][\file]` string.
    ///
    /// Credentials never appear in the composed form.
    pub fn network_path(&self) -> String {
        let mut out = String::with_capacity(
            4 + self.node.len() + self.share.len() + self.path.len() + self.filename.len(),
        );
        out.push(SEPARATOR);
        out.push(SEPARATOR);
        out.push_str(&self.node);
        out.push(SEPARATOR);
        out.push_str(&self.share);
        if self.path != "\\" {
            out.push_str(&self.path);
        }
        if !self.filename.is_empty() {
            if !out.ends_with(SEPARATOR) {
                out.push(SEPARATOR);
            }
            out.push_str(&self.filename);
        }
        out
    }

    /// Path of the target relative to the share root, separator-prefixed.
    ///
    /// Yields `\` for the share root itself.
    pub fn relative_path(&self) -> String {
        let mut out = self.path.clone();
        if !self.filename.is_empty() {
            if !out.ends_with(SEPARATOR) {
                out.push(SEPARATOR);
            }
            out.push_str(&self.filename);
        }
        out
    }

    /// Joins a working directory and file name into a share-relative path,
    /// inserting separators where they are missing.
    pub fn make_path(dir: &str, filename: &str) -> String {
        let mut out = String::with_capacity(dir.len() + filename.len() + 2);
        if !dir.starts_with(SEPARATOR) {
            out.push(SEPARATOR);
        }
        out.push_str(dir);
        if !out.ends_with(SEPARATOR) {
            out.push(SEPARATOR);
        }
        out.push_str(filename);
        out
    }
}

impl fmt::Display for ShareAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.network_path())
    }
}

impl FromStr for ShareAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self> {
        ShareAddress::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_share_only() {
        let addr = ShareAddress::parse("\\\\node\\share").unwrap();
        assert_eq!(addr.node(), "node");
        assert_eq!(addr.share(), "share");
        assert_eq!(addr.path(), "\\");
        assert_eq!(addr.filename(), "");
        assert_eq!(addr.user(), GUEST_USER);
        assert_eq!(addr.password(), None);
    }

    #[test]
    fn test_parse_path_and_filename() {
        let addr = ShareAddress::parse("\\\\node\\share\\docs\\file.txt").unwrap();
        assert_eq!(addr.node(), "node");
        assert_eq!(addr.share(), "share");
        assert_eq!(addr.path(), "\\docs");
        assert_eq!(addr.filename(), "file.txt");
    }

    #[test]
    fn test_parse_deep_path() {
        let addr = ShareAddress::parse("\\\\fs1\\public\\a\\b\\c\\report.pdf").unwrap();
        assert_eq!(addr.path(), "\\a\\b\\c");
        assert_eq!(addr.filename(), "report.pdf");
    }

    #[test]
    fn test_parse_file_at_share_root() {
        let addr = ShareAddress::parse("\\\\node\\share\\file.txt").unwrap();
        assert_eq!(addr.path(), "\\");
        assert_eq!(addr.filename(), "file.txt");
    }

    #[test]
    fn test_parse_trailing_separator_is_directory() {
        let addr = ShareAddress::parse("\\\\node\\share\\docs\\").unwrap();
        assert_eq!(addr.path(), "\\docs");
        assert_eq!(addr.filename(), "");
    }

    #[test]
    fn test_parse_credentials_user_and_password() {
        let addr = ShareAddress::parse("\\\\node\\share%alice:secret\\docs\\file.txt").unwrap();
        assert_eq!(addr.share(), "share");
        assert_eq!(addr.user(), "alice");
        assert_eq!(addr.password(), Some("secret"));
        assert_eq!(addr.path(), "\\docs");
        assert_eq!(addr.filename(), "file.txt");
    }

    #[test]
    fn test_parse_credentials_user_only() {
        let addr = ShareAddress::parse("\\\\node\\share%bob").unwrap();
        assert_eq!(addr.share(), "share");
        assert_eq!(addr.user(), "bob");
        assert_eq!(addr.password(), None);
    }

    #[test]
    fn test_parse_empty_user_defaults_to_guest() {
        let addr = ShareAddress::parse("\\\\node\\share%:pw").unwrap();
        assert_eq!(addr.user(), GUEST_USER);
        assert_eq!(addr.password(), Some("pw"));
    }

    #[test]
    fn test_parse_password_may_contain_colon() {
        let addr = ShareAddress::parse("\\\\node\\share%u:a:b").unwrap();
        assert_eq!(addr.user(), "u");
        assert_eq!(addr.password(), Some("a:b"));
    }

    #[test]
    fn test_parse_forward_slashes() {
        let fwd = ShareAddress::parse("//node/share/docs/file.txt").unwrap();
        let back = ShareAddress::parse("\\\\node\\share\\docs\\file.txt").unwrap();
        assert_eq!(fwd, back);
    }

    #[test]
    fn test_parse_mixed_separators() {
        let addr = ShareAddress::parse("\\\\node/share\\docs/file.txt").unwrap();
        assert_eq!(addr.share(), "share");
        assert_eq!(addr.path(), "\\docs");
        assert_eq!(addr.filename(), "file.txt");
    }

    #[test]
    fn test_parse_rejects_missing_share() {
        for raw in ["\\\\node", "\\\\node\\", "\\\\\\share"] {
            let err = ShareAddress::parse(raw).unwrap_err();
            assert_eq!(
                err,
                AddressError::InvalidAddress {
                    raw: raw.to_string()
                }
            );
        }
    }

    #[test]
    fn test_parse_rejects_bad_prefix() {
        assert!(ShareAddress::parse("abc").is_err());
        assert!(ShareAddress::parse("\\node\\share").is_err());
        assert!(ShareAddress::parse("").is_err());
    }

    #[test]
    fn test_parse_rejects_too_short() {
        assert!(ShareAddress::parse("\\\\").is_err());
        assert!(ShareAddress::parse("\\\\a\\").is_err());
        assert!(ShareAddress::parse("\\\\a\\b").is_ok());
    }

    #[test]
    fn test_parse_error_carries_raw_input() {
        let err = ShareAddress::parse("//bad").unwrap_err();
        assert_eq!(
            err,
            AddressError::InvalidAddress {
                raw: "//bad".to_string()
            }
        );
    }

    #[test]
    fn test_network_path_share_only() {
        let addr = ShareAddress::parse("\\\\node\\share").unwrap();
        assert_eq!(addr.network_path(), "\\\\node\\share");
    }

    #[test]
    fn test_network_path_with_path_and_file() {
        let addr = ShareAddress::parse("\\\\node\\share\\docs\\file.txt").unwrap();
        assert_eq!(addr.network_path(), "\\\\node\\share\\docs\\file.txt");
    }

    #[test]
    fn test_network_path_root_file() {
        let addr = ShareAddress::parse("\\\\node\\share\\file.txt").unwrap();
        assert_eq!(addr.network_path(), "\\\\node\\share\\file.txt");
    }

    #[test]
    fn test_network_path_normalizes_forward_slashes() {
        let addr = ShareAddress::parse("//node/share/docs/file.txt").unwrap();
        assert_eq!(addr.network_path(), "\\\\node\\share\\docs\\file.txt");
    }

    #[test]
    fn test_network_path_omits_credentials() {
        let addr = ShareAddress::parse("\\\\node\\share%alice:secret\\f.txt").unwrap();
        assert_eq!(addr.network_path(), "\\\\node\\share\\f.txt");
    }

    #[test]
    fn test_display_matches_network_path() {
        let addr = ShareAddress::parse("\\\\node\\share\\docs\\file.txt").unwrap();
        assert_eq!(addr.to_string(), addr.network_path());
    }

    #[test]
    fn test_from_str() {
        let addr: ShareAddress = "\\\\node\\share".parse().unwrap();
        assert_eq!(addr.node(), "node");
    }

    #[test]
    fn test_relative_path_root() {
        let addr = ShareAddress::parse("\\\\node\\share").unwrap();
        assert_eq!(addr.relative_path(), "\\");
    }

    #[test]
    fn test_relative_path_root_file() {
        let addr = ShareAddress::parse("\\\\node\\share\\f.txt").unwrap();
        assert_eq!(addr.relative_path(), "\\f.txt");
    }

    #[test]
    fn test_relative_path_nested() {
        let addr = ShareAddress::parse("\\\\node\\share\\a\\b\\f.txt").unwrap();
        assert_eq!(addr.relative_path(), "\\a\\b\\f.txt");
    }

    #[test]
    fn test_make_path_inserts_separators() {
        assert_eq!(ShareAddress::make_path("docs", "a.txt"), "\\docs\\a.txt");
        assert_eq!(ShareAddress::make_path("\\docs", "a.txt"), "\\docs\\a.txt");
        assert_eq!(ShareAddress::make_path("\\docs\\", "a.txt"), "\\docs\\a.txt");
    }

    #[test]
    fn test_make_path_root_dir() {
        assert_eq!(ShareAddress::make_path("\\", "a.txt"), "\\a.txt");
        assert_eq!(ShareAddress::make_path("", "a.txt"), "\\a.txt");
    }

    #[test]
    fn test_set_domain_uppercases() {
        let mut addr = ShareAddress::new("node", "share");
        assert!(!addr.has_domain());
        addr.set_domain("corp");
        assert_eq!(addr.domain(), Some("CORP"));
        assert!(addr.has_domain());
    }

    #[test]
    fn test_set_path_normalizes() {
        let mut addr = ShareAddress::new("node", "share");
        addr.set_path("docs");
        assert_eq!(addr.path(), "\\docs");
        addr.set_path("");
        assert_eq!(addr.path(), "\\");
        addr.set_path("\\already");
        assert_eq!(addr.path(), "\\already");
    }

    #[test]
    fn test_new_defaults() {
        let addr = ShareAddress::new("node", "share");
        assert_eq!(addr.user(), GUEST_USER);
        assert_eq!(addr.path(), "\\");
        assert_eq!(addr.filename(), "");
        assert_eq!(addr.primary_protocol(), None);
        assert_eq!(addr.secondary_protocol(), None);
    }

    #[test]
    fn test_protocol_order_assignment() {
        let mut addr = ShareAddress::new("node", "share");
        addr.set_protocol_order(Protocol::Direct, Some(Protocol::NetBios));
        assert_eq!(addr.primary_protocol(), Some(Protocol::Direct));
        assert_eq!(addr.secondary_protocol(), Some(Protocol::NetBios));
    }

    #[test]
    fn test_parse_unicode_segments() {
        let addr = ShareAddress::parse("\\\\nöde\\shäre\\döcs\\fïle.txt").unwrap();
        assert_eq!(addr.node(), "nöde");
        assert_eq!(addr.share(), "shäre");
        assert_eq!(addr.path(), "\\döcs");
        assert_eq!(addr.filename(), "fïle.txt");
    }
}
