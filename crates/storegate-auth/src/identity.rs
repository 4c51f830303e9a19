//! Client identity, logon classification, and credential types

use std::fmt;

/// How a completed logon was classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogonKind {
    /// Ordinary credential-verified logon.
    #[default]
    Normal,
    /// Guest logon, no credential check performed.
    Guest,
    /// Null session, no identity presented. Surfaced for protocol layers
    /// that accept anonymous binds; the FTP bridge never produces it.
    Null,
    /// Credential-verified logon holding the administrator authority.
    Administrator,
}

impl LogonKind {
    /// Lowercase token used in log output.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogonKind::Normal => "normal",
            LogonKind::Guest => "guest",
            LogonKind::Null => "null",
            LogonKind::Administrator => "administrator",
        }
    }
}

impl fmt::Display for LogonKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Plaintext credential pair forwarded to an authentication server.
#[derive(Clone)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    /// Builds a credential pair.
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            password: password.to_string(),
        }
    }

    /// The user name these credentials belong to.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The plaintext password.
    pub fn password(&self) -> &str {
        &self.password
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Identity and session-scoped authentication state for one connected client.
///
/// Mutated in place by the logon bridge: a successful logon sets the
/// classification and captures the opaque authentication token.
#[derive(Clone)]
pub struct ClientIdentity {
    user: String,
    password: String,
    domain: String,
    remote_address: Option<String>,
    guest: bool,
    logon_kind: LogonKind,
    auth_token: Option<String>,
}

impl ClientIdentity {
    /// Builds an identity for an ordinary credential-bearing client.
    pub fn new(user: &str, password: &str) -> Self {
        Self {
            user: user.to_string(),
            password: password.to_string(),
            domain: String::new(),
            remote_address: None,
            guest: false,
            logon_kind: LogonKind::Normal,
            auth_token: None,
        }
    }

    /// Builds a guest-flagged identity. The password is ignored for guests.
    pub fn guest(user: &str) -> Self {
        let mut identity = Self::new(user, "");
        identity.guest = true;
        identity
    }

    /// The client user name.
    pub fn user(&self) -> &str {
        &self.user
    }

    /// The plaintext password presented by the client.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The authentication domain, empty when none was supplied.
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Sets the authentication domain.
    pub fn set_domain(&mut self, domain: &str) {
        self.domain = domain.to_string();
    }

    /// The remote network address of the client session, when known.
    pub fn remote_address(&self) -> Option<&str> {
        self.remote_address.as_deref()
    }

    /// Records the remote network address of the client session.
    pub fn set_remote_address(&mut self, address: &str) {
        self.remote_address = Some(address.to_string());
    }

    /// True when this identity requests a guest logon.
    pub fn is_guest(&self) -> bool {
        self.guest
    }

    /// Flags or unflags this identity as a guest.
    pub fn set_guest(&mut self, guest: bool) {
        self.guest = guest;
    }

    /// Classification assigned by the most recent logon.
    pub fn logon_kind(&self) -> LogonKind {
        self.logon_kind
    }

    /// Assigns the logon classification.
    pub fn set_logon_kind(&mut self, kind: LogonKind) {
        self.logon_kind = kind;
    }

    /// Opaque token captured from a successful logon, if any.
    pub fn auth_token(&self) -> Option<&str> {
        self.auth_token.as_deref()
    }

    /// Stores the opaque token returned by a successful logon.
    pub fn set_auth_token(&mut self, token: &str) {
        self.auth_token = Some(token.to_string());
    }

    /// Credential pair for forwarding to an authentication server.
    pub fn credentials(&self) -> Credentials {
        Credentials::new(&self.user, &self.password)
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("user", &self.user)
            .field("password", &"[REDACTED]")
            .field("domain", &self.domain)
            .field("remote_address", &self.remote_address)
            .field("guest", &self.guest)
            .field("logon_kind", &self.logon_kind)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}
