//! Outbound session connector seam for authentication servers

use std::fmt;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use async_trait::async_trait;
use storegate_share::protocol::{Protocol, DIRECT_PORT, NETBIOS_PORT};
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tracing::debug;

use crate::error::{AuthError, Result};
use crate::identity::Credentials;

/// One resolved authentication server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerTarget {
    name: String,
    address: IpAddr,
}

impl ServerTarget {
    /// Builds a target from the configured name and its resolved address.
    pub fn new(name: &str, address: IpAddr) -> Self {
        Self {
            name: name.to_string(),
            address,
        }
    }

    /// The server name as configured or resolved.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The resolved network address.
    pub fn address(&self) -> IpAddr {
        self.address
    }
}

impl fmt::Display for ServerTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.address)
    }
}

/// Opens authentication sessions against individual pool members.
///
/// The pool drives failover and health tracking through this seam; protocol
/// layers supply an implementation that speaks their authentication exchange.
#[async_trait]
pub trait SessionConnector: Send + Sync + 'static {
    /// Opens a session to `target` over `protocol`, giving up after `timeout`.
    async fn open_session(
        &self,
        target: &ServerTarget,
        protocol: Protocol,
        timeout: Duration,
    ) -> Result<Box<dyn AuthSession>>;
}

/// An open session against one authentication server.
#[async_trait]
pub trait AuthSession: Send {
    /// Verifies the presented credentials through this session.
    async fn verify(&mut self, credentials: &Credentials) -> Result<()>;

    /// Closes the session, releasing the underlying connection.
    async fn close(&mut self) -> Result<()>;
}

/// Connector reaching authentication servers over plain TCP.
///
/// Establishes transport-level sessions on the protocol's well-known port,
/// which is sufficient for reachability probing and failover selection.
/// Credential verification requires a protocol-aware connector supplied by
/// the embedding server; sessions opened here reject `verify`.
#[derive(Debug, Clone)]
pub struct TcpSessionConnector {
    direct_port: u16,
    netbios_port: u16,
}

impl TcpSessionConnector {
    /// Connector using the well-known ports 445 and 139.
    pub fn new() -> Self {
        Self {
            direct_port: DIRECT_PORT,
            netbios_port: NETBIOS_PORT,
        }
    }

    /// Connector using non-standard ports.
    pub fn with_ports(direct_port: u16, netbios_port: u16) -> Self {
        Self {
            direct_port,
            netbios_port,
        }
    }

    fn port_for(&self, protocol: Protocol) -> u16 {
        match protocol {
            Protocol::Direct => self.direct_port,
            Protocol::NetBios => self.netbios_port,
        }
    }
}

impl Default for TcpSessionConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionConnector for TcpSessionConnector {
    async fn open_session(
        &self,
        target: &ServerTarget,
        protocol: Protocol,
        timeout: Duration,
    ) -> Result<Box<dyn AuthSession>> {
        let addr = SocketAddr::new(target.address(), self.port_for(protocol));
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(stream)) => {
                debug!(server = %target, %protocol, "session opened");
                Ok(Box::new(TcpAuthSession {
                    stream: Some(stream),
                    peer: addr,
                }))
            }
            Ok(Err(err)) => Err(AuthError::Connect {
                server: target.name().to_string(),
                reason: err.to_string(),
            }),
            Err(_) => Err(AuthError::Timeout {
                server: target.name().to_string(),
                timeout_ms: timeout.as_millis() as u64,
            }),
        }
    }
}

struct TcpAuthSession {
    stream: Option<TcpStream>,
    peer: SocketAddr,
}

#[async_trait]
impl AuthSession for TcpAuthSession {
    async fn verify(&mut self, _credentials: &Credentials) -> Result<()> {
        Err(AuthError::Unsupported {
            operation: "credential verification over a raw transport session".to_string(),
        })
    }

    async fn close(&mut self) -> Result<()> {
        if let Some(mut stream) = self.stream.take() {
            stream.shutdown().await.map_err(|err| AuthError::Connect {
                server: self.peer.to_string(),
                reason: err.to_string(),
            })?;
        }
        Ok(())
    }
}
