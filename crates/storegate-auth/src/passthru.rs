//! Passthrough authentication server pool with health-tracked failover

use std::net::{IpAddr, ToSocketAddrs};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use storegate_share::protocol::Protocol;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::PassthruConfig;
use crate::connector::{AuthSession, ServerTarget, SessionConnector};
use crate::error::{AuthError, PassthruConfigError, Result};
use crate::identity::{ClientIdentity, Credentials};

const STATUS_ONLINE: u8 = 0;
const STATUS_OFFLINE: u8 = 1;

/// Availability of one pool member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ServerStatus {
    /// The server accepted its most recent connection attempt.
    #[default]
    Online,
    /// The server failed its most recent connection attempt.
    Offline,
}

impl From<u8> for ServerStatus {
    fn from(raw: u8) -> Self {
        match raw {
            STATUS_OFFLINE => ServerStatus::Offline,
            _ => ServerStatus::Online,
        }
    }
}

impl From<ServerStatus> for u8 {
    fn from(status: ServerStatus) -> Self {
        match status {
            ServerStatus::Online => STATUS_ONLINE,
            ServerStatus::Offline => STATUS_OFFLINE,
        }
    }
}

/// Point-in-time view of one pool member's health.
#[derive(Debug, Clone)]
pub struct ServerSnapshot {
    /// Server name as configured or resolved.
    pub name: String,
    /// Resolved network address.
    pub address: IpAddr,
    /// Current availability.
    pub status: ServerStatus,
    /// Epoch milliseconds of the last connection attempt or probe, 0 if never.
    pub last_checked_ms: u64,
    /// Successful connection count.
    pub connect_count: u64,
    /// Failed connection count.
    pub failure_count: u64,
}

struct ServerHealth {
    status: AtomicU8,
    last_checked_ms: AtomicU64,
    connect_count: AtomicU64,
    failure_count: AtomicU64,
}

impl ServerHealth {
    fn new() -> Self {
        Self {
            status: AtomicU8::new(STATUS_ONLINE),
            last_checked_ms: AtomicU64::new(0),
            connect_count: AtomicU64::new(0),
            failure_count: AtomicU64::new(0),
        }
    }

    fn status(&self) -> ServerStatus {
        ServerStatus::from(self.status.load(Ordering::Relaxed))
    }

    fn record_success(&self) {
        self.status.store(STATUS_ONLINE, Ordering::Relaxed);
        self.connect_count.fetch_add(1, Ordering::Relaxed);
        self.last_checked_ms.store(now_epoch_ms(), Ordering::Relaxed);
    }

    fn record_failure(&self) {
        self.status.store(STATUS_OFFLINE, Ordering::Relaxed);
        self.failure_count.fetch_add(1, Ordering::Relaxed);
        self.last_checked_ms.store(now_epoch_ms(), Ordering::Relaxed);
    }

    fn touch(&self) {
        self.last_checked_ms.store(now_epoch_ms(), Ordering::Relaxed);
    }
}

struct PoolMember {
    target: ServerTarget,
    health: ServerHealth,
}

impl PoolMember {
    fn new(target: ServerTarget) -> Self {
        Self {
            target,
            health: ServerHealth::new(),
        }
    }

    fn snapshot(&self) -> ServerSnapshot {
        ServerSnapshot {
            name: self.target.name().to_string(),
            address: self.target.address(),
            status: self.health.status(),
            last_checked_ms: self.health.last_checked_ms.load(Ordering::Relaxed),
            connect_count: self.health.connect_count.load(Ordering::Relaxed),
            failure_count: self.health.failure_count.load(Ordering::Relaxed),
        }
    }
}

/// Pool of passthrough authentication servers.
///
/// Holds the process-wide server health table. Authentication requests walk
/// the pool in configured order, skipping members marked offline; a background
/// task re-probes offline members and restores them when they answer again.
pub struct PassthruServerPool {
    members: Arc<Vec<Arc<PoolMember>>>,
    connector: Arc<dyn SessionConnector>,
    protocols: Vec<Protocol>,
    timeout: Duration,
    shut_down: Arc<AtomicBool>,
    monitor: JoinHandle<()>,
}

impl PassthruServerPool {
    /// Validates the configuration, resolves the server list, and starts the
    /// offline re-check task. Fails fast on any configuration problem or when
    /// zero servers resolve.
    pub fn start(
        config: PassthruConfig,
        connector: Arc<dyn SessionConnector>,
    ) -> std::result::Result<Self, PassthruConfigError> {
        config.validate()?;
        let (primary, secondary) = config.parsed_protocol_order()?;
        let mut protocols = vec![primary];
        if let Some(secondary) = secondary {
            protocols.push(secondary);
        }

        let targets = resolve_servers(&config)?;
        let members: Vec<Arc<PoolMember>> = targets
            .into_iter()
            .map(|target| Arc::new(PoolMember::new(target)))
            .collect();
        let members = Arc::new(members);

        let timeout = Duration::from_millis(config.connect_timeout_ms);
        let interval = Duration::from_secs(config.recheck_secs());
        let shut_down = Arc::new(AtomicBool::new(false));

        info!(
            total = members.len(),
            timeout_ms = config.connect_timeout_ms,
            recheck_secs = config.recheck_secs(),
            "passthru server pool started"
        );

        let monitor = OfflineMonitor {
            members: members.clone(),
            connector: connector.clone(),
            protocols: protocols.clone(),
            timeout,
            interval,
            shut_down: shut_down.clone(),
        };
        let monitor = tokio::spawn(monitor.run());

        Ok(Self {
            members,
            connector,
            protocols,
            timeout,
            shut_down,
            monitor,
        })
    }

    /// Authenticates `credentials` against the first reachable pool member.
    ///
    /// Members marked offline are skipped; a member that fails every
    /// configured transport is marked offline and the next one is tried.
    pub async fn authenticate(
        &self,
        identity: &ClientIdentity,
        credentials: &Credentials,
    ) -> Result<()> {
        if self.shut_down.load(Ordering::Relaxed) {
            return Err(AuthError::ShutDown);
        }

        let (member, mut session) = self.open_first_available().await?;
        let outcome = session.verify(credentials).await;
        if let Err(err) = session.close().await {
            debug!(server = %member.target, error = %err, "session close failed");
        }

        match outcome {
            Ok(()) => {
                debug!(
                    user = %identity.user(),
                    server = %member.target,
                    "passthru authentication accepted"
                );
                Ok(())
            }
            Err(err) => {
                warn!(
                    user = %identity.user(),
                    server = %member.target,
                    error = %err,
                    "passthru authentication rejected"
                );
                Err(err)
            }
        }
    }

    async fn open_first_available(&self) -> Result<(Arc<PoolMember>, Box<dyn AuthSession>)> {
        for member in self.members.iter() {
            if member.health.status() == ServerStatus::Offline {
                debug!(server = %member.target, "skipping offline server");
                continue;
            }
            match open_member_session(&*self.connector, member, &self.protocols, self.timeout)
                .await
            {
                Some(session) => {
                    member.health.record_success();
                    return Ok((member.clone(), session));
                }
                None => {
                    member.health.record_failure();
                    warn!(server = %member.target, "passthru server marked offline");
                }
            }
        }
        Err(AuthError::NoServersAvailable)
    }

    /// Number of servers in the pool.
    pub fn total_count(&self) -> usize {
        self.members.len()
    }

    /// Number of servers currently marked online.
    pub fn online_count(&self) -> usize {
        self.members
            .iter()
            .filter(|member| member.health.status() == ServerStatus::Online)
            .count()
    }

    /// Number of servers currently marked offline.
    pub fn offline_count(&self) -> usize {
        self.total_count() - self.online_count()
    }

    /// Health snapshot of every pool member, in configured order.
    pub fn snapshot(&self) -> Vec<ServerSnapshot> {
        self.members.iter().map(|member| member.snapshot()).collect()
    }

    /// The session connect timeout in force.
    pub fn connect_timeout(&self) -> Duration {
        self.timeout
    }

    /// The transports tried against each server, in order.
    pub fn protocol_order(&self) -> &[Protocol] {
        &self.protocols
    }

    /// True once `shutdown` has been called.
    pub fn is_shut_down(&self) -> bool {
        self.shut_down.load(Ordering::Relaxed)
    }

    /// Stops the offline re-check task. Subsequent `authenticate` calls fail
    /// fast with `AuthError::ShutDown`.
    pub fn shutdown(&self) {
        if self.shut_down.swap(true, Ordering::Relaxed) {
            return;
        }
        self.monitor.abort();
        info!("passthru server pool shut down");
    }
}

impl Drop for PassthruServerPool {
    fn drop(&mut self) {
        self.monitor.abort();
    }
}

struct OfflineMonitor {
    members: Arc<Vec<Arc<PoolMember>>>,
    connector: Arc<dyn SessionConnector>,
    protocols: Vec<Protocol>,
    timeout: Duration,
    interval: Duration,
    shut_down: Arc<AtomicBool>,
}

impl OfflineMonitor {
    async fn run(self) {
        loop {
            tokio::time::sleep(self.interval).await;
            if self.shut_down.load(Ordering::Relaxed) {
                break;
            }
            for member in self.members.iter() {
                if member.health.status() != ServerStatus::Offline {
                    continue;
                }
                match open_member_session(&*self.connector, member, &self.protocols, self.timeout)
                    .await
                {
                    Some(mut session) => {
                        let _ = session.close().await;
                        member.health.record_success();
                        info!(server = %member.target, "offline passthru server restored");
                    }
                    None => {
                        member.health.touch();
                        debug!(server = %member.target, "offline passthru server still unreachable");
                    }
                }
            }
        }
    }
}

async fn open_member_session(
    connector: &dyn SessionConnector,
    member: &PoolMember,
    protocols: &[Protocol],
    timeout: Duration,
) -> Option<Box<dyn AuthSession>> {
    for protocol in protocols {
        match connector
            .open_session(&member.target, *protocol, timeout)
            .await
        {
            Ok(session) => return Some(session),
            Err(err) => {
                debug!(
                    server = %member.target,
                    %protocol,
                    error = %err,
                    "connection attempt failed"
                );
            }
        }
    }
    None
}

fn resolve_servers(
    config: &PassthruConfig,
) -> std::result::Result<Vec<ServerTarget>, PassthruConfigError> {
    let mut targets: Vec<ServerTarget> = Vec::new();

    if config.use_local_host_addresses {
        for addr in local_host_addresses() {
            push_unique(&mut targets, ServerTarget::new(&addr.to_string(), addr));
        }
    } else if !config.server_list.is_empty() {
        for name in &config.server_list {
            let resolved = resolve_host(name);
            if resolved.is_empty() {
                error!(server = %name, "authentication server did not resolve");
                continue;
            }
            for addr in resolved {
                push_unique(&mut targets, ServerTarget::new(name, addr));
            }
        }
    } else if let Some(domain) = &config.domain_name {
        for addr in resolve_host(domain) {
            push_unique(&mut targets, ServerTarget::new(domain, addr));
        }
        if targets.is_empty() {
            error!(domain = %domain, "no authentication servers resolved from domain");
        }
    }

    if targets.is_empty() {
        return Err(PassthruConfigError::NoValidServers);
    }
    Ok(targets)
}

fn push_unique(targets: &mut Vec<ServerTarget>, target: ServerTarget) {
    if targets
        .iter()
        .all(|existing| existing.address() != target.address())
    {
        targets.push(target);
    }
}

/// Resolves a host name or address literal to its addresses.
///
/// Literal addresses bypass the resolver; lookup failures yield an empty list.
fn resolve_host(name: &str) -> Vec<IpAddr> {
    if let Ok(addr) = name.parse::<IpAddr>() {
        return vec![addr];
    }
    match (name, 0u16).to_socket_addrs() {
        Ok(addrs) => addrs.map(|sock| sock.ip()).collect(),
        Err(err) => {
            debug!(host = %name, error = %err, "host resolution failed");
            vec![]
        }
    }
}

fn local_host_addresses() -> Vec<IpAddr> {
    let hostname = match local_hostname() {
        Some(name) => name,
        None => {
            error!("local hostname lookup failed");
            return vec![];
        }
    };
    let filtered = non_loopback(resolve_host(&hostname));
    if filtered.is_empty() {
        error!(host = %hostname, "no non-loopback local addresses found");
    }
    filtered
}

fn non_loopback(addrs: Vec<IpAddr>) -> Vec<IpAddr> {
    addrs.into_iter().filter(|addr| !addr.is_loopback()).collect()
}

fn local_hostname() -> Option<String> {
    let mut buf = [0u8; 256];
    let rc = unsafe { libc::gethostname(buf.as_mut_ptr() as *mut libc::c_char, buf.len()) };
    if rc != 0 {
        return None;
    }
    let len = buf.iter().position(|&b| b == 0).unwrap_or(buf.len());
    Some(String::from_utf8_lossy(&buf[..len]).into_owned())
}

fn now_epoch_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
