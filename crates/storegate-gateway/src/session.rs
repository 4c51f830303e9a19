//! Session facade consumed by protocol layers
//!
//! One [`StoreGateway`] holds the share table, the live search-cursor
//! registry, and the authentication wiring. Protocol layers hand it raw UNC
//! addresses and share-relative paths and get back wire-ready entries, or a
//! [`GatewayError`] whose NT status goes into the response.
//!
//! Search handles are plain `u32` ids backed by a concurrent map; no lock is
//! held while a cursor is idle, and enumeration snapshots are taken when the
//! search starts so cursor calls never touch the store again.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use tracing::{debug, info, warn};

use storegate_auth::ftp::FtpLogonBridge;
use storegate_auth::identity::ClientIdentity;
use storegate_auth::passthru::PassthruServerPool;
use storegate_share::address::ShareAddress;
use storegate_vfs::error::VfsError;
use storegate_vfs::info::{path_file_id, ContentStore, FileInfo, NodeDescriptor, NodeKind};
use storegate_vfs::pseudo::{PseudoFileEntry, PseudoFileList, PseudoFolderHandle};
use storegate_vfs::search::{MultiResultSearch, SearchCursor, SingleResultSearch};
use storegate_vfs::wildcard::WildcardPattern;

use crate::config::{ShareConfig, StoreGateConfig};
use crate::error::{GatewayError, Result};
use crate::store::LocalStore;

/// One live share export: its display name, backing store, and per-folder
/// pseudo entries.
struct Export {
    name: String,
    store: Arc<dyn ContentStore>,
    pseudo: DashMap<String, PseudoFileList>,
}

impl Export {
    fn new(name: &str, store: Arc<dyn ContentStore>) -> Self {
        Self {
            name: name.to_string(),
            store,
            pseudo: DashMap::new(),
        }
    }

    fn add_pseudo(&self, entry: PseudoFileEntry) {
        let key = folder_key(entry.folder_path());
        self.pseudo
            .entry(key)
            .or_insert_with(PseudoFileList::new)
            .add(entry);
    }

    fn find_pseudo(&self, folder: &str, name: &str) -> Option<Arc<PseudoFileEntry>> {
        self.pseudo
            .get(&folder_key(folder))
            .and_then(|list| list.find(name, true))
    }

    fn matching_pseudo(&self, folder: &str, pattern: &WildcardPattern) -> Vec<Arc<PseudoFileEntry>> {
        match self.pseudo.get(&folder_key(folder)) {
            Some(list) => list.matching(pattern).iter().cloned().collect(),
            None => Vec::new(),
        }
    }
}

/// Share table, search-handle registry, and authentication entry points.
pub struct StoreGateway {
    exports: HashMap<String, Arc<Export>>,
    searches: DashMap<u32, Box<dyn SearchCursor>>,
    next_search_id: AtomicU32,
    pool: Option<Arc<PassthruServerPool>>,
    bridge: Option<Arc<FtpLogonBridge>>,
    allow_anonymous: bool,
}

impl StoreGateway {
    /// Creates a gateway with no exports and no authentication wiring.
    pub fn new() -> Self {
        Self {
            exports: HashMap::new(),
            searches: DashMap::new(),
            next_search_id: AtomicU32::new(1),
            pool: None,
            bridge: None,
            allow_anonymous: true,
        }
    }

    /// Builds a gateway from a validated configuration.
    ///
    /// Each share is backed by a [`LocalStore`] over its root directory,
    /// with the configured pseudo files synthesized into the share root.
    pub fn from_config(config: &StoreGateConfig) -> Result<Self> {
        config.validate()?;
        let mut gateway = StoreGateway::new();
        gateway.allow_anonymous = config.ftp.allow_anonymous;
        for share in &config.shares {
            let store = Arc::new(LocalStore::new(&share.root));
            gateway.add_export(share, store)?;
        }
        Ok(gateway)
    }

    /// Adds a share export backed by `store`.
    ///
    /// Pseudo files named in the share configuration appear in the share
    /// root folder as zero-length virtual files.
    pub fn add_export(
        &mut self,
        config: &ShareConfig,
        store: Arc<dyn ContentStore>,
    ) -> Result<()> {
        let key = config.name.to_lowercase();
        if self.exports.contains_key(&key) {
            return Err(GatewayError::Config {
                reason: format!("duplicate share name: {}", config.name),
            });
        }
        let export = Export::new(&config.name, store);
        for name in &config.pseudo_files {
            export.add_pseudo(PseudoFileEntry::synthesize(name, "\\", NodeKind::File, None));
        }
        info!(share = %config.name, pseudo = config.pseudo_files.len(), "share exported");
        self.exports.insert(key, Arc::new(export));
        Ok(())
    }

    /// Installs the logon bridge consulted by [`StoreGateway::logon`].
    pub fn set_logon_bridge(&mut self, bridge: Arc<FtpLogonBridge>) {
        self.bridge = Some(bridge);
    }

    /// Installs the passthru pool used for credential verification.
    pub fn set_passthru_pool(&mut self, pool: Arc<PassthruServerPool>) {
        self.pool = Some(pool);
    }

    /// Enables or disables anonymous guest logons.
    pub fn set_allow_anonymous(&mut self, allow: bool) {
        self.allow_anonymous = allow;
    }

    /// Names of the exported shares, in display case.
    pub fn share_names(&self) -> Vec<String> {
        self.exports
            .values()
            .map(|export| export.name.clone())
            .collect()
    }

    /// Parses a raw UNC address and checks that its share is exported.
    ///
    /// Share names are matched ignoring case.
    pub fn connect_tree(&self, raw: &str) -> Result<ShareAddress> {
        let address = ShareAddress::parse(raw)?;
        self.export(address.share())?;
        debug!(node = address.node(), share = address.share(), "tree connected");
        Ok(address)
    }

    /// Stats a single object by share-relative path.
    ///
    /// A miss in the backing store falls back to the pseudo entries of the
    /// containing folder; the pseudo lookup ignores case.
    pub fn find_file(&self, share: &str, path: &str) -> Result<FileInfo> {
        let export = self.export(share)?;
        match export.store.find_node(&export.name, path) {
            Ok(descriptor) => Ok(FileInfo::from_descriptor(&descriptor, path_file_id(path))),
            Err(VfsError::NotFound { .. }) => {
                let (folder, name) = split_search_path(path);
                export
                    .find_pseudo(&folder, &name)
                    .map(|entry| entry.info().clone())
                    .ok_or_else(|| {
                        VfsError::NotFound {
                            path: path.to_string(),
                        }
                        .into()
                    })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Synthesizes a pseudo entry into a share folder.
    ///
    /// When a source descriptor is given its size and timestamps carry over
    /// onto the synthesized entry.
    pub fn register_pseudo(
        &self,
        share: &str,
        folder: &str,
        name: &str,
        kind: NodeKind,
        source: Option<&NodeDescriptor>,
    ) -> Result<()> {
        let export = self.export(share)?;
        export.add_pseudo(PseudoFileEntry::synthesize(name, folder, kind, source));
        Ok(())
    }

    /// Opens a directory-level handle on a pseudo folder entry.
    ///
    /// Fails with a not-a-directory error for pseudo files; pseudo entries
    /// never support content I/O.
    pub fn open_pseudo_folder(
        &self,
        share: &str,
        folder: &str,
        name: &str,
    ) -> Result<PseudoFolderHandle> {
        let export = self.export(share)?;
        let entry = export.find_pseudo(folder, name).ok_or_else(|| VfsError::NotFound {
            path: ShareAddress::make_path(folder, name),
        })?;
        Ok(entry.open_folder()?)
    }

    /// Starts a directory enumeration and returns its search handle.
    ///
    /// A wildcard pattern enumerates the folder snapshot with pseudo entries
    /// blended ahead of real ones; a pseudo entry shadows a real entry of
    /// the same name. A plain file name yields a single-result cursor,
    /// falling back to a caseless pseudo lookup when the store misses. An
    /// empty pattern enumerates everything.
    pub fn start_search(&self, share: &str, search_path: &str) -> Result<u32> {
        let export = self.export(share)?;
        let (folder, raw_pattern) = split_search_path(search_path);
        let pattern_text = if raw_pattern.is_empty() {
            "*".to_string()
        } else {
            raw_pattern
        };

        let cursor: Box<dyn SearchCursor> = if WildcardPattern::contains_wildcards(&pattern_text) {
            let pattern = WildcardPattern::new(&pattern_text, false);
            let mut entries: Vec<FileInfo> = Vec::new();
            for entry in export.matching_pseudo(&folder, &pattern) {
                entries.push(entry.info().clone());
            }
            for descriptor in export.store.list_folder(&export.name, &folder)? {
                if !pattern.matches(&descriptor.name) {
                    continue;
                }
                if export.find_pseudo(&folder, &descriptor.name).is_some() {
                    continue;
                }
                let path = ShareAddress::make_path(&folder, &descriptor.name);
                entries.push(FileInfo::from_descriptor(&descriptor, path_file_id(&path)));
            }
            Box::new(MultiResultSearch::new(entries))
        } else {
            let target = ShareAddress::make_path(&folder, &pattern_text);
            match export.store.find_node(&export.name, &target) {
                Ok(descriptor) => Box::new(SingleResultSearch::new(FileInfo::from_descriptor(
                    &descriptor,
                    path_file_id(&target),
                ))),
                Err(VfsError::NotFound { .. }) => {
                    match export.find_pseudo(&folder, &pattern_text) {
                        Some(entry) => {
                            Box::new(SingleResultSearch::new(entry.info().clone()))
                        }
                        None => {
                            return Err(VfsError::NotFound { path: target }.into());
                        }
                    }
                }
                Err(err) => return Err(err.into()),
            }
        };

        let handle = self.next_search_id.fetch_add(1, Ordering::Relaxed);
        self.searches.insert(handle, cursor);
        debug!(share = %export.name, path = search_path, handle, "search started");
        Ok(handle)
    }

    /// Returns the next entry from a live search, or `None` when exhausted.
    pub fn search_next(&self, handle: u32) -> Result<Option<FileInfo>> {
        let mut cursor = self
            .searches
            .get_mut(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        Ok(cursor.next())
    }

    /// Whether a live search has entries left to return.
    pub fn search_has_more(&self, handle: u32) -> Result<bool> {
        let cursor = self
            .searches
            .get(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        Ok(cursor.has_more())
    }

    /// Resume id of the next entry a live search will return.
    pub fn search_resume_id(&self, handle: u32) -> Result<u32> {
        let cursor = self
            .searches
            .get(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        Ok(cursor.resume_id())
    }

    /// Total entry count of a live search, when the cursor knows it.
    pub fn search_count(&self, handle: u32) -> Result<Option<u64>> {
        let cursor = self
            .searches
            .get(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        Ok(cursor.count_if_known())
    }

    /// Rewinds a live search to a previously reported resume id.
    ///
    /// A resume id the cursor cannot return to invalidates the request, not
    /// the search: the handle stays live and the error maps to the
    /// invalid-handle status the protocol layer reports.
    pub fn search_restart_at(&self, handle: u32, resume_id: u32) -> Result<()> {
        let mut cursor = self
            .searches
            .get_mut(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        if cursor.restart_at(resume_id) {
            Ok(())
        } else {
            Err(GatewayError::InvalidSearchHandle { handle })
        }
    }

    /// Rewinds a live search to a previously returned entry by name.
    pub fn search_restart_at_entry(&self, handle: u32, name: &str) -> Result<()> {
        let mut cursor = self
            .searches
            .get_mut(&handle)
            .ok_or(GatewayError::InvalidSearchHandle { handle })?;
        if cursor.restart_at_entry(name) {
            Ok(())
        } else {
            Err(GatewayError::InvalidSearchHandle { handle })
        }
    }

    /// Closes a search and releases its handle.
    pub fn close_search(&self, handle: u32) -> Result<()> {
        match self.searches.remove(&handle) {
            Some(_) => {
                debug!(handle, "search closed");
                Ok(())
            }
            None => Err(GatewayError::InvalidSearchHandle { handle }),
        }
    }

    /// Authenticates one protocol-layer logon.
    ///
    /// Guest logons are refused outright when anonymous access is disabled;
    /// everything else is delegated to the logon bridge. The outcome is a
    /// plain accept or reject.
    pub fn logon(&self, identity: &mut ClientIdentity) -> bool {
        if identity.is_guest() && !self.allow_anonymous {
            warn!(user = %identity.user(), "guest logon refused: anonymous access disabled");
            return false;
        }
        match &self.bridge {
            Some(bridge) => bridge.authenticate(identity),
            None => {
                warn!(user = %identity.user(), "logon refused: no bridge configured");
                false
            }
        }
    }

    /// Verifies the identity's credentials against the passthru server pool.
    pub async fn authenticate_passthru(&self, identity: &ClientIdentity) -> Result<()> {
        let pool = self.pool.as_ref().ok_or_else(|| GatewayError::Config {
            reason: "passthru pool not configured".to_string(),
        })?;
        pool.authenticate(identity, &identity.credentials()).await?;
        Ok(())
    }

    /// Releases every live search and stops the passthru pool.
    pub fn shutdown(&self) {
        let open = self.searches.len();
        self.searches.clear();
        if let Some(pool) = &self.pool {
            pool.shutdown();
        }
        info!(searches = open, "gateway shut down");
    }

    fn export(&self, share: &str) -> Result<&Arc<Export>> {
        self.exports
            .get(&share.to_lowercase())
            .ok_or_else(|| GatewayError::UnknownShare {
                share: share.to_string(),
            })
    }
}

impl Default for StoreGateway {
    fn default() -> Self {
        Self::new()
    }
}

/// Splits a share-relative search path into its folder and final segment.
fn split_search_path(search_path: &str) -> (String, String) {
    let normalized = search_path.replace('/', "\\");
    match normalized.rfind('\\') {
        Some(idx) => {
            let folder = if idx == 0 {
                "\\".to_string()
            } else {
                normalized[..idx].to_string()
            };
            (folder, normalized[idx + 1..].to_string())
        }
        None => ("\\".to_string(), normalized),
    }
}

/// Canonical registry key for a folder path: separator-prefixed, lowercased,
/// no trailing separator.
fn folder_key(folder: &str) -> String {
    let mut key = folder.replace('/', "\\").to_lowercase();
    if !key.starts_with('\\') {
        key.insert(0, '\\');
    }
    while key.len() > 1 && key.ends_with('\\') {
        key.pop();
    }
    key
}
