//! Filesystem-backed content store
//!
//! [`LocalStore`] serves one share from a local directory, translating
//! share-relative separator-prefixed paths into paths under the share root.
//! Listings are sorted by name so enumeration positions stay stable across
//! cursor restarts.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use storegate_vfs::error::{Result, VfsError};
use storegate_vfs::info::{ContentStore, NodeDescriptor, NodeKind};

/// Content store over a local directory tree.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Creates a store rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory this store serves.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Maps a share-relative path onto the local filesystem.
    ///
    /// Parent-directory components are rejected so a client path can never
    /// escape the share root.
    fn to_local(&self, path: &str) -> Result<PathBuf> {
        let mut local = self.root.clone();
        for part in path
            .split(|c| c == '\\' || c == '/')
            .filter(|part| !part.is_empty() && *part != ".")
        {
            if part == ".." {
                return Err(VfsError::NotFound {
                    path: path.to_string(),
                });
            }
            local.push(part);
        }
        Ok(local)
    }
}

impl ContentStore for LocalStore {
    fn find_node(&self, _share: &str, path: &str) -> Result<NodeDescriptor> {
        let local = self.to_local(path)?;
        let metadata = fs::metadata(&local).map_err(|err| map_io(path, err))?;
        let name = local
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(descriptor_from(name, &metadata))
    }

    fn list_folder(&self, _share: &str, path: &str) -> Result<Vec<NodeDescriptor>> {
        let local = self.to_local(path)?;
        let metadata = fs::metadata(&local).map_err(|err| map_io(path, err))?;
        if !metadata.is_dir() {
            return Err(VfsError::NotADirectory {
                path: path.to_string(),
            });
        }

        let mut entries = Vec::new();
        let reader = fs::read_dir(&local).map_err(|err| map_io(path, err))?;
        for entry in reader {
            let entry = entry.map_err(|err| map_io(path, err))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            match entry.metadata() {
                Ok(metadata) => entries.push(descriptor_from(name, &metadata)),
                Err(err) => {
                    debug!(name, error = %err, "skipping unreadable directory entry");
                }
            }
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }
}

fn descriptor_from(name: String, metadata: &fs::Metadata) -> NodeDescriptor {
    let kind = if metadata.is_dir() {
        NodeKind::Directory
    } else {
        NodeKind::File
    };
    NodeDescriptor {
        name,
        kind,
        size: if metadata.is_dir() { 0 } else { metadata.len() },
        created_ms: system_time_ms(metadata.created()),
        modified_ms: system_time_ms(metadata.modified()),
        accessed_ms: system_time_ms(metadata.accessed()),
        version: None,
        read_only: metadata.permissions().readonly(),
    }
}

fn system_time_ms(time: std::io::Result<SystemTime>) -> u64 {
    time.ok()
        .and_then(|time| time.duration_since(UNIX_EPOCH).ok())
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

fn map_io(path: &str, err: std::io::Error) -> VfsError {
    match err.kind() {
        std::io::ErrorKind::NotFound => VfsError::NotFound {
            path: path.to_string(),
        },
        _ => VfsError::Store {
            reason: err.to_string(),
        },
    }
}
