//! Directory-entry records and attribute derivation from store descriptors.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::attr::FileAttributes;
use crate::error::Result;

/// Well-known OS marker file names treated as hidden in listings.
const HIDDEN_MARKER_NAMES: [&str; 2] = ["thumbs.db", "desktop.ini"];

/// Kind of repository object a descriptor refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// Regular file content.
    File,
    /// Folder containing other nodes.
    Directory,
}

/// Read-only view of a repository object supplied by the external store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeDescriptor {
    /// Leaf name of the object.
    pub name: String,
    /// File or directory.
    pub kind: NodeKind,
    /// Content length in bytes, zero for directories.
    pub size: u64,
    /// Creation time, milliseconds since the epoch.
    pub created_ms: u64,
    /// Last modification time, milliseconds since the epoch.
    pub modified_ms: u64,
    /// Last access time, milliseconds since the epoch; zero when untracked.
    pub accessed_ms: u64,
    /// Version identifier when the object is a frozen version snapshot.
    pub version: Option<String>,
    /// Whether the store denies writes to this object.
    pub read_only: bool,
}

impl NodeDescriptor {
    /// Creates a file descriptor stamped with the current time.
    pub fn file(name: &str, size: u64) -> Self {
        let now = now_millis();
        NodeDescriptor {
            name: name.to_string(),
            kind: NodeKind::File,
            size,
            created_ms: now,
            modified_ms: now,
            accessed_ms: now,
            version: None,
            read_only: false,
        }
    }

    /// Creates a directory descriptor stamped with the current time.
    pub fn directory(name: &str) -> Self {
        let now = now_millis();
        NodeDescriptor {
            name: name.to_string(),
            kind: NodeKind::Directory,
            size: 0,
            created_ms: now,
            modified_ms: now,
            accessed_ms: now,
            version: None,
            read_only: false,
        }
    }

    /// Whether this descriptor refers to a directory.
    pub fn is_directory(&self) -> bool {
        self.kind == NodeKind::Directory
    }
}

/// Narrow interface to the external content store.
///
/// Paths are share-relative, separator-prefixed, as produced by the address
/// resolver.
pub trait ContentStore: Send + Sync {
    /// Looks up a single node by share-relative path.
    fn find_node(&self, share: &str, path: &str) -> Result<NodeDescriptor>;

    /// Lists the immediate children of a folder.
    fn list_folder(&self, share: &str, path: &str) -> Result<Vec<NodeDescriptor>>;
}

/// A directory entry as returned to protocol clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileInfo {
    /// Leaf name.
    pub name: String,
    /// Content length in bytes.
    pub size: u64,
    /// Size rounded up to the wire protocol's 512-byte allocation unit.
    pub allocation_size: u64,
    /// Attribute bitmask.
    pub attributes: FileAttributes,
    /// Creation time, milliseconds since the epoch.
    pub created_ms: u64,
    /// Last modification time, milliseconds since the epoch.
    pub modified_ms: u64,
    /// Last access time, milliseconds since the epoch.
    pub accessed_ms: u64,
    /// 64-bit synthetic or real file id.
    pub file_id: u64,
}

impl FileInfo {
    /// Builds a wire entry from a store descriptor.
    ///
    /// Directories get the directory attribute; read-only and frozen-version
    /// objects get the read-only attribute; hidden-convention names get the
    /// hidden attribute. An entry with no attributes is marked normal.
    /// The access time falls back to the modification time when the store
    /// does not track it.
    pub fn from_descriptor(desc: &NodeDescriptor, file_id: u64) -> FileInfo {
        let mut attrs = FileAttributes::empty();
        if desc.is_directory() {
            attrs.insert(FileAttributes::DIRECTORY);
        }
        if desc.read_only || desc.version.is_some() {
            attrs.insert(FileAttributes::READ_ONLY);
        }
        if is_hidden_name(&desc.name) {
            attrs.insert(FileAttributes::HIDDEN);
        }

        let size = if desc.is_directory() { 0 } else { desc.size };
        let accessed_ms = if desc.accessed_ms != 0 {
            desc.accessed_ms
        } else {
            desc.modified_ms
        };

        FileInfo {
            name: desc.name.clone(),
            size,
            allocation_size: round_allocation(size),
            attributes: attrs.normalized(),
            created_ms: desc.created_ms,
            modified_ms: desc.modified_ms,
            accessed_ms,
            file_id,
        }
    }

    /// Whether this entry is a directory.
    pub fn is_directory(&self) -> bool {
        self.attributes.is_directory()
    }
}

/// Rounds a content length up to the next 512-byte allocation unit.
///
/// The rounding carries the wire protocol's 512-byte bias, so a length that
/// is already block-aligned still advances to the next block. Zero stays
/// zero.
pub fn round_allocation(length: u64) -> u64 {
    if length == 0 {
        0
    } else {
        length.saturating_add(512) & !511
    }
}

/// Derives a 64-bit file id from a share-relative path.
///
/// The id is a 31-multiplier polynomial hash of the path's UTF-16 units,
/// zero-extended from 32 bits. Distinct paths can collide; callers must not
/// treat ids as unique.
pub fn path_file_id(path: &str) -> u64 {
    let mut hash: i32 = 0;
    for unit in path.encode_utf16() {
        hash = hash.wrapping_mul(31).wrapping_add(unit as i32);
    }
    hash as u32 as u64
}

/// Whether a leaf name falls under the hidden-name conventions.
pub fn is_hidden_name(name: &str) -> bool {
    if name.starts_with('.') {
        return true;
    }
    HIDDEN_MARKER_NAMES
        .iter()
        .any(|marker| name.eq_ignore_ascii_case(marker))
}

/// Current wall-clock time in milliseconds since the epoch.
pub fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_round_allocation_properties_random(length in 1u64..1 << 40) {
            let alloc = round_allocation(length);
            prop_assert_eq!(alloc % 512, 0);
            prop_assert!(alloc > length);
            prop_assert!(alloc - length <= 512);
        }

        #[test]
        fn test_path_file_id_in_32_bits_random(path in "[ -~]{0,64}") {
            prop_assert!(path_file_id(&path) <= u32::MAX as u64);
        }
    }
}
