//! Synthetic directory entries for objects with no physical backing.
//!
//! Store roots and wrapper folders are presented to protocol clients as
//! pseudo files: immutable entries synthesized once and shared read-only
//! across sessions. Content I/O is never supported on them.

use std::fmt;
use std::sync::{Arc, OnceLock};

use tracing::debug;

use storegate_share::address::ShareAddress;

use crate::attr::FileAttributes;
use crate::error::{Result, VfsError};
use crate::info::{
    is_hidden_name, now_millis, path_file_id, round_allocation, FileInfo, NodeDescriptor, NodeKind,
};
use crate::wildcard::WildcardPattern;

/// An immutable synthetic directory entry.
///
/// The canonical display path is composed lazily on first use; concurrent
/// first access is safe and idempotent.
#[derive(Debug, Clone)]
pub struct PseudoFileEntry {
    name: String,
    folder_path: String,
    info: FileInfo,
    display_path: OnceLock<String>,
}

impl PseudoFileEntry {
    /// Synthesizes an entry named `name` inside the share-relative
    /// `folder_path`.
    ///
    /// When a source descriptor is supplied its size and timestamps carry
    /// over; otherwise the entry is stamped with the synthesis time and has
    /// zero size. Purely virtual entries and entries backed by read-only or
    /// frozen-version sources are marked read-only. The file id is a hash of
    /// the entry's share-relative path and is not collision-free.
    pub fn synthesize(
        name: &str,
        folder_path: &str,
        kind: NodeKind,
        source: Option<&NodeDescriptor>,
    ) -> PseudoFileEntry {
        let file_id = path_file_id(&ShareAddress::make_path(folder_path, name));

        let (size, created_ms, modified_ms, accessed_ms) = match source {
            Some(desc) => {
                let size = if kind == NodeKind::Directory { 0 } else { desc.size };
                let accessed = if desc.accessed_ms != 0 {
                    desc.accessed_ms
                } else {
                    desc.modified_ms
                };
                (size, desc.created_ms, desc.modified_ms, accessed)
            }
            None => {
                let now = now_millis();
                (0, now, now, now)
            }
        };

        let mut attrs = FileAttributes::empty();
        if kind == NodeKind::Directory {
            attrs.insert(FileAttributes::DIRECTORY);
        }
        if is_hidden_name(name) {
            attrs.insert(FileAttributes::HIDDEN);
        }
        let immutable = match source {
            None => true,
            Some(desc) => desc.read_only || desc.version.is_some(),
        };
        if immutable {
            attrs.insert(FileAttributes::READ_ONLY);
        }

        debug!(name, folder = folder_path, file_id, "synthesized pseudo entry");

        PseudoFileEntry {
            name: name.to_string(),
            folder_path: folder_path.to_string(),
            info: FileInfo {
                name: name.to_string(),
                size,
                allocation_size: round_allocation(size),
                attributes: attrs.normalized(),
                created_ms,
                modified_ms,
                accessed_ms,
                file_id,
            },
            display_path: OnceLock::new(),
        }
    }

    /// Leaf name of the entry.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share-relative path of the containing folder.
    pub fn folder_path(&self) -> &str {
        &self.folder_path
    }

    /// Immutable wire-entry snapshot.
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Attribute bitmask of the entry.
    pub fn attributes(&self) -> FileAttributes {
        self.info.attributes
    }

    /// Synthetic file id.
    pub fn file_id(&self) -> u64 {
        self.info.file_id
    }

    /// Whether the entry is a folder.
    pub fn is_directory(&self) -> bool {
        self.info.is_directory()
    }

    /// Share-relative display path, composed and cached on first use.
    pub fn path(&self) -> &str {
        self.display_path
            .get_or_init(|| ShareAddress::make_path(&self.folder_path, &self.name))
    }

    /// Opens a handle for directory-level protocol operations.
    ///
    /// Fails for non-folder entries; pseudo files never support content I/O.
    pub fn open_folder(&self) -> Result<PseudoFolderHandle> {
        if !self.is_directory() {
            return Err(VfsError::NotADirectory {
                path: self.path().to_string(),
            });
        }
        Ok(PseudoFolderHandle {
            name: self.name.clone(),
            path: self.path().to_string(),
            info: self.info.clone(),
        })
    }
}

impl fmt::Display for PseudoFileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// An open handle onto a pseudo folder.
///
/// Valid only for directory-level operations; every content operation fails
/// with [`VfsError::UnsupportedOperation`].
#[derive(Debug, Clone)]
pub struct PseudoFolderHandle {
    name: String,
    path: String,
    info: FileInfo,
}

impl PseudoFolderHandle {
    /// Folder name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Share-relative folder path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Wire-entry snapshot for stat responses.
    pub fn info(&self) -> &FileInfo {
        &self.info
    }

    /// Always true; only folders get handles.
    pub fn is_directory(&self) -> bool {
        true
    }

    /// Content reads are not supported on pseudo folders.
    pub fn read(&mut self, _buf: &mut [u8], _offset: u64) -> Result<usize> {
        Err(VfsError::UnsupportedOperation {
            operation: "read".to_string(),
        })
    }

    /// Content writes are not supported on pseudo folders.
    pub fn write(&mut self, _data: &[u8], _offset: u64) -> Result<usize> {
        Err(VfsError::UnsupportedOperation {
            operation: "write".to_string(),
        })
    }

    /// Truncation is not supported on pseudo folders.
    pub fn truncate(&mut self, _size: u64) -> Result<()> {
        Err(VfsError::UnsupportedOperation {
            operation: "truncate".to_string(),
        })
    }

    /// Releases the handle. Pseudo folders hold no resources.
    pub fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

/// An ordered collection of pseudo entries for one folder.
///
/// Entries are reference-counted so a list snapshot can be shared across
/// sessions without copying.
#[derive(Debug, Clone, Default)]
pub struct PseudoFileList {
    entries: Vec<Arc<PseudoFileEntry>>,
}

impl PseudoFileList {
    /// Creates an empty list.
    pub fn new() -> Self {
        PseudoFileList::default()
    }

    /// Appends an entry.
    pub fn add(&mut self, entry: PseudoFileEntry) {
        self.entries.push(Arc::new(entry));
    }

    /// Appends an already-shared entry.
    pub fn add_shared(&mut self, entry: Arc<PseudoFileEntry>) {
        self.entries.push(entry);
    }

    /// Finds an entry by name, optionally ignoring case.
    pub fn find(&self, name: &str, caseless: bool) -> Option<Arc<PseudoFileEntry>> {
        self.entries
            .iter()
            .find(|entry| name_matches(entry.name(), name, caseless))
            .cloned()
    }

    /// Removes and returns the first entry with the given name.
    pub fn remove(&mut self, name: &str, caseless: bool) -> Option<Arc<PseudoFileEntry>> {
        let pos = self
            .entries
            .iter()
            .position(|entry| name_matches(entry.name(), name, caseless))?;
        Some(self.entries.remove(pos))
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<PseudoFileEntry>> {
        self.entries.iter()
    }

    /// Subset of entries whose names match the wildcard pattern.
    pub fn matching(&self, pattern: &WildcardPattern) -> PseudoFileList {
        if pattern.is_match_all() {
            return self.clone();
        }
        PseudoFileList {
            entries: self
                .entries
                .iter()
                .filter(|entry| pattern.matches(entry.name()))
                .cloned()
                .collect(),
        }
    }
}

fn name_matches(have: &str, want: &str, caseless: bool) -> bool {
    if caseless {
        have.eq_ignore_ascii_case(want)
    } else {
        have == want
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_source(name: &str, size: u64) -> NodeDescriptor {
        NodeDescriptor {
            name: name.to_string(),
            kind: NodeKind::File,
            size,
            created_ms: 1_000,
            modified_ms: 2_000,
            accessed_ms: 3_000,
            version: None,
            read_only: false,
        }
    }

    #[test]
    fn test_synthesize_virtual_folder() {
        let entry = PseudoFileEntry::synthesize("wrapper", "\\", NodeKind::Directory, None);
        assert!(entry.is_directory());
        assert!(entry.attributes().is_read_only());
        assert_eq!(entry.info().size, 0);
        assert_eq!(entry.info().allocation_size, 0);
        assert!(entry.info().created_ms > 0);
        assert_eq!(entry.file_id(), path_file_id("\\wrapper"));
    }

    #[test]
    fn test_synthesize_from_descriptor() {
        let source = make_source("report.txt", 513);
        let entry =
            PseudoFileEntry::synthesize("report.txt", "\\docs", NodeKind::File, Some(&source));
        assert_eq!(entry.info().size, 513);
        assert_eq!(entry.info().allocation_size, 1024);
        assert_eq!(entry.info().created_ms, 1_000);
        assert_eq!(entry.info().modified_ms, 2_000);
        assert_eq!(entry.info().accessed_ms, 3_000);
        assert!(!entry.attributes().is_read_only());
        assert_eq!(entry.attributes().bits(), FileAttributes::NORMAL);
    }

    #[test]
    fn test_synthesize_version_source_is_read_only() {
        let mut source = make_source("old.txt", 10);
        source.version = Some("1.0".to_string());
        let entry = PseudoFileEntry::synthesize("old.txt", "\\", NodeKind::File, Some(&source));
        assert!(entry.attributes().is_read_only());
    }

    #[test]
    fn test_synthesize_hidden_name() {
        let entry = PseudoFileEntry::synthesize(".marker", "\\", NodeKind::File, None);
        assert!(entry.attributes().is_hidden());
        assert!(entry.attributes().is_read_only());
    }

    #[test]
    fn test_file_id_depends_on_folder() {
        let a = PseudoFileEntry::synthesize("x", "\\a", NodeKind::File, None);
        let b = PseudoFileEntry::synthesize("x", "\\b", NodeKind::File, None);
        assert_eq!(a.file_id(), path_file_id("\\a\\x"));
        assert_eq!(b.file_id(), path_file_id("\\b\\x"));
        assert_ne!(a.file_id(), b.file_id());
    }

    #[test]
    fn test_display_path_lazy_and_stable() {
        let entry = PseudoFileEntry::synthesize("sub", "\\docs", NodeKind::Directory, None);
        assert_eq!(entry.path(), "\\docs\\sub");
        assert_eq!(entry.path(), "\\docs\\sub");
        assert_eq!(entry.to_string(), "\\docs\\sub");
    }

    #[test]
    fn test_display_path_concurrent_first_access() {
        let entry = Arc::new(PseudoFileEntry::synthesize(
            "sub",
            "\\docs",
            NodeKind::Directory,
            None,
        ));
        std::thread::scope(|scope| {
            for _ in 0..4 {
                let entry = Arc::clone(&entry);
                scope.spawn(move || {
                    assert_eq!(entry.path(), "\\docs\\sub");
                });
            }
        });
    }

    #[test]
    fn test_open_folder_on_file_fails() {
        let entry = PseudoFileEntry::synthesize("f.txt", "\\", NodeKind::File, None);
        let err = entry.open_folder().unwrap_err();
        assert_eq!(
            err,
            VfsError::NotADirectory {
                path: "\\f.txt".to_string()
            }
        );
    }

    #[test]
    fn test_folder_handle_rejects_content_io() {
        let entry = PseudoFileEntry::synthesize("docs", "\\", NodeKind::Directory, None);
        let mut handle = entry.open_folder().unwrap();
        assert!(handle.is_directory());
        assert_eq!(handle.path(), "\\docs");

        let mut buf = [0u8; 8];
        assert!(matches!(
            handle.read(&mut buf, 0),
            Err(VfsError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            handle.write(b"data", 0),
            Err(VfsError::UnsupportedOperation { .. })
        ));
        assert!(matches!(
            handle.truncate(0),
            Err(VfsError::UnsupportedOperation { .. })
        ));
        assert!(handle.close().is_ok());
    }

    #[test]
    fn test_folder_handle_stat() {
        let entry = PseudoFileEntry::synthesize("docs", "\\", NodeKind::Directory, None);
        let handle = entry.open_folder().unwrap();
        assert_eq!(handle.name(), "docs");
        assert!(handle.info().is_directory());
        assert_eq!(handle.info().file_id, entry.file_id());
    }

    #[test]
    fn test_list_find_case_sensitivity() {
        let mut list = PseudoFileList::new();
        list.add(PseudoFileEntry::synthesize(
            "ReadMe.txt",
            "\\",
            NodeKind::File,
            None,
        ));

        assert!(list.find("readme.txt", false).is_none());
        assert!(list.find("readme.txt", true).is_some());
        assert!(list.find("ReadMe.txt", false).is_some());
    }

    #[test]
    fn test_list_remove() {
        let mut list = PseudoFileList::new();
        list.add(PseudoFileEntry::synthesize("a", "\\", NodeKind::File, None));
        list.add(PseudoFileEntry::synthesize("b", "\\", NodeKind::File, None));

        let removed = list.remove("A", true).unwrap();
        assert_eq!(removed.name(), "a");
        assert_eq!(list.len(), 1);
        assert!(list.remove("A", true).is_none());
    }

    #[test]
    fn test_list_matching_subset() {
        let mut list = PseudoFileList::new();
        list.add(PseudoFileEntry::synthesize(
            "setup.exe",
            "\\",
            NodeKind::File,
            None,
        ));
        list.add(PseudoFileEntry::synthesize(
            "readme.txt",
            "\\",
            NodeKind::File,
            None,
        ));

        let pattern = WildcardPattern::new("*.exe", false);
        let subset = list.matching(&pattern);
        assert_eq!(subset.len(), 1);
        assert_eq!(subset.iter().next().map(|e| e.name()), Some("setup.exe"));
    }

    #[test]
    fn test_list_matching_all_shares_entries() {
        let mut list = PseudoFileList::new();
        list.add(PseudoFileEntry::synthesize("a", "\\", NodeKind::File, None));
        let all = list.matching(&WildcardPattern::new("*.*", false));
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn test_empty_list() {
        let list = PseudoFileList::new();
        assert!(list.is_empty());
        assert_eq!(list.len(), 0);
        assert!(list.find("x", true).is_none());
    }
}
