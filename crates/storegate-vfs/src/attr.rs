//! File attribute bitmask with wire-compatible bit values.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// Directory-entry attribute bitmask.
///
/// Bit values match the wire protocol's attribute encoding and must not be
/// renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileAttributes(u32);

impl FileAttributes {
    /// Read-only
    pub const READ_ONLY: u32 = 0x0001;
    /// Hidden
    pub const HIDDEN: u32 = 0x0002;
    /// System
    pub const SYSTEM: u32 = 0x0004;
    /// Directory
    pub const DIRECTORY: u32 = 0x0010;
    /// Archive
    pub const ARCHIVE: u32 = 0x0020;
    /// Normal, used when no other attribute applies
    pub const NORMAL: u32 = 0x0080;

    /// Creates an empty attribute set.
    pub fn empty() -> Self {
        Self(0)
    }

    /// Creates attributes from a raw bitmask.
    pub fn new(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw bitmask value.
    pub fn bits(&self) -> u32 {
        self.0
    }

    /// Whether every bit in `mask` is set.
    pub fn contains(&self, mask: u32) -> bool {
        self.0 & mask == mask
    }

    /// Sets the bits in `mask`.
    pub fn insert(&mut self, mask: u32) {
        self.0 |= mask;
    }

    /// Clears the bits in `mask`.
    pub fn remove(&mut self, mask: u32) {
        self.0 &= !mask;
    }

    /// Whether the directory bit is set.
    pub fn is_directory(&self) -> bool {
        self.0 & Self::DIRECTORY != 0
    }

    /// Whether the hidden bit is set.
    pub fn is_hidden(&self) -> bool {
        self.0 & Self::HIDDEN != 0
    }

    /// Whether the read-only bit is set.
    pub fn is_read_only(&self) -> bool {
        self.0 & Self::READ_ONLY != 0
    }

    /// Substitutes the normal attribute when no bits are set.
    pub fn normalized(self) -> Self {
        if self.0 == 0 {
            Self(Self::NORMAL)
        } else {
            self
        }
    }
}

impl Default for FileAttributes {
    fn default() -> Self {
        Self(Self::NORMAL)
    }
}

impl BitOr<u32> for FileAttributes {
    type Output = FileAttributes;

    fn bitor(self, rhs: u32) -> FileAttributes {
        FileAttributes(self.0 | rhs)
    }
}

impl BitOrAssign<u32> for FileAttributes {
    fn bitor_assign(&mut self, rhs: u32) {
        self.0 |= rhs;
    }
}

impl fmt::Display for FileAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:04x}", self.0)
    }
}
