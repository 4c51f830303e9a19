//! Resumable directory-enumeration cursors.
//!
//! A cursor is Active while it holds unreturned entries and Exhausted once
//! drained. Resume ids are 1-based: `resume_id()` names the entry the next
//! `next()` call will return, and `restart_at(id)` repositions the cursor so
//! entry `id` is returned again. Invalid ids are reported with `false`,
//! never an error; protocol clients probe stale handles routinely.

use std::fmt;

use tracing::debug;

use crate::info::FileInfo;

/// The fixed resume id of a single-result cursor.
pub const SINGLE_RESULT_RESUME_ID: u32 = 1;

/// Common contract of every enumeration cursor.
pub trait SearchCursor: Send {
    /// Whether unreturned entries remain.
    fn has_more(&self) -> bool;

    /// Returns the next entry, advancing the cursor. An entry is returned
    /// at most once per position.
    fn next(&mut self) -> Option<FileInfo>;

    /// Total number of entries when the backing source knows it.
    fn count_if_known(&self) -> Option<u64>;

    /// 1-based position of the entry the next `next()` call returns.
    fn resume_id(&self) -> u32;

    /// Repositions the cursor so entry `resume_id` is returned next.
    /// Returns false for ids the cursor cannot serve.
    fn restart_at(&mut self, resume_id: u32) -> bool;

    /// Repositions the cursor at the already-returned entry with the given
    /// name (compared case-insensitively). Returns false when no such entry
    /// was seen.
    fn restart_at_entry(&mut self, name: &str) -> bool;
}

/// Cursor over exactly one directory entry.
///
/// The first `next()` returns the entry and exhausts the cursor.
/// `restart_at(1)` re-arms it exactly once; any other id fails.
#[derive(Debug, Clone)]
pub struct SingleResultSearch {
    info: FileInfo,
    consumed: bool,
    rearmed: bool,
}

impl SingleResultSearch {
    /// Creates a cursor holding one entry.
    pub fn new(info: FileInfo) -> Self {
        SingleResultSearch {
            info,
            consumed: false,
            rearmed: false,
        }
    }
}

impl SearchCursor for SingleResultSearch {
    fn has_more(&self) -> bool {
        !self.consumed
    }

    fn next(&mut self) -> Option<FileInfo> {
        if self.consumed {
            return None;
        }
        self.consumed = true;
        Some(self.info.clone())
    }

    fn count_if_known(&self) -> Option<u64> {
        Some(1)
    }

    fn resume_id(&self) -> u32 {
        SINGLE_RESULT_RESUME_ID
    }

    fn restart_at(&mut self, resume_id: u32) -> bool {
        if resume_id != SINGLE_RESULT_RESUME_ID || self.rearmed {
            return false;
        }
        self.rearmed = true;
        self.consumed = false;
        true
    }

    fn restart_at_entry(&mut self, name: &str) -> bool {
        if !self.info.name.eq_ignore_ascii_case(name) {
            return false;
        }
        self.restart_at(SINGLE_RESULT_RESUME_ID)
    }
}

/// Cursor over a snapshot or stream of directory entries.
///
/// Entries already handed out are retained so the cursor can be repositioned
/// to any previously-returned entry. Streaming sources report an unknown
/// total count.
pub struct MultiResultSearch {
    source: Box<dyn Iterator<Item = FileInfo> + Send>,
    seen: Vec<FileInfo>,
    index: usize,
    pending: Option<FileInfo>,
    total: Option<u64>,
}

impl MultiResultSearch {
    /// Creates a cursor over a complete snapshot; the total count is known.
    pub fn new(entries: Vec<FileInfo>) -> Self {
        let total = entries.len() as u64;
        MultiResultSearch {
            source: Box::new(std::iter::empty()),
            seen: entries,
            index: 0,
            pending: None,
            total: Some(total),
        }
    }

    /// Creates a cursor over a streaming source; the total count is unknown.
    pub fn streaming<I>(entries: I) -> Self
    where
        I: Iterator<Item = FileInfo> + Send + 'static,
    {
        let mut source: Box<dyn Iterator<Item = FileInfo> + Send> = Box::new(entries);
        let pending = source.next();
        MultiResultSearch {
            source,
            seen: Vec::new(),
            index: 0,
            pending,
            total: None,
        }
    }
}

impl SearchCursor for MultiResultSearch {
    fn has_more(&self) -> bool {
        self.index < self.seen.len() || self.pending.is_some()
    }

    fn next(&mut self) -> Option<FileInfo> {
        if self.index < self.seen.len() {
            let info = self.seen[self.index].clone();
            self.index += 1;
            return Some(info);
        }
        let info = self.pending.take()?;
        self.pending = self.source.next();
        self.seen.push(info.clone());
        self.index = self.seen.len();
        Some(info)
    }

    fn count_if_known(&self) -> Option<u64> {
        self.total
    }

    fn resume_id(&self) -> u32 {
        (self.index + 1) as u32
    }

    fn restart_at(&mut self, resume_id: u32) -> bool {
        if resume_id == 0 {
            return false;
        }
        let offset = resume_id as usize - 1;
        let valid =
            offset < self.seen.len() || (offset == self.seen.len() && self.pending.is_some());
        if !valid {
            return false;
        }
        debug!(resume_id, "cursor restarted");
        self.index = offset;
        true
    }

    fn restart_at_entry(&mut self, name: &str) -> bool {
        match self
            .seen
            .iter()
            .position(|info| info.name.eq_ignore_ascii_case(name))
        {
            Some(offset) => {
                self.index = offset;
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for MultiResultSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiResultSearch")
            .field("seen", &self.seen.len())
            .field("index", &self.index)
            .field("pending", &self.pending.is_some())
            .field("total", &self.total)
            .finish()
    }
}
