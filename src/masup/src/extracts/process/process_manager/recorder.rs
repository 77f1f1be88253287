use crate::extracts::process::process_manager::state::RunningToolInfo;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolEvent {
    Open,
    Close,
}

impl fmt::Display for ToolEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolEvent::Open => f.write_str("Open tool"),
            ToolEvent::Close => f.write_str("Close tool"),
        }
    }
}

/// One tool open/close event. Entries are never modified once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub timestamp: DateTime<Utc>,
    pub tool_id: String,
    pub event: ToolEvent,
    pub executable_path: String,
    pub arguments: String,
}

impl ActivityLogEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        tool_id: impl Into<String>,
        event: ToolEvent,
        info: RunningToolInfo,
    ) -> Self {
        Self {
            timestamp,
            tool_id: tool_id.into(),
            event,
            executable_path: info.executable_path,
            arguments: info.arguments,
        }
    }
}

/// Shared append-only activity log.
///
/// Clones are handles on the same log. Each `append` takes the write lock once, so
/// readers see a tick's batch entirely or not at all.
#[derive(Debug, Clone, Default)]
pub struct ActivityLog {
    entries: Arc<RwLock<Vec<ActivityLogEntry>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<ActivityLogEntry>) -> Self {
        Self {
            entries: Arc::new(RwLock::new(entries)),
        }
    }

    // the log is only ever extended, so a panicking writer cannot leave it half-modified
    fn read(&self) -> RwLockReadGuard<'_, Vec<ActivityLogEntry>> {
        self.entries.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<ActivityLogEntry>> {
        self.entries.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a batch, preserving its order after everything already logged.
    pub fn append(&self, batch: Vec<ActivityLogEntry>) {
        if batch.is_empty() {
            return;
        }
        self.write().extend(batch);
    }

    /// Independent copy of the whole log.
    pub fn entries(&self) -> Vec<ActivityLogEntry> {
        self.read().clone()
    }

    /// Copy of the entries at `offset` and after.
    pub fn entries_since(&self, offset: usize) -> Vec<ActivityLogEntry> {
        self.read().get(offset..).map(<[_]>::to_vec).unwrap_or_default()
    }

    pub fn get(&self, index: usize) -> Option<ActivityLogEntry> {
        self.read().get(index).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    pub fn cursor(&self, offset: usize) -> LogCursor {
        LogCursor {
            log: self.clone(),
            offset,
        }
    }
}

/// Reads the log incrementally from an offset.
///
/// As an `Iterator` it copies one entry per step and returns `None` once it has caught
/// up; it yields again after later appends, so it is not fused.
#[derive(Debug, Clone)]
pub struct LogCursor {
    log: ActivityLog,
    offset: usize,
}

impl LogCursor {
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Everything appended since the last read, in one copy.
    pub fn next_batch(&mut self) -> Vec<ActivityLogEntry> {
        let batch = self.log.entries_since(self.offset);
        self.offset += batch.len();
        batch
    }
}

impl Iterator for LogCursor {
    type Item = ActivityLogEntry;

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.log.get(self.offset)?;
        self.offset += 1;
        Some(entry)
    }
}
