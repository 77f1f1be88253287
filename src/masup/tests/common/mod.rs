use chrono::{DateTime, TimeZone, Utc};
use masup::extracts::process::extract_process_data::ProcessObservation;
use masup::extracts::process::process_manager::system_refresher::ProcessSnapshotProvider;
use masup::MasupError;
use std::collections::VecDeque;

/// Replays a fixed list of process tables, then reports an empty table forever.
pub struct ScriptedProvider {
    snapshots: VecDeque<Vec<ProcessObservation>>,
}

impl ScriptedProvider {
    pub fn new(snapshots: Vec<Vec<ProcessObservation>>) -> Self {
        Self {
            snapshots: snapshots.into(),
        }
    }
}

impl ProcessSnapshotProvider for ScriptedProvider {
    fn snapshot(&mut self) -> Result<Vec<ProcessObservation>, MasupError> {
        Ok(self.snapshots.pop_front().unwrap_or_default())
    }
}

pub fn process(pid: u32, name: &str, exe: &str) -> ProcessObservation {
    let observation = ProcessObservation::new(pid, name);
    if exe.is_empty() {
        observation
    } else {
        observation.with_executable(exe)
    }
}

pub fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}
