use crate::constants::SNAPSHOT_VERSION;
use crate::error::{MasupError, Result};
use crate::extracts::process::process_manager::executables::Executables;
use crate::extracts::process::process_manager::recorder::ActivityLogEntry;
use crate::extracts::process::process_manager::state::RunningToolInfo;
use crate::process_identification::target_pipeline::NodeActivity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;
use tracing::info;

/// Whole-state export of an analysis.
///
/// Carries every piece of tracking state, so an engine restored from it continues
/// exactly where the exporting one stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSnapshot {
    pub version: u32,
    pub exported_at: DateTime<Utc>,
    pub malware_sample: Option<String>,
    pub active_tools: BTreeSet<String>,
    pub running_tools: BTreeMap<String, RunningToolInfo>,
    pub activity_log: Vec<ActivityLogEntry>,
    pub executables: Executables,
    pub activities: BTreeMap<String, NodeActivity>,
}

#[derive(Deserialize)]
struct VersionProbe {
    version: u32,
}

impl AnalysisSnapshot {
    pub fn to_vec(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec_pretty(self)?)
    }

    /// The version is checked before the rest of the document is interpreted.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let VersionProbe { version } = serde_json::from_slice(bytes)?;
        if version != SNAPSHOT_VERSION {
            return Err(MasupError::UnsupportedSnapshotVersion {
                found: version,
                expected: SNAPSHOT_VERSION,
            });
        }
        Ok(serde_json::from_slice(bytes)?)
    }

    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let bytes = self.to_vec()?;
        fs::write(path, bytes).map_err(|source| MasupError::Export {
            path: path.to_path_buf(),
            source,
        })?;
        info!(
            "Exported analysis ({} log entries) to {}",
            self.activity_log.len(),
            path.display()
        );
        Ok(())
    }

    pub fn read_from_file(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|source| MasupError::Export {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_slice(&bytes)
    }
}
