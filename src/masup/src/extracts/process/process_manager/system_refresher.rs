use crate::error::MasupError;
use crate::extracts::process::extract_process_data::{observe_process, ProcessObservation};
use mockall::automock;
use sysinfo::{ProcessRefreshKind, System, UpdateKind};
use tracing::debug;

/// Source of process snapshots, one call per tick.
///
/// Implementations must not fail because a single process vanished or could not be
/// read; such processes are left out or reported without provenance. An `Err` means
/// the enumeration as a whole failed.
#[automock]
pub trait ProcessSnapshotProvider: Send {
    fn snapshot(&mut self) -> Result<Vec<ProcessObservation>, MasupError>;
}

/// Snapshot provider backed by the host's process table
pub struct SystemRefresher {
    system: System,
}

impl SystemRefresher {
    pub fn new() -> Self {
        Self {
            system: System::new(),
        }
    }

    fn refresh_kind() -> ProcessRefreshKind {
        ProcessRefreshKind::new()
            .with_exe(UpdateKind::OnlyIfNotSet)
            .with_cmd(UpdateKind::OnlyIfNotSet)
    }
}

impl Default for SystemRefresher {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessSnapshotProvider for SystemRefresher {
    #[tracing::instrument(skip(self))]
    fn snapshot(&mut self) -> Result<Vec<ProcessObservation>, MasupError> {
        if !sysinfo::IS_SUPPORTED_SYSTEM {
            return Err(MasupError::Enumeration(format!(
                "process enumeration is not supported on {}",
                std::env::consts::OS
            )));
        }

        // dead processes are dropped from the table by the refresh
        self.system.refresh_processes_specifics(Self::refresh_kind());

        let mut observations: Vec<ProcessObservation> = self
            .system
            .processes()
            .values()
            .map(observe_process)
            .collect();

        // at the very least our own process has to be visible
        if observations.is_empty() {
            return Err(MasupError::Enumeration(
                "process table returned no entries".to_string(),
            ));
        }

        observations.sort_by_key(|observation| observation.pid);
        debug!("Observed {} processes", observations.len());
        Ok(observations)
    }
}
