use crate::constants::SNAPSHOT_VERSION;
use crate::error::Result;
use crate::exporters::AnalysisSnapshot;
use crate::extracts::process::process_manager::executables::{Executables, ExecutableRegistry};
use crate::extracts::process::process_manager::handlers::transitions::ToolTransitionHandler;
use crate::extracts::process::process_manager::matcher::ToolMatcher;
use crate::extracts::process::process_manager::recorder::{ActivityLog, ActivityLogEntry};
use crate::extracts::process::process_manager::state::{RunningToolInfo, ToolState};
use crate::extracts::process::process_manager::system_refresher::{
    ProcessSnapshotProvider, SystemRefresher,
};
use crate::process_identification::target_pipeline::progress::{self, ProgressRow, Suggestion};
use crate::process_identification::target_pipeline::{NodeActivity, WorkflowGraph, WorkflowTracker};
use crate::process_identification::target_process::ToolCatalog;
use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::debug;

/// One analysis session: the tracking engine driven by [`Analysis::tick`].
///
/// The activity log and executable registry are shared stores; their handles may be
/// cloned into reader threads. Everything else is owned by the tick sequence.
pub struct Analysis {
    catalog: ToolCatalog,
    workflow: WorkflowGraph,
    provider: Box<dyn ProcessSnapshotProvider>,
    matcher: ToolMatcher,
    state: ToolState,
    activity_log: ActivityLog,
    executables: ExecutableRegistry,
    workflow_tracker: WorkflowTracker,
}

impl Analysis {
    pub fn new(
        catalog: ToolCatalog,
        workflow: WorkflowGraph,
        provider: Box<dyn ProcessSnapshotProvider>,
    ) -> Self {
        Analysis {
            catalog,
            workflow,
            provider,
            matcher: ToolMatcher,
            state: ToolState::new(),
            activity_log: ActivityLog::new(),
            executables: ExecutableRegistry::new(),
            workflow_tracker: WorkflowTracker::new(),
        }
    }

    /// Analysis observing the host's process table.
    pub fn with_system_processes(catalog: ToolCatalog, workflow: WorkflowGraph) -> Self {
        Self::new(catalog, workflow, Box::new(SystemRefresher::new()))
    }

    /// Rebuilds an analysis from an export; the next tick continues from its state.
    pub fn restore(
        catalog: ToolCatalog,
        workflow: WorkflowGraph,
        provider: Box<dyn ProcessSnapshotProvider>,
        snapshot: AnalysisSnapshot,
    ) -> Self {
        Analysis {
            catalog,
            workflow: workflow.with_malware_sample(snapshot.malware_sample),
            provider,
            matcher: ToolMatcher,
            state: ToolState::from_parts(snapshot.active_tools, snapshot.running_tools),
            activity_log: ActivityLog::from_entries(snapshot.activity_log),
            executables: ExecutableRegistry::from_executables(snapshot.executables),
            workflow_tracker: WorkflowTracker::from_activities(snapshot.activities),
        }
    }

    /// Advances the analysis by one observation cycle.
    ///
    /// Fails only when the snapshot itself fails, in which case nothing is changed.
    #[tracing::instrument(skip(self))]
    pub fn tick(&mut self, now: DateTime<Utc>) -> Result<()> {
        let observations = self.provider.snapshot()?;
        let matches = self.matcher.match_processes(&observations, &self.catalog);

        let registered = self.executables.register_all(&matches.executables);
        let entries = ToolTransitionHandler::handle_transitions(&mut self.state, &matches, now);
        debug!(
            "Tick at {}: {} active tools, {} events, {} new executables",
            now,
            matches.active.len(),
            entries.len(),
            registered
        );
        self.activity_log.append(entries);

        self.state.replace_active_tools(matches.active);
        self.workflow_tracker
            .update(&self.workflow, self.state.active_tools(), now);
        Ok(())
    }

    /// Shared handle on the activity log.
    pub fn activity_log(&self) -> ActivityLog {
        self.activity_log.clone()
    }

    pub fn get_activity_log(&self) -> Vec<ActivityLogEntry> {
        self.activity_log.entries()
    }

    /// Shared handle on the executable registry.
    pub fn executables(&self) -> ExecutableRegistry {
        self.executables.clone()
    }

    pub fn get_executables(&self) -> Executables {
        self.executables.executables()
    }

    pub fn get_workflow_activities(&self) -> BTreeMap<String, NodeActivity> {
        self.workflow_tracker.activities().clone()
    }

    pub fn active_tools(&self) -> &BTreeSet<String> {
        self.state.active_tools()
    }

    pub fn running_tools(&self) -> &BTreeMap<String, RunningToolInfo> {
        self.state.running()
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn workflow(&self) -> &WorkflowGraph {
        &self.workflow
    }

    pub fn progress(&self) -> Vec<ProgressRow> {
        progress::progress(&self.workflow, self.workflow_tracker.activities())
    }

    pub fn suggestions(&self) -> Vec<Suggestion> {
        progress::suggestions(&self.workflow, self.workflow_tracker.activities())
    }

    pub fn snapshot(&self, exported_at: DateTime<Utc>) -> AnalysisSnapshot {
        AnalysisSnapshot {
            version: SNAPSHOT_VERSION,
            exported_at,
            malware_sample: self.workflow.malware_sample().map(str::to_string),
            active_tools: self.state.active_tools().clone(),
            running_tools: self.state.running().clone(),
            activity_log: self.activity_log.entries(),
            executables: self.executables.executables(),
            activities: self.workflow_tracker.activities().clone(),
        }
    }

    /// Serialized whole-state export.
    pub fn export_snapshot(&self) -> Result<Vec<u8>> {
        self.snapshot(Utc::now()).to_vec()
    }

    pub fn export_to_file(&self, path: &Path) -> Result<()> {
        self.snapshot(Utc::now()).write_to_file(path)
    }
}
