use crate::constants::ARGUMENTS_SEPARATOR;
use crate::extracts::process::extract_process_data::ProcessObservation;
use crate::extracts::process::process_manager::state::RunningToolInfo;
use crate::process_identification::target_process::ToolCatalog;
use std::collections::{BTreeMap, BTreeSet};
use tracing::trace;

/// Result of matching one snapshot against the catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolMatches {
    pub active: BTreeSet<String>,
    /// First non-empty executable path and first non-empty argument list seen per tool.
    pub provenance: BTreeMap<String, RunningToolInfo>,
    /// Every distinct non-empty executable path seen per tool, first-seen order.
    pub executables: BTreeMap<String, Vec<String>>,
}

/// Matches process observations against the tool catalog
#[derive(Debug, Clone, Copy, Default)]
pub struct ToolMatcher;

impl ToolMatcher {
    /// Observations are visited in snapshot order and tools in catalog order, so for a
    /// tool matched by several processes the earliest non-empty value of each provenance
    /// field wins, independently per field.
    pub fn match_processes(
        &self,
        observations: &[ProcessObservation],
        catalog: &ToolCatalog,
    ) -> ToolMatches {
        let mut matches = ToolMatches::default();

        for observation in observations {
            let arguments = observation.arguments.join(ARGUMENTS_SEPARATOR);
            let observed = RunningToolInfo::new(
                observation.executable_path.clone().unwrap_or_default(),
                arguments,
            );

            for tool_id in catalog.matching(&observation.name) {
                trace!(
                    "Process {} ({}) matched tool {}",
                    observation.pid,
                    observation.name,
                    tool_id
                );
                matches.active.insert(tool_id.to_string());
                matches
                    .provenance
                    .entry(tool_id.to_string())
                    .or_default()
                    .fill_from(&observed);

                if !observed.executable_path.is_empty() {
                    let paths = matches.executables.entry(tool_id.to_string()).or_default();
                    if !paths.contains(&observed.executable_path) {
                        paths.push(observed.executable_path.clone());
                    }
                }
            }
        }

        matches
    }
}
