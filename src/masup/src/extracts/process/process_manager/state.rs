use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Provenance of a tool's current open interval. Empty strings mean "not observed yet".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningToolInfo {
    pub executable_path: String,
    pub arguments: String,
}

impl RunningToolInfo {
    pub fn new(executable_path: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            executable_path: executable_path.into(),
            arguments: arguments.into(),
        }
    }

    /// Fills the fields that are still empty; fields already set are never overwritten.
    pub fn fill_from(&mut self, other: &RunningToolInfo) {
        if self.executable_path.is_empty() && !other.executable_path.is_empty() {
            self.executable_path = other.executable_path.clone();
        }
        if self.arguments.is_empty() && !other.arguments.is_empty() {
            self.arguments = other.arguments.clone();
        }
    }
}

/// Tool state owned by the tick sequence: which tools were active at the last tick and
/// the provenance of each of their open intervals.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolState {
    active_tools: BTreeSet<String>,
    running: BTreeMap<String, RunningToolInfo>,
}

impl ToolState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_parts(
        active_tools: BTreeSet<String>,
        running: BTreeMap<String, RunningToolInfo>,
    ) -> Self {
        Self {
            active_tools,
            running,
        }
    }

    pub fn active_tools(&self) -> &BTreeSet<String> {
        &self.active_tools
    }

    pub fn running(&self) -> &BTreeMap<String, RunningToolInfo> {
        &self.running
    }

    /// Replaces the active set wholesale with this tick's result.
    pub fn replace_active_tools(&mut self, active_tools: BTreeSet<String>) {
        self.active_tools = active_tools;
    }

    pub(crate) fn open(&mut self, tool_id: String, info: RunningToolInfo) {
        self.running.insert(tool_id, info);
    }

    pub(crate) fn close(&mut self, tool_id: &str) -> Option<RunningToolInfo> {
        self.running.remove(tool_id)
    }

    pub(crate) fn backfill(&mut self, tool_id: &str, observed: &RunningToolInfo) {
        if let Some(info) = self.running.get_mut(tool_id) {
            info.fill_from(observed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_from_only_fills_empty_fields() {
        let mut info = RunningToolInfo::new("", "--first");
        info.fill_from(&RunningToolInfo::new("/opt/ida/ida64", "--second"));
        assert_eq!(info, RunningToolInfo::new("/opt/ida/ida64", "--first"));

        info.fill_from(&RunningToolInfo::new("/other/ida64", ""));
        assert_eq!(info.executable_path, "/opt/ida/ida64");
    }

    #[test]
    fn test_open_close_backfill() {
        let mut state = ToolState::new();
        state.open("ida".to_string(), RunningToolInfo::default());
        state.backfill("ida", &RunningToolInfo::new("/opt/ida/ida64", ""));
        state.backfill("ghidra", &RunningToolInfo::new("/opt/ghidra", ""));
        assert_eq!(state.running().len(), 1);
        assert_eq!(
            state.close("ida"),
            Some(RunningToolInfo::new("/opt/ida/ida64", ""))
        );
        assert_eq!(state.close("ida"), None);
    }
}
