use crate::extracts::process::process_manager::matcher::ToolMatches;
use crate::extracts::process::process_manager::recorder::{ActivityLogEntry, ToolEvent};
use crate::extracts::process::process_manager::state::{RunningToolInfo, ToolState};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Turns the difference between two consecutive active-tool sets into log entries.
pub struct ToolTransitionHandler;

impl ToolTransitionHandler {
    /// Entry point: computes this tick's events and updates the running-tool provenance.
    ///
    /// The returned batch holds every `Close` (sorted by tool id) followed by every
    /// `Open` (sorted by tool id). Tools active on both ticks produce no event but have
    /// their still-empty provenance fields backfilled. The active set in `state` is left
    /// for the caller to replace.
    pub fn handle_transitions(
        state: &mut ToolState,
        matches: &ToolMatches,
        now: DateTime<Utc>,
    ) -> Vec<ActivityLogEntry> {
        let previous = state.active_tools();
        let closed: Vec<String> = previous.difference(&matches.active).cloned().collect();
        let opened: Vec<String> = matches.active.difference(previous).cloned().collect();
        let unchanged: Vec<String> = matches.active.intersection(previous).cloned().collect();

        debug!(
            "Tool transitions: {} closed, {} opened, {} unchanged",
            closed.len(),
            opened.len(),
            unchanged.len()
        );

        let mut entries = Vec::with_capacity(closed.len() + opened.len());
        entries.extend(Self::close_tools(state, closed, now));
        entries.extend(Self::open_tools(state, matches, opened, now));
        Self::backfill_unchanged(state, matches, &unchanged);
        entries
    }

    /// Step 1: tools that stopped, logged with the provenance they were retained with.
    fn close_tools(
        state: &mut ToolState,
        closed: Vec<String>,
        now: DateTime<Utc>,
    ) -> Vec<ActivityLogEntry> {
        closed
            .into_iter()
            .map(|tool_id| {
                let info = state.close(&tool_id).unwrap_or_else(|| {
                    warn!("No provenance retained for closing tool {}", tool_id);
                    RunningToolInfo::default()
                });
                info!("Tool closed: {}", tool_id);
                ActivityLogEntry::new(now, tool_id, ToolEvent::Close, info)
            })
            .collect()
    }

    /// Step 2: tools that started, with fresh provenance taken from this tick.
    fn open_tools(
        state: &mut ToolState,
        matches: &ToolMatches,
        opened: Vec<String>,
        now: DateTime<Utc>,
    ) -> Vec<ActivityLogEntry> {
        opened
            .into_iter()
            .map(|tool_id| {
                let mut info = RunningToolInfo::default();
                if let Some(observed) = matches.provenance.get(&tool_id) {
                    info.fill_from(observed);
                }
                info!(
                    "Tool opened: {} (executable={:?}, arguments={:?})",
                    tool_id, info.executable_path, info.arguments
                );
                state.open(tool_id.clone(), info.clone());
                ActivityLogEntry::new(now, tool_id, ToolEvent::Open, info)
            })
            .collect()
    }

    /// Step 3: still-running tools get their empty provenance fields filled.
    fn backfill_unchanged(state: &mut ToolState, matches: &ToolMatches, unchanged: &[String]) {
        for tool_id in unchanged {
            if let Some(observed) = matches.provenance.get(tool_id) {
                state.backfill(tool_id, observed);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::{BTreeMap, BTreeSet};

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn matches(tools: &[(&str, &str, &str)]) -> ToolMatches {
        ToolMatches {
            active: tools.iter().map(|(id, _, _)| id.to_string()).collect(),
            provenance: tools
                .iter()
                .map(|(id, exe, args)| (id.to_string(), RunningToolInfo::new(*exe, *args)))
                .collect(),
            executables: BTreeMap::new(),
        }
    }

    /// Runs one tick the way the manager does: handle, then replace the active set.
    fn tick(state: &mut ToolState, matches: &ToolMatches, now: DateTime<Utc>) -> Vec<ActivityLogEntry> {
        let entries = ToolTransitionHandler::handle_transitions(state, matches, now);
        state.replace_active_tools(matches.active.clone());
        entries
    }

    fn events(entries: &[ActivityLogEntry]) -> Vec<(String, ToolEvent)> {
        entries
            .iter()
            .map(|e| (e.tool_id.clone(), e.event))
            .collect()
    }

    #[test]
    fn test_closes_precede_opens() {
        let mut state = ToolState::new();
        tick(&mut state, &matches(&[("b", "", ""), ("d", "", "")]), at(0));

        let entries = tick(&mut state, &matches(&[("a", "", ""), ("c", "", "")]), at(5));
        assert_eq!(
            events(&entries),
            vec![
                ("b".to_string(), ToolEvent::Close),
                ("d".to_string(), ToolEvent::Close),
                ("a".to_string(), ToolEvent::Open),
                ("c".to_string(), ToolEvent::Open),
            ]
        );
        assert!(entries.iter().all(|e| e.timestamp == at(5)));
    }

    #[test]
    fn test_close_carries_retained_provenance() {
        let mut state = ToolState::new();
        let opened = tick(&mut state, &matches(&[("ida", "", "")]), at(0));
        assert_eq!(opened[0].executable_path, "");

        // backfilled while running, without an event
        let none = tick(&mut state, &matches(&[("ida", "/opt/ida64", "db.i64")]), at(1));
        assert!(none.is_empty());
        // later observations do not overwrite
        tick(&mut state, &matches(&[("ida", "/other/ida64", "x")]), at(2));

        let closed = tick(&mut state, &matches(&[]), at(3));
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].event, ToolEvent::Close);
        assert_eq!(closed[0].executable_path, "/opt/ida64");
        assert_eq!(closed[0].arguments, "db.i64");
        assert!(state.running().is_empty());
    }

    #[test]
    fn test_reopened_tool_gets_fresh_provenance() {
        let mut state = ToolState::new();
        tick(&mut state, &matches(&[("gdb", "/usr/bin/gdb", "./a.out")]), at(0));
        tick(&mut state, &matches(&[]), at(1));
        let reopened = tick(&mut state, &matches(&[("gdb", "", "")]), at(2));
        assert_eq!(reopened[0].event, ToolEvent::Open);
        assert_eq!(reopened[0].executable_path, "");
        assert_eq!(state.running()["gdb"], RunningToolInfo::default());
    }

    #[test]
    fn test_unchanged_set_emits_nothing() {
        let mut state = ToolState::new();
        let m = matches(&[("a", "/a", "")]);
        assert_eq!(tick(&mut state, &m, at(0)).len(), 1);
        assert!(tick(&mut state, &m, at(1)).is_empty());
        assert_eq!(state.active_tools(), &BTreeSet::from(["a".to_string()]));
    }
}
