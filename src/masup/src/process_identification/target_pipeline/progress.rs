use crate::process_identification::target_pipeline::activity_tracker::NodeActivity;
use crate::process_identification::target_pipeline::pipeline_manager::WorkflowGraph;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Active,
    Ended,
}

impl fmt::Display for StepStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepStatus::Active => f.write_str("active"),
            StepStatus::Ended => f.write_str("ended"),
        }
    }
}

/// A started workflow step, as shown in the progress table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRow {
    pub node_id: String,
    pub name: String,
    pub phase: Option<String>,
    pub status: StepStatus,
    pub started_at: DateTime<Utc>,
}

/// A step that has not started yet but follows one that has.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Suggestion {
    pub node_id: String,
    pub name: String,
    pub phase: Option<String>,
    pub tools: Vec<String>,
}

/// A step whose status differs from an earlier progress view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepChange {
    pub node_id: String,
    pub name: String,
    pub status: StepStatus,
}

/// Started steps in workflow order.
pub fn progress(
    graph: &WorkflowGraph,
    activities: &BTreeMap<String, NodeActivity>,
) -> Vec<ProgressRow> {
    graph
        .nodes()
        .filter_map(|node| {
            let activity = activities.get(&node.id)?;
            Some(ProgressRow {
                node_id: node.id.clone(),
                name: node.display_name().to_string(),
                phase: node.phase.clone(),
                status: if activity.active {
                    StepStatus::Active
                } else {
                    StepStatus::Ended
                },
                started_at: activity.start_time,
            })
        })
        .collect()
}

/// Steps worth starting next: unstarted successors of started steps, or the entry
/// steps (no incoming edge) when nothing has started yet.
pub fn suggestions(
    graph: &WorkflowGraph,
    activities: &BTreeMap<String, NodeActivity>,
) -> Vec<Suggestion> {
    let candidates: HashSet<&str> = if activities.is_empty() {
        let targets: HashSet<&str> = graph.edges().iter().map(|e| e.to.as_str()).collect();
        graph
            .nodes()
            .map(|node| node.id.as_str())
            .filter(|id| !targets.contains(id))
            .collect()
    } else {
        activities
            .keys()
            .flat_map(|id| graph.successors(id))
            .map(|node| node.id.as_str())
            .filter(|id| !activities.contains_key(*id))
            .collect()
    };

    graph
        .nodes()
        .filter(|node| candidates.contains(node.id.as_str()))
        .map(|node| Suggestion {
            node_id: node.id.clone(),
            name: node.display_name().to_string(),
            phase: node.phase.clone(),
            tools: node.tools.clone(),
        })
        .collect()
}

/// Steps that started, ended or resumed between two progress views, in workflow order.
pub fn changes(previous: &[ProgressRow], current: &[ProgressRow]) -> Vec<StepChange> {
    let before: HashMap<&str, StepStatus> = previous
        .iter()
        .map(|row| (row.node_id.as_str(), row.status))
        .collect();
    current
        .iter()
        .filter(|row| before.get(row.node_id.as_str()) != Some(&row.status))
        .map(|row| StepChange {
            node_id: row.node_id.clone(),
            name: row.name.clone(),
            status: row.status,
        })
        .collect()
}
