use crate::process_identification::target_pipeline::pipeline_manager::WorkflowGraph;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::time::Duration;
use tracing::info;

/// A finished stretch of time during which a node was satisfied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInterval {
    pub start_time: DateTime<Utc>,
    pub duration: Duration,
}

/// Activity record of one workflow node.
///
/// `start_time`/`active`/`stop_time` describe the latest interval; `stop_time` is the
/// elapsed time between `start_time` and the tick that found the node unsatisfied.
/// Intervals closed before the node was satisfied again are kept, oldest first, in
/// `previous_intervals`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeActivity {
    pub start_time: DateTime<Utc>,
    pub active: bool,
    pub stop_time: Option<Duration>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub previous_intervals: Vec<ActivityInterval>,
}

impl NodeActivity {
    pub fn started(now: DateTime<Utc>) -> Self {
        Self {
            start_time: now,
            active: true,
            stop_time: None,
            previous_intervals: Vec::new(),
        }
    }

    fn deactivate(&mut self, now: DateTime<Utc>) {
        self.active = false;
        self.stop_time = Some(elapsed(self.start_time, now));
    }

    fn restart(&mut self, now: DateTime<Utc>) {
        if let Some(duration) = self.stop_time.take() {
            self.previous_intervals.push(ActivityInterval {
                start_time: self.start_time,
                duration,
            });
        }
        self.start_time = now;
        self.active = true;
    }

    /// Total time spent active, counting the running interval up to `now`.
    pub fn total_active(&self, now: DateTime<Utc>) -> Duration {
        let current = match self.stop_time {
            Some(duration) => duration,
            None => elapsed(self.start_time, now),
        };
        self.previous_intervals
            .iter()
            .map(|interval| interval.duration)
            .sum::<Duration>()
            + current
    }
}

fn elapsed(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    // a clock stepping backwards yields zero rather than an error
    (to - from).to_std().unwrap_or_default()
}

/// Derives node activity from the active tool set, one update per tick.
#[derive(Debug, Clone, Default)]
pub struct WorkflowTracker {
    activities: BTreeMap<String, NodeActivity>,
}

impl WorkflowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_activities(activities: BTreeMap<String, NodeActivity>) -> Self {
        Self { activities }
    }

    pub fn update(
        &mut self,
        graph: &WorkflowGraph,
        active_tools: &BTreeSet<String>,
        now: DateTime<Utc>,
    ) {
        let satisfied: BTreeSet<&str> = active_tools
            .iter()
            .filter_map(|tool_id| graph.nodes_for_tool(tool_id))
            .flatten()
            .map(String::as_str)
            .collect();

        for node_id in &satisfied {
            match self.activities.get_mut(*node_id) {
                None => {
                    info!("Workflow step '{}' started", node_id);
                    self.activities
                        .insert(node_id.to_string(), NodeActivity::started(now));
                }
                Some(activity) if !activity.active => {
                    info!("Workflow step '{}' resumed", node_id);
                    activity.restart(now);
                }
                Some(_) => {}
            }
        }

        for (node_id, activity) in self.activities.iter_mut() {
            if activity.active && !satisfied.contains(node_id.as_str()) {
                activity.deactivate(now);
                info!(
                    "Workflow step '{}' ended after {:?}",
                    node_id,
                    activity.stop_time.unwrap_or_default()
                );
            }
        }
    }

    pub fn get(&self, node_id: &str) -> Option<&NodeActivity> {
        self.activities.get(node_id)
    }

    pub fn activities(&self) -> &BTreeMap<String, NodeActivity> {
        &self.activities
    }
}
