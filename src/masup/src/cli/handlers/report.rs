use super::load_definitions;
use crate::config::Config;
use crate::exporters::AnalysisSnapshot;
use crate::extracts::process::process_manager::recorder::ToolEvent;
use crate::process_identification::target_pipeline::progress;
use crate::{activity_message, info_message};
use anyhow::{Context, Result};
use colored::Colorize;
use itertools::Itertools;
use std::path::Path;

pub fn report(config: &Config, file: &Path) -> Result<()> {
    let snapshot = AnalysisSnapshot::read_from_file(file)
        .with_context(|| format!("Failed to read analysis {}", file.display()))?;
    let (_, graph) = load_definitions(config)?;

    info_message!(
        "Analysis of {} exported at {}",
        snapshot.malware_sample.as_deref().unwrap_or("unnamed sample"),
        snapshot.exported_at
    );

    println!("\n{}", "Activity log".bold());
    for entry in &snapshot.activity_log {
        activity_message!(
            entry.event == ToolEvent::Open,
            "{} {} {} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.tool_id,
            entry.executable_path,
            entry.arguments
        );
    }

    println!("\n{}", "Executables".bold());
    for (tool_id, paths) in &snapshot.executables {
        println!("  {:<14} {}", tool_id, paths.iter().join(", "));
    }

    println!("\n{}", "Progress".bold());
    for row in progress::progress(&graph, &snapshot.activities) {
        let active_for = snapshot
            .activities
            .get(&row.node_id)
            .map(|activity| activity.total_active(snapshot.exported_at).as_secs())
            .unwrap_or_default();
        println!(
            "  {:<28} {:<8} started {} ({}s active)",
            row.name,
            row.status.to_string(),
            row.started_at.format("%Y-%m-%d %H:%M:%S"),
            active_for
        );
    }

    let suggestions = progress::suggestions(&graph, &snapshot.activities);
    if !suggestions.is_empty() {
        println!("\n{}", "Suggested next steps".bold());
        for suggestion in suggestions {
            println!(
                "  {:<28} {}",
                suggestion.name,
                suggestion.tools.iter().join(", ")
            );
        }
    }
    Ok(())
}
