use super::load_definitions;
use crate::config::Config;
use crate::extracts::process::process_manager::recorder::ToolEvent;
use crate::extracts::process::process_manager::Analysis;
use crate::process_identification::target_pipeline::{progress, StepStatus};
use crate::{activity_message, error_message, info_message, success_message, warning_message};
use anyhow::{Context, Result};
use chrono::Utc;
use colored::Colorize;
use itertools::Itertools;
use std::path::PathBuf;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

pub async fn watch(config: &Config, interval_ms: Option<u64>, export: Option<PathBuf>) -> Result<()> {
    let (catalog, workflow) = load_definitions(config)?;
    let interval_ms = interval_ms.unwrap_or(config.polling_interval_ms).max(1);
    let export = export.or_else(|| config.export_path.clone());

    info_message!(
        "Watching {} tools every {}ms, press Ctrl-C to stop",
        catalog.len(),
        interval_ms
    );

    let mut analysis = Analysis::with_system_processes(catalog, workflow);
    let mut cursor = analysis.activity_log().cursor(0);
    let mut last_progress = analysis.progress();
    print_suggestions(&analysis);

    let cancellation_token = CancellationToken::new();
    tokio::spawn({
        let token = cancellation_token.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                token.cancel();
            }
        }
    });

    let mut interval = tokio::time::interval(Duration::from_millis(interval_ms));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancellation_token.cancelled() => break,
            _ = interval.tick() => {}
        }

        // process enumeration blocks, keep it off the async workers
        let (returned, result) = tokio::task::spawn_blocking(move || {
            let result = analysis.tick(Utc::now());
            (analysis, result)
        })
        .await
        .context("Tick task failed")?;
        analysis = returned;

        if let Err(err) = result {
            warn!("Tick skipped: {}", err);
            warning_message!("Tick skipped: {}", err);
            continue;
        }

        for entry in cursor.by_ref() {
            activity_message!(
                entry.event == ToolEvent::Open,
                "{} {} {} {}",
                entry.timestamp.format("%H:%M:%S"),
                entry.tool_id,
                entry.executable_path,
                entry.arguments
            );
        }

        let current_progress = analysis.progress();
        let changes = progress::changes(&last_progress, &current_progress);
        for change in &changes {
            let verb = match change.status {
                StepStatus::Active => "started",
                StepStatus::Ended => "ended",
            };
            info_message!("Step {}: {}", verb, change.name.bold());
        }
        if !changes.is_empty() {
            print_suggestions(&analysis);
        }
        last_progress = current_progress;
    }

    info!("Watch stopped after {} log entries", cursor.offset());
    for row in analysis.progress() {
        info_message!("{}: {}", row.name, row.status);
    }

    if let Some(path) = export {
        match analysis.export_to_file(&path) {
            Ok(()) => {
                success_message!("Analysis exported to {}", path.display());
            }
            Err(err) => {
                error_message!("{}", err);
                return Err(err.into());
            }
        }
    }
    Ok(())
}

fn print_suggestions(analysis: &Analysis) {
    let suggestions = analysis.suggestions();
    if suggestions.is_empty() {
        return;
    }
    info_message!(
        "Suggested next: {}",
        suggestions
            .iter()
            .map(|s| format!("{} ({})", s.name, s.tools.iter().join(", ")))
            .join("; ")
    );
}
