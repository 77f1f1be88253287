mod report;
mod tools;
mod watch;
mod workflow;

pub(super) use report::report;
pub(super) use tools::tools;
pub(super) use watch::watch;
pub(super) use workflow::workflow;

use crate::config::Config;
use crate::process_identification::target_pipeline::WorkflowGraph;
use crate::process_identification::target_process::ToolCatalog;
use crate::utils::yaml::YamlFile;
use anyhow::{Context, Result};

/// Catalog and workflow from the configured files, or the embedded defaults.
pub fn load_definitions(config: &Config) -> Result<(ToolCatalog, WorkflowGraph)> {
    let catalog = match &config.catalog_file {
        Some(path) => ToolCatalog::load(&YamlFile::from(path.as_path()))
            .with_context(|| format!("Failed to load tool catalog {}", path.display()))?,
        None => ToolCatalog::embedded().context("Failed to load the embedded tool catalog")?,
    };
    let workflow = match &config.workflow_file {
        Some(path) => WorkflowGraph::load(&YamlFile::from(path.as_path()))
            .with_context(|| format!("Failed to load workflow {}", path.display()))?,
        None => WorkflowGraph::embedded().context("Failed to load the embedded workflow")?,
    };
    Ok((
        catalog,
        workflow.with_malware_sample(config.malware_sample.clone()),
    ))
}
