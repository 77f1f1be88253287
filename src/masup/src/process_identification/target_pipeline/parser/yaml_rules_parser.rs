use super::workflow::{WorkflowDefinition, WorkflowEdge, WorkflowNode};
use crate::utils::yaml::{load_from_yaml_array, load_yaml_document, Yaml, YamlExt};
use anyhow::{Context, Result};

pub fn load_yaml_workflow(yaml_str: &str) -> Result<WorkflowDefinition> {
    let doc = load_yaml_document(yaml_str)?;
    let malware_sample = doc.optional_string("malware_sample")?;
    let nodes = load_from_yaml_array(&doc, "nodes")?;
    let edges = if doc.optional_vec("edges")?.is_some() {
        load_from_yaml_array(&doc, "edges")?
    } else {
        Vec::new()
    };
    Ok(WorkflowDefinition {
        malware_sample,
        nodes,
        edges,
    })
}

impl TryFrom<Yaml> for WorkflowNode {
    type Error = anyhow::Error;

    fn try_from(yaml: Yaml) -> Result<Self> {
        let id = yaml.required_string("id")?;
        let tools = yaml
            .required("tools")?
            .to_string_vec()
            .with_context(|| format!("tools of node {}", id))?;
        Ok(WorkflowNode {
            name: yaml.optional_string("name")?,
            phase: yaml.optional_string("phase")?,
            id,
            tools,
        })
    }
}

impl TryFrom<Yaml> for WorkflowEdge {
    type Error = anyhow::Error;

    fn try_from(yaml: Yaml) -> Result<Self> {
        Ok(WorkflowEdge {
            from: yaml.required_string("from")?,
            to: yaml.required_string("to")?,
        })
    }
}
