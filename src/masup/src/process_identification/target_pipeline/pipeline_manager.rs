use crate::error::{MasupError, Result};
use crate::process_identification::target_pipeline::parser::workflow::{
    WorkflowDefinition, WorkflowEdge, WorkflowNode,
};
use crate::process_identification::target_pipeline::parser::yaml_rules_parser::load_yaml_workflow;
use crate::utils::yaml::YamlFile;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

pub const EMBEDDED_WORKFLOW: YamlFile =
    YamlFile::Embedded(include_str!("yml_rules/masup.workflow.yml"));

/// The read-only methodology graph: nodes in declaration order plus directed edges.
///
/// References to tools missing from the catalog are kept as-is; such a node simply never
/// becomes active.
#[derive(Debug, Clone, Default)]
pub struct WorkflowGraph {
    malware_sample: Option<String>,
    nodes: Vec<WorkflowNode>,
    edges: Vec<WorkflowEdge>,
    tool_to_nodes: HashMap<String, HashSet<String>>,
}

impl WorkflowGraph {
    pub fn new(definition: WorkflowDefinition) -> Self {
        let mut nodes: Vec<WorkflowNode> = Vec::new();
        for node in definition.nodes {
            if let Some(existing) = nodes.iter_mut().find(|n| n.id == node.id) {
                warn!("Duplicate workflow node '{}', last definition wins", node.id);
                *existing = node;
            } else {
                nodes.push(node);
            }
        }

        let mut tool_to_nodes: HashMap<String, HashSet<String>> = HashMap::new();
        for node in &nodes {
            for tool in &node.tools {
                tool_to_nodes
                    .entry(tool.clone())
                    .or_default()
                    .insert(node.id.clone());
            }
        }

        Self {
            malware_sample: definition.malware_sample,
            nodes,
            edges: definition.edges,
            tool_to_nodes,
        }
    }

    pub fn from_nodes<I: IntoIterator<Item = WorkflowNode>>(nodes: I) -> Self {
        Self::new(WorkflowDefinition {
            nodes: nodes.into_iter().collect(),
            ..Default::default()
        })
    }

    pub fn load(file: &YamlFile) -> Result<Self> {
        let yaml = file.read().map_err(MasupError::workflow)?;
        let definition =
            load_yaml_workflow(&yaml).map_err(|e| MasupError::workflow(format!("{:#}", e)))?;
        let graph = Self::new(definition);
        debug!(
            "Loaded workflow with {} nodes and {} edges",
            graph.nodes.len(),
            graph.edges.len()
        );
        Ok(graph)
    }

    /// The methodology shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::load(&EMBEDDED_WORKFLOW)
    }

    pub fn with_malware_sample(mut self, malware_sample: Option<String>) -> Self {
        if malware_sample.is_some() {
            self.malware_sample = malware_sample;
        }
        self
    }

    pub fn malware_sample(&self) -> Option<&str> {
        self.malware_sample.as_deref()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &WorkflowNode> {
        self.nodes.iter()
    }

    pub fn node(&self, id: &str) -> Option<&WorkflowNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edges(&self) -> &[WorkflowEdge] {
        &self.edges
    }

    pub fn successors<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a WorkflowNode> + 'a {
        self.edges
            .iter()
            .filter(move |edge| edge.from == id)
            .filter_map(|edge| self.node(&edge.to))
    }

    /// Ids of the nodes a tool contributes to.
    pub fn nodes_for_tool(&self, tool_id: &str) -> Option<&HashSet<String>> {
        self.tool_to_nodes.get(tool_id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
