use serde::Serialize;

/// A step of the analysis methodology, satisfied while any of its tools is running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WorkflowNode {
    pub id: String,
    pub name: Option<String>,
    pub phase: Option<String>,
    pub tools: Vec<String>,
}

impl WorkflowNode {
    pub fn new<I, S>(id: impl Into<String>, tools: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            id: id.into(),
            name: None,
            phase: None,
            tools: tools.into_iter().map(Into::into).collect(),
        }
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Debug, Clone, Hash, PartialEq, Eq, Serialize)]
pub struct WorkflowEdge {
    pub from: String,
    pub to: String,
}

/// The parsed form of a workflow document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkflowDefinition {
    pub malware_sample: Option<String>,
    pub nodes: Vec<WorkflowNode>,
    pub edges: Vec<WorkflowEdge>,
}
