use crate::process_identification::target_process::target_match::ToolPattern;
use serde::Serialize;

/// A known analysis tool and the rule used to recognise it among running processes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ToolDefinition {
    pub id: String,
    pub pattern: ToolPattern,
    pub name: Option<String>,
    pub nature: Option<String>,
    pub description: Option<String>,
}

impl ToolDefinition {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }

    pub fn matches(&self, process_name: &str) -> bool {
        self.pattern.is_match(process_name)
    }
}
