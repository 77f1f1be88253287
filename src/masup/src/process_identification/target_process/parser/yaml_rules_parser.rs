use crate::process_identification::target_process::parser::rule::ToolRule;
use crate::utils::yaml::{load_from_yaml_array, load_yaml_document, Yaml, YamlExt};
use anyhow::Result;

/// Parses a rules document with a top-level `tools:` array.
pub fn load_yaml_rules(yaml_str: &str) -> Result<Vec<ToolRule>> {
    let doc = load_yaml_document(yaml_str)?;
    load_from_yaml_array(&doc, "tools")
}

impl TryFrom<Yaml> for ToolRule {
    type Error = anyhow::Error;

    fn try_from(yaml: Yaml) -> Result<Self> {
        Ok(ToolRule {
            id: yaml.required_string("id")?,
            regex: yaml.required_string("regex")?,
            name: yaml.optional_string("name")?,
            nature: yaml.optional_string("nature")?,
            description: yaml.optional_string("description")?,
        })
    }
}
