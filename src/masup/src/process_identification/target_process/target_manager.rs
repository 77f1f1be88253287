use crate::error::{MasupError, Result};
use crate::process_identification::target_process::parser::rule::ToolRule;
use crate::process_identification::target_process::parser::yaml_rules_parser::load_yaml_rules;
use crate::process_identification::target_process::target::ToolDefinition;
use crate::process_identification::target_process::target_match::ToolPattern;
use crate::utils::yaml::YamlFile;
use tracing::{debug, warn};

pub const EMBEDDED_TOOLS: YamlFile =
    YamlFile::Embedded(include_str!("yml_rules/masup.tools.yml"));

/// The read-only table of known tools, in the order they are tried against each process.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Builds a catalog from already compiled definitions.
    /// A later definition replaces an earlier one with the same id, keeping the earlier position.
    pub fn new<I: IntoIterator<Item = ToolDefinition>>(definitions: I) -> Self {
        let mut tools: Vec<ToolDefinition> = Vec::new();
        for definition in definitions {
            if let Some(existing) = tools.iter_mut().find(|t| t.id == definition.id) {
                warn!("Duplicate tool id '{}', last definition wins", definition.id);
                *existing = definition;
            } else {
                tools.push(definition);
            }
        }
        Self { tools }
    }

    /// Compiles every rule's detection pattern, failing on the first one that does not compile.
    pub fn from_rules<I: IntoIterator<Item = ToolRule>>(rules: I) -> Result<Self> {
        let definitions = rules
            .into_iter()
            .map(|rule| {
                let pattern =
                    ToolPattern::new(rule.regex).map_err(|source| MasupError::InvalidPattern {
                        tool_id: rule.id.clone(),
                        source,
                    })?;
                Ok(ToolDefinition {
                    id: rule.id,
                    pattern,
                    name: rule.name,
                    nature: rule.nature,
                    description: rule.description,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::new(definitions))
    }

    pub fn load(file: &YamlFile) -> Result<Self> {
        let yaml = file.read().map_err(MasupError::catalog)?;
        let rules = load_yaml_rules(&yaml).map_err(|e| MasupError::catalog(format!("{:#}", e)))?;
        let catalog = Self::from_rules(rules)?;
        debug!("Loaded {} tool definitions", catalog.len());
        Ok(catalog)
    }

    /// The catalog shipped with the binary.
    pub fn embedded() -> Result<Self> {
        Self::load(&EMBEDDED_TOOLS)
    }

    pub fn get(&self, id: &str) -> Option<&ToolDefinition> {
        self.tools.iter().find(|tool| tool.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDefinition> {
        self.tools.iter()
    }

    /// Ids of every tool whose pattern matches `process_name`, in catalog order.
    pub fn matching<'a>(&'a self, process_name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.tools
            .iter()
            .filter(move |tool| tool.matches(process_name))
            .map(|tool| tool.id.as_str())
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(id: &str, regex: &str) -> ToolRule {
        ToolRule {
            id: id.to_string(),
            regex: regex.to_string(),
            name: None,
            nature: None,
            description: None,
        }
    }

    #[test]
    fn test_embedded_catalog_loads() {
        let catalog = ToolCatalog::embedded().unwrap();
        assert!(!catalog.is_empty());
        assert_eq!(catalog.matching("ida64.exe").collect::<Vec<_>>(), vec!["ida"]);
        assert_eq!(catalog.matching("x64dbg.exe").collect::<Vec<_>>(), vec!["x64dbg"]);
        assert_eq!(catalog.matching("Procmon64.exe").collect::<Vec<_>>(), vec!["procmon"]);
        assert_eq!(catalog.matching("tshark").collect::<Vec<_>>(), vec!["wireshark"]);
        assert_eq!(catalog.matching("bash").count(), 0);
    }

    #[test]
    fn test_invalid_pattern_names_the_tool() {
        let err = ToolCatalog::from_rules(vec![rule("ida", "ida"), rule("broken", "x64dbg(")])
            .unwrap_err();
        match err {
            MasupError::InvalidPattern { tool_id, .. } => assert_eq!(tool_id, "broken"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_unbalanced_group_cannot_escape_anchor() {
        let err = ToolCatalog::from_rules(vec![rule("ida", "ida"), rule("broken", "ida)|(x")])
            .unwrap_err();
        assert!(matches!(
            err,
            MasupError::InvalidPattern { ref tool_id, .. } if tool_id == "broken"
        ));
    }

    #[test]
    fn test_invalid_pattern_from_yaml_names_the_tool() {
        let file = YamlFile::Embedded("tools:\n  - id: bad\n    regex: \"[\"\n");
        let err = ToolCatalog::load(&file).unwrap_err();
        assert!(err.to_string().contains("'bad'"));
    }

    #[test]
    fn test_malformed_document_is_a_definition_error() {
        let file = YamlFile::Embedded("tools:\n  - regex: ida\n");
        assert!(matches!(
            ToolCatalog::load(&file),
            Err(MasupError::Definition { .. })
        ));
    }

    #[test]
    fn test_duplicate_ids_keep_position_last_wins() {
        let catalog = ToolCatalog::from_rules(vec![
            rule("ida", "ida"),
            rule("gdb", "gdb"),
            rule("ida", "idaq"),
        ])
        .unwrap();
        assert_eq!(catalog.len(), 2);
        let ids: Vec<_> = catalog.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["ida", "gdb"]);
        assert_eq!(catalog.get("ida").unwrap().pattern.as_str(), "idaq");
    }

    #[test]
    fn test_matching_preserves_catalog_order() {
        let catalog =
            ToolCatalog::from_rules(vec![rule("b", "tool"), rule("a", "too")]).unwrap();
        assert_eq!(catalog.matching("tool").collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
