pub mod workflow;
pub mod yaml_rules_parser;
