pub mod rule;
pub mod yaml_rules_parser;
