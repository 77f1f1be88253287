use super::load_definitions;
use crate::config::Config;
use anyhow::Result;
use colored::Colorize;
use itertools::Itertools;

pub fn workflow(config: &Config) -> Result<()> {
    let (_, graph) = load_definitions(config)?;

    if let Some(sample) = graph.malware_sample() {
        println!("Malware sample: {}\n", sample.bold());
    }

    for node in graph.nodes() {
        println!(
            "{} {}",
            node.display_name().bold(),
            node.phase
                .as_deref()
                .map(|phase| format!("({})", phase))
                .unwrap_or_default()
        );
        println!("    tools: {}", node.tools.iter().join(", "));
        let next = graph.successors(&node.id).map(|n| n.id.as_str()).join(", ");
        if !next.is_empty() {
            println!("    next:  {}", next);
        }
    }
    Ok(())
}
