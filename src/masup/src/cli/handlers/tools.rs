use super::load_definitions;
use crate::config::Config;
use anyhow::Result;
use itertools::Itertools;

pub fn tools(config: &Config, json: bool) -> Result<()> {
    let (catalog, _) = load_definitions(config)?;

    if json {
        let tools = catalog.iter().collect_vec();
        println!("{}", serde_json::to_string_pretty(&tools)?);
        return Ok(());
    }

    println!("{:<14} {:<28} {:<18} PATTERN", "ID", "NAME", "NATURE");
    for tool in catalog.iter() {
        println!(
            "{:<14} {:<28} {:<18} {}",
            tool.id,
            tool.display_name(),
            tool.nature.as_deref().unwrap_or("-"),
            tool.pattern
        );
    }
    Ok(())
}
