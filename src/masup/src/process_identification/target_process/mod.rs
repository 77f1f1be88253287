pub mod parser;
pub mod target;
pub mod target_manager;
pub mod target_match;

pub use target::ToolDefinition;
pub use target_manager::ToolCatalog;
pub use target_match::ToolPattern;
