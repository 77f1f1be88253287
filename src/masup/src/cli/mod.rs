pub mod commands;
pub mod handlers;
mod process_command;

pub use process_command::process_command;
