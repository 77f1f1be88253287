pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod exporters;
pub mod extracts;
pub mod logging;
pub mod process_identification;
pub mod utils;

pub use error::{MasupError, Result};
pub use extracts::process::process_manager::Analysis;
