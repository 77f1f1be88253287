pub mod cli;
pub mod yaml;
