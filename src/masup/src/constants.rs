pub const POLLING_INTERVAL_MS: u64 = 2000;
pub const WORKING_DIR: &str = "/tmp/masup";
pub const LOG_FILE_PREFIX: &str = "masup.log";
pub const DEFAULT_LOG_LEVEL: &str = "info";
pub const CONFIG_ENV_PREFIX: &str = "MASUP";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Joins a process's arguments into the single string recorded per tool.
pub const ARGUMENTS_SEPARATOR: &str = ",";

pub const SNAPSHOT_VERSION: u32 = 1;
