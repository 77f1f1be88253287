use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::constants::{
    CONFIG_ENV_PREFIX, CONFIG_FILE_NAME, DEFAULT_LOG_LEVEL, POLLING_INTERVAL_MS, WORKING_DIR,
};
use config::{Config as RConfig, Environment, File, FileFormat};

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub struct Config {
    pub polling_interval_ms: u64,
    pub catalog_file: Option<PathBuf>,
    pub workflow_file: Option<PathBuf>,
    pub export_path: Option<PathBuf>,
    pub work_dir: PathBuf,
    pub log_level: String,
    pub malware_sample: Option<String>,

    /// Files the configuration was read from, lowest precedence first.
    #[serde(default)]
    pub config_sources: Vec<String>,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// `<config dir>/masup/config.toml`, read when present and no explicit file is given.
    pub fn default_config_file() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("masup").join(CONFIG_FILE_NAME))
    }

    /// Defaults, then the TOML file, then `MASUP_*` environment variables.
    ///
    /// An explicitly passed file must exist; the per-user default file is optional.
    pub fn load(config_file: Option<&Path>) -> Result<Config> {
        let mut builder = RConfig::builder()
            .set_default("polling_interval_ms", POLLING_INTERVAL_MS)?
            .set_default("work_dir", WORKING_DIR)?
            .set_default("log_level", DEFAULT_LOG_LEVEL)?;

        let mut sources = Vec::new();
        match config_file {
            Some(path) => {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml));
                sources.push(path.display().to_string());
            }
            None => {
                if let Some(path) = Self::default_config_file().filter(|p| p.exists()) {
                    builder = builder
                        .add_source(File::from(path.as_path()).format(FileFormat::Toml));
                    sources.push(path.display().to_string());
                }
            }
        }

        builder = builder
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX).try_parsing(true))
            .set_override("config_sources", sources)?;

        let config: Config = builder
            .build()
            .context("failed to read configuration")?
            .try_deserialize()
            .context("failed to parse config file")?;

        Ok(config)
    }
}
