/*
 * Manages application-specific configuration settings, such as an explicit root
 * folder for the note tree. Settings are persisted as JSON in the platform's local
 * configuration directory (see `path_resolver::get_base_app_config_local_dir`).
 *
 * It uses a trait-based approach (`ConfigManagerOperations`) to allow for
 * different storage backends or mock implementations for testing. The concrete
 * implementation (`CoreConfigManager`) handles the file system interactions.
 */
use crate::core::path_resolver;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

fn default_create_root_if_missing() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /* Replaces the platform-derived root when set. */
    #[serde(default)]
    pub root_path_override: Option<PathBuf>,
    #[serde(default = "default_create_root_if_missing")]
    pub create_root_if_missing: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            root_path_override: None,
            create_root_if_missing: default_create_root_if_missing(),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io(io::Error),
    Serde(serde_json::Error),
    NoProjectDirectory,
}

impl From<io::Error> for ConfigError {
    fn from(err: io::Error) -> Self {
        ConfigError::Io(err)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Serde(err)
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Configuration I/O error: {e}"),
            ConfigError::Serde(e) => write!(f, "Configuration format error: {e}"),
            ConfigError::NoProjectDirectory => {
                write!(f, "Could not determine project directory for configuration")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Serde(e) => Some(e),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;

pub trait ConfigManagerOperations: Send + Sync {
    fn load_config(&self, app_name: &str) -> Result<AppConfig>;
    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()>;
}

/*
 * Reads a config file, returning the defaults when it does not exist.
 */
fn read_config_file(file_path: &Path) -> Result<AppConfig> {
    if !file_path.exists() {
        log::debug!("CoreConfigManager: Config file {file_path:?} does not exist, using defaults.");
        return Ok(AppConfig::default());
    }
    let reader = BufReader::new(File::open(file_path)?);
    let config: AppConfig = serde_json::from_reader(reader)?;
    log::debug!("CoreConfigManager: Loaded {config:?} from {file_path:?}.");
    Ok(config)
}

fn write_config_file(file_path: &Path, config: &AppConfig) -> Result<()> {
    let mut writer = BufWriter::new(File::create(file_path)?);
    serde_json::to_writer_pretty(&mut writer, config)?;
    writer.flush()?;
    log::debug!("CoreConfigManager: Saved {config:?} to {file_path:?}.");
    Ok(())
}

pub struct CoreConfigManager {}

impl CoreConfigManager {
    pub fn new() -> Self {
        CoreConfigManager {}
    }

    fn config_file_path(app_name: &str) -> Result<PathBuf> {
        let config_dir = path_resolver::get_base_app_config_local_dir(app_name)
            .ok_or(ConfigError::NoProjectDirectory)?;
        Ok(config_dir.join(CONFIG_FILENAME))
    }
}

impl Default for CoreConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManagerOperations for CoreConfigManager {
    fn load_config(&self, app_name: &str) -> Result<AppConfig> {
        log::trace!("CoreConfigManager: Loading config for app '{app_name}'");
        read_config_file(&Self::config_file_path(app_name)?)
    }

    fn save_config(&self, app_name: &str, config: &AppConfig) -> Result<()> {
        log::trace!("CoreConfigManager: Saving config for app '{app_name}'");
        write_config_file(&Self::config_file_path(app_name)?, config)
    }
}
