use super::{ConfigError, HoistConfig};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Environment variable naming an explicit configuration file
pub const CONFIG_ENV_VAR: &str = "HOIST_CONFIG";

/// `<config_dir>/hoist/config.toml`, if the platform has a config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("hoist").join("config.toml"))
}

/// Load configuration from the first available source.
///
/// An explicit path (argument or `HOIST_CONFIG`) must exist. The default
/// location is optional and falls back to built-in defaults.
pub async fn load_config(explicit: Option<&Path>) -> Result<HoistConfig, ConfigError> {
    let from_env = std::env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);

    let config = match explicit.map(Path::to_path_buf).or(from_env) {
        Some(path) => {
            if !path.exists() {
                return Err(ConfigError::NotFound(path));
            }
            read_config_file(&path).await?
        }
        None => match default_config_path() {
            Some(path) if path.exists() => read_config_file(&path).await?,
            _ => {
                debug!("No configuration file found, using defaults");
                HoistConfig::default()
            }
        },
    };

    config.validate()?;
    Ok(config)
}

/// Parse a single TOML configuration file
pub async fn read_config_file(path: &Path) -> Result<HoistConfig, ConfigError> {
    debug!("Loading configuration from {}", path.display());

    let content = fs::read_to_string(path)
        .await
        .map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}
