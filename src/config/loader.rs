use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Files looked up in the working directory when `--config` is not given,
/// first match wins.
const DEFAULT_CONFIG_FILES: [&str; 2] = ["routebench.toml", "routebench.json"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConfigFormat {
    Toml,
    Json,
}

impl ConfigFormat {
    pub(crate) fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Ok(Self::Toml),
            Some("json") => Ok(Self::Json),
            Some(ext) => Err(ConfigError::UnsupportedExtension {
                ext: ext.to_owned(),
            }),
            None => Err(ConfigError::MissingExtension),
        }
    }

    fn parse(self, path: &Path, content: &str) -> Result<ConfigFile, ConfigError> {
        match self {
            Self::Toml => toml::from_str(content).map_err(|source| ConfigError::ParseToml {
                path: path.to_path_buf(),
                source,
            }),
            Self::Json => {
                serde_json::from_str(content).map_err(|source| ConfigError::ParseJson {
                    path: path.to_path_buf(),
                    source,
                })
            }
        }
    }
}

/// Loads the `--config` file, or the first default file found in the
/// working directory. No file at all is not an error.
///
/// # Errors
///
/// Returns an error when the config file cannot be read or parsed.
pub fn load_config(path: Option<&str>) -> AppResult<Option<ConfigFile>> {
    let selected = match path {
        Some(path) => Some(PathBuf::from(path)),
        None => find_default_config(Path::new(".")),
    };
    selected
        .map(|path| load_config_file(&path))
        .transpose()
}

/// First default config file present in `dir`.
pub(crate) fn find_default_config(dir: &Path) -> Option<PathBuf> {
    DEFAULT_CONFIG_FILES
        .iter()
        .map(|name| dir.join(name))
        .find(|candidate| candidate.is_file())
}

pub(crate) fn load_config_file(path: &Path) -> AppResult<ConfigFile> {
    let format = ConfigFormat::from_path(path).map_err(AppError::config)?;
    let content = std::fs::read_to_string(path).map_err(|source| {
        AppError::config(ConfigError::ReadConfig {
            path: path.to_path_buf(),
            source,
        })
    })?;
    let file = format.parse(path, &content).map_err(AppError::config)?;
    debug!("Loaded {:?} config from {}", format, path.display());
    Ok(file)
}
