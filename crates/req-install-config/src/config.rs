use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

/// Manifest consumed when nothing else is configured
pub const DEFAULT_REQUIREMENTS: &str = "requirements.txt";

/// Environment variable that overrides the config file location
pub const CONFIG_ENV_VAR: &str = "REQ_INSTALL_CONFIG";

const CONFIG_FILE_NAME: &str = "req-install.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine home directory")]
    NoHomeDir,
}

/// Package manager front-end used to install the manifest
#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Installer {
    /// `<python> -m pip install -r <manifest>`
    #[default]
    Pip,
    /// `<uv> pip install --python <python> -r <manifest>`
    Uv,
}

impl fmt::Display for Installer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Installer::Pip => write!(f, "pip"),
            Installer::Uv => write!(f, "uv"),
        }
    }
}

impl FromStr for Installer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pip" => Ok(Installer::Pip),
            "uv" => Ok(Installer::Uv),
            other => Err(format!(
                "unknown installer '{}' (expected 'pip' or 'uv')",
                other
            )),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installer: Option<Installer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requirements: Option<String>,
}

impl Config {
    /// Location of the config file.
    ///
    /// `REQ_INSTALL_CONFIG` wins when set and non-empty; otherwise the
    /// platform default under the user's config directory.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let default = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("req-install")
            .join(CONFIG_FILE_NAME);

        #[cfg(target_os = "windows")]
        let default = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("req-install")
            .join(CONFIG_FILE_NAME);

        Ok(default)
    }

    /// Load the config from its default location. A missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!("No config file at {}, using defaults", path.display());
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!("Loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    /// Installer backend, falling back to pip
    pub fn installer(&self) -> Installer {
        self.installer.unwrap_or_default()
    }

    /// Manifest path, falling back to `requirements.txt`
    pub fn requirements(&self) -> PathBuf {
        self.requirements
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_REQUIREMENTS))
    }

    pub fn is_empty(&self) -> bool {
        self.python_path.is_none()
            && self.uv_path.is_none()
            && self.installer.is_none()
            && self.requirements.is_none()
    }
}
