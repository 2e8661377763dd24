//! Locate the executables that back the package manager.
//!
//! Precedence for both lookups is: explicit CLI path, config file path,
//! then the environment (active venv, `PATH`).

use crate::config::Config;
use crate::venv_paths::{resolve_python_exe, VIRTUAL_ENV_VAR};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[cfg(not(windows))]
const PATH_PYTHON_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PATH_PYTHON_CANDIDATES: &[&str] = &["python", "python3", "py"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("No Python interpreter found (tried {tried}); pass --python or set python_path")]
    PythonNotFound { tried: String },

    #[error("uv not found on PATH; pass --uv or set uv_path")]
    UvNotFound,
}

/// Resolve the Python interpreter using the process environment.
pub fn resolve_python(cli: Option<&Path>, config: &Config) -> Result<PathBuf, DiscoveryError> {
    resolve_python_with(
        cli,
        config,
        std::env::var_os(VIRTUAL_ENV_VAR),
        std::env::var_os("PATH"),
    )
}

/// Resolve the Python interpreter against an explicit environment.
pub fn resolve_python_with(
    cli: Option<&Path>,
    config: &Config,
    virtual_env: Option<OsString>,
    search_path: Option<OsString>,
) -> Result<PathBuf, DiscoveryError> {
    if let Some(path) = cli {
        tracing::debug!("Using interpreter from command line: {}", path.display());
        return Ok(path.to_path_buf());
    }

    if let Some(ref path) = config.python_path {
        tracing::debug!("Using interpreter from config: {}", path);
        return Ok(PathBuf::from(path));
    }

    if let Some(venv) = virtual_env.filter(|v| !v.is_empty()) {
        let venv = PathBuf::from(venv);
        match resolve_python_exe(&venv) {
            Ok(python) => {
                tracing::debug!("Using interpreter from active venv: {}", python.display());
                return Ok(python);
            }
            Err(e) => tracing::warn!("Ignoring {}: {}", VIRTUAL_ENV_VAR, e),
        }
    }

    for name in PATH_PYTHON_CANDIDATES {
        if let Some(found) = find_on_path(name, search_path.as_ref()) {
            tracing::debug!("Using interpreter from PATH: {}", found.display());
            return Ok(found);
        }
    }

    Err(DiscoveryError::PythonNotFound {
        tried: PATH_PYTHON_CANDIDATES.join(", "),
    })
}

/// Resolve the `uv` binary using the process environment.
pub fn resolve_uv(cli: Option<&Path>, config: &Config) -> Result<PathBuf, DiscoveryError> {
    resolve_uv_with(cli, config, std::env::var_os("PATH"))
}

pub fn resolve_uv_with(
    cli: Option<&Path>,
    config: &Config,
    search_path: Option<OsString>,
) -> Result<PathBuf, DiscoveryError> {
    if let Some(path) = cli {
        return Ok(path.to_path_buf());
    }
    if let Some(ref path) = config.uv_path {
        return Ok(PathBuf::from(path));
    }
    find_on_path("uv", search_path.as_ref()).ok_or(DiscoveryError::UvNotFound)
}

fn find_on_path(name: &str, search_path: Option<&OsString>) -> Option<PathBuf> {
    let search_path = search_path?;
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    which::which_in(name, Some(search_path), cwd).ok()
}
