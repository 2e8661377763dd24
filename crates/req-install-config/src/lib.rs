//! Configuration and interpreter discovery for req-install
//!
//! This crate owns everything the installer needs to know before it can
//! spawn a child process: the optional TOML config file, which installer
//! backend to use, and where the Python interpreter (and `uv`) live.

pub mod config;
pub mod discovery;
pub mod venv_paths;

pub use config::{Config, ConfigError, Installer, DEFAULT_REQUIREMENTS};
pub use discovery::DiscoveryError;
