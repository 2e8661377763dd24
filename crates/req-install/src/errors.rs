//! Error types for the installer
//!
//! Every variant ends up on the same path in `main`: printed as the
//! installation failure diagnostic, then exit status 1.

use req_install_config::{ConfigError, DiscoveryError};
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstallError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Discovery(#[from] DiscoveryError),

    #[error("Failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write to stdout: {0}")]
    Stdout(#[source] io::Error),

    #[error("Command '{command}' {}.{}", exit_phrase(.status), stderr_suffix(.stderr))]
    CommandFailed {
        command: String,
        status: Option<i32>,
        /// Captured stderr, only present when output was not inherited
        stderr: Option<String>,
    },
}

impl InstallError {
    /// Exit status of the child, if it ran and exited normally
    pub fn child_status(&self) -> Option<i32> {
        match self {
            InstallError::CommandFailed { status, .. } => *status,
            _ => None,
        }
    }
}

fn exit_phrase(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("returned non-zero exit status {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

fn stderr_suffix(stderr: &Option<String>) -> String {
    match stderr.as_deref().map(str::trim_end) {
        Some(text) if !text.is_empty() => format!("\n{}", text),
        _ => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use crate::errors::*;

    #[test]
    fn test_command_failed_display() {
        let err = InstallError::CommandFailed {
            command: "python3 -m pip install -r requirements.txt".to_string(),
            status: Some(1),
            stderr: None,
        };
        assert_eq!(
            err.to_string(),
            "Command 'python3 -m pip install -r requirements.txt' returned non-zero exit status 1."
        );
        assert_eq!(err.child_status(), Some(1));
    }

    #[test]
    fn test_command_failed_with_stderr() {
        let err = InstallError::CommandFailed {
            command: "python3 -m pip install -r requirements.txt".to_string(),
            status: Some(1),
            stderr: Some("ERROR: Could not open requirements file\n".to_string()),
        };
        let message = err.to_string();
        assert!(message.ends_with("exit status 1.\nERROR: Could not open requirements file"));
    }

    #[test]
    fn test_signal_termination_display() {
        let err = InstallError::CommandFailed {
            command: "python3 -m pip install -r requirements.txt".to_string(),
            status: None,
            stderr: Some("   ".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Command 'python3 -m pip install -r requirements.txt' was terminated by a signal."
        );
        assert_eq!(err.child_status(), None);
    }

    #[test]
    fn test_discovery_error_is_transparent() {
        let err = InstallError::from(DiscoveryError::UvNotFound);
        assert_eq!(
            err.to_string(),
            "uv not found on PATH; pass --uv or set uv_path"
        );
    }
}
