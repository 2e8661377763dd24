//! Interpreter lookup inside an existing Python virtual environment
//!
//! The installer never creates or activates environments; it only needs to
//! find the interpreter of the one that is already active.

use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable set by `activate` scripts
pub const VIRTUAL_ENV_VAR: &str = "VIRTUAL_ENV";

/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

#[derive(Debug, Clone)]
pub enum VenvPathError {
    /// The venv path does not exist or is not a directory
    VenvNotFound(PathBuf),
    /// The venv exists but has no usable interpreter
    InterpreterMissing(PathBuf),
}

impl std::fmt::Display for VenvPathError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VenvPathError::VenvNotFound(path) => {
                write!(f, "Virtual environment not found: {}", path.display())
            }
            VenvPathError::InterpreterMissing(bin_dir) => {
                write!(f, "Python executable not found in {}", bin_dir.display())
            }
        }
    }
}

impl std::error::Error for VenvPathError {}

/// Resolve the Python executable of a virtual environment
///
/// - **Unix/macOS**: `<venv>/bin/python3` or `<venv>/bin/python`
/// - **Windows**: `<venv>\Scripts\python.exe`
pub fn resolve_python_exe(venv_path: &Path) -> Result<PathBuf, VenvPathError> {
    if !venv_path.is_dir() {
        return Err(VenvPathError::VenvNotFound(venv_path.to_path_buf()));
    }

    let bin_dir = venv_path.join(PYTHON_BIN_DIR);
    if !bin_dir.is_dir() {
        return Err(VenvPathError::InterpreterMissing(bin_dir));
    }

    for exe in PYTHON_EXE_CANDIDATES {
        let candidate = bin_dir.join(exe);
        if candidate.is_file() {
            return Ok(candidate);
        }
    }

    // Versioned names such as python3.12
    if let Ok(entries) = fs::read_dir(&bin_dir) {
        let mut versioned: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|name| name.starts_with("python"))
            })
            .collect();
        versioned.sort();
        if let Some(candidate) = versioned.into_iter().next() {
            return Ok(candidate);
        }
    }

    Err(VenvPathError::InterpreterMissing(bin_dir))
}
