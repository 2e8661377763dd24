use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const LOG_FILE_NAME: &str = "req-install.log";

static LOG_FILE: Mutex<Option<PathBuf>> = Mutex::new(None);
static VERBOSITY: Mutex<u8> = Mutex::new(0);
static SPINNER: Mutex<Option<ProgressBar>> = Mutex::new(None);

/// Get the current verbosity level
pub fn get_verbosity() -> u8 {
    VERBOSITY.lock().ok().map(|v| *v).unwrap_or(0)
}

/// Convert verbosity level to a `tracing` filter directive
/// 0 = warn only, 1 = debug (-v), 2 = trace (-vv)
pub fn verbosity_to_filter() -> &'static str {
    match get_verbosity() {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize the logger with verbosity level
pub fn init_with_verbosity(verbosity: u8) -> Result<(), String> {
    if let Ok(mut v) = VERBOSITY.lock() {
        *v = verbosity;
    }

    init()
}

fn init() -> Result<(), String> {
    let config_dir = get_config_dir()?;
    fs::create_dir_all(&config_dir)
        .map_err(|e| format!("Failed to create config directory: {}", e))?;

    let log_file = config_dir.join(LOG_FILE_NAME);
    truncate_log_file(&log_file)?;

    let mut log_file_guard = LOG_FILE
        .lock()
        .map_err(|e| format!("Log file lock poisoned: {}", e))?;
    *log_file_guard = Some(log_file);

    Ok(())
}

/// Start each run with an empty log file
fn truncate_log_file(log_file: &Path) -> Result<(), String> {
    fs::File::create(log_file)
        .map(|_| ())
        .map_err(|e| format!("Failed to truncate log file {}: {}", log_file.display(), e))
}

fn get_config_dir() -> Result<PathBuf, String> {
    #[cfg(not(target_os = "windows"))]
    let config_dir = dirs::home_dir()
        .ok_or("Could not determine home directory")?
        .join(".config")
        .join("req-install");

    #[cfg(target_os = "windows")]
    let config_dir = dirs::config_dir()
        .ok_or("Could not determine config directory")?
        .join("req-install");

    Ok(config_dir)
}

fn format_log_line(timestamp: &str, source: &str, message: &str) -> String {
    format!("[{}] [{}] {}", timestamp, source, message)
}

fn write_to_log(message: &str) {
    write_to_log_with_source(message, "REQ-INSTALL")
}

fn write_to_log_with_source(message: &str, source: &str) {
    if let Ok(log_file_guard) = LOG_FILE.lock() {
        if let Some(ref log_path) = *log_file_guard {
            if let Ok(mut file) = OpenOptions::new().create(true).append(true).open(log_path) {
                let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
                let _ = writeln!(file, "{}", format_log_line(&timestamp, source, message));
            }
        }
    }
}

/// Log an informational message (to console if verbose >= 1, always to file)
pub fn info(message: &str) {
    write_to_log(&format!("INFO {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{}", message);
    }
}

/// Log a debug message (to console if verbose >= 1, always to file)
pub fn debug(message: &str) {
    write_to_log(&format!("DEBUG {}", message));
    if get_verbosity() >= 1 {
        eprintln!("{} {}", "DEBUG:".blue().bold(), message);
    }
}

/// Log a warning message (to both file and console)
pub fn warn(message: &str) {
    write_to_log(&format!("WARN {}", message));
    eprintln!("{} {}", "warning:".yellow().bold(), message);
}

/// Log an error message (to both file and console)
pub fn error(message: &str) {
    write_to_log(&format!("ERROR {}", message));
    eprintln!("{} {}", "Error:".red().bold(), message);
}

/// Capture command output and log it
pub fn capture_output(command_name: &str, output: &std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    write_to_log_with_source(
        &format!(
            "COMMAND: {} (exit code: {:?})",
            command_name,
            output.status.code()
        ),
        "CHILD",
    );

    if !stdout.is_empty() {
        write_to_log_with_source(&format!("  STDOUT:\n{}", stdout), "CHILD");
    }

    if !stderr.is_empty() {
        write_to_log_with_source(&format!("  STDERR:\n{}", stderr), "CHILD");
    }
}

/// Get the log file path for display
pub fn get_log_path() -> Option<PathBuf> {
    LOG_FILE.lock().ok().and_then(|guard| guard.clone())
}

/// Print the log file path to the user
pub fn show_log_path() {
    if let Some(path) = get_log_path() {
        eprintln!("Log file: {}", path.display());
    } else if let Ok(config_dir) = get_config_dir() {
        eprintln!("Log file: {}", config_dir.join(LOG_FILE_NAME).display());
    } else {
        eprintln!("Log file location not available");
    }
}

/// Start a spinner with the given message (only if not verbose)
pub fn spinner_start(message: &str) {
    if get_verbosity() > 0 {
        return;
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"])
        .template("{spinner:.cyan} {msg}")
    {
        spinner.set_style(style);
    }
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));
    spinner.set_message(message.to_string());

    if let Ok(mut spinner_guard) = SPINNER.lock() {
        *spinner_guard = Some(spinner);
    }
}

/// Stop the spinner without any message
pub fn spinner_stop() {
    if let Ok(mut spinner_guard) = SPINNER.lock() {
        if let Some(spinner) = spinner_guard.take() {
            spinner.finish_and_clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_log_line() {
        let line = format_log_line("2024-10-06 12:00:00", "CHILD", "INFO done");
        assert_eq!(line, "[2024-10-06 12:00:00] [CHILD] INFO done");
    }

    #[test]
    fn test_truncate_log_file_empties_previous_run() {
        let Ok(dir) = tempfile::TempDir::new() else {
            return;
        };
        let log_file = dir.path().join(LOG_FILE_NAME);
        assert!(fs::write(&log_file, "[old] [REQ-INSTALL] INFO previous run\n").is_ok());

        assert!(truncate_log_file(&log_file).is_ok());
        assert!(fs::read_to_string(&log_file).is_ok_and(|c| c.is_empty()));
    }

    #[test]
    fn test_truncate_log_file_reports_failure() {
        let Ok(dir) = tempfile::TempDir::new() else {
            return;
        };
        // A directory cannot be opened as the log file
        let result = truncate_log_file(dir.path());
        assert!(result.is_err_and(|e| e.starts_with("Failed to truncate log file")));
    }

    #[test]
    fn test_verbosity_filter_defaults_to_warn() {
        // Logger state is process-global; only the default is stable here.
        if get_verbosity() == 0 {
            assert_eq!(verbosity_to_filter(), "warn");
        }
    }
}
