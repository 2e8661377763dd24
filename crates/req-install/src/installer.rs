//! Run the package manager against a requirements manifest.
//!
//! Building the command ([`plan_install`]) is kept apart from running it
//! ([`run_plan`]) so the exact argument vector can be logged, printed for
//! `--dry-run`, and checked in tests without spawning anything.

use crate::errors::InstallError;
use req_install_config::discovery::{resolve_python, resolve_uv};
use req_install_config::{Config, Installer};
use req_install_logger as logger;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// How the child's stdio is wired
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Child shares the terminal
    Inherit,
    /// Output is captured and written to the log file
    Capture,
}

/// Overrides coming from the command line. `None` defers to the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOptions {
    pub requirements: Option<PathBuf>,
    pub python: Option<PathBuf>,
    pub installer: Option<Installer>,
    pub uv: Option<PathBuf>,
    pub capture_output: bool,
}

impl InstallOptions {
    /// True when nothing overrides the config file or the defaults
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }
}

/// A fully resolved install command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    pub installer: Installer,
    pub program: PathBuf,
    pub args: Vec<OsString>,
    pub requirements: PathBuf,
    pub output: OutputMode,
}

impl InstallPlan {
    /// `<python> -m pip install -r <requirements>`
    pub fn pip(python: &Path, requirements: &Path) -> Self {
        Self {
            installer: Installer::Pip,
            program: python.to_path_buf(),
            args: vec![
                "-m".into(),
                "pip".into(),
                "install".into(),
                "-r".into(),
                requirements.as_os_str().to_os_string(),
            ],
            requirements: requirements.to_path_buf(),
            output: OutputMode::Inherit,
        }
    }

    /// `<uv> pip install --python <python> -r <requirements>`
    pub fn uv(uv: &Path, python: &Path, requirements: &Path) -> Self {
        Self {
            installer: Installer::Uv,
            program: uv.to_path_buf(),
            args: vec![
                "pip".into(),
                "install".into(),
                "--python".into(),
                python.as_os_str().to_os_string(),
                "-r".into(),
                requirements.as_os_str().to_os_string(),
            ],
            requirements: requirements.to_path_buf(),
            output: OutputMode::Inherit,
        }
    }

    pub fn with_output(mut self, output: OutputMode) -> Self {
        self.output = output;
        self
    }

    /// Shell-like rendering used in logs and diagnostics
    pub fn display_command(&self) -> String {
        std::iter::once(self.program.as_os_str())
            .chain(self.args.iter().map(OsString::as_os_str))
            .map(|part| {
                let part = part.to_string_lossy();
                if part.is_empty() || part.contains(char::is_whitespace) {
                    format!("\"{}\"", part)
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        match self.output {
            OutputMode::Inherit => {
                cmd.stdin(Stdio::inherit())
                    .stdout(Stdio::inherit())
                    .stderr(Stdio::inherit());
            }
            OutputMode::Capture => {
                cmd.stdin(Stdio::null())
                    .stdout(Stdio::piped())
                    .stderr(Stdio::piped());
            }
        }
        cmd
    }
}

/// Resolve CLI overrides and config into a concrete command.
pub fn plan_install(opts: &InstallOptions, config: &Config) -> Result<InstallPlan, InstallError> {
    let requirements = opts
        .requirements
        .clone()
        .unwrap_or_else(|| config.requirements());
    let installer = opts.installer.unwrap_or_else(|| config.installer());

    let python = resolve_python(opts.python.as_deref(), config)?;
    logger::debug(&format!("Using interpreter: {}", python.display()));

    let plan = match installer {
        Installer::Pip => InstallPlan::pip(&python, &requirements),
        Installer::Uv => {
            let uv = resolve_uv(opts.uv.as_deref(), config)?;
            logger::debug(&format!("Using uv: {}", uv.display()));
            InstallPlan::uv(&uv, &python, &requirements)
        }
    };

    let output = if opts.capture_output {
        OutputMode::Capture
    } else {
        OutputMode::Inherit
    };

    let plan = plan.with_output(output);
    tracing::debug!(
        installer = %plan.installer,
        program = %plan.program.display(),
        requirements = %plan.requirements.display(),
        output = ?plan.output,
        "resolved install plan"
    );
    Ok(plan)
}

/// Spawn the plan, block until the child exits, and map its status.
pub fn run_plan(plan: &InstallPlan) -> Result<(), InstallError> {
    let display = plan.display_command();
    logger::debug(&format!("Running: {}", display));

    if !plan.requirements.is_file() {
        // The package manager reports this itself; run it anyway.
        logger::warn(&format!(
            "Requirements manifest not found: {}",
            plan.requirements.display()
        ));
    }

    let start = std::time::Instant::now();
    let mut cmd = plan.command();

    let (status, stderr) = match plan.output {
        OutputMode::Inherit => {
            let status = cmd.status().map_err(|source| InstallError::Spawn {
                command: display.clone(),
                source,
            })?;
            (status, None)
        }
        OutputMode::Capture => {
            logger::spinner_start(&format!(
                "Installing dependencies from {}",
                plan.requirements.display()
            ));
            let output = cmd.output();
            logger::spinner_stop();
            let output = output.map_err(|source| InstallError::Spawn {
                command: display.clone(),
                source,
            })?;
            logger::capture_output(&display, &output);
            let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
            (output.status, Some(stderr))
        }
    };

    logger::debug(&format!(
        "{} install finished in {:?} ({})",
        plan.installer,
        start.elapsed(),
        status
    ));

    if status.success() {
        return Ok(());
    }

    let command = display.as_str();
    tracing::warn!(command = %command, status = ?status.code(), "package manager failed");

    Err(InstallError::CommandFailed {
        command: display,
        status: status.code(),
        stderr,
    })
}

/// Install from the default manifest with configuration from disk.
pub fn install_requirements() -> Result<(), InstallError> {
    let config = Config::load()?;
    install_requirements_with(&InstallOptions::default(), &config)
}

pub fn install_requirements_with(
    opts: &InstallOptions,
    config: &Config,
) -> Result<(), InstallError> {
    let plan = plan_install(opts, config)?;
    logger::info(&format!(
        "Installing dependencies from {} with {}",
        plan.requirements.display(),
        plan.installer
    ));
    run_plan(&plan)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(plan: &InstallPlan) -> Vec<String> {
        plan.args
            .iter()
            .map(|a| a.to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_options_is_default() {
        assert!(InstallOptions::default().is_default());
        let opts = InstallOptions {
            capture_output: true,
            ..InstallOptions::default()
        };
        assert!(!opts.is_default());
    }

    #[test]
    fn test_pip_plan() {
        let plan = InstallPlan::pip(Path::new("/usr/bin/python3"), Path::new("requirements.txt"));
        assert_eq!(plan.program, PathBuf::from("/usr/bin/python3"));
        assert_eq!(
            args_of(&plan),
            ["-m", "pip", "install", "-r", "requirements.txt"]
        );
        assert_eq!(plan.output, OutputMode::Inherit);
        assert_eq!(
            plan.display_command(),
            "/usr/bin/python3 -m pip install -r requirements.txt"
        );
    }

    #[test]
    fn test_uv_plan() {
        let plan = InstallPlan::uv(
            Path::new("/usr/local/bin/uv"),
            Path::new("/venv/bin/python"),
            Path::new("dev.txt"),
        );
        assert_eq!(plan.installer, Installer::Uv);
        assert_eq!(
            args_of(&plan),
            ["pip", "install", "--python", "/venv/bin/python", "-r", "dev.txt"]
        );
    }

    #[test]
    fn test_display_quotes_spaces() {
        let plan = InstallPlan::pip(
            Path::new("/Applications/My Python/bin/python3"),
            Path::new("requirements.txt"),
        );
        assert_eq!(
            plan.display_command(),
            "\"/Applications/My Python/bin/python3\" -m pip install -r requirements.txt"
        );
    }

    #[test]
    fn test_plan_defaults_from_config() {
        let config = Config {
            python_path: Some("/cfg/python".to_string()),
            requirements: Some("cfg-requirements.txt".to_string()),
            ..Config::default()
        };
        let result = plan_install(&InstallOptions::default(), &config);
        let Ok(plan) = result else {
            panic!("plan should resolve from config");
        };
        assert_eq!(plan.program, PathBuf::from("/cfg/python"));
        assert_eq!(plan.requirements, PathBuf::from("cfg-requirements.txt"));
        assert_eq!(plan.installer, Installer::Pip);
    }

    #[test]
    fn test_plan_cli_overrides_config() {
        let config = Config {
            python_path: Some("/cfg/python".to_string()),
            uv_path: Some("/cfg/uv".to_string()),
            installer: Some(Installer::Uv),
            requirements: Some("cfg-requirements.txt".to_string()),
        };
        let opts = InstallOptions {
            requirements: Some(PathBuf::from("cli.txt")),
            python: Some(PathBuf::from("/cli/python")),
            installer: Some(Installer::Pip),
            uv: None,
            capture_output: true,
        };
        let Ok(plan) = plan_install(&opts, &config) else {
            panic!("plan should resolve from CLI");
        };
        assert_eq!(plan.program, PathBuf::from("/cli/python"));
        assert_eq!(plan.requirements, PathBuf::from("cli.txt"));
        assert_eq!(plan.installer, Installer::Pip);
        assert_eq!(plan.output, OutputMode::Capture);
    }

    #[test]
    fn test_plan_uv_from_config() {
        let config = Config {
            python_path: Some("/cfg/python".to_string()),
            uv_path: Some("/cfg/uv".to_string()),
            installer: Some(Installer::Uv),
            requirements: None,
        };
        let Ok(plan) = plan_install(&InstallOptions::default(), &config) else {
            panic!("uv plan should resolve");
        };
        assert_eq!(plan.program, PathBuf::from("/cfg/uv"));
        assert_eq!(
            args_of(&plan),
            ["pip", "install", "--python", "/cfg/python", "-r", "requirements.txt"]
        );
    }

    #[cfg(unix)]
    fn shell_plan(script: &str, output: OutputMode) -> InstallPlan {
        InstallPlan {
            installer: Installer::Pip,
            program: PathBuf::from("/bin/sh"),
            args: vec!["-c".into(), script.into()],
            requirements: PathBuf::from("requirements.txt"),
            output,
        }
    }

    #[test]
    #[cfg(unix)]
    fn test_run_plan_success() {
        let plan = shell_plan("exit 0", OutputMode::Capture);
        assert!(run_plan(&plan).is_ok());
    }

    #[test]
    #[cfg(unix)]
    fn test_run_plan_nonzero_exit() {
        let plan = shell_plan("exit 3", OutputMode::Inherit);
        let result = run_plan(&plan);
        assert!(matches!(
            result,
            Err(InstallError::CommandFailed {
                status: Some(3),
                stderr: None,
                ..
            })
        ));
    }

    #[test]
    #[cfg(unix)]
    fn test_run_plan_captures_stderr() {
        let plan = shell_plan("echo 'ERROR: no matching distribution' >&2; exit 1", OutputMode::Capture);
        let Err(err) = run_plan(&plan) else {
            panic!("plan should fail");
        };
        assert_eq!(err.child_status(), Some(1));
        assert!(err
            .to_string()
            .contains("ERROR: no matching distribution"));
    }

    #[test]
    fn test_run_plan_missing_program() {
        let plan = InstallPlan::pip(
            Path::new("/nonexistent/req-install/python3"),
            Path::new("requirements.txt"),
        );
        let result = run_plan(&plan);
        assert!(matches!(result, Err(InstallError::Spawn { .. })));
    }
}
