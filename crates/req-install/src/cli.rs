use crate::common::GlobalOpts;
use crate::installer::InstallOptions;
use clap::Parser;
use req_install_config::Installer;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "req-install")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Install the dependencies listed in requirements.txt",
    long_about = "req-install runs the package manager's install command against a requirements \
                  manifest (requirements.txt by default) and reports whether it succeeded."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    /// Requirements manifest to install from (default: requirements.txt)
    #[arg(short = 'r', long = "requirement", value_name = "PATH")]
    pub requirements: Option<PathBuf>,

    /// Python interpreter that runs pip (default: active venv, then PATH)
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,

    /// Package manager front-end: pip or uv
    #[arg(long, value_name = "NAME")]
    pub installer: Option<Installer>,

    /// Path to the uv binary (only used with --installer uv)
    #[arg(long, value_name = "PATH")]
    pub uv: Option<PathBuf>,

    /// Print the install command without running it
    #[arg(long)]
    pub dry_run: bool,
}

impl Cli {
    pub fn install_options(&self) -> InstallOptions {
        InstallOptions {
            requirements: self.requirements.clone(),
            python: self.python.clone(),
            installer: self.installer,
            uv: self.uv.clone(),
            capture_output: self.global.quiet,
        }
    }
}
