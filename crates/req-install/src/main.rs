use clap::Parser;
use req_install::{
    cli::Cli,
    errors::InstallError,
    installer::{install_requirements, install_requirements_with, plan_install},
};
use req_install_config::Config;
use req_install_logger as logger;
use std::io::{self, Write};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV_VAR: &str = "REQ_INSTALL_LOG";

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    if let Err(e) = run(&cli) {
        logger::error(&format!(
            "error occurred while installing dependencies: {}",
            e
        ));
        if cli.global.verbosity_level() > 0 {
            logger::show_log_path();
        }
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<(), InstallError> {
    let opts = cli.install_options();

    if cli.dry_run {
        let config = Config::load()?;
        let plan = plan_install(&opts, &config)?;
        return print_line(&plan.display_command());
    }

    if opts.is_default() {
        install_requirements()?;
    } else {
        let config = Config::load()?;
        install_requirements_with(&opts, &config)?;
    }
    logger::debug("Install succeeded");
    print_line("all dependencies have been installed")
}

/// Write a line to stdout. A reader that already went away is not a failure;
/// the install itself has finished by then.
fn print_line(line: &str) -> Result<(), InstallError> {
    let mut stdout = io::stdout().lock();
    match writeln!(stdout, "{}", line).and_then(|()| stdout.flush()) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
            logger::debug("stdout closed before the result line was written");
            Ok(())
        }
        Err(e) => Err(InstallError::Stdout(e)),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR)
        .unwrap_or_else(|_| EnvFilter::new(logger::verbosity_to_filter()));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}
