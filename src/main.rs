//! # httpline Main Entry Point
//!
//! Parses flags, sets up logging, runs one request and exits with its status.

use httpline::{config, AppError, CommandLineArgs, Defaults};
use tracing_subscriber::EnvFilter;

fn main() {
    let args = CommandLineArgs::parse();
    init_tracing(args.verbose());

    let result = Defaults::load_default()
        .map_err(AppError::from)
        .and_then(|defaults| httpline::run(&args, &defaults));

    let code = match result {
        Ok(outcome) => outcome.exit_code(),
        Err(e) => {
            tracing::debug!("Invocation failed: {:?}", e);
            eprintln!("httpline: {e:#}");
            e.exit_code()
        }
    };
    std::process::exit(code);
}

/// Log to stderr; `--verbose` wins over `HTTPLINE_LOG_LEVEL`
fn init_tracing(verbose: bool) {
    let level = if verbose {
        format!("{},httpline=debug", config::DEFAULT_LOG_LEVEL)
    } else {
        config::get_log_level()
    };
    let filter = EnvFilter::try_new(&level).unwrap_or_else(|_| EnvFilter::new(config::DEFAULT_LOG_LEVEL));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
