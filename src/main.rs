use clap::Parser;
use tracing_subscriber::EnvFilter;

use ruleop::cli::{self, Cli};

fn main() {
    // handle broken pipe gracefully (e.g., when piping to `head` or `jq` that exits early)
    reset_sigpipe();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    std::process::exit(cli::run(cli));
}

/// reset SIGPIPE to default behavior (terminate process) instead of panicking
/// this is the standard Unix behavior for CLI tools
fn reset_sigpipe() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

/// log to stderr so stdout stays clean for JSON output; RUST_LOG wins over -v
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
