use clap::Parser;

use pixelbot::commands::Cli;
use pixelbot::handlers;

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = handlers::dispatch(&cli) {
        eprintln!("Error: {e}");
        if let Some(suggestion) = e.suggestion() {
            eprintln!("Suggestion: {suggestion}");
        }
        if e.is_retryable() {
            eprintln!("(This error may be transient - retry may succeed)");
        }
        std::process::exit(e.exit_code());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
