// partysim - party alignment simulator
// Main entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;

use partysim::cli::{self, Cli};

#[tokio::main]
async fn main() {
    init_tracing();

    if let Err(err) = cli::run(Cli::parse()).await {
        tracing::error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            tracing::error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("partysim=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}
