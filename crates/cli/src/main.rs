//! spa-deploy - Publish a single-page app to S3 and CloudFront

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use spa_deployer::commands::{self, Cli};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins; otherwise stage logging at info, or debug with --debug
    let level = if cli.debug {
        "debug"
    } else if cli.quiet || cli.json {
        "error"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_ansi(!cli.no_color),
        )
        .with(filter)
        .init();

    let exit_code = commands::execute(cli).await;
    tracing::debug!("Exiting: {exit_code}");

    std::process::exit(exit_code.as_i32());
}
