//! CLI command definitions and execution
//!
//! Running the binary without a subcommand performs a deployment.

use clap::{Parser, Subcommand};

use crate::exit_code::ExitCode;
use crate::output::OutputConfig;

pub mod completions;
pub mod deploy;

/// spa-deploy - Publish a single-page app to S3 and CloudFront
///
/// Uploads a build folder to an S3 website bucket and fronts it with a
/// CloudFront distribution. Missing values are prompted for.
#[derive(Parser, Debug)]
#[command(name = "spa-deploy")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
pub struct Cli {
    /// Output format: human-readable or JSON
    #[arg(long, global = true, default_value = "false")]
    pub json: bool,

    /// Disable colored output
    #[arg(long, global = true, default_value = "false")]
    pub no_color: bool,

    /// Disable progress bar
    #[arg(long, global = true, default_value = "false")]
    pub no_progress: bool,

    /// Suppress non-error output
    #[arg(short, long, global = true, default_value = "false")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true, default_value = "false")]
    pub debug: bool,

    #[command(flatten)]
    pub deploy: deploy::DeployArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate shell completion scripts
    Completions(completions::CompletionsArgs),
}

/// Execute the CLI command and return an exit code
pub async fn execute(cli: Cli) -> ExitCode {
    let output_config = OutputConfig {
        json: cli.json,
        no_color: cli.no_color,
        no_progress: cli.no_progress,
        quiet: cli.quiet,
    };

    match cli.command {
        Some(Commands::Completions(args)) => completions::execute(args),
        None => deploy::execute(cli.deploy, output_config).await,
    }
}
