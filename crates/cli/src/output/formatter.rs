//! Output formatter for human-readable and JSON output

use comfy_table::{Table, presets::UTF8_FULL_CONDENSED};
use console::style;
use humansize::{BINARY, format_size};
use serde::Serialize;

use sd_core::DeployReport;

use super::OutputConfig;

/// Formatter for CLI output
///
/// Handles both human-readable and JSON output formats based on configuration.
/// When JSON mode is enabled, all output is strict JSON without colors or progress.
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        Self { config }
    }

    /// Check if JSON output mode is enabled
    pub fn is_json(&self) -> bool {
        self.config.json
    }

    /// Check if colors are enabled
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color && !self.config.json
    }

    /// Output a success message
    pub fn success(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            println!("{} {message}", style("✓").green());
        } else {
            println!("✓ {message}");
        }
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        if self.config.json {
            let error = serde_json::json!({
                "error": message
            });
            eprintln!(
                "{}",
                serde_json::to_string_pretty(&error).unwrap_or_else(|_| message.to_string())
            );
        } else if self.colors_enabled() {
            eprintln!("{} {message}", style("✗").red());
        } else {
            eprintln!("✗ {message}");
        }
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet || self.config.json {
            return;
        }

        if self.colors_enabled() {
            eprintln!("{} {message}", style("⚠").yellow());
        } else {
            eprintln!("⚠ {message}");
        }
    }

    /// Output JSON directly
    pub fn json<T: Serialize>(&self, value: &T) {
        match serde_json::to_string_pretty(value) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Error serializing output: {e}"),
        }
    }

    /// Print a line of text (respects quiet mode)
    pub fn println(&self, message: &str) {
        if self.config.quiet {
            return;
        }
        println!("{message}");
    }

    /// Print the outcome of a deployment
    ///
    /// JSON mode prints the report even when quiet; human mode ends with the
    /// public URL on its own line.
    pub fn report(&self, report: &DeployReport) {
        if self.config.json {
            self.json(report);
            return;
        }
        if self.config.quiet {
            return;
        }

        self.success(&format!("Deployed {} to {}", report.app_name, report.bucket));
        println!("{}", summary_table(report));
        println!("{}", report.url);
    }
}

fn summary_table(report: &DeployReport) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.add_row(vec!["Bucket", report.bucket.as_str()]);
    table.add_row(vec!["Region", report.region.as_str()]);
    table.add_row(vec![
        "Files".to_string(),
        format!(
            "{} ({})",
            report.files_uploaded,
            format_size(report.bytes_uploaded, BINARY)
        ),
    ]);
    table.add_row(vec!["Distribution", report.distribution_domain.as_str()]);
    table
}
