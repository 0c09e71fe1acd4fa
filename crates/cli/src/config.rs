//! CLI configuration

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Configurator command line
#[derive(Debug, Parser)]
#[command(name = "configurator", about = "Evaluate product configurations", long_about = None, version)]
pub struct Cli {
    /// Logging settings
    #[command(flatten)]
    pub logging: LoggingConfig,

    /// Command to run
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Load configuration from `.env`, the environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if the arguments cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }
}

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "info", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Evaluate a configuration request
    Evaluate(EvaluateArgs),

    /// Evaluate every product with empty selections and report catalog errors
    Check(CheckArgs),
}

/// Output format for evaluation results.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Price table and issue summary
    Table,

    /// Pretty-printed JSON
    Json,

    /// YAML
    Yaml,
}

/// Arguments of `evaluate`.
#[derive(Debug, Args)]
pub struct EvaluateArgs {
    /// Catalog snapshot (YAML)
    #[arg(long, env = "CONFIGURATOR_CATALOG")]
    pub catalog: PathBuf,

    /// Request file (JSON or YAML), `-` reads standard input
    #[arg(long, default_value = "-")]
    pub request: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Arguments of `check`.
#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Catalog snapshot (YAML)
    #[arg(long, env = "CONFIGURATOR_CATALOG")]
    pub catalog: PathBuf,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parses_evaluate_arguments() -> TestResult {
        let cli = Cli::try_parse_from([
            "configurator",
            "evaluate",
            "--catalog",
            "catalog.yml",
            "--request",
            "request.json",
            "--format",
            "json",
            "--log-format",
            "json",
        ])?;

        assert_eq!(cli.logging.log_format, LogFormat::Json);

        let Command::Evaluate(args) = cli.command else {
            return Err("expected evaluate".into());
        };

        assert_eq!(args.catalog, PathBuf::from("catalog.yml"));
        assert_eq!(args.request, PathBuf::from("request.json"));
        assert_eq!(args.format, OutputFormat::Json);

        Ok(())
    }

    #[test]
    fn request_defaults_to_stdin() -> TestResult {
        let cli = Cli::try_parse_from(["configurator", "evaluate", "--catalog", "catalog.yml"])?;

        let Command::Evaluate(args) = cli.command else {
            return Err("expected evaluate".into());
        };

        assert_eq!(args.request, PathBuf::from("-"));
        assert_eq!(args.format, OutputFormat::Table);

        Ok(())
    }
}
