//! Legal Triage Router CLI.
#![forbid(unsafe_code)]

mod commands;
mod interactive;
mod render;
mod ui;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::CheckArgs;
use ltr_common::errors::find_catalogued;
use ltr_common::logging::{LogConfig, init_logging};
use ltr_common::schema::SchemaKind;
use ltr_common::{LtrConfig, Sourced};
use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::debug;
use ui::OutputContext;

#[derive(Parser)]
#[command(
    name = "ltr",
    version,
    about = "Legal Triage Router - conservative legal risk triage for product ideas, features and campaigns"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Rubric file (overrides config and LTR_RUBRIC)
    #[arg(long, global = true)]
    rubric: Option<PathBuf>,

    /// Config file (default: ./ltr.toml, then the user config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Triage a product idea, feature or campaign
    Check(CheckArgs),

    /// Quick triage with one-line output
    Quick {
        /// Description of the idea, feature or campaign
        description: String,
    },

    /// Show audit log statistics
    Stats {
        /// Audit log file (default: today's file in audit.log_dir)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Maintain the reviewed-case corpus
    Cases {
        #[command(subcommand)]
        action: CasesCommand,
    },

    /// Inspect the rubric and manage update proposals
    Rubric {
        #[command(subcommand)]
        action: RubricCommand,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },

    /// Print a JSON Schema (output, audit or input)
    Schema {
        #[arg(value_parser = SchemaKind::from_str)]
        kind: SchemaKind,
    },
}

#[derive(Subcommand)]
enum CasesCommand {
    /// Scan the cases directory and rebuild index.jsonl
    Ingest,

    /// Check case files for personal data
    Anonymize {
        /// Check a single case folder instead of every indexed case
        case_dir: Option<PathBuf>,
    },

    /// Extract rule candidates into extracted_rules.yaml
    Extract,

    /// Build regression fixtures from decided cases
    GenFixtures {
        /// Print the fixtures instead of writing them
        #[arg(long)]
        preview: bool,
    },

    /// Replay regression fixtures against the current rubric
    Regress,
}

#[derive(Subcommand)]
enum RubricCommand {
    /// Show rubric version, digest and red flags
    Show,

    /// Propose rubric changes from approved case candidates
    Propose,

    /// Apply the saved proposal (dry run unless --yes)
    Apply {
        /// Write the updated rubric
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show effective values and where they came from
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = LtrConfig::load(cli.config.as_deref())?;
    if let Some(path) = cli.rubric {
        config.rubric_path = Sourced::from_cli(path, "--rubric");
    }

    let mut log_config = LogConfig::from_env(&config.log_level.value).with_stderr();
    if cli.verbose {
        log_config = log_config.with_level("debug");
    }
    let _logging_guards = init_logging(&log_config)?;
    debug!(config_file = ?config.config_file, "Configuration loaded");

    let ctx = |json: bool| OutputContext::detect(config.output_color.value, false, json);

    match cli.command {
        Commands::Check(args) => commands::check(&config, &args),
        Commands::Quick { description } => commands::quick(&config, &description),
        Commands::Stats { file, json } => commands::stats(&config, file, &ctx(json)),
        Commands::Cases { action } => {
            let ctx = ctx(false);
            match action {
                CasesCommand::Ingest => commands::cases::ingest(&config, &ctx),
                CasesCommand::Anonymize { case_dir } => {
                    commands::cases::anonymize(&config, case_dir, &ctx)
                }
                CasesCommand::Extract => commands::cases::extract(&config, &ctx),
                CasesCommand::GenFixtures { preview } => {
                    commands::cases::gen_fixtures(&config, preview, &ctx)
                }
                CasesCommand::Regress => commands::cases::regress(&config, &ctx),
            }
        }
        Commands::Rubric { action } => {
            let ctx = ctx(false);
            match action {
                RubricCommand::Show => commands::rubric::show(&config, &ctx),
                RubricCommand::Propose => commands::rubric::propose(&config, &ctx),
                RubricCommand::Apply { yes } => commands::rubric::apply(&config, yes, &ctx),
            }
        }
        Commands::Config {
            action: ConfigCommand::Show { json },
        } => commands::config_show(&config, &ctx(json)),
        Commands::Schema { kind } => commands::schema(kind),
    }
}

/// Prints the error chain, with the catalog code and remediation when known.
fn report_error(err: &anyhow::Error) {
    match find_catalogued(err) {
        Some(code) => {
            eprintln!("{}", code.entry().format_full().trim_end());
            eprintln!("\nDetails: {err:#}");
        }
        None => eprintln!("Error: {err:#}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_check_flags() {
        let cli = Cli::parse_from([
            "ltr",
            "check",
            "-d",
            "보톡스 이벤트",
            "--exposure",
            "public",
            "--data-usage",
            "no_collection",
            "--json",
            "--no-log",
        ]);
        let Commands::Check(args) = cli.command else {
            panic!("expected check");
        };
        assert_eq!(args.description.as_deref(), Some("보톡스 이벤트"));
        assert_eq!(args.exposure, Some(ltr_common::Exposure::Public));
        assert_eq!(args.data_usage, Some(ltr_common::DataUsage::NoCollection));
        assert!(args.json && args.no_log);
    }

    #[test]
    fn test_rejects_unknown_categorical_value() {
        assert!(Cli::try_parse_from(["ltr", "check", "-d", "x", "-e", "everyone"]).is_err());
    }

    #[test]
    fn test_global_rubric_after_subcommand() {
        let cli = Cli::parse_from(["ltr", "quick", "무료 체험", "--rubric", "alt.yaml"]);
        assert_eq!(cli.rubric, Some(PathBuf::from("alt.yaml")));
    }

    #[test]
    fn test_schema_kind_parses() {
        let cli = Cli::parse_from(["ltr", "schema", "audit"]);
        assert!(matches!(
            cli.command,
            Commands::Schema {
                kind: SchemaKind::Audit
            }
        ));
    }
}
