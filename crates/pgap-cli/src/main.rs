//! # pgap CLI entry point
//!
//! Parses command-line arguments, installs logging, and dispatches to the
//! subcommand handlers. Logs go to stderr so stdout carries only reports.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pgap_cli::analyze::{run_analyze, AnalyzeArgs};
use pgap_cli::taxonomy::{run_taxonomy, TaxonomyArgs};
use pgap_cli::EXIT_ERROR;

/// Policy gap analysis.
///
/// Compares policy documents against a reference taxonomy of domains,
/// sections and clauses, and reports under-covered sections with
/// recommendations for the missing clauses.
#[derive(Parser, Debug)]
#[command(name = "pgap", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// Path to analyzer configuration (YAML).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyze a document and report its policy gaps.
    Analyze(AnalyzeArgs),

    /// Validate or inspect a reference taxonomy.
    Taxonomy(TaxonomyArgs),
}

fn filter_for(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

fn init_tracing(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter_for(verbose))
        .with_writer(std::io::stderr)
        .with_target(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "pgap starting");

    let result = match &cli.command {
        Commands::Analyze(args) => run_analyze(args, cli.config.as_deref()),
        Commands::Taxonomy(args) => run_taxonomy(args),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pgap_cli::analyze::OutputFormat;
    use pgap_cli::taxonomy::TaxonomyCommand;

    #[test]
    fn cli_parse_analyze_defaults() {
        let cli = Cli::try_parse_from(["pgap", "analyze", "handbook.txt"]).unwrap();
        assert_eq!(cli.verbose, 0);
        assert!(!cli.log_json);
        assert!(cli.config.is_none());
        if let Commands::Analyze(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("handbook.txt"));
            assert_eq!(args.format, OutputFormat::Json);
            assert!(args.taxonomy.is_none());
            assert!(args.output.is_none());
            assert!(args.fail_under.is_none());
        } else {
            panic!("expected analyze");
        }
    }

    #[test]
    fn cli_parse_analyze_all_flags() {
        let cli = Cli::try_parse_from([
            "pgap",
            "-vv",
            "--log-json",
            "--config",
            "pgap.yaml",
            "analyze",
            "doc.md",
            "--taxonomy",
            "tax.yaml",
            "--name",
            "Handbook",
            "--id",
            "hb-1",
            "--format",
            "recommendations",
            "-o",
            "out.md",
            "--fail-under",
            "70",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("pgap.yaml")));
        if let Commands::Analyze(args) = cli.command {
            assert_eq!(args.taxonomy, Some(PathBuf::from("tax.yaml")));
            assert_eq!(args.name.as_deref(), Some("Handbook"));
            assert_eq!(args.id.as_deref(), Some("hb-1"));
            assert_eq!(args.format, OutputFormat::Recommendations);
            assert_eq!(args.output, Some(PathBuf::from("out.md")));
            assert_eq!(args.fail_under, Some(70));
        } else {
            panic!("expected analyze");
        }
    }

    #[test]
    fn cli_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["pgap", "analyze", "doc.txt", "-v", "--log-json"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(cli.log_json);
    }

    #[test]
    fn cli_rejects_fail_under_above_100() {
        assert!(Cli::try_parse_from(["pgap", "analyze", "doc.txt", "--fail-under", "101"]).is_err());
    }

    #[test]
    fn cli_rejects_unknown_format() {
        assert!(Cli::try_parse_from(["pgap", "analyze", "doc.txt", "--format", "pdf"]).is_err());
    }

    #[test]
    fn cli_parse_taxonomy_validate() {
        let cli = Cli::try_parse_from(["pgap", "taxonomy", "validate", "tax.yaml"]).unwrap();
        if let Commands::Taxonomy(args) = cli.command {
            assert!(matches!(
                args.command,
                TaxonomyCommand::Validate { path: Some(ref p) } if p == &PathBuf::from("tax.yaml")
            ));
        } else {
            panic!("expected taxonomy");
        }
    }

    #[test]
    fn cli_parse_taxonomy_show_default() {
        let cli = Cli::try_parse_from(["pgap", "taxonomy", "show", "--content"]).unwrap();
        if let Commands::Taxonomy(args) = cli.command {
            assert!(matches!(
                args.command,
                TaxonomyCommand::Show { path: None, content: true }
            ));
        } else {
            panic!("expected taxonomy");
        }
    }

    #[test]
    fn verbosity_maps_to_filter() {
        assert_eq!(filter_for(0).to_string(), "warn");
        assert_eq!(filter_for(1).to_string(), "info");
        assert_eq!(filter_for(3).to_string(), "trace");
    }

    #[test]
    fn cli_requires_subcommand() {
        assert!(Cli::try_parse_from(["pgap"]).is_err());
    }
}
