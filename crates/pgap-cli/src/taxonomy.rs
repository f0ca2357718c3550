//! # Taxonomy CLI: Validate and inspect reference taxonomies.
//!
//! ```bash
//! # Validate a taxonomy file:
//! pgap taxonomy validate policies.yaml
//!
//! # Print the bundled standard taxonomy:
//! pgap taxonomy show
//! ```

use std::fmt::{self, Write as _};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Subcommand};

use pgap_taxonomy::{load_taxonomy, standard_policies, Taxonomy, TaxonomyError};

use crate::EXIT_CHECK_FAILED;

/// Taxonomy subcommand arguments.
#[derive(Args, Debug)]
pub struct TaxonomyArgs {
    #[command(subcommand)]
    pub command: TaxonomyCommand,
}

/// Available taxonomy subcommands.
#[derive(Subcommand, Debug)]
pub enum TaxonomyCommand {
    /// Validate a taxonomy file. Without a path, validates the bundled
    /// standard taxonomy.
    Validate {
        /// Path to a `.yaml`, `.yml` or `.json` taxonomy.
        path: Option<PathBuf>,
    },

    /// Print the domain / section / clause outline of a taxonomy.
    Show {
        /// Path to a taxonomy file. Defaults to the bundled standard set.
        path: Option<PathBuf>,

        /// Include each clause's canonical text.
        #[arg(long)]
        content: bool,
    },
}

/// Load the taxonomy at `path`, or the bundled standard set.
pub fn load_or_standard(path: Option<&Path>) -> Result<Taxonomy, TaxonomyError> {
    match path {
        Some(path) => load_taxonomy(path),
        None => standard_policies(),
    }
}

/// Execute the taxonomy subcommand.
pub fn run_taxonomy(args: &TaxonomyArgs) -> Result<u8> {
    match &args.command {
        TaxonomyCommand::Validate { path } => run_validate(path.as_deref()),
        TaxonomyCommand::Show { path, content } => {
            let taxonomy = load_or_standard(path.as_deref())?;
            print!("{}", render_outline(&taxonomy, *content)?);
            Ok(0)
        }
    }
}

fn run_validate(path: Option<&Path>) -> Result<u8> {
    let source = path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "<standard>".to_string());

    match load_or_standard(path) {
        Ok(taxonomy) => {
            println!(
                "OK: {source} ({}: {} domains, {} sections, {} clauses)",
                taxonomy.version(),
                taxonomy.domain_count(),
                taxonomy.section_count(),
                taxonomy.clause_count()
            );
            Ok(0)
        }
        Err(e) if is_operational(&e) => Err(e.into()),
        Err(e) => {
            println!("FAIL: {source}: {e}");
            Ok(EXIT_CHECK_FAILED)
        }
    }
}

/// Whether a load failure is about reaching the file rather than its
/// content.
fn is_operational(error: &TaxonomyError) -> bool {
    matches!(
        error,
        TaxonomyError::FileNotFound { .. }
            | TaxonomyError::Io { .. }
            | TaxonomyError::UnsupportedFormat { .. }
    )
}

/// Indented outline of a taxonomy.
pub fn render_outline(taxonomy: &Taxonomy, with_content: bool) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "taxonomy {}", taxonomy.version())?;
    for domain in taxonomy.domains() {
        writeln!(out, "{}", domain.name())?;
        for section in domain.sections() {
            writeln!(out, "  {}", section.title())?;
            for clause in section.clauses() {
                if clause.weight() == 1.0 {
                    writeln!(out, "    - {}", clause.title())?;
                } else {
                    writeln!(out, "    - {} (weight {})", clause.title(), clause.weight())?;
                }
                if with_content {
                    writeln!(out, "      {}", clause.content().trim())?;
                }
            }
        }
    }
    Ok(out)
}
