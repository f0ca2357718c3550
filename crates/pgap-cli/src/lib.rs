//! # pgap-cli: Policy Gap Analysis CLI
//!
//! Provides the `pgap` command-line interface.
//!
//! ## Subcommands
//!
//! - `pgap analyze`: Compare a text document against the taxonomy and emit
//!   the report as JSON, markdown, or a recommendations checklist.
//! - `pgap taxonomy`: Validate a taxonomy file or print its outline.
//!
//! ```bash
//! pgap analyze handbook.txt --format markdown --output report.md
//! pgap analyze handbook.txt --fail-under 70
//! pgap taxonomy validate policies.yaml
//! pgap taxonomy show
//! ```
//!
//! ## Exit codes
//!
//! `0` success, `1` score below `--fail-under` or an invalid taxonomy,
//! `2` any operational error (unreadable file, bad configuration, failed
//! analysis).

pub mod analyze;
pub mod taxonomy;

/// Exit code for a completed run that did not pass its check.
pub const EXIT_CHECK_FAILED: u8 = 1;

/// Exit code for an operational error.
pub const EXIT_ERROR: u8 = 2;
