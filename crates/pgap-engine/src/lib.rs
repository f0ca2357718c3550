//! # pgap-engine: The Analysis Engine
//!
//! Orchestrates one analysis per request over a shared, read-only
//! [`Taxonomy`](pgap_taxonomy::Taxonomy):
//!
//! - [`analyzer`]: [`Analyzer`], the pipeline itself, with per-domain
//!   parallel scoring, retries, a deadline and caller cancellation.
//! - [`stage`]: the forward-only [`AnalysisStage`] machine.
//! - [`flight`]: single-flight sharing of concurrent requests for one
//!   document.
//! - [`cache`]: bounded FIFO cache of completed reports.
//! - [`config`]: [`AnalyzerConfig`], YAML plus `PGAP_*` overrides.
//!
//! ```no_run
//! use std::sync::Arc;
//! use pgap_engine::{AnalysisRequest, Analyzer, AnalyzerConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let taxonomy = Arc::new(pgap_taxonomy::standard_policies()?);
//! let analyzer = Analyzer::from_config(taxonomy, &AnalyzerConfig::default())?;
//! let report = analyzer
//!     .analyze(AnalysisRequest::from_text("handbook.txt", "All passwords must ..."))
//!     .await?;
//! println!("{}%", report.overall_score);
//! # Ok(())
//! # }
//! ```

pub mod analyzer;
pub mod cache;
pub mod config;
pub mod error;
pub mod flight;
pub mod request;
pub mod stage;

pub use analyzer::Analyzer;
pub use cache::ReportCache;
pub use config::{load_config, AnalyzerConfig};
pub use error::{AnalysisError, ConfigError};
pub use flight::{FlightOutcome, SingleFlight};
pub use request::{AnalysisRequest, DocumentInput, ReportKey};
pub use stage::{AnalysisRun, AnalysisStage, StageError, StageTracker, StageTransition};
