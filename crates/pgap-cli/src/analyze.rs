//! # Analyze CLI: Run a gap analysis over a text document.
//!
//! ```bash
//! # JSON report on stdout:
//! pgap analyze handbook.txt
//!
//! # Markdown report against a custom taxonomy:
//! pgap analyze handbook.md --taxonomy policies.yaml --format markdown -o report.md
//!
//! # CI gate: exit 1 when the overall score is below 70%:
//! pgap analyze handbook.txt --fail-under 70
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use tokio_util::sync::CancellationToken;

use pgap_analysis::{render_markdown, render_recommendations, AnalysisReport};
use pgap_engine::{load_config, AnalysisRequest, Analyzer};

use crate::taxonomy::load_or_standard;
use crate::EXIT_CHECK_FAILED;

/// Report rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The structured report as pretty-printed JSON.
    Json,
    /// Scores, gaps and recommendations as a markdown document.
    Markdown,
    /// Only the recommendations, grouped by domain and section.
    Recommendations,
}

/// Arguments for `pgap analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Plain-text or markdown document to analyze.
    pub file: PathBuf,

    /// Taxonomy file to compare against. Defaults to the bundled standard
    /// policy set.
    #[arg(long)]
    pub taxonomy: Option<PathBuf>,

    /// Display name for the report. Defaults to the file name.
    #[arg(long)]
    pub name: Option<String>,

    /// Document identity. Defaults to a digest of the file content.
    #[arg(long)]
    pub id: Option<String>,

    /// Output format.
    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Write the report here instead of stdout.
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Exit with status 1 when the overall score is below this percentage.
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub fail_under: Option<u8>,
}

/// Execute `pgap analyze`.
pub fn run_analyze(args: &AnalyzeArgs, config_path: Option<&Path>) -> Result<u8> {
    let config = load_config(config_path).context("failed to load analyzer configuration")?;
    let taxonomy = load_or_standard(args.taxonomy.as_deref()).context("failed to load taxonomy")?;

    let text = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read document: {}", args.file.display()))?;
    let name = args.name.clone().unwrap_or_else(|| display_name(&args.file));
    let mut request = AnalysisRequest::from_text(name, text);
    if let Some(id) = &args.id {
        request = request.with_id(id.as_str()).context("invalid --id")?;
    }

    let analyzer = Analyzer::from_config(Arc::new(taxonomy), &config)
        .context("failed to build analyzer")?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    let report = runtime.block_on(async {
        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("interrupted, cancelling analysis");
                on_interrupt.cancel();
            }
        });
        analyzer.analyze_with_cancel(request, &cancel).await
    })?;

    let summary = report.summary();
    tracing::info!(
        document_id = %report.document_id,
        overall_score = summary.overall_score,
        gaps = summary.gaps,
        recommendations = summary.recommendations,
        "analysis finished"
    );

    let rendered = render_report(&report, args.format)?;
    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)
                .with_context(|| format!("failed to write report: {}", path.display()))?;
            tracing::info!(path = %path.display(), "report written");
        }
        None => print!("{rendered}"),
    }

    if let Some(threshold) = args.fail_under {
        if !report.meets(threshold) {
            tracing::warn!(
                overall_score = report.overall_score,
                threshold,
                "overall score below --fail-under"
            );
            return Ok(EXIT_CHECK_FAILED);
        }
    }
    Ok(0)
}

/// Render a report in the requested format. Output always ends with a
/// newline.
pub fn render_report(report: &AnalysisReport, format: OutputFormat) -> Result<String> {
    let mut rendered = match format {
        OutputFormat::Json => report
            .to_json_pretty()
            .context("failed to serialize report")?,
        OutputFormat::Markdown => render_markdown(report).context("failed to render markdown")?,
        OutputFormat::Recommendations => {
            render_recommendations(&report.gaps, &report.recommendations)
                .context("failed to render recommendations")?
        }
    };
    if !rendered.ends_with('\n') {
        rendered.push('\n');
    }
    Ok(rendered)
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
