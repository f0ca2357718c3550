//! # Markdown Export
//!
//! Deterministic markdown renderings of a report. Percentages are rounded to
//! the nearest integer and everything is listed in taxonomy order.
//!
//! [`render_recommendations`] produces the standalone recommendation
//! download, one group per gap record (a gap without missing clauses keeps
//! its heading):
//!
//! ```text
//! # Policy Recommendations
//!
//! ## {domain} - {section}
//!
//! ### {clause}
//! {text}
//! ```

use std::fmt::{self, Write};

use pgap_core::Score;

use crate::gaps::GapRecord;
use crate::recommend::Recommendation;
use crate::report::AnalysisReport;

const NO_RECOMMENDATIONS: &str =
    "No recommendations needed. The policy appears comprehensive and aligned with the reference taxonomy.";

fn pct(score: Score) -> String {
    format!("{}%", score.percent())
}

/// Write the recommendations document with top-level heading depth
/// `level` (1 gives `#`).
fn write_recommendations(
    out: &mut impl Write,
    gaps: &[GapRecord],
    recommendations: &[Recommendation],
    level: usize,
) -> fmt::Result {
    let h = |extra: usize| "#".repeat(level + extra);
    writeln!(out, "{} Policy Recommendations\n", h(0))?;
    if gaps.is_empty() {
        return writeln!(out, "{NO_RECOMMENDATIONS}");
    }
    for gap in gaps {
        writeln!(out, "{} {} - {}\n", h(1), gap.domain, gap.section)?;
        for rec in recommendations
            .iter()
            .filter(|r| r.domain == gap.domain && r.section == gap.section)
        {
            writeln!(out, "{} {}\n{}\n", h(2), rec.clause, rec.text)?;
        }
        writeln!(out)?;
    }
    Ok(())
}

/// Write the full report as markdown.
pub fn write_markdown(out: &mut impl Write, report: &AnalysisReport) -> fmt::Result {
    writeln!(out, "# Policy Gap Analysis: {}\n", report.document_name)?;
    writeln!(out, "- Document: `{}`", report.document_id)?;
    writeln!(out, "- Taxonomy: `{}`", report.taxonomy_version)?;
    writeln!(out, "- Overall score: {}%", report.overall_score)?;
    writeln!(out, "- Compliance: {}\n", report.compliance())?;

    writeln!(out, "## Domain Scores\n")?;
    writeln!(out, "| Domain | Score | Alignment |")?;
    writeln!(out, "|--------|-------|-----------|")?;
    for domain in &report.domains {
        writeln!(out, "| {} | {} | {} |", domain.domain, pct(domain.score), domain.alignment)?;
    }
    writeln!(out)?;

    for domain in &report.domains {
        writeln!(out, "## {} ({})\n", domain.domain, pct(domain.score))?;
        for section in &domain.sections {
            writeln!(out, "### {} ({})\n", section.section, pct(section.score))?;
            for clause in &section.clauses {
                writeln!(out, "- {}: {}", clause.clause, pct(clause.score))?;
            }
            writeln!(out)?;
        }
    }

    writeln!(out, "## Gaps\n")?;
    if report.gaps.is_empty() {
        writeln!(out, "No section gaps found.\n")?;
    } else {
        for gap in &report.gaps {
            write!(
                out,
                "- **{} / {}** ({}, {})",
                gap.domain,
                gap.section,
                pct(gap.score),
                gap.severity
            )?;
            if gap.missing_clauses.is_empty() {
                writeln!(out)?;
            } else {
                writeln!(out, ": missing {}", gap.missing_clauses.join(", "))?;
            }
        }
        writeln!(out)?;
    }

    if !report.domain_gaps.is_empty() {
        writeln!(out, "## Domain Gaps\n")?;
        for gap in &report.domain_gaps {
            writeln!(out, "- **{}** ({})", gap.domain, pct(gap.score))?;
        }
        writeln!(out)?;
    }

    write_recommendations(out, &report.gaps, &report.recommendations, 2)
}

/// The full report as a markdown string.
///
/// # Errors
///
/// Propagates formatter failures.
pub fn render_markdown(report: &AnalysisReport) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_markdown(&mut out, report)?;
    Ok(out)
}

/// The recommendations-only markdown download, grouped by gap.
///
/// # Errors
///
/// Propagates formatter failures.
pub fn render_recommendations(
    gaps: &[GapRecord],
    recommendations: &[Recommendation],
) -> Result<String, fmt::Error> {
    let mut out = String::new();
    write_recommendations(&mut out, gaps, recommendations, 1)?;
    Ok(out)
}
