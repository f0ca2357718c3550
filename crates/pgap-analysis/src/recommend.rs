//! # Recommendation Generation
//!
//! One [`Recommendation`] per missing clause of every gap record, in gap
//! order. Text comes from a [`RecommendationTemplate`] with the
//! placeholders `{domain}`, `{section}` and `{clause}`, substituted with
//! lower-cased titles. `{{` and `}}` produce literal braces.

use serde::{Deserialize, Serialize};

use crate::error::ReportError;
use crate::gaps::GapRecord;

/// The stock remediation wording.
pub const DEFAULT_TEMPLATE: &str =
    "Consider adding language about {clause} to strengthen your {section} policy.";

/// A remediation statement for one missing clause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    /// Domain name.
    pub domain: String,
    /// Section title.
    pub section: String,
    /// Missing clause title.
    pub clause: String,
    /// Remediation text.
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Piece {
    Literal(String),
    Domain,
    Section,
    Clause,
}

/// A parsed recommendation template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationTemplate {
    source: String,
    pieces: Vec<Piece>,
}

impl RecommendationTemplate {
    /// Parse a template.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::InvalidTemplate`] for an unknown or unclosed
    /// placeholder, or when `{clause}` is absent.
    pub fn new(source: impl Into<String>) -> Result<Self, ReportError> {
        let source = source.into();
        let pieces = parse(&source)?;
        if !pieces.contains(&Piece::Clause) {
            return Err(ReportError::InvalidTemplate(format!(
                "{source:?} does not contain {{clause}}"
            )));
        }
        Ok(Self { source, pieces })
    }

    /// The template text as configured.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Render for one clause. Titles are lower-cased.
    pub fn render(&self, domain: &str, section: &str, clause: &str) -> String {
        let mut out = String::with_capacity(self.source.len() + clause.len() + section.len());
        for piece in &self.pieces {
            match piece {
                Piece::Literal(text) => out.push_str(text),
                Piece::Domain => out.push_str(&domain.to_lowercase()),
                Piece::Section => out.push_str(&section.to_lowercase()),
                Piece::Clause => out.push_str(&clause.to_lowercase()),
            }
        }
        out
    }
}

impl Default for RecommendationTemplate {
    fn default() -> Self {
        Self {
            source: DEFAULT_TEMPLATE.to_string(),
            pieces: vec![
                Piece::Literal("Consider adding language about ".into()),
                Piece::Clause,
                Piece::Literal(" to strengthen your ".into()),
                Piece::Section,
                Piece::Literal(" policy.".into()),
            ],
        }
    }
}

fn parse(source: &str) -> Result<Vec<Piece>, ReportError> {
    let mut pieces = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' if chars.peek() == Some(&'{') => {
                chars.next();
                literal.push('{');
            }
            '}' if chars.peek() == Some(&'}') => {
                chars.next();
                literal.push('}');
            }
            '{' => {
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(ch) => name.push(ch),
                        None => {
                            return Err(ReportError::InvalidTemplate(format!(
                                "unclosed placeholder in {source:?}"
                            )))
                        }
                    }
                }
                let piece = match name.as_str() {
                    "domain" => Piece::Domain,
                    "section" => Piece::Section,
                    "clause" => Piece::Clause,
                    other => {
                        return Err(ReportError::InvalidTemplate(format!(
                            "unknown placeholder {{{other}}}"
                        )))
                    }
                };
                if !literal.is_empty() {
                    pieces.push(Piece::Literal(std::mem::take(&mut literal)));
                }
                pieces.push(piece);
            }
            '}' => {
                return Err(ReportError::InvalidTemplate(format!(
                    "unmatched '}}' in {source:?}"
                )))
            }
            other => literal.push(other),
        }
    }
    if !literal.is_empty() {
        pieces.push(Piece::Literal(literal));
    }
    Ok(pieces)
}

/// Produces recommendations from gap records.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecommendationGenerator {
    template: RecommendationTemplate,
}

impl RecommendationGenerator {
    /// Generator using `template`.
    pub fn new(template: RecommendationTemplate) -> Self {
        Self { template }
    }

    /// The template in use.
    pub fn template(&self) -> &RecommendationTemplate {
        &self.template
    }

    /// One recommendation per missing clause, in gap order.
    pub fn generate(&self, gaps: &[GapRecord]) -> Vec<Recommendation> {
        gaps.iter()
            .flat_map(|gap| {
                gap.missing_clauses.iter().map(move |clause| Recommendation {
                    domain: gap.domain.clone(),
                    section: gap.section.clone(),
                    clause: clause.clone(),
                    text: self.template.render(&gap.domain, &gap.section, clause),
                })
            })
            .collect()
    }
}
