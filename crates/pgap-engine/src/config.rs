//! # Analyzer Configuration
//!
//! [`AnalyzerConfig`] is read from YAML with every field optional, then
//! overridden from `PGAP_*` environment variables, then validated:
//!
//! ```yaml
//! thresholds:
//!   section_gap: 0.6
//!   clause_missing: 0.5
//!   domain_gap: 0.4        # optional
//! aggregation: mean        # or clause_weighted
//! retry:
//!   max_retries: 3
//!   base_delay_ms: 200
//! timeout_secs: 120        # 0 disables the pipeline timeout
//! cache_capacity: 64       # 0 disables the report cache
//! max_segment_chars: 1200  # optional
//! recommendation_template: "Consider adding language about {clause} to strengthen your {section} policy."
//! scorer:
//!   kind: lexical
//! ```
//!
//! | variable                        | field                       |
//! |---------------------------------|-----------------------------|
//! | `PGAP_SECTION_GAP_THRESHOLD`    | `thresholds.section_gap`    |
//! | `PGAP_CLAUSE_MISSING_THRESHOLD` | `thresholds.clause_missing` |
//! | `PGAP_DOMAIN_GAP_THRESHOLD`     | `thresholds.domain_gap`     |
//! | `PGAP_TIMEOUT_SECS`             | `timeout_secs`              |
//! | `PGAP_MAX_RETRIES`              | `retry.max_retries`         |
//! | `PGAP_CACHE_CAPACITY`           | `cache_capacity`            |

use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use pgap_analysis::{AggregationMode, GapThresholds, RecommendationTemplate, DEFAULT_TEMPLATE};
use pgap_scoring::{RetryPolicy, ScorerConfig};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default pipeline timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Default report cache capacity.
pub const DEFAULT_CACHE_CAPACITY: usize = 64;

/// Analyzer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalyzerConfig {
    pub thresholds: GapThresholds,
    pub aggregation: AggregationMode,
    pub retry: RetryPolicy,
    /// Whole-pipeline deadline in seconds; 0 disables it.
    pub timeout_secs: u64,
    /// Completed reports kept; 0 disables caching.
    pub cache_capacity: usize,
    /// Split paragraphs longer than this many characters.
    pub max_segment_chars: Option<usize>,
    pub recommendation_template: String,
    pub scorer: ScorerConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            thresholds: GapThresholds::default(),
            aggregation: AggregationMode::default(),
            retry: RetryPolicy::default(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            max_segment_chars: None,
            recommendation_template: DEFAULT_TEMPLATE.to_string(),
            scorer: ScorerConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    /// Parse YAML. Missing fields take defaults.
    pub fn from_yaml_str(content: &str, source: &Path) -> Result<Self, ConfigError> {
        // An empty document parses as unit, not as a mapping.
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(content).map_err(|source_err| ConfigError::Yaml {
            path: source.to_path_buf(),
            source: source_err,
        })
    }

    /// Read and parse a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&content, path)
    }

    /// Apply `PGAP_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|var| std::env::var(var).ok())
    }

    /// Apply `PGAP_*` overrides from `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = parse_var(&lookup, "PGAP_SECTION_GAP_THRESHOLD")? {
            self.thresholds.section_gap = v;
        }
        if let Some(v) = parse_var(&lookup, "PGAP_CLAUSE_MISSING_THRESHOLD")? {
            self.thresholds.clause_missing = v;
        }
        if let Some(v) = parse_var(&lookup, "PGAP_DOMAIN_GAP_THRESHOLD")? {
            self.thresholds.domain_gap = Some(v);
        }
        if let Some(v) = parse_var(&lookup, "PGAP_TIMEOUT_SECS")? {
            self.timeout_secs = v;
        }
        if let Some(v) = parse_var(&lookup, "PGAP_MAX_RETRIES")? {
            self.retry.max_retries = v;
        }
        if let Some(v) = parse_var(&lookup, "PGAP_CACHE_CAPACITY")? {
            self.cache_capacity = v;
        }
        Ok(())
    }

    /// Check thresholds and the recommendation template.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.thresholds.validate()?;
        self.template()?;
        Ok(())
    }

    /// The parsed recommendation template.
    pub fn template(&self) -> Result<RecommendationTemplate, ConfigError> {
        Ok(RecommendationTemplate::new(self.recommendation_template.clone())?)
    }

    /// The pipeline deadline, if any.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn parse_var<T, F>(lookup: &F, var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidEnv {
                var: var.to_string(),
                value: raw,
            }),
    }
}

/// Load configuration: `path` (or defaults), then environment, then
/// validation.
pub fn load_config(path: Option<&Path>) -> Result<AnalyzerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    config.apply_env()?;
    config.validate()?;
    tracing::debug!(?config, "analyzer configuration loaded");
    Ok(config)
}
