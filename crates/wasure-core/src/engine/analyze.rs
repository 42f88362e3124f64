//! Output analyzer: regex scraping of untrusted process output.
//!
//! Patterns are compiled once per (benchmark, runtime) pair. Missing matches
//! are never errors: an unmatched score is 0 and an unmatched stat is omitted.

use crate::errors::{Result, WasureError};
use crate::model::{BenchmarkSpec, RuntimeSpec};
use regex::Regex;
use indexmap::IndexMap;

pub const SCORE_GROUP: &str = "score";

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    /// False when an output validator is declared and did not match.
    pub valid: bool,
    pub score: f64,
    pub stats: IndexMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct OutputPatterns {
    validator: Option<Regex>,
    score: Option<Regex>,
    stats: Vec<(String, Regex)>,
}

fn compile(field: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| WasureError::InvalidPattern {
        field: field.to_string(),
        pattern: pattern.to_string(),
        source,
    })
}

fn compile_with_group(field: &str, pattern: &str, group: &str) -> Result<Regex> {
    let re = compile(field, pattern)?;
    if !re.capture_names().flatten().any(|name| name == group) {
        return Err(WasureError::MissingCaptureGroup {
            field: field.to_string(),
            pattern: pattern.to_string(),
            group: group.to_string(),
        });
    }
    Ok(re)
}

impl OutputPatterns {
    pub fn compile(benchmark: &BenchmarkSpec, runtime: &RuntimeSpec) -> Result<Self> {
        let validator = benchmark
            .output_validator
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| compile("output-validator", p))
            .transpose()?;

        let score = benchmark
            .score_parser
            .as_deref()
            .filter(|p| !p.is_empty())
            .map(|p| compile_with_group("score-parser", p, SCORE_GROUP))
            .transpose()?;

        let stats = runtime
            .stats_parser
            .iter()
            .map(|(name, pattern)| {
                compile_with_group(&format!("stats-parser.{name}"), pattern, name)
                    .map(|re| (name.clone(), re))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            validator,
            score,
            stats,
        })
    }

    pub fn analyze(&self, output: &str) -> Analysis {
        if let Some(validator) = &self.validator {
            if !validator.is_match(output) {
                return Analysis {
                    valid: false,
                    score: 0.0,
                    stats: IndexMap::new(),
                };
            }
        }

        let score = self
            .score
            .as_ref()
            .map(|re| parse_score(output, re))
            .unwrap_or(0.0);

        Analysis {
            valid: true,
            score,
            stats: extract_named(output, &self.stats),
        }
    }
}

fn parse_score(output: &str, re: &Regex) -> f64 {
    let Some(raw) = re
        .captures(output)
        .and_then(|caps| caps.name(SCORE_GROUP))
        .map(|m| m.as_str())
    else {
        return 0.0;
    };
    match raw.trim().parse::<f64>() {
        Ok(score) if score.is_finite() => score,
        _ => {
            tracing::warn!(raw, "score matched but is not a number; using 0");
            0.0
        }
    }
}

/// Searches each `(name, regex)` independently and keeps the capture group
/// called `name`. Patterns without a match are left out of the result.
pub fn extract_named(text: &str, patterns: &[(String, Regex)]) -> IndexMap<String, String> {
    patterns
        .iter()
        .filter_map(|(name, re)| {
            let caps = re.captures(text)?;
            let value = caps.name(name)?;
            Some((name.clone(), value.as_str().to_string()))
        })
        .collect()
}
