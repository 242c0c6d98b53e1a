//! Serializable evaluation output.
//!
//! An [`Evaluation`] freezes one run of the evaluator: the raw and
//! normalized value of every metric, the generated suggestions, the
//! combined risk, and the weight vector that was actually applied.
//! Records round-trip through JSON for storage and the CLI.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::evaluator::EvaluationMode;
use crate::metrics::{MetricKind, RiskMetric};
use crate::project::ProjectStatus;
use crate::suggest::{Severity, Suggestion};
use crate::weights::WeightVector;

/// One metric's reading inside an evaluation record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MetricReport {
    pub kind: MetricKind,
    pub label: String,
    pub description: String,
    /// Risk in `[0, 1]` after the metric's normalization law.
    pub value: f64,
    /// Reading in the metric's own range, before normalization.
    pub raw: f64,
    pub weight: f64,
}

impl MetricReport {
    pub fn from_metric(metric: &RiskMetric) -> Self {
        Self {
            kind: metric.kind,
            label: metric.kind.label().to_string(),
            description: metric.kind.description().to_string(),
            value: metric.normalized(),
            raw: metric.value,
            weight: metric.weight,
        }
    }

    /// This metric's share of the weighted sum before division.
    pub fn contribution(&self) -> f64 {
        self.value * self.weight
    }
}

/// A suggestion flattened to strings for storage and display.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionReport {
    pub kind: String,
    pub severity: Severity,
    pub description: String,
    pub resolution: String,
    #[serde(default)]
    pub extras: BTreeMap<String, String>,
}

impl From<&Suggestion> for SuggestionReport {
    fn from(suggestion: &Suggestion) -> Self {
        Self {
            kind: suggestion.kind().to_string(),
            severity: suggestion.severity(),
            description: suggestion.description(),
            resolution: suggestion.resolution(),
            extras: suggestion.extras(),
        }
    }
}

/// A complete evaluation of one project at one point in time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Evaluation {
    pub project_id: Uuid,
    pub mode: EvaluationMode,
    /// Metrics ordered by descending weight.
    pub metrics: Vec<MetricReport>,
    /// Weighted mean of the normalized metrics, in `[0, 1]`.
    pub risk: f64,
    /// Scheduled completion in days from the project start, if any task
    /// carries a schedule.
    #[serde(default)]
    pub projected_finish_days: Option<f64>,
    pub suggestions: Vec<SuggestionReport>,
    pub status: ProjectStatus,
    /// The (noise-adjusted) weight vector applied to this run.
    pub weights: WeightVector,
    pub evaluated_at: DateTime<Utc>,
}

impl Evaluation {
    /// Suggestions at or above the given severity.
    pub fn suggestions_at_least(
        &self,
        severity: Severity,
    ) -> impl Iterator<Item = &SuggestionReport> {
        self.suggestions.iter().filter(move |s| s.severity >= severity)
    }

    /// The metric contributing the most weighted risk, if any.
    pub fn dominant_metric(&self) -> Option<&MetricReport> {
        self.metrics
            .iter()
            .max_by(|a, b| a.contribution().total_cmp(&b.contribution()))
    }
}
