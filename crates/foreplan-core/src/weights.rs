//! Adaptive metric weights.
//!
//! Eight metric kinds carry a learned coefficient; the remaining kinds use
//! a fixed weight. Each evaluation perturbs the persisted base vector with
//! uniform noise that shrinks as more projects are evaluated, and every
//! [`LEARNING_WINDOW`]-th terminal evaluation folds the vectors of accurate
//! past evaluations back into the base. Learning itself is pure; the
//! storage layer owns the base vector and applies updates inside a single
//! transaction so concurrent evaluations cannot race on it.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::metrics::MetricKind;

/// Terminal evaluations between two learning steps.
pub const LEARNING_WINDOW: usize = 5;

/// Weight for metric kinds that sit outside the adaptive vector
/// (scope creep, structural complexity, commit frequency).
pub const FIXED_METRIC_WEIGHT: f64 = 0.5;

fn clamp01(value: f64) -> f64 {
    value.clamp(0.0, 1.0)
}

/// Learned weight coefficients, one per adaptive metric kind, each in `[0, 1]`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct WeightVector {
    /// Weight for budget usage
    pub budget_usage: f64,
    /// Weight for the schedule performance index
    pub schedule_performance_index: f64,
    /// Weight for the cost performance index
    pub cost_performance_index: f64,
    /// Weight for the probability of exceeding the time frame
    pub probability_exceed_timeframe: f64,
    /// Weight for missing skill coverage
    pub missing_skill_coverage: f64,
    /// Weight for worker utilization
    pub worker_utilization: f64,
    /// Weight for the test coverage gap
    pub test_coverage: f64,
    /// Weight for the task duration error
    pub task_duration_error: f64,
}

impl WeightVector {
    /// Every coefficient at full trust.
    pub fn balanced() -> Self {
        WeightVector {
            budget_usage: 1.0,
            schedule_performance_index: 1.0,
            cost_performance_index: 1.0,
            probability_exceed_timeframe: 1.0,
            missing_skill_coverage: 1.0,
            worker_utilization: 1.0,
            test_coverage: 1.0,
            task_duration_error: 1.0,
        }
    }

    /// Coefficient for an adaptive kind; `None` for fixed-weight kinds.
    pub fn get(&self, kind: MetricKind) -> Option<f64> {
        match kind {
            MetricKind::BudgetUsage => Some(self.budget_usage),
            MetricKind::SchedulePerformanceIndex => Some(self.schedule_performance_index),
            MetricKind::CostPerformanceIndex => Some(self.cost_performance_index),
            MetricKind::ProbabilityExceedTimeframe => Some(self.probability_exceed_timeframe),
            MetricKind::MissingSkillCoverage => Some(self.missing_skill_coverage),
            MetricKind::WorkerUtilization => Some(self.worker_utilization),
            MetricKind::TestCoverage => Some(self.test_coverage),
            MetricKind::TaskDurationError => Some(self.task_duration_error),
            MetricKind::ScopeCreep
            | MetricKind::StructuralComplexity
            | MetricKind::CommitFrequency => None,
        }
    }

    /// Weight used in the combined risk for any kind.
    pub fn weight_for(&self, kind: MetricKind) -> f64 {
        self.get(kind).unwrap_or(FIXED_METRIC_WEIGHT)
    }

    /// Every coefficient bounded into `[0, 1]`.
    pub fn clamped(self) -> Self {
        self.map(clamp01)
    }

    /// Check all coefficients are finite and within `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in self.entries() {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(format!("weight '{name}' out of range: {value}"));
            }
        }
        Ok(())
    }

    /// Perturbed copy for one evaluation run.
    ///
    /// Adds `uniform(-0.5, 0.5) / (projects_so_far + 1)` to every
    /// coefficient and clamps, so the exploration amplitude shrinks as the
    /// engine sees more projects.
    pub fn noisy(&self, projects_so_far: u32, rng: &mut impl Rng) -> Self {
        let attenuation = f64::from(projects_so_far) + 1.0;
        let mut jittered = *self;
        jittered.apply(|value| clamp01(value + rng.gen_range(-0.5..0.5) / attenuation));
        jittered
    }

    /// Named coefficient list, in declaration order.
    pub fn entries(&self) -> [(&'static str, f64); 8] {
        [
            ("budget_usage", self.budget_usage),
            ("schedule_performance_index", self.schedule_performance_index),
            ("cost_performance_index", self.cost_performance_index),
            ("probability_exceed_timeframe", self.probability_exceed_timeframe),
            ("missing_skill_coverage", self.missing_skill_coverage),
            ("worker_utilization", self.worker_utilization),
            ("test_coverage", self.test_coverage),
            ("task_duration_error", self.task_duration_error),
        ]
    }

    fn map(mut self, f: impl Fn(f64) -> f64) -> Self {
        self.apply(f);
        self
    }

    fn apply(&mut self, mut f: impl FnMut(f64) -> f64) {
        self.budget_usage = f(self.budget_usage);
        self.schedule_performance_index = f(self.schedule_performance_index);
        self.cost_performance_index = f(self.cost_performance_index);
        self.probability_exceed_timeframe = f(self.probability_exceed_timeframe);
        self.missing_skill_coverage = f(self.missing_skill_coverage);
        self.worker_utilization = f(self.worker_utilization);
        self.test_coverage = f(self.test_coverage);
        self.task_duration_error = f(self.task_duration_error);
    }

    fn fold_with(&self, other: &Self, f: impl Fn(f64, f64) -> f64) -> Self {
        WeightVector {
            budget_usage: f(self.budget_usage, other.budget_usage),
            schedule_performance_index: f(
                self.schedule_performance_index,
                other.schedule_performance_index,
            ),
            cost_performance_index: f(self.cost_performance_index, other.cost_performance_index),
            probability_exceed_timeframe: f(
                self.probability_exceed_timeframe,
                other.probability_exceed_timeframe,
            ),
            missing_skill_coverage: f(self.missing_skill_coverage, other.missing_skill_coverage),
            worker_utilization: f(self.worker_utilization, other.worker_utilization),
            test_coverage: f(self.test_coverage, other.test_coverage),
            task_duration_error: f(self.task_duration_error, other.task_duration_error),
        }
    }
}

impl Default for WeightVector {
    fn default() -> Self {
        WeightVector::balanced()
    }
}

/// One terminal evaluation remembered for weight learning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct EvaluationSample {
    /// Combined risk the evaluation reported
    pub risk: f64,
    /// Whether the project completed all of its tasks
    pub completed: bool,
    /// The noisy vector the evaluation ran with
    pub weights: WeightVector,
}

impl EvaluationSample {
    /// Whether the evaluation counts toward learning.
    ///
    /// Both branches gate on completion, so this reduces to "completed with
    /// risk away from 0.5"; the direction of the risk value does not
    /// participate, and an evaluation that landed exactly on 0.5 never
    /// counts.
    pub fn is_accurate(&self) -> bool {
        (self.risk > 0.5 && self.completed) || (self.risk < 0.5 && self.completed)
    }
}

/// Fold the accurate samples into the base, most recent weighing heaviest.
///
/// Each accurate sample halves the distance between the accumulator and its
/// vector: `acc = (acc + sample) / 2`. Pure; with no accurate samples the
/// base comes back unchanged (modulo clamping).
pub fn learn(base: &WeightVector, samples: &[EvaluationSample]) -> WeightVector {
    let mut acc = *base;
    for sample in samples.iter().filter(|s| s.is_accurate()) {
        acc = acc.fold_with(&sample.weights, |a, w| (a + w) / 2.0);
    }
    acc.clamped()
}
