//! Risk metrics: raw values, per-kind normalization laws, weighted risk.
//!
//! Every metric reduces to a `(kind, value, weight)` triple. Normalization
//! is a pure function of the kind and the raw value, so each law is
//! testable in isolation; the combined risk is the weight-normalized sum of
//! the normalized values and is invariant under uniform weight scaling.
//!
//! Raw values must lie inside the kind's declared range. An out-of-range
//! value is a programmer error in the computation that produced it, so
//! `normalize` panics instead of returning an error.

pub mod commits;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, Normal};

use chrono::{DateTime, Utc};

use crate::graph::TaskGraph;
use crate::project::Project;
use crate::task::TopLevelTask;

/// The closed set of risk metrics the engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricKind {
    /// Estimated cost committed against the budget
    BudgetUsage,
    /// Earned value over planned value (SPI)
    SchedulePerformanceIndex,
    /// Budgeted cost over actual cost of completed work (CPI)
    CostPerformanceIndex,
    /// Chance the critical path overruns the time frame
    ProbabilityExceedTimeframe,
    /// Required skills no developer on the roster has
    MissingSkillCoverage,
    /// Idle share of the developer roster
    WorkerUtilization,
    /// Tasks added after work began
    ScopeCreep,
    /// Relative error of estimates on completed tasks
    TaskDurationError,
    /// Gap between reported test coverage and full coverage
    TestCoverage,
    /// Declining commit cadence on the linked repository
    CommitFrequency,
    /// Size/coupling heuristic over the task DAG
    StructuralComplexity,
}

impl MetricKind {
    /// Human-readable name for reports.
    pub fn label(&self) -> &'static str {
        match self {
            MetricKind::BudgetUsage => "Budget usage",
            MetricKind::SchedulePerformanceIndex => "Schedule performance index",
            MetricKind::CostPerformanceIndex => "Cost performance index",
            MetricKind::ProbabilityExceedTimeframe => "Probability of exceeding the time frame",
            MetricKind::MissingSkillCoverage => "Missing skill coverage",
            MetricKind::WorkerUtilization => "Worker utilization",
            MetricKind::ScopeCreep => "Scope creep",
            MetricKind::TaskDurationError => "Task duration error",
            MetricKind::TestCoverage => "Test coverage gap",
            MetricKind::CommitFrequency => "Commit frequency decline",
            MetricKind::StructuralComplexity => "Structural complexity",
        }
    }

    /// One-line explanation for reports.
    pub fn description(&self) -> &'static str {
        match self {
            MetricKind::BudgetUsage => "Share of the budget committed by task cost estimates",
            MetricKind::SchedulePerformanceIndex => {
                "Earned value against planned value; below 1 means behind schedule"
            }
            MetricKind::CostPerformanceIndex => {
                "Budgeted cost of completed work against its actual cost; below 1 means over budget"
            }
            MetricKind::ProbabilityExceedTimeframe => {
                "Probability that the projected critical path finishes after the time frame"
            }
            MetricKind::MissingSkillCoverage => {
                "Fraction of required skills no developer on the roster covers"
            }
            MetricKind::WorkerUtilization => "Fraction of the roster not working on a started task",
            MetricKind::ScopeCreep => "Fraction of tasks added after the project began",
            MetricKind::TaskDurationError => {
                "Mean relative error between estimated and actual durations of completed tasks"
            }
            MetricKind::TestCoverage => "Uncovered share of the code under test",
            MetricKind::CommitFrequency => {
                "Degree to which commit intervals on the linked repository are lengthening"
            }
            MetricKind::StructuralComplexity => {
                "Cost, duration, and coupling pressure across the task graph"
            }
        }
    }

    /// Valid range for raw values of this kind.
    pub fn range(&self) -> (f64, f64) {
        match self {
            MetricKind::BudgetUsage
            | MetricKind::ProbabilityExceedTimeframe
            | MetricKind::MissingSkillCoverage
            | MetricKind::WorkerUtilization
            | MetricKind::ScopeCreep
            | MetricKind::TaskDurationError
            | MetricKind::TestCoverage
            | MetricKind::CommitFrequency => (0.0, 1.0),
            MetricKind::SchedulePerformanceIndex => (0.0, f64::INFINITY),
            MetricKind::CostPerformanceIndex | MetricKind::StructuralComplexity => {
                (f64::NEG_INFINITY, f64::INFINITY)
            }
        }
    }
}

/// One computed metric: raw value plus the weight it carries in the sum.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct RiskMetric {
    /// Which metric this is
    pub kind: MetricKind,
    /// Raw value, inside the kind's declared range
    pub value: f64,
    /// Weight in the combined risk
    pub weight: f64,
}

impl RiskMetric {
    /// Pair a raw value with its weight.
    pub fn new(kind: MetricKind, value: f64, weight: f64) -> Self {
        RiskMetric { kind, value, weight }
    }

    /// The raw value pushed through the kind's normalization law.
    pub fn normalized(&self) -> f64 {
        normalize(self.kind, self.value)
    }
}

/// Map a raw metric value into risk space `[0, 1]`.
///
/// Panics when `value` lies outside the kind's declared range; producing
/// such a value is a bug in the metric computation, not an input error.
pub fn normalize(kind: MetricKind, value: f64) -> f64 {
    let (min, max) = kind.range();
    assert!(
        value >= min && value <= max,
        "{} value {value} outside its valid range [{min}, {max}]",
        kind.label()
    );

    match kind {
        MetricKind::BudgetUsage
        | MetricKind::ProbabilityExceedTimeframe
        | MetricKind::MissingSkillCoverage
        | MetricKind::WorkerUtilization
        | MetricKind::ScopeCreep
        | MetricKind::TaskDurationError
        | MetricKind::TestCoverage
        | MetricKind::CommitFrequency => value,
        MetricKind::SchedulePerformanceIndex => {
            if value >= 1.0 {
                0.0
            } else {
                1.0 - value * value
            }
        }
        MetricKind::CostPerformanceIndex => {
            if value > 0.0 {
                0.0
            } else {
                (2.0 / (1.0 + value.exp()) - 1.0).clamp(0.0, 1.0)
            }
        }
        MetricKind::StructuralComplexity => {
            if (0.0..=1.0).contains(&value) {
                value
            } else {
                value.clamp(0.1, 0.9)
            }
        }
    }
}

/// Weighted sum of normalized metrics: `sum(w * norm) / sum(w)`.
///
/// Returns 0 for an empty slice or all-zero weights, and is invariant under
/// uniform scaling of the weights.
pub fn combined_risk(metrics: &[RiskMetric]) -> f64 {
    let total_weight: f64 = metrics.iter().map(|m| m.weight).sum();
    if total_weight == 0.0 {
        return 0.0;
    }
    let weighted: f64 = metrics.iter().map(|m| m.weight * m.normalized()).sum();
    weighted / total_weight
}

/// Estimated cost committed against the budget, capped at 1.
///
/// A zero budget counts as fully consumed as soon as any cost is estimated.
pub fn budget_usage(project: &Project) -> f64 {
    let estimated = project.total_estimated_cost();
    if project.budget == 0.0 {
        return if estimated > 0.0 { 1.0 } else { 0.0 };
    }
    (estimated / project.budget).min(1.0)
}

/// Schedule performance index: earned value over planned value.
///
/// Earned value counts completed tasks at their full estimated duration and
/// started tasks at their elapsed days. Planned value counts tasks whose
/// late finish has passed in full, and tasks inside their late window at
/// the days since their late start. Reads the refreshed schedule fields.
pub fn schedule_performance_index(project: &Project, now: DateTime<Utc>) -> f64 {
    let elapsed = project.elapsed_days(now);

    let mut earned = 0.0;
    let mut planned = 0.0;
    for task in &project.tasks {
        if task.is_complete() {
            earned += task.estimated_days();
        } else if let Some(started) = task.started_at {
            earned += (now - started).num_days().max(0) as f64;
        }

        if task.schedule.late_finish <= elapsed {
            planned += task.estimated_days();
        } else if task.schedule.late_start < elapsed {
            planned += elapsed - task.schedule.late_start;
        }
    }

    if planned == 0.0 {
        0.0
    } else {
        earned / planned
    }
}

/// Cost performance index over completed work.
///
/// Budgeted cost of completed tasks over their actual spend; 0 when nothing
/// completed has recorded spend (degenerate ratio guard).
pub fn cost_performance_index(tasks: &[TopLevelTask]) -> f64 {
    let mut budgeted = 0.0;
    let mut actual = 0.0;
    for task in tasks.iter().filter(|t| t.is_complete()) {
        budgeted += task.estimated_cost;
        actual += task.total_cost();
    }
    if actual == 0.0 {
        0.0
    } else {
        budgeted / actual
    }
}

/// Upper tail of `Normal(estimated_days, std_dev_days)` past the time frame.
///
/// With zero deviation the answer collapses to certainty one way or the
/// other.
pub fn probability_exceed_timeframe(
    time_frame_days: u32,
    estimated_days: f64,
    std_dev_days: f64,
) -> f64 {
    let time_frame = f64::from(time_frame_days);
    let normal = match Normal::new(estimated_days, std_dev_days) {
        Ok(normal) => normal,
        Err(_) => {
            return if estimated_days > time_frame { 1.0 } else { 0.0 };
        }
    };
    1.0 - normal.cdf(time_frame)
}

/// Fraction of required skills held by no developer on the roster.
pub fn missing_skill_coverage(project: &Project) -> f64 {
    let required: BTreeSet<&String> = project
        .tasks
        .iter()
        .flat_map(|t| t.required_skills.iter())
        .collect();
    if required.is_empty() {
        return 0.0;
    }

    let missing = required
        .iter()
        .filter(|skill| {
            !project
                .developers
                .iter()
                .any(|dev| dev.skills.contains(skill.as_str()))
        })
        .count();
    missing as f64 / required.len() as f64
}

/// Idle share of the roster: developers on no started, incomplete task.
pub fn worker_utilization(project: &Project) -> f64 {
    if project.developers.is_empty() {
        return 0.0;
    }

    let mut busy: BTreeSet<uuid::Uuid> = BTreeSet::new();
    for task in project.tasks.iter().filter(|t| t.is_started() && !t.is_complete()) {
        busy.extend(task.all_developers());
    }
    let active = project
        .developers
        .iter()
        .filter(|dev| busy.contains(&dev.id))
        .count();
    1.0 - active as f64 / project.developers.len() as f64
}

/// Fraction of the current task list added after work began, capped at 1.
pub fn scope_creep(project: &Project) -> f64 {
    if project.tasks.is_empty() {
        return 0.0;
    }
    (f64::from(project.tasks_added) / project.tasks.len() as f64).min(1.0)
}

/// Mean relative estimate error over completed tasks, each capped at 1.
///
/// Tasks with a zero-day estimate cannot produce a ratio and are skipped.
pub fn task_duration_error(tasks: &[TopLevelTask]) -> f64 {
    let mut total = 0.0;
    let mut count = 0usize;
    for task in tasks.iter().filter(|t| t.is_complete()) {
        let estimated = task.estimated_days();
        if estimated <= 0.0 {
            continue;
        }
        if let Some(actual) = task.actual_days() {
            total += ((actual - estimated).abs() / estimated).min(1.0);
            count += 1;
        }
    }
    if count == 0 {
        0.0
    } else {
        total / count as f64
    }
}

/// Uncovered share of the code under test.
pub fn test_coverage_gap(coverage: f64) -> f64 {
    1.0 - coverage
}

/// Cost, duration, and coupling pressure over the task DAG.
///
/// Per task: estimated cost over (skills + 1), duration over the time
/// frame, and degree over the task count; averaged over all tasks. The sum
/// is unbounded by construction, which the normalization clamp absorbs.
pub fn structural_complexity(project: &Project, graph: &TaskGraph) -> f64 {
    let n = project.tasks.len();
    if n == 0 {
        return 0.0;
    }
    let time_frame = f64::from(project.time_frame_days);

    let mut total = 0.0;
    for (i, task) in project.tasks.iter().enumerate() {
        let cost_pressure = task.estimated_cost / (task.required_skills.len() + 1) as f64;
        let duration_pressure = task.estimated_days() / time_frame;
        let degree = graph.dependencies_of(i).len() + graph.successors_of(i).len();
        let coupling_pressure = degree as f64 / n as f64;
        total += cost_pressure + duration_pressure + coupling_pressure;
    }
    total / n as f64
}
