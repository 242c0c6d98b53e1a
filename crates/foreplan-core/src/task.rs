//! Task model: three-point estimates, subtask trees, top-level tasks.
//!
//! A top-level task is the unit the scheduler and the risk metrics operate
//! on: it carries dependencies (names of earlier tasks), an estimated cost,
//! staffing expectations, actual cost items, and the schedule times the CPM
//! passes refresh on every evaluation. Subtasks form an exclusively owned
//! tree under their top-level task and only contribute duration and
//! variance.
//!
//! Durations follow PERT three-point estimation:
//! - leaf duration = round((optimistic + most_likely + pessimistic) / 3)
//! - leaf std-dev = round((pessimistic - optimistic) / sqrt(6))
//! - composite duration = sum of child durations
//! - composite std-dev = sqrt(sum of child variances)

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Three-point duration estimate in whole days.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Estimate {
    /// Best-case duration
    pub optimistic: u32,
    /// Most likely duration
    pub most_likely: u32,
    /// Worst-case duration
    pub pessimistic: u32,
}

impl Estimate {
    /// Create a validated estimate (`optimistic <= most_likely <= pessimistic`).
    pub fn new(optimistic: u32, most_likely: u32, pessimistic: u32) -> Result<Self, ValidationError> {
        if optimistic > most_likely || most_likely > pessimistic {
            return Err(ValidationError::EstimateOrder {
                optimistic,
                most_likely,
                pessimistic,
            });
        }
        Ok(Estimate {
            optimistic,
            most_likely,
            pessimistic,
        })
    }

    /// Expected duration in days, rounded to the nearest whole day.
    pub fn expected_days(&self) -> f64 {
        let sum = self.optimistic + self.most_likely + self.pessimistic;
        (f64::from(sum) / 3.0).round()
    }

    /// Standard deviation in days, rounded to the nearest whole day.
    pub fn std_dev_days(&self) -> f64 {
        let spread = self.pessimistic - self.optimistic;
        (f64::from(spread) / 6.0_f64.sqrt()).round()
    }

    /// Variance in days squared.
    pub fn variance(&self) -> f64 {
        let sd = self.std_dev_days();
        sd * sd
    }
}

impl Default for Estimate {
    fn default() -> Self {
        Estimate {
            optimistic: 0,
            most_likely: 0,
            pessimistic: 0,
        }
    }
}

/// A unit of work inside a top-level task's subtree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subtask {
    /// Subtask name
    pub name: String,
    /// Own three-point estimate (ignored once subtasks exist)
    pub estimate: Estimate,
    /// Nested subtasks, exclusively owned
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Assigned developer ids
    #[serde(default)]
    pub developers: BTreeSet<Uuid>,
}

impl Subtask {
    /// Create a leaf subtask.
    pub fn new(name: impl Into<String>, estimate: Estimate) -> Self {
        Subtask {
            name: name.into(),
            estimate,
            subtasks: Vec::new(),
            developers: BTreeSet::new(),
        }
    }

    /// Expected duration of the subtree in days.
    ///
    /// A leaf contributes its own estimate; a composite sums its children
    /// and its own estimate no longer participates.
    pub fn estimated_days(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.expected_days()
        } else {
            self.subtasks.iter().map(Subtask::estimated_days).sum()
        }
    }

    /// Variance of the subtree in days squared.
    pub fn variance(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.variance()
        } else {
            self.subtasks.iter().map(Subtask::variance).sum()
        }
    }

    /// Standard deviation of the subtree in days.
    pub fn std_dev_days(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.std_dev_days()
        } else {
            self.variance().sqrt()
        }
    }

    fn collect_developers(&self, into: &mut BTreeSet<Uuid>) {
        into.extend(self.developers.iter().copied());
        for sub in &self.subtasks {
            sub.collect_developers(into);
        }
    }
}

/// One actual-spend record attached to a task. Append-only.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CostItem {
    /// What the money went to
    pub name: String,
    /// Amount spent
    pub amount: f64,
    /// When the spend was recorded
    pub added_at: DateTime<Utc>,
}

/// CPM-derived times in fractional days from project start.
///
/// Refreshed by every evaluation run; `slack == 0` marks a critical task.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct ScheduleTimes {
    /// Earliest possible start
    pub early_start: f64,
    /// Earliest possible finish
    pub early_finish: f64,
    /// Latest start that does not delay the project
    pub late_start: f64,
    /// Latest finish that does not delay the project
    pub late_finish: f64,
    /// `late_start - early_start`
    pub slack: f64,
}

/// A schedulable top-level task in the project dependency DAG.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TopLevelTask {
    /// Task name, unique within a project
    pub name: String,
    /// Own three-point estimate (ignored once subtasks exist)
    pub estimate: Estimate,
    /// Subtask tree
    #[serde(default)]
    pub subtasks: Vec<Subtask>,
    /// Assigned developer ids
    #[serde(default)]
    pub developers: BTreeSet<Uuid>,
    /// Names of tasks this task depends on; the authoritative edge set.
    /// Successor lists are always derived from these, never stored.
    #[serde(default)]
    pub dependencies: Vec<String>,
    /// Budgeted cost for the task
    #[serde(default)]
    pub estimated_cost: f64,
    /// How many developers the task is planned for
    #[serde(default)]
    pub expected_developers: u32,
    /// Skills the task requires
    #[serde(default)]
    pub required_skills: BTreeSet<String>,
    /// Actual spend records, append-only
    #[serde(default)]
    pub costs: Vec<CostItem>,
    /// When work actually started
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When work actually finished
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// CPM times from the most recent evaluation
    #[serde(default)]
    pub schedule: ScheduleTimes,
}

impl TopLevelTask {
    /// Create a task with no dependencies, cost, or staffing expectations.
    pub fn new(name: impl Into<String>, estimate: Estimate) -> Self {
        TopLevelTask {
            name: name.into(),
            estimate,
            subtasks: Vec::new(),
            developers: BTreeSet::new(),
            dependencies: Vec::new(),
            estimated_cost: 0.0,
            expected_developers: 0,
            required_skills: BTreeSet::new(),
            costs: Vec::new(),
            started_at: None,
            completed_at: None,
            schedule: ScheduleTimes::default(),
        }
    }

    /// Set the dependency names (tasks that must finish first).
    pub fn with_dependencies(mut self, dependencies: Vec<String>) -> Self {
        self.dependencies = dependencies;
        self
    }

    /// Set the budgeted cost. Must be finite and non-negative.
    pub fn with_estimated_cost(mut self, cost: f64) -> Result<Self, ValidationError> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(ValidationError::InvalidAmount {
                field: "estimated_cost".to_string(),
                value: cost,
            });
        }
        self.estimated_cost = cost;
        Ok(self)
    }

    /// Set the planned developer head count.
    pub fn with_expected_developers(mut self, count: u32) -> Self {
        self.expected_developers = count;
        self
    }

    /// Set the required skills.
    pub fn with_required_skills(mut self, skills: impl IntoIterator<Item = String>) -> Self {
        self.required_skills = skills.into_iter().collect();
        self
    }

    /// Append a subtask to the tree.
    pub fn add_subtask(&mut self, subtask: Subtask) {
        self.subtasks.push(subtask);
    }

    /// Record the actual start of work.
    pub fn start(&mut self, at: DateTime<Utc>) {
        self.started_at = Some(at);
    }

    /// Record completion. Requires a recorded start at or before `at`.
    pub fn complete(&mut self, at: DateTime<Utc>) -> Result<(), ValidationError> {
        let started = self.started_at.ok_or_else(|| ValidationError::TaskNotStarted {
            name: self.name.clone(),
        })?;
        if at < started {
            return Err(ValidationError::CompletionBeforeStart {
                name: self.name.clone(),
            });
        }
        self.completed_at = Some(at);
        Ok(())
    }

    /// Record an actual spend item. Amount must be finite and non-negative.
    pub fn add_cost(
        &mut self,
        name: impl Into<String>,
        amount: f64,
        at: DateTime<Utc>,
    ) -> Result<(), ValidationError> {
        if !amount.is_finite() || amount < 0.0 {
            return Err(ValidationError::InvalidAmount {
                field: "cost".to_string(),
                value: amount,
            });
        }
        self.costs.push(CostItem {
            name: name.into(),
            amount,
            added_at: at,
        });
        Ok(())
    }

    /// Total actual spend across all cost items.
    pub fn total_cost(&self) -> f64 {
        self.costs.iter().map(|c| c.amount).sum()
    }

    /// Expected duration of the task subtree in days.
    pub fn estimated_days(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.expected_days()
        } else {
            self.subtasks.iter().map(Subtask::estimated_days).sum()
        }
    }

    /// Variance of the task subtree in days squared.
    pub fn variance(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.variance()
        } else {
            self.subtasks.iter().map(Subtask::variance).sum()
        }
    }

    /// Standard deviation of the task subtree in days.
    pub fn std_dev_days(&self) -> f64 {
        if self.subtasks.is_empty() {
            self.estimate.std_dev_days()
        } else {
            self.variance().sqrt()
        }
    }

    /// All developer ids assigned to the task or any of its subtasks.
    pub fn all_developers(&self) -> BTreeSet<Uuid> {
        let mut ids = self.developers.clone();
        for sub in &self.subtasks {
            sub.collect_developers(&mut ids);
        }
        ids
    }

    /// Whether work has started.
    pub fn is_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Whether work has finished.
    pub fn is_complete(&self) -> bool {
        self.completed_at.is_some()
    }

    /// Whether the task sits on the critical path (zero slack).
    ///
    /// Exact comparison is sound here: slack is derived from whole-day
    /// estimates and whole-day elapsed times.
    pub fn is_critical(&self) -> bool {
        self.schedule.slack == 0.0
    }

    /// Actual duration in whole days, once complete.
    pub fn actual_days(&self) -> Option<f64> {
        match (self.started_at, self.completed_at) {
            (Some(start), Some(end)) => Some((end - start).num_days() as f64),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn estimate_rejects_out_of_order_values() {
        assert!(Estimate::new(10, 5, 20).is_err());
        assert!(Estimate::new(5, 10, 8).is_err());
        assert!(Estimate::new(5, 5, 5).is_ok());
    }

    #[test]
    fn expected_days_rounds_three_point_mean() {
        let e = Estimate::new(10, 20, 27).unwrap();
        assert_eq!(e.expected_days(), 19.0);

        let e = Estimate::new(14, 19, 24).unwrap();
        assert_eq!(e.expected_days(), 19.0);
    }

    #[test]
    fn std_dev_rounds_spread_over_sqrt_six() {
        // 17 / sqrt(6) = 6.94 -> 7
        let e = Estimate::new(10, 20, 27).unwrap();
        assert_eq!(e.std_dev_days(), 7.0);

        // 10 / sqrt(6) = 4.08 -> 4
        let e = Estimate::new(14, 19, 24).unwrap();
        assert_eq!(e.std_dev_days(), 4.0);
        assert_eq!(e.variance(), 16.0);
    }

    #[test]
    fn zero_estimate_contributes_nothing() {
        let e = Estimate::default();
        assert_eq!(e.expected_days(), 0.0);
        assert_eq!(e.std_dev_days(), 0.0);
        assert_eq!(e.variance(), 0.0);
    }

    #[test]
    fn composite_duration_sums_children() {
        let mut task = TopLevelTask::new("build", Estimate::new(1, 1, 1).unwrap());
        task.add_subtask(Subtask::new("api", Estimate::new(10, 20, 27).unwrap()));
        task.add_subtask(Subtask::new("ui", Estimate::new(14, 19, 24).unwrap()));

        // Own estimate (1 day) is ignored once subtasks exist.
        assert_eq!(task.estimated_days(), 38.0);
    }

    #[test]
    fn composite_variance_sums_children() {
        let mut task = TopLevelTask::new("build", Estimate::default());
        task.add_subtask(Subtask::new("api", Estimate::new(10, 20, 27).unwrap()));
        task.add_subtask(Subtask::new("ui", Estimate::new(14, 19, 24).unwrap()));

        // 49 + 16
        assert_eq!(task.variance(), 65.0);
        assert!((task.std_dev_days() - 65.0_f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn nested_subtrees_aggregate_recursively() {
        let mut inner = Subtask::new("inner", Estimate::default());
        inner.subtasks.push(Subtask::new("a", Estimate::new(2, 3, 4).unwrap()));
        inner.subtasks.push(Subtask::new("b", Estimate::new(2, 3, 4).unwrap()));

        let mut task = TopLevelTask::new("outer", Estimate::default());
        task.add_subtask(inner);

        assert_eq!(task.estimated_days(), 6.0);
        // each leaf: spread 2 / sqrt(6) = 0.82 -> 1, variance 1
        assert_eq!(task.variance(), 2.0);
    }

    #[test]
    fn completion_requires_a_start() {
        let mut task = TopLevelTask::new("deploy", Estimate::new(1, 2, 3).unwrap());
        let err = task.complete(date(2026, 3, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::TaskNotStarted { .. }));

        task.start(date(2026, 3, 1));
        let err = task.complete(date(2026, 2, 1)).unwrap_err();
        assert!(matches!(err, ValidationError::CompletionBeforeStart { .. }));

        task.complete(date(2026, 3, 5)).unwrap();
        assert!(task.is_complete());
        assert_eq!(task.actual_days(), Some(4.0));
    }

    #[test]
    fn negative_cost_is_rejected() {
        let mut task = TopLevelTask::new("deploy", Estimate::new(1, 2, 3).unwrap());
        assert!(task.add_cost("licenses", -5.0, date(2026, 3, 1)).is_err());
        assert!(task.add_cost("licenses", f64::NAN, date(2026, 3, 1)).is_err());

        task.add_cost("licenses", 120.0, date(2026, 3, 1)).unwrap();
        task.add_cost("hosting", 30.5, date(2026, 3, 2)).unwrap();
        assert_eq!(task.total_cost(), 150.5);
    }

    #[test]
    fn negative_estimated_cost_is_rejected() {
        let task = TopLevelTask::new("deploy", Estimate::new(1, 2, 3).unwrap());
        assert!(task.with_estimated_cost(-1.0).is_err());
    }

    #[test]
    fn all_developers_includes_subtask_assignments() {
        let dev_a = Uuid::new_v4();
        let dev_b = Uuid::new_v4();

        let mut sub = Subtask::new("api", Estimate::new(1, 2, 3).unwrap());
        sub.developers.insert(dev_b);

        let mut task = TopLevelTask::new("build", Estimate::default());
        task.developers.insert(dev_a);
        task.add_subtask(sub);

        let all = task.all_developers();
        assert!(all.contains(&dev_a));
        assert!(all.contains(&dev_b));
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn task_round_trips_through_json() {
        let task = TopLevelTask::new("api", Estimate::new(3, 5, 9).unwrap())
            .with_dependencies(vec!["design".to_string()])
            .with_estimated_cost(1200.0)
            .unwrap()
            .with_expected_developers(2)
            .with_required_skills(["rust".to_string(), "sql".to_string()]);

        let json = serde_json::to_string(&task).unwrap();
        let back: TopLevelTask = serde_json::from_str(&json).unwrap();
        assert_eq!(back, task);
        assert_eq!(back.dependencies, vec!["design".to_string()]);
    }
}
