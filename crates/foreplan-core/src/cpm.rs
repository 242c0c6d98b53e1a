//! Critical Path Method passes over the task DAG.
//!
//! The forward pass derives earliest start/finish times in fractional days
//! from the project start; the backward pass derives latest start/finish
//! times and slack. Tasks with recorded actual dates seed the passes with
//! reality instead of estimates: a recorded start overrides the earliest
//! start, a recorded completion overrides the earliest finish, and the
//! backward pass subtracts the effective duration so slack stays
//! non-negative. With no recorded dates the passes reduce to plain CPM over
//! the three-point estimates.
//!
//! Slack can only go negative when recorded dates contradict the dependency
//! order (a task started before its dependency finished).

use chrono::{DateTime, Utc};

use crate::graph::TaskGraph;
use crate::task::{ScheduleTimes, TopLevelTask};

/// Refreshed CPM times for a task list, indexed like the list itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    times: Vec<ScheduleTimes>,
}

/// Whole days between the project start and `at`, floored at 0.
fn elapsed_days(start: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    (at - start).num_days().max(0) as f64
}

/// Run both CPM passes over `tasks` using the edges in `graph`.
///
/// `graph` must have been built from the same task list; the passes read
/// only estimates, recorded dates, and graph edges, never prior schedule
/// fields, so re-running on an already-scheduled list yields identical
/// times.
pub fn schedule(start_date: DateTime<Utc>, tasks: &[TopLevelTask], graph: &TaskGraph) -> Schedule {
    assert_eq!(
        tasks.len(),
        graph.len(),
        "graph was built from a different task list"
    );

    let n = tasks.len();
    let mut times = vec![ScheduleTimes::default(); n];

    // Forward pass: earliest times, actual dates winning over estimates.
    for i in 0..n {
        let task = &tasks[i];
        let duration = task.estimated_days();
        assert!(
            duration.is_finite() && duration >= 0.0,
            "task '{}' has an invalid duration",
            task.name
        );

        let mut early_start = graph
            .dependencies_of(i)
            .iter()
            .map(|&dep| times[dep].early_finish)
            .fold(0.0, f64::max);
        if let Some(started) = task.started_at {
            early_start = elapsed_days(start_date, started);
        }

        let mut early_finish = early_start + duration;
        if let Some(completed) = task.completed_at {
            early_finish = elapsed_days(start_date, completed);
        }

        times[i].early_start = early_start;
        times[i].early_finish = early_finish;
    }

    // Backward pass: latest times anchored at each terminal task's earliest
    // finish, subtracting the effective duration.
    for i in (0..n).rev() {
        let successors = graph.successors_of(i);
        let late_finish = if successors.is_empty() {
            times[i].early_finish
        } else {
            successors
                .iter()
                .map(|&succ| times[succ].late_start)
                .fold(f64::INFINITY, f64::min)
        };
        let effective_duration = times[i].early_finish - times[i].early_start;

        times[i].late_finish = late_finish;
        times[i].late_start = late_finish - effective_duration;
        times[i].slack = times[i].late_start - times[i].early_start;
    }

    Schedule { times }
}

impl Schedule {
    /// Per-task times, indexed like the task list.
    pub fn times(&self) -> &[ScheduleTimes] {
        &self.times
    }

    /// Times for the task at `index`.
    pub fn get(&self, index: usize) -> ScheduleTimes {
        self.times[index]
    }

    /// Projected project finish: the maximum late finish. `None` when the
    /// task list is empty.
    pub fn projected_finish(&self) -> Option<f64> {
        self.times
            .iter()
            .map(|t| t.late_finish)
            .fold(None, |acc, lf| Some(acc.map_or(lf, |a: f64| a.max(lf))))
    }

    /// Indices of critical tasks (zero slack), in list order.
    pub fn critical_path(&self) -> Vec<usize> {
        self.times
            .iter()
            .enumerate()
            .filter(|(_, t)| t.slack == 0.0)
            .map(|(i, _)| i)
            .collect()
    }

    /// Sum of subtree variances over critical tasks that are not yet
    /// complete. Completed tasks contribute zero variance regardless of
    /// their slack.
    pub fn unfinished_critical_variance(&self, tasks: &[TopLevelTask]) -> f64 {
        self.times
            .iter()
            .zip(tasks.iter())
            .filter(|(times, task)| times.slack == 0.0 && !task.is_complete())
            .map(|(_, task)| task.variance())
            .sum()
    }

    /// Write the refreshed times back onto the task list.
    pub fn apply(&self, tasks: &mut [TopLevelTask]) {
        assert_eq!(
            tasks.len(),
            self.times.len(),
            "schedule was computed for a different task list"
        );
        for (task, times) in tasks.iter_mut().zip(self.times.iter()) {
            task.schedule = *times;
        }
    }
}
