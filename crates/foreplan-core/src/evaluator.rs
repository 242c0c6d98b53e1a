//! One-shot evaluation of a project's failure risk.
//!
//! The evaluator rebuilds the dependency graph, refreshes the CPM schedule,
//! computes the metric set for the project's mode, and assembles the
//! suggestion list and combined risk into an [`Evaluation`] record. It
//! performs no I/O: commit history arrives pre-fetched in the input, and the
//! caller persists the record.

use chrono::{DateTime, Utc};
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

use crate::cpm;
use crate::error::Result;
use crate::graph::TaskGraph;
use crate::metrics::{self, commits, MetricKind, RiskMetric};
use crate::project::{Project, ProjectStatus};
use crate::report::{Evaluation, MetricReport};
use crate::suggest;
use crate::weights::WeightVector;

/// Which rule set an evaluation runs under.
///
/// A project stays `Initial` until any task is started or the start date
/// passes; before that point the progress metrics have nothing to measure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluationMode {
    Initial,
    Active,
}

impl EvaluationMode {
    pub fn for_project(project: &Project, now: DateTime<Utc>) -> Self {
        if project.is_initial() && now <= project.start_date {
            EvaluationMode::Initial
        } else {
            EvaluationMode::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EvaluationMode::Initial => "initial",
            EvaluationMode::Active => "active",
        }
    }
}

/// Tuning for an evaluator.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluatorConfig {
    /// Fixed seed for the weight noise; drawn at random when unset.
    pub noise_seed: Option<u64>,
}

/// Externally fetched context for one evaluation.
#[derive(Debug, Clone, Copy, Default)]
pub struct EvaluationInput<'a> {
    /// Commit timestamps from the linked repository, oldest first.
    pub commits: Option<&'a [DateTime<Utc>]>,
}

/// Drives evaluations; stateless between calls.
pub struct Evaluator {
    config: EvaluatorConfig,
}

impl Evaluator {
    pub fn new(config: EvaluatorConfig) -> Self {
        Evaluator { config }
    }

    /// Evaluate the project as of `now`.
    ///
    /// Refreshes the schedule fields on the supplied tasks; everything else
    /// on the project is left untouched. `projects_so_far` attenuates the
    /// exploration noise applied to the base weights.
    pub fn evaluate(
        &self,
        project: &mut Project,
        input: EvaluationInput<'_>,
        base_weights: &WeightVector,
        projects_so_far: u32,
        now: DateTime<Utc>,
    ) -> Result<Evaluation> {
        let graph = TaskGraph::build(&project.tasks)?;
        let schedule = cpm::schedule(project.start_date, &project.tasks, &graph);
        schedule.apply(&mut project.tasks);

        let mode = EvaluationMode::for_project(project, now);
        let weights = self.noisy_weights(base_weights, projects_so_far);

        let mut readings: Vec<RiskMetric> = Vec::new();
        let mut push = |kind: MetricKind, value: f64| {
            readings.push(RiskMetric::new(kind, value, weights.weight_for(kind)));
        };

        push(MetricKind::BudgetUsage, metrics::budget_usage(project));
        match mode {
            EvaluationMode::Initial => {
                push(
                    MetricKind::StructuralComplexity,
                    metrics::structural_complexity(project, &graph),
                );
                push(
                    MetricKind::MissingSkillCoverage,
                    metrics::missing_skill_coverage(project),
                );
            }
            EvaluationMode::Active => {
                push(
                    MetricKind::SchedulePerformanceIndex,
                    metrics::schedule_performance_index(project, now),
                );
                push(
                    MetricKind::CostPerformanceIndex,
                    metrics::cost_performance_index(&project.tasks),
                );
                push(
                    MetricKind::MissingSkillCoverage,
                    metrics::missing_skill_coverage(project),
                );
                push(
                    MetricKind::WorkerUtilization,
                    metrics::worker_utilization(project),
                );
                push(MetricKind::ScopeCreep, metrics::scope_creep(project));
                push(
                    MetricKind::TaskDurationError,
                    metrics::task_duration_error(&project.tasks),
                );
                if let Some(timestamps) = input.commits {
                    push(
                        MetricKind::CommitFrequency,
                        commits::declining_commit_frequency(timestamps, now),
                    );
                }
                if let Some(coverage) = project.test_coverage {
                    push(MetricKind::TestCoverage, metrics::test_coverage_gap(coverage));
                }
            }
        }

        let projected = schedule.projected_finish();
        let deviation = schedule.unfinished_critical_variance(&project.tasks).sqrt();
        push(
            MetricKind::ProbabilityExceedTimeframe,
            metrics::probability_exceed_timeframe(
                project.time_frame_days,
                projected.unwrap_or(0.0),
                deviation,
            ),
        );

        let risk = metrics::combined_risk(&readings);
        let suggestions = suggest::generate(project, now, mode)
            .iter()
            .map(|s| s.to_report())
            .collect();

        let mut reports: Vec<MetricReport> =
            readings.iter().map(MetricReport::from_metric).collect();
        reports.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        Ok(Evaluation {
            project_id: project.id,
            mode,
            metrics: reports,
            risk,
            projected_finish_days: projected,
            suggestions,
            status: derive_status(project, now),
            weights,
            evaluated_at: now,
        })
    }

    fn noisy_weights(&self, base: &WeightVector, projects_so_far: u32) -> WeightVector {
        let seed = self.config.noise_seed.unwrap_or_else(rand::random);
        let mut rng = Mcg128Xsl64::seed_from_u64(seed);
        base.noisy(projects_so_far, &mut rng)
    }
}

/// Success, failure, or still running, as of `now`.
///
/// A fully completed project is judged at its last completion date, so a
/// success stays a success no matter when it is re-evaluated.
pub fn derive_status(project: &Project, now: DateTime<Utc>) -> ProjectStatus {
    let time_frame = f64::from(project.time_frame_days);
    if project.all_tasks_complete() {
        let finished_at = project.last_completion().unwrap_or(now);
        if project.elapsed_days(finished_at) <= time_frame {
            ProjectStatus::Success
        } else {
            ProjectStatus::Failure
        }
    } else if project.elapsed_days(now) > time_frame {
        ProjectStatus::Failure
    } else {
        ProjectStatus::InProgress
    }
}
