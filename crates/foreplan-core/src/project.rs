//! Project model: developers, mood tracking, budget, time frame, tasks.
//!
//! A project aggregates the task list (kept in dependency-consistent order),
//! the developer roster, per-developer mood histories, and the evaluation
//! inputs that do not live on tasks: budget, time frame, optional GitHub
//! link, and an externally reported test-coverage ratio.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;
use crate::graph::TaskGraph;
use crate::task::TopLevelTask;

/// Number of mood samples kept per developer.
pub const MOOD_HISTORY_LEN: usize = 5;

/// Weights applied to the mood ring, oldest sample first.
///
/// The most recent sample dominates; the weights sum to 1.
pub const MOOD_WEIGHTS: [f64; MOOD_HISTORY_LEN] = [0.05, 0.05, 0.1, 0.1, 0.7];

/// Five-step developer mood scale.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    /// Score -2
    Awful,
    /// Score -1
    Bad,
    /// Score 0
    Neutral,
    /// Score 1
    Good,
    /// Score 2
    Great,
}

impl Mood {
    /// Numeric score of the mood step.
    pub fn score(&self) -> f64 {
        match self {
            Mood::Awful => -2.0,
            Mood::Bad => -1.0,
            Mood::Neutral => 0.0,
            Mood::Good => 1.0,
            Mood::Great => 2.0,
        }
    }

    /// Stable lowercase label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mood::Awful => "awful",
            Mood::Bad => "bad",
            Mood::Neutral => "neutral",
            Mood::Good => "good",
            Mood::Great => "great",
        }
    }

    /// Parse the lowercase label back into a mood step.
    pub fn parse(value: &str) -> Option<Mood> {
        match value {
            "awful" => Some(Mood::Awful),
            "bad" => Some(Mood::Bad),
            "neutral" => Some(Mood::Neutral),
            "good" => Some(Mood::Good),
            "great" => Some(Mood::Great),
            _ => None,
        }
    }
}

impl Default for Mood {
    fn default() -> Self {
        Mood::Neutral
    }
}

impl fmt::Display for Mood {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fixed ring of the five most recent mood samples, oldest first.
///
/// Starts all-neutral so a fresh developer scores 0 until samples arrive.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MoodHistory {
    samples: [Mood; MOOD_HISTORY_LEN],
}

impl MoodHistory {
    /// Push a new sample, dropping the oldest.
    pub fn record(&mut self, mood: Mood) {
        self.samples.rotate_left(1);
        self.samples[MOOD_HISTORY_LEN - 1] = mood;
    }

    /// Weighted score over the ring; recent samples dominate.
    pub fn weighted_score(&self) -> f64 {
        self.samples
            .iter()
            .zip(MOOD_WEIGHTS.iter())
            .map(|(mood, weight)| mood.score() * weight)
            .sum()
    }

    /// Most recent sample.
    pub fn latest(&self) -> Mood {
        self.samples[MOOD_HISTORY_LEN - 1]
    }

    /// The raw ring, oldest first.
    pub fn samples(&self) -> &[Mood; MOOD_HISTORY_LEN] {
        &self.samples
    }
}

/// A developer on the project roster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Developer {
    /// Stable identity, referenced from task assignments
    pub id: Uuid,
    /// Display name
    pub name: String,
    /// Skills the developer brings
    #[serde(default)]
    pub skills: BTreeSet<String>,
}

impl Developer {
    /// Create a developer with a fresh id.
    pub fn new(name: impl Into<String>, skills: impl IntoIterator<Item = String>) -> Self {
        Developer {
            id: Uuid::new_v4(),
            name: name.into(),
            skills: skills.into_iter().collect(),
        }
    }
}

/// Linked GitHub repository for commit-history metrics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GithubLink {
    /// Repository owner (user or organization)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch to inspect; the repository default when absent
    #[serde(default)]
    pub branch: Option<String>,
}

impl GithubLink {
    /// Parse `owner/repo` or a full `https://github.com/owner/repo` URL.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidRepo {
            value: value.to_string(),
        };

        let path = if value.contains("://") {
            let url = url::Url::parse(value).map_err(|_| invalid())?;
            if url.host_str() != Some("github.com") {
                return Err(invalid());
            }
            url.path().trim_matches('/').to_string()
        } else {
            value.trim_matches('/').to_string()
        };

        let mut parts = path.split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(repo), None) if !owner.is_empty() && !repo.is_empty() => {
                Ok(GithubLink {
                    owner: owner.to_string(),
                    repo: repo.trim_end_matches(".git").to_string(),
                    branch: None,
                })
            }
            _ => Err(invalid()),
        }
    }
}

impl fmt::Display for GithubLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

/// Derived project outcome.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    /// All tasks completed within the time frame
    Success,
    /// Work ongoing
    InProgress,
    /// Time frame exceeded without full completion
    Failure,
}

impl ProjectStatus {
    /// Whether the status is terminal for weight learning.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Success | ProjectStatus::Failure)
    }

    /// Stable snake_case label, matching the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProjectStatus::Success => "success",
            ProjectStatus::InProgress => "in_progress",
            ProjectStatus::Failure => "failure",
        }
    }

    /// Parse the snake_case label back into a status.
    pub fn parse(value: &str) -> Option<ProjectStatus> {
        match value {
            "success" => Some(ProjectStatus::Success),
            "in_progress" => Some(ProjectStatus::InProgress),
            "failure" => Some(ProjectStatus::Failure),
            _ => None,
        }
    }
}

impl fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A project under risk evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Project {
    /// Unique identifier
    pub id: Uuid,
    /// Project name, unique in storage
    pub name: String,
    /// Total budget
    pub budget: f64,
    /// Allowed duration in days from `start_date`
    pub time_frame_days: u32,
    /// When the project clock starts
    pub start_date: DateTime<Utc>,
    /// Creation timestamp
    pub created_at: DateTime<Utc>,
    /// Top-level tasks, dependencies always preceding their dependents
    #[serde(default)]
    pub tasks: Vec<TopLevelTask>,
    /// Developer roster
    #[serde(default)]
    pub developers: Vec<Developer>,
    /// Mood history per developer id
    #[serde(default)]
    pub moods: BTreeMap<Uuid, MoodHistory>,
    /// Linked repository for commit metrics
    #[serde(default)]
    pub github: Option<GithubLink>,
    /// Externally reported test coverage in [0, 1]
    #[serde(default)]
    pub test_coverage: Option<f64>,
    /// Tasks added after work began; feeds the scope-creep metric
    #[serde(default)]
    pub tasks_added: u32,
}

impl Project {
    /// Create an empty project.
    ///
    /// The budget must be finite and non-negative and the time frame at
    /// least one day.
    pub fn new(
        name: impl Into<String>,
        budget: f64,
        time_frame_days: u32,
        start_date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        if !budget.is_finite() || budget < 0.0 {
            return Err(ValidationError::InvalidAmount {
                field: "budget".to_string(),
                value: budget,
            });
        }
        if time_frame_days == 0 {
            return Err(ValidationError::InvalidTimeFrame);
        }
        Ok(Project {
            id: Uuid::new_v4(),
            name: name.into(),
            budget,
            time_frame_days,
            start_date,
            created_at: Utc::now(),
            tasks: Vec::new(),
            developers: Vec::new(),
            moods: BTreeMap::new(),
            github: None,
            test_coverage: None,
            tasks_added: 0,
        })
    }

    /// Add a developer to the roster.
    pub fn add_developer(&mut self, developer: Developer) {
        self.developers.push(developer);
    }

    /// Look up a developer by id.
    pub fn developer(&self, id: Uuid) -> Option<&Developer> {
        self.developers.iter().find(|d| d.id == id)
    }

    /// Look up a developer by name.
    pub fn developer_by_name(&self, name: &str) -> Option<&Developer> {
        self.developers.iter().find(|d| d.name == name)
    }

    /// Record a mood sample for a developer.
    pub fn record_mood(&mut self, developer_id: Uuid, mood: Mood) -> Result<(), ValidationError> {
        if self.developer(developer_id).is_none() {
            return Err(ValidationError::UnknownDeveloper { id: developer_id });
        }
        self.moods.entry(developer_id).or_default().record(mood);
        Ok(())
    }

    /// Weighted mood score for a developer; `None` until one is recorded.
    pub fn mood_score(&self, developer_id: Uuid) -> Option<f64> {
        self.moods.get(&developer_id).map(MoodHistory::weighted_score)
    }

    /// Append a task, validating the resulting dependency graph.
    ///
    /// Counts toward `tasks_added` once work has begun or the wall clock has
    /// passed the project start.
    pub fn add_task(&mut self, task: TopLevelTask, now: DateTime<Utc>) -> Result<(), ValidationError> {
        self.tasks.push(task);
        if let Err(err) = TaskGraph::build(&self.tasks) {
            self.tasks.pop();
            return Err(err);
        }
        if !self.is_initial() || now > self.start_date {
            self.tasks_added += 1;
        }
        Ok(())
    }

    /// Look up a task by name.
    pub fn task(&self, name: &str) -> Option<&TopLevelTask> {
        self.tasks.iter().find(|t| t.name == name)
    }

    /// Mutable task lookup by name.
    pub fn task_mut(&mut self, name: &str) -> Option<&mut TopLevelTask> {
        self.tasks.iter_mut().find(|t| t.name == name)
    }

    /// Record the externally measured test-coverage ratio.
    pub fn set_test_coverage(&mut self, coverage: f64) -> Result<(), ValidationError> {
        if !coverage.is_finite() || !(0.0..=1.0).contains(&coverage) {
            return Err(ValidationError::InvalidCoverage { value: coverage });
        }
        self.test_coverage = Some(coverage);
        Ok(())
    }

    /// Whole days elapsed between the project start and `at`, floored at 0.
    pub fn elapsed_days(&self, at: DateTime<Utc>) -> f64 {
        (at - self.start_date).num_days().max(0) as f64
    }

    /// Whether no work has been recorded yet.
    pub fn is_initial(&self) -> bool {
        self.tasks.iter().all(|t| !t.is_started() && !t.is_complete())
    }

    /// Whether every task has completed.
    pub fn all_tasks_complete(&self) -> bool {
        !self.tasks.is_empty() && self.tasks.iter().all(TopLevelTask::is_complete)
    }

    /// The latest completion timestamp, once all tasks are complete.
    pub fn last_completion(&self) -> Option<DateTime<Utc>> {
        if !self.all_tasks_complete() {
            return None;
        }
        self.tasks.iter().filter_map(|t| t.completed_at).max()
    }

    /// Total estimated cost across all tasks.
    pub fn total_estimated_cost(&self) -> f64 {
        self.tasks.iter().map(|t| t.estimated_cost).sum()
    }

    /// Total actual spend across all tasks.
    pub fn total_actual_cost(&self) -> f64 {
        self.tasks.iter().map(TopLevelTask::total_cost).sum()
    }
}
