//! # Foreplan Core Library
//!
//! This library provides the core logic for Foreplan, a project
//! failure-risk estimator. It implements a CLI-first philosophy where all
//! operations are available via a standalone CLI binary over the same core
//! library.
//!
//! ## Architecture
//!
//! - **Model**: Projects, tasks with three-point estimates, developers,
//!   moods, and the task dependency graph
//! - **Scheduling**: PERT estimation and critical-path (CPM) passes over
//!   the task graph
//! - **Risk**: Normalized metrics combined under an adaptive weight vector,
//!   plus a typed suggestion generator
//! - **Storage**: SQLite-based project and evaluation persistence and
//!   TOML-based configuration
//! - **Integrations**: GitHub commit history for the cadence metric
//!
//! ## Key Components
//!
//! - [`Project`]: The evaluated unit -- tasks, developers, budget, frame
//! - [`Evaluator`]: Drives one evaluation into an [`Evaluation`] record
//! - [`Database`]: Project, evaluation, and weight-state persistence
//! - [`Config`]: Application configuration management

pub mod cpm;
pub mod error;
pub mod evaluator;
pub mod graph;
pub mod integrations;
pub mod metrics;
pub mod project;
pub mod report;
pub mod storage;
pub mod suggest;
pub mod task;
pub mod weights;

pub use cpm::Schedule;
pub use error::{ConfigError, CoreError, DatabaseError, IntegrationError, ValidationError};
pub use evaluator::{EvaluationInput, EvaluationMode, Evaluator, EvaluatorConfig};
pub use graph::TaskGraph;
pub use integrations::CommitClient;
pub use metrics::{MetricKind, RiskMetric};
pub use project::{Developer, GithubLink, Mood, MoodHistory, Project, ProjectStatus};
pub use report::{Evaluation, MetricReport, SuggestionReport};
pub use storage::{Config, Database, WeightState};
pub use suggest::{Severity, Suggestion};
pub use task::{CostItem, Estimate, ScheduleTimes, Subtask, TopLevelTask};
pub use weights::{EvaluationSample, WeightVector, LEARNING_WINDOW};
