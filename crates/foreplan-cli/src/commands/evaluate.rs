//! Risk evaluation commands for CLI.

use chrono::{DateTime, Duration, Utc};
use clap::Subcommand;
use foreplan_core::evaluator::{EvaluationInput, Evaluator, EvaluatorConfig};
use foreplan_core::integrations::CommitClient;
use foreplan_core::project::Project;
use foreplan_core::report::Evaluation;
use foreplan_core::storage::{Config, Database};
use foreplan_core::weights::EvaluationSample;

#[derive(Subcommand)]
pub enum EvaluateAction {
    /// Evaluate a project and persist the record
    Run {
        /// Project name
        project: String,
        /// Skip the GitHub commit fetch
        #[arg(long)]
        offline: bool,
    },
    /// Show stored evaluations, newest first
    History {
        /// Project name
        project: String,
        /// Maximum number of records
        #[arg(long, default_value = "10")]
        limit: u32,
    },
    /// Show the most recent evaluation
    Latest {
        /// Project name
        project: String,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: EvaluateAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        EvaluateAction::Run { project, offline } => {
            let mut project = db.load_project(&project)?;
            let config = Config::load_or_default();
            let now = Utc::now();

            let commits = if offline {
                None
            } else {
                match fetch_commits(&project, &config, now) {
                    Ok(commits) => commits,
                    Err(e) => {
                        eprintln!("commit fetch failed: {e}");
                        None
                    }
                }
            };

            let state = db.weight_state()?;
            let evaluator = Evaluator::new(EvaluatorConfig {
                noise_seed: config.evaluation.noise_seed,
            });
            let evaluation = evaluator.evaluate(
                &mut project,
                EvaluationInput {
                    commits: commits.as_deref(),
                },
                &state.base,
                state.projects_evaluated,
                now,
            )?;

            // The evaluation refreshed the schedule fields on the tasks.
            db.save_project(&project)?;
            db.record_evaluation(&evaluation)?;
            db.bump_projects_evaluated()?;

            if evaluation.status.is_terminal() {
                db.record_outcome(EvaluationSample {
                    risk: evaluation.risk,
                    completed: project.all_tasks_complete(),
                    weights: evaluation.weights,
                })?;
            }

            print_report(&evaluation);
        }
        EvaluateAction::History { project, limit } => {
            let project = db.load_project(&project)?;
            let evaluations = db.evaluations_for(project.id, limit)?;
            if evaluations.is_empty() {
                println!("No evaluations recorded");
            }
            for evaluation in &evaluations {
                println!(
                    "{}  {}  risk {:.3}  {}",
                    evaluation.evaluated_at.format("%Y-%m-%d %H:%M"),
                    evaluation.mode.as_str(),
                    evaluation.risk,
                    evaluation.status
                );
            }
        }
        EvaluateAction::Latest { project, json } => {
            let project = db.load_project(&project)?;
            match db.latest_evaluation(project.id)? {
                Some(evaluation) if json => {
                    println!("{}", serde_json::to_string_pretty(&evaluation)?)
                }
                Some(evaluation) => print_report(&evaluation),
                None => println!("No evaluations recorded"),
            }
        }
    }
    Ok(())
}

/// Fetch commit timestamps for the linked repository, if any.
///
/// Returns `None` when the project has no GitHub link or no token is
/// stored; network and API failures bubble up to the caller.
fn fetch_commits(
    project: &Project,
    config: &Config,
    now: DateTime<Utc>,
) -> Result<Option<Vec<DateTime<Utc>>>, Box<dyn std::error::Error>> {
    let Some(link) = &project.github else {
        return Ok(None);
    };
    let client = CommitClient::new(&config.github);
    if !client.is_authenticated() {
        return Ok(None);
    }

    let since = now - Duration::days(i64::from(config.evaluation.commit_window_days));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let commits = runtime.block_on(client.list_commit_timestamps(
        &link.owner,
        &link.repo,
        link.branch.as_deref(),
        Some(since),
    ))?;
    Ok(Some(commits))
}

fn print_report(evaluation: &Evaluation) {
    println!("mode: {}", evaluation.mode.as_str());
    println!("status: {}", evaluation.status);
    println!("risk: {:.3}", evaluation.risk);
    if let Some(days) = evaluation.projected_finish_days {
        println!("projected finish: {days:.1} days");
    }
    println!();
    println!("metrics (weight x normalized):");
    for metric in &evaluation.metrics {
        println!(
            "  {:<34} {:.2} x {:.3}  (raw {:.3})",
            metric.label, metric.weight, metric.value, metric.raw
        );
    }
    if !evaluation.suggestions.is_empty() {
        println!();
        println!("suggestions:");
        for suggestion in &evaluation.suggestions {
            println!("  [{}] {}", suggestion.severity, suggestion.description);
            println!("      {}", suggestion.resolution);
        }
    }
}
