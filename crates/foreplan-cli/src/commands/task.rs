//! Task management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use foreplan_core::storage::Database;
use foreplan_core::task::{Estimate, Subtask, TopLevelTask};

#[derive(Subcommand)]
pub enum TaskAction {
    /// Add a task to a project
    Add {
        /// Project name
        project: String,
        /// Task name, unique within the project
        name: String,
        /// Optimistic duration in days
        #[arg(short = 'o', long)]
        optimistic: u32,
        /// Most likely duration in days
        #[arg(short = 'm', long)]
        most_likely: u32,
        /// Pessimistic duration in days
        #[arg(short = 'p', long)]
        pessimistic: u32,
        /// Budgeted cost
        #[arg(long)]
        cost: Option<f64>,
        /// How many developers the task is planned for
        #[arg(long)]
        developers_needed: Option<u32>,
        /// Comma-separated required skills
        #[arg(long)]
        skills: Option<String>,
        /// Comma-separated names of already-added tasks this one depends on
        #[arg(long)]
        depends_on: Option<String>,
        /// Add as a subtask of this existing task instead
        #[arg(long)]
        subtask: Option<String>,
    },
    /// Assign a developer to a task
    Assign {
        /// Project name
        project: String,
        /// Task name
        task: String,
        /// Developer name
        developer: String,
    },
    /// Mark a task as started
    Start {
        /// Project name
        project: String,
        /// Task name
        task: String,
    },
    /// Mark a task as completed
    Complete {
        /// Project name
        project: String,
        /// Task name
        task: String,
    },
    /// Record an actual spend item on a task
    Cost {
        /// Project name
        project: String,
        /// Task name
        task: String,
        /// What the money went to
        name: String,
        /// Amount spent
        amount: f64,
    },
    /// List tasks of a project
    List {
        /// Project name
        project: String,
        /// Print full task records as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: TaskAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        TaskAction::Add {
            project,
            name,
            optimistic,
            most_likely,
            pessimistic,
            cost,
            developers_needed,
            skills,
            depends_on,
            subtask,
        } => {
            let mut project = db.load_project(&project)?;
            let estimate = Estimate::new(optimistic, most_likely, pessimistic)?;

            if let Some(parent) = subtask {
                if cost.is_some()
                    || developers_needed.is_some()
                    || skills.is_some()
                    || depends_on.is_some()
                {
                    return Err("subtasks carry only a name and an estimate".into());
                }
                let parent_task = project
                    .task_mut(&parent)
                    .ok_or_else(|| format!("Task not found: {parent}"))?;
                parent_task.add_subtask(Subtask::new(name.clone(), estimate));
                db.save_project(&project)?;
                println!("Subtask added: {name} under {parent}");
            } else {
                let mut task = TopLevelTask::new(name.clone(), estimate);
                if let Some(cost) = cost {
                    task = task.with_estimated_cost(cost)?;
                }
                if let Some(count) = developers_needed {
                    task = task.with_expected_developers(count);
                }
                if let Some(s) = skills {
                    task = task.with_required_skills(
                        s.split(',').map(|p| p.trim().to_string()),
                    );
                }
                if let Some(d) = depends_on {
                    task = task
                        .with_dependencies(d.split(',').map(|p| p.trim().to_string()).collect());
                }
                project.add_task(task, Utc::now())?;
                db.save_project(&project)?;
                println!("Task added: {name}");
            }
        }
        TaskAction::Assign {
            project,
            task,
            developer,
        } => {
            let mut project = db.load_project(&project)?;
            let developer_id = project
                .developer_by_name(&developer)
                .map(|d| d.id)
                .ok_or_else(|| format!("Developer not found: {developer}"))?;
            let task_ref = project
                .task_mut(&task)
                .ok_or_else(|| format!("Task not found: {task}"))?;
            task_ref.developers.insert(developer_id);
            db.save_project(&project)?;
            println!("Assigned {developer} to {task}");
        }
        TaskAction::Start { project, task } => {
            let mut project = db.load_project(&project)?;
            let task_ref = project
                .task_mut(&task)
                .ok_or_else(|| format!("Task not found: {task}"))?;
            task_ref.start(Utc::now());
            db.save_project(&project)?;
            println!("Task started: {task}");
        }
        TaskAction::Complete { project, task } => {
            let mut project = db.load_project(&project)?;
            let task_ref = project
                .task_mut(&task)
                .ok_or_else(|| format!("Task not found: {task}"))?;
            task_ref.complete(Utc::now())?;
            db.save_project(&project)?;
            println!("Task completed: {task}");
        }
        TaskAction::Cost {
            project,
            task,
            name,
            amount,
        } => {
            let mut project = db.load_project(&project)?;
            let task_ref = project
                .task_mut(&task)
                .ok_or_else(|| format!("Task not found: {task}"))?;
            task_ref.add_cost(name, amount, Utc::now())?;
            db.save_project(&project)?;
            println!("Cost recorded: {amount:.2} on {task}");
        }
        TaskAction::List { project, json } => {
            let project = db.load_project(&project)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&project.tasks)?);
            } else {
                for task in &project.tasks {
                    let state = if task.is_complete() {
                        "complete"
                    } else if task.is_started() {
                        "started"
                    } else {
                        "pending"
                    };
                    if task.dependencies.is_empty() {
                        println!("{}  {:.0} days  {state}", task.name, task.estimated_days());
                    } else {
                        println!(
                            "{}  {:.0} days  {state}  after {}",
                            task.name,
                            task.estimated_days(),
                            task.dependencies.join(", ")
                        );
                    }
                }
            }
        }
    }
    Ok(())
}
