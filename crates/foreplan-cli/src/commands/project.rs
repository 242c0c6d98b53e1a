//! Project management commands for CLI.

use chrono::Utc;
use clap::Subcommand;
use foreplan_core::project::{Developer, GithubLink, Mood, Project};
use foreplan_core::storage::Database;

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project
    Create {
        /// Project name
        name: String,
        /// Total budget
        #[arg(long)]
        budget: f64,
        /// Allowed duration in days
        #[arg(long)]
        time_frame: u32,
        /// Start date as ISO 8601 string (default: now)
        #[arg(long)]
        start: Option<String>,
    },
    /// List all projects
    List,
    /// Show one project
    Show {
        /// Project name
        name: String,
        /// Print the full record as JSON
        #[arg(long)]
        json: bool,
    },
    /// Add a developer to the roster
    AddDeveloper {
        /// Project name
        project: String,
        /// Developer name
        name: String,
        /// Comma-separated skills
        #[arg(long)]
        skills: Option<String>,
    },
    /// Record a developer mood sample
    Mood {
        /// Project name
        project: String,
        /// Developer name
        developer: String,
        /// One of: awful, bad, neutral, good, great
        mood: String,
    },
    /// Link a GitHub repository for commit metrics
    LinkGithub {
        /// Project name
        project: String,
        /// Repository as owner/repo or a github.com URL
        repo: String,
        /// Branch to inspect (repository default when omitted)
        #[arg(long)]
        branch: Option<String>,
    },
    /// Record measured test coverage
    Coverage {
        /// Project name
        project: String,
        /// Coverage ratio in [0, 1]
        ratio: f64,
    },
    /// Delete a project and its stored evaluations
    Delete {
        /// Project name
        name: String,
    },
}

pub fn run(action: ProjectAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::open()?;

    match action {
        ProjectAction::Create {
            name,
            budget,
            time_frame,
            start,
        } => {
            let start_date = match start {
                Some(s) => chrono::DateTime::parse_from_rfc3339(&s)
                    .map_err(|e| format!("invalid start date: {e}"))?
                    .with_timezone(&Utc),
                None => Utc::now(),
            };
            let project = Project::new(name, budget, time_frame, start_date)?;
            db.save_project(&project)?;
            println!("Project created: {}", project.name);
        }
        ProjectAction::List => {
            let projects = db.list_projects()?;
            for project in &projects {
                println!(
                    "{}  budget {:.2}  {} days  {} tasks",
                    project.name,
                    project.budget,
                    project.time_frame_days,
                    project.tasks.len()
                );
            }
        }
        ProjectAction::Show { name, json } => {
            let project = db.load_project(&name)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&project)?);
            } else {
                print_summary(&project);
            }
        }
        ProjectAction::AddDeveloper {
            project,
            name,
            skills,
        } => {
            let mut project = db.load_project(&project)?;
            let skills: Vec<String> = skills
                .map(|s| s.split(',').map(|p| p.trim().to_string()).collect())
                .unwrap_or_default();
            project.add_developer(Developer::new(name.clone(), skills));
            db.save_project(&project)?;
            println!("Developer added: {name}");
        }
        ProjectAction::Mood {
            project,
            developer,
            mood,
        } => {
            let mut project = db.load_project(&project)?;
            let parsed = Mood::parse(&mood)
                .ok_or_else(|| format!("unknown mood: {mood} (awful, bad, neutral, good, great)"))?;
            let developer_id = project
                .developer_by_name(&developer)
                .map(|d| d.id)
                .ok_or_else(|| format!("Developer not found: {developer}"))?;
            project.record_mood(developer_id, parsed)?;
            db.save_project(&project)?;
            println!("Mood recorded: {developer} is {}", parsed.as_str());
        }
        ProjectAction::LinkGithub {
            project,
            repo,
            branch,
        } => {
            let mut project = db.load_project(&project)?;
            let mut link = GithubLink::parse(&repo)?;
            link.branch = branch;
            let label = link.to_string();
            project.github = Some(link);
            db.save_project(&project)?;
            println!("GitHub linked: {label}");
        }
        ProjectAction::Coverage { project, ratio } => {
            let mut project = db.load_project(&project)?;
            project.set_test_coverage(ratio)?;
            db.save_project(&project)?;
            println!("Test coverage recorded: {ratio:.2}");
        }
        ProjectAction::Delete { name } => {
            db.delete_project(&name)?;
            println!("Project deleted: {name}");
        }
    }
    Ok(())
}

fn print_summary(project: &Project) {
    println!("name: {}", project.name);
    println!("budget: {:.2}", project.budget);
    println!(
        "time frame: {} days from {}",
        project.time_frame_days,
        project.start_date.format("%Y-%m-%d")
    );
    let complete = project.tasks.iter().filter(|t| t.is_complete()).count();
    println!("tasks: {} ({complete} complete)", project.tasks.len());
    println!("developers: {}", project.developers.len());
    if let Some(link) = &project.github {
        match &link.branch {
            Some(branch) => println!("github: {link} (branch {branch})"),
            None => println!("github: {link}"),
        }
    }
    if let Some(coverage) = project.test_coverage {
        println!("test coverage: {coverage:.2}");
    }
}
