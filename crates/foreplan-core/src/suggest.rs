//! Typed suggestions derived from the evaluated project state.
//!
//! Every suggestion is one variant of a closed union with a typed payload;
//! descriptions, resolutions, and severities are exhaustive matches over
//! that union, so adding a variant is a compile-time checklist rather than
//! a string-keyed lookup. One generator function per rule keeps each rule
//! testable on its own; [`generate`] runs them all in a stable order.
//!
//! The rules read the refreshed schedule fields, so callers run the CPM
//! passes first.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::evaluator::EvaluationMode;
use crate::project::{Developer, Project};
use crate::task::TopLevelTask;

/// Weighted mood below this emits a low-mood suggestion.
pub const BAD_MOOD_THRESHOLD: f64 = -0.5;

/// Weighted mood at or below this escalates the suggestion to Major.
pub const VERY_BAD_MOOD_THRESHOLD: f64 = -1.5;

/// Working hours assumed per estimated day.
const HOURS_PER_DAY: f64 = 8.0;

/// How urgent a suggestion is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Worth a look
    Minor,
    /// Needs attention soon
    Moderate,
    /// Actively threatening the project
    Major,
}

impl Severity {
    /// Stable lowercase label, matching the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Minor => "minor",
            Severity::Moderate => "moderate",
            Severity::Major => "major",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A concrete, resolvable risk found in the project.
#[derive(Debug, Clone, PartialEq)]
pub enum Suggestion {
    /// A started task has run past its estimate by more than its slack buys.
    DelayedTaskExceedsSlack {
        task: String,
        days_late: f64,
        slack: f64,
    },
    /// Actual spend on a task has passed its estimated cost.
    TaskExceedsEstimatedCost {
        task: String,
        estimated: f64,
        actual: f64,
    },
    /// A started task has fewer developers than planned.
    TaskMissingDevelopers {
        task: String,
        expected: u32,
        assigned: u32,
        critical: bool,
    },
    /// A required skill no developer on the roster has.
    MissingSkill { skill: String, tasks: Vec<String> },
    /// The costliest task while the estimates already exceed the budget.
    MostExpensiveTask {
        task: String,
        estimated: f64,
        budget_share: f64,
    },
    /// A developer's weighted mood has dropped below the bad threshold.
    LowDeveloperMood { developer: String, score: f64 },
    /// A started task whose team's mean mood is below the bad threshold.
    SharedTaskLowMood {
        task: String,
        developers: Vec<String>,
        mean_score: f64,
    },
    /// An assigned developer lacks a large share of a task's skills.
    SkillMismatch {
        task: String,
        developer: String,
        missing: Vec<String>,
        missing_share: f64,
    },
    /// A developer's weekly load sits far from the team mean.
    UnevenWorkDistribution {
        developer: String,
        weekly_hours: f64,
        mean: f64,
        deviation_hours: f64,
    },
}

impl Suggestion {
    /// Stable snake_case tag for reports and storage.
    pub fn kind(&self) -> &'static str {
        match self {
            Suggestion::DelayedTaskExceedsSlack { .. } => "delayed_task_exceeds_slack",
            Suggestion::TaskExceedsEstimatedCost { .. } => "task_exceeds_estimated_cost",
            Suggestion::TaskMissingDevelopers { .. } => "task_missing_developers",
            Suggestion::MissingSkill { .. } => "missing_skill",
            Suggestion::MostExpensiveTask { .. } => "most_expensive_task",
            Suggestion::LowDeveloperMood { .. } => "low_developer_mood",
            Suggestion::SharedTaskLowMood { .. } => "shared_task_low_mood",
            Suggestion::SkillMismatch { .. } => "skill_mismatch",
            Suggestion::UnevenWorkDistribution { .. } => "uneven_work_distribution",
        }
    }

    /// What was found.
    pub fn description(&self) -> String {
        match self {
            Suggestion::DelayedTaskExceedsSlack {
                task,
                days_late,
                slack,
            } => format!(
                "Task '{task}' is {days_late:.0} days behind its estimate with {slack:.0} days of slack"
            ),
            Suggestion::TaskExceedsEstimatedCost {
                task,
                estimated,
                actual,
            } => format!(
                "Task '{task}' has spent {actual:.2} against an estimated cost of {estimated:.2}"
            ),
            Suggestion::TaskMissingDevelopers {
                task,
                expected,
                assigned,
                ..
            } => format!(
                "Task '{task}' is staffed with {assigned} of the {expected} developers it needs"
            ),
            Suggestion::MissingSkill { skill, tasks } => format!(
                "No developer covers '{skill}', required by {}",
                tasks.join(", ")
            ),
            Suggestion::MostExpensiveTask {
                task, estimated, ..
            } => format!(
                "Estimated costs exceed the budget; '{task}' is the largest at {estimated:.2}"
            ),
            Suggestion::LowDeveloperMood { developer, score } => {
                format!("Developer '{developer}' has a low mood trend (score {score:.2})")
            }
            Suggestion::SharedTaskLowMood {
                task, mean_score, ..
            } => format!(
                "The team on task '{task}' averages a low mood (score {mean_score:.2})"
            ),
            Suggestion::SkillMismatch {
                task,
                developer,
                missing,
                ..
            } => format!(
                "Developer '{developer}' on task '{task}' lacks: {}",
                missing.join(", ")
            ),
            Suggestion::UnevenWorkDistribution {
                developer,
                weekly_hours,
                mean,
                ..
            } => format!(
                "Developer '{developer}' carries {weekly_hours:.1}h per week against a team mean of {mean:.1}h"
            ),
        }
    }

    /// What to do about it.
    pub fn resolution(&self) -> String {
        match self {
            Suggestion::DelayedTaskExceedsSlack { task, .. } => format!(
                "Re-plan task '{task}': add developers, split it, or push dependent tasks out"
            ),
            Suggestion::TaskExceedsEstimatedCost { task, .. } => format!(
                "Review the remaining spend on '{task}' and update its cost estimate"
            ),
            Suggestion::TaskMissingDevelopers { task, .. } => {
                format!("Assign more developers to task '{task}' or lower its staffing plan")
            }
            Suggestion::MissingSkill { skill, .. } => format!(
                "Hire for '{skill}', train an existing developer, or contract the work out"
            ),
            Suggestion::MostExpensiveTask { task, .. } => format!(
                "Descope or re-estimate '{task}', or raise the budget to cover the gap"
            ),
            Suggestion::LowDeveloperMood { developer, .. } => format!(
                "Check in with '{developer}' and reduce pressure where possible"
            ),
            Suggestion::SharedTaskLowMood { task, .. } => format!(
                "Investigate what makes task '{task}' painful for the whole team"
            ),
            Suggestion::SkillMismatch {
                task, developer, ..
            } => format!(
                "Pair '{developer}' with someone versed in the missing skills or reassign '{task}'"
            ),
            Suggestion::UnevenWorkDistribution { developer, .. } => format!(
                "Rebalance upcoming work to level '{developer}' with the rest of the team"
            ),
        }
    }

    /// Urgency tier for the suggestion.
    ///
    /// Panics for an `UnevenWorkDistribution` whose deviation is under one
    /// hour; the generator filters those out, so seeing one is a bug in the
    /// caller, not a data condition.
    pub fn severity(&self) -> Severity {
        match self {
            Suggestion::DelayedTaskExceedsSlack {
                days_late, slack, ..
            } => {
                if *days_late > slack * 2.0 {
                    Severity::Major
                } else if *days_late > *slack {
                    Severity::Moderate
                } else {
                    Severity::Minor
                }
            }
            Suggestion::TaskExceedsEstimatedCost {
                estimated, actual, ..
            } => {
                let overrun = actual / estimated;
                if overrun >= 1.5 {
                    Severity::Major
                } else if overrun >= 1.2 {
                    Severity::Moderate
                } else {
                    Severity::Minor
                }
            }
            Suggestion::TaskMissingDevelopers { critical, .. } => {
                if *critical {
                    Severity::Major
                } else {
                    Severity::Moderate
                }
            }
            Suggestion::MissingSkill { tasks, .. } => {
                if tasks.len() > 1 {
                    Severity::Major
                } else {
                    Severity::Moderate
                }
            }
            Suggestion::MostExpensiveTask { budget_share, .. } => {
                if *budget_share >= 0.5 {
                    Severity::Major
                } else if *budget_share >= 0.25 {
                    Severity::Moderate
                } else {
                    Severity::Minor
                }
            }
            Suggestion::LowDeveloperMood { score, .. } => {
                if *score <= VERY_BAD_MOOD_THRESHOLD {
                    Severity::Major
                } else {
                    Severity::Moderate
                }
            }
            Suggestion::SharedTaskLowMood { mean_score, .. } => {
                if *mean_score <= VERY_BAD_MOOD_THRESHOLD {
                    Severity::Major
                } else {
                    Severity::Moderate
                }
            }
            Suggestion::SkillMismatch { missing_share, .. } => {
                if *missing_share >= 1.0 {
                    Severity::Major
                } else if *missing_share >= 0.5 {
                    Severity::Moderate
                } else {
                    Severity::Minor
                }
            }
            Suggestion::UnevenWorkDistribution {
                deviation_hours, ..
            } => {
                let deviation = deviation_hours.abs();
                assert!(
                    deviation >= 1.0,
                    "work distribution deviation below the reporting floor: {deviation}"
                );
                if deviation >= 8.0 {
                    Severity::Major
                } else if deviation >= 4.0 {
                    Severity::Moderate
                } else {
                    Severity::Minor
                }
            }
        }
    }

    /// Flatten into the serializable report form.
    pub fn to_report(&self) -> crate::report::SuggestionReport {
        self.into()
    }

    /// Payload fields as strings, for reports.
    pub fn extras(&self) -> BTreeMap<String, String> {
        let mut map = BTreeMap::new();
        match self {
            Suggestion::DelayedTaskExceedsSlack {
                task,
                days_late,
                slack,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("days_late".into(), format!("{days_late:.1}"));
                map.insert("slack".into(), format!("{slack:.1}"));
            }
            Suggestion::TaskExceedsEstimatedCost {
                task,
                estimated,
                actual,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("estimated".into(), format!("{estimated:.2}"));
                map.insert("actual".into(), format!("{actual:.2}"));
            }
            Suggestion::TaskMissingDevelopers {
                task,
                expected,
                assigned,
                critical,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("expected".into(), expected.to_string());
                map.insert("assigned".into(), assigned.to_string());
                map.insert("critical".into(), critical.to_string());
            }
            Suggestion::MissingSkill { skill, tasks } => {
                map.insert("skill".into(), skill.clone());
                map.insert("tasks".into(), tasks.join(", "));
            }
            Suggestion::MostExpensiveTask {
                task,
                estimated,
                budget_share,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("estimated".into(), format!("{estimated:.2}"));
                map.insert("budget_share".into(), format!("{budget_share:.2}"));
            }
            Suggestion::LowDeveloperMood { developer, score } => {
                map.insert("developer".into(), developer.clone());
                map.insert("score".into(), format!("{score:.2}"));
            }
            Suggestion::SharedTaskLowMood {
                task,
                developers,
                mean_score,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("developers".into(), developers.join(", "));
                map.insert("mean_score".into(), format!("{mean_score:.2}"));
            }
            Suggestion::SkillMismatch {
                task,
                developer,
                missing,
                missing_share,
            } => {
                map.insert("task".into(), task.clone());
                map.insert("developer".into(), developer.clone());
                map.insert("missing".into(), missing.join(", "));
                map.insert("missing_share".into(), format!("{missing_share:.2}"));
            }
            Suggestion::UnevenWorkDistribution {
                developer,
                weekly_hours,
                mean,
                deviation_hours,
            } => {
                map.insert("developer".into(), developer.clone());
                map.insert("weekly_hours".into(), format!("{weekly_hours:.1}"));
                map.insert("mean".into(), format!("{mean:.1}"));
                map.insert("deviation_hours".into(), format!("{deviation_hours:.1}"));
            }
        }
        map
    }
}

/// Roster developers assigned to the task or its subtasks.
fn assigned_roster<'a>(project: &'a Project, task: &TopLevelTask) -> Vec<&'a Developer> {
    task.all_developers()
        .iter()
        .filter_map(|id| project.developer(*id))
        .collect()
}

/// Started, incomplete tasks whose elapsed time has passed their estimate.
pub fn delayed_tasks(project: &Project, now: DateTime<Utc>) -> Vec<Suggestion> {
    let elapsed = project.elapsed_days(now);
    project
        .tasks
        .iter()
        .filter(|t| t.is_started() && !t.is_complete())
        .filter_map(|t| {
            let days_late = elapsed - t.schedule.early_start - t.estimated_days();
            if days_late > 0.0 {
                Some(Suggestion::DelayedTaskExceedsSlack {
                    task: t.name.clone(),
                    days_late,
                    slack: t.schedule.slack,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Tasks whose recorded spend has passed their estimated cost.
pub fn cost_overruns(project: &Project) -> Vec<Suggestion> {
    project
        .tasks
        .iter()
        .filter(|t| t.estimated_cost > 0.0)
        .filter_map(|t| {
            let actual = t.total_cost();
            if actual > t.estimated_cost {
                Some(Suggestion::TaskExceedsEstimatedCost {
                    task: t.name.clone(),
                    estimated: t.estimated_cost,
                    actual,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Started tasks staffed below their planned head count.
pub fn understaffed_tasks(project: &Project) -> Vec<Suggestion> {
    project
        .tasks
        .iter()
        .filter(|t| t.is_started() && !t.is_complete() && t.expected_developers > 0)
        .filter_map(|t| {
            let assigned = t.all_developers().len() as u32;
            if assigned < t.expected_developers {
                Some(Suggestion::TaskMissingDevelopers {
                    task: t.name.clone(),
                    expected: t.expected_developers,
                    assigned,
                    critical: t.is_critical(),
                })
            } else {
                None
            }
        })
        .collect()
}

/// Required skills held by no developer, with every task that needs them.
pub fn uncovered_skills(project: &Project) -> Vec<Suggestion> {
    let required: BTreeSet<&String> = project
        .tasks
        .iter()
        .flat_map(|t| t.required_skills.iter())
        .collect();

    required
        .into_iter()
        .filter(|skill| {
            !project
                .developers
                .iter()
                .any(|dev| dev.skills.contains(skill.as_str()))
        })
        .map(|skill| {
            let tasks: Vec<String> = project
                .tasks
                .iter()
                .filter(|t| t.required_skills.contains(skill))
                .map(|t| t.name.clone())
                .collect();
            Suggestion::MissingSkill {
                skill: skill.clone(),
                tasks,
            }
        })
        .collect()
}

/// The costliest task, when estimates already exceed the budget.
///
/// Only meaningful before work starts; the cost and schedule indices take
/// over once actuals exist.
pub fn most_expensive_task(project: &Project) -> Option<Suggestion> {
    if project.total_estimated_cost() <= project.budget {
        return None;
    }
    let costliest = project
        .tasks
        .iter()
        .max_by(|a, b| a.estimated_cost.total_cmp(&b.estimated_cost))?;

    let budget_share = if project.budget > 0.0 {
        costliest.estimated_cost / project.budget
    } else {
        1.0
    };
    Some(Suggestion::MostExpensiveTask {
        task: costliest.name.clone(),
        estimated: costliest.estimated_cost,
        budget_share,
    })
}

/// Developers whose weighted mood has crossed the bad threshold.
pub fn low_moods(project: &Project) -> Vec<Suggestion> {
    project
        .developers
        .iter()
        .filter_map(|dev| {
            let score = project.mood_score(dev.id)?;
            if score < BAD_MOOD_THRESHOLD {
                Some(Suggestion::LowDeveloperMood {
                    developer: dev.name.clone(),
                    score,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Started tasks whose whole team trends toward a bad mood.
pub fn shared_low_moods(project: &Project) -> Vec<Suggestion> {
    project
        .tasks
        .iter()
        .filter(|t| t.is_started() && !t.is_complete())
        .filter_map(|t| {
            let team = assigned_roster(project, t);
            if team.len() < 2 {
                return None;
            }
            let mean_score = team
                .iter()
                .map(|dev| project.mood_score(dev.id).unwrap_or(0.0))
                .sum::<f64>()
                / team.len() as f64;
            if mean_score < BAD_MOOD_THRESHOLD {
                Some(Suggestion::SharedTaskLowMood {
                    task: t.name.clone(),
                    developers: team.iter().map(|dev| dev.name.clone()).collect(),
                    mean_score,
                })
            } else {
                None
            }
        })
        .collect()
}

/// Assigned developers missing at least half of a task's required skills.
pub fn skill_mismatches(project: &Project) -> Vec<Suggestion> {
    let mut out = Vec::new();
    for task in project
        .tasks
        .iter()
        .filter(|t| t.is_started() && !t.is_complete() && !t.required_skills.is_empty())
    {
        for dev in assigned_roster(project, task) {
            let missing: Vec<String> = task
                .required_skills
                .iter()
                .filter(|skill| !dev.skills.contains(*skill))
                .cloned()
                .collect();
            let missing_share = missing.len() as f64 / task.required_skills.len() as f64;
            if missing_share >= 0.5 {
                out.push(Suggestion::SkillMismatch {
                    task: task.name.clone(),
                    developer: dev.name.clone(),
                    missing,
                    missing_share,
                });
            }
        }
    }
    out
}

/// Developers whose weekly load deviates from the team mean by an hour or
/// more.
///
/// Remaining (incomplete) task hours are split evenly across each task's
/// assigned developers and divided by the weeks left before the time frame
/// (at least one week). Needs two or more loaded developers to compare.
pub fn uneven_work_distribution(project: &Project, now: DateTime<Utc>) -> Vec<Suggestion> {
    let weeks_left = ((f64::from(project.time_frame_days) - project.elapsed_days(now)) / 7.0).max(1.0);

    let mut hours: BTreeMap<uuid::Uuid, f64> = BTreeMap::new();
    for task in project.tasks.iter().filter(|t| !t.is_complete()) {
        let team = assigned_roster(project, task);
        if team.is_empty() {
            continue;
        }
        let share = task.estimated_days() * HOURS_PER_DAY / team.len() as f64;
        for dev in team {
            *hours.entry(dev.id).or_insert(0.0) += share;
        }
    }

    if hours.len() < 2 {
        return Vec::new();
    }
    let mean = hours.values().map(|h| h / weeks_left).sum::<f64>() / hours.len() as f64;

    hours
        .iter()
        .filter_map(|(id, total)| {
            let weekly_hours = total / weeks_left;
            let deviation_hours = weekly_hours - mean;
            if deviation_hours.abs() < 1.0 {
                return None;
            }
            let developer = project.developer(*id)?;
            Some(Suggestion::UnevenWorkDistribution {
                developer: developer.name.clone(),
                weekly_hours,
                mean,
                deviation_hours,
            })
        })
        .collect()
}

/// Run every rule in a stable order.
pub fn generate(project: &Project, now: DateTime<Utc>, mode: EvaluationMode) -> Vec<Suggestion> {
    let mut out = Vec::new();
    out.extend(delayed_tasks(project, now));
    out.extend(cost_overruns(project));
    out.extend(understaffed_tasks(project));
    out.extend(uncovered_skills(project));
    if mode == EvaluationMode::Initial {
        out.extend(most_expensive_task(project));
    }
    out.extend(low_moods(project));
    out.extend(shared_low_moods(project));
    out.extend(skill_mismatches(project));
    out.extend(uneven_work_distribution(project, now));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::Mood;
    use crate::task::Estimate;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn make_project(budget: f64, time_frame_days: u32) -> Project {
        Project::new("atlas", budget, time_frame_days, date(2026, 1, 1)).unwrap()
    }

    fn make_task(name: &str, o: u32, m: u32, p: u32) -> TopLevelTask {
        TopLevelTask::new(name, Estimate::new(o, m, p).unwrap())
    }

    fn add_dev(project: &mut Project, name: &str, skills: &[&str]) -> uuid::Uuid {
        let dev = Developer::new(name, skills.iter().map(|s| s.to_string()));
        let id = dev.id;
        project.add_developer(dev);
        id
    }

    #[test]
    fn delayed_task_is_reported_with_its_slack() {
        let mut project = make_project(100.0, 60);
        let mut task = make_task("api", 9, 10, 11); // estimate 10
        task.schedule.early_start = 0.0;
        task.schedule.slack = 3.0;
        task.start(date(2026, 1, 1));
        project.tasks.push(task);

        // day 15: 5 days past the 10-day estimate
        let found = delayed_tasks(&project, date(2026, 1, 16));
        assert_eq!(found.len(), 1);
        match &found[0] {
            Suggestion::DelayedTaskExceedsSlack {
                task,
                days_late,
                slack,
            } => {
                assert_eq!(task, "api");
                assert_eq!(*days_late, 5.0);
                assert_eq!(*slack, 3.0);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        // 5 days late against 3 days of slack, under twice the slack
        assert_eq!(found[0].severity(), Severity::Moderate);
    }

    #[test]
    fn on_time_tasks_stay_quiet() {
        let mut project = make_project(100.0, 60);
        let mut task = make_task("api", 9, 10, 11);
        task.start(date(2026, 1, 1));
        project.tasks.push(task);

        assert!(delayed_tasks(&project, date(2026, 1, 5)).is_empty());
    }

    #[test]
    fn delay_on_a_critical_task_is_major() {
        let suggestion = Suggestion::DelayedTaskExceedsSlack {
            task: "api".into(),
            days_late: 1.0,
            slack: 0.0,
        };
        assert_eq!(suggestion.severity(), Severity::Major);
    }

    #[test]
    fn cost_overrun_severity_follows_the_ratio() {
        let mut project = make_project(1000.0, 60);
        let mut task = make_task("api", 1, 2, 3).with_estimated_cost(100.0).unwrap();
        task.add_cost("contractors", 130.0, date(2026, 1, 5)).unwrap();
        project.tasks.push(task);

        let found = cost_overruns(&project);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity(), Severity::Moderate);

        let major = Suggestion::TaskExceedsEstimatedCost {
            task: "api".into(),
            estimated: 100.0,
            actual: 151.0,
        };
        assert_eq!(major.severity(), Severity::Major);

        let minor = Suggestion::TaskExceedsEstimatedCost {
            task: "api".into(),
            estimated: 100.0,
            actual: 101.0,
        };
        assert_eq!(minor.severity(), Severity::Minor);
    }

    #[test]
    fn understaffed_critical_task_is_major() {
        let mut project = make_project(100.0, 60);
        let dev = add_dev(&mut project, "ada", &[]);

        let mut task = make_task("api", 9, 10, 11).with_expected_developers(3);
        task.developers.insert(dev);
        task.schedule.slack = 0.0;
        task.start(date(2026, 1, 2));
        project.tasks.push(task);

        let found = understaffed_tasks(&project);
        assert_eq!(found.len(), 1);
        match &found[0] {
            Suggestion::TaskMissingDevelopers {
                expected, assigned, ..
            } => {
                assert_eq!(*expected, 3);
                assert_eq!(*assigned, 1);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        assert_eq!(found[0].severity(), Severity::Major);
    }

    #[test]
    fn uncovered_skill_lists_every_task_and_escalates() {
        let mut project = make_project(100.0, 60);
        add_dev(&mut project, "ada", &["rust"]);
        project
            .add_task(
                make_task("api", 1, 2, 3).with_required_skills(["ml".to_string()]),
                date(2025, 12, 1),
            )
            .unwrap();
        project
            .add_task(
                make_task("model", 1, 2, 3).with_required_skills(["ml".to_string()]),
                date(2025, 12, 1),
            )
            .unwrap();

        let found = uncovered_skills(&project);
        assert_eq!(found.len(), 1);
        match &found[0] {
            Suggestion::MissingSkill { skill, tasks } => {
                assert_eq!(skill, "ml");
                assert_eq!(tasks, &vec!["api".to_string(), "model".to_string()]);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        assert_eq!(found[0].severity(), Severity::Major);
    }

    #[test]
    fn over_budget_estimates_flag_the_costliest_task() {
        let mut project = make_project(35.0, 30);
        let task = make_task("build", 1, 2, 3).with_estimated_cost(50.0).unwrap();
        project.add_task(task, date(2025, 12, 1)).unwrap();

        let suggestion = most_expensive_task(&project).unwrap();
        match &suggestion {
            Suggestion::MostExpensiveTask {
                task, estimated, ..
            } => {
                assert_eq!(task, "build");
                assert_eq!(*estimated, 50.0);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        assert_eq!(suggestion.severity(), Severity::Major);
    }

    #[test]
    fn within_budget_estimates_stay_quiet() {
        let mut project = make_project(100.0, 30);
        let task = make_task("build", 1, 2, 3).with_estimated_cost(50.0).unwrap();
        project.add_task(task, date(2025, 12, 1)).unwrap();
        assert!(most_expensive_task(&project).is_none());
    }

    #[test]
    fn one_awful_sample_makes_a_moderate_mood_suggestion() {
        let mut project = make_project(100.0, 30);
        let dev = add_dev(&mut project, "ada", &[]);
        project.record_mood(dev, Mood::Awful).unwrap();

        let found = low_moods(&project);
        assert_eq!(found.len(), 1);
        match &found[0] {
            Suggestion::LowDeveloperMood { developer, score } => {
                assert_eq!(developer, "ada");
                assert!((score - (-1.4)).abs() < 1e-12);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        assert_eq!(found[0].severity(), Severity::Moderate);
    }

    #[test]
    fn sustained_awful_mood_is_major() {
        let mut project = make_project(100.0, 30);
        let dev = add_dev(&mut project, "ada", &[]);
        project.record_mood(dev, Mood::Awful).unwrap();
        project.record_mood(dev, Mood::Awful).unwrap();

        // [neutral x3, awful, awful] = -2 * 0.8 = -1.6
        let found = low_moods(&project);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity(), Severity::Major);
    }

    #[test]
    fn unrecorded_moods_never_alert() {
        let mut project = make_project(100.0, 30);
        add_dev(&mut project, "ada", &[]);
        assert!(low_moods(&project).is_empty());
    }

    #[test]
    fn shared_low_mood_needs_a_team_of_two() {
        let mut project = make_project(100.0, 30);
        let ada = add_dev(&mut project, "ada", &[]);
        let grace = add_dev(&mut project, "grace", &[]);
        project.record_mood(ada, Mood::Awful).unwrap();
        project.record_mood(grace, Mood::Bad).unwrap();

        let mut solo = make_task("solo", 1, 2, 3);
        solo.developers.insert(ada);
        solo.start(date(2026, 1, 2));
        project.tasks.push(solo);
        assert!(shared_low_moods(&project).is_empty());

        let mut shared = make_task("shared", 1, 2, 3);
        shared.developers.insert(ada);
        shared.developers.insert(grace);
        shared.start(date(2026, 1, 2));
        project.tasks.push(shared);

        let found = shared_low_moods(&project);
        assert_eq!(found.len(), 1);
        match &found[0] {
            Suggestion::SharedTaskLowMood {
                task,
                developers,
                mean_score,
            } => {
                assert_eq!(task, "shared");
                assert_eq!(developers.len(), 2);
                // (-1.4 + -0.7) / 2
                assert!((mean_score - (-1.05)).abs() < 1e-12);
            }
            other => panic!("unexpected suggestion: {other:?}"),
        }
        assert_eq!(found[0].severity(), Severity::Moderate);
    }

    #[test]
    fn skill_mismatch_scales_with_the_missing_share() {
        let mut project = make_project(100.0, 30);
        let dev = add_dev(&mut project, "ada", &["rust"]);

        let mut task = make_task("api", 1, 2, 3)
            .with_required_skills(["rust".to_string(), "sql".to_string()]);
        task.developers.insert(dev);
        task.start(date(2026, 1, 2));
        project.tasks.push(task);

        let found = skill_mismatches(&project);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].severity(), Severity::Moderate);

        // a developer with none of the skills escalates to Major
        let full = Suggestion::SkillMismatch {
            task: "api".into(),
            developer: "ada".into(),
            missing: vec!["rust".into(), "sql".into()],
            missing_share: 1.0,
        };
        assert_eq!(full.severity(), Severity::Major);
    }

    #[test]
    fn matched_skills_stay_quiet() {
        let mut project = make_project(100.0, 30);
        let dev = add_dev(&mut project, "ada", &["rust", "sql"]);

        let mut task = make_task("api", 1, 2, 3)
            .with_required_skills(["rust".to_string(), "sql".to_string()]);
        task.developers.insert(dev);
        task.start(date(2026, 1, 2));
        project.tasks.push(task);

        assert!(skill_mismatches(&project).is_empty());
    }

    #[test]
    fn lopsided_load_flags_both_ends_of_the_team() {
        let mut project = make_project(100.0, 28);
        let ada = add_dev(&mut project, "ada", &[]);
        let grace = add_dev(&mut project, "grace", &[]);

        let mut heavy = make_task("heavy", 9, 10, 11); // 10 days -> 80h
        heavy.developers.insert(ada);
        project.tasks.push(heavy);

        let mut light = make_task("light", 1, 2, 3); // 2 days -> 16h
        light.developers.insert(grace);
        project.tasks.push(light);

        // 4 weeks left: ada 20h/week, grace 4h/week, mean 12
        let found = uneven_work_distribution(&project, date(2026, 1, 1));
        assert_eq!(found.len(), 2);
        for suggestion in &found {
            assert_eq!(suggestion.severity(), Severity::Major);
        }
    }

    #[test]
    fn balanced_load_stays_quiet() {
        let mut project = make_project(100.0, 28);
        let ada = add_dev(&mut project, "ada", &[]);
        let grace = add_dev(&mut project, "grace", &[]);

        let mut a = make_task("a", 9, 10, 11);
        a.developers.insert(ada);
        project.tasks.push(a);

        let mut b = make_task("b", 9, 10, 11);
        b.developers.insert(grace);
        project.tasks.push(b);

        assert!(uneven_work_distribution(&project, date(2026, 1, 1)).is_empty());
    }

    #[test]
    fn solo_load_cannot_be_uneven() {
        let mut project = make_project(100.0, 28);
        let ada = add_dev(&mut project, "ada", &[]);

        let mut task = make_task("a", 9, 10, 11);
        task.developers.insert(ada);
        project.tasks.push(task);

        assert!(uneven_work_distribution(&project, date(2026, 1, 1)).is_empty());
    }

    #[test]
    #[should_panic(expected = "below the reporting floor")]
    fn sub_hour_deviation_severity_panics() {
        let suggestion = Suggestion::UnevenWorkDistribution {
            developer: "ada".into(),
            weekly_hours: 10.0,
            mean: 9.5,
            deviation_hours: 0.5,
        };
        suggestion.severity();
    }

    #[test]
    fn every_variant_has_a_stable_kind_tag() {
        let tagged = [
            (
                Suggestion::DelayedTaskExceedsSlack {
                    task: "t".into(),
                    days_late: 1.0,
                    slack: 0.0,
                },
                "delayed_task_exceeds_slack",
            ),
            (
                Suggestion::MissingSkill {
                    skill: "s".into(),
                    tasks: vec![],
                },
                "missing_skill",
            ),
            (
                Suggestion::UnevenWorkDistribution {
                    developer: "d".into(),
                    weekly_hours: 10.0,
                    mean: 5.0,
                    deviation_hours: 5.0,
                },
                "uneven_work_distribution",
            ),
        ];
        for (suggestion, kind) in &tagged {
            assert_eq!(suggestion.kind(), *kind);
            assert!(!suggestion.description().is_empty());
            assert!(!suggestion.resolution().is_empty());
            assert!(!suggestion.extras().is_empty());
        }
    }

    #[test]
    fn generate_gates_the_expensive_task_rule_on_mode() {
        let mut project = make_project(35.0, 30);
        let task = make_task("build", 1, 2, 3).with_estimated_cost(50.0).unwrap();
        project.add_task(task, date(2025, 12, 1)).unwrap();

        let initial = generate(&project, date(2026, 1, 1), EvaluationMode::Initial);
        assert!(initial
            .iter()
            .any(|s| s.kind() == "most_expensive_task"));

        let active = generate(&project, date(2026, 1, 1), EvaluationMode::Active);
        assert!(!active
            .iter()
            .any(|s| s.kind() == "most_expensive_task"));
    }
}
