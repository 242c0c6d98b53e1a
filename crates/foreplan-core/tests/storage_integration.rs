//! Integration tests for SQLite persistence.
//!
//! These run against real database files in a temp directory, so reopening
//! exercises the on-disk format rather than a shared in-memory connection.

use chrono::{DateTime, TimeZone, Utc};
use foreplan_core::{
    Database, DatabaseError, Developer, Estimate, EvaluationInput, EvaluationSample, Evaluator,
    EvaluatorConfig, Mood, Project, TopLevelTask, WeightVector, LEARNING_WINDOW,
};
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn make_project() -> Project {
    let mut project = Project::new("atlas", 5_000.0, 45, date(2026, 3, 1)).unwrap();
    project
        .add_task(
            TopLevelTask::new("design", Estimate::new(10, 20, 27).unwrap())
                .with_estimated_cost(2_000.0)
                .unwrap(),
            date(2026, 2, 1),
        )
        .unwrap();
    project.add_developer(Developer::new("ada", ["rust".to_string()]));
    project
}

fn make_sample() -> EvaluationSample {
    EvaluationSample {
        risk: 0.8,
        completed: true,
        weights: WeightVector {
            budget_usage: 0.5,
            schedule_performance_index: 0.5,
            cost_performance_index: 0.5,
            probability_exceed_timeframe: 0.5,
            missing_skill_coverage: 0.5,
            worker_utilization: 0.5,
            test_coverage: 0.5,
            task_duration_error: 0.5,
        },
    }
}

#[test]
fn test_projects_survive_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreplan.db");

    let mut project = make_project();
    let ada = project.developers[0].id;
    project.record_mood(ada, Mood::Good).unwrap();
    project.set_test_coverage(0.8).unwrap();

    {
        let db = Database::open_at(&path).unwrap();
        db.save_project(&project).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let loaded = db.load_project("atlas").unwrap();
    assert_eq!(loaded, project);
}

#[test]
fn test_evaluations_survive_reopen_newest_first() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreplan.db");

    let mut project = make_project();
    let evaluator = Evaluator::new(EvaluatorConfig {
        noise_seed: Some(3),
    });
    let first = evaluator
        .evaluate(
            &mut project,
            EvaluationInput::default(),
            &WeightVector::balanced(),
            0,
            date(2026, 2, 10),
        )
        .unwrap();
    let second = evaluator
        .evaluate(
            &mut project,
            EvaluationInput::default(),
            &WeightVector::balanced(),
            1,
            date(2026, 2, 20),
        )
        .unwrap();

    {
        let db = Database::open_at(&path).unwrap();
        db.save_project(&project).unwrap();
        db.record_evaluation(&first).unwrap();
        db.record_evaluation(&second).unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    let history = db.evaluations_for(project.id, 10).unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0], second);
    assert_eq!(history[1], first);

    let latest = db.latest_evaluation(project.id).unwrap().unwrap();
    assert_eq!(latest, second);
}

#[test]
fn test_weight_state_survives_reopen_and_learns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreplan.db");

    {
        let db = Database::open_at(&path).unwrap();
        for _ in 0..LEARNING_WINDOW {
            db.record_outcome(make_sample()).unwrap();
        }
    }

    let db = Database::open_at(&path).unwrap();
    let state = db.weight_state().unwrap();
    assert_eq!(state.samples.len(), LEARNING_WINDOW);
    // five accurate 0.5-samples fold the balanced base to 0.515625
    assert!((state.base.budget_usage - 0.515625).abs() < 1e-12);
    assert!((state.base.task_duration_error - 0.515625).abs() < 1e-12);
}

#[test]
fn test_delete_project_removes_its_evaluations() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreplan.db");
    let db = Database::open_at(&path).unwrap();

    let mut project = make_project();
    let evaluation = Evaluator::new(EvaluatorConfig {
        noise_seed: Some(3),
    })
    .evaluate(
        &mut project,
        EvaluationInput::default(),
        &WeightVector::balanced(),
        0,
        date(2026, 2, 10),
    )
    .unwrap();
    db.save_project(&project).unwrap();
    db.record_evaluation(&evaluation).unwrap();

    db.delete_project("atlas").unwrap();

    let err = db.load_project("atlas").unwrap_err();
    assert!(matches!(err, DatabaseError::NotFound { .. }));
    assert!(db.evaluations_for(project.id, 10).unwrap().is_empty());
}

#[test]
fn test_projects_evaluated_counter_persists() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("foreplan.db");

    {
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.bump_projects_evaluated().unwrap(), 1);
        assert_eq!(db.bump_projects_evaluated().unwrap(), 2);
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(db.weight_state().unwrap().projects_evaluated, 2);
}
