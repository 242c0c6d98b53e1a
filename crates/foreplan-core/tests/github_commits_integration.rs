//! Integration test wiring the GitHub client into an evaluation.
//!
//! Fetches commit history from a mocked API and feeds it through
//! `EvaluationInput`, the same path the CLI takes for a linked project.

use chrono::{DateTime, TimeZone, Utc};
use foreplan_core::storage::config::GithubConfig;
use foreplan_core::{
    CommitClient, Estimate, EvaluationInput, Evaluator, EvaluatorConfig, MetricKind, Project,
    TopLevelTask, WeightVector,
};
use mockito::Matcher;

fn date(y: i32, m: u32, d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
}

fn commit_json(dates: &[&str]) -> String {
    let entries: Vec<String> = dates
        .iter()
        .map(|d| format!(r#"{{"sha":"abc","commit":{{"committer":{{"date":"{d}"}}}}}}"#))
        .collect();
    format!("[{}]", entries.join(","))
}

#[tokio::test]
async fn test_fetched_commits_feed_the_commit_metric() {
    let mut server = mockito::Server::new_async().await;
    let config = GithubConfig {
        api_base: server.url(),
        per_page: 100,
    };
    let mock = server
        .mock("GET", "/repos/acme/orion/commits")
        .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(commit_json(&[
            "2026-01-01T09:00:00Z",
            "2026-01-02T09:00:00Z",
            "2026-01-03T09:00:00Z",
            "2026-01-04T09:00:00Z",
            "2026-01-05T09:00:00Z",
            "2026-01-06T09:00:00Z",
        ]))
        .create_async()
        .await;

    let client = CommitClient::with_token(&config, "token");
    let commits = client
        .list_commit_timestamps("acme", "orion", None, None)
        .await
        .unwrap();
    mock.assert_async().await;
    assert_eq!(commits.len(), 6);

    // an active project picks the commit metric up from the fetched history
    let mut project = Project::new("orion", 1_000.0, 60, date(2026, 1, 1)).unwrap();
    project
        .add_task(
            TopLevelTask::new("build", Estimate::new(10, 20, 27).unwrap()),
            date(2025, 12, 1),
        )
        .unwrap();
    project.task_mut("build").unwrap().start(date(2026, 1, 2));

    let evaluation = Evaluator::new(EvaluatorConfig {
        noise_seed: Some(5),
    })
    .evaluate(
        &mut project,
        EvaluationInput {
            commits: Some(&commits),
        },
        &WeightVector::balanced(),
        0,
        date(2026, 1, 7),
    )
    .unwrap();

    let commit_metric = evaluation
        .metrics
        .iter()
        .find(|m| m.kind == MetricKind::CommitFrequency)
        .expect("commit metric missing");
    assert!((0.0..=1.0).contains(&commit_metric.raw));
}
