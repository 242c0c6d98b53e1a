//! GitHub integration -- commit history for the cadence metric.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;

use crate::error::IntegrationError;
use crate::integrations::keyring_store;
use crate::storage::config::GithubConfig;

const USER_AGENT: &str = "foreplan";

/// Fetches commit timestamps from the GitHub REST API.
///
/// Works unauthenticated against public repositories; a stored personal
/// access token raises the rate limit and unlocks private ones.
pub struct CommitClient {
    client: Client,
    api_base: String,
    per_page: u32,
    token: String,
}

#[derive(Debug, Deserialize)]
struct CommitEntry {
    commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
struct CommitDetail {
    committer: Option<CommitSignature>,
}

#[derive(Debug, Deserialize)]
struct CommitSignature {
    date: Option<DateTime<Utc>>,
}

impl CommitClient {
    /// Load the stored token from the OS keyring (empty string if absent).
    pub fn new(config: &GithubConfig) -> Self {
        let token = keyring_store::get("github_token")
            .ok()
            .flatten()
            .unwrap_or_default();
        Self::with_token(config, token)
    }

    /// Build a client with an explicit token; tests use this to avoid the
    /// keyring.
    pub fn with_token(config: &GithubConfig, token: impl Into<String>) -> Self {
        CommitClient {
            client: Client::new(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            per_page: config.per_page,
            token: token.into(),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty()
    }

    /// Commit timestamps for a repository, oldest first.
    ///
    /// Pages through `GET /repos/{owner}/{repo}/commits` until a short page.
    /// `branch` narrows history via the `sha` query parameter; `since` cuts
    /// it off at a lower bound.
    pub async fn list_commit_timestamps(
        &self,
        owner: &str,
        repo: &str,
        branch: Option<&str>,
        since: Option<DateTime<Utc>>,
    ) -> Result<Vec<DateTime<Utc>>, IntegrationError> {
        let mut timestamps = Vec::new();
        let mut page = 1u32;
        loop {
            let mut url = format!(
                "{}/repos/{owner}/{repo}/commits?per_page={}&page={page}",
                self.api_base, self.per_page
            );
            if let Some(branch) = branch {
                url.push_str(&format!("&sha={}", urlencoding::encode(branch)));
            }
            if let Some(since) = since {
                url.push_str(&format!("&since={}", since.format("%Y-%m-%dT%H:%M:%SZ")));
            }

            let mut request = self
                .client
                .get(&url)
                .header("User-Agent", USER_AGENT)
                .header("Accept", "application/vnd.github.v3+json");
            if self.is_authenticated() {
                request = request.header("Authorization", format!("Bearer {}", self.token));
            }

            let response = request.send().await?;
            if !response.status().is_success() {
                let status = response.status().as_u16();
                let message = response.text().await.unwrap_or_default();
                return Err(IntegrationError::Api { status, message });
            }

            let entries: Vec<CommitEntry> = response.json().await?;
            let count = entries.len();
            timestamps.extend(
                entries
                    .into_iter()
                    .filter_map(|e| e.commit.committer.and_then(|c| c.date)),
            );

            // an empty page always terminates, whatever per_page says
            if count == 0 || (count as u32) < self.per_page {
                break;
            }
            page += 1;
        }

        timestamps.sort_unstable();
        Ok(timestamps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use mockito::Matcher;

    fn make_config(api_base: &str) -> GithubConfig {
        GithubConfig {
            api_base: api_base.to_string(),
            per_page: 2,
        }
    }

    fn commit_json(dates: &[&str]) -> String {
        let entries: Vec<String> = dates
            .iter()
            .map(|d| format!(r#"{{"sha":"abc","commit":{{"committer":{{"date":"{d}"}}}}}}"#))
            .collect();
        format!("[{}]", entries.join(","))
    }

    #[test]
    fn empty_token_is_unauthenticated() {
        let client = CommitClient::with_token(&make_config("https://api.github.com"), "");
        assert!(!client.is_authenticated());
    }

    #[tokio::test]
    async fn pages_until_a_short_page_and_sorts_ascending() {
        let mut server = mockito::Server::new_async().await;
        let first = server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .with_status(200)
            .with_body(commit_json(&[
                "2026-01-05T00:00:00Z",
                "2026-01-03T00:00:00Z",
            ]))
            .create_async()
            .await;
        let second = server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_body(commit_json(&["2026-01-01T00:00:00Z"]))
            .create_async()
            .await;

        let client = CommitClient::with_token(&make_config(&server.url()), "tok");
        let timestamps = client
            .list_commit_timestamps("acme", "site", None, None)
            .await
            .unwrap();

        assert_eq!(timestamps.len(), 3);
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn branch_and_since_narrow_the_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("sha".into(), "release/2.0".into()),
                Matcher::UrlEncoded("since".into(), "2026-01-01T00:00:00Z".into()),
            ]))
            .with_status(200)
            .with_body(commit_json(&["2026-01-02T00:00:00Z"]))
            .create_async()
            .await;

        let since = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let client = CommitClient::with_token(&make_config(&server.url()), "tok");
        let timestamps = client
            .list_commit_timestamps("acme", "site", Some("release/2.0"), Some(since))
            .await
            .unwrap();

        assert_eq!(timestamps.len(), 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::Any)
            .with_status(403)
            .with_body("rate limit exceeded")
            .create_async()
            .await;

        let client = CommitClient::with_token(&make_config(&server.url()), "tok");
        let err = client
            .list_commit_timestamps("acme", "site", None, None)
            .await
            .unwrap_err();

        match err {
            IntegrationError::Api { status, message } => {
                assert_eq!(status, 403);
                assert!(message.contains("rate limit"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn commits_without_dates_are_skipped() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/repos/acme/site/commits")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(
                r#"[
                    {"sha":"a","commit":{"committer":{"date":"2026-01-02T00:00:00Z"}}},
                    {"sha":"b","commit":{"committer":null}},
                    {"sha":"c","commit":{}}
                ]"#,
            )
            .create_async()
            .await;

        let config = GithubConfig {
            api_base: server.url(),
            per_page: 100,
        };
        let client = CommitClient::with_token(&config, "tok");
        let timestamps = client
            .list_commit_timestamps("acme", "site", None, None)
            .await
            .unwrap();

        assert_eq!(timestamps.len(), 1);
    }
}
