//! Option records and a fake GitHub-like API shared by the unit tests.

use crate::{Context, Page, QueryOptions};
use chrono::{DateTime, Utc};
use http::{header::LINK, HeaderMap, HeaderValue};
use std::sync::Mutex;

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListOptions {
    #[query(name = "page,omitempty")]
    pub page: i64,
    #[query(name = "per_page,omitempty")]
    pub per_page: i64,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListCursorOptions {
    #[query(name = "page,omitempty")]
    pub page: String,
    #[query(name = "per_page,omitempty")]
    pub per_page: i64,
    #[query(name = "after,omitempty")]
    pub after: String,
    #[query(name = "before,omitempty")]
    pub before: String,
    #[query(name = "cursor,omitempty")]
    pub cursor: String,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct RepositoryListByOrgOptions {
    #[query(name = "type,omitempty")]
    pub kind: String,
    #[query(name = "sort,omitempty")]
    pub sort: String,
    #[query(name = "direction,omitempty")]
    pub direction: String,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct RepositoryListAllOptions {
    #[query(name = "since,omitempty")]
    pub since: i64,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListAlertsOptions {
    #[query(name = "state,omitempty")]
    pub state: Option<String>,
    #[query(name = "severity,omitempty")]
    pub severity: Option<String>,
    #[query(name = "sort,omitempty")]
    pub sort: Option<String>,
    #[query(name = "direction,omitempty")]
    pub direction: Option<String>,
    #[query(flatten)]
    pub list: ListOptions,
    #[query(flatten)]
    pub cursor: ListCursorOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct IssueListCommentsOptions {
    #[query(name = "sort,omitempty")]
    pub sort: Option<String>,
    #[query(name = "direction,omitempty")]
    pub direction: Option<String>,
    #[query(name = "since,omitempty")]
    pub since: Option<DateTime<Utc>>,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct CommitsListOptions {
    #[query(name = "sha,omitempty")]
    pub sha: String,
    #[query(name = "since,omitempty")]
    pub since: DateTime<Utc>,
    #[query(name = "until,omitempty")]
    pub until: DateTime<Utc>,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListWorkflowRunsOptions {
    #[query(name = "branch,omitempty")]
    pub branch: String,
    #[query(name = "exclude_pull_requests,omitempty")]
    pub exclude_pull_requests: bool,
    #[query(name = "check_suite_id,omitempty")]
    pub check_suite_id: i64,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct WorkflowRunAttemptOptions {
    #[query(name = "exclude_pull_requests,omitempty")]
    pub exclude_pull_requests: Option<bool>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListScimProvisionedIdentitiesOptions {
    #[query(name = "startIndex,omitempty")]
    pub start_index: Option<i32>,
    #[query(name = "count,omitempty")]
    pub count: Option<i32>,
    #[query(name = "filter,omitempty")]
    pub filter: Option<String>,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct ListCheckRunsOptions {
    #[query(name = "check_name,omitempty")]
    pub check_name: Option<String>,
    #[query(name = "app_id,omitempty")]
    pub app_id: Option<i64>,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Default, Clone, PartialEq, QueryOptions)]
pub struct IssueListOptions {
    #[query(name = "labels,comma,omitempty")]
    pub labels: Vec<String>,
    #[query(name = "state,omitempty")]
    pub state: String,
    #[query(flatten)]
    pub list: ListOptions,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    pub id: u64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{0}")]
pub struct ClientError(pub String);

/// Serves `repo_count` repositories and `alert_count` alerts with GitHub style `Link` headers.
/// Every request is logged as `endpoint?query`.
pub struct FakeGitHub {
    repos: Vec<Repository>,
    alert_count: u64,
    failing_page: Option<i64>,
    requests: Mutex<Vec<String>>,
}

const DEFAULT_PER_PAGE: i64 = 2;

impl FakeGitHub {
    pub fn new(repo_count: u64) -> Self {
        Self {
            repos: (1..=repo_count)
                .map(|id| Repository {
                    id,
                    name: format!("repo-{id}"),
                })
                .collect(),
            alert_count: 0,
            failing_page: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_alerts(mut self, alert_count: u64) -> Self {
        self.alert_count = alert_count;
        self
    }

    /// Requests for `page` of the repository listing fail.
    pub fn fail_on_page(mut self, page: i64) -> Self {
        self.failing_page = Some(page);
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    fn log(&self, request: String) {
        self.requests.lock().unwrap().push(request);
    }

    /// `GET /orgs/{org}/repos`, paginated with `page` and `per_page`.
    pub async fn list_by_org(
        &self,
        ctx: Context,
        org: String,
        opts: RepositoryListByOrgOptions,
    ) -> Result<Page<Repository>, ClientError> {
        let page = opts.list.page.max(1);
        let per_page = match opts.list.per_page {
            0 => DEFAULT_PER_PAGE,
            per_page => per_page,
        };

        self.log(format!("orgs/{org}/repos?page={page}&per_page={per_page}"));

        if let Some(err) = ctx.err() {
            return Err(ClientError(err.to_string()));
        }

        if org != "github" {
            return Err(ClientError("404 Not Found".into()));
        }

        if self.failing_page == Some(page) {
            return Err(ClientError("502 Bad Gateway".into()));
        }

        let start = ((page - 1) * per_page) as usize;
        let items: Vec<_> = self
            .repos
            .iter()
            .skip(start)
            .take(per_page as usize)
            .cloned()
            .collect();

        let last = (self.repos.len() as i64 + per_page - 1) / per_page;
        let url = |page: i64| {
            format!("https://api.github.com/orgs/{org}/repos?page={page}&per_page={per_page}")
        };

        let mut links = Vec::new();
        if page < last {
            links.push(format!(r#"<{}>; rel="next""#, url(page + 1)));
            links.push(format!(r#"<{}>; rel="last""#, url(last)));
        }
        if page > 1 {
            links.push(format!(r#"<{}>; rel="first""#, url(1)));
            links.push(format!(r#"<{}>; rel="prev""#, url(page - 1)));
        }

        Ok(Page::from_headers(items, link_headers(&links)))
    }

    /// `GET /repositories`, paginated with `since` (the last id seen).
    pub async fn list_all(
        &self,
        _ctx: Context,
        opts: RepositoryListAllOptions,
    ) -> Result<Page<Repository>, ClientError> {
        self.log(format!("repositories?since={}", opts.since));

        let items: Vec<_> = self
            .repos
            .iter()
            .filter(|repo| repo.id as i64 > opts.since)
            .take(DEFAULT_PER_PAGE as usize)
            .cloned()
            .collect();

        let mut links = Vec::new();
        if let Some(last) = items.last() {
            if last.id < self.repos.len() as u64 {
                links.push(format!(
                    r#"<https://api.github.com/repositories?since={}>; rel="next""#,
                    last.id
                ));
            }
        }

        Ok(Page::from_headers(items, link_headers(&links)))
    }

    /// `GET /repos/{owner}/{repo}/dependabot/alerts`, paginated with an `after` cursor.
    pub async fn list_repo_alerts(
        &self,
        _ctx: Context,
        owner: String,
        repo: String,
        opts: ListAlertsOptions,
    ) -> Result<Page<Alert>, ClientError> {
        let after: u64 = match opts.cursor.after.as_str() {
            "" => 0,
            cursor => cursor
                .trim_start_matches("alert-")
                .parse()
                .map_err(|_| ClientError(format!("bad cursor {cursor}")))?,
        };

        self.log(format!(
            "repos/{owner}/{repo}/dependabot/alerts?after={}",
            opts.cursor.after
        ));

        let items: Vec<_> = (after + 1..=self.alert_count)
            .take(DEFAULT_PER_PAGE as usize)
            .map(|number| Alert { number })
            .collect();

        let mut links = Vec::new();
        if let Some(last) = items.last() {
            if last.number < self.alert_count {
                links.push(format!(
                    r#"<https://api.github.com/repos/{owner}/{repo}/dependabot/alerts?after=alert-{}&per_page=2>; rel="next""#,
                    last.number
                ));
            }
        }

        Ok(Page::from_headers(items, link_headers(&links)))
    }
}

pub fn link_headers(links: &[String]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    if !links.is_empty() {
        headers.insert(LINK, HeaderValue::from_str(&links.join(", ")).unwrap());
    }
    headers
}
