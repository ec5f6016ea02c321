//! GitHub API client implementation
//!
//! Repository, branch, pull request, commit and alert connections are read
//! through the GraphQL API. Contributors are only exposed through REST, where
//! the page number plays the role of the cursor.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, warn};
use reqwest::header::{HeaderMap, LINK};
use reqwest::{Client as HttpClient, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::GitProviderApi;
use super::models::{
    Branch, Commit, Contributor, Organization, OwnerKind, PullRequest, Repository, Severity,
    VulnerabilityAlert,
};
use super::pagination::{Page, PageInfo, PageRequest};
use super::rate_limit::{EndpointCategory, RateLimiterSet, is_rate_limited};
use crate::error::{ApiError, Result};

/// Public GitHub API endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.github.com";

/// Vendor name reported as a resource attribute
pub const VENDOR_NAME: &str = "github";

const CHECK_LOGIN_QUERY: &str = r#"query checkLogin($login: String!) {
  user(login: $login) { login }
  organization(login: $login) { login }
}"#;

const REPO_SEARCH_QUERY: &str = r#"query getRepoDataBySearch($searchQuery: String!, $first: Int!, $repoCursor: String) {
  search(query: $searchQuery, type: REPOSITORY, first: $first, after: $repoCursor) {
    nodes {
      ... on Repository {
        id
        name
        defaultBranchRef { name }
      }
    }
    pageInfo { hasNextPage endCursor }
  }
}"#;

const BRANCH_QUERY: &str = r#"query getBranchData($owner: String!, $name: String!, $first: Int!, $targetBranch: String!, $branchCursor: String) {
  repository(owner: $owner, name: $name) {
    refs(refPrefix: "refs/heads/", first: $first, after: $branchCursor) {
      nodes {
        name
        compare(headRef: $targetBranch) { aheadBy behindBy }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

const PULL_REQUEST_QUERY: &str = r#"query getPullRequestData($owner: String!, $name: String!, $first: Int!, $prCursor: String) {
  repository(owner: $owner, name: $name) {
    pullRequests(first: $first, after: $prCursor) {
      nodes { createdAt merged mergedAt closed }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

const COMMIT_QUERY: &str = r#"query getCommitData($owner: String!, $name: String!, $branchName: String!, $first: Int!, $commitCursor: String) {
  repository(owner: $owner, name: $name) {
    ref(qualifiedName: $branchName) {
      target {
        ... on Commit {
          history(first: $first, after: $commitCursor) {
            nodes { committedDate additions deletions }
            pageInfo { hasNextPage endCursor }
          }
        }
      }
    }
  }
}"#;

const ALERT_QUERY: &str = r#"query getRepoCVEs($owner: String!, $name: String!, $first: Int!, $alertCursor: String) {
  repository(owner: $owner, name: $name) {
    vulnerabilityAlerts(first: $first, states: OPEN, after: $alertCursor) {
      nodes {
        id
        securityVulnerability { severity }
      }
      pageInfo { hasNextPage endCursor }
    }
  }
}"#;

/// GitHub API client
pub struct GitHubClient {
    http: HttpClient,
    graphql_url: String,
    rest_base: String,
    token: String,
    rate_limits: Arc<RateLimiterSet>,
}

/// Envelope of every GraphQL response
#[derive(Debug, Deserialize)]
struct GraphQlResponse<T> {
    data: Option<T>,
    #[serde(default)]
    errors: Vec<GraphQlError>,
}

#[derive(Debug, Deserialize)]
struct GraphQlError {
    message: String,
    #[serde(rename = "type", default)]
    kind: Option<String>,
}

/// A GraphQL connection as returned by GitHub
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GqlConnection<N> {
    #[serde(default = "Vec::new")]
    nodes: Vec<Option<N>>,
    #[serde(default)]
    page_info: PageInfo,
}

impl<N> GqlConnection<N> {
    /// Flatten into a page, dropping null nodes and mapping the rest.
    fn into_page<T>(self, map: impl FnMut(N) -> Option<T>) -> Page<T> {
        Page {
            nodes: self.nodes.into_iter().flatten().filter_map(map).collect(),
            page_info: self.page_info,
        }
    }
}

/// `repository { ... }` wrapper shared by the per-repository queries
#[derive(Debug, Deserialize)]
struct RepositoryData<R> {
    repository: Option<R>,
}

impl GitHubClient {
    /// Create a new GitHub client for `endpoint`.
    ///
    /// For GitHub Enterprise Server pass the `/api` base (for example
    /// `https://ghe.example.com/api`); REST calls then go to `/api/v3`.
    pub fn new(endpoint: &str, token: impl Into<String>) -> Result<Self> {
        let http = HttpClient::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("gitmetrics/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let endpoint = endpoint.trim_end_matches('/');
        let rest_base = if endpoint.ends_with("/api") {
            format!("{}/v3", endpoint)
        } else {
            endpoint.to_string()
        };

        Ok(Self {
            http,
            graphql_url: format!("{}/graphql", endpoint),
            rest_base,
            token: token.into(),
            rate_limits: Arc::new(RateLimiterSet::new()),
        })
    }

    /// Send a request and map the status code, returning the body on success.
    async fn send(
        &self,
        category: EndpointCategory,
        request: reqwest::RequestBuilder,
    ) -> Result<(String, HeaderMap)> {
        self.rate_limits.wait_for(category).await;

        let response = request
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .send()
            .await
            .map_err(ApiError::from)?;

        let status = response.status();
        let headers = response.headers().clone();

        if is_rate_limited(status, &headers) {
            self.rate_limits.activate(category);
            let retry_after = headers
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ApiError::RateLimit(Duration::from_secs(retry_after)).into());
        }

        match status {
            StatusCode::OK => {
                let body = response.text().await.map_err(ApiError::from)?;
                Ok((body, headers))
            }
            StatusCode::NO_CONTENT => Ok((String::new(), headers)),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized.into()),
            StatusCode::FORBIDDEN => Err(ApiError::Forbidden.into()),
            StatusCode::NOT_FOUND => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Resource not found".to_string());
                Err(ApiError::NotFound(error_msg).into())
            }
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| "Bad request".to_string());
                Err(ApiError::BadRequest(error_msg).into())
            }
            status if status.is_server_error() => {
                let error_msg = response
                    .text()
                    .await
                    .unwrap_or_else(|_| format!("Server error: {}", status));
                Err(ApiError::ServerError(error_msg).into())
            }
            _ => {
                let error_msg = format!("Unexpected status code: {}", status);
                Err(ApiError::InvalidResponse(error_msg).into())
            }
        }
    }

    /// Execute a GraphQL operation and return the raw envelope.
    async fn graphql<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<GraphQlResponse<T>> {
        debug!("GraphQL {} {}", operation, variables);

        let request = self.http.post(&self.graphql_url).json(&json!({
            "operationName": operation,
            "query": query,
            "variables": variables,
        }));
        let (body, _) = self.send(EndpointCategory::GraphQl, request).await?;

        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse {} response: {}", operation, e))
                .into()
        })
    }

    /// Execute a GraphQL operation that must succeed without errors.
    async fn graphql_data<T: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T> {
        let response: GraphQlResponse<T> = self.graphql(operation, query, variables).await?;

        if !response.errors.is_empty() {
            let messages: Vec<&str> = response.errors.iter().map(|e| e.message.as_str()).collect();
            return Err(ApiError::GraphQl(messages.join("; ")).into());
        }

        response.data.ok_or_else(|| {
            ApiError::InvalidResponse(format!("{} returned no data", operation)).into()
        })
    }

    /// Fetch one per-repository connection, failing when the repository is gone.
    async fn repository_connection<R: DeserializeOwned>(
        &self,
        operation: &str,
        query: &str,
        owner: &str,
        repo: &str,
        variables: serde_json::Value,
    ) -> Result<R> {
        let data: RepositoryData<R> = self.graphql_data(operation, query, variables).await?;
        data.repository
            .ok_or_else(|| ApiError::NotFound(format!("repository {}/{}", owner, repo)).into())
    }
}

/// Whether a REST `Link` header advertises a following page.
fn has_next_link(headers: &HeaderMap) -> bool {
    headers
        .get(LINK)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|links| {
            links
                .split(',')
                .any(|link| link.split(';').skip(1).any(|p| p.trim() == r#"rel="next""#))
        })
}

#[async_trait]
impl GitProviderApi for GitHubClient {
    fn vendor_name(&self) -> &'static str {
        VENDOR_NAME
    }

    async fn resolve_owner(&self, login: &str) -> Result<Option<Organization>> {
        #[derive(Deserialize)]
        struct Login {
            login: String,
        }

        #[derive(Deserialize)]
        struct CheckLogin {
            user: Option<Login>,
            organization: Option<Login>,
        }

        let response: GraphQlResponse<CheckLogin> = self
            .graphql("checkLogin", CHECK_LOGIN_QUERY, json!({ "login": login }))
            .await?;

        // One of `user`/`organization` always fails to resolve, which GitHub
        // reports as a NOT_FOUND error next to the data.
        let unexpected: Vec<&str> = response
            .errors
            .iter()
            .filter(|e| e.kind.as_deref() != Some("NOT_FOUND"))
            .map(|e| e.message.as_str())
            .collect();
        if !unexpected.is_empty() {
            return Err(ApiError::GraphQl(unexpected.join("; ")).into());
        }

        let Some(data) = response.data else {
            return Ok(None);
        };

        if let Some(org) = data.organization {
            return Ok(Some(Organization {
                login: org.login,
                kind: OwnerKind::Organization,
            }));
        }

        Ok(data.user.map(|user| Organization {
            login: user.login,
            kind: OwnerKind::User,
        }))
    }

    async fn search_repositories(
        &self,
        query: &str,
        request: &PageRequest,
    ) -> Result<Page<Repository>> {
        #[derive(Deserialize)]
        struct BranchRef {
            name: String,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct SearchNode {
            id: Option<String>,
            name: Option<String>,
            default_branch_ref: Option<BranchRef>,
        }

        #[derive(Deserialize)]
        struct SearchData {
            search: GqlConnection<SearchNode>,
        }

        let data: SearchData = self
            .graphql_data(
                "getRepoDataBySearch",
                REPO_SEARCH_QUERY,
                json!({
                    "searchQuery": query,
                    "first": request.page_size,
                    "repoCursor": request.cursor,
                }),
            )
            .await?;

        // Search results are a union; anything that is not a repository
        // comes back as an empty object.
        Ok(data.search.into_page(|node| {
            Some(Repository {
                id: node.id.unwrap_or_default(),
                name: node.name?,
                default_branch: node.default_branch_ref.map(|r| r.name),
            })
        }))
    }

    async fn list_branches(
        &self,
        owner: &str,
        repo: &str,
        default_branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Branch>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Comparison {
            ahead_by: u64,
            behind_by: u64,
        }

        #[derive(Deserialize)]
        struct BranchNode {
            name: String,
            compare: Option<Comparison>,
        }

        #[derive(Deserialize)]
        struct Refs {
            refs: GqlConnection<BranchNode>,
        }

        let data: Refs = self
            .repository_connection(
                "getBranchData",
                BRANCH_QUERY,
                owner,
                repo,
                json!({
                    "owner": owner,
                    "name": repo,
                    "first": request.page_size,
                    "targetBranch": default_branch,
                    "branchCursor": request.cursor,
                }),
            )
            .await?;

        // `compare` uses the branch as base and the default branch as head,
        // so the head's lead is how far the branch is behind.
        Ok(data.refs.into_page(|node| {
            let (ahead_by, behind_by) = node
                .compare
                .map(|c| (c.behind_by, c.ahead_by))
                .unwrap_or((0, 0));
            Some(Branch {
                name: node.name,
                ahead_by,
                behind_by,
            })
        }))
    }

    async fn list_pull_requests(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<PullRequest>> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct PullRequests {
            pull_requests: GqlConnection<PullRequest>,
        }

        let data: PullRequests = self
            .repository_connection(
                "getPullRequestData",
                PULL_REQUEST_QUERY,
                owner,
                repo,
                json!({
                    "owner": owner,
                    "name": repo,
                    "first": request.page_size,
                    "prCursor": request.cursor,
                }),
            )
            .await?;

        Ok(data.pull_requests.into_page(Some))
    }

    async fn list_contributors(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<Contributor>> {
        let page: u32 = match request.cursor.as_deref() {
            None => 1,
            Some(cursor) => cursor.parse().map_err(|_| {
                ApiError::InvalidResponse(format!("Invalid contributor cursor `{}`", cursor))
            })?,
        };

        let url = format!("{}/repos/{}/{}/contributors", self.rest_base, owner, repo);
        debug!("GET {} page {}", url, page);
        let builder = self.http.get(&url).query(&[
            ("per_page", request.page_size.to_string()),
            ("page", page.to_string()),
        ]);
        let (body, headers) = self.send(EndpointCategory::Rest, builder).await?;

        // Empty repositories answer 204 with no body.
        if body.trim().is_empty() {
            return Ok(Page::last(Vec::new()));
        }

        let nodes: Vec<Contributor> = serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse contributors: {}", e))
        })?;

        // An empty page ends the walk even if `Link` still advertises more.
        if has_next_link(&headers) && !nodes.is_empty() {
            Ok(Page::with_next(nodes, (page + 1).to_string()))
        } else {
            Ok(Page::last(nodes))
        }
    }

    async fn list_vulnerability_alerts(
        &self,
        owner: &str,
        repo: &str,
        request: &PageRequest,
    ) -> Result<Page<VulnerabilityAlert>> {
        #[derive(Deserialize)]
        struct SecurityVulnerability {
            severity: Severity,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct AlertNode {
            #[serde(default)]
            id: String,
            security_vulnerability: Option<SecurityVulnerability>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct Alerts {
            vulnerability_alerts: GqlConnection<AlertNode>,
        }

        let data: Alerts = self
            .repository_connection(
                "getRepoCVEs",
                ALERT_QUERY,
                owner,
                repo,
                json!({
                    "owner": owner,
                    "name": repo,
                    "first": request.page_size,
                    "alertCursor": request.cursor,
                }),
            )
            .await?;

        Ok(data.vulnerability_alerts.into_page(|node| {
            let severity = node
                .security_vulnerability
                .map(|v| v.severity)
                .unwrap_or(Severity::Unknown);
            Some(VulnerabilityAlert {
                id: node.id,
                severity,
            })
        }))
    }

    async fn commit_history(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
        request: &PageRequest,
    ) -> Result<Page<Commit>> {
        #[derive(Deserialize)]
        struct Target {
            history: Option<GqlConnection<Commit>>,
        }

        #[derive(Deserialize)]
        struct BranchRef {
            target: Option<Target>,
        }

        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct RefData {
            #[serde(rename = "ref")]
            branch_ref: Option<BranchRef>,
        }

        let data: RefData = self
            .repository_connection(
                "getCommitData",
                COMMIT_QUERY,
                owner,
                repo,
                json!({
                    "owner": owner,
                    "name": repo,
                    "branchName": branch,
                    "first": request.page_size,
                    "commitCursor": request.cursor,
                }),
            )
            .await?;

        let history = data
            .branch_ref
            .ok_or_else(|| ApiError::NotFound(format!("branch {} in {}/{}", branch, owner, repo)))?
            .target
            .and_then(|t| t.history);

        match history {
            Some(history) => Ok(history.into_page(Some)),
            None => {
                warn!(
                    "Branch {} in {}/{} does not point at a commit",
                    branch, owner, repo
                );
                Ok(Page::last(Vec::new()))
            }
        }
    }
}
