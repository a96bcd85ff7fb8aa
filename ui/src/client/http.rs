//! HTTP client for the backend REST API
//!
//! Requests are sent to the page's own origin; the console server forwards
//! `/api/v1/*` to the repository server.

use gloo_net::http::{Request, RequestBuilder, Response};
use kopia_console_shared::{
    csrf_token_or_default, endpoints, AlgorithmsResponse, ConnectRequest, CreateRequest,
    ExistsRequest, NotificationProfile, PoliciesResponse, RepoStatus, RequestError,
    SnapshotSource, SnapshotsResponse, SourcesResponse, TasksResponse, TasksSummary,
    UiPreferences, CSRF_HEADER, CSRF_META_NAME,
};
use serde::{de::DeserializeOwned, Serialize};
use std::rc::Rc;

use super::{ClientResult, ConsoleClient};

/// Client bound to one base URL and CSRF token
#[derive(Debug, Clone)]
pub struct HttpClient {
    base_url: Rc<str>,
    csrf_token: Rc<str>,
}

impl HttpClient {
    /// Client for the current page's origin, using the CSRF token the server
    /// embedded in the page
    pub fn from_page() -> Self {
        Self::new("", &csrf_token_or_default(read_csrf_meta().as_deref()))
    }

    pub fn new(base_url: &str, csrf_token: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').into(),
            csrf_token: csrf_token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn with_headers(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(CSRF_HEADER, &self.csrf_token)
            .header("Accept", "application/json")
    }

    async fn send(&self, request: Request) -> ClientResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        if response.ok() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        let err = RequestError::from_response(status, &body);
        tracing::warn!(status, error = %err, url = %response.url(), "API request failed");
        Err(err)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ClientResult<T> {
        let request = self
            .with_headers(Request::get(&self.url(path)))
            .build()
            .map_err(|e| RequestError::Transport(e.to_string()))?;

        self.send(request)
            .await?
            .json()
            .await
            .map_err(|e| RequestError::InvalidResponse(e.to_string()))
    }

    /// Send a JSON body and discard whatever the backend answers with
    async fn send_json<B: Serialize>(&self, builder: RequestBuilder, body: &B) -> ClientResult<()> {
        let request = self
            .with_headers(builder)
            .json(body)
            .map_err(|e| RequestError::InvalidResponse(e.to_string()))?;

        self.send(request).await.map(|_| ())
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> ClientResult<()> {
        self.send_json(Request::post(&self.url(path)), body).await
    }
}

fn read_csrf_meta() -> Option<String> {
    let document = web_sys::window()?.document()?;
    let selector = format!("meta[name=\"{}\"]", CSRF_META_NAME);
    document
        .query_selector(&selector)
        .ok()
        .flatten()?
        .get_attribute("content")
}

#[async_trait::async_trait(?Send)]
impl ConsoleClient for HttpClient {
    async fn repo_status(&self) -> ClientResult<RepoStatus> {
        self.get_json(endpoints::REPO_STATUS).await
    }

    async fn repo_exists(&self, request: &ExistsRequest) -> ClientResult<()> {
        self.post_json(endpoints::REPO_EXISTS, request).await
    }

    async fn create_repo(&self, request: &CreateRequest) -> ClientResult<()> {
        self.post_json(endpoints::REPO_CREATE, request).await
    }

    async fn connect_repo(&self, request: &ConnectRequest) -> ClientResult<()> {
        self.post_json(endpoints::REPO_CONNECT, request).await
    }

    async fn disconnect_repo(&self) -> ClientResult<()> {
        self.post_json(endpoints::REPO_DISCONNECT, &serde_json::json!({})).await
    }

    async fn algorithms(&self) -> ClientResult<AlgorithmsResponse> {
        self.get_json(endpoints::REPO_ALGORITHMS).await
    }

    async fn ui_preferences(&self) -> ClientResult<UiPreferences> {
        self.get_json(endpoints::UI_PREFERENCES).await
    }

    async fn save_ui_preferences(&self, prefs: &UiPreferences) -> ClientResult<()> {
        self.send_json(Request::put(&self.url(endpoints::UI_PREFERENCES)), prefs)
            .await
    }

    async fn tasks_summary(&self) -> ClientResult<TasksSummary> {
        self.get_json(endpoints::TASKS_SUMMARY).await
    }

    async fn tasks(&self) -> ClientResult<TasksResponse> {
        self.get_json(endpoints::TASKS).await
    }

    async fn sources(&self) -> ClientResult<SourcesResponse> {
        self.get_json(endpoints::SOURCES).await
    }

    async fn snapshots(&self, source: &SnapshotSource, all: bool) -> ClientResult<SnapshotsResponse> {
        let mut path = format!("{}?{}", endpoints::SNAPSHOTS, source.query_string());
        if all {
            path.push_str("&all=1");
        }
        self.get_json(&path).await
    }

    async fn policies(&self) -> ClientResult<PoliciesResponse> {
        self.get_json(endpoints::POLICIES).await
    }

    async fn notification_profiles(&self) -> ClientResult<Vec<NotificationProfile>> {
        self.get_json(endpoints::NOTIFICATION_PROFILES).await
    }
}
