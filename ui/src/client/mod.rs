//! Backend Client Abstraction Layer
//!
//! The console talks to the repository server's `/api/v1` REST API. All
//! requests go through [`ConsoleClient`] so pages never touch `gloo-net`
//! directly, and every failure arrives as a [`RequestError`].

mod http;

pub use http::HttpClient;

use async_trait::async_trait;
use kopia_console_shared::{
    AlgorithmsResponse, ConnectRequest, CreateRequest, ExistsRequest, NotificationProfile,
    PoliciesResponse, RepoStatus, RequestError, SnapshotSource, SnapshotsResponse,
    SourcesResponse, TasksResponse, TasksSummary, UiPreferences,
};

pub type ClientResult<T> = Result<T, RequestError>;

/// Operations the console performs against the backend
#[async_trait(?Send)]
pub trait ConsoleClient {
    async fn repo_status(&self) -> ClientResult<RepoStatus>;

    /// Succeeds when a repository exists in the storage; fails with
    /// `NOT_INITIALIZED` when the storage is empty
    async fn repo_exists(&self, request: &ExistsRequest) -> ClientResult<()>;

    async fn create_repo(&self, request: &CreateRequest) -> ClientResult<()>;

    async fn connect_repo(&self, request: &ConnectRequest) -> ClientResult<()>;

    async fn disconnect_repo(&self) -> ClientResult<()>;

    async fn algorithms(&self) -> ClientResult<AlgorithmsResponse>;

    async fn ui_preferences(&self) -> ClientResult<UiPreferences>;

    async fn save_ui_preferences(&self, prefs: &UiPreferences) -> ClientResult<()>;

    async fn tasks_summary(&self) -> ClientResult<TasksSummary>;

    async fn tasks(&self) -> ClientResult<TasksResponse>;

    async fn sources(&self) -> ClientResult<SourcesResponse>;

    async fn snapshots(&self, source: &SnapshotSource, all: bool) -> ClientResult<SnapshotsResponse>;

    async fn policies(&self) -> ClientResult<PoliciesResponse>;

    async fn notification_profiles(&self) -> ClientResult<Vec<NotificationProfile>>;
}
