//! API message types for communication between the console and the backend
//!
//! These types mirror the JSON bodies of the `/api/v1` REST endpoints the
//! console consumes. The backend owns the wire format; fields the console
//! does not read are ignored on deserialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Backend REST endpoints
pub mod endpoints {
    pub const API_PREFIX: &str = "/api/v1";
    pub const REPO_STATUS: &str = "/api/v1/repo/status";
    pub const REPO_EXISTS: &str = "/api/v1/repo/exists";
    pub const REPO_CREATE: &str = "/api/v1/repo/create";
    pub const REPO_CONNECT: &str = "/api/v1/repo/connect";
    pub const REPO_DISCONNECT: &str = "/api/v1/repo/disconnect";
    pub const REPO_ALGORITHMS: &str = "/api/v1/repo/algorithms";
    pub const UI_PREFERENCES: &str = "/api/v1/ui-preferences";
    pub const TASKS_SUMMARY: &str = "/api/v1/tasks-summary";
    pub const TASKS: &str = "/api/v1/tasks";
    pub const SOURCES: &str = "/api/v1/sources";
    pub const SNAPSHOTS: &str = "/api/v1/snapshots";
    pub const POLICIES: &str = "/api/v1/policies";
    pub const NOTIFICATION_PROFILES: &str = "/api/v1/notificationProfiles";
}

/// Header carrying the anti-forgery token on every request
pub const CSRF_HEADER: &str = "X-Kopia-Csrf-Token";

/// Name of the `<meta>` tag the server uses to hand the token to the page
pub const CSRF_META_NAME: &str = "kopia-csrf-token";

/// Token value sent when the page carries no meta tag
pub const CSRF_FALLBACK: &str = "-";

/// Error code the backend returns from the existence probe for empty storage
pub const NOT_INITIALIZED: &str = "NOT_INITIALIZED";

/// Resolve the CSRF header value from the (optional) meta tag content
pub fn csrf_token_or_default(meta_content: Option<&str>) -> String {
    match meta_content.map(str::trim) {
        Some(token) if !token.is_empty() => token.to_string(),
        _ => CSRF_FALLBACK.to_string(),
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Structured error body returned by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub error: String,
}

/// Failure of a single backend request, as surfaced to the user
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum RequestError {
    /// Network down, or a server failure without a structured body
    #[error("Unable to communicate with the server: {0}")]
    Transport(String),

    /// Structured `{code, error}` body, rendered verbatim
    #[error("{}", render_api_error(.body))]
    Api { status: u16, body: ApiErrorBody },

    /// Success status but a body the console could not decode
    #[error("Unexpected response from the server: {0}")]
    InvalidResponse(String),
}

fn render_api_error(body: &ApiErrorBody) -> String {
    match &body.code {
        Some(code) => format!("{}: {}", code, body.error),
        None => body.error.clone(),
    }
}

impl RequestError {
    /// Classify a non-2xx response from its status and raw body text
    pub fn from_response(status: u16, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<ApiErrorBody>(body) {
            return RequestError::Api { status, body: parsed };
        }

        if status >= 500 {
            return RequestError::Transport(format!("HTTP {}", status));
        }

        let text = body.trim();
        RequestError::Api {
            status,
            body: ApiErrorBody {
                code: None,
                error: if text.is_empty() {
                    format!("HTTP {}", status)
                } else {
                    text.to_string()
                },
            },
        }
    }

    /// Backend error code, if the failure carried one
    pub fn code(&self) -> Option<&str> {
        match self {
            RequestError::Api { body, .. } => body.code.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_initialized(&self) -> bool {
        self.code() == Some(NOT_INITIALIZED)
    }
}

// ============================================================================
// Repository
// ============================================================================

/// Storage location as sent to the backend: `{type, config}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(rename = "type")]
    pub kind: String,
    pub config: serde_json::Map<String, serde_json::Value>,
}

/// Body of `POST /api/v1/repo/exists`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExistsRequest {
    pub storage: StorageConfig,
}

/// Client identity overrides attached to create/connect
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientOptions {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub username: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub hostname: String,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub readonly: bool,
}

impl ClientOptions {
    pub fn is_empty(&self) -> bool {
        self.description.is_empty()
            && self.username.is_empty()
            && self.hostname.is_empty()
            && !self.readonly
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlockFormat {
    pub version: i32,
    pub hash: String,
    pub encryption: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub ecc: String,
    #[serde(default)]
    pub ecc_overhead_percent: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectFormat {
    pub splitter: String,
}

/// Algorithm choices for a new repository
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRepositoryOptions {
    pub block_format: BlockFormat,
    pub object_format: ObjectFormat,
}

/// Body of `POST /api/v1/repo/create`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequest {
    pub storage: StorageConfig,
    pub password: String,
    pub options: NewRepositoryOptions,
    #[serde(default, skip_serializing_if = "ClientOptions::is_empty")]
    pub client_options: ClientOptions,
}

/// Repository server address for `_server` connections
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiServerInfo {
    pub url: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub server_cert_fingerprint: String,
}

/// Body of `POST /api/v1/repo/connect`
///
/// Exactly one of `storage`, `token` or `api_server` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage: Option<StorageConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_server: Option<ApiServerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "ClientOptions::is_empty")]
    pub client_options: ClientOptions,
}

/// Response of `GET /api/v1/repo/status`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RepoStatus {
    pub connected: bool,
    pub config_file: String,
    pub description: String,
    pub format_version: i32,
    pub hash: String,
    pub encryption: String,
    pub splitter: String,
    pub ecc: String,
    pub ecc_overhead_percent: i32,
    pub max_pack_size: u64,
    /// Storage type, e.g. `filesystem`
    pub storage: String,
    #[serde(rename = "apiServerURL")]
    pub api_server_url: String,
    pub username: String,
    pub hostname: String,
    pub readonly: bool,
    /// Set while the backend is still opening the repository
    #[serde(rename = "initTaskID", skip_serializing_if = "Option::is_none")]
    pub init_task_id: Option<String>,
}

impl RepoStatus {
    pub fn is_initializing(&self) -> bool {
        self.init_task_id.as_deref().is_some_and(|id| !id.is_empty())
    }

    /// `user@host` this console is connected as
    pub fn client_identity(&self) -> String {
        format!("{}@{}", self.username, self.hostname)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    pub id: String,
    #[serde(default)]
    pub deprecated: bool,
}

/// Response of `GET /api/v1/repo/algorithms`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlgorithmsResponse {
    pub default_hash: String,
    pub default_encryption: String,
    pub default_splitter: String,
    pub default_ecc: String,
    pub hash: Vec<AlgorithmInfo>,
    pub encryption: Vec<AlgorithmInfo>,
    pub splitter: Vec<AlgorithmInfo>,
    pub ecc: Vec<AlgorithmInfo>,
}

// ============================================================================
// UI preferences
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    #[serde(rename = "light")]
    #[default]
    Light,
    #[serde(rename = "dark")]
    Dark,
    #[serde(rename = "pastel")]
    Pastel,
    #[serde(rename = "ocean")]
    Ocean,
}

impl Theme {
    pub const ALL: [Theme; 4] = [Theme::Light, Theme::Dark, Theme::Pastel, Theme::Ocean];

    pub fn id(self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
            Theme::Pastel => "pastel",
            Theme::Ocean => "ocean",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Theme::Light => "Light",
            Theme::Dark => "Dark",
            Theme::Pastel => "Pastel",
            Theme::Ocean => "Ocean",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.id() == id)
    }

    /// CSS class applied to the `<html>` element
    pub fn css_class(self) -> String {
        format!("{}-theme", self.id())
    }
}

/// Page sizes offered by the table footer
pub const PAGE_SIZES: [usize; 6] = [10, 20, 30, 40, 50, 100];

pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Body of `GET|PUT /api/v1/ui-preferences`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UiPreferences {
    pub bytes_string_base2: bool,
    pub default_snapshot_view_all: bool,
    pub theme: Theme,
    pub page_size: usize,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            bytes_string_base2: false,
            default_snapshot_view_all: false,
            theme: Theme::default(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl UiPreferences {
    /// Page size to use, falling back to the default for unknown values
    pub fn effective_page_size(&self) -> usize {
        if PAGE_SIZES.contains(&self.page_size) {
            self.page_size
        } else {
            DEFAULT_PAGE_SIZE
        }
    }

    /// Copy with a new table page size; `None` for an unchanged or unoffered size
    pub fn with_page_size(&self, size: usize) -> Option<Self> {
        if !PAGE_SIZES.contains(&size) || self.page_size == size {
            return None;
        }
        Some(Self { page_size: size, ..self.clone() })
    }
}

// ============================================================================
// Tasks
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TaskStatus {
    Running,
    Canceling,
    Canceled,
    Success,
    Failed,
}

impl TaskStatus {
    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Running => "Running",
            TaskStatus::Canceling => "Canceling",
            TaskStatus::Canceled => "Canceled",
            TaskStatus::Success => "Finished",
            TaskStatus::Failed => "Failed",
        }
    }

    pub fn is_active(self) -> bool {
        matches!(self, TaskStatus::Running | TaskStatus::Canceling)
    }
}

/// Response of `GET /api/v1/tasks-summary`: task counts keyed by status
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TasksSummary {
    pub counts: BTreeMap<TaskStatus, u64>,
}

impl TasksSummary {
    pub fn count(&self, status: TaskStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Number of tasks still in progress, shown in the navigation badge
    pub fn running(&self) -> u64 {
        self.count(TaskStatus::Running) + self.count(TaskStatus::Canceling)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    pub id: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TasksResponse {
    #[serde(default)]
    pub tasks: Vec<TaskInfo>,
}

// ============================================================================
// Snapshots and policies
// ============================================================================

/// `user@host:path` triple identifying what a snapshot or policy applies to
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSource {
    pub host: String,
    pub user_name: String,
    pub path: String,
}

impl SnapshotSource {
    /// `user@host`
    pub fn owner_name(&self) -> String {
        format!("{}@{}", self.user_name, self.host)
    }

    /// Human form of a policy target: `(global)`, `@host`, `user@host` or a full source
    pub fn display_target(&self) -> String {
        match (self.host.is_empty(), self.user_name.is_empty(), self.path.is_empty()) {
            (true, true, true) => "(global)".to_string(),
            (false, true, true) => format!("@{}", self.host),
            (false, false, true) => self.owner_name(),
            _ => format!("{}:{}", self.owner_name(), self.path),
        }
    }

    /// Query string selecting this source on `/api/v1/snapshots`
    pub fn query_string(&self) -> String {
        format!(
            "userName={}&host={}&path={}",
            urlencoding::encode(&self.user_name),
            urlencoding::encode(&self.host),
            urlencoding::encode(&self.path),
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotStats {
    pub total_size: u64,
    pub file_count: u64,
    pub dir_count: u64,
    pub error_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LastSnapshot {
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub stats: SnapshotStats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceStatus {
    pub source: SnapshotSource,
    /// `IDLE`, `PENDING`, `UPLOADING` or `REMOTE`
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub last_snapshot: Option<LastSnapshot>,
    #[serde(default)]
    pub next_snapshot_time: Option<DateTime<Utc>>,
}

/// Response of `GET /api/v1/sources`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SourcesResponse {
    pub local_username: String,
    pub local_host: String,
    pub multi_user: bool,
    pub sources: Vec<SourceStatus>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotSummary {
    pub size: u64,
    pub files: u64,
    pub dirs: u64,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotInfo {
    pub id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub incomplete: String,
    #[serde(default)]
    pub summary: SnapshotSummary,
    #[serde(default, rename = "rootID")]
    pub root_id: String,
    #[serde(default)]
    pub retention: Vec<String>,
    #[serde(default)]
    pub pins: Vec<String>,
}

/// Response of `GET /api/v1/snapshots`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnapshotsResponse {
    pub snapshots: Vec<SnapshotInfo>,
    pub unfiltered_count: u64,
    pub unique_count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub target: SnapshotSource,
    #[serde(default)]
    pub policy: serde_json::Value,
}

impl PolicyEntry {
    /// Number of top-level policy sections with a value set
    pub fn defined_sections(&self) -> usize {
        self.policy
            .as_object()
            .map(|sections| {
                sections
                    .values()
                    .filter(|v| !v.is_null() && v.as_object().map_or(true, |o| !o.is_empty()))
                    .count()
            })
            .unwrap_or(0)
    }
}

/// Response of `GET /api/v1/policies`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PoliciesResponse {
    #[serde(default)]
    pub policies: Vec<PolicyEntry>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMethod {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

/// One entry of `GET /api/v1/notificationProfiles`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationProfile {
    pub profile: String,
    pub method: NotificationMethod,
    #[serde(default)]
    pub min_severity: i32,
}

/// Label for a notification severity threshold
pub fn severity_label(severity: i32) -> &'static str {
    match severity {
        i32::MIN..=-100 => "Verbose",
        -99..=-10 => "Success",
        -9..=0 => "Report",
        1..=10 => "Info",
        11..=20 => "Warning",
        _ => "Error",
    }
}
