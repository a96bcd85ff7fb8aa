//! CLI subcommands that query the backend directly
//!
//! - `status`: repository connection and format
//! - `tasks`: recent and running tasks

use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use kopia_console_shared::{
    csrf_token_or_default, endpoints, format_optional_duration, rfc3339_timestamp_for_display,
    size_display_name, sort_rows, RepoStatus, RequestError, SortDirection, TaskInfo, TasksResponse,
    CSRF_HEADER,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Duration;

use kopia_console::config::{BasicAuth, ConsoleConfig};

#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

/// CLI client for the backend API
pub struct CliClient {
    client: Client,
    base_url: String,
    basic_auth: Option<BasicAuth>,
    csrf_token: String,
}

impl CliClient {
    pub fn new(config: &ConsoleConfig) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_secs(30))
                .build()
                .unwrap_or_default(),
            base_url: config.server_url.clone(),
            basic_auth: config.basic_auth.clone(),
            csrf_token: csrf_token_or_default(config.csrf_token.as_deref()),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> anyhow::Result<T> {
        let mut req = self
            .client
            .get(format!("{}{}", self.base_url, path))
            .header(CSRF_HEADER, &self.csrf_token);
        if let Some(auth) = &self.basic_auth {
            req = req.basic_auth(&auth.username, auth.password.as_ref());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| RequestError::Transport(e.to_string()))?;
        let status = resp.status();
        let text = resp.text().await?;
        if !status.is_success() {
            return Err(RequestError::from_response(status.as_u16(), &text).into());
        }
        serde_json::from_str(&text)
            .map_err(|e| RequestError::InvalidResponse(e.to_string()).into())
    }
}

// =============================================================================
// Status
// =============================================================================

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Show sizes in binary units (KiB, MiB)
    #[arg(long)]
    base2: bool,
}

impl StatusArgs {
    pub async fn execute(&self, client: &CliClient) -> anyhow::Result<()> {
        let status: RepoStatus = client.get_json(endpoints::REPO_STATUS).await?;

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&status)?);
            return Ok(());
        }

        for (label, value) in status_lines(&status, self.base2) {
            println!("{:<22} {}", format!("{}:", label), value);
        }
        Ok(())
    }
}

/// Label/value pairs describing the repository
fn status_lines(status: &RepoStatus, base2: bool) -> Vec<(&'static str, String)> {
    if status.is_initializing() {
        return vec![("Status", "Initializing".to_string())];
    }
    if !status.connected {
        return vec![("Status", "Not connected".to_string())];
    }

    let mut lines = vec![
        ("Status", "Connected".to_string()),
        ("Description", status.description.clone()),
        ("Config File", status.config_file.clone()),
    ];
    if !status.api_server_url.is_empty() {
        lines.push(("Server URL", status.api_server_url.clone()));
    } else {
        lines.extend([
            ("Storage Type", status.storage.clone()),
            ("Hash Algorithm", status.hash.clone()),
            ("Encryption Algorithm", status.encryption.clone()),
            ("Splitter Algorithm", status.splitter.clone()),
            ("Repository Format", status.format_version.to_string()),
            (
                "Error Correction",
                if status.ecc.is_empty() {
                    "None".to_string()
                } else {
                    format!("{} ({}% overhead)", status.ecc, status.ecc_overhead_percent)
                },
            ),
            ("Max Pack Size", size_display_name(Some(status.max_pack_size), base2)),
        ]);
    }
    lines.push(("Connected As", status.client_identity()));
    lines.push(("Read Only", if status.readonly { "yes" } else { "no" }.to_string()));
    lines
}

// =============================================================================
// Tasks
// =============================================================================

#[derive(Args, Debug)]
pub struct TasksArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,

    /// Only show running or canceling tasks
    #[arg(long)]
    running: bool,
}

impl TasksArgs {
    pub async fn execute(&self, client: &CliClient) -> anyhow::Result<()> {
        let resp: TasksResponse = client.get_json(endpoints::TASKS).await?;
        let tasks = select_tasks(resp.tasks, self.running);

        if self.format == OutputFormat::Json {
            println!("{}", serde_json::to_string_pretty(&tasks)?);
            return Ok(());
        }

        println!(
            "{:<20} {:<10} {:<16} {:<14} {}",
            "START TIME", "STATUS", "KIND", "DURATION", "DESCRIPTION"
        );
        println!("{}", "-".repeat(100));
        let now = Utc::now();
        for row in task_rows(&tasks, now) {
            println!(
                "{:<20} {:<10} {:<16} {:<14} {}",
                row[0], row[1], row[2], row[3], row[4]
            );
        }
        Ok(())
    }
}

/// Newest first, optionally only active ones
fn select_tasks(mut tasks: Vec<TaskInfo>, running_only: bool) -> Vec<TaskInfo> {
    if running_only {
        tasks.retain(|t| t.status.is_active());
    }
    sort_rows(&mut tasks, |t| t.start_time.into(), SortDirection::Descending);
    tasks
}

fn task_rows(tasks: &[TaskInfo], now: DateTime<Utc>) -> Vec<[String; 5]> {
    tasks
        .iter()
        .map(|t| {
            [
                rfc3339_timestamp_for_display(t.start_time),
                t.status.label().to_string(),
                t.kind.clone(),
                format_optional_duration(t.start_time, t.end_time, now),
                match &t.error_message {
                    Some(err) if !err.is_empty() => format!("{} ({})", t.description, err),
                    _ => t.description.clone(),
                },
            ]
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use kopia_console_shared::TaskStatus;

    fn task(id: &str, status: TaskStatus, start_secs: i64, end_secs: Option<i64>) -> TaskInfo {
        TaskInfo {
            id: id.into(),
            start_time: Some(Utc.timestamp_opt(start_secs, 0).unwrap()),
            end_time: end_secs.map(|s| Utc.timestamp_opt(s, 0).unwrap()),
            kind: "Snapshot".into(),
            description: format!("task {}", id),
            status,
            error_message: None,
        }
    }

    #[test]
    fn test_disconnected_status() {
        let lines = status_lines(&RepoStatus::default(), false);
        assert_eq!(lines, vec![("Status", "Not connected".to_string())]);
    }

    #[test]
    fn test_initializing_status() {
        let status = RepoStatus {
            init_task_id: Some("t1".into()),
            ..Default::default()
        };
        assert_eq!(status_lines(&status, false)[0].1, "Initializing");
    }

    #[test]
    fn test_connected_status_shows_format() {
        let status = RepoStatus {
            connected: true,
            storage: "filesystem".into(),
            hash: "BLAKE2B-256-128".into(),
            max_pack_size: 20_000_000,
            username: "alice".into(),
            hostname: "laptop".into(),
            ..Default::default()
        };
        let lines = status_lines(&status, false);
        let get = |label: &str| lines.iter().find(|(l, _)| *l == label).map(|(_, v)| v.clone());

        assert_eq!(get("Storage Type").as_deref(), Some("filesystem"));
        assert_eq!(get("Max Pack Size").as_deref(), Some("20 MB"));
        assert_eq!(get("Error Correction").as_deref(), Some("None"));
        assert_eq!(get("Connected As").as_deref(), Some("alice@laptop"));
    }

    #[test]
    fn test_api_server_status_skips_algorithms() {
        let status = RepoStatus {
            connected: true,
            api_server_url: "https://server:51515".into(),
            ..Default::default()
        };
        let lines = status_lines(&status, false);
        assert!(lines.iter().any(|(l, _)| *l == "Server URL"));
        assert!(!lines.iter().any(|(l, _)| *l == "Hash Algorithm"));
    }

    #[test]
    fn test_select_tasks_newest_first() {
        let tasks = vec![
            task("a", TaskStatus::Success, 100, Some(110)),
            task("b", TaskStatus::Running, 300, None),
            task("c", TaskStatus::Failed, 200, Some(201)),
        ];
        let ids: Vec<_> = select_tasks(tasks.clone(), false).into_iter().map(|t| t.id).collect();
        assert_eq!(ids, vec!["b", "c", "a"]);

        let running: Vec<_> = select_tasks(tasks, true).into_iter().map(|t| t.id).collect();
        assert_eq!(running, vec!["b"]);
    }

    #[test]
    fn test_task_rows_durations() {
        let now = Utc.timestamp_opt(400, 0).unwrap();
        let mut failed = task("c", TaskStatus::Failed, 200, Some(201));
        failed.error_message = Some("disk full".into());
        let rows = task_rows(&[task("b", TaskStatus::Running, 300, None), failed], now);

        assert_eq!(rows[0][1], "Running");
        assert!(rows[0][3].contains("minute"));
        assert_eq!(rows[1][4], "task c (disk full)");
    }
}
