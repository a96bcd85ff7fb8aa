//! Console configuration
//!
//! Settings come from three layers: built-in defaults, an optional TOML file
//! (`~/.config/kopia-console/console.toml` unless `--config` points
//! elsewhere), and command-line flags / environment variables. Flags win over
//! the file, the file wins over the defaults.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_ADDRESS: &str = "127.0.0.1";
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:51515";

/// Errors loading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid backend server URL '{0}': expected http:// or https://")]
    InvalidServerUrl(String),
}

/// Contents of the TOML file; every key is optional
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub open_browser: Option<bool>,
    pub server: ServerSection,
}

/// `[server]` table: how to reach the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerSection {
    pub url: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub csrf_token: Option<String>,
}

/// Values supplied on the command line (or through their env fallbacks)
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub address: Option<String>,
    pub port: Option<u16>,
    pub server_url: Option<String>,
    pub server_username: Option<String>,
    pub server_password: Option<String>,
    pub csrf_token: Option<String>,
    pub no_browser: bool,
}

/// Credentials added to proxied requests that carry none of their own
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuth {
    pub username: String,
    pub password: Option<String>,
}

/// Effective configuration after layering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub address: String,
    pub port: u16,
    pub open_browser: bool,
    pub server_url: String,
    pub basic_auth: Option<BasicAuth>,
    pub csrf_token: Option<String>,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            open_browser: true,
            server_url: DEFAULT_SERVER_URL.to_string(),
            basic_auth: None,
            csrf_token: None,
        }
    }
}

impl ConsoleConfig {
    /// Layer the file and the overrides on top of the defaults
    pub fn resolve(file: FileConfig, overrides: Overrides) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let server_url = overrides
            .server_url
            .or(file.server.url)
            .unwrap_or(defaults.server_url);
        let server_url = normalize_server_url(&server_url)?;

        let basic_auth = overrides
            .server_username
            .or(file.server.username)
            .filter(|u| !u.is_empty())
            .map(|username| BasicAuth {
                username,
                password: overrides.server_password.or(file.server.password),
            });

        let csrf_token = overrides
            .csrf_token
            .or(file.server.csrf_token)
            .filter(|t| !t.trim().is_empty());

        Ok(Self {
            address: overrides.address.or(file.address).unwrap_or(defaults.address),
            port: overrides.port.or(file.port).unwrap_or(defaults.port),
            open_browser: !overrides.no_browser && file.open_browser.unwrap_or(defaults.open_browser),
            server_url,
            basic_auth,
            csrf_token,
        })
    }

    /// Address the console listens on
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    /// URL printed to the terminal and opened in the browser
    pub fn ui_url(&self) -> String {
        let host = match self.address.as_str() {
            "0.0.0.0" | "::" => DEFAULT_ADDRESS,
            other => other,
        };
        format!("http://{}:{}", host, self.port)
    }
}

/// Default location of the config file, if the platform has a config dir
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("kopia-console").join("console.toml"))
}

/// Read the config file.
///
/// An explicitly named file must exist. The default file is optional and a
/// missing one yields an empty configuration.
pub fn load_file(explicit: Option<&Path>) -> Result<FileConfig, ConfigError> {
    let (path, required) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => match default_config_path() {
            Some(path) => (path, false),
            None => return Ok(FileConfig::default()),
        },
    };

    if !required && !path.exists() {
        tracing::debug!("No config file at {}", path.display());
        return Ok(FileConfig::default());
    }

    let content = std::fs::read_to_string(&path).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.clone(),
        source,
    })?;
    tracing::debug!("Loaded config file {}", path.display());
    Ok(config)
}

fn normalize_server_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Ok(trimmed.to_string())
    } else {
        Err(ConfigError::InvalidServerUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults_without_file_or_flags() {
        let config = ConsoleConfig::resolve(FileConfig::default(), Overrides::default()).unwrap();
        assert_eq!(config, ConsoleConfig::default());
        assert_eq!(config.listen_addr(), "127.0.0.1:8080");
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = write_config(
            r#"
port = 9000
open_browser = false

[server]
url = "https://backup.example.com:51515/"
username = "admin"
password = "hunter2"
csrf_token = "abc"
"#,
        );
        let parsed = load_file(Some(file.path())).unwrap();
        let config = ConsoleConfig::resolve(parsed, Overrides::default()).unwrap();

        assert_eq!(config.port, 9000);
        assert!(!config.open_browser);
        assert_eq!(config.server_url, "https://backup.example.com:51515");
        assert_eq!(
            config.basic_auth,
            Some(BasicAuth {
                username: "admin".into(),
                password: Some("hunter2".into()),
            })
        );
        assert_eq!(config.csrf_token.as_deref(), Some("abc"));
    }

    #[test]
    fn test_flags_override_file() {
        let file = FileConfig {
            port: Some(9000),
            server: ServerSection {
                url: Some("http://file:1".into()),
                csrf_token: Some("from-file".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let overrides = Overrides {
            port: Some(7000),
            server_url: Some("http://flag:2".into()),
            no_browser: true,
            ..Default::default()
        };
        let config = ConsoleConfig::resolve(file, overrides).unwrap();

        assert_eq!(config.port, 7000);
        assert_eq!(config.server_url, "http://flag:2");
        assert_eq!(config.csrf_token.as_deref(), Some("from-file"));
        assert!(!config.open_browser);
    }

    #[test]
    fn test_blank_token_is_unset() {
        let overrides = Overrides {
            csrf_token: Some("  ".into()),
            ..Default::default()
        };
        let config = ConsoleConfig::resolve(FileConfig::default(), overrides).unwrap();
        assert_eq!(config.csrf_token, None);
    }

    #[test]
    fn test_rejects_url_without_scheme() {
        let overrides = Overrides {
            server_url: Some("localhost:51515".into()),
            ..Default::default()
        };
        let err = ConsoleConfig::resolve(FileConfig::default(), overrides).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidServerUrl(_)));
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_file(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_unknown_key_is_a_parse_error() {
        let file = write_config("prot = 1\n");
        let err = load_file(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn test_ui_url_for_wildcard_address() {
        let config = ConsoleConfig {
            address: "0.0.0.0".into(),
            port: 8123,
            ..Default::default()
        };
        assert_eq!(config.ui_url(), "http://127.0.0.1:8123");
    }
}
