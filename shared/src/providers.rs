//! Storage provider schemas
//!
//! Each storage backend the setup wizard can configure declares an ordered
//! list of fields. A [`ProviderForm`] binds a provider to the values typed so
//! far and exposes the `fields / validate / values` contract the wizard
//! relies on.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::messages::{ApiServerInfo, StorageConfig};

/// Storage backend the wizard can configure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ProviderKind {
    #[serde(rename = "filesystem")]
    Filesystem,
    #[serde(rename = "gcs")]
    Gcs,
    #[serde(rename = "s3")]
    S3,
    #[serde(rename = "b2")]
    B2,
    #[serde(rename = "azureBlob")]
    Azure,
    #[serde(rename = "sftp")]
    Sftp,
    #[serde(rename = "webdav")]
    WebDav,
    #[serde(rename = "rclone")]
    Rclone,
    #[serde(rename = "_token")]
    Token,
    #[serde(rename = "_server")]
    Server,
}

/// Input widget a field is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Password,
    Number,
    Bool,
    Multiline,
}

/// One configurable field of a provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    /// Key in the storage `config` object
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<&'static str>,
    pub placeholder: &'static str,
}

const fn required(name: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Text, required: true, default: None, placeholder }
}

const fn optional(name: &'static str, label: &'static str, placeholder: &'static str) -> FieldSpec {
    FieldSpec { name, label, kind: FieldKind::Text, required: false, default: None, placeholder }
}

const fn with_kind(spec: FieldSpec, kind: FieldKind) -> FieldSpec {
    FieldSpec { kind, ..spec }
}

const fn with_default(spec: FieldSpec, default: &'static str) -> FieldSpec {
    FieldSpec { default: Some(default), ..spec }
}

const FILESYSTEM_FIELDS: &[FieldSpec] = &[
    required("path", "Directory Path", "enter directory path where you want to store repository files"),
];

const GCS_FIELDS: &[FieldSpec] = &[
    required("bucket", "GCS Bucket", "enter bucket name"),
    optional("prefix", "Object Name Prefix", "enter object name prefix or leave empty"),
    optional("credentialsFile", "Credentials File", "enter name of credentials JSON file"),
    with_kind(
        optional("credentials", "Credentials JSON", "paste JSON credentials here"),
        FieldKind::Multiline,
    ),
];

const S3_FIELDS: &[FieldSpec] = &[
    required("bucket", "Bucket", "enter bucket name"),
    with_default(required("endpoint", "Server Endpoint", "enter server address (e.g., s3.amazonaws.com)"), "s3.amazonaws.com"),
    optional("region", "Override Region", "enter a specific region (e.g., us-west-1) or leave empty"),
    required("accessKeyID", "Access Key ID", "enter access key ID"),
    with_kind(required("secretAccessKey", "Secret Access Key", "enter secret access key"), FieldKind::Password),
    with_kind(optional("sessionToken", "Session Token", "enter session token or leave empty"), FieldKind::Password),
    optional("prefix", "Object Name Prefix", "enter object name prefix or leave empty"),
    with_kind(optional("doNotUseTLS", "Use HTTP connection (insecure)", ""), FieldKind::Bool),
    with_kind(optional("doNotVerifyTLS", "Do not verify TLS certificate", ""), FieldKind::Bool),
];

const B2_FIELDS: &[FieldSpec] = &[
    required("bucket", "B2 Bucket", "enter bucket name"),
    required("keyID", "Key ID", "enter application or account key ID"),
    with_kind(required("key", "Key", "enter secret application or account key"), FieldKind::Password),
    optional("prefix", "Object Name Prefix", "enter object name prefix or leave empty"),
];

const AZURE_FIELDS: &[FieldSpec] = &[
    required("container", "Container", "enter container name"),
    required("storageAccount", "Storage Account", "enter storage account name"),
    with_kind(optional("storageKey", "Access Key", "enter secret access key"), FieldKind::Password),
    with_kind(optional("sasToken", "SAS Token", "enter secret SAS token"), FieldKind::Password),
    optional("storageDomain", "Azure Storage Domain", "enter storage domain or leave empty for default 'blob.core.windows.net'"),
    optional("prefix", "Object Name Prefix", "enter object name prefix or leave empty"),
];

const SFTP_FIELDS: &[FieldSpec] = &[
    required("host", "Host", "ssh host name (e.g., example.com)"),
    with_default(with_kind(required("port", "Port", "port number (e.g., 22)"), FieldKind::Number), "22"),
    required("username", "User", "user name"),
    required("path", "Path", "enter remote path to repository, e.g. '/mnt/data/repository'"),
    with_kind(optional("password", "Password", "password"), FieldKind::Password),
    optional("keyfile", "Path to key file", "enter path to the key file"),
    with_kind(optional("keyData", "Key Data", "paste contents of the key file"), FieldKind::Multiline),
    optional("knownHostsFile", "Path to known_hosts File", "enter path to your 'known_hosts' file"),
    with_kind(optional("knownHostsData", "Known Hosts Data", "paste contents of the 'known_hosts' file"), FieldKind::Multiline),
    with_kind(optional("externalSSH", "Launch external password-less SSH command", ""), FieldKind::Bool),
    optional("sshCommand", "SSH Command", "provide path to external SSH command"),
    optional("sshArguments", "SSH Arguments", "enter SSH command arguments"),
];

const WEBDAV_FIELDS: &[FieldSpec] = &[
    required("url", "WebDAV Server URL", "http[s]://server:port/path"),
    optional("username", "Username", "enter username"),
    with_kind(optional("password", "Password", "enter password"), FieldKind::Password),
];

const RCLONE_FIELDS: &[FieldSpec] = &[
    required("remotePath", "Rclone Remote Path", "enter <name-of-rclone-remote>:<path>"),
    optional("rcloneExe", "Rclone Executable Path", "enter path to rclone executable"),
];

const TOKEN_FIELDS: &[FieldSpec] = &[
    with_kind(required("token", "Token", "paste connection token"), FieldKind::Password),
];

const SERVER_FIELDS: &[FieldSpec] = &[
    required("url", "Server address", "enter server URL (https://<host>:port)"),
    optional("serverCertFingerprint", "Trusted server certificate fingerprint (SHA256)", "enter trusted server certificate fingerprint printed at server startup"),
];

impl ProviderKind {
    pub const ALL: [ProviderKind; 10] = [
        ProviderKind::Filesystem,
        ProviderKind::Gcs,
        ProviderKind::S3,
        ProviderKind::B2,
        ProviderKind::Azure,
        ProviderKind::Sftp,
        ProviderKind::WebDav,
        ProviderKind::Rclone,
        ProviderKind::Server,
        ProviderKind::Token,
    ];

    /// Identifier sent to the backend as `storage.type`
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::Filesystem => "filesystem",
            ProviderKind::Gcs => "gcs",
            ProviderKind::S3 => "s3",
            ProviderKind::B2 => "b2",
            ProviderKind::Azure => "azureBlob",
            ProviderKind::Sftp => "sftp",
            ProviderKind::WebDav => "webdav",
            ProviderKind::Rclone => "rclone",
            ProviderKind::Token => "_token",
            ProviderKind::Server => "_server",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.id() == id)
    }

    pub fn description(self) -> &'static str {
        match self {
            ProviderKind::Filesystem => "Local Directory or NAS",
            ProviderKind::Gcs => "Google Cloud Storage",
            ProviderKind::S3 => "Amazon S3 or Compatible Storage",
            ProviderKind::B2 => "Backblaze B2",
            ProviderKind::Azure => "Azure Blob Storage",
            ProviderKind::Sftp => "SFTP Server",
            ProviderKind::WebDav => "WebDAV Server",
            ProviderKind::Rclone => "Rclone Remote",
            ProviderKind::Token => "Use Repository Token",
            ProviderKind::Server => "Repository Server",
        }
    }

    /// Internal providers skip the existence probe
    pub fn is_internal(self) -> bool {
        matches!(self, ProviderKind::Token | ProviderKind::Server)
    }

    pub fn fields(self) -> &'static [FieldSpec] {
        match self {
            ProviderKind::Filesystem => FILESYSTEM_FIELDS,
            ProviderKind::Gcs => GCS_FIELDS,
            ProviderKind::S3 => S3_FIELDS,
            ProviderKind::B2 => B2_FIELDS,
            ProviderKind::Azure => AZURE_FIELDS,
            ProviderKind::Sftp => SFTP_FIELDS,
            ProviderKind::WebDav => WEBDAV_FIELDS,
            ProviderKind::Rclone => RCLONE_FIELDS,
            ProviderKind::Token => TOKEN_FIELDS,
            ProviderKind::Server => SERVER_FIELDS,
        }
    }

    pub fn field(self, name: &str) -> Option<&'static FieldSpec> {
        self.fields().iter().find(|f| f.name == name)
    }
}

/// Field values as typed, keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderConfig {
    values: BTreeMap<String, String>,
}

impl ProviderConfig {
    /// Empty config with the provider's defaults filled in
    pub fn with_defaults(kind: ProviderKind) -> Self {
        let values = kind
            .fields()
            .iter()
            .filter_map(|f| f.default.map(|d| (f.name.to_string(), d.to_string())))
            .collect();
        Self { values }
    }

    pub fn get(&self, name: &str) -> &str {
        self.values.get(name).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.values.insert(name.into(), value.into());
    }

    /// Whether the field holds a non-blank value
    pub fn is_filled(&self, name: &str) -> bool {
        !self.get(name).trim().is_empty()
    }

    pub fn is_checked(&self, name: &str) -> bool {
        self.get(name) == "true"
    }
}

/// Per-field validation messages, never sent to the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, thiserror::Error)]
#[error("{} field(s) need attention", .0.len())]
pub struct ValidationErrors(pub BTreeMap<String, String>);

impl ValidationErrors {
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// A provider bound to the values entered for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderForm {
    pub kind: ProviderKind,
    pub config: ProviderConfig,
}

impl ProviderForm {
    pub fn new(kind: ProviderKind) -> Self {
        Self { kind, config: ProviderConfig::with_defaults(kind) }
    }

    pub fn fields(&self) -> &'static [FieldSpec] {
        self.kind.fields()
    }

    /// Check required fields and provider-specific rules
    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        for field in self.fields() {
            let value = self.config.get(field.name).trim();
            if field.required && value.is_empty() {
                errors.add(field.name, "Required field");
            } else if field.kind == FieldKind::Number && !value.is_empty() && value.parse::<u32>().is_err() {
                errors.add(field.name, "Must be a number");
            }
        }

        if self.kind == ProviderKind::Sftp && !self.config.is_checked("externalSSH") {
            let has_credentials = ["password", "keyfile", "keyData"]
                .iter()
                .any(|name| self.config.is_filled(name));
            if !has_credentials {
                errors.add("keyfile", "Either password, key file or key data is required");
            }

            let has_known_hosts = ["knownHostsFile", "knownHostsData"]
                .iter()
                .any(|name| self.config.is_filled(name));
            if !has_known_hosts {
                errors.add("knownHostsFile", "Either known hosts file or known hosts data is required");
            }
        }

        errors.into_result()
    }

    /// Typed values for the backend; blank optional fields are omitted
    pub fn values(&self) -> Map<String, Value> {
        let mut out = Map::new();

        for field in self.fields() {
            let raw = self.config.get(field.name);
            let trimmed = raw.trim();

            let value = match field.kind {
                FieldKind::Bool if trimmed == "true" => Value::Bool(true),
                FieldKind::Bool => continue,
                _ if trimmed.is_empty() => continue,
                FieldKind::Number => trimmed
                    .parse::<i64>()
                    .map(Value::from)
                    .unwrap_or_else(|_| Value::String(trimmed.to_string())),
                // Pasted key material keeps its line breaks.
                FieldKind::Multiline | FieldKind::Password => Value::String(raw.to_string()),
                FieldKind::Text => Value::String(trimmed.to_string()),
            };
            out.insert(field.name.to_string(), value);
        }

        out
    }

    /// `{type, config}` for storage providers
    pub fn storage(&self) -> StorageConfig {
        StorageConfig {
            kind: self.kind.id().to_string(),
            config: self.values(),
        }
    }

    /// Server address for `_server` connections
    pub fn api_server(&self) -> ApiServerInfo {
        ApiServerInfo {
            url: self.config.get("url").trim().to_string(),
            server_cert_fingerprint: self.config.get("serverCertFingerprint").trim().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_ids_round_trip() {
        for kind in ProviderKind::ALL {
            assert_eq!(ProviderKind::from_id(kind.id()), Some(kind));
        }
        assert_eq!(ProviderKind::from_id("ftp"), None);
    }

    #[test]
    fn test_internal_providers() {
        let internal: Vec<_> = ProviderKind::ALL.into_iter().filter(|k| k.is_internal()).collect();
        assert_eq!(internal.len(), 2);
        assert!(internal.contains(&ProviderKind::Token));
        assert!(internal.contains(&ProviderKind::Server));
    }

    #[test]
    fn test_defaults_are_prefilled() {
        let form = ProviderForm::new(ProviderKind::S3);
        assert_eq!(form.config.get("endpoint"), "s3.amazonaws.com");

        let form = ProviderForm::new(ProviderKind::Sftp);
        assert_eq!(form.config.get("port"), "22");
    }

    #[test]
    fn test_filesystem_requires_path() {
        let mut form = ProviderForm::new(ProviderKind::Filesystem);
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("path"), Some("Required field"));

        form.config.set("path", "/data");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_s3_values_are_typed() {
        let mut form = ProviderForm::new(ProviderKind::S3);
        form.config.set("bucket", "backups");
        form.config.set("accessKeyID", "AKIA");
        form.config.set("secretAccessKey", "secret");
        form.config.set("doNotUseTLS", "true");
        form.config.set("doNotVerifyTLS", "false");
        form.config.set("region", "   ");
        assert!(form.validate().is_ok());

        assert_eq!(
            Value::Object(form.values()),
            json!({
                "bucket": "backups",
                "endpoint": "s3.amazonaws.com",
                "accessKeyID": "AKIA",
                "secretAccessKey": "secret",
                "doNotUseTLS": true,
            })
        );
    }

    #[test]
    fn test_sftp_port_must_be_numeric() {
        let mut form = ProviderForm::new(ProviderKind::Sftp);
        form.config.set("host", "example.com");
        form.config.set("username", "backup");
        form.config.set("path", "/srv/repo");
        form.config.set("password", "pw");
        form.config.set("knownHostsFile", "/home/me/.ssh/known_hosts");
        form.config.set("port", "ssh");

        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("port"), Some("Must be a number"));

        form.config.set("port", "2222");
        assert!(form.validate().is_ok());
        assert_eq!(form.values()["port"], json!(2222));
    }

    #[test]
    fn test_sftp_requires_credentials_unless_external_ssh() {
        let mut form = ProviderForm::new(ProviderKind::Sftp);
        form.config.set("host", "example.com");
        form.config.set("username", "backup");
        form.config.set("path", "/srv/repo");

        let errors = form.validate().unwrap_err();
        assert!(errors.get("keyfile").is_some());
        assert!(errors.get("knownHostsFile").is_some());

        form.config.set("externalSSH", "true");
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_storage_payload() {
        let mut form = ProviderForm::new(ProviderKind::Filesystem);
        form.config.set("path", "/data");
        assert_eq!(
            serde_json::to_value(form.storage()).unwrap(),
            json!({"type": "filesystem", "config": {"path": "/data"}})
        );
    }

    #[test]
    fn test_server_address() {
        let mut form = ProviderForm::new(ProviderKind::Server);
        form.config.set("url", " https://repo:51515 ");
        let server = form.api_server();
        assert_eq!(server.url, "https://repo:51515");
        assert!(server.server_cert_fingerprint.is_empty());
    }
}
