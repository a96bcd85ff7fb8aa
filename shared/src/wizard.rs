//! Repository setup wizard
//!
//! The wizard is a plain value driven by [`Wizard::update`]. Every message
//! moves it through [`ConnectionState`]; when a transition needs the backend,
//! `update` returns a [`WizardCommand`] for the UI layer to execute. The
//! result is fed back as a message stamped with the command's [`Ticket`].
//! Results for a ticket that is no longer pending (the user went Back, or a
//! newer request replaced it) are dropped.
//!
//! ```text
//! SelectingProvider -> ConfiguringProvider -> ProbingExistence -> ConfirmingCreate  -> Connected
//!                                 |                   \--------> ConfirmingConnect -> Connected
//!                                 \ (internal provider) -------> ConfirmingConnect
//! ```

use crate::messages::{
    AlgorithmsResponse, BlockFormat, ClientOptions, ConnectRequest, CreateRequest, ExistsRequest,
    NewRepositoryOptions, ObjectFormat, RequestError,
};
use crate::providers::{ProviderForm, ProviderKind, ValidationErrors};

/// Where the wizard currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    SelectingProvider,
    ConfiguringProvider,
    ProbingExistence,
    ConfirmingCreate,
    ConfirmingConnect,
    Connected,
    /// The create form could not be prepared; Back returns to configuration
    Failed(String),
}

impl ConnectionState {
    pub fn title(&self) -> &'static str {
        match self {
            ConnectionState::SelectingProvider => "Select Storage Type",
            ConnectionState::ConfiguringProvider => "Storage Configuration",
            ConnectionState::ProbingExistence => "Checking Storage",
            ConnectionState::ConfirmingCreate => "Create New Repository",
            ConnectionState::ConfirmingConnect => "Connect To Repository",
            ConnectionState::Connected => "Connected",
            ConnectionState::Failed(_) => "Setup Failed",
        }
    }
}

/// Identifies one backend request issued by the wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket(u64);

/// Side effect requested by a transition
#[derive(Debug, Clone, PartialEq)]
pub enum WizardCommand {
    LoadAlgorithms { ticket: Ticket },
    Probe { ticket: Ticket, request: ExistsRequest },
    Create { ticket: Ticket, request: CreateRequest },
    Connect { ticket: Ticket, request: ConnectRequest },
    /// The repository is connected; the app should refresh its status
    NotifyConnected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreateField {
    Password,
    ConfirmPassword,
    Hash,
    Encryption,
    Splitter,
    Ecc,
    EccOverheadPercent,
    FormatVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectField {
    Password,
    Description,
    Username,
    Hostname,
    Readonly,
}

/// Input to the wizard
#[derive(Debug, Clone, PartialEq)]
pub enum WizardMsg {
    SelectProvider(ProviderKind),
    SetField { name: String, value: String },
    SetCreate(CreateField, String),
    SetConnect(ConnectField, String),
    Submit,
    Back,
    AlgorithmsLoaded { ticket: Ticket, result: Result<AlgorithmsResponse, RequestError> },
    ProbeFinished { ticket: Ticket, result: Result<(), RequestError> },
    CreateFinished { ticket: Ticket, result: Result<(), RequestError> },
    ConnectFinished { ticket: Ticket, result: Result<(), RequestError> },
}

pub const DEFAULT_HASH: &str = "BLAKE2B-256-128";
pub const DEFAULT_ENCRYPTION: &str = "AES256-GCM-HMAC-SHA256";
pub const DEFAULT_SPLITTER: &str = "DYNAMIC-4M-BUZHASH";
pub const DEFAULT_FORMAT_VERSION: &str = "2";
pub const FORMAT_VERSIONS: [&str; 3] = ["1", "2", "3"];

/// Values collected on the create-repository screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateForm {
    pub password: String,
    pub confirm_password: String,
    pub hash: String,
    pub encryption: String,
    pub splitter: String,
    pub ecc: String,
    pub ecc_overhead_percent: String,
    pub format_version: String,
}

impl Default for CreateForm {
    fn default() -> Self {
        Self {
            password: String::new(),
            confirm_password: String::new(),
            hash: DEFAULT_HASH.to_string(),
            encryption: DEFAULT_ENCRYPTION.to_string(),
            splitter: DEFAULT_SPLITTER.to_string(),
            ecc: String::new(),
            ecc_overhead_percent: "0".to_string(),
            format_version: DEFAULT_FORMAT_VERSION.to_string(),
        }
    }
}

impl CreateForm {
    /// Take the backend's default algorithms
    pub fn apply_defaults(&mut self, algorithms: &AlgorithmsResponse) {
        fn take(target: &mut String, default: &str) {
            if !default.is_empty() {
                *target = default.to_string();
            }
        }
        take(&mut self.hash, &algorithms.default_hash);
        take(&mut self.encryption, &algorithms.default_encryption);
        take(&mut self.splitter, &algorithms.default_splitter);
        self.ecc = algorithms.default_ecc.clone();
    }

    pub fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();

        if self.password.is_empty() {
            errors.add("password", "Required field");
        }
        if self.confirm_password.is_empty() {
            errors.add("confirmPassword", "Required field");
        } else if self.password != self.confirm_password {
            errors.add("confirmPassword", "Passwords don't match");
        }
        if self.format_version.parse::<i32>().is_err() {
            errors.add("formatVersion", "Must be a number");
        }
        if self.ecc_overhead_percent.parse::<i32>().is_err() {
            errors.add("eccOverheadPercent", "Must be a number");
        }

        errors.into_result()
    }

    pub fn options(&self) -> NewRepositoryOptions {
        NewRepositoryOptions {
            block_format: BlockFormat {
                version: self.format_version.parse().unwrap_or(2),
                hash: self.hash.clone(),
                encryption: self.encryption.clone(),
                ecc: self.ecc.clone(),
                ecc_overhead_percent: self.ecc_overhead_percent.parse().unwrap_or(0),
            },
            object_format: ObjectFormat {
                splitter: self.splitter.clone(),
            },
        }
    }

    fn set(&mut self, field: CreateField, value: String) {
        match field {
            CreateField::Password => self.password = value,
            CreateField::ConfirmPassword => self.confirm_password = value,
            CreateField::Hash => self.hash = value,
            CreateField::Encryption => self.encryption = value,
            CreateField::Splitter => self.splitter = value,
            CreateField::Ecc => self.ecc = value,
            CreateField::EccOverheadPercent => self.ecc_overhead_percent = value,
            CreateField::FormatVersion => self.format_version = value,
        }
    }
}

/// Values collected on the connect screen
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectForm {
    pub password: String,
    pub description: String,
    pub username: String,
    pub hostname: String,
    pub readonly: bool,
}

impl ConnectForm {
    /// The token provider authenticates with the token itself
    pub fn validate(&self, kind: ProviderKind) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::default();
        if kind != ProviderKind::Token && self.password.is_empty() {
            errors.add("password", "Required field");
        }
        errors.into_result()
    }

    pub fn client_options(&self) -> ClientOptions {
        ClientOptions {
            description: self.description.trim().to_string(),
            username: self.username.trim().to_string(),
            hostname: self.hostname.trim().to_string(),
            readonly: self.readonly,
        }
    }

    fn set(&mut self, field: ConnectField, value: String) {
        match field {
            ConnectField::Password => self.password = value,
            ConnectField::Description => self.description = value,
            ConnectField::Username => self.username = value,
            ConnectField::Hostname => self.hostname = value,
            ConnectField::Readonly => self.readonly = value == "true",
        }
    }
}

/// Setup wizard state
#[derive(Debug, Clone, PartialEq)]
pub struct Wizard {
    state: ConnectionState,
    history: Vec<ConnectionState>,
    form: Option<ProviderForm>,
    create: CreateForm,
    connect: ConnectForm,
    algorithms: Option<AlgorithmsResponse>,
    field_errors: ValidationErrors,
    error: Option<RequestError>,
    pending: Option<Ticket>,
    algorithms_pending: Option<Ticket>,
    next_ticket: u64,
}

impl Default for Wizard {
    fn default() -> Self {
        Self::new()
    }
}

impl Wizard {
    pub fn new() -> Self {
        Self {
            state: ConnectionState::SelectingProvider,
            history: Vec::new(),
            form: None,
            create: CreateForm::default(),
            connect: ConnectForm::default(),
            algorithms: None,
            field_errors: ValidationErrors::default(),
            error: None,
            pending: None,
            algorithms_pending: None,
            next_ticket: 0,
        }
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn provider(&self) -> Option<ProviderKind> {
        self.form.as_ref().map(|f| f.kind)
    }

    pub fn form(&self) -> Option<&ProviderForm> {
        self.form.as_ref()
    }

    pub fn create_form(&self) -> &CreateForm {
        &self.create
    }

    pub fn connect_form(&self) -> &ConnectForm {
        &self.connect
    }

    /// Algorithm lists for the advanced create options, once loaded
    pub fn algorithms(&self) -> Option<&AlgorithmsResponse> {
        self.algorithms.as_ref()
    }

    pub fn field_error(&self, field: &str) -> Option<&str> {
        self.field_errors.get(field)
    }

    pub fn error(&self) -> Option<&RequestError> {
        self.error.as_ref()
    }

    /// Whether a probe/create/connect request is in flight
    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    pub fn can_go_back(&self) -> bool {
        !self.history.is_empty() && self.state != ConnectionState::Connected
    }

    /// Apply one message, returning the side effect it requires
    pub fn update(&mut self, msg: WizardMsg) -> Option<WizardCommand> {
        match msg {
            WizardMsg::SelectProvider(kind) => self.select_provider(kind),
            WizardMsg::SetField { name, value } => {
                if let Some(form) = self.form.as_mut() {
                    self.field_errors.0.remove(&name);
                    form.config.set(name, value);
                }
                None
            }
            WizardMsg::SetCreate(field, value) => {
                self.create.set(field, value);
                self.field_errors = ValidationErrors::default();
                None
            }
            WizardMsg::SetConnect(field, value) => {
                self.connect.set(field, value);
                self.field_errors.0.remove("password");
                None
            }
            WizardMsg::Submit => self.submit(),
            WizardMsg::Back => {
                self.back();
                None
            }
            WizardMsg::AlgorithmsLoaded { ticket, result } => {
                self.algorithms_loaded(ticket, result);
                None
            }
            WizardMsg::ProbeFinished { ticket, result } => self.probe_finished(ticket, result),
            WizardMsg::CreateFinished { ticket, result }
            | WizardMsg::ConnectFinished { ticket, result } => self.connection_finished(ticket, result),
        }
    }

    fn issue(&mut self) -> Ticket {
        self.next_ticket += 1;
        Ticket(self.next_ticket)
    }

    fn advance(&mut self, next: ConnectionState) {
        let previous = std::mem::replace(&mut self.state, next);
        self.history.push(previous);
    }

    fn select_provider(&mut self, kind: ProviderKind) -> Option<WizardCommand> {
        if self.state != ConnectionState::SelectingProvider {
            return None;
        }

        if self.provider() != Some(kind) {
            self.form = Some(ProviderForm::new(kind));
        }
        self.field_errors = ValidationErrors::default();
        self.error = None;
        self.advance(ConnectionState::ConfiguringProvider);
        None
    }

    fn submit(&mut self) -> Option<WizardCommand> {
        if self.pending.is_some() {
            return None;
        }

        match self.state {
            ConnectionState::ConfiguringProvider => self.submit_provider(),
            ConnectionState::ConfirmingCreate => self.submit_create(),
            ConnectionState::ConfirmingConnect => self.submit_connect(),
            _ => None,
        }
    }

    fn submit_provider(&mut self) -> Option<WizardCommand> {
        let form = self.form.as_ref()?;

        if let Err(errors) = form.validate() {
            self.field_errors = errors;
            return None;
        }

        self.field_errors = ValidationErrors::default();
        self.error = None;

        if form.kind.is_internal() {
            self.advance(ConnectionState::ConfirmingConnect);
            return None;
        }

        let request = ExistsRequest { storage: form.storage() };
        let ticket = self.issue();
        self.pending = Some(ticket);
        self.advance(ConnectionState::ProbingExistence);
        Some(WizardCommand::Probe { ticket, request })
    }

    fn submit_create(&mut self) -> Option<WizardCommand> {
        let form = self.form.as_ref()?;

        if let Err(errors) = self.create.validate() {
            self.field_errors = errors;
            return None;
        }

        let request = CreateRequest {
            storage: form.storage(),
            password: self.create.password.clone(),
            options: self.create.options(),
            client_options: self.connect.client_options(),
        };
        self.error = None;
        let ticket = self.issue();
        self.pending = Some(ticket);
        Some(WizardCommand::Create { ticket, request })
    }

    fn submit_connect(&mut self) -> Option<WizardCommand> {
        let form = self.form.as_ref()?;

        if let Err(errors) = self.connect.validate(form.kind) {
            self.field_errors = errors;
            return None;
        }

        let mut request = ConnectRequest {
            storage: None,
            token: None,
            api_server: None,
            password: Some(self.connect.password.clone()),
            client_options: self.connect.client_options(),
        };
        match form.kind {
            ProviderKind::Token => {
                request.token = Some(form.config.get("token").trim().to_string());
                request.password = None;
            }
            ProviderKind::Server => request.api_server = Some(form.api_server()),
            _ => request.storage = Some(form.storage()),
        }

        self.error = None;
        let ticket = self.issue();
        self.pending = Some(ticket);
        Some(WizardCommand::Connect { ticket, request })
    }

    fn back(&mut self) {
        if !self.can_go_back() {
            return;
        }

        if let Some(previous) = self.history.pop() {
            self.state = previous;
        }
        self.pending = None;
        self.algorithms_pending = None;
        self.field_errors = ValidationErrors::default();
        self.error = None;
    }

    fn probe_finished(
        &mut self,
        ticket: Ticket,
        result: Result<(), RequestError>,
    ) -> Option<WizardCommand> {
        if self.pending != Some(ticket) || self.state != ConnectionState::ProbingExistence {
            return None;
        }
        self.pending = None;

        match result {
            Ok(()) => {
                self.state = ConnectionState::ConfirmingConnect;
                None
            }
            Err(e) if e.is_not_initialized() => {
                self.state = ConnectionState::ConfirmingCreate;
                if self.algorithms.is_some() {
                    return None;
                }
                let ticket = self.issue();
                self.algorithms_pending = Some(ticket);
                Some(WizardCommand::LoadAlgorithms { ticket })
            }
            Err(e) => {
                // Back to the form with the error attached.
                if let Some(previous) = self.history.pop() {
                    self.state = previous;
                }
                self.error = Some(e);
                None
            }
        }
    }

    fn algorithms_loaded(&mut self, ticket: Ticket, result: Result<AlgorithmsResponse, RequestError>) {
        if self.algorithms_pending != Some(ticket) {
            return;
        }
        self.algorithms_pending = None;

        match result {
            Ok(algorithms) => {
                self.create.apply_defaults(&algorithms);
                self.algorithms = Some(algorithms);
            }
            // A create already in flight goes ahead with the built-in defaults
            Err(e) if self.state == ConnectionState::ConfirmingCreate && self.pending.is_none() => {
                self.state = ConnectionState::Failed(e.to_string());
                self.error = Some(e);
            }
            Err(_) => {}
        }
    }

    fn connection_finished(
        &mut self,
        ticket: Ticket,
        result: Result<(), RequestError>,
    ) -> Option<WizardCommand> {
        if self.pending != Some(ticket) {
            return None;
        }
        self.pending = None;

        match result {
            Ok(()) => {
                self.advance(ConnectionState::Connected);
                self.error = None;
                Some(WizardCommand::NotifyConnected)
            }
            Err(e) => {
                self.error = Some(e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::messages::{AlgorithmInfo, ApiErrorBody};
    use serde_json::json;

    fn not_initialized() -> RequestError {
        RequestError::Api {
            status: 400,
            body: ApiErrorBody {
                code: Some("NOT_INITIALIZED".to_string()),
                error: "repository not initialized in the provided storage".to_string(),
            },
        }
    }

    fn algorithms() -> AlgorithmsResponse {
        AlgorithmsResponse {
            default_hash: "BLAKE3-256".to_string(),
            default_encryption: "CHACHA20-POLY1305-HMAC-SHA256".to_string(),
            default_splitter: "DYNAMIC-8M-RABINKARP".to_string(),
            default_ecc: String::new(),
            hash: vec![AlgorithmInfo { id: "BLAKE3-256".to_string(), deprecated: false }],
            encryption: vec![],
            splitter: vec![],
            ecc: vec![],
        }
    }

    /// Select filesystem at `/data` and submit, returning the probe ticket
    fn probing_filesystem(wizard: &mut Wizard) -> Ticket {
        wizard.update(WizardMsg::SelectProvider(ProviderKind::Filesystem));
        wizard.update(WizardMsg::SetField { name: "path".into(), value: "/data".into() });
        match wizard.update(WizardMsg::Submit) {
            Some(WizardCommand::Probe { ticket, request }) => {
                assert_eq!(
                    serde_json::to_value(&request).unwrap(),
                    json!({"storage": {"type": "filesystem", "config": {"path": "/data"}}})
                );
                ticket
            }
            other => panic!("expected probe, got {:?}", other),
        }
    }

    #[test]
    fn test_starts_selecting_provider() {
        let wizard = Wizard::new();
        assert_eq!(wizard.state(), &ConnectionState::SelectingProvider);
        assert!(!wizard.can_go_back());
        assert!(wizard.provider().is_none());
    }

    #[test]
    fn test_invalid_config_stays_put_without_request() {
        let mut wizard = Wizard::new();
        wizard.update(WizardMsg::SelectProvider(ProviderKind::Filesystem));

        assert_eq!(wizard.update(WizardMsg::Submit), None);
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
        assert_eq!(wizard.field_error("path"), Some("Required field"));
        assert!(!wizard.is_busy());
    }

    #[test]
    fn test_probe_not_initialized_goes_to_create() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        assert_eq!(wizard.state(), &ConnectionState::ProbingExistence);
        assert!(wizard.is_busy());

        let cmd = wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) });
        assert!(matches!(cmd, Some(WizardCommand::LoadAlgorithms { .. })));
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingCreate);
        assert!(!wizard.is_busy());
    }

    #[test]
    fn test_probe_success_goes_to_connect() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);

        let cmd = wizard.update(WizardMsg::ProbeFinished { ticket, result: Ok(()) });
        assert_eq!(cmd, None);
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingConnect);
    }

    #[test]
    fn test_probe_other_error_returns_to_configuration() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);

        let err = RequestError::Transport("connection refused".to_string());
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(err.clone()) });

        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
        assert_eq!(wizard.error(), Some(&err));
        // Entered values survive.
        assert_eq!(wizard.form().unwrap().config.get("path"), "/data");
    }

    #[test]
    fn test_second_submit_while_probing_is_ignored() {
        let mut wizard = Wizard::new();
        probing_filesystem(&mut wizard);
        assert_eq!(wizard.update(WizardMsg::Submit), None);
    }

    #[test]
    fn test_internal_provider_skips_probe() {
        let mut wizard = Wizard::new();
        wizard.update(WizardMsg::SelectProvider(ProviderKind::Token));
        wizard.update(WizardMsg::SetField { name: "token".into(), value: "tok-123".into() });

        assert_eq!(wizard.update(WizardMsg::Submit), None);
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingConnect);

        match wizard.update(WizardMsg::Submit) {
            Some(WizardCommand::Connect { request, .. }) => {
                assert_eq!(request.token.as_deref(), Some("tok-123"));
                assert!(request.storage.is_none());
                assert!(request.password.is_none());
            }
            other => panic!("expected connect, got {:?}", other),
        }
    }

    #[test]
    fn test_server_provider_connects_with_api_server() {
        let mut wizard = Wizard::new();
        wizard.update(WizardMsg::SelectProvider(ProviderKind::Server));
        wizard.update(WizardMsg::SetField { name: "url".into(), value: "https://repo:51515".into() });
        wizard.update(WizardMsg::Submit);
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingConnect);

        // Password is required for everything but tokens.
        assert_eq!(wizard.update(WizardMsg::Submit), None);
        assert_eq!(wizard.field_error("password"), Some("Required field"));

        wizard.update(WizardMsg::SetConnect(ConnectField::Password, "pw".into()));
        match wizard.update(WizardMsg::Submit) {
            Some(WizardCommand::Connect { request, .. }) => {
                assert_eq!(request.api_server.unwrap().url, "https://repo:51515");
                assert_eq!(request.password.as_deref(), Some("pw"));
            }
            other => panic!("expected connect, got {:?}", other),
        }
    }

    #[test]
    fn test_create_password_mismatch_is_rejected_locally() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) });

        wizard.update(WizardMsg::SetCreate(CreateField::Password, "secret".into()));
        wizard.update(WizardMsg::SetCreate(CreateField::ConfirmPassword, "secreT".into()));

        assert_eq!(wizard.update(WizardMsg::Submit), None);
        assert_eq!(wizard.field_error("confirmPassword"), Some("Passwords don't match"));
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingCreate);
        assert!(!wizard.is_busy());
    }

    #[test]
    fn test_create_end_to_end() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);

        let load = wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) });
        let Some(WizardCommand::LoadAlgorithms { ticket }) = load else {
            panic!("expected algorithm load, got {:?}", load);
        };
        wizard.update(WizardMsg::AlgorithmsLoaded { ticket, result: Ok(algorithms()) });
        assert!(wizard.algorithms().is_some());

        wizard.update(WizardMsg::SetCreate(CreateField::Password, "secret".into()));
        wizard.update(WizardMsg::SetCreate(CreateField::ConfirmPassword, "secret".into()));

        let Some(WizardCommand::Create { ticket, request }) = wizard.update(WizardMsg::Submit) else {
            panic!("expected create request");
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({
                "storage": {"type": "filesystem", "config": {"path": "/data"}},
                "password": "secret",
                "options": {
                    "blockFormat": {
                        "version": 2,
                        "hash": "BLAKE3-256",
                        "encryption": "CHACHA20-POLY1305-HMAC-SHA256",
                        "eccOverheadPercent": 0
                    },
                    "objectFormat": {"splitter": "DYNAMIC-8M-RABINKARP"}
                }
            })
        );

        let cmd = wizard.update(WizardMsg::CreateFinished { ticket, result: Ok(()) });
        assert_eq!(cmd, Some(WizardCommand::NotifyConnected));
        assert_eq!(wizard.state(), &ConnectionState::Connected);
        assert!(!wizard.can_go_back());
    }

    #[test]
    fn test_create_failure_stays_with_error() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) });
        wizard.update(WizardMsg::SetCreate(CreateField::Password, "secret".into()));
        wizard.update(WizardMsg::SetCreate(CreateField::ConfirmPassword, "secret".into()));

        let Some(WizardCommand::Create { ticket, .. }) = wizard.update(WizardMsg::Submit) else {
            panic!("expected create request");
        };
        let err = RequestError::Api {
            status: 500,
            body: ApiErrorBody { code: Some("INTERNAL".into()), error: "disk full".into() },
        };
        wizard.update(WizardMsg::CreateFinished { ticket, result: Err(err) });

        assert_eq!(wizard.state(), &ConnectionState::ConfirmingCreate);
        assert_eq!(wizard.error().unwrap().to_string(), "INTERNAL: disk full");
        // Resubmitting sends the same request again.
        assert!(matches!(wizard.update(WizardMsg::Submit), Some(WizardCommand::Create { .. })));
    }

    #[test]
    fn test_back_discards_in_flight_probe() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);

        wizard.update(WizardMsg::Back);
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
        assert!(!wizard.is_busy());

        // The late answer is ignored.
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Ok(()) });
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
    }

    #[test]
    fn test_back_preserves_values_for_same_provider() {
        let mut wizard = Wizard::new();
        wizard.update(WizardMsg::SelectProvider(ProviderKind::Filesystem));
        wizard.update(WizardMsg::SetField { name: "path".into(), value: "/data".into() });

        wizard.update(WizardMsg::Back);
        assert_eq!(wizard.state(), &ConnectionState::SelectingProvider);

        wizard.update(WizardMsg::SelectProvider(ProviderKind::Filesystem));
        assert_eq!(wizard.form().unwrap().config.get("path"), "/data");

        wizard.update(WizardMsg::Back);
        wizard.update(WizardMsg::SelectProvider(ProviderKind::S3));
        assert_eq!(wizard.form().unwrap().config.get("path"), "");
    }

    #[test]
    fn test_back_from_create_returns_to_configuration() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) });

        wizard.update(WizardMsg::Back);
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
    }

    #[test]
    fn test_algorithm_failure_enters_failed_state() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        let Some(WizardCommand::LoadAlgorithms { ticket }) =
            wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) })
        else {
            panic!("expected algorithm load");
        };

        let err = RequestError::Transport("offline".into());
        wizard.update(WizardMsg::AlgorithmsLoaded { ticket, result: Err(err) });
        assert!(matches!(wizard.state(), ConnectionState::Failed(_)));
        assert!(wizard.can_go_back());

        wizard.update(WizardMsg::Back);
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
    }

    #[test]
    fn test_algorithm_failure_during_create_keeps_the_create() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        let Some(WizardCommand::LoadAlgorithms { ticket: load }) =
            wizard.update(WizardMsg::ProbeFinished { ticket, result: Err(not_initialized()) })
        else {
            panic!("expected algorithm load");
        };
        wizard.update(WizardMsg::SetCreate(CreateField::Password, "secret".into()));
        wizard.update(WizardMsg::SetCreate(CreateField::ConfirmPassword, "secret".into()));
        let Some(WizardCommand::Create { ticket: create, .. }) = wizard.update(WizardMsg::Submit) else {
            panic!("expected create request");
        };

        let err = RequestError::Transport("offline".into());
        wizard.update(WizardMsg::AlgorithmsLoaded { ticket: load, result: Err(err) });
        assert_eq!(wizard.state(), &ConnectionState::ConfirmingCreate);
        assert!(wizard.is_busy());

        let cmd = wizard.update(WizardMsg::CreateFinished { ticket: create, result: Ok(()) });
        assert_eq!(cmd, Some(WizardCommand::NotifyConnected));
        assert_eq!(wizard.state(), &ConnectionState::Connected);
    }

    #[test]
    fn test_stale_connect_result_is_ignored() {
        let mut wizard = Wizard::new();
        let ticket = probing_filesystem(&mut wizard);
        wizard.update(WizardMsg::ProbeFinished { ticket, result: Ok(()) });
        wizard.update(WizardMsg::SetConnect(ConnectField::Password, "pw".into()));

        let Some(WizardCommand::Connect { ticket, request }) = wizard.update(WizardMsg::Submit) else {
            panic!("expected connect request");
        };
        assert!(request.storage.is_some());

        wizard.update(WizardMsg::Back);
        let cmd = wizard.update(WizardMsg::ConnectFinished { ticket, result: Ok(()) });
        assert_eq!(cmd, None);
        assert_eq!(wizard.state(), &ConnectionState::ConfiguringProvider);
    }
}
