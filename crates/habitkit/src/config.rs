//! Client configuration and its builder.
//!
//! Deployed versions of the habit API have disagreed on endpoint spelling
//! (`change-password` vs `changepassword`) and on what the login
//! identifier field is called. None of that is hard-coded in the client:
//! it all lives here, with defaults matching the current API.

use std::time::Duration;

use crate::HabitkitError;

// ---------------------------------------------------------------------------
// Endpoints
// ---------------------------------------------------------------------------

/// Paths of the bootstrap endpoints: the ones callable without a
/// credential.
///
/// Paths are compared after trimming `/`, so `"/login/"` and `"login"`
/// are the same endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub register: String,
    pub login: String,
    pub change_password: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            register: "register".to_string(),
            login: "login".to_string(),
            change_password: "change-password".to_string(),
        }
    }
}

impl Endpoints {
    /// `true` if `path` (already normalized) is register, login or
    /// change-password.
    pub fn is_bootstrap(&self, path: &str) -> bool {
        [&self.register, &self.login, &self.change_password]
            .iter()
            .any(|p| p.trim_matches('/') == path)
    }

    /// `true` if a token in the response to `path` should be installed
    /// as the session credential.
    pub fn issues_credential(&self, path: &str) -> bool {
        self.login.trim_matches('/') == path
            || self.change_password.trim_matches('/') == path
    }
}

// ---------------------------------------------------------------------------
// RequestFields
// ---------------------------------------------------------------------------

/// JSON field names used in the bootstrap request bodies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestFields {
    /// Field carrying the address in a register request.
    pub email: String,
    /// Field carrying the login identifier (login and change-password).
    pub username: String,
    pub password: String,
    /// Field carrying the challenge session token in change-password.
    pub session: String,
    pub new_password: String,
}

impl Default for RequestFields {
    fn default() -> Self {
        Self {
            email: "email".to_string(),
            username: "username".to_string(),
            password: "password".to_string(),
            session: "session".to_string(),
            new_password: "new_password".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// ClientConfig
// ---------------------------------------------------------------------------

/// Everything an [`AuthenticatedRequestClient`](crate::AuthenticatedRequestClient)
/// needs to know about the API it talks to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// API root, e.g. `https://abc.execute-api.eu-west-1.amazonaws.com/dev`.
    /// Any trailing `/` is ignored.
    pub base_url: String,

    /// Upper bound on every request, connect through last body byte.
    ///
    /// Default: 30 seconds.
    pub timeout: Duration,

    pub endpoints: Endpoints,
    pub fields: RequestFields,

    /// Sent as the `User-Agent` header.
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
            timeout: Duration::from_secs(30),
            endpoints: Endpoints::default(),
            fields: RequestFields::default(),
            user_agent: concat!("habitkit/", env!("CARGO_PKG_VERSION"))
                .to_string(),
        }
    }
}

impl ClientConfig {
    /// Creates a builder starting from the defaults.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::new()
    }

    /// Checks the config for values that can never work.
    ///
    /// # Errors
    /// Returns [`HabitkitError::Config`] for an empty or non-http(s) base
    /// URL, a zero timeout, or an empty bootstrap path.
    pub fn validate(&self) -> Result<(), HabitkitError> {
        let base = self.base_url.trim();
        if base.is_empty() {
            return Err(HabitkitError::Config("base url is empty".into()));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(HabitkitError::Config(format!(
                "base url must start with http:// or https://, got '{base}'"
            )));
        }
        if self.timeout.is_zero() {
            return Err(HabitkitError::Config("timeout must be non-zero".into()));
        }
        let paths = [
            ("register", &self.endpoints.register),
            ("login", &self.endpoints.login),
            ("change_password", &self.endpoints.change_password),
        ];
        for (name, path) in paths {
            if path.trim_matches('/').is_empty() {
                return Err(HabitkitError::Config(format!(
                    "{name} endpoint path is empty"
                )));
            }
        }
        Ok(())
    }

    /// Joins the base URL and an API path with exactly one `/`.
    pub fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim().trim_end_matches('/'),
            path.trim_matches('/')
        )
    }
}

// ---------------------------------------------------------------------------
// ClientConfigBuilder
// ---------------------------------------------------------------------------

/// Builder for [`ClientConfig`].
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use habitkit::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .base_url("https://api.example.com/dev/")
///     .timeout(Duration::from_secs(10))
///     .change_password_path("changepassword")
///     .build()
///     .unwrap();
///
/// assert_eq!(config.url_for("/habits"), "https://api.example.com/dev/habits");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    config: ClientConfig,
}

impl ClientConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    pub fn register_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.register = path.into();
        self
    }

    pub fn login_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.login = path.into();
        self
    }

    pub fn change_password_path(mut self, path: impl Into<String>) -> Self {
        self.config.endpoints.change_password = path.into();
        self
    }

    /// Replaces all bootstrap request field names at once.
    pub fn fields(mut self, fields: RequestFields) -> Self {
        self.config.fields = fields;
        self
    }

    /// Renames the login identifier field (e.g. to `"email"`).
    pub fn username_field(mut self, name: impl Into<String>) -> Self {
        self.config.fields.username = name.into();
        self
    }

    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Validates and returns the config.
    ///
    /// # Errors
    /// See [`ClientConfig::validate`].
    pub fn build(self) -> Result<ClientConfig, HabitkitError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ClientConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.timeout, Duration::from_secs(30));
    }

    #[test]
    fn test_url_for_trims_separators_on_both_sides() {
        let config = ClientConfig {
            base_url: "https://api.example.com/dev/".into(),
            ..ClientConfig::default()
        };
        assert_eq!(config.url_for("habits"), "https://api.example.com/dev/habits");
        assert_eq!(config.url_for("/habits/"), "https://api.example.com/dev/habits");
        assert_eq!(
            config.url_for("habits/h1/history"),
            "https://api.example.com/dev/habits/h1/history"
        );
    }

    #[test]
    fn test_build_rejects_bad_base_url() {
        assert!(matches!(
            ClientConfig::builder().base_url("").build(),
            Err(HabitkitError::Config(_))
        ));
        assert!(matches!(
            ClientConfig::builder().base_url("ftp://x").build(),
            Err(HabitkitError::Config(_))
        ));
    }

    #[test]
    fn test_build_rejects_zero_timeout() {
        let result = ClientConfig::builder().timeout(Duration::ZERO).build();
        assert!(matches!(result, Err(HabitkitError::Config(_))));
    }

    #[test]
    fn test_build_rejects_empty_endpoint() {
        let result = ClientConfig::builder().login_path("/").build();
        assert!(matches!(result, Err(HabitkitError::Config(_))));
    }

    #[test]
    fn test_is_bootstrap_matches_configured_paths() {
        let endpoints = Endpoints {
            change_password: "/changepassword/".into(),
            ..Endpoints::default()
        };
        assert!(endpoints.is_bootstrap("register"));
        assert!(endpoints.is_bootstrap("login"));
        assert!(endpoints.is_bootstrap("changepassword"));
        assert!(!endpoints.is_bootstrap("change-password"));
        assert!(!endpoints.is_bootstrap("habits"));
    }

    #[test]
    fn test_issues_credential_excludes_register() {
        let endpoints = Endpoints::default();
        assert!(endpoints.issues_credential("login"));
        assert!(endpoints.issues_credential("change-password"));
        assert!(!endpoints.issues_credential("register"));
        assert!(!endpoints.issues_credential("habits"));
    }
}
